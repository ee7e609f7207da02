//! Update messages and delta application with structural sharing.
//!
//! [`AppTree`] holds the current root. Applying a [`Delta`] rebuilds only the
//! blocks on the path to the changed slot; every other subtree keeps its `Arc`
//! identity, which is what lets the reconciler recognize unchanged nodes.

use std::sync::Arc;

use tracing::trace;

use crate::error::{NodePath, TreeError};

use super::generation::Generation;
use super::node::{Block, Node};

// ---------------------------------------------------------------------------
// Update messages
// ---------------------------------------------------------------------------

/// Replace or append the node at `path`.
#[derive(Debug, Clone)]
pub struct Delta {
    /// Child-index path from the root. The last index may equal the parent's
    /// child count, which appends.
    pub path: NodePath,
    pub node: Arc<Node>,
}

/// What an [`Update`] carries.
#[derive(Debug, Clone)]
pub enum UpdateBody {
    /// A complete new tree. The root must be a block.
    Tree(Arc<Node>),
    Delta(Delta),
}

/// One message from the backend.
#[derive(Debug, Clone)]
pub struct Update {
    pub generation: Generation,
    pub body: UpdateBody,
}

impl Update {
    /// A full-tree update.
    pub fn tree(generation: impl Into<Generation>, root: impl Into<Arc<Node>>) -> Self {
        Self {
            generation: generation.into(),
            body: UpdateBody::Tree(root.into()),
        }
    }

    /// A single-slot delta update.
    pub fn delta(
        generation: impl Into<Generation>,
        path: impl Into<NodePath>,
        node: impl Into<Arc<Node>>,
    ) -> Self {
        Self {
            generation: generation.into(),
            body: UpdateBody::Delta(Delta {
                path: path.into(),
                node: node.into(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// AppTree
// ---------------------------------------------------------------------------

/// The current tree, rooted at exactly one block.
#[derive(Debug, Clone)]
pub struct AppTree {
    root: Arc<Node>,
}

impl AppTree {
    /// An empty vertical root.
    pub fn new() -> Self {
        Self {
            root: Node::block(Block::vertical()),
        }
    }

    /// Start from an existing root block.
    pub fn with_root(root: Arc<Node>) -> Result<Self, TreeError> {
        ensure_block(&root)?;
        Ok(Self { root })
    }

    /// The current root block.
    pub fn root(&self) -> &Arc<Node> {
        &self.root
    }

    /// Swap in a whole new tree.
    pub fn replace_root(&mut self, root: Arc<Node>) -> Result<(), TreeError> {
        ensure_block(&root)?;
        self.root = root;
        Ok(())
    }

    /// Replace or append the node addressed by `delta.path`.
    ///
    /// On error the tree is left untouched.
    pub fn apply_delta(&mut self, delta: &Delta) -> Result<(), TreeError> {
        if delta.path.is_root() {
            return Err(TreeError::EmptyDeltaPath);
        }
        self.root = set_at(&self.root, delta.path.as_slice(), &delta.node, &delta.path)?;
        trace!(path = %delta.path, kind = delta.node.kind_name(), "applied delta");
        Ok(())
    }

    /// Apply either kind of update body.
    pub fn apply(&mut self, body: &UpdateBody) -> Result<(), TreeError> {
        match body {
            UpdateBody::Tree(root) => self.replace_root(Arc::clone(root)),
            UpdateBody::Delta(delta) => self.apply_delta(delta),
        }
    }
}

impl Default for AppTree {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_block(node: &Node) -> Result<(), TreeError> {
    match node {
        Node::Block(_) => Ok(()),
        Node::Element(_) => Err(TreeError::RootNotBlock),
    }
}

/// Rebuild `node` with `replacement` placed at `path`.
fn set_at(
    node: &Arc<Node>,
    path: &[usize],
    replacement: &Arc<Node>,
    full_path: &NodePath,
) -> Result<Arc<Node>, TreeError> {
    let Some((&index, rest)) = path.split_first() else {
        return Ok(Arc::clone(replacement));
    };
    let bad_path = || TreeError::InvalidDeltaPath {
        path: full_path.clone(),
    };

    let Node::Block(block) = node.as_ref() else {
        return Err(bad_path());
    };

    let mut children = block.children.clone();
    if rest.is_empty() {
        match index.cmp(&children.len()) {
            std::cmp::Ordering::Less => children[index] = Arc::clone(replacement),
            std::cmp::Ordering::Equal => children.push(Arc::clone(replacement)),
            std::cmp::Ordering::Greater => return Err(bad_path()),
        }
    } else {
        let child = Arc::clone(children.get(index).ok_or_else(bad_path)?);
        children[index] = set_at(&child, rest, replacement, full_path)?;
    }

    Ok(Arc::new(Node::Block(Block {
        kind: block.kind.clone(),
        children,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::node::{BlockKind, ElementPayload};

    fn text(body: &str) -> Arc<Node> {
        Node::element(ElementPayload::Text { body: body.into() })
    }

    fn two_columns() -> AppTree {
        let root = Block::vertical()
            .with_child(text("title"))
            .with_child(
                Block::new(BlockKind::Horizontal { gap: None })
                    .with_child(Block::new(BlockKind::Column { weight: 1.0 }).with_child(text("left")))
                    .with_child(Block::new(BlockKind::Column { weight: 1.0 }).with_child(text("right"))),
            );
        AppTree::with_root(root.into()).unwrap()
    }

    #[test]
    fn new_tree_is_empty_block() {
        let tree = AppTree::new();
        assert!(tree.root().as_block().is_some());
        assert!(tree.root().children().is_empty());
    }

    #[test]
    fn replace_existing_slot() {
        let mut tree = two_columns();
        tree.apply_delta(&Delta {
            path: vec![1, 0, 0].into(),
            node: text("LEFT"),
        })
        .unwrap();
        let left = tree.root().descendant(&[1, 0, 0]).unwrap();
        assert_eq!(
            left.as_element().unwrap().payload,
            ElementPayload::Text { body: "LEFT".into() }
        );
    }

    #[test]
    fn append_at_end() {
        let mut tree = two_columns();
        tree.apply_delta(&Delta {
            path: vec![2].into(),
            node: text("footer"),
        })
        .unwrap();
        assert_eq!(tree.root().children().len(), 3);
    }

    #[test]
    fn untouched_subtrees_keep_identity() {
        let mut tree = two_columns();
        let before = Arc::clone(tree.root());

        tree.apply_delta(&Delta {
            path: vec![1, 0, 0].into(),
            node: text("LEFT"),
        })
        .unwrap();
        let after = tree.root();

        // The path was rebuilt...
        assert!(!Arc::ptr_eq(&before, after));
        assert!(!Arc::ptr_eq(
            before.descendant(&[1]).unwrap(),
            after.descendant(&[1]).unwrap()
        ));
        // ...but siblings off the path were shared.
        assert!(Arc::ptr_eq(
            before.descendant(&[0]).unwrap(),
            after.descendant(&[0]).unwrap()
        ));
        assert!(Arc::ptr_eq(
            before.descendant(&[1, 1]).unwrap(),
            after.descendant(&[1, 1]).unwrap()
        ));
    }

    #[test]
    fn index_past_end_is_rejected() {
        let mut tree = two_columns();
        let err = tree
            .apply_delta(&Delta {
                path: vec![5].into(),
                node: text("x"),
            })
            .unwrap_err();
        assert!(matches!(err, TreeError::InvalidDeltaPath { .. }));
        assert_eq!(tree.root().children().len(), 2);
    }

    #[test]
    fn descending_through_element_is_rejected() {
        let mut tree = two_columns();
        let err = tree
            .apply_delta(&Delta {
                path: vec![0, 0].into(),
                node: text("x"),
            })
            .unwrap_err();
        assert!(matches!(err, TreeError::InvalidDeltaPath { .. }));
    }

    #[test]
    fn empty_path_is_rejected() {
        let mut tree = two_columns();
        let err = tree
            .apply_delta(&Delta {
                path: NodePath::root(),
                node: text("x"),
            })
            .unwrap_err();
        assert!(matches!(err, TreeError::EmptyDeltaPath));
    }

    #[test]
    fn element_root_is_rejected() {
        assert!(matches!(
            AppTree::with_root(text("x")),
            Err(TreeError::RootNotBlock)
        ));
        let mut tree = AppTree::new();
        assert!(tree.replace_root(text("x")).is_err());
    }

    #[test]
    fn apply_full_tree_body() {
        let mut tree = AppTree::new();
        let root: Arc<Node> = Block::vertical().with_child(text("a")).into();
        tree.apply(&UpdateBody::Tree(Arc::clone(&root))).unwrap();
        assert!(Arc::ptr_eq(tree.root(), &root));
    }
}
