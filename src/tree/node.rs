//! Node types: Node, Element, Block, and their payloads.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::NodePath;

use super::key::StableKey;

// ---------------------------------------------------------------------------
// Element payloads
// ---------------------------------------------------------------------------

/// Severity of an [`ElementPayload::Alert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Typed payload of a leaf element: one widget, chart, or output.
///
/// Interactive widgets carry an optional `id` assigned by the backend. That id
/// is the only thing that lets an element be recognized across generations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementPayload {
    Text {
        body: String,
    },
    Markdown {
        body: String,
    },
    Alert {
        level: AlertLevel,
        body: String,
    },
    Chart {
        #[serde(default)]
        id: Option<String>,
        spec: serde_json::Value,
    },
    Empty,
    Button {
        #[serde(default)]
        id: Option<String>,
        label: String,
    },
    Checkbox {
        #[serde(default)]
        id: Option<String>,
        label: String,
        #[serde(default)]
        value: bool,
    },
    Slider {
        #[serde(default)]
        id: Option<String>,
        label: String,
        min: f64,
        max: f64,
        value: f64,
    },
    TextInput {
        #[serde(default)]
        id: Option<String>,
        label: String,
        #[serde(default)]
        value: String,
    },
    Selectbox {
        #[serde(default)]
        id: Option<String>,
        label: String,
        options: Vec<String>,
        #[serde(default)]
        index: Option<usize>,
    },
    DataEditor {
        #[serde(default)]
        id: Option<String>,
        columns: Vec<String>,
        #[serde(default)]
        rows: Vec<Vec<serde_json::Value>>,
    },
    AudioInput {
        #[serde(default)]
        id: Option<String>,
        label: String,
    },
}

impl ElementPayload {
    /// The wire name of this payload type (e.g. `"text_input"`).
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Markdown { .. } => "markdown",
            Self::Alert { .. } => "alert",
            Self::Chart { .. } => "chart",
            Self::Empty => "empty",
            Self::Button { .. } => "button",
            Self::Checkbox { .. } => "checkbox",
            Self::Slider { .. } => "slider",
            Self::TextInput { .. } => "text_input",
            Self::Selectbox { .. } => "selectbox",
            Self::DataEditor { .. } => "data_editor",
            Self::AudioInput { .. } => "audio_input",
        }
    }

    /// The embedded identifier, if this payload kind has one and it is set.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Text { .. } | Self::Markdown { .. } | Self::Alert { .. } | Self::Empty => None,
            Self::Chart { id, .. }
            | Self::Button { id, .. }
            | Self::Checkbox { id, .. }
            | Self::Slider { id, .. }
            | Self::TextInput { id, .. }
            | Self::Selectbox { id, .. }
            | Self::DataEditor { id, .. }
            | Self::AudioInput { id, .. } => id.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

/// A leaf node: one widget or output.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub payload: ElementPayload,
}

impl Element {
    /// Create an element from its payload.
    pub fn new(payload: ElementPayload) -> Self {
        Self { payload }
    }

    /// Best-effort stable key. `None` means this element cannot be tracked
    /// across generations.
    pub fn stable_key(&self) -> Option<StableKey> {
        StableKey::from_element(self)
    }
}

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// Layout metadata of a container block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    Vertical {
        #[serde(default)]
        border: bool,
    },
    Horizontal {
        #[serde(default)]
        gap: Option<String>,
    },
    Column {
        weight: f64,
    },
    Expander {
        label: String,
        #[serde(default)]
        expanded: bool,
    },
    TabContainer,
    Tab {
        label: String,
    },
    Form {
        form_id: String,
    },
    ChatMessage {
        name: String,
    },
}

impl BlockKind {
    /// The wire name of this block kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Vertical { .. } => "vertical",
            Self::Horizontal { .. } => "horizontal",
            Self::Column { .. } => "column",
            Self::Expander { .. } => "expander",
            Self::TabContainer => "tab_container",
            Self::Tab { .. } => "tab",
            Self::Form { .. } => "form",
            Self::ChatMessage { .. } => "chat_message",
        }
    }
}

/// A container node with ordered children. Child order is render order.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    pub children: Vec<Arc<Node>>,
}

impl Block {
    /// Create an empty block of the given kind.
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    /// An empty vertical block without border, the usual tree root.
    pub fn vertical() -> Self {
        Self::new(BlockKind::Vertical { border: false })
    }

    /// Append a child (builder).
    pub fn with_child(mut self, child: impl Into<Arc<Node>>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append several children (builder).
    pub fn with_children(mut self, children: impl IntoIterator<Item = Arc<Node>>) -> Self {
        self.children.extend(children);
        self
    }

    /// Ordered children.
    pub fn children(&self) -> &[Arc<Node>] {
        &self.children
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// One item in the backend-delivered tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Block(Block),
}

impl Node {
    /// Shorthand for a shared element node.
    pub fn element(payload: ElementPayload) -> Arc<Node> {
        Arc::new(Node::Element(Element::new(payload)))
    }

    /// Shorthand for a shared block node.
    pub fn block(block: Block) -> Arc<Node> {
        Arc::new(Node::Block(block))
    }

    /// The element, if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Block(_) => None,
        }
    }

    /// The block, if this node is one.
    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Node::Block(block) => Some(block),
            Node::Element(_) => None,
        }
    }

    /// `"element"` or `"block"`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Element(_) => "element",
            Node::Block(_) => "block",
        }
    }

    /// Stable key of this node. Blocks are never keyed.
    pub fn stable_key(&self) -> Option<StableKey> {
        match self {
            Node::Element(element) => element.stable_key(),
            Node::Block(_) => None,
        }
    }

    /// Ordered children; empty for elements.
    pub fn children(&self) -> &[Arc<Node>] {
        match self {
            Node::Block(block) => block.children(),
            Node::Element(_) => &[],
        }
    }

    /// Follow a non-empty child-index path from this node.
    ///
    /// Returns `None` for an empty path, if any index is out of range, or if
    /// the path descends through an element.
    pub fn descendant(&self, path: &[usize]) -> Option<&Arc<Node>> {
        let (&first, rest) = path.split_first()?;
        let mut current = self.children().get(first)?;
        for &index in rest {
            current = current.children().get(index)?;
        }
        Some(current)
    }

    /// Pre-order depth-first traversal, yielding each node with its path.
    pub fn walk_depth_first(&self) -> Vec<(NodePath, &Node)> {
        let mut result = Vec::new();
        let mut stack = vec![(NodePath::root(), self)];
        while let Some((path, node)) = stack.pop() {
            // Push children in reverse so the first child is visited first.
            for (index, child) in node.children().iter().enumerate().rev() {
                stack.push((path.child(index), child.as_ref()));
            }
            result.push((path, node));
        }
        result
    }

    /// All stable keys in the subtree, in depth-first order.
    pub fn keys(&self) -> Vec<StableKey> {
        self.walk_depth_first()
            .into_iter()
            .filter_map(|(_, node)| node.stable_key())
            .collect()
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<Block> for Node {
    fn from(block: Block) -> Self {
        Node::Block(block)
    }
}

impl From<Block> for Arc<Node> {
    fn from(block: Block) -> Self {
        Arc::new(Node::Block(block))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button(id: &str) -> Arc<Node> {
        Node::element(ElementPayload::Button {
            id: Some(id.into()),
            label: id.to_uppercase(),
        })
    }

    fn text(body: &str) -> Arc<Node> {
        Node::element(ElementPayload::Text { body: body.into() })
    }

    /// ```text
    ///        root
    ///      /  |   \
    ///    t0  col   b2
    ///       /   \
    ///     b10   t11
    /// ```
    fn build_tree() -> Arc<Node> {
        Block::vertical()
            .with_child(text("hello"))
            .with_child(
                Block::new(BlockKind::Column { weight: 1.0 })
                    .with_child(button("ok"))
                    .with_child(text("inner")),
            )
            .with_child(button("cancel"))
            .into()
    }

    #[test]
    fn payload_ids() {
        assert_eq!(
            ElementPayload::Slider {
                id: Some("s".into()),
                label: "S".into(),
                min: 0.0,
                max: 1.0,
                value: 0.5
            }
            .id(),
            Some("s")
        );
        assert_eq!(ElementPayload::Text { body: "x".into() }.id(), None);
        assert_eq!(ElementPayload::Empty.id(), None);
        assert_eq!(
            ElementPayload::Button {
                id: None,
                label: "B".into()
            }
            .id(),
            None
        );
    }

    #[test]
    fn type_names() {
        assert_eq!(ElementPayload::Empty.type_name(), "empty");
        assert_eq!(
            ElementPayload::TextInput {
                id: None,
                label: "x".into(),
                value: String::new()
            }
            .type_name(),
            "text_input"
        );
        assert_eq!(BlockKind::TabContainer.type_name(), "tab_container");
    }

    #[test]
    fn kind_discrimination() {
        let root = build_tree();
        assert_eq!(root.kind_name(), "block");
        assert!(root.as_block().is_some());
        assert!(root.as_element().is_none());
        let first = &root.children()[0];
        assert_eq!(first.kind_name(), "element");
        assert!(first.children().is_empty());
    }

    #[test]
    fn blocks_have_no_key() {
        let root = build_tree();
        assert!(root.stable_key().is_none());
        assert_eq!(
            root.children()[2].stable_key().map(|k| k.to_string()),
            Some("cancel".to_owned())
        );
    }

    #[test]
    fn descendant_lookup() {
        let root = build_tree();
        let ok = root.descendant(&[1, 0]).unwrap();
        assert_eq!(ok.stable_key().unwrap().as_str(), "ok");
        assert!(root.descendant(&[]).is_none());
        assert!(root.descendant(&[5]).is_none());
        // Elements have no children to descend into.
        assert!(root.descendant(&[0, 0]).is_none());
    }

    #[test]
    fn walk_depth_first_order() {
        let root = build_tree();
        let paths: Vec<Vec<usize>> = root
            .walk_depth_first()
            .into_iter()
            .map(|(path, _)| path.0)
            .collect();
        assert_eq!(
            paths,
            vec![vec![], vec![0], vec![1], vec![1, 0], vec![1, 1], vec![2]]
        );
    }

    #[test]
    fn keys_in_tree_order() {
        let root = build_tree();
        let keys: Vec<String> = root.keys().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["ok", "cancel"]);
    }
}
