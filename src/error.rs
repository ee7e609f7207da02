//! Error types for tree decoding, delta application, and the session loop.

use std::fmt;

/// A child-index path from the root block to a node.
///
/// `[]` is the root itself, `[2, 0]` is the first child of the root's third child.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(pub Vec<usize>);

impl NodePath {
    /// The root path.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Return a new path extended by one child index.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// The path as a slice of child indices.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{index}")?;
        }
        f.write_str("]")
    }
}

/// Errors raised while building or modifying a node tree.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("malformed node at {path}: {reason}")]
    MalformedNode { path: NodePath, reason: String },
    #[error("invalid payload at {path}: {message}")]
    InvalidPayload { path: NodePath, message: String },
    #[error("tree root must be a block")]
    RootNotBlock,
    #[error("delta path must not be empty")]
    EmptyDeltaPath,
    #[error("delta path {path} does not address a child slot")]
    InvalidDeltaPath { path: NodePath },
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from the session update loop.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error("state change channel closed")]
    ChannelClosed,
}
