//! Renderer dispatch and whole-tree rendering.

pub mod dispatch;
pub mod tree;

pub use dispatch::Renderer;
pub use tree::{RenderPass, TreeRenderer};
