//! Tree model: immutable, shareable block/element trees.

pub mod decode;
pub mod delta;
pub mod generation;
pub mod key;
pub mod node;

pub use decode::{decode_tree, parse_tree, parse_update};
pub use delta::{AppTree, Delta, Update, UpdateBody};
pub use generation::Generation;
pub use key::StableKey;
pub use node::{AlertLevel, Block, BlockKind, Element, ElementPayload, Node};
