//! Test helpers: a plain-text renderer for assertions and snapshots.
//!
//! Use [`OutlineRenderer`] with a [`Session`](crate::session::Session) or
//! [`TreeRenderer`](crate::render::TreeRenderer) to get indented text output,
//! and [`outline_to_string`] to print a reconciler's mounted list.

pub mod outline;

pub use outline::{outline_to_string, OutlineRenderer};
