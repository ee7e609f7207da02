//! # blockview
//!
//! State-preserving core of a backend-driven UI. A backend delivers a tree of
//! layout *blocks* and leaf *elements* (widgets, charts, outputs) once per
//! *generation*; blockview decides which previously rendered widgets can be
//! kept, so interactive state survives reordering and brief absences.
//!
//! ## Core Systems
//!
//! - **[`tree`]** — Immutable `Arc`-shared node tree, JSON decoding, delta application
//! - **[`reconcile`]** — Keyed render-output cache with one-generation grace eviction
//! - **[`render`]** — `Renderer` dispatch and the per-block `TreeRenderer`
//! - **[`state`]** — Widget values keyed by stable key, change batches for the backend
//! - **[`session`]** — Ties tree, rendering, and state together; async update loop
//! - **[`config`]** — Reconciler and session configuration
//! - **[`error`]** — `TreeError`, `SessionError`
//! - **[`testing`]** — Outline renderer for assertions and snapshots
//!
//! ## Example
//!
//! ```
//! use blockview::reconcile::Reconciler;
//! use blockview::tree::{ElementPayload, Node};
//!
//! let slider = Node::element(ElementPayload::Slider {
//!     id: Some("volume".into()),
//!     label: "Volume".into(),
//!     min: 0.0,
//!     max: 11.0,
//!     value: 3.0,
//! });
//!
//! let mut reconciler = Reconciler::new();
//! let render = |_: &Node, key: Option<&blockview::tree::StableKey>| format!("{key:?}");
//!
//! let first = reconciler.reconcile(&[slider.clone()], &"run-1".into(), render);
//! let second = reconciler.reconcile(&[slider], &"run-2".into(), render);
//! assert!(std::rc::Rc::ptr_eq(&first.mounted[0].output, &second.mounted[0].output));
//! ```

// Foundation
pub mod config;
pub mod error;

// Core systems
pub mod reconcile;
pub mod render;
pub mod tree;

// State and driving loop
pub mod session;
pub mod state;

// Test helpers
pub mod testing;

pub use error::{NodePath, SessionError, TreeError};
pub use session::{Interaction, Session};
