//! Reconciler: keyed render-output cache with generational eviction.

pub mod entry;
pub mod lifecycle;
pub mod reconciler;

pub use entry::{Mounted, Visibility};
pub use lifecycle::{LifecycleEvent, LifecycleTracker};
pub use reconciler::{Reconciled, Reconciler};
