//! Keyed widget lifecycle: mount, update, hide, show, unmount.
//!
//! The `LifecycleTracker` records which keys are currently mounted (and which
//! of those are hidden) and accumulates lifecycle events that the caller can
//! drain after each reconciliation pass.

use std::collections::HashSet;

use crate::tree::key::StableKey;

// ---------------------------------------------------------------------------
// LifecycleEvent
// ---------------------------------------------------------------------------

/// Events that occur while reconciling keyed elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// First time this key was rendered.
    Mount { key: StableKey },
    /// Same key, new node: the output was rendered again.
    Update { key: StableKey },
    /// The key disappeared but its output stays mounted, invisibly.
    Hide { key: StableKey },
    /// A hidden key reappeared.
    Show { key: StableKey },
    /// The key was evicted and its output dropped.
    Unmount { key: StableKey },
}

impl LifecycleEvent {
    /// The key this event is about.
    pub fn key(&self) -> &StableKey {
        match self {
            Self::Mount { key }
            | Self::Update { key }
            | Self::Hide { key }
            | Self::Show { key }
            | Self::Unmount { key } => key,
        }
    }
}

// ---------------------------------------------------------------------------
// LifecycleTracker
// ---------------------------------------------------------------------------

/// Tracks mounted and hidden keys and queues lifecycle events.
///
/// Every transition is idempotent: repeating one produces no duplicate event.
#[derive(Debug, Default)]
pub struct LifecycleTracker {
    mounted: HashSet<StableKey>,
    hidden: HashSet<StableKey>,
    pending: Vec<LifecycleEvent>,
}

impl LifecycleTracker {
    /// Create a new, empty lifecycle tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a key has been mounted (visible).
    pub fn on_mount(&mut self, key: &StableKey) {
        if self.mounted.insert(key.clone()) {
            self.pending.push(LifecycleEvent::Mount { key: key.clone() });
        }
    }

    /// Record a re-render of a mounted key. No-op if not mounted.
    pub fn on_update(&mut self, key: &StableKey) {
        if self.mounted.contains(key) {
            self.pending.push(LifecycleEvent::Update { key: key.clone() });
        }
    }

    /// Record that a mounted key is now hidden.
    pub fn on_hide(&mut self, key: &StableKey) {
        if self.mounted.contains(key) && self.hidden.insert(key.clone()) {
            self.pending.push(LifecycleEvent::Hide { key: key.clone() });
        }
    }

    /// Record that a hidden key is visible again.
    pub fn on_show(&mut self, key: &StableKey) {
        if self.hidden.remove(key) {
            self.pending.push(LifecycleEvent::Show { key: key.clone() });
        }
    }

    /// Record that a key has been unmounted. No-op if not mounted.
    pub fn on_unmount(&mut self, key: &StableKey) {
        self.hidden.remove(key);
        if self.mounted.remove(key) {
            self.pending.push(LifecycleEvent::Unmount { key: key.clone() });
        }
    }

    /// Whether `key` is mounted, visible or hidden.
    pub fn is_mounted(&self, key: &str) -> bool {
        self.mounted.contains(key)
    }

    /// Whether `key` is mounted but hidden.
    pub fn is_hidden(&self, key: &str) -> bool {
        self.hidden.contains(key)
    }

    /// Number of mounted keys.
    pub fn mounted_count(&self) -> usize {
        self.mounted.len()
    }

    /// Drain and return all pending lifecycle events, in order of occurrence.
    pub fn take_events(&mut self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Whether events are waiting to be drained.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> StableKey {
        StableKey::from(s)
    }

    #[test]
    fn new_tracker_is_empty() {
        let tracker = LifecycleTracker::new();
        assert_eq!(tracker.mounted_count(), 0);
        assert!(!tracker.has_pending());
    }

    #[test]
    fn double_mount_is_noop() {
        let mut tracker = LifecycleTracker::new();
        tracker.on_mount(&key("a"));
        tracker.on_mount(&key("a"));
        assert_eq!(tracker.mounted_count(), 1);
        assert_eq!(tracker.take_events().len(), 1);
    }

    #[test]
    fn update_unmounted_is_noop() {
        let mut tracker = LifecycleTracker::new();
        tracker.on_update(&key("ghost"));
        assert!(!tracker.has_pending());
    }

    #[test]
    fn hide_requires_mount() {
        let mut tracker = LifecycleTracker::new();
        tracker.on_hide(&key("a"));
        assert!(!tracker.is_hidden("a"));
        assert!(!tracker.has_pending());
    }

    #[test]
    fn hide_show_cycle() {
        let mut tracker = LifecycleTracker::new();
        let a = key("a");
        tracker.on_mount(&a);
        tracker.on_hide(&a);
        tracker.on_hide(&a);
        assert!(tracker.is_hidden("a"));
        tracker.on_show(&a);
        tracker.on_show(&a);
        assert!(!tracker.is_hidden("a"));
        assert!(tracker.is_mounted("a"));

        assert_eq!(
            tracker.take_events(),
            vec![
                LifecycleEvent::Mount { key: a.clone() },
                LifecycleEvent::Hide { key: a.clone() },
                LifecycleEvent::Show { key: a },
            ]
        );
    }

    #[test]
    fn unmount_clears_hidden() {
        let mut tracker = LifecycleTracker::new();
        let a = key("a");
        tracker.on_mount(&a);
        tracker.on_hide(&a);
        tracker.on_unmount(&a);
        assert!(!tracker.is_mounted("a"));
        assert!(!tracker.is_hidden("a"));
        let events = tracker.take_events();
        assert_eq!(events.last(), Some(&LifecycleEvent::Unmount { key: a }));
    }

    #[test]
    fn take_events_drains() {
        let mut tracker = LifecycleTracker::new();
        tracker.on_mount(&key("a"));
        tracker.on_mount(&key("b"));
        assert_eq!(tracker.take_events().len(), 2);
        assert!(tracker.take_events().is_empty());
    }

    #[test]
    fn event_key_accessor() {
        let event = LifecycleEvent::Hide { key: key("x") };
        assert_eq!(event.key().as_str(), "x");
    }
}
