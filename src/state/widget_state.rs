//! Widget values keyed by stable key, with change reporting.
//!
//! [`WidgetStates`] holds the current value of every interactive widget and
//! queues a [`StateChange`] each time a value changes. The queue is drained
//! and sent back to the backend. Trigger values (button clicks) are one-shot:
//! they are cleared once drained.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::tree::key::StableKey;
use crate::tree::node::ElementPayload;

// ---------------------------------------------------------------------------
// WidgetValue
// ---------------------------------------------------------------------------

/// Value held by one widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum WidgetValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    StringList(Vec<String>),
    /// One-shot event such as a button click.
    Trigger,
}

impl WidgetValue {
    /// The initial value a widget payload declares, if it has one.
    pub fn default_for(payload: &ElementPayload) -> Option<Self> {
        match payload {
            ElementPayload::Checkbox { value, .. } => Some(Self::Bool(*value)),
            ElementPayload::Slider { value, .. } => Some(Self::Float(*value)),
            ElementPayload::TextInput { value, .. } => Some(Self::String(value.clone())),
            ElementPayload::Selectbox { index, .. } => index.map(|i| Self::Int(i as i64)),
            _ => None,
        }
    }

    /// Whether this is a one-shot trigger value.
    pub fn is_trigger(&self) -> bool {
        matches!(self, Self::Trigger)
    }
}

// ---------------------------------------------------------------------------
// StateChange
// ---------------------------------------------------------------------------

/// One entry of the batch reported back to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    pub key: StableKey,
    /// `None` means the widget's value was cleared.
    pub value: Option<WidgetValue>,
}

// ---------------------------------------------------------------------------
// WidgetStates
// ---------------------------------------------------------------------------

/// Current widget values and the queue of unsent changes.
#[derive(Debug, Default)]
pub struct WidgetStates {
    values: HashMap<StableKey, WidgetValue>,
    /// Keys with unsent changes, in first-change order.
    pending: Vec<StableKey>,
}

impl WidgetStates {
    /// Create an empty state store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a widget's value. Returns `true` and queues a change if the value
    /// differs from the current one.
    pub fn set(&mut self, key: impl Into<StableKey>, value: WidgetValue) -> bool {
        let key = key.into();
        if !value.is_trigger() && self.values.get(&key) == Some(&value) {
            return false;
        }
        trace!(%key, ?value, "widget value changed");
        self.values.insert(key.clone(), value);
        self.mark_pending(key);
        true
    }

    /// Record a one-shot trigger (e.g. a click).
    pub fn trigger(&mut self, key: impl Into<StableKey>) {
        self.set(key, WidgetValue::Trigger);
    }

    /// Seed a value without reporting it. No-op if the key already has one.
    pub fn insert_default(&mut self, key: &StableKey, value: WidgetValue) {
        self.values.entry(key.clone()).or_insert(value);
    }

    /// Clear a widget's value, reporting the removal.
    pub fn clear(&mut self, key: &str) -> bool {
        match self.values.remove_entry(key) {
            Some((key, _)) => {
                self.mark_pending(key);
                true
            }
            None => false,
        }
    }

    /// The current value for `key`.
    pub fn get(&self, key: &str) -> Option<&WidgetValue> {
        self.values.get(key)
    }

    /// Drain all unsent changes, in the order keys first changed.
    ///
    /// Trigger values are removed once reported.
    pub fn drain_changes(&mut self) -> Vec<StateChange> {
        let pending = std::mem::take(&mut self.pending);
        let changes = pending
            .into_iter()
            .map(|key| {
                let value = self.values.get(&key).cloned();
                StateChange { key, value }
            })
            .collect();
        self.values.retain(|_, value| !value.is_trigger());
        changes
    }

    /// Drop values for keys that are no longer mounted. Not reported: the
    /// backend already knows the widgets are gone.
    pub fn forget<'a>(&mut self, keys: impl IntoIterator<Item = &'a StableKey>) -> usize {
        let mut forgotten = 0;
        for key in keys {
            if self.values.remove(key).is_some() {
                forgotten += 1;
            }
            self.pending.retain(|pending| pending != key);
        }
        forgotten
    }

    /// Whether changes are waiting to be drained.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Number of keys with a value.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no key has a value.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn mark_pending(&mut self, key: StableKey) {
        if !self.pending.contains(&key) {
            self.pending.push(key);
        }
    }
}
