//! Reconciler and session configuration.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// ReconcilerConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`Reconciler`](crate::reconcile::Reconciler).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// How many generations a keyed entry stays mounted (hidden) after it
    /// stops appearing. `0` evicts as soon as a new generation omits the key.
    pub grace_generations: u32,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            grace_generations: 1,
        }
    }
}

impl ReconcilerConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grace period (builder).
    pub fn with_grace_generations(mut self, generations: u32) -> Self {
        self.grace_generations = generations;
        self
    }
}

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`Session`](crate::session::Session).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Applied to every per-block reconciler.
    pub reconciler: ReconcilerConfig,
    /// Drop widget state for keys the reconciler evicts.
    pub forget_evicted_state: bool,
    /// Capacity of the channels created by [`Session::channels`](crate::session::Session::channels).
    pub channel_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reconciler: ReconcilerConfig::default(),
            forget_evicted_state: true,
            channel_capacity: 64,
        }
    }
}

impl SessionConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reconciler config (builder).
    pub fn with_reconciler(mut self, reconciler: ReconcilerConfig) -> Self {
        self.reconciler = reconciler;
        self
    }

    /// Keep or drop evicted widget state (builder).
    pub fn with_forget_evicted_state(mut self, forget: bool) -> Self {
        self.forget_evicted_state = forget;
        self
    }

    /// Set the channel capacity (builder). Clamped to at least 1.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
