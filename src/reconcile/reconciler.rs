//! Keyed reconciliation with generational eviction.
//!
//! A [`Reconciler`] owns the rendered output of one parent's keyed children.
//! Each pass receives that parent's current children and returns what should
//! be mounted: the current children in order, then any entries that vanished
//! recently and are kept mounted but hidden until their grace period runs out.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;

use slotmap::SlotMap;
use tracing::{debug, trace, warn};

use crate::config::ReconcilerConfig;
use crate::tree::generation::Generation;
use crate::tree::key::StableKey;
use crate::tree::node::Node;

use super::entry::{Entry, EntryId, Mounted};
use super::lifecycle::{LifecycleEvent, LifecycleTracker};

/// Result of one reconciliation pass.
#[derive(Debug)]
pub struct Reconciled<R> {
    /// Visible outputs in input order, followed by hidden retained outputs.
    pub mounted: Vec<Mounted<R>>,
    /// Keys whose entries were dropped during this pass.
    pub evicted: Vec<StableKey>,
}

impl<R> Reconciled<R> {
    /// Iterate only the visible outputs.
    pub fn visible(&self) -> impl Iterator<Item = &Mounted<R>> {
        self.mounted.iter().filter(|m| m.is_visible())
    }

    /// Iterate only the hidden retained outputs.
    pub fn hidden(&self) -> impl Iterator<Item = &Mounted<R>> {
        self.mounted.iter().filter(|m| !m.is_visible())
    }
}

/// Cache of keyed render output with a generational grace period.
///
/// Single-threaded: outputs are shared as `Rc<R>`.
#[derive(Debug)]
pub struct Reconciler<R> {
    config: ReconcilerConfig,
    entries: SlotMap<EntryId, Entry<R>>,
    index: HashMap<StableKey, EntryId>,
    /// Entry insertion order; hidden entries are emitted in this order.
    order: Vec<EntryId>,
    generation: Option<Generation>,
    /// Number of distinct generations seen so far.
    epoch: u64,
    lifecycle: LifecycleTracker,
}

impl<R> Reconciler<R> {
    /// Create a reconciler with the default one-generation grace period.
    pub fn new() -> Self {
        Self::with_config(ReconcilerConfig::default())
    }

    /// Create a reconciler with the given configuration.
    pub fn with_config(config: ReconcilerConfig) -> Self {
        Self {
            config,
            entries: SlotMap::with_key(),
            index: HashMap::new(),
            order: Vec::new(),
            generation: None,
            epoch: 0,
            lifecycle: LifecycleTracker::new(),
        }
    }

    /// The configuration this reconciler was created with.
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Reconcile one parent's children for `generation`.
    ///
    /// `render` is called for every un-keyed node, every new key, and every
    /// key whose node changed since the last pass. Reused entries are not
    /// rendered again.
    pub fn reconcile<F>(
        &mut self,
        children: &[Arc<Node>],
        generation: &Generation,
        mut render: F,
    ) -> Reconciled<R>
    where
        F: FnMut(&Node, Option<&StableKey>) -> R,
    {
        self.advance(generation);
        let epoch = self.epoch;
        self.reconcile_at(children, epoch, |_, node, key| render(node, key))
    }

    /// Reconcile against an epoch counted by the caller.
    ///
    /// Used when several reconcilers must age together even though some of
    /// them are not visited in every generation. `render` also receives the
    /// child's index in `children`. The epoch never moves backwards, and
    /// [`generation`](Self::generation) is not updated.
    pub fn reconcile_at<F>(&mut self, children: &[Arc<Node>], epoch: u64, mut render: F) -> Reconciled<R>
    where
        F: FnMut(usize, &Node, Option<&StableKey>) -> R,
    {
        self.epoch = self.epoch.max(epoch);

        let mut mounted = Vec::with_capacity(children.len());
        let mut claimed: HashSet<EntryId> = HashSet::with_capacity(children.len());

        for (position, node) in children.iter().enumerate() {
            let Some(key) = node.stable_key() else {
                mounted.push(Mounted::visible(Rc::new(render(position, node, None)), None));
                continue;
            };

            match self.index.get(&key).copied() {
                Some(id) if claimed.contains(&id) => {
                    warn!(%key, "duplicate key in one pass; rendering occurrence unkeyed");
                    mounted.push(Mounted::visible(Rc::new(render(position, node, None)), None));
                }
                Some(id) => {
                    claimed.insert(id);
                    let entry = &mut self.entries[id];
                    if Arc::ptr_eq(&entry.node, node) {
                        trace!(%key, "reusing output");
                    } else {
                        trace!(%key, "node changed; rendering");
                        entry.output = Rc::new(render(position, node, Some(&key)));
                        entry.node = Arc::clone(node);
                        self.lifecycle.on_update(&key);
                    }
                    entry.last_seen = self.epoch;
                    if entry.hidden {
                        entry.hidden = false;
                        self.lifecycle.on_show(&key);
                    }
                    mounted.push(Mounted::visible(Rc::clone(&entry.output), Some(key)));
                }
                None => {
                    trace!(%key, "new key; rendering");
                    let output = Rc::new(render(position, node, Some(&key)));
                    let id = self.entries.insert(Entry {
                        key: key.clone(),
                        node: Arc::clone(node),
                        output: Rc::clone(&output),
                        last_seen: self.epoch,
                        hidden: false,
                    });
                    self.index.insert(key.clone(), id);
                    self.order.push(id);
                    claimed.insert(id);
                    self.lifecycle.on_mount(&key);
                    mounted.push(Mounted::visible(output, Some(key)));
                }
            }
        }

        let evicted = self.sweep(&claimed, &mut mounted);
        Reconciled { mounted, evicted }
    }

    /// Age every entry to `epoch` as if the parent had no children.
    ///
    /// For a parent that is absent from the current tree: entries within the
    /// grace period come back hidden, the rest are evicted.
    pub fn sweep_at(&mut self, epoch: u64) -> Reconciled<R> {
        self.epoch = self.epoch.max(epoch);
        let mut mounted = Vec::new();
        let evicted = self.sweep(&HashSet::new(), &mut mounted);
        Reconciled { mounted, evicted }
    }

    /// Hide or evict every entry not claimed in this pass.
    fn sweep(&mut self, claimed: &HashSet<EntryId>, mounted: &mut Vec<Mounted<R>>) -> Vec<StableKey> {
        let grace = u64::from(self.config.grace_generations);
        let mut evicted = Vec::new();

        for &id in &self.order {
            if claimed.contains(&id) {
                continue;
            }
            let Some(entry) = self.entries.get_mut(id) else {
                continue;
            };
            if self.epoch - entry.last_seen <= grace {
                if !entry.hidden {
                    entry.hidden = true;
                    self.lifecycle.on_hide(&entry.key);
                }
                mounted.push(Mounted::hidden(Rc::clone(&entry.output), entry.key.clone()));
            } else {
                evicted.push(entry.key.clone());
            }
        }

        for key in &evicted {
            if let Some(id) = self.index.remove(key) {
                self.entries.remove(id);
            }
            self.lifecycle.on_unmount(key);
        }
        if !evicted.is_empty() {
            let entries = &self.entries;
            self.order.retain(|&id| entries.contains_key(id));
            debug!(count = evicted.len(), epoch = self.epoch, "evicted stale entries");
        }
        evicted
    }

    fn advance(&mut self, generation: &Generation) {
        if self.generation.as_ref() != Some(generation) {
            self.epoch += 1;
            self.generation = Some(generation.clone());
            debug!(%generation, epoch = self.epoch, retained = self.entries.len(), "new generation");
        }
    }

    /// Drop every entry, recording an unmount for each. Returns the dropped keys.
    pub fn clear(&mut self) -> Vec<StableKey> {
        let mut keys = Vec::with_capacity(self.order.len());
        for id in self.order.drain(..) {
            if let Some(entry) = self.entries.remove(id) {
                self.lifecycle.on_unmount(&entry.key);
                keys.push(entry.key);
            }
        }
        self.index.clear();
        keys
    }

    /// The generation of the most recent [`reconcile`](Self::reconcile) pass.
    pub fn generation(&self) -> Option<&Generation> {
        self.generation.as_ref()
    }

    /// Number of retained entries, visible or hidden.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry is retained.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `key` is retained, visible or hidden.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Whether `key` is retained but currently hidden.
    pub fn is_hidden(&self, key: &str) -> bool {
        self.index
            .get(key)
            .and_then(|&id| self.entries.get(id))
            .is_some_and(|entry| entry.hidden)
    }

    /// The stored output for `key`, if retained.
    pub fn output(&self, key: &str) -> Option<Rc<R>> {
        let id = self.index.get(key)?;
        self.entries.get(*id).map(|entry| Rc::clone(&entry.output))
    }

    /// Retained keys in insertion order.
    pub fn keys(&self) -> Vec<StableKey> {
        self.order
            .iter()
            .filter_map(|&id| self.entries.get(id))
            .map(|entry| entry.key.clone())
            .collect()
    }

    /// Drain lifecycle events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<LifecycleEvent> {
        self.lifecycle.take_events()
    }
}

impl<R> Default for Reconciler<R> {
    fn default() -> Self {
        Self::new()
    }
}
