//! Tree renderer: one reconciler per block, driven depth-first.
//!
//! Blocks carry no key, so they are rendered again on every pass; what
//! survives is the reconciler attached to each block's position in the tree,
//! which keeps the block's keyed children (and their output) alive. All block
//! reconcilers age on the renderer's epoch, including blocks missing from the
//! current tree.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::ReconcilerConfig;
use crate::error::NodePath;
use crate::reconcile::entry::Mounted;
use crate::reconcile::lifecycle::LifecycleEvent;
use crate::reconcile::reconciler::Reconciler;
use crate::tree::generation::Generation;
use crate::tree::key::StableKey;
use crate::tree::node::{Block, Node};

use super::dispatch::Renderer;

/// Output of one [`TreeRenderer::render`] call.
#[derive(Debug)]
pub struct RenderPass<O> {
    pub root: Rc<O>,
    /// Hidden outputs whose block is missing from the current tree. They are
    /// still mounted and must be kept alive until evicted.
    pub detached: Vec<Mounted<O>>,
    /// Keys that are no longer mounted anywhere in the tree.
    pub evicted: Vec<StableKey>,
    /// Lifecycle events for the whole tree, in block visiting order.
    pub events: Vec<LifecycleEvent>,
}

#[derive(Debug)]
struct BlockSlot<O> {
    reconciler: Reconciler<O>,
    last_pass: u64,
}

/// Renders whole trees while preserving keyed output across generations.
#[derive(Debug)]
pub struct TreeRenderer<O> {
    config: ReconcilerConfig,
    blocks: HashMap<NodePath, BlockSlot<O>>,
    generation: Option<Generation>,
    /// Distinct generations seen.
    epoch: u64,
    /// Calls to `render`.
    pass: u64,
}

impl<O> TreeRenderer<O> {
    /// Create a tree renderer with the default reconciler configuration.
    pub fn new() -> Self {
        Self::with_config(ReconcilerConfig::default())
    }

    /// Create a tree renderer whose block reconcilers use `config`.
    pub fn with_config(config: ReconcilerConfig) -> Self {
        Self {
            config,
            blocks: HashMap::new(),
            generation: None,
            epoch: 0,
            pass: 0,
        }
    }

    /// Render `root` for `generation`.
    pub fn render<R>(&mut self, root: &Arc<Node>, generation: &Generation, renderer: &mut R) -> RenderPass<O>
    where
        R: Renderer<Output = O>,
    {
        if self.generation.as_ref() != Some(generation) {
            self.epoch += 1;
            self.generation = Some(generation.clone());
        }
        self.pass += 1;

        let mounted_before: HashSet<StableKey> = self
            .blocks
            .values()
            .flat_map(|slot| slot.reconciler.keys())
            .collect();

        let mut evicted = Vec::new();
        let mut events = Vec::new();
        let output = self.render_node(root, &NodePath::root(), renderer, &mut evicted, &mut events);
        let detached = self.sweep_unvisited(&mut evicted, &mut events);

        // A key that moved to another block is evicted from its old one but
        // still alive.
        evicted.retain(|key| !self.is_mounted(key.as_str()));
        evicted.sort();
        evicted.dedup();

        RenderPass {
            root: Rc::new(output),
            detached,
            evicted,
            events: self.settle_events(events, &mounted_before),
        }
    }

    fn render_node<R>(
        &mut self,
        node: &Node,
        path: &NodePath,
        renderer: &mut R,
        evicted: &mut Vec<StableKey>,
        events: &mut Vec<LifecycleEvent>,
    ) -> O
    where
        R: Renderer<Output = O>,
    {
        match node {
            Node::Element(element) => renderer.render_element(element, element.stable_key().as_ref()),
            Node::Block(block) => self.render_block(block, path, renderer, evicted, events),
        }
    }

    fn render_block<R>(
        &mut self,
        block: &Block,
        path: &NodePath,
        renderer: &mut R,
        evicted: &mut Vec<StableKey>,
        events: &mut Vec<LifecycleEvent>,
    ) -> O
    where
        R: Renderer<Output = O>,
    {
        let (epoch, pass) = (self.epoch, self.pass);
        // Take the slot out so child blocks can recurse through `self`.
        let mut slot = self.blocks.remove(path).unwrap_or_else(|| BlockSlot {
            reconciler: Reconciler::with_config(self.config.clone()),
            last_pass: pass,
        });
        slot.last_pass = pass;

        let reconciled = slot
            .reconciler
            .reconcile_at(block.children(), epoch, |index, child, key| match child {
                Node::Element(element) => renderer.render_element(element, key),
                Node::Block(_) => self.render_node(child, &path.child(index), renderer, evicted, events),
            });

        evicted.extend(reconciled.evicted.iter().cloned());
        events.extend(slot.reconciler.take_events());
        self.blocks.insert(path.clone(), slot);

        renderer.render_block(block, &reconciled.mounted)
    }

    /// Age the reconcilers of blocks missing from this pass. Returns their
    /// hidden outputs; a reconciler left empty is dropped.
    fn sweep_unvisited(&mut self, evicted: &mut Vec<StableKey>, events: &mut Vec<LifecycleEvent>) -> Vec<Mounted<O>> {
        let (epoch, pass) = (self.epoch, self.pass);
        let mut unvisited: Vec<NodePath> = self
            .blocks
            .iter()
            .filter(|(_, slot)| slot.last_pass != pass)
            .map(|(path, _)| path.clone())
            .collect();
        unvisited.sort();

        let mut detached = Vec::new();
        for path in unvisited {
            let Some(slot) = self.blocks.get_mut(&path) else {
                continue;
            };
            let swept = slot.reconciler.sweep_at(epoch);
            evicted.extend(swept.evicted);
            events.extend(slot.reconciler.take_events());
            detached.extend(swept.mounted);

            if slot.reconciler.is_empty() {
                self.blocks.remove(&path);
                debug!(%path, "dropped block reconciler");
            } else {
                trace!(%path, retained = slot.reconciler.len(), "block absent; children hidden");
            }
        }
        detached
    }

    /// Merge per-block events into one stream per key. A key that moved
    /// between blocks shows up as an update, not as mount plus unmount.
    fn settle_events(&self, events: Vec<LifecycleEvent>, mounted_before: &HashSet<StableKey>) -> Vec<LifecycleEvent> {
        events
            .into_iter()
            .filter_map(|event| match event {
                LifecycleEvent::Unmount { key } if self.is_mounted(key.as_str()) => None,
                LifecycleEvent::Hide { key } if self.is_visible(key.as_str()) => None,
                LifecycleEvent::Mount { key } if mounted_before.contains(&key) => {
                    Some(LifecycleEvent::Update { key })
                }
                other => Some(other),
            })
            .collect()
    }

    /// Whether `key` is retained by any block.
    pub fn is_mounted(&self, key: &str) -> bool {
        self.blocks.values().any(|slot| slot.reconciler.contains_key(key))
    }

    /// Whether `key` is retained and visible in some block.
    pub fn is_visible(&self, key: &str) -> bool {
        self.blocks
            .values()
            .any(|slot| slot.reconciler.contains_key(key) && !slot.reconciler.is_hidden(key))
    }

    /// The reconciler attached to the block at `path`, if any.
    pub fn reconciler(&self, path: &NodePath) -> Option<&Reconciler<O>> {
        self.blocks.get(path).map(|slot| &slot.reconciler)
    }

    /// Number of blocks with a live reconciler.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Drop all retained state. Returns every key that was mounted.
    pub fn reset(&mut self) -> Vec<StableKey> {
        let mut keys: Vec<StableKey> = self
            .blocks
            .drain()
            .flat_map(|(_, mut slot)| slot.reconciler.clear())
            .collect();
        keys.sort();
        keys.dedup();
        self.generation = None;
        keys
    }
}

impl<O> Default for TreeRenderer<O> {
    fn default() -> Self {
        Self::new()
    }
}
