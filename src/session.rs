//! Session: tree, renderer, reconcilers, and widget state for one frontend.
//!
//! [`Session`] applies backend updates, renders them through a
//! [`TreeRenderer`], and keeps widget values in sync with what is mounted.
//! [`Session::run`] drives it from channels on a single task.

use std::rc::Rc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{SessionError, TreeError};
use crate::reconcile::lifecycle::LifecycleEvent;
use crate::render::dispatch::Renderer;
use crate::render::tree::TreeRenderer;
use crate::state::widget_state::{StateChange, WidgetStates, WidgetValue};
use crate::tree::decode::parse_update;
use crate::tree::delta::{AppTree, Update};
use crate::tree::generation::Generation;
use crate::tree::key::StableKey;

// ---------------------------------------------------------------------------
// Interaction
// ---------------------------------------------------------------------------

/// A user interaction with a mounted widget.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    Set { key: StableKey, value: WidgetValue },
    Trigger { key: StableKey },
}

// ---------------------------------------------------------------------------
// SessionChannels
// ---------------------------------------------------------------------------

/// Channel ends for [`Session::run`].
#[derive(Debug)]
pub struct SessionChannels {
    pub update_tx: mpsc::Sender<Update>,
    pub update_rx: mpsc::Receiver<Update>,
    pub interaction_tx: mpsc::Sender<Interaction>,
    pub interaction_rx: mpsc::Receiver<Interaction>,
    pub change_tx: mpsc::Sender<Vec<StateChange>>,
    pub change_rx: mpsc::Receiver<Vec<StateChange>>,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One frontend's view of the backend-driven tree.
pub struct Session<R: Renderer> {
    config: SessionConfig,
    tree: AppTree,
    renderer: R,
    tree_renderer: TreeRenderer<R::Output>,
    states: WidgetStates,
    generation: Option<Generation>,
    output: Option<Rc<R::Output>>,
    events: Vec<LifecycleEvent>,
}

impl<R: Renderer> Session<R> {
    /// Create a session with default configuration.
    pub fn new(renderer: R) -> Self {
        Self::with_config(renderer, SessionConfig::default())
    }

    /// Create a session with the given configuration.
    pub fn with_config(renderer: R, config: SessionConfig) -> Self {
        Self {
            tree_renderer: TreeRenderer::with_config(config.reconciler.clone()),
            config,
            tree: AppTree::new(),
            renderer,
            states: WidgetStates::new(),
            generation: None,
            output: None,
            events: Vec::new(),
        }
    }

    /// Apply one update and render the resulting tree.
    ///
    /// A rejected update leaves the tree, the reconcilers, and the widget
    /// state untouched.
    pub fn handle(&mut self, update: Update) -> Result<Rc<R::Output>, TreeError> {
        self.tree.apply(&update.body)?;
        if self.generation.as_ref() != Some(&update.generation) {
            info!(generation = %update.generation, "new generation");
            self.generation = Some(update.generation.clone());
        }
        self.seed_defaults();

        let pass = self
            .tree_renderer
            .render(self.tree.root(), &update.generation, &mut self.renderer);

        if self.config.forget_evicted_state && !pass.evicted.is_empty() {
            let forgotten = self.states.forget(&pass.evicted);
            debug!(evicted = pass.evicted.len(), forgotten, "dropped state of evicted widgets");
        }
        self.events.extend(pass.events);
        self.output = Some(Rc::clone(&pass.root));
        Ok(pass.root)
    }

    /// Decode a JSON update message and [`handle`](Self::handle) it.
    pub fn handle_json(&mut self, json: &str) -> Result<Rc<R::Output>, TreeError> {
        let update = parse_update(json)?;
        self.handle(update)
    }

    /// Apply a user interaction to widget state.
    ///
    /// Interactions with keys that are not mounted (visible or hidden) are
    /// dropped. Returns whether the interaction was applied.
    pub fn interact(&mut self, interaction: Interaction) -> bool {
        let key = match &interaction {
            Interaction::Set { key, .. } | Interaction::Trigger { key } => key,
        };
        if !self.tree_renderer.is_mounted(key.as_str()) {
            warn!(%key, "interaction with unmounted widget ignored");
            return false;
        }
        match interaction {
            Interaction::Set { key, value } => {
                self.states.set(key, value);
            }
            Interaction::Trigger { key } => self.states.trigger(key),
        }
        true
    }

    /// Values of widgets in the current tree that declare one and have none yet.
    fn seed_defaults(&mut self) {
        for (_, node) in self.tree.root().walk_depth_first() {
            let Some(element) = node.as_element() else {
                continue;
            };
            let (Some(key), Some(value)) = (
                element.stable_key(),
                WidgetValue::default_for(&element.payload),
            ) else {
                continue;
            };
            self.states.insert_default(&key, value);
        }
    }

    /// Create channels sized by the session config.
    pub fn channels(&self) -> SessionChannels {
        let capacity = self.config.channel_capacity.max(1);
        let (update_tx, update_rx) = mpsc::channel(capacity);
        let (interaction_tx, interaction_rx) = mpsc::channel(capacity);
        let (change_tx, change_rx) = mpsc::channel(capacity);
        SessionChannels {
            update_tx,
            update_rx,
            interaction_tx,
            interaction_rx,
            change_tx,
            change_rx,
        }
    }

    /// Process updates and interactions until the update channel closes.
    ///
    /// Each step runs to completion before the next message is read. After
    /// every step, pending widget changes are sent as one batch. Interactions
    /// already queued when the update channel closes are still applied. A
    /// malformed update ends the loop with an error.
    pub async fn run(
        &mut self,
        mut updates: mpsc::Receiver<Update>,
        mut interactions: mpsc::Receiver<Interaction>,
        changes: mpsc::Sender<Vec<StateChange>>,
    ) -> Result<(), SessionError> {
        let mut interactions_open = true;

        loop {
            tokio::select! {
                biased;

                update = updates.recv() => match update {
                    Some(update) => {
                        self.handle(update)?;
                    }
                    None => break,
                },
                interaction = interactions.recv(), if interactions_open => match interaction {
                    Some(interaction) => {
                        self.interact(interaction);
                    }
                    None => interactions_open = false,
                },
            }

            self.flush_changes(&changes).await?;
        }

        if interactions_open {
            while let Ok(interaction) = interactions.try_recv() {
                self.interact(interaction);
            }
            self.flush_changes(&changes).await?;
        }

        debug!("update channel closed; session loop finished");
        Ok(())
    }

    async fn flush_changes(&mut self, changes: &mpsc::Sender<Vec<StateChange>>) -> Result<(), SessionError> {
        if self.states.has_pending() {
            let batch = self.states.drain_changes();
            changes
                .send(batch)
                .await
                .map_err(|_| SessionError::ChannelClosed)?;
        }
        Ok(())
    }

    // ── Accessors ───────────────────────────────────────────────────

    /// The current tree.
    pub fn tree(&self) -> &AppTree {
        &self.tree
    }

    /// The presentation renderer.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Per-block reconcilers for the current tree.
    pub fn tree_renderer(&self) -> &TreeRenderer<R::Output> {
        &self.tree_renderer
    }

    /// Widget values by stable key.
    pub fn states(&self) -> &WidgetStates {
        &self.states
    }

    /// The generation of the last successful update.
    pub fn generation(&self) -> Option<&Generation> {
        self.generation.as_ref()
    }

    /// Root output of the last successful update.
    pub fn output(&self) -> Option<Rc<R::Output>> {
        self.output.clone()
    }

    /// Drain pending widget changes without going through [`run`](Self::run).
    pub fn drain_changes(&mut self) -> Vec<StateChange> {
        self.states.drain_changes()
    }

    /// Drain lifecycle events accumulated across updates.
    pub fn take_events(&mut self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut self.events)
    }
}
