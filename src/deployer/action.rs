//! Post-actions and the per-pass action queue.
//!
//! Components that must wait for the full desired set register a
//! [`PostAction`] on the pass. The queue is owned by the [`ReconcilePass`]
//! and drained once, after desired-resource generation finishes, in
//! registration order.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::resource::ResourceSet;
use crate::store::ResourceStore;

use super::phase::Phase;

/// A unit of work deferred until the desired set is final.
#[async_trait]
pub trait PostAction: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Runs the action over the full desired set.
    async fn run(&self, resources: &ResourceSet, store: &dyn ResourceStore) -> Result<ActionSummary>;
}

/// Outcome of one post-action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionSummary {
    /// Action name.
    pub action: &'static str,
    /// Resources written to the store.
    pub applied: usize,
    /// Resources already up to date.
    pub unchanged: usize,
}

impl ActionSummary {
    /// Creates an empty summary for `action`.
    #[must_use]
    pub const fn new(action: &'static str) -> Self {
        Self {
            action,
            applied: 0,
            unchanged: 0,
        }
    }
}

/// Ordered queue of post-actions.
#[derive(Default)]
pub struct PostActionQueue {
    actions: Vec<Box<dyn PostAction>>,
}

impl PostActionQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an action.
    pub fn register(&mut self, action: Box<dyn PostAction>) {
        debug!("Registered post-action: {}", action.name());
        self.actions.push(action);
    }

    /// Returns the number of pending actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns true if no action is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Returns the names of pending actions, in order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.actions.iter().map(|a| a.name()).collect()
    }

    /// Runs every pending action in registration order.
    ///
    /// The queue is emptied before the first action runs, so each action
    /// executes at most once.
    ///
    /// # Errors
    ///
    /// Returns the first action error; later actions are not run.
    pub async fn drain(
        &mut self,
        resources: &ResourceSet,
        store: &dyn ResourceStore,
    ) -> Result<Vec<ActionSummary>> {
        let actions = std::mem::take(&mut self.actions);
        let mut summaries = Vec::with_capacity(actions.len());

        for action in actions {
            info!("Running post-action: {}", action.name());
            summaries.push(action.run(resources, store).await?);
        }

        Ok(summaries)
    }
}

impl std::fmt::Debug for PostActionQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostActionQueue")
            .field("actions", &self.names())
            .finish()
    }
}

/// Context of one reconciliation pass.
#[derive(Debug)]
pub struct ReconcilePass {
    /// Phase of the entity at the start of the pass.
    phase: Phase,
    /// Desired resources for this pass.
    resources: ResourceSet,
    /// Deferred actions.
    post_actions: PostActionQueue,
}

impl ReconcilePass {
    /// Creates a pass over a desired set.
    #[must_use]
    pub fn new(phase: Phase, resources: ResourceSet) -> Self {
        Self {
            phase,
            resources,
            post_actions: PostActionQueue::new(),
        }
    }

    /// Returns the entity phase.
    #[must_use]
    pub const fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Returns the desired resources.
    #[must_use]
    pub const fn resources(&self) -> &ResourceSet {
        &self.resources
    }

    /// Returns the desired resources for late additions.
    pub const fn resources_mut(&mut self) -> &mut ResourceSet {
        &mut self.resources
    }

    /// Returns the post-action queue.
    #[must_use]
    pub const fn post_actions(&self) -> &PostActionQueue {
        &self.post_actions
    }

    /// Registers a post-action.
    pub fn register(&mut self, action: Box<dyn PostAction>) {
        self.post_actions.register(action);
    }

    /// Drains the post-action queue against `store`.
    ///
    /// # Errors
    ///
    /// Returns the first failing action's error.
    pub async fn run_post_actions(&mut self, store: &dyn ResourceStore) -> Result<Vec<ActionSummary>> {
        self.post_actions.drain(&self.resources, store).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeployerError;
    use crate::store::MemoryResourceStore;
    use std::sync::Arc;
    use std::sync::Mutex;

    struct Recording {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
        fail: bool,
    }

    #[async_trait]
    impl PostAction for Recording {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn run(&self, _: &ResourceSet, _: &dyn ResourceStore) -> Result<ActionSummary> {
            self.log.lock().expect("lock").push(self.name);
            if self.fail {
                return Err(DeployerError::internal("failed"));
            }
            Ok(ActionSummary::new(self.name))
        }
    }

    fn recording(name: &'static str, log: &Arc<Mutex<Vec<&'static str>>>, fail: bool) -> Box<dyn PostAction> {
        Box::new(Recording {
            name,
            log: Arc::clone(log),
            fail,
        })
    }

    #[tokio::test]
    async fn test_drain_runs_in_order_once() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let store = MemoryResourceStore::new();
        let mut pass = ReconcilePass::new(Phase::Running, ResourceSet::new());
        pass.register(recording("first", &log, false));
        pass.register(recording("second", &log, false));

        let summaries = pass.run_post_actions(&store).await.expect("drain");
        assert_eq!(summaries.len(), 2);
        assert!(pass.post_actions().is_empty());

        pass.run_post_actions(&store).await.expect("drain");
        assert_eq!(*log.lock().expect("lock"), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_drain_stops_at_first_error() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let store = MemoryResourceStore::new();
        let mut queue = PostActionQueue::new();
        queue.register(recording("bad", &log, true));
        queue.register(recording("never", &log, false));

        assert!(queue.drain(&ResourceSet::new(), &store).await.is_err());
        assert_eq!(*log.lock().expect("lock"), vec!["bad"]);
    }
}
