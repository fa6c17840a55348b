//! Reconciliation pass driver.
//!
//! One pass brings the live store toward the desired set for one entity:
//! the dispatcher is configured from the entity phase, registers its
//! strategy on the pass, and the pass drains its post-actions against the
//! store. The driver never retries; a failed pass is reported and the
//! caller re-runs the whole pass on a later trigger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::config::{DeploymentKind, ResourceHasher};
use crate::deployer::{ActionSummary, Phase, PhaseDispatcher, ReconcilePass, Strategy};
use crate::error::Result;
use crate::resource::ResourceSet;
use crate::store::ResourceStore;

/// The object under reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity name.
    pub name: String,
    /// Entity namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Current lifecycle phase.
    pub phase: Phase,
}

impl Entity {
    /// Creates an entity.
    #[must_use]
    pub fn new(name: &str, namespace: Option<&str>, phase: Phase) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.map(String::from),
            phase,
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{ns}/{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Drives reconciliation passes against a store.
pub struct Reconciler<'a, S: ResourceStore> {
    /// Live store.
    store: &'a S,
    /// Phase dispatcher.
    dispatcher: &'a PhaseDispatcher,
    /// Desired-set hasher.
    hasher: ResourceHasher,
}

/// Result of a reconciliation pass.
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    /// Unique pass identifier.
    pub pass_id: Uuid,
    /// Entity reconciled.
    pub entity: String,
    /// Entity phase at the start of the pass.
    pub phase: Phase,
    /// Strategy used, `None` when the deployer did not apply.
    pub strategy: Option<Strategy>,
    /// Configured deployment kind.
    pub kind: Option<DeploymentKind>,
    /// Number of desired resources.
    pub resources: usize,
    /// Fingerprint of the desired set.
    pub desired_hash: String,
    /// Per post-action outcomes, in execution order.
    pub actions: Vec<ActionSummary>,
    /// When the pass started.
    pub started_at: DateTime<Utc>,
    /// When the pass finished.
    pub finished_at: DateTime<Utc>,
}

impl<'a, S: ResourceStore> Reconciler<'a, S> {
    /// Creates a new reconciler.
    #[must_use]
    pub const fn new(store: &'a S, dispatcher: &'a PhaseDispatcher) -> Self {
        Self {
            store,
            dispatcher,
            hasher: ResourceHasher::new(),
        }
    }

    /// Runs one reconciliation pass.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a post-action, tagged with its
    /// stage and the index of the failing resource.
    pub async fn run_pass(&self, entity: &Entity, resources: ResourceSet) -> Result<PassReport> {
        let started_at = Utc::now();
        let pass_id = Uuid::new_v4();
        let desired_hash = self.hasher.hash_set(&resources)?;

        info!(
            %pass_id,
            "Starting pass for {entity} in phase {} ({} resources, {})",
            entity.phase,
            resources.len(),
            ResourceHasher::short_hash(&desired_hash)
        );

        let mut report = PassReport {
            pass_id,
            entity: entity.to_string(),
            phase: entity.phase.clone(),
            strategy: None,
            kind: self.dispatcher.kind(),
            resources: resources.len(),
            desired_hash,
            actions: vec![],
            started_at,
            finished_at: started_at,
        };

        if !self.dispatcher.configure(&entity.phase) {
            info!(%pass_id, "Deployer not applicable, pass is a no-op");
            report.finished_at = Utc::now();
            return Ok(report);
        }

        let mut pass = ReconcilePass::new(entity.phase.clone(), resources);
        report.strategy = self.dispatcher.apply(&mut pass)?;

        match pass.run_post_actions(self.store).await {
            Ok(actions) => report.actions = actions,
            Err(e) => {
                error!(%pass_id, "Pass for {entity} failed: {e}");
                return Err(e);
            }
        }

        report.finished_at = Utc::now();
        info!(%pass_id, "Pass for {entity} finished");
        Ok(report)
    }
}

impl PassReport {
    /// Returns the number of resources written to the store.
    #[must_use]
    pub fn applied(&self) -> usize {
        self.actions.iter().map(|a| a.applied).sum()
    }

    /// Returns the number of resources already up to date.
    #[must_use]
    pub fn unchanged(&self) -> usize {
        self.actions.iter().map(|a| a.unchanged).sum()
    }
}

impl std::fmt::Display for PassReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Pass {} for {} ({}):", self.pass_id, self.entity, self.phase)?;
        match self.strategy {
            Some(strategy) => writeln!(f, "  Strategy: {strategy}")?,
            None => writeln!(f, "  Strategy: none (not applicable)")?,
        }
        writeln!(f, "  Resources: {}", self.resources)?;
        writeln!(f, "  Applied: {}", self.applied())?;
        writeln!(f, "  Unchanged: {}", self.unchanged())?;
        Ok(())
    }
}
