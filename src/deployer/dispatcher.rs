//! Phase dispatcher.
//!
//! Decides, from the entity phase alone, how the desired set reaches the
//! store. While the entity is initialising or deploying, resources are
//! replaced wholesale. Once it runs, they are patched with positive merge
//! patches so server-side defaults survive. The chosen strategy is
//! registered as a post-action so it sees the final desired set.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{DeployerConfig, DeploymentKind};
use crate::error::Result;

use super::action::ReconcilePass;
use super::applier::PatchResources;
use super::phase::Phase;
use super::replacer::ReplaceResources;

/// Phases in which the deployer takes part.
const ACTIVE_PHASES: [Phase; 3] = [Phase::Initializing, Phase::Deploying, Phase::Running];

/// How the desired set is written to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Full create-or-update.
    Replace,
    /// Positive merge patch.
    Patch,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Replace => "replace",
            Self::Patch => "patch",
        };
        write!(f, "{s}")
    }
}

/// Selects and registers the write strategy for a pass.
#[derive(Debug, Clone, Default)]
pub struct PhaseDispatcher {
    config: DeployerConfig,
}

impl PhaseDispatcher {
    /// Creates a dispatcher with the given configuration.
    #[must_use]
    pub const fn new(config: DeployerConfig) -> Self {
        Self { config }
    }

    /// Returns the configured deployment kind.
    #[must_use]
    pub const fn kind(&self) -> Option<DeploymentKind> {
        self.config.kind
    }

    /// The deployer is part of the platform set and always installed.
    #[must_use]
    pub const fn is_platform(&self) -> bool {
        true
    }

    /// Returns true if the dispatcher applies to an entity in `phase`.
    #[must_use]
    pub fn configure(&self, phase: &Phase) -> bool {
        if !self.config.enabled {
            warn!("Deployer is disabled, skipping phase {phase}");
            return false;
        }

        let applicable = phase.is_one_of(&ACTIVE_PHASES);
        if !applicable {
            debug!("Deployer not applicable in phase {phase}");
        }
        applicable
    }

    /// Returns the strategy used for `phase`, if any.
    #[must_use]
    pub const fn strategy_for(phase: &Phase) -> Option<Strategy> {
        match phase {
            Phase::Initializing | Phase::Deploying => Some(Strategy::Replace),
            Phase::Running => Some(Strategy::Patch),
            Phase::Error | Phase::Other(_) => None,
        }
    }

    /// Registers the post-action matching the pass phase.
    ///
    /// Registers exactly one action for an active phase and nothing
    /// otherwise. Never fails; store errors surface when the action runs.
    ///
    /// # Errors
    ///
    /// Currently infallible.
    pub fn apply(&self, pass: &mut ReconcilePass) -> Result<Option<Strategy>> {
        let strategy = Self::strategy_for(pass.phase());

        match strategy {
            Some(Strategy::Replace) => {
                info!("Phase {}: registering replace of desired resources", pass.phase());
                pass.register(Box::new(ReplaceResources));
            }
            Some(Strategy::Patch) => {
                info!("Phase {}: registering patch of desired resources", pass.phase());
                pass.register(Box::new(PatchResources));
            }
            None => debug!("Phase {}: nothing to register", pass.phase()),
        }

        Ok(strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{ObjectKey, Resource, ResourceSet};
    use crate::store::{MemoryResourceStore, ResourceStore};

    fn registered(phase: Phase) -> Vec<&'static str> {
        let mut pass = ReconcilePass::new(phase, ResourceSet::new());
        PhaseDispatcher::default().apply(&mut pass).expect("apply");
        pass.post_actions().names()
    }

    #[test]
    fn test_configure_active_phases() {
        let dispatcher = PhaseDispatcher::default();

        assert!(dispatcher.configure(&Phase::Initializing));
        assert!(dispatcher.configure(&Phase::Deploying));
        assert!(dispatcher.configure(&Phase::Running));
        assert!(!dispatcher.configure(&Phase::Error));
        assert!(!dispatcher.configure(&Phase::from("Building Kit")));
    }

    #[test]
    fn test_platform_component() {
        assert!(PhaseDispatcher::default().is_platform());
    }

    #[test]
    fn test_disabled_never_applies() {
        let dispatcher = PhaseDispatcher::new(DeployerConfig {
            enabled: false,
            kind: None,
        });

        assert!(!dispatcher.configure(&Phase::Running));
    }

    #[test]
    fn test_phase_routing() {
        assert_eq!(registered(Phase::Initializing), vec![ReplaceResources::NAME]);
        assert_eq!(registered(Phase::Deploying), vec![ReplaceResources::NAME]);
        assert_eq!(registered(Phase::Running), vec![PatchResources::NAME]);
        assert!(registered(Phase::Error).is_empty());
        assert!(registered(Phase::from("Waiting For Platform")).is_empty());
    }

    #[tokio::test]
    async fn test_action_sees_resources_added_after_apply() {
        let store = MemoryResourceStore::new();
        let mut pass = ReconcilePass::new(Phase::Deploying, ResourceSet::new());

        PhaseDispatcher::default().apply(&mut pass).expect("apply");
        pass.resources_mut()
            .push(Resource::new("v1", "ConfigMap", Some("default"), "late"));

        pass.run_post_actions(&store).await.expect("drain");

        let key = ObjectKey::new("ConfigMap", Some("default"), "late");
        assert!(store.get(&key).await.expect("get").is_some());
    }
}
