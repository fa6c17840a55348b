//! Positive merge patching of the desired set.
//!
//! Each resource is fetched fresh from the store, diffed against its
//! desired state with [`PositivePatchGenerator`], and patched in place.
//! A missing live resource fails the resource: patch mode never creates.

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::error::{DeployerError, Result, StoreError};
use crate::patch::PositivePatchGenerator;
use crate::resource::{ObjectKey, Resource, ResourceSet};
use crate::store::ResourceStore;

use super::action::{ActionSummary, PostAction};

/// Applies positive patches for each desired resource.
pub struct PatchApplier<'a> {
    store: &'a dyn ResourceStore,
    generator: PositivePatchGenerator,
}

/// What happened to one resource.
enum PatchOutcome {
    Patched,
    Unchanged,
}

impl<'a> PatchApplier<'a> {
    /// Creates an applier over `store`.
    #[must_use]
    pub const fn new(store: &'a dyn ResourceStore) -> Self {
        Self {
            store,
            generator: PositivePatchGenerator::new(),
        }
    }

    /// Patches every resource, in set order.
    ///
    /// # Errors
    ///
    /// Returns the first failure, tagged with the patch stage and the index
    /// of the failing resource. Later resources are not attempted.
    pub async fn patch_all(&self, resources: &ResourceSet) -> Result<ActionSummary> {
        let mut summary = ActionSummary::new(PatchResources::NAME);

        for (index, desired) in resources.iter().enumerate() {
            let key = ObjectKey::from_resource(desired)
                .map_err(|e| DeployerError::patch(index, desired.metadata.name.clone(), e))?;

            match self.patch_one(&key, desired).await {
                Ok(PatchOutcome::Patched) => summary.applied += 1,
                Ok(PatchOutcome::Unchanged) => summary.unchanged += 1,
                Err(e) => {
                    error!("Failed to patch {key}: {e}");
                    return Err(DeployerError::patch(index, key.to_string(), e));
                }
            }
        }

        Ok(summary)
    }

    async fn patch_one(&self, key: &ObjectKey, desired: &Resource) -> Result<PatchOutcome> {
        let live = self
            .store
            .get(key)
            .await?
            .ok_or_else(|| StoreError::not_found(key.to_string()))?;

        let patch = self.generator.compute_patch(&live, desired)?;
        if patch.is_empty() {
            debug!("{key} is up to date");
            return Ok(PatchOutcome::Unchanged);
        }

        debug!("Patch for {key}: {}", patch.data());
        info!("Patching {key}");
        self.store.apply_patch(key, &patch).await?;
        Ok(PatchOutcome::Patched)
    }
}

/// Post-action patching the whole desired set.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatchResources;

impl PatchResources {
    /// Action name.
    pub const NAME: &'static str = "patch";
}

#[async_trait]
impl PostAction for PatchResources {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn run(&self, resources: &ResourceSet, store: &dyn ResourceStore) -> Result<ActionSummary> {
        PatchApplier::new(store).patch_all(resources).await
    }
}
