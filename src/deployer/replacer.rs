//! Full create-or-update of the desired set.

use async_trait::async_trait;
use tracing::{error, info};

use crate::error::{DeployerError, Result};
use crate::resource::{ObjectKey, ResourceSet};
use crate::store::ResourceStore;

use super::action::{ActionSummary, PostAction};

/// Replaces each desired resource in the live store.
pub struct ResourceReplacer<'a> {
    store: &'a dyn ResourceStore,
}

impl<'a> ResourceReplacer<'a> {
    /// Creates a replacer over `store`.
    #[must_use]
    pub const fn new(store: &'a dyn ResourceStore) -> Self {
        Self { store }
    }

    /// Creates or fully replaces every resource, in set order.
    ///
    /// Not transactional: resources before a failure stay applied and the
    /// resources after it are not attempted.
    ///
    /// # Errors
    ///
    /// Returns the first failure, tagged with the replace stage and the
    /// index of the failing resource.
    pub async fn replace_all(&self, resources: &ResourceSet) -> Result<ActionSummary> {
        let mut summary = ActionSummary::new(ReplaceResources::NAME);

        for (index, resource) in resources.iter().enumerate() {
            let key = ObjectKey::from_resource(resource)
                .map_err(|e| DeployerError::replace(index, resource.metadata.name.clone(), e))?;

            info!("Replacing resource #{index}: {key}");
            if let Err(e) = self.store.create_or_update(resource).await {
                error!("Failed to replace {key}: {e}");
                return Err(DeployerError::replace(index, key.to_string(), e));
            }
            summary.applied += 1;
        }

        Ok(summary)
    }
}

/// Post-action replacing the whole desired set.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReplaceResources;

impl ReplaceResources {
    /// Action name.
    pub const NAME: &'static str = "replace";
}

#[async_trait]
impl PostAction for ReplaceResources {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn run(&self, resources: &ResourceSet, store: &dyn ResourceStore) -> Result<ActionSummary> {
        ResourceReplacer::new(store).replace_all(resources).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Stage, StoreError};
    use crate::patch::Patch;
    use crate::resource::Resource;
    use crate::store::MemoryResourceStore;
    use mockall::mock;
    use mockall::predicate::function;

    mock! {
        Store {}

        #[async_trait]
        impl ResourceStore for Store {
            async fn get(&self, key: &ObjectKey) -> Result<Option<Resource>>;
            async fn create_or_update(&self, resource: &Resource) -> Result<()>;
            async fn apply_patch(&self, key: &ObjectKey, patch: &Patch) -> Result<()>;
            fn backend_type(&self) -> &'static str;
        }
    }

    fn three_config_maps() -> ResourceSet {
        ["a", "b", "c"]
            .into_iter()
            .map(|name| Resource::new("v1", "ConfigMap", Some("default"), name))
            .collect()
    }

    #[tokio::test]
    async fn test_replace_all_in_order() {
        let store = MemoryResourceStore::new();
        let summary = ResourceReplacer::new(&store)
            .replace_all(&three_config_maps())
            .await
            .expect("replace");

        assert_eq!(summary.applied, 3);
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_resources() {
        let mut store = MockStore::new();
        let mut seq = mockall::Sequence::new();
        store
            .expect_create_or_update()
            .with(function(|r: &Resource| r.metadata.name == "a"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        store
            .expect_create_or_update()
            .with(function(|r: &Resource| r.metadata.name == "b"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(StoreError::transport("connection refused").into()));

        let err = ResourceReplacer::new(&store)
            .replace_all(&three_config_maps())
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Some(Stage::Replace));
        assert_eq!(err.failed_index(), Some(1));
        assert!(err.to_string().contains("ConfigMap/default/b"));
    }

    #[tokio::test]
    async fn test_identity_failure_is_tagged() {
        let store = MemoryResourceStore::new();
        let set: ResourceSet = vec![
            Resource::new("v1", "ConfigMap", None, "ok"),
            Resource::new("v1", "", None, "nameless-kind"),
        ]
        .into();

        let err = ResourceReplacer::new(&store).replace_all(&set).await.unwrap_err();

        assert_eq!(err.failed_index(), Some(1));
        assert_eq!(store.len().await, 1);
    }
}
