//! In-memory resource store.
//!
//! Keeps live resources in a map guarded by an async lock. An optional
//! defaulter runs on every write, the way an API server fills in defaults
//! and status after accepting an object.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::patch::Patch;
use crate::resource::{ObjectKey, Resource};

use super::backend::ResourceStore;

/// Hook run on each written document.
pub type Defaulter = fn(&mut Value);

/// In-memory live resource store.
#[derive(Debug, Default)]
pub struct MemoryResourceStore {
    /// Live resources by identity.
    resources: RwLock<BTreeMap<ObjectKey, Resource>>,
    /// Server-side defaulting hook.
    defaulter: Option<Defaulter>,
}

impl MemoryResourceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the defaulting hook applied on every write.
    #[must_use]
    pub fn with_defaulter(mut self, defaulter: Defaulter) -> Self {
        self.defaulter = Some(defaulter);
        self
    }

    /// Returns the number of stored resources.
    pub async fn len(&self) -> usize {
        self.resources.read().await.len()
    }

    /// Returns true if the store holds no resources.
    pub async fn is_empty(&self) -> bool {
        self.resources.read().await.is_empty()
    }

    /// Returns the identities of all stored resources, sorted.
    pub async fn keys(&self) -> Vec<ObjectKey> {
        self.resources.read().await.keys().cloned().collect()
    }

    /// Runs the defaulter over a resource document.
    fn admit(&self, resource: &Resource) -> Result<Resource> {
        let Some(defaulter) = self.defaulter else {
            return Ok(resource.clone());
        };

        let mut doc = resource.to_value()?;
        defaulter(&mut doc);
        Resource::from_value(doc)
    }
}

#[async_trait]
impl ResourceStore for MemoryResourceStore {
    async fn get(&self, key: &ObjectKey) -> Result<Option<Resource>> {
        Ok(self.resources.read().await.get(key).cloned())
    }

    async fn create_or_update(&self, resource: &Resource) -> Result<()> {
        let key = ObjectKey::from_resource(resource)?;
        let admitted = self.admit(resource)?;

        debug!("Storing {key}");
        self.resources.write().await.insert(key, admitted);
        Ok(())
    }

    async fn apply_patch(&self, key: &ObjectKey, patch: &Patch) -> Result<()> {
        let mut resources = self.resources.write().await;

        let current = resources
            .get(key)
            .ok_or_else(|| StoreError::not_found(key.to_string()))?;

        let patched = Resource::from_value(patch.apply_to(&current.to_value()?))?;
        let admitted = self.admit(&patched)?;

        debug!("Patched {key}");
        resources.insert(key.clone(), admitted);
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn add_status(doc: &mut Value) {
        doc["status"] = json!({"observedGeneration": 1});
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemoryResourceStore::new();
        let resource = Resource::new("v1", "ConfigMap", Some("default"), "cm")
            .with_field("data", json!({"k": "v"}));

        store.create_or_update(&resource).await.expect("create");

        let key = ObjectKey::from_resource(&resource).expect("key");
        let live = store.get(&key).await.expect("get").expect("exists");
        assert_eq!(live, resource);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_defaulter_runs_on_write() {
        let store = MemoryResourceStore::new().with_defaulter(add_status);
        let resource = Resource::new("v1", "ConfigMap", None, "cm");

        store.create_or_update(&resource).await.expect("create");

        let key = ObjectKey::from_resource(&resource).expect("key");
        let live = store.get(&key).await.expect("get").expect("exists");
        assert_eq!(live.body["status"], json!({"observedGeneration": 1}));
    }

    #[tokio::test]
    async fn test_patch_missing_resource_is_not_found() {
        let store = MemoryResourceStore::new();
        let key = ObjectKey::new("ConfigMap", Some("default"), "absent");

        let err = store
            .apply_patch(&key, &Patch::merge(json!({"data": {}})))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_patch_merges_into_live() {
        let store = MemoryResourceStore::new();
        let resource = Resource::new("v1", "ConfigMap", None, "cm")
            .with_field("data", json!({"a": "1", "b": "2"}));
        store.create_or_update(&resource).await.expect("create");

        let key = ObjectKey::from_resource(&resource).expect("key");
        store
            .apply_patch(&key, &Patch::merge(json!({"data": {"a": "3"}})))
            .await
            .expect("patch");

        let live = store.get(&key).await.expect("get").expect("exists");
        assert_eq!(live.body["data"], json!({"a": "3", "b": "2"}));
    }
}
