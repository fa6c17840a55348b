//! Local file-based resource store.
//!
//! Each live resource is one pretty-printed JSON file at
//! `<base>/<namespace>/<kind>/<name>.json`; cluster-scoped resources use the
//! `_cluster` namespace directory.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{ResourceError, Result, StoreError};
use crate::patch::Patch;
use crate::resource::{ObjectKey, Resource};

use super::backend::ResourceStore;

/// Directory used for cluster-scoped resources.
const CLUSTER_SCOPE_DIR: &str = "_cluster";

/// Local file-based resource store.
#[derive(Debug)]
pub struct LocalResourceStore {
    /// Base directory for resource files.
    base_dir: PathBuf,
}

impl LocalResourceStore {
    /// Creates a store rooted at `base_dir`.
    #[must_use]
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Returns the base directory.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolves the file holding a resource.
    fn resource_path(&self, key: &ObjectKey) -> Result<PathBuf> {
        let namespace = key.namespace.as_deref().unwrap_or(CLUSTER_SCOPE_DIR);
        for segment in [namespace, key.kind.as_str(), key.name.as_str()] {
            if segment.is_empty()
                || segment == "."
                || segment == ".."
                || segment.contains(['/', '\\'])
            {
                return Err(ResourceError::identity(format!(
                    "'{segment}' cannot be used as a path segment for {key}"
                ))
                .into());
            }
        }

        Ok(self
            .base_dir
            .join(namespace)
            .join(key.kind.to_lowercase())
            .join(format!("{}.json", key.name)))
    }

    /// Reads a resource file if it exists.
    async fn read(&self, path: &Path) -> Result<Option<Resource>> {
        if !fs::try_exists(path).await.map_err(|e| {
            StoreError::transport(format!("Failed to stat {}: {e}", path.display()))
        })? {
            return Ok(None);
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            StoreError::transport(format!("Failed to read {}: {e}", path.display()))
        })?;

        let resource: Resource = serde_json::from_str(&content).map_err(|e| StoreError::Corrupted {
            message: format!("Failed to parse {}: {e}", path.display()),
        })?;

        Ok(Some(resource))
    }

    /// Writes a resource file through a temp file and rename.
    async fn write(&self, path: &Path, resource: &Resource) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                StoreError::transport(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }

        let content = serde_json::to_string_pretty(resource)
            .map_err(crate::error::PatchError::from)?;

        let temp_path = path.with_extension("tmp");

        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            StoreError::transport(format!("Failed to create temp file: {e}"))
        })?;

        file.write_all(content.as_bytes()).await.map_err(|e| {
            StoreError::transport(format!("Failed to write resource file: {e}"))
        })?;

        file.sync_all().await.map_err(|e| {
            StoreError::transport(format!("Failed to sync resource file: {e}"))
        })?;

        fs::rename(&temp_path, path).await.map_err(|e| {
            StoreError::transport(format!("Failed to rename resource file: {e}"))
        })?;

        debug!("Wrote {}", path.display());
        Ok(())
    }
}

#[async_trait]
impl ResourceStore for LocalResourceStore {
    async fn get(&self, key: &ObjectKey) -> Result<Option<Resource>> {
        let path = self.resource_path(key)?;
        self.read(&path).await
    }

    async fn create_or_update(&self, resource: &Resource) -> Result<()> {
        let key = ObjectKey::from_resource(resource)?;
        let path = self.resource_path(&key)?;

        info!("Replacing {key}");
        self.write(&path, resource).await
    }

    async fn apply_patch(&self, key: &ObjectKey, patch: &Patch) -> Result<()> {
        let path = self.resource_path(key)?;
        let current = self
            .read(&path)
            .await?
            .ok_or_else(|| StoreError::not_found(key.to_string()))?;

        let patched = Resource::from_value(patch.apply_to(&current.to_value()?))?;

        info!("Patching {key}");
        self.write(&path, &patched).await
    }

    fn backend_type(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_store() -> (LocalResourceStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = LocalResourceStore::with_base_dir(temp_dir.path());
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_replace_and_get() {
        let (store, temp) = create_test_store();
        let resource = Resource::new("apps/v1", "Deployment", Some("default"), "svc")
            .with_field("spec", json!({"replicas": 2}));

        store.create_or_update(&resource).await.expect("replace");

        assert!(temp.path().join("default/deployment/svc.json").exists());

        let key = ObjectKey::from_resource(&resource).expect("key");
        let loaded = store.get(&key).await.expect("get").expect("exists");
        assert_eq!(loaded, resource);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let (store, _temp) = create_test_store();
        let key = ObjectKey::new("ConfigMap", None, "cm");

        assert!(store.get(&key).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_patch_keeps_unmanaged_fields() {
        let (store, _temp) = create_test_store();
        let resource = Resource::new("v1", "Service", Some("default"), "svc")
            .with_field("spec", json!({"port": 80, "clusterIP": "10.0.0.1"}));
        store.create_or_update(&resource).await.expect("replace");

        let key = ObjectKey::from_resource(&resource).expect("key");
        store
            .apply_patch(&key, &Patch::merge(json!({"spec": {"port": 8080}})))
            .await
            .expect("patch");

        let loaded = store.get(&key).await.expect("get").expect("exists");
        assert_eq!(loaded.body["spec"], json!({"port": 8080, "clusterIP": "10.0.0.1"}));
    }

    #[tokio::test]
    async fn test_patch_missing_is_not_found() {
        let (store, _temp) = create_test_store();
        let key = ObjectKey::new("Service", Some("default"), "svc");

        let err = store
            .apply_patch(&key, &Patch::merge(json!({})))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_corrupted_file() {
        let (store, temp) = create_test_store();
        let dir = temp.path().join("_cluster/configmap");
        std::fs::create_dir_all(&dir).expect("mkdir");
        std::fs::write(dir.join("cm.json"), "{not json").expect("write");

        let key = ObjectKey::new("ConfigMap", None, "cm");
        let err = store.get(&key).await.unwrap_err();
        assert!(err.to_string().contains("corrupted"));
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let (store, _temp) = create_test_store();
        let key = ObjectKey::new("ConfigMap", Some(".."), "cm");

        assert!(store.get(&key).await.is_err());
    }
}
