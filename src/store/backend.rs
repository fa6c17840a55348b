//! Resource store trait definition.
//!
//! This module defines the common interface for live resource backends.

use async_trait::async_trait;

use crate::error::Result;
use crate::patch::Patch;
use crate::resource::{ObjectKey, Resource};

/// Trait for live resource backends.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Fetches the current state of a resource.
    ///
    /// Returns `None` if no resource exists for `key`.
    async fn get(&self, key: &ObjectKey) -> Result<Option<Resource>>;

    /// Creates the resource, or fully replaces it if it exists.
    async fn create_or_update(&self, resource: &Resource) -> Result<()>;

    /// Applies a patch to an existing resource.
    ///
    /// Fails with a not-found error if the resource does not exist.
    async fn apply_patch(&self, key: &ObjectKey, patch: &Patch) -> Result<()>;

    /// Gets the backend type name.
    fn backend_type(&self) -> &'static str;
}

#[async_trait]
impl ResourceStore for Box<dyn ResourceStore> {
    async fn get(&self, key: &ObjectKey) -> Result<Option<Resource>> {
        (**self).get(key).await
    }

    async fn create_or_update(&self, resource: &Resource) -> Result<()> {
        (**self).create_or_update(resource).await
    }

    async fn apply_patch(&self, key: &ObjectKey, patch: &Patch) -> Result<()> {
        (**self).apply_patch(key, patch).await
    }

    fn backend_type(&self) -> &'static str {
        (**self).backend_type()
    }
}
