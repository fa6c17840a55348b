//! Resource identity.

use serde::{Deserialize, Serialize};

use crate::error::{ResourceError, Result};

use super::types::Resource;

/// Identity of a resource in the live store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectKey {
    /// Resource kind.
    pub kind: String,
    /// Namespace, `None` for cluster-scoped resources.
    pub namespace: Option<String>,
    /// Resource name.
    pub name: String,
}

impl ObjectKey {
    /// Creates a key from its parts.
    #[must_use]
    pub fn new(kind: &str, namespace: Option<&str>, name: &str) -> Self {
        Self {
            kind: kind.to_string(),
            namespace: namespace.map(String::from),
            name: name.to_string(),
        }
    }

    /// Derives the key of a resource.
    ///
    /// An empty namespace is treated as cluster-scoped.
    ///
    /// # Errors
    ///
    /// Returns an identity resolution error if the kind or name is empty.
    pub fn from_resource(resource: &Resource) -> Result<Self> {
        if resource.kind.trim().is_empty() {
            return Err(ResourceError::identity(format!(
                "resource '{}' has no kind",
                resource.metadata.name
            ))
            .into());
        }
        if resource.metadata.name.trim().is_empty() {
            return Err(ResourceError::identity(format!(
                "{} resource has no metadata.name",
                resource.kind
            ))
            .into());
        }

        Ok(Self {
            kind: resource.kind.clone(),
            namespace: resource
                .metadata
                .namespace
                .clone()
                .filter(|ns| !ns.is_empty()),
            name: resource.metadata.name.clone(),
        })
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}/{}", self.kind, ns, self.name),
            None => write!(f, "{}/{}", self.kind, self.name),
        }
    }
}
