//! Resource document types.
//!
//! A [`Resource`] keeps its identity fields typed and everything else as an
//! open JSON body, so fields the desired manifest never set (status, server
//! defaults, bookkeeping metadata) survive a fetch and are visible to the
//! patch generator.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{PatchError, Result};

/// An addressable resource document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    /// API group/version of the resource.
    #[serde(rename = "apiVersion", default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    /// Resource kind (e.g. `Deployment`).
    #[serde(default)]
    pub kind: String,
    /// Identity and bookkeeping metadata.
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// All remaining top-level fields, kept verbatim.
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

/// Resource metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ObjectMeta {
    /// Resource name.
    #[serde(default)]
    pub name: String,
    /// Namespace, `None` for cluster-scoped resources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Any other metadata (labels, annotations, resourceVersion, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource {
    /// Creates an empty resource with the given identity.
    #[must_use]
    pub fn new(api_version: &str, kind: &str, namespace: Option<&str>, name: &str) -> Self {
        Self {
            api_version: api_version.to_string(),
            kind: kind.to_string(),
            metadata: ObjectMeta {
                name: name.to_string(),
                namespace: namespace.map(String::from),
                extra: Map::new(),
            },
            body: Map::new(),
        }
    }

    /// Sets a top-level body field.
    #[must_use]
    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.body.insert(key.to_string(), value);
        self
    }

    /// Converts the resource into its document form.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be encoded.
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| PatchError::from(e).into())
    }

    /// Builds a resource from its document form.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a resource object.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| PatchError::from(e).into())
    }
}
