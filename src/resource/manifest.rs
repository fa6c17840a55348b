//! Desired resource sets and manifest loading.
//!
//! Manifests are multi-document YAML or JSON. A JSON array, or any
//! document whose kind ends in `List` with an `items` array, expands into
//! its items in order.

use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{DeployerError, ResourceError, Result};

use super::key::ObjectKey;
use super::types::Resource;

/// Ordered set of desired resources for one reconciliation pass.
///
/// Order is the reconciliation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceSet {
    items: Vec<Resource>,
}

impl ResourceSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Appends a resource at the end of the reconciliation order.
    pub fn push(&mut self, resource: Resource) {
        self.items.push(resource);
    }

    /// Returns the resources in reconciliation order.
    #[must_use]
    pub fn items(&self) -> &[Resource] {
        &self.items
    }

    /// Iterates the resources in reconciliation order.
    pub fn iter(&self) -> std::slice::Iter<'_, Resource> {
        self.items.iter()
    }

    /// Returns the number of resources.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Resolves the identity of every resource, in order.
    ///
    /// # Errors
    ///
    /// Returns the first identity resolution failure.
    pub fn keys(&self) -> Result<Vec<ObjectKey>> {
        self.items.iter().map(ObjectKey::from_resource).collect()
    }
}

impl From<Vec<Resource>> for ResourceSet {
    fn from(items: Vec<Resource>) -> Self {
        Self { items }
    }
}

impl FromIterator<Resource> for ResourceSet {
    fn from_iter<I: IntoIterator<Item = Resource>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ResourceSet {
    type Item = &'a Resource;
    type IntoIter = std::slice::Iter<'a, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Loader for manifest files.
#[derive(Debug, Default)]
pub struct ManifestLoader;

impl ManifestLoader {
    /// Creates a new manifest loader.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Loads a resource set from a YAML or JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<ResourceSet> {
        let path = path.as_ref();
        info!("Loading manifests from: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|e| ResourceError::ManifestParse {
            message: format!("Failed to read file: {e}"),
            location: Some(path.display().to_string()),
        })?;

        self.parse(&content, Some(path))
    }

    /// Loads a single resource from a YAML or JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not hold exactly one resource.
    pub fn load_one(&self, path: impl AsRef<Path>) -> Result<Resource> {
        let path = path.as_ref();
        let set = self.load_file(path)?;
        let mut items = set.items.into_iter();

        match (items.next(), items.next()) {
            (Some(resource), None) => Ok(resource),
            _ => Err(ResourceError::ManifestParse {
                message: String::from("expected exactly one resource"),
                location: Some(path.display().to_string()),
            }
            .into()),
        }
    }

    /// Parses a resource set from manifest text.
    ///
    /// # Errors
    ///
    /// Returns an error if any document is not a resource.
    pub fn parse(&self, content: &str, source: Option<&Path>) -> Result<ResourceSet> {
        let location = source.map(|p| p.display().to_string());
        let parse_error = |message: String| -> DeployerError {
            ResourceError::ManifestParse {
                message,
                location: location.clone(),
            }
            .into()
        };

        let mut documents = Vec::new();
        for document in serde_yaml::Deserializer::from_str(content) {
            let yaml = serde_yaml::Value::deserialize(document)
                .map_err(|e| parse_error(format!("YAML parse error: {e}")))?;
            if yaml.is_null() {
                continue;
            }
            let json = serde_json::to_value(yaml)
                .map_err(|e| parse_error(format!("Unsupported document: {e}")))?;
            documents.push(json);
        }

        let mut set = ResourceSet::new();
        for document in documents {
            Self::expand(document, &mut set).map_err(|e| parse_error(e.to_string()))?;
        }

        debug!("Parsed {} resources", set.len());
        Ok(set)
    }

    /// Expands list documents and appends resources to `set`.
    fn expand(document: Value, set: &mut ResourceSet) -> Result<()> {
        match document {
            Value::Array(items) => {
                for item in items {
                    Self::expand(item, set)?;
                }
            }
            Value::Object(mut map) => {
                let is_list = map
                    .get("kind")
                    .and_then(Value::as_str)
                    .is_some_and(|kind| kind.ends_with("List"));
                if is_list && let Some(Value::Array(items)) = map.remove("items") {
                    for item in items {
                        Self::expand(item, set)?;
                    }
                } else {
                    set.push(Resource::from_value(Value::Object(map))?);
                }
            }
            other => {
                return Err(ResourceError::ManifestParse {
                    message: format!("expected a resource object, found {other}"),
                    location: None,
                }
                .into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_multi_document_yaml() {
        let content = r"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: svc
  namespace: default
spec:
  replicas: 2
---
apiVersion: v1
kind: Service
metadata:
  name: svc
  namespace: default
---
";
        let set = ManifestLoader::new().parse(content, None).expect("parse");

        assert_eq!(set.len(), 2);
        assert_eq!(set.items()[0].kind, "Deployment");
        assert_eq!(set.items()[0].body["spec"], json!({"replicas": 2}));
        assert_eq!(set.items()[1].kind, "Service");
    }

    #[test]
    fn test_parse_json_list_kind() {
        let content = r#"{
            "apiVersion": "v1",
            "kind": "List",
            "items": [
                {"apiVersion": "v1", "kind": "ConfigMap", "metadata": {"name": "a"}},
                {"apiVersion": "v1", "kind": "ConfigMap", "metadata": {"name": "b"}}
            ]
        }"#;
        let set = ManifestLoader::new().parse(content, None).expect("parse");

        let names: Vec<_> = set.iter().map(|r| r.metadata.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_rejects_scalar_document() {
        let result = ManifestLoader::new().parse("42", None);
        assert!(result.is_err());
    }

    #[test]
    fn test_keys_preserve_order() {
        let set: ResourceSet = vec![
            Resource::new("v1", "ConfigMap", Some("ns"), "b"),
            Resource::new("v1", "ConfigMap", Some("ns"), "a"),
        ]
        .into_iter()
        .collect();

        let keys = set.keys().expect("keys");
        assert_eq!(keys[0].name, "b");
        assert_eq!(keys[1].name, "a");
    }

    #[test]
    fn test_load_one_requires_single_resource() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("two.yaml");
        std::fs::write(
            &path,
            "kind: ConfigMap\nmetadata:\n  name: a\n---\nkind: ConfigMap\nmetadata:\n  name: b\n",
        )
        .expect("write");

        assert!(ManifestLoader::new().load_one(&path).is_err());
    }
}
