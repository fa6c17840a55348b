//! Desired-set fingerprints.
//!
//! A fingerprint identifies the exact desired set a pass worked on, so pass
//! reports and logs from different runs can be correlated.

use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::patch::PatchCodec;
use crate::resource::{Resource, ResourceSet};

/// Hasher for desired resources.
#[derive(Debug, Default)]
pub struct ResourceHasher {
    codec: PatchCodec,
}

impl ResourceHasher {
    /// Creates a new hasher.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            codec: PatchCodec::new(),
        }
    }

    /// Computes the hash of a single resource.
    ///
    /// Key order inside the body does not affect the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be encoded.
    pub fn hash_resource(&self, resource: &Resource) -> Result<String> {
        // Value objects are BTreeMap-backed, so the encoding is key-sorted.
        let bytes = self.codec.serialize(&resource.to_value()?)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }

    /// Computes the hash of a desired set; order matters.
    ///
    /// # Errors
    ///
    /// Returns an error if any resource cannot be encoded.
    pub fn hash_set(&self, resources: &ResourceSet) -> Result<String> {
        let mut hasher = Sha256::new();
        for resource in resources {
            hasher.update(self.hash_resource(resource)?.as_bytes());
        }
        Ok(hex::encode(hasher.finalize()))
    }

    /// Computes a short hash (first 8 characters) for display purposes.
    #[must_use]
    pub fn short_hash(hash: &str) -> String {
        hash.chars().take(8).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config_map(name: &str) -> Resource {
        Resource::new("v1", "ConfigMap", Some("default"), name)
            .with_field("data", json!({"a": "1", "b": "2"}))
    }

    #[test]
    fn test_hash_deterministic() {
        let hasher = ResourceHasher::new();
        let set: ResourceSet = vec![config_map("a")].into();

        assert_eq!(
            hasher.hash_set(&set).expect("hash"),
            hasher.hash_set(&set).expect("hash")
        );
    }

    #[test]
    fn test_order_changes_hash() {
        let hasher = ResourceHasher::new();
        let ab: ResourceSet = vec![config_map("a"), config_map("b")].into();
        let ba: ResourceSet = vec![config_map("b"), config_map("a")].into();

        assert_ne!(hasher.hash_set(&ab).expect("hash"), hasher.hash_set(&ba).expect("hash"));
    }

    #[test]
    fn test_short_hash() {
        let short = ResourceHasher::short_hash("abcdef1234567890");
        assert_eq!(short, "abcdef12");
    }
}
