//! Patch computation for the phase deployer.
//!
//! This module handles everything between two resource snapshots:
//! - Encoding documents and diffing encoded snapshots ([`PatchCodec`])
//! - Producing patches that never delete unmanaged fields ([`PositivePatchGenerator`])
//! - The [`Patch`] value handed to the live store

mod codec;
mod positive;

pub use codec::PatchCodec;
pub use positive::PositivePatchGenerator;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// How a patch delta is folded into its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchType {
    /// JSON merge patch.
    #[default]
    Merge,
}

impl PatchType {
    /// Returns the media type of the patch body.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Merge => "application/merge-patch+json",
        }
    }
}

impl std::fmt::Display for PatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Merge => write!(f, "merge"),
        }
    }
}

/// A structured delta plus the rule for applying it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    /// Patch type.
    #[serde(rename = "type")]
    patch_type: PatchType,
    /// Delta document.
    data: Value,
}

impl Patch {
    /// Creates a merge patch from a delta document.
    #[must_use]
    pub const fn merge(data: Value) -> Self {
        Self {
            patch_type: PatchType::Merge,
            data,
        }
    }

    /// Returns the patch type.
    #[must_use]
    pub const fn patch_type(&self) -> PatchType {
        self.patch_type
    }

    /// Returns the delta document.
    #[must_use]
    pub const fn data(&self) -> &Value {
        &self.data
    }

    /// Returns true if applying the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match &self.data {
            Value::Object(map) => map.is_empty(),
            Value::Null => true,
            _ => false,
        }
    }

    /// Encodes the delta document.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the delta cannot be encoded.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        PatchCodec::new().serialize(&self.data)
    }

    /// Applies the patch to a copy of `target`.
    #[must_use]
    pub fn apply_to(&self, target: &Value) -> Value {
        match self.patch_type {
            PatchType::Merge => PatchCodec::new().fold_apply(target.clone(), &self.data),
        }
    }
}
