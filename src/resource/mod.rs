//! Resource model for the phase deployer.
//!
//! This module defines the addressable resource documents the deployer
//! reconciles:
//! - [`Resource`]: a manifest (desired) or a fetched copy (live)
//! - [`ObjectKey`]: the kind + namespace/name identity of a resource
//! - [`ResourceSet`]: the ordered desired set for one reconciliation pass

mod key;
mod manifest;
mod types;

pub use key::ObjectKey;
pub use manifest::{ManifestLoader, ResourceSet};
pub use types::{ObjectMeta, Resource};
