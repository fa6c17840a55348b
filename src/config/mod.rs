//! Configuration module for the phase deployer.
//!
//! This module handles all configuration-related functionality:
//! - Parsing and deserializing `phase-deployer.yaml`
//! - Validation of settings and manifest sets
//! - Fingerprinting desired sets for pass reports

mod hash;
mod parser;
mod spec;
mod validator;

pub use hash::ResourceHasher;
pub use parser::{ConfigParser, DEFAULT_CONFIG_FILES, find_config_file};
pub use spec::{
    DEFAULT_STORE_PATH, DeployerConfig, DeployerSettings, DeploymentKind, StoreBackend,
    StoreConfig,
};
pub use validator::{ConfigValidator, ValidationError, ValidationResult};
