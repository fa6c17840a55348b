//! Configuration specification types for the phase deployer.
//!
//! This module defines the structs that map to `phase-deployer.yaml`.

use serde::{Deserialize, Serialize};

/// The root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeployerSettings {
    /// Deployer behaviour.
    #[serde(default)]
    pub deployer: DeployerConfig,
    /// Live store backend.
    #[serde(default)]
    pub store: StoreConfig,
}

/// Deployer behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeployerConfig {
    /// Whether the deployer takes part in reconciliation.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Kind of high-level resource that runs the entity.
    #[serde(default)]
    pub kind: Option<DeploymentKind>,
}

/// High-level resource kinds the deployer can select.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentKind {
    /// A plain `Deployment`.
    Deployment,
    /// A Knative `Service`.
    KnativeService,
}

/// Live store backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    /// Backend type.
    #[serde(default)]
    pub backend: StoreBackend,
    /// Root directory (for the local backend).
    #[serde(default)]
    pub path: Option<String>,
}

/// Store backend types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Local file-based store.
    #[default]
    Local,
    /// In-memory store, discarded at exit.
    Memory,
}

/// Default directory of the local store.
pub const DEFAULT_STORE_PATH: &str = ".phase-deployer/store";

const fn default_enabled() -> bool {
    true
}

impl Default for DeployerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            kind: None,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Local,
            path: Some(String::from(DEFAULT_STORE_PATH)),
        }
    }
}

impl StoreConfig {
    /// Returns the configured local path, or the default one.
    #[must_use]
    pub fn path_or_default(&self) -> &str {
        self.path.as_deref().unwrap_or(DEFAULT_STORE_PATH)
    }
}

impl std::str::FromStr for DeploymentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deployment" => Ok(Self::Deployment),
            "knative-service" => Ok(Self::KnativeService),
            other => Err(format!(
                "Invalid deployment kind: {other}. Expected: deployment or knative-service"
            )),
        }
    }
}

impl std::fmt::Display for DeploymentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Deployment => "deployment",
            Self::KnativeService => "knative-service",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "memory" => Ok(Self::Memory),
            other => Err(format!("Invalid store backend: {other}. Expected: local or memory")),
        }
    }
}
