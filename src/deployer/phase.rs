//! Lifecycle phase of the entity under reconciliation.
//!
//! The phase machine belongs to the entity; the deployer only reads the
//! current value. Unknown phases are kept verbatim and never fail parsing.

use serde::{Deserialize, Serialize};

/// Phase of the entity being reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Phase {
    /// The entity was just accepted and is being initialised.
    Initializing,
    /// The entity's resources are being rolled out.
    Deploying,
    /// The entity is deployed and running.
    Running,
    /// The entity failed.
    Error,
    /// Any other phase.
    Other(String),
}

impl Phase {
    /// Returns the canonical phase name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Initializing => "Initialization",
            Self::Deploying => "Deploying",
            Self::Running => "Running",
            Self::Error => "Error",
            Self::Other(name) => name,
        }
    }

    /// Returns true if the phase is one of `phases`.
    #[must_use]
    pub fn is_one_of(&self, phases: &[Self]) -> bool {
        phases.contains(self)
    }
}

impl From<&str> for Phase {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "initialization" | "initializing" => Self::Initializing,
            "deploying" => Self::Deploying,
            "running" => Self::Running,
            "error" => Self::Error,
            _ => Self::Other(value.to_string()),
        }
    }
}

impl From<String> for Phase {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Phase> for String {
    fn from(phase: Phase) -> Self {
        phase.as_str().to_string()
    }
}

impl std::str::FromStr for Phase {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
