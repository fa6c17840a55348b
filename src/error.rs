//! Error types for the phase deployer.
//!
//! Errors are grouped by the layer that produces them: configuration,
//! resource identity, the live store, and the patch codec. Failures raised
//! while a post-action walks the desired set are wrapped with the stage
//! (replace or patch) and the index of the resource that failed, so the
//! outer driver can report precisely where a pass stopped.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the phase deployer.
#[derive(Debug, Error)]
pub enum DeployerError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Resource identity and manifest errors.
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    /// Live store errors.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Patch codec errors.
    #[error("Patch error: {0}")]
    Codec(#[from] PatchError),

    /// A resource failed while replacing the desired set.
    #[error("error during replace resource #{index} ({key}): {source}")]
    Replace {
        /// Position of the failing resource in the desired set.
        index: usize,
        /// Identity of the failing resource.
        key: String,
        /// Underlying failure.
        #[source]
        source: Box<DeployerError>,
    },

    /// A resource failed while patching the desired set.
    #[error("error during patch resource #{index} ({key}): {source}")]
    Patch {
        /// Position of the failing resource in the desired set.
        index: usize,
        /// Identity of the failing resource.
        key: String,
        /// Underlying failure.
        #[source]
        source: Box<DeployerError>,
    },

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Stage of a reconciliation pass in which a resource failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Full create-or-update of the desired set.
    Replace,
    /// Positive merge patch of the desired set.
    Patch,
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },
}

/// Resource identity and manifest errors.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// No stable key can be derived for a resource.
    #[error("Cannot resolve identity of resource: {message}")]
    IdentityResolution {
        /// Which part of the identity is missing.
        message: String,
    },

    /// A manifest document could not be decoded into a resource.
    #[error("Failed to parse manifest: {message}")]
    ManifestParse {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },
}

/// Live store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The live resource does not exist.
    #[error("resource missing: {key}")]
    NotFound {
        /// Identity of the missing resource.
        key: String,
    },

    /// The store could not be reached or refused the operation.
    #[error("Store transport failure: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// A stored document could not be read back.
    #[error("Stored resource is corrupted: {message}")]
    Corrupted {
        /// Description of the corruption.
        message: String,
    },
}

/// Patch codec errors.
#[derive(Debug, Error)]
pub enum PatchError {
    /// Structural encode/decode failure.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Description of the serialization error.
        message: String,
    },

    /// A document that must be an object was something else.
    #[error("Invalid document: expected an object, found {found}")]
    InvalidDocument {
        /// Kind of value found instead.
        found: &'static str,
    },
}

/// Result type alias for phase deployer operations.
pub type Result<T> = std::result::Result<T, DeployerError>;

impl DeployerError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Wraps an error raised while replacing the resource at `index`.
    #[must_use]
    pub fn replace(index: usize, key: impl Into<String>, source: Self) -> Self {
        Self::Replace {
            index,
            key: key.into(),
            source: Box::new(source),
        }
    }

    /// Wraps an error raised while patching the resource at `index`.
    #[must_use]
    pub fn patch(index: usize, key: impl Into<String>, source: Self) -> Self {
        Self::Patch {
            index,
            key: key.into(),
            source: Box::new(source),
        }
    }

    /// Returns the stage tag, if this error came out of a post-action.
    #[must_use]
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::Replace { .. } => Some(Stage::Replace),
            Self::Patch { .. } => Some(Stage::Patch),
            _ => None,
        }
    }

    /// Returns the index of the resource that failed, if known.
    #[must_use]
    pub const fn failed_index(&self) -> Option<usize> {
        match self {
            Self::Replace { index, .. } | Self::Patch { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Returns true if the root cause is a missing live resource.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Store(StoreError::NotFound { .. }) => true,
            Self::Replace { source, .. } | Self::Patch { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl ResourceError {
    /// Creates an identity resolution error.
    #[must_use]
    pub fn identity(message: impl Into<String>) -> Self {
        Self::IdentityResolution {
            message: message.into(),
        }
    }
}

impl StoreError {
    /// Creates a not-found error for the given identity.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Creates a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

impl PatchError {
    /// Creates a serialization error with the given message.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for PatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
