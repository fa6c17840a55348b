//! Validation for deployer settings and desired resource sets.
//!
//! Checks run before a pass so that obviously broken input is reported as a
//! whole instead of failing half-way through the store writes.

use crate::error::{ConfigError, DeployerError, Result};
use crate::resource::{ObjectKey, ResourceSet};
use std::collections::HashSet;
use tracing::debug;

use super::spec::{DeployerSettings, StoreBackend};

/// Validator for settings and manifests.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates deployer settings.
    ///
    /// # Errors
    ///
    /// Returns the first validation error, if any.
    pub fn validate(&self, settings: &DeployerSettings) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();

        Self::validate_store(settings, &mut result);

        if !settings.deployer.enabled {
            result
                .warnings
                .push(String::from("Deployer is disabled; passes will not touch the store"));
        }

        Self::finish(result)
    }

    /// Validates a desired resource set.
    ///
    /// # Errors
    ///
    /// Returns the first validation error, if any.
    pub fn validate_resources(&self, resources: &ResourceSet) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();

        if resources.is_empty() {
            result.warnings.push(String::from("No resources in manifest set"));
        }

        let mut seen: HashSet<ObjectKey> = HashSet::new();
        for (i, resource) in resources.iter().enumerate() {
            let prefix = format!("resources[{i}]");

            if resource.api_version.is_empty() {
                result
                    .warnings
                    .push(format!("{prefix}: apiVersion is empty"));
            }

            match ObjectKey::from_resource(resource) {
                Ok(key) => {
                    if !seen.insert(key.clone()) {
                        result.errors.push(ValidationError {
                            field: format!("{prefix}.metadata.name"),
                            message: format!("Duplicate resource identity: {key}"),
                        });
                    }
                }
                Err(e) => result.errors.push(ValidationError {
                    field: prefix,
                    message: e.to_string(),
                }),
            }
        }

        Self::finish(result)
    }

    /// Validates store configuration.
    fn validate_store(settings: &DeployerSettings, result: &mut ValidationResult) {
        match settings.store.backend {
            StoreBackend::Local => {
                if settings.store.path.as_ref().is_some_and(|p| p.trim().is_empty()) {
                    result.errors.push(ValidationError {
                        field: String::from("store.path"),
                        message: String::from("Store path cannot be empty for the local backend"),
                    });
                }
            }
            StoreBackend::Memory => {
                result.warnings.push(String::from(
                    "Memory store is discarded at exit; live state will not persist",
                ));
            }
        }
    }

    fn finish(result: ValidationResult) -> Result<ValidationResult> {
        if let Some(first_error) = result.errors.first() {
            return Err(DeployerError::Config(ConfigError::ValidationError {
                message: first_error.message.clone(),
                field: Some(first_error.field.clone()),
            }));
        }

        debug!("Validation passed with {} warnings", result.warnings.len());
        Ok(result)
    }
}

impl ValidationResult {
    /// Returns true if validation passed (no errors).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of warnings.
    #[must_use]
    pub const fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
