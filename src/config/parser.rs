//! Configuration parser for loading deployer settings.
//!
//! This module handles loading configuration from YAML files and environment
//! variables, with environment values taking precedence.

use crate::error::{ConfigError, DeployerError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::spec::DeployerSettings;

/// Configuration parser for loading deployer settings.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for resolving relative paths.
    base_path: Option<PathBuf>,
}

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving relative paths.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<DeployerSettings> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(DeployerError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            DeployerError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<DeployerSettings> {
        debug!("Parsing YAML configuration");

        if content.trim().is_empty() {
            return Ok(DeployerSettings::default());
        }

        let settings: DeployerSettings = serde_yaml::from_str(content).map_err(|e| {
            let location = source.map(|p| p.display().to_string());
            DeployerError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location,
            })
        })?;

        Ok(settings)
    }

    /// Loads configuration with environment variable overrides.
    ///
    /// Environment variables use the `PHASE_DEPLOYER_` prefix
    /// (e.g. `PHASE_DEPLOYER_STORE_PATH`).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if an
    /// override holds an invalid value.
    pub fn load_with_env(&self, path: impl AsRef<Path>) -> Result<DeployerSettings> {
        let mut settings = self.load_file(path)?;
        Self::apply_env_overrides(&mut settings, |name| std::env::var(name).ok())?;
        Ok(settings)
    }

    /// Resolves settings from an optional file plus the environment.
    ///
    /// Without a file, defaults are used.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is invalid or an override is invalid.
    pub fn resolve(&self, path: Option<&Path>) -> Result<DeployerSettings> {
        match path {
            Some(path) => self.load_with_env(path),
            None => {
                debug!("No configuration file, using defaults");
                let mut settings = DeployerSettings::default();
                Self::apply_env_overrides(&mut settings, |name| std::env::var(name).ok())?;
                Ok(settings)
            }
        }
    }

    /// Applies environment variable overrides to the settings.
    fn apply_env_overrides(
        settings: &mut DeployerSettings,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<()> {
        if let Some(enabled) = lookup("PHASE_DEPLOYER_ENABLED") {
            debug!("Overriding deployer.enabled from environment");
            settings.deployer.enabled = parse_bool(&enabled).ok_or_else(|| {
                ConfigError::validation(
                    format!("Invalid boolean '{enabled}'"),
                    "PHASE_DEPLOYER_ENABLED",
                )
            })?;
        }

        if let Some(kind) = lookup("PHASE_DEPLOYER_KIND") {
            debug!("Overriding deployer.kind from environment");
            settings.deployer.kind = Some(
                kind.parse()
                    .map_err(|e: String| ConfigError::validation(e, "PHASE_DEPLOYER_KIND"))?,
            );
        }

        if let Some(backend) = lookup("PHASE_DEPLOYER_STORE_BACKEND") {
            debug!("Overriding store.backend from environment");
            settings.store.backend = backend
                .parse()
                .map_err(|e: String| ConfigError::validation(e, "PHASE_DEPLOYER_STORE_BACKEND"))?;
        }

        if let Some(path) = lookup("PHASE_DEPLOYER_STORE_PATH") {
            debug!("Overriding store.path from environment");
            settings.store.path = Some(path);
        }

        Ok(())
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                DeployerError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["phase-deployer.yaml", "phase-deployer.yml"];

/// Finds the configuration file in a directory or its parents.
///
/// Returns `None` when no file exists; callers fall back to defaults.
#[must_use]
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Option<PathBuf> {
    let mut current = start_dir.as_ref().to_path_buf();

    loop {
        for filename in DEFAULT_CONFIG_FILES {
            let config_path = current.join(filename);
            if config_path.exists() {
                info!("Found configuration file: {}", config_path.display());
                return Some(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    warn!("No configuration file found, using defaults");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::spec::{DeploymentKind, StoreBackend};
    use std::collections::HashMap;

    #[test]
    fn test_parse_full_config() {
        let yaml = r"
deployer:
  enabled: false
  kind: knative-service
store:
  backend: memory
";
        let settings = ConfigParser::new().parse_yaml(yaml, None).expect("parse");

        assert!(!settings.deployer.enabled);
        assert_eq!(settings.deployer.kind, Some(DeploymentKind::KnativeService));
        assert_eq!(settings.store.backend, StoreBackend::Memory);
    }

    #[test]
    fn test_parse_empty_is_default() {
        let settings = ConfigParser::new().parse_yaml("", None).expect("parse");
        assert_eq!(settings, DeployerSettings::default());
    }

    #[test]
    fn test_parse_invalid_kind() {
        let yaml = "deployer:\n  kind: statefulset\n";
        assert!(ConfigParser::new().parse_yaml(yaml, None).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("PHASE_DEPLOYER_ENABLED", "no"),
            ("PHASE_DEPLOYER_KIND", "deployment"),
            ("PHASE_DEPLOYER_STORE_PATH", "/var/lib/deployer"),
        ]);
        let mut settings = DeployerSettings::default();

        ConfigParser::apply_env_overrides(&mut settings, |name| {
            env.get(name).map(|v| (*v).to_string())
        })
        .expect("overrides");

        assert!(!settings.deployer.enabled);
        assert_eq!(settings.deployer.kind, Some(DeploymentKind::Deployment));
        assert_eq!(settings.store.path.as_deref(), Some("/var/lib/deployer"));
    }

    #[test]
    fn test_env_override_invalid_backend() {
        let mut settings = DeployerSettings::default();
        let result = ConfigParser::apply_env_overrides(&mut settings, |name| {
            (name == "PHASE_DEPLOYER_STORE_BACKEND").then(|| String::from("s3"))
        });

        assert!(result.is_err());
    }

    #[test]
    fn test_find_config_file_in_parent() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).expect("mkdir");
        std::fs::write(dir.path().join("phase-deployer.yaml"), "").expect("write");

        let found = find_config_file(&nested).expect("found");
        assert_eq!(found, dir.path().join("phase-deployer.yaml"));
    }
}
