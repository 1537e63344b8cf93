//! Configuration loading utilities

use crate::Config;
use jloc_common::{JlocError, Result as JlocResult};
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Environment variable pointing at an explicit configuration file
pub const CONFIG_PATH_VAR: &str = "JLOC_CONFIG_PATH";

/// File names searched for in the working directory when no path is given
const DEFAULT_CONFIG_FILES: [&str; 3] = ["jloc.yaml", "jloc.yml", "jloc.toml"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("Failed to parse TOML configuration: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        var: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for JlocError {
    fn from(err: ConfigError) -> Self {
        JlocError::config(err.to_string(), err)
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML or TOML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let mut config: Config = if is_toml {
            toml::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        debug!("Parsed configuration file {}", path.display());

        Self::apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from the default locations
    ///
    /// `JLOC_CONFIG_PATH` wins, then `jloc.yaml`, `jloc.yml` and `jloc.toml` in
    /// the working directory; without any file the defaults are used.
    pub fn load() -> JlocResult<Config> {
        if let Ok(config_path) = env::var(CONFIG_PATH_VAR) {
            return Ok(Self::load_config(&config_path)?);
        }

        if let Some(path) = DEFAULT_CONFIG_FILES.iter().map(Path::new).find(|p| p.exists()) {
            return Ok(Self::load_config(path)?);
        }

        debug!("No configuration file found, using defaults");
        let mut config = Config::default();
        Self::apply_env_overrides(&mut config)?;
        config.validate_all().map_err(ConfigError::ValidationError)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> JlocResult<Config> {
        Ok(Self::load_config(path)?)
    }

    /// Apply process environment overrides to configuration
    pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        Self::apply_overrides_from(config, |var| env::var(var).ok())
    }

    /// Apply overrides read through `lookup`, one variable at a time
    pub fn apply_overrides_from<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let localization = &mut config.localization;

        if let Some(path) = lookup("JLOC_RESOURCES_PATH") {
            localization.resources_path = path;
        }

        if let Some(name) = lookup("JLOC_RESOURCE_NAME") {
            localization.resource_name = if name.is_empty() { None } else { Some(name) };
        }

        if let Some(value) = lookup("JLOC_AUTO_CREATE") {
            localization.auto_create_missing_keys = parse_var("JLOC_AUTO_CREATE", &value)?;
        }

        if let Some(culture) = lookup("JLOC_DEFAULT_CULTURE") {
            localization.default_culture = culture;
        }

        if let Some(value) = lookup("JLOC_WRITE_DELAY_MS") {
            localization.write_delay_ms = parse_var("JLOC_WRITE_DELAY_MS", &value)?;
        }

        if let Some(value) = lookup("JLOC_WATCH") {
            localization.watch_for_changes = parse_var("JLOC_WATCH", &value)?;
        }

        let logging = &mut config.logging;

        if let Some(level) = lookup("JLOC_LOG_LEVEL") {
            logging.level = level;
        }

        if let Some(file) = lookup("JLOC_LOG_FILE") {
            logging.file = Some(file);
        }

        if let Some(format) = lookup("JLOC_LOG_FORMAT") {
            logging.format = format;
        }

        Ok(())
    }
}

fn parse_var<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::EnvParseError {
        var: var.to_string(),
        source: Box::new(e),
    })
}
