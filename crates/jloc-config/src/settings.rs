//! Application configuration structures

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Resource cache settings
    pub localization: LocalizationSettings,

    /// Logging settings
    pub logging: LogSettings,
}

/// Settings for the JSON resource cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LocalizationSettings {
    /// Root directory holding the `*.json` string tables; created if absent
    #[validate(custom(function = "crate::validation::validate_file_path", message = "Resources path must be a valid path"))]
    pub resources_path: String,

    /// Resource base name (`Messages` for `Messages.en-US.json`); unset for `<culture>.json` layouts
    #[validate(custom(function = "crate::validation::validate_resource_name", message = "Resource name must be dot-separated non-empty segments"))]
    pub resource_name: Option<String>,

    /// Insert and persist missing keys as `key -> key`
    pub auto_create_missing_keys: bool,

    /// Culture used when a lookup arrives without one
    #[validate(custom(function = "crate::validation::validate_culture_name", message = "Default culture must be a culture name such as en-US"))]
    pub default_culture: String,

    /// Quiet period before auto-created keys are written back, in milliseconds
    #[validate(range(min = 10, max = 60000, message = "Write delay must be between 10 and 60000 milliseconds"))]
    pub write_delay_ms: u64,

    /// Reload tables when their files change on disk
    pub watch_for_changes: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LogSettings {
    /// Log level (trace, debug, info, warn, error)
    #[validate(custom(function = "crate::validation::validate_log_level", message = "Log level must be one of: trace, debug, info, warn, error"))]
    pub level: String,

    /// Optional log file path
    pub file: Option<String>,

    /// Line layout (pretty, compact, full, json)
    #[validate(custom(function = "crate::validation::validate_log_format", message = "Log format must be one of: pretty, compact, full, json"))]
    pub format: String,

    /// Whether to include the module target in log lines
    pub include_targets: bool,
}

impl Default for LocalizationSettings {
    fn default() -> Self {
        Self {
            resources_path: "Resources".to_string(),
            resource_name: None,
            auto_create_missing_keys: false,
            default_culture: "en-US".to_string(),
            write_delay_ms: 1000,
            watch_for_changes: true,
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            format: "compact".to_string(),
            include_targets: true,
        }
    }
}

impl Config {
    /// Validate every section, merging their errors
    pub fn validate_all(&self) -> Result<(), validator::ValidationErrors> {
        let sections = [
            ("localization", self.localization.validate()),
            ("logging", self.logging.validate()),
        ];

        let mut errors = validator::ValidationErrors::new();
        for (section, result) in sections {
            if let Err(section_errors) = result {
                for (field, field_errors) in section_errors.field_errors() {
                    for error in field_errors {
                        let mut error = error.clone();
                        error.add_param("section".into(), &section);
                        errors.add(field, error);
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl LocalizationSettings {
    /// Debounce delay as a `Duration`
    pub fn write_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.write_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate_all().is_ok());
        assert_eq!(config.localization.resources_path, "Resources");
        assert_eq!(config.localization.default_culture, "en-US");
        assert_eq!(config.localization.write_delay(), std::time::Duration::from_secs(1));
        assert!(!config.localization.auto_create_missing_keys);
        assert!(config.localization.watch_for_changes);
    }

    #[test]
    fn test_invalid_default_culture() {
        let mut config = Config::default();
        config.localization.default_culture = "not a culture".to_string();

        let errors = config.validate_all().unwrap_err();
        assert!(errors.field_errors().contains_key("default_culture"));
    }

    #[test]
    fn test_invalid_values_across_sections() {
        let mut config = Config::default();
        config.localization.write_delay_ms = 0;
        config.localization.resource_name = Some("a..b".to_string());
        config.logging.level = "loud".to_string();

        let errors = config.validate_all().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("write_delay_ms"));
        assert!(fields.contains_key("resource_name"));
        assert!(fields.contains_key("level"));
    }
}
