//! Wiring between jloc configuration and the resource manager

use anyhow::{Context, Result};
use jloc_common::{LogFormat, LoggingConfig};
use jloc_config::{LocalizationSettings, LogSettings};
use jloc_i18n::{Culture, ResourceManagerOptions};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Build manager options from the `localization` section
pub fn manager_options(settings: &LocalizationSettings) -> Result<ResourceManagerOptions> {
    let default_culture = Culture::new(&settings.default_culture)
        .with_context(|| format!("invalid default culture '{}'", settings.default_culture))?;

    let mut options = ResourceManagerOptions::new(&settings.resources_path)
        .auto_create_missing_keys(settings.auto_create_missing_keys)
        .default_culture(default_culture)
        .write_delay(settings.write_delay())
        .watch_for_changes(settings.watch_for_changes);

    if let Some(name) = &settings.resource_name {
        options = options.resource_name(name.clone());
    }

    Ok(options)
}

/// Build the tracing setup from the `logging` section.
///
/// `level_override` comes from the command line and beats the file.
pub fn logging_config(settings: &LogSettings, level_override: Option<&str>) -> LoggingConfig {
    LoggingConfig {
        level: level_override.unwrap_or(&settings.level).to_string(),
        format: settings.format.parse().unwrap_or(LogFormat::Compact),
        file_path: settings.file.as_ref().map(PathBuf::from),
        include_targets: settings.include_targets,
        include_thread_ids: false,
    }
}

/// Render a table as pretty JSON with sorted keys
pub fn render_table<I>(entries: I) -> Result<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let sorted: BTreeMap<String, String> = entries.into_iter().collect();
    Ok(serde_json::to_string_pretty(&sorted)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_manager_options_from_settings() {
        let settings = LocalizationSettings {
            resources_path: "i18n".to_string(),
            resource_name: Some("Messages".to_string()),
            auto_create_missing_keys: true,
            default_culture: "fr_ca".to_string(),
            write_delay_ms: 250,
            watch_for_changes: false,
        };

        let debug = format!("{:?}", manager_options(&settings).unwrap());
        assert!(debug.contains("\"Messages\""));
        assert!(debug.contains("fr-CA"));
        assert!(debug.contains(&format!("{:?}", Duration::from_millis(250))));
        assert!(debug.contains("watch_for_changes: false"));
    }

    #[test]
    fn test_invalid_default_culture() {
        let settings = LocalizationSettings {
            default_culture: "not a culture".to_string(),
            ..LocalizationSettings::default()
        };
        assert!(manager_options(&settings).is_err());
    }

    #[test]
    fn test_logging_config() {
        let settings = LogSettings {
            level: "warn".to_string(),
            file: Some("jloc.log".to_string()),
            format: "pretty".to_string(),
            include_targets: false,
        };

        let config = logging_config(&settings, None);
        assert_eq!(config.level, "warn");
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.file_path, Some(PathBuf::from("jloc.log")));
        assert!(!config.include_targets);

        assert_eq!(logging_config(&settings, Some("debug")).level, "debug");
    }

    #[test]
    fn test_render_table_sorts_keys() {
        let rendered = render_table(vec![
            ("b".to_string(), "2".to_string()),
            ("a".to_string(), "你好".to_string()),
        ])
        .unwrap();
        assert_eq!(rendered, "{\n  \"a\": \"你好\",\n  \"b\": \"2\"\n}");
    }
}
