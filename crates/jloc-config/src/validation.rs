//! Validation helpers used by the settings derive

use regex::Regex;
use std::sync::LazyLock;
use validator::ValidationError;

/// Loose BCP-47 shape: a 2-3 letter language followed by alphanumeric subtags
/// (script, region, variants). Separators may be `-` or `_`.
pub static CULTURE_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z]{2,3}([-_][A-Za-z0-9]{1,8})*$").expect("Invalid culture name regex pattern")
});

/// Validate a culture name such as `en-US` or `zh-Hant-TW`
pub fn validate_culture_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::new("empty_culture_name"));
    }

    if CULTURE_NAME_REGEX.is_match(name) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_culture_name"))
    }
}

/// Validate a resource base name.
///
/// Dots are allowed (they map to subdirectories) but empty segments and path
/// separators are not.
pub fn validate_resource_name(name: &str) -> Result<(), ValidationError> {
    if name.contains(['/', '\\']) {
        return Err(ValidationError::new("resource_name_contains_separator"));
    }

    if name.split('.').any(str::is_empty) {
        return Err(ValidationError::new("resource_name_empty_segment"));
    }

    Ok(())
}

/// Validate a file system path (basic check for valid path characters)
pub fn validate_file_path(path: &str) -> Result<(), ValidationError> {
    if path.is_empty() {
        return Err(ValidationError::new("empty_file_path"));
    }

    // Colon stays allowed for Windows drive letters (C:\)
    let invalid_chars = ['<', '>', '"', '|', '?', '*'];
    if path.chars().any(|c| invalid_chars.contains(&c)) {
        return Err(ValidationError::new("invalid_file_path_characters"));
    }

    Ok(())
}

/// Validate a log level name
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    match level {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ValidationError::new("invalid_log_level")),
    }
}

/// Validate a log format name
pub fn validate_log_format(format: &str) -> Result<(), ValidationError> {
    match format {
        "pretty" | "compact" | "full" | "json" => Ok(()),
        _ => Err(ValidationError::new("invalid_log_format")),
    }
}
