//! Error types for resource operations

use thiserror::Error;

/// Errors that can occur while loading, resolving or persisting string tables
#[derive(Error, Debug)]
pub enum I18nError {
    /// Failed to parse a culture identifier
    #[error("Invalid culture identifier: {0}")]
    InvalidCulture(String),

    /// A resource file could not be read or is not a flat JSON object of strings
    #[error("Failed to load resource file {path}: {source}")]
    ResourceLoad {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A string table could not be written back to disk
    #[error("Failed to write resource file {path}: {source}")]
    ResourceWrite {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The file system watcher could not be started
    #[error("Failed to watch resources directory: {0}")]
    Watch(#[from] notify::Error),

    /// Debounced write-back needs a tokio runtime
    #[error("No tokio runtime available: {0}")]
    Runtime(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl I18nError {
    pub(crate) fn load(path: &std::path::Path, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::ResourceLoad {
            path: path.display().to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn write(path: &std::path::Path, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::ResourceWrite {
            path: path.display().to_string(),
            source: source.into(),
        }
    }
}

impl From<I18nError> for jloc_common::JlocError {
    fn from(err: I18nError) -> Self {
        match err {
            I18nError::InvalidCulture(culture) => jloc_common::JlocError::invalid_culture(culture),
            other => jloc_common::JlocError::localization(other.to_string(), other),
        }
    }
}

/// Result type for resource operations
pub type I18nResult<T> = Result<T, I18nError>;
