//! Error type shared across the jloc crates

use thiserror::Error;

/// Result type alias for jloc operations
pub type Result<T> = std::result::Result<T, JlocError>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures surfaced at crate boundaries.
///
/// Each crate keeps its own detailed error enum and converts into this one.
#[derive(Error, Debug)]
pub enum JlocError {
    /// Configuration could not be read, parsed or validated
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: BoxError,
    },

    /// A string table could not be resolved, loaded or written back
    #[error("Localization error: {message}")]
    Localization {
        message: String,
        culture: Option<String>,
        #[source]
        source: Option<BoxError>,
    },
}

impl JlocError {
    /// Wrap a configuration failure
    pub fn config(message: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Config {
            message: message.into(),
            source: Box::new(source),
        }
    }

    /// Wrap a resource failure
    pub fn localization(message: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Localization {
            message: message.into(),
            culture: None,
            source: Some(Box::new(source)),
        }
    }

    /// A culture identifier that could not be parsed
    pub fn invalid_culture(culture: impl Into<String>) -> Self {
        Self::Localization {
            message: "Invalid culture identifier".to_string(),
            culture: Some(culture.into()),
            source: None,
        }
    }

    /// The culture identifier involved, if any
    pub fn culture(&self) -> Option<&str> {
        match self {
            Self::Localization { culture, .. } => culture.as_deref(),
            Self::Config { .. } => None,
        }
    }
}
