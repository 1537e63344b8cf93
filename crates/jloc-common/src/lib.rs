//! Common utilities and types for jloc

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{JlocError, Result};
pub use logging::{init_default_logging, init_dev_logging, init_logging, LogFormat, LoggingConfig};
