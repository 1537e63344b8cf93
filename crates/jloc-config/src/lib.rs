//! Configuration management for jloc

pub mod loader;
pub mod settings;
pub mod validation;

pub use loader::{ConfigError, ConfigLoader};
pub use settings::{Config, LocalizationSettings, LogSettings};
