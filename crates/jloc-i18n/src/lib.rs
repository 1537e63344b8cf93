//! # jloc i18n
//!
//! Culture-aware cache of JSON string tables.
//!
//! Tables live in files such as `Messages.zh-CN.json` under a resources root
//! and are loaded lazily on first lookup. Lookups fall back through parent
//! cultures (`zh-Hant-TW` → `zh-Hant` → `zh`). Edits to table files are picked
//! up through a file system watcher, and with auto-create enabled, missing keys
//! are added to their table and written back after a quiet period.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod culture;
pub mod debounce;
pub mod error;
pub mod key;
pub mod loader;
pub mod localizer;
pub mod locator;
pub mod manager;
pub mod resolver;
pub mod watcher;

pub use culture::{Culture, CultureChain};
pub use error::{I18nError, I18nResult};
pub use key::ResourceKey;
pub use loader::{JsonFileLoader, ResourceFileLoader};
pub use localizer::{LocalizedString, StringLocalizer};
pub use manager::{ResourceManager, ResourceManagerOptions, DEFAULT_CULTURE, DEFAULT_WRITE_DELAY};
