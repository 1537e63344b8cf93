//! Reading and writing string table files

use crate::error::{I18nError, I18nResult};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Loads and persists one string table file.
///
/// Implementations must be pure with respect to the cache: they never touch
/// cached state, only bytes on disk.
#[cfg_attr(test, mockall::automock)]
pub trait ResourceFileLoader: Send + Sync {
    /// Read a flat string-to-string table
    fn load(&self, path: &Path) -> I18nResult<HashMap<String, String>>;

    /// Replace the file at `path` with `entries`
    fn save(&self, path: &Path, entries: &BTreeMap<String, String>) -> I18nResult<()>;
}

/// UTF-8 JSON files holding a single object of string values
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFileLoader;

impl ResourceFileLoader for JsonFileLoader {
    fn load(&self, path: &Path) -> I18nResult<HashMap<String, String>> {
        let bytes = fs::read(path).map_err(|e| I18nError::load(path, e))?;
        let content = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes[..]);

        let entries: HashMap<String, String> =
            serde_json::from_slice(content).map_err(|e| I18nError::load(path, e))?;

        debug!("Read {} entries from {}", entries.len(), path.display());
        Ok(entries)
    }

    fn save(&self, path: &Path, entries: &BTreeMap<String, String>) -> I18nResult<()> {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| I18nError::write(path, e))?;

        // serde_json leaves non-ASCII text unescaped
        let mut json = serde_json::to_string_pretty(entries).map_err(|e| I18nError::write(path, e))?;
        json.push('\n');

        // Write next to the target and rename over it so readers never see a
        // truncated file.
        let mut staged = tempfile::NamedTempFile::new_in(dir).map_err(|e| I18nError::write(path, e))?;
        staged.write_all(json.as_bytes()).map_err(|e| I18nError::write(path, e))?;
        staged.as_file().sync_all().map_err(|e| I18nError::write(path, e))?;
        staged.persist(path).map_err(|e| I18nError::write(path, e.error))?;

        debug!("Wrote {} entries to {}", entries.len(), path.display());
        Ok(())
    }
}
