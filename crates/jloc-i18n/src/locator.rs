//! Mapping between cultures, resource keys and files on disk

use crate::culture::Culture;
use crate::error::I18nResult;
use crate::key::ResourceKey;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

const EXTENSION: &str = "json";

/// A table file found during discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Culture parsed from the file name suffix
    pub culture: Culture,
    /// Location of the file
    pub path: PathBuf,
}

/// Finds the files backing a resource name under a resources root.
///
/// Layouts:
/// - empty resource name: `<root>/<culture>.json`
/// - `Messages`: `<root>/Messages.<culture>.json`
/// - `Controllers.Home`: `<root>/Controllers.Home.<culture>.json` and
///   `<root>/Controllers/Home.<culture>.json`; where both exist for one culture,
///   the flat file wins
#[derive(Debug, Clone)]
pub struct ResourceLocator {
    root: PathBuf,
    resource_name: String,
}

impl ResourceLocator {
    /// Create a locator for `resource_name` under `root`
    pub fn new(root: impl Into<PathBuf>, resource_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            resource_name: resource_name.into(),
        }
    }

    /// The resources root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The resource base name, possibly empty
    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    /// The cache key for `culture`
    pub fn key(&self, culture: &Culture) -> ResourceKey {
        ResourceKey::new(self.resource_name.clone(), culture.clone())
    }

    /// Where a table that does not exist on disk yet is written.
    ///
    /// Dotted resource names go into their subdirectory once it exists, flat
    /// next to the root otherwise.
    pub fn default_path(&self, culture: &Culture) -> PathBuf {
        if let Some((dir, prefix)) = self.nested_layout() {
            if dir.is_dir() {
                return dir.join(format!("{}.{}.{}", prefix, culture, EXTENSION));
            }
        }
        self.root.join(format!("{}.{}", self.key(culture), EXTENSION))
    }

    /// `Controllers.Home` -> (`<root>/Controllers`, `Home`)
    fn nested_layout(&self) -> Option<(PathBuf, &str)> {
        let (dirs, prefix) = self.resource_name.rsplit_once('.')?;
        let dir = dirs.split('.').fold(self.root.clone(), |dir, segment| dir.join(segment));
        Some((dir, prefix))
    }

    /// Find every file that may back `culture` or one of its siblings.
    ///
    /// With a resource name, all files sharing the culture's two-letter code
    /// are returned (`Messages.zh.json`, `Messages.zh-CN.json`, ...), each
    /// tagged with its own culture.
    pub fn discover(&self, culture: &Culture) -> I18nResult<Vec<DiscoveredFile>> {
        if culture.is_invariant() {
            return Ok(Vec::new());
        }

        if self.resource_name.is_empty() {
            let path = self.root.join(format!("{}.{}", culture, EXTENSION));
            return Ok(if path.is_file() {
                vec![DiscoveredFile {
                    culture: culture.clone(),
                    path,
                }]
            } else {
                Vec::new()
            });
        }

        let code = culture.two_letter_code();
        let mut found = scan(&self.root, &self.resource_name, code)?;

        if let Some((dir, prefix)) = self.nested_layout() {
            for file in scan(&dir, prefix, code)? {
                if found.iter().any(|flat| flat.culture == file.culture) {
                    debug!("{} is shadowed by a flat table file", file.path.display());
                } else {
                    found.push(file);
                }
            }
        }

        Ok(found)
    }

    /// The key a changed file belongs to, if it is one of this resource's tables.
    ///
    /// The path relative to the root has its extension dropped and its
    /// separators turned into dots, so `Controllers/Home.fr.json` maps to
    /// `Controllers.Home.fr`.
    pub fn key_for_path(&self, path: &Path) -> Option<ResourceKey> {
        let extension = path.extension()?;
        if !extension.eq_ignore_ascii_case(EXTENSION) {
            return None;
        }

        let relative = match path.strip_prefix(&self.root) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => {
                let canonical = fs::canonicalize(path).ok()?;
                canonical.strip_prefix(&self.root).ok()?.to_path_buf()
            }
        };

        let mut segments = Vec::new();
        for component in relative.with_extension("").components() {
            match component {
                Component::Normal(segment) => segments.push(segment.to_str()?.to_string()),
                _ => return None,
            }
        }
        let stem = segments.join(".");

        let culture_name = if self.resource_name.is_empty() {
            stem.as_str()
        } else {
            stem.strip_prefix(&self.resource_name)?.strip_prefix('.')?
        };

        match Culture::new(culture_name) {
            Ok(culture) if !culture.is_invariant() => Some(self.key(&culture)),
            _ => None,
        }
    }
}

/// List `<dir>/<prefix>.<code>*.json`, matching `code` case-insensitively
fn scan(dir: &Path, prefix: &str, code: &str) -> I18nResult<Vec<DiscoveredFile>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        let Some(stem) = file_name.strip_suffix(".json") else {
            continue;
        };
        let Some(suffix) = stem.strip_prefix(prefix).and_then(|rest| rest.strip_prefix('.')) else {
            continue;
        };
        if !suffix.get(..code.len()).is_some_and(|head| head.eq_ignore_ascii_case(code)) {
            continue;
        }

        match Culture::new(suffix) {
            Ok(culture) if !culture.is_invariant() => found.push(DiscoveredFile {
                culture,
                path: entry.path(),
            }),
            _ => warn!("Skipping {}: '{}' is not a culture name", entry.path().display(), suffix),
        }
    }

    found.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn culture(name: &str) -> Culture {
        Culture::new(name).unwrap()
    }

    fn touch(root: &Path, relative: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{}").unwrap();
        path
    }

    fn cultures(found: &[DiscoveredFile]) -> Vec<&str> {
        found.iter().map(|f| f.culture.name()).collect()
    }

    #[test]
    fn test_discover_without_resource_name() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "zh-CN.json");
        let locator = ResourceLocator::new(dir.path(), "");

        let found = locator.discover(&culture("zh-CN")).unwrap();
        assert_eq!(cultures(&found), vec!["zh-CN"]);
        assert!(locator.discover(&culture("fr")).unwrap().is_empty());
    }

    #[test]
    fn test_discover_collects_sibling_cultures() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Messages.zh.json");
        touch(dir.path(), "Messages.zh-CN.json");
        touch(dir.path(), "Messages.fr.json");
        touch(dir.path(), "Other.zh.json");
        let locator = ResourceLocator::new(dir.path(), "Messages");

        let found = locator.discover(&culture("zh-TW")).unwrap();
        assert_eq!(cultures(&found), vec!["zh-CN", "zh"]);
    }

    #[test]
    fn test_discover_skips_unparseable_suffixes() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Messages.en.json");
        touch(dir.path(), "Messages.en.backup.json");
        let locator = ResourceLocator::new(dir.path(), "Messages");

        let found = locator.discover(&culture("en-US")).unwrap();
        assert_eq!(cultures(&found), vec!["en"]);
    }

    #[test]
    fn test_dotted_name_uses_subdirectory() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Controllers/Home.fr.json");
        let locator = ResourceLocator::new(dir.path(), "Controllers.Home");

        let found = locator.discover(&culture("fr")).unwrap();
        assert_eq!(cultures(&found), vec!["fr"]);
        assert!(found[0].path.ends_with("Controllers/Home.fr.json"));

        // A flat file wins over the subdirectory layout
        touch(dir.path(), "Controllers.Home.fr.json");
        let found = locator.discover(&culture("fr")).unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].path.ends_with("Controllers.Home.fr.json"));
    }

    #[test]
    fn test_dotted_name_merges_both_layouts() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Controllers/Home.fr.json");
        touch(dir.path(), "Controllers.Home.fr-CA.json");
        let locator = ResourceLocator::new(dir.path(), "Controllers.Home");

        let found = locator.discover(&culture("fr-CA")).unwrap();
        assert_eq!(cultures(&found), vec!["fr-CA", "fr"]);
    }

    #[test]
    fn test_language_code_matches_any_case() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Messages.ZH-cn.json");
        touch(dir.path(), "messages.zh.json");
        let locator = ResourceLocator::new(dir.path(), "Messages");

        let found = locator.discover(&culture("zh-CN")).unwrap();
        assert_eq!(cultures(&found), vec!["zh-CN"]);
        assert!(found[0].path.ends_with("Messages.ZH-cn.json"));
    }

    #[test]
    fn test_default_path() {
        let locator = ResourceLocator::new("/res", "Messages");
        assert_eq!(locator.default_path(&culture("en-US")), PathBuf::from("/res/Messages.en-US.json"));

        let locator = ResourceLocator::new("/res", "");
        assert_eq!(locator.default_path(&culture("en-US")), PathBuf::from("/res/en-US.json"));
    }

    #[test]
    fn test_default_path_follows_existing_subdirectory() {
        let dir = TempDir::new().unwrap();
        let locator = ResourceLocator::new(dir.path(), "Controllers.Home");
        assert_eq!(
            locator.default_path(&culture("fr-CA")),
            dir.path().join("Controllers.Home.fr-CA.json")
        );

        fs::create_dir_all(dir.path().join("Controllers")).unwrap();
        assert_eq!(
            locator.default_path(&culture("fr-CA")),
            dir.path().join("Controllers").join("Home.fr-CA.json")
        );
    }

    #[test]
    fn test_key_for_path() {
        let locator = ResourceLocator::new("/res", "Messages");
        assert_eq!(
            locator.key_for_path(Path::new("/res/Messages.fr.json")),
            Some(ResourceKey::new("Messages", culture("fr")))
        );
        assert_eq!(locator.key_for_path(Path::new("/res/Other.fr.json")), None);
        assert_eq!(locator.key_for_path(Path::new("/res/Messages.fr.txt")), None);
        assert_eq!(locator.key_for_path(Path::new("/elsewhere/Messages.fr.json")), None);

        let nested = ResourceLocator::new("/res", "Controllers.Home");
        assert_eq!(
            nested.key_for_path(Path::new("/res/Controllers/Home.zh-CN.json")),
            Some(ResourceKey::new("Controllers.Home", culture("zh-CN")))
        );

        let unnamed = ResourceLocator::new("/res", "");
        assert_eq!(
            unnamed.key_for_path(Path::new("/res/de-DE.json")),
            Some(ResourceKey::new("", culture("de-DE")))
        );
        assert_eq!(unnamed.key_for_path(Path::new("/res/Messages.de.json")), None);
    }
}
