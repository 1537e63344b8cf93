//! Lookup facade bound to a resource manager and an optional culture

use crate::culture::Culture;
use crate::error::I18nResult;
use crate::manager::ResourceManager;
use std::fmt;
use std::sync::Arc;

/// The outcome of a lookup.
///
/// A miss yields the key itself as the value, so callers can always render
/// something.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedString {
    pub name: String,
    pub value: String,
    pub resource_not_found: bool,
    /// Resource name the lookup searched
    pub searched_location: Option<String>,
}

impl LocalizedString {
    fn new(name: &str, value: Option<String>, searched_location: Option<String>) -> Self {
        match value {
            Some(value) => Self {
                name: name.to_string(),
                value,
                resource_not_found: false,
                searched_location,
            },
            None => Self {
                name: name.to_string(),
                value: name.to_string(),
                resource_not_found: true,
                searched_location,
            },
        }
    }
}

impl fmt::Display for LocalizedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl AsRef<str> for LocalizedString {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

/// Looks up strings for a fixed culture, or for the calling thread's culture
/// when none is set. Lookups always fall back to parent cultures.
#[derive(Debug, Clone)]
pub struct StringLocalizer {
    manager: Arc<ResourceManager>,
    culture: Option<Culture>,
}

impl StringLocalizer {
    /// A localizer following the calling thread's culture
    pub fn new(manager: Arc<ResourceManager>) -> Self {
        Self { manager, culture: None }
    }

    /// A localizer sharing this one's manager but pinned to `culture`
    pub fn with_culture(&self, culture: Culture) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
            culture: Some(culture),
        }
    }

    /// The culture lookups use right now
    pub fn culture(&self) -> Culture {
        self.culture.clone().unwrap_or_else(Culture::current)
    }

    /// Look up `name`
    pub fn get(&self, name: &str) -> I18nResult<LocalizedString> {
        let value = self.manager.get_string(name, &self.culture(), true)?;
        Ok(LocalizedString::new(name, value, self.location()))
    }

    /// Look up `name` for `culture`, ignoring the localizer's own culture
    pub fn get_in(&self, name: &str, culture: &Culture) -> I18nResult<LocalizedString> {
        let value = self.manager.get_string(name, culture, true)?;
        Ok(LocalizedString::new(name, value, self.location()))
    }

    /// Every string visible for the culture, sorted by name.
    ///
    /// With `include_parents` the ancestors' strings are merged in, the nearest
    /// culture winning. A culture without any table yields an empty list.
    pub fn get_all_strings(&self, include_parents: bool) -> I18nResult<Vec<LocalizedString>> {
        let Some(entries) = self.manager.get_resource_set(&self.culture(), include_parents)? else {
            return Ok(Vec::new());
        };

        let location = self.location();
        let mut strings: Vec<LocalizedString> = entries
            .into_iter()
            .map(|(name, value)| LocalizedString::new(&name, Some(value), location.clone()))
            .collect();
        strings.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(strings)
    }

    /// The shared manager
    pub fn manager(&self) -> &Arc<ResourceManager> {
        &self.manager
    }

    fn location(&self) -> Option<String> {
        let name = self.manager.resource_name();
        (!name.is_empty()).then(|| name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::ResourceManagerOptions;
    use std::fs;
    use tempfile::TempDir;

    fn localizer(dir: &TempDir) -> StringLocalizer {
        let options = ResourceManagerOptions::new(dir.path())
            .resource_name("Messages")
            .watch_for_changes(false);
        StringLocalizer::new(Arc::new(ResourceManager::new(options).unwrap()))
    }

    #[tokio::test]
    async fn test_hit_and_miss() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Messages.fr.json"), r#"{"bye": "au revoir"}"#).unwrap();
        let localizer = localizer(&dir).with_culture(Culture::new("fr-CA").unwrap());

        let hit = localizer.get("bye").unwrap();
        assert_eq!(hit.to_string(), "au revoir");
        assert!(!hit.resource_not_found);
        assert_eq!(hit.searched_location.as_deref(), Some("Messages"));

        let miss = localizer.get("hello").unwrap();
        assert_eq!(miss.value, "hello");
        assert!(miss.resource_not_found);
    }

    #[tokio::test]
    async fn test_get_in_overrides_culture() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Messages.fr.json"), r#"{"bye": "au revoir"}"#).unwrap();
        fs::write(dir.path().join("Messages.de.json"), r#"{"bye": "tschüss"}"#).unwrap();
        let localizer = localizer(&dir).with_culture(Culture::new("fr").unwrap());

        assert_eq!(localizer.get_in("bye", &Culture::new("de-CH").unwrap()).unwrap().value, "tschüss");
        assert_eq!(localizer.get("bye").unwrap().value, "au revoir");
    }

    #[tokio::test]
    async fn test_all_strings_sorted_and_merged() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Messages.zh.json"), r#"{"b": "zh-b", "c": "zh-c"}"#).unwrap();
        fs::write(dir.path().join("Messages.zh-TW.json"), r#"{"a": "tw-a", "b": "tw-b"}"#).unwrap();
        let localizer = localizer(&dir).with_culture(Culture::new("zh-TW").unwrap());

        let all = localizer.get_all_strings(true).unwrap();
        let pairs: Vec<(&str, &str)> = all.iter().map(|s| (s.name.as_str(), s.value.as_str())).collect();
        assert_eq!(pairs, vec![("a", "tw-a"), ("b", "tw-b"), ("c", "zh-c")]);

        let own = localizer.get_all_strings(false).unwrap();
        assert_eq!(own.len(), 2);

        let missing = localizer.with_culture(Culture::new("de").unwrap());
        assert!(missing.get_all_strings(true).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_follows_thread_culture() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Messages.de.json"), r#"{"bye": "tschüss"}"#).unwrap();
        let localizer = localizer(&dir);

        let previous = Culture::set_current(Culture::new("de-AT").unwrap());
        assert_eq!(localizer.get("bye").unwrap().value, "tschüss");
        Culture::set_current(previous);
    }
}
