//! Culture identifiers and their fallback chains

use crate::error::{I18nError, I18nResult};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::str::FromStr;
use unic_langid::LanguageIdentifier;

thread_local! {
    static CURRENT_CULTURE: RefCell<Culture> = RefCell::new(Culture::invariant());
}

/// A canonical BCP-47 culture name such as `zh-CN` or `zh-Hant-TW`.
///
/// The empty name is the invariant culture, the root of every fallback chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Culture {
    name: String,
}

impl Culture {
    /// The invariant (root) culture
    pub fn invariant() -> Self {
        Self { name: String::new() }
    }

    /// Parse and canonicalise a culture identifier.
    ///
    /// Both `-` and `_` separate subtags; `""` and `und` are the invariant culture.
    pub fn new(name: &str) -> I18nResult<Self> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Ok(Self::invariant());
        }

        let langid: LanguageIdentifier = trimmed
            .parse()
            .map_err(|_| I18nError::InvalidCulture(name.to_string()))?;

        Ok(Self::from_canonical(langid.to_string()))
    }

    pub(crate) fn from_canonical(name: String) -> Self {
        if name == "und" {
            Self::invariant()
        } else {
            Self { name }
        }
    }

    /// The canonical name, empty for the invariant culture
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this is the invariant culture
    pub fn is_invariant(&self) -> bool {
        self.name.is_empty()
    }

    /// The primary language subtag (`zh` for `zh-Hant-TW`)
    pub fn two_letter_code(&self) -> &str {
        self.name.split('-').next().unwrap_or_default()
    }

    /// The next more general culture.
    ///
    /// Subtags are dropped from the end (variants, region, then script); a bare
    /// language falls back to the invariant culture, which is its own parent.
    pub fn parent(&self) -> Self {
        match self.name.rfind('-') {
            Some(idx) => Self::from_canonical(self.name[..idx].to_string()),
            None => Self::invariant(),
        }
    }

    /// The finite ancestor list starting at this culture
    pub fn chain(&self) -> CultureChain {
        CultureChain::new(self)
    }

    /// The culture of the calling thread, invariant unless set
    pub fn current() -> Self {
        CURRENT_CULTURE.with(|current| current.borrow().clone())
    }

    /// Set the calling thread's culture, returning the previous one
    pub fn set_current(culture: Culture) -> Self {
        CURRENT_CULTURE.with(|current| current.replace(culture))
    }
}

impl Default for Culture {
    fn default() -> Self {
        Self::invariant()
    }
}

impl fmt::Display for Culture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl FromStr for Culture {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Culture {
    type Error = I18nError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Culture> for String {
    fn from(culture: Culture) -> Self {
        culture.name
    }
}

/// Ordered cultures from the most specific to the most general, excluding the
/// invariant culture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CultureChain {
    cultures: Vec<Culture>,
}

impl CultureChain {
    /// Materialise the chain for `culture`
    pub fn new(culture: &Culture) -> Self {
        let mut cultures = Vec::new();
        let mut current = culture.clone();

        // Every parent() call strictly shortens the name, so this terminates.
        while !current.is_invariant() {
            let parent = current.parent();
            cultures.push(current);
            current = parent;
        }

        Self { cultures }
    }

    /// Iterate from the most specific culture outwards
    pub fn iter(&self) -> std::slice::Iter<'_, Culture> {
        self.cultures.iter()
    }

    /// Number of cultures in the chain
    pub fn len(&self) -> usize {
        self.cultures.len()
    }

    /// True only for the chain of the invariant culture
    pub fn is_empty(&self) -> bool {
        self.cultures.is_empty()
    }
}

impl<'a> IntoIterator for &'a CultureChain {
    type Item = &'a Culture;
    type IntoIter = std::slice::Iter<'a, Culture>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(chain: &CultureChain) -> Vec<&str> {
        chain.iter().map(Culture::name).collect()
    }

    #[test]
    fn test_canonicalisation() {
        assert_eq!(Culture::new("zh_cn").unwrap().name(), "zh-CN");
        assert_eq!(Culture::new("EN-us").unwrap().name(), "en-US");
        assert_eq!(Culture::new("zh-hant-tw").unwrap().name(), "zh-Hant-TW");
        assert!(Culture::new("").unwrap().is_invariant());
        assert!(Culture::new("und").unwrap().is_invariant());
        assert!(Culture::new("not a culture").is_err());
    }

    #[test]
    fn test_parent_walk() {
        let culture = Culture::new("zh-Hant-TW").unwrap();
        assert_eq!(culture.parent().name(), "zh-Hant");
        assert_eq!(culture.parent().parent().name(), "zh");
        assert!(culture.parent().parent().parent().is_invariant());
        assert_eq!(Culture::invariant().parent(), Culture::invariant());
    }

    #[test]
    fn test_chain_excludes_invariant() {
        let chain = Culture::new("zh-TW").unwrap().chain();
        assert_eq!(names(&chain), vec!["zh-TW", "zh"]);

        let chain = Culture::new("fr").unwrap().chain();
        assert_eq!(names(&chain), vec!["fr"]);

        assert!(Culture::invariant().chain().is_empty());
    }

    #[test]
    fn test_two_letter_code() {
        assert_eq!(Culture::new("zh-CN").unwrap().two_letter_code(), "zh");
        assert_eq!(Culture::new("en").unwrap().two_letter_code(), "en");
        assert_eq!(Culture::invariant().two_letter_code(), "");
    }

    #[test]
    fn test_current_culture_is_per_thread() {
        let previous = Culture::set_current(Culture::new("fr-FR").unwrap());
        assert!(previous.is_invariant());
        assert_eq!(Culture::current().name(), "fr-FR");

        std::thread::spawn(|| assert!(Culture::current().is_invariant()))
            .join()
            .unwrap();

        Culture::set_current(previous);
        assert!(Culture::current().is_invariant());
    }

    #[test]
    fn test_serde_as_string() {
        let culture: Culture = serde_json::from_str("\"zh_cn\"").unwrap();
        assert_eq!(culture.name(), "zh-CN");
        assert_eq!(serde_json::to_string(&culture).unwrap(), "\"zh-CN\"");
        assert!(serde_json::from_str::<Culture>("\"!!\"").is_err());
    }
}
