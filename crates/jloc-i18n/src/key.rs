//! Cache index for string tables

use crate::culture::Culture;
use std::fmt;

/// Identifies one string table: a resource base name plus a culture.
///
/// Displays as `{resource}.{culture}`, or just `{culture}` when the resource
/// name is empty, which is also the file stem the table is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    resource_name: String,
    culture: Culture,
}

impl ResourceKey {
    /// Create a key for `culture` under `resource_name`
    pub fn new(resource_name: impl Into<String>, culture: Culture) -> Self {
        Self {
            resource_name: resource_name.into(),
            culture,
        }
    }

    /// The resource base name, possibly empty
    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    /// The culture of this table
    pub fn culture(&self) -> &Culture {
        &self.culture
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.resource_name.is_empty() {
            write!(f, "{}", self.culture)
        } else {
            write!(f, "{}.{}", self.resource_name, self.culture)
        }
    }
}
