//! Concurrent storage of loaded string tables

use crate::key::ResourceKey;
use dashmap::DashMap;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One in-memory string table and the file it persists to.
///
/// Entries are mutated in place: refresh clears and repopulates them, and
/// auto-create inserts single keys. A reader iterating during a refresh may
/// observe a transiently empty or partial table.
#[derive(Debug)]
pub struct ResourceTable {
    entries: DashMap<String, String>,
    path: PathBuf,
}

impl ResourceTable {
    /// An empty table backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            entries: DashMap::new(),
            path: path.into(),
        }
    }

    /// A table pre-populated with `entries`
    pub fn from_entries(path: impl Into<PathBuf>, entries: HashMap<String, String>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            path: path.into(),
        }
    }

    /// The file this table is loaded from and written to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a single value
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|value| value.value().clone())
    }

    /// Whether `key` is defined
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Atomically return the existing value for `key` or insert `value`.
    ///
    /// The boolean is true when this call inserted.
    pub fn get_or_insert(&self, key: &str, value: &str) -> (String, bool) {
        let mut inserted = false;
        let entry = self.entries.entry(key.to_string()).or_insert_with(|| {
            inserted = true;
            value.to_string()
        });
        (entry.value().clone(), inserted)
    }

    /// Drop every entry, then insert `entries` where absent
    pub fn replace_all(&self, entries: HashMap<String, String>) {
        self.entries.clear();
        for (key, value) in entries {
            self.entries.entry(key).or_insert(value);
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of the current entries
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Copy of the current entries in key order, as written to disk
    pub fn sorted_snapshot(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Copy every entry into `target` unless `target` already defines the key
    pub fn merge_into(&self, target: &mut HashMap<String, String>) {
        for entry in self.entries.iter() {
            target
                .entry(entry.key().clone())
                .or_insert_with(|| entry.value().clone());
        }
    }
}

/// Maps each [`ResourceKey`] to its table.
///
/// Once a key is present it keeps mapping to the same table for the lifetime
/// of the cache.
#[derive(Debug, Default)]
pub struct ResourceCache {
    tables: DashMap<ResourceKey, Arc<ResourceTable>>,
}

impl ResourceCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// The table for `key`, if loaded
    pub fn get(&self, key: &ResourceKey) -> Option<Arc<ResourceTable>> {
        self.tables.get(key).map(|table| Arc::clone(table.value()))
    }

    /// Whether `key` has been loaded or created
    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.tables.contains_key(key)
    }

    /// Atomically return the table for `key`, creating it with `create` if absent
    pub fn get_or_insert_with<F>(&self, key: ResourceKey, create: F) -> Arc<ResourceTable>
    where
        F: FnOnce() -> ResourceTable,
    {
        let entry = self.tables.entry(key).or_insert_with(|| Arc::new(create()));
        Arc::clone(entry.value())
    }

    /// Insert `table` unless `key` is already present; true when inserted
    pub fn insert_if_absent(&self, key: ResourceKey, table: ResourceTable) -> bool {
        let mut inserted = false;
        self.tables.entry(key).or_insert_with(|| {
            inserted = true;
            Arc::new(table)
        });
        inserted
    }

    /// Keys of every cached table
    pub fn keys(&self) -> Vec<ResourceKey> {
        self.tables.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Number of cached tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether nothing has been loaded yet
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
