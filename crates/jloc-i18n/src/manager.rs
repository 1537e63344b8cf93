//! Resource manager: lazy loading, culture fallback, hot reload and
//! auto-created keys

use crate::cache::{ResourceCache, ResourceTable};
use crate::culture::Culture;
use crate::debounce::DebounceScheduler;
use crate::error::{I18nError, I18nResult};
use crate::key::ResourceKey;
use crate::loader::{JsonFileLoader, ResourceFileLoader};
use crate::locator::ResourceLocator;
use crate::resolver;
use crate::watcher::{RefreshGate, ResourceWatcher};
use arc_swap::ArcSwap;
use dashmap::DashSet;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};

/// Culture used for lookups that arrive without one, unless configured
pub const DEFAULT_CULTURE: &str = "en-US";

/// Quiet period before auto-created keys are written, unless configured
pub const DEFAULT_WRITE_DELAY: Duration = Duration::from_millis(1000);

/// Construction options for [`ResourceManager`]
#[derive(Clone)]
pub struct ResourceManagerOptions {
    resources_path: PathBuf,
    resource_name: String,
    auto_create_missing_keys: bool,
    default_culture: Culture,
    write_delay: Duration,
    watch_for_changes: bool,
    loader: Arc<dyn ResourceFileLoader>,
}

impl ResourceManagerOptions {
    /// Options for tables stored under `resources_path`
    pub fn new(resources_path: impl Into<PathBuf>) -> Self {
        Self {
            resources_path: resources_path.into(),
            resource_name: String::new(),
            auto_create_missing_keys: false,
            default_culture: Culture::from_canonical(DEFAULT_CULTURE.to_string()),
            write_delay: DEFAULT_WRITE_DELAY,
            watch_for_changes: true,
            loader: Arc::new(JsonFileLoader),
        }
    }

    /// Resource base name, e.g. `Messages` for `Messages.en-US.json`
    pub fn resource_name(mut self, name: impl Into<String>) -> Self {
        self.resource_name = name.into();
        self
    }

    /// Insert and persist `key -> key` on lookup misses
    pub fn auto_create_missing_keys(mut self, enabled: bool) -> Self {
        self.auto_create_missing_keys = enabled;
        self
    }

    /// Culture substituted for the invariant culture in lookups
    pub fn default_culture(mut self, culture: Culture) -> Self {
        self.default_culture = culture;
        self
    }

    /// Debounce delay for write-back of auto-created keys
    pub fn write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = delay;
        self
    }

    /// Reload tables when their files change
    pub fn watch_for_changes(mut self, enabled: bool) -> Self {
        self.watch_for_changes = enabled;
        self
    }

    /// Replace the JSON file loader
    pub fn loader(mut self, loader: Arc<dyn ResourceFileLoader>) -> Self {
        self.loader = loader;
        self
    }
}

impl fmt::Debug for ResourceManagerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceManagerOptions")
            .field("resources_path", &self.resources_path)
            .field("resource_name", &self.resource_name)
            .field("auto_create_missing_keys", &self.auto_create_missing_keys)
            .field("default_culture", &self.default_culture)
            .field("write_delay", &self.write_delay)
            .field("watch_for_changes", &self.watch_for_changes)
            .finish()
    }
}

/// Process-local cache of JSON string tables.
///
/// Tables load lazily on first use and are never re-read by lookups; only a
/// change notification for their file reloads them. With auto-create enabled,
/// missing keys are added to the requested culture's table and the table is
/// written back once no further keys have been added for the write delay.
///
/// All methods take `&self` and are safe to call from many threads.
pub struct ResourceManager {
    inner: Arc<ManagerInner>,
    watcher: Option<ResourceWatcher>,
}

struct ManagerInner {
    locator: ResourceLocator,
    loader: Arc<dyn ResourceFileLoader>,
    cache: ResourceCache,
    /// Cultures whose files were all discovered, cached or not
    discovered: DashSet<ResourceKey>,
    auto_create: AtomicBool,
    default_culture: ArcSwap<Culture>,
    write_delay: Duration,
    writes: DebounceScheduler<ResourceKey>,
    gate: Arc<RefreshGate>,
}

impl ResourceManager {
    /// Create a manager using the current tokio runtime for write-back timers
    pub fn new(options: ResourceManagerOptions) -> I18nResult<Self> {
        let runtime = Handle::try_current().map_err(|e| I18nError::Runtime(e.to_string()))?;
        Self::with_handle(options, runtime)
    }

    /// Create a manager spawning write-back timers on `runtime`
    pub fn with_handle(options: ResourceManagerOptions, runtime: Handle) -> I18nResult<Self> {
        if options.default_culture.is_invariant() {
            return Err(I18nError::InvalidCulture(
                "the default culture cannot be the invariant culture".to_string(),
            ));
        }

        fs::create_dir_all(&options.resources_path)?;
        let root = fs::canonicalize(&options.resources_path)?;

        let inner = Arc::new(ManagerInner {
            locator: ResourceLocator::new(root.clone(), options.resource_name),
            loader: options.loader,
            cache: ResourceCache::new(),
            discovered: DashSet::new(),
            auto_create: AtomicBool::new(options.auto_create_missing_keys),
            default_culture: ArcSwap::from_pointee(options.default_culture),
            write_delay: options.write_delay,
            writes: DebounceScheduler::new(runtime),
            gate: Arc::new(RefreshGate::new()),
        });

        let watcher = if options.watch_for_changes {
            let weak: Weak<ManagerInner> = Arc::downgrade(&inner);
            let watcher = ResourceWatcher::start(&root, Arc::clone(&inner.gate), move |path| {
                if let Some(inner) = weak.upgrade() {
                    inner.refresh(path);
                }
            })?;
            Some(watcher)
        } else {
            None
        };

        info!(
            "ResourceManager initialized for '{}' in {} (auto-create: {}, watching: {})",
            inner.locator.resource_name(),
            root.display(),
            options.auto_create_missing_keys,
            watcher.is_some()
        );

        Ok(Self { inner, watcher })
    }

    /// The table for `culture`, optionally merged with all of its ancestors.
    ///
    /// Returns `None` when the culture has no table and auto-create is
    /// disabled; with auto-create an empty table is created instead. When
    /// merging, the most specific culture's value wins for every key.
    pub fn get_resource_set(
        &self,
        culture: &Culture,
        try_parents: bool,
    ) -> I18nResult<Option<HashMap<String, String>>> {
        self.inner.get_resource_set(culture, try_parents)
    }

    /// Look up `name` for `culture`.
    ///
    /// An invariant culture is replaced by the default culture. With
    /// `try_parents` the ancestors are searched from the nearest outwards. On a
    /// miss with auto-create enabled, `name -> name` is added to the requested
    /// culture's table, a write-back is scheduled and `name` is returned.
    pub fn get_string(&self, name: &str, culture: &Culture, try_parents: bool) -> I18nResult<Option<String>> {
        self.inner.get_string(name, culture, try_parents)
    }

    /// Look up `name` for the calling thread's culture, with fallback
    pub fn get_string_current(&self, name: &str) -> I18nResult<Option<String>> {
        self.inner.get_string(name, &Culture::current(), true)
    }

    /// Handle a change of the file at `path`, as the watcher does.
    ///
    /// Returns false when the notification was dropped because a write-back
    /// was in progress.
    pub fn notify_changed(&self, path: &Path) -> bool {
        self.inner.gate.deliver(|| self.inner.refresh(path))
    }

    /// Whether lookup misses create keys
    pub fn auto_create_missing_keys(&self) -> bool {
        self.inner.auto_create.load(Ordering::Acquire)
    }

    /// Enable or disable creation of missing keys
    pub fn set_auto_create_missing_keys(&self, enabled: bool) {
        self.inner.auto_create.store(enabled, Ordering::Release);
        debug!("Auto-create of missing keys set to {}", enabled);
    }

    /// Culture used when a lookup arrives with the invariant culture
    pub fn default_culture(&self) -> Culture {
        Culture::clone(&self.inner.default_culture.load())
    }

    /// Replace the default culture; the invariant culture is rejected
    pub fn set_default_culture(&self, culture: Culture) -> I18nResult<()> {
        if culture.is_invariant() {
            return Err(I18nError::InvalidCulture(
                "the default culture cannot be the invariant culture".to_string(),
            ));
        }
        self.inner.default_culture.store(Arc::new(culture));
        Ok(())
    }

    /// Keys of every table loaded or created so far, sorted
    pub fn loaded_keys(&self) -> Vec<ResourceKey> {
        let mut keys = self.inner.cache.keys();
        keys.sort();
        keys
    }

    /// Number of write-backs waiting for their debounce delay
    pub fn pending_writes(&self) -> usize {
        self.inner.writes.pending_count()
    }

    /// Write every table with a pending write-back now instead of waiting.
    ///
    /// Returns how many tables were written.
    pub fn flush(&self) -> usize {
        let keys = self.inner.writes.drain_pending();
        for key in &keys {
            if let Some(table) = self.inner.cache.get(key) {
                self.inner.write_back(key, &table);
            }
        }
        keys.len()
    }

    /// The canonical resources root
    pub fn resources_path(&self) -> &Path {
        self.inner.locator.root()
    }

    /// The resource base name, possibly empty
    pub fn resource_name(&self) -> &str {
        self.inner.locator.resource_name()
    }

    /// Whether a file system watcher is running
    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }
}

impl fmt::Debug for ResourceManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceManager")
            .field("resources_path", &self.inner.locator.root())
            .field("resource_name", &self.inner.locator.resource_name())
            .field("tables", &self.inner.cache.len())
            .field("auto_create", &self.auto_create_missing_keys())
            .field("watcher", &self.watcher)
            .finish()
    }
}

impl ManagerInner {
    fn resolve_culture(&self, culture: &Culture) -> Culture {
        if culture.is_invariant() {
            Culture::clone(&self.default_culture.load())
        } else {
            culture.clone()
        }
    }

    fn get_resource_set(
        self: &Arc<Self>,
        culture: &Culture,
        try_parents: bool,
    ) -> I18nResult<Option<HashMap<String, String>>> {
        let culture = self.resolve_culture(culture);
        self.try_load_resource_set(&culture)?;

        let key = self.locator.key(&culture);
        let exact = match self.cache.get(&key) {
            Some(table) => table,
            None if self.auto_create.load(Ordering::Acquire) => {
                debug!("Creating empty table for {}", key);
                self.cache
                    .get_or_insert_with(key, || ResourceTable::new(self.locator.default_path(&culture)))
            }
            None => return Ok(None),
        };

        if !try_parents {
            return Ok(Some(exact.snapshot()));
        }

        let merged = resolver::merge_chain(&culture.chain(), |candidate, merged| {
            self.try_load_resource_set(candidate)?;
            if let Some(table) = self.cache.get(&self.locator.key(candidate)) {
                table.merge_into(merged);
            }
            Ok(())
        })?;

        Ok(Some(merged))
    }

    fn get_string(self: &Arc<Self>, name: &str, culture: &Culture, try_parents: bool) -> I18nResult<Option<String>> {
        let culture = self.resolve_culture(culture);
        self.try_load_resource_set(&culture)?;

        let found = resolver::resolve_first(&culture.chain(), try_parents, |candidate| {
            self.try_load_resource_set(candidate)?;
            Ok(self
                .cache
                .get(&self.locator.key(candidate))
                .and_then(|table| table.get(name)))
        })?;

        if found.is_some() {
            return Ok(found);
        }

        if !self.auto_create.load(Ordering::Acquire) {
            debug!("'{}' not found for {}", name, culture);
            return Ok(None);
        }

        Ok(Some(self.create_missing(name, &culture)))
    }

    /// Load every file discovered for `culture` whose table is not cached yet.
    ///
    /// A file that fails to load is not cached, so the next lookup retries
    /// it. The failure is returned only when that file belongs to `culture`'s
    /// own fallback chain; failures of unrelated sibling cultures are logged.
    /// A culture without its own file is scanned once, until a change
    /// notification reports a new file for its language.
    fn try_load_resource_set(&self, culture: &Culture) -> I18nResult<()> {
        let key = self.locator.key(culture);
        if self.cache.contains(&key) || self.discovered.contains(&key) {
            return Ok(());
        }

        let discovered = self.locator.discover(culture)?;
        if discovered.is_empty() {
            debug!("No resource file for {}", key);
            self.discovered.insert(key);
            return Ok(());
        }

        let chain = culture.chain();
        let mut first_error = None;

        for file in discovered {
            let file_key = self.locator.key(&file.culture);
            if self.cache.contains(&file_key) {
                continue;
            }

            match self.loader.load(&file.path) {
                Ok(entries) => {
                    let count = entries.len();
                    let table = ResourceTable::from_entries(&file.path, entries);
                    if self.cache.insert_if_absent(file_key.clone(), table) {
                        info!("Loaded {} entries for {} from {}", count, file_key, file.path.display());
                    }
                }
                Err(e) if chain.iter().any(|c| c == &file.culture) => {
                    error!("Failed to load {}: {}", file_key, e);
                    first_error.get_or_insert(e);
                }
                Err(e) => warn!("Skipping sibling table {}: {}", file_key, e),
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                self.discovered.insert(key);
                Ok(())
            }
        }
    }

    fn create_missing(self: &Arc<Self>, name: &str, culture: &Culture) -> String {
        let key = self.locator.key(culture);
        let table = self
            .cache
            .get_or_insert_with(key.clone(), || ResourceTable::new(self.locator.default_path(culture)));

        let (value, inserted) = table.get_or_insert(name, name);
        if inserted {
            info!("Auto-created '{}' in {}", name, key);
            self.schedule_write(key, table);
        }
        value
    }

    fn schedule_write(self: &Arc<Self>, key: ResourceKey, table: Arc<ResourceTable>) {
        let inner = Arc::clone(self);
        let write_key = key.clone();
        self.writes
            .debounce(key, self.write_delay, move || inner.write_back(&write_key, &table));
    }

    /// Persist `table` with change notifications paused.
    ///
    /// Concurrent external edits of the same file are overwritten (last write
    /// wins).
    fn write_back(&self, key: &ResourceKey, table: &ResourceTable) {
        let _paused = self.gate.pause();
        let entries = table.sorted_snapshot();

        match self.loader.save(table.path(), &entries) {
            Ok(()) => info!(
                "Persisted {} entries for {} to {}",
                entries.len(),
                key,
                table.path().display()
            ),
            Err(e) => error!("Failed to persist {}: {}", key, e),
        }
    }

    /// Reload the table backing `path`.
    ///
    /// Tables that are not cached, or cached but still empty (freshly
    /// auto-created and not yet written), are left alone. A file that is not
    /// cached yet makes its language's cultures scan the directory again. The
    /// file is parsed before the table is touched, so a malformed edit keeps
    /// the previous entries.
    fn refresh(&self, path: &Path) {
        let Some(key) = self.locator.key_for_path(path) else {
            debug!("Ignoring change to {}", path.display());
            return;
        };

        let Some(table) = self.cache.get(&key) else {
            let language = key.culture().two_letter_code();
            self.discovered.retain(|seen| seen.culture().two_letter_code() != language);
            debug!("{} changed but is not loaded", key);
            return;
        };

        if !same_file(table.path(), path) {
            debug!("Ignoring {}, {} is loaded from {}", path.display(), key, table.path().display());
            return;
        }

        if table.is_empty() {
            debug!("Not refreshing empty table {}", key);
            return;
        }

        match self.loader.load(path) {
            Ok(entries) => {
                let count = entries.len();
                table.replace_all(entries);
                info!("Reloaded {} entries for {} from {}", count, key, path.display());
            }
            Err(e) => warn!("Keeping previous entries for {}: {}", key, e),
        }
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
