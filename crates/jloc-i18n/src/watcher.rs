//! File change notifications for the resources tree

use crate::error::I18nResult;
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Suppresses change delivery while the cache writes its own files.
///
/// Deliveries run under the read side of a lock and are dropped while any
/// pause is active. [`RefreshGate::pause`] takes the write side first, so it
/// waits for in-flight deliveries and none can start until the returned guard
/// is dropped. Pauses nest, so overlapping writers are safe.
#[derive(Debug, Default)]
pub struct RefreshGate {
    paused: AtomicUsize,
    delivery: RwLock<()>,
}

impl RefreshGate {
    /// Create an open gate
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `deliver` unless paused; returns whether it ran
    pub fn deliver<F: FnOnce()>(&self, deliver: F) -> bool {
        let _delivering = self.delivery.read();
        if self.paused.load(Ordering::Acquire) > 0 {
            return false;
        }
        deliver();
        true
    }

    /// Pause delivery until the guard is dropped
    pub fn pause(&self) -> PauseGuard<'_> {
        let _drained = self.delivery.write();
        self.paused.fetch_add(1, Ordering::AcqRel);
        PauseGuard { gate: self }
    }

    /// Whether at least one pause is active
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire) > 0
    }
}

/// Resumes delivery on drop
#[must_use = "delivery resumes as soon as the guard is dropped"]
pub struct PauseGuard<'a> {
    gate: &'a RefreshGate,
}

impl Drop for PauseGuard<'_> {
    fn drop(&mut self) {
        self.gate.paused.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Watches a resources root and forwards create/modify events for `*.json`
/// files through a [`RefreshGate`].
pub struct ResourceWatcher {
    _watcher: RecommendedWatcher,
    root: PathBuf,
}

impl ResourceWatcher {
    /// Start watching `root` recursively, calling `on_change` for every changed table file
    pub fn start<F>(root: &Path, gate: Arc<RefreshGate>, on_change: F) -> I18nResult<Self>
    where
        F: Fn(&Path) + Send + 'static,
    {
        let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| match result {
            Ok(event) => {
                if !is_content_change(&event.kind) {
                    return;
                }
                for path in event.paths.iter().filter(|path| is_table_file(path)) {
                    if !gate.deliver(|| on_change(path)) {
                        debug!("Dropped change event for {} during write-back", path.display());
                    }
                }
            }
            Err(e) => error!("Resource watcher error: {}", e),
        })?;

        watcher.watch(root, RecursiveMode::Recursive)?;
        info!("Watching {} for resource changes", root.display());

        Ok(Self {
            _watcher: watcher,
            root: root.to_path_buf(),
        })
    }

    /// The watched directory
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl fmt::Debug for ResourceWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceWatcher").field("root", &self.root).finish()
    }
}

fn is_content_change(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(_) => true,
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        _ => false,
    }
}

fn is_table_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
