//! Directory monitors and the monitor signal queue.
//!
//! Each materialized node gets its own non-recursive watcher; raw `notify`
//! events are translated into [`MonitorSignal`]s and pushed onto the list's
//! event queue, where the reconciler drains them on the owning context.

use std::path::{Path, PathBuf};

use notify::event::{ModifyKind, RenameMode};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use twinpane_core::ListError;

/// Asynchronous filesystem change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorSignal {
    Created,
    Deleted,
    Moved,
    Changed,
    AttributeChanged,
    EmblemChanged,
    DirectorySizeChanged,
    DirectorySizeStopped,
}

/// One queued monitor event. `other_path` carries the new path for
/// [`MonitorSignal::Moved`].
#[derive(Debug, Clone)]
pub struct MonitorEvent {
    pub signal: MonitorSignal,
    pub path: PathBuf,
    pub other_path: Option<PathBuf>,
}

impl MonitorEvent {
    /// Create an event with only a primary path.
    pub fn new(signal: MonitorSignal, path: impl Into<PathBuf>) -> Self {
        Self {
            signal,
            path: path.into(),
            other_path: None,
        }
    }

    /// Create a move event.
    pub fn moved(old: impl Into<PathBuf>, new: impl Into<PathBuf>) -> Self {
        Self {
            signal: MonitorSignal::Moved,
            path: old.into(),
            other_path: Some(new.into()),
        }
    }
}

/// A watcher scoped to one materialized directory node.
///
/// Dropping the monitor tears the watch down.
pub struct DirectoryMonitor {
    _watcher: RecommendedWatcher,
    path: PathBuf,
}

impl DirectoryMonitor {
    /// Install a non-recursive watcher on `path`, forwarding translated
    /// events into the list's queue.
    pub fn install(
        path: &Path,
        queue: UnboundedSender<MonitorEvent>,
    ) -> Result<Self, ListError> {
        let mut watcher = notify::recommended_watcher(move |result: notify::Result<notify::Event>| {
            if let Ok(event) = result {
                for translated in translate(&event) {
                    let _ = queue.send(translated);
                }
            }
        })
        .map_err(|e| ListError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::other(e),
        })?;

        watcher
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|e| ListError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::other(e),
            })?;

        debug!(path = %path.display(), "directory monitor installed");

        Ok(Self {
            _watcher: watcher,
            path: path.to_path_buf(),
        })
    }

    /// Path this monitor watches.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DirectoryMonitor {
    fn drop(&mut self) {
        debug!(path = %self.path.display(), "directory monitor removed");
    }
}

/// Translate a raw `notify` event into monitor signals.
pub(crate) fn translate(event: &notify::Event) -> Vec<MonitorEvent> {
    match &event.kind {
        EventKind::Create(_) => event
            .paths
            .iter()
            .map(|path| MonitorEvent::new(MonitorSignal::Created, path))
            .collect(),

        EventKind::Remove(_) => event
            .paths
            .iter()
            .map(|path| MonitorEvent::new(MonitorSignal::Deleted, path))
            .collect(),

        EventKind::Modify(ModifyKind::Name(mode)) => match (mode, event.paths.as_slice()) {
            (RenameMode::Both, [old, new]) => vec![MonitorEvent::moved(old, new)],
            (RenameMode::From, paths) => paths
                .iter()
                .map(|path| MonitorEvent::new(MonitorSignal::Deleted, path))
                .collect(),
            (RenameMode::To, paths) => paths
                .iter()
                .map(|path| MonitorEvent::new(MonitorSignal::Created, path))
                .collect(),
            (_, [old, new]) => vec![MonitorEvent::moved(old, new)],
            (_, paths) => paths
                .iter()
                .map(|path| MonitorEvent::new(MonitorSignal::Changed, path))
                .collect(),
        },

        EventKind::Modify(ModifyKind::Metadata(_)) => event
            .paths
            .iter()
            .map(|path| MonitorEvent::new(MonitorSignal::AttributeChanged, path))
            .collect(),

        EventKind::Modify(_) | EventKind::Any | EventKind::Other => event
            .paths
            .iter()
            .map(|path| MonitorEvent::new(MonitorSignal::Changed, path))
            .collect(),

        EventKind::Access(_) => Vec::new(),
    }
}
