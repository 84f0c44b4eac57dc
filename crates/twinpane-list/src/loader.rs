//! Background, cancellable directory scans.
//!
//! A scan runs on a blocking task, builds entries off the owning context
//! and hands them over in batches through the loader queue. The owning
//! context applies them, so the tree itself is only ever touched by a
//! single writer. Every message carries the scan generation; the applier
//! discards messages from superseded scans, which guarantees a cancelled
//! scan publishes nothing.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use twinpane_core::{
    format_size, Entry, EntryId, FormatConfig, HiddenPolicy, ListError, ListWarning,
    DIRECTORY_SIZE_LABEL,
};

use crate::provider::{stat_for_entry, FileStat, Provider};

/// Name of the per-directory hidden-entry control file.
pub(crate) const HIDDEN_CONTROL_FILE: &str = ".hidden";

/// Message from a scan task to the owning context.
#[derive(Debug)]
pub(crate) enum LoaderUpdate {
    /// A batch of freshly built entries for `parent`.
    Batch {
        generation: u64,
        parent: Option<EntryId>,
        entries: Vec<Entry>,
    },
    /// Scan finished; a monitor for `path` can be installed.
    Completed {
        generation: u64,
        parent: Option<EntryId>,
        path: PathBuf,
        warnings: Vec<ListWarning>,
    },
    /// Directory listing failed; nothing was published.
    Failed { generation: u64, error: ListError },
}

impl LoaderUpdate {
    pub(crate) fn generation(&self) -> u64 {
        match self {
            LoaderUpdate::Batch { generation, .. }
            | LoaderUpdate::Completed { generation, .. }
            | LoaderUpdate::Failed { generation, .. } => *generation,
        }
    }
}

/// Handle to an in-flight scan.
pub(crate) struct ScanTask {
    pub cancel: CancellationToken,
    pub handle: JoinHandle<()>,
}

/// Everything a scan needs, snapshotted at spawn time.
pub(crate) struct ScanRequest {
    pub provider: Arc<dyn Provider>,
    pub path: PathBuf,
    pub parent: Option<EntryId>,
    pub parent_rel: Option<String>,
    pub policy: HiddenPolicy,
    pub format: FormatConfig,
    pub batch_size: usize,
    pub generation: u64,
}

/// Spawn a scan on the blocking pool.
pub(crate) fn spawn_scan(
    request: ScanRequest,
    updates: UnboundedSender<LoaderUpdate>,
) -> ScanTask {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let handle = tokio::task::spawn_blocking(move || scan(request, token, updates));
    ScanTask { cancel, handle }
}

fn scan(request: ScanRequest, cancel: CancellationToken, updates: UnboundedSender<LoaderUpdate>) {
    let ScanRequest {
        provider,
        path,
        parent,
        parent_rel,
        policy,
        format,
        batch_size,
        generation,
    } = request;

    let names = match provider.list_dir(&path) {
        Ok(names) => names,
        Err(error) => {
            warn!(path = %path.display(), %error, "directory listing failed");
            let _ = updates.send(LoaderUpdate::Failed { generation, error });
            return;
        }
    };

    // Names from the sibling control file; malformed or unreadable data is
    // ignored, never fatal.
    let mut listed_hidden = Vec::new();
    if !policy.show_hidden {
        let control = path.join(HIDDEN_CONTROL_FILE);
        if provider.exists(&control) {
            match provider.read_lines(&control) {
                Ok(lines) => listed_hidden = lines,
                Err(error) => {
                    warn!(path = %control.display(), %error, "unreadable control file");
                }
            }
        }
    }

    let mut batch = Vec::with_capacity(batch_size.min(names.len()));
    let mut warnings = Vec::new();

    for name in names {
        // Cooperative cancellation, polled between items.
        if cancel.is_cancelled() {
            debug!(path = %path.display(), generation, "scan cancelled");
            return;
        }

        if !policy.is_visible(&name, &listed_hidden) {
            continue;
        }

        let item_path = path.join(&name);
        match stat_for_entry(provider.as_ref(), &item_path) {
            Ok((stat, is_link)) => {
                batch.push(build_entry(&name, parent_rel.as_deref(), stat, is_link, &format));
                if batch.len() >= batch_size {
                    let entries = std::mem::take(&mut batch);
                    let _ = updates.send(LoaderUpdate::Batch {
                        generation,
                        parent,
                        entries,
                    });
                }
            }
            Err(error) => {
                // Partial-failure isolation: skip the item, keep scanning.
                warn!(path = %item_path.display(), %error, "stat failed, item skipped");
                warnings.push(ListWarning::stat_failed(item_path, &error));
            }
        }
    }

    if !batch.is_empty() {
        let _ = updates.send(LoaderUpdate::Batch {
            generation,
            parent,
            entries: batch,
        });
    }

    let _ = updates.send(LoaderUpdate::Completed {
        generation,
        parent,
        path,
        warnings,
    });
}

/// Build a cache entry from a bare name and its stat result.
pub(crate) fn build_entry(
    name: &str,
    parent_rel: Option<&str>,
    stat: FileStat,
    is_link: bool,
    format: &FormatConfig,
) -> Entry {
    let rel_name = match parent_rel {
        Some(parent) => format!("{parent}/{name}"),
        None => name.to_string(),
    };

    let mut entry = Entry::new(rel_name, stat.kind);
    entry.size = stat.size;
    entry.size_label = if stat.kind.is_dir() {
        DIRECTORY_SIZE_LABEL.into()
    } else {
        format_size(stat.size.max(0) as u64, format.size_format).into()
    };
    entry.mode = stat.mode;
    entry.mtime = stat.mtime;
    entry.uid = stat.uid;
    entry.gid = stat.gid;
    entry.is_link = is_link;
    entry
}
