//! The file list controller.
//!
//! [`FileList`] owns the entry tree, cursor, monitors and scan state. All
//! mutation funnels through `&mut self`, so the tree has exactly one
//! writer: background scans and monitors only push messages onto queues
//! that the owning context drains.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use compact_str::CompactString;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use twinpane_core::{
    sort_key, Entry, EntryId, EntryTree, HiddenPolicy, ListConfig, ListError, ListStats,
    ListWarning, SortColumn, SortConfig, WarningKind,
};

use crate::loader::{spawn_scan, LoaderUpdate, ScanRequest, ScanTask};
use crate::monitor::{DirectoryMonitor, MonitorEvent};
use crate::provider::Provider;
use crate::usage::UsageRegistry;

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// Monitor scope: `None` is the list's own directory, `Some` an expanded
/// node.
pub(crate) type MonitorScope = Option<EntryId>;

/// One pane's directory list.
pub struct FileList {
    pub(crate) instance: u64,
    pub(crate) provider: Arc<dyn Provider>,
    pub(crate) config: ListConfig,
    pub(crate) sort: SortConfig,
    pub(crate) path: PathBuf,
    pub(crate) tree: EntryTree,
    pub(crate) cursor: Option<EntryId>,
    item_to_focus: Option<String>,
    scan: Option<ScanTask>,
    generation: u64,
    loader_tx: UnboundedSender<LoaderUpdate>,
    loader_rx: UnboundedReceiver<LoaderUpdate>,
    event_tx: UnboundedSender<MonitorEvent>,
    pub(crate) event_rx: UnboundedReceiver<MonitorEvent>,
    pub(crate) monitors: HashMap<MonitorScope, DirectoryMonitor>,
    pub(crate) usage: Arc<UsageRegistry>,
    pub(crate) emblems: HashMap<String, Vec<CompactString>>,
    warnings: Vec<ListWarning>,
    usage_busy: bool,
    scroll_target: Option<EntryId>,
}

impl FileList {
    /// Create a list over `provider` with its own usage registry.
    pub fn new(provider: Arc<dyn Provider>, config: ListConfig) -> Self {
        Self::with_usage(provider, config, Arc::new(UsageRegistry::new()))
    }

    /// Create a list sharing a usage registry with other panes.
    pub fn with_usage(
        provider: Arc<dyn Provider>,
        config: ListConfig,
        usage: Arc<UsageRegistry>,
    ) -> Self {
        let (loader_tx, loader_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            instance: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
            provider,
            config,
            sort: SortConfig::default(),
            path: PathBuf::new(),
            tree: EntryTree::new(),
            cursor: None,
            item_to_focus: None,
            scan: None,
            generation: 0,
            loader_tx,
            loader_rx,
            event_tx,
            event_rx,
            monitors: HashMap::new(),
            usage,
            emblems: HashMap::new(),
            warnings: Vec::new(),
            usage_busy: false,
            scroll_target: None,
        }
    }

    /// Unique id of this list instance.
    pub fn instance(&self) -> u64 {
        self.instance
    }

    /// Current directory path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Aggregate top-level statistics.
    pub fn stats(&self) -> &ListStats {
        self.tree.stats()
    }

    /// Look up an entry by id.
    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.tree.get(id)
    }

    /// Number of cached entries, all levels included.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Check whether the list holds no entries.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Warnings collected during the last load.
    pub fn warnings(&self) -> &[ListWarning] {
        &self.warnings
    }

    /// Whether a scan or size computation is outstanding. The two are
    /// tracked separately so a finished size computation cannot mask an
    /// in-flight scan.
    pub fn is_busy(&self) -> bool {
        self.scan.is_some() || self.usage_busy
    }

    /// Cursor row, if any.
    pub fn cursor(&self) -> Option<EntryId> {
        self.cursor
    }

    /// Move the cursor.
    pub fn set_cursor(&mut self, id: EntryId) {
        if self.tree.get(id).is_some() {
            self.cursor = Some(id);
        }
    }

    /// Active sort settings.
    pub fn sort_config(&self) -> &SortConfig {
        &self.sort
    }

    /// Top-level rows in display order.
    pub fn sorted_top_level(&self) -> Vec<EntryId> {
        self.tree.sorted_view(None, &self.sort)
    }

    /// Children of an expanded node in display order.
    pub fn sorted_children(&self, id: EntryId) -> Vec<EntryId> {
        self.tree.sorted_view(Some(id), &self.sort)
    }

    /// Absolute path of an entry.
    pub fn full_path(&self, id: EntryId) -> Option<PathBuf> {
        let entry = self.tree.get(id)?;
        let mut path = self.path.clone();
        for part in entry.name.split('/') {
            path.push(part);
        }
        Some(path)
    }

    /// Sender external collaborators (disk usage, emblem manager) use to
    /// push monitor signals into this list's queue.
    pub fn event_sender(&self) -> UnboundedSender<MonitorEvent> {
        self.event_tx.clone()
    }

    /// Shared disk-usage registry.
    pub fn usage(&self) -> &Arc<UsageRegistry> {
        &self.usage
    }

    /// Entry the view should scroll to after a resort, if any.
    pub fn take_scroll_target(&mut self) -> Option<EntryId> {
        self.scroll_target.take()
    }

    /// Change the list to a new directory.
    ///
    /// Cancels the in-flight scan, this instance's monitors and disk-usage
    /// computations, then starts a fresh background load. `selected` names
    /// the entry to put the cursor on once it appears.
    pub async fn change_path(
        &mut self,
        path: impl Into<PathBuf>,
        selected: Option<&str>,
    ) -> Result<(), ListError> {
        let path = path.into();

        self.cancel_monitors();
        self.usage.cancel_for_instance(self.instance);

        if !self.provider.exists(&path) {
            return Err(ListError::NotFound { path });
        }

        self.path = path.clone();
        self.item_to_focus = selected.map(str::to_string);
        self.warnings.clear();
        self.start_load(path, None, true).await;
        Ok(())
    }

    /// Reload the current directory, keeping the cursor entry by name.
    pub async fn refresh(&mut self) -> Result<(), ListError> {
        let selected = self
            .cursor
            .and_then(|id| self.tree.get(id))
            .map(|entry| entry.name.to_string());
        let path = self.path.clone();
        self.change_path(path, selected.as_deref()).await
    }

    /// Load the children of a directory row in place (lazy expansion).
    ///
    /// Re-expanding discards the stale children first. The parent marker
    /// cannot be expanded.
    pub async fn expand(&mut self, id: EntryId) -> Result<(), ListError> {
        let Some(entry) = self.tree.get(id) else {
            return Ok(());
        };
        if !entry.is_dir() || entry.is_parent() {
            return Ok(());
        }
        let Some(path) = self.full_path(id) else {
            return Ok(());
        };

        self.tree.remove_children(id);
        self.monitors.remove(&Some(id));
        self.prune_dead_monitors();
        self.start_load(path, Some(id), false).await;
        Ok(())
    }

    /// Collapse an expanded node (or the node containing `id`), discarding
    /// its subtree and tearing down its monitor scope.
    pub fn collapse(&mut self, id: EntryId) {
        let target = if !self.tree.children(id).is_empty() {
            Some(id)
        } else {
            self.tree.parent_of(id)
        };
        let Some(target) = target else {
            return;
        };

        self.tree.remove_children(target);
        self.monitors.remove(&Some(target));
        self.prune_dead_monitors();
        self.cursor = Some(target);
    }

    /// Sort by `column`, reversing the direction when already active.
    pub fn set_sort(&mut self, column: SortColumn) {
        if self.sort.column == column {
            self.sort.ascending = !self.sort.ascending;
        } else {
            self.sort.column = column;
        }
        self.resort();
    }

    /// Replace the whole sort configuration.
    pub fn set_sort_config(&mut self, config: SortConfig) {
        self.sort = config;
        self.resort();
    }

    /// Regenerate every materialized sort key and remember the cursor row
    /// so the view can keep it visible.
    fn resort(&mut self) {
        self.tree.regenerate_all_keys(&self.sort);
        self.scroll_target = self.cursor;
    }

    /// Ask the external collaborator to compute a directory's recursive
    /// size. Returns the path to compute, or `None` for non-directories
    /// and the parent marker.
    pub fn request_directory_size(&mut self, id: EntryId) -> Option<PathBuf> {
        let entry = self.tree.get(id)?;
        if !entry.is_dir() || entry.is_parent() {
            return None;
        }
        let path = self.full_path(id)?;
        self.usage.begin(self.instance, &path);
        self.usage_busy = true;
        Some(path)
    }

    /// Update the cached emblem set for a bare file name. The cache is
    /// consulted when an `EmblemChanged` signal arrives.
    pub fn update_emblem_cache(&mut self, name: impl Into<String>, emblems: Vec<String>) {
        self.emblems.insert(
            name.into(),
            emblems.into_iter().map(CompactString::from).collect(),
        );
    }

    /// Pump loader messages until the in-flight scan completes or fails.
    pub async fn wait_for_load(&mut self) -> Result<(), ListError> {
        loop {
            if self.scan.is_none() {
                return Ok(());
            }
            let Some(update) = self.loader_rx.recv().await else {
                return Ok(());
            };
            if update.generation() != self.generation {
                continue;
            }
            if let Some(result) = self.apply_update(update) {
                return result;
            }
        }
    }

    /// Apply any queued loader messages without blocking.
    pub fn pump(&mut self) -> Result<(), ListError> {
        while let Ok(update) = self.loader_rx.try_recv() {
            if update.generation() != self.generation {
                continue;
            }
            if let Some(result) = self.apply_update(update) {
                result?;
            }
        }
        Ok(())
    }

    /// Start a background scan, joining the previous one first.
    async fn start_load(&mut self, path: PathBuf, parent: Option<EntryId>, clear: bool) {
        if let Some(task) = self.scan.take() {
            // Cooperative cancel plus a real join: the previous task must
            // acknowledge teardown before we mutate the tree.
            task.cancel.cancel();
            let _ = task.handle.await;
        }

        self.generation += 1;

        if clear {
            self.tree.clear();
            self.cursor = None;
        }

        // Loading under a node is what materializes its children level.
        if let Some(parent_id) = parent {
            self.tree.set_expanded(parent_id, true);
        }

        // Synthetic go-up row for non-root paths.
        if parent.is_none() && clear && path != self.provider.root_path(&path) {
            let mut marker = Entry::parent_marker();
            marker.sort_key = sort_key(&marker, &self.sort);
            self.tree.insert(None, marker);
        }

        let parent_rel = parent
            .and_then(|id| self.tree.get(id))
            .map(|entry| entry.name.to_string());

        debug!(path = %path.display(), generation = self.generation, "starting scan");

        let request = ScanRequest {
            provider: Arc::clone(&self.provider),
            path,
            parent,
            parent_rel,
            policy: HiddenPolicy::new(self.config.show_hidden, &self.config.always_visible),
            format: self.config.format.clone(),
            batch_size: self.config.batch_size,
            generation: self.generation,
        };
        self.scan = Some(spawn_scan(request, self.loader_tx.clone()));
    }

    /// Apply one loader message. Returns `Some` when the message was
    /// terminal for the current scan.
    fn apply_update(&mut self, update: LoaderUpdate) -> Option<Result<(), ListError>> {
        match update {
            LoaderUpdate::Batch {
                parent, entries, ..
            } => {
                self.apply_batch(parent, entries);
                None
            }
            LoaderUpdate::Completed {
                parent,
                path,
                mut warnings,
                ..
            } => {
                self.warnings.append(&mut warnings);
                self.scan = None;
                self.item_to_focus = None;
                self.install_monitor(parent, &path);

                // Put the cursor on the first row after a fresh top-level
                // load unless a focused entry claimed it already.
                if parent.is_none() && self.cursor.is_none() {
                    self.cursor = self.sorted_top_level().first().copied();
                }
                Some(Ok(()))
            }
            LoaderUpdate::Failed { error, .. } => {
                self.scan = None;
                self.item_to_focus = None;
                Some(Err(error))
            }
        }
    }

    /// Insert a batch of scanned entries, suppressing duplicates created by
    /// monitor events racing the scan.
    fn apply_batch(&mut self, parent: Option<EntryId>, entries: Vec<Entry>) {
        for mut entry in entries {
            let bare = entry.file_name().to_string();
            if let Some(existing) = self.tree.find_child(parent, &bare) {
                // Already present: treat the scan result as a refresh.
                self.tree.update_size(existing, entry.size);
                if let Some(current) = self.tree.get_mut(existing) {
                    current.size_label = entry.size_label.clone();
                    current.mode = entry.mode;
                    current.mtime = entry.mtime;
                    current.uid = entry.uid;
                    current.gid = entry.gid;
                }
                self.tree.regenerate_key(existing, &self.sort);
                continue;
            }

            if let Some(emblems) = self.emblems.get(&bare) {
                entry.emblems = emblems.clone();
            }
            entry.sort_key = sort_key(&entry, &self.sort);

            let focus = self.item_to_focus.as_deref() == Some(entry.name.as_str());
            let id = self.tree.insert(parent, entry);
            if focus {
                self.cursor = Some(id);
                self.item_to_focus = None;
            }
        }
    }

    /// Install a monitor for a completed scan scope, capability-gated.
    fn install_monitor(&mut self, scope: MonitorScope, path: &Path) {
        if !self.provider.capabilities().monitor {
            return;
        }
        match DirectoryMonitor::install(path, self.event_tx.clone()) {
            Ok(monitor) => {
                self.monitors.insert(scope, monitor);
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "monitor install failed");
                self.warnings.push(ListWarning::new(
                    path,
                    error.to_string(),
                    WarningKind::MonitorFailed,
                ));
            }
        }
    }

    /// Tear down every monitor scope.
    pub(crate) fn cancel_monitors(&mut self) {
        self.monitors.clear();
    }

    /// Drop monitors whose scope entry no longer exists.
    pub(crate) fn prune_dead_monitors(&mut self) {
        let tree = &self.tree;
        self.monitors.retain(|scope, _| match scope {
            None => true,
            Some(id) => tree.get(*id).is_some(),
        });
    }

    /// Reset the cursor when its entry disappeared.
    pub(crate) fn fix_cursor(&mut self) {
        if let Some(id) = self.cursor {
            if self.tree.get(id).is_none() {
                self.cursor = None;
            }
        }
    }

    /// Set the size-computation busy flag, driven by the directory-size
    /// signals.
    pub(crate) fn set_usage_busy(&mut self, busy: bool) {
        self.usage_busy = busy;
    }
}

impl Drop for FileList {
    fn drop(&mut self) {
        if let Some(task) = &self.scan {
            task.cancel.cancel();
        }
        self.usage.cancel_for_instance(self.instance);
    }
}
