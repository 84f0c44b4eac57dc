//! Incremental reconciliation of monitor events into the entry tree.
//!
//! Events are applied on the owning context, one at a time, in arrival
//! order. Each event is resolved against the materialized tree by walking
//! the path fragments relative to the list root; events for nodes that were
//! never materialized are dropped.

use std::path::Path;

use tracing::{debug, warn};

use twinpane_core::{format_size, sort_key, EntryId, HiddenPolicy, DIRECTORY_SIZE_LABEL};

use crate::list::FileList;
use crate::loader::{build_entry, HIDDEN_CONTROL_FILE};
use crate::monitor::{MonitorEvent, MonitorSignal};
use crate::provider::stat_for_entry;

impl FileList {
    /// Drain the monitor queue and apply every pending event.
    pub fn process_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.apply_event(event);
        }
    }

    /// Apply one monitor event to the cached tree.
    pub fn apply_event(&mut self, event: MonitorEvent) {
        match event.signal {
            MonitorSignal::DirectorySizeChanged => self.update_directory_size(&event.path),
            MonitorSignal::DirectorySizeStopped => self.set_usage_busy(false),
            _ => self.apply_structural_event(event),
        }
    }

    fn apply_structural_event(&mut self, event: MonitorEvent) {
        let Some((parent, name)) = self.resolve(&event.path) else {
            debug!(path = %event.path.display(), "event outside materialized tree dropped");
            return;
        };
        let dir_path = event
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.path.clone());

        match event.signal {
            MonitorSignal::Created => {
                // A scan batch may have inserted the entry already.
                if self.tree.find_child(parent, &name).is_none()
                    && self.event_entry_visible(&dir_path, &name)
                {
                    self.add_from_event(parent, &name, &dir_path);
                } else {
                    self.update_details(parent, &name, &dir_path);
                }
            }
            MonitorSignal::Deleted => {
                if let Some(id) = self.tree.find_child(parent, &name) {
                    self.monitors.remove(&Some(id));
                    self.tree.remove(id);
                    self.prune_dead_monitors();
                    self.fix_cursor();
                }
            }
            MonitorSignal::Moved => {
                let Some(new_name) = event
                    .other_path
                    .as_deref()
                    .and_then(Path::file_name)
                    .map(|name| name.to_string_lossy().into_owned())
                else {
                    return;
                };

                if let Some(id) = self.tree.find_child(parent, &name) {
                    self.monitors.remove(&Some(id));
                    self.tree.remove(id);
                    self.prune_dead_monitors();
                    self.fix_cursor();
                }

                // The new name falls under the hidden policy on its own.
                if self.tree.find_child(parent, &new_name).is_none() {
                    if self.event_entry_visible(&dir_path, &new_name) {
                        self.add_from_event(parent, &new_name, &dir_path);
                    }
                } else {
                    self.update_details(parent, &new_name, &dir_path);
                }
            }
            MonitorSignal::Changed => self.update_details(parent, &name, &dir_path),
            MonitorSignal::AttributeChanged => self.update_attributes(parent, &name, &dir_path),
            MonitorSignal::EmblemChanged => {
                if let Some(id) = self.tree.find_child(parent, &name) {
                    let emblems = self.emblems.get(&name).cloned().unwrap_or_default();
                    if let Some(entry) = self.tree.get_mut(id) {
                        entry.emblems = emblems;
                    }
                }
            }
            MonitorSignal::DirectorySizeChanged | MonitorSignal::DirectorySizeStopped => {}
        }
    }

    /// Resolve an absolute event path to `(materialized parent, bare name)`.
    ///
    /// Returns `None` for paths outside the list root and for paths whose
    /// intermediate directories were never expanded. A directory that is
    /// merely listed at some level does not make its own children level
    /// materialized, so events below it are dropped.
    fn resolve(&self, path: &Path) -> Option<(Option<EntryId>, String)> {
        let rel = path.strip_prefix(&self.path).ok()?;
        let fragments: Vec<String> = rel
            .components()
            .map(|part| part.as_os_str().to_string_lossy().into_owned())
            .collect();
        let (name, parents) = fragments.split_last()?;

        let mut parent = None;
        for fragment in parents {
            let id = self.tree.find_child(parent, fragment)?;
            if !self.tree.is_expanded(id) {
                return None;
            }
            parent = Some(id);
        }
        Some((parent, name.clone()))
    }

    /// Evaluate the hidden policy for an event-reported name, consulting the
    /// directory's control file the same way a scan does.
    fn event_entry_visible(&self, dir_path: &Path, name: &str) -> bool {
        let policy = HiddenPolicy::new(self.config.show_hidden, &self.config.always_visible);
        let mut listed_hidden = Vec::new();
        if !policy.show_hidden {
            let control = dir_path.join(HIDDEN_CONTROL_FILE);
            if self.provider.exists(&control) {
                if let Ok(lines) = self.provider.read_lines(&control) {
                    listed_hidden = lines;
                }
            }
        }
        policy.is_visible(name, &listed_hidden)
    }

    /// Stat and insert a freshly reported entry.
    fn add_from_event(&mut self, parent: Option<EntryId>, name: &str, dir_path: &Path) {
        let item_path = dir_path.join(name);
        match stat_for_entry(self.provider.as_ref(), &item_path) {
            Ok((stat, is_link)) => {
                let parent_rel = parent
                    .and_then(|id| self.tree.get(id))
                    .map(|entry| entry.name.to_string());
                let mut entry =
                    build_entry(name, parent_rel.as_deref(), stat, is_link, &self.config.format);
                if let Some(emblems) = self.emblems.get(name) {
                    entry.emblems = emblems.clone();
                }
                entry.sort_key = sort_key(&entry, &self.sort);
                self.tree.insert(parent, entry);
            }
            Err(error) => {
                // The object may already be gone again; skip it.
                warn!(path = %item_path.display(), %error, "stat for event failed");
            }
        }
    }

    /// Refresh size, mode and time of an existing entry.
    fn update_details(&mut self, parent: Option<EntryId>, name: &str, dir_path: &Path) {
        let Some(id) = self.tree.find_child(parent, name) else {
            return;
        };
        let item_path = dir_path.join(name);
        match stat_for_entry(self.provider.as_ref(), &item_path) {
            Ok((stat, is_link)) => {
                // Route through the tree so top-level totals follow the
                // new size.
                self.tree.update_size(id, stat.size);
                if let Some(entry) = self.tree.get_mut(id) {
                    entry.size_label = if stat.kind.is_dir() {
                        DIRECTORY_SIZE_LABEL.into()
                    } else {
                        format_size(stat.size.max(0) as u64, self.config.format.size_format)
                            .into()
                    };
                    entry.mode = stat.mode;
                    entry.mtime = stat.mtime;
                    entry.uid = stat.uid;
                    entry.gid = stat.gid;
                    entry.is_link = is_link;
                }
                self.tree.regenerate_key(id, &self.sort);
            }
            Err(error) => {
                warn!(path = %item_path.display(), %error, "detail refresh failed");
            }
        }
    }

    /// Refresh only mode and time, keeping the cached size.
    fn update_attributes(&mut self, parent: Option<EntryId>, name: &str, dir_path: &Path) {
        let Some(id) = self.tree.find_child(parent, name) else {
            return;
        };
        let item_path = dir_path.join(name);
        match stat_for_entry(self.provider.as_ref(), &item_path) {
            Ok((stat, _)) => {
                if let Some(entry) = self.tree.get_mut(id) {
                    entry.mode = stat.mode;
                    entry.mtime = stat.mtime;
                    entry.uid = stat.uid;
                    entry.gid = stat.gid;
                }
                self.tree.regenerate_key(id, &self.sort);
            }
            Err(error) => {
                warn!(path = %item_path.display(), %error, "attribute refresh failed");
            }
        }
    }

    /// Replace a directory's `<DIR>` label with its published recursive
    /// size.
    fn update_directory_size(&mut self, path: &Path) {
        let Some((parent, name)) = self.resolve(path) else {
            return;
        };
        let Some(id) = self.tree.find_child(parent, &name) else {
            return;
        };
        let Some(result) = self.usage.get(self.instance, path) else {
            return;
        };
        self.tree.update_size(id, result.total_size as i64);
        let label = format_size(result.total_size, self.config.format.size_format);
        if let Some(entry) = self.tree.get_mut(id) {
            entry.size_label = label.into();
        }
        self.tree.regenerate_key(id, &self.sort);
    }
}
