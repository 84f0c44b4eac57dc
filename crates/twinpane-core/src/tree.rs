//! Arena-backed entry tree and aggregate statistics.
//!
//! Entries are stored in an arena addressed by [`EntryId`]; parent and
//! child relations are index links, so there are no ownership cycles and
//! removing a subtree cannot leave dangling references. Only the top level
//! and explicitly expanded directories hold children.

use serde::{Deserialize, Serialize};

use crate::entry::{Entry, EntryId, EntryKind};
use crate::sort::{sort_key, SortConfig};

/// Aggregate counters for the top-level scope only.
///
/// Entries inside expanded subdirectories are deliberately excluded, so the
/// visible totals always describe the current directory itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListStats {
    /// Number of top-level directories.
    pub dirs_count: u64,
    /// Number of selected top-level directories.
    pub dirs_selected: u64,
    /// Number of top-level files (links and special files included).
    pub files_count: u64,
    /// Number of selected top-level files.
    pub files_selected: u64,
    /// Total size of top-level regular files in bytes.
    pub size_total: u64,
    /// Total size of selected top-level regular files.
    pub size_selected: u64,
}

impl ListStats {
    fn record_insert(&mut self, entry: &Entry) {
        match entry.kind {
            EntryKind::Directory => self.dirs_count += 1,
            EntryKind::File => {
                self.files_count += 1;
                self.size_total += entry.size.max(0) as u64;
            }
            EntryKind::Symlink { .. } | EntryKind::Other => self.files_count += 1,
            EntryKind::Parent => {}
        }
        if entry.selected {
            self.record_selection(entry.kind, entry.size, true);
        }
    }

    fn record_remove(&mut self, entry: &Entry) {
        match entry.kind {
            EntryKind::Directory => self.dirs_count -= 1,
            EntryKind::File => {
                self.files_count -= 1;
                self.size_total -= entry.size.max(0) as u64;
            }
            EntryKind::Symlink { .. } | EntryKind::Other => self.files_count -= 1,
            EntryKind::Parent => {}
        }
        if entry.selected {
            self.record_selection(entry.kind, entry.size, false);
        }
    }

    fn record_selection(&mut self, kind: EntryKind, size: i64, selected: bool) {
        match kind {
            EntryKind::Directory => {
                if selected {
                    self.dirs_selected += 1;
                } else {
                    self.dirs_selected -= 1;
                }
            }
            EntryKind::File => {
                let size = size.max(0) as u64;
                if selected {
                    self.files_selected += 1;
                    self.size_selected += size;
                } else {
                    self.files_selected -= 1;
                    self.size_selected -= size;
                }
            }
            EntryKind::Symlink { .. } | EntryKind::Other => {
                if selected {
                    self.files_selected += 1;
                } else {
                    self.files_selected -= 1;
                }
            }
            EntryKind::Parent => {}
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    entry: Entry,
    parent: Option<EntryId>,
    children: Vec<EntryId>,
    expanded: bool,
}

/// Hierarchical, mutable collection of entries with top-level statistics.
#[derive(Debug, Default)]
pub struct EntryTree {
    slots: Vec<Option<Slot>>,
    roots: Vec<EntryId>,
    stats: ListStats,
    live: usize,
}

impl EntryTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries, all levels included.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check if the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Aggregate top-level statistics.
    pub fn stats(&self) -> &ListStats {
        &self.stats
    }

    /// Drop every entry and reset the statistics.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.roots.clear();
        self.stats = ListStats::default();
        self.live = 0;
    }

    /// Insert an entry under `parent` (or at top level) and return its id.
    ///
    /// Sibling-name uniqueness is the caller's responsibility; use
    /// [`EntryTree::find_child`] for duplicate suppression first.
    pub fn insert(&mut self, parent: Option<EntryId>, entry: Entry) -> EntryId {
        let id = EntryId::new(self.slots.len() as u32);

        if parent.is_none() {
            self.stats.record_insert(&entry);
        }

        self.slots.push(Some(Slot {
            entry,
            parent,
            children: Vec::new(),
            expanded: false,
        }));
        self.live += 1;

        match parent {
            Some(parent_id) => {
                if let Some(slot) = self.slot_mut(parent_id) {
                    slot.children.push(id);
                }
            }
            None => self.roots.push(id),
        }

        id
    }

    /// Get an entry by id.
    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.slot(id).map(|slot| &slot.entry)
    }

    /// Get a mutable entry by id.
    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut Entry> {
        self.slot_mut(id).map(|slot| &mut slot.entry)
    }

    /// Parent of an entry, `None` for top-level entries.
    pub fn parent_of(&self, id: EntryId) -> Option<EntryId> {
        self.slot(id).and_then(|slot| slot.parent)
    }

    /// Check if an entry sits directly under the list root.
    pub fn is_top_level(&self, id: EntryId) -> bool {
        self.slot(id).is_some_and(|slot| slot.parent.is_none())
    }

    /// Materialized children of an entry, in insertion order.
    pub fn children(&self, id: EntryId) -> &[EntryId] {
        self.slot(id).map(|slot| slot.children.as_slice()).unwrap_or(&[])
    }

    /// Top-level entries in insertion order.
    pub fn top_level(&self) -> &[EntryId] {
        &self.roots
    }

    /// Iterate over all live entries.
    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &Entry)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.as_ref()
                .map(|slot| (EntryId::new(index as u32), &slot.entry))
        })
    }

    /// Remove an entry and its whole subtree. Returns the removed entry.
    ///
    /// Top-level statistics are adjusted for the removed entry only; nested
    /// entries never contributed to them.
    pub fn remove(&mut self, id: EntryId) -> Option<Entry> {
        let parent = self.slot(id)?.parent;
        match parent {
            Some(parent_id) => {
                if let Some(slot) = self.slot_mut(parent_id) {
                    slot.children.retain(|child| *child != id);
                }
            }
            None => self.roots.retain(|child| *child != id),
        }

        let mut removed = None;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(slot) = self
                .slots
                .get_mut(current.index())
                .and_then(|slot| slot.take())
            else {
                continue;
            };
            stack.extend(slot.children.iter().copied());
            self.live -= 1;

            if current == id {
                if slot.parent.is_none() {
                    self.stats.record_remove(&slot.entry);
                }
                removed = Some(slot.entry);
            }
        }
        removed
    }

    /// Discard the materialized children of an entry (collapse). The node
    /// is no longer considered expanded afterwards.
    pub fn remove_children(&mut self, id: EntryId) {
        let children = match self.slot_mut(id) {
            Some(slot) => {
                slot.expanded = false;
                std::mem::take(&mut slot.children)
            }
            None => return,
        };
        let mut stack = children;
        while let Some(current) = stack.pop() {
            if let Some(slot) = self
                .slots
                .get_mut(current.index())
                .and_then(|slot| slot.take())
            {
                stack.extend(slot.children.iter().copied());
                self.live -= 1;
            }
        }
    }

    /// Mark a node's children level as materialized. The top level is
    /// always materialized and needs no flag.
    pub fn set_expanded(&mut self, id: EntryId, expanded: bool) {
        if let Some(slot) = self.slot_mut(id) {
            slot.expanded = expanded;
        }
    }

    /// Whether a node's children level has been materialized.
    pub fn is_expanded(&self, id: EntryId) -> bool {
        self.slot(id).is_some_and(|slot| slot.expanded)
    }

    /// Update an entry's cached size, keeping top-level totals consistent.
    ///
    /// The new contribution is added before the old one is subtracted, so
    /// the unsigned totals cannot underflow on a shrinking file.
    pub fn update_size(&mut self, id: EntryId, size: i64) {
        let (old, top_level, is_file, selected) = {
            let Some(slot) = self.slots.get_mut(id.index()).and_then(|slot| slot.as_mut())
            else {
                return;
            };
            let old = slot.entry.size;
            slot.entry.size = size;
            (
                old,
                slot.parent.is_none(),
                slot.entry.is_file(),
                slot.entry.selected,
            )
        };

        if !top_level || !is_file {
            return;
        }
        let old = old.max(0) as u64;
        let new = size.max(0) as u64;
        self.stats.size_total += new;
        self.stats.size_total -= old;
        if selected {
            self.stats.size_selected += new;
            self.stats.size_selected -= old;
        }
    }

    /// Resolve a child by bare name under `parent` (or at top level).
    ///
    /// Nested entries store names relative to the list root, so the lookup
    /// joins the parent's relative name first.
    pub fn find_child(&self, parent: Option<EntryId>, name: &str) -> Option<EntryId> {
        let (ids, full_name) = match parent {
            None => (self.roots.as_slice(), name.to_string()),
            Some(parent_id) => {
                let slot = self.slot(parent_id)?;
                (
                    slot.children.as_slice(),
                    format!("{}/{}", slot.entry.name, name),
                )
            }
        };

        ids.iter()
            .copied()
            .find(|id| self.get(*id).is_some_and(|entry| entry.name == full_name))
    }

    /// Set an entry's selection state, keeping counters consistent.
    ///
    /// Returns whether the state actually changed. The parent marker is
    /// never selectable; statistics only move for top-level entries.
    pub fn set_selected(&mut self, id: EntryId, selected: bool) -> bool {
        let Some(slot) = self.slots.get_mut(id.index()).and_then(|slot| slot.as_mut())
        else {
            return false;
        };
        if slot.entry.is_parent() || slot.entry.selected == selected {
            return false;
        }
        slot.entry.selected = selected;
        let top_level = slot.parent.is_none();
        let kind = slot.entry.kind;
        let size = slot.entry.size;
        if top_level {
            self.stats.record_selection(kind, size, selected);
        }
        true
    }

    /// Recompute the selected counters with a full top-level rescan.
    pub fn recount_selection(&mut self) {
        let mut dirs = 0;
        let mut files = 0;
        let mut size = 0;

        for id in &self.roots {
            let Some(entry) = self.slot(*id).map(|slot| &slot.entry) else {
                continue;
            };
            if !entry.selected || entry.is_parent() {
                continue;
            }
            match entry.kind {
                EntryKind::Directory => dirs += 1,
                EntryKind::File => {
                    files += 1;
                    size += entry.size.max(0) as u64;
                }
                EntryKind::Symlink { .. } | EntryKind::Other => files += 1,
                EntryKind::Parent => {}
            }
        }

        self.stats.dirs_selected = dirs;
        self.stats.files_selected = files;
        self.stats.size_selected = size;
    }

    /// Regenerate the sort key of a single entry.
    pub fn regenerate_key(&mut self, id: EntryId, config: &SortConfig) {
        if let Some(slot) = self.slots.get_mut(id.index()).and_then(|slot| slot.as_mut()) {
            slot.entry.sort_key = sort_key(&slot.entry, config);
        }
    }

    /// Regenerate sort keys for every materialized entry (explicit resort).
    pub fn regenerate_all_keys(&mut self, config: &SortConfig) {
        for slot in self.slots.iter_mut().flatten() {
            slot.entry.sort_key = sort_key(&slot.entry, config);
        }
    }

    /// Children of `parent` (or the top level) ordered by sort key and
    /// direction.
    pub fn sorted_view(&self, parent: Option<EntryId>, config: &SortConfig) -> Vec<EntryId> {
        let mut ids: Vec<EntryId> = match parent {
            None => self.roots.clone(),
            Some(parent_id) => self.children(parent_id).to_vec(),
        };
        ids.sort_by(|a, b| {
            let left = self.get(*a).map(|e| e.sort_key.as_str()).unwrap_or("");
            let right = self.get(*b).map(|e| e.sort_key.as_str()).unwrap_or("");
            left.cmp(right)
        });
        if !config.ascending {
            ids.reverse();
        }
        ids
    }

    fn slot(&self, id: EntryId) -> Option<&Slot> {
        self.slots.get(id.index()).and_then(|slot| slot.as_ref())
    }

    fn slot_mut(&mut self, id: EntryId) -> Option<&mut Slot> {
        self.slots.get_mut(id.index()).and_then(|slot| slot.as_mut())
    }
}
