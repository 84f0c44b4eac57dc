//! Selection operations on top-level rows.
//!
//! Pattern operations compile the glob once and walk the top level only;
//! per-row toggles update the selection counters incrementally, pattern
//! sweeps finish with a full recount.

use std::path::PathBuf;

use globset::{Glob, GlobMatcher};

use twinpane_core::{EntryId, ListError};

use crate::list::FileList;

impl FileList {
    /// Select every top-level entry matching `pattern` (all entries when
    /// `None`). Names in `exclude` are actively deselected whether or not
    /// they match the pattern. Returns the number of selected rows.
    pub fn select_all(
        &mut self,
        pattern: Option<&str>,
        exclude: &[String],
    ) -> Result<usize, ListError> {
        let matcher = compile_pattern(pattern)?;
        let mut selected = 0;

        for id in self.tree.top_level().to_vec() {
            let Some(entry) = self.tree.get(id) else {
                continue;
            };
            if entry.kind.is_parent() {
                continue;
            }
            let name = entry.name.to_string();
            if exclude.iter().any(|excluded| *excluded == name) {
                self.tree.set_selected(id, false);
            } else if matcher.is_match(&name) {
                self.tree.set_selected(id, true);
                selected += 1;
            }
        }

        self.tree.recount_selection();
        Ok(selected)
    }

    /// Deselect every top-level entry matching `pattern` (all entries when
    /// `None`). Returns the number of deselected rows.
    pub fn deselect_all(&mut self, pattern: Option<&str>) -> Result<usize, ListError> {
        let matcher = compile_pattern(pattern)?;
        let mut deselected = 0;

        for id in self.tree.top_level().to_vec() {
            let Some(entry) = self.tree.get(id) else {
                continue;
            };
            if entry.kind.is_parent() || !matcher.is_match(entry.name.as_str()) {
                continue;
            }
            if self.tree.set_selected(id, false) {
                deselected += 1;
            }
        }

        self.tree.recount_selection();
        Ok(deselected)
    }

    /// Flip the selection of every top-level entry matching `pattern`.
    pub fn invert_selection(&mut self, pattern: Option<&str>) -> Result<(), ListError> {
        let matcher = compile_pattern(pattern)?;

        for id in self.tree.top_level().to_vec() {
            let Some(entry) = self.tree.get(id) else {
                continue;
            };
            if entry.kind.is_parent() || !matcher.is_match(entry.name.as_str()) {
                continue;
            }
            let target = !entry.selected;
            self.tree.set_selected(id, target);
        }

        self.tree.recount_selection();
        Ok(())
    }

    /// Toggle the cursor row and optionally advance the cursor in display
    /// order. The parent marker never toggles but the cursor still moves.
    pub fn toggle_selection(&mut self, advance: bool) {
        let Some(id) = self.cursor else {
            return;
        };
        if let Some(entry) = self.tree.get(id) {
            let target = !entry.selected;
            self.tree.set_selected(id, target);
        }
        if advance {
            self.advance_cursor(id);
        }
    }

    /// Move the cursor to the row after `id` in display order. The last
    /// child of an expanded node continues after its parent.
    fn advance_cursor(&mut self, id: EntryId) {
        let parent = self.tree.parent_of(id);
        let siblings = self.tree.sorted_view(parent, &self.sort);
        if let Some(position) = siblings.iter().position(|row| *row == id) {
            if let Some(next) = siblings.get(position + 1) {
                self.cursor = Some(*next);
                return;
            }
        }

        if let Some(parent_id) = parent {
            let grandparent = self.tree.parent_of(parent_id);
            let rows = self.tree.sorted_view(grandparent, &self.sort);
            if let Some(position) = rows.iter().position(|row| *row == parent_id) {
                if let Some(next) = rows.get(position + 1) {
                    self.cursor = Some(*next);
                }
            }
        }
    }

    /// Set the selection of a top-level display-order range to the opposite
    /// of the first entry's state before the call. The parent marker is
    /// clamped out of the range, and `start`/`end` may come in either order.
    pub fn select_range(&mut self, start: usize, end: usize) {
        let view = self.tree.sorted_view(None, &self.sort);
        if view.is_empty() {
            return;
        }

        let (mut start, end) = if start > end { (end, start) } else { (start, end) };
        let end = end.min(view.len() - 1);

        if self
            .tree
            .get(view[start.min(end)])
            .is_some_and(|entry| entry.kind.is_parent())
        {
            start += 1;
        }
        if start > end {
            return;
        }

        let target = !self
            .tree
            .get(view[start])
            .map(|entry| entry.selected)
            .unwrap_or(false);

        for index in start..=end {
            self.tree.set_selected(view[index], target);
        }
    }

    /// Selected entry paths in display order, expanded children included.
    /// Falls back to the cursor row when nothing is selected. With
    /// `files_only`, directories are skipped.
    pub fn selected_entries(&self, relative: bool, files_only: bool) -> Vec<PathBuf> {
        let mut names = Vec::new();
        for id in self.tree.sorted_view(None, &self.sort) {
            self.collect_selected(id, files_only, &mut names);
        }

        if names.is_empty() {
            if let Some(entry) = self.cursor.and_then(|id| self.tree.get(id)) {
                if !entry.kind.is_parent() && (!files_only || !entry.kind.is_dir()) {
                    names.push(entry.name.to_string());
                }
            }
        }

        names
            .into_iter()
            .map(|name| {
                if relative {
                    PathBuf::from(name)
                } else {
                    let mut path = self.path.clone();
                    for part in name.split('/') {
                        path.push(part);
                    }
                    path
                }
            })
            .collect()
    }

    fn collect_selected(&self, id: EntryId, files_only: bool, names: &mut Vec<String>) {
        if let Some(entry) = self.tree.get(id) {
            if entry.selected
                && !entry.kind.is_parent()
                && (!files_only || !entry.kind.is_dir())
            {
                names.push(entry.name.to_string());
            }
        }
        for child in self.tree.sorted_view(Some(id), &self.sort) {
            self.collect_selected(child, files_only, names);
        }
    }
}

fn compile_pattern(pattern: Option<&str>) -> Result<GlobMatcher, ListError> {
    let pattern = pattern.unwrap_or("*");
    Glob::new(pattern)
        .map(|glob| glob.compile_matcher())
        .map_err(|error| ListError::Pattern {
            pattern: pattern.to_string(),
            message: error.to_string(),
        })
}
