//! Cached directory entry types.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Name used for the synthetic "go up" row.
pub const PARENT_DIR_NAME: &str = "..";

/// Size sentinel stored on the parent marker row.
pub const PARENT_SIZE_SENTINEL: i64 = -2;

/// Stable identifier of an entry within a tree arena.
///
/// Ids are plain arena indices; they stay valid until the entry is removed
/// or the tree is cleared, and are never reused within one tree epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub u32);

impl EntryId {
    /// Create an id from a raw arena index.
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Type of filesystem object an entry caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// Directory.
    Directory,
    /// Regular file.
    File,
    /// Symbolic link whose target could not be resolved.
    Symlink {
        /// Whether the link target is missing.
        broken: bool,
    },
    /// Sockets, devices and other special files.
    Other,
    /// Synthetic "go up" row shown for non-root paths.
    Parent,
}

impl EntryKind {
    /// Directories and the parent marker both behave as directories
    /// for sorting purposes.
    pub fn is_dir(&self) -> bool {
        matches!(self, EntryKind::Directory | EntryKind::Parent)
    }

    /// Check if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, EntryKind::File)
    }

    /// Check if this is the synthetic parent marker.
    pub fn is_parent(&self) -> bool {
        matches!(self, EntryKind::Parent)
    }
}

/// A single cached filesystem object.
///
/// `name` is the path relative to the list root; children of expanded
/// directories store `parent/child` style names with `/` separators
/// regardless of platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    /// Path relative to the list root.
    pub name: CompactString,

    /// Object type.
    pub kind: EntryKind,

    /// Size in bytes. Negative sentinel for the parent marker.
    pub size: i64,

    /// Display label for the size column. `<DIR>` for directories until an
    /// externally computed recursive size replaces it.
    pub size_label: CompactString,

    /// Permission bits.
    pub mode: u32,

    /// Modification time, seconds since the epoch.
    pub mtime: i64,

    /// Owner and group ids.
    pub uid: u32,
    pub gid: u32,

    /// Whether the entry was reached through a symbolic link.
    pub is_link: bool,

    /// Selection state.
    pub selected: bool,

    /// Emblem tag identifiers.
    pub emblems: Vec<CompactString>,

    /// Icon identifier.
    pub icon: CompactString,

    /// Derived comparable key, regenerated on demand.
    pub sort_key: String,
}

impl Entry {
    /// Create an entry with the given name and kind; metadata fields start
    /// zeroed and are filled in by the loader.
    pub fn new(name: impl Into<CompactString>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
            size: 0,
            size_label: CompactString::default(),
            mode: 0,
            mtime: 0,
            uid: 0,
            gid: 0,
            is_link: false,
            selected: false,
            emblems: Vec::new(),
            icon: default_icon(kind),
            sort_key: String::new(),
        }
    }

    /// Create the synthetic "go up" row.
    pub fn parent_marker() -> Self {
        let mut entry = Self::new(PARENT_DIR_NAME, EntryKind::Parent);
        entry.size = PARENT_SIZE_SENTINEL;
        entry.size_label = "<DIR>".into();
        entry.mode = 0;
        entry.mtime = -1;
        entry
    }

    /// Check if this entry is a directory (the parent marker included).
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Check if this entry is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Check if this entry is the synthetic parent marker.
    pub fn is_parent(&self) -> bool {
        self.kind.is_parent()
    }

    /// Final path component of the relative name.
    pub fn file_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Extension part of the name, empty for directories.
    pub fn extension(&self) -> &str {
        if self.is_dir() {
            return "";
        }
        match self.file_name().rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext,
            _ => "",
        }
    }
}

fn default_icon(kind: EntryKind) -> CompactString {
    match kind {
        EntryKind::Directory => "folder".into(),
        EntryKind::File => "text-x-generic".into(),
        EntryKind::Symlink { .. } => "emblem-symbolic-link".into(),
        EntryKind::Other => "image-missing".into(),
        EntryKind::Parent => "go-up".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_marker() {
        let entry = Entry::parent_marker();
        assert!(entry.is_parent());
        assert!(entry.is_dir());
        assert_eq!(entry.name.as_str(), "..");
        assert_eq!(entry.size, PARENT_SIZE_SENTINEL);
    }

    #[test]
    fn test_file_name_strips_parent_path() {
        let entry = Entry::new("sub/dir/file.txt", EntryKind::File);
        assert_eq!(entry.file_name(), "file.txt");

        let top = Entry::new("file.txt", EntryKind::File);
        assert_eq!(top.file_name(), "file.txt");
    }

    #[test]
    fn test_extension() {
        let entry = Entry::new("archive.tar.gz", EntryKind::File);
        assert_eq!(entry.extension(), "gz");

        let dotfile = Entry::new(".hidden", EntryKind::File);
        assert_eq!(dotfile.extension(), "");

        let dir = Entry::new("dir.d", EntryKind::Directory);
        assert_eq!(dir.extension(), "");
    }
}
