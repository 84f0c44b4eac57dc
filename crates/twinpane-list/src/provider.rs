//! Filesystem provider abstraction.
//!
//! The engine never touches `std::fs` directly; everything goes through a
//! [`Provider`] so archive or remote backends can supply the same list
//! semantics. Optional behavior is declared up front through
//! [`Capabilities`] instead of probed per call.

use std::path::{Path, PathBuf};

use twinpane_core::{EntryKind, ListError};

/// Optional operations a provider supports, checked once at setup.
#[derive(Debug, Clone, Copy, Default)]
pub struct Capabilities {
    /// Directory monitors can be installed on this provider's paths.
    pub monitor: bool,
    /// Symbolic links can occur and be followed.
    pub symlinks: bool,
}

/// Metadata for one filesystem object.
#[derive(Debug, Clone, Copy)]
pub struct FileStat {
    /// Object type. Never [`EntryKind::Parent`].
    pub kind: EntryKind,
    /// Size in bytes.
    pub size: i64,
    /// Permission bits.
    pub mode: u32,
    /// Modification time, seconds since the epoch.
    pub mtime: i64,
    /// Owner id.
    pub uid: u32,
    /// Group id.
    pub gid: u32,
}

/// Filesystem abstraction consumed by the loader and reconciler.
pub trait Provider: Send + Sync {
    /// List the names directly under `path`, unordered and unfiltered.
    fn list_dir(&self, path: &Path) -> Result<Vec<String>, ListError>;

    /// Stat a single object. With `follow` set, symlinks are resolved to
    /// their target's metadata.
    fn stat(&self, path: &Path, follow: bool) -> Result<FileStat, ListError>;

    /// Check whether a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Read a small text file as lines; used for `.hidden` control files.
    fn read_lines(&self, path: &Path) -> Result<Vec<String>, ListError>;

    /// Topmost path reachable from `path` (filesystem root, archive root).
    fn root_path(&self, path: &Path) -> PathBuf;

    /// Protocol identifier, e.g. `file`.
    fn protocol(&self) -> &str;

    /// Supported optional operations.
    fn capabilities(&self) -> Capabilities;
}

/// Stat an entry the way the list wants it: symlinks are stat'ed again with
/// `follow` so the cached kind describes the target, while the link flag is
/// retained. A dangling link comes back as a broken symlink entry.
pub fn stat_for_entry(
    provider: &dyn Provider,
    path: &Path,
) -> Result<(FileStat, bool), ListError> {
    let stat = provider.stat(path, false)?;
    if !matches!(stat.kind, EntryKind::Symlink { .. }) {
        return Ok((stat, false));
    }

    match provider.stat(path, true) {
        Ok(resolved) => Ok((resolved, true)),
        Err(_) => Ok((
            FileStat {
                kind: EntryKind::Symlink { broken: true },
                ..stat
            },
            true,
        )),
    }
}

/// Local filesystem provider backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalProvider;

impl LocalProvider {
    /// Create a new local provider.
    pub fn new() -> Self {
        Self
    }
}

impl Provider for LocalProvider {
    fn list_dir(&self, path: &Path) -> Result<Vec<String>, ListError> {
        let reader = std::fs::read_dir(path).map_err(|e| ListError::io(path, e))?;
        let mut names = Vec::new();
        for item in reader {
            let item = item.map_err(|e| ListError::io(path, e))?;
            names.push(item.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    fn stat(&self, path: &Path, follow: bool) -> Result<FileStat, ListError> {
        let metadata = if follow {
            std::fs::metadata(path)
        } else {
            std::fs::symlink_metadata(path)
        }
        .map_err(|e| ListError::io(path, e))?;

        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else if metadata.is_file() {
            EntryKind::File
        } else if metadata.file_type().is_symlink() {
            EntryKind::Symlink { broken: false }
        } else {
            EntryKind::Other
        };

        Ok(FileStat {
            kind,
            size: metadata.len() as i64,
            mode: unix_mode(&metadata),
            mtime: metadata.modified().ok().map(unix_seconds).unwrap_or(0),
            uid: unix_uid(&metadata),
            gid: unix_gid(&metadata),
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_lines(&self, path: &Path) -> Result<Vec<String>, ListError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ListError::io(path, e))?;
        Ok(contents.lines().map(str::to_string).collect())
    }

    fn root_path(&self, path: &Path) -> PathBuf {
        path.ancestors()
            .last()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"))
    }

    fn protocol(&self) -> &str {
        "file"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            monitor: true,
            symlinks: true,
        }
    }
}

/// Seconds since the epoch, negative for pre-epoch times.
fn unix_seconds(time: std::time::SystemTime) -> i64 {
    match time.duration_since(std::time::UNIX_EPOCH) {
        Ok(offset) => offset.as_secs() as i64,
        Err(error) => -(error.duration().as_secs() as i64),
    }
}

#[cfg(unix)]
fn unix_mode(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::MetadataExt;
    metadata.mode()
}

#[cfg(not(unix))]
fn unix_mode(_metadata: &std::fs::Metadata) -> u32 {
    0
}

#[cfg(unix)]
fn unix_uid(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::MetadataExt;
    metadata.uid()
}

#[cfg(not(unix))]
fn unix_uid(_metadata: &std::fs::Metadata) -> u32 {
    0
}

#[cfg(unix)]
fn unix_gid(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::MetadataExt;
    metadata.gid()
}

#[cfg(not(unix))]
fn unix_gid(_metadata: &std::fs::Metadata) -> u32 {
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_and_stat() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("file.txt"), "hello").unwrap();
        std::fs::create_dir(temp.path().join("dir")).unwrap();

        let provider = LocalProvider::new();
        let mut names = provider.list_dir(temp.path()).unwrap();
        names.sort();
        assert_eq!(names, vec!["dir", "file.txt"]);

        let stat = provider.stat(&temp.path().join("file.txt"), false).unwrap();
        assert_eq!(stat.kind, EntryKind::File);
        assert_eq!(stat.size, 5);

        let stat = provider.stat(&temp.path().join("dir"), false).unwrap();
        assert_eq!(stat.kind, EntryKind::Directory);
    }

    #[test]
    fn test_list_missing_directory_fails() {
        let provider = LocalProvider::new();
        let result = provider.list_dir(Path::new("/nonexistent/twinpane-test"));
        assert!(matches!(result, Err(ListError::NotFound { .. })));
    }

    #[test]
    fn test_unix_seconds_signed() {
        use std::time::{Duration, UNIX_EPOCH};

        assert_eq!(unix_seconds(UNIX_EPOCH + Duration::from_secs(5)), 5);
        assert_eq!(unix_seconds(UNIX_EPOCH - Duration::from_secs(100)), -100);
    }

    #[test]
    fn test_read_lines() {
        let temp = TempDir::new().unwrap();
        let control = temp.path().join(".hidden");
        std::fs::write(&control, "secret\nother\n").unwrap();

        let provider = LocalProvider::new();
        let lines = provider.read_lines(&control).unwrap();
        assert_eq!(lines, vec!["secret", "other"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_stat_for_entry_follows_links() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("target.txt");
        std::fs::write(&target, "data").unwrap();
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let provider = LocalProvider::new();
        let (stat, is_link) = stat_for_entry(&provider, &link).unwrap();
        assert!(is_link);
        assert_eq!(stat.kind, EntryKind::File);
        assert_eq!(stat.size, 4);

        std::fs::remove_file(&target).unwrap();
        let (stat, is_link) = stat_for_entry(&provider, &link).unwrap();
        assert!(is_link);
        assert!(matches!(stat.kind, EntryKind::Symlink { broken: true }));
    }
}
