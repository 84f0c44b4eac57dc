//! Core types for the twinpane list engine.
//!
//! This crate provides the fundamental data structures shared by the list
//! engine: cached directory entries, the arena-backed entry tree with its
//! aggregate statistics, sort key generation, the hidden-entry policy and
//! list/format configuration.

mod config;
mod entry;
mod error;
mod format;
mod hidden;
mod sort;
mod tree;

pub use config::{
    FormatConfig, ListConfig, ListConfigBuilder, ModeFormat, SizeFormat,
};
pub use entry::{Entry, EntryId, EntryKind, PARENT_DIR_NAME, PARENT_SIZE_SENTINEL};
pub use error::{ListError, ListWarning, WarningKind};
pub use format::{format_mode, format_size, format_time, DIRECTORY_SIZE_LABEL};
pub use hidden::HiddenPolicy;
pub use sort::{sort_key, SortColumn, SortConfig};
pub use tree::{EntryTree, ListStats};
