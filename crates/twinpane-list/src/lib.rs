//! Directory list engine: background loading, monitor reconciliation and
//! selection tracking for one pane.
//!
//! The central type is [`FileList`]. It owns an entry tree and keeps it in
//! sync with the filesystem through two queues: loader updates from
//! cancellable background scans, and monitor events from per-directory
//! watchers. Both are drained on the owning context, so the tree has a
//! single writer.

mod list;
mod loader;
pub mod monitor;
pub mod provider;
mod reconciler;
mod selection;
pub mod usage;

pub use list::FileList;
pub use monitor::{DirectoryMonitor, MonitorEvent, MonitorSignal};
pub use provider::{Capabilities, FileStat, LocalProvider, Provider};
pub use usage::{UsageRegistry, UsageResult};
