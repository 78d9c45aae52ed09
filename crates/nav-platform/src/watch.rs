use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Action taxonomy a raw OS change notification maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WatchAction {
    Created,
    Deleted,
    Modified,
    MovedFrom,
    MovedTo,
    AttributesChanged,
}

/// One change notification for a watched directory. Events arrive in
/// OS-reported order within a single watch; no ordering is guaranteed
/// across watches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchEvent {
    pub file_name: String,
    pub action: WatchAction,
}

/// OS-level change subscription for one directory. Implementations must use
/// a cancellable read: `poll_events` waits at most `timeout` so the caller's
/// loop can observe a stop request within a bounded interval. Dropping the
/// watcher releases the underlying OS handle.
pub trait DirectoryWatcher: Send {
    /// Wait up to `timeout` for change events. An empty vec means the
    /// timeout elapsed with nothing to report.
    fn poll_events(&mut self, timeout: Duration) -> Result<Vec<WatchEvent>>;
}
