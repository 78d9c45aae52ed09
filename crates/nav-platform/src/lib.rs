// Shared types and platform traits for the file-navigation engine

pub mod disk;
pub mod entry;
pub mod meta;
pub mod watch;

pub use disk::{usage_percent, DiskProbe, DiskStats};
pub use entry::{Entry, EntryKind};
pub use meta::PlatformMeta;
pub use watch::{DirectoryWatcher, WatchAction, WatchEvent};
