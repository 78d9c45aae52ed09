//! nav-core: the native file-navigation and command engine.
//!
//! Front ends drive the engine through [`Session::dispatch`] with a command
//! name and positional arguments; replies serialize straight to the JSON
//! shapes renderers consume. Live change notification runs separately
//! through [`ChangeMonitor`], which feeds a bounded event channel.

pub mod command;
pub mod config;
pub mod disk;
pub mod error;
pub mod listing;
pub mod metadata;
pub mod monitor;
pub mod ops;
pub mod paths;
mod platform;
pub mod search;
pub mod session;
pub mod util;

pub use command::{Command, CommandReply};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use monitor::ChangeMonitor;
pub use session::Session;

// Wire types shared with platform implementations, re-exported for embedders
pub use nav_platform::{DiskStats, Entry, EntryKind, WatchAction, WatchEvent};
