//! The command-dispatch protocol: a closed set of commands parsed from
//! `(name, args)` pairs, and serde-serialized reply payloads. Front ends
//! key off the wire field names, so payload shapes here are a compatibility
//! surface.

use serde::Serialize;

use nav_platform::{DiskStats, Entry, EntryKind};

use crate::error::{EngineError, EngineResult};

/// The full command surface. Parsing produces one of these variants and
/// dispatch matches on them exhaustively, so an unhandled command is a
/// compile error rather than a fallthrough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List {
        path: Option<String>,
    },
    Cd {
        path: String,
    },
    Search {
        pattern: String,
        recursive: bool,
        path: Option<String>,
    },
    Info {
        path: Option<String>,
    },
    Mkdir {
        path: String,
        parents: bool,
    },
    Delete {
        path: String,
        recursive: bool,
    },
    Copy {
        source: String,
        destination: String,
        recursive: bool,
    },
    Move {
        source: String,
        destination: String,
    },
    Rename {
        old: String,
        new: String,
    },
    Pwd,
    DiskInfo {
        path: Option<String>,
    },
}

impl Command {
    pub fn parse(name: &str, args: &[String]) -> EngineResult<Self> {
        match name {
            "list" => Ok(Command::List {
                path: args.first().cloned(),
            }),
            "cd" => Ok(Command::Cd {
                path: required(args, 0, "no path specified")?,
            }),
            "search" => {
                let pattern = required(args, 0, "no search pattern specified")?;
                let mut recursive = false;
                let mut path = None;
                for arg in &args[1..] {
                    if arg == "-r" {
                        recursive = true;
                    } else {
                        path = Some(arg.clone());
                    }
                }
                Ok(Command::Search {
                    pattern,
                    recursive,
                    path,
                })
            }
            "info" => Ok(Command::Info {
                path: args.first().cloned(),
            }),
            "mkdir" => Ok(Command::Mkdir {
                path: required(args, 0, "no directory name specified")?,
                parents: has_flag(&args[1..], "-p"),
            }),
            "delete" => Ok(Command::Delete {
                path: required(args, 0, "no item specified")?,
                recursive: has_flag(&args[1..], "-r"),
            }),
            "copy" => {
                let source = required(args, 0, "source and destination required")?;
                let destination = required(args, 1, "source and destination required")?;
                Ok(Command::Copy {
                    source,
                    destination,
                    recursive: has_flag(&args[2..], "-r"),
                })
            }
            "move" => Ok(Command::Move {
                source: required(args, 0, "source and destination required")?,
                destination: required(args, 1, "source and destination required")?,
            }),
            "rename" => Ok(Command::Rename {
                old: required(args, 0, "old and new names required")?,
                new: required(args, 1, "old and new names required")?,
            }),
            "pwd" => Ok(Command::Pwd),
            "diskinfo" => Ok(Command::DiskInfo {
                path: args.first().cloned(),
            }),
            other => Err(EngineError::UnknownCommand(other.to_string())),
        }
    }
}

fn required(args: &[String], index: usize, message: &str) -> EngineResult<String> {
    args.get(index)
        .cloned()
        .ok_or_else(|| EngineError::InvalidArgument(message.to_string()))
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

// --- Reply payloads ---

#[derive(Debug, Serialize)]
pub struct ListingPayload {
    pub files: Vec<Entry>,
}

/// Reduced entry shape search results carry on the wire.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub size: u64,
    pub modified: String,
    pub symlink_target: String,
}

impl From<Entry> for SearchHit {
    fn from(entry: Entry) -> Self {
        Self {
            name: entry.name,
            path: entry.path,
            kind: entry.kind,
            size: entry.size,
            modified: entry.modified,
            symlink_target: entry.symlink_target,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchPayload {
    pub results: Vec<SearchHit>,
    pub count: usize,
}

/// `cd` and `mkdir` acknowledge with the affected path.
#[derive(Debug, Serialize)]
pub struct AckPayload {
    pub success: bool,
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct DeletePayload {
    pub success: bool,
    pub item: String,
}

#[derive(Debug, Serialize)]
pub struct TransferPayload {
    pub success: bool,
    pub source: String,
    pub destination: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenamePayload {
    pub success: bool,
    pub old_name: String,
    pub new_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PwdPayload {
    pub current_path: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoPayload {
    #[serde(flatten)]
    pub entry: Entry,
    pub size_formatted: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskInfoPayload {
    #[serde(flatten)]
    pub stats: DiskStats,
    pub total_formatted: String,
    pub free_formatted: String,
    pub available_formatted: String,
    pub used_formatted: String,
}

/// `info` with no argument summarizes the current directory.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirSummaryPayload {
    pub path: String,
    pub item_count: usize,
    pub disk_info: DiskSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskSummary {
    pub total: String,
    pub free: String,
    pub available: String,
    pub used: String,
    pub filesystem: String,
    pub usage_percent: f64,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub error: String,
}

/// One reply per dispatch: a command-specific success payload, or
/// `{"error": message}`. Internal error kinds collapse to the message at
/// this boundary.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CommandReply {
    Listing(ListingPayload),
    Search(SearchPayload),
    Ack(AckPayload),
    Deleted(DeletePayload),
    Transferred(TransferPayload),
    Renamed(RenamePayload),
    CurrentPath(PwdPayload),
    Info(Box<InfoPayload>),
    DirSummary(DirSummaryPayload),
    Disk(DiskInfoPayload),
    Error(ErrorPayload),
}

impl CommandReply {
    pub fn error(message: impl Into<String>) -> Self {
        CommandReply::Error(ErrorPayload {
            error: message.into(),
        })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CommandReply::Error(_))
    }
}

impl From<EngineError> for CommandReply {
    fn from(err: EngineError) -> Self {
        CommandReply::error(err.to_string())
    }
}
