use serde::{Deserialize, Serialize};

/// Kind of a filesystem node. Variant order doubles as the listing sort
/// order: directories, then symlinks, then files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Directory,
    Symlink,
    File,
}

/// One filesystem node as observed at enumeration time. Computed fresh on
/// every call, never cached; staleness is only visible by re-querying.
///
/// Field names on the wire are the ones external renderers key off, so they
/// must stay stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Bytes for regular files; 0 for directories and symlinks.
    pub size: u64,
    /// Local time, `YYYY-MM-DD HH:MM:SS`; empty when the platform cannot
    /// report it.
    pub modified: String,
    pub created: String,
    pub extension: String,
    pub is_hidden: bool,
    pub is_read_only: bool,
    /// Raw permission bits as reported by the platform.
    pub mode: u32,
    /// 10-character symbolic form (`drwxr-xr-x`).
    pub permissions: String,
    pub owner: String,
    pub group: String,
    /// Link target; empty unless `kind` is `Symlink`.
    pub symlink_target: String,
}

impl Entry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}
