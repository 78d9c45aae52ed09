//! Turns a resolved path into an [`Entry`] snapshot.

use std::fs::{self, Metadata};
use std::path::Path;
use std::sync::OnceLock;
use std::time::SystemTime;

use chrono::{DateTime, Local};

use nav_platform::{Entry, EntryKind, PlatformMeta};

use crate::error::{EngineError, EngineResult};
use crate::platform;

static PLATFORM: OnceLock<Box<dyn PlatformMeta>> = OnceLock::new();

fn platform_meta() -> &'static dyn PlatformMeta {
    PLATFORM.get_or_init(platform::create_platform_meta).as_ref()
}

/// Snapshot a single node. Symlinks are not followed unless asked, so a
/// broken link is still reportable; with `follow_links` a dangling target
/// surfaces as `NotFound`.
pub fn stat(path: &Path, follow_links: bool) -> EngineResult<Entry> {
    let meta = if follow_links {
        fs::metadata(path)
    } else {
        fs::symlink_metadata(path)
    }
    .map_err(|e| EngineError::from_io(path, e))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(entry_from_metadata(path, name, &meta))
}

pub(crate) fn entry_from_metadata(path: &Path, name: String, meta: &Metadata) -> Entry {
    let file_type = meta.file_type();
    let kind = if file_type.is_symlink() {
        EntryKind::Symlink
    } else if file_type.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::File
    };

    let symlink_target = if kind == EntryKind::Symlink {
        fs::read_link(path)
            .map(|t| t.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        String::new()
    };

    let size = if kind == EntryKind::File { meta.len() } else { 0 };
    let extension = if kind == EntryKind::Directory {
        String::new()
    } else {
        extension_of(&name)
    };

    let platform = platform_meta();
    Entry {
        path: path.display().to_string(),
        kind,
        size,
        modified: meta.modified().ok().map(format_timestamp).unwrap_or_default(),
        created: meta.created().ok().map(format_timestamp).unwrap_or_default(),
        extension,
        is_hidden: platform.is_hidden(&name, meta),
        is_read_only: platform.is_read_only(meta),
        mode: platform.mode_bits(meta),
        permissions: platform.permissions_string(meta),
        owner: platform.owner_name(meta),
        group: platform.group_name(meta),
        symlink_target,
        name,
    }
}

/// Extension after the final dot; empty when there is no dot, or when the
/// only dot is the leading one of a dotfile.
pub fn extension_of(name: &str) -> String {
    match name.rfind('.') {
        Some(0) | None => String::new(),
        Some(idx) => name[idx + 1..].to_string(),
    }
}

fn format_timestamp(t: SystemTime) -> String {
    DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M:%S").to_string()
}
