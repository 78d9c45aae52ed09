use std::path::Path;

use anyhow::{Context, Result};
use nix::sys::statvfs::statvfs;

use nav_platform::disk::{usage_percent, DiskProbe, DiskStats};

pub struct LinuxDiskProbe;

impl LinuxDiskProbe {
    pub fn new() -> Self {
        Self
    }
}

impl DiskProbe for LinuxDiskProbe {
    fn probe(&self, path: &Path) -> Result<DiskStats> {
        let vfs = statvfs(path)
            .with_context(|| format!("statvfs failed for {}", path.display()))?;

        let frsize = vfs.fragment_size() as u64;
        let total_bytes = vfs.blocks() as u64 * frsize;
        let free_bytes = vfs.blocks_free() as u64 * frsize;
        let available_bytes = vfs.blocks_available() as u64 * frsize;
        let used_bytes = total_bytes.saturating_sub(free_bytes);

        Ok(DiskStats {
            path: path.display().to_string(),
            total_bytes,
            free_bytes,
            available_bytes,
            used_bytes,
            usage_percent: usage_percent(used_bytes, total_bytes),
            filesystem: filesystem_name(path),
        })
    }
}

/// Filesystem type of the mount containing `path`, from /proc/mounts.
/// Longest mount-point prefix wins.
fn filesystem_name(path: &Path) -> String {
    let target = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let mounts = match std::fs::read_to_string("/proc/mounts") {
        Ok(content) => content,
        Err(_) => return "unknown".to_string(),
    };

    let mut best: Option<(usize, String)> = None;
    for line in mounts.lines() {
        let mut parts = line.split_whitespace();
        let (Some(_device), Some(mount), Some(fstype)) =
            (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };

        if target.starts_with(mount) {
            let len = mount.len();
            if best.as_ref().map_or(true, |(best_len, _)| len > *best_len) {
                best = Some((len, fstype.to_string()));
            }
        }
    }

    best.map(|(_, fstype)| fstype)
        .unwrap_or_else(|| "unknown".to_string())
}
