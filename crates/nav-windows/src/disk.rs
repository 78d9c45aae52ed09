use std::os::windows::ffi::OsStrExt;
use std::path::Path;

use anyhow::{Context, Result};
use windows::core::PCWSTR;
use windows::Win32::Storage::FileSystem::{
    GetDiskFreeSpaceExW, GetVolumeInformationW, GetVolumePathNameW,
};

use nav_platform::disk::{usage_percent, DiskProbe, DiskStats};

pub struct WindowsDiskProbe;

impl WindowsDiskProbe {
    pub fn new() -> Self {
        Self
    }
}

fn to_wide(path: &Path) -> Vec<u16> {
    path.as_os_str().encode_wide().chain(Some(0)).collect()
}

impl DiskProbe for WindowsDiskProbe {
    fn probe(&self, path: &Path) -> Result<DiskStats> {
        let wide = to_wide(path);

        let mut available_bytes = 0u64;
        let mut total_bytes = 0u64;
        let mut free_bytes = 0u64;
        unsafe {
            GetDiskFreeSpaceExW(
                PCWSTR(wide.as_ptr()),
                Some(&mut available_bytes),
                Some(&mut total_bytes),
                Some(&mut free_bytes),
            )
        }
        .with_context(|| format!("GetDiskFreeSpaceExW failed for {}", path.display()))?;

        let used_bytes = total_bytes.saturating_sub(free_bytes);

        Ok(DiskStats {
            path: path.display().to_string(),
            total_bytes,
            free_bytes,
            available_bytes,
            used_bytes,
            usage_percent: usage_percent(used_bytes, total_bytes),
            filesystem: filesystem_name(&wide),
        })
    }
}

/// Filesystem name ("NTFS", "FAT32", ...) of the volume containing the path.
fn filesystem_name(wide_path: &[u16]) -> String {
    let mut root = [0u16; 260];
    if unsafe { GetVolumePathNameW(PCWSTR(wide_path.as_ptr()), &mut root) }.is_err() {
        return "unknown".to_string();
    }

    let mut fs_name = [0u16; 64];
    if unsafe {
        GetVolumeInformationW(
            PCWSTR(root.as_ptr()),
            None,
            None,
            None,
            None,
            Some(&mut fs_name),
        )
    }
    .is_err()
    {
        return "unknown".to_string();
    }

    let len = fs_name.iter().position(|&c| c == 0).unwrap_or(fs_name.len());
    String::from_utf16_lossy(&fs_name[..len])
}
