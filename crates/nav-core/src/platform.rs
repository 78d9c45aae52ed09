//! Platform selection for the pieces the standard library cannot express
//! uniformly: ownership and permission strings, disk capacity queries, and
//! change notification.

use std::path::Path;

use anyhow::Result;

use nav_platform::{DirectoryWatcher, DiskProbe, PlatformMeta};

#[cfg(target_os = "linux")]
pub fn create_platform_meta() -> Box<dyn PlatformMeta> {
    Box::new(nav_linux::meta::LinuxMeta::new())
}

#[cfg(target_os = "windows")]
pub fn create_platform_meta() -> Box<dyn PlatformMeta> {
    Box::new(nav_windows::meta::WindowsMeta::new())
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
pub fn create_platform_meta() -> Box<dyn PlatformMeta> {
    Box::new(fallback::FallbackMeta)
}

#[cfg(target_os = "linux")]
pub fn create_disk_probe() -> Box<dyn DiskProbe> {
    Box::new(nav_linux::disk::LinuxDiskProbe::new())
}

#[cfg(target_os = "windows")]
pub fn create_disk_probe() -> Box<dyn DiskProbe> {
    Box::new(nav_windows::disk::WindowsDiskProbe::new())
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
pub fn create_disk_probe() -> Box<dyn DiskProbe> {
    Box::new(fallback::FallbackProbe)
}

#[cfg(target_os = "linux")]
pub fn create_directory_watcher(dir: &Path) -> Result<Box<dyn DirectoryWatcher>> {
    Ok(Box::new(nav_linux::watch::InotifyWatcher::new(dir)?))
}

#[cfg(target_os = "windows")]
pub fn create_directory_watcher(dir: &Path) -> Result<Box<dyn DirectoryWatcher>> {
    Ok(Box::new(nav_windows::watch::DirectoryChangesWatcher::new(
        dir,
    )?))
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
pub fn create_directory_watcher(_dir: &Path) -> Result<Box<dyn DirectoryWatcher>> {
    anyhow::bail!("change monitoring not supported on this platform")
}

/// Degraded metadata for platforms without a dedicated implementation:
/// listing and mutation still work, ownership and mode detail do not.
#[cfg(not(any(target_os = "linux", target_os = "windows")))]
mod fallback {
    use std::fs::Metadata;
    use std::path::Path;

    use anyhow::Result;

    use nav_platform::disk::{DiskProbe, DiskStats};
    use nav_platform::meta::PlatformMeta;

    pub struct FallbackMeta;

    impl PlatformMeta for FallbackMeta {
        fn owner_name(&self, _meta: &Metadata) -> String {
            String::new()
        }

        fn group_name(&self, _meta: &Metadata) -> String {
            String::new()
        }

        fn mode_bits(&self, _meta: &Metadata) -> u32 {
            0
        }

        fn permissions_string(&self, meta: &Metadata) -> String {
            let type_char = if meta.is_dir() { 'd' } else { '-' };
            let triplets = if meta.permissions().readonly() {
                "r--r--r--"
            } else {
                "rw-rw-rw-"
            };
            format!("{}{}", type_char, triplets)
        }

        fn is_hidden(&self, name: &str, _meta: &Metadata) -> bool {
            name.starts_with('.')
        }

        fn is_read_only(&self, meta: &Metadata) -> bool {
            meta.permissions().readonly()
        }
    }

    pub struct FallbackProbe;

    impl DiskProbe for FallbackProbe {
        fn probe(&self, _path: &Path) -> Result<DiskStats> {
            anyhow::bail!("disk statistics not supported on this platform")
        }
    }
}
