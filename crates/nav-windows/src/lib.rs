// Windows platform implementations

#[cfg(target_os = "windows")]
pub mod meta;

#[cfg(target_os = "windows")]
pub mod disk;

#[cfg(target_os = "windows")]
pub mod watch;
