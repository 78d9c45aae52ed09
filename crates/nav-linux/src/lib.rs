// Linux platform implementations

#[cfg(target_os = "linux")]
pub mod meta;

#[cfg(target_os = "linux")]
pub mod disk;

#[cfg(target_os = "linux")]
pub mod watch;
