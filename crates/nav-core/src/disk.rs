//! Filesystem-level capacity probe.

use std::path::Path;
use std::sync::OnceLock;

use nav_platform::{DiskProbe, DiskStats};

use crate::error::{EngineError, EngineResult};
use crate::platform;

static PROBE: OnceLock<Box<dyn DiskProbe>> = OnceLock::new();

/// Capacity and usage of the filesystem containing `path`. Fails with
/// `Unavailable` when the underlying OS query fails.
pub fn disk_stats(path: &Path) -> EngineResult<DiskStats> {
    let probe = PROBE.get_or_init(platform::create_disk_probe).as_ref();
    probe
        .probe(path)
        .map_err(|e| EngineError::Unavailable(format!("{:#}", e)))
}
