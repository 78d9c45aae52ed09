use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Capacity and usage of the filesystem containing a path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskStats {
    pub path: String,
    pub total_bytes: u64,
    pub free_bytes: u64,
    pub available_bytes: u64,
    pub used_bytes: u64,
    /// `used / total * 100`, rounded to one decimal place.
    pub usage_percent: f64,
    pub filesystem: String,
}

pub trait DiskProbe: Send + Sync {
    /// Query the filesystem containing `path` (not a specific file).
    fn probe(&self, path: &Path) -> Result<DiskStats>;
}

/// Usage percentage rounded to one decimal place.
pub fn usage_percent(used_bytes: u64, total_bytes: u64) -> f64 {
    if total_bytes == 0 {
        return 0.0;
    }
    (used_bytes as f64 / total_bytes as f64 * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_to_one_decimal() {
        assert_eq!(usage_percent(1, 3), 33.3);
        assert_eq!(usage_percent(2, 3), 66.7);
        assert_eq!(usage_percent(0, 100), 0.0);
        assert_eq!(usage_percent(100, 100), 100.0);
    }

    #[test]
    fn percent_of_empty_filesystem_is_zero() {
        assert_eq!(usage_percent(0, 0), 0.0);
    }
}
