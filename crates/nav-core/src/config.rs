use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Starting directory for new sessions; falls back to the process cwd.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_path: Option<String>,

    /// Upper bound on search results per query.
    #[serde(default = "default_search_result_cap")]
    pub search_result_cap: usize,

    /// Bounded capacity of the change-monitor event channel.
    #[serde(default = "default_monitor_queue_capacity")]
    pub monitor_queue_capacity: usize,

    /// Whether `copy` carries source timestamps onto the destination.
    #[serde(default = "default_preserve_timestamps")]
    pub preserve_timestamps_on_copy: bool,
}

fn default_search_result_cap() -> usize {
    1000
}
fn default_monitor_queue_capacity() -> usize {
    256
}
fn default_preserve_timestamps() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            start_path: None,
            search_result_cap: default_search_result_cap(),
            monitor_queue_capacity: default_monitor_queue_capacity(),
            preserve_timestamps_on_copy: default_preserve_timestamps(),
        }
    }
}

impl EngineConfig {
    /// Default config file path for this platform
    pub fn default_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("dev", "fsnav", "fsnav") {
            dirs.config_dir().join("config.json")
        } else {
            PathBuf::from("fsnav-config.json")
        }
    }

    /// Load config from a file path
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        let config: Self =
            serde_json::from_str(&data).with_context(|| "failed to parse config JSON")?;
        Ok(config)
    }

    /// Save config to a file path
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create config dir {}", parent.display()))?;
        }
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)
            .with_context(|| format!("failed to write config to {}", path.display()))?;
        Ok(())
    }
}
