//! Breadth-first name search over the directory enumerator. BFS bounds the
//! latency of "first N matches" queries and keeps deep trees off the stack.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use tracing::debug;

use nav_platform::Entry;

use crate::error::EngineResult;
use crate::listing::{self, ListOptions};

/// Find entries whose name contains `pattern`, starting at `start`.
/// Traversal stops as soon as `cap` matches are collected. Hidden entries
/// participate like any other.
pub fn search(
    start: &Path,
    pattern: &str,
    recursive: bool,
    cap: usize,
) -> EngineResult<Vec<Entry>> {
    let opts = ListOptions {
        show_hidden: true,
        ..Default::default()
    };

    let mut results = Vec::new();
    let mut queue: VecDeque<PathBuf> = VecDeque::new();
    queue.push_back(start.to_path_buf());
    let mut first = true;

    while let Some(dir) = queue.pop_front() {
        let entries = match listing::list(&dir, &opts) {
            Ok(entries) => entries,
            // The seed must be listable; descendants are best-effort
            Err(e) if !first => {
                debug!("search skipping {}: {}", dir.display(), e);
                continue;
            }
            Err(e) => return Err(e),
        };
        first = false;

        for entry in entries {
            if entry.name.contains(pattern) {
                results.push(entry.clone());
                if results.len() >= cap {
                    return Ok(results);
                }
            }
            if recursive && entry.is_dir() {
                queue.push_back(PathBuf::from(&entry.path));
            }
        }

        if !recursive {
            break;
        }
    }

    Ok(results)
}
