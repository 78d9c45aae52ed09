//! Live change notification for a watched directory.
//!
//! The watch loop runs on a blocking task and pushes mapped events into a
//! bounded channel; consumers pull at their own pace instead of being called
//! back from the watch thread.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use nav_platform::WatchEvent;

use crate::error::{EngineError, EngineResult};
use crate::platform;

/// How long the loop blocks per poll. Bounds how quickly a stop request is
/// observed.
const POLL_INTERVAL: Duration = Duration::from_millis(200);
const SEND_RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// A running watch on one directory. Lifecycle is one-way: started on
/// creation, stopped once, never restarted — create a new monitor to watch
/// again. No events are buffered across monitors.
#[derive(Debug)]
pub struct ChangeMonitor {
    dir: PathBuf,
    stop: Arc<AtomicBool>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl ChangeMonitor {
    /// Start watching `directory`. Events flow into the returned bounded
    /// channel; when the monitor stops or the watch loop dies, the channel
    /// closes and the receiver sees `None`. Must be called inside a tokio
    /// runtime.
    pub fn start(
        directory: &Path,
        capacity: usize,
    ) -> EngineResult<(Self, mpsc::Receiver<WatchEvent>)> {
        let meta =
            std::fs::metadata(directory).map_err(|e| EngineError::from_io(directory, e))?;
        if !meta.is_dir() {
            return Err(EngineError::NotADirectory(directory.display().to_string()));
        }

        let mut watcher = platform::create_directory_watcher(directory)
            .map_err(|e| EngineError::Unavailable(format!("{:#}", e)))?;

        let (tx, rx) = mpsc::channel(capacity.max(1));
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();
        let dir_label = directory.display().to_string();

        let task = tokio::task::spawn_blocking(move || {
            debug!("watch loop started for {}", dir_label);
            'outer: while !stop_flag.load(Ordering::Relaxed) {
                let events = match watcher.poll_events(POLL_INTERVAL) {
                    Ok(events) => events,
                    Err(e) => {
                        warn!("watch loop for {} failed: {:#}", dir_label, e);
                        break;
                    }
                };

                for event in events {
                    let mut pending = event;
                    loop {
                        match tx.try_send(pending) {
                            Ok(()) => break,
                            Err(mpsc::error::TrySendError::Full(back)) => {
                                // Full channel must not make stop() unbounded
                                if stop_flag.load(Ordering::Relaxed) {
                                    break 'outer;
                                }
                                pending = back;
                                std::thread::sleep(SEND_RETRY_INTERVAL);
                            }
                            Err(mpsc::error::TrySendError::Closed(_)) => break 'outer,
                        }
                    }
                }
            }
            debug!("watch loop ended for {}", dir_label);
            // The watcher drops here, releasing the OS watch handle
        });

        Ok((
            Self {
                dir: directory.to_path_buf(),
                stop,
                task: Some(task),
            },
            rx,
        ))
    }

    pub fn directory(&self) -> &Path {
        &self.dir
    }

    /// Ask the watch loop to exit. Safe from any thread and idempotent; the
    /// loop observes the flag within one poll interval.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Stop and wait for the loop to fully wind down.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for ChangeMonitor {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}
