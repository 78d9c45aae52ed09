use std::os::fd::AsFd;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use nix::sys::inotify::{AddWatchFlags, InitFlags, Inotify};

use nav_platform::watch::{DirectoryWatcher, WatchAction, WatchEvent};

/// inotify-backed watcher for a single directory. The fd is non-blocking and
/// waited on through poll(2), so the engine's watch loop can observe a stop
/// request within one poll interval instead of sitting in a blocking read.
/// Dropping the watcher closes the inotify fd and removes the kernel watch.
pub struct InotifyWatcher {
    inner: Inotify,
}

impl InotifyWatcher {
    pub fn new(dir: &Path) -> Result<Self> {
        let inner = Inotify::init(InitFlags::IN_NONBLOCK).context("inotify_init failed")?;

        let mask = AddWatchFlags::IN_CREATE
            | AddWatchFlags::IN_DELETE
            | AddWatchFlags::IN_MODIFY
            | AddWatchFlags::IN_MOVED_FROM
            | AddWatchFlags::IN_MOVED_TO
            | AddWatchFlags::IN_ATTRIB;
        inner
            .add_watch(dir, mask)
            .with_context(|| format!("inotify_add_watch failed for {}", dir.display()))?;

        Ok(Self { inner })
    }
}

impl DirectoryWatcher for InotifyWatcher {
    fn poll_events(&mut self, timeout: Duration) -> Result<Vec<WatchEvent>> {
        let millis = timeout.as_millis().min(u16::MAX as u128) as u16;
        let mut fds = [PollFd::new(self.inner.as_fd(), PollFlags::POLLIN)];

        match poll(&mut fds, PollTimeout::from(millis)) {
            Ok(0) => return Ok(Vec::new()),
            Ok(_) => {}
            Err(Errno::EINTR) => return Ok(Vec::new()),
            Err(e) => return Err(anyhow::anyhow!("poll on inotify fd failed: {}", e)),
        }

        let raw = match self.inner.read_events() {
            Ok(events) => events,
            // Racing reader drained the queue between poll and read
            Err(Errno::EAGAIN) => return Ok(Vec::new()),
            Err(e) => return Err(anyhow::anyhow!("inotify read failed: {}", e)),
        };

        let mut out = Vec::with_capacity(raw.len());
        for event in raw {
            // Events without a name describe the watched directory itself
            let Some(name) = event.name else { continue };
            let Some(action) = map_mask(event.mask) else { continue };
            out.push(WatchEvent {
                file_name: name.to_string_lossy().into_owned(),
                action,
            });
        }
        Ok(out)
    }
}

fn map_mask(mask: AddWatchFlags) -> Option<WatchAction> {
    if mask.contains(AddWatchFlags::IN_CREATE) {
        Some(WatchAction::Created)
    } else if mask.contains(AddWatchFlags::IN_DELETE) {
        Some(WatchAction::Deleted)
    } else if mask.contains(AddWatchFlags::IN_MODIFY) {
        Some(WatchAction::Modified)
    } else if mask.contains(AddWatchFlags::IN_MOVED_FROM) {
        Some(WatchAction::MovedFrom)
    } else if mask.contains(AddWatchFlags::IN_MOVED_TO) {
        Some(WatchAction::MovedTo)
    } else if mask.contains(AddWatchFlags::IN_ATTRIB) {
        Some(WatchAction::AttributesChanged)
    } else {
        None
    }
}
