use std::os::windows::ffi::OsStrExt;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use windows::core::PCWSTR;
use windows::Win32::Foundation::{CloseHandle, HANDLE, WAIT_OBJECT_0, WAIT_TIMEOUT};
use windows::Win32::Storage::FileSystem::{
    CreateFileW, ReadDirectoryChangesW, FILE_ACTION_ADDED, FILE_ACTION_MODIFIED,
    FILE_ACTION_REMOVED, FILE_ACTION_RENAMED_NEW_NAME, FILE_ACTION_RENAMED_OLD_NAME,
    FILE_FLAG_BACKUP_SEMANTICS, FILE_FLAG_OVERLAPPED, FILE_LIST_DIRECTORY,
    FILE_NOTIFY_CHANGE_ATTRIBUTES, FILE_NOTIFY_CHANGE_DIR_NAME, FILE_NOTIFY_CHANGE_FILE_NAME,
    FILE_NOTIFY_CHANGE_LAST_WRITE, FILE_NOTIFY_CHANGE_SIZE, FILE_NOTIFY_INFORMATION,
    FILE_SHARE_DELETE, FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING,
};
use windows::Win32::System::Threading::{CreateEventW, WaitForSingleObject};
use windows::Win32::System::IO::{CancelIo, GetOverlappedResult, OVERLAPPED};

use nav_platform::watch::{DirectoryWatcher, WatchAction, WatchEvent};

const BUFFER_SIZE: usize = 16 * 1024;

/// ReadDirectoryChangesW-backed watcher for a single directory. Uses
/// overlapped I/O with an event object so each poll can wait with a timeout
/// instead of blocking indefinitely.
pub struct DirectoryChangesWatcher {
    dir_handle: HANDLE,
    event: HANDLE,
    overlapped: Box<OVERLAPPED>,
    buffer: Vec<u8>,
    pending: bool,
}

// The raw handles are only touched from the owning watch loop.
unsafe impl Send for DirectoryChangesWatcher {}

impl DirectoryChangesWatcher {
    pub fn new(dir: &Path) -> Result<Self> {
        let wide: Vec<u16> = dir.as_os_str().encode_wide().chain(Some(0)).collect();

        let dir_handle = unsafe {
            CreateFileW(
                PCWSTR(wide.as_ptr()),
                FILE_LIST_DIRECTORY.0,
                FILE_SHARE_READ | FILE_SHARE_WRITE | FILE_SHARE_DELETE,
                None,
                OPEN_EXISTING,
                FILE_FLAG_BACKUP_SEMANTICS | FILE_FLAG_OVERLAPPED,
                None,
            )
        }
        .with_context(|| format!("failed to open directory {}", dir.display()))?;

        let event = unsafe { CreateEventW(None, true, false, PCWSTR::null()) }
            .context("CreateEventW failed")?;

        let mut overlapped: Box<OVERLAPPED> = Box::default();
        overlapped.hEvent = event;

        Ok(Self {
            dir_handle,
            event,
            overlapped,
            buffer: vec![0u8; BUFFER_SIZE],
            pending: false,
        })
    }

    fn issue_read(&mut self) -> Result<()> {
        unsafe {
            ReadDirectoryChangesW(
                self.dir_handle,
                self.buffer.as_mut_ptr() as *mut _,
                self.buffer.len() as u32,
                false,
                FILE_NOTIFY_CHANGE_FILE_NAME
                    | FILE_NOTIFY_CHANGE_DIR_NAME
                    | FILE_NOTIFY_CHANGE_ATTRIBUTES
                    | FILE_NOTIFY_CHANGE_SIZE
                    | FILE_NOTIFY_CHANGE_LAST_WRITE,
                None,
                Some(self.overlapped.as_mut() as *mut _),
                None,
            )
        }
        .context("ReadDirectoryChangesW failed")?;
        self.pending = true;
        Ok(())
    }

    fn parse_buffer(&self, bytes: usize) -> Vec<WatchEvent> {
        let mut out = Vec::new();
        if bytes == 0 {
            return out;
        }

        let mut offset = 0usize;
        loop {
            let info = unsafe {
                &*(self.buffer.as_ptr().add(offset) as *const FILE_NOTIFY_INFORMATION)
            };

            let name_len = info.FileNameLength as usize / 2;
            let name_slice =
                unsafe { std::slice::from_raw_parts(info.FileName.as_ptr(), name_len) };
            let file_name = String::from_utf16_lossy(name_slice);

            let action = match info.Action {
                FILE_ACTION_ADDED => Some(WatchAction::Created),
                FILE_ACTION_REMOVED => Some(WatchAction::Deleted),
                // Attribute-only changes also surface as MODIFIED here; the
                // notify filter includes attributes so they are not lost.
                FILE_ACTION_MODIFIED => Some(WatchAction::Modified),
                FILE_ACTION_RENAMED_OLD_NAME => Some(WatchAction::MovedFrom),
                FILE_ACTION_RENAMED_NEW_NAME => Some(WatchAction::MovedTo),
                _ => None,
            };

            if let Some(action) = action {
                out.push(WatchEvent { file_name, action });
            }

            if info.NextEntryOffset == 0 {
                break;
            }
            offset += info.NextEntryOffset as usize;
        }
        out
    }
}

impl DirectoryWatcher for DirectoryChangesWatcher {
    fn poll_events(&mut self, timeout: Duration) -> Result<Vec<WatchEvent>> {
        if !self.pending {
            self.issue_read()?;
        }

        let millis = timeout.as_millis().min(u32::MAX as u128) as u32;
        let wait = unsafe { WaitForSingleObject(self.event, millis) };

        if wait == WAIT_TIMEOUT {
            return Ok(Vec::new());
        }
        if wait != WAIT_OBJECT_0 {
            return Err(anyhow::anyhow!("wait on directory change event failed"));
        }

        let mut bytes = 0u32;
        unsafe {
            GetOverlappedResult(self.dir_handle, self.overlapped.as_ref(), &mut bytes, false)
        }
        .context("GetOverlappedResult failed")?;
        self.pending = false;

        Ok(self.parse_buffer(bytes as usize))
    }
}

impl Drop for DirectoryChangesWatcher {
    fn drop(&mut self) {
        unsafe {
            if self.pending {
                let _ = CancelIo(self.dir_handle);
            }
            let _ = CloseHandle(self.event);
            let _ = CloseHandle(self.dir_handle);
        }
    }
}
