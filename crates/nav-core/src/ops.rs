//! Mutating operations: create, delete, copy, move/rename, and batch
//! execution with per-item outcomes.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::warn;

use crate::error::{EngineError, EngineResult};

const COPY_BUFFER_SIZE: usize = 8 * 1024;

#[derive(Debug, Clone)]
pub struct CopyOptions {
    pub overwrite: bool,
    pub recursive: bool,
    pub preserve_timestamps: bool,
    pub preserve_permissions: bool,
    pub preserve_owner: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            recursive: false,
            preserve_timestamps: true,
            preserve_permissions: true,
            preserve_owner: false,
        }
    }
}

/// Outcome of a multi-item mutation. `items` preserves input order and
/// always satisfies `items.len() == succeeded + failed`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    #[serde(rename = "succeededCount")]
    pub succeeded: usize,
    #[serde(rename = "failedCount")]
    pub failed: usize,
    pub items: Vec<BatchItem>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    pub source: String,
    pub destination: String,
    /// `"ok"`, or the failure message for this pair.
    pub outcome: String,
}

/// Create a directory. The recursive form creates missing intermediates,
/// ignoring "already exists" for them but not for the final leaf.
pub fn create_directory(path: &Path, recursive: bool) -> EngineResult<()> {
    if recursive {
        let ancestors: Vec<&Path> = path.ancestors().skip(1).collect();
        for ancestor in ancestors.iter().rev() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            match fs::create_dir(ancestor) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                Err(e) => return Err(EngineError::from_io(ancestor, e)),
            }
        }
    }
    fs::create_dir(path).map_err(|e| EngineError::from_io(path, e))
}

/// Create (or truncate) a regular file, ensuring the parent directory
/// exists first.
pub fn create_file(path: &Path, content: &[u8]) -> EngineResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| EngineError::from_io(parent, e))?;
        }
    }
    fs::write(path, content).map_err(|e| EngineError::from_io(path, e))
}

/// Delete a node. A non-empty directory needs `recursive`; the recursive
/// form removes children before their parent, and the first failure aborts
/// the walk so nothing reports success with leftovers behind.
pub fn delete(path: &Path, recursive: bool) -> EngineResult<()> {
    let meta = fs::symlink_metadata(path).map_err(|e| EngineError::from_io(path, e))?;

    if meta.is_dir() {
        if recursive {
            delete_tree(path)
        } else {
            fs::remove_dir(path).map_err(|e| EngineError::from_io(path, e))
        }
    } else {
        fs::remove_file(path).map_err(|e| EngineError::from_io(path, e))
    }
}

fn delete_tree(dir: &Path) -> EngineResult<()> {
    let read_dir = fs::read_dir(dir).map_err(|e| EngineError::from_io(dir, e))?;
    for dir_entry in read_dir {
        let dir_entry = dir_entry.map_err(|e| EngineError::from_io(dir, e))?;
        let child = dir_entry.path();
        let file_type = dir_entry
            .file_type()
            .map_err(|e| EngineError::from_io(&child, e))?;

        // file_type() does not follow links, so symlinked directories are
        // unlinked rather than descended into
        if file_type.is_dir() {
            delete_tree(&child)?;
        } else {
            fs::remove_file(&child).map_err(|e| EngineError::from_io(&child, e))?;
        }
    }
    fs::remove_dir(dir).map_err(|e| EngineError::from_io(dir, e))
}

/// Copy a node. Symlinks are recreated pointing at the same target, never
/// dereferenced; directories require `recursive`; regular files go through
/// a bounded buffer with the partial destination removed on failure.
pub fn copy(src: &Path, dst: &Path, opts: &CopyOptions) -> EngineResult<()> {
    let src_meta = fs::symlink_metadata(src).map_err(|e| EngineError::from_io(src, e))?;

    if !opts.overwrite && fs::symlink_metadata(dst).is_ok() {
        return Err(EngineError::AlreadyExists(dst.display().to_string()));
    }

    if src_meta.file_type().is_symlink() {
        copy_symlink(src, dst, opts)
    } else if src_meta.is_dir() {
        if !opts.recursive {
            return Err(EngineError::InvalidArgument(format!(
                "cannot copy directory {} without recursive mode",
                src.display()
            )));
        }
        copy_directory(src, dst, opts)
    } else {
        copy_file(src, dst, &src_meta, opts)
    }
}

fn copy_symlink(src: &Path, dst: &Path, opts: &CopyOptions) -> EngineResult<()> {
    let target = fs::read_link(src).map_err(|e| EngineError::from_io(src, e))?;

    if opts.overwrite && fs::symlink_metadata(dst).is_ok() {
        fs::remove_file(dst).map_err(|e| EngineError::from_io(dst, e))?;
    }

    make_symlink(&target, dst).map_err(|e| EngineError::from_io(dst, e))
}

#[cfg(unix)]
fn make_symlink(target: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, dst)
}

#[cfg(windows)]
fn make_symlink(target: &Path, dst: &Path) -> io::Result<()> {
    if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, dst)
    } else {
        std::os::windows::fs::symlink_file(target, dst)
    }
}

#[cfg(not(any(unix, windows)))]
fn make_symlink(_target: &Path, _dst: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symlinks not supported on this platform",
    ))
}

fn copy_directory(src: &Path, dst: &Path, opts: &CopyOptions) -> EngineResult<()> {
    match fs::create_dir(dst) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
        Err(e) => return Err(EngineError::from_io(dst, e)),
    }

    let read_dir = fs::read_dir(src).map_err(|e| EngineError::from_io(src, e))?;
    for dir_entry in read_dir {
        let dir_entry = dir_entry.map_err(|e| EngineError::from_io(src, e))?;
        let child_src = dir_entry.path();
        let child_dst = dst.join(dir_entry.file_name());
        copy(&child_src, &child_dst, opts)?;
    }

    if opts.preserve_permissions {
        if let Ok(meta) = fs::metadata(src) {
            if let Err(e) = fs::set_permissions(dst, meta.permissions()) {
                warn!("failed to copy permissions to {}: {}", dst.display(), e);
            }
        }
    }

    Ok(())
}

fn copy_file(
    src: &Path,
    dst: &Path,
    src_meta: &fs::Metadata,
    opts: &CopyOptions,
) -> EngineResult<()> {
    let mut reader = File::open(src).map_err(|e| EngineError::from_io(src, e))?;
    let mut writer = File::create(dst).map_err(|e| EngineError::from_io(dst, e))?;

    let mut buffer = [0u8; COPY_BUFFER_SIZE];
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => return Err(abort_copy(dst, src, e)),
        };
        if let Err(e) = writer.write_all(&buffer[..read]) {
            return Err(abort_copy(dst, dst, e));
        }
    }
    drop(writer);

    apply_copy_attributes(src_meta, dst, opts);
    Ok(())
}

/// A half-written destination must not survive a failed copy.
fn abort_copy(dst: &Path, err_path: &Path, err: io::Error) -> EngineError {
    if let Err(cleanup) = fs::remove_file(dst) {
        warn!(
            "failed to remove partial copy {}: {}",
            dst.display(),
            cleanup
        );
    }
    EngineError::from_io(err_path, err)
}

/// Post-copy attribute steps. The data copy already succeeded, so failures
/// here are logged and do not roll it back.
fn apply_copy_attributes(src_meta: &fs::Metadata, dst: &Path, opts: &CopyOptions) {
    if opts.preserve_timestamps {
        let atime = filetime::FileTime::from_last_access_time(src_meta);
        let mtime = filetime::FileTime::from_last_modification_time(src_meta);
        if let Err(e) = filetime::set_file_times(dst, atime, mtime) {
            warn!("failed to copy timestamps to {}: {}", dst.display(), e);
        }
    }

    if opts.preserve_permissions {
        if let Err(e) = fs::set_permissions(dst, src_meta.permissions()) {
            warn!("failed to copy permissions to {}: {}", dst.display(), e);
        }
    }

    #[cfg(target_os = "linux")]
    if opts.preserve_owner {
        if let Err(e) = nav_linux::meta::copy_ownership(src_meta, dst) {
            warn!("failed to copy ownership to {}: {}", dst.display(), e);
        }
    }
}

/// Move a node. Same-volume moves are an atomic rename; cross-volume moves
/// degrade to copy-then-delete, deleting the source only after the copy
/// succeeded.
pub fn move_item(src: &Path, dst: &Path) -> EngineResult<()> {
    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            let opts = CopyOptions {
                overwrite: true,
                recursive: true,
                ..Default::default()
            };
            copy(src, dst, &opts)?;
            delete(src, true)
        }
        Err(e) => Err(EngineError::from_io(src, e)),
    }
}

/// Rename is a move with both paths in the same directory; no extra
/// validation beyond what `move_item` performs.
pub fn rename_item(old: &Path, new: &Path) -> EngineResult<()> {
    move_item(old, new)
}

/// Copy every pair in order. A failed pair is recorded and processing
/// continues, unless `fail_fast` stops the batch after the first failure
/// (pairs never attempted are not reported).
pub fn batch_copy(
    pairs: &[(PathBuf, PathBuf)],
    opts: &CopyOptions,
    fail_fast: bool,
) -> BatchReport {
    let mut report = BatchReport {
        succeeded: 0,
        failed: 0,
        items: Vec::with_capacity(pairs.len()),
    };

    for (src, dst) in pairs {
        let outcome = match copy(src, dst, opts) {
            Ok(()) => {
                report.succeeded += 1;
                "ok".to_string()
            }
            Err(e) => {
                report.failed += 1;
                warn!("batch copy {} -> {} failed: {}", src.display(), dst.display(), e);
                e.to_string()
            }
        };

        report.items.push(BatchItem {
            source: src.display().to_string(),
            destination: dst.display().to_string(),
            outcome,
        });

        if fail_fast && report.failed > 0 {
            break;
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_round_trips_content_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.bin");
        let dst = dir.path().join("dst.bin");
        let payload: Vec<u8> = (0..100_000).map(|i| (i % 251) as u8).collect();
        fs::write(&src, &payload).unwrap();

        copy(&src, &dst, &CopyOptions::default()).unwrap();

        assert_eq!(fs::read(&dst).unwrap(), payload);
        assert_eq!(
            fs::metadata(&dst).unwrap().len(),
            fs::metadata(&src).unwrap().len()
        );
    }

    #[test]
    fn copy_refuses_existing_destination_without_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a");
        let dst = dir.path().join("b");
        fs::write(&src, b"new").unwrap();
        fs::write(&dst, b"old").unwrap();

        let err = copy(&src, &dst, &CopyOptions::default()).unwrap_err();
        assert!(matches!(err, EngineError::AlreadyExists(_)));
        assert_eq!(fs::read(&dst).unwrap(), b"old");

        let opts = CopyOptions {
            overwrite: true,
            ..Default::default()
        };
        copy(&src, &dst, &opts).unwrap();
        assert_eq!(fs::read(&dst).unwrap(), b"new");
    }

    #[test]
    fn copy_directory_requires_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("tree");
        fs::create_dir(&src).unwrap();

        let err = copy(&src, &dir.path().join("out"), &CopyOptions::default()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[test]
    fn copy_directory_recursive_copies_tree() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("tree");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("top.txt"), b"top").unwrap();
        fs::write(src.join("nested/deep.txt"), b"deep").unwrap();

        let dst = dir.path().join("out");
        let opts = CopyOptions {
            recursive: true,
            ..Default::default()
        };
        copy(&src, &dst, &opts).unwrap();

        assert_eq!(fs::read(dst.join("top.txt")).unwrap(), b"top");
        assert_eq!(fs::read(dst.join("nested/deep.txt")).unwrap(), b"deep");
    }

    #[cfg(unix)]
    #[test]
    fn copy_symlink_recreates_link_not_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target.txt");
        fs::write(&target, b"data").unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let copied = dir.path().join("copied");
        copy(&link, &copied, &CopyOptions::default()).unwrap();

        let meta = fs::symlink_metadata(&copied).unwrap();
        assert!(meta.file_type().is_symlink());
        assert_eq!(fs::read_link(&copied).unwrap(), target);
    }

    #[test]
    fn copy_missing_source_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = copy(
            &dir.path().join("ghost"),
            &dir.path().join("out"),
            &CopyOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[test]
    fn batch_copy_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("one"), b"1").unwrap();
        fs::write(dir.path().join("three"), b"3").unwrap();

        let pairs = vec![
            (dir.path().join("one"), dir.path().join("one.out")),
            (dir.path().join("missing"), dir.path().join("missing.out")),
            (dir.path().join("three"), dir.path().join("three.out")),
        ];

        let report = batch_copy(&pairs, &CopyOptions::default(), false);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.items.len(), 3);
        assert_eq!(report.items[0].outcome, "ok");
        assert!(report.items[1].outcome.contains("not found"));
        assert_eq!(report.items[2].outcome, "ok");
        assert!(dir.path().join("three.out").exists());
    }

    #[test]
    fn batch_copy_fail_fast_stops_early() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("one"), b"1").unwrap();
        fs::write(dir.path().join("three"), b"3").unwrap();

        let pairs = vec![
            (dir.path().join("missing"), dir.path().join("missing.out")),
            (dir.path().join("three"), dir.path().join("three.out")),
        ];

        let report = batch_copy(&pairs, &CopyOptions::default(), true);
        assert_eq!(report.succeeded, 0);
        assert_eq!(report.failed, 1);
        assert_eq!(report.items.len(), 1);
        assert!(!dir.path().join("three.out").exists());
    }

    #[test]
    fn recursive_delete_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("a");
        fs::create_dir_all(root.join("b")).unwrap();
        fs::write(root.join("b/c.txt"), b"x").unwrap();

        delete(&root, true).unwrap();
        assert!(!root.exists());
    }

    #[test]
    fn non_recursive_delete_refuses_populated_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("full");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("kid.txt"), b"x").unwrap();

        let err = delete(&root, false).unwrap_err();
        assert!(matches!(err, EngineError::NotEmpty(_)));
        assert!(root.exists());

        // An empty directory needs no recursive flag
        let empty = dir.path().join("empty");
        fs::create_dir(&empty).unwrap();
        delete(&empty, false).unwrap();
        assert!(!empty.exists());
    }

    #[test]
    fn delete_missing_is_not_found() {
        let err = delete(Path::new("/no/such/thing"), false).unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[test]
    fn create_directory_recursive_builds_intermediates() {
        let dir = tempfile::tempdir().unwrap();
        let deep = dir.path().join("x/y/z");

        create_directory(&deep, true).unwrap();
        assert!(deep.is_dir());

        // Existing leaf fails even in recursive mode
        let err = create_directory(&deep, true).unwrap_err();
        assert!(matches!(err, EngineError::AlreadyExists(_)));
    }

    #[test]
    fn create_directory_non_recursive_needs_parent() {
        let dir = tempfile::tempdir().unwrap();
        let err = create_directory(&dir.path().join("missing/leaf"), false).unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[test]
    fn create_file_builds_parent_and_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub/notes.txt");

        create_file(&path, b"first").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"first");

        create_file(&path, b"").unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn move_renames_within_volume() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("before.txt");
        let dst = dir.path().join("after.txt");
        fs::write(&src, b"payload").unwrap();

        move_item(&src, &dst).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read(&dst).unwrap(), b"payload");
    }

    #[test]
    fn move_missing_source_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = move_item(&dir.path().join("ghost"), &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }
}
