//! Directory enumeration with the UI-facing ordering contract:
//! directories first, then symlinks, then files, lexicographic within each
//! group.

use std::fs;
use std::path::Path;

use tracing::debug;

use nav_platform::Entry;

use crate::error::{EngineError, EngineResult};
use crate::metadata;

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub recursive: bool,
    pub show_hidden: bool,
    /// Substring match against the entry name, not a glob.
    pub name_pattern: Option<String>,
    /// Maximum recursion depth; `None` is unbounded. The starting directory
    /// is depth 0.
    pub max_depth: Option<usize>,
    pub follow_symlinks: bool,
}

/// Enumerate the children of `path`. Enumeration is best-effort: entries
/// that fail to stat (permission denied, deleted mid-walk) are skipped, not
/// surfaced as partial errors. Only the starting directory itself reports
/// failure.
pub fn list(path: &Path, opts: &ListOptions) -> EngineResult<Vec<Entry>> {
    let meta = fs::metadata(path).map_err(|e| EngineError::from_io(path, e))?;
    if !meta.is_dir() {
        return Err(EngineError::NotADirectory(path.display().to_string()));
    }

    let mut entries = Vec::new();
    walk(path, 0, opts, &mut entries)?;
    sort_entries(&mut entries);
    Ok(entries)
}

fn walk(dir: &Path, depth: usize, opts: &ListOptions, out: &mut Vec<Entry>) -> EngineResult<()> {
    if let Some(max) = opts.max_depth {
        if depth > max {
            return Ok(());
        }
    }

    let read_dir = match fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) if depth > 0 => {
            debug!("skipping unreadable directory {}: {}", dir.display(), e);
            return Ok(());
        }
        Err(e) => return Err(EngineError::from_io(dir, e)),
    };

    for dir_entry in read_dir {
        let Ok(dir_entry) = dir_entry else { continue };
        let child = dir_entry.path();

        let entry = match metadata::stat(&child, opts.follow_symlinks) {
            Ok(entry) => entry,
            Err(e) => {
                debug!("skipping {}: {}", child.display(), e);
                continue;
            }
        };

        // Hidden filter before pattern filter; filtered entries are not
        // descended into either.
        if !opts.show_hidden && entry.is_hidden {
            continue;
        }
        if let Some(pattern) = &opts.name_pattern {
            if !entry.name.contains(pattern.as_str()) {
                continue;
            }
        }

        // Recurse only into real directories; symlinked directories would
        // invite cycles. file_type() does not follow links.
        let descend = opts.recursive
            && dir_entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);

        out.push(entry);

        if descend {
            walk(&child, depth + 1, opts, out)?;
        }
    }

    Ok(())
}

fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use nav_platform::EntryKind;

    fn names(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn sort_contract_directories_then_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), b"x").unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::create_dir(dir.path().join("c")).unwrap();

        let entries = list(dir.path(), &ListOptions::default()).unwrap();
        assert_eq!(names(&entries), vec!["a", "c", "b.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_sort_between_directories_and_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("file.txt"), b"x").unwrap();
        fs::create_dir(dir.path().join("zdir")).unwrap();
        std::os::unix::fs::symlink("file.txt", dir.path().join("alink")).unwrap();

        let entries = list(dir.path(), &ListOptions::default()).unwrap();
        assert_eq!(names(&entries), vec!["zdir", "alink", "file.txt"]);
        assert_eq!(entries[1].kind, EntryKind::Symlink);
    }

    #[test]
    fn listing_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("one"), b"1").unwrap();
        fs::write(dir.path().join("two"), b"2").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let first = list(dir.path(), &ListOptions::default()).unwrap();
        let second = list(dir.path(), &ListOptions::default()).unwrap();
        assert_eq!(names(&first), names(&second));
        assert_eq!(first.len(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn hidden_entries_filtered_by_default() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("visible.txt"), b"x").unwrap();
        fs::write(dir.path().join(".hidden"), b"x").unwrap();

        let entries = list(dir.path(), &ListOptions::default()).unwrap();
        assert_eq!(names(&entries), vec!["visible.txt"]);

        let opts = ListOptions {
            show_hidden: true,
            ..Default::default()
        };
        let entries = list(dir.path(), &opts).unwrap();
        assert_eq!(names(&entries), vec![".hidden", "visible.txt"]);
    }

    #[test]
    fn pattern_is_substring_match() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("report-jan.csv"), b"x").unwrap();
        fs::write(dir.path().join("report-feb.csv"), b"x").unwrap();
        fs::write(dir.path().join("summary.txt"), b"x").unwrap();

        let opts = ListOptions {
            name_pattern: Some("report".to_string()),
            ..Default::default()
        };
        let entries = list(dir.path(), &opts).unwrap();
        assert_eq!(names(&entries), vec!["report-feb.csv", "report-jan.csv"]);
    }

    #[test]
    fn recursive_listing_honors_max_depth() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("l1/l2/l3")).unwrap();
        fs::write(dir.path().join("l1/a.txt"), b"x").unwrap();
        fs::write(dir.path().join("l1/l2/b.txt"), b"x").unwrap();
        fs::write(dir.path().join("l1/l2/l3/c.txt"), b"x").unwrap();

        let opts = ListOptions {
            recursive: true,
            max_depth: Some(1),
            ..Default::default()
        };
        let entries = list(dir.path(), &opts).unwrap();
        let found = names(&entries);
        assert!(found.contains(&"a.txt"));
        assert!(found.contains(&"l2"));
        assert!(!found.contains(&"b.txt"));
        assert!(!found.contains(&"c.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn recursion_never_descends_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("real")).unwrap();
        fs::write(dir.path().join("real/inner.txt"), b"x").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("loop")).unwrap();

        let opts = ListOptions {
            recursive: true,
            ..Default::default()
        };
        let entries = list(dir.path(), &opts).unwrap();
        // inner.txt appears once (under real/), not again under loop/
        let inner_count = entries.iter().filter(|e| e.name == "inner.txt").count();
        assert_eq!(inner_count, 1);
    }

    #[test]
    fn listing_a_file_is_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        fs::write(&file, b"x").unwrap();

        let err = list(&file, &ListOptions::default()).unwrap_err();
        assert!(matches!(err, EngineError::NotADirectory(_)));
    }

    #[test]
    fn listing_missing_path_is_not_found() {
        let err = list(Path::new("/no/such/dir"), &ListOptions::default()).unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }
}
