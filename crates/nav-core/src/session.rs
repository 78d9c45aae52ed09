//! The command dispatcher. A [`Session`] owns its current path — one
//! session per front-end connection — so concurrent callers never share
//! navigation state.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::command::{
    AckPayload, Command, CommandReply, DeletePayload, DirSummaryPayload, DiskInfoPayload,
    DiskSummary, InfoPayload, ListingPayload, PwdPayload, RenamePayload, SearchHit,
    SearchPayload, TransferPayload,
};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::listing::{self, ListOptions};
use crate::ops::{self, CopyOptions};
use crate::util::format_size;
use crate::{disk, metadata, paths, search};

pub struct Session {
    current_path: PathBuf,
    config: EngineConfig,
}

impl Session {
    pub fn new(config: EngineConfig) -> Self {
        let start = config
            .start_path
            .as_ref()
            .map(PathBuf::from)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("/"));

        // Best effort: a missing start path still yields a usable session,
        // the first command will surface the error
        let current_path = paths::canonicalize(&start).unwrap_or(start);

        Self {
            current_path,
            config,
        }
    }

    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    /// The single entry point front ends call. Engine errors become error
    /// replies; nothing here panics on a bad command or a failed operation.
    pub fn dispatch(&mut self, name: &str, args: &[String]) -> CommandReply {
        let command = match Command::parse(name, args) {
            Ok(command) => command,
            Err(e) => return e.into(),
        };

        match self.execute(command) {
            Ok(reply) => reply,
            Err(e) => {
                debug!("command {} failed: {}", name, e);
                e.into()
            }
        }
    }

    fn execute(&mut self, command: Command) -> EngineResult<CommandReply> {
        match command {
            Command::List { path } => {
                let dir = self.resolve(path.as_deref());
                let opts = ListOptions {
                    show_hidden: true,
                    ..Default::default()
                };
                let files = listing::list(&dir, &opts)?;
                Ok(CommandReply::Listing(ListingPayload { files }))
            }

            Command::Cd { path } => {
                let target = paths::canonicalize(&self.resolve(Some(&path)))?;
                let meta = fs::metadata(&target).map_err(|e| EngineError::from_io(&target, e))?;
                if !meta.is_dir() {
                    return Err(EngineError::NotADirectory(target.display().to_string()));
                }
                // Only now — the session path never changes on a failed cd
                self.current_path = target;
                Ok(CommandReply::Ack(AckPayload {
                    success: true,
                    path: self.current_path.display().to_string(),
                }))
            }

            Command::Search {
                pattern,
                recursive,
                path,
            } => {
                let start = self.resolve(path.as_deref());
                let hits = search::search(
                    &start,
                    &pattern,
                    recursive,
                    self.config.search_result_cap,
                )?;
                let results: Vec<SearchHit> = hits.into_iter().map(SearchHit::from).collect();
                let count = results.len();
                Ok(CommandReply::Search(SearchPayload { results, count }))
            }

            Command::Info { path: Some(path) } => {
                let target = self.resolve(Some(&path));
                let entry = metadata::stat(&target, false)?;
                let size_formatted = format_size(entry.size);
                Ok(CommandReply::Info(Box::new(InfoPayload {
                    entry,
                    size_formatted,
                })))
            }

            Command::Info { path: None } => {
                let opts = ListOptions {
                    show_hidden: true,
                    ..Default::default()
                };
                let items = listing::list(&self.current_path, &opts)?;
                let stats = disk::disk_stats(&self.current_path)?;
                Ok(CommandReply::DirSummary(DirSummaryPayload {
                    path: self.current_path.display().to_string(),
                    item_count: items.len(),
                    disk_info: DiskSummary {
                        total: format_size(stats.total_bytes),
                        free: format_size(stats.free_bytes),
                        available: format_size(stats.available_bytes),
                        used: format_size(stats.used_bytes),
                        filesystem: stats.filesystem,
                        usage_percent: stats.usage_percent,
                    },
                }))
            }

            Command::Mkdir { path, parents } => {
                let target = self.resolve(Some(&path));
                ops::create_directory(&target, parents)?;
                Ok(CommandReply::Ack(AckPayload {
                    success: true,
                    path: target.display().to_string(),
                }))
            }

            Command::Delete { path, recursive } => {
                let target = self.resolve(Some(&path));
                ops::delete(&target, recursive)?;
                Ok(CommandReply::Deleted(DeletePayload {
                    success: true,
                    item: target.display().to_string(),
                }))
            }

            Command::Copy {
                source,
                destination,
                recursive,
            } => {
                let src = self.resolve(Some(&source));
                let dst = self.resolve(Some(&destination));
                let opts = CopyOptions {
                    overwrite: true,
                    recursive,
                    preserve_timestamps: self.config.preserve_timestamps_on_copy,
                    ..Default::default()
                };
                ops::copy(&src, &dst, &opts)?;
                Ok(CommandReply::Transferred(TransferPayload {
                    success: true,
                    source: src.display().to_string(),
                    destination: dst.display().to_string(),
                }))
            }

            Command::Move {
                source,
                destination,
            } => {
                let src = self.resolve(Some(&source));
                let dst = self.resolve(Some(&destination));
                ops::move_item(&src, &dst)?;
                Ok(CommandReply::Transferred(TransferPayload {
                    success: true,
                    source: src.display().to_string(),
                    destination: dst.display().to_string(),
                }))
            }

            Command::Rename { old, new } => {
                let old_path = self.resolve(Some(&old));
                let new_path = self.resolve(Some(&new));
                ops::rename_item(&old_path, &new_path)?;
                Ok(CommandReply::Renamed(RenamePayload {
                    success: true,
                    old_name: old_path.display().to_string(),
                    new_name: new_path.display().to_string(),
                }))
            }

            Command::Pwd => Ok(CommandReply::CurrentPath(PwdPayload {
                current_path: self.current_path.display().to_string(),
            })),

            Command::DiskInfo { path } => {
                let target = self.resolve(path.as_deref());
                let stats = disk::disk_stats(&target)?;
                Ok(CommandReply::Disk(DiskInfoPayload {
                    total_formatted: format_size(stats.total_bytes),
                    free_formatted: format_size(stats.free_bytes),
                    available_formatted: format_size(stats.available_bytes),
                    used_formatted: format_size(stats.used_bytes),
                    stats,
                }))
            }
        }
    }

    fn resolve(&self, input: Option<&str>) -> PathBuf {
        paths::resolve(&self.current_path, input.unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_at(dir: &Path) -> Session {
        Session::new(EngineConfig {
            start_path: Some(dir.display().to_string()),
            ..Default::default()
        })
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn failed_cd_leaves_current_path_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_at(dir.path());
        let before = session.current_path().to_path_buf();

        let reply = session.dispatch("cd", &args(&["/definitely/not/here"]));
        assert!(reply.is_error());
        assert_eq!(session.current_path(), before);

        let value = serde_json::to_value(session.dispatch("pwd", &[])).unwrap();
        assert_eq!(value["currentPath"], before.display().to_string());
    }

    #[test]
    fn cd_into_subdirectory_updates_pwd() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("inner")).unwrap();
        let mut session = session_at(dir.path());

        let reply = session.dispatch("cd", &args(&["inner"]));
        assert!(!reply.is_error());
        assert!(session.current_path().ends_with("inner"));
    }

    #[test]
    fn cd_to_a_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("plain.txt"), b"x").unwrap();
        let mut session = session_at(dir.path());

        let reply = session.dispatch("cd", &args(&["plain.txt"]));
        let value = serde_json::to_value(reply).unwrap();
        assert!(value["error"]
            .as_str()
            .unwrap()
            .contains("not a directory"));
    }

    #[test]
    fn unknown_command_becomes_error_reply() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_at(dir.path());

        let value = serde_json::to_value(session.dispatch("frobnicate", &[])).unwrap();
        assert!(value["error"].as_str().unwrap().contains("unknown command"));
    }

    #[test]
    fn list_reply_carries_files_array() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"x").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let mut session = session_at(dir.path());

        let value = serde_json::to_value(session.dispatch("list", &[])).unwrap();
        let files = value["files"].as_array().unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0]["name"], "sub");
        assert_eq!(files[0]["type"], "directory");
        assert_eq!(files[1]["name"], "a.txt");
    }

    #[test]
    fn mkdir_then_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_at(dir.path());

        let reply = session.dispatch("mkdir", &args(&["fresh"]));
        assert!(!reply.is_error());
        assert!(dir.path().join("fresh").is_dir());

        let value = serde_json::to_value(session.dispatch("delete", &args(&["fresh"]))).unwrap();
        assert_eq!(value["success"], true);
        assert!(!dir.path().join("fresh").exists());
    }

    #[test]
    fn copy_command_overwrites_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("src.txt"), b"new").unwrap();
        fs::write(dir.path().join("dst.txt"), b"old").unwrap();
        let mut session = session_at(dir.path());

        let reply = session.dispatch("copy", &args(&["src.txt", "dst.txt"]));
        assert!(!reply.is_error());
        assert_eq!(fs::read(dir.path().join("dst.txt")).unwrap(), b"new");
    }

    #[test]
    fn rename_reply_reports_both_names() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("old.txt"), b"x").unwrap();
        let mut session = session_at(dir.path());

        let value =
            serde_json::to_value(session.dispatch("rename", &args(&["old.txt", "new.txt"])))
                .unwrap();
        assert_eq!(value["success"], true);
        assert!(value["oldName"].as_str().unwrap().ends_with("old.txt"));
        assert!(value["newName"].as_str().unwrap().ends_with("new.txt"));
        assert!(dir.path().join("new.txt").exists());
    }

    #[test]
    fn search_honors_configured_result_cap() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5 {
            fs::write(dir.path().join(format!("match-{}.txt", i)), b"x").unwrap();
        }
        let mut session = Session::new(EngineConfig {
            start_path: Some(dir.path().display().to_string()),
            search_result_cap: 2,
            ..Default::default()
        });

        let value = serde_json::to_value(session.dispatch("search", &args(&["match"]))).unwrap();
        assert_eq!(value["count"], 2);
        assert_eq!(value["results"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn info_on_file_includes_formatted_size() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("blob.bin"), vec![0u8; 2048]).unwrap();
        let mut session = session_at(dir.path());

        let value = serde_json::to_value(session.dispatch("info", &args(&["blob.bin"]))).unwrap();
        assert_eq!(value["size"], 2048);
        assert_eq!(value["sizeFormatted"], "2.00 KB");
        assert_eq!(value["type"], "file");
    }

    #[test]
    fn info_without_argument_summarizes_current_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a"), b"x").unwrap();
        fs::write(dir.path().join("b"), b"x").unwrap();
        let mut session = session_at(dir.path());

        let value = serde_json::to_value(session.dispatch("info", &[])).unwrap();
        assert_eq!(value["itemCount"], 2);
        assert!(value["diskInfo"]["usagePercent"].is_number());
        assert!(value["diskInfo"]["total"].is_string());
    }

    #[test]
    fn diskinfo_reply_carries_raw_and_formatted_fields() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_at(dir.path());

        let value = serde_json::to_value(session.dispatch("diskinfo", &[])).unwrap();
        assert!(value["totalBytes"].as_u64().unwrap() > 0);
        assert!(value["usagePercent"].is_number());
        assert!(value["totalFormatted"].is_string());
        assert!(value["usedFormatted"].is_string());
    }

    #[test]
    fn relative_arguments_resolve_against_current_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("inner")).unwrap();
        fs::write(dir.path().join("inner/deep.txt"), b"x").unwrap();
        let mut session = session_at(dir.path());

        session.dispatch("cd", &args(&["inner"]));
        let value = serde_json::to_value(session.dispatch("info", &args(&["deep.txt"]))).unwrap();
        assert_eq!(value["name"], "deep.txt");
    }
}
