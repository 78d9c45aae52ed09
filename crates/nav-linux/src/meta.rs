use std::fs::Metadata;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use anyhow::{Context, Result};
use nix::sys::stat::{Mode, SFlag};
use nix::unistd::{Gid, Group, Uid, User};

use nav_platform::meta::PlatformMeta;

pub struct LinuxMeta;

impl LinuxMeta {
    pub fn new() -> Self {
        Self
    }
}

impl PlatformMeta for LinuxMeta {
    fn owner_name(&self, meta: &Metadata) -> String {
        let uid = meta.uid();
        match User::from_uid(Uid::from_raw(uid)) {
            Ok(Some(user)) => user.name,
            // Unknown id (e.g. deleted account) — report the number instead
            _ => uid.to_string(),
        }
    }

    fn group_name(&self, meta: &Metadata) -> String {
        let gid = meta.gid();
        match Group::from_gid(Gid::from_raw(gid)) {
            Ok(Some(group)) => group.name,
            _ => gid.to_string(),
        }
    }

    fn mode_bits(&self, meta: &Metadata) -> u32 {
        meta.mode() & 0o7777
    }

    fn permissions_string(&self, meta: &Metadata) -> String {
        symbolic_permissions(meta.mode())
    }

    fn is_hidden(&self, name: &str, _meta: &Metadata) -> bool {
        name.starts_with('.')
    }

    fn is_read_only(&self, meta: &Metadata) -> bool {
        !Mode::from_bits_truncate(meta.mode()).contains(Mode::S_IWUSR)
    }
}

/// Render a full `st_mode` as the 10-character `ls -l` style string.
/// setuid/setgid/sticky overlay the execute slots as `s`/`S` and `t`/`T`.
pub fn symbolic_permissions(mode: u32) -> String {
    let kind = SFlag::from_bits_truncate(mode & SFlag::S_IFMT.bits());
    let bits = Mode::from_bits_truncate(mode);

    let type_char = if kind == SFlag::S_IFDIR {
        'd'
    } else if kind == SFlag::S_IFLNK {
        'l'
    } else if kind == SFlag::S_IFIFO {
        'p'
    } else if kind == SFlag::S_IFSOCK {
        's'
    } else if kind == SFlag::S_IFCHR {
        'c'
    } else if kind == SFlag::S_IFBLK {
        'b'
    } else {
        '-'
    };

    let mut out = String::with_capacity(10);
    out.push(type_char);

    out.push(if bits.contains(Mode::S_IRUSR) { 'r' } else { '-' });
    out.push(if bits.contains(Mode::S_IWUSR) { 'w' } else { '-' });
    out.push(exec_char(
        bits.contains(Mode::S_IXUSR),
        bits.contains(Mode::S_ISUID),
        's',
        'S',
    ));

    out.push(if bits.contains(Mode::S_IRGRP) { 'r' } else { '-' });
    out.push(if bits.contains(Mode::S_IWGRP) { 'w' } else { '-' });
    out.push(exec_char(
        bits.contains(Mode::S_IXGRP),
        bits.contains(Mode::S_ISGID),
        's',
        'S',
    ));

    out.push(if bits.contains(Mode::S_IROTH) { 'r' } else { '-' });
    out.push(if bits.contains(Mode::S_IWOTH) { 'w' } else { '-' });
    out.push(exec_char(
        bits.contains(Mode::S_IXOTH),
        bits.contains(Mode::S_ISVTX),
        't',
        'T',
    ));

    out
}

fn exec_char(exec: bool, special: bool, with_exec: char, without_exec: char) -> char {
    match (special, exec) {
        (true, true) => with_exec,
        (true, false) => without_exec,
        (false, true) => 'x',
        (false, false) => '-',
    }
}

/// Give `dst` the same owner and group as the stat'd source. Requires
/// privileges for foreign owners, so callers treat failure as non-fatal.
pub fn copy_ownership(src_meta: &Metadata, dst: &Path) -> Result<()> {
    nix::unistd::chown(
        dst,
        Some(Uid::from_raw(src_meta.uid())),
        Some(Gid::from_raw(src_meta.gid())),
    )
    .with_context(|| format!("chown failed for {}", dst.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_file_permissions() {
        assert_eq!(symbolic_permissions(0o100644), "-rw-r--r--");
        assert_eq!(symbolic_permissions(0o100755), "-rwxr-xr-x");
        assert_eq!(symbolic_permissions(0o100000), "----------");
    }

    #[test]
    fn directory_and_symlink_markers() {
        assert_eq!(symbolic_permissions(0o040755), "drwxr-xr-x");
        assert_eq!(symbolic_permissions(0o120777), "lrwxrwxrwx");
    }

    #[test]
    fn setuid_setgid_overlays() {
        assert_eq!(symbolic_permissions(0o104755), "-rwsr-xr-x");
        assert_eq!(symbolic_permissions(0o104644), "-rwSr--r--");
        assert_eq!(symbolic_permissions(0o102755), "-rwxr-sr-x");
        assert_eq!(symbolic_permissions(0o102745), "-rwxr-Sr-x");
    }

    #[test]
    fn sticky_bit_overlays() {
        assert_eq!(symbolic_permissions(0o041777), "drwxrwxrwt");
        assert_eq!(symbolic_permissions(0o041776), "drwxrwxrwT");
    }

    #[test]
    fn owner_lookup_never_fails() {
        let meta = std::fs::metadata("/").unwrap();
        let platform = LinuxMeta::new();
        assert!(!platform.owner_name(&meta).is_empty());
        assert!(!platform.group_name(&meta).is_empty());
    }

    #[test]
    fn hidden_is_leading_dot() {
        let meta = std::fs::metadata("/").unwrap();
        let platform = LinuxMeta::new();
        assert!(platform.is_hidden(".bashrc", &meta));
        assert!(!platform.is_hidden("bashrc", &meta));
    }
}
