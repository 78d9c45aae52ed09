use std::fs::Metadata;
use std::os::windows::fs::MetadataExt;

use windows::Win32::Storage::FileSystem::{
    FILE_ATTRIBUTE_DIRECTORY, FILE_ATTRIBUTE_HIDDEN, FILE_ATTRIBUTE_READONLY,
    FILE_ATTRIBUTE_REPARSE_POINT,
};

use nav_platform::meta::PlatformMeta;

pub struct WindowsMeta;

impl WindowsMeta {
    pub fn new() -> Self {
        Self
    }
}

impl PlatformMeta for WindowsMeta {
    fn owner_name(&self, _meta: &Metadata) -> String {
        // NTFS owners are SIDs; resolving them needs the security API and an
        // open handle per file, which is too costly per enumeration entry.
        String::new()
    }

    fn group_name(&self, _meta: &Metadata) -> String {
        String::new()
    }

    fn mode_bits(&self, meta: &Metadata) -> u32 {
        meta.file_attributes()
    }

    fn permissions_string(&self, meta: &Metadata) -> String {
        let attrs = meta.file_attributes();

        let type_char = if attrs & FILE_ATTRIBUTE_REPARSE_POINT.0 != 0 {
            'l'
        } else if attrs & FILE_ATTRIBUTE_DIRECTORY.0 != 0 {
            'd'
        } else {
            '-'
        };

        let triplet = if attrs & FILE_ATTRIBUTE_READONLY.0 != 0 {
            "r-x"
        } else {
            "rwx"
        };

        let mut out = String::with_capacity(10);
        out.push(type_char);
        out.push_str(triplet);
        out.push_str(triplet);
        out.push_str(triplet);
        out
    }

    fn is_hidden(&self, _name: &str, meta: &Metadata) -> bool {
        meta.file_attributes() & FILE_ATTRIBUTE_HIDDEN.0 != 0
    }

    fn is_read_only(&self, meta: &Metadata) -> bool {
        meta.file_attributes() & FILE_ATTRIBUTE_READONLY.0 != 0
    }
}
