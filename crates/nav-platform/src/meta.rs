use std::fs::Metadata;

/// Platform-specific pieces of metadata extraction. The portable parts
/// (size, timestamps, link targets) live in the engine; implementations only
/// answer what the standard library cannot express uniformly.
pub trait PlatformMeta: Send + Sync {
    /// Owner of the node. Falls back to the numeric id rendered as text when
    /// the name cannot be resolved; never fails the call.
    fn owner_name(&self, meta: &Metadata) -> String;

    /// Owning group, with the same numeric-id fallback as `owner_name`.
    fn group_name(&self, meta: &Metadata) -> String;

    /// Raw permission bits as the platform reports them.
    fn mode_bits(&self, meta: &Metadata) -> u32;

    /// 10-character symbolic permission string: type marker followed by
    /// `rwxrwxrwx` for user/group/other.
    fn permissions_string(&self, meta: &Metadata) -> String;

    /// Whether the node counts as hidden under this platform's one
    /// consistent rule (leading dot on Unix, hidden attribute on Windows).
    fn is_hidden(&self, name: &str, meta: &Metadata) -> bool;

    fn is_read_only(&self, meta: &Metadata) -> bool;
}
