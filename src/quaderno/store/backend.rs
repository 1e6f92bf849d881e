use crate::error::Result;
use crate::model::Scope;
use std::path::PathBuf;

/// Abstract interface for raw storage I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while JsonStore handles the "what" (shapes, recovery, backups).
pub trait StorageBackend {
    /// Read a file as text.
    /// Returns Ok(None) if the file does not exist.
    /// Returns Err on I/O failure (permissions, invalid UTF-8, disk failure).
    fn read(&self, scope: Scope, file: &str) -> Result<Option<String>>;

    /// Write a file.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn write(&self, scope: Scope, file: &str, content: &str) -> Result<()>;

    /// Copy the current bytes of `file` to `<file>.<suffix>`.
    /// Returns the copy's location, or None when there was nothing to copy.
    fn preserve(&self, scope: Scope, file: &str, suffix: &str) -> Result<Option<PathBuf>>;

    /// Get the "file path" for a file.
    /// For FsBackend, this is the real path. For MemBackend, a virtual path.
    /// Returns Err if the scope is not available.
    fn location(&self, scope: Scope, file: &str) -> Result<PathBuf>;

    /// Check if a scope is available.
    fn scope_available(&self, scope: Scope) -> bool;
}
