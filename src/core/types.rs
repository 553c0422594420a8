/*!
 * Small value types shared across the copy engine.
 */

use std::path::PathBuf;

/// One record per successfully copied regular file. Immutable once created;
/// the sole input to `ManifestWriter`.
#[derive(Debug, Clone)]
pub struct FileInfo {
    /// Absolute path of the source file.
    pub source: PathBuf,
    /// Source-root-relative, POSIX-style path, as recorded in the MHL `<file>` element.
    pub relative_path: PathBuf,
    /// 16 lowercase hex char xxhash64 digest, or empty if the file was fully
    /// skipped and no prior MHL hash could be recovered.
    pub hash: String,
    /// Byte size of the source file.
    pub size: u64,
    /// Source modification time, seconds since the Unix epoch.
    pub mtime: f64,
}
