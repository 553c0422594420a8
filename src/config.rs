/*!
 * Job options and defaults for ocopy
 */

/// Options governing a single copy job, set once at CLI parse time and
/// threaded explicitly into TreeWalker and VerifiedCopier rather than
/// read back off ambient/thread-local state.
#[derive(Debug, Clone, Copy)]
pub struct JobOptions {
    /// Overwrite a destination file that already exists.
    pub overwrite: bool,

    /// Re-read and checksum-compare all copies against the source after writing.
    pub verify: bool,

    /// Treat a destination file with matching size and mtime (within 2s) as already copied.
    pub skip_existing: bool,

    /// Chunk size used by both the fan-out copy and the hashers, in bytes.
    pub chunk_size: usize,

    /// Emit raw integer percent-done lines instead of an interactive progress bar.
    pub machine_readable: bool,
}

/// Tolerance, in whole seconds, for treating two mtimes as equal during skip-existing checks.
/// Chosen to accommodate FAT32's 2-second timestamp resolution.
pub const MTIME_TOLERANCE_SECS: i64 = 2;

/// Chunk size used when the caller does not override it: 1 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Basenames never copied to any destination, matched exactly (not by pattern).
pub const IGNORED_BASENAMES: &[&str] = &[".DS_Store", ".fseventsd"];

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            verify: true,
            skip_existing: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
            machine_readable: false,
        }
    }
}
