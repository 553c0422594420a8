/*!
 * ocopy - verified fan-out file copy engine
 *
 * Copies a source tree to one or more destinations concurrently, hashing the
 * source once with xxhash64 while every destination is written in parallel,
 * then re-reads every copy to confirm it matches before committing it in
 * place. Emits an MHL manifest and a flat xxHash.txt summary per destination.
 */

pub mod config;
pub mod core;
pub mod error;
pub mod job;
pub mod logging;

pub use config::JobOptions;
pub use core::types::FileInfo;
pub use error::{CopyError, ErrorEntry, Result};
pub use job::{CopyJob, JobState};

/// Crate version, as reported by `ocopy --version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
