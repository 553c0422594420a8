/*!
 * VerifiedCopier: wraps FanoutCopier with the temp-name/rename protocol,
 * skip-existing and overwrite policy, and the post-copy re-hash comparison.
 */

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::checksum;
use super::fanout;
use super::manifest;
use super::JobHooks;
use crate::config::{JobOptions, MTIME_TOLERANCE_SECS};
use crate::error::{CopyError, Result};

fn epoch_secs(t: SystemTime) -> i64 {
    t.duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn mtimes_within_tolerance(a: SystemTime, b: SystemTime) -> bool {
    (epoch_secs(a) - epoch_secs(b)).abs() <= MTIME_TOLERANCE_SECS
}

fn temp_path(dst: &Path) -> PathBuf {
    let mut name = dst.file_name().unwrap_or_default().to_os_string();
    name.push(".copy_in_progress");
    dst.with_file_name(name)
}

/// Copy `src` to every path in `dsts`, honoring `options`, and return the
/// resulting hex digest (or the recovered/empty string on a full skip).
///
/// `relative_path` is `src`'s path relative to the job's source root, used
/// both as the MHL lookup key and the progress display string.
/// `primary_dest_root` is the job's first destination root (`dst_root_1`),
/// consulted for a prior MHL when every destination is skipped.
pub fn verified_copy(
    src: &Path,
    relative_path: &Path,
    dsts: &[PathBuf],
    primary_dest_root: &Path,
    options: &JobOptions,
    hooks: &JobHooks,
) -> Result<String> {
    let source_meta = std::fs::metadata(src)?;
    let source_size = source_meta.len();
    let source_mtime = source_meta.modified()?;

    let mut todo: Vec<PathBuf> = Vec::with_capacity(dsts.len());
    for dst in dsts {
        if dst.exists() {
            let dst_meta = std::fs::metadata(dst)?;
            let size_matches = dst_meta.len() == source_size;
            let mtime_matches = dst_meta
                .modified()
                .map(|m| mtimes_within_tolerance(source_mtime, m))
                .unwrap_or(false);

            if options.skip_existing && size_matches && mtime_matches {
                hooks.record_skip();
                continue;
            } else if options.overwrite {
                std::fs::remove_file(dst)?;
                todo.push(dst.clone());
            } else {
                return Err(CopyError::FileExists(dst.clone()));
            }
        } else {
            todo.push(dst.clone());
        }
    }

    if todo.is_empty() {
        let recovered = manifest::find_existing_mhl(primary_dest_root)
            .and_then(|mhl| manifest::find_hash_in_mhl(&mhl, relative_path));
        return Ok(recovered.unwrap_or_default());
    }

    let temp_paths: Vec<PathBuf> = todo.iter().map(|d| temp_path(d)).collect();
    let display = relative_path.to_string_lossy().into_owned();

    let result: Result<String> = (|| {
        let source_hex = fanout::copy(
            src,
            &temp_paths,
            options.chunk_size,
            hooks.progress(),
            &display,
        )?;

        if options.verify {
            let mut verify_paths = temp_paths.clone();
            verify_paths.push(src.to_path_buf());
            let agreed = checksum::multi_hash(&verify_paths, hooks.progress())?;
            if agreed != source_hex {
                return Err(CopyError::VerificationMismatch {
                    source: src.to_path_buf(),
                });
            }
        }

        for (temp, dst) in temp_paths.iter().zip(todo.iter()) {
            std::fs::rename(temp, dst)?;
        }

        Ok(source_hex)
    })();

    if result.is_err() {
        for temp in &temp_paths {
            match std::fs::remove_file(temp) {
                Ok(()) | Err(_) => {} // best-effort; NotFound and any other removal failure are both swallowed
            }
        }
    }

    result
}
