/*!
 * TreeWalker: recursively mirrors a source directory into every destination
 * root, dispatching per-file verified copies and accumulating both
 * `FileInfo` successes and `ErrorEntry` failures without aborting the walk.
 */

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use super::metadata::preserve_metadata;
use super::types::FileInfo;
use super::verified_copy::verified_copy;
use super::JobHooks;
use crate::config::{JobOptions, IGNORED_BASENAMES};
use crate::error::ErrorEntry;

/// Walk `src_root`, mirroring it into every path in `dst_roots`. Returns the
/// successfully copied files and any per-file failures; never raises — a
/// caller that wants exception-style propagation can match on
/// `!errors.is_empty()` itself.
pub fn walk(
    src_root: &Path,
    dst_roots: &[PathBuf],
    options: &JobOptions,
    hooks: &JobHooks,
) -> (Vec<FileInfo>, Vec<ErrorEntry>) {
    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for dst_root in dst_roots {
        if let Err(e) = std::fs::create_dir_all(dst_root) {
            errors.push(ErrorEntry::new(
                src_root.to_path_buf(),
                dst_roots.to_vec(),
                format!("failed to create destination root: {e}"),
            ));
            return (successes, errors);
        }
    }

    let primary_dest_root = dst_roots[0].clone();
    walk_dir(
        src_root,
        dst_roots,
        src_root,
        &primary_dest_root,
        options,
        hooks,
        &mut successes,
        &mut errors,
    );

    for dst_root in dst_roots {
        if let Err(e) = preserve_metadata(src_root, dst_root) {
            errors.push(ErrorEntry::new(
                src_root.to_path_buf(),
                vec![dst_root.clone()],
                format!("failed to preserve root metadata: {e}"),
            ));
        }
    }

    (successes, errors)
}

#[allow(clippy::too_many_arguments)]
fn walk_dir(
    src_dir: &Path,
    dst_dirs: &[PathBuf],
    src_root: &Path,
    primary_dest_root: &Path,
    options: &JobOptions,
    hooks: &JobHooks,
    successes: &mut Vec<FileInfo>,
    errors: &mut Vec<ErrorEntry>,
) {
    let entries = match std::fs::read_dir(src_dir) {
        Ok(e) => e,
        Err(e) => {
            errors.push(ErrorEntry::new(
                src_dir.to_path_buf(),
                dst_dirs.to_vec(),
                format!("failed to read directory: {e}"),
            ));
            return;
        }
    };

    for entry in entries {
        if hooks.is_cancelled() {
            break;
        }

        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };

        let name = entry.file_name();
        if IGNORED_BASENAMES
            .iter()
            .any(|ignored| name.to_string_lossy() == *ignored)
        {
            continue;
        }

        let src_path = entry.path();
        let dst_paths: Vec<PathBuf> = dst_dirs.iter().map(|d| d.join(&name)).collect();

        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(e) => {
                errors.push(ErrorEntry::new(src_path, dst_paths, e.to_string()));
                continue;
            }
        };

        if file_type.is_dir() {
            let mut create_failed = false;
            for dst in &dst_paths {
                if let Err(e) = std::fs::create_dir_all(dst) {
                    errors.push(ErrorEntry::new(
                        src_path.clone(),
                        dst_paths.clone(),
                        format!("failed to create directory: {e}"),
                    ));
                    create_failed = true;
                    break;
                }
            }
            if create_failed {
                continue;
            }

            walk_dir(
                &src_path,
                &dst_paths,
                src_root,
                primary_dest_root,
                options,
                hooks,
                successes,
                errors,
            );

            for dst in &dst_paths {
                if let Err(e) = preserve_metadata(&src_path, dst) {
                    errors.push(ErrorEntry::new(
                        src_path.clone(),
                        vec![dst.clone()],
                        format!("failed to preserve directory metadata: {e}"),
                    ));
                }
            }
        } else if file_type.is_file() {
            let relative_path = src_path
                .strip_prefix(src_root)
                .unwrap_or(&src_path)
                .to_path_buf();

            match verified_copy(
                &src_path,
                &relative_path,
                &dst_paths,
                primary_dest_root,
                options,
                hooks,
            ) {
                Ok(hash) => {
                    if let Ok(meta) = std::fs::metadata(&src_path) {
                        let mtime = meta
                            .modified()
                            .ok()
                            .and_then(|m| m.duration_since(UNIX_EPOCH).ok())
                            .map(|d| d.as_secs_f64())
                            .unwrap_or(0.0);
                        successes.push(FileInfo {
                            source: src_path.clone(),
                            relative_path,
                            hash,
                            size: meta.len(),
                            mtime,
                        });
                    }
                }
                Err(e) => {
                    errors.push(ErrorEntry::new(src_path, dst_paths, e.to_string()));
                }
            }
        }
        // Symlinks and other special file types are out of scope: the tree
        // is mirrored as regular files and directories only.
    }
}
