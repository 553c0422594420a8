/*!
 * Streaming xxhash64 checksum calculation and parallel whole-file re-hash.
 *
 * xxhash64 is not a security hash: it was chosen by the upstream MHL manifest
 * format (the `xxhash64be` element) for its throughput on large media files.
 */

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::thread;

use xxhash_rust::xxh64::Xxh64;

use super::progress::ProgressBus;
use crate::error::Result;

/// Chunk size used by both the fan-out copy and every hasher in this crate.
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Sentinel returned by [`multi_hash`] when not all inputs hashed to the same digest.
pub const MISMATCH: &str = "hashes_do_not_match";

/// Seed used for every xxh64 invocation. Fixed at zero so hashes are
/// reproducible and comparable with the MHL files this tool writes.
const SEED: u64 = 0;

/// Hash `path` in [`CHUNK_SIZE`] chunks, returning the lowercase 16-hex-char
/// digest. If `progress` is set, reports `chunk_len / divisor` bytes after
/// each chunk under `display_path`.
///
/// `divisor` lets a caller re-reading N+1 files that cover the same logical
/// source bytes contribute proportionally to a single progress budget.
pub fn hash_file(
    path: &Path,
    progress: Option<&ProgressBus>,
    display_path: &str,
    divisor: u64,
) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Xxh64::new(SEED);
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let divisor = divisor.max(1);

    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
        if let Some(bus) = progress {
            bus.report(display_path, n as f64 / divisor as f64);
        }
    }

    Ok(format!("{:016x}", hasher.digest()))
}

/// Hash every path in `paths` concurrently, one OS thread per path, and
/// return the shared digest if they all agree, else [`MISMATCH`]. Uses
/// `divisor = paths.len()` so the combined progress contribution equals a
/// single pass over the logical file size.
pub fn multi_hash(paths: &[std::path::PathBuf], progress: Option<&ProgressBus>) -> Result<String> {
    let divisor = paths.len() as u64;

    let digests: Result<Vec<String>> = thread::scope(|scope| {
        let handles: Vec<_> = paths
            .iter()
            .map(|path| {
                let display_path = path.display().to_string();
                scope.spawn(move || hash_file(path, progress, &display_path, divisor))
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("hasher thread panicked"))
            .collect()
    });

    let digests = digests?;
    let unique: HashSet<&String> = digests.iter().collect();

    if unique.len() == 1 {
        Ok(digests.into_iter().next().unwrap())
    } else {
        Ok(MISMATCH.to_string())
    }
}
