/*!
 * FanoutCopier: one read of a source file, one spawned writer thread per
 * destination, identical chunks pushed to all, rolling xxhash64 over what
 * the reader actually sent.
 */

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::bounded;
use xxhash_rust::xxh64::Xxh64;

use super::metadata::preserve_metadata;
use super::progress::ProgressBus;
use crate::error::Result;

/// Number of chunks a writer's channel may buffer before the reader blocks
/// pushing to it. At the default 1 MiB chunk size this is 10 MiB of slack
/// per destination.
const WRITER_BUFFER_CHUNKS: usize = 10;

/// Copy `src` to every path in `dsts`, reading the source exactly once.
/// Returns the hex xxhash64 digest of the bytes actually transmitted to the
/// writers. Any writer's I/O error propagates out after every writer thread
/// has been joined (no thread is ever leaked).
pub fn copy(
    src: &Path,
    dsts: &[PathBuf],
    chunk_size: usize,
    progress: Option<&ProgressBus>,
    display_path: &str,
) -> Result<String> {
    let mut source = File::open(src)?;
    let mut hasher = Xxh64::new(0);

    thread::scope(|scope| -> Result<()> {
        let mut senders = Vec::with_capacity(dsts.len());
        let mut handles = Vec::with_capacity(dsts.len());

        for dst in dsts {
            let (tx, rx) = bounded::<Arc<[u8]>>(WRITER_BUFFER_CHUNKS);
            let dst = dst.clone();
            let handle = scope.spawn(move || -> Result<()> {
                let mut file = File::create(&dst)?;
                for chunk in rx {
                    file.write_all(&chunk)?;
                }
                file.flush()?;
                Ok(())
            });
            senders.push(tx);
            handles.push(handle);
        }

        let mut buffer = vec![0u8; chunk_size];
        loop {
            let n = source.read(&mut buffer)?;
            if n == 0 {
                break;
            }
            let chunk: Arc<[u8]> = Arc::from(&buffer[..n]);
            hasher.update(&chunk);
            if let Some(bus) = progress {
                bus.report(display_path, n as f64);
            }
            for tx in &senders {
                // A writer that has already failed drops its receiver; a
                // failed send here just means that writer's join below
                // surfaces the real error.
                let _ = tx.send(chunk.clone());
            }
        }

        // Dropping every sender closes each writer's channel, which is how
        // EOF is communicated instead of pushing a sentinel chunk.
        drop(senders);

        let mut first_err = None;
        for handle in handles {
            if let Err(e) = handle.join().expect("fanout writer thread panicked") {
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    })?;

    let source_hex = format!("{:016x}", hasher.digest());

    for dst in dsts {
        preserve_metadata(src, dst)?;
    }

    Ok(source_hex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn single_destination_degenerates_cleanly() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src.bin");
        std::fs::write(&src, b"hello fanout").unwrap();
        let dst = dir.path().join("dst.bin");

        let hex = copy(&src, &[dst.clone()], 4, None, "src.bin").unwrap();

        assert_eq!(std::fs::read(&dst).unwrap(), b"hello fanout");
        assert_eq!(hex.len(), 16);
    }

    #[test]
    fn eight_destinations_receive_identical_bytes() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src.bin");
        let payload: Vec<u8> = (0..5000).map(|i| (i % 251) as u8).collect();
        std::fs::write(&src, &payload).unwrap();

        let dsts: Vec<PathBuf> = (0..8).map(|i| dir.path().join(format!("dst{i}.bin"))).collect();
        let hex = copy(&src, &dsts, 777, None, "src.bin").unwrap();

        for dst in &dsts {
            assert_eq!(std::fs::read(dst).unwrap(), payload);
        }
        assert_eq!(hex, crate::core::checksum::hash_file(&src, None, "src.bin", 1).unwrap());
    }

    #[test]
    fn metadata_is_copied_after_writers_join() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src.bin");
        std::fs::write(&src, b"data").unwrap();
        let dst = dir.path().join("dst.bin");

        copy(&src, &[dst.clone()], 1024, None, "src.bin").unwrap();

        let src_meta = std::fs::metadata(&src).unwrap();
        let dst_meta = std::fs::metadata(&dst).unwrap();
        assert_eq!(src_meta.modified().unwrap(), dst_meta.modified().unwrap());
    }

    #[test]
    fn progress_reports_total_bytes_read() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src.bin");
        std::fs::write(&src, vec![0u8; 30]).unwrap();
        let dst = dir.path().join("dst.bin");

        let (bus, rx) = ProgressBus::new();
        copy(&src, &[dst], 10, Some(&bus), "src.bin").unwrap();
        drop(bus);

        let total: f64 = rx.iter().map(|(_, bytes)| bytes).sum();
        assert_eq!(total, 30.0);
    }
}
