/*!
 * Core copy engine: the hasher, the progress bus, the fan-out writer, the
 * per-file verified copier, and the tree walker that ties them together.
 */

pub mod checksum;
pub mod fanout;
pub mod manifest;
pub mod metadata;
pub mod progress;
pub mod types;
pub mod user_info;
pub mod verified_copy;
pub mod walker;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use progress::ProgressBus;

/// Explicit context threaded through the walker and the verified copier:
/// the progress bus to report into, the cooperative cancellation flag, and
/// the running count of fully-skipped files. Passed by reference rather than
/// read off a thread-local, so a caller can see exactly what state a copy
/// operation touches.
#[derive(Debug)]
pub struct JobHooks {
    progress: Option<ProgressBus>,
    skipped_files: AtomicU64,
    cancelled: AtomicBool,
}

impl JobHooks {
    pub fn new(progress: Option<ProgressBus>) -> Self {
        Self {
            progress,
            skipped_files: AtomicU64::new(0),
            cancelled: AtomicBool::new(false),
        }
    }

    pub fn progress(&self) -> Option<&ProgressBus> {
        self.progress.as_ref()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn record_skip(&self) {
        self.skipped_files.fetch_add(1, Ordering::Relaxed);
    }

    pub fn skipped_files(&self) -> u64 {
        self.skipped_files.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_uncancelled_with_zero_skips() {
        let hooks = JobHooks::new(None);
        assert!(!hooks.is_cancelled());
        assert_eq!(hooks.skipped_files(), 0);
    }

    #[test]
    fn cancel_is_observable_and_sticky() {
        let hooks = JobHooks::new(None);
        hooks.cancel();
        assert!(hooks.is_cancelled());
        hooks.cancel();
        assert!(hooks.is_cancelled());
    }

    #[test]
    fn record_skip_accumulates() {
        let hooks = JobHooks::new(None);
        hooks.record_skip();
        hooks.record_skip();
        hooks.record_skip();
        assert_eq!(hooks.skipped_files(), 3);
    }
}
