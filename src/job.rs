/*!
 * CopyJob: the top-level orchestrator. Owns a job's lifecycle state machine,
 * spawns the worker thread that drives the tree walk and writes manifests,
 * and exposes the polling surface a CLI or embedder drives the UI from.
 */

use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use chrono::Utc;

use crate::config::{JobOptions, IGNORED_BASENAMES};
use crate::core::manifest;
use crate::core::progress::{ProgressBus, ProgressReceiver, FINISHED_SENTINEL};
use crate::core::walker;
use crate::core::JobHooks;
use crate::error::{CopyError, ErrorEntry, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Created,
    Running,
    FinishedOk,
    FinishedWithErrors,
    Cancelled,
}

#[derive(Debug)]
struct ProgressState {
    total_done: f64,
    current_item: String,
    finished: bool,
    last_percent_yielded: u32,
}

#[derive(Debug)]
struct SharedProgress {
    state: Mutex<ProgressState>,
    cvar: Condvar,
}

impl SharedProgress {
    fn new() -> Self {
        Self {
            state: Mutex::new(ProgressState {
                total_done: 0.0,
                current_item: String::new(),
                finished: false,
                last_percent_yielded: 0,
            }),
            cvar: Condvar::new(),
        }
    }
}

fn tree_size(path: &std::path::Path) -> Result<u64> {
    let metadata = std::fs::metadata(path)?;
    if metadata.is_file() {
        return Ok(metadata.len());
    }

    let mut total = 0u64;
    let mut stack = vec![path.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if IGNORED_BASENAMES
                .iter()
                .any(|ignored| name.to_string_lossy() == *ignored)
            {
                continue;
            }
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                stack.push(entry.path());
            } else if file_type.is_file() {
                total += entry.metadata()?.len();
            }
        }
    }
    Ok(total)
}

/// A single source-to-many-destinations verified copy, from construction
/// through manifest writing. Cheap to poll from any thread; `start()` hands
/// the actual work off to a background worker.
#[derive(Debug)]
pub struct CopyJob {
    source: PathBuf,
    destinations: Vec<PathBuf>,
    options: JobOptions,
    total_size: u64,
    hooks: Arc<JobHooks>,
    progress_receiver: Mutex<Option<ProgressReceiver>>,
    progress: Arc<SharedProgress>,
    state: Arc<Mutex<JobState>>,
    errors: Arc<Mutex<Vec<ErrorEntry>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    started_at: Mutex<Option<Instant>>,
}

impl CopyJob {
    pub fn new(source: PathBuf, destinations: Vec<PathBuf>, options: JobOptions) -> Result<Self> {
        if !source.exists() {
            return Err(CopyError::SourceNotFound(source));
        }
        if destinations.is_empty() {
            return Err(CopyError::Config(
                "at least one destination is required".to_string(),
            ));
        }

        let total_size = tree_size(&source)?;
        let (bus, receiver) = ProgressBus::new();

        Ok(Self {
            source,
            destinations,
            options,
            total_size,
            hooks: Arc::new(JobHooks::new(Some(bus))),
            progress_receiver: Mutex::new(Some(receiver)),
            progress: Arc::new(SharedProgress::new()),
            state: Arc::new(Mutex::new(JobState::Created)),
            errors: Arc::new(Mutex::new(Vec::new())),
            handle: Mutex::new(None),
            started_at: Mutex::new(None),
        })
    }

    /// Idempotent: a second call on an already-started job is a no-op.
    pub fn start(&self) {
        {
            let mut state = self.state.lock().unwrap();
            if *state != JobState::Created {
                return;
            }
            *state = JobState::Running;
        }
        *self.started_at.lock().unwrap() = Some(Instant::now());

        let receiver = self
            .progress_receiver
            .lock()
            .unwrap()
            .take()
            .expect("start() called more than once past the Created guard");

        let progress = Arc::clone(&self.progress);
        thread::spawn(move || {
            for (item, bytes) in receiver.iter() {
                if item == FINISHED_SENTINEL {
                    break;
                }
                let mut state = progress.state.lock().unwrap();
                state.total_done += bytes;
                state.current_item = item;
                drop(state);
                progress.cvar.notify_all();
            }
        });

        let source = self.source.clone();
        let destinations = self.destinations.clone();
        let options = self.options;
        let hooks = Arc::clone(&self.hooks);
        let state_handle = Arc::clone(&self.state);
        let errors_handle = Arc::clone(&self.errors);
        let progress_handle = Arc::clone(&self.progress);
        let todo_size = self.todo_size();

        let worker = thread::spawn(move || {
            let started_at = Utc::now();
            let (successes, mut errors) = walker::walk(&source, &destinations, &options, &hooks);
            let finished_at = Utc::now();

            for dst in &destinations {
                if let Err(e) = manifest::write_mhl(dst, &successes, started_at, finished_at) {
                    errors.push(ErrorEntry::new(dst.clone(), vec![], e.to_string()));
                }
                if let Err(e) = manifest::write_xxhash_summary(dst, &successes) {
                    errors.push(ErrorEntry::new(dst.clone(), vec![], e.to_string()));
                }
            }

            *errors_handle.lock().unwrap() = errors.clone();

            if let Some(bus) = hooks.progress() {
                bus.finish();
            }

            let final_state = if hooks.is_cancelled() {
                JobState::Cancelled
            } else if errors.is_empty() {
                JobState::FinishedOk
            } else {
                JobState::FinishedWithErrors
            };
            *state_handle.lock().unwrap() = final_state;

            let mut p = progress_handle.state.lock().unwrap();
            p.total_done = todo_size as f64;
            p.finished = true;
            drop(p);
            progress_handle.cvar.notify_all();
        });

        *self.handle.lock().unwrap() = Some(worker);
    }

    pub fn cancel(&self) {
        self.hooks.cancel();
    }

    pub fn state(&self) -> JobState {
        *self.state.lock().unwrap()
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self.state(),
            JobState::FinishedOk | JobState::FinishedWithErrors | JobState::Cancelled
        )
    }

    pub fn errors(&self) -> Vec<ErrorEntry> {
        self.errors.lock().unwrap().clone()
    }

    pub fn skipped_files(&self) -> u64 {
        self.hooks.skipped_files()
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn todo_size(&self) -> u64 {
        self.total_size * if self.options.verify { 2 } else { 1 }
    }

    pub fn total_done(&self) -> f64 {
        self.progress.state.lock().unwrap().total_done
    }

    pub fn percent_done(&self) -> u32 {
        let todo = self.todo_size();
        if todo == 0 {
            return 100;
        }
        let done = self.progress.state.lock().unwrap().total_done;
        ((100.0 * done / todo as f64).round() as u32).min(100)
    }

    /// Blocks until `percent_done` advances to the next integer percent
    /// point, returning the display name of the item in flight at that
    /// moment. Yields exactly 100 items across a job's full lifetime, then
    /// returns `None` forever.
    pub fn next_progress_item(&self) -> Option<String> {
        let todo = self.todo_size() as f64;
        let mut state = self.progress.state.lock().unwrap();
        loop {
            let percent = if todo == 0.0 {
                100
            } else {
                ((100.0 * state.total_done / todo).round() as u32).min(100)
            };

            if percent > state.last_percent_yielded && state.last_percent_yielded < 100 {
                state.last_percent_yielded += 1;
                return Some(state.current_item.clone());
            }

            if state.finished {
                return None;
            }

            state = self.progress.cvar.wait(state).unwrap();
        }
    }

    /// Bytes per second measured since `start()` was called.
    pub fn speed(&self) -> f64 {
        let started = self.started_at.lock().unwrap();
        match *started {
            Some(t) => {
                let elapsed = t.elapsed().as_secs_f64();
                if elapsed > 0.0 {
                    self.total_done() / elapsed
                } else {
                    0.0
                }
            }
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn wait_until_finished(job: &CopyJob) {
        while !job.is_finished() {
            thread::yield_now();
        }
    }

    #[test]
    fn completes_and_writes_manifests_to_every_destination() {
        let src = TempDir::new().unwrap();
        std::fs::write(src.path().join("a.mov"), b"aaaa").unwrap();
        std::fs::write(src.path().join("b.mov"), b"bb").unwrap();

        let d1 = TempDir::new().unwrap();
        let d2 = TempDir::new().unwrap();
        let job = CopyJob::new(
            src.path().to_path_buf(),
            vec![d1.path().to_path_buf(), d2.path().to_path_buf()],
            JobOptions::default(),
        )
        .unwrap();

        assert_eq!(job.total_size(), 6);
        job.start();
        wait_until_finished(&job);

        assert_eq!(job.state(), JobState::FinishedOk);
        assert!(job.errors().is_empty());
        for d in [&d1, &d2] {
            assert!(d.path().join("a.mov").exists());
            assert!(d.path().join("b.mov").exists());
            assert!(manifest::find_existing_mhl(d.path()).is_some());
            assert!(d.path().join("xxHash.txt").exists());
        }
    }

    #[test]
    fn cancel_before_start_copies_nothing() {
        let src = TempDir::new().unwrap();
        for i in 0..10 {
            std::fs::write(src.path().join(format!("f{i}.bin")), vec![0u8; 1024]).unwrap();
        }
        let dst = TempDir::new().unwrap();
        let job = CopyJob::new(
            src.path().to_path_buf(),
            vec![dst.path().to_path_buf()],
            JobOptions::default(),
        )
        .unwrap();

        job.cancel();
        job.start();
        wait_until_finished(&job);

        assert_eq!(job.state(), JobState::Cancelled);
        for i in 0..10 {
            assert!(!dst.path().join(format!("f{i}.bin")).exists());
        }
    }

    #[test]
    fn next_progress_item_yields_exactly_one_hundred_times() {
        let src = TempDir::new().unwrap();
        std::fs::write(src.path().join("a.bin"), vec![0u8; 4096]).unwrap();
        let dst = TempDir::new().unwrap();
        let job = CopyJob::new(
            src.path().to_path_buf(),
            vec![dst.path().to_path_buf()],
            JobOptions::default(),
        )
        .unwrap();

        job.start();
        let mut count = 0;
        while job.next_progress_item().is_some() {
            count += 1;
        }
        assert_eq!(count, 100);
        assert_eq!(job.percent_done(), 100);
    }

    #[test]
    fn new_rejects_missing_source() {
        let missing = PathBuf::from("/definitely/not/here/ocopy-test");
        let err = CopyJob::new(missing, vec![PathBuf::from("/tmp")], JobOptions::default())
            .unwrap_err();
        assert!(matches!(err, CopyError::SourceNotFound(_)));
    }

    #[test]
    fn new_rejects_empty_destinations() {
        let src = TempDir::new().unwrap();
        let err = CopyJob::new(src.path().to_path_buf(), vec![], JobOptions::default()).unwrap_err();
        assert!(matches!(err, CopyError::Config(_)));
    }
}
