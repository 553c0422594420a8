/*!
 * ocopy - verified fan-out file copy utility
 *
 * Copies SOURCE to one or more DESTINATIONs, hashing the source once with
 * xxhash64 while writing every destination concurrently, then re-reads each
 * copy to confirm it matches before committing it in place. Writes an MHL
 * manifest and a flat xxHash.txt summary into every destination root.
 */

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use ocopy::{CopyJob, JobOptions, JobState};

mod cli_progress;

#[derive(Parser, Debug)]
#[command(name = "ocopy", version, about = "Verified fan-out file copy with MHL manifests")]
struct Cli {
    /// File or directory to copy.
    source: PathBuf,

    /// One or more destinations to mirror the source into.
    #[arg(required = true)]
    destination: Vec<PathBuf>,

    /// Overwrite a destination file that already exists.
    #[arg(long, overrides_with = "dont_overwrite")]
    overwrite: bool,

    /// Fail instead of overwriting an existing destination file (default).
    #[arg(long, overrides_with = "overwrite")]
    dont_overwrite: bool,

    /// Re-read and compare every copy against the source after writing (default).
    #[arg(long, overrides_with = "dont_verify")]
    verify: bool,

    /// Skip the post-copy verification re-hash.
    #[arg(long, overrides_with = "verify")]
    dont_verify: bool,

    /// Treat a destination with matching size and mtime as already copied (default).
    #[arg(long, overrides_with = "dont_skip_existing")]
    skip_existing: bool,

    /// Always (re)copy, even when a destination already matches.
    #[arg(long, overrides_with = "skip_existing")]
    dont_skip_existing: bool,

    /// Emit machine-readable integer percent-done lines instead of a progress bar.
    #[arg(long, overrides_with = "human_readable")]
    machine_readable: bool,

    /// Render an interactive progress bar (default).
    #[arg(long, overrides_with = "machine_readable")]
    human_readable: bool,

    /// Enable debug-level logging.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn job_options(&self) -> JobOptions {
        let defaults = JobOptions::default();
        JobOptions {
            overwrite: self.overwrite,
            verify: !self.dont_verify,
            skip_existing: !self.dont_skip_existing,
            machine_readable: self.machine_readable,
            ..defaults
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = ocopy::logging::init_logging(cli.verbose) {
        eprintln!("ocopy: failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let options = cli.job_options();
    let job = match CopyJob::new(cli.source.clone(), cli.destination.clone(), options) {
        Ok(job) => job,
        Err(e) => {
            eprintln!("ocopy: {e}");
            return ExitCode::FAILURE;
        }
    };

    job.start();

    if options.machine_readable {
        cli_progress::run_machine_readable(&job);
    } else {
        cli_progress::run_human_readable(&job);
    }

    while !job.is_finished() {
        std::thread::yield_now();
    }

    for err in job.errors() {
        eprintln!("ocopy: {err}");
    }

    match job.state() {
        JobState::FinishedOk => ExitCode::SUCCESS,
        JobState::Cancelled => ExitCode::from(130),
        JobState::FinishedWithErrors | JobState::Created | JobState::Running => {
            ExitCode::FAILURE
        }
    }
}
