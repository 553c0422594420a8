/*!
 * CLI progress rendering: drains `CopyJob::next_progress_item` and renders
 * either a single-line indicatif progress bar or raw integer percent lines
 * for scripted/machine consumers.
 */

use indicatif::{ProgressBar, ProgressStyle};

use ocopy::CopyJob;

/// Render an interactive progress bar until the job finishes.
pub fn run_human_readable(job: &CopyJob) {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-"),
    );

    while let Some(item) = job.next_progress_item() {
        bar.set_position(job.percent_done() as u64);
        bar.set_message(format!("{item} ({:.0} B/s)", job.speed()));
    }

    bar.set_position(100);
    bar.finish_and_clear();
}

/// Emit one integer percent-done line per advancing percent point, for
/// scripted callers that parse stdout instead of watching a TTY.
pub fn run_machine_readable(job: &CopyJob) {
    while job.next_progress_item().is_some() {
        println!("{}", job.percent_done());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocopy::JobOptions;
    use tempfile::TempDir;

    #[test]
    fn machine_readable_drains_without_panicking() {
        let src = TempDir::new().unwrap();
        std::fs::write(src.path().join("a.bin"), vec![0u8; 512]).unwrap();
        let dst = TempDir::new().unwrap();

        let job = CopyJob::new(
            src.path().to_path_buf(),
            vec![dst.path().to_path_buf()],
            JobOptions::default(),
        )
        .unwrap();
        job.start();
        run_machine_readable(&job);

        assert!(job.is_finished());
        assert_eq!(job.percent_done(), 100);
    }
}
