/*!
 * Progress bus: conveys (display_path, bytes_increment) tuples from worker
 * threads to the job's aggregator, without coupling workers to any specific
 * sink or to the job's identity.
 */

use crossbeam_channel::{unbounded, Receiver, Sender};

/// Sentinel pushed by `CopyJob` to tell a simple consumer loop that no more
/// progress will arrive.
pub const FINISHED_SENTINEL: &str = "finished";

/// Multi-producer handle into the bus. Cheap to clone; every reader thread,
/// writer thread, and verification hasher holds its own clone.
#[derive(Clone)]
#[derive(Debug)]
pub struct ProgressBus {
    sender: Sender<(String, f64)>,
}

/// Single-consumer handle, owned by the job's progress-aggregator thread.
#[derive(Debug)]
pub struct ProgressReceiver {
    receiver: Receiver<(String, f64)>,
}

impl ProgressBus {
    /// Create a fresh bus and its receiver. The channel is unbounded: progress
    /// reporting must never be the thing that applies backpressure to a copy.
    pub fn new() -> (Self, ProgressReceiver) {
        let (sender, receiver) = unbounded();
        (Self { sender }, ProgressReceiver { receiver })
    }

    /// Report that `bytes` more bytes were processed for `display_path`.
    /// Best-effort: a closed receiver (job already finished) is not an error.
    pub fn report(&self, display_path: &str, bytes: f64) {
        let _ = self.sender.send((display_path.to_string(), bytes));
    }

    /// Signal end-of-stream to a simple consumer loop.
    pub fn finish(&self) {
        let _ = self.sender.send((FINISHED_SENTINEL.to_string(), -1.0));
    }
}

impl ProgressReceiver {
    pub fn recv(&self) -> Option<(String, f64)> {
        self.receiver.recv().ok()
    }

    pub fn try_recv(&self) -> Option<(String, f64)> {
        self.receiver.try_recv().ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = (String, f64)> + '_ {
        self.receiver.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_then_receive() {
        let (bus, rx) = ProgressBus::new();
        bus.report("a.mov", 1024.0);
        bus.report("a.mov", 2048.0);
        assert_eq!(rx.recv(), Some(("a.mov".to_string(), 1024.0)));
        assert_eq!(rx.recv(), Some(("a.mov".to_string(), 2048.0)));
    }

    #[test]
    fn finish_sends_sentinel() {
        let (bus, rx) = ProgressBus::new();
        bus.finish();
        let (path, bytes) = rx.recv().unwrap();
        assert_eq!(path, FINISHED_SENTINEL);
        assert_eq!(bytes, -1.0);
    }

    #[test]
    fn dropped_receiver_does_not_panic_sender() {
        let (bus, rx) = ProgressBus::new();
        drop(rx);
        bus.report("a.mov", 10.0);
    }

    #[test]
    fn clones_share_the_same_stream() {
        let (bus, rx) = ProgressBus::new();
        let bus2 = bus.clone();
        bus.report("a.mov", 1.0);
        bus2.report("b.mov", 2.0);
        let mut seen: Vec<_> = rx.iter().take(2).collect();
        seen.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(seen, vec![("a.mov".to_string(), 1.0), ("b.mov".to_string(), 2.0)]);
    }
}
