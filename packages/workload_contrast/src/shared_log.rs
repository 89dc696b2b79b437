//! Interleaved writes from concurrent workers into one lock-protected log.

use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::info;

/// How long each shared-log worker pauses after an append, unless configured otherwise.
pub const DEFAULT_STEP_PAUSE: Duration = Duration::from_millis(100);

/// An ordered, append-only sequence of entries shared between threads.
///
/// Every operation takes the same lock, which is held only for the duration of that one
/// operation. Appends are therefore serialized and never overlap a read.
///
/// # Examples
///
/// ```
/// use workload_contrast::SharedLog;
///
/// let log = SharedLog::new();
/// log.append("first");
/// log.append("second");
///
/// assert_eq!(log.snapshot(), vec!["first", "second"]);
/// ```
#[derive(Debug, Default)]
pub struct SharedLog {
    entries: Mutex<Vec<String>>,
}

impl SharedLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one entry at the end of the log.
    pub fn append(&self, entry: impl Into<String>) {
        let entry = entry.into();
        self.entries.lock().push(entry);
    }

    /// The number of entries appended so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing has been appended yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// A copy of the current entries, in append order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Consumes the log, returning its entries in append order.
    #[must_use]
    pub fn into_entries(self) -> Vec<String> {
        self.entries.into_inner()
    }
}

/// The entry that worker `worker` appends at step `step` of [`run_workers()`].
#[must_use]
pub fn entry_label(worker: usize, step: usize) -> String {
    format!("worker{worker}-step{step}")
}

/// Spawns `worker_count` independent threads that each append `steps_per_worker` entries to
/// `log`, pausing for `pause` after every append.
///
/// Returns the wall-clock time from spawning the first worker until every worker has finished.
/// Afterwards `log` holds exactly `worker_count * steps_per_worker` more entries. Each worker's
/// own entries keep their step order; how entries of different workers interleave is up to the
/// scheduler.
///
/// # Panics
///
/// Panics if the operating system refuses to create a worker thread.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use workload_contrast::{SharedLog, run_workers};
///
/// let log = SharedLog::new();
/// run_workers(3, 5, &log, Duration::from_millis(1));
///
/// assert_eq!(log.len(), 15);
/// ```
pub fn run_workers(
    worker_count: usize,
    steps_per_worker: usize,
    log: &SharedLog,
    pause: Duration,
) -> Duration {
    let start = Instant::now();

    thread::scope(|scope| {
        for worker in 0..worker_count {
            thread::Builder::new()
                .name(format!("log-worker-{worker}"))
                .spawn_scoped(scope, move || {
                    for step in 0..steps_per_worker {
                        log.append(entry_label(worker, step));

                        // The pause happens with the log unlocked, so other workers get their turn.
                        thread::sleep(pause);
                    }
                })
                .expect("failed to spawn log worker: thread spawning failure is not supported");
        }
    });

    let elapsed = start.elapsed();

    info!(
        worker_count,
        steps_per_worker,
        entries = log.len(),
        ?elapsed,
        "shared log workers completed"
    );

    elapsed
}
