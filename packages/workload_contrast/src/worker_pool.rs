//! Fixed-size worker pool with submission-order result collection.

use std::any::{Any, type_name};
use std::fmt;
use std::num::NonZero;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, mpsc};
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tracing::{debug, trace};

/// A fixed-size set of worker threads servicing one shared job queue.
///
/// Each worker takes one queued job at a time and runs it to completion before taking the next.
/// Jobs are dequeued in submission order, although with more than one worker they may complete
/// in any order. Every [`submit()`][Self::submit] returns a [`JobHandle`], so callers that wait
/// on their handles in submission order also collect results in submission order.
///
/// # Examples
///
/// ```
/// use new_zealand::nz;
/// use workload_contrast::WorkerPool;
///
/// let pool = WorkerPool::new(nz!(2));
///
/// let first = pool.submit(|| 6 * 7);
/// let second = pool.submit(|| "done");
///
/// assert_eq!(first.wait(), 42);
/// assert_eq!(second.wait(), "done");
/// ```
///
/// # Lifecycle
///
/// Dropping the pool lets the workers finish every job that was already queued, then waits for
/// all worker threads to exit.
pub struct WorkerPool {
    command_tx: mpsc::Sender<Command>,
    join_handles: Vec<JoinHandle<()>>,
    worker_count: NonZero<usize>,
}

impl WorkerPool {
    /// Creates a pool with `worker_count` worker threads.
    ///
    /// The threads are started immediately and wait for jobs.
    ///
    /// # Panics
    ///
    /// Panics if the operating system refuses to create a worker thread.
    #[must_use]
    pub fn new(worker_count: NonZero<usize>) -> Self {
        let (command_tx, command_rx) = mpsc::channel();
        let command_rx = Arc::new(Mutex::new(command_rx));

        let join_handles = (0..worker_count.get())
            .map(|worker_index| {
                let command_rx = Arc::clone(&command_rx);

                thread::Builder::new()
                    .name(format!("pool-worker-{worker_index}"))
                    .spawn(move || {
                        debug!(worker_index, "worker thread started");
                        worker_entrypoint(&command_rx, worker_index);
                        debug!(worker_index, "worker thread exiting");
                    })
                    .expect("failed to spawn worker thread: thread spawning failure is not supported")
            })
            .collect();

        Self {
            command_tx,
            join_handles,
            worker_count,
        }
    }

    /// Returns the number of worker threads in the pool.
    #[must_use]
    pub fn worker_count(&self) -> NonZero<usize> {
        self.worker_count
    }

    /// Queues a job for execution by the next available worker.
    ///
    /// If the job panics, the panic is captured on the worker thread and re-thrown when the
    /// returned [`JobHandle`] is waited on. The worker itself keeps servicing the queue.
    pub fn submit<R, J>(&self, job: J) -> JobHandle<R>
    where
        J: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Execute(Box::new(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(job));

                if let Err(payload) = &result {
                    debug!(
                        panic_message = %panic_message(payload.as_ref()),
                        "job panicked, re-throwing on the waiting thread"
                    );
                }

                // Nobody is interested in the result if the handle was dropped without waiting.
                drop(result_tx.send(result));
            })))
            .expect("worker threads only exit after the pool is dropped, so the queue must be open");

        JobHandle { result_rx }
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("worker_count", &self.worker_count)
            .finish_non_exhaustive()
    }
}

impl Drop for WorkerPool {
    #[cfg_attr(test, mutants::skip)] // Impractical to test that stuff stops happening.
    fn drop(&mut self) {
        if thread::panicking() {
            // If the thread is panicking, we are probably in a dirty state and shutting down
            // may make the problem worse by hiding the original panic. The workers exit on their
            // own once the queue sender is dropped.
            return;
        }

        // The queue is FIFO, so every job submitted before this point still gets executed.
        for _ in 0..self.worker_count.get() {
            // A failed send means every worker is already gone, which join() reports below.
            drop(self.command_tx.send(Command::Shutdown));
        }

        for handle in self.join_handles.drain(..) {
            if let Err(payload) = handle.join() {
                // Jobs run inside a panic trap, so a worker panic means the pool itself is broken.
                panic::resume_unwind(payload);
            }
        }
    }
}

type JobResult<R> = thread::Result<R>;

/// A handle to a job submitted to a [`WorkerPool`].
///
/// Dropping the handle without waiting does not cancel the job; its result is discarded.
pub struct JobHandle<R> {
    result_rx: oneshot::Receiver<JobResult<R>>,
}

impl<R> JobHandle<R> {
    /// Blocks until the job has run, returning its result.
    ///
    /// # Panics
    ///
    /// Re-throws the panic if the job panicked.
    pub fn wait(self) -> R {
        match self.result_rx.recv() {
            Ok(Ok(value)) => value,
            Ok(Err(panic_payload)) => panic::resume_unwind(panic_payload),
            Err(_disconnected) => {
                panic!("job was abandoned because its worker pool shut down while panicking")
            }
        }
    }
}

impl<R> fmt::Debug for JobHandle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>()).finish_non_exhaustive()
    }
}

enum Command {
    Execute(Box<dyn FnOnce() + Send>),
    Shutdown,
}

#[cfg_attr(test, mutants::skip)] // Impractical to test that things do not happen when worker function is missing.
fn worker_entrypoint(command_rx: &Mutex<mpsc::Receiver<Command>>, worker_index: usize) {
    loop {
        // The lock guard is a temporary, so it is released before the job runs
        // and other workers can dequeue while this one is busy.
        let command = command_rx.lock().recv();

        match command {
            Ok(Command::Execute(job)) => {
                job();
                trace!(worker_index, "executed job");
            }
            Ok(Command::Shutdown) | Err(mpsc::RecvError) => break,
        }
    }
}

/// Extracts a printable message from a captured panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{self, AtomicUsize};
    use std::time::Duration;

    use new_zealand::nz;
    use static_assertions::assert_impl_all;
    use testing::with_watchdog;

    use super::*;

    assert_impl_all!(WorkerPool: Send, Sync);
    assert_impl_all!(JobHandle<u64>: Send);

    #[test]
    fn worker_count_matches_request() {
        let pool = WorkerPool::new(nz!(3));

        assert_eq!(pool.worker_count().get(), 3);
    }

    #[test]
    fn results_follow_submission_order() {
        with_watchdog(|| {
            let pool = WorkerPool::new(nz!(4));

            // Earlier jobs sleep longer, so they complete last.
            let handles: Vec<_> = (0..4_u64)
                .map(|index| {
                    pool.submit(move || {
                        thread::sleep(Duration::from_millis(40 - index * 10));
                        index
                    })
                })
                .collect();

            let results: Vec<_> = handles.into_iter().map(JobHandle::wait).collect();

            assert_eq!(results, vec![0, 1, 2, 3]);
        });
    }

    #[test]
    fn single_worker_runs_jobs_one_at_a_time() {
        with_watchdog(|| {
            let pool = WorkerPool::new(nz!(1));
            let active = Arc::new(AtomicUsize::new(0));
            let max_active = Arc::new(AtomicUsize::new(0));

            let handles: Vec<_> = (0..5)
                .map(|_| {
                    let active = Arc::clone(&active);
                    let max_active = Arc::clone(&max_active);

                    pool.submit(move || {
                        let now_active = active.fetch_add(1, atomic::Ordering::SeqCst) + 1;
                        max_active.fetch_max(now_active, atomic::Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(5));
                        active.fetch_sub(1, atomic::Ordering::SeqCst);
                    })
                })
                .collect();

            for handle in handles {
                handle.wait();
            }

            assert_eq!(max_active.load(atomic::Ordering::SeqCst), 1);
        });
    }

    #[test]
    fn drop_finishes_queued_jobs() {
        with_watchdog(|| {
            let counter = Arc::new(AtomicUsize::new(0));

            {
                let pool = WorkerPool::new(nz!(2));

                for _ in 0..10 {
                    let counter = Arc::clone(&counter);

                    // Handles are dropped immediately; the jobs must still run.
                    drop(pool.submit(move || {
                        thread::sleep(Duration::from_millis(2));
                        counter.fetch_add(1, atomic::Ordering::SeqCst);
                    }));
                }
            }

            assert_eq!(counter.load(atomic::Ordering::SeqCst), 10);
        });
    }

    #[test]
    #[should_panic]
    fn wait_rethrows_job_panic() {
        let pool = WorkerPool::new(nz!(1));

        let handle = pool.submit(|| -> u32 { panic!("intentional panic") });
        _ = handle.wait();
    }

    #[test]
    fn worker_survives_job_panic() {
        with_watchdog(|| {
            let pool = WorkerPool::new(nz!(1));

            let failing = pool.submit(|| -> u32 { panic!("intentional panic") });
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| failing.wait()));

            let payload = outcome.expect_err("job panicked, so wait() must panic");
            assert_eq!(panic_message(payload.as_ref()), "intentional panic");

            // The same single worker must still be alive to service this.
            assert_eq!(pool.submit(|| 5).wait(), 5);
        });
    }

    #[test]
    fn panic_message_handles_owned_strings() {
        let payload: Box<dyn Any + Send> = Box::new(format!("failed at step {}", 3));

        assert_eq!(panic_message(payload.as_ref()), "failed at step 3");
    }

    #[test]
    fn panic_message_handles_unknown_payloads() {
        let payload: Box<dyn Any + Send> = Box::new(42_u8);

        assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
    }
}
