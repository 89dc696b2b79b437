//! Times the same workload under sequential and pooled execution.

use std::num::NonZero;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::info;

use crate::{ExecutionMode, JobHandle, WorkerPool, WorkloadResult};

/// Durations shorter than this are below what the clock can meaningfully resolve and are
/// treated as exactly this long when computing a [`speedup()`].
pub const MIN_ELAPSED: Duration = Duration::from_micros(1);

/// Invokes `task` once per element of `args`, strictly in order, on the calling thread.
///
/// The elapsed time spans from the start of the first invocation to the completion of the last.
/// Collecting `args` into memory happens before the clock starts.
///
/// # Examples
///
/// ```
/// use workload_contrast::run_sequential;
///
/// let result = run_sequential(|x: u64| x * x, [1, 2, 3]);
///
/// assert_eq!(result.into_outputs(), vec![1, 4, 9]);
/// ```
pub fn run_sequential<A, R, F, I>(task: F, args: I) -> WorkloadResult<R>
where
    F: Fn(A) -> R,
    I: IntoIterator<Item = A>,
{
    let args: Vec<A> = args.into_iter().collect();
    let task_count = args.len();

    let start = Instant::now();
    let outputs: Vec<R> = args.into_iter().map(task).collect();
    let elapsed = start.elapsed();

    info!(mode = %ExecutionMode::Sequential, task_count, ?elapsed, "workload completed");

    WorkloadResult::new(ExecutionMode::Sequential, elapsed, outputs)
}

/// Submits one invocation of `task` per element of `args` to a new [`WorkerPool`] of
/// `worker_count` threads and collects the results in submission order.
///
/// The elapsed time spans from pool creation until every result has been collected. Shutting the
/// pool down afterwards is not measured.
///
/// # Panics
///
/// If any invocation panics, the panic is re-thrown on the calling thread once the results are
/// collected up to that invocation.
///
/// # Examples
///
/// ```
/// use new_zealand::nz;
/// use workload_contrast::run_concurrent;
///
/// let result = run_concurrent(|x: u64| x * x, [1, 2, 3], nz!(3));
///
/// // Submission order, not completion order.
/// assert_eq!(result.into_outputs(), vec![1, 4, 9]);
/// ```
pub fn run_concurrent<A, R, F, I>(
    task: F,
    args: I,
    worker_count: NonZero<usize>,
) -> WorkloadResult<R>
where
    F: Fn(A) -> R + Send + Sync + 'static,
    A: Send + 'static,
    R: Send + 'static,
    I: IntoIterator<Item = A>,
{
    let args: Vec<A> = args.into_iter().collect();

    let start = Instant::now();
    let pool = WorkerPool::new(worker_count);
    let outputs = submit_and_collect(&pool, task, args);
    let elapsed = start.elapsed();

    drop(pool);

    info!(
        mode = %ExecutionMode::PooledConcurrent,
        task_count = outputs.len(),
        worker_count = worker_count.get(),
        ?elapsed,
        "workload completed"
    );

    WorkloadResult::new(ExecutionMode::PooledConcurrent, elapsed, outputs)
}

/// Same as [`run_concurrent()`] but reuses an existing pool, so pool creation is not measured.
///
/// This is useful when timing many short workloads, where thread startup would otherwise
/// dominate the measurement.
pub fn run_concurrent_on<A, R, F, I>(pool: &WorkerPool, task: F, args: I) -> WorkloadResult<R>
where
    F: Fn(A) -> R + Send + Sync + 'static,
    A: Send + 'static,
    R: Send + 'static,
    I: IntoIterator<Item = A>,
{
    let args: Vec<A> = args.into_iter().collect();

    let start = Instant::now();
    let outputs = submit_and_collect(pool, task, args);
    let elapsed = start.elapsed();

    WorkloadResult::new(ExecutionMode::PooledConcurrent, elapsed, outputs)
}

fn submit_and_collect<A, R, F>(pool: &WorkerPool, task: F, args: Vec<A>) -> Vec<R>
where
    F: Fn(A) -> R + Send + Sync + 'static,
    A: Send + 'static,
    R: Send + 'static,
{
    let task = Arc::new(task);

    let handles: Vec<JobHandle<R>> = args
        .into_iter()
        .map(|arg| {
            let task = Arc::clone(&task);
            pool.submit(move || (*task)(arg))
        })
        .collect();

    // Waiting in submission order is what makes the outputs line up with the inputs.
    handles.into_iter().map(JobHandle::wait).collect()
}

/// Returns how many times faster `candidate` was than `baseline`, i.e.
/// `baseline.elapsed() / candidate.elapsed()`.
///
/// Elapsed times below [`MIN_ELAPSED`] are treated as [`MIN_ELAPSED`], so the result is always
/// finite and positive, even when a workload finished faster than the clock can measure.
///
/// # Examples
///
/// ```
/// use std::thread;
/// use std::time::Duration;
///
/// use new_zealand::nz;
/// use workload_contrast::{run_concurrent, run_sequential, speedup};
///
/// let wait = |_: u32| thread::sleep(Duration::from_millis(20));
///
/// let sequential = run_sequential(wait, 0..3);
/// let concurrent = run_concurrent(wait, 0..3, nz!(3));
///
/// // Sleeping does not occupy a processor, so the pool overlaps the waits.
/// assert!(speedup(&sequential, &concurrent) > 1.5);
/// ```
#[must_use]
pub fn speedup<A, B>(baseline: &WorkloadResult<A>, candidate: &WorkloadResult<B>) -> f64 {
    let baseline_elapsed = baseline.elapsed().max(MIN_ELAPSED);
    let candidate_elapsed = candidate.elapsed().max(MIN_ELAPSED);

    baseline_elapsed.div_duration_f64(candidate_elapsed)
}
