//! Integration tests for the observable properties of the sequential and pooled strategies.
//!
//! Timing assertions use generous tolerance bands because they run on shared machines. The
//! I/O-bound checks rely on sleeping, which does not depend on how many processors are present.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use http::StatusCode;
use new_zealand::nz;
use testing::{assert_ratio_in, with_watchdog};
use workload_contrast::{
    ExecutionMode, FallbackIo, InterpreterLock, SharedLog, SimulatedRoundTrip, entry_label,
    io_round_trip, run_concurrent, run_sequential, run_workers, speedup, sum_of_squares,
    sum_of_squares_constrained,
};

#[test]
fn squares_example() {
    with_watchdog(|| {
        let square = |x: u64| x * x;

        let sequential = run_sequential(square, [1, 2, 3]);
        let concurrent = run_concurrent(square, [1, 2, 3], nz!(3));

        assert_eq!(sequential.mode(), ExecutionMode::Sequential);
        assert_eq!(concurrent.mode(), ExecutionMode::PooledConcurrent);
        assert_eq!(sequential.outputs(), &[1, 4, 9]);
        assert_eq!(concurrent.outputs(), &[1, 4, 9]);
    });
}

#[test]
fn strategies_agree_for_every_worker_count() {
    with_watchdog(|| {
        let args: Vec<u64> = (0..17).map(|i| i * 1_000).collect();

        let sequential = run_sequential(sum_of_squares, args.clone());

        for worker_count in [nz!(1), nz!(2), nz!(3), nz!(8), nz!(32)] {
            let concurrent = run_concurrent(sum_of_squares, args.clone(), worker_count);

            assert_eq!(
                sequential.outputs(),
                concurrent.outputs(),
                "outputs differ with {worker_count} workers"
            );
        }
    });
}

#[test]
fn cpu_bound_under_interpreter_lock_gains_nothing_from_pool() {
    with_watchdog(|| {
        let lock = Arc::new(InterpreterLock::new());

        let task = {
            let lock = Arc::clone(&lock);
            move |n: u64| sum_of_squares_constrained(n, &lock)
        };

        let args = [1_000_000_u64; 4];

        let sequential = run_sequential(task.clone(), args);
        let concurrent = run_concurrent(task, args, nz!(4));

        assert_eq!(sequential.outputs(), concurrent.outputs());
        assert!(
            sequential
                .outputs()
                .iter()
                .all(|&output| output == sum_of_squares(1_000_000))
        );

        // Only one worker computes at a time, so the pool cannot be meaningfully faster.
        let ratio = speedup(&sequential, &concurrent);
        assert!(ratio <= 1.5, "CPU-bound speedup under the lock was {ratio:.2}");
    });
}

#[test]
fn io_bound_overlaps_waits() {
    with_watchdog(|| {
        let wait = |_: usize| {
            thread::sleep(Duration::from_millis(200));
            StatusCode::OK
        };

        let sequential = run_sequential(wait, 0..3);
        let concurrent = run_concurrent(wait, 0..3, nz!(3));

        assert_eq!(sequential.outputs(), concurrent.outputs());
        assert_ratio_in(speedup(&sequential, &concurrent), 2.0..=3.3);
    });
}

#[test]
fn io_bound_overlaps_waits_under_interpreter_lock() {
    with_watchdog(|| {
        let lock = Arc::new(InterpreterLock::new());
        let io = Arc::new(FallbackIo::new(SimulatedRoundTrip::new(
            Duration::from_millis(200),
        )));

        let task = {
            let io = Arc::clone(&io);
            move |_: usize| io_round_trip(&io, &lock)
        };

        let sequential = run_sequential(task.clone(), 0..3);
        let concurrent = run_concurrent(task, 0..3, nz!(3));

        assert_eq!(concurrent.outputs(), &[StatusCode::OK; 3]);
        assert_eq!(io.fallback_count(), 0);

        // Waiting releases the lock, so the three round trips overlap.
        assert_ratio_in(speedup(&sequential, &concurrent), 2.0..=3.3);
    });
}

#[test]
fn single_worker_pool_is_no_faster_for_io() {
    with_watchdog(|| {
        let wait = |_: usize| thread::sleep(Duration::from_millis(50));

        let sequential = run_sequential(wait, 0..3);
        let concurrent = run_concurrent(wait, 0..3, nz!(1));

        let ratio = speedup(&sequential, &concurrent);
        assert!(ratio <= 1.3, "one worker cannot overlap anything, got {ratio:.2}");
    });
}

#[test]
fn shared_log_collects_every_entry() {
    with_watchdog(|| {
        let log = SharedLog::new();

        run_workers(3, 5, &log, Duration::from_millis(5));

        let mut entries = log.into_entries();
        assert_eq!(entries.len(), 15);

        entries.sort();
        let mut expected: Vec<String> = (0..3)
            .flat_map(|worker| (0..5).map(move |step| entry_label(worker, step)))
            .collect();
        expected.sort();

        assert_eq!(entries, expected);
    });
}
