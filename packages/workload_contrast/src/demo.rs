//! Runs the three demonstration sections top to bottom and reports the measurements.

use std::io::Write;
use std::iter;
use std::sync::Arc;
use std::time::Duration;

use http::StatusCode;
use tracing::debug;

use crate::{
    BlockingIo, DemoConfig, FallbackIo, InterpreterLock, Result, SharedLog, SimulatedRoundTrip,
    WorkloadResult, io_round_trip, run_concurrent, run_sequential, run_workers, speedup,
    sum_of_squares_constrained,
};

/// Everything measured by one [`run_demo()`].
#[derive(Debug)]
#[non_exhaustive]
pub struct DemoReport {
    /// CPU-bound tasks executed one after another.
    pub cpu_sequential: WorkloadResult<u128>,

    /// CPU-bound tasks executed on a worker pool.
    pub cpu_concurrent: WorkloadResult<u128>,

    /// I/O-bound tasks executed one after another.
    pub io_sequential: WorkloadResult<StatusCode>,

    /// I/O-bound tasks executed on a worker pool.
    pub io_concurrent: WorkloadResult<StatusCode>,

    /// How many I/O calls failed and were replaced by a fixed wait.
    pub io_fallbacks: u64,

    /// Wall-clock time of the shared-log demonstration.
    pub log_elapsed: Duration,

    /// The shared log after every worker finished, in append order.
    pub log_entries: Vec<String>,
}

impl DemoReport {
    /// How many times faster the pooled CPU-bound run was than the sequential one.
    #[must_use]
    pub fn cpu_speedup(&self) -> f64 {
        speedup(&self.cpu_sequential, &self.cpu_concurrent)
    }

    /// How many times faster the pooled I/O-bound run was than the sequential one.
    #[must_use]
    pub fn io_speedup(&self) -> f64 {
        speedup(&self.io_sequential, &self.io_concurrent)
    }
}

/// Runs the CPU-bound comparison, the I/O-bound comparison and the shared-log demonstration,
/// writing the measurements to `out` as each section completes.
///
/// Both comparisons execute under one [`InterpreterLock`], so the CPU-bound workload shows no
/// meaningful speedup while the I/O-bound workload overlaps its waits.
///
/// # Errors
///
/// Returns [`Error::Output`][crate::Error::Output] if writing to `out` fails, and
/// [`Error::IoFailure`][crate::Error::IoFailure] if the configured network client cannot be
/// created. Returns [`Error::InvalidConfig`][crate::Error::InvalidConfig] before running anything
/// if [`DemoConfig::network_url`] is set but the `network` feature is disabled. Failed I/O calls
/// do not produce errors; they are counted in [`DemoReport::io_fallbacks`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use workload_contrast::{DemoConfig, run_demo};
///
/// let mut config = DemoConfig::default();
/// config.cpu_iterations = 10_000;
/// config.io_delay = Duration::from_millis(5);
/// config.log_pause = Duration::from_millis(1);
///
/// let mut out = Vec::new();
/// let report = run_demo(&config, &mut out).unwrap();
///
/// assert_eq!(report.log_entries.len(), 15);
/// ```
pub fn run_demo(config: &DemoConfig, out: &mut impl Write) -> Result<DemoReport> {
    // Resolved up front so that a configuration problem is reported before any output.
    let io = Arc::new(
        FallbackIo::new(io_source(config)?).with_fallback_delay(config.fallback_delay),
    );
    let lock = Arc::new(InterpreterLock::new());

    writeln!(out, "1. CPU-bound workload")?;
    writeln!(out, "{}", "-".repeat(40))?;

    let cpu_args = || iter::repeat_n(config.cpu_iterations, config.cpu_tasks.get());

    let cpu_sequential = run_sequential(cpu_task(&lock), cpu_args());
    writeln!(out, "Sequential: {:.2}s", cpu_sequential.elapsed().as_secs_f64())?;

    let cpu_concurrent = run_concurrent(cpu_task(&lock), cpu_args(), config.cpu_tasks);
    writeln!(out, "Worker pool: {:.2}s", cpu_concurrent.elapsed().as_secs_f64())?;
    writeln!(out, "Speedup: {:.2}x", speedup(&cpu_sequential, &cpu_concurrent))?;
    writeln!(out)?;

    writeln!(out, "2. I/O-bound workload")?;
    writeln!(out, "{}", "-".repeat(40))?;

    let io_args = || 0..config.io_tasks.get();

    let io_sequential = run_sequential(io_task(&io, &lock), io_args());
    writeln!(out, "Sequential: {:.2}s", io_sequential.elapsed().as_secs_f64())?;

    let io_concurrent = run_concurrent(io_task(&io, &lock), io_args(), config.io_tasks);
    writeln!(out, "Worker pool: {:.2}s", io_concurrent.elapsed().as_secs_f64())?;
    writeln!(out, "Speedup: {:.2}x", speedup(&io_sequential, &io_concurrent))?;

    let io_fallbacks = io.fallback_count();
    if io_fallbacks > 0 {
        writeln!(out, "({io_fallbacks} I/O calls failed and were replaced by a fixed wait)")?;
    }

    writeln!(out)?;

    writeln!(out, "3. Shared log")?;
    writeln!(out, "{}", "-".repeat(40))?;

    let log = SharedLog::new();
    let log_elapsed = run_workers(
        config.log_workers.get(),
        config.log_steps.get(),
        &log,
        config.log_pause,
    );
    let log_entries = log.into_entries();

    writeln!(
        out,
        "{} workers finished in {:.2}s",
        config.log_workers,
        log_elapsed.as_secs_f64()
    )?;
    writeln!(out, "Entries appended: {}", log_entries.len())?;
    writeln!(out, "Append order:")?;

    for entry in &log_entries {
        writeln!(out, "  {entry}")?;
    }

    Ok(DemoReport {
        cpu_sequential,
        cpu_concurrent,
        io_sequential,
        io_concurrent,
        io_fallbacks,
        log_elapsed,
        log_entries,
    })
}

fn cpu_task(lock: &Arc<InterpreterLock>) -> impl Fn(u64) -> u128 + Send + Sync + 'static {
    let lock = Arc::clone(lock);
    move |iterations| sum_of_squares_constrained(iterations, &lock)
}

fn io_task(
    io: &Arc<FallbackIo<Box<dyn BlockingIo>>>,
    lock: &Arc<InterpreterLock>,
) -> impl Fn(usize) -> StatusCode + Send + Sync + 'static {
    let io = Arc::clone(io);
    let lock = Arc::clone(lock);
    move |_task_index| io_round_trip(&io, &lock)
}

#[cfg(feature = "network")]
fn io_source(config: &DemoConfig) -> Result<Box<dyn BlockingIo>> {
    let Some(url) = &config.network_url else {
        return Ok(simulated_source(config));
    };

    debug!(
        url = %url,
        timeout = ?config.io_timeout,
        "I/O workload uses real HTTP round trips"
    );

    Ok(Box::new(crate::HttpRoundTrip::new(url.as_str(), config.io_timeout)?))
}

#[cfg(not(feature = "network"))]
fn io_source(config: &DemoConfig) -> Result<Box<dyn BlockingIo>> {
    if config.network_url.is_some() {
        return Err(crate::Error::InvalidConfig {
            field: "network-url",
            problem: "requires the `network` feature".to_string(),
        });
    }

    Ok(simulated_source(config))
}

fn simulated_source(config: &DemoConfig) -> Box<dyn BlockingIo> {
    debug!(delay = ?config.io_delay, "I/O workload uses simulated round trips");
    Box::new(SimulatedRoundTrip::new(config.io_delay))
}
