use std::time::Duration;

use crate::ExecutionMode;

/// The outcome of timing one workload under one [`ExecutionMode`].
///
/// A result is created once per comparator run and cannot be modified afterwards. The outputs
/// are always in input order, regardless of the order in which the invocations completed.
///
/// # Examples
///
/// ```
/// use workload_contrast::{ExecutionMode, run_sequential};
///
/// let result = run_sequential(|x: u64| x * x, [1, 2, 3]);
///
/// assert_eq!(result.mode(), ExecutionMode::Sequential);
/// assert_eq!(result.outputs(), &[1, 4, 9]);
/// println!("Took {:?}", result.elapsed());
/// ```
#[derive(Clone, Debug)]
pub struct WorkloadResult<R> {
    mode: ExecutionMode,
    elapsed: Duration,
    outputs: Vec<R>,
}

impl<R> WorkloadResult<R> {
    pub(crate) fn new(mode: ExecutionMode, elapsed: Duration, outputs: Vec<R>) -> Self {
        Self {
            mode,
            elapsed,
            outputs,
        }
    }

    /// How the invocations were scheduled.
    #[must_use]
    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Wall-clock time spent executing the workload.
    ///
    /// For sequential runs, this spans from the start of the first invocation to the end of the
    /// last one. For pooled runs, it spans from pool creation until every result was collected.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// The value returned by each invocation, in input order.
    #[must_use]
    pub fn outputs(&self) -> &[R] {
        &self.outputs
    }

    /// Consumes the result, returning the per-invocation values in input order.
    #[must_use]
    pub fn into_outputs(self) -> Vec<R> {
        self.outputs
    }
}
