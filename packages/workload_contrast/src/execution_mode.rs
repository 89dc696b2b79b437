use std::fmt;

/// How the invocations of a workload were scheduled.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum ExecutionMode {
    /// Every invocation ran on the calling thread, one after another, in input order.
    Sequential,

    /// Invocations were submitted to a fixed-size [`WorkerPool`][crate::WorkerPool] and their
    /// results collected in submission order.
    PooledConcurrent,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::PooledConcurrent => write!(f, "pooled concurrent"),
        }
    }
}
