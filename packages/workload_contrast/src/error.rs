use std::io;

use thiserror::Error;

/// Errors that can occur when running workload comparisons.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A blocking I/O operation failed or did not complete within its bounded wait.
    ///
    /// [`FallbackIo`][crate::FallbackIo] recovers from this locally, so callers of the demo
    /// never observe it.
    #[error("I/O operation '{operation}' failed: {message}")]
    IoFailure {
        /// What the operation was trying to do.
        operation: &'static str,

        /// A human-readable description of the failure.
        message: String,
    },

    /// A configuration value was rejected during validation.
    #[error("invalid configuration: '{field}' {problem}")]
    InvalidConfig {
        /// The name of the rejected setting, as spelled on the command line.
        field: &'static str,

        /// A human-readable description of the problem.
        problem: String,
    },

    /// Writing the demo output failed.
    #[error("failed to write demo output: {0}")]
    Output(#[from] io::Error),
}

/// A specialized `Result` type for workload comparisons, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
