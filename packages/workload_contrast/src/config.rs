use std::num::NonZero;
use std::time::Duration;

use new_zealand::nz;

use crate::{DEFAULT_FALLBACK_DELAY, DEFAULT_ROUND_TRIP, DEFAULT_STEP_PAUSE, Error, Result};

/// The knobs of [`run_demo()`][crate::run_demo].
///
/// The defaults reproduce the classic demonstration: two CPU-bound tasks of five million
/// iterations each, three one-second I/O round trips and three shared-log workers of five steps.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use new_zealand::nz;
/// use workload_contrast::DemoConfig;
///
/// let mut config = DemoConfig::default();
/// config.io_tasks = nz!(5);
/// config.io_delay = Duration::from_millis(200);
///
/// assert_eq!(config.cpu_tasks.get(), 2);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct DemoConfig {
    /// Loop iterations performed by each CPU-bound task.
    pub cpu_iterations: u64,

    /// Number of CPU-bound tasks, which is also the worker count of the pooled CPU-bound run.
    pub cpu_tasks: NonZero<usize>,

    /// Number of I/O-bound tasks, which is also the worker count of the pooled I/O-bound run.
    pub io_tasks: NonZero<usize>,

    /// How long each simulated I/O round trip blocks.
    pub io_delay: Duration,

    /// How long a failed I/O call blocks before its substitute success is reported.
    pub fallback_delay: Duration,

    /// Bounded wait for one real network round trip.
    pub io_timeout: Duration,

    /// If set (and the `network` feature is enabled), the I/O-bound workload requests this URL
    /// instead of simulating the round trip.
    pub network_url: Option<String>,

    /// Number of workers in the shared-log demonstration.
    pub log_workers: NonZero<usize>,

    /// Entries appended by each shared-log worker.
    pub log_steps: NonZero<usize>,

    /// Pause after each shared-log append.
    pub log_pause: Duration,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            cpu_iterations: 5_000_000,
            cpu_tasks: nz!(2),
            io_tasks: nz!(3),
            io_delay: DEFAULT_ROUND_TRIP,
            fallback_delay: DEFAULT_FALLBACK_DELAY,
            io_timeout: Duration::from_secs(3),
            network_url: None,
            log_workers: nz!(3),
            log_steps: nz!(5),
            log_pause: DEFAULT_STEP_PAUSE,
        }
    }
}

/// Validates that a count supplied for the setting `field` is not zero.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] naming `field` if `value` is zero.
///
/// # Examples
///
/// ```
/// use workload_contrast::require_non_zero;
///
/// assert_eq!(require_non_zero("io-tasks", 3).unwrap().get(), 3);
/// assert!(require_non_zero("io-tasks", 0).is_err());
/// ```
pub fn require_non_zero(field: &'static str, value: usize) -> Result<NonZero<usize>> {
    NonZero::new(value).ok_or_else(|| Error::InvalidConfig {
        field,
        problem: "must be at least 1".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_demo() {
        let config = DemoConfig::default();

        assert_eq!(config.cpu_iterations, 5_000_000);
        assert_eq!(config.cpu_tasks.get(), 2);
        assert_eq!(config.io_tasks.get(), 3);
        assert_eq!(config.io_delay, Duration::from_secs(1));
        assert_eq!(config.fallback_delay, Duration::from_secs(1));
        assert_eq!(config.io_timeout, Duration::from_secs(3));
        assert_eq!(config.network_url, None);
        assert_eq!(config.log_workers.get(), 3);
        assert_eq!(config.log_steps.get(), 5);
        assert_eq!(config.log_pause, Duration::from_millis(100));
    }

    #[test]
    fn zero_count_is_rejected_with_field_name() {
        let error = require_non_zero("cpu-tasks", 0).unwrap_err();

        assert!(matches!(
            error,
            Error::InvalidConfig {
                field: "cpu-tasks",
                ..
            }
        ));
        assert_eq!(
            error.to_string(),
            "invalid configuration: 'cpu-tasks' must be at least 1"
        );
    }

    #[test]
    fn non_zero_count_is_accepted() {
        assert_eq!(require_non_zero("log-steps", 7).unwrap().get(), 7);
    }
}
