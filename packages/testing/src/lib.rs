#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))] // This is all test code, no need to test it.

//! Private helpers for tests, benchmarks and examples in this workspace.

use std::env;
use std::ops::RangeInclusive;
use std::panic;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// How long [`with_watchdog()`] lets a test run before declaring it hung.
pub const DEFAULT_WATCHDOG_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs a test with a timeout to prevent infinite hangs.
///
/// Equivalent to [`with_watchdog_timeout()`] with [`DEFAULT_WATCHDOG_TIMEOUT`].
///
/// # Panics
///
/// Panics if the test exceeds the timeout (when not in mutation testing mode) and re-throws any
/// panic raised by the test itself.
///
/// # Example
///
/// ```rust
/// use testing::with_watchdog;
///
/// with_watchdog(|| {
///     assert_eq!(2 + 2, 4);
/// });
/// ```
pub fn with_watchdog<F, R>(test_fn: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    with_watchdog_timeout(DEFAULT_WATCHDOG_TIMEOUT, test_fn)
}

/// Runs a test on a separate thread and fails it if it does not finish within `timeout`.
///
/// Timing tests sleep and wait by nature, so a broken pool or lock shows up as a hang rather
/// than as a failed assertion. The watchdog turns that hang into a test failure.
///
/// When the `MUTATION_TESTING` environment variable is set to "1", the watchdog is disabled and
/// the test function is executed directly, so that mutation testing can detect hanging mutants
/// with its own timeout.
///
/// # Panics
///
/// Panics if the test exceeds `timeout` (when not in mutation testing mode) and re-throws any
/// panic raised by the test itself.
pub fn with_watchdog_timeout<F, R>(timeout: Duration, test_fn: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    if env::var("MUTATION_TESTING").as_deref() == Ok("1") {
        return test_fn();
    }

    let (tx, rx) = mpsc::channel();

    let test_handle = thread::spawn(move || {
        let result = test_fn();
        // If the receiver is gone, the watchdog has already fired.
        drop(tx.send(result));
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => {
            test_handle.join().expect("test thread must not panic after producing a result");
            result
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            panic!("test exceeded the {timeout:?} watchdog timeout");
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => match test_handle.join() {
            Ok(()) => panic!("test thread disconnected without producing a result"),
            Err(payload) => panic::resume_unwind(payload),
        },
    }
}

/// Asserts that a measured ratio (such as a speedup) falls within `expected`.
///
/// Timing measurements are never exact, so tests compare them against a tolerance band instead
/// of a single value.
///
/// # Panics
///
/// Panics with both the measured value and the accepted range if `actual` is outside
/// `expected` or is not a number.
///
/// # Example
///
/// ```rust
/// use testing::assert_ratio_in;
///
/// assert_ratio_in(2.97, 2.5..=3.2);
/// ```
#[track_caller]
pub fn assert_ratio_in(actual: f64, expected: RangeInclusive<f64>) {
    assert!(
        expected.contains(&actual),
        "ratio {actual:.3} is outside the expected range {:.3}..={:.3}",
        expected.start(),
        expected.end()
    );
}
