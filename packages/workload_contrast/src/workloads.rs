//! The two workload shapes that the demo contrasts.
//!
//! The comparator itself is workload-agnostic; these are just the tasks the demo hands to it.

use std::hint::black_box;

use http::StatusCode;

use crate::{BlockingIo, FallbackIo, InterpreterLock, SWITCH_INTERVAL};

/// CPU-bound work with no suspension points: the sum of `i * i` for every `i` in `0..n`.
///
/// The result is exact for any `n` up to about 10^12 and wraps beyond that.
///
/// # Examples
///
/// ```
/// use workload_contrast::sum_of_squares;
///
/// assert_eq!(sum_of_squares(4), 0 + 1 + 4 + 9);
/// ```
#[must_use]
pub fn sum_of_squares(n: u64) -> u128 {
    sum_of_squares_in(0, n)
}

/// Same as [`sum_of_squares()`] but executed under `lock`, the way a runtime with a global
/// interpreter lock would execute it.
///
/// The lock is held for the whole computation except at a [switch point][1] every
/// [`SWITCH_INTERVAL`] iterations, where a waiting thread gets a turn.
///
/// [1]: crate::InterpreterGuard::switch_point
#[must_use]
pub fn sum_of_squares_constrained(n: u64, lock: &InterpreterLock) -> u128 {
    lock.execute(|interpreter| {
        let mut total = 0_u128;
        let mut slice_start = 0;

        while slice_start < n {
            let slice_end = slice_start.saturating_add(SWITCH_INTERVAL).min(n);

            total = total.wrapping_add(sum_of_squares_in(slice_start, slice_end));
            interpreter.switch_point();

            slice_start = slice_end;
        }

        total
    })
}

fn sum_of_squares_in(start: u64, end: u64) -> u128 {
    (start..end).fold(0_u128, |total, i| {
        // Without black_box the optimizer replaces the loop with a closed-form expression,
        // which would leave nothing to measure.
        let i = u128::from(black_box(i));
        total.wrapping_add(i.wrapping_mul(i))
    })
}

/// I/O-bound work: one blocking call that suspends the calling worker without consuming a
/// processor.
///
/// The call is made outside `lock`, so other workers may execute while this one waits.
/// Failures of the underlying operation are absorbed by [`FallbackIo`], so this always
/// yields a status code.
pub fn io_round_trip<I>(io: &FallbackIo<I>, lock: &InterpreterLock) -> StatusCode
where
    I: BlockingIo,
{
    lock.execute(|interpreter| interpreter.suspend(|| io.perform()))
}
