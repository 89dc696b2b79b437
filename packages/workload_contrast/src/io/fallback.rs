use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use http::StatusCode;
use tracing::warn;

use crate::{BlockingIo, Error};

/// How long [`FallbackIo`] blocks in place of a failed operation, unless configured otherwise.
pub const DEFAULT_FALLBACK_DELAY: Duration = Duration::from_secs(1);

/// Wraps a [`BlockingIo`] so that failures are recovered from locally.
///
/// When the inner operation fails, the failure is logged, the calling thread blocks for a fixed
/// duration instead and the call reports [`StatusCode::OK`]. From the perspective of a timing
/// comparison, a failed call therefore still costs roughly one round trip.
///
/// The failure never reaches the caller as an error, but it is not silent either: every
/// substitution is counted and can be inspected via [`fallback_count()`][Self::fallback_count].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use http::StatusCode;
/// use workload_contrast::{FallbackIo, SimulatedRoundTrip};
///
/// let io = FallbackIo::new(SimulatedRoundTrip::new(Duration::from_millis(5)));
///
/// assert_eq!(io.perform(), StatusCode::OK);
/// assert_eq!(io.fallback_count(), 0);
/// ```
#[derive(Debug)]
pub struct FallbackIo<I> {
    inner: I,
    fallback_delay: Duration,
    fallbacks_taken: AtomicU64,
}

impl<I> FallbackIo<I>
where
    I: BlockingIo,
{
    /// Wraps `inner`, substituting [`DEFAULT_FALLBACK_DELAY`] for failed calls.
    #[must_use]
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            fallback_delay: DEFAULT_FALLBACK_DELAY,
            fallbacks_taken: AtomicU64::new(0),
        }
    }

    /// Sets how long a failed call blocks before reporting success.
    #[must_use]
    pub fn with_fallback_delay(mut self, delay: Duration) -> Self {
        self.fallback_delay = delay;
        self
    }

    /// Performs the inner operation, substituting a fixed wait and [`StatusCode::OK`] if it fails.
    pub fn perform(&self) -> StatusCode {
        match self.inner.perform_io() {
            Ok(status) => status,
            Err(error) => {
                self.fallbacks_taken.fetch_add(1, Ordering::Relaxed);

                warn!(
                    %error,
                    fallback_delay = ?self.fallback_delay,
                    "I/O operation failed, substituting a fixed wait"
                );

                thread::sleep(self.fallback_delay);
                StatusCode::OK
            }
        }
    }

    /// How many calls have failed and been replaced by the fallback so far.
    #[must_use]
    pub fn fallback_count(&self) -> u64 {
        self.fallbacks_taken.load(Ordering::Relaxed)
    }

    /// The wrapped operation.
    #[must_use]
    pub fn inner(&self) -> &I {
        &self.inner
    }
}

impl<I> BlockingIo for FallbackIo<I>
where
    I: BlockingIo,
{
    fn perform_io(&self) -> Result<StatusCode, Error> {
        Ok(self.perform())
    }
}
