use std::thread;
use std::time::Duration;

use http::StatusCode;

use crate::{BlockingIo, Error};

/// The round trip time of the default simulated I/O operation.
pub const DEFAULT_ROUND_TRIP: Duration = Duration::from_secs(1);

/// Simulates a network round trip by sleeping for a fixed duration, then reporting success.
///
/// Sleeping behaves like real blocking I/O for the purposes of the demo: the thread is suspended
/// and does not occupy a processor while it waits.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SimulatedRoundTrip {
    delay: Duration,
}

impl SimulatedRoundTrip {
    /// Creates an operation that blocks for `delay` on every call.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// How long every call blocks.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for SimulatedRoundTrip {
    fn default() -> Self {
        Self::new(DEFAULT_ROUND_TRIP)
    }
}

impl BlockingIo for SimulatedRoundTrip {
    fn perform_io(&self) -> Result<StatusCode, Error> {
        thread::sleep(self.delay);
        Ok(StatusCode::OK)
    }
}
