// Blocking I/O collaborators for the I/O-bound workload.
//
// The workload only needs "an operation that blocks for roughly a fixed duration", so the
// abstraction is a single trait with a simulated implementation, an optional real network
// implementation and a wrapper that recovers from failures locally.

mod abstractions;
mod fallback;
#[cfg(feature = "network")]
mod http_round_trip;
mod simulated;

pub use abstractions::*;
pub use fallback::*;
#[cfg(feature = "network")]
pub use http_round_trip::*;
pub use simulated::*;
