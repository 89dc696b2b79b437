//! An explicit model of a global interpreter lock.
//!
//! Rust threads execute CPU-bound work truly in parallel, so a worker pool speeds up both
//! CPU-bound and I/O-bound workloads. Runtimes with a global interpreter lock only let one thread
//! execute computation at a time, and a thread gives the lock up only at a suspension point
//! (blocking I/O, sleeping) or at a periodic switch point.
//!
//! [`InterpreterLock`] reproduces that constraint so both outcomes can be observed side by side:
//! CPU-bound work executed under the lock gains nothing from a pool, while I/O-bound work that
//! [suspends][InterpreterGuard::suspend] during its blocking call overlaps freely.

use parking_lot::{Mutex, MutexGuard};

/// How many loop iterations CPU-bound work performs between [switch points][1].
///
/// [1]: InterpreterGuard::switch_point
pub const SWITCH_INTERVAL: u64 = 100_000;

/// Only one thread at a time may hold this lock and execute computation.
///
/// # Examples
///
/// ```
/// use std::thread;
/// use std::time::Duration;
///
/// use workload_contrast::InterpreterLock;
///
/// let lock = InterpreterLock::new();
///
/// let answer = lock.execute(|interpreter| {
///     let partial = 6 * 7;
///
///     // Blocking calls happen outside the lock, so other threads may compute meanwhile.
///     interpreter.suspend(|| thread::sleep(Duration::from_millis(1)));
///
///     partial
/// });
///
/// assert_eq!(answer, 42);
/// ```
#[derive(Debug, Default)]
pub struct InterpreterLock {
    state: Mutex<()>,
}

impl InterpreterLock {
    /// Creates a lock that no thread holds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until the calling thread holds the lock.
    ///
    /// The lock is released when the returned guard is dropped.
    #[must_use]
    pub fn enter(&self) -> InterpreterGuard<'_> {
        InterpreterGuard {
            guard: self.state.lock(),
        }
    }

    /// Executes `f` while holding the lock.
    ///
    /// `f` receives the guard so that it can suspend or yield at the points where the modelled
    /// runtime would.
    pub fn execute<R>(&self, f: impl FnOnce(&mut InterpreterGuard<'_>) -> R) -> R {
        let mut interpreter = self.enter();
        f(&mut interpreter)
    }
}

/// Proof that the current thread holds an [`InterpreterLock`].
#[derive(Debug)]
pub struct InterpreterGuard<'a> {
    guard: MutexGuard<'a, ()>,
}

impl InterpreterGuard<'_> {
    /// Runs `f` with the lock released, re-acquiring it before returning.
    ///
    /// This is a suspension point: while `f` blocks, other threads may enter the lock and
    /// execute computation.
    pub fn suspend<R>(&mut self, f: impl FnOnce() -> R) -> R {
        MutexGuard::unlocked_fair(&mut self.guard, f)
    }

    /// Hands the lock to a waiting thread, if there is one, and waits to get it back.
    ///
    /// Long-running computation calls this every [`SWITCH_INTERVAL`] iterations so that threads
    /// take turns instead of one thread running to completion.
    pub fn switch_point(&mut self) {
        MutexGuard::bump(&mut self.guard);
    }
}
