#![cfg_attr(docsrs, feature(doc_cfg))]

//! Times the same workload sequentially and on a worker pool, to contrast how CPU-bound and
//! I/O-bound work respond to concurrency.
//!
//! The core functionality includes:
//! - [`run_sequential()`], [`run_concurrent()`] and [`speedup()`] - the workload timing
//!   comparator, which accepts any function and argument list
//! - [`WorkerPool`] - fixed-size pool whose results are collected in submission order
//! - [`InterpreterLock`] - an explicit global interpreter lock, under which only one thread
//!   computes at a time and threads yield only at suspension points
//! - [`SharedLog`] and [`run_workers()`] - interleaved, lock-serialized appends from concurrent
//!   workers
//! - [`run_demo()`] - runs all of the above as a classic three-part demonstration
//!
//! This package is meant for teaching and experimentation, not for production benchmarking.
//!
//! # Operating principles
//!
//! ## Workloads are supplied by the caller
//!
//! The comparator never decides what a workload does. The demo uses [`sum_of_squares()`] as a
//! CPU-bound task with no suspension points and [`io_round_trip()`] as an I/O-bound task that
//! blocks once per invocation, but any `Fn(A) -> R` works.
//!
//! ## Where the speedup comes from
//!
//! A worker pool can only overlap what its workers are allowed to do at the same time. Under an
//! [`InterpreterLock`], CPU-bound invocations take turns, so pooling them yields a speedup of
//! about 1.0. I/O-bound invocations release the lock while they block, so pooling `n` of them on
//! `n` workers approaches a speedup of `n`.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use new_zealand::nz;
//! use workload_contrast::{
//!     FallbackIo, InterpreterLock, SimulatedRoundTrip, io_round_trip, run_concurrent,
//!     run_sequential, speedup,
//! };
//!
//! let lock = Arc::new(InterpreterLock::new());
//! let io = Arc::new(FallbackIo::new(SimulatedRoundTrip::new(Duration::from_millis(30))));
//!
//! let task = move |_: usize| io_round_trip(&io, &lock);
//!
//! let sequential = run_sequential(task.clone(), 0..3);
//! let concurrent = run_concurrent(task, 0..3, nz!(3));
//!
//! assert_eq!(sequential.outputs(), concurrent.outputs());
//! println!("Speedup: {:.2}x", speedup(&sequential, &concurrent));
//! ```

mod comparator;
mod config;
mod demo;
mod error;
mod execution_mode;
mod interpreter_lock;
mod io;
mod shared_log;
mod worker_pool;
mod workload_result;
mod workloads;

pub use comparator::*;
pub use config::*;
pub use demo::*;
pub use error::Error;
pub(crate) use error::Result;
pub use execution_mode::*;
pub use interpreter_lock::*;
pub use io::*;
pub use shared_log::*;
pub use worker_pool::*;
pub use workload_result::*;
pub use workloads::*;
