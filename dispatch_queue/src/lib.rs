//! # dispatch_queue
//!
//! A blocking FIFO work queue and a single dispatch thread wrapping it.
//!
//! [`WorkQueue`] is a generic thread safe queue with a blocking dequeue.
//! [`DispatchThread`] owns one OS thread that drains a `WorkQueue` of jobs,
//! running them strictly in posting order. This is the usual delivery
//! mechanism for driving a notification registry from a dedicated thread,
//! but carries no dependency on one.
//!
//! # Example
//!
//! ```rust
//! use dispatch_queue::DispatchThread;
//! use std::sync::mpsc;
//!
//! let mut dispatch = DispatchThread::new();
//! let (sender, receiver) = mpsc::channel();
//! dispatch.post(move || sender.send(1 + 1).unwrap()).unwrap();
//! assert_eq!(2, receiver.recv().unwrap());
//! dispatch.shutdown();
//! ```

/// Error types of the crate.
pub mod errors;

/// The generic blocking FIFO queue.
pub mod queue;

/// The dispatch thread draining a job queue.
pub mod worker;

pub use errors::{DispatchError, DispatchResult};
pub use queue::WorkQueue;
pub use worker::{DispatchThread, Job, ShutdownStatus};
