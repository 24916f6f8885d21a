use crate::errors::{DispatchError, DispatchResult};
use crate::queue::WorkQueue;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// The job type the dispatch thread runs.
pub type Job = Box<dyn FnOnce() + Send>;

enum Command {
    Run(Job),
    Stop,
}

/// The outcome of a `shutdown` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownStatus {
    /// The thread drained its queue and exited (or was left to exit on its
    /// own because `shutdown` ran on the dispatch thread itself).
    Success,
    /// The thread had already been shut down.
    AlreadyStopped,
}

/// A single worker thread draining a FIFO of jobs.
///
/// Jobs posted from any thread run one after another on the worker, in the
/// order they were posted. `shutdown` goes through the queue as well, so
/// every job posted before it still runs before the thread exits. A job
/// that panics is caught and logged, the jobs behind it still run.
pub struct DispatchThread {
    queue: Arc<WorkQueue<Command>>,
    stopped: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl Default for DispatchThread {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchThread {
    /// Spawns the dispatch thread. It sits blocked on the queue until jobs
    /// are posted.
    pub fn new() -> Self {
        let queue = Arc::new(WorkQueue::new());
        let worker_queue = Arc::clone(&queue);
        let worker = thread::spawn(move || {
            debug!("dispatch thread started");
            loop {
                match worker_queue.pop() {
                    Command::Run(job) => {
                        // Unwinding out of the loop would leave the queue
                        // accepting jobs nobody ever runs.
                        let shielded = std::panic::AssertUnwindSafe(job);
                        if std::panic::catch_unwind(shielded).is_err() {
                            warn!("a job panicked, the dispatch thread keeps running");
                        }
                    }
                    Command::Stop => break,
                }
            }
            debug!("dispatch thread exiting");
        });
        Self {
            queue,
            stopped: Arc::new(AtomicBool::new(false)),
            worker: Some(worker),
        }
    }

    /// Queues `job` to run on the dispatch thread. Fails with
    /// [`DispatchError::Stopped`] once `shutdown` was requested.
    pub fn post<F>(&self, job: F) -> DispatchResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.stopped.load(Ordering::SeqCst) {
            warn!("job posted after shutdown, dropping it");
            return Err(DispatchError::Stopped);
        }
        self.queue.push(Command::Run(Box::new(job)));
        Ok(())
    }

    /// Stops the dispatch thread after it drained every job posted so far,
    /// then joins it.
    ///
    /// Safe to call from a job running on the dispatch thread itself: the
    /// stop command is still queued, but the join is skipped since a thread
    /// cannot join itself.
    pub fn shutdown(&mut self) -> ShutdownStatus {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return ShutdownStatus::AlreadyStopped;
        }
        self.queue.push(Command::Stop);
        if let Some(worker) = self.worker.take() {
            if thread::current().id() == worker.thread().id() {
                debug!("shutdown requested from the dispatch thread, skipping the join");
            } else if worker.join().is_err() {
                warn!("dispatch thread panicked before exiting");
            }
        }
        ShutdownStatus::Success
    }

    /// The number of jobs waiting to run.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl Drop for DispatchThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}
