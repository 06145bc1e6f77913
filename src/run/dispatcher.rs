//! Fixed-size worker pool fed through a bounded queue.
//!
//! The queue holds at most `workers * QUEUE_CAPACITY_FACTOR` jobs. `submit`
//! waits while it is full, which throttles the input reader to the pace of
//! the network-bound workers.

use std::future::Future;
use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{debug, warn};
use tokio::sync::mpsc::error::SendError;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::config::QUEUE_CAPACITY_FACTOR;

/// Counts reported once every worker has exited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Jobs accepted by `submit`
    pub submitted: usize,
    /// Jobs completed by workers that exited normally
    pub processed: usize,
    /// Workers that panicked
    pub panicked: usize,
}

/// Producer side of the worker pool.
///
/// Dropping the sender in `finish` is the only way to close the queue, so
/// no job can be submitted after the pool starts draining.
pub struct Dispatcher<J> {
    sender: mpsc::Sender<J>,
    workers: Vec<JoinHandle<usize>>,
    submitted: usize,
}

impl<J: Send + 'static> Dispatcher<J> {
    /// Spawns `workers` tasks that each run `handler` on one job at a time.
    ///
    /// A worker count of zero is treated as one.
    pub fn spawn<F, Fut>(workers: usize, handler: F) -> Self
    where
        F: Fn(J) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let workers = workers.max(1);
        let (sender, receiver) = mpsc::channel(workers * QUEUE_CAPACITY_FACTOR);
        let receiver = Arc::new(Mutex::new(receiver));
        let handler = Arc::new(handler);

        let workers = (0..workers)
            .map(|id| {
                let receiver = Arc::clone(&receiver);
                let handler = Arc::clone(&handler);
                tokio::spawn(async move {
                    let mut processed = 0;
                    loop {
                        // The lock only covers taking a job, never running it
                        let job = receiver.lock().await.recv().await;
                        let Some(job) = job else {
                            break;
                        };
                        handler(job).await;
                        processed += 1;
                    }
                    debug!("Worker {id} exiting after {processed} jobs");
                    processed
                })
            })
            .collect();

        Self {
            sender,
            workers,
            submitted: 0,
        }
    }

    /// Queues a job, waiting while the queue is full.
    ///
    /// # Errors
    ///
    /// Returns the job back if every worker has exited.
    pub async fn submit(&mut self, job: J) -> Result<(), SendError<J>> {
        self.sender.send(job).await?;
        self.submitted += 1;
        Ok(())
    }

    /// Number of jobs accepted so far.
    pub fn submitted(&self) -> usize {
        self.submitted
    }

    /// Closes the queue and waits for every worker to drain it and exit.
    pub async fn finish(self) -> DispatchSummary {
        let Self {
            sender,
            workers,
            submitted,
        } = self;
        drop(sender);

        let mut summary = DispatchSummary {
            submitted,
            ..Default::default()
        };
        let mut joins: FuturesUnordered<_> = workers.into_iter().collect();
        while let Some(joined) = joins.next().await {
            match joined {
                Ok(processed) => summary.processed += processed,
                Err(join_error) => {
                    summary.panicked += 1;
                    warn!("Worker panicked: {:?}", join_error);
                }
            }
        }
        summary
    }
}
