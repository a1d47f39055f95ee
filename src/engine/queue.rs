// src/engine/queue.rs

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::debug;

use super::Job;
use crate::errors::{EfifoError, Result};

/// Create a connected sender/queue pair.
///
/// The queue is unbounded: enqueueing never waits on the executor.
pub fn job_queue() -> (JobSender, JobQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    let sender = JobSender {
        inner: Arc::new(Mutex::new(SenderState { tx, next_seq: 1 })),
    };
    (sender, JobQueue { rx, closed: false })
}

#[derive(Debug)]
struct SenderState {
    tx: mpsc::UnboundedSender<Job>,
    next_seq: u64,
}

/// Producer side of the queue; cheap to clone, one per connection handler.
#[derive(Debug, Clone)]
pub struct JobSender {
    inner: Arc<Mutex<SenderState>>,
}

impl JobSender {
    /// Append a script to the queue and return its arrival sequence number.
    ///
    /// Sequence assignment and the channel send happen under one lock so the
    /// numbering always matches the dequeue order.
    pub fn enqueue(&self, script: String) -> Result<u64> {
        let mut state = self
            .inner
            .lock()
            .map_err(|_| EfifoError::Other(anyhow::anyhow!("job sender lock poisoned")))?;

        let seq = state.next_seq;
        state
            .tx
            .send(Job { seq, script })
            .map_err(|_| EfifoError::QueueClosed)?;
        state.next_seq += 1;

        debug!(seq, "job enqueued");
        Ok(seq)
    }
}

/// Consumer side of the queue, owned by the executor.
#[derive(Debug)]
pub struct JobQueue {
    rx: mpsc::UnboundedReceiver<Job>,
    closed: bool,
}

impl JobQueue {
    /// Wait up to `timeout` for the earliest queued job.
    ///
    /// Returns `None` when nothing arrived in time. Once every sender is gone
    /// the queue still waits out `timeout` before returning `None`, so a
    /// polling caller never spins.
    pub async fn dequeue(&mut self, timeout: Duration) -> Option<Job> {
        if self.closed {
            return match self.rx.try_recv() {
                Ok(job) => Some(job),
                Err(_) => {
                    tokio::time::sleep(timeout).await;
                    None
                }
            };
        }

        let deadline = Instant::now() + timeout;
        match tokio::time::timeout_at(deadline, self.rx.recv()).await {
            Ok(Some(job)) => Some(job),
            Ok(None) => {
                debug!("all job senders dropped");
                self.closed = true;
                tokio::time::sleep_until(deadline).await;
                None
            }
            Err(_elapsed) => None,
        }
    }

    /// Number of jobs waiting.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Take every job still waiting, without blocking.
    pub fn drain(&mut self) -> Vec<Job> {
        let mut jobs = Vec::new();
        while let Ok(job) = self.rx.try_recv() {
            jobs.push(job);
        }
        jobs
    }
}
