// src/exec/executor_loop.rs

//! The sequential worker: exactly one script runs at a time.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::DaemonConfig;
use crate::engine::{JobOutcome, JobQueue, SharedInterrupts, Shutdown};
use crate::exec::job_runner::JobRunner;
use crate::notify::SharedSink;

/// Owns the execution counter and feeds jobs to a [`JobRunner`].
pub struct Executor {
    runner: JobRunner,
    interrupts: SharedInterrupts,
    poll_interval: Duration,
    executions: u64,
}

impl Executor {
    pub fn new(config: &DaemonConfig, interrupts: SharedInterrupts, sink: SharedSink) -> Self {
        Self::with_shell(
            config.shell.clone(),
            config.polling_interval,
            interrupts,
            sink,
        )
    }

    pub fn with_shell(
        shell: Vec<String>,
        poll_interval: Duration,
        interrupts: SharedInterrupts,
        sink: SharedSink,
    ) -> Self {
        let runner = JobRunner::new(shell, poll_interval, interrupts.clone(), sink);
        Self {
            runner,
            interrupts,
            poll_interval,
            executions: 0,
        }
    }

    /// Number of scripts started so far.
    pub fn executions(&self) -> u64 {
        self.executions
    }

    /// Run one script and apply the interrupt-reset rule to its outcome.
    pub async fn run_job(&mut self, script: &str) -> JobOutcome {
        self.executions += 1;
        let outcome = self.runner.run(self.executions, script).await;
        self.interrupts.record_completion(outcome);
        outcome
    }

    /// Consume `queue` until `shutdown` fires.
    ///
    /// A running job is never abandoned: shutdown is only observed between
    /// jobs (the cancel flag is what stops a running one). Jobs still queued
    /// when shutdown fires are discarded.
    pub async fn run(mut self, mut queue: JobQueue, shutdown: Shutdown) -> u64 {
        info!("executor loop started");

        loop {
            let next = tokio::select! {
                biased;
                _ = shutdown.wait() => break,
                job = queue.dequeue(self.poll_interval) => job,
            };

            let Some(job) = next else {
                continue;
            };

            debug!(arrival = job.seq, "dequeued job");
            self.run_job(&job.script).await;
        }

        let discarded = queue.drain();
        if !discarded.is_empty() {
            warn!(count = discarded.len(), "discarding queued scripts on shutdown");
        }

        info!(executions = self.executions, "executor loop finished");
        self.executions
    }
}
