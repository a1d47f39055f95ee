// src/engine/mod.rs

//! Coordination state shared between ingress, executor and daemon.
//!
//! - [`queue`]: ordered job queue between the socket acceptor and the
//!   executor.
//! - [`interrupt`]: consecutive-interrupt counter and the cancel flag read by
//!   the heartbeat.
//! - [`shutdown`]: monotonic shutdown latch every loop waits on.

/// One script submitted for execution.
///
/// `seq` is the arrival order assigned at enqueue time (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub seq: u64,
    pub script: String,
}

/// How a job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// Process exited with status 0.
    Done,
    /// Process exited with a non-zero status (or could not be run at all,
    /// reported as -1).
    Failed(i32),
    /// Process was terminated because cancellation was requested.
    Killed,
}

impl JobOutcome {
    /// Exit status, or `None` for a killed job.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            JobOutcome::Done => Some(0),
            JobOutcome::Failed(code) => Some(*code),
            JobOutcome::Killed => None,
        }
    }

    /// Whether the job ran to completion on its own (successfully or not).
    pub fn is_completion(&self) -> bool {
        self.exit_code().is_some()
    }
}

pub mod interrupt;
pub mod queue;
pub mod shutdown;

pub use interrupt::{InterruptController, SharedInterrupts};
pub use queue::{JobQueue, JobSender, job_queue};
pub use shutdown::Shutdown;
