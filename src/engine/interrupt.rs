// src/engine/interrupt.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use tracing::debug;

use super::JobOutcome;

pub type SharedInterrupts = Arc<InterruptController>;

/// Interrupt escalation state.
///
/// - every observed interrupt bumps `consecutive` and raises `cancel`;
/// - the heartbeat kills the running job while `cancel` is raised;
/// - `cancel` is lowered when the next job starts;
/// - `consecutive` drops back to 0 whenever a job completes on its own.
///
/// Once `consecutive` reaches `max`, the daemon stops serving.
#[derive(Debug)]
pub struct InterruptController {
    consecutive: AtomicU32,
    cancel: AtomicBool,
    max: u32,
}

impl InterruptController {
    pub fn new(max: u32) -> Self {
        Self {
            consecutive: AtomicU32::new(0),
            cancel: AtomicBool::new(false),
            max,
        }
    }

    pub fn shared(max: u32) -> SharedInterrupts {
        Arc::new(Self::new(max))
    }

    /// Record one interrupt; returns the new consecutive count.
    pub fn record_interrupt(&self) -> u32 {
        self.cancel.store(true, Ordering::SeqCst);
        self.consecutive.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Ask for the running job to be killed without counting an interrupt
    /// (used for SIGTERM).
    pub fn request_cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn cancel_requested(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Lower the cancel flag before a new job starts.
    pub fn clear_cancel(&self) {
        self.cancel.store(false, Ordering::SeqCst);
    }

    /// Account for a finished job. Only a job that was not killed resets the
    /// counter; returns whether a reset happened.
    pub fn record_completion(&self, outcome: JobOutcome) -> bool {
        if !outcome.is_completion() {
            return false;
        }
        let previous = self.consecutive.swap(0, Ordering::SeqCst);
        if previous > 0 {
            debug!(previous, "interrupts reset to 0");
        }
        true
    }

    pub fn consecutive(&self) -> u32 {
        self.consecutive.load(Ordering::SeqCst)
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// True once enough consecutive interrupts were seen to stop serving.
    pub fn exhausted(&self) -> bool {
        self.consecutive() >= self.max
    }
}
