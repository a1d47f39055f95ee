// src/exec/heartbeat.rs

//! Per-job supervision: progress notifications and cancellation polling.

use std::time::{Duration, Instant};

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tracing::{debug, warn};

use crate::engine::SharedInterrupts;
use crate::exec::process::{kill_group, terminate_group};
use crate::notify::{Notification, SharedSink};

/// Everything the heartbeat needs about the job it watches.
pub struct Heartbeat {
    pub pid: Option<u32>,
    pub seq: u64,
    pub display: String,
    pub start: Instant,
    pub interval: Duration,
    pub interrupts: SharedInterrupts,
    pub sink: SharedSink,
}

impl Heartbeat {
    /// Poll until the child exits (signalled through `exited`). Returns
    /// `true` if the child was killed.
    ///
    /// A raised cancel flag sends SIGTERM to the job's process group. If the
    /// group is still alive one `interval` later it gets SIGKILL, repeated
    /// every interval until the child is reaped.
    pub async fn run(self, mut exited: oneshot::Receiver<()>) -> bool {
        let mut killed = false;

        loop {
            if !matches!(exited.try_recv(), Err(TryRecvError::Empty)) {
                return killed;
            }

            if killed {
                self.signal(kill_group, "SIGTERM ignored; killing process..");
            } else if self.interrupts.cancel_requested() {
                self.signal(terminate_group, "Killing process..");
                killed = true;
            } else {
                self.sink.notify(Notification::heartbeat(
                    &self.display,
                    self.start.elapsed(),
                    self.seq,
                ));
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = &mut exited => {
                    debug!(seq = self.seq, "child exited; heartbeat stopping");
                    return killed;
                }
            }
        }
    }

    fn signal(&self, send: fn(u32) -> anyhow::Result<()>, what: &str) {
        let Some(pid) = self.pid else {
            warn!(seq = self.seq, "cancellation requested but child has no pid");
            return;
        };

        warn!(seq = self.seq, pid, "{what}");
        if let Err(e) = send(pid) {
            warn!(seq = self.seq, pid, error = %e, "failed to signal child");
        }
    }
}
