// src/exec/job_runner.rs

//! Run one script to completion (or until it is killed) and report it.

use std::os::unix::process::ExitStatusExt;
use std::time::{Duration, Instant};

use tokio::io::AsyncWriteExt;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::digest::{display_commands, status_label};
use crate::engine::{JobOutcome, SharedInterrupts};
use crate::exec::heartbeat::Heartbeat;
use crate::exec::process::spawn_shell;
use crate::notify::{Notification, SharedSink};

/// Spawns and supervises script processes, one call at a time.
pub struct JobRunner {
    shell: Vec<String>,
    interval: Duration,
    interrupts: SharedInterrupts,
    sink: SharedSink,
}

impl JobRunner {
    pub fn new(
        shell: Vec<String>,
        interval: Duration,
        interrupts: SharedInterrupts,
        sink: SharedSink,
    ) -> Self {
        Self {
            shell,
            interval,
            interrupts,
            sink,
        }
    }

    /// Run `script` as execution number `seq`.
    ///
    /// The job is complete only once the process has exited *and* the
    /// heartbeat has stopped, so a kill racing a natural exit is always
    /// classified by the heartbeat's answer.
    pub async fn run(&self, seq: u64, script: &str) -> JobOutcome {
        self.interrupts.clear_cancel();

        let shown = display_commands(script);
        let label = status_label(script).to_string();

        self.sink.notify(Notification::running(&shown, seq));
        self.sink.status(&format!("{label}.."));
        info!(seq, script = %shown, "running script");

        let start = Instant::now();

        let mut child = match spawn_shell(&self.shell) {
            Ok(child) => child,
            Err(err) => {
                error!(seq, error = %err, "could not start shell");
                return self.report(seq, &shown, &label, -1, false, start.elapsed());
            }
        };

        let (exited_tx, exited_rx) = oneshot::channel::<()>();
        let heartbeat = Heartbeat {
            pid: child.id(),
            seq,
            display: shown.clone(),
            start,
            interval: self.interval,
            interrupts: self.interrupts.clone(),
            sink: self.sink.clone(),
        };
        let heartbeat = tokio::spawn(heartbeat.run(exited_rx));

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(script.as_bytes()).await {
                debug!(seq, error = %e, "shell stopped reading the script early");
            }
            drop(stdin);
        }

        let code = match child.wait().await {
            Ok(status) => {
                if let Some(signal) = status.signal() {
                    debug!(seq, signal, "shell terminated by signal");
                }
                // Signal deaths are reported as the negated signal number.
                status
                    .code()
                    .or_else(|| status.signal().map(|sig| -sig))
                    .unwrap_or(-1)
            }
            Err(e) => {
                error!(seq, error = %e, "waiting for shell failed");
                -1
            }
        };

        let _ = exited_tx.send(());
        let killed = match heartbeat.await {
            Ok(killed) => killed,
            Err(e) => {
                warn!(seq, error = %e, "heartbeat task failed");
                false
            }
        };

        self.report(seq, &shown, &label, code, killed, start.elapsed())
    }

    fn report(
        &self,
        seq: u64,
        shown: &str,
        label: &str,
        code: i32,
        killed: bool,
        elapsed: Duration,
    ) -> JobOutcome {
        if killed {
            self.sink.status(label);
            self.sink.notify(Notification::killed(shown, elapsed));
            info!(seq, elapsed_ms = elapsed.as_millis() as u64, "script killed");
            return JobOutcome::Killed;
        }

        if code == 0 {
            self.sink.status(label);
            self.sink.notify(Notification::done(shown, elapsed));
            info!(seq, elapsed_ms = elapsed.as_millis() as u64, "script done");
            return JobOutcome::Done;
        }

        self.sink.status(&format!("{label}!"));
        self.sink.notify(Notification::failed(shown, code, elapsed));
        warn!(
            seq,
            exit_code = code,
            elapsed_ms = elapsed.as_millis() as u64,
            "script failed"
        );
        JobOutcome::Failed(code)
    }
}
