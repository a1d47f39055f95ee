// src/daemon.rs

//! Composition root: wires ingress, executor, notifications and signals,
//! and owns the escalation and shutdown policy.

use std::process::Stdio;

use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::{DaemonConfig, Ingress};
use crate::engine::{InterruptController, SharedInterrupts, Shutdown, job_queue};
use crate::errors::{EfifoError, Result};
use crate::exec::Executor;
use crate::ingress::{
    ConnectionAcceptor, FifoLock, FifoLoop, ensure_fifo, lock_path, prepare_socket,
};
use crate::notify::{Notification, SharedSink};
use crate::signals::{DaemonSignal, forward_os_signals};

/// The running daemon.
pub struct Daemon {
    config: DaemonConfig,
    sink: SharedSink,
    interrupts: SharedInterrupts,
    shutdown: Shutdown,
}

/// Background tasks started for one ingress.
struct Services {
    ingress: JoinHandle<Result<()>>,
    executor: Option<JoinHandle<u64>>,
}

impl Services {
    /// Wait for every task to stop. `ingress_joined` tells whether the
    /// ingress handle was already awaited.
    async fn join(mut self, ingress_joined: bool) -> Result<()> {
        let ingress = if ingress_joined {
            Ok(())
        } else {
            flatten(self.ingress.await)
        };

        if let Some(executor) = self.executor.take() {
            match executor.await {
                Ok(executions) => debug!(executions, "executor stopped"),
                Err(e) if e.is_cancelled() => debug!("executor aborted"),
                Err(e) => warn!(error = %e, "executor task failed"),
            }
        }

        ingress
    }
}

impl Daemon {
    pub fn new(config: DaemonConfig, sink: SharedSink) -> Self {
        let interrupts = InterruptController::shared(config.max_interrupts);
        Self {
            config,
            sink,
            interrupts,
            shutdown: Shutdown::new(),
        }
    }

    pub fn interrupts(&self) -> SharedInterrupts {
        self.interrupts.clone()
    }

    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Run with the process's real signals.
    pub async fn run(self) -> Result<()> {
        let signals = forward_os_signals()?;
        self.run_with_signals(signals).await
    }

    /// Run until escalation, termination or an ingress failure.
    ///
    /// Startup faults are returned before anything is served. An interrupt
    /// that arrives while shutting down yields
    /// [`EfifoError::InterruptedDuringShutdown`].
    pub async fn run_with_signals(
        self,
        mut signals: mpsc::UnboundedReceiver<DaemonSignal>,
    ) -> Result<()> {
        let mut services = self.start()?;

        self.sink.notify(Notification::waiting());
        self.sink.status("x");

        let mut signals_open = true;
        let mut ingress_joined = false;
        let served = loop {
            tokio::select! {
                sig = signals.recv(), if signals_open => match sig {
                    Some(DaemonSignal::Interrupt) => {
                        self.on_interrupt().await;
                        if self.interrupts.exhausted() {
                            info!(
                                max = self.interrupts.max(),
                                "maximum consecutive interrupts reached; shutting down"
                            );
                            break Ok(());
                        }
                    }
                    Some(DaemonSignal::Terminate) => {
                        info!("termination requested; shutting down");
                        self.interrupts.request_cancel();
                        break Ok(());
                    }
                    None => signals_open = false,
                },
                joined = &mut services.ingress => {
                    ingress_joined = true;
                    break flatten(joined);
                }
            }
        };

        self.shutdown.trigger();
        debug!("shutdown triggered; waiting for workers");

        let ingress_abort = services.ingress.abort_handle();
        let executor_abort = services.executor.as_ref().map(|h| h.abort_handle());

        let stopped = services.join(ingress_joined);
        tokio::pin!(stopped);

        let mut interrupted = false;
        let stopped = loop {
            tokio::select! {
                res = &mut stopped => break res,
                sig = signals.recv(), if signals_open => match sig {
                    Some(DaemonSignal::Interrupt) if !interrupted => {
                        error!("KeyboardInterrupt while shutting down");
                        interrupted = true;
                        self.interrupts.request_cancel();
                        ingress_abort.abort();
                        if let Some(handle) = &executor_abort {
                            handle.abort();
                        }
                    }
                    Some(sig) => debug!(?sig, "already shutting down"),
                    None => signals_open = false,
                },
            }
        };

        if interrupted {
            return Err(EfifoError::InterruptedDuringShutdown);
        }
        served.and(stopped)
    }

    /// Prepare the ingress and spawn the workers.
    fn start(&self) -> Result<Services> {
        match &self.config.ingress {
            Ingress::Socket(path) => {
                let listener = prepare_socket(path)?;
                let (jobs, queue) = job_queue();

                let executor =
                    Executor::new(&self.config, self.interrupts.clone(), self.sink.clone());
                let executor = tokio::spawn(executor.run(queue, self.shutdown.clone()));

                let acceptor = ConnectionAcceptor::new(listener, jobs, self.shutdown.clone());
                let ingress = tokio::spawn(acceptor.run());

                Ok(Services {
                    ingress,
                    executor: Some(executor),
                })
            }
            Ingress::Fifo(path) => {
                ensure_fifo(path)?;
                let lock = FifoLock::open(&lock_path(path))?;

                let executor =
                    Executor::new(&self.config, self.interrupts.clone(), self.sink.clone());
                let fifo_loop = FifoLoop::new(
                    path.clone(),
                    executor,
                    self.shutdown.clone(),
                    self.config.polling_interval,
                );
                let shutdown = self.shutdown.clone();
                let interval = self.config.polling_interval;

                let ingress = tokio::spawn(async move {
                    if !lock.acquire(interval, &shutdown).await? {
                        return Ok(());
                    }
                    fifo_loop.run(lock).await
                });

                Ok(Services {
                    ingress,
                    executor: None,
                })
            }
        }
    }

    /// Count an interrupt, kill the running job and tell the operator.
    async fn on_interrupt(&self) {
        let count = self.interrupts.record_interrupt();
        self.sink.notify(Notification::interrupted());

        if self.config.reset_and_clear {
            reset_terminal().await;
        }

        warn!(
            "Keyboard Interrupt ({} of {})",
            count,
            self.interrupts.max()
        );
    }
}

fn flatten(joined: std::result::Result<Result<()>, tokio::task::JoinError>) -> Result<()> {
    match joined {
        Ok(res) => res,
        Err(e) if e.is_cancelled() => Ok(()),
        Err(e) => Err(EfifoError::Other(anyhow::anyhow!("ingress task failed: {e}"))),
    }
}

async fn reset_terminal() {
    for program in ["reset", "clear"] {
        let status = Command::new(program)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::null())
            .status()
            .await;
        if let Err(e) = status {
            debug!(program, error = %e, "terminal reset failed");
        }
    }
}
