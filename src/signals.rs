// src/signals.rs

//! OS signal forwarding.
//!
//! SIGINT is an *interrupt* (counted towards escalation, kills the running
//! job); SIGTERM and SIGQUIT ask for an orderly shutdown straight away.

use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::mpsc;
use tracing::debug;

/// Signal as seen by the daemon's run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonSignal {
    Interrupt,
    Terminate,
}

/// Install handlers and forward every delivery into a channel.
///
/// Handlers are installed before this returns, so a signal arriving right
/// after startup is not lost.
pub fn forward_os_signals() -> std::io::Result<mpsc::UnboundedReceiver<DaemonSignal>> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            let sig = tokio::select! {
                Some(()) = sigint.recv() => DaemonSignal::Interrupt,
                Some(()) = sigterm.recv() => DaemonSignal::Terminate,
                Some(()) = sigquit.recv() => DaemonSignal::Terminate,
                else => break,
            };
            debug!(?sig, "signal received");
            if tx.send(sig).is_err() {
                break;
            }
        }
    });

    Ok(rx)
}
