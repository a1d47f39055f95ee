// src/notify/mod.rs

//! Lifecycle notifications for the operator.
//!
//! The engine talks to a [`NotificationSink`] instead of spawning
//! `notify-send` itself, so tests can record notifications and headless runs
//! can route them to the log.
//!
//! - [`desktop`] writes the xterm title, talks to tmux and calls
//!   `notify-send`.
//! - [`log`] emits everything through `tracing`.
//!
//! Delivery is best-effort: a sink never returns an error and never blocks
//! the caller on an external process.

use std::sync::Arc;
use std::time::Duration;

use crate::types::{NotifierBackend, Urgency};

pub mod desktop;
pub mod log;

pub use desktop::DesktopSink;
pub use log::LogSink;

/// Default expiry for transient notifications.
pub const DEFAULT_EXPIRE: Duration = Duration::from_millis(2000);

/// One lifecycle event, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub text: String,
    pub urgency: Urgency,
    pub category: &'static str,
    pub expire: Duration,
}

impl Notification {
    pub fn new(text: impl Into<String>, urgency: Urgency) -> Self {
        Self {
            text: text.into(),
            urgency,
            category: "",
            expire: DEFAULT_EXPIRE,
        }
    }

    pub fn category(mut self, category: &'static str) -> Self {
        self.category = category;
        self
    }

    pub fn expire(mut self, expire: Duration) -> Self {
        self.expire = expire;
        self
    }

    /// Startup notification before any work arrives.
    pub fn waiting() -> Self {
        Self::new("Waiting", Urgency::Low).category("waiting")
    }

    /// An interrupt signal was observed.
    pub fn interrupted() -> Self {
        Self::new("Keyboard Interrupt", Urgency::Low).category("interrupt")
    }

    pub fn running(display: &str, seq: u64) -> Self {
        Self::new(format!("Running: {display} [{seq}]"), Urgency::Low)
    }

    pub fn heartbeat(display: &str, elapsed: Duration, seq: u64) -> Self {
        Self::new(
            format!("Running: {display} {}s [{seq}]", elapsed.as_secs()),
            Urgency::Low,
        )
    }

    pub fn done(display: &str, elapsed: Duration) -> Self {
        Self::new(
            format!("DONE: {display} [0] {:.2}s", elapsed.as_secs_f64()),
            Urgency::Normal,
        )
        .category("done")
        .expire(Duration::from_secs(15))
    }

    pub fn failed(display: &str, code: i32, elapsed: Duration) -> Self {
        Self::new(
            format!("FAILED: {display} [{code}] {:.2}s", elapsed.as_secs_f64()),
            Urgency::Critical,
        )
        .category("failed")
        .expire(Duration::from_secs(60))
    }

    pub fn killed(display: &str, elapsed: Duration) -> Self {
        Self::new(
            format!("KILLED: {display} {:.2}s", elapsed.as_secs_f64()),
            Urgency::Normal,
        )
        .category("done")
        .expire(Duration::from_secs(15))
    }
}

/// Receiver of lifecycle notifications.
pub trait NotificationSink: Send + Sync {
    /// Deliver one notification. Must not block and must not panic.
    fn notify(&self, notification: Notification);

    /// Update the short status label (tmux window name). No-op by default.
    fn status(&self, _label: &str) {}
}

/// Shared handle used by the engine.
pub type SharedSink = Arc<dyn NotificationSink>;

/// Build the sink selected in the configuration.
pub fn sink_for(backend: NotifierBackend) -> SharedSink {
    match backend {
        NotifierBackend::Desktop => Arc::new(DesktopSink::from_env()),
        NotifierBackend::Log => Arc::new(LogSink),
    }
}
