// src/notify/log.rs

use tracing::{info, warn};

use super::{Notification, NotificationSink};
use crate::types::Urgency;

/// Sink that only writes to the daemon's log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, n: Notification) {
        match n.urgency {
            Urgency::Critical => warn!(category = n.category, "{}", n.text),
            Urgency::Normal => info!(category = n.category, "{}", n.text),
            Urgency::Low => tracing::debug!(category = n.category, "{}", n.text),
        }
    }

    fn status(&self, label: &str) {
        tracing::trace!(label, "status");
    }
}
