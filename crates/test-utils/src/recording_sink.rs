use std::sync::{Arc, Mutex};

use efifo::notify::{Notification, NotificationSink, SharedSink};
use efifo::types::Urgency;

/// A sink that remembers every notification and status label.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    notifications: Arc<Mutex<Vec<Notification>>>,
    statuses: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(&self) -> SharedSink {
        Arc::new(self.clone())
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.notifications().into_iter().map(|n| n.text).collect()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.statuses.lock().unwrap().clone()
    }

    /// Notifications whose text starts with `prefix` (e.g. `"DONE:"`).
    pub fn with_prefix(&self, prefix: &str) -> Vec<Notification> {
        self.notifications()
            .into_iter()
            .filter(|n| n.text.starts_with(prefix))
            .collect()
    }

    pub fn count_with_prefix(&self, prefix: &str) -> usize {
        self.with_prefix(prefix).len()
    }

    /// Outcome notifications (DONE/FAILED/KILLED), in order.
    pub fn outcomes(&self) -> Vec<Notification> {
        self.notifications()
            .into_iter()
            .filter(|n| n.urgency >= Urgency::Normal)
            .collect()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }

    fn status(&self, label: &str) {
        self.statuses.lock().unwrap().push(label.to_string());
    }
}
