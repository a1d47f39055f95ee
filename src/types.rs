use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::Deserialize;

/// Severity attached to a notification.
///
/// Mirrors the `notify-send -u` levels. `Low` notifications only reach the
/// terminal title; `Normal` and `Critical` also pop up on the desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Urgency {
    Low,
    Normal,
    Critical,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Normal => "normal",
            Urgency::Critical => "critical",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where notifications are delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NotifierBackend {
    /// xterm title, tmux and `notify-send`.
    #[default]
    Desktop,
    /// Only the daemon's own log.
    Log,
}

impl FromStr for NotifierBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "desktop" => Ok(NotifierBackend::Desktop),
            "log" => Ok(NotifierBackend::Log),
            other => Err(format!(
                "invalid notifier backend: {other} (expected \"desktop\" or \"log\")"
            )),
        }
    }
}
