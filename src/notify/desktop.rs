// src/notify/desktop.rs

//! Notifications for an interactive desktop session.
//!
//! - inside tmux: critical messages go to `tmux display-message`, and the
//!   short status renames the current window;
//! - in an xterm-like terminal: every message replaces the window title;
//! - normal and critical messages also go to `notify-send`.

use std::io::Write;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use super::{Notification, NotificationSink};
use crate::types::Urgency;

const APP_NAME: &str = "efifo";

/// Desktop/terminal sink. Environment is captured once at construction.
#[derive(Debug, Clone, Default)]
pub struct DesktopSink {
    tmux: bool,
    tmux_pane: Option<String>,
    xterm: bool,
}

impl DesktopSink {
    pub fn from_env() -> Self {
        let tmux = std::env::var_os("TMUX").is_some_and(|v| !v.is_empty());
        let xterm = std::env::var("TERM").is_ok_and(|t| t.starts_with("xterm"));
        Self {
            tmux,
            tmux_pane: std::env::var("TMUX_PANE").ok(),
            xterm,
        }
    }

    fn set_title(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "\x1B]0;{APP_NAME}: {text}\x07");
        let _ = out.flush();
    }
}

impl NotificationSink for DesktopSink {
    fn notify(&self, n: Notification) {
        if self.tmux {
            if n.urgency == Urgency::Critical {
                spawn_detached("tmux", &["display-message", &format!(" {}", n.text)]);
            }
        } else if self.xterm {
            self.set_title(&n.text);
        }

        if n.urgency >= Urgency::Normal {
            let expire_ms = n.expire.as_millis().to_string();
            spawn_detached(
                "notify-send",
                &[
                    "-u",
                    n.urgency.as_str(),
                    "-c",
                    n.category,
                    "-t",
                    &expire_ms,
                    &format!("{APP_NAME}: {}", n.text),
                ],
            );
        }
    }

    fn status(&self, label: &str) {
        if !self.tmux {
            return;
        }
        let pane = self.tmux_pane.as_deref().unwrap_or("");
        spawn_detached("tmux", &["rename-window", "-t", pane, label]);
    }
}

/// Fire-and-forget an external helper. Failures are logged and dropped.
fn spawn_detached(program: &str, args: &[&str]) {
    if tokio::runtime::Handle::try_current().is_err() {
        debug!(program, "no runtime available; skipping notification helper");
        return;
    }

    let spawned = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    match spawned {
        Ok(mut child) => {
            tokio::spawn(async move {
                let _ = child.wait().await;
            });
        }
        Err(e) => debug!(program, error = %e, "notification helper failed to start"),
    }
}
