// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::NotifierBackend;

/// Raw configuration as read from a TOML file.
///
/// ```toml
/// [daemon]
/// socket = "/tmp/efifo/socket"
/// max_interrupts = 3
/// polling_interval = "100ms"
/// reset_and_clear = false
/// shell = ["bash", "-x"]
///
/// [notify]
/// backend = "desktop"
/// ```
///
/// All sections are optional. CLI flags and environment variables are layered
/// on top by [`crate::config::resolve`] before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub daemon: DaemonSection,

    #[serde(default)]
    pub notify: NotifySection,
}

/// `[daemon]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DaemonSection {
    /// Unix socket path. Mutually exclusive with `fifo`.
    #[serde(default)]
    pub socket: Option<PathBuf>,

    /// Named pipe path. Mutually exclusive with `socket`.
    #[serde(default)]
    pub fifo: Option<PathBuf>,

    /// Consecutive interrupts (with no completed job in between) before the
    /// daemon shuts down.
    #[serde(default = "default_max_interrupts")]
    pub max_interrupts: u32,

    /// Heartbeat interval and dequeue timeout, e.g. `"100ms"`.
    #[serde(default = "default_polling_interval")]
    pub polling_interval: String,

    /// Run `reset` and `clear` after each interrupt.
    #[serde(default)]
    pub reset_and_clear: bool,

    /// Program and arguments that receive the script on stdin.
    #[serde(default = "default_shell")]
    pub shell: Vec<String>,
}

fn default_max_interrupts() -> u32 {
    3
}

fn default_polling_interval() -> String {
    "100ms".to_string()
}

fn default_shell() -> Vec<String> {
    vec!["bash".to_string(), "-x".to_string()]
}

impl Default for DaemonSection {
    fn default() -> Self {
        Self {
            socket: None,
            fifo: None,
            max_interrupts: default_max_interrupts(),
            polling_interval: default_polling_interval(),
            reset_and_clear: false,
            shell: default_shell(),
        }
    }
}

/// `[notify]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotifySection {
    #[serde(default)]
    pub backend: NotifierBackend,
}

/// Which ingress the daemon serves in this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ingress {
    Socket(PathBuf),
    Fifo(PathBuf),
}

/// Validated, fully resolved daemon configuration.
///
/// Only constructible through `TryFrom<RawConfigFile>` (see `validate.rs`)
/// or [`DaemonConfig::new_unchecked`].
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub ingress: Ingress,
    pub max_interrupts: u32,
    pub polling_interval: Duration,
    pub reset_and_clear: bool,
    pub shell: Vec<String>,
    pub notifier: NotifierBackend,
}

impl DaemonConfig {
    /// Build a config without validation. Intended for tests and embedding.
    pub fn new_unchecked(ingress: Ingress) -> Self {
        Self {
            ingress,
            max_interrupts: default_max_interrupts(),
            polling_interval: Duration::from_millis(100),
            reset_and_clear: false,
            shell: default_shell(),
            notifier: NotifierBackend::default(),
        }
    }
}
