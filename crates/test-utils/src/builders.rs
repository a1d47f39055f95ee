#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use efifo::config::{DaemonConfig, Ingress};
use efifo::types::NotifierBackend;

/// Builder for `DaemonConfig` to simplify test setup.
///
/// Defaults differ from production: `sh` instead of `bash -x` (quiet test
/// output), a 50ms polling interval and the log notifier.
pub struct DaemonConfigBuilder {
    config: DaemonConfig,
}

impl DaemonConfigBuilder {
    pub fn socket(path: &Path) -> Self {
        Self::from_ingress(Ingress::Socket(path.to_path_buf()))
    }

    pub fn fifo(path: &Path) -> Self {
        Self::from_ingress(Ingress::Fifo(path.to_path_buf()))
    }

    fn from_ingress(ingress: Ingress) -> Self {
        let mut config = DaemonConfig::new_unchecked(ingress);
        config.shell = vec!["sh".to_string()];
        config.polling_interval = Duration::from_millis(50);
        config.notifier = NotifierBackend::Log;
        Self { config }
    }

    pub fn max_interrupts(mut self, max: u32) -> Self {
        self.config.max_interrupts = max;
        self
    }

    pub fn polling_interval(mut self, interval: Duration) -> Self {
        self.config.polling_interval = interval;
        self
    }

    pub fn shell(mut self, shell: &[&str]) -> Self {
        self.config.shell = shell.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn build(self) -> DaemonConfig {
        self.config
    }
}
