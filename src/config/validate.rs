// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{DaemonConfig, Ingress, RawConfigFile};
use crate::errors::{EfifoError, Result};

impl TryFrom<RawConfigFile> for DaemonConfig {
    type Error = crate::errors::EfifoError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let ingress = validate_ingress(&raw)?;
        validate_max_interrupts(&raw)?;
        let polling_interval = validate_polling_interval(&raw)?;
        validate_shell(&raw)?;

        Ok(DaemonConfig {
            ingress,
            max_interrupts: raw.daemon.max_interrupts,
            polling_interval,
            reset_and_clear: raw.daemon.reset_and_clear,
            shell: raw.daemon.shell,
            notifier: raw.notify.backend,
        })
    }
}

fn validate_ingress(cfg: &RawConfigFile) -> Result<Ingress> {
    match (&cfg.daemon.socket, &cfg.daemon.fifo) {
        (Some(_), Some(_)) => Err(EfifoError::ConfigError(
            "--socket and --fifo are mutually exclusive".to_string(),
        )),
        (None, None) => Err(EfifoError::ConfigError(
            "--socket file required (or --fifo)".to_string(),
        )),
        (Some(socket), None) if socket.as_os_str().is_empty() => Err(
            EfifoError::ConfigError("socket path must not be empty".to_string()),
        ),
        (None, Some(fifo)) if fifo.as_os_str().is_empty() => Err(EfifoError::ConfigError(
            "fifo path must not be empty".to_string(),
        )),
        (Some(socket), None) => Ok(Ingress::Socket(socket.clone())),
        (None, Some(fifo)) => Ok(Ingress::Fifo(fifo.clone())),
    }
}

fn validate_max_interrupts(cfg: &RawConfigFile) -> Result<()> {
    if cfg.daemon.max_interrupts == 0 {
        return Err(EfifoError::ConfigError(
            "[daemon].max_interrupts must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_polling_interval(cfg: &RawConfigFile) -> Result<Duration> {
    let interval = parse_duration(&cfg.daemon.polling_interval).map_err(|e| {
        EfifoError::ConfigError(format!("[daemon].polling_interval: {e}"))
    })?;
    if interval.is_zero() {
        return Err(EfifoError::ConfigError(
            "[daemon].polling_interval must be greater than zero".to_string(),
        ));
    }
    Ok(interval)
}

fn validate_shell(cfg: &RawConfigFile) -> Result<()> {
    match cfg.daemon.shell.first() {
        Some(program) if !program.trim().is_empty() => Ok(()),
        _ => Err(EfifoError::ConfigError(
            "[daemon].shell must name a program".to_string(),
        )),
    }
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{s}' is too large"))
}
