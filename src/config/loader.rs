// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::CliArgs;
use crate::config::model::{DaemonConfig, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] or [`resolve`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it on its own, with no
/// CLI or environment overrides.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<DaemonConfig> {
    let raw_config = load_from_path(&path)?;
    let config = DaemonConfig::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the effective configuration for this run.
///
/// Precedence, highest first: CLI flags, environment (`EFIFO_SOCKET`, then
/// `EFIFO`), the `--config` file, built-in defaults.
pub fn resolve(args: &CliArgs) -> Result<DaemonConfig> {
    resolve_with_env(args, |key| std::env::var(key).ok())
}

/// Same as [`resolve`] but with an injectable environment lookup.
pub fn resolve_with_env<F>(args: &CliArgs, env: F) -> Result<DaemonConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut raw = match &args.config {
        Some(path) => load_from_path(path)?,
        None => RawConfigFile::default(),
    };

    // An explicit --fifo wins over any socket coming from env or file, and
    // vice versa, so the two never collide by accident.
    if let Some(fifo) = &args.fifo {
        raw.daemon.fifo = Some(PathBuf::from(fifo));
        raw.daemon.socket = None;
    } else if let Some(socket) = &args.socket {
        raw.daemon.socket = Some(PathBuf::from(socket));
        raw.daemon.fifo = None;
    } else if let Some(socket) = env("EFIFO_SOCKET")
        .or_else(|| env("EFIFO"))
        .filter(|s| !s.is_empty())
    {
        raw.daemon.socket = Some(PathBuf::from(socket));
        raw.daemon.fifo = None;
    }

    if let Some(max) = args.max_interrupts {
        raw.daemon.max_interrupts = max;
    }
    if let Some(interval) = &args.polling_interval {
        raw.daemon.polling_interval = interval.clone();
    }
    if args.reset_and_clear {
        raw.daemon.reset_and_clear = true;
    }
    if let Some(shell) = &args.shell {
        raw.daemon.shell = vec![shell.clone(), "-x".to_string()];
    }
    if let Some(backend) = args.notifier {
        raw.notify.backend = backend;
    }

    DaemonConfig::try_from(raw)
}
