// src/logging.rs

//! Daemon log output.
//!
//! The daemon shares its terminal with the scripts it runs: their stdout,
//! stderr and `bash -x` trace go straight to the same tty. Log lines
//! therefore go to stderr without targets or thread names, so they read as
//! short annotations between script output.
//!
//! `--log-level` wins over `EFIFO_LOG`. `EFIFO_LOG` takes full
//! `tracing_subscriber` filter directives (`"debug"`, `"efifo::exec=trace"`).
//! With neither set the daemon logs at `info`.

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "EFIFO_LOG";

/// Install the global subscriber. Call once, before the daemon starts.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(level) => EnvFilter::default().add_directive(level_filter(level).into()),
        None => EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .with_env_var(LOG_ENV)
            .from_env_lossy(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))
}

fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    }
}
