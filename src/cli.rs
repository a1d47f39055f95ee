// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{ArgGroup, Parser, ValueEnum};

use crate::types::NotifierBackend;

/// Command-line arguments for `efifo`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "efifo",
    version,
    about = "Executes arbitrary scripts passed in via a Unix socket or FIFO.",
    long_about = None
)]
#[command(group(ArgGroup::new("ingress").args(["socket", "fifo"])))]
pub struct CliArgs {
    /// Socket file to listen on.
    ///
    /// Falls back to `EFIFO_SOCKET`, then `EFIFO`, then the config file.
    #[arg(long, value_name = "SOCKET")]
    pub socket: Option<String>,

    /// Named pipe to drain instead of listening on a socket.
    #[arg(long, value_name = "FIFO")]
    pub fifo: Option<String>,

    /// Maximum number of interrupts before exiting.
    #[arg(long, value_name = "COUNT")]
    pub max_interrupts: Option<u32>,

    /// Time between health checks, e.g. "100ms" or "1s".
    #[arg(long, value_name = "DURATION")]
    pub polling_interval: Option<String>,

    /// Reset and clear the terminal after a keyboard interrupt.
    #[arg(long)]
    pub reset_and_clear: bool,

    /// Shell used to run scripts (invoked as `<shell> -x`).
    #[arg(long, value_name = "PROGRAM")]
    pub shell: Option<String>,

    /// Where lifecycle notifications go.
    #[arg(long, value_enum, value_name = "BACKEND")]
    pub notifier: Option<NotifierBackend>,

    /// Optional TOML config file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `EFIFO_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
