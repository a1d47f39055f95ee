// src/lib.rs

pub mod cli;
pub mod config;
pub mod daemon;
pub mod digest;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod ingress;
pub mod logging;
pub mod notify;
pub mod signals;
pub mod types;

use tracing::debug;

use crate::cli::CliArgs;
use crate::daemon::Daemon;
use crate::errors::Result;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config resolution (CLI, environment, optional TOML file)
/// - the notification sink
/// - the daemon (ingress, executor, signal handling)
pub async fn run(args: CliArgs) -> Result<()> {
    let config = config::resolve(&args)?;
    debug!(?config, "resolved configuration");

    let sink = notify::sink_for(config.notifier);
    Daemon::new(config, sink).run().await
}
