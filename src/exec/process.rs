// src/exec/process.rs

//! Shell process spawning and termination.

use std::process::Stdio;

use anyhow::{Context, Result, bail};
use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;
use tokio::process::{Child, Command};

/// Spawn the configured shell with the script to be fed on stdin.
///
/// The child gets its own process group so that terminating it also takes
/// down whatever the script started in the foreground, and so a Ctrl-C on
/// the daemon's terminal reaches only the daemon. Stdout and stderr are
/// inherited.
pub fn spawn_shell(shell: &[String]) -> Result<Child> {
    let Some((program, args)) = shell.split_first() else {
        bail!("no shell configured");
    };

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .process_group(0)
        .kill_on_drop(true);

    cmd.spawn()
        .with_context(|| format!("spawning shell '{}'", shell.join(" ")))
}

/// Send SIGTERM to the process group led by `pid`.
pub fn terminate_group(pid: u32) -> Result<()> {
    signal_group(pid, Signal::SIGTERM)
}

/// Send SIGKILL to the process group led by `pid`.
pub fn kill_group(pid: u32) -> Result<()> {
    signal_group(pid, Signal::SIGKILL)
}

fn signal_group(pid: u32, signal: Signal) -> Result<()> {
    let raw = i32::try_from(pid).with_context(|| format!("pid {pid} out of range"))?;
    killpg(Pid::from_raw(raw), signal)
        .with_context(|| format!("sending {signal} to process group {pid}"))?;
    Ok(())
}
