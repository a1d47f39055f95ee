// tests/daemon_escalation.rs

mod common;

use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use common::builders::DaemonConfigBuilder;
use common::{RecordingSink, TestResult, init_tracing, send_script, wait_until, with_timeout};
use efifo::daemon::Daemon;
use efifo::errors::{EX_CANTCREAT, EfifoError};
use efifo::signals::DaemonSignal;

#[tokio::test]
async fn max_interrupts_with_no_work_stops_the_daemon() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let socket = dir.path().join("efifo.sock");

    let sink = RecordingSink::new();
    let daemon = Daemon::new(
        DaemonConfigBuilder::socket(&socket).max_interrupts(3).build(),
        sink.shared(),
    );
    let interrupts = daemon.interrupts();
    let (signals, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(daemon.run_with_signals(rx));
    wait_until("socket bound", || socket.exists()).await;

    for _ in 0..3 {
        signals.send(DaemonSignal::Interrupt)?;
    }
    with_timeout(handle).await??;

    assert_eq!(interrupts.consecutive(), 3);
    assert_eq!(sink.count_with_prefix("Keyboard Interrupt"), 3);
    assert!(!socket.exists());
    Ok(())
}

#[tokio::test]
async fn completed_job_between_interrupts_keeps_daemon_alive() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let socket = dir.path().join("efifo.sock");

    let sink = RecordingSink::new();
    let daemon = Daemon::new(
        DaemonConfigBuilder::socket(&socket).max_interrupts(2).build(),
        sink.shared(),
    );
    let interrupts = daemon.interrupts();
    let (signals, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(daemon.run_with_signals(rx));
    wait_until("socket bound", || socket.exists()).await;

    signals.send(DaemonSignal::Interrupt)?;
    wait_until("interrupt counted", || interrupts.consecutive() == 1).await;

    send_script(&socket, "true\n").await?;
    wait_until("job done", || sink.count_with_prefix("DONE:") == 1).await;
    assert_eq!(interrupts.consecutive(), 0);

    signals.send(DaemonSignal::Interrupt)?;
    wait_until("interrupt counted", || interrupts.consecutive() == 1).await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!handle.is_finished(), "one interrupt after a reset must not stop the daemon");

    signals.send(DaemonSignal::Interrupt)?;
    with_timeout(handle).await??;
    Ok(())
}

#[tokio::test]
async fn interrupt_kills_job_and_killed_job_does_not_reset() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let socket = dir.path().join("efifo.sock");

    let sink = RecordingSink::new();
    let daemon = Daemon::new(
        DaemonConfigBuilder::socket(&socket).max_interrupts(2).build(),
        sink.shared(),
    );
    let interrupts = daemon.interrupts();
    let (signals, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(daemon.run_with_signals(rx));
    wait_until("socket bound", || socket.exists()).await;

    send_script(&socket, "sleep 100\n").await?;
    wait_until("job running", || sink.count_with_prefix("Running: sleep 100 0s") > 0).await;

    signals.send(DaemonSignal::Interrupt)?;
    wait_until("job killed", || sink.count_with_prefix("KILLED: sleep 100") == 1).await;
    assert_eq!(interrupts.consecutive(), 1);
    assert!(!handle.is_finished());

    signals.send(DaemonSignal::Interrupt)?;
    with_timeout(handle).await??;
    assert_eq!(interrupts.consecutive(), 2);
    Ok(())
}

#[tokio::test]
async fn terminate_kills_running_job_and_stops() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let socket = dir.path().join("efifo.sock");

    let sink = RecordingSink::new();
    let daemon = Daemon::new(DaemonConfigBuilder::socket(&socket).build(), sink.shared());
    let shutdown = daemon.shutdown_handle();
    let (signals, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(daemon.run_with_signals(rx));
    wait_until("socket bound", || socket.exists()).await;

    send_script(&socket, "sleep 100\n").await?;
    wait_until("job running", || sink.count_with_prefix("Running: sleep 100 0s") > 0).await;

    let asked = Instant::now();
    signals.send(DaemonSignal::Terminate)?;
    with_timeout(handle).await??;

    assert!(asked.elapsed() < Duration::from_secs(3));
    assert!(shutdown.is_triggered());
    assert_eq!(sink.count_with_prefix("KILLED: sleep 100"), 1);
    Ok(())
}

#[tokio::test]
async fn interrupt_while_shutting_down_aborts_with_cantcreat() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let socket = dir.path().join("efifo.sock");

    // A long interval keeps the SIGTERM-ignoring script alive for seconds
    // after shutdown starts, until the SIGKILL escalation.
    let sink = RecordingSink::new();
    let daemon = Daemon::new(
        DaemonConfigBuilder::socket(&socket)
            .polling_interval(Duration::from_secs(2))
            .build(),
        sink.shared(),
    );
    let (signals, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(daemon.run_with_signals(rx));
    wait_until("socket bound", || socket.exists()).await;

    send_script(&socket, "trap '' TERM\nsleep 5\n").await?;
    wait_until("job running", || sink.count_with_prefix("Running: trap '' TERM; sleep 5 0s") > 0).await;

    let asked = Instant::now();
    signals.send(DaemonSignal::Terminate)?;
    signals.send(DaemonSignal::Interrupt)?;

    let err = with_timeout(handle)
        .await?
        .expect_err("interrupt during shutdown must fail");

    assert!(matches!(err, EfifoError::InterruptedDuringShutdown));
    assert_eq!(err.exit_code(), EX_CANTCREAT);
    assert!(asked.elapsed() < Duration::from_secs(2));
    Ok(())
}

#[tokio::test]
async fn unwritable_parent_is_a_startup_fault() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"")?;
    let socket = blocker.join("efifo.sock");

    let sink = RecordingSink::new();
    let daemon = Daemon::new(DaemonConfigBuilder::socket(&socket).build(), sink.shared());
    let (_signals, rx) = mpsc::unbounded_channel();

    let err = with_timeout(daemon.run_with_signals(rx))
        .await
        .expect_err("parent cannot be created");

    assert!(matches!(err, EfifoError::CreatePath { .. }));
    assert_eq!(err.exit_code(), EX_CANTCREAT);
    Ok(())
}
