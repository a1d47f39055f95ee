// tests/executor_behaviour.rs

mod common;

use std::time::{Duration, Instant};

use common::{RecordingSink, TestResult, init_tracing, wait_until, with_timeout};
use efifo::engine::{InterruptController, JobOutcome, SharedInterrupts};
use efifo::exec::Executor;
use efifo::types::Urgency;

const INTERVAL: Duration = Duration::from_millis(50);

fn executor(max_interrupts: u32) -> (Executor, SharedInterrupts, RecordingSink) {
    let sink = RecordingSink::new();
    let interrupts = InterruptController::shared(max_interrupts);
    let exec = Executor::with_shell(
        vec!["sh".to_string()],
        INTERVAL,
        interrupts.clone(),
        sink.shared(),
    );
    (exec, interrupts, sink)
}

#[tokio::test]
async fn successful_script_reports_done() -> TestResult {
    init_tracing();
    let (mut exec, _interrupts, sink) = executor(3);

    let outcome = with_timeout(exec.run_job("cd /tmp\ntrue; echo hi >/dev/null")).await;

    assert_eq!(outcome, JobOutcome::Done);
    assert_eq!(exec.executions(), 1);

    let texts = sink.texts();
    assert_eq!(texts[0], "Running: true; echo hi >/dev/null [1]");

    let outcomes = sink.outcomes();
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].text.starts_with("DONE: true; echo hi >/dev/null [0] "));
    assert_eq!(outcomes[0].urgency, Urgency::Normal);
    assert_eq!(outcomes[0].category, "done");
    assert_eq!(outcomes[0].expire, Duration::from_secs(15));

    assert_eq!(sink.statuses(), vec!["true..".to_string(), "true".to_string()]);
    Ok(())
}

#[tokio::test]
async fn non_zero_exit_reports_failed_with_code() -> TestResult {
    init_tracing();
    let (mut exec, _interrupts, sink) = executor(3);

    let outcome = with_timeout(exec.run_job("exit 3")).await;

    assert_eq!(outcome, JobOutcome::Failed(3));
    let failed = sink.with_prefix("FAILED:");
    assert_eq!(failed.len(), 1);
    assert!(failed[0].text.starts_with("FAILED: exit 3 [3] "));
    assert_eq!(failed[0].urgency, Urgency::Critical);
    assert_eq!(failed[0].category, "failed");
    assert_eq!(sink.statuses().last().map(String::as_str), Some("exit!"));
    Ok(())
}

#[tokio::test]
async fn failure_resets_interrupt_counter() -> TestResult {
    init_tracing();
    let (mut exec, interrupts, _sink) = executor(3);
    interrupts.record_interrupt();
    interrupts.record_interrupt();

    let outcome = with_timeout(exec.run_job("false")).await;

    assert_eq!(outcome, JobOutcome::Failed(1));
    assert_eq!(interrupts.consecutive(), 0);
    Ok(())
}

#[tokio::test]
async fn cancellation_kills_running_script_promptly() -> TestResult {
    init_tracing();
    let (exec, interrupts, sink) = executor(3);

    let job = tokio::spawn(async move {
        let mut exec = exec;
        let outcome = exec.run_job("sleep 100").await;
        (exec, outcome)
    });

    wait_until("heartbeat emitted", || sink.count_with_prefix("Running: sleep 100 0s") > 0).await;

    let asked = Instant::now();
    assert_eq!(interrupts.record_interrupt(), 1);
    let (mut exec, outcome) = with_timeout(job).await?;

    assert_eq!(outcome, JobOutcome::Killed);
    assert!(asked.elapsed() < Duration::from_secs(2));
    assert_eq!(interrupts.consecutive(), 1, "a kill does not reset the counter");

    let killed = sink.with_prefix("KILLED:");
    assert_eq!(killed.len(), 1);
    assert!(killed[0].text.starts_with("KILLED: sleep 100 "));
    assert_eq!(sink.count_with_prefix("DONE:"), 0);

    // The next job starts with the cancel flag lowered and runs normally.
    let next = with_timeout(exec.run_job("true")).await;
    assert_eq!(next, JobOutcome::Done);
    assert_eq!(exec.executions(), 2);
    assert_eq!(interrupts.consecutive(), 0);
    Ok(())
}

#[tokio::test]
async fn stale_cancel_does_not_kill_next_job() -> TestResult {
    init_tracing();
    let (mut exec, interrupts, sink) = executor(3);

    interrupts.record_interrupt();
    assert!(interrupts.cancel_requested());

    let outcome = with_timeout(exec.run_job("sleep 0.2")).await;

    assert_eq!(outcome, JobOutcome::Done);
    assert_eq!(sink.count_with_prefix("KILLED:"), 0);
    Ok(())
}

#[tokio::test]
async fn heartbeats_carry_elapsed_seconds_and_sequence() -> TestResult {
    init_tracing();
    let (mut exec, _interrupts, sink) = executor(3);

    with_timeout(exec.run_job("true")).await;
    with_timeout(exec.run_job("sleep 0.2")).await;

    let beats = sink.with_prefix("Running: sleep 0.2 0s [2]");
    assert!(!beats.is_empty());
    assert!(beats.iter().all(|n| n.urgency == Urgency::Low));
    Ok(())
}

#[tokio::test]
async fn missing_shell_is_reported_as_failure() -> TestResult {
    init_tracing();
    let sink = RecordingSink::new();
    let interrupts = InterruptController::shared(3);
    let mut exec = Executor::with_shell(
        vec!["/nonexistent/efifo-shell".to_string()],
        INTERVAL,
        interrupts.clone(),
        sink.shared(),
    );

    let outcome = with_timeout(exec.run_job("echo hi")).await;

    assert_eq!(outcome, JobOutcome::Failed(-1));
    assert!(sink.with_prefix("FAILED: echo hi [-1] ").len() == 1);
    Ok(())
}

#[tokio::test]
async fn script_ignoring_sigterm_is_killed_anyway() -> TestResult {
    init_tracing();
    let (exec, interrupts, sink) = executor(3);

    let job = tokio::spawn(async move {
        let mut exec = exec;
        exec.run_job("trap '' TERM\nsleep 30\n").await
    });

    wait_until("heartbeat emitted", || {
        sink.count_with_prefix("Running: trap '' TERM; sleep 30 0s") > 0
    })
    .await;

    let asked = Instant::now();
    interrupts.record_interrupt();
    let outcome = with_timeout(job).await?;

    assert_eq!(outcome, JobOutcome::Killed);
    assert!(
        asked.elapsed() < Duration::from_secs(2),
        "escalation took {:?}",
        asked.elapsed()
    );
    assert_eq!(sink.count_with_prefix("KILLED:"), 1);
    Ok(())
}

#[tokio::test]
async fn signal_death_reports_negated_signal_number() -> TestResult {
    init_tracing();
    let (mut exec, interrupts, sink) = executor(3);
    interrupts.record_interrupt();

    let outcome = with_timeout(exec.run_job("kill -9 $$")).await;

    assert_eq!(outcome, JobOutcome::Failed(-9));
    assert_eq!(sink.with_prefix("FAILED: kill -9 $$ [-9] ").len(), 1);
    assert_eq!(interrupts.consecutive(), 0, "a signal death still completes");
    Ok(())
}
