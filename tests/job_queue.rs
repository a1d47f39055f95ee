// tests/job_queue.rs

mod common;

use std::collections::HashSet;
use std::time::{Duration, Instant};

use proptest::prelude::*;

use common::{TestResult, init_tracing, with_timeout};
use efifo::engine::job_queue;
use efifo::errors::EfifoError;

#[tokio::test]
async fn jobs_come_out_in_arrival_order() -> TestResult {
    init_tracing();
    let (jobs, mut queue) = job_queue();

    for script in ["first", "second", "third"] {
        jobs.enqueue(script.to_string())?;
    }
    assert_eq!(queue.len(), 3);

    let mut seen = Vec::new();
    while let Some(job) = queue.dequeue(Duration::from_millis(20)).await {
        seen.push((job.seq, job.script));
    }

    assert_eq!(
        seen,
        vec![
            (1, "first".to_string()),
            (2, "second".to_string()),
            (3, "third".to_string()),
        ]
    );
    assert!(queue.is_empty());
    Ok(())
}

#[tokio::test]
async fn dequeue_times_out_on_empty_queue() -> TestResult {
    init_tracing();
    let (_jobs, mut queue) = job_queue();

    let started = Instant::now();
    let job = queue.dequeue(Duration::from_millis(50)).await;

    assert!(job.is_none());
    assert!(started.elapsed() >= Duration::from_millis(45));
    Ok(())
}

#[tokio::test]
async fn waiting_consumer_wakes_on_enqueue() -> TestResult {
    init_tracing();
    let (jobs, mut queue) = job_queue();

    let consumer = tokio::spawn(async move { queue.dequeue(Duration::from_secs(5)).await });
    tokio::time::sleep(Duration::from_millis(20)).await;
    jobs.enqueue("echo late".to_string())?;

    let job = with_timeout(consumer).await?.expect("job delivered");
    assert_eq!(job.script, "echo late");
    Ok(())
}

#[tokio::test]
async fn concurrent_senders_neither_drop_nor_duplicate() -> TestResult {
    init_tracing();
    let (jobs, mut queue) = job_queue();

    let mut producers = Vec::new();
    for producer in 0..8 {
        let jobs = jobs.clone();
        producers.push(tokio::spawn(async move {
            for i in 0..25 {
                jobs.enqueue(format!("{producer}-{i}")).unwrap();
                tokio::task::yield_now().await;
            }
        }));
    }
    for p in producers {
        p.await?;
    }

    let drained = queue.drain();
    assert_eq!(drained.len(), 200);

    let seqs: Vec<u64> = drained.iter().map(|j| j.seq).collect();
    assert_eq!(seqs, (1..=200).collect::<Vec<_>>());

    let scripts: HashSet<&str> = drained.iter().map(|j| j.script.as_str()).collect();
    assert_eq!(scripts.len(), 200);
    Ok(())
}

#[tokio::test]
async fn enqueue_fails_once_queue_is_gone() -> TestResult {
    init_tracing();
    let (jobs, queue) = job_queue();
    drop(queue);

    assert!(matches!(
        jobs.enqueue("echo".to_string()),
        Err(EfifoError::QueueClosed)
    ));
    Ok(())
}

#[tokio::test]
async fn first_poll_after_last_sender_drops_waits_out_timeout() -> TestResult {
    init_tracing();
    let (jobs, mut queue) = job_queue();
    drop(jobs);

    let started = Instant::now();
    assert!(queue.dequeue(Duration::from_millis(60)).await.is_none());
    assert!(started.elapsed() >= Duration::from_millis(55));
    Ok(())
}

#[tokio::test]
async fn closed_queue_still_waits_before_returning_none() -> TestResult {
    init_tracing();
    let (jobs, mut queue) = job_queue();
    jobs.enqueue("last".to_string())?;
    drop(jobs);

    assert_eq!(
        queue.dequeue(Duration::from_millis(20)).await.map(|j| j.script),
        Some("last".to_string())
    );

    for _ in 0..2 {
        let started = Instant::now();
        assert!(queue.dequeue(Duration::from_millis(30)).await.is_none());
        assert!(started.elapsed() >= Duration::from_millis(25));
    }
    Ok(())
}

proptest! {
    #[test]
    fn drain_preserves_enqueue_order(scripts in proptest::collection::vec(".{0,16}", 0..40)) {
        let (jobs, mut queue) = job_queue();
        for script in &scripts {
            jobs.enqueue(script.clone()).unwrap();
        }

        let drained = queue.drain();
        let seqs: Vec<u64> = drained.iter().map(|j| j.seq).collect();
        let bodies: Vec<String> = drained.into_iter().map(|j| j.script).collect();

        prop_assert_eq!(seqs, (1..=scripts.len() as u64).collect::<Vec<_>>());
        prop_assert_eq!(bodies, scripts);
    }
}
