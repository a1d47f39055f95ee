// src/exec/mod.rs

//! Process execution layer.
//!
//! Scripts are run through `tokio::process::Command` with the script body on
//! stdin, one at a time.
//!
//! - [`executor_loop`] owns the queue-consuming worker and the execution
//!   counter.
//! - [`job_runner`] spawns one shell, supervises it and classifies the
//!   outcome.
//! - [`heartbeat`] emits progress notifications and kills the job when
//!   cancellation is requested.
//! - [`process`] wraps spawning and process-group termination.

pub mod executor_loop;
pub mod heartbeat;
pub mod job_runner;
pub mod process;

pub use executor_loop::Executor;
pub use job_runner::JobRunner;
