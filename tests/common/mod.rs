#![allow(dead_code, unused_imports)]

pub use efifo_test_utils::builders;
pub use efifo_test_utils::client::{send_script, write_fifo};
pub use efifo_test_utils::recording_sink::RecordingSink;
pub use efifo_test_utils::{init_tracing, wait_until, with_timeout};

use std::error::Error;

pub type TestResult = Result<(), Box<dyn Error>>;

/// Read a file the scripts append to, one entry per line.
pub fn read_lines(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}
