// src/ingress/mod.rs

//! Ways scripts reach the daemon. Exactly one is active per run.
//!
//! - [`socket`]: Unix stream socket; jobs go through the queue.
//! - [`fifo`]: named pipe guarded by a lock file; jobs run inline.

pub mod fifo;
pub mod socket;

pub use fifo::{FifoLock, FifoLoop, ensure_fifo, lock_path};
pub use socket::{ConnectionAcceptor, SocketListener, prepare_socket};
