// src/ingress/socket.rs

//! Unix socket ingress.
//!
//! A client connects, writes a whole script and closes its write side. The
//! bytes read before EOF become exactly one job. Nothing is written back.

use std::fs;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::{UnixListener, UnixStream};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::engine::{JobSender, Shutdown};
use crate::errors::{EfifoError, Result};

/// Maximum bytes read per readiness event.
pub const READ_CHUNK: usize = 4096;

/// A bound listener that removes its socket file when dropped.
#[derive(Debug)]
pub struct SocketListener {
    listener: UnixListener,
    path: PathBuf,
}

impl SocketListener {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SocketListener {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            debug!(path = ?self.path, error = %e, "could not remove socket file");
        }
    }
}

/// Remove a stale socket (or create the parent directory) and bind.
///
/// Failing to remove an existing file at `path` is a [`EfifoError::StaleSocket`];
/// nothing is bound in that case.
pub fn prepare_socket(path: &Path) -> Result<SocketListener> {
    if fs::symlink_metadata(path).is_ok() {
        fs::remove_file(path).map_err(|source| EfifoError::StaleSocket {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(?path, "removed stale socket");
    } else if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            fs::DirBuilder::new()
                .recursive(true)
                .mode(0o770)
                .create(parent)
                .map_err(|source| EfifoError::CreatePath {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
    }

    let listener = UnixListener::bind(path)?;
    Ok(SocketListener {
        listener,
        path: path.to_path_buf(),
    })
}

/// Per-connection accumulator.
#[derive(Debug)]
struct Connection {
    id: u64,
    buffer: Vec<u8>,
}

/// Accepts connections and turns each cleanly closed one into a job.
///
/// Every connection is read by its own lightweight task on the shared
/// reactor, so a slow sender never holds up the listener or other senders.
pub struct ConnectionAcceptor {
    listener: SocketListener,
    jobs: JobSender,
    shutdown: Shutdown,
}

impl ConnectionAcceptor {
    pub fn new(listener: SocketListener, jobs: JobSender, shutdown: Shutdown) -> Self {
        Self {
            listener,
            jobs,
            shutdown,
        }
    }

    /// Serve until shutdown. Open connections are dropped without producing
    /// jobs; the socket file is removed on return.
    pub async fn run(self) -> Result<()> {
        info!(path = ?self.listener.path(), "Listening");

        let mut connections: JoinSet<Result<()>> = JoinSet::new();
        let mut next_id: u64 = 0;

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.wait() => break,
                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    match joined {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => warn!(error = %e, "connection dropped"),
                        Err(e) => warn!(error = %e, "connection task failed"),
                    }
                }
                accepted = self.listener.listener.accept() => match accepted {
                    Ok((stream, _addr)) => {
                        next_id += 1;
                        debug!(conn = next_id, path = ?self.listener.path(), "Accepted connection");
                        let conn = Connection { id: next_id, buffer: Vec::new() };
                        connections.spawn(read_connection(stream, conn, self.jobs.clone()));
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                },
            }
        }

        if !connections.is_empty() {
            debug!(open = connections.len(), "closing open connections");
        }
        connections.shutdown().await;
        Ok(())
    }
}

/// Read until EOF, then submit the accumulated bytes as one script.
///
/// A read error drops the connection without submitting partial data.
async fn read_connection(
    mut stream: UnixStream,
    mut conn: Connection,
    jobs: JobSender,
) -> Result<()> {
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        conn.buffer.extend_from_slice(&chunk[..n]);
    }

    debug!(conn = conn.id, bytes = conn.buffer.len(), "Closing connection");
    drop(stream);

    let script = String::from_utf8_lossy(&conn.buffer).into_owned();
    jobs.enqueue(script)?;
    Ok(())
}
