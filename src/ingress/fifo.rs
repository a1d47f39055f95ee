// src/ingress/fifo.rs

//! Named-pipe ingress.
//!
//! Each open → EOF cycle on the FIFO is one script, run inline by the
//! executor, even when nothing was written. An exclusive lock on `<fifo>.lock` keeps a second daemon from
//! draining the same FIFO.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::os::unix::fs::{DirBuilderExt, FileTypeExt, OpenOptionsExt};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use fs2::FileExt;
use nix::fcntl::OFlag;
use nix::sys::stat::Mode;
use nix::unistd::mkfifo;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::Shutdown;
use crate::errors::{EfifoError, Result};
use crate::exec::Executor;

/// Path of the lock file guarding `fifo`.
pub fn lock_path(fifo: &Path) -> PathBuf {
    let mut name = fifo
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("efifo"));
    name.push(".lock");
    fifo.with_file_name(name)
}

/// Create the parent directory and the FIFO node if they are missing.
pub fn ensure_fifo(path: &Path) -> Result<()> {
    let create_err = |source| EfifoError::CreatePath {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::DirBuilder::new()
            .recursive(true)
            .mode(0o770)
            .create(parent)
            .map_err(|source| EfifoError::CreatePath {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    match fs::metadata(path) {
        Ok(meta) if meta.file_type().is_fifo() => Ok(()),
        Ok(_) => Err(create_err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            "path exists and is not a FIFO",
        ))),
        Err(_) => {
            match mkfifo(path, Mode::S_IRUSR | Mode::S_IWUSR) {
                Ok(()) | Err(nix::errno::Errno::EEXIST) => {}
                Err(errno) => return Err(create_err(errno.into())),
            }
            debug!(?path, "created FIFO");
            Ok(())
        }
    }
}

/// Held exclusive lock; released when dropped (or by the kernel when the
/// process dies).
#[derive(Debug)]
pub struct FifoLock {
    file: File,
    path: PathBuf,
}

impl FifoLock {
    /// Open (creating if needed) the lock file. Does not lock yet.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .mode(0o600)
            .open(path)
            .map_err(|source| EfifoError::LockFile {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Wait until the exclusive lock is ours, polling every `interval`.
    ///
    /// Returns `Ok(false)` if `shutdown` fired first.
    pub async fn acquire(&self, interval: Duration, shutdown: &Shutdown) -> Result<bool> {
        let contended = fs2::lock_contended_error().raw_os_error();
        let mut announced = false;

        loop {
            match self.file.try_lock_exclusive() {
                Ok(()) => {
                    info!(path = ?self.path, "lock acquired");
                    return Ok(true);
                }
                Err(e) if e.raw_os_error() == contended => {
                    if !announced {
                        info!(path = ?self.path, "another instance holds the lock; waiting");
                        announced = true;
                    }
                }
                Err(source) => {
                    return Err(EfifoError::LockFile {
                        path: self.path.clone(),
                        source,
                    });
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown.wait() => return Ok(false),
            }
        }
    }
}

impl Drop for FifoLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            debug!(path = ?self.path, error = %e, "unlocking lock file failed");
        }
    }
}

/// Repeatedly drains the FIFO and runs each drain inline.
pub struct FifoLoop {
    path: PathBuf,
    executor: Executor,
    shutdown: Shutdown,
    interval: Duration,
}

impl FifoLoop {
    pub fn new(path: PathBuf, executor: Executor, shutdown: Shutdown, interval: Duration) -> Self {
        Self {
            path,
            executor,
            shutdown,
            interval,
        }
    }

    /// Serve until shutdown. `lock` must already be held and is released on
    /// return.
    pub async fn run(mut self, lock: FifoLock) -> Result<()> {
        info!(path = ?self.path, "Draining FIFO");

        while !self.shutdown.is_triggered() {
            let Some(content) = self.next_drain().await? else {
                break;
            };

            let script = String::from_utf8_lossy(&content).into_owned();
            self.executor.run_job(&script).await;
        }

        info!(executions = self.executor.executions(), "FIFO loop finished");
        drop(lock);
        Ok(())
    }

    /// Block (off the reactor) until a writer opens the FIFO and closes it
    /// again. Returns `None` if shutdown fired while waiting.
    async fn next_drain(&self) -> Result<Option<Vec<u8>>> {
        let path = self.path.clone();
        let mut read: JoinHandle<std::io::Result<Vec<u8>>> =
            tokio::task::spawn_blocking(move || fs::read(&path));

        tokio::select! {
            joined = &mut read => {
                let content = joined
                    .context("FIFO reader panicked")?
                    .with_context(|| format!("reading FIFO {:?}", self.path))?;
                Ok(Some(content))
            }
            _ = self.shutdown.wait() => {
                self.release_reader(read).await;
                Ok(None)
            }
        }
    }

    /// The blocking reader may be parked in `open(2)`; opening the write end
    /// ourselves lets it reach EOF so the thread can finish.
    async fn release_reader(&self, mut read: JoinHandle<std::io::Result<Vec<u8>>>) {
        loop {
            if let Err(e) = wake_fifo_reader(&self.path) {
                debug!(error = %e, "no reader to wake yet");
            }
            match tokio::time::timeout(self.interval, &mut read).await {
                Ok(Ok(Ok(content))) if !content.is_empty() => {
                    warn!(bytes = content.len(), "discarding script received during shutdown");
                    return;
                }
                Ok(_) => return,
                Err(_elapsed) => continue,
            }
        }
    }
}

fn wake_fifo_reader(path: &Path) -> std::io::Result<()> {
    let writer = OpenOptions::new()
        .write(true)
        .custom_flags(OFlag::O_NONBLOCK.bits())
        .open(path)?;
    drop(writer);
    Ok(())
}
