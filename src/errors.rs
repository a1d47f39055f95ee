// src/errors.rs

//! Crate-wide error type, aliases and exit-code mapping.

use std::path::PathBuf;

use thiserror::Error;

/// `EX_OK` from `sysexits.h`.
pub const EX_OK: i32 = 0;
/// `EX_UNAVAILABLE` from `sysexits.h`.
pub const EX_UNAVAILABLE: i32 = 69;
/// `EX_CANTCREAT` from `sysexits.h`.
pub const EX_CANTCREAT: i32 = 73;

#[derive(Error, Debug)]
pub enum EfifoError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("cannot remove stale socket {path:?}: {source}")]
    StaleSocket {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot acquire lock file {path:?}: {source}")]
    LockFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create {path:?}: {source}")]
    CreatePath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("job queue closed")]
    QueueClosed,

    #[error("interrupted while shutting down")]
    InterruptedDuringShutdown,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EfifoError {
    /// Process exit code a supervisor sees when the daemon stops with this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            EfifoError::StaleSocket { .. } | EfifoError::LockFile { .. } => EX_UNAVAILABLE,
            EfifoError::CreatePath { .. } | EfifoError::InterruptedDuringShutdown => {
                EX_CANTCREAT
            }
            _ => 1,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, EfifoError>;
