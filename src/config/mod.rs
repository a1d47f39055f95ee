// src/config/mod.rs

//! Configuration loading and validation for efifo.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and layer CLI/env overrides (`loader.rs`).
//! - Validate and resolve into a typed [`DaemonConfig`] (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, resolve, resolve_with_env};
pub use model::{DaemonConfig, DaemonSection, Ingress, NotifySection, RawConfigFile};
pub use validate::parse_duration;
