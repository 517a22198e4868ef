//! Parsing and validation of `fabric.toml` run configuration files.
//!
//! This crate reads the run configuration and produces a strongly-typed
//! [`FabricConfig`]: the device database to load, the placer selection, the
//! router's rip-up penalty and the delay estimator's tuning knobs.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
