//! Parsing and validation of `weft.toml` project configuration files.
//!
//! This crate reads the project configuration and produces a strongly-typed
//! [`WeftConfig`] covering generation naming, delegation policies,
//! recollection reporting, and the incremental cache location.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use types::*;
