//! varscope: region-aware ClinVar variant lookups from the command line.
//!
//! This crate hosts the [`varscope_search`] layer:
//! - **Config**: a TOML file with `[search]` and `[dataset]` tables
//! - **Commands**: region, count, variant, liftover and release-date
//!   queries rendered as JSON
//!
//! The `varscope` binary wires these to `clap` and `tracing-subscriber`.

pub mod commands;
pub mod config;
pub mod error;
pub mod varscope_dirs;

pub use commands::Command;
pub use config::VarscopeConfig;
pub use error::{Result, VarscopeError};
