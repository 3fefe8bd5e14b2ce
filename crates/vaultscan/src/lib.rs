//! # vaultscan
//!
//! Command-line front-end over the vaultscan crates: argument parsing,
//! layered configuration, logging setup and report rendering.
//!
//! The binary in `src/bin/main.rs` is a thin wrapper around [`commands::run`].

pub mod cli;
pub mod commands;
pub mod logging;
pub mod output;
pub mod settings;

pub use cli::{Cli, Command, LogFormat};
pub use commands::{Outcome, Session, run};
pub use output::OutputFormat;
pub use vaultscan_core::prelude::*;
