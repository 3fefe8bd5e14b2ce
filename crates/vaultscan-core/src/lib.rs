//! # vaultscan core
//!
//! Data models, error types, configuration, the vault boundary guard and the
//! filesystem walker. Every other vaultscan crate builds on these types.
//!
//! ## Core Modules
//!
//! - [`models`] - Notes, dead links, scan and rename results
//! - [`error`] - Error enum and Result alias
//! - [`config`] - Scan configuration and profiles
//! - [`boundary`] - Containment checks against the vault root
//! - [`walker`] - Depth-first traversal producing notes and directories
//!
//! ## Usage
//!
//! ```no_run
//! use vaultscan_core::prelude::*;
//!
//! fn list_notes(root: &str) -> Result<Vec<String>> {
//!     let guard = BoundaryGuard::new(root)?;
//!     let output = VaultWalker::new(&guard).collect();
//!     Ok(output.notes.into_iter().map(|n| n.rel_path).collect())
//! }
//! ```

pub mod boundary;
pub mod config;
pub mod error;
pub mod models;
pub mod walker;

pub use boundary::{BoundaryGuard, is_within};
pub use config::{ConfigProfile, ScanConfig, ScanConfigBuilder};
pub use error::{Error, Result};
pub use models::*;
pub use walker::{VaultWalker, WalkEntry, WalkOutput, has_md_extension};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::boundary::{BoundaryGuard, is_within};
    pub use crate::config::{ConfigProfile, ScanConfig};
    pub use crate::error::{Error, Result};
    pub use crate::models::{
        DeadLink, LinkClass, NoteFile, RenameChange, RenameResult, ScanResult,
    };
    pub use crate::walker::{VaultWalker, WalkOutput};
}
