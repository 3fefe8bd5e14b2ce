//! # vaultscan vault
//!
//! Operations that address a single note by name: resolution, outgoing
//! links, and the vault-wide rename that rewrites every backlink.
//!
//! ## Quick Start
//!
//! ```no_run
//! use vaultscan_vault::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let transformer = RenameTransformer::new("/path/to/vault", ScanConfig::default())?;
//!
//!     // Preview first
//!     let plan = transformer.rename("old-name", "new-name", true).await?;
//!     println!("{} links in {} files", plan.links_updated, plan.files_modified);
//!
//!     // Then apply
//!     transformer.rename("old-name", "new-name", false).await?;
//!     Ok(())
//! }
//! ```

pub mod links;
pub mod rename;
pub mod resolve;
pub mod write;

pub use links::{LinkStatus, OutgoingLink, OutgoingLinks, outgoing_links};
pub use rename::{Destination, RenameTransformer};
pub use resolve::NoteResolver;
pub use write::{apply_line_changes, rewrite_file, write_preserving};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::links::{LinkStatus, OutgoingLinks, outgoing_links};
    pub use crate::rename::RenameTransformer;
    pub use crate::resolve::NoteResolver;
    pub use vaultscan_core::prelude::*;
}
