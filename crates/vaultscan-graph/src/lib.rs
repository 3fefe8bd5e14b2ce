//! # vaultscan graph
//!
//! Builds the vault link graph in a single concurrent pass and derives
//! everything reported from it: orphans, dead links, missing frontmatter,
//! health and statistics, plus the backlinks query.
//!
//! ```no_run
//! use vaultscan_graph::{HealthReport, scan_vault};
//!
//! let result = scan_vault("/path/to/vault").unwrap().sorted();
//! let health = HealthReport::from_scan(&result);
//! println!("{} dead links, status {}", health.dead_links, health.status.as_str());
//! ```

pub mod backlinks;
pub mod builder;
pub mod health;
pub mod index;

pub use backlinks::{Backlink, find_backlinks, read_note_lines};
pub use builder::{LinkGraphBuilder, scan_vault};
pub use health::{DEFAULT_TOP_FOLDERS, FolderCount, HealthReport, HealthStatus, VaultStats};
pub use index::ExistenceIndex;
