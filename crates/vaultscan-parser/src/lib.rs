//! # vaultscan parser
//!
//! Line-level wikilink handling: extraction, normalization, classification,
//! bounded line reading and offset-stable rewriting.
//!
//! Nothing here touches the filesystem beyond the reader it is handed.
//!
//! ```
//! use vaultscan_parser::{scan_line, normalize};
//! use vaultscan_core::{LinkClass, ScanConfig};
//!
//! let links = scan_line("See [[Plan#Goals|goals]] and ![[chart.png]]", 1);
//! assert_eq!(links.len(), 2);
//! assert_eq!(links[0].target, "Plan");
//! assert_eq!(links[1].class(&ScanConfig::default()), LinkClass::Asset);
//! assert_eq!(normalize("Plan#^block"), "Plan");
//! ```

pub mod lines;
pub mod matcher;
pub mod normalize;
pub mod rewrite;
pub mod wikilinks;

pub use lines::{LineReader, opens_frontmatter};
pub use matcher::{MatchKind, NoteMatcher};
pub use normalize::{classify, is_external, normalize, split_fragment};
pub use rewrite::{RenameTargets, Replacement, apply_replacements, rewrite_line};
pub use wikilinks::{LinkOccurrence, external_urls, scan_content, scan_line};
