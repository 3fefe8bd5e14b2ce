//! Outgoing links of a single note.

use crate::resolve::NoteResolver;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use tracing::instrument;
use vaultscan_core::{BoundaryGuard, Error, LinkClass, Result, ScanConfig};
use vaultscan_graph::read_note_lines;
use vaultscan_parser::{external_urls, scan_line};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    Valid,
    Dead,
    External,
    /// Attachments are never checked
    Asset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingLink {
    /// Normalized target as written
    pub target: String,
    pub status: LinkStatus,
    /// First line the target appears on
    pub line: usize,
    /// Vault-relative path the target resolved to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingLinks {
    /// Vault-relative path of the note
    pub source: String,
    /// One entry per distinct target (case-insensitive), sorted by target
    pub links: Vec<OutgoingLink>,
    /// Bare URLs found in the text, sorted and deduplicated
    pub external_urls: Vec<String>,
}

impl OutgoingLinks {
    pub fn with_status(&self, status: LinkStatus) -> impl Iterator<Item = &OutgoingLink> {
        self.links.iter().filter(move |link| link.status == status)
    }

    pub fn valid_count(&self) -> usize {
        self.with_status(LinkStatus::Valid).count()
    }

    pub fn dead_count(&self) -> usize {
        self.with_status(LinkStatus::Dead).count()
    }

    /// Valid plus dead internal links
    pub fn total_links(&self) -> usize {
        self.valid_count() + self.dead_count()
    }
}

/// List what the note `identifier` links to
#[instrument(skip(root, config), fields(root = %root.display()), name = "outgoing_links")]
pub fn outgoing_links(root: &Path, identifier: &str, config: &ScanConfig) -> Result<OutgoingLinks> {
    let guard = BoundaryGuard::new(root)?;
    let resolver = NoteResolver::new(&guard);
    let source = resolver.resolve(identifier)?;
    let lines = read_note_lines(&source, config.max_line_bytes).map_err(Error::io)?;

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    let mut urls = BTreeSet::new();

    for (idx, line) in lines.iter().enumerate() {
        for occurrence in scan_line(line, idx + 1) {
            if occurrence.is_self_reference() || !seen.insert(occurrence.key()) {
                continue;
            }

            let (status, resolved) = match occurrence.class(config) {
                LinkClass::External => (LinkStatus::External, None),
                LinkClass::Asset => (LinkStatus::Asset, None),
                LinkClass::Folder => match resolver.find_folder(&occurrence.target) {
                    Some(folder) => (LinkStatus::Valid, Some(format!("{folder}/"))),
                    None => (LinkStatus::Dead, None),
                },
                LinkClass::Note | LinkClass::SelfHeading => {
                    match resolver.resolve(&occurrence.target) {
                        Ok(note) => (LinkStatus::Valid, Some(note.rel_path)),
                        Err(Error::AmbiguousNote { .. }) => (LinkStatus::Valid, None),
                        Err(_) => (LinkStatus::Dead, None),
                    }
                }
            };

            links.push(OutgoingLink {
                target: occurrence.target,
                status,
                line: occurrence.line,
                resolved,
            });
        }
        urls.extend(external_urls(line));
    }

    links.sort_by(|a, b| a.target.cmp(&b.target));
    Ok(OutgoingLinks {
        source: source.rel_path,
        links,
        external_urls: urls.into_iter().collect(),
    })
}
