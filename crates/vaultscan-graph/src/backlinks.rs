//! Backlinks query: every line that references a note.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use tracing::instrument;
use vaultscan_core::{BoundaryGuard, Error, NoteFile, Result, ScanConfig, VaultWalker};
use vaultscan_parser::{LineReader, NoteMatcher, scan_line};

/// One referencing line
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Backlink {
    /// Vault-relative path of the referencing note
    pub source: String,
    /// 1-based line number
    pub line: usize,
    /// The line, trimmed
    pub context: String,
}

/// Read a note whole, honouring the line limit
pub fn read_note_lines(note: &NoteFile, max_line_bytes: usize) -> io::Result<Vec<String>> {
    let file = File::open(&note.path)?;
    LineReader::new(BufReader::new(file), max_line_bytes).collect()
}

/// Find every line referencing `identifier`, sorted by (source, line).
///
/// The identifier is not resolved; notes that are the target itself (same
/// basename or same relative path) are skipped.
#[instrument(skip(root, config), fields(root = %root.display()), name = "find_backlinks")]
pub fn find_backlinks(root: &Path, identifier: &str, config: &ScanConfig) -> Result<Vec<Backlink>> {
    if identifier.trim().is_empty() {
        return Err(Error::invalid_name("note name cannot be empty"));
    }

    let guard = BoundaryGuard::new(root)?;
    let matcher = NoteMatcher::for_identifier(identifier);
    let walk = VaultWalker::new(&guard).collect();

    let mut backlinks = Vec::new();
    for note in walk.notes.iter().filter(|note| !matcher.is_target(note)) {
        let lines = match read_note_lines(note, config.max_line_bytes) {
            Ok(lines) => lines,
            Err(e) => {
                warn!("Skipping unreadable note {}: {}", note.rel_path, e);
                continue;
            }
        };

        for (idx, line) in lines.iter().enumerate() {
            let hit = scan_line(line, idx + 1)
                .iter()
                .any(|occurrence| matcher.matches(occurrence).is_some());
            if hit {
                backlinks.push(Backlink {
                    source: note.rel_path.clone(),
                    line: idx + 1,
                    context: line.trim().to_string(),
                });
            }
        }
    }

    backlinks.sort();
    debug!("Found {} backlinks to {}", backlinks.len(), identifier);
    Ok(backlinks)
}
