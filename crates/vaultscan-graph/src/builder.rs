//! Concurrent link-graph builder.
//!
//! One walk, one frozen [`ExistenceIndex`], then every note is parsed exactly
//! once on a bounded rayon pool. Each worker folds its notes into a private
//! [`Accumulator`]; accumulators are merged after the join, so parsing takes
//! no locks. Orphans are derived only after every worker has finished.

use crate::index::ExistenceIndex;
use log::{debug, info, warn};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::instrument;
use vaultscan_core::{
    BoundaryGuard, DeadLink, Error, LinkClass, NoteFile, Result, ScanConfig, ScanResult,
    VaultWalker,
};
use vaultscan_parser::{LineReader, classify, opens_frontmatter, scan_line};

/// Everything one note contributes to the scan
#[derive(Debug, Default)]
struct NoteReport {
    rel_path: String,
    has_frontmatter: bool,
    incoming: HashMap<String, usize>,
    dead_links: Vec<DeadLink>,
}

/// Per-worker partial result
#[derive(Debug, Default)]
struct Accumulator {
    incoming: HashMap<String, usize>,
    dead_links: Vec<DeadLink>,
    frontmatter_issues: Vec<String>,
}

impl Accumulator {
    fn absorb(mut self, report: NoteReport) -> Self {
        for (key, count) in report.incoming {
            *self.incoming.entry(key).or_insert(0) += count;
        }
        self.dead_links.extend(report.dead_links);
        if !report.has_frontmatter {
            self.frontmatter_issues.push(report.rel_path);
        }
        self
    }

    fn merge(mut self, other: Self) -> Self {
        for (key, count) in other.incoming {
            *self.incoming.entry(key).or_insert(0) += count;
        }
        self.dead_links.extend(other.dead_links);
        self.frontmatter_issues.extend(other.frontmatter_issues);
        self
    }
}

/// Builds a [`ScanResult`] from a vault directory
#[derive(Debug, Clone, Default)]
pub struct LinkGraphBuilder {
    config: ScanConfig,
}

impl LinkGraphBuilder {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan the vault at `root`.
    ///
    /// Fails only on an invalid root or configuration. Unreadable notes are
    /// logged and skipped.
    #[instrument(skip(self, root), fields(root = %root.display()), name = "vault_scan")]
    pub fn scan(&self, root: &Path) -> Result<ScanResult> {
        self.config.validate()?;
        let guard = BoundaryGuard::new(root)?;

        let walk = VaultWalker::new(&guard).collect();
        let index = ExistenceIndex::build(&walk);
        debug!(
            "Existence index: {} file keys, {} folder keys",
            index.file_keys(),
            index.folder_keys()
        );

        let acc = self.parse_all(&walk.notes, &index)?;

        let mut result = ScanResult {
            vault_root: guard.root().to_path_buf(),
            total_files: walk.total_files,
            markdown_files: walk.notes.len(),
            directories: walk.directories.len(),
            folders: walk.folders,
            orphans: Vec::new(),
            dead_links: acc.dead_links,
            frontmatter_issues: acc.frontmatter_issues,
            incoming: acc.incoming.into_iter().collect(),
        };
        result.orphans = self.find_orphans(&walk.notes, &result);

        info!(
            "Scanned {} notes: {} orphans, {} dead links, {} without frontmatter",
            result.markdown_files,
            result.orphans.len(),
            result.dead_links.len(),
            result.frontmatter_issues.len()
        );
        Ok(result)
    }

    fn parse_all(&self, notes: &[NoteFile], index: &ExistenceIndex) -> Result<Accumulator> {
        let workers = self.config.worker_count(notes.len());
        if workers == 0 {
            return Ok(Accumulator::default());
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("vaultscan-scan-{i}"))
            .build()
            .map_err(|e| Error::other(format!("Failed to start scan workers: {e}")))?;
        debug!("Parsing {} notes on {} workers", notes.len(), workers);

        Ok(pool.install(|| {
            notes
                .par_iter()
                .filter_map(|note| self.parse_note(note, index))
                .fold(Accumulator::default, Accumulator::absorb)
                .reduce(Accumulator::default, Accumulator::merge)
        }))
    }

    /// Parse one note. `None` when the file cannot be read to the end.
    fn parse_note(&self, note: &NoteFile, index: &ExistenceIndex) -> Option<NoteReport> {
        let file = match File::open(&note.path) {
            Ok(file) => file,
            Err(e) => {
                warn!("Skipping unreadable note {}: {}", note.rel_path, e);
                return None;
            }
        };

        let mut report = NoteReport {
            rel_path: note.rel_path.clone(),
            ..Default::default()
        };

        let lines = LineReader::new(BufReader::new(file), self.config.max_line_bytes);
        for (idx, line) in lines.enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("Skipping note {} at line {}: {}", note.rel_path, idx + 1, e);
                    return None;
                }
            };
            let line_number = idx + 1;
            if line_number == 1 {
                report.has_frontmatter = opens_frontmatter(&line);
            }
            for occurrence in scan_line(&line, line_number) {
                self.record(&mut report, &occurrence.target, line_number, index);
            }
        }

        Some(report)
    }

    fn record(&self, report: &mut NoteReport, target: &str, line: usize, index: &ExistenceIndex) {
        if target.is_empty() {
            return;
        }
        let class = classify(target, &self.config);
        if class == LinkClass::External {
            return;
        }

        let key = target.to_lowercase();
        let resolved = match class {
            LinkClass::Folder => index.has_folder(&key),
            LinkClass::Note => index.has_note(&key),
            _ => true,
        };
        *report.incoming.entry(key).or_insert(0) += 1;

        if !resolved {
            report
                .dead_links
                .push(DeadLink::new(report.rel_path.clone(), target, line));
        }
    }

    fn find_orphans(&self, notes: &[NoteFile], result: &ScanResult) -> Vec<String> {
        notes
            .iter()
            .filter(|note| !self.config.is_orphan_exempt(note.file_name()))
            .filter(|note| !result.is_referenced(note))
            .map(|note| note.rel_path.clone())
            .collect()
    }
}

/// Scan with the default configuration
pub fn scan_vault(root: impl AsRef<Path>) -> Result<ScanResult> {
    LinkGraphBuilder::default().scan(root.as_ref())
}
