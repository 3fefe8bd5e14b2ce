//! Vault traversal.
//!
//! Walks the tree once, depth-first, without following symlinks. Hidden
//! directories are pruned. Symlinks are resolved and, in bounded mode,
//! dropped when they point outside the vault.

use crate::boundary::BoundaryGuard;
use crate::models::{NoteFile, top_level_folder};
use log::debug;
use std::collections::BTreeMap;
use std::path::PathBuf;
use walkdir::{DirEntry, WalkDir};

/// One entry yielded by the walker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Path as seen inside the vault (not the symlink target)
    pub path: PathBuf,
    /// Vault-relative, `/`-separated
    pub rel_path: String,
    pub is_dir: bool,
    pub is_symlink: bool,
}

impl WalkEntry {
    /// Markdown check on the file name, ignoring case
    pub fn is_markdown(&self) -> bool {
        !self.is_dir && has_md_extension(&self.rel_path)
    }
}

/// Whether `name` ends in `.md`, any case
pub fn has_md_extension(name: &str) -> bool {
    let len = name.len();
    len > 3 && name.is_char_boundary(len - 3) && name[len - 3..].eq_ignore_ascii_case(".md")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Bounded,
    Raw,
}

/// Everything a scan needs from one traversal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkOutput {
    pub notes: Vec<NoteFile>,
    /// Vault-relative directories, root excluded
    pub directories: Vec<String>,
    /// Regular files of any kind
    pub total_files: usize,
    /// Markdown tally per top-level folder
    pub folders: BTreeMap<String, usize>,
}

/// Depth-first vault walker
#[derive(Debug, Clone)]
pub struct VaultWalker<'a> {
    guard: &'a BoundaryGuard,
    mode: Mode,
}

impl<'a> VaultWalker<'a> {
    /// Walker that drops symlinks resolving outside the vault
    pub fn new(guard: &'a BoundaryGuard) -> Self {
        Self {
            guard,
            mode: Mode::Bounded,
        }
    }

    /// Walker that keeps escaping symlinks so callers can report them
    pub fn raw(guard: &'a BoundaryGuard) -> Self {
        Self {
            guard,
            mode: Mode::Raw,
        }
    }

    /// Lazy entry sequence; restart by calling again.
    pub fn entries(&self) -> impl Iterator<Item = WalkEntry> + '_ {
        WalkDir::new(self.guard.root())
            .follow_links(false)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_hidden_dir(entry))
            .filter_map(move |result| match result {
                Ok(entry) => self.classify(entry),
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    None
                }
            })
    }

    fn classify(&self, entry: DirEntry) -> Option<WalkEntry> {
        let path = entry.path().to_path_buf();
        let rel_path = self.guard.relative(&path)?;

        if !entry.path_is_symlink() {
            return Some(WalkEntry {
                path,
                rel_path,
                is_dir: entry.file_type().is_dir(),
                is_symlink: false,
            });
        }

        let target = match std::fs::canonicalize(&path) {
            Ok(target) => target,
            Err(e) => {
                debug!("Skipping unresolvable symlink {}: {}", path.display(), e);
                return None;
            }
        };

        if self.mode == Mode::Bounded && !target.starts_with(self.guard.root()) {
            debug!(
                "Skipping symlink {} escaping the vault to {}",
                path.display(),
                target.display()
            );
            return None;
        }

        let is_dir = target.is_dir();
        if is_dir && entry.file_name().to_string_lossy().starts_with('.') {
            return None;
        }

        Some(WalkEntry {
            path,
            rel_path,
            is_dir,
            is_symlink: true,
        })
    }

    /// Drain the walk into notes, directories and tallies
    pub fn collect(&self) -> WalkOutput {
        let mut output = WalkOutput::default();

        for entry in self.entries() {
            if entry.is_dir {
                output.directories.push(entry.rel_path);
                continue;
            }

            output.total_files += 1;
            if entry.is_markdown() {
                *output
                    .folders
                    .entry(top_level_folder(&entry.rel_path).to_string())
                    .or_insert(0) += 1;
                output.notes.push(NoteFile::new(entry.rel_path, entry.path));
            }
        }

        debug!(
            "Walked {}: {} notes, {} files, {} directories",
            self.guard.root().display(),
            output.notes.len(),
            output.total_files,
            output.directories.len()
        );
        output
    }
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name().to_string_lossy().starts_with('.')
}
