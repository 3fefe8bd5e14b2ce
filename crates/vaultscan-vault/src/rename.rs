//! Vault-wide note rename.
//!
//! Three phases, no retries:
//! 1. resolve the source note,
//! 2. analyze: pick the destination and compute every backlink rewrite,
//! 3. execute: rewrite files one by one, then move the note.
//!
//! Nothing is written before phase 3. A write failure in phase 3 stops
//! immediately and reports how many files were already rewritten; the note
//! is then left where it was.

use crate::resolve::NoteResolver;
use crate::write::rewrite_file;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::instrument;
use vaultscan_core::{
    BoundaryGuard, Error, NoteFile, RenameChange, RenameResult, Result, ScanConfig, VaultWalker,
    clean_identifier, strip_md_extension,
};
use vaultscan_graph::read_note_lines;
use vaultscan_parser::{NoteMatcher, RenameTargets, rewrite_line};

/// Where a renamed note ends up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// Absolute path of the new file
    pub path: PathBuf,
    /// Vault-relative path of the new file
    pub rel_path: String,
}

impl Destination {
    /// New name without directory or extension
    pub fn basename(&self) -> &str {
        let name = self
            .rel_path
            .rsplit_once('/')
            .map(|(_, name)| name)
            .unwrap_or(&self.rel_path);
        strip_md_extension(name)
    }

    /// New vault-relative path without extension
    pub fn rel_stem(&self) -> &str {
        strip_md_extension(&self.rel_path)
    }
}

/// Renames notes and rewrites their backlinks
#[derive(Debug, Clone)]
pub struct RenameTransformer {
    guard: BoundaryGuard,
    config: ScanConfig,
}

impl RenameTransformer {
    pub fn new(root: impl AsRef<Path>, config: ScanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            guard: BoundaryGuard::new(root)?,
            config,
        })
    }

    pub fn root(&self) -> &Path {
        self.guard.root()
    }

    /// Phase 1: find the note `identifier` refers to
    pub fn resolve(&self, identifier: &str) -> Result<NoteFile> {
        NoteResolver::new(&self.guard).resolve(identifier)
    }

    /// Destination for `source` renamed to `new_name`.
    ///
    /// A name containing a separator is rooted at the vault; a bare name stays
    /// in the source's directory.
    pub fn destination(&self, source: &NoteFile, new_name: &str) -> Result<Destination> {
        let cleaned = clean_identifier(new_name);
        if cleaned.is_empty() || cleaned.ends_with('/') {
            return Err(Error::invalid_name(format!(
                "invalid new note name {new_name:?}"
            )));
        }

        let rel = if cleaned.contains('/') || source.parent_dir().is_empty() {
            format!("{cleaned}.md")
        } else {
            format!("{}/{cleaned}.md", source.parent_dir())
        };

        let path = self.guard.check(&self.guard.root().join(&rel))?;
        let rel_path = self
            .guard
            .relative(&path)
            .filter(|rel| !rel.is_empty())
            .ok_or_else(|| Error::boundary_escape(&path))?;

        if std::fs::symlink_metadata(&path).is_ok() {
            return Err(Error::destination_exists(path));
        }

        Ok(Destination { path, rel_path })
    }

    /// Phase 2: every line outside the source that must change
    pub fn analyze(
        &self,
        source: &NoteFile,
        identifier: &str,
        destination: &Destination,
    ) -> Result<Vec<RenameChange>> {
        let matcher = NoteMatcher::for_note(source, identifier);
        let targets = RenameTargets::for_move(source, &destination.rel_path);

        // Symlinked aliases of the source are the source itself.
        let source_real = std::fs::canonicalize(&source.path).ok();
        let is_source = |note: &NoteFile| {
            note.rel_path == source.rel_path
                || source_real
                    .as_ref()
                    .is_some_and(|real| std::fs::canonicalize(&note.path).is_ok_and(|p| &p == real))
        };

        let walk = VaultWalker::new(&self.guard).collect();
        let mut changes = Vec::new();
        for note in walk.notes.iter().filter(|n| !is_source(*n)) {
            let lines = match read_note_lines(note, self.config.max_line_bytes) {
                Ok(lines) => lines,
                Err(e) => {
                    warn!("Skipping unreadable note {}: {}", note.rel_path, e);
                    continue;
                }
            };

            for (idx, line) in lines.iter().enumerate() {
                if let Some(new_content) = rewrite_line(line, &matcher, &targets) {
                    changes.push(RenameChange {
                        file: note.rel_path.clone(),
                        line: idx + 1,
                        old_content: line.clone(),
                        new_content,
                    });
                }
            }
        }

        debug!(
            "Rename {} -> {}: {} lines to update",
            source.rel_path,
            destination.rel_path,
            changes.len()
        );
        Ok(changes)
    }

    /// Phase 3: apply `changes`, then move the note
    pub async fn execute(
        &self,
        source: &NoteFile,
        destination: &Destination,
        changes: &[RenameChange],
    ) -> Result<()> {
        let mut by_file: BTreeMap<&str, Vec<&RenameChange>> = BTreeMap::new();
        for change in changes {
            by_file.entry(change.file.as_str()).or_default().push(change);
        }

        let mut modified = 0;
        for (file, file_changes) in by_file {
            let path = self.guard.root().join(file);
            match rewrite_file(&path, &file_changes).await {
                Ok(applied) => {
                    debug!("Rewrote {} lines in {}", applied, file);
                    modified += 1;
                }
                Err(e) => return Err(Error::partial_write(path, modified, e)),
            }
        }

        let parent = destination
            .path
            .parent()
            .ok_or_else(|| Error::boundary_escape(&destination.path))?;
        self.guard.check(parent)?;
        tokio::fs::create_dir_all(parent).await?;

        if tokio::fs::symlink_metadata(&destination.path).await.is_ok() {
            return Err(Error::destination_exists(&destination.path));
        }
        tokio::fs::rename(&source.path, &destination.path).await?;
        Ok(())
    }

    /// Resolve, analyze and (unless `dry_run`) execute a rename
    #[instrument(skip(self), fields(root = %self.guard.root().display()), name = "vault_rename")]
    pub async fn rename(
        &self,
        identifier: &str,
        new_name: &str,
        dry_run: bool,
    ) -> Result<RenameResult> {
        let source = self.resolve(identifier)?;
        let destination = self.destination(&source, new_name)?;
        let changes = self.analyze(&source, identifier, &destination)?;

        if !dry_run {
            self.execute(&source, &destination, &changes).await?;
        }

        let result = RenameResult::new(
            source.rel_path,
            destination.rel_path,
            changes,
            !dry_run,
        );
        info!(
            "{} {} -> {}: {} links in {} files",
            if dry_run { "Planned rename" } else { "Renamed" },
            result.source,
            result.destination,
            result.links_updated,
            result.files_modified
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn transformer(temp: &TempDir) -> RenameTransformer {
        RenameTransformer::new(temp.path(), ScanConfig::default()).unwrap()
    }

    #[test]
    fn test_destination_keeps_source_directory() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("notes")).unwrap();
        fs::write(temp.path().join("notes/a.md"), "").unwrap();
        let t = transformer(&temp);
        let source = t.resolve("a").unwrap();

        let dest = t.destination(&source, "b.md").unwrap();
        assert_eq!(dest.rel_path, "notes/b.md");
        assert_eq!(dest.basename(), "b");

        let rooted = t.destination(&source, "archive/old/b").unwrap();
        assert_eq!(rooted.rel_path, "archive/old/b.md");
        assert_eq!(rooted.rel_stem(), "archive/old/b");
    }

    #[test]
    fn test_destination_rejections() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.md"), "").unwrap();
        fs::write(temp.path().join("b.md"), "").unwrap();
        let t = transformer(&temp);
        let source = t.resolve("a").unwrap();

        assert!(matches!(
            t.destination(&source, "b"),
            Err(Error::DestinationExists { .. })
        ));
        assert!(matches!(
            t.destination(&source, "../outside"),
            Err(Error::BoundaryEscape { .. })
        ));
        assert!(matches!(
            t.destination(&source, "  "),
            Err(Error::InvalidName { .. })
        ));
    }

    #[test]
    fn test_destination_normalizes_dot_segments() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.md"), "").unwrap();
        let t = transformer(&temp);
        let source = t.resolve("a").unwrap();

        let dest = t.destination(&source, "x/../y/z").unwrap();
        assert_eq!(dest.rel_path, "y/z.md");
    }
}
