//! Note lookup by user-supplied identifier.
//!
//! An identifier is either a bare name (`my-note`) or a vault-relative path
//! (`concepts/my-note`), with or without `.md`, in any case.

use log::debug;
use vaultscan_core::{
    BoundaryGuard, Error, NoteFile, Result, VaultWalker, WalkEntry, clean_identifier,
    strip_md_extension,
};

/// Snapshot of the vault's notes and folders for repeated lookups
#[derive(Debug)]
pub struct NoteResolver<'a> {
    guard: &'a BoundaryGuard,
    notes: Vec<WalkEntry>,
    folders: Vec<WalkEntry>,
}

impl<'a> NoteResolver<'a> {
    /// Walk the vault once. Escaping symlinks are kept so lookups can report them.
    pub fn new(guard: &'a BoundaryGuard) -> Self {
        let (folders, notes) = VaultWalker::raw(guard)
            .entries()
            .filter(|entry| entry.is_dir || entry.is_markdown())
            .partition(|entry| entry.is_dir);
        Self {
            guard,
            notes,
            folders,
        }
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    /// Resolve `identifier` to exactly one note.
    ///
    /// An exact relative-path match wins; otherwise the basename must be unique.
    pub fn resolve(&self, identifier: &str) -> Result<NoteFile> {
        let cleaned = clean_identifier(identifier);
        if cleaned.is_empty() {
            return Err(Error::invalid_name("note name cannot be empty"));
        }
        let wanted = cleaned.to_lowercase();
        let wanted_base = wanted.rsplit('/').next().unwrap_or(&wanted);

        if let Some(exact) = self
            .notes
            .iter()
            .find(|entry| strip_md_extension(&entry.rel_path).to_lowercase() == wanted)
        {
            return self.accept(exact);
        }

        let matches: Vec<&WalkEntry> = self
            .notes
            .iter()
            .filter(|entry| {
                let name = entry.rel_path.rsplit('/').next().unwrap_or(&entry.rel_path);
                strip_md_extension(name).to_lowercase() == wanted_base
            })
            .collect();

        match matches.as_slice() {
            [] => Err(Error::note_not_found(cleaned)),
            [single] => self.accept(single),
            many => {
                let mut candidates: Vec<String> =
                    many.iter().map(|entry| entry.rel_path.clone()).collect();
                candidates.sort();
                Err(Error::ambiguous_note(cleaned, candidates))
            }
        }
    }

    /// Folder lookup for a `dir/` style target; returns the on-disk relative path
    pub fn find_folder(&self, target: &str) -> Option<String> {
        let wanted = target.trim_end_matches('/').to_lowercase();
        self.folders
            .iter()
            .filter(|entry| !entry.is_symlink || self.guard.contains(&entry.path))
            .find(|entry| entry.rel_path.to_lowercase() == wanted)
            .map(|entry| entry.rel_path.clone())
    }

    fn accept(&self, entry: &WalkEntry) -> Result<NoteFile> {
        if entry.is_symlink {
            self.guard.check(&entry.path)?;
        }
        debug!("Resolved note {}", entry.rel_path);
        Ok(NoteFile::new(entry.rel_path.clone(), entry.path.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn vault() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::create_dir_all(root.join("b")).unwrap();
        fs::write(root.join("a/Dup.md"), "").unwrap();
        fs::write(root.join("b/dup.md"), "").unwrap();
        fs::write(root.join("Unique Note.md"), "").unwrap();
        fs::write(root.join("a/deep.md"), "").unwrap();
        temp
    }

    #[test]
    fn test_resolve_by_basename_any_case() {
        let temp = vault();
        let guard = BoundaryGuard::new(temp.path()).unwrap();
        let resolver = NoteResolver::new(&guard);

        assert_eq!(resolver.note_count(), 4);
        assert_eq!(
            resolver.resolve("unique note").unwrap().rel_path,
            "Unique Note.md"
        );
        assert_eq!(resolver.resolve("DEEP.md").unwrap().rel_path, "a/deep.md");
    }

    #[test]
    fn test_exact_path_beats_ambiguity() {
        let temp = vault();
        let guard = BoundaryGuard::new(temp.path()).unwrap();
        let resolver = NoteResolver::new(&guard);

        assert_eq!(resolver.resolve("b/DUP").unwrap().rel_path, "b/dup.md");
        match resolver.resolve("dup") {
            Err(Error::AmbiguousNote { candidates, .. }) => {
                assert_eq!(candidates, vec!["a/Dup.md", "b/dup.md"]);
            }
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn test_not_found_and_empty() {
        let temp = vault();
        let guard = BoundaryGuard::new(temp.path()).unwrap();
        let resolver = NoteResolver::new(&guard);

        assert!(matches!(
            resolver.resolve("nothing"),
            Err(Error::NoteNotFound { .. })
        ));
        assert!(matches!(
            resolver.resolve(" .md "),
            Err(Error::InvalidName { .. })
        ));
    }

    #[test]
    fn test_find_folder() {
        let temp = vault();
        let guard = BoundaryGuard::new(temp.path()).unwrap();
        let resolver = NoteResolver::new(&guard);

        assert_eq!(resolver.find_folder("A/").as_deref(), Some("a"));
        assert!(resolver.find_folder("c/").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_escaping_symlink_is_security_error() {
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret.md"), "").unwrap();
        let temp = vault();
        std::os::unix::fs::symlink(
            outside.path().join("secret.md"),
            temp.path().join("secret.md"),
        )
        .unwrap();

        let guard = BoundaryGuard::new(temp.path()).unwrap();
        let resolver = NoteResolver::new(&guard);
        assert!(matches!(
            resolver.resolve("secret"),
            Err(Error::BoundaryEscape { .. })
        ));
    }
}
