//! Lowercase existence sets built once per scan.

use std::collections::HashSet;
use vaultscan_core::WalkOutput;

/// "Does this target exist" lookups, frozen before parsing starts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistenceIndex {
    files: HashSet<String>,
    folders: HashSet<String>,
}

impl ExistenceIndex {
    pub fn build(walk: &WalkOutput) -> Self {
        let mut files = HashSet::with_capacity(walk.notes.len() * 3);
        for note in &walk.notes {
            files.insert(note.rel_key());
            files.insert(note.stem_key());
            files.insert(note.basename_key());
        }

        let mut folders = HashSet::with_capacity(walk.directories.len() * 2);
        for dir in &walk.directories {
            let lower = dir.to_lowercase();
            folders.insert(format!("{lower}/"));
            folders.insert(lower);
        }

        Self { files, folders }
    }

    /// Note lookup; `key` must already be lowercase
    pub fn has_note(&self, key: &str) -> bool {
        self.files.contains(key) || self.files.contains(&format!("{key}.md"))
    }

    /// Folder lookup; `key` must already be lowercase
    pub fn has_folder(&self, key: &str) -> bool {
        self.folders.contains(key)
    }

    pub fn file_keys(&self) -> usize {
        self.files.len()
    }

    pub fn folder_keys(&self) -> usize {
        self.folders.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaultscan_core::NoteFile;

    #[test]
    fn test_lookup_variants() {
        let walk = WalkOutput {
            notes: vec![NoteFile::new("Projects/Alpha.md", "/v/Projects/Alpha.md")],
            directories: vec!["Projects".to_string(), "Projects/Sub".to_string()],
            ..Default::default()
        };
        let index = ExistenceIndex::build(&walk);

        assert!(index.has_note("alpha"));
        assert!(index.has_note("alpha.md"));
        assert!(index.has_note("projects/alpha"));
        assert!(index.has_note("projects/alpha.md"));
        assert!(!index.has_note("beta"));

        assert!(index.has_folder("projects/"));
        assert!(index.has_folder("projects/sub"));
        assert!(!index.has_folder("archive/"));
        assert_eq!(index.folder_keys(), 4);
    }
}
