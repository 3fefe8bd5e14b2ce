//! Decides whether a reference points at a given note.
//!
//! Shared by the backlinks query and the rename transformer so both see the
//! same set of references.

use crate::wikilinks::LinkOccurrence;
use vaultscan_core::{NoteFile, clean_identifier, strip_md_extension};

/// How an occurrence referred to the note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// `[[name]]`
    Bare,
    /// `[[dir/name]]`
    Path,
}

/// Lowercase keys describing one note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteMatcher {
    identifier: String,
    basename: String,
    rel_stem: String,
}

impl NoteMatcher {
    /// Matcher for a resolved note, addressed by `identifier`
    pub fn for_note(note: &NoteFile, identifier: &str) -> Self {
        Self {
            identifier: clean_identifier(identifier).to_lowercase(),
            basename: note.basename_key(),
            rel_stem: note.stem_key(),
        }
    }

    /// Matcher built from an identifier alone, without resolving it
    pub fn for_identifier(identifier: &str) -> Self {
        let identifier = clean_identifier(identifier).to_lowercase();
        let basename = identifier
            .rsplit('/')
            .next()
            .unwrap_or(&identifier)
            .to_string();
        Self {
            rel_stem: identifier.clone(),
            basename,
            identifier,
        }
    }

    /// Whether `note` is the target itself (skipped when scanning for references)
    pub fn is_target(&self, note: &NoteFile) -> bool {
        note.basename_key() == self.basename || note.stem_key() == self.identifier
    }

    /// Match a normalized target
    pub fn match_target(&self, target: &str) -> Option<MatchKind> {
        if target.is_empty() {
            return None;
        }
        let candidate = strip_md_extension(target).to_lowercase();

        if !candidate.contains('/') {
            return (candidate == self.basename).then_some(MatchKind::Bare);
        }

        let matches = candidate == self.identifier
            || candidate == self.rel_stem
            || self
                .rel_stem
                .strip_suffix(candidate.as_str())
                .is_some_and(|head| head.ends_with('/'));
        matches.then_some(MatchKind::Path)
    }

    /// Match one occurrence
    pub fn matches(&self, occurrence: &LinkOccurrence) -> Option<MatchKind> {
        self.match_target(&occurrence.target)
    }
}
