//! Offset-stable line rewriting.

use crate::matcher::{MatchKind, NoteMatcher};
use crate::wikilinks::scan_line;
use std::ops::Range;
use vaultscan_core::{NoteFile, strip_md_extension};

/// Replace `span` of a line with `text`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub span: Range<usize>,
    pub text: String,
}

/// Apply non-overlapping replacements, last offset first, into a new buffer.
pub fn apply_replacements(line: &str, mut replacements: Vec<Replacement>) -> String {
    replacements.sort_by(|a, b| b.span.start.cmp(&a.span.start));

    let mut out = line.to_string();
    for replacement in replacements {
        out.replace_range(replacement.span, &replacement.text);
    }
    out
}

/// New names for a renamed note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameTargets {
    /// Replaces bare references
    pub basename: String,
    /// Replaces path-qualified references when the note changes folder
    /// (vault-relative, no extension)
    pub rel_stem: String,
    /// Source basename as it is spelled on disk
    pub old_basename: String,
    /// Destination directory equals the source directory (case-insensitive)
    pub same_folder: bool,
}

impl RenameTargets {
    /// Targets for moving `source` to the vault-relative `destination` (with `.md`)
    pub fn for_move(source: &NoteFile, destination: &str) -> Self {
        let rel_stem = strip_md_extension(destination);
        let (dir, basename) = rel_stem.rsplit_once('/').unwrap_or(("", rel_stem));
        Self {
            basename: basename.to_string(),
            rel_stem: rel_stem.to_string(),
            old_basename: source.basename().to_string(),
            same_folder: dir.to_lowercase() == source.parent_dir().to_lowercase(),
        }
    }

    /// Replacement for a reference written as `written` (no extension or fragment)
    fn replacement(&self, kind: MatchKind, written: &str) -> String {
        if kind == MatchKind::Path && !self.same_folder {
            return self.rel_stem.clone();
        }
        let (prefix, name) = match written.rfind('/') {
            Some(idx) => written.split_at(idx + 1),
            None => ("", written),
        };
        format!("{prefix}{}", follow_case(name, &self.old_basename, &self.basename))
    }
}

/// `new` spelled the way `written` spelled `old`.
///
/// An all-lowercase or all-uppercase spelling of the old name carries over to
/// the new one; any other spelling takes `new` as given.
fn follow_case(written: &str, old: &str, new: &str) -> String {
    if written != old {
        if written == old.to_lowercase() {
            return new.to_lowercase();
        }
        if written == old.to_uppercase() {
            return new.to_uppercase();
        }
    }
    new.to_string()
}

/// Rewrite every reference to the matched note on one line.
///
/// Fragments, aliases and an explicit `.md` suffix are kept as written. A
/// path reference keeps its own directory prefix unless the note moves to
/// another folder.
/// Returns `None` when nothing on the line changes.
pub fn rewrite_line(line: &str, matcher: &NoteMatcher, targets: &RenameTargets) -> Option<String> {
    let replacements: Vec<Replacement> = scan_line(line, 0)
        .into_iter()
        .filter_map(|occurrence| {
            let kind = matcher.matches(&occurrence)?;
            let written = strip_md_extension(&occurrence.target);
            let mut text = targets.replacement(kind, written);
            text.push_str(&occurrence.target[written.len()..]);
            text.push_str(&occurrence.fragment);
            Some(Replacement {
                span: occurrence.span,
                text,
            })
        })
        .collect();

    if replacements.is_empty() {
        return None;
    }

    let rewritten = apply_replacements(line, replacements);
    (rewritten != line).then_some(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(rel: &str, destination: &str) -> (NoteMatcher, RenameTargets) {
        let note = NoteFile::new(rel, format!("/v/{rel}"));
        let matcher = NoteMatcher::for_note(&note, rel);
        (matcher, RenameTargets::for_move(&note, destination))
    }

    #[test]
    fn test_targets_for_move() {
        let note = NoteFile::new("Docs/Plan.md", "/v/Docs/Plan.md");
        let targets = RenameTargets::for_move(&note, "docs/Roadmap.md");
        assert_eq!(targets.basename, "Roadmap");
        assert_eq!(targets.rel_stem, "docs/Roadmap");
        assert_eq!(targets.old_basename, "Plan");
        assert!(targets.same_folder);

        assert!(!RenameTargets::for_move(&note, "Roadmap.md").same_folder);
    }

    #[test]
    fn test_bare_rename() {
        let (matcher, targets) = setup("note-b.md", "note-b2.md");
        assert_eq!(
            rewrite_line("See [[note-b]]", &matcher, &targets).as_deref(),
            Some("See [[note-b2]]")
        );
    }

    #[test]
    fn test_fragment_alias_and_extension_preserved() {
        let (matcher, targets) = setup("docs/Plan.md", "docs/Roadmap.md");
        let line = "[[Plan#Goals|goals]], ![[Plan.md#^b1]] and [[docs/Plan]]";
        assert_eq!(
            rewrite_line(line, &matcher, &targets).as_deref(),
            Some("[[Roadmap#Goals|goals]], ![[Roadmap.md#^b1]] and [[docs/Roadmap]]")
        );
    }

    #[test]
    fn test_case_of_reference_carries_over() {
        let (matcher, targets) = setup("docs/Note-B.md", "docs/Note-C.md");
        assert_eq!(
            rewrite_line("[[note-b]] [[NOTE-B]] [[Note-B]] [[nOtE-b]]", &matcher, &targets)
                .as_deref(),
            Some("[[note-c]] [[NOTE-C]] [[Note-C]] [[Note-C]]")
        );
    }

    #[test]
    fn test_subpath_keeps_prefix_within_folder() {
        let (matcher, targets) = setup("a/b/Note.md", "a/b/Note2.md");
        assert_eq!(
            rewrite_line("[[b/Note]] [[a/b/Note|x]] [[B/note.md]]", &matcher, &targets)
                .as_deref(),
            Some("[[b/Note2]] [[a/b/Note2|x]] [[B/note2.md]]")
        );
    }

    #[test]
    fn test_subpath_becomes_full_path_when_folder_changes() {
        let (matcher, targets) = setup("a/b/Note.md", "archive/Note.md");
        assert_eq!(
            rewrite_line("[[b/Note]] and [[Note]]", &matcher, &targets).as_deref(),
            Some("[[archive/Note]] and [[Note]]")
        );
    }

    #[test]
    fn test_multiple_replacements_different_lengths() {
        let (matcher, targets) = setup("a.md", "a-much-longer-name.md");
        assert_eq!(
            rewrite_line("[[a]] [[b]] [[a|x]]", &matcher, &targets).as_deref(),
            Some("[[a-much-longer-name]] [[b]] [[a-much-longer-name|x]]")
        );
    }

    #[test]
    fn test_untouched_line_returns_none() {
        let (matcher, targets) = setup("a.md", "z.md");
        assert!(rewrite_line("[[b]] and [[#a]]", &matcher, &targets).is_none());
        assert!(rewrite_line("plain text", &matcher, &targets).is_none());
    }

    #[test]
    fn test_apply_replacements_descending() {
        let out = apply_replacements(
            "0123456789",
            vec![
                Replacement { span: 1..2, text: "AAA".into() },
                Replacement { span: 7..9, text: "".into() },
            ],
        );
        assert_eq!(out, "0AAA234569");
    }
}
