//! Core data models shared by the scanner and the rename transformer.
//!
//! Paths inside a vault are carried as vault-relative strings with `/`
//! separators; lowercase lookup keys are derived on demand and never stored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Folder key used for notes that sit directly in the vault root.
pub const ROOT_FOLDER: &str = "root";

/// Top-level folder of a vault-relative path, or [`ROOT_FOLDER`].
pub fn top_level_folder(rel_path: &str) -> &str {
    match rel_path.split_once('/') {
        Some((first, _)) => first,
        None => ROOT_FOLDER,
    }
}

/// Strip a trailing `.md` (any case) from a name or path.
pub fn strip_md_extension(name: &str) -> &str {
    let len = name.len();
    if len >= 3 && name.is_char_boundary(len - 3) && name[len - 3..].eq_ignore_ascii_case(".md") {
        &name[..len - 3]
    } else {
        name
    }
}

/// Trim, unify separators and drop a leading `./` or `/` and the `.md` suffix.
///
/// Case is preserved.
pub fn clean_identifier(identifier: &str) -> String {
    let unified = identifier.trim().replace('\\', "/");
    let trimmed = unified.trim_start_matches("./").trim_start_matches('/');
    strip_md_extension(trimmed).to_string()
}

/// A markdown file in the vault
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteFile {
    /// Path relative to the vault root, `/`-separated, original case
    pub rel_path: String,
    /// Absolute path on disk
    pub path: PathBuf,
}

impl NoteFile {
    pub fn new(rel_path: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            rel_path: rel_path.into(),
            path: path.into(),
        }
    }

    /// File name including extension
    pub fn file_name(&self) -> &str {
        self.rel_path
            .rsplit_once('/')
            .map(|(_, name)| name)
            .unwrap_or(&self.rel_path)
    }

    /// File name without the `.md` extension, original case
    pub fn basename(&self) -> &str {
        strip_md_extension(self.file_name())
    }

    /// Relative path without the `.md` extension, original case
    pub fn rel_stem(&self) -> &str {
        strip_md_extension(&self.rel_path)
    }

    /// Directory part of the relative path (empty at the vault root)
    pub fn parent_dir(&self) -> &str {
        self.rel_path
            .rsplit_once('/')
            .map(|(dir, _)| dir)
            .unwrap_or("")
    }

    /// Lowercase bare basename without extension
    pub fn basename_key(&self) -> String {
        self.basename().to_lowercase()
    }

    /// Lowercase relative path with extension
    pub fn rel_key(&self) -> String {
        self.rel_path.to_lowercase()
    }

    /// Lowercase relative path without extension
    pub fn stem_key(&self) -> String {
        self.rel_stem().to_lowercase()
    }

    /// Top-level folder used for tallies
    pub fn folder(&self) -> &str {
        top_level_folder(&self.rel_path)
    }
}

/// How a reference target is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkClass {
    /// URL or mailto, never resolved
    External,
    /// Trailing `/`, resolved against the folder set
    Folder,
    /// Non-note attachment, counted but never dead
    Asset,
    /// Another note, resolved against the file set
    Note,
    /// `[[#heading]]` pointing into the same file
    SelfHeading,
}

/// An internal reference that resolves to nothing
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeadLink {
    /// Vault-relative path of the referencing note
    pub source: String,
    /// Normalized target, original case
    pub target: String,
    /// 1-based line number
    pub line: usize,
}

impl DeadLink {
    pub fn new(source: impl Into<String>, target: impl Into<String>, line: usize) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            line,
        }
    }
}

/// Aggregated outcome of one vault scan.
///
/// Dead-link and frontmatter-issue order follows parse completion; use
/// [`ScanResult::sorted`] for stable output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Canonical vault root
    pub vault_root: PathBuf,
    /// Regular files of any kind
    pub total_files: usize,
    /// Markdown notes
    pub markdown_files: usize,
    /// Directories below the root
    pub directories: usize,
    /// Markdown count per top-level folder
    pub folders: BTreeMap<String, usize>,
    /// Notes nothing links to
    pub orphans: Vec<String>,
    /// Unresolved internal references
    pub dead_links: Vec<DeadLink>,
    /// Notes whose first line does not open frontmatter
    pub frontmatter_issues: Vec<String>,
    /// Lowercase normalized target -> occurrence count
    pub incoming: BTreeMap<String, usize>,
}

impl ScanResult {
    /// Incoming count for a lowercase key
    pub fn incoming_count(&self, key: &str) -> usize {
        self.incoming.get(key).copied().unwrap_or(0)
    }

    /// Whether any lookup key of `note` has incoming references
    pub fn is_referenced(&self, note: &NoteFile) -> bool {
        self.incoming_count(&note.basename_key()) > 0
            || self.incoming_count(&note.rel_key()) > 0
            || self.incoming_count(&note.stem_key()) > 0
    }

    /// Copy with every list sorted by path (then line)
    pub fn sorted(&self) -> Self {
        let mut out = self.clone();
        out.orphans.sort();
        out.frontmatter_issues.sort();
        out.dead_links.sort_by(|a, b| {
            a.source
                .cmp(&b.source)
                .then(a.line.cmp(&b.line))
                .then_with(|| a.target.cmp(&b.target))
        });
        out
    }

    pub fn issue_count(&self) -> usize {
        self.orphans.len() + self.dead_links.len() + self.frontmatter_issues.len()
    }

    /// Orphans grouped by top-level folder
    pub fn orphans_by_folder(&self) -> BTreeMap<String, Vec<String>> {
        group_by_folder(self.orphans.iter().cloned(), |p| p.as_str())
    }

    /// Dead links grouped by the top-level folder of their source
    pub fn dead_links_by_folder(&self) -> BTreeMap<String, Vec<DeadLink>> {
        group_by_folder(self.dead_links.iter().cloned(), |d| d.source.as_str())
    }

    /// Orphans under `folder` (case-insensitive prefix match on the relative path)
    pub fn orphans_in(&self, folder: &str) -> Vec<String> {
        self.orphans
            .iter()
            .filter(|p| in_folder(p, folder))
            .cloned()
            .collect()
    }

    /// Dead links whose source lies under `folder`
    pub fn dead_links_in(&self, folder: &str) -> Vec<DeadLink> {
        self.dead_links
            .iter()
            .filter(|d| in_folder(&d.source, folder))
            .cloned()
            .collect()
    }
}

/// Whether `rel_path` lies under `folder`, ignoring case and surrounding slashes.
pub fn in_folder(rel_path: &str, folder: &str) -> bool {
    let folder = folder.trim_matches('/').to_lowercase();
    if folder.is_empty() {
        return true;
    }
    let path = rel_path.to_lowercase();
    path.strip_prefix(&folder)
        .is_some_and(|rest| rest.starts_with('/'))
}

/// Group items by the top-level folder of the path `key` extracts
pub fn group_by_folder<T, I, F>(items: I, key: F) -> BTreeMap<String, Vec<T>>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> &str,
{
    let mut groups: BTreeMap<String, Vec<T>> = BTreeMap::new();
    for item in items {
        let folder = top_level_folder(key(&item)).to_string();
        groups.entry(folder).or_default().push(item);
    }
    groups
}

/// A single line rewrite computed by the rename analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameChange {
    /// Vault-relative path of the file to rewrite
    pub file: String,
    /// 1-based line number
    pub line: usize,
    pub old_content: String,
    pub new_content: String,
}

/// Outcome of a rename (planned or applied)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameResult {
    /// Vault-relative source path
    pub source: String,
    /// Vault-relative destination path
    pub destination: String,
    pub changes: Vec<RenameChange>,
    /// Distinct files touched by `changes`
    pub files_modified: usize,
    /// Number of rewritten lines
    pub links_updated: usize,
    /// False for dry runs
    pub executed: bool,
}

impl RenameResult {
    /// Build a result, deriving the counters from `changes`
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        changes: Vec<RenameChange>,
        executed: bool,
    ) -> Self {
        let mut files: Vec<&str> = changes.iter().map(|c| c.file.as_str()).collect();
        files.sort_unstable();
        files.dedup();
        let files_modified = files.len();
        let links_updated = changes.len();
        Self {
            source: source.into(),
            destination: destination.into(),
            changes,
            files_modified,
            links_updated,
            executed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_keys() {
        let note = NoteFile::new("Projects/Alpha Plan.MD", "/v/Projects/Alpha Plan.MD");
        assert_eq!(note.file_name(), "Alpha Plan.MD");
        assert_eq!(note.basename(), "Alpha Plan");
        assert_eq!(note.basename_key(), "alpha plan");
        assert_eq!(note.rel_key(), "projects/alpha plan.md");
        assert_eq!(note.stem_key(), "projects/alpha plan");
        assert_eq!(note.parent_dir(), "Projects");
        assert_eq!(note.folder(), "Projects");
    }

    #[test]
    fn test_root_note() {
        let note = NoteFile::new("index.md", "/v/index.md");
        assert_eq!(note.folder(), ROOT_FOLDER);
        assert_eq!(note.parent_dir(), "");
        assert_eq!(note.rel_stem(), "index");
    }

    #[test]
    fn test_strip_md_extension() {
        assert_eq!(strip_md_extension("note.md"), "note");
        assert_eq!(strip_md_extension("note.Md"), "note");
        assert_eq!(strip_md_extension("note"), "note");
        assert_eq!(strip_md_extension("md"), "md");
        assert_eq!(strip_md_extension("日本.md"), "日本");
    }

    #[test]
    fn test_clean_identifier() {
        assert_eq!(clean_identifier(" ./Notes\\Plan.md "), "Notes/Plan");
        assert_eq!(clean_identifier("/a/b"), "a/b");
        assert_eq!(clean_identifier(".md"), "");
    }

    #[test]
    fn test_is_referenced_by_any_key() {
        let note = NoteFile::new("a/b.md", "/v/a/b.md");
        let mut result = ScanResult::default();
        assert!(!result.is_referenced(&note));

        result.incoming.insert("a/b".to_string(), 1);
        assert!(result.is_referenced(&note));
    }

    #[test]
    fn test_sorted_and_grouping() {
        let result = ScanResult {
            orphans: vec!["z.md".into(), "docs/a.md".into(), "Docs/c.md".into()],
            dead_links: vec![
                DeadLink::new("b.md", "x", 3),
                DeadLink::new("b.md", "y", 1),
                DeadLink::new("a.md", "z", 9),
            ],
            ..Default::default()
        };

        let sorted = result.sorted();
        assert_eq!(sorted.orphans[0], "Docs/c.md");
        assert_eq!(sorted.dead_links[0].source, "a.md");
        assert_eq!(sorted.dead_links[1].line, 1);

        let groups = result.orphans_by_folder();
        assert_eq!(groups[ROOT_FOLDER], vec!["z.md".to_string()]);
        assert_eq!(groups["docs"].len(), 1);

        assert_eq!(result.orphans_in("DOCS/").len(), 2);
        assert!(result.orphans_in("doc").is_empty());
    }

    #[test]
    fn test_rename_result_counters() {
        let change = |file: &str, line| RenameChange {
            file: file.to_string(),
            line,
            old_content: "[[a]]".into(),
            new_content: "[[b]]".into(),
        };
        let result = RenameResult::new(
            "a.md",
            "b.md",
            vec![change("x.md", 1), change("x.md", 4), change("y.md", 2)],
            false,
        );
        assert_eq!(result.files_modified, 2);
        assert_eq!(result.links_updated, 3);
        assert!(!result.executed);
    }
}
