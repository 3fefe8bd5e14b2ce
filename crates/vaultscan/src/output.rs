//! Rendering of reports as text, JSON, CSV or bare paths.

use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::path::Path;
use std::str::FromStr;
use vaultscan_core::{DeadLink, RenameResult, ScanResult, group_by_folder};
use vaultscan_graph::{Backlink, HealthReport, VaultStats};
use vaultscan_vault::{LinkStatus, OutgoingLink, OutgoingLinks};

use crate::cli::DeadLinkGrouping;

/// Dead links listed in the health text report
const HEALTH_DEAD_LINK_PREVIEW: usize = 10;

/// Width of truncated rename previews
const PREVIEW_WIDTH: usize = 60;

/// Output format preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable report
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
    /// Comma-separated rows with a header
    Csv,
    /// One absolute path per line
    Paths,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "human" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "paths" => Ok(OutputFormat::Paths),
            _ => Err(format!(
                "Unknown output format '{}'. Valid options: text, json, csv, paths",
                s
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Paths => write!(f, "paths"),
        }
    }
}

impl OutputFormat {
    /// Fail unless `self` is one of `supported`
    pub fn ensure(self, command: &str, supported: &[OutputFormat]) -> Result<Self> {
        if supported.contains(&self) {
            return Ok(self);
        }
        let names: Vec<String> = supported.iter().map(ToString::to_string).collect();
        bail!(
            "{} does not support --format {} (use one of: {})",
            command,
            self,
            names.join(", ")
        )
    }
}

/// Pretty JSON with a trailing newline
pub fn to_json_string<T: Serialize + ?Sized>(data: &T, context: &str) -> Result<String> {
    let mut json = serde_json::to_string_pretty(data)
        .with_context(|| format!("Failed to serialize {} as JSON", context))?;
    json.push('\n');
    Ok(json)
}

/// CSV built row by row; fields are quoted only when needed
#[derive(Debug, Clone)]
pub struct CsvBuilder {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvBuilder {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row(mut self, values: Vec<String>) -> Self {
        self.rows.push(values);
        self
    }

    pub fn build(self) -> String {
        let mut csv = String::new();
        push_record(&mut csv, &self.headers);
        for row in &self.rows {
            push_record(&mut csv, row);
        }
        csv
    }
}

fn push_record(out: &mut String, fields: &[String]) {
    let escaped: Vec<String> = fields.iter().map(|f| escape_csv(f)).collect();
    out.push_str(&escaped.join(","));
    out.push('\n');
}

fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Truncate to `max` characters, marking the cut with `...`
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max <= 3 {
        return s.chars().take(max).collect();
    }
    let mut out: String = s.chars().take(max - 3).collect();
    out.push_str("...");
    out
}

/// First `limit` items (all when `limit` is 0)
pub fn apply_limit<T>(items: &[T], limit: usize) -> &[T] {
    if limit > 0 && items.len() > limit {
        &items[..limit]
    } else {
        items
    }
}

fn limit_note(out: &mut String, total: usize, shown: usize) {
    if total > shown {
        let _ = writeln!(
            out,
            "  ...and {} more (use --limit 0 to show all)\n",
            total - shown
        );
    }
}

fn absolute_paths<'a>(root: &Path, rel_paths: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for rel in rel_paths {
        let _ = writeln!(out, "{}", root.join(rel).display());
    }
    out
}

fn base_name(rel_path: &str) -> &str {
    rel_path.rsplit_once('/').map(|(_, n)| n).unwrap_or(rel_path)
}

pub fn render_health(
    report: &HealthReport,
    result: &ScanResult,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => to_json_string(report, "health report"),
        OutputFormat::Csv => Ok(CsvBuilder::new(&[
            "status",
            "health_score",
            "total_notes",
            "total_links",
            "orphans",
            "dead_links",
            "frontmatter_issues",
        ])
        .add_row(vec![
            report.status.as_str().to_string(),
            report.health_score.to_string(),
            report.total_notes.to_string(),
            report.total_links.to_string(),
            report.orphans.to_string(),
            report.dead_links.to_string(),
            report.frontmatter_issues.to_string(),
        ])
        .build()),
        _ => {
            let mut out = String::new();
            let icon = if report.is_healthy() { "✓" } else { "✗" };
            let _ = writeln!(out, "{} Vault Health Check\n", icon);
            let _ = writeln!(out, "  Notes:              {}", report.total_notes);
            let _ = writeln!(out, "  Orphans:            {}", report.orphans);
            let _ = writeln!(out, "  Dead Links:         {}", report.dead_links);
            let _ = writeln!(out, "  Frontmatter Issues: {}", report.frontmatter_issues);
            let _ = writeln!(
                out,
                "  Status:             {} (score {})",
                report.status.as_str(),
                report.health_score
            );

            if !result.dead_links.is_empty() {
                let total = result.dead_links.len();
                if total > HEALTH_DEAD_LINK_PREVIEW {
                    let _ = writeln!(
                        out,
                        "\n  Dead Links: ({} total, showing first {})",
                        total, HEALTH_DEAD_LINK_PREVIEW
                    );
                } else {
                    let _ = writeln!(out, "\n  Dead Links:");
                }
                for dead in apply_limit(&result.dead_links, HEALTH_DEAD_LINK_PREVIEW) {
                    let _ = writeln!(out, "    {}:{} -> [[{}]]", dead.source, dead.line, dead.target);
                }
            }
            Ok(out)
        }
    }
}

pub fn render_stats(stats: &VaultStats, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json_string(stats, "vault stats"),
        OutputFormat::Csv => {
            let mut csv = CsvBuilder::new(&["folder", "notes"]);
            for folder in &stats.folders {
                csv = csv.add_row(vec![folder.name.clone(), folder.count.to_string()]);
            }
            if stats.other_folders > 0 {
                csv = csv.add_row(vec![
                    format!("...{} more", stats.other_folders),
                    stats.other_notes.to_string(),
                ]);
            }
            Ok(csv.build())
        }
        _ => {
            let mut out = String::new();
            let _ = writeln!(out, "Vault Statistics\n");
            let _ = writeln!(out, "  Total Notes: {}", stats.markdown_files);

            if !stats.folders.is_empty() {
                let _ = writeln!(out, "\n  By Folder:");
                let widest = stats.folders.first().map(|f| f.count).unwrap_or(0).max(1);
                for folder in &stats.folders {
                    let bar = "#".repeat((folder.count * 20).div_ceil(widest));
                    let name = truncate_chars(&folder.name, 15);
                    let _ = writeln!(out, "    {:<15} {:<20} ({})", name, bar, folder.count);
                }
                if stats.other_folders > 0 {
                    let _ = writeln!(
                        out,
                        "    {:<15} {:<20} ({})",
                        format!("...{} more", stats.other_folders),
                        "",
                        stats.other_notes
                    );
                }
            }

            let _ = writeln!(out, "\n  Summary:");
            let _ = writeln!(out, "    Total files:       {}", stats.total_files);
            let _ = writeln!(out, "    Markdown files:    {}", stats.markdown_files);
            let _ = writeln!(out, "    Directories:       {}", stats.directories);
            let _ = writeln!(out, "    Top-level folders: {}", stats.top_level_folders);

            let _ = writeln!(out, "\n  Health:");
            let _ = writeln!(out, "    Orphan files:      {}", stats.health.orphans);
            let _ = writeln!(out, "    Dead links:        {}", stats.health.dead_links);
            let _ = writeln!(out, "    No frontmatter:    {}", stats.health.frontmatter_issues);
            let _ = writeln!(out, "    Health score:      {}", stats.health.health_score);
            Ok(out)
        }
    }
}

/// `orphans` are the already filtered, sorted list; `total` counts them before the limit
pub fn render_orphans(
    orphans: &[String],
    total: usize,
    root: &Path,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => to_json_string(orphans, "orphans"),
        OutputFormat::Paths => Ok(absolute_paths(root, orphans.iter().map(String::as_str))),
        OutputFormat::Csv => {
            let mut csv = CsvBuilder::new(&["path", "folder"]);
            for orphan in orphans {
                csv = csv.add_row(vec![
                    orphan.clone(),
                    vaultscan_core::top_level_folder(orphan).to_string(),
                ]);
            }
            Ok(csv.build())
        }
        OutputFormat::Text => {
            let mut out = String::new();
            let _ = writeln!(out, "! Orphan Files ({} total)\n", total);
            if orphans.is_empty() {
                let _ = writeln!(out, "  No orphans found.");
                return Ok(out);
            }
            let by_folder = group_by_folder(orphans.iter().cloned(), |p| p.as_str());
            for (folder, files) in &by_folder {
                let _ = writeln!(out, "  {}/ ({})", folder, files.len());
                for file in files {
                    let _ = writeln!(out, "    {}", base_name(file));
                }
                out.push('\n');
            }
            limit_note(&mut out, total, orphans.len());
            Ok(out)
        }
    }
}

pub fn render_dead_links(
    dead_links: &[DeadLink],
    total: usize,
    grouping: DeadLinkGrouping,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => to_json_string(dead_links, "dead links"),
        OutputFormat::Csv => {
            let mut csv = CsvBuilder::new(&["source", "target", "line"]);
            for dead in dead_links {
                csv = csv.add_row(vec![
                    dead.source.clone(),
                    dead.target.clone(),
                    dead.line.to_string(),
                ]);
            }
            Ok(csv.build())
        }
        _ => {
            let mut out = String::new();
            let _ = writeln!(out, "! Dead Links ({} total)\n", total);
            if dead_links.is_empty() {
                let _ = writeln!(out, "  No dead links found.");
                return Ok(out);
            }

            match grouping {
                DeadLinkGrouping::Source => {
                    let mut by_source: BTreeMap<&str, Vec<&DeadLink>> = BTreeMap::new();
                    for dead in dead_links {
                        by_source.entry(dead.source.as_str()).or_default().push(dead);
                    }
                    for (source, links) in by_source {
                        let _ = writeln!(out, "  {} ({})", source, links.len());
                        for dead in links {
                            let _ = writeln!(out, "    :{} -> [[{}]]", dead.line, dead.target);
                        }
                        out.push('\n');
                    }
                }
                DeadLinkGrouping::Target => {
                    let mut by_target: BTreeMap<&str, Vec<&DeadLink>> = BTreeMap::new();
                    for dead in dead_links {
                        by_target.entry(dead.target.as_str()).or_default().push(dead);
                    }
                    let mut targets: Vec<(&str, Vec<&DeadLink>)> = by_target.into_iter().collect();
                    targets.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
                    for (target, links) in targets {
                        let _ = writeln!(out, "  [[{}]] ({} references)", target, links.len());
                        for dead in links {
                            let _ = writeln!(out, "    {}:{}", dead.source, dead.line);
                        }
                        out.push('\n');
                    }
                }
            }
            limit_note(&mut out, total, dead_links.len());
            Ok(out)
        }
    }
}

pub fn render_backlinks(
    note: &str,
    backlinks: &[Backlink],
    show_context: bool,
    root: &Path,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => to_json_string(backlinks, "backlinks"),
        OutputFormat::Paths => {
            let mut sources: Vec<&str> = backlinks.iter().map(|b| b.source.as_str()).collect();
            sources.dedup();
            Ok(absolute_paths(root, sources.into_iter()))
        }
        OutputFormat::Csv => {
            let mut csv = CsvBuilder::new(&["source", "line", "context"]);
            for backlink in backlinks {
                csv = csv.add_row(vec![
                    backlink.source.clone(),
                    backlink.line.to_string(),
                    backlink.context.clone(),
                ]);
            }
            Ok(csv.build())
        }
        OutputFormat::Text => {
            let mut out = String::new();
            let _ = writeln!(out, "<- Backlinks ({} found)\n", backlinks.len());
            if backlinks.is_empty() {
                let _ = writeln!(out, "  No backlinks found for [[{}]]", note);
                return Ok(out);
            }

            let mut current: Option<&str> = None;
            for backlink in backlinks {
                if current != Some(backlink.source.as_str()) {
                    let _ = writeln!(out, "  {}", backlink.source);
                    current = Some(backlink.source.as_str());
                }
                if show_context {
                    let context = truncate_chars(&backlink.context, 80);
                    let _ = writeln!(out, "    :{}  {}", backlink.line, context);
                } else {
                    let _ = writeln!(out, "    :{}", backlink.line);
                }
            }
            out.push('\n');
            Ok(out)
        }
    }
}

/// Which outgoing links to show
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkFilter {
    pub dead_only: bool,
    pub valid_only: bool,
    pub include_external: bool,
}

impl LinkFilter {
    fn keeps(&self, link: &OutgoingLink) -> bool {
        match link.status {
            LinkStatus::Dead => !self.valid_only,
            LinkStatus::Valid => !self.dead_only,
            LinkStatus::External | LinkStatus::Asset => {
                !self.dead_only && !self.valid_only
            }
        }
    }
}

#[derive(Serialize)]
struct FilteredLinks<'a> {
    source: &'a str,
    links: Vec<&'a OutgoingLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_urls: Option<&'a [String]>,
}

pub fn render_links(
    links: &OutgoingLinks,
    filter: LinkFilter,
    root: &Path,
    format: OutputFormat,
) -> Result<String> {
    let kept: Vec<&OutgoingLink> = links.links.iter().filter(|l| filter.keeps(l)).collect();
    let external = (filter.include_external && !filter.dead_only && !filter.valid_only)
        .then_some(links.external_urls.as_slice());

    match format {
        OutputFormat::Json => to_json_string(
            &FilteredLinks {
                source: &links.source,
                links: kept,
                external_urls: external,
            },
            "outgoing links",
        ),
        OutputFormat::Paths => Ok(absolute_paths(
            root,
            kept.iter().filter_map(|l| l.resolved.as_deref()),
        )),
        _ => {
            let mut out = String::new();
            let _ = writeln!(out, "-> Links from: {}\n", links.source);

            let section = |out: &mut String, title: &str, status: LinkStatus| {
                let items: Vec<&&OutgoingLink> =
                    kept.iter().filter(|l| l.status == status).collect();
                if items.is_empty() {
                    return;
                }
                let _ = writeln!(out, "  {} ({})", title, items.len());
                for link in items {
                    match (&link.resolved, status) {
                        (Some(resolved), _) => {
                            let _ = writeln!(out, "    [[{}]] -> {}", link.target, resolved);
                        }
                        (None, LinkStatus::Dead) => {
                            let _ = writeln!(out, "    [[{}]] (not found)", link.target);
                        }
                        (None, _) => {
                            let _ = writeln!(out, "    [[{}]]", link.target);
                        }
                    }
                }
                out.push('\n');
            };
            section(&mut out, "Valid", LinkStatus::Valid);
            section(&mut out, "Dead", LinkStatus::Dead);
            section(&mut out, "Assets", LinkStatus::Asset);
            section(&mut out, "External wikilinks", LinkStatus::External);

            if let Some(urls) = external
                && !urls.is_empty()
            {
                let _ = writeln!(out, "  External ({})", urls.len());
                for url in urls {
                    let _ = writeln!(out, "    {}", truncate_chars(url, 70));
                }
                out.push('\n');
            }

            if links.links.is_empty() {
                let _ = writeln!(out, "  No wikilinks found in this note.");
            }
            Ok(out)
        }
    }
}

pub fn render_rename(result: &RenameResult, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json_string(result, "rename result");
    }

    let mut out = String::new();
    let title = if result.executed {
        "Rename Complete"
    } else {
        "Rename Preview"
    };
    let _ = writeln!(out, "-> {}\n", title);
    let _ = writeln!(out, "  Source: {}", result.source);
    let _ = writeln!(out, "  Dest:   {}", result.destination);
    let _ = writeln!(
        out,
        "  Backlinks: {} in {} files\n",
        result.links_updated, result.files_modified
    );

    if !result.changes.is_empty() {
        let _ = writeln!(out, "  Link Updates:");
        let mut current: Option<&str> = None;
        for change in &result.changes {
            if current != Some(change.file.as_str()) {
                let _ = writeln!(out, "    {}", change.file);
                current = Some(change.file.as_str());
            }
            let _ = writeln!(
                out,
                "      :{} {}",
                change.line,
                truncate_chars(change.old_content.trim(), PREVIEW_WIDTH)
            );
            let _ = writeln!(
                out,
                "         -> {}",
                truncate_chars(change.new_content.trim(), PREVIEW_WIDTH)
            );
        }
        out.push('\n');
    }

    if !result.executed {
        let _ = writeln!(out, "  Run without --dry-run to execute");
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaultscan_core::RenameChange;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("human".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Paths.to_string(), "paths");
    }

    #[test]
    fn test_ensure_supported() {
        let err = OutputFormat::Csv
            .ensure("rename", &[OutputFormat::Text, OutputFormat::Json])
            .unwrap_err();
        assert!(err.to_string().contains("text, json"));
        assert!(OutputFormat::Json.ensure("x", &[OutputFormat::Json]).is_ok());
    }

    #[test]
    fn test_csv_quotes_only_when_needed() {
        let csv = CsvBuilder::new(&["source", "context"])
            .add_row(vec!["a.md".into(), "plain".into()])
            .add_row(vec!["b, c.md".into(), "say \"hi\"".into()])
            .build();
        assert_eq!(
            csv,
            "source,context\na.md,plain\n\"b, c.md\",\"say \"\"hi\"\"\"\n"
        );
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdefghij", 8), "abcde...");
        assert_eq!(truncate_chars("ééééé", 3), "ééé");
    }

    #[test]
    fn test_apply_limit() {
        let items = [1, 2, 3];
        assert_eq!(apply_limit(&items, 0), &[1, 2, 3]);
        assert_eq!(apply_limit(&items, 2), &[1, 2]);
        assert_eq!(apply_limit(&items, 5), &[1, 2, 3]);
    }

    #[test]
    fn test_dead_links_grouped_by_target() {
        let dead = vec![
            DeadLink::new("a.md", "gone", 1),
            DeadLink::new("b.md", "lost", 2),
            DeadLink::new("c.md", "gone", 3),
        ];
        let text =
            render_dead_links(&dead, 3, DeadLinkGrouping::Target, OutputFormat::Text).unwrap();
        let gone = text.find("[[gone]] (2 references)").unwrap();
        let lost = text.find("[[lost]] (1 references)").unwrap();
        assert!(gone < lost);
        assert!(text.contains("    c.md:3"));
    }

    #[test]
    fn test_orphans_text_groups_and_notes_limit() {
        let orphans = vec!["concepts/a.md".to_string(), "top.md".to_string()];
        let text = render_orphans(&orphans, 5, Path::new("/v"), OutputFormat::Text).unwrap();
        assert!(text.contains("(5 total)"));
        assert!(text.contains("  concepts/ (1)\n    a.md"));
        assert!(text.contains("  root/ (1)\n    top.md"));
        assert!(text.contains("...and 3 more"));

        let paths = render_orphans(&orphans, 2, Path::new("/v"), OutputFormat::Paths).unwrap();
        let expected = format!(
            "{}\n{}\n",
            Path::new("/v").join("concepts/a.md").display(),
            Path::new("/v").join("top.md").display()
        );
        assert_eq!(paths, expected);
    }

    #[test]
    fn test_rename_preview_text() {
        let result = RenameResult::new(
            "note-b.md",
            "note-b2.md",
            vec![RenameChange {
                file: "note-a.md".into(),
                line: 1,
                old_content: "See [[note-b]]".into(),
                new_content: "See [[note-b2]]".into(),
            }],
            false,
        );
        let text = render_rename(&result, OutputFormat::Text).unwrap();
        assert!(text.starts_with("-> Rename Preview"));
        assert!(text.contains("Backlinks: 1 in 1 files"));
        assert!(text.contains("      :1 See [[note-b]]\n         -> See [[note-b2]]"));
        assert!(text.contains("Run without --dry-run"));
    }
}
