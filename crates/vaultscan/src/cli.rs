//! Command-line surface.

use crate::output::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Fast CLI for Obsidian vault operations
#[derive(Parser, Debug)]
#[command(name = "vaultscan", author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the Obsidian vault directory (`~` and `$VARS` are expanded)
    #[arg(short, long, global = true, env = "VAULTSCAN_VAULT")]
    pub vault: Option<String>,

    /// Configuration file (YAML, TOML or JSON)
    #[arg(short, long, global = true, env = "VAULTSCAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Configuration profile (default, large-vault, constrained)
    #[arg(short, long, global = true, default_value = "default")]
    pub profile: String,

    /// Cap on scan worker threads
    #[arg(long, global = true)]
    pub max_workers: Option<usize>,

    /// Longest accepted line in bytes
    #[arg(long, global = true)]
    pub max_line_bytes: Option<usize>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn", env = "VAULTSCAN_LOG_LEVEL")]
    pub log_level: String,

    /// Log output format (human, json)
    #[arg(long, global = true, default_value = "human")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Quick health check; exits non-zero when dead links exist
    Health(FormatArgs),

    /// Counts, folder breakdown and health summary
    Stats(StatsArgs),

    /// Notes with no incoming links
    Orphans(OrphansArgs),

    /// Links pointing at notes or folders that do not exist
    Deadlinks(DeadlinksArgs),

    /// Every line linking to a note
    Backlinks(BacklinksArgs),

    /// Everything a note links to
    Links(LinksArgs),

    /// Rename a note and rewrite every link to it
    Rename(RenameArgs),
}

#[derive(Args, Debug, Clone)]
pub struct FormatArgs {
    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    #[command(flatten)]
    pub output: FormatArgs,

    /// Folders listed individually before the remainder is summed
    #[arg(long, default_value_t = vaultscan_graph::DEFAULT_TOP_FOLDERS)]
    pub top: usize,
}

#[derive(Args, Debug, Clone)]
pub struct OrphansArgs {
    #[command(flatten)]
    pub output: FormatArgs,

    /// Limit number of results (0 = no limit)
    #[arg(short = 'n', long, default_value_t = 0)]
    pub limit: usize,

    /// Only report notes under this folder
    #[arg(short, long)]
    pub folder: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct DeadlinksArgs {
    #[command(flatten)]
    pub output: FormatArgs,

    /// Limit number of results (0 = no limit)
    #[arg(short = 'n', long, default_value_t = 0)]
    pub limit: usize,

    /// Only report links whose source is under this folder
    #[arg(short, long)]
    pub folder: Option<String>,

    /// Grouping for text output
    #[arg(short, long, default_value = "source")]
    pub group: DeadLinkGrouping,
}

#[derive(Args, Debug, Clone)]
pub struct BacklinksArgs {
    /// Note name or vault-relative path
    pub note: String,

    #[command(flatten)]
    pub output: FormatArgs,

    /// Show the referencing line in text output
    #[arg(short = 'C', long)]
    pub context: bool,
}

#[derive(Args, Debug, Clone)]
pub struct LinksArgs {
    /// Note name or vault-relative path
    pub note: String,

    #[command(flatten)]
    pub output: FormatArgs,

    /// Show only dead links
    #[arg(long, conflicts_with = "valid_only")]
    pub dead_only: bool,

    /// Show only valid links
    #[arg(long)]
    pub valid_only: bool,

    /// Include bare http(s) URLs found in the text
    #[arg(long)]
    pub include_external: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RenameArgs {
    /// Note to rename (name or vault-relative path)
    pub old_name: String,

    /// New name; a path is taken relative to the vault root
    pub new_name: String,

    /// Preview changes without modifying files
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub output: FormatArgs,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Ok(LogFormat::Human),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!(
                "Unknown log format '{}'. Valid options: human, json",
                s
            )),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Human => write!(f, "human"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// How dead links are grouped in text output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeadLinkGrouping {
    #[default]
    Source,
    /// Most referenced target first
    Target,
}

impl FromStr for DeadLinkGrouping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "source" => Ok(DeadLinkGrouping::Source),
            "target" => Ok(DeadLinkGrouping::Target),
            _ => Err(format!(
                "Unknown grouping '{}'. Valid options: source, target",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "vaultscan",
            "orphans",
            "--vault",
            "/tmp/v",
            "--limit",
            "5",
            "--folder",
            "concepts",
            "--format",
            "csv",
        ])
        .unwrap();

        assert_eq!(cli.vault.as_deref(), Some("/tmp/v"));
        match cli.command {
            Command::Orphans(args) => {
                assert_eq!(args.limit, 5);
                assert_eq!(args.folder.as_deref(), Some("concepts"));
                assert_eq!(args.output.format, OutputFormat::Csv);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_rename_arguments() {
        let cli =
            Cli::try_parse_from(["vaultscan", "rename", "old", "archive/new", "--dry-run"]).unwrap();
        match cli.command {
            Command::Rename(args) => {
                assert_eq!(args.old_name, "old");
                assert_eq!(args.new_name, "archive/new");
                assert!(args.dry_run);
                assert_eq!(args.output.format, OutputFormat::Text);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_values() {
        assert!(Cli::try_parse_from(["vaultscan", "health", "--format", "xml"]).is_err());
        assert!(Cli::try_parse_from(["vaultscan", "deadlinks", "--group", "folder"]).is_err());
        assert!(
            Cli::try_parse_from(["vaultscan", "links", "n", "--dead-only", "--valid-only"])
                .is_err()
        );
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Human);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
