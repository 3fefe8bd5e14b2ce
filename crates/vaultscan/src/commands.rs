//! Subcommand handlers. Each returns rendered output plus an exit status.

use crate::cli::{
    BacklinksArgs, Cli, Command, DeadlinksArgs, FormatArgs, LinksArgs, OrphansArgs, RenameArgs,
    StatsArgs,
};
use crate::output::{self, LinkFilter};
use crate::settings::{self, Overrides};
use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;
use std::time::Instant;
use tracing::instrument;
use vaultscan_core::{ScanConfig, ScanResult};
use vaultscan_graph::{HealthReport, LinkGraphBuilder, VaultStats, find_backlinks};
use vaultscan_vault::{RenameTransformer, outgoing_links};

use crate::output::OutputFormat::{Csv, Json, Paths, Text};

/// What a command produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Text for stdout
    pub rendered: String,
    /// Process should exit non-zero
    pub failed: bool,
    /// Reason printed to stderr when `failed`
    pub message: Option<String>,
}

impl Outcome {
    fn ok(rendered: String) -> Self {
        Self {
            rendered,
            failed: false,
            message: None,
        }
    }

    fn failed(rendered: String, message: String) -> Self {
        Self {
            rendered,
            failed: true,
            message: Some(message),
        }
    }
}

/// Vault location and effective configuration shared by every command
#[derive(Debug, Clone)]
pub struct Session {
    pub vault: PathBuf,
    pub config: ScanConfig,
}

impl Session {
    /// Resolve the vault path and layer the configuration
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let vault = settings::require_vault(cli.vault.as_deref())?;
        let overrides = Overrides {
            max_workers: cli.max_workers,
            max_line_bytes: cli.max_line_bytes,
        };
        let config = settings::load_scan_config(&cli.profile, cli.config.as_deref(), &overrides)?;
        Ok(Self { vault, config })
    }

    /// Full scan on the blocking pool, sorted for stable output
    pub async fn scan(&self) -> Result<ScanResult> {
        let vault = self.vault.clone();
        let builder = LinkGraphBuilder::new(self.config.clone());
        let started = Instant::now();
        let result = tokio::task::spawn_blocking(move || builder.scan(&vault))
            .await
            .context("Scan task panicked")??;
        info!(
            "Scanned {} files in {:?}",
            result.total_files,
            started.elapsed()
        );
        Ok(result.sorted())
    }
}

/// Run the parsed command line
pub async fn run(cli: &Cli) -> Result<Outcome> {
    let session = Session::from_cli(cli)?;
    match &cli.command {
        Command::Health(args) => health(&session, args).await,
        Command::Stats(args) => stats(&session, args).await,
        Command::Orphans(args) => orphans(&session, args).await,
        Command::Deadlinks(args) => deadlinks(&session, args).await,
        Command::Backlinks(args) => backlinks(&session, args).await,
        Command::Links(args) => links(&session, args).await,
        Command::Rename(args) => rename(&session, args).await,
    }
}

#[instrument(skip_all, name = "cmd_health")]
pub async fn health(session: &Session, args: &FormatArgs) -> Result<Outcome> {
    let format = args.format.ensure("health", &[Text, Json, Csv])?;
    let result = session.scan().await?;
    let report = HealthReport::from_scan(&result);
    let rendered = output::render_health(&report, &result, format)?;

    if report.has_dead_links() {
        Ok(Outcome::failed(
            rendered,
            format!("vault has {} dead links", report.dead_links),
        ))
    } else {
        Ok(Outcome::ok(rendered))
    }
}

#[instrument(skip_all, name = "cmd_stats")]
pub async fn stats(session: &Session, args: &StatsArgs) -> Result<Outcome> {
    let format = args.output.format.ensure("stats", &[Text, Json, Csv])?;
    let result = session.scan().await?;
    let stats = VaultStats::from_scan(&result, args.top);
    Ok(Outcome::ok(output::render_stats(&stats, format)?))
}

#[instrument(skip_all, name = "cmd_orphans")]
pub async fn orphans(session: &Session, args: &OrphansArgs) -> Result<Outcome> {
    let format = args.output.format.ensure("orphans", &[Text, Json, Csv, Paths])?;
    let result = session.scan().await?;

    let filtered = match args.folder.as_deref() {
        Some(folder) => result.orphans_in(folder),
        None => result.orphans,
    };
    let shown = output::apply_limit(&filtered, args.limit);
    let rendered = output::render_orphans(shown, filtered.len(), &session.vault, format)?;
    Ok(Outcome::ok(rendered))
}

#[instrument(skip_all, name = "cmd_deadlinks")]
pub async fn deadlinks(session: &Session, args: &DeadlinksArgs) -> Result<Outcome> {
    let format = args.output.format.ensure("deadlinks", &[Text, Json, Csv])?;
    let result = session.scan().await?;

    let filtered = match args.folder.as_deref() {
        Some(folder) => result.dead_links_in(folder),
        None => result.dead_links,
    };
    let shown = output::apply_limit(&filtered, args.limit);
    let rendered = output::render_dead_links(shown, filtered.len(), args.group, format)?;
    Ok(Outcome::ok(rendered))
}

#[instrument(skip_all, fields(note = %args.note), name = "cmd_backlinks")]
pub async fn backlinks(session: &Session, args: &BacklinksArgs) -> Result<Outcome> {
    let format = args.output.format.ensure("backlinks", &[Text, Json, Csv, Paths])?;
    let vault = session.vault.clone();
    let config = session.config.clone();
    let note = args.note.clone();
    let found = tokio::task::spawn_blocking(move || find_backlinks(&vault, &note, &config))
        .await
        .context("Backlinks task panicked")??;

    let rendered =
        output::render_backlinks(&args.note, &found, args.context, &session.vault, format)?;
    Ok(Outcome::ok(rendered))
}

#[instrument(skip_all, fields(note = %args.note), name = "cmd_links")]
pub async fn links(session: &Session, args: &LinksArgs) -> Result<Outcome> {
    let format = args.output.format.ensure("links", &[Text, Json, Paths])?;
    let vault = session.vault.clone();
    let config = session.config.clone();
    let note = args.note.clone();
    let found = tokio::task::spawn_blocking(move || outgoing_links(&vault, &note, &config))
        .await
        .context("Links task panicked")??;

    let filter = LinkFilter {
        dead_only: args.dead_only,
        valid_only: args.valid_only,
        include_external: args.include_external,
    };
    let rendered = output::render_links(&found, filter, &session.vault, format)?;
    Ok(Outcome::ok(rendered))
}

#[instrument(skip_all, fields(from = %args.old_name, to = %args.new_name), name = "cmd_rename")]
pub async fn rename(session: &Session, args: &RenameArgs) -> Result<Outcome> {
    let format = args.output.format.ensure("rename", &[Text, Json])?;
    let transformer = RenameTransformer::new(&session.vault, session.config.clone())?;
    let result = transformer
        .rename(&args.old_name, &args.new_name, args.dry_run)
        .await?;
    Ok(Outcome::ok(output::render_rename(&result, format)?))
}
