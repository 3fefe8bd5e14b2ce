//! Vault health and statistics derived from a [`ScanResult`].

use serde::{Deserialize, Serialize};
use vaultscan_core::ScanResult;

/// Folders shown before the remainder is collapsed
pub const DEFAULT_TOP_FOLDERS: usize = 10;

/// Issue count below which a vault is only a warning
pub const WARNING_THRESHOLD: usize = 10;

/// Overall verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    pub fn from_issue_count(issues: usize) -> Self {
        match issues {
            0 => Self::Healthy,
            n if n < WARNING_THRESHOLD => Self::Warning,
            _ => Self::Critical,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

/// Health analysis report for the vault
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub total_notes: usize,
    /// Internal (non-external) references counted during the scan
    pub total_links: usize,
    pub orphans: usize,
    pub dead_links: usize,
    pub frontmatter_issues: usize,
    pub status: HealthStatus,
    /// Overall health score (0-100)
    pub health_score: u8,
}

impl HealthReport {
    pub fn from_scan(result: &ScanResult) -> Self {
        let mut report = Self {
            total_notes: result.markdown_files,
            total_links: result.incoming.values().sum(),
            orphans: result.orphans.len(),
            dead_links: result.dead_links.len(),
            frontmatter_issues: result.frontmatter_issues.len(),
            status: HealthStatus::from_issue_count(result.issue_count()),
            health_score: 100,
        };
        report.calculate_score();
        report
    }

    /// Calculate health score based on issue ratios
    pub fn calculate_score(&mut self) {
        if self.total_notes == 0 {
            self.health_score = 100;
            return;
        }

        let mut score: u8 = 100;

        // Dead links (up to -40 points)
        let dead_ratio = self.dead_links as f32 / self.total_links.max(1) as f32;
        score = score.saturating_sub((dead_ratio.min(1.0) * 40.0) as u8);

        // Orphans (up to -30 points)
        let orphan_ratio = self.orphans as f32 / self.total_notes as f32;
        score = score.saturating_sub((orphan_ratio.min(1.0) * 30.0) as u8);

        // Missing frontmatter (up to -20 points)
        let fm_ratio = self.frontmatter_issues as f32 / self.total_notes as f32;
        score = score.saturating_sub((fm_ratio.min(1.0) * 20.0) as u8);

        self.health_score = score;
    }

    pub fn issue_count(&self) -> usize {
        self.orphans + self.dead_links + self.frontmatter_issues
    }

    /// Front-ends exit non-zero when this holds
    pub fn has_dead_links(&self) -> bool {
        self.dead_links > 0
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// One row of the folder breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderCount {
    pub name: String,
    pub count: usize,
}

/// Counts and folder breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultStats {
    pub markdown_files: usize,
    pub total_files: usize,
    pub directories: usize,
    pub top_level_folders: usize,
    /// Largest folders first, at most the requested top-N
    pub folders: Vec<FolderCount>,
    /// Folders beyond the top-N
    pub other_folders: usize,
    /// Notes in folders beyond the top-N
    pub other_notes: usize,
    pub health: HealthReport,
}

impl VaultStats {
    pub fn from_scan(result: &ScanResult, top: usize) -> Self {
        let mut folders: Vec<FolderCount> = result
            .folders
            .iter()
            .map(|(name, count)| FolderCount {
                name: name.clone(),
                count: *count,
            })
            .collect();
        folders.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

        let top_level_folders = folders.len();
        let rest = folders.split_off(top.min(folders.len()));

        Self {
            markdown_files: result.markdown_files,
            total_files: result.total_files,
            directories: result.directories,
            top_level_folders,
            folders,
            other_folders: rest.len(),
            other_notes: rest.iter().map(|f| f.count).sum(),
            health: HealthReport::from_scan(result),
        }
    }
}
