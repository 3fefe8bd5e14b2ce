//! Configuration types for vault scans.
//!
//! Follows a builder pattern for complex configuration with validation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Hard ceiling on scan workers regardless of hardware parallelism.
pub const DEFAULT_MAX_WORKERS: usize = 8;

/// Default per-line read limit (1 MiB).
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

/// Lines shorter than this limit would reject ordinary embedded content.
pub const MIN_LINE_BYTES: usize = 64 * 1024;

/// File extensions treated as non-note assets, lowercase without the dot.
pub const DEFAULT_ASSET_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "webp", "pdf", "mp3", "mp4", "wav", "mov", "zip",
];

/// File name prefixes exempt from orphan detection.
pub const DEFAULT_ORPHAN_EXEMPT_PREFIXES: &[&str] = &["_", "index"];

/// Configuration for a single scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Upper bound on worker threads
    pub max_workers: usize,
    /// Longest line accepted before a file is treated as unreadable
    pub max_line_bytes: usize,
    /// Extensions classified as assets (lowercase, no dot)
    pub asset_extensions: BTreeSet<String>,
    /// Notes whose file name starts with one of these are never orphans
    pub orphan_exempt_prefixes: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            asset_extensions: DEFAULT_ASSET_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            orphan_exempt_prefixes: DEFAULT_ORPHAN_EXEMPT_PREFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ScanConfig {
    /// Create new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scan config with builder
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::new()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_workers == 0 {
            return Err(Error::config_error("max_workers must be at least 1"));
        }

        if self.max_line_bytes < MIN_LINE_BYTES {
            return Err(Error::config_error(format!(
                "max_line_bytes must be at least {} bytes, got {}",
                MIN_LINE_BYTES, self.max_line_bytes
            )));
        }

        if self.asset_extensions.iter().any(|ext| ext.is_empty()) {
            return Err(Error::config_error("asset extensions cannot be empty"));
        }

        Ok(())
    }

    /// Normalize user-supplied values (`.PNG` -> `png`).
    pub fn normalized(mut self) -> Self {
        self.asset_extensions = self
            .asset_extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Worker count for a scan over `file_count` notes.
    ///
    /// Never exceeds the file count, the machine's parallelism or the configured cap.
    pub fn worker_count(&self, file_count: usize) -> usize {
        let hardware = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        file_count.min(hardware).min(self.max_workers)
    }

    /// Whether `file_name` is exempt from orphan detection
    pub fn is_orphan_exempt(&self, file_name: &str) -> bool {
        self.orphan_exempt_prefixes
            .iter()
            .any(|prefix| file_name.starts_with(prefix.as_str()))
    }

    /// Whether a lowercase extension is an asset extension
    pub fn is_asset_extension(&self, ext_lower: &str) -> bool {
        self.asset_extensions.contains(ext_lower)
    }
}

/// Builder for ScanConfig
pub struct ScanConfigBuilder {
    config: ScanConfig,
}

impl ScanConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: ScanConfig::default(),
        }
    }

    /// Set the worker cap
    pub fn max_workers(mut self, workers: usize) -> Self {
        self.config.max_workers = workers;
        self
    }

    /// Set the per-line byte limit
    pub fn max_line_bytes(mut self, bytes: usize) -> Self {
        self.config.max_line_bytes = bytes;
        self
    }

    /// Add one asset extension
    pub fn asset_extension(mut self, ext: impl Into<String>) -> Self {
        self.config.asset_extensions.insert(ext.into());
        self
    }

    /// Replace the orphan exemption prefixes
    pub fn orphan_exempt_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.orphan_exempt_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Build and validate
    pub fn build(self) -> Result<ScanConfig> {
        let config = self.config.normalized();
        config.validate()?;
        Ok(config)
    }
}

impl Default for ScanConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-tuned scan configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigProfile {
    /// Stock settings
    #[default]
    Default,
    /// Large vaults with long embedded blobs
    LargeVault,
    /// Shared or low-memory machines
    Constrained,
}

impl ConfigProfile {
    /// Create a ScanConfig from this profile
    pub fn create_config(self) -> ScanConfig {
        let mut config = ScanConfig::new();

        match self {
            Self::Default => {}
            Self::LargeVault => {
                config.max_line_bytes = 8 * DEFAULT_MAX_LINE_BYTES;
            }
            Self::Constrained => {
                config.max_workers = 2;
                config.max_line_bytes = 256 * 1024;
            }
        }

        config
    }

    /// Profile name as accepted on the command line
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::LargeVault => "large-vault",
            Self::Constrained => "constrained",
        }
    }
}

impl std::str::FromStr for ConfigProfile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "large-vault" | "large" => Ok(Self::LargeVault),
            "constrained" => Ok(Self::Constrained),
            other => Err(Error::config_error(format!(
                "Unknown profile '{}'. Valid options: default, large-vault, constrained",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ScanConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_workers, 8);
        assert!(config.is_asset_extension("png"));
        assert!(!config.is_asset_extension("md"));
    }

    #[test]
    fn test_builder_normalizes_extensions() {
        let config = ScanConfig::builder()
            .asset_extension(".HEIC")
            .max_workers(4)
            .build()
            .unwrap();
        assert!(config.is_asset_extension("heic"));
        assert_eq!(config.max_workers, 4);
    }

    #[test]
    fn test_builder_rejects_zero_workers() {
        assert!(ScanConfig::builder().max_workers(0).build().is_err());
    }

    #[test]
    fn test_builder_rejects_tiny_line_limit() {
        assert!(ScanConfig::builder().max_line_bytes(1024).build().is_err());
    }

    #[test]
    fn test_worker_count_bounds() {
        let config = ScanConfig::default();
        assert_eq!(config.worker_count(0), 0);
        assert_eq!(config.worker_count(1), 1);
        assert!(config.worker_count(1000) <= 8);

        let single = ScanConfig::builder().max_workers(1).build().unwrap();
        assert_eq!(single.worker_count(50), 1);
    }

    #[test]
    fn test_orphan_exemptions() {
        let config = ScanConfig::default();
        assert!(config.is_orphan_exempt("_template.md"));
        assert!(config.is_orphan_exempt("index.md"));
        assert!(config.is_orphan_exempt("index-2024.md"));
        assert!(!config.is_orphan_exempt("note.md"));
    }

    #[test]
    fn test_profiles() {
        assert_eq!(ConfigProfile::Default.create_config(), ScanConfig::default());
        assert_eq!(ConfigProfile::Constrained.create_config().max_workers, 2);
        assert!(ConfigProfile::LargeVault.create_config().validate().is_ok());
        assert_eq!(
            "large-vault".parse::<ConfigProfile>().unwrap(),
            ConfigProfile::LargeVault
        );
        assert!("bogus".parse::<ConfigProfile>().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: ScanConfig = serde_json::from_str(r#"{"max_workers": 3}"#).unwrap();
        assert_eq!(config.max_workers, 3);
        assert_eq!(config.max_line_bytes, DEFAULT_MAX_LINE_BYTES);
        assert!(config.is_asset_extension("png"));
    }
}
