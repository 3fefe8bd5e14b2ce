//! Layered configuration: profile defaults, then an optional file, then
//! `VAULTSCAN_*` environment variables, then command-line flags.

use anyhow::{Context, Result, anyhow};
use config::{Config, Environment, File};
use log::debug;
use std::path::{Path, PathBuf};
use vaultscan_core::{ConfigProfile, ScanConfig};

/// Prefix of environment variables overriding scan settings
pub const ENV_PREFIX: &str = "VAULTSCAN";

/// Flag values that take precedence over every other layer
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub max_workers: Option<usize>,
    pub max_line_bytes: Option<usize>,
}

/// Build the effective scan configuration
pub fn load_scan_config(
    profile: &str,
    file: Option<&Path>,
    overrides: &Overrides,
) -> Result<ScanConfig> {
    let profile: ConfigProfile = profile.parse()?;
    let defaults = Config::try_from(&profile.create_config())
        .context("Failed to seed configuration defaults")?;

    let mut builder = Config::builder().add_source(defaults);
    if let Some(path) = file {
        builder = builder.add_source(File::from(path).required(true));
    }
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("asset_extensions")
            .with_list_parse_key("orphan_exempt_prefixes"),
    );

    let mut scan: ScanConfig = builder
        .build()
        .context("Failed to load configuration")?
        .try_deserialize()
        .context("Invalid configuration")?;

    if let Some(workers) = overrides.max_workers {
        scan.max_workers = workers;
    }
    if let Some(bytes) = overrides.max_line_bytes {
        scan.max_line_bytes = bytes;
    }

    let scan = scan.normalized();
    scan.validate()?;
    debug!(
        "Scan config: profile={} workers={} max_line_bytes={}",
        profile.as_str(),
        scan.max_workers,
        scan.max_line_bytes
    );
    Ok(scan)
}

/// Expand `~` and environment variables in a vault path
pub fn expand_vault_path(raw: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw)
        .map_err(|e| anyhow!("Failed to expand vault path {}: {}", raw, e))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// The vault path from `--vault`/`VAULTSCAN_VAULT`, expanded
pub fn require_vault(vault: Option<&str>) -> Result<PathBuf> {
    match vault {
        Some(raw) if !raw.trim().is_empty() => expand_vault_path(raw.trim()),
        _ => Err(anyhow!(
            "required flag --vault not set (or set {}_VAULT)",
            ENV_PREFIX
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_profile_defaults() {
        let config = load_scan_config("constrained", None, &Overrides::default()).unwrap();
        assert_eq!(config.max_workers, 2);
        assert_eq!(config.max_line_bytes, 256 * 1024);

        assert!(load_scan_config("turbo", None, &Overrides::default()).is_err());
    }

    #[test]
    fn test_file_then_flags() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("vaultscan.yaml");
        fs::write(
            &path,
            "max_workers: 3\nasset_extensions: [\".PNG\", \"svg\"]\norphan_exempt_prefixes: [\"_\"]\n",
        )
        .unwrap();

        let config = load_scan_config("default", Some(&path), &Overrides::default()).unwrap();
        assert_eq!(config.max_workers, 3);
        assert!(config.is_asset_extension("png"));
        assert!(config.is_asset_extension("svg"));
        assert!(!config.is_asset_extension("pdf"));
        assert!(!config.is_orphan_exempt("index.md"));

        let flags = Overrides {
            max_workers: Some(1),
            max_line_bytes: None,
        };
        let config = load_scan_config("default", Some(&path), &flags).unwrap();
        assert_eq!(config.max_workers, 1);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let flags = Overrides {
            max_workers: Some(0),
            max_line_bytes: None,
        };
        assert!(load_scan_config("default", None, &flags).is_err());

        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");
        assert!(load_scan_config("default", Some(&missing), &Overrides::default()).is_err());
    }

    #[test]
    fn test_require_vault() {
        assert!(require_vault(None).is_err());
        assert!(require_vault(Some("  ")).is_err());
        assert_eq!(
            require_vault(Some("/tmp/vault")).unwrap(),
            PathBuf::from("/tmp/vault")
        );
    }
}
