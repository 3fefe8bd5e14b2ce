//! Diagnostics go to stderr so stdout stays clean for JSON and CSV.

use crate::cli::LogFormat;
use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `default_filter`. Records emitted through the `log`
/// facade by the library crates are forwarded into tracing.
pub fn init_tracing(default_filter: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| anyhow!("Invalid log filter '{}': {}", default_filter, e))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = match format {
        LogFormat::Human => builder.try_init(),
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
    };
    installed.map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}
