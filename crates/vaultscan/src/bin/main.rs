//! vaultscan CLI

use clap::Parser;
use std::process::ExitCode;
use vaultscan::{Cli, logging, run};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init_tracing(&cli.log_level, cli.log_format) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }
    log::debug!("vaultscan v{}", env!("CARGO_PKG_VERSION"));

    match run(&cli).await {
        Ok(outcome) => {
            print!("{}", outcome.rendered);
            if let Some(message) = &outcome.message {
                eprintln!("{message}");
            }
            if outcome.failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
