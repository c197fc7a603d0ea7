//! Fieldreg CLI - inspect field registry configurations, pipelines and options.
//!
//! Commands:
//! - `fieldreg config show <module> <entity>`: Fields by section and stages
//! - `fieldreg form init <module> <entity>`: Initial values for a new record
//! - `fieldreg form validate <module> <entity> --data <json|@file>`: Required field check
//! - `fieldreg board show <module> <entity>`: Items grouped by stage
//! - `fieldreg board move <module> <entity> <item> --to <stage>`: Change an item's stage
//! - `fieldreg options list <category>`: Options of a master-data category
//! - `fieldreg options add <category> <value>`: Extend a category
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error, or validation found blank required fields

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fieldreg::{commands, Cli, Services};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("fieldreg=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match Services::from_cli(&cli) {
        Ok(services) => {
            let mut stdout = std::io::stdout().lock();
            commands::run(&cli.command, &services, cli.format, &mut stdout).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
