//! CLI entrypoint for reconciling Amazon Inspector scanning exclusion tags on Lambda functions.

mod audit_log;
mod config;
mod inventory;
mod policy;
mod reconcile;
mod service;
mod types;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::SuppressorConfig;
use service::SuppressorService;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "inspector-suppressor",
    version,
    about = "Reconcile Inspector Lambda scanning exclusion tags across an account"
)]
struct Cli {
    /// Emit debug-level logs on stderr
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the scanning policy from a trigger event to every function
    Run {
        /// Path to the event JSON; reads stdin when omitted or `-`
        #[arg(long)]
        event: Option<PathBuf>,
        /// AWS region override
        #[arg(long)]
        region: Option<String>,
        /// AWS named or SSO profile override
        #[arg(long)]
        profile: Option<String>,
    },
    /// Print the effective merged configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries the JSON response, logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_max_level(if cli.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .init();

    let mut config = SuppressorConfig::load()?;

    match cli.command {
        Commands::Run {
            event,
            region,
            profile,
        } => {
            config.apply_cli_overrides(region, profile);
            let event = read_event(event.as_deref())?;
            let response =
                service::handle_event(&event, || SuppressorService::connect(&config)).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
            if !response.is_success() {
                std::process::exit(1);
            }
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn read_event(path: Option<&Path>) -> anyhow::Result<serde_json::Value> {
    let raw = match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read event file at {}", path.display()))?,
        _ => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read event from stdin")?;
            raw
        }
    };
    serde_json::from_str(&raw).context("event is not valid JSON")
}
