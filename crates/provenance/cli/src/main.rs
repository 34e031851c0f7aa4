//! Provenance CLI - query product lifecycles, holdings, and roles
//!
//! The CLI runs against an in-memory ledger built from a JSON fixture:
//! - Reconstruct a product's lifecycle timeline
//! - List the products an address holds
//! - Show the roles an address has
//! - Verify a product by ID or serial number
//! - List warranty claims

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use provenance_gateway::{InMemoryLedger, LedgerClient};
use provenance_lifecycle::{ClientConfig, ProvenanceService};
use provenance_types::Address;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod fixture;
mod output;

use commands::Commands;
use fixture::Fixture;

/// Provenance CLI application
#[derive(Parser)]
#[command(name = "provenance")]
#[command(about = "Product provenance and warranty ledger queries", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "PROVENANCE_CONFIG")]
    config: Option<String>,

    /// Ledger fixture (JSON) replayed into an in-memory ledger
    #[arg(short, long, env = "PROVENANCE_FIXTURE")]
    fixture: Option<String>,

    /// Print JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ClientConfig::load(cli.config.as_deref()).context("loading configuration")?;

    // Initialize tracing; logs go to stderr so JSON output stays clean.
    let filter = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| filter.as_str().into());
    let registry = tracing_subscriber::registry().with(env_filter);
    if config.logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    let ledger = match cli.fixture.as_deref() {
        Some(path) => {
            let fixture = Fixture::from_file(path).with_context(|| format!("reading {path}"))?;
            fixture.replay().await.0
        }
        None => {
            tracing::warn!(
                network = %config.gateway.network.name,
                "No fixture given; querying an empty in-memory ledger"
            );
            Arc::new(InMemoryLedger::new(Address::ZERO, 0))
        }
    };

    let client = LedgerClient::with_config(ledger, config.gateway.clone());
    let service = ProvenanceService::with_options(client, config.timeline);

    commands::execute(cli.command, &service, &config.gateway.network, cli.json).await?;
    Ok(())
}
