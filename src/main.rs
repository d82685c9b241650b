//! Strictly Draft - Unified CLI
//!
//! Pass-the-pack draft server with a local simulation mode.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use std::path::PathBuf;
use std::sync::Arc;
use strictly_draft::{
    DraftService, HttpConfig, LogSink, ServiceConfig, SessionSettings, Simulation, http,
    load_items, simulate,
};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { port, host, config } => run_server(config, host, port).await,
        Command::Simulate {
            items,
            players,
            hand_size,
            bank_size,
            seed,
        } => run_simulation(items, players, hand_size, bank_size, seed).await,
        Command::Passphrase => {
            println!("{}", strictly_draft::passphrase::generate());
            Ok(())
        }
    }
}

/// Run the HTTP draft server
#[instrument(skip_all)]
async fn run_server(config: Option<PathBuf>, host: Option<String>, port: Option<u16>) -> Result<()> {
    let config = match config {
        Some(path) => ServiceConfig::from_file(&path)?,
        None => ServiceConfig::default(),
    };
    let http_config = HttpConfig::new(
        host.unwrap_or_else(|| config.http().host().clone()),
        port.unwrap_or(*config.http().port()),
    );
    let config = config.with_http(http_config.clone());

    let service = DraftService::new(config, Arc::new(LogSink));
    let app = http::router(service);

    let listener = tokio::net::TcpListener::bind((http_config.host().as_str(), *http_config.port()))
        .await
        .with_context(|| format!("binding {}:{}", http_config.host(), http_config.port()))?;
    info!(
        "Draft server ready at http://{}:{}/",
        http_config.host(),
        http_config.port()
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Run a simulated draft and print every bank
#[instrument(skip(items), fields(items = %items.display()))]
async fn run_simulation(
    items: PathBuf,
    players: usize,
    hand_size: usize,
    bank_size: usize,
    seed: Option<u64>,
) -> Result<()> {
    let pool = load_items(&items)?;
    let sim = Simulation {
        players,
        settings: SessionSettings::new(hand_size, bank_size),
        seed,
    };

    let result = simulate::run(sim, pool).await?;

    println!("Draft '{}' has ended as follows:", result.session_id);
    for bank in &result.banks {
        let picks: Vec<_> = bank.items.iter().map(|item| item.label()).collect();
        println!("  {}: {}", bank.participant.name(), picks.join(", "));
    }
    Ok(())
}
