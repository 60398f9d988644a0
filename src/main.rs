//! Gomoku - relay server CLI
//!
//! Five-in-a-row relay process pairing remote participants into rooms.

#![warn(missing_docs)]

mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use gomoku::{RelayServer, RoomRegistry, ServerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { port, host } => run_server(host, port).await,
    }
}

/// Run the relay server
async fn run_server(host: String, port: u16) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(%host, port, "starting gomoku relay server");

    let registry = Arc::new(RoomRegistry::new());
    let config = ServerConfig { host, port };
    let server = RelayServer::bind(&config, registry).await?;

    info!("server ready - waiting for participants");
    server.serve().await
}
