//! Command-line interface for the gomoku relay server.

use clap::{Parser, Subcommand};

/// Gomoku - five-in-a-row relay server
#[derive(Parser, Debug)]
#[command(name = "gomoku")]
#[command(about = "Relay server for two-player five-in-a-row matches", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the relay server
    Serve {
        /// Port to bind to
        #[arg(short, long, default_value = "8888")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}
