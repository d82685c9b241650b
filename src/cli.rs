//! Command-line interface for strictly_draft.

use clap::{Parser, Subcommand};

/// Strictly Draft - pass-the-pack item drafts
#[derive(Parser, Debug)]
#[command(name = "strictly_draft")]
#[command(about = "Pass-the-pack item draft server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP draft server
    Serve {
        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Path to a TOML service config
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,
    },

    /// Run a whole draft locally with random pickers
    Simulate {
        /// JSON file holding an array of item objects
        #[arg(short, long)]
        items: std::path::PathBuf,

        /// Number of participants
        #[arg(long, default_value = "2")]
        players: usize,

        /// Items dealt into each hand
        #[arg(long)]
        hand_size: usize,

        /// Picks each participant keeps
        #[arg(long)]
        bank_size: usize,

        /// Seed for the random pickers
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print a fresh draft passphrase
    Passphrase,
}
