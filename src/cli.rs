use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "pokedex", version, about = "Browse the Pokédex and keep track of captures")]
pub struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// SQLite database holding captures
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
    /// Keep captures in memory for this session only
    #[arg(long, global = true)]
    pub ephemeral: bool,
    /// Items requested per page
    #[arg(long)]
    pub page_size: Option<u32>,
    /// Stop loading after this many items (0 = no limit)
    #[arg(long)]
    pub ceiling: Option<usize>,
    /// Base URL of the catalog API
    #[arg(long)]
    pub api_base: Option<String>,
    /// Write logs here instead of the data directory
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print persisted captures without starting the TUI
    Captured {
        /// Case-insensitive name filter
        #[arg(long)]
        filter: Option<String>,
        #[arg(long)]
        json: bool,
    },
}
