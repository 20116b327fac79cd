//! Binary entry point: resolve settings, bring up logging and storage, then
//! either print captures or drive the Ratatui event loop until the user exits.
use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use pokedex_tui::cli::{Cli, Command};
use pokedex_tui::config::{load_settings, settings_path, Settings};
use pokedex_tui::models::display_name;
use pokedex_tui::{
    filter_by_name, load_captures, logging, run_app, App, KeyValueStore, MemoryStore,
    PokeApiClient, SqliteStore,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(settings_path);
    let mut settings = load_settings(&config_path)?;
    settings.apply_cli(&cli);
    logging::init(&settings.log, &settings.log_path())?;
    settings.sanitize();
    info!(config = %config_path.display(), "settings loaded");

    let store = open_store(&settings)?;

    match cli.command {
        Some(Command::Captured { filter, json }) => {
            print_captured(store.as_ref(), filter.as_deref().unwrap_or(""), json)
        }
        None => {
            let client = PokeApiClient::new(&settings.api).context("failed to build HTTP client")?;
            let mut app = App::new(store, Arc::new(client), &settings);
            app.start();
            run_app(&mut app)
        }
    }
}

fn open_store(settings: &Settings) -> Result<Box<dyn KeyValueStore>> {
    if settings.storage.ephemeral {
        info!("using in-memory capture store");
        return Ok(Box::new(MemoryStore::new()));
    }
    let path = settings.db_path()?;
    let store = SqliteStore::open(&path)
        .with_context(|| format!("failed to open capture database {}", path.display()))?;
    info!(db = %path.display(), "capture database ready");
    Ok(Box::new(store))
}

fn print_captured(store: &dyn KeyValueStore, filter: &str, json: bool) -> Result<()> {
    let records = load_captures(store).context("failed to read captures")?;
    let matching = filter_by_name(&records, filter);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &matching).context("failed to encode captures")?;
        writeln!(out)?;
    } else if matching.is_empty() {
        writeln!(out, "No Pokémon captured yet.")?;
    } else {
        for record in matching {
            writeln!(
                out,
                "{}\t{}\t{}\t{}",
                display_name(&record.name),
                record.nickname,
                record.capture_time,
                record.image_url
            )?;
        }
    }
    Ok(())
}
