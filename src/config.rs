//! Settings loaded from `settings.toml` and overridden by command-line flags.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::capture::{is_valid_time_format, DEFAULT_TIME_FORMAT};
use crate::cli::Cli;
use crate::db::{default_db_path, DATA_DIR_NAME};

const DEFAULT_API_BASE: &str = "https://pokeapi.co/api/v2";
const DEFAULT_IMAGE_TEMPLATE: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/{id}.png";
const LOG_FILE_NAME: &str = "pokedex.log";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub catalog: CatalogSettings,
    pub storage: StorageSettings,
    pub ui: UiSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    /// Image URL with an `{id}` placeholder for the detail identifier.
    pub image_url_template: String,
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            image_url_template: DEFAULT_IMAGE_TEMPLATE.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub page_size: u32,
    /// Stop paginating once this many items are loaded; 0 means no ceiling.
    pub item_ceiling: usize,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            page_size: 20,
            item_ceiling: 150,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub db_path: Option<PathBuf>,
    /// Keep captures in memory only.
    pub ephemeral: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// chrono strftime format for capture timestamps.
    pub time_format: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            time_format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub file: Option<PathBuf>,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            file: None,
            filter: "info".to_string(),
        }
    }
}

impl Settings {
    /// Apply command-line overrides on top of file values.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(base) = &cli.api_base {
            self.api.base_url = base.clone();
        }
        if let Some(page_size) = cli.page_size {
            self.catalog.page_size = page_size;
        }
        if let Some(ceiling) = cli.ceiling {
            self.catalog.item_ceiling = ceiling;
        }
        if let Some(db) = &cli.db {
            self.storage.db_path = Some(db.clone());
        }
        if cli.ephemeral {
            self.storage.ephemeral = true;
        }
        if let Some(log_file) = &cli.log_file {
            self.log.file = Some(log_file.clone());
        }
    }

    /// Replace values that cannot be used with their defaults. Called after
    /// logging is up so the replacements are recorded.
    pub fn sanitize(&mut self) {
        if !is_valid_time_format(&self.ui.time_format) {
            warn!(format = %self.ui.time_format, "invalid time_format; using default");
            self.ui.time_format = DEFAULT_TIME_FORMAT.to_string();
        }
        if self.catalog.page_size == 0 {
            warn!("page_size must be positive; using default");
            self.catalog.page_size = CatalogSettings::default().page_size;
        }
        if !self.api.image_url_template.contains("{id}") {
            warn!(template = %self.api.image_url_template, "image_url_template has no {{id}} placeholder");
        }
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(path.clone()),
            None => default_db_path(),
        }
    }

    pub fn log_path(&self) -> PathBuf {
        match &self.log.file {
            Some(path) => path.clone(),
            None => data_dir().join(LOG_FILE_NAME),
        }
    }
}

/// Per-user data directory holding the database and the log.
pub fn data_dir() -> PathBuf {
    if let Some(bd) = directories::BaseDirs::new() {
        bd.home_dir().join(DATA_DIR_NAME)
    } else {
        PathBuf::from(DATA_DIR_NAME)
    }
}

pub fn config_dir() -> PathBuf {
    if let Some(bd) = directories::BaseDirs::new() {
        bd.config_dir().join("pokedex-tui")
    } else {
        PathBuf::from("./.config/pokedex-tui")
    }
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.toml")
}

/// Load settings from `path`. A missing file yields defaults; a malformed one
/// is an error.
pub fn load_settings(path: &Path) -> Result<Settings> {
    match fs::read_to_string(path) {
        Ok(raw) => toml::from_str(&raw)
            .with_context(|| format!("failed to parse settings file {}", path.display())),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
        Err(err) => {
            Err(err).with_context(|| format!("failed to read settings file {}", path.display()))
        }
    }
}
