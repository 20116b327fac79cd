//! Library surface of the Pokédex capture tracker.
//!
//! The binary wires these together; integration tests drive the same pieces
//! without a terminal.
pub mod api;
pub mod capture;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod ui;

pub use api::{ApiError, CatalogSource, PokeApiClient};
pub use capture::{filter_by_name, load_captures, CaptureDraft, CaptureError};
pub use catalog::{fetch_page, PageOutcome, PageRequest, Paginator};
pub use config::{load_settings, Settings};
pub use db::{KeyValueStore, MemoryStore, SqliteStore, StoreError};
pub use models::{CaptureRecord, CatalogItem, ItemRef};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
