//! Read-only access to the remote catalog index. The paginator only depends on
//! [`CatalogSource`], so tests can script pages without touching the network.

mod client;

use thiserror::Error;

use crate::models::{CatalogItem, ItemRef};

pub use client::{sprite_url, PokeApiClient};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("detail lookup for '{name}' panicked")]
    WorkerPanicked { name: String },
    #[error("page fetch at offset {offset} panicked")]
    PagePanicked { offset: u32 },
    #[error("could not start fetch worker: {0}")]
    Spawn(#[source] std::io::Error),
    /// Used by scripted sources in tests and by anything that is not HTTP.
    #[error("{0}")]
    Other(String),
}

/// A paginated index of items plus a per-item detail lookup.
pub trait CatalogSource: Send + Sync {
    /// One page of item references, in index order.
    fn list_page(&self, limit: u32, offset: u32) -> Result<Vec<ItemRef>, ApiError>;

    /// Follow a reference to its detail record and derive the display item.
    fn resolve(&self, item: &ItemRef) -> Result<CatalogItem, ApiError>;
}
