use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{ApiError, CatalogSource};
use crate::config::ApiSettings;
use crate::models::{CatalogItem, ItemRef};

const USER_AGENT: &str = concat!("pokedex-tui/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct ListResponse {
    results: Vec<ItemRef>,
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    id: u64,
}

/// Blocking PokeAPI client. Cheap to share: `reqwest::blocking::Client` pools
/// connections internally.
pub struct PokeApiClient {
    http: Client,
    base_url: String,
    image_url_template: String,
}

impl PokeApiClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|source| ApiError::Request {
                url: settings.base_url.clone(),
                source,
            })?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            image_url_template: settings.image_url_template.clone(),
        })
    }

    fn list_url(&self, limit: u32, offset: u32) -> String {
        format!("{}/pokemon?limit={limit}&offset={offset}", self.base_url)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        debug!(%url, "GET");
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|source| ApiError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<T>().map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

impl CatalogSource for PokeApiClient {
    fn list_page(&self, limit: u32, offset: u32) -> Result<Vec<ItemRef>, ApiError> {
        let url = self.list_url(limit, offset);
        let page: ListResponse = self.get_json(&url)?;
        Ok(page.results)
    }

    fn resolve(&self, item: &ItemRef) -> Result<CatalogItem, ApiError> {
        let detail: DetailResponse = self.get_json(&item.url)?;
        Ok(CatalogItem::new(
            item.name.clone(),
            sprite_url(&self.image_url_template, detail.id),
        ))
    }
}

/// Substitute the detail identifier into an image URL template containing
/// `{id}`.
pub fn sprite_url(template: &str, id: u64) -> String {
    template.replace("{id}", &id.to_string())
}
