#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use pokedex_tui::{ApiError, CatalogItem, CatalogSource, ItemRef};

/// In-memory catalog that serves a fixed list of names, can be told to fail
/// specific offsets, and records every page it was asked for.
pub struct FakeSource {
    names: Vec<String>,
    failing_offsets: Mutex<HashSet<u32>>,
    broken_details: HashSet<String>,
    pub requests: Mutex<Vec<(u32, u32)>>,
}

impl FakeSource {
    pub fn new(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|name| name.to_string()).collect(),
            failing_offsets: Mutex::new(HashSet::new()),
            broken_details: HashSet::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn numbered(total: usize) -> Self {
        let names: Vec<String> = (0..total).map(|n| format!("mon{n}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        Self::new(&refs)
    }

    pub fn fail_offset(&self, offset: u32) {
        self.failing_offsets.lock().unwrap().insert(offset);
    }

    pub fn heal_offset(&self, offset: u32) {
        self.failing_offsets.lock().unwrap().remove(&offset);
    }

    pub fn with_broken_detail(mut self, name: &str) -> Self {
        self.broken_details.insert(name.to_string());
        self
    }

    pub fn offsets_requested(&self) -> Vec<u32> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, offset)| *offset)
            .collect()
    }
}

impl CatalogSource for FakeSource {
    fn list_page(&self, limit: u32, offset: u32) -> Result<Vec<ItemRef>, ApiError> {
        self.requests.lock().unwrap().push((limit, offset));
        if self.failing_offsets.lock().unwrap().contains(&offset) {
            return Err(ApiError::Other(format!("offset {offset} unavailable")));
        }
        Ok(self
            .names
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|name| ItemRef {
                name: name.clone(),
                url: format!("https://catalog.test/{name}"),
            })
            .collect())
    }

    fn resolve(&self, item: &ItemRef) -> Result<CatalogItem, ApiError> {
        if self.broken_details.contains(&item.name) {
            return Err(ApiError::Other(format!("no detail for {}", item.name)));
        }
        Ok(CatalogItem::new(
            item.name.clone(),
            format!("https://img.test/{}.png", item.name),
        ))
    }
}

pub fn item(name: &str) -> CatalogItem {
    CatalogItem::new(name, format!("https://img.test/{name}.png"))
}
