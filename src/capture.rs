//! Capture workflow and captured-list reconstruction on top of a
//! [`KeyValueStore`].

use chrono::format::{Item, StrftimeItems};
use chrono::Local;
use thiserror::Error;
use tracing::{info, warn};

use crate::db::{KeyValueStore, StoreError};
use crate::models::{CaptureRecord, CatalogItem, StoredCapture};

/// Keys that may exist in the store without being captures.
pub const IGNORED_KEYS: &[&str] = &["debugger"];

/// Default capture timestamp format, close to an en-US locale string.
pub const DEFAULT_TIME_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to encode capture: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("stored value for '{key}' is not a capture: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Current local time rendered with `format`. Falls back to the default format
/// when `format` is not a valid strftime string.
pub fn local_timestamp(format: &str) -> String {
    let format = if is_valid_time_format(format) {
        format
    } else {
        DEFAULT_TIME_FORMAT
    };
    Local::now().format(format).to_string()
}

pub fn is_valid_time_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Read and decode the capture stored under `name`, if any.
pub fn read_capture(
    store: &dyn KeyValueStore,
    name: &str,
) -> Result<Option<CaptureRecord>, CaptureError> {
    let Some(raw) = store.get(name)? else {
        return Ok(None);
    };
    let stored: StoredCapture = serde_json::from_str(&raw).map_err(|source| CaptureError::Corrupt {
        key: name.to_string(),
        source,
    })?;
    Ok(Some(CaptureRecord::from_stored(name, stored)))
}

/// Serialize `record` under its name, replacing any previous capture.
pub fn write_capture(store: &dyn KeyValueStore, record: &CaptureRecord) -> Result<(), CaptureError> {
    let value = serde_json::to_string(&record.to_stored()).map_err(CaptureError::Encode)?;
    store.set(&record.name, &value)?;
    Ok(())
}

/// The in-progress state of the capture dialog for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureDraft {
    pub name: String,
    pub image_url: String,
    pub nickname: String,
    pub capture_time: String,
    /// Whether a persisted capture was found when the dialog opened.
    pub previously_captured: bool,
}

impl CaptureDraft {
    /// Open the dialog for `item`. An existing capture pre-fills nickname and
    /// capture time and supplies the image URL; otherwise the nickname starts
    /// empty and the time shows `now`.
    pub fn open(store: &dyn KeyValueStore, item: &CatalogItem, now: &str) -> Self {
        let existing = match read_capture(store, &item.name) {
            Ok(existing) => existing,
            Err(err) => {
                warn!(item = %item.name, error = %err, "ignoring unreadable capture");
                None
            }
        };

        match existing {
            Some(record) => Self {
                name: item.name.clone(),
                image_url: if record.image_url.is_empty() {
                    item.image_url.clone()
                } else {
                    record.image_url
                },
                nickname: record.nickname,
                capture_time: record.capture_time,
                previously_captured: true,
            },
            None => Self {
                name: item.name.clone(),
                image_url: item.image_url.clone(),
                nickname: String::new(),
                capture_time: now.to_string(),
                previously_captured: false,
            },
        }
    }

    /// Whether the current nickname would be accepted by [`confirm`](Self::confirm).
    pub fn has_nickname(&self) -> bool {
        !self.nickname.trim().is_empty()
    }

    /// Persist the capture stamped with `now`. A blank nickname writes nothing
    /// and yields `Ok(None)`.
    pub fn confirm(
        &self,
        store: &dyn KeyValueStore,
        now: &str,
    ) -> Result<Option<CaptureRecord>, CaptureError> {
        if !self.has_nickname() {
            return Ok(None);
        }

        let record = CaptureRecord {
            name: self.name.clone(),
            nickname: self.nickname.trim().to_string(),
            capture_time: now.to_string(),
            image_url: self.image_url.clone(),
        };
        write_capture(store, &record)?;
        info!(item = %record.name, nickname = %record.nickname, "captured");
        Ok(Some(record))
    }
}

/// Rebuild every capture from the store. Ignored keys, empty values and values
/// that do not decode are skipped (and logged) individually.
pub fn load_captures(store: &dyn KeyValueStore) -> Result<Vec<CaptureRecord>, StoreError> {
    let mut records = Vec::new();

    for key in store.list_keys()? {
        if IGNORED_KEYS.contains(&key.as_str()) {
            continue;
        }
        let raw = match store.get(&key) {
            Ok(Some(raw)) if !raw.trim().is_empty() => raw,
            Ok(_) => continue,
            Err(err) => {
                warn!(%key, error = %err, "failed to read stored capture");
                continue;
            }
        };
        match serde_json::from_str::<StoredCapture>(&raw) {
            Ok(stored) => records.push(CaptureRecord::from_stored(key, stored)),
            Err(err) => warn!(%key, error = %err, "skipping unparseable capture"),
        }
    }

    Ok(records)
}

/// Case-insensitive substring match; an empty query matches everything.
/// Whitespace is matched literally.
pub fn matches_name(name: &str, query: &str) -> bool {
    query.is_empty() || name.to_lowercase().contains(&query.to_lowercase())
}

pub fn filter_by_name<'a>(records: &'a [CaptureRecord], query: &str) -> Vec<&'a CaptureRecord> {
    records
        .iter()
        .filter(|record| matches_name(&record.name, query))
        .collect()
}
