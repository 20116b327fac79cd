//! Domain models passed between the network layer, the capture workflow and the
//! TUI. These stay light-weight data holders; fetching, persistence and
//! presentation live in their own modules.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One entry of a list page as returned by the remote index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ItemRef {
    pub name: String,
    /// Detail endpoint for this entry.
    pub url: String,
}

/// A browsable catalog entry. Held in memory for the current session only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    /// Unique key, also used as the storage key of a capture.
    pub name: String,
    pub image_url: String,
}

impl CatalogItem {
    pub fn new(name: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_url: image_url.into(),
        }
    }
}

impl fmt::Display for CatalogItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", display_name(&self.name))
    }
}

/// A user-authored capture persisted against a catalog item's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRecord {
    pub name: String,
    pub nickname: String,
    /// Locale-formatted timestamp, stored verbatim.
    pub capture_time: String,
    pub image_url: String,
}

impl CaptureRecord {
    /// Rebuild a record from its storage key and stored value.
    pub fn from_stored(name: impl Into<String>, stored: StoredCapture) -> Self {
        Self {
            name: name.into(),
            nickname: stored.nickname,
            capture_time: stored.capture_time,
            image_url: stored.image_url,
        }
    }

    /// The value written under `self.name`. The name itself is the key.
    pub fn to_stored(&self) -> StoredCapture {
        StoredCapture {
            nickname: self.nickname.clone(),
            capture_time: self.capture_time.clone(),
            image_url: self.image_url.clone(),
        }
    }
}

/// Serialized form of a capture: `{"nickname", "captureTime", "imageUrl"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCapture {
    pub nickname: String,
    #[serde(default)]
    pub capture_time: String,
    #[serde(default)]
    pub image_url: String,
}

/// Capitalize the first letter of an API name ("pikachu" -> "Pikachu").
pub fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
