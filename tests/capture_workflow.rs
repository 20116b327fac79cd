mod common;

use common::item;
use pokedex_tui::capture::read_capture;
use pokedex_tui::{load_captures, CaptureDraft, KeyValueStore, MemoryStore};

const OPENED_AT: &str = "3/1/2024, 10:00:00 AM";
const CONFIRMED_AT: &str = "3/1/2024, 10:00:42 AM";

#[test]
fn first_capture_starts_empty_and_persists_on_confirm() {
    let store = MemoryStore::new();
    let pikachu = item("pikachu");

    let mut draft = CaptureDraft::open(&store, &pikachu, OPENED_AT);
    assert!(!draft.previously_captured);
    assert_eq!(draft.nickname, "");
    assert_eq!(draft.capture_time, OPENED_AT);
    assert_eq!(draft.image_url, pikachu.image_url);

    draft.nickname = "Sparky".into();
    let record = draft.confirm(&store, CONFIRMED_AT).unwrap().expect("record written");
    assert_eq!(record.capture_time, CONFIRMED_AT);

    let stored = store.get("pikachu").unwrap().expect("value stored");
    let value: serde_json::Value = serde_json::from_str(&stored).unwrap();
    assert_eq!(value["nickname"], "Sparky");
    assert_eq!(value["captureTime"], CONFIRMED_AT);
    assert_eq!(value["imageUrl"], pikachu.image_url.as_str());
}

#[test]
fn reopening_prefills_the_previous_capture() {
    let store = MemoryStore::new();
    let pikachu = item("pikachu");
    let mut draft = CaptureDraft::open(&store, &pikachu, OPENED_AT);
    draft.nickname = "Sparky".into();
    draft.confirm(&store, CONFIRMED_AT).unwrap();

    let reopened = CaptureDraft::open(&store, &pikachu, "later");
    assert!(reopened.previously_captured);
    assert_eq!(reopened.nickname, "Sparky");
    assert_eq!(reopened.capture_time, CONFIRMED_AT);
}

#[test]
fn blank_nickname_writes_nothing() {
    let store = MemoryStore::new();
    let mut draft = CaptureDraft::open(&store, &item("eevee"), OPENED_AT);

    assert_eq!(draft.confirm(&store, CONFIRMED_AT).unwrap(), None);
    draft.nickname = "   ".into();
    assert_eq!(draft.confirm(&store, CONFIRMED_AT).unwrap(), None);
    assert!(store.list_keys().unwrap().is_empty());
}

#[test]
fn recapturing_overwrites_and_trims() {
    let store = MemoryStore::new();
    let eevee = item("eevee");

    let mut draft = CaptureDraft::open(&store, &eevee, OPENED_AT);
    draft.nickname = "Fluff".into();
    draft.confirm(&store, OPENED_AT).unwrap();

    let mut draft = CaptureDraft::open(&store, &eevee, CONFIRMED_AT);
    draft.nickname = "  Vee  ".into();
    draft.confirm(&store, CONFIRMED_AT).unwrap();

    let record = read_capture(&store, "eevee").unwrap().unwrap();
    assert_eq!(record.nickname, "Vee");
    assert_eq!(record.capture_time, CONFIRMED_AT);
    assert_eq!(load_captures(&store).unwrap().len(), 1);
}

#[test]
fn unreadable_previous_value_opens_a_fresh_dialog() {
    let store = MemoryStore::new();
    store.set("mew", "{not json").unwrap();

    let draft = CaptureDraft::open(&store, &item("mew"), OPENED_AT);
    assert!(!draft.previously_captured);
    assert_eq!(draft.nickname, "");
}
