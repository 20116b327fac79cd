use pokedex_tui::capture::read_capture;
use pokedex_tui::{load_captures, CaptureDraft, CatalogItem, KeyValueStore, SqliteStore};
use tempfile::TempDir;

#[test]
fn set_upserts_and_keys_are_sorted() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(&dir.path().join("captures.sqlite")).unwrap();

    store.set("pikachu", "one").unwrap();
    store.set("bulbasaur", "two").unwrap();
    store.set("pikachu", "three").unwrap();

    assert_eq!(store.get("pikachu").unwrap().as_deref(), Some("three"));
    assert_eq!(store.get("mew").unwrap(), None);
    assert_eq!(store.list_keys().unwrap(), vec!["bulbasaur", "pikachu"]);
}

#[test]
fn captures_survive_reopening_the_database() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("captures.sqlite");
    let pikachu = CatalogItem::new("pikachu", "https://img.test/25.png");

    {
        let store = SqliteStore::open(&path).unwrap();
        let mut draft = CaptureDraft::open(&store, &pikachu, "now");
        draft.nickname = "Sparky".into();
        draft.confirm(&store, "1/1/2024, 9:00:00 AM").unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    let record = read_capture(&store, "pikachu").unwrap().unwrap();
    assert_eq!(record.nickname, "Sparky");
    assert_eq!(record.image_url, "https://img.test/25.png");
    assert_eq!(load_captures(&store).unwrap().len(), 1);
}
