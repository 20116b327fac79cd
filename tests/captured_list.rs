use pokedex_tui::{filter_by_name, load_captures, KeyValueStore, MemoryStore};

fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store
        .set(
            "pikachu",
            r#"{"nickname":"Sparky","captureTime":"1/2/2024, 3:04:05 PM","imageUrl":"https://img.test/25.png"}"#,
        )
        .unwrap();
    store
        .set("charmander", r#"{"nickname":"Ember"}"#)
        .unwrap();
    store.set("debugger", "true").unwrap();
    store.set("missingno", "%%garbage%%").unwrap();
    store.set("ditto", "").unwrap();
    store
}

#[test]
fn rebuild_skips_ignored_empty_and_corrupt_entries() {
    let records = load_captures(&seeded_store()).unwrap();
    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["charmander", "pikachu"]);
}

#[test]
fn missing_optional_fields_default_to_empty() {
    let records = load_captures(&seeded_store()).unwrap();
    let charmander = &records[0];
    assert_eq!(charmander.nickname, "Ember");
    assert_eq!(charmander.capture_time, "");
    assert_eq!(charmander.image_url, "");
}

#[test]
fn name_filter_is_case_insensitive_substring() {
    let records = load_captures(&seeded_store()).unwrap();

    let hits = filter_by_name(&records, "PIKA");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].nickname, "Sparky");

    assert_eq!(filter_by_name(&records, "").len(), 2);
    assert!(filter_by_name(&records, "  ").is_empty());
    assert!(filter_by_name(&records, "zubat").is_empty());
}
