use hr_portal_core::model::settings::Frequency;
use hr_portal_core::state::{LEGACY_STATE_KEYS, STATE_KEY};
use hr_portal_core::{KeyValueStorage, LoadSource, MemoryStorage, SqliteStorage, StateStore};
use serde_json::{json, Value};
use std::rc::Rc;

fn shared_memory() -> Rc<MemoryStorage> {
    Rc::new(MemoryStorage::new())
}

#[test]
fn first_open_writes_seed_document() {
    let storage = shared_memory();
    let store = StateStore::open(Box::new(Rc::clone(&storage)));

    assert_eq!(store.load_source(), LoadSource::Seed);
    assert_eq!(store.get("user.name", Value::Null), json!("Dana Whitfield"));
    assert_eq!(store.requests(&Default::default()).len(), 20);
    assert!(storage.get_item(STATE_KEY).unwrap().is_some());
}

#[test]
fn get_falls_back_to_caller_default() {
    let store = StateStore::open(Box::new(MemoryStorage::new()));
    assert_eq!(store.get("settings.missing.deep", json!(42)), json!(42));
    assert_eq!(store.get("requests.0.id", Value::Null), json!("r1"));
}

#[test]
fn push_appends_item_at_the_end() {
    let mut store = StateStore::open(Box::new(MemoryStorage::new()));
    let item = json!({"name": "Rae Kim", "email": "rae@dept.edu"});

    store.push("settings.delegates", item.clone()).unwrap();

    let delegates = store.get("settings.delegates", Value::Null);
    assert_eq!(delegates.as_array().and_then(|items| items.last()), Some(&item));
    assert_eq!(delegates.as_array().map(Vec::len), Some(2));
}

#[test]
fn update_item_without_match_leaves_document_and_storage_untouched() {
    let storage = shared_memory();
    let mut store = StateStore::open(Box::new(Rc::clone(&storage)));
    let before = store.document().clone();
    storage.set_read_only(true);

    let updated = store
        .update_item("requests", |item| item["id"] == "nope", json!({"status": "Approved"}))
        .unwrap();

    assert!(!updated);
    assert_eq!(store.document(), &before);
}

#[test]
fn legacy_document_is_migrated_once_and_left_in_place() {
    let legacy = json!({"user": {"id": "u9", "name": "Legacy Admin"}, "requests": []});
    let storage = Rc::new(MemoryStorage::with_items([(
        LEGACY_STATE_KEYS[0],
        legacy.to_string(),
    )]));

    let store = StateStore::open(Box::new(Rc::clone(&storage)));
    assert_eq!(store.load_source(), LoadSource::Legacy);
    assert_eq!(store.get("user.name", Value::Null), json!("Legacy Admin"));

    let migrated: Value =
        serde_json::from_str(&storage.get_item(STATE_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(migrated, legacy);
    assert!(storage.get_item(LEGACY_STATE_KEYS[0]).unwrap().is_some());

    let reopened = StateStore::open(Box::new(Rc::clone(&storage)));
    assert_eq!(reopened.load_source(), LoadSource::Stored);
}

#[test]
fn sqlite_file_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("portal.db");

    {
        let mut store = StateStore::open(Box::new(SqliteStorage::open(&path).unwrap()));
        assert_eq!(store.load_source(), LoadSource::Seed);
        store.set("settings.frequency", json!("weekly")).unwrap();
        store.set_last_route("/budget/grants").unwrap();
    }

    let store = StateStore::open(Box::new(SqliteStorage::open(&path).unwrap()));
    assert_eq!(store.load_source(), LoadSource::Stored);
    assert_eq!(store.settings().frequency, Frequency::Weekly);
    assert_eq!(store.last_route().as_deref(), Some("/budget/grants"));
}

#[test]
fn remove_item_takes_first_match_only() {
    let mut store = StateStore::open(Box::new(MemoryStorage::new()));
    store
        .set("tags", json!([{"k": "a", "n": 1}, {"k": "a", "n": 2}, {"k": "b"}]))
        .unwrap();

    let removed = store.remove_item("tags", |item| item["k"] == "a").unwrap();

    assert_eq!(removed, Some(json!({"k": "a", "n": 1})));
    assert_eq!(store.get("tags", Value::Null), json!([{"k": "a", "n": 2}, {"k": "b"}]));
}

#[test]
fn upsert_person_merges_or_appends() {
    let mut store = StateStore::open(Box::new(MemoryStorage::new()));
    let mut existing = store.person("p1").unwrap();
    existing.title = "Department Chair".to_string();
    store.upsert_person(&existing).unwrap();
    assert_eq!(store.person("p1").unwrap().title, "Department Chair");
    assert_eq!(store.people().len(), 40);

    let mut newcomer = existing.clone();
    newcomer.id = "p900".to_string();
    newcomer.name = "Jo Okafor".to_string();
    store.upsert_person(&newcomer).unwrap();
    assert_eq!(store.people().len(), 41);
    assert_eq!(store.people().last().map(|person| person.id.as_str()), Some("p900"));

    assert!(store.remove_person("p900").unwrap());
    assert!(!store.remove_person("p900").unwrap());
    assert_eq!(store.people().len(), 40);
}

#[test]
fn reload_reads_back_persisted_writes() {
    let storage = shared_memory();
    let mut store = StateStore::open(Box::new(Rc::clone(&storage)));
    let mut settings = store.settings();
    settings.frequency = Frequency::Weekly;
    settings.notifications = false;
    store.set_as("settings", &settings).unwrap();

    store.reload();

    assert_eq!(store.load_source(), LoadSource::Stored);
    assert_eq!(store.settings(), settings);
}

#[test]
fn set_past_collection_end_keeps_existing_items() {
    let storage = shared_memory();
    let mut store = StateStore::open(Box::new(Rc::clone(&storage)));

    store.set("requests.999.status", json!("Draft")).unwrap();
    store.set("requests.foo", json!("ignored")).unwrap();

    let requests = store.get("requests", Value::Null);
    let items = requests.as_array().unwrap();
    assert_eq!(items.len(), 1000);
    assert_eq!(items[0]["id"], json!("r1"));
    assert_eq!(items[19]["id"], json!("r20"));
    assert_eq!(items[999], json!({"status": "Draft"}));

    let reopened = StateStore::open(Box::new(Rc::clone(&storage)));
    assert_eq!(reopened.get("requests.19.id", Value::Null), json!("r20"));
}
