//! Path-addressed application state document.
//!
//! # Responsibility
//! - Load the single JSON state document from storage, seeding it on first
//!   load and migrating the legacy key once.
//! - Provide get/set/push/update/remove helpers addressed by dot paths.
//! - Persist the full document synchronously after every mutation.
//!
//! # Invariants
//! - `get` never fails; missing paths yield the caller's default.
//! - `update_item`/`remove_item` touch only the first match and skip the
//!   write entirely when nothing matches.
//! - The legacy key is read during load and never written.
//! - No schema is enforced; typed helpers skip records they cannot parse.

mod path;
mod queries;
mod seed;

pub use queries::{ApprovalFilter, RequestFilter};
pub use seed::seed_document;

use crate::storage::{KeyValueStorage, StorageError};
use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key holding the whole state document.
pub const STATE_KEY: &str = "hr.app.state.v2";
/// Keys read once for migration and never written again.
pub const LEGACY_STATE_KEYS: &[&str] = &["hrPortalState"];
/// Storage key holding the last visited route.
pub const LAST_ROUTE_KEY: &str = "lastRoute";
/// Storage key holding directory filter preferences.
pub const DIRECTORY_FILTERS_KEY: &str = "directory.filters.v2";

pub type StateResult<T> = Result<T, StateError>;

/// State-store failure. Reads never produce one.
#[derive(Debug)]
pub enum StateError {
    Storage(StorageError),
    Serialize(serde_json::Error),
}

impl Display for StateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "failed to persist state: {err}"),
            Self::Serialize(err) => write!(f, "failed to serialize state: {err}"),
        }
    }
}

impl Error for StateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<StorageError> for StateError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<serde_json::Error> for StateError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Where the in-memory document came from on the last load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Stored,
    Legacy,
    Seed,
    /// Stored document was unreadable; seed used without overwriting it.
    Fallback,
}

/// JSON state document bound to a key-value storage.
pub struct StateStore {
    storage: Box<dyn KeyValueStorage>,
    doc: Value,
    source: LoadSource,
}

impl StateStore {
    /// Loads the document from `storage`.
    ///
    /// Never fails: read and parse errors are logged and the seed document is
    /// used instead.
    pub fn open(storage: Box<dyn KeyValueStorage>) -> Self {
        let (doc, source) = load_document(storage.as_ref());
        Self {
            storage,
            doc,
            source,
        }
    }

    /// Re-reads the document from storage, discarding the in-memory copy.
    pub fn reload(&mut self) {
        let (doc, source) = load_document(self.storage.as_ref());
        self.doc = doc;
        self.source = source;
    }

    pub fn load_source(&self) -> LoadSource {
        self.source
    }

    /// Borrow of the whole document.
    pub fn document(&self) -> &Value {
        &self.doc
    }

    pub fn storage(&self) -> &dyn KeyValueStorage {
        self.storage.as_ref()
    }

    /// Returns the value at `path`, or `default` when it is missing.
    pub fn get(&self, path: &str, default: Value) -> Value {
        path::lookup(&self.doc, path).cloned().unwrap_or(default)
    }

    /// Typed read; `None` when missing or not deserializable as `T`.
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        let value = path::lookup(&self.doc, path)?;
        match T::deserialize(value) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                warn!("event=state_read module=state status=skipped path={path} error={err}");
                None
            }
        }
    }

    /// Assigns `value` at `path` and persists the document.
    ///
    /// A path that cannot address an existing array (`requests.foo`) is
    /// skipped with a warning; the array is never replaced.
    pub fn set(&mut self, path: &str, value: Value) -> StateResult<()> {
        if !path::assign(&mut self.doc, path, value) {
            warn!("event=state_set module=state status=skipped path={path} error_code=not_an_index");
            return Ok(());
        }
        self.persist()
    }

    /// Serializes `value` and assigns it at `path`.
    pub fn set_as<T: Serialize>(&mut self, path: &str, value: &T) -> StateResult<()> {
        let value = serde_json::to_value(value)?;
        self.set(path, value)
    }

    /// Appends `item` to the array at `path` (a missing or non-array value
    /// starts a new array).
    pub fn push(&mut self, path: &str, item: Value) -> StateResult<()> {
        let mut items = match self.get(path, Value::Array(Vec::new())) {
            Value::Array(items) => items,
            other => {
                warn!(
                    "event=state_push module=state status=replaced path={} previous_kind={}",
                    path,
                    value_kind(&other)
                );
                Vec::new()
            }
        };
        items.push(item);
        self.set(path, Value::Array(items))
    }

    /// Shallow-merges `patch` into the first array item matching `predicate`.
    ///
    /// Returns `Ok(false)` without writing when nothing matches.
    pub fn update_item(
        &mut self,
        path: &str,
        predicate: impl Fn(&Value) -> bool,
        patch: Value,
    ) -> StateResult<bool> {
        let Some(Value::Array(items)) = path::lookup_mut(&mut self.doc, path) else {
            return Ok(false);
        };
        let Some(item) = items.iter_mut().find(|item| predicate(item)) else {
            return Ok(false);
        };
        merge_shallow(item, patch);
        self.persist()?;
        Ok(true)
    }

    /// Removes the first array item matching `predicate`.
    ///
    /// Returns the removed item, or `Ok(None)` without writing.
    pub fn remove_item(
        &mut self,
        path: &str,
        predicate: impl Fn(&Value) -> bool,
    ) -> StateResult<Option<Value>> {
        let Some(Value::Array(items)) = path::lookup_mut(&mut self.doc, path) else {
            return Ok(None);
        };
        let Some(index) = items.iter().position(|item| predicate(item)) else {
            return Ok(None);
        };
        let removed = items.remove(index);
        self.persist()?;
        Ok(Some(removed))
    }

    /// Applies `change` to the document and persists once.
    pub fn transact<R>(&mut self, change: impl FnOnce(&mut Value) -> R) -> StateResult<R> {
        let result = change(&mut self.doc);
        self.persist()?;
        Ok(result)
    }

    /// Reads a raw storage key outside the state document.
    pub fn side_value(&self, key: &str) -> Option<String> {
        match self.storage.get_item(key) {
            Ok(value) => value,
            Err(err) => {
                warn!("event=storage_read module=state status=error key={key} error={err}");
                None
            }
        }
    }

    /// Writes a raw storage key outside the state document.
    pub fn set_side_value(&self, key: &str, value: &str) -> StateResult<()> {
        self.storage.set_item(key, value)?;
        Ok(())
    }

    fn persist(&self) -> StateResult<()> {
        let serialized = serde_json::to_string(&self.doc)?;
        if let Err(err) = self.storage.set_item(STATE_KEY, &serialized) {
            error!("event=state_save module=state status=error key={STATE_KEY} error={err}");
            return Err(err.into());
        }
        debug!(
            "event=state_save module=state status=ok bytes={}",
            serialized.len()
        );
        Ok(())
    }
}

fn load_document(storage: &dyn KeyValueStorage) -> (Value, LoadSource) {
    match storage.get_item(STATE_KEY) {
        Ok(Some(raw)) => match parse_document(&raw) {
            Some(doc) => return (doc, LoadSource::Stored),
            None => {
                error!("event=state_load module=state status=error key={STATE_KEY} error_code=parse_failed");
                return (seed_document(), LoadSource::Fallback);
            }
        },
        Ok(None) => {}
        Err(err) => {
            error!("event=state_load module=state status=error key={STATE_KEY} error={err}");
            return (seed_document(), LoadSource::Fallback);
        }
    }

    for key in LEGACY_STATE_KEYS {
        let raw = match storage.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => continue,
            Err(err) => {
                warn!("event=state_migrate module=state status=error key={key} error={err}");
                continue;
            }
        };
        match parse_document(&raw) {
            Some(doc) => {
                write_initial(storage, &doc);
                info!("event=state_migrate module=state status=ok from={key}");
                return (doc, LoadSource::Legacy);
            }
            None => {
                warn!("event=state_migrate module=state status=error key={key} error_code=parse_failed");
            }
        }
    }

    let doc = seed_document();
    write_initial(storage, &doc);
    info!("event=state_seed module=state status=ok");
    (doc, LoadSource::Seed)
}

fn parse_document(raw: &str) -> Option<Value> {
    serde_json::from_str::<Value>(raw)
        .ok()
        .filter(Value::is_object)
}

fn write_initial(storage: &dyn KeyValueStorage, doc: &Value) {
    let result = serde_json::to_string(doc)
        .map_err(StateError::from)
        .and_then(|raw| storage.set_item(STATE_KEY, &raw).map_err(StateError::from));
    if let Err(err) = result {
        error!("event=state_save module=state status=error key={STATE_KEY} error={err}");
    }
}

fn merge_shallow(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(existing), Value::Object(updates)) => {
            for (key, value) in updates {
                existing.insert(key, value);
            }
        }
        (target, patch) => *target = patch,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadSource, StateStore, STATE_KEY};
    use crate::storage::{KeyValueStorage, MemoryStorage};
    use serde_json::{json, Value};
    use std::rc::Rc;

    fn store_with(doc: Value) -> (Rc<MemoryStorage>, StateStore) {
        let storage = Rc::new(MemoryStorage::with_items([(STATE_KEY, doc.to_string())]));
        let store = StateStore::open(Box::new(Rc::clone(&storage)));
        (storage, store)
    }

    #[test]
    fn get_returns_default_for_missing_and_scalar_parents() {
        let (_, store) = store_with(json!({"settings": {"notifications": true}}));
        assert_eq!(store.get("settings.notifications", json!(null)), json!(true));
        assert_eq!(store.get("settings.notifications.x", json!("d")), json!("d"));
        assert_eq!(store.get("nope", json!([])), json!([]));
    }

    #[test]
    fn stored_null_is_returned_instead_of_default() {
        let (_, store) = store_with(json!({"app": {"flash": null}}));
        assert_eq!(store.get("app.flash", json!("default")), Value::Null);
    }

    #[test]
    fn update_item_merges_only_first_match() {
        let (_, mut store) = store_with(json!({"items": [
            {"id": "a", "n": 1},
            {"id": "a", "n": 2}
        ]}));
        let updated = store
            .update_item("items", |item| item["id"] == "a", json!({"n": 9, "x": true}))
            .expect("update should persist");
        assert!(updated);
        assert_eq!(
            store.get("items", Value::Null),
            json!([{"id": "a", "n": 9, "x": true}, {"id": "a", "n": 2}])
        );
    }

    #[test]
    fn remove_item_without_match_skips_write() {
        let (storage, mut store) = store_with(json!({"items": [{"id": "a"}]}));
        storage.set_read_only(true);
        let removed = store
            .remove_item("items", |item| item["id"] == "zzz")
            .expect("no-op removal must not touch storage");
        assert!(removed.is_none());
    }

    #[test]
    fn failed_persist_reports_storage_error() {
        let (storage, mut store) = store_with(json!({}));
        storage.set_read_only(true);
        assert!(store.set("settings.notifications", json!(false)).is_err());
    }

    #[test]
    fn corrupt_document_falls_back_to_seed_without_overwrite() {
        let storage = Rc::new(MemoryStorage::with_items([(STATE_KEY, "{not json")]));
        let store = StateStore::open(Box::new(Rc::clone(&storage)));
        assert_eq!(store.load_source(), LoadSource::Fallback);
        assert_eq!(store.get("user.id", Value::Null), json!("u1"));
        assert_eq!(
            storage.get_item(STATE_KEY).expect("read").as_deref(),
            Some("{not json")
        );
    }

    #[test]
    fn transact_persists_once_with_all_changes() {
        let (storage, mut store) = store_with(json!({"a": 1}));
        store
            .transact(|doc| {
                doc["a"] = json!(2);
                doc["b"] = json!(3);
            })
            .expect("transaction should persist");
        let raw = storage
            .get_item(STATE_KEY)
            .expect("read")
            .expect("state stored");
        let persisted: Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(persisted, json!({"a": 2, "b": 3}));
    }
}
