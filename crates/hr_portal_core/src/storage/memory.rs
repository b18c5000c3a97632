//! In-process storage used by tests and embed sessions.

use super::{KeyValueStorage, StorageError, StorageResult};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// `BTreeMap`-backed storage with an optional read-only switch.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<BTreeMap<String, String>>,
    read_only: Cell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage pre-populated with `items`.
    pub fn with_items<K, V>(items: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let storage = Self::new();
        storage.items.borrow_mut().extend(
            items
                .into_iter()
                .map(|(key, value)| (key.into(), value.into())),
        );
        storage
    }

    /// Makes every subsequent write fail with [`StorageError::Rejected`].
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.set(read_only);
    }

    pub fn keys(&self) -> Vec<String> {
        self.items.borrow().keys().cloned().collect()
    }

    fn ensure_writable(&self, key: &str) -> StorageResult<()> {
        if self.read_only.get() {
            return Err(StorageError::Rejected {
                key: key.to_string(),
                reason: "storage is read-only".to_string(),
            });
        }
        Ok(())
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.ensure_writable(key)?;
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.ensure_writable(key)?;
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryStorage;
    use crate::storage::{KeyValueStorage, StorageError};

    #[test]
    fn set_get_remove_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("lastRoute").expect("read"), None);

        storage.set_item("lastRoute", "/requests").expect("write");
        assert_eq!(
            storage.get_item("lastRoute").expect("read").as_deref(),
            Some("/requests")
        );

        storage.remove_item("lastRoute").expect("remove");
        assert_eq!(storage.get_item("lastRoute").expect("read"), None);
    }

    #[test]
    fn read_only_rejects_writes() {
        let storage = MemoryStorage::with_items([("k", "v")]);
        storage.set_read_only(true);
        let err = storage.set_item("k", "other").expect_err("write must fail");
        assert!(matches!(err, StorageError::Rejected { .. }));
        assert_eq!(storage.get_item("k").expect("read").as_deref(), Some("v"));
    }
}
