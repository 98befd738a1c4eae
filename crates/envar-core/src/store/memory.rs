//! In-process store.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{KeyValueStore, Root, StoredValue, ValueKind};
use crate::buffer::GrowBuffer;
use crate::codec::eq_ignore_case;
use crate::error::StoreError;

/// Values under one root key.
///
/// Names are looked up case-insensitively; the spelling used when a value was
/// first created is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hive {
    values: BTreeMap<String, StoredValue>,
}

impl Hive {
    pub fn get(&self, name: &str) -> Option<&StoredValue> {
        self.key_of(name).and_then(|key| self.values.get(key))
    }

    pub fn set(&mut self, name: &str, value: StoredValue) {
        let key = self
            .key_of(name)
            .map_or_else(|| name.to_string(), str::to_string);
        self.values.insert(key, value);
    }

    pub fn remove(&mut self, name: &str) -> Option<StoredValue> {
        let key = self.key_of(name)?.to_string();
        self.values.remove(&key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn key_of(&self, name: &str) -> Option<&str> {
        self.values
            .keys()
            .find(|key| eq_ignore_case(key, name))
            .map(String::as_str)
    }
}

/// Store kept entirely in memory.
///
/// Roots can be marked read- or write-denied to model access failures.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    hives: BTreeMap<Root, Hive>,
    read_denied: BTreeSet<Root>,
    write_denied: BTreeSet<Root>,
}

impl MemoryStore {
    /// A store with no root keys created.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with both root keys created and empty.
    #[must_use]
    pub fn with_keys() -> Self {
        let mut store = Self::new();
        for root in Root::ALL {
            store.hives.insert(root, Hive::default());
        }
        store
    }

    pub(crate) fn from_hives(hives: BTreeMap<Root, Hive>) -> Self {
        Self {
            hives,
            ..Self::default()
        }
    }

    pub(crate) fn into_hives(self) -> BTreeMap<Root, Hive> {
        self.hives
    }

    /// Insert a value, creating the root key if needed.
    #[must_use]
    pub fn with_value(mut self, root: Root, name: &str, kind: ValueKind, data: &str) -> Self {
        self.insert(root, name, kind, data);
        self
    }

    pub fn insert(&mut self, root: Root, name: &str, kind: ValueKind, data: &str) {
        self.hives
            .entry(root)
            .or_default()
            .set(name, StoredValue::new(kind, data));
    }

    pub fn value(&self, root: Root, name: &str) -> Option<&StoredValue> {
        self.hives.get(&root).and_then(|hive| hive.get(name))
    }

    pub fn hive(&self, root: Root) -> Option<&Hive> {
        self.hives.get(&root)
    }

    pub fn has_key(&self, root: Root) -> bool {
        self.hives.contains_key(&root)
    }

    pub fn deny_read(&mut self, root: Root) {
        self.read_denied.insert(root);
    }

    pub fn deny_write(&mut self, root: Root) {
        self.write_denied.insert(root);
    }

    fn readable(&self, root: Root) -> Result<&Hive, StoreError> {
        if self.read_denied.contains(&root) {
            return Err(StoreError::AccessDenied { root });
        }
        self.hives.get(&root).ok_or(StoreError::KeyNotFound { root })
    }

    fn writable(&mut self, root: Root) -> Result<&mut Hive, StoreError> {
        if self.write_denied.contains(&root) {
            return Err(StoreError::AccessDenied { root });
        }
        self.hives
            .get_mut(&root)
            .ok_or(StoreError::KeyNotFound { root })
    }
}

impl KeyValueStore for MemoryStore {
    fn probe_write(&self, root: Root) -> Result<(), StoreError> {
        if self.write_denied.contains(&root) {
            return Err(StoreError::AccessDenied { root });
        }
        if !self.hives.contains_key(&root) {
            return Err(StoreError::KeyNotFound { root });
        }
        Ok(())
    }

    fn create_key(&mut self, root: Root) -> Result<(), StoreError> {
        if self.write_denied.contains(&root) {
            return Err(StoreError::AccessDenied { root });
        }
        self.hives.entry(root).or_default();
        Ok(())
    }

    fn query_value(
        &self,
        root: Root,
        name: &str,
        dest: &mut GrowBuffer,
    ) -> Result<ValueKind, StoreError> {
        self.readable(root)?
            .get(name)
            .ok_or_else(|| StoreError::NotFound {
                root,
                name: name.to_string(),
            })?
            .copy_into(dest)
    }

    fn set_value(
        &mut self,
        root: Root,
        name: &str,
        kind: ValueKind,
        data: &str,
    ) -> Result<(), StoreError> {
        self.writable(root)?.set(name, StoredValue::new(kind, data));
        Ok(())
    }

    fn delete_value(&mut self, root: Root, name: &str) -> Result<(), StoreError> {
        self.writable(root)?
            .remove(name)
            .map(drop)
            .ok_or_else(|| StoreError::NotFound {
                root,
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_match_ignoring_case() {
        let mut hive = Hive::default();
        hive.set("Path", StoredValue::new(ValueKind::String, "a"));
        hive.set("PATH", StoredValue::new(ValueKind::String, "b"));
        assert_eq!(hive.len(), 1);
        let document = serde_json::to_value(&hive).unwrap();
        assert!(document.get("Path").is_some());
        assert!(document.get("PATH").is_none());
        assert_eq!(hive.get("path").unwrap().data, "b");
        assert!(hive.remove("pAtH").is_some());
        assert!(hive.is_empty());
    }

    #[test]
    fn test_missing_key_and_value() {
        let store = MemoryStore::new();
        let mut dest = GrowBuffer::allocate(8).unwrap();
        assert!(matches!(
            store.query_value(Root::User, "X", &mut dest),
            Err(StoreError::KeyNotFound { root: Root::User })
        ));

        let store = MemoryStore::with_keys();
        assert!(matches!(
            store.query_value(Root::User, "X", &mut dest),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_denied_access() {
        let mut store = MemoryStore::with_keys().with_value(Root::Machine, "X", ValueKind::String, "1");
        store.deny_write(Root::Machine);
        assert!(matches!(
            store.probe_write(Root::Machine),
            Err(StoreError::AccessDenied { .. })
        ));
        assert!(store.set_value(Root::Machine, "X", ValueKind::String, "2").is_err());
        assert_eq!(store.value(Root::Machine, "X").unwrap().data, "1");

        store.deny_read(Root::Machine);
        let mut dest = GrowBuffer::allocate(8).unwrap();
        assert!(matches!(
            store.query_value(Root::Machine, "X", &mut dest),
            Err(StoreError::AccessDenied { .. })
        ));
    }

    #[test]
    fn test_create_key_then_write() {
        let mut store = MemoryStore::new();
        assert!(store.set_value(Root::User, "X", ValueKind::String, "1").is_err());
        store.create_key(Root::User).unwrap();
        store.set_value(Root::User, "X", ValueKind::String, "1").unwrap();
        store.delete_value(Root::User, "x").unwrap();
        assert!(store.value(Root::User, "X").is_none());
        assert!(store.has_key(Root::User));
    }
}
