//! Shared configuration store

use crate::error::Result;
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Mutable key-value configuration shared between the application and jobs.
///
/// Cloning the store clones the handle, not the data: every clone observes
/// writes made through any other clone.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    inner: Arc<RwLock<BTreeMap<String, Value>>>,
}

impl ConfigStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a typed value. Returns `None` when the key is missing or the
    /// stored value does not deserialize into `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let guard = self.inner.read();
        let value = guard.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::debug!(key, error = %e, "Config value has unexpected type");
                None
            }
        }
    }

    /// Get a typed value or `default`
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Get the raw JSON value for a key
    pub fn get_value(&self, key: &str) -> Option<Value> {
        self.inner.read().get(key).cloned()
    }

    /// Set a value, replacing any previous one
    pub fn set<T: Serialize>(&self, key: impl Into<String>, value: T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.inner.write().insert(key.into(), value);
        Ok(())
    }

    /// Remove a key, returning its previous value
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.inner.write().remove(key)
    }

    /// Whether the key is present
    pub fn contains(&self, key: &str) -> bool {
        self.inner.read().contains_key(key)
    }

    /// All keys in sorted order
    pub fn keys(&self) -> Vec<String> {
        self.inner.read().keys().cloned().collect()
    }

    /// Merge `values` into the store; incoming keys win
    pub fn merge(&self, values: BTreeMap<String, Value>) {
        self.inner.write().extend(values);
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.inner.read().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let store = ConfigStore::new();
        store.set("NUMBER", 100).unwrap();
        assert_eq!(store.get::<i64>("NUMBER"), Some(100));
        assert_eq!(store.get_or("MISSING", 7), 7);
    }

    #[test]
    fn test_type_mismatch_is_none() {
        let store = ConfigStore::new();
        store.set("NAME", "sea").unwrap();
        assert_eq!(store.get::<i64>("NAME"), None);
        assert_eq!(store.get::<String>("NAME").as_deref(), Some("sea"));
    }

    #[test]
    fn test_clones_share_data() {
        let store = ConfigStore::new();
        let handle = store.clone();
        handle.set("XYZ", "hello").unwrap();
        assert_eq!(store.get::<String>("XYZ").as_deref(), Some("hello"));
    }

    #[test]
    fn test_merge_overrides() {
        let store = ConfigStore::new();
        store.set("A", 1).unwrap();
        store.set("B", 2).unwrap();

        let mut incoming = BTreeMap::new();
        incoming.insert("B".to_string(), Value::from(20));
        incoming.insert("C".to_string(), Value::from(30));
        store.merge(incoming);

        assert_eq!(store.keys(), vec!["A", "B", "C"]);
        assert_eq!(store.get::<i64>("B"), Some(20));
        assert_eq!(store.remove("A"), Some(Value::from(1)));
        assert!(!store.contains("A"));
    }
}
