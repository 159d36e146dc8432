//! In-memory `DocumentStore` used by tests and demos. Fault toggles let
//! callers exercise the retryable-outage paths without a real backend.

use std::collections::{BTreeMap, HashMap, HashSet};

use parking_lot::RwLock;
use serde_json::Value;
use uuid::Uuid;

use super::{Document, DocumentStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
    offline: RwLock<bool>,
    write_outages: RwLock<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a total transport outage: every operation fails.
    pub fn set_offline(&self, offline: bool) {
        *self.offline.write() = offline;
    }

    /// Simulate a write outage for one collection: reads still work,
    /// `update`/`insert` against it fail.
    pub fn set_write_outage(&self, collection: &str, failing: bool) {
        let mut outages = self.write_outages.write();
        if failing {
            outages.insert(collection.to_string());
        } else {
            outages.remove(collection);
        }
    }

    /// Place a document directly, bypassing the fault toggles. Test setup only.
    pub fn seed(&self, collection: &str, id: &str, data: Value) {
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data);
    }

    fn check_reachable(&self) -> Result<(), StoreError> {
        if *self.offline.read() {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }

    fn check_writable(&self, collection: &str) -> Result<(), StoreError> {
        self.check_reachable()?;
        if self.write_outages.read().contains(collection) {
            return Err(StoreError::Unavailable(format!(
                "write to {collection} timed out"
            )));
        }
        Ok(())
    }
}

impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.check_reachable()?;
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document {
                id: id.to_string(),
                data: data.clone(),
            }))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.check_reachable()?;
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| Document {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError> {
        self.check_writable(collection)?;
        let mut collections = self.collections.write();
        let Some(existing) = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
        else {
            return Err(StoreError::not_found(collection, id));
        };
        match (existing, patch) {
            (Value::Object(target), Value::Object(fields)) => {
                for (key, value) in fields {
                    target.insert(key, value);
                }
            }
            (target, whole) => *target = whole,
        }
        Ok(())
    }

    async fn insert(
        &self,
        collection: &str,
        id: Option<&str>,
        data: Value,
    ) -> Result<String, StoreError> {
        self.check_writable(collection)?;
        let id = id
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), data);
        Ok(id)
    }
}
