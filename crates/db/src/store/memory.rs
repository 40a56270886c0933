use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{KeyValueStore, StoreError};

#[derive(Default)]
struct Keyspace {
    strings: HashMap<String, String>,
    hashes: HashMap<String, BTreeMap<String, String>>,
}

/// Process-local store for tests and throwaway runs.
#[derive(Default)]
pub struct InMemoryKeyValueStore {
    keyspace: RwLock<Keyspace>,
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let keyspace = self.keyspace.read().await;
        Ok(keyspace.strings.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut keyspace = self.keyspace.write().await;
        keyspace.strings.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn delete(&self, keys: &[&str]) -> Result<u64, StoreError> {
        let mut keyspace = self.keyspace.write().await;
        let mut removed = 0;
        for key in keys {
            let had_string = keyspace.strings.remove(*key).is_some();
            let had_hash = keyspace.hashes.remove(*key).is_some();
            if had_string || had_hash {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let keyspace = self.keyspace.read().await;
        Ok(keyspace.strings.contains_key(key) || keyspace.hashes.contains_key(key))
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        let keyspace = self.keyspace.read().await;
        Ok(keyspace.hashes.get(key).and_then(|fields| fields.get(field)).cloned())
    }

    async fn hash_get_all(&self, key: &str) -> Result<BTreeMap<String, String>, StoreError> {
        let keyspace = self.keyspace.read().await;
        Ok(keyspace.hashes.get(key).cloned().unwrap_or_default())
    }

    async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
        let mut keyspace = self.keyspace.write().await;
        keyspace
            .hashes
            .entry(key.to_owned())
            .or_default()
            .insert(field.to_owned(), value.to_owned());
        Ok(())
    }
}
