//! Minimal key-value surface the block tracker needs: string keys plus
//! per-key field maps.

use std::collections::BTreeMap;

use async_trait::async_trait;
use blockbot_core::errors::{ApplicationError, DomainError};
use thiserror::Error;

pub mod memory;
pub mod sql;

pub use memory::InMemoryKeyValueStore;
pub use sql::SqlKeyValueStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<StoreError> for ApplicationError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Database(error) => Self::Persistence(error.to_string()),
            StoreError::Decode(message) => Self::Domain(DomainError::MalformedRecord(message)),
        }
    }
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes every listed key (string or field map) as one operation.
    /// Returns how many of the keys existed.
    async fn delete(&self, keys: &[&str]) -> Result<u64, StoreError>;

    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>, StoreError>;

    async fn hash_get_all(&self, key: &str) -> Result<BTreeMap<String, String>, StoreError>;

    async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError>;
}
