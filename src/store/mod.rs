pub mod file;
pub mod memory;
pub mod rest;

pub use file::*;
pub use memory::*;
pub use rest::*;

use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

/// Minimal key/value capability the quiz repository needs.
///
/// Values are whole records; the store never looks inside them.
#[async_trait]
pub trait KeyValueStore: Send + Sync + Debug {
    /// Insert `value` under `key`. An existing key is a `StoreError::Conflict`.
    async fn put(&self, key: &str, value: Value) -> Result<(), StoreError>;

    async fn get_by_key(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// All entries whose key starts with `prefix`, ordered by key descending.
    async fn scan_by_prefix_descending(&self, prefix: &str) -> Result<Vec<(String, Value)>, StoreError>;
}

#[async_trait]
impl KeyValueStore for Box<dyn KeyValueStore> {
    async fn put(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.as_ref().put(key, value).await
    }

    async fn get_by_key(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.as_ref().get_by_key(key).await
    }

    async fn scan_by_prefix_descending(&self, prefix: &str) -> Result<Vec<(String, Value)>, StoreError> {
        self.as_ref().scan_by_prefix_descending(prefix).await
    }
}
