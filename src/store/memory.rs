use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::KeyValueStore;
use crate::error::StoreError;

/// In-process store backed by an ordered map.
///
/// Clones share the same map, so a test can keep a handle after passing the
/// store to a repository. Reads and writes can be switched to fail.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<BTreeMap<String, Value>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Value>> {
        // A poisoned map is still structurally valid.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn put(&self, key: &str, value: Value) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        let mut entries = self.lock();
        if entries.contains_key(key) {
            return Err(StoreError::Conflict(key.to_string()));
        }
        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn get_by_key(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.check_reads()?;
        Ok(self.lock().get(key).cloned())
    }

    async fn scan_by_prefix_descending(&self, prefix: &str) -> Result<Vec<(String, Value)>, StoreError> {
        self.check_reads()?;
        let entries = self.lock();
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect())
    }
}
