use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::KeyValueStore;
use crate::error::StoreError;

/// Store kept in a single JSON object on disk, `{ "<key>": <record>, ... }`.
///
/// A missing file reads as an empty store. Writes rewrite the whole file into
/// a sibling temp file and rename it over the target, so the file on disk is
/// always a complete document. Readers wait while a write is in progress.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    lock: Arc<RwLock<()>>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(RwLock::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Map<String, Value>, StoreError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    async fn persist(&self, entries: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let content = serde_json::to_string_pretty(entries)?;
        let staging = self.staging_path();
        let mut file = fs::File::create(&staging).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        if let Err(e) = fs::rename(&staging, &self.path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e.into());
        }
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    #[instrument(skip(self, value), fields(path = %self.path.display()))]
    async fn put(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let _guard = self.lock.write().await;
        let mut entries = self.load().await?;
        if entries.contains_key(key) {
            return Err(StoreError::Conflict(key.to_string()));
        }
        entries.insert(key.to_string(), value);
        self.persist(&entries).await?;
        debug!(entries = entries.len(), "Wrote store file");
        Ok(())
    }

    async fn get_by_key(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let _guard = self.lock.read().await;
        Ok(self.load().await?.remove(key))
    }

    async fn scan_by_prefix_descending(&self, prefix: &str) -> Result<Vec<(String, Value)>, StoreError> {
        let entries = {
            let _guard = self.lock.read().await;
            self.load().await?
        };
        let mut matching: Vec<(String, Value)> = entries
            .into_iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .collect();
        matching.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(matching)
    }
}
