use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

use super::KeyValueStore;
use crate::config::KeyFromEnv;
use crate::error::StoreError;

#[derive(Debug, Serialize)]
struct InsertRow<'a> {
    key: &'a str,
    value: Value,
}

#[derive(Debug, Deserialize)]
struct Row {
    key: String,
    value: Value,
}

/// Configuration for a PostgREST-style key/value table.
#[derive(Debug, Clone)]
pub struct RestStoreConfig {
    /// Base URL of the REST endpoint, e.g. `https://project.supabase.co/rest/v1`
    pub base_url: String,
    pub api_key: String,
    pub table: String,
    pub timeout: Duration,
}

impl Default for RestStoreConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: RestStore::find_key().unwrap_or_default(),
            table: "kv_store".to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Key/value store backed by a `{key, value}` table behind a REST API.
#[derive(Debug, Clone)]
pub struct RestStore {
    config: RestStoreConfig,
    client: Client,
}

impl KeyFromEnv for RestStore {
    const KEY_NAME: &'static str = "WIKI_QUIZ_STORE_KEY";
}

impl RestStore {
    pub fn new(config: RestStoreConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                Client::new()
            });
        Self { config, client }
    }

    fn table_url(&self) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), self.config.table)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
    }

    async fn fetch_rows(&self, query: &[(&str, String)]) -> Result<Vec<Row>, StoreError> {
        let response = self
            .authorized(self.client.get(self.table_url()))
            .query(&[("select", "key,value".to_string())])
            .query(query)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Store read request failed");
                StoreError::Http(e.to_string())
            })?;

        let status = response.status();
        debug!(status = %status, "Received store read response");
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::NotProvisioned);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StoreError::Api { status: status.as_u16(), message });
        }

        let body = response.text().await.map_err(|e| StoreError::Http(e.to_string()))?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// `like` pattern matching keys that start with `prefix` literally.
fn like_prefix_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 8);
    for c in prefix.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('*');
    pattern
}

#[async_trait]
impl KeyValueStore for RestStore {
    #[instrument(skip(self, value), fields(table = %self.config.table))]
    async fn put(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let response = self
            .authorized(self.client.post(self.table_url()))
            .header("Prefer", "return=minimal")
            .json(&InsertRow { key, value })
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Store insert request failed");
                StoreError::Http(e.to_string())
            })?;

        let status = response.status();
        if status == StatusCode::CONFLICT {
            return Err(StoreError::Conflict(key.to_string()));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::NotProvisioned);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %message, "Store rejected insert");
            return Err(StoreError::Api { status: status.as_u16(), message });
        }
        Ok(())
    }

    #[instrument(skip(self), fields(table = %self.config.table))]
    async fn get_by_key(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let rows = self.fetch_rows(&[("key", format!("eq.{key}"))]).await?;
        Ok(rows.into_iter().next().map(|row| row.value))
    }

    #[instrument(skip(self), fields(table = %self.config.table))]
    async fn scan_by_prefix_descending(&self, prefix: &str) -> Result<Vec<(String, Value)>, StoreError> {
        let rows = self
            .fetch_rows(&[
                ("key", format!("like.{}", like_prefix_pattern(prefix))),
                ("order", "key.desc".to_string()),
            ])
            .await?;
        Ok(rows.into_iter().map(|row| (row.key, row.value)).collect())
    }
}
