use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::error::ConfigError;
use crate::generator::{HttpGenerator, HttpGeneratorConfig, OfflineGenerator, QuizGenerator};
use crate::repository::DEFAULT_KEY_PREFIX;
use crate::store::{FileStore, KeyValueStore, MemoryStore, RestStore, RestStoreConfig};

pub const BACKEND_URL_VAR: &str = "WIKI_QUIZ_BACKEND_URL";
pub const BACKEND_TIMEOUT_VAR: &str = "WIKI_QUIZ_BACKEND_TIMEOUT_SECS";
pub const STORE_VAR: &str = "WIKI_QUIZ_STORE";
pub const STORE_URL_VAR: &str = "WIKI_QUIZ_STORE_URL";
pub const STORE_TABLE_VAR: &str = "WIKI_QUIZ_STORE_TABLE";
pub const DATA_FILE_VAR: &str = "WIKI_QUIZ_DATA_FILE";
pub const KEY_PREFIX_VAR: &str = "WIKI_QUIZ_KEY_PREFIX";

const DEFAULT_DATA_FILE: &str = ".wiki_quiz/quizzes.json";
const DEFAULT_TABLE: &str = "kv_store";
const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 30;

/// Trait for types that can retrieve a secret from environment variables
pub trait KeyFromEnv {
    /// The environment variable holding the secret
    const KEY_NAME: &'static str;

    /// Look the key up in the environment, loading `.env` first if present
    fn find_key() -> Option<String> {
        // Missing .env is fine
        let _ = dotenvy::dotenv();
        env::var(Self::KEY_NAME).ok().filter(|key| !key.is_empty())
    }

    fn require_key() -> Result<String, ConfigError> {
        Self::find_key().ok_or(ConfigError::Missing(Self::KEY_NAME))
    }
}

/// Which key/value backend holds saved quizzes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    Rest { base_url: String, table: String },
    File(PathBuf),
    Memory,
}

impl StoreKind {
    /// Parse a backend name (case insensitive); `rest` needs a store URL.
    pub fn parse(name: &str, store_url: Option<String>, table: String, data_file: PathBuf) -> Result<Self, ConfigError> {
        match name.to_lowercase().as_str() {
            "rest" => {
                let base_url = store_url.ok_or(ConfigError::Missing(STORE_URL_VAR))?;
                Ok(Self::Rest { base_url, table })
            }
            "file" => Ok(Self::File(data_file)),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::Invalid { name: STORE_VAR, value: name.to_string() }),
        }
    }
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreKind::Rest { base_url, table } => write!(f, "rest ({base_url}/{table})"),
            StoreKind::File(path) => write!(f, "file ({})", path.display()),
            StoreKind::Memory => write!(f, "memory"),
        }
    }
}

/// Raw store settings, kept so the backend can be re-chosen after loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub url: Option<String>,
    pub table: String,
    pub data_file: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            url: None,
            table: DEFAULT_TABLE.to_string(),
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
        }
    }
}

impl StoreSettings {
    pub fn resolve(&self, name: &str) -> Result<StoreKind, ConfigError> {
        StoreKind::parse(name, self.url.clone(), self.table.clone(), self.data_file.clone())
    }
}

/// Runtime settings, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the quiz generation service; `None` means offline
    pub backend_url: Option<String>,
    pub backend_timeout: Duration,
    pub store: StoreKind,
    pub store_settings: StoreSettings,
    pub key_prefix: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let store_settings = StoreSettings::default();
        Self {
            backend_url: None,
            backend_timeout: Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS),
            store: StoreKind::File(store_settings.data_file.clone()),
            store_settings,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl AppConfig {
    /// Build the configuration from environment variables.
    ///
    /// The store defaults to `rest` when a store URL is set and to `file`
    /// otherwise.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(var)
    }

    /// Build the configuration from any variable lookup. Blank values count
    /// as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let backend_url = get(BACKEND_URL_VAR);
        let backend_timeout = match get(BACKEND_TIMEOUT_VAR) {
            Some(raw) => Duration::from_secs(
                raw.parse()
                    .map_err(|_| ConfigError::Invalid { name: BACKEND_TIMEOUT_VAR, value: raw })?,
            ),
            None => Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS),
        };

        let store_settings = StoreSettings {
            url: get(STORE_URL_VAR),
            table: get(STORE_TABLE_VAR).unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            data_file: get(DATA_FILE_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE)),
        };
        let store_name = get(STORE_VAR)
            .unwrap_or_else(|| if store_settings.url.is_some() { "rest" } else { "file" }.to_string());
        let store = store_settings.resolve(&store_name)?;

        let key_prefix = get(KEY_PREFIX_VAR).unwrap_or_else(|| DEFAULT_KEY_PREFIX.to_string());

        Ok(Self { backend_url, backend_timeout, store, store_settings, key_prefix })
    }

    /// Switch to another backend by name, using the loaded store settings.
    pub fn select_store(&mut self, name: &str) -> Result<(), ConfigError> {
        self.store = self.store_settings.resolve(name)?;
        Ok(())
    }

    pub fn build_store(&self) -> Result<Box<dyn KeyValueStore>, ConfigError> {
        info!(store = %self.store, "Opening quiz store");
        Ok(match &self.store {
            StoreKind::Rest { base_url, table } => Box::new(RestStore::new(RestStoreConfig {
                base_url: base_url.clone(),
                api_key: RestStore::require_key()?,
                table: table.clone(),
                ..Default::default()
            })),
            StoreKind::File(path) => Box::new(FileStore::new(path.clone())),
            StoreKind::Memory => Box::new(MemoryStore::new()),
        })
    }

    pub fn build_generator(&self) -> Box<dyn QuizGenerator> {
        match &self.backend_url {
            Some(endpoint) => {
                info!(endpoint = %endpoint, "Using quiz generation service");
                Box::new(HttpGenerator::new(HttpGeneratorConfig {
                    endpoint: endpoint.clone(),
                    timeout: self.backend_timeout,
                }))
            }
            None => {
                info!("No generation service configured; placeholder quizzes will be used");
                Box::new(OfflineGenerator)
            }
        }
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok()
}
