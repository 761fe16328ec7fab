//! Data access layer: wraps a key/value store and a quiz generator.
//!
//! - `save_quiz` assigns identity and timestamp and writes the record
//! - `get_all_quizzes` / `get_quiz_by_id` read back, treating read failures as "nothing there"
//! - `check_url_exists` is the cache lookup used before generating
//! - `generate_quiz_from_url` never fails; it falls back to a placeholder quiz

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::StoreError;
use crate::generator::{placeholder_quiz, QuizGenerator};
use crate::models::{QuizContent, QuizData};
use crate::store::KeyValueStore;

pub const DEFAULT_KEY_PREFIX: &str = "wiki_quiz_";

/// Source of "now"; replaceable so ids can be pinned in tests.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Clone)]
pub struct QuizRepository<S: KeyValueStore, G: QuizGenerator> {
    store: S,
    generator: G,
    prefix: String,
    clock: Clock,
}

impl<S: KeyValueStore, G: QuizGenerator> fmt::Debug for QuizRepository<S, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizRepository")
            .field("store", &self.store)
            .field("generator", &self.generator)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore, G: QuizGenerator> QuizRepository<S, G> {
    pub fn new(store: S, generator: G) -> Self {
        Self {
            store,
            generator,
            prefix: DEFAULT_KEY_PREFIX.to_string(),
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn key_for(&self, id: i64) -> String {
        format!("{}{}", self.prefix, id)
    }

    /// Persist generated content as a new record.
    ///
    /// The id is the current time in milliseconds; two saves within the same
    /// millisecond collide and the second is rejected by the store.
    #[instrument(skip(self, content), fields(url = %content.url))]
    pub async fn save_quiz(&self, content: QuizContent) -> Result<QuizData, StoreError> {
        let now = (self.clock)();
        let quiz = QuizData {
            id: now.timestamp_millis(),
            content,
            created_at: Some(now),
        };
        let key = self.key_for(quiz.id);
        let value = serde_json::to_value(&quiz)?;

        self.store.put(&key, value).await.map_err(|e| {
            warn!(error = %e, key = %key, "Error saving quiz");
            e
        })?;

        info!(quiz_id = quiz.id, "Saved quiz");
        Ok(quiz)
    }

    /// Every saved quiz, newest key first. Read failures yield an empty list.
    #[instrument(skip(self))]
    pub async fn get_all_quizzes(&self) -> Vec<QuizData> {
        let entries = match self.store.scan_by_prefix_descending(&self.prefix).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Error fetching quizzes (treating as empty cache)");
                return Vec::new();
            }
        };

        let quizzes: Vec<QuizData> = entries
            .into_iter()
            .filter_map(|(key, value)| decode(&key, value))
            .collect();
        debug!(count = quizzes.len(), "Loaded quizzes");
        quizzes
    }

    #[instrument(skip(self))]
    pub async fn get_quiz_by_id(&self, id: i64) -> Option<QuizData> {
        let key = self.key_for(id);
        match self.store.get_by_key(&key).await {
            Ok(Some(value)) => decode(&key, value),
            Ok(None) => {
                debug!(key = %key, "Quiz not found");
                None
            }
            Err(e) => {
                warn!(error = %e, key = %key, "Error fetching quiz");
                None
            }
        }
    }

    /// First saved quiz whose URL matches exactly.
    ///
    /// Linear in the number of saved quizzes.
    pub async fn check_url_exists(&self, url: &str) -> Option<QuizData> {
        self.get_all_quizzes()
            .await
            .into_iter()
            .find(|quiz| quiz.url() == url)
    }

    /// Ask the generation service for a quiz, falling back to the
    /// placeholder quiz on any failure. The result is unsaved.
    #[instrument(skip(self))]
    pub async fn generate_quiz_from_url(&self, url: &str) -> QuizData {
        let content = match self.generator.generate(url).await {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, "Quiz generation failed; using placeholder quiz");
                placeholder_quiz(url)
            }
        };

        QuizData {
            id: (self.clock)().timestamp_millis(),
            content,
            created_at: None,
        }
    }
}

fn decode(key: &str, value: Value) -> Option<QuizData> {
    match serde_json::from_value(value) {
        Ok(quiz) => Some(quiz),
        Err(e) => {
            warn!(error = %e, key = %key, "Skipping undecodable quiz record");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::MockGenerator;
    use crate::store::MemoryStore;
    use chrono::TimeZone;
    use serde_json::json;
    use std::sync::atomic::{AtomicI64, Ordering};

    fn ticking_clock(start_ms: i64, step_ms: i64) -> Clock {
        let next = Arc::new(AtomicI64::new(start_ms));
        Arc::new(move || {
            let ms = next.fetch_add(step_ms, Ordering::SeqCst);
            Utc.timestamp_millis_opt(ms).single().unwrap()
        })
    }

    #[tokio::test]
    async fn save_assigns_key_id_and_timestamp() {
        let store = MemoryStore::new();
        let (generator, _) = MockGenerator::new();
        let repo = QuizRepository::new(store.clone(), generator).with_clock(ticking_clock(1_000, 1));

        let saved = repo
            .save_quiz(placeholder_quiz("https://en.wikipedia.org/wiki/X"))
            .await
            .unwrap();
        assert_eq!(saved.id, 1_000);
        assert!(saved.is_saved());

        let raw = store.get_by_key("wiki_quiz_1000").await.unwrap().unwrap();
        assert_eq!(raw["id"], 1_000);
        assert_eq!(raw["title"], "X");
    }

    #[tokio::test]
    async fn same_millisecond_saves_collide() {
        let (generator, _) = MockGenerator::new();
        let repo = QuizRepository::new(MemoryStore::new(), generator).with_clock(ticking_clock(5, 0));
        let content = placeholder_quiz("https://en.wikipedia.org/wiki/X");

        repo.save_quiz(content.clone()).await.unwrap();
        assert!(matches!(repo.save_quiz(content).await, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn undecodable_records_are_skipped() {
        let store = MemoryStore::new();
        store.put("wiki_quiz_9", json!({"garbage": true})).await.unwrap();
        let (generator, _) = MockGenerator::new();
        let repo = QuizRepository::new(store, generator).with_clock(ticking_clock(1, 1));
        repo.save_quiz(placeholder_quiz("https://en.wikipedia.org/wiki/Y")).await.unwrap();

        let all = repo.get_all_quizzes().await;
        assert_eq!(all.len(), 1);
        assert_eq!(repo.get_quiz_by_id(9).await, None);
    }

    #[tokio::test]
    async fn custom_prefix_scopes_keys() {
        let store = MemoryStore::new();
        let (generator, _) = MockGenerator::new();
        let repo = QuizRepository::new(store.clone(), generator)
            .with_prefix("quiz:")
            .with_clock(ticking_clock(7, 1));
        repo.save_quiz(placeholder_quiz("https://en.wikipedia.org/wiki/Z")).await.unwrap();
        assert!(store.get_by_key("quiz:7").await.unwrap().is_some());
    }
}
