//! The generate-quiz flow: validate input, consult the cache, generate,
//! then save on a best-effort basis.

use reqwest::Url;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, instrument, warn};

use crate::error::{QuizError, ValidationError};
use crate::generator::QuizGenerator;
use crate::models::QuizData;
use crate::repository::QuizRepository;
use crate::store::KeyValueStore;

/// Where a generate result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// An earlier saved quiz for the same URL
    Cache,
    /// Freshly generated and saved
    Generated,
    /// Freshly generated but the save failed; will not show up in history
    Unsaved,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOutcome {
    pub quiz: QuizData,
    pub source: Source,
}

impl GenerateOutcome {
    pub fn is_cached(&self) -> bool {
        self.source == Source::Cache
    }
}

/// Trim the input, add `https://` when no scheme is given, and check that it
/// names a Wikipedia host. Returns the normalized URL string.
pub fn normalize_wikipedia_url(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }

    let lower = trimmed.to_ascii_lowercase();
    let normalized = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = Url::parse(&normalized).map_err(|e| ValidationError::Malformed(e.to_string()))?;
    let host = parsed.host_str().unwrap_or_default();
    if !host.contains("wikipedia.org") {
        return Err(ValidationError::NotWikipedia(host.to_string()));
    }

    Ok(normalized)
}

/// Run the generate flow for raw user input.
#[instrument(skip(repo))]
pub async fn generate_quiz<S, G>(repo: &QuizRepository<S, G>, raw_input: &str) -> Result<GenerateOutcome, QuizError>
where
    S: KeyValueStore,
    G: QuizGenerator,
{
    let url = normalize_wikipedia_url(raw_input)?;

    if let Some(quiz) = repo.check_url_exists(&url).await {
        info!(quiz_id = quiz.id, url = %url, "Quiz loaded from cache");
        return Ok(GenerateOutcome { quiz, source: Source::Cache });
    }

    let generated = repo.generate_quiz_from_url(&url).await;
    match repo.save_quiz(generated.content.clone()).await {
        Ok(saved) => Ok(GenerateOutcome { quiz: saved, source: Source::Generated }),
        Err(e) => {
            warn!(error = %e, "Error saving quiz, showing unsaved quiz instead");
            Ok(GenerateOutcome { quiz: generated, source: Source::Unsaved })
        }
    }
}

/// A single generate trigger. While a request is running the control is
/// disabled and further submits are refused.
#[derive(Debug, Default)]
pub struct GenerateControl {
    in_flight: AtomicBool,
}

struct Enabled<'a>(&'a AtomicBool);

impl Drop for Enabled<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl GenerateControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        !self.in_flight.load(Ordering::SeqCst)
    }

    pub async fn submit<S, G>(&self, repo: &QuizRepository<S, G>, raw_input: &str) -> Result<GenerateOutcome, QuizError>
    where
        S: KeyValueStore,
        G: QuizGenerator,
    {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(QuizError::InFlight);
        }
        let _enabled = Enabled(&self.in_flight);
        generate_quiz(repo, raw_input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_is_added_when_missing() {
        assert_eq!(
            normalize_wikipedia_url("en.wikipedia.org/wiki/X").unwrap(),
            "https://en.wikipedia.org/wiki/X"
        );
        assert_eq!(
            normalize_wikipedia_url("  HTTP://en.wikipedia.org/wiki/X  ").unwrap(),
            "HTTP://en.wikipedia.org/wiki/X"
        );
    }

    #[test]
    fn blank_input_is_empty() {
        assert_eq!(normalize_wikipedia_url(""), Err(ValidationError::Empty));
        assert_eq!(normalize_wikipedia_url("   "), Err(ValidationError::Empty));
    }

    #[test]
    fn non_wikipedia_hosts_rejected() {
        assert!(matches!(
            normalize_wikipedia_url("https://example.com"),
            Err(ValidationError::NotWikipedia(_))
        ));
        assert!(matches!(
            normalize_wikipedia_url("https://"),
            Err(ValidationError::Malformed(_))
        ));
    }

    #[test]
    fn mobile_and_other_language_hosts_accepted() {
        assert!(normalize_wikipedia_url("https://de.m.wikipedia.org/wiki/Rust").is_ok());
    }
}
