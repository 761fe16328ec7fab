
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Notify;

use wiki_quiz::error::{GenerationError, QuizError, ValidationError};
use wiki_quiz::generator::QuizGenerator;
use wiki_quiz::store::MemoryStore;
use wiki_quiz::{generate_quiz, Difficulty, GenerateControl, QuizContent, QuizRepository, Source};

use crate::test_utils::{create_test_repository, sample_content};

const TURING: &str = "https://en.wikipedia.org/wiki/Alan_Turing";

#[tokio::test]
async fn blank_input_is_rejected_before_any_call() {
    let (repo, store, handle) = create_test_repository();
    store.set_fail_reads(true);

    for input in ["", "   "] {
        let err = generate_quiz(&repo, input).await.unwrap_err();
        assert!(matches!(err, QuizError::Validation(ValidationError::Empty)));
    }
    assert_eq!(handle.calls(), 0);
    assert!(store.is_empty());
}

#[tokio::test]
async fn non_wikipedia_host_is_rejected() {
    let (repo, _store, handle) = create_test_repository();
    let err = generate_quiz(&repo, "https://example.com").await.unwrap_err();
    assert!(matches!(err, QuizError::Validation(ValidationError::NotWikipedia(_))));
    assert_eq!(handle.calls(), 0);
}

#[tokio::test]
async fn missing_scheme_is_normalized_before_generation() {
    let (repo, _store, handle) = create_test_repository();
    handle.push_quiz(sample_content("https://en.wikipedia.org/wiki/X"));

    let outcome = generate_quiz(&repo, "en.wikipedia.org/wiki/X").await.unwrap();
    assert_eq!(outcome.quiz.url(), "https://en.wikipedia.org/wiki/X");
    assert_eq!(outcome.source, Source::Generated);
}

#[tokio::test]
async fn second_request_is_served_from_cache() {
    let (repo, store, handle) = create_test_repository();
    handle.push_quiz(sample_content(TURING));

    let first = generate_quiz(&repo, TURING).await.unwrap();
    assert_eq!(first.source, Source::Generated);
    assert!(first.quiz.is_saved());

    let second = generate_quiz(&repo, &format!("  {TURING} ")).await.unwrap();
    assert!(second.is_cached());
    assert_eq!(handle.calls(), 1);
    assert_eq!(store.len(), 1);
    assert_eq!(
        serde_json::to_vec(&second.quiz).unwrap(),
        serde_json::to_vec(&first.quiz).unwrap()
    );
}

#[tokio::test]
async fn service_outage_falls_back_to_placeholder() {
    let (repo, _store, handle) = create_test_repository();
    handle.push_failure(GenerationError::Api { status: 503, message: "down".to_string() });

    let outcome = generate_quiz(&repo, TURING).await.unwrap();
    let quiz = &outcome.quiz;
    assert_eq!(outcome.source, Source::Generated);
    assert!(quiz.title().contains("Alan Turing"));
    assert!(quiz.content.summary.contains("Alan Turing"));

    let difficulties: Vec<Difficulty> = quiz.questions().iter().map(|q| q.difficulty).collect();
    assert_eq!(difficulties, vec![Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]);
}

#[tokio::test]
async fn failed_save_returns_unsaved_quiz() {
    let (repo, store, handle) = create_test_repository();
    handle.push_quiz(sample_content(TURING));
    store.set_fail_writes(true);

    let outcome = generate_quiz(&repo, TURING).await.unwrap();
    assert_eq!(outcome.source, Source::Unsaved);
    assert!(!outcome.quiz.is_saved());
    assert_eq!(outcome.quiz.content, sample_content(TURING));
    assert!(repo.get_all_quizzes().await.is_empty());
}

#[tokio::test]
async fn unreadable_store_still_generates() {
    let (repo, store, handle) = create_test_repository();
    store.set_fail_reads(true);
    handle.push_quiz(sample_content(TURING));

    let outcome = generate_quiz(&repo, TURING).await.unwrap();
    assert_eq!(outcome.source, Source::Generated);
    assert_eq!(store.len(), 1);
}

/// Generator that parks until released, so a request can be held in flight.
#[derive(Debug, Default)]
struct Gate {
    started: Notify,
    release: Notify,
}

#[derive(Debug, Clone)]
struct GatedGenerator(Arc<Gate>);

#[async_trait]
impl QuizGenerator for GatedGenerator {
    async fn generate(&self, url: &str) -> Result<QuizContent, GenerationError> {
        self.0.started.notify_one();
        self.0.release.notified().await;
        Ok(sample_content(url))
    }
}

#[tokio::test]
async fn control_refuses_submit_while_in_flight() {
    let gate = Arc::new(Gate::default());
    let repo = QuizRepository::new(MemoryStore::new(), GatedGenerator(gate.clone()));
    let control = GenerateControl::new();
    assert!(control.is_enabled());

    let (first, second) = tokio::join!(control.submit(&repo, TURING), async {
        gate.started.notified().await;
        assert!(!control.is_enabled());
        let second = control.submit(&repo, TURING).await;
        gate.release.notify_one();
        second
    });

    assert_eq!(first.unwrap().source, Source::Generated);
    assert!(matches!(second, Err(QuizError::InFlight)));
    assert!(control.is_enabled());

    // Enabled again: the next submit goes through and hits the cache.
    let third = control.submit(&repo, TURING).await.unwrap();
    assert!(third.is_cached());
}

#[tokio::test]
async fn control_re_enables_after_validation_failure() {
    let (repo, _store, _handle) = create_test_repository();
    let control = GenerateControl::new();

    assert!(matches!(control.submit(&repo, "").await, Err(QuizError::Validation(_))));
    assert!(control.is_enabled());
}
