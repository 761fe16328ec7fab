use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::QuizGenerator;
use crate::error::GenerationError;
use crate::models::QuizContent;

/// Generator used when no service is configured; every call is unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGenerator;

#[async_trait]
impl QuizGenerator for OfflineGenerator {
    async fn generate(&self, _url: &str) -> Result<QuizContent, GenerationError> {
        Err(GenerationError::Unavailable("no generation service configured".to_string()))
    }
}

/// Scripted reply for [`MockGenerator`].
#[derive(Debug)]
pub enum MockResponse {
    Quiz(QuizContent),
    Fail(GenerationError),
}

/// Controls a [`MockGenerator`] from test code.
#[derive(Debug, Default)]
pub struct MockHandle {
    responses: Mutex<VecDeque<MockResponse>>,
    calls: AtomicUsize,
}

impl MockHandle {
    pub fn push(&self, response: MockResponse) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(response);
    }

    pub fn push_quiz(&self, content: QuizContent) {
        self.push(MockResponse::Quiz(content));
    }

    pub fn push_failure(&self, error: GenerationError) {
        self.push(MockResponse::Fail(error));
    }

    /// Number of `generate` calls seen so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Generator replaying queued responses; an empty queue means unavailable.
#[derive(Debug, Clone)]
pub struct MockGenerator {
    handle: Arc<MockHandle>,
}

impl MockGenerator {
    pub fn new() -> (Self, Arc<MockHandle>) {
        let handle = Arc::new(MockHandle::default());
        (Self { handle: handle.clone() }, handle)
    }

    pub fn with_responses(responses: Vec<MockResponse>) -> (Self, Arc<MockHandle>) {
        let (generator, handle) = Self::new();
        for response in responses {
            handle.push(response);
        }
        (generator, handle)
    }
}

#[async_trait]
impl QuizGenerator for MockGenerator {
    async fn generate(&self, _url: &str) -> Result<QuizContent, GenerationError> {
        self.handle.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .handle
            .responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match next {
            Some(MockResponse::Quiz(content)) => Ok(content),
            Some(MockResponse::Fail(error)) => Err(error),
            None => Err(GenerationError::Unavailable("mock has no scripted response".to_string())),
        }
    }
}
