pub mod http;
pub mod mock;
pub mod placeholder;

pub use http::*;
pub use mock::*;
pub use placeholder::placeholder_quiz;

use crate::error::GenerationError;
use crate::models::QuizContent;
use async_trait::async_trait;
use std::fmt::Debug;

/// Source of quiz content for an article URL.
///
/// Implementations only report failures; falling back to a placeholder quiz
/// is the repository's job.
#[async_trait]
pub trait QuizGenerator: Send + Sync + Debug {
    async fn generate(&self, url: &str) -> Result<QuizContent, GenerationError>;
}

#[async_trait]
impl QuizGenerator for Box<dyn QuizGenerator> {
    async fn generate(&self, url: &str) -> Result<QuizContent, GenerationError> {
        self.as_ref().generate(url).await
    }
}
