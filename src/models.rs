//! Quiz records as they travel between the generation service, the store
//! and the quiz-taking session.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

/// People, organizations and locations mentioned by the article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct KeyEntities {
    pub people: Vec<String>,
    pub organizations: Vec<String>,
    pub locations: Vec<String>,
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(description = "A multiple-choice question about the article")]
pub struct QuizQuestion {
    pub question: String,
    /// Presented choices, in display order
    pub options: Vec<String>,
    /// The correct option; should be one of `options`
    #[schemars(description = "The correct answer (must be one of the options)")]
    pub answer: String,
    pub difficulty: Difficulty,
    #[schemars(description = "Explanation referencing the article section")]
    pub explanation: String,
}

/// Quiz content as produced by the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "Quiz Content", description = "Quiz generated from a Wikipedia article")]
pub struct QuizContent {
    pub url: String,
    pub title: String,
    #[schemars(description = "2-3 sentence summary of the article")]
    pub summary: String,
    pub key_entities: KeyEntities,
    pub sections: Vec<String>,
    /// Question order is the canonical numbering
    pub quiz: Vec<QuizQuestion>,
    pub related_topics: Vec<String>,
}

impl QuizContent {
    /// Topic text derived from the last path segment of `url`, with
    /// underscores turned into spaces.
    pub fn topic_from_url(url: &str) -> String {
        url.rsplit('/').next().unwrap_or_default().replace('_', " ")
    }
}

/// A quiz record, either freshly generated or read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizData {
    pub id: i64,
    #[serde(flatten)]
    pub content: QuizContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl QuizData {
    /// Wrap generated content with a creation-time id; `created_at` stays
    /// unset until the record is saved.
    pub fn unsaved(content: QuizContent) -> Self {
        Self {
            id: Utc::now().timestamp_millis(),
            content,
            created_at: None,
        }
    }

    pub fn is_saved(&self) -> bool {
        self.created_at.is_some()
    }

    pub fn url(&self) -> &str {
        &self.content.url
    }

    pub fn title(&self) -> &str {
        &self.content.title
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.content.quiz
    }
}

/// A selected option for one question, keyed by its 0-based position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnswer {
    pub question_index: usize,
    pub selected_answer: String,
}
