use thiserror::Error;

/// Errors surfaced by the generate flow.
#[derive(Error, Debug)]
pub enum QuizError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("A quiz is already being generated")]
    InFlight,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a Wikipedia URL")]
    Empty,
    #[error("Please enter a valid Wikipedia URL (e.g., https://en.wikipedia.org/wiki/...): {0}")]
    Malformed(String),
    #[error("Please enter a valid Wikipedia URL (e.g., https://en.wikipedia.org/wiki/...): host {0} is not wikipedia.org")]
    NotWikipedia(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Store API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Store is not provisioned yet")]
    NotProvisioned,
    #[error("Key already exists: {0}")]
    Conflict(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Generation service returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Invalid response body: {0}")]
    InvalidResponse(String),
    #[error("Generation service unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Answers can only be recorded in take mode")]
    NotTaking,
    #[error("Quiz has already been submitted")]
    AlreadySubmitted,
    #[error("Question {index} is out of range (quiz has {total} questions)")]
    QuestionOutOfRange { index: usize, total: usize },
    #[error("Only {answered} of {total} questions answered")]
    Incomplete { answered: usize, total: usize },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}
