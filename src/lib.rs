pub mod config;
pub mod error;
pub mod generate;
pub mod generator;
pub mod history;
pub mod models;
pub mod repository;
pub mod session;
pub mod store;

// Convenient re-exports
pub use generate::{generate_quiz, normalize_wikipedia_url, GenerateControl, GenerateOutcome, Source};
pub use models::{Difficulty, KeyEntities, QuizContent, QuizData, QuizQuestion, UserAnswer};
pub use repository::QuizRepository;
pub use session::{AnswerStatus, Mode, QuizSession, Score};
