use chrono::{DateTime, Local, TimeZone, Utc};
use std::fmt::Display;

use crate::generator::QuizGenerator;
use crate::models::QuizData;
use crate::repository::QuizRepository;
use crate::store::KeyValueStore;

const SUMMARY_PREVIEW_CHARS: usize = 80;
const WIKI_ARTICLE_PREFIX: &str = "https://en.wikipedia.org/wiki/";

/// One row of the past-quizzes listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub id: i64,
    pub title: String,
    pub summary_preview: String,
    pub url: String,
    pub url_label: String,
    pub question_count: usize,
    pub created: String,
}

impl From<&QuizData> for HistoryRow {
    fn from(quiz: &QuizData) -> Self {
        Self {
            id: quiz.id,
            title: quiz.title().to_string(),
            summary_preview: preview(&quiz.content.summary),
            url: quiz.url().to_string(),
            url_label: quiz.url().replacen(WIKI_ARTICLE_PREFIX, "", 1),
            question_count: quiz.questions().len(),
            created: format_created(quiz.created_at),
        }
    }
}

/// Reload the listing from the store. Nothing is cached between loads.
pub async fn load_history<S, G>(repo: &QuizRepository<S, G>) -> Vec<HistoryRow>
where
    S: KeyValueStore,
    G: QuizGenerator,
{
    repo.get_all_quizzes().await.iter().map(HistoryRow::from).collect()
}

/// Local time, e.g. `Mar 1, 2024, 12:30 PM`, or `N/A` for unsaved quizzes.
pub fn format_created(created_at: Option<DateTime<Utc>>) -> String {
    match created_at {
        Some(at) => format_in(at, &Local),
        None => "N/A".to_string(),
    }
}

fn format_in<Tz>(at: DateTime<Utc>, zone: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.with_timezone(zone).format("%b %-d, %Y, %I:%M %p").to_string()
}

fn preview(summary: &str) -> String {
    let first_line = summary.lines().next().unwrap_or_default();
    if first_line.chars().count() <= SUMMARY_PREVIEW_CHARS {
        return first_line.to_string();
    }
    let cut: String = first_line.chars().take(SUMMARY_PREVIEW_CHARS - 1).collect();
    format!("{}…", cut.trim_end())
}
