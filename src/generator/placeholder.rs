//! Deterministic stand-in quiz used when the generation service cannot be
//! reached, so the rest of the application keeps working offline.

use crate::models::{Difficulty, KeyEntities, QuizContent, QuizQuestion};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn question(text: String, options: &[&str], answer: &str, difficulty: Difficulty, explanation: &str) -> QuizQuestion {
    QuizQuestion {
        question: text,
        options: strings(options),
        answer: answer.to_string(),
        difficulty,
        explanation: explanation.to_string(),
    }
}

/// Build the placeholder quiz for `url`. The topic is the URL's last path
/// segment with underscores replaced by spaces.
pub fn placeholder_quiz(url: &str) -> QuizContent {
    let topic = QuizContent::topic_from_url(url);

    QuizContent {
        url: url.to_string(),
        title: topic.clone(),
        summary: format!(
            "This is a comprehensive article about {topic}. The article covers various aspects including historical context, key contributions, and lasting impact on the field."
        ),
        key_entities: KeyEntities {
            people: strings(&["Person A", "Person B"]),
            organizations: strings(&["Organization A", "Organization B"]),
            locations: strings(&["Location A", "Location B"]),
        },
        sections: strings(&["Introduction", "Early Life", "Career", "Legacy", "References"]),
        quiz: vec![
            question(
                format!("What is a key fact about {topic}?"),
                &["Option A", "Option B", "Option C", "Option D"],
                "Option B",
                Difficulty::Easy,
                "This information is mentioned in the introduction section.",
            ),
            question(
                format!("Which organization is associated with {topic}?"),
                &["Org A", "Org B", "Org C", "Org D"],
                "Org B",
                Difficulty::Medium,
                "Detailed in the career section.",
            ),
            question(
                format!("What was the major contribution of {topic}?"),
                &["Contribution A", "Contribution B", "Contribution C", "Contribution D"],
                "Contribution C",
                Difficulty::Hard,
                "Explained in the legacy section.",
            ),
        ],
        related_topics: strings(&["Related Topic 1", "Related Topic 2", "Related Topic 3"]),
    }
}
