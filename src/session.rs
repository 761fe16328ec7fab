//! Quiz-taking state machine.
//!
//! A session starts in [`Mode::View`], where the canonical answers are shown.
//! In [`Mode::Take`] the user selects one option per question and submits
//! once every question is answered; the session is then graded until it is
//! reset or the mode changes. Score and per-option status are computed from
//! the current state on every call.

use std::collections::BTreeMap;
use tracing::debug;

use crate::error::SessionError;
use crate::models::{QuizData, QuizQuestion, UserAnswer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    View,
    Take,
}

/// Display status of one option of one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerStatus {
    /// The option is the right answer and the quiz is graded
    Correct,
    /// The user picked this wrong option and the quiz is graded
    IncorrectSelected,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

impl Score {
    /// `correct / total` as a whole percentage, rounding halves up.
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.correct * 200 + self.total) / (self.total * 2)) as u32
    }
}

/// Count exact matches between recorded answers and the questions' answers.
pub fn score_answers(questions: &[QuizQuestion], answers: &BTreeMap<usize, String>) -> Score {
    let correct = questions
        .iter()
        .enumerate()
        .filter(|(index, question)| answers.get(index).is_some_and(|a| *a == question.answer))
        .count();
    Score { correct, total: questions.len() }
}

/// Status of `option` given the question, the user's selection and whether
/// the quiz has been graded.
pub fn option_status(question: &QuizQuestion, selected: Option<&str>, option: &str, graded: bool) -> AnswerStatus {
    if !graded {
        return AnswerStatus::Neutral;
    }
    if option == question.answer {
        AnswerStatus::Correct
    } else if selected == Some(option) {
        AnswerStatus::IncorrectSelected
    } else {
        AnswerStatus::Neutral
    }
}

#[derive(Debug, Clone)]
pub struct QuizSession<'q> {
    quiz: &'q QuizData,
    mode: Mode,
    answers: BTreeMap<usize, String>,
    submitted: bool,
}

impl<'q> QuizSession<'q> {
    pub fn new(quiz: &'q QuizData) -> Self {
        Self {
            quiz,
            mode: Mode::View,
            answers: BTreeMap::new(),
            submitted: false,
        }
    }

    pub fn quiz(&self) -> &'q QuizData {
        self.quiz
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Switch mode. Always discards answers and submission state.
    pub fn set_mode(&mut self, mode: Mode) {
        debug!(from = ?self.mode, to = ?mode, "Switching quiz mode");
        self.mode = mode;
        self.clear();
    }

    pub fn select_answer(&mut self, question_index: usize, option: impl Into<String>) -> Result<(), SessionError> {
        if self.mode != Mode::Take {
            return Err(SessionError::NotTaking);
        }
        if self.submitted {
            return Err(SessionError::AlreadySubmitted);
        }
        let total = self.quiz.questions().len();
        if question_index >= total {
            return Err(SessionError::QuestionOutOfRange { index: question_index, total });
        }
        self.answers.insert(question_index, option.into());
        Ok(())
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn can_submit(&self) -> bool {
        self.mode == Mode::Take && !self.submitted && self.answers.len() == self.quiz.questions().len()
    }

    /// Grade the session. Every question must have an answer.
    pub fn submit(&mut self) -> Result<Score, SessionError> {
        if self.mode != Mode::Take {
            return Err(SessionError::NotTaking);
        }
        if self.submitted {
            return Err(SessionError::AlreadySubmitted);
        }
        let total = self.quiz.questions().len();
        if self.answers.len() != total {
            return Err(SessionError::Incomplete { answered: self.answers.len(), total });
        }

        self.submitted = true;
        let score = score_answers(self.quiz.questions(), &self.answers);
        debug!(correct = score.correct, total = score.total, "Quiz submitted");
        Ok(score)
    }

    /// Start over without leaving take mode.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        if self.mode != Mode::Take {
            return Err(SessionError::NotTaking);
        }
        self.clear();
        Ok(())
    }

    /// The score, once graded.
    pub fn score(&self) -> Option<Score> {
        self.submitted
            .then(|| score_answers(self.quiz.questions(), &self.answers))
    }

    pub fn answer_for(&self, question_index: usize) -> Option<&str> {
        self.answers.get(&question_index).map(String::as_str)
    }

    pub fn user_answers(&self) -> Vec<UserAnswer> {
        self.answers
            .iter()
            .map(|(index, answer)| UserAnswer {
                question_index: *index,
                selected_answer: answer.clone(),
            })
            .collect()
    }

    pub fn option_status(&self, question_index: usize, option: &str) -> AnswerStatus {
        match self.quiz.questions().get(question_index) {
            Some(question) => option_status(question, self.answer_for(question_index), option, self.submitted),
            None => AnswerStatus::Neutral,
        }
    }

    /// Explanations are visible in view mode and after grading.
    pub fn shows_explanations(&self) -> bool {
        self.mode == Mode::View || self.submitted
    }

    pub fn shows_canonical_answer(&self) -> bool {
        self.mode == Mode::View
    }

    fn clear(&mut self) {
        self.answers.clear();
        self.submitted = false;
    }
}
