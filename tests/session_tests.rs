
use wiki_quiz::error::SessionError;
use wiki_quiz::{AnswerStatus, Mode, QuizSession, Score, UserAnswer};

use crate::test_utils::sample_quiz;

const TURING: &str = "https://en.wikipedia.org/wiki/Alan_Turing";

#[test]
fn right_wrong_right_scores_two_of_three() {
    let quiz = sample_quiz(TURING);
    let mut session = QuizSession::new(&quiz);
    session.set_mode(Mode::Take);

    session.select_answer(0, "1912").unwrap();
    session.select_answer(1, "Colossus").unwrap();
    session.select_answer(2, "Entscheidungsproblem").unwrap();

    let score = session.submit().unwrap();
    assert_eq!(score, Score { correct: 2, total: 3 });
    assert_eq!(score.percentage(), 67);
    assert_eq!(session.score(), Some(score));

    assert_eq!(session.option_status(1, "Bombe"), AnswerStatus::Correct);
    assert_eq!(session.option_status(1, "Colossus"), AnswerStatus::IncorrectSelected);
    assert_eq!(session.option_status(1, "ENIAC"), AnswerStatus::Neutral);
}

#[test]
fn partial_answers_cannot_be_submitted() {
    let quiz = sample_quiz(TURING);
    let mut session = QuizSession::new(&quiz);
    session.set_mode(Mode::Take);

    session.select_answer(0, "1912").unwrap();
    session.select_answer(2, "P versus NP").unwrap();
    assert!(!session.can_submit());
    assert_eq!(session.submit(), Err(SessionError::Incomplete { answered: 2, total: 3 }));
    assert!(!session.is_submitted());
    assert_eq!(session.score(), None);

    session.select_answer(1, "Bombe").unwrap();
    assert!(session.can_submit());
    assert!(session.submit().is_ok());
}

#[test]
fn changing_mode_discards_answers_and_grading() {
    let quiz = sample_quiz(TURING);
    let mut session = QuizSession::new(&quiz);
    session.set_mode(Mode::Take);
    for (index, question) in quiz.questions().iter().enumerate() {
        session.select_answer(index, question.answer.clone()).unwrap();
    }
    session.submit().unwrap();

    session.set_mode(Mode::View);
    assert!(session.shows_canonical_answer());
    assert!(session.shows_explanations());

    session.set_mode(Mode::Take);
    assert_eq!(session.answered_count(), 0);
    assert!(!session.is_submitted());
    assert!(session.user_answers().is_empty());
    assert_eq!(session.option_status(0, "1912"), AnswerStatus::Neutral);
}

#[test]
fn user_answers_are_ordered_by_question() {
    let quiz = sample_quiz(TURING);
    let mut session = QuizSession::new(&quiz);
    session.set_mode(Mode::Take);
    session.select_answer(2, "P versus NP").unwrap();
    session.select_answer(0, "1910").unwrap();
    session.select_answer(0, "1914").unwrap();

    assert_eq!(
        session.user_answers(),
        vec![
            UserAnswer { question_index: 0, selected_answer: "1914".to_string() },
            UserAnswer { question_index: 2, selected_answer: "P versus NP".to_string() },
        ]
    );
}

#[test]
fn reset_requires_take_mode() {
    let quiz = sample_quiz(TURING);
    let mut session = QuizSession::new(&quiz);
    assert_eq!(session.reset(), Err(SessionError::NotTaking));
}
