//! Grading: compare recorded answers against answer keys and compute
//! the percent score.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::model::{Answer, Question, QuestionKind, Test};

/// Whether an answer is correct for a question.
///
/// Multiple choice compares the selected index, true/false the boolean,
/// and short answers compare verbatim against the sample text, including
/// case and whitespace. A mismatched shape is simply incorrect.
pub fn is_correct(question: &Question, answer: &Answer) -> bool {
    match (&question.kind, answer) {
        (QuestionKind::MultipleChoice { correct_index, .. }, Answer::Choice(selected)) => {
            selected == correct_index
        }
        (QuestionKind::TrueFalse { correct_value }, Answer::Bool(value)) => value == correct_value,
        (QuestionKind::ShortAnswer { sample_text }, Answer::Text(text)) => text == sample_text,
        _ => false,
    }
}

/// Percent score, rounded half up to a whole number.
///
/// `percent_score(1, 8)` is 13 and `percent_score(7, 8)` is 88.
pub fn percent_score(correct: u32, total: u32) -> u8 {
    debug_assert!(total > 0, "caller must reject empty tests");
    debug_assert!(correct <= total);
    ((u64::from(correct) * 200 + u64::from(total)) / (u64::from(total) * 2)) as u8
}

/// The grade for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionMark {
    pub question_id: String,
    pub answered: bool,
    pub correct: bool,
    pub points_possible: u32,
    pub points_earned: u32,
}

/// The full grade for one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSheet {
    pub marks: Vec<QuestionMark>,
    pub correct_count: u32,
    pub total_count: u32,
    /// Percent score in 0..=100.
    pub score: u8,
}

/// Grade a set of answers against a test.
///
/// Every question gets a mark; a question with no recorded answer is
/// marked unanswered and incorrect. Grading an empty test is an error
/// because a percent score would be undefined.
pub fn grade(test: &Test, answers: &HashMap<String, Answer>) -> Result<GradeSheet, SessionError> {
    if test.questions.is_empty() {
        return Err(SessionError::EmptyTest(test.id.clone()));
    }

    let mut marks = Vec::with_capacity(test.questions.len());
    let mut correct_count = 0u32;
    for question in &test.questions {
        let answer = answers.get(&question.id);
        let correct = answer.is_some_and(|a| is_correct(question, a));
        if correct {
            correct_count += 1;
        }
        marks.push(QuestionMark {
            question_id: question.id.clone(),
            answered: answer.is_some(),
            correct,
            points_possible: question.points,
            points_earned: if correct { question.points } else { 0 },
        });
    }

    let total_count = test.questions.len() as u32;
    Ok(GradeSheet {
        marks,
        correct_count,
        total_count,
        score: percent_score(correct_count, total_count),
    })
}
