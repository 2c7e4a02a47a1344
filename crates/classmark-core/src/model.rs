//! Core data model types for classmark.
//!
//! These are the fundamental types that the entire classmark system uses
//! to represent tests, questions, and recorded answers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::IntegrityError;

/// A single test question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within the test.
    pub id: String,
    /// The question text shown to the student.
    pub prompt: String,
    /// Weight used in per-question marks. The percent score counts
    /// questions, not points.
    #[serde(default = "default_points")]
    pub points: u32,
    /// Type-specific payload, tagged by `"type"` on the wire.
    #[serde(flatten)]
    pub kind: QuestionKind,
}

fn default_points() -> u32 {
    1
}

/// The closed set of question types and their answer keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QuestionKind {
    /// Pick one option by index.
    #[serde(rename_all = "camelCase")]
    MultipleChoice {
        options: Vec<String>,
        correct_index: usize,
    },
    /// True or false.
    #[serde(rename_all = "camelCase")]
    TrueFalse { correct_value: bool },
    /// Free text, compared verbatim against the sample.
    #[serde(rename_all = "camelCase")]
    ShortAnswer { sample_text: String },
}

impl QuestionKind {
    /// Wire name of this kind ("multiple-choice", "true-false", "short-answer").
    pub fn name(&self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice { .. } => "multiple-choice",
            QuestionKind::TrueFalse { .. } => "true-false",
            QuestionKind::ShortAnswer { .. } => "short-answer",
        }
    }

    /// Whether an answer has the right shape for this kind.
    ///
    /// Shape only: an out-of-range choice index is accepted here and
    /// simply never grades as correct.
    pub fn accepts(&self, answer: &Answer) -> bool {
        matches!(
            (self, answer),
            (QuestionKind::MultipleChoice { .. }, Answer::Choice(_))
                | (QuestionKind::TrueFalse { .. }, Answer::Bool(_))
                | (QuestionKind::ShortAnswer { .. }, Answer::Text(_))
        )
    }
}

/// A student's recorded answer, shaped to match its question kind.
///
/// Serialized untagged: a bare number, boolean, or string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    /// Selected option index for a multiple-choice question.
    Choice(usize),
    /// Response to a true/false question.
    Bool(bool),
    /// Free-text response to a short-answer question.
    Text(String),
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Choice(i) => write!(f, "{i}"),
            Answer::Bool(b) => write!(f, "{b}"),
            Answer::Text(t) => write!(f, "{t}"),
        }
    }
}

/// Publication state of a test. Only active tests can be taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Active,
    Inactive,
    Draft,
}

impl Default for TestStatus {
    fn default() -> Self {
        TestStatus::Active
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Active => write!(f, "active"),
            TestStatus::Inactive => write!(f, "inactive"),
            TestStatus::Draft => write!(f, "draft"),
        }
    }
}

impl FromStr for TestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(TestStatus::Active),
            "inactive" => Ok(TestStatus::Inactive),
            "draft" => Ok(TestStatus::Draft),
            other => Err(format!("unknown test status: {other}")),
        }
    }
}

/// A test: an ordered sequence of questions plus metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Test {
    /// Unique identifier for this test.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Description shown before the test starts.
    #[serde(default)]
    pub description: String,
    /// Subject area (e.g. "Mathematics").
    #[serde(default)]
    pub subject: String,
    /// Instructions shown before the test starts.
    #[serde(default)]
    pub instructions: String,
    /// Countdown length for one attempt.
    pub time_limit_seconds: u64,
    /// Publication state.
    #[serde(default)]
    pub status: TestStatus,
    /// When the test was created.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// The questions, in presentation order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Test {
    /// Look up a question by id.
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Number of questions.
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Reject tests that cannot be taken or graded coherently.
    ///
    /// Checks: at least one question, unique question ids, a nonzero time
    /// limit, and every multiple-choice answer key within its options.
    pub fn check_integrity(&self) -> Result<(), IntegrityError> {
        if self.questions.is_empty() {
            return Err(IntegrityError::NoQuestions {
                test_id: self.id.clone(),
            });
        }
        if self.time_limit_seconds == 0 {
            return Err(IntegrityError::ZeroTimeLimit {
                test_id: self.id.clone(),
            });
        }

        let mut seen_ids = std::collections::HashSet::new();
        for question in &self.questions {
            if !seen_ids.insert(question.id.as_str()) {
                return Err(IntegrityError::DuplicateQuestionId(question.id.clone()));
            }
            if let QuestionKind::MultipleChoice {
                options,
                correct_index,
            } = &question.kind
            {
                if options.is_empty() {
                    return Err(IntegrityError::NoOptions {
                        question_id: question.id.clone(),
                    });
                }
                if *correct_index >= options.len() {
                    return Err(IntegrityError::CorrectIndexOutOfRange {
                        question_id: question.id.clone(),
                        index: *correct_index,
                        option_count: options.len(),
                    });
                }
            }
        }

        Ok(())
    }
}
