//! Error types for classmark-core.

use thiserror::Error;

use crate::model::TestStatus;

/// Errors raised by the session state machine.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Student name was empty after trimming.
    #[error("student name must not be empty")]
    EmptyName,

    /// Class name was empty after trimming.
    #[error("class name must not be empty")]
    EmptyClass,

    /// The test has no questions, so there is nothing to take or grade.
    #[error("test '{0}' has no questions")]
    EmptyTest(String),

    /// The test is not published for taking.
    #[error("test '{test_id}' is not active (status: {status})")]
    NotActive {
        test_id: String,
        status: TestStatus,
    },

    /// Operation requires the session to be in progress.
    #[error("session has not been started")]
    NotStarted,

    /// The session was already started once.
    #[error("session has already been started")]
    AlreadyStarted,

    /// The session was already submitted; it cannot change any more.
    #[error("session has already been submitted")]
    AlreadySubmitted,

    /// The answer names a question id the test does not contain.
    #[error("test has no question with id '{0}'")]
    UnknownQuestion(String),

    /// The answer's shape does not match its question's kind.
    #[error("answer for question '{question_id}' does not fit a {expected} question")]
    AnswerShape {
        question_id: String,
        expected: &'static str,
    },

    /// Navigation target outside the question range.
    #[error("question index {index} is out of range (test has {count} questions)")]
    QuestionOutOfRange { index: usize, count: usize },
}

/// Errors from a record store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend asked us to slow down.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// The backend rejected the request.
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}ms")]
    Timeout(u64),

    /// Transport-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// The response could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl StoreError {
    /// Whether retrying the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::RateLimited { .. } | StoreError::Timeout(_) | StoreError::Network(_) => {
                true
            }
            StoreError::ApiError { status, .. } => *status >= 500,
            StoreError::NotFound(_) | StoreError::Decode(_) => false,
        }
    }

    /// Backend-suggested wait before the next attempt, if any.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            StoreError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

/// Structural problems that make a test untakeable.
#[derive(Debug, Error)]
pub enum IntegrityError {
    #[error("test '{test_id}' has no questions")]
    NoQuestions { test_id: String },

    #[error("test '{test_id}' has a zero time limit")]
    ZeroTimeLimit { test_id: String },

    #[error("duplicate question id '{0}'")]
    DuplicateQuestionId(String),

    #[error("question '{question_id}' has no options")]
    NoOptions { question_id: String },

    #[error(
        "question '{question_id}' marks option {index} correct but only has {option_count} options"
    )]
    CorrectIndexOutOfRange {
        question_id: String,
        index: usize,
        option_count: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(StoreError::Network("connection refused".into()).is_retryable());
        assert!(StoreError::Timeout(30_000).is_retryable());
        assert!(StoreError::RateLimited {
            retry_after_ms: 1000
        }
        .is_retryable());
        assert!(StoreError::ApiError {
            status: 503,
            message: "unavailable".into()
        }
        .is_retryable());
        assert!(!StoreError::ApiError {
            status: 400,
            message: "bad request".into()
        }
        .is_retryable());
        assert!(!StoreError::NotFound("tests/nope".into()).is_retryable());
        assert!(!StoreError::Decode("truncated body".into()).is_retryable());
    }

    #[test]
    fn rate_limit_carries_delay_hint() {
        let err = StoreError::RateLimited {
            retry_after_ms: 2500,
        };
        assert_eq!(err.retry_after_ms(), Some(2500));
        assert_eq!(StoreError::Timeout(1000).retry_after_ms(), None);
    }

    #[test]
    fn session_error_messages() {
        let err = SessionError::AnswerShape {
            question_id: "q3".into(),
            expected: "true-false",
        };
        assert!(err.to_string().contains("q3"));
        assert!(err.to_string().contains("true-false"));

        let err = SessionError::QuestionOutOfRange { index: 9, count: 3 };
        assert!(err.to_string().contains('9'));
        assert!(err.to_string().contains('3'));
    }
}
