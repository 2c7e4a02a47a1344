//! The test session state machine.
//!
//! A session moves through three phases:
//!
//! ```text
//! Info --begin--> InProgress --submit--> Complete
//! ```
//!
//! `Info` collects the student's identity. `begin` validates it and seeds
//! the absolute deadline. While `InProgress`, answers can be recorded and
//! revised and the current question moved freely. `submit` grades the
//! answers, stores the outcome, and freezes the session; every mutation
//! afterwards fails and repeated submits return the stored outcome
//! unchanged.
//!
//! The session never reads a wall clock itself. Every time-sensitive
//! operation takes `now` from the caller, so tests and the interactive
//! driver control time explicitly.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::error::SessionError;
use crate::model::{Answer, Question, Test, TestStatus};
use crate::results::{SessionOutcome, StudentIdentity};
use crate::scoring;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Collecting student identity; nothing timed yet.
    Info,
    /// The attempt is live and the countdown is running.
    InProgress,
    /// Submitted and graded. Terminal.
    Complete,
}

#[derive(Debug)]
enum State {
    Info,
    InProgress { deadline: DateTime<Utc> },
    Complete { outcome: SessionOutcome },
}

/// One student's attempt at one test.
#[derive(Debug)]
pub struct TestSession {
    test: Test,
    attempt_id: Uuid,
    student: Option<StudentIdentity>,
    current_index: usize,
    answers: HashMap<String, Answer>,
    state: State,
}

impl TestSession {
    /// Create a session for a test.
    ///
    /// Rejects tests with no questions (nothing to grade) and tests that
    /// are not active.
    pub fn new(test: Test) -> Result<Self, SessionError> {
        if test.questions.is_empty() {
            return Err(SessionError::EmptyTest(test.id));
        }
        if test.status != TestStatus::Active {
            return Err(SessionError::NotActive {
                test_id: test.id,
                status: test.status,
            });
        }
        Ok(TestSession {
            test,
            attempt_id: Uuid::new_v4(),
            student: None,
            current_index: 0,
            answers: HashMap::new(),
            state: State::Info,
        })
    }

    /// Start the attempt.
    ///
    /// Both names are trimmed; if either is empty after trimming the
    /// session stays in `Info` and no deadline is seeded. On success the
    /// deadline is `now + time_limit_seconds` and the current question
    /// is the first one.
    pub fn begin(
        &mut self,
        name: &str,
        class_name: &str,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        match self.state {
            State::Info => {}
            State::InProgress { .. } => return Err(SessionError::AlreadyStarted),
            State::Complete { .. } => return Err(SessionError::AlreadySubmitted),
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyName);
        }
        let class_name = class_name.trim();
        if class_name.is_empty() {
            return Err(SessionError::EmptyClass);
        }

        self.student = Some(StudentIdentity {
            name: name.to_string(),
            class_name: class_name.to_string(),
        });
        self.current_index = 0;
        self.state = State::InProgress {
            deadline: now + Duration::seconds(self.test.time_limit_seconds as i64),
        };
        Ok(())
    }

    fn ensure_in_progress(&self) -> Result<(), SessionError> {
        match self.state {
            State::Info => Err(SessionError::NotStarted),
            State::InProgress { .. } => Ok(()),
            State::Complete { .. } => Err(SessionError::AlreadySubmitted),
        }
    }

    /// Record an answer for a question. Recording twice overwrites.
    ///
    /// The question must exist and the answer must match its kind's
    /// shape. An out-of-range choice index is recorded as given; it
    /// grades as incorrect.
    pub fn select_answer(&mut self, question_id: &str, answer: Answer) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        let question = self
            .test
            .question(question_id)
            .ok_or_else(|| SessionError::UnknownQuestion(question_id.to_string()))?;
        if !question.kind.accepts(&answer) {
            return Err(SessionError::AnswerShape {
                question_id: question_id.to_string(),
                expected: question.kind.name(),
            });
        }
        self.answers.insert(question_id.to_string(), answer);
        Ok(())
    }

    /// Record an answer for the current question.
    pub fn answer_current(&mut self, answer: Answer) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        let question_id = self.test.questions[self.current_index].id.clone();
        self.select_answer(&question_id, answer)
    }

    /// Jump to a question by index. Out-of-range indices are an error.
    pub fn go_to(&mut self, index: usize) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        if index >= self.test.questions.len() {
            return Err(SessionError::QuestionOutOfRange {
                index,
                count: self.test.questions.len(),
            });
        }
        self.current_index = index;
        Ok(())
    }

    /// Move to the next question. Stays put on the last one.
    pub fn next(&mut self) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        if self.current_index + 1 < self.test.questions.len() {
            self.current_index += 1;
        }
        Ok(())
    }

    /// Move to the previous question. Stays put on the first one.
    pub fn previous(&mut self) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        self.current_index = self.current_index.saturating_sub(1);
        Ok(())
    }

    /// Whole seconds left before the deadline, computed from `now`.
    ///
    /// Always derived from the absolute deadline, never counted down,
    /// so a stalled or resumed caller still sees the right value.
    /// Returns the full time limit before `begin` and 0 after submit.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> u64 {
        match &self.state {
            State::Info => self.test.time_limit_seconds,
            State::InProgress { deadline } => (*deadline - now).num_seconds().max(0) as u64,
            State::Complete { .. } => 0,
        }
    }

    /// Whether a live attempt has run out of time.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.state, State::InProgress { .. }) && self.remaining_seconds(now) == 0
    }

    /// Grade the current answers without changing the session.
    pub fn grade(&self, now: DateTime<Utc>) -> Result<SessionOutcome, SessionError> {
        let Some(student) = &self.student else {
            return Err(SessionError::NotStarted);
        };
        let sheet = scoring::grade(&self.test, &self.answers)?;
        Ok(SessionOutcome {
            attempt_id: self.attempt_id,
            test_id: self.test.id.clone(),
            student: student.clone(),
            score: sheet.score,
            correct_count: sheet.correct_count,
            total_count: sheet.total_count,
            submitted_at: now,
            marks: sheet.marks,
        })
    }

    /// Submit the attempt: grade it and move to `Complete`.
    ///
    /// Idempotent: submitting a completed session returns the stored
    /// outcome without re-grading, so the timestamp and marks never
    /// change. Timeout-driven submission calls this exact method.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<SessionOutcome, SessionError> {
        match &self.state {
            State::Info => Err(SessionError::NotStarted),
            State::Complete { outcome } => Ok(outcome.clone()),
            State::InProgress { .. } => {
                let outcome = self.grade(now)?;
                self.state = State::Complete {
                    outcome: outcome.clone(),
                };
                Ok(outcome)
            }
        }
    }

    pub fn test(&self) -> &Test {
        &self.test
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            State::Info => Phase::Info,
            State::InProgress { .. } => Phase::InProgress,
            State::Complete { .. } => Phase::Complete,
        }
    }

    pub fn student(&self) -> Option<&StudentIdentity> {
        self.student.as_ref()
    }

    /// Index of the question currently shown.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The question currently shown. Valid in every phase because
    /// sessions are never created for empty tests.
    pub fn current_question(&self) -> &Question {
        &self.test.questions[self.current_index]
    }

    /// All recorded answers, keyed by question id.
    pub fn answers(&self) -> &HashMap<String, Answer> {
        &self.answers
    }

    /// How many questions have a recorded answer.
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// The stored outcome, present once the session is complete.
    pub fn outcome(&self) -> Option<&SessionOutcome> {
        match &self.state {
            State::Complete { outcome } => Some(outcome),
            _ => None,
        }
    }
}
