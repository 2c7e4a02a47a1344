//! Async session driver.
//!
//! Runs one live attempt: student events are applied to the session
//! while the countdown runs beside them, and whichever finishes first
//! (a submit event or the deadline) ends the attempt through the
//! proctor. All timers are locals of `run`, so they are released on
//! every exit path.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::{Instant, MissedTickBehavior};

use classmark_core::error::SessionError;
use classmark_core::model::Answer;
use classmark_core::results::SessionOutcome;
use classmark_core::session::{Phase, TestSession};

use crate::proctor::{Proctor, SubmitError};

/// One student action during an attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Record an answer for a question.
    Select { question_id: String, answer: Answer },
    /// Move to the next question.
    Next,
    /// Move to the previous question.
    Previous,
    /// Jump to a question by index.
    GoTo(usize),
    /// Submit the attempt.
    Submit,
    /// Walk away without submitting.
    Abandon,
}

/// Produces session events, one at a time.
///
/// `next_event` races the countdown inside `select!`, so a pending call
/// is dropped when the deadline fires first. Implementations must
/// tolerate that cancellation.
#[async_trait]
pub trait AnswerSource: Send {
    /// The next event, or `None` when the source has nothing left.
    async fn next_event(&mut self) -> Option<SessionEvent>;
}

/// Receives progress callbacks while an attempt runs.
pub trait SessionObserver: Send {
    fn on_tick(&mut self, _remaining_seconds: u64) {}
    fn on_answer(&mut self, _question_id: &str, _answered: usize, _total: usize) {}
    fn on_navigate(&mut self, _index: usize) {}
    fn on_complete(&mut self, _outcome: &SessionOutcome, _timed_out: bool) {}
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

/// How a driven attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DriveOutcome {
    /// The student submitted.
    Submitted(SessionOutcome),
    /// The countdown expired and the attempt was submitted as-is.
    TimedOut(SessionOutcome),
    /// The source ended without a submit. The session stays in progress.
    Abandoned,
}

#[derive(Debug, Error)]
pub enum DriveError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// Drives sessions from an event source against the countdown.
pub struct SessionDriver {
    proctor: Proctor,
}

impl SessionDriver {
    pub fn new(proctor: Proctor) -> Self {
        SessionDriver { proctor }
    }

    pub fn proctor(&self) -> &Proctor {
        &self.proctor
    }

    /// Run a started session to its end.
    ///
    /// Returns when the source submits or runs dry, or when the
    /// countdown expires, whichever comes first. Expiry submits
    /// whatever answers are recorded, exactly like a manual submit.
    pub async fn run(
        &self,
        session: &mut TestSession,
        source: &mut dyn AnswerSource,
        observer: &mut dyn SessionObserver,
    ) -> Result<DriveOutcome, DriveError> {
        match session.phase() {
            Phase::Info => return Err(SessionError::NotStarted.into()),
            Phase::Complete => return Err(SessionError::AlreadySubmitted.into()),
            Phase::InProgress => {}
        }

        let remaining = session.remaining_seconds(self.proctor.clock().now());
        let deadline = Instant::now() + Duration::from_secs(remaining);
        let timeout = tokio::time::sleep_until(deadline);
        tokio::pin!(timeout);
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = &mut timeout => {
                    let outcome = self.proctor.submit(session).await?;
                    tracing::info!("time expired; attempt {} submitted", outcome.attempt_id);
                    observer.on_complete(&outcome, true);
                    return Ok(DriveOutcome::TimedOut(outcome));
                }

                event = source.next_event() => match event {
                    None | Some(SessionEvent::Abandon) => {
                        tracing::info!("attempt abandoned without submitting");
                        return Ok(DriveOutcome::Abandoned);
                    }
                    Some(SessionEvent::Submit) => {
                        let outcome = self.proctor.submit(session).await?;
                        observer.on_complete(&outcome, false);
                        return Ok(DriveOutcome::Submitted(outcome));
                    }
                    Some(SessionEvent::Select { question_id, answer }) => {
                        session.select_answer(&question_id, answer)?;
                        observer.on_answer(
                            &question_id,
                            session.answered_count(),
                            session.test().question_count(),
                        );
                    }
                    Some(SessionEvent::Next) => {
                        session.next()?;
                        observer.on_navigate(session.current_index());
                    }
                    Some(SessionEvent::Previous) => {
                        session.previous()?;
                        observer.on_navigate(session.current_index());
                    }
                    Some(SessionEvent::GoTo(index)) => {
                        session.go_to(index)?;
                        observer.on_navigate(session.current_index());
                    }
                },

                _ = ticker.tick() => {
                    let left = deadline.saturating_duration_since(Instant::now()).as_secs();
                    observer.on_tick(left);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Utc;

    use classmark_core::model::{Question, QuestionKind, Test, TestStatus};
    use classmark_store::memory::InMemoryStore;

    use crate::script::ScriptedSource;

    fn sample_test(time_limit_seconds: u64) -> Test {
        Test {
            id: "t1".into(),
            title: "Arithmetic".into(),
            description: String::new(),
            subject: String::new(),
            instructions: String::new(),
            time_limit_seconds,
            status: TestStatus::Active,
            created_at: Utc::now(),
            questions: vec![
                Question {
                    id: "q1".into(),
                    prompt: "2 + 2?".into(),
                    points: 1,
                    kind: QuestionKind::MultipleChoice {
                        options: vec!["3".into(), "4".into(), "5".into()],
                        correct_index: 1,
                    },
                },
                Question {
                    id: "q2".into(),
                    prompt: "7 is prime.".into(),
                    points: 1,
                    kind: QuestionKind::TrueFalse {
                        correct_value: true,
                    },
                },
            ],
        }
    }

    fn started(test: Test) -> TestSession {
        let mut session = TestSession::new(test).unwrap();
        session.begin("Ada", "10B", Utc::now()).unwrap();
        session
    }

    #[derive(Default)]
    struct Recording {
        ticks: Vec<u64>,
        answers: Vec<(String, usize)>,
        navigations: Vec<usize>,
        completed: Option<bool>,
    }

    impl SessionObserver for Recording {
        fn on_tick(&mut self, remaining_seconds: u64) {
            self.ticks.push(remaining_seconds);
        }

        fn on_answer(&mut self, question_id: &str, answered: usize, _total: usize) {
            self.answers.push((question_id.to_string(), answered));
        }

        fn on_navigate(&mut self, index: usize) {
            self.navigations.push(index);
        }

        fn on_complete(&mut self, _outcome: &SessionOutcome, timed_out: bool) {
            self.completed = Some(timed_out);
        }
    }

    struct PendingSource;

    #[async_trait]
    impl AnswerSource for PendingSource {
        async fn next_event(&mut self) -> Option<SessionEvent> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn scripted_events_drive_the_session() {
        let store = Arc::new(InMemoryStore::new());
        let driver = SessionDriver::new(Proctor::new(store.clone()));
        let mut session = started(sample_test(600));
        let mut source = ScriptedSource::new(vec![
            SessionEvent::Select {
                question_id: "q1".into(),
                answer: Answer::Choice(1),
            },
            SessionEvent::GoTo(1),
            SessionEvent::Select {
                question_id: "q2".into(),
                answer: Answer::Bool(true),
            },
            SessionEvent::Submit,
        ]);
        let mut observer = Recording::default();

        let outcome = driver
            .run(&mut session, &mut source, &mut observer)
            .await
            .unwrap();

        let DriveOutcome::Submitted(outcome) = outcome else {
            panic!("expected a submitted outcome");
        };
        assert_eq!(outcome.score, 100);
        assert_eq!(outcome.correct_count, 2);
        assert_eq!(session.phase(), Phase::Complete);
        assert_eq!(observer.completed, Some(false));
        assert_eq!(observer.navigations, vec![1]);
        assert_eq!(
            observer.answers,
            vec![("q1".to_string(), 1), ("q2".to_string(), 2)]
        );
        assert_eq!(store.submit_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_expiry_submits_what_is_there() {
        let store = Arc::new(InMemoryStore::new());
        let driver = SessionDriver::new(Proctor::new(store.clone()));
        let mut session = started(sample_test(5));
        session.select_answer("q1", Answer::Choice(1)).unwrap();
        let mut source = PendingSource;
        let mut observer = Recording::default();

        let outcome = driver
            .run(&mut session, &mut source, &mut observer)
            .await
            .unwrap();

        let DriveOutcome::TimedOut(outcome) = outcome else {
            panic!("expected a timed out outcome");
        };
        assert_eq!(outcome.correct_count, 1);
        assert_eq!(session.phase(), Phase::Complete);
        assert_eq!(observer.completed, Some(true));
        assert_eq!(observer.ticks, vec![5, 4, 3, 2, 1]);
        assert_eq!(store.submit_calls(), 1);
    }

    #[tokio::test]
    async fn exhausted_source_abandons_without_submitting() {
        let store = Arc::new(InMemoryStore::new());
        let driver = SessionDriver::new(Proctor::new(store.clone()));
        let mut session = started(sample_test(600));
        let mut source = ScriptedSource::new(vec![
            SessionEvent::Select {
                question_id: "q1".into(),
                answer: Answer::Choice(0),
            },
            SessionEvent::Abandon,
        ]);
        let mut observer = Recording::default();

        let outcome = driver
            .run(&mut session, &mut source, &mut observer)
            .await
            .unwrap();

        assert_eq!(outcome, DriveOutcome::Abandoned);
        assert_eq!(session.phase(), Phase::InProgress);
        assert_eq!(session.answered_count(), 1);
        assert_eq!(store.submit_calls(), 0);
        assert!(observer.completed.is_none());
    }

    #[tokio::test]
    async fn bad_event_surfaces_the_session_error() {
        let store = Arc::new(InMemoryStore::new());
        let driver = SessionDriver::new(Proctor::new(store.clone()));
        let mut session = started(sample_test(600));
        let mut source = ScriptedSource::new(vec![SessionEvent::Select {
            question_id: "q99".into(),
            answer: Answer::Choice(0),
        }]);

        let err = driver
            .run(&mut session, &mut source, &mut NoopObserver)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DriveError::Session(SessionError::UnknownQuestion(_))
        ));
        assert_eq!(session.phase(), Phase::InProgress);
        assert_eq!(store.submit_calls(), 0);
    }

    #[tokio::test]
    async fn run_requires_a_started_session() {
        let store = Arc::new(InMemoryStore::new());
        let driver = SessionDriver::new(Proctor::new(store));
        let mut session = TestSession::new(sample_test(600)).unwrap();
        let mut source = ScriptedSource::new(vec![SessionEvent::Submit]);

        let err = driver
            .run(&mut session, &mut source, &mut NoopObserver)
            .await
            .unwrap_err();
        assert!(matches!(err, DriveError::Session(SessionError::NotStarted)));
    }

    #[tokio::test]
    async fn run_rejects_a_completed_session() {
        let store = Arc::new(InMemoryStore::new());
        let driver = SessionDriver::new(Proctor::new(store));
        let mut session = started(sample_test(600));
        session.submit(Utc::now()).unwrap();
        let mut source = ScriptedSource::new(vec![SessionEvent::Submit]);

        let err = driver
            .run(&mut session, &mut source, &mut NoopObserver)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DriveError::Session(SessionError::AlreadySubmitted)
        ));
    }
}
