//! Submission pipeline.
//!
//! The proctor takes a live session through grade, publish, commit:
//! it grades the answers, publishes the result record to the store
//! (retrying transient failures with exponential backoff), and only
//! then moves the session to `Complete`. A failed publish leaves the
//! session in progress so the student can try again without losing
//! answers.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use classmark_core::error::{SessionError, StoreError};
use classmark_core::results::{ResultRecord, SessionOutcome};
use classmark_core::session::{Phase, TestSession};
use classmark_core::traits::RecordStore;

use crate::clock::Clock;

/// Retry behavior for publishing results.
#[derive(Debug, Clone)]
pub struct SubmitPolicy {
    /// Extra attempts after the first one.
    pub max_retries: u32,
    /// Delay before the first retry; doubles per retry up to 30s.
    pub retry_delay: Duration,
}

impl Default for SubmitPolicy {
    fn default() -> Self {
        SubmitPolicy {
            max_retries: 3,
            retry_delay: Duration::from_millis(1000),
        }
    }
}

/// Why a submission did not complete.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The result could not be published. The session is still in
    /// progress and submitting again is safe.
    #[error("failed to publish result after {attempts} attempts: {source}")]
    Persist { attempts: u32, source: StoreError },
}

/// Grades sessions and publishes their results.
pub struct Proctor {
    store: Arc<dyn RecordStore>,
    clock: Clock,
    policy: SubmitPolicy,
}

impl Proctor {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Proctor {
            store,
            clock: Clock::default(),
            policy: SubmitPolicy::default(),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_policy(mut self, policy: SubmitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Submit a session: grade, publish, then commit.
    ///
    /// An already-completed session returns its stored outcome without
    /// touching the store, so calling this twice publishes exactly one
    /// record. Timeout-driven submission goes through this same method.
    pub async fn submit(&self, session: &mut TestSession) -> Result<SessionOutcome, SubmitError> {
        let now = self.clock.now();
        if session.phase() == Phase::Complete {
            return Ok(session.submit(now)?);
        }

        let outcome = session.grade(now)?;
        let record = ResultRecord::from_outcome(&outcome);
        let stored = self.publish(&record).await?;
        tracing::info!(
            "published result {} for test '{}' (score {})",
            stored.id.as_deref().unwrap_or("?"),
            record.test_id,
            record.score
        );

        // Same `now`, so the committed outcome matches what was published.
        Ok(session.submit(now)?)
    }

    /// Publish one record, retrying transient store errors.
    async fn publish(&self, record: &ResultRecord) -> Result<ResultRecord, SubmitError> {
        let mut last_error = None;
        let mut retry_delay = self.policy.retry_delay;
        for attempt in 0..=self.policy.max_retries {
            if attempt > 0 {
                tokio::time::sleep(retry_delay).await;
                retry_delay = (retry_delay * 2).min(Duration::from_secs(30));
            }
            match self.store.submit_result(record).await {
                Ok(stored) => return Ok(stored),
                Err(e) => {
                    if !e.is_retryable() {
                        return Err(SubmitError::Persist {
                            attempts: attempt + 1,
                            source: e,
                        });
                    }
                    if let Some(ms) = e.retry_after_ms() {
                        retry_delay = Duration::from_millis(ms);
                    }
                    tracing::warn!(
                        "publish attempt {}/{} failed: {}",
                        attempt + 1,
                        self.policy.max_retries + 1,
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(SubmitError::Persist {
            attempts: self.policy.max_retries + 1,
            source: last_error.unwrap_or_else(|| StoreError::Network("unknown error".into())),
        })
    }
}
