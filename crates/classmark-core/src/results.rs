//! Outcome types produced when a session is submitted, plus the wire
//! record published to the record store.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scoring::QuestionMark;

/// Who is taking the test. Both fields are stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentIdentity {
    pub name: String,
    pub class_name: String,
}

/// The immutable result of one completed attempt.
///
/// Produced exactly once per session, at submission. The attempt id is
/// assigned when the session is created, so retried submissions carry
/// the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOutcome {
    pub attempt_id: Uuid,
    pub test_id: String,
    pub student: StudentIdentity,
    /// Percent score in 0..=100.
    pub score: u8,
    pub correct_count: u32,
    pub total_count: u32,
    pub submitted_at: DateTime<Utc>,
    /// Per-question breakdown.
    pub marks: Vec<QuestionMark>,
}

impl SessionOutcome {
    /// Save the outcome as pretty-printed JSON, creating parent
    /// directories as needed.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("failed to serialize outcome")?;
        fs::write(path, json)
            .with_context(|| format!("failed to write outcome to {}", path.display()))?;
        Ok(())
    }

    /// Load an outcome from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read outcome from {}", path.display()))?;
        let outcome: SessionOutcome = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse outcome JSON from {}", path.display()))?;
        Ok(outcome)
    }
}

/// The record published to the record store's `testResults` collection.
///
/// `id` is assigned by the store; it is absent on records we send and
/// present on records we read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub test_id: String,
    pub student_name: String,
    pub class_name: String,
    pub score: u8,
    pub correct_count: u32,
    pub total_count: u32,
    pub submitted_at: DateTime<Utc>,
}

impl ResultRecord {
    pub fn from_outcome(outcome: &SessionOutcome) -> Self {
        ResultRecord {
            id: None,
            test_id: outcome.test_id.clone(),
            student_name: outcome.student.name.clone(),
            class_name: outcome.student.class_name.clone(),
            score: outcome.score,
            correct_count: outcome.correct_count,
            total_count: outcome.total_count,
            submitted_at: outcome.submitted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_outcome() -> SessionOutcome {
        SessionOutcome {
            attempt_id: Uuid::new_v4(),
            test_id: "t1".into(),
            student: StudentIdentity {
                name: "Ada".into(),
                class_name: "10B".into(),
            },
            score: 67,
            correct_count: 2,
            total_count: 3,
            submitted_at: Utc::now(),
            marks: vec![QuestionMark {
                question_id: "q1".into(),
                answered: true,
                correct: true,
                points_possible: 1,
                points_earned: 1,
            }],
        }
    }

    #[test]
    fn record_wire_format_is_camel_case() {
        let record = ResultRecord::from_outcome(&sample_outcome());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["testId"], "t1");
        assert_eq!(json["studentName"], "Ada");
        assert_eq!(json["className"], "10B");
        assert_eq!(json["score"], 67);
        assert_eq!(json["correctCount"], 2);
        assert_eq!(json["totalCount"], 3);
        assert!(json.get("id").is_none());
    }

    #[test]
    fn record_parses_store_assigned_id() {
        let json = r#"{
            "id": "r42",
            "testId": "t1",
            "studentName": "Ada",
            "className": "10B",
            "score": 100,
            "correctCount": 3,
            "totalCount": 3,
            "submittedAt": "2025-03-01T10:00:00Z"
        }"#;
        let record: ResultRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id.as_deref(), Some("r42"));
        assert_eq!(record.score, 100);
    }

    #[test]
    fn outcome_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("outcome.json");
        let outcome = sample_outcome();
        outcome.save_json(&path).unwrap();
        let loaded = SessionOutcome::load_json(&path).unwrap();
        assert_eq!(loaded, outcome);
    }
}
