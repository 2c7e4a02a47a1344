//! Scripted answer files.
//!
//! A script holds one student's answers as TOML so an attempt can run
//! unattended. The script becomes a `ScriptedSource` that feeds the
//! driver the same events an interactive student would produce.

use std::collections::{HashMap, VecDeque};
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use classmark_core::model::{Answer, Test};
use classmark_core::results::StudentIdentity;

use crate::driver::{AnswerSource, SessionEvent};

/// Intermediate TOML structure for parsing scripts.
#[derive(Debug, Deserialize)]
struct TomlScript {
    student: TomlStudent,
    #[serde(default)]
    answers: HashMap<String, Answer>,
    #[serde(default = "default_submit")]
    submit: bool,
}

#[derive(Debug, Deserialize)]
struct TomlStudent {
    name: String,
    #[serde(rename = "class")]
    class_name: String,
}

fn default_submit() -> bool {
    true
}

/// One student's scripted answers for a test.
#[derive(Debug, Clone)]
pub struct AnswerScript {
    pub student: StudentIdentity,
    /// Answers keyed by question id. TOML values map by type: integers
    /// are choice indices, booleans true/false answers, strings short
    /// answers.
    pub answers: HashMap<String, Answer>,
    /// Whether to submit at the end. `false` abandons the attempt.
    pub submit: bool,
}

/// Parse a script file.
pub fn parse_script_file(path: &Path) -> Result<AnswerScript> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answer script: {}", path.display()))?;

    parse_script_str(&content, path)
}

/// Parse a TOML string into an `AnswerScript` (useful for testing).
pub fn parse_script_str(content: &str, source_path: &Path) -> Result<AnswerScript> {
    let parsed: TomlScript = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    Ok(AnswerScript {
        student: StudentIdentity {
            name: parsed.student.name,
            class_name: parsed.student.class_name,
        },
        answers: parsed.answers,
        submit: parsed.submit,
    })
}

/// Feeds a fixed list of events to the driver.
pub struct ScriptedSource {
    events: VecDeque<SessionEvent>,
}

impl ScriptedSource {
    pub fn new(events: Vec<SessionEvent>) -> Self {
        ScriptedSource {
            events: events.into(),
        }
    }

    /// Build the event stream for a script against a test.
    ///
    /// Questions are visited in the test's order; script entries that
    /// name no question in the test are logged and skipped. The stream
    /// ends with a submit, or an abandon if the script opts out.
    pub fn for_test(script: &AnswerScript, test: &Test) -> Self {
        let mut events = VecDeque::new();
        for (index, question) in test.questions.iter().enumerate() {
            if let Some(answer) = script.answers.get(&question.id) {
                events.push_back(SessionEvent::GoTo(index));
                events.push_back(SessionEvent::Select {
                    question_id: question.id.clone(),
                    answer: answer.clone(),
                });
            }
        }

        for id in script.answers.keys() {
            if test.question(id).is_none() {
                tracing::warn!("script answers unknown question '{}'", id);
            }
        }

        events.push_back(if script.submit {
            SessionEvent::Submit
        } else {
            SessionEvent::Abandon
        });

        ScriptedSource { events }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[async_trait]
impl AnswerSource for ScriptedSource {
    async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use chrono::Utc;
    use classmark_core::model::{Question, QuestionKind, TestStatus};

    const VALID_SCRIPT: &str = r#"
[student]
name = "Ada Lovelace"
class = "10B"

[answers]
q1 = 1
q2 = true
q3 = "x = 7"
"#;

    fn sample_test() -> Test {
        Test {
            id: "t1".into(),
            title: "Sample".into(),
            description: String::new(),
            subject: String::new(),
            instructions: String::new(),
            time_limit_seconds: 600,
            status: TestStatus::Active,
            created_at: Utc::now(),
            questions: vec![
                Question {
                    id: "q1".into(),
                    prompt: "Pick".into(),
                    points: 1,
                    kind: QuestionKind::MultipleChoice {
                        options: vec!["a".into(), "b".into(), "c".into()],
                        correct_index: 1,
                    },
                },
                Question {
                    id: "q2".into(),
                    prompt: "True?".into(),
                    points: 1,
                    kind: QuestionKind::TrueFalse {
                        correct_value: true,
                    },
                },
                Question {
                    id: "q3".into(),
                    prompt: "Solve".into(),
                    points: 1,
                    kind: QuestionKind::ShortAnswer {
                        sample_text: "x = 7".into(),
                    },
                },
            ],
        }
    }

    #[test]
    fn parse_valid_script() {
        let script = parse_script_str(VALID_SCRIPT, &PathBuf::from("script.toml")).unwrap();
        assert_eq!(script.student.name, "Ada Lovelace");
        assert_eq!(script.student.class_name, "10B");
        assert_eq!(script.answers.len(), 3);
        assert_eq!(script.answers.get("q1"), Some(&Answer::Choice(1)));
        assert_eq!(script.answers.get("q2"), Some(&Answer::Bool(true)));
        assert_eq!(script.answers.get("q3"), Some(&Answer::Text("x = 7".into())));
        assert!(script.submit);
    }

    #[test]
    fn parse_respects_submit_flag() {
        // top-level keys must precede the tables in TOML
        let toml = r#"
submit = false

[student]
name = "Ada"
class = "10B"
"#;
        let script = parse_script_str(toml, &PathBuf::from("script.toml")).unwrap();
        assert!(!script.submit);
        assert!(script.answers.is_empty());
    }

    #[test]
    fn parse_requires_a_student() {
        let toml = r#"
[answers]
q1 = 0
"#;
        assert!(parse_script_str(toml, &PathBuf::from("script.toml")).is_err());
    }

    #[test]
    fn parse_script_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ada.toml");
        std::fs::write(&path, VALID_SCRIPT).unwrap();

        let script = parse_script_file(&path).unwrap();
        assert_eq!(script.student.name, "Ada Lovelace");

        assert!(parse_script_file(&dir.path().join("missing.toml")).is_err());
    }

    #[tokio::test]
    async fn events_follow_test_order_and_end_with_submit() {
        let script = parse_script_str(VALID_SCRIPT, &PathBuf::from("script.toml")).unwrap();
        let mut source = ScriptedSource::for_test(&script, &sample_test());

        let mut events = Vec::new();
        while let Some(event) = source.next_event().await {
            events.push(event);
        }

        assert_eq!(events.len(), 7);
        assert_eq!(events[0], SessionEvent::GoTo(0));
        assert!(matches!(
            &events[1],
            SessionEvent::Select { question_id, .. } if question_id == "q1"
        ));
        assert_eq!(events[2], SessionEvent::GoTo(1));
        assert_eq!(events[4], SessionEvent::GoTo(2));
        assert_eq!(events[6], SessionEvent::Submit);
    }

    #[tokio::test]
    async fn unknown_script_entries_are_skipped() {
        let mut script = parse_script_str(VALID_SCRIPT, &PathBuf::from("script.toml")).unwrap();
        script.answers.insert("zz".into(), Answer::Choice(0));
        let mut source = ScriptedSource::for_test(&script, &sample_test());

        while let Some(event) = source.next_event().await {
            if let SessionEvent::Select { question_id, .. } = event {
                assert_ne!(question_id, "zz");
            }
        }
    }

    #[tokio::test]
    async fn script_can_abandon_instead_of_submitting() {
        let toml = r#"
submit = false

[student]
name = "Ada"
class = "10B"

[answers]
q1 = 2
"#;
        let script = parse_script_str(toml, &PathBuf::from("script.toml")).unwrap();
        let mut source = ScriptedSource::for_test(&script, &sample_test());

        let mut last = None;
        while let Some(event) = source.next_event().await {
            last = Some(event);
        }
        assert_eq!(last, Some(SessionEvent::Abandon));
    }

    #[tokio::test]
    async fn drained_source_returns_none() {
        let mut source = ScriptedSource::new(vec![SessionEvent::Next]);
        assert_eq!(source.next_event().await, Some(SessionEvent::Next));
        assert_eq!(source.next_event().await, None);
        assert_eq!(source.next_event().await, None);
    }
}
