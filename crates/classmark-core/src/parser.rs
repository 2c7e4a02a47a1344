//! TOML test definition parser.
//!
//! Loads tests from TOML files and directories, and lints them for
//! authoring issues that are legal but probably unintended.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Deserialize;

use crate::model::{Question, QuestionKind, Test, TestStatus};

/// Intermediate TOML structure for parsing test files.
#[derive(Debug, Deserialize)]
struct TomlTestFile {
    test: TomlTestHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlTestHeader {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    subject: String,
    #[serde(default)]
    instructions: String,
    #[serde(default = "default_time_limit")]
    time_limit_seconds: u64,
    #[serde(default = "default_status_str")]
    status: String,
}

fn default_time_limit() -> u64 {
    600
}

fn default_status_str() -> String {
    "active".to_string()
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    prompt: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default = "default_points")]
    points: u32,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    correct_index: Option<usize>,
    #[serde(default)]
    correct_value: Option<bool>,
    #[serde(default)]
    sample_text: Option<String>,
}

fn default_points() -> u32 {
    1
}

/// Parse a single TOML file into a `Test`.
pub fn parse_test_file(path: &Path) -> Result<Test> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read test file: {}", path.display()))?;

    parse_test_str(&content, path)
}

/// Parse a TOML string into a `Test` (useful for testing).
pub fn parse_test_str(content: &str, source_path: &Path) -> Result<Test> {
    let parsed: TomlTestFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let status: TestStatus = parsed
        .test
        .status
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{}", e))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let kind = match q.kind.as_str() {
                "multiple-choice" => QuestionKind::MultipleChoice {
                    options: q.options,
                    correct_index: q.correct_index.with_context(|| {
                        format!("question '{}': multiple-choice requires correct_index", q.id)
                    })?,
                },
                "true-false" => QuestionKind::TrueFalse {
                    correct_value: q.correct_value.with_context(|| {
                        format!("question '{}': true-false requires correct_value", q.id)
                    })?,
                },
                "short-answer" => QuestionKind::ShortAnswer {
                    sample_text: q.sample_text.with_context(|| {
                        format!("question '{}': short-answer requires sample_text", q.id)
                    })?,
                },
                other => anyhow::bail!("question '{}': unknown question type '{}'", q.id, other),
            };

            Ok(Question {
                id: q.id,
                prompt: q.prompt,
                points: q.points,
                kind,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let test = Test {
        id: parsed.test.id,
        title: parsed.test.title,
        description: parsed.test.description,
        subject: parsed.test.subject,
        instructions: parsed.test.instructions,
        time_limit_seconds: parsed.test.time_limit_seconds,
        status,
        created_at: Utc::now(),
        questions,
    };

    test.check_integrity()
        .with_context(|| format!("invalid test definition: {}", source_path.display()))?;

    Ok(test)
}

/// Recursively load all `.toml` test files from a directory.
///
/// Files that fail to parse are logged and skipped so one broken file
/// does not hide the rest of the bank.
pub fn load_test_directory(dir: &Path) -> Result<Vec<Test>> {
    let mut tests = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            tests.extend(load_test_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_test_file(&path) {
                Ok(test) => tests.push(test),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(tests)
}

/// A warning from test linting.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Lint a test for authoring issues that parsing allows.
pub fn lint_test(test: &Test) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if test.questions.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "test has no questions".into(),
        });
    }

    if test.instructions.trim().is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "instructions are empty".into(),
        });
    }

    for question in &test.questions {
        if question.prompt.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: "prompt is empty".into(),
            });
        }

        if question.points == 0 {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: "points is 0".into(),
            });
        }

        match &question.kind {
            QuestionKind::MultipleChoice { options, .. } => {
                if options.len() < 3 {
                    warnings.push(ValidationWarning {
                        question_id: Some(question.id.clone()),
                        message: format!(
                            "multiple-choice question has only {} options (3 or more recommended)",
                            options.len()
                        ),
                    });
                }
            }
            QuestionKind::ShortAnswer { sample_text } => {
                if sample_text.trim().is_empty() {
                    warnings.push(ValidationWarning {
                        question_id: Some(question.id.clone()),
                        message: "sample_text is empty, so no answer can be correct".into(),
                    });
                }
            }
            QuestionKind::TrueFalse { .. } => {}
        }
    }

    warnings
}
