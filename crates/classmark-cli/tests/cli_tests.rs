//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn classmark() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("classmark").unwrap()
}

const SCRIPT_ALL_CORRECT: &str = r#"[student]
name = "Alice"
class = "7B"

[answers]
q1 = 1
q2 = true
q3 = "5"
q4 = 1
q5 = true
"#;

#[test]
fn validate_example_bank() {
    classmark()
        .arg("validate")
        .arg("--test")
        .arg("../../question-banks/algebra.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("5 questions"))
        .stdout(predicate::str::contains("All test definitions valid"));
}

#[test]
fn validate_directory() {
    classmark()
        .arg("validate")
        .arg("--test")
        .arg("../../question-banks")
        .assert()
        .success()
        .stdout(predicate::str::contains("Algebra Basics"))
        .stdout(predicate::str::contains("General Science"));
}

#[test]
fn validate_nonexistent_file() {
    classmark()
        .arg("validate")
        .arg("--test")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    classmark()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created classmark.toml"))
        .stdout(predicate::str::contains("Created question-banks/algebra.toml"));

    assert!(dir.path().join("classmark.toml").exists());
    assert!(dir.path().join("question-banks/algebra.toml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    // First init
    classmark()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    // Second init should skip
    classmark()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn take_needs_a_test_source() {
    classmark()
        .arg("take")
        .assert()
        .failure()
        .stderr(predicate::str::contains("provide --test"));
}

#[test]
fn take_offline_scripted_attempt() {
    let dir = TempDir::new().unwrap();

    // The example bank from init doubles as the fixture here.
    classmark()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();
    std::fs::write(dir.path().join("script.toml"), SCRIPT_ALL_CORRECT).unwrap();

    classmark()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .arg("take")
        .arg("--test")
        .arg("question-banks/algebra.toml")
        .arg("--answers")
        .arg("script.toml")
        .arg("--offline")
        .arg("--output")
        .arg("results")
        .assert()
        .success()
        .stdout(predicate::str::contains("Alice: 100% (5 of 5 correct)"))
        .stderr(predicate::str::contains("Attempt saved to"));

    // The attempt JSON lands in the output directory.
    let saved: Vec<_> = std::fs::read_dir(dir.path().join("results"))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name()
                .to_string_lossy()
                .starts_with("attempt-algebra-basics")
        })
        .collect();
    assert_eq!(saved.len(), 1);

    // The device snapshot remembers the sign-in and the result.
    let device_path = dir.path().join(".config/classmark/device.json");
    assert!(device_path.exists());
    let snapshot = std::fs::read_to_string(device_path).unwrap();
    assert!(snapshot.contains("\"signedIn\": true"));
    assert!(snapshot.contains("Alice"));
}

#[test]
fn take_offline_requires_a_local_file() {
    classmark()
        .arg("take")
        .arg("--id")
        .arg("algebra-basics")
        .arg("--offline")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--offline needs a local --test file"));
}

#[test]
fn export_needs_a_source() {
    classmark()
        .arg("export")
        .assert()
        .failure()
        .stderr(predicate::str::contains("provide --id"));
}

#[test]
fn export_records_from_a_file() {
    let dir = TempDir::new().unwrap();

    let records = r#"[{
        "id": "r1",
        "testId": "algebra-basics",
        "studentName": "Alice",
        "className": "7B",
        "score": 80,
        "correctCount": 4,
        "totalCount": 5,
        "submittedAt": "2024-05-10T09:30:00Z"
    }]"#;
    std::fs::write(dir.path().join("records.json"), records).unwrap();

    classmark()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .arg("export")
        .arg("--input")
        .arg("records.json")
        .arg("--format")
        .arg("all")
        .arg("--output")
        .arg("exports")
        .assert()
        .success()
        .stdout(predicate::str::contains("CSV export:"))
        .stdout(predicate::str::contains("HTML report:"));

    let names: Vec<String> = std::fs::read_dir(dir.path().join("exports"))
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert!(names.iter().any(|n| n.ends_with(".csv")));
    assert!(names.iter().any(|n| n.ends_with(".html")));
}

#[test]
fn export_rejects_unknown_formats() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("records.json"), "[]").unwrap();

    classmark()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .arg("export")
        .arg("--input")
        .arg("records.json")
        .arg("--format")
        .arg("pdf")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn help_output() {
    classmark()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Classroom test-taking from the terminal",
        ));
}

#[test]
fn version_output() {
    classmark()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("classmark"));
}
