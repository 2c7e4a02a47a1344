//! The `classmark init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create classmark.toml
    if std::path::Path::new("classmark.toml").exists() {
        println!("classmark.toml already exists, skipping.");
    } else {
        std::fs::write("classmark.toml", SAMPLE_CONFIG)?;
        println!("Created classmark.toml");
    }

    // Create example test definition
    std::fs::create_dir_all("question-banks")?;
    let example_path = std::path::Path::new("question-banks/algebra.toml");
    if example_path.exists() {
        println!("question-banks/algebra.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_TEST)?;
        println!("Created question-banks/algebra.toml");
    }

    println!("\nNext steps:");
    println!("  1. Start your record server, or plan on --offline");
    println!("  2. Run: classmark validate --test question-banks/algebra.toml");
    println!("  3. Run: classmark take --test question-banks/algebra.toml --offline");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# classmark configuration

output_dir = "./classmark-results"

[store]
base_url = "http://localhost:4000"
timeout_secs = 30
max_retries = 3
retry_delay_ms = 1000

[device]
# Where the signed-in student and last result are remembered.
# Defaults to ~/.config/classmark/device.json when unset.
# path = "/path/to/device.json"
"#;

const EXAMPLE_TEST: &str = r#"[test]
id = "algebra-basics"
title = "Algebra Basics"
description = "Linear equations and simple manipulation"
subject = "Mathematics"
instructions = "Answer every question. You can move back and forth freely before submitting."
time_limit_seconds = 900

[[questions]]
id = "q1"
prompt = "What is 2x when x = 4?"
type = "multiple-choice"
options = ["6", "8", "12", "16"]
correct_index = 1

[[questions]]
id = "q2"
prompt = "x + 3 = 7 means x = 4."
type = "true-false"
correct_value = true

[[questions]]
id = "q3"
prompt = "Solve for x: 3x = 15. Answer with just the number."
type = "short-answer"
sample_text = "5"
points = 2

[[questions]]
id = "q4"
prompt = "Which expression equals 2(x + 3)?"
type = "multiple-choice"
options = ["2x + 3", "2x + 6", "x + 6"]
correct_index = 1

[[questions]]
id = "q5"
prompt = "The equation y = 2x describes a straight line."
type = "true-false"
correct_value = true
"#;
