//! The `classmark take` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use classmark_core::error::SessionError;
use classmark_core::model::{Answer, QuestionKind, Test};
use classmark_core::results::{ResultRecord, SessionOutcome};
use classmark_core::session::TestSession;
use classmark_core::traits::RecordStore;
use classmark_session::clock::format_remaining;
use classmark_session::driver::{DriveOutcome, SessionDriver, SessionObserver};
use classmark_session::proctor::{Proctor, SubmitError, SubmitPolicy};
use classmark_session::script::{AnswerScript, ScriptedSource};
use classmark_store::config::load_config_from;
use classmark_store::device::LocalDeviceStore;
use classmark_store::http::HttpRecordStore;
use classmark_store::memory::InMemoryStore;

/// Console observer for scripted runs.
struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn on_answer(&mut self, question_id: &str, answered: usize, total: usize) {
        eprintln!("  Answered {question_id} ({answered}/{total})");
    }

    fn on_complete(&mut self, _outcome: &SessionOutcome, timed_out: bool) {
        if timed_out {
            eprintln!("  Time expired, submitting what is answered.");
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    test_path: Option<PathBuf>,
    test_id: Option<String>,
    name: Option<String>,
    class_name: Option<String>,
    answers: Option<PathBuf>,
    offline: bool,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(
        test_path.is_some() || test_id.is_some(),
        "provide --test FILE or --id TEST_ID"
    );
    if offline {
        anyhow::ensure!(test_path.is_some(), "--offline needs a local --test file");
    }

    let config = load_config_from(config_path.as_deref())?;
    let output = output.unwrap_or_else(|| config.output_dir.clone());

    let store: Arc<dyn RecordStore> = if offline {
        Arc::new(InMemoryStore::new())
    } else {
        Arc::new(HttpRecordStore::with_timeout(
            Some(config.store.base_url.clone()),
            config.store.timeout_secs,
        ))
    };

    let test = if let Some(path) = &test_path {
        classmark_core::parser::parse_test_file(path)?
    } else {
        let id = test_id.as_deref().unwrap_or_default();
        let test = store.fetch_test(id).await?;
        test.check_integrity()?;
        test
    };

    println!(
        "{} — {} questions, {} time limit",
        test.title,
        test.question_count(),
        format_remaining(test.time_limit_seconds)
    );
    if !test.instructions.is_empty() {
        println!("{}", test.instructions);
    }

    let script = match &answers {
        Some(path) => Some(classmark_session::script::parse_script_file(path)?),
        None => None,
    };

    let (student_name, student_class) = if let Some(script) = &script {
        (
            name.unwrap_or_else(|| script.student.name.clone()),
            class_name.unwrap_or_else(|| script.student.class_name.clone()),
        )
    } else {
        (
            match name {
                Some(n) => n,
                None => prompt_line("Name: ")?,
            },
            match class_name {
                Some(c) => c,
                None => prompt_line("Class: ")?,
            },
        )
    };

    let mut session = TestSession::new(test)?;
    let clock = classmark_session::clock::Clock::default();
    let mut student_name = student_name;
    let mut student_class = student_class;
    loop {
        match session.begin(&student_name, &student_class, clock.now()) {
            Ok(()) => break,
            // blank identity keeps the session unstarted, so prompt again
            Err(e @ (SessionError::EmptyName | SessionError::EmptyClass)) if script.is_none() => {
                println!("  {e}");
                if matches!(e, SessionError::EmptyName) {
                    student_name = prompt_line("Name: ")?;
                } else {
                    student_class = prompt_line("Class: ")?;
                }
            }
            Err(e) => return Err(e.into()),
        }
    }

    let device = config
        .device
        .path
        .clone()
        .or_else(LocalDeviceStore::default_path)
        .map(LocalDeviceStore::new);
    if let (Some(device), Some(student)) = (&device, session.student()) {
        if let Err(e) = device.record_sign_in(student) {
            tracing::warn!(error = %e, "could not update the device snapshot");
        }
    }

    let policy = SubmitPolicy {
        max_retries: config.store.max_retries,
        retry_delay: Duration::from_millis(config.store.retry_delay_ms),
    };
    let proctor = Proctor::new(store).with_clock(clock).with_policy(policy);

    let outcome = if let Some(script) = script {
        run_scripted(&mut session, &script, proctor).await?
    } else {
        run_interactive(&mut session, &proctor).await?
    };

    print_outcome(&outcome, session.test());

    std::fs::create_dir_all(&output)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
    let path = output.join(format!("attempt-{}-{timestamp}.json", outcome.test_id));
    outcome.save_json(&path)?;
    eprintln!("Attempt saved to: {}", path.display());

    if let Some(device) = &device {
        let record = ResultRecord::from_outcome(&outcome);
        if let Err(e) = device.record_result(&record) {
            tracing::warn!(error = %e, "could not update the device snapshot");
        }
    }

    Ok(())
}

async fn run_scripted(
    session: &mut TestSession,
    script: &AnswerScript,
    proctor: Proctor,
) -> Result<SessionOutcome> {
    let mut source = ScriptedSource::for_test(script, session.test());
    let mut observer = ConsoleObserver;
    let driver = SessionDriver::new(proctor);

    match driver.run(session, &mut source, &mut observer).await? {
        DriveOutcome::Submitted(outcome) | DriveOutcome::TimedOut(outcome) => Ok(outcome),
        DriveOutcome::Abandoned => anyhow::bail!("the script ended without submitting"),
    }
}

async fn run_interactive(
    session: &mut TestSession,
    proctor: &Proctor,
) -> Result<SessionOutcome> {
    let clock = proctor.clock();
    let total = session.test().question_count();
    println!("\nAnswer with a value, or use :n (next), :p (previous), :g N (go to N), :s (submit), :q (quit).");

    loop {
        if session.is_expired(clock.now()) {
            println!("\nTime is up.");
            return Ok(proctor.submit(session).await?);
        }

        show_question(session, clock.now());

        let input = prompt_line("> ")?;
        match input.as_str() {
            "" => {}
            ":n" => session.next()?,
            ":p" => session.previous()?,
            ":q" => anyhow::bail!("abandoned without submitting"),
            ":s" => match proctor.submit(session).await {
                Ok(outcome) => return Ok(outcome),
                Err(SubmitError::Persist { attempts, source }) => {
                    println!("  Could not publish after {attempts} attempt(s): {source}");
                    println!("  Your answers are kept. Try :s again, or :q to quit.");
                }
                Err(e) => return Err(e.into()),
            },
            cmd if cmd.starts_with(":g") => match cmd[2..].trim().parse::<usize>() {
                Ok(n) if n >= 1 && n <= total => session.go_to(n - 1)?,
                _ => println!("  Usage: :g N (1-{total})"),
            },
            text => {
                let question = session.current_question();
                match parse_answer(&question.kind, text) {
                    Some(answer) => {
                        session.answer_current(answer)?;
                        if session.current_index() + 1 < total {
                            session.next()?;
                        }
                    }
                    None => println!("  Could not read that as an answer to this question."),
                }
            }
        }
    }
}

fn show_question(session: &TestSession, now: chrono::DateTime<chrono::Utc>) {
    let question = session.current_question();
    println!();
    println!(
        "[{}] Question {}/{}: {}",
        format_remaining(session.remaining_seconds(now)),
        session.current_index() + 1,
        session.test().question_count(),
        question.prompt
    );
    match &question.kind {
        QuestionKind::MultipleChoice { options, .. } => {
            for (i, option) in options.iter().enumerate() {
                println!("  {}. {}", option_label(i), option);
            }
        }
        QuestionKind::TrueFalse { .. } => println!("  true / false"),
        QuestionKind::ShortAnswer { .. } => {}
    }
    if let Some(current) = session.answers().get(&question.id) {
        println!("  Current answer: {current}");
    }
}

/// Option labels run A, B, C like a printed answer sheet; past Z we fall
/// back to numbers, which the input parser always accepts.
fn option_label(index: usize) -> String {
    if index < 26 {
        char::from(b'A' + index as u8).to_string()
    } else {
        (index + 1).to_string()
    }
}

/// Read one answer in the form the question expects.
///
/// Multiple-choice answers are typed as the option letter shown on screen
/// or as its 1-based number; they are stored as the 0-based index.
fn parse_answer(kind: &QuestionKind, input: &str) -> Option<Answer> {
    match kind {
        QuestionKind::MultipleChoice { options, .. } => {
            let text = input.trim();
            let index = match text.as_bytes() {
                [c] if c.is_ascii_alphabetic() => (c.to_ascii_uppercase() - b'A') as usize,
                _ => text.parse::<usize>().ok()?.checked_sub(1)?,
            };
            if index < options.len() {
                Some(Answer::Choice(index))
            } else {
                None
            }
        }
        QuestionKind::TrueFalse { .. } => match input.trim().to_lowercase().as_str() {
            "t" | "true" | "y" | "yes" => Some(Answer::Bool(true)),
            "f" | "false" | "n" | "no" => Some(Answer::Bool(false)),
            _ => None,
        },
        QuestionKind::ShortAnswer { .. } => {
            let text = input.trim();
            if text.is_empty() {
                None
            } else {
                Some(Answer::Text(text.to_string()))
            }
        }
    }
}

fn prompt_line(prefix: &str) -> Result<String> {
    use std::io::Write;

    print!("{prefix}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    let read = std::io::stdin().read_line(&mut line)?;
    anyhow::ensure!(read > 0, "input stream closed");
    Ok(line.trim().to_string())
}

fn print_outcome(outcome: &SessionOutcome, test: &Test) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Question", "Answered", "Correct", "Points"]);
    for mark in &outcome.marks {
        let prompt = test
            .question(&mark.question_id)
            .map(|q| q.prompt.as_str())
            .unwrap_or(mark.question_id.as_str());
        table.add_row(vec![
            Cell::new(prompt),
            Cell::new(if mark.answered { "yes" } else { "no" }),
            Cell::new(if mark.correct { "yes" } else { "no" }),
            Cell::new(format!("{}/{}", mark.points_earned, mark.points_possible)),
        ]);
    }
    eprintln!("\n{table}");

    println!(
        "{}: {}% ({} of {} correct)",
        outcome.student.name, outcome.score, outcome.correct_count, outcome.total_count
    );
}
