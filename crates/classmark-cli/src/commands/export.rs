//! The `classmark export` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use classmark_core::results::{ResultRecord, SessionOutcome};
use classmark_core::traits::RecordStore;
use classmark_report::csv::write_results_csv;
use classmark_report::html::write_html_report;
use classmark_store::config::load_config_from;
use classmark_store::http::HttpRecordStore;

pub async fn execute(
    test_id: Option<String>,
    input: Option<PathBuf>,
    format: String,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(
        test_id.is_some() || input.is_some(),
        "provide --id TEST_ID or --input FILE"
    );

    let config = load_config_from(config_path.as_deref())?;
    let output = output.unwrap_or_else(|| config.output_dir.clone());

    let records = if let Some(path) = &input {
        load_records(path)?
    } else {
        let id = test_id.clone().unwrap_or_default();
        let store = HttpRecordStore::with_timeout(
            Some(config.store.base_url.clone()),
            config.store.timeout_secs,
        );
        store.list_results(&id).await?
    };

    let title = test_id
        .or_else(|| records.first().map(|r| r.test_id.clone()))
        .unwrap_or_else(|| "results".to_string());

    std::fs::create_dir_all(&output)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    let formats: Vec<&str> = if format == "all" {
        vec!["csv", "html"]
    } else {
        format.split(',').collect()
    };

    for fmt in &formats {
        match *fmt {
            "csv" => {
                let path = output.join(format!("results-{title}-{timestamp}.csv"));
                write_results_csv(&records, &path)?;
                println!("CSV export: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("results-{title}-{timestamp}.html"));
                write_html_report(&title, &records, &path)?;
                println!("HTML report: {}", path.display());
            }
            other => anyhow::bail!("unknown format '{other}' (expected csv, html, or all)"),
        }
    }

    Ok(())
}

/// Load records from a JSON file.
///
/// Accepts an array of records, a single record, or a saved attempt
/// from `classmark take`.
fn load_records(path: &Path) -> Result<Vec<ResultRecord>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    if let Ok(records) = serde_json::from_str::<Vec<ResultRecord>>(&text) {
        return Ok(records);
    }
    if let Ok(record) = serde_json::from_str::<ResultRecord>(&text) {
        return Ok(vec![record]);
    }
    let outcome: SessionOutcome = serde_json::from_str(&text)
        .with_context(|| format!("{} does not contain results", path.display()))?;
    Ok(vec![ResultRecord::from_outcome(&outcome)])
}
