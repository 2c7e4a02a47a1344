//! The `classmark results` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use classmark_core::statistics::ResultsSummary;
use classmark_core::traits::RecordStore;
use classmark_store::config::load_config_from;
use classmark_store::http::HttpRecordStore;

pub async fn execute(test_id: String, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = HttpRecordStore::with_timeout(
        Some(config.store.base_url.clone()),
        config.store.timeout_secs,
    );

    let records = store.list_results(&test_id).await?;
    if records.is_empty() {
        println!("No results recorded for '{test_id}'.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Student", "Class", "Score", "Correct", "Submitted"]);
    for record in &records {
        table.add_row(vec![
            Cell::new(&record.student_name),
            Cell::new(&record.class_name),
            Cell::new(format!("{}%", record.score)),
            Cell::new(format!("{}/{}", record.correct_count, record.total_count)),
            Cell::new(record.submitted_at.format("%Y-%m-%d %H:%M").to_string()),
        ]);
    }
    println!("{table}");

    let summary = ResultsSummary::from_records(&records);
    println!(
        "\n{} attempts | average {:.1}% | highest {}% | lowest {}%",
        summary.attempts, summary.average_score, summary.highest_score, summary.lowest_score
    );
    for (label, count) in summary.distribution.buckets() {
        println!("  {label:<10} {count}");
    }

    Ok(())
}
