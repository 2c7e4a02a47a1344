//! CSV export of result records.
//!
//! Column names match the record store's wire format so a CSV export and
//! a raw API response line up field for field.

use std::path::Path;

use anyhow::Result;
use classmark_core::results::ResultRecord;

/// Quote a field if it contains a comma, quote, or newline.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render result records as CSV with a header row.
pub fn results_to_csv(records: &[ResultRecord]) -> String {
    let mut csv =
        String::from("testId,studentName,className,score,correctCount,totalCount,submittedAt\n");
    for record in records {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            csv_field(&record.test_id),
            csv_field(&record.student_name),
            csv_field(&record.class_name),
            record.score,
            record.correct_count,
            record.total_count,
            record.submitted_at.to_rfc3339(),
        ));
    }
    csv
}

/// Write result records as CSV to a file.
pub fn write_results_csv(records: &[ResultRecord], path: &Path) -> Result<()> {
    let csv = results_to_csv(records);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, csv)?;
    Ok(())
}
