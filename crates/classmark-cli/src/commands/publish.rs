//! The `classmark publish` command.

use std::path::PathBuf;

use anyhow::Result;

use classmark_core::traits::RecordStore;
use classmark_store::config::load_config_from;
use classmark_store::http::HttpRecordStore;

pub async fn execute(test_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = HttpRecordStore::with_timeout(
        Some(config.store.base_url.clone()),
        config.store.timeout_secs,
    );

    let tests = if test_path.is_dir() {
        classmark_core::parser::load_test_directory(&test_path)?
    } else {
        vec![classmark_core::parser::parse_test_file(&test_path)?]
    };

    for test in &tests {
        let stored = store.publish_test(test).await?;
        println!(
            "Published '{}' ({} questions) to {}",
            stored.title,
            stored.question_count(),
            store.base_url()
        );
        println!("  Students take it with: classmark take --id {}", stored.id);
    }

    Ok(())
}
