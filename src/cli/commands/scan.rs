//! Scan local card images.

use std::path::PathBuf;

use console::style;

use crate::config::Settings;
use crate::models::UploadedImage;
use crate::server::build_orchestrator;
use crate::services::{BatchEntry, BatchOrchestrator};

/// Run the batch pipeline over local files and print the entries as JSON.
pub async fn cmd_scan(settings: &Settings, files: &[PathBuf]) -> anyhow::Result<()> {
    settings.validate()?;
    let orchestrator = build_orchestrator(settings)?;

    let entries = scan_files(&orchestrator, files).await?;

    let failed = entries.iter().filter(|e| e.is_failure()).count();
    eprintln!(
        "{} {} contacts extracted, {} images failed",
        style("→").cyan(),
        entries.len() - failed,
        failed
    );
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

/// Process the files as one batch, in order.
///
/// A file that cannot be read becomes an error entry at its position.
async fn scan_files(
    orchestrator: &BatchOrchestrator,
    files: &[PathBuf],
) -> anyhow::Result<Vec<BatchEntry>> {
    let images = files
        .iter()
        .map(|path| UploadedImage::from_path(path))
        .collect();

    Ok(orchestrator.process(images).await?)
}
