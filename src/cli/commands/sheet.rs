//! Sheet management commands.

use console::style;

use crate::config::Settings;
use crate::models::{ContactRecord, DisplayContact};
use crate::server::build_sink;
use crate::sheets::{HeaderState, SHEET_COLUMNS};

use super::super::helpers::truncate;

/// Write the header row if the sheet has none.
pub async fn cmd_sheet_init(settings: &Settings) -> anyhow::Result<()> {
    settings.validate_sheets()?;
    let sink = build_sink(settings)?;

    match sink.ensure_header().await? {
        HeaderState::Created => println!("{} Sheet headers initialized", style("✓").green()),
        HeaderState::Present => println!("{} Sheet headers already present", style("✓").green()),
        HeaderState::Mismatched => println!(
            "{} First row is not the expected header; left unchanged. Expected: {}",
            style("!").yellow(),
            SHEET_COLUMNS.join(", ")
        ),
    }
    Ok(())
}

/// List stored contacts.
pub async fn cmd_sheet_list(settings: &Settings, json: bool) -> anyhow::Result<()> {
    settings.validate_sheets()?;
    let sink = build_sink(settings)?;
    let records = sink.list_records().await?;

    if json {
        let contacts: Vec<DisplayContact> = records.iter().map(ContactRecord::to_display).collect();
        println!("{}", serde_json::to_string_pretty(&contacts)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{} No contacts stored yet.", style("!").yellow());
        return Ok(());
    }

    println!("\n{}", style("Contacts").bold());
    println!("{}", "-".repeat(90));
    println!(
        "{:<22} {:<22} {:<18} {:<20} Added",
        "Name", "Company", "Phone", "Email"
    );
    println!("{}", "-".repeat(90));

    for record in &records {
        println!(
            "{:<22} {:<22} {:<18} {:<20} {}",
            truncate(record.label(), 21),
            truncate(&record.business_name, 21),
            truncate(&record.contact_number, 17),
            truncate(record.email.as_deref().unwrap_or(""), 19),
            record.created_at().format("%Y-%m-%d %H:%M")
        );
    }
    let incomplete = records.iter().filter(|r| !r.is_complete()).count();
    if incomplete > 0 {
        println!(
            "\n{} contacts ({} missing name, company or phone)",
            records.len(),
            incomplete
        );
    } else {
        println!("\n{} contacts", records.len());
    }

    Ok(())
}
