//! `seogen history`: print the newest generation records.

use anyhow::{Context, Result};
use colored::Colorize;

use seogen_core::config::load_config;
use seogen_core::records::{GenerationRecord, JsonlRecordSink};
use seogen_core::utils::{clip, expand_home};

/// Run the history command.
pub fn run(page: usize, limit: usize) -> Result<()> {
    let config = load_config(None);
    if !config.history.enabled {
        println!("{}", "History is disabled (history.enabled = false).".dimmed());
        return Ok(());
    }

    let sink = JsonlRecordSink::new(expand_home(&config.history.path))?;
    let history = sink
        .page(page, limit)
        .with_context(|| format!("failed to read {}", sink.path().display()))?;

    if history.total == 0 {
        println!("{}", "No generations recorded yet.".dimmed());
        return Ok(());
    }

    println!();
    for record in &history.records {
        println!("{}", format_record(record));
    }
    println!(
        "\n{}",
        format!(
            "Page {} of {} ({} records)",
            history.page, history.pages, history.total
        )
        .dimmed()
    );
    println!();
    Ok(())
}

fn format_record(record: &GenerationRecord) -> String {
    format!(
        "{}  {:<8} {:<7} {:>6}ms  {}",
        record.timestamp.format("%Y-%m-%d %H:%M:%S"),
        record.request_type.bold(),
        record.provider,
        record.process_time_ms,
        clip(&record.input, 60)
    )
}
