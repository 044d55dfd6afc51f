//! `seogen onboard`: initialize configuration and data directories.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use seogen_core::config::{get_config_path, save_config, Config};
use seogen_core::utils::history_dir;

/// Run the onboard command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "🔎 Seogen Setup".cyan().bold());
    println!();

    let config_path = get_config_path();
    if write_default_config(&config_path)? {
        println!("  {} created config at {}", "✓".green(), config_path.display());
    } else {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    }

    let history_dir = history_dir();
    std::fs::create_dir_all(&history_dir)
        .with_context(|| format!("failed to create {}", history_dir.display()))?;
    println!("  {} history dir at {}", "✓".green(), history_dir.display());

    println!();
    println!("  Add an API key under {} in the config,", "providers".bold());
    println!("  or export GEMINI_API_KEY / OPENAI_API_KEY.");
    println!();
    println!(
        "{}",
        "  Setup complete! Run `seogen repl` or `seogen serve` to start.".green()
    );
    println!();

    Ok(())
}

/// Write `Config::default()` to `path` unless a file is already there.
///
/// Returns whether a file was written.
fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_config(&Config::default(), Some(path))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}
