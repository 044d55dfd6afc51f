//! `seogen status`: show configuration and provider status.

use anyhow::Result;
use colored::Colorize;

use seogen_core::config::{get_config_path, load_config};
use seogen_core::utils::expand_home;
use seogen_providers::{ProviderKind, ProviderRegistry};

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "🔎 Seogen Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".red().to_string()
        }
    );

    let default_ok = config
        .generator
        .default_provider
        .parse::<ProviderKind>()
        .is_ok();
    println!(
        "  {:<18} {} {}",
        "Default model:".bold(),
        config.generator.default_provider,
        if default_ok {
            String::new()
        } else {
            "(unknown tag)".red().to_string()
        }
    );

    let timeout = match config.generator.request_timeout() {
        Some(t) => format!("{}s", t.as_secs()),
        None => "none".to_string(),
    };
    println!(
        "  {:<18} {} | {} | {}",
        "Parameters:".bold(),
        format!("temp: {}", config.generator.temperature).dimmed(),
        format!("max_tokens: {}", config.generator.max_tokens).dimmed(),
        format!("timeout: {timeout}").dimmed(),
    );

    println!(
        "  {:<18} {}:{}",
        "Server:".bold(),
        config.server.host,
        config.server.port
    );

    let history = if config.history.enabled {
        expand_home(&config.history.path).display().to_string()
    } else {
        "disabled".dimmed().to_string()
    };
    println!("  {:<18} {}", "History:".bold(), history);

    // Providers, resolved the same way the server resolves them
    println!();
    println!("  {}", "Providers:".bold());
    let registry = ProviderRegistry::from_config(&config.providers);
    for descriptor in registry.all() {
        let status = if descriptor.is_available() {
            format!("{} (key set)", "✓".green())
        } else {
            format!(
                "{} (set {})",
                "· not configured".dimmed(),
                descriptor.kind.spec().env_key
            )
        };
        println!(
            "    {:<10} {:<28} {}",
            descriptor.display_name, descriptor.model_id, status
        );
    }
    println!();

    Ok(())
}
