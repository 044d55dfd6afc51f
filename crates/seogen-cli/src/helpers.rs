//! Shared CLI helpers: banner, result printing, status lines.

use colored::Colorize;

use seogen_core::{AggregatedContent, GenerationOutput, KeywordItem};

/// Print the banner shown at REPL start.
pub fn print_banner(active: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "🔎 Seogen".cyan().bold(), version.dimmed());
    println!("{} {}", "Active model:".dimmed(), active.bold());
    println!(
        "{}",
        "Type /help for commands, or \"exit\" to quit.".dimmed()
    );
    println!();
}

pub fn print_help() {
    println!();
    println!("{}", "Generate:".bold());
    println!("  1 | keywords <topic>     SEO keywords with relevance");
    println!("  2 | title <topic>        Title suggestions");
    println!("  3 | meta <topic>         Meta description");
    println!("  4 | content <topic>      Full article");
    println!("  5 | all <topic> [--keywords a,b]");
    println!("                           Everything, optionally keeping only listed keywords");
    println!("{}", "Commands:".bold());
    println!("  /model [name]            List models, or switch to one");
    println!("  /health                  Show system health");
    println!("  /help                    Show this help message");
    println!("  exit                     Quit");
    println!("{}", "Anything else is sent to the active model as a chat message.".dimmed());
    println!();
}

pub fn print_info(message: &str) {
    println!("{} {message}", "✓".green());
}

pub fn print_error(message: &str) {
    eprintln!("\n{} {message}\n", "❌ Error:".red().bold());
}

/// Print a "working" placeholder.
pub fn print_thinking() {
    eprint!("{}", "⠿ generating...".dimmed());
}

/// Clear the placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

/// Print a chat answer.
pub fn print_reply(provider: &str, response: &str) {
    println!();
    println!("{}", provider.cyan().bold());
    if response.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{response}");
    }
    println!();
}

/// Render a generation result for humans.
pub fn print_output(output: &GenerationOutput) {
    println!();
    match output {
        GenerationOutput::Keywords(items) => print_keywords(items),
        GenerationOutput::Titles(titles) => print_titles(titles),
        GenerationOutput::Meta(meta) => print_section("Meta description", &meta.description),
        GenerationOutput::Content(content) => print_section("Content", content),
        GenerationOutput::All(all) => print_all(all),
    }
    println!();
}

fn print_keywords(items: &[KeywordItem]) {
    println!("{}", "Keywords".bold());
    if items.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for (i, item) in items.iter().enumerate() {
        println!(
            "  {:>2}. {:<40} {}",
            i + 1,
            item.keyword,
            format!("{}", item.relevance).dimmed()
        );
    }
}

fn print_titles(titles: &[String]) {
    println!("{}", "Titles".bold());
    for title in titles {
        println!("  • {title}");
    }
}

fn print_section(heading: &str, body: &str) {
    println!("{}", heading.bold());
    println!("{body}");
}

fn print_all(all: &AggregatedContent) {
    print_keywords(&all.keywords);
    println!();
    print_titles(&all.titles);
    println!();
    print_section("Meta description", &all.meta.description);
    println!();
    print_section("Content", &all.content);
}
