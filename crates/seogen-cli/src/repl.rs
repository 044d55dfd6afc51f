//! Interactive REPL.
//!
//! Uses `rustyline` for readline-style editing with persistent history and
//! drives the same in-process orchestrator as the HTTP server.

use anyhow::Result;
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use seogen_core::utils::history_dir;
use seogen_core::{ContentKind, GenerationRequest};

use crate::{helpers, App};

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

// ─────────────────────────────────────────────
// Command parsing
// ─────────────────────────────────────────────

/// One line of REPL input, parsed.
#[derive(Debug, PartialEq)]
pub enum ReplCommand {
    Empty,
    Exit,
    Help,
    Health,
    /// `/model` without an argument.
    ListModels,
    SwitchModel(String),
    /// `topic` is `None` when the user typed only the kind or its number.
    Generate {
        kind: ContentKind,
        topic: Option<String>,
        keywords: Vec<String>,
    },
    /// Unknown `/command`.
    Unknown(String),
    /// Anything else goes to the model verbatim.
    Chat(String),
}

impl ReplCommand {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return ReplCommand::Empty;
        }
        if is_exit_command(trimmed) {
            return ReplCommand::Exit;
        }

        let (head, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (trimmed, ""),
        };

        if head.starts_with('/') {
            return match head.to_lowercase().as_str() {
                "/help" => ReplCommand::Help,
                "/health" => ReplCommand::Health,
                "/model" if rest.is_empty() => ReplCommand::ListModels,
                "/model" => ReplCommand::SwitchModel(rest.to_string()),
                _ => ReplCommand::Unknown(head.to_string()),
            };
        }

        let Some(kind) = menu_kind(head) else {
            return ReplCommand::Chat(trimmed.to_string());
        };

        let (topic, keywords) = split_keywords_flag(rest);
        ReplCommand::Generate {
            kind,
            topic: (!topic.is_empty()).then(|| topic.to_string()),
            keywords,
        }
    }
}

/// Menu numbers 1–5 or a kind name.
fn menu_kind(word: &str) -> Option<ContentKind> {
    match word {
        "1" => Some(ContentKind::Keywords),
        "2" => Some(ContentKind::Title),
        "3" => Some(ContentKind::Meta),
        "4" => Some(ContentKind::Content),
        "5" => Some(ContentKind::All),
        other => ContentKind::parse(other),
    }
}

/// Split `"<topic> --keywords a, b"` into the topic and the keyword list.
fn split_keywords_flag(rest: &str) -> (&str, Vec<String>) {
    match rest.split_once("--keywords") {
        Some((topic, list)) => {
            let keywords = list
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from)
                .collect();
            (topic.trim(), keywords)
        }
        None => (rest, Vec::new()),
    }
}

/// Check if input is an exit command.
fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

// ─────────────────────────────────────────────
// Loop
// ─────────────────────────────────────────────

/// Run the interactive REPL loop.
pub async fn run(app: App) -> Result<()> {
    helpers::print_banner(app.orchestrator.active_provider().tag());

    let mut editor = create_editor()?;

    loop {
        let input = match editor.readline("seogen> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let command = ReplCommand::parse(&input);
        if command != ReplCommand::Empty {
            let _ = editor.add_history_entry(input.trim());
        }
        debug!(command = ?command, "repl input");

        match command {
            ReplCommand::Empty => continue,
            ReplCommand::Exit => {
                println!("\nGoodbye! 👋");
                break;
            }
            ReplCommand::Help => helpers::print_help(),
            ReplCommand::Health => print_health(&app),
            ReplCommand::ListModels => print_models(&app),
            ReplCommand::SwitchModel(tag) => match app.orchestrator.switch_provider(&tag) {
                Ok(message) => helpers::print_info(&message),
                Err(e) => helpers::print_error(&e.to_string()),
            },
            ReplCommand::Unknown(cmd) => {
                helpers::print_error(&format!("unknown command {cmd}; try /help"))
            }
            ReplCommand::Generate {
                kind,
                topic,
                keywords,
            } => {
                let topic = match topic {
                    Some(t) => t,
                    None => match ask_topic(&mut editor, kind) {
                        Some(t) => t,
                        None => continue,
                    },
                };
                generate(&app, kind, topic, keywords).await;
            }
            ReplCommand::Chat(message) => {
                helpers::print_thinking();
                let result = app.orchestrator.chat(&message).await;
                helpers::clear_thinking();
                match result {
                    Ok(reply) => helpers::print_reply(&reply.provider, &reply.response),
                    Err(e) => helpers::print_error(&e.to_string()),
                }
            }
        }
    }

    save_history(&mut editor);
    Ok(())
}

async fn generate(app: &App, kind: ContentKind, topic: String, keywords: Vec<String>) {
    let mut request = GenerationRequest::new(kind, topic);
    if !keywords.is_empty() {
        request = request.with_selected_keywords(keywords);
    }

    helpers::print_thinking();
    let result = app.orchestrator.run(&request).await;
    helpers::clear_thinking();

    match result {
        Ok(output) => helpers::print_output(&output),
        Err(e) => helpers::print_error(&e.to_string()),
    }
}

fn ask_topic(editor: &mut Editor<(), DefaultHistory>, kind: ContentKind) -> Option<String> {
    let prompt = format!("Enter topic for {kind}: ");
    match editor.readline(&prompt) {
        Ok(line) if !line.trim().is_empty() => Some(line.trim().to_string()),
        Ok(_) => {
            helpers::print_error("topic must not be empty");
            None
        }
        Err(_) => None,
    }
}

fn print_health(app: &App) {
    let orchestrator = &app.orchestrator;
    let status = if orchestrator.selector().get_active().is_ok() {
        "available"
    } else {
        "unavailable"
    };
    println!();
    println!("System Health Status:");
    println!("===================");
    println!("Active model: {}", orchestrator.active_provider());
    println!("AI model:     {status}");
    println!(
        "History:      {}",
        app.history
            .as_ref()
            .map(|h| h.path().display().to_string())
            .unwrap_or_else(|| "disabled".into())
    );
    println!("===================");
    println!();
}

fn print_models(app: &App) {
    let active = app.orchestrator.active_provider();
    println!();
    for descriptor in app.orchestrator.selector().registry().all() {
        let marker = if descriptor.kind == active { "*" } else { " " };
        let state = if descriptor.is_available() {
            "key set"
        } else {
            "no key"
        };
        println!(
            " {marker} {:<8} {:<28} ({state})",
            descriptor.kind.tag(),
            descriptor.model_id
        );
    }
    println!("\nSwitch with /model <name>.\n");
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

fn history_path() -> std::path::PathBuf {
    history_dir().join("cli_history")
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
