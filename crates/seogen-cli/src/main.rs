//! Seogen CLI: entry point.
//!
//! # Commands
//!
//! - `seogen serve`: HTTP API on `server.host:server.port`
//! - `seogen repl`: interactive terminal session
//! - `seogen generate <kind> <topic>`: one-shot generation, prints JSON
//! - `seogen status`: show configuration and provider status
//! - `seogen onboard`: write a default config
//! - `seogen history [-n N] [-p PAGE]`: show recent generation records

mod helpers;
mod history;
mod onboard;
mod repl;
mod server;
mod status;

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use seogen_core::config::{load_config, Config};
use seogen_core::records::JsonlRecordSink;
use seogen_core::utils::expand_home;
use seogen_core::{ContentKind, GenerationRequest};
use seogen_generator::GenerationOrchestrator;
use seogen_providers::{HttpProviderFactory, ProviderRegistry, ProviderSelector, RequestConfig};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Seogen: SEO content generation backed by interchangeable LLM providers
#[derive(Parser)]
#[command(name = "seogen", version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true, default_value_t = false)]
    logs: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve,

    /// Interactive terminal session
    Repl,

    /// Generate one content kind and print it as JSON
    Generate {
        /// keywords, title, meta, content, or all
        kind: String,

        /// Topic to generate for
        topic: String,

        /// Keep only these keywords (kind `all` only), comma-separated
        #[arg(long, value_delimiter = ',')]
        keywords: Vec<String>,

        /// Provider to switch to before generating
        #[arg(long)]
        provider: Option<String>,
    },

    /// Show configuration and provider status
    Status,

    /// Write a default config to ~/.seogen/config.json
    Onboard,

    /// Show recent generation records
    History {
        /// Number of records to show
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,

        /// Page to show, newest first
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => {
            init_logging(if cli.logs { "seogen=debug,info" } else { "info" }, cli.json_logs);
            let config = load_config(None);
            let app = App::from_config(&config)?;
            server::run(&config, app).await
        }
        Commands::Repl => {
            init_logging(default_filter(cli.logs), cli.json_logs);
            let config = load_config(None);
            let app = App::from_config(&config)?;
            repl::run(app).await
        }
        Commands::Generate {
            kind,
            topic,
            keywords,
            provider,
        } => {
            init_logging(default_filter(cli.logs), cli.json_logs);
            let config = load_config(None);
            let app = App::from_config(&config)?;
            run_generate(&app, &kind, topic, keywords, provider).await
        }
        Commands::Status => status::run(),
        Commands::Onboard => onboard::run(),
        Commands::History { limit, page } => history::run(page, limit),
    }
}

// ─────────────────────────────────────────────
// Wiring
// ─────────────────────────────────────────────

/// Everything a front-end needs: the orchestrator plus the history file.
#[derive(Clone)]
pub struct App {
    pub orchestrator: Arc<GenerationOrchestrator>,
    pub history: Option<Arc<JsonlRecordSink>>,
}

impl App {
    /// Build the registry, selector, clients, and sink from the loaded config.
    ///
    /// Fails when `generator.defaultProvider` is not a known tag.
    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = Arc::new(ProviderRegistry::from_config(&config.providers));
        debug!(registry = ?registry, "provider registry loaded");

        let selector = ProviderSelector::from_tag(registry, &config.generator.default_provider)
            .with_context(|| {
                format!(
                    "invalid generator.defaultProvider '{}'",
                    config.generator.default_provider
                )
            })?;

        let factory = HttpProviderFactory::new(RequestConfig {
            max_tokens: config.generator.max_tokens,
            temperature: config.generator.temperature,
        });

        let mut orchestrator = GenerationOrchestrator::new(Arc::new(selector), Arc::new(factory))
            .with_timeout(config.generator.request_timeout());

        let history = if config.history.enabled {
            let path = expand_home(&config.history.path);
            let sink = Arc::new(
                JsonlRecordSink::new(&path)
                    .with_context(|| format!("failed to open history at {}", path.display()))?,
            );
            orchestrator = orchestrator.with_sink(sink.clone());
            Some(sink)
        } else {
            None
        };

        info!(
            active = %orchestrator.active_provider(),
            history = history.is_some(),
            "generator ready"
        );

        Ok(Self {
            orchestrator: Arc::new(orchestrator),
            history,
        })
    }
}

// ─────────────────────────────────────────────
// Generate command
// ─────────────────────────────────────────────

async fn run_generate(
    app: &App,
    kind: &str,
    topic: String,
    keywords: Vec<String>,
    provider: Option<String>,
) -> Result<()> {
    let Some(kind) = ContentKind::parse(kind) else {
        bail!("unknown kind '{kind}' (expected keywords, title, meta, content, or all)");
    };

    if let Some(tag) = provider {
        let message = app.orchestrator.switch_provider(&tag)?;
        helpers::print_info(&message);
    }

    let mut request = GenerationRequest::new(kind, topic);
    if !keywords.is_empty() {
        let selected: HashSet<String> = keywords.into_iter().collect();
        request.selected_keywords = Some(selected);
    }

    let output = app
        .orchestrator
        .run(&request)
        .await
        .with_context(|| format!("{kind} generation failed"))?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

// ─────────────────────────────────────────────
// Logging
// ─────────────────────────────────────────────

fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "seogen=debug,info"
    } else {
        "warn"
    }
}

/// Initialize tracing. `RUST_LOG`, when set, wins over `default`.
fn init_logging(default: &str, json: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}
