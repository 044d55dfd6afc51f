//! Configuration system: schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use seogen_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("Default provider: {}", cfg.generator.default_provider);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{get_config_path, load_config, save_config};
pub use schema::{Config, ProviderConfig};
