//! Seogen core: shared types, configuration, errors, and generation records.
//!
//! This crate contains:
//! - **config**: JSON schema, loader, and env var overrides
//! - **types**: the content data model (keywords, titles, meta, content)
//! - **error**: the `GenerationError` taxonomy used by every layer
//! - **records**: append-only generation records and the JSONL sink

pub mod config;
pub mod error;
pub mod records;
pub mod types;
pub mod utils;

pub use error::{GenerationError, Result};
pub use types::{
    AggregatedContent, ContentKind, GenerationOutput, GenerationRequest, KeywordItem,
    MetaDescription,
};
