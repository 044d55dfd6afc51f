//! LLM provider layer for Seogen.
//!
//! # Architecture
//!
//! - [`registry`]: static specs for the supported providers and the
//!   config-loaded [`ProviderRegistry`]
//! - [`selector::ProviderSelector`]: the single active-provider register
//! - [`traits::TextProvider`]: "generate text for a prompt", one impl per provider
//! - [`gemini`], [`openai`], [`claude`]: the concrete clients
//! - [`factory`]: builds a client from a resolved descriptor

pub mod claude;
pub mod factory;
pub mod gemini;
pub mod openai;
pub mod registry;
pub mod selector;
pub mod traits;

pub use factory::{HttpProviderFactory, ProviderFactory};
pub use registry::{ProviderDescriptor, ProviderKind, ProviderRegistry, ProviderSpec, PROVIDERS};
pub use selector::ProviderSelector;
pub use traits::{RequestConfig, TextProvider};
