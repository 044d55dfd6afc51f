//! Seogen generator: prompts, normalization, and orchestration.
//!
//! This crate contains:
//! - **prompts**: one natural-language prompt per content kind
//! - **normalizer**: fence stripping and typed parsing of provider text
//! - **orchestrator**: single-kind calls, the `generate_all` fan-out, chat,
//!   and the persistence hook

pub mod normalizer;
pub mod orchestrator;
pub mod prompts;

pub use orchestrator::{ChatReply, GenerationOrchestrator};
