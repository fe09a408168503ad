//! Collector outlooks - short generated commentary for one card.
//!
//! The language model only ever sees card identity and price figures and
//! returns a few hedged sentences. It never influences search results or
//! price selection; those stay deterministic in `cardscope-core`.
//!
//! - `llm` - the completion seam and the OpenAI-compatible client behind it
//! - `directions` - instruction text loaded once per process
//! - `service` - cache-first outlook generation with graceful downgrade

pub mod directions;
pub mod llm;
pub mod service;

pub use directions::{load_directions, Directions, DEFAULT_DIRECTIONS};
pub use llm::{CompletionRequest, LlmClient, LlmError, OpenAiChatClient};
pub use service::{GenerationSettings, OutlookService, FAILURE_NOTICE, PLACEHOLDER_OUTLOOK};
