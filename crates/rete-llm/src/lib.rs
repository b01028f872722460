//! rete LLM - Inference clients
//!
//! The extraction pipeline sends each report's text, prefixed by a fixed
//! instruction, to a language model and reads back free-form text. This
//! crate provides the `LlmClient` implementations for the supported
//! providers.

pub mod llm;

pub use llm::{create_llm_client, OllamaClient, OpenAiClient};
