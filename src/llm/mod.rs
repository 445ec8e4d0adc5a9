//! LLM judge module.
//!
//! This module provides:
//! * [`CompletionClient`]: async trait implemented by completion backends.
//! * [`ApiClient`]: OpenAI-compatible REST client.
//! * [`LlmJudge`]: builds the prompt, calls the client, parses the answer and
//!   falls back to a `Needs Review` verdict on any failure.
//! * [`PromptBuilder`]: builds the classification prompt.
//! * [`parse_verdict`]: labeled-line (or JSON) answer → [`LlmVerdict`].
//! * [`LlmError`]: error variants for LLM operations.
//!
//! [`LlmVerdict`]: crate::verdict::LlmVerdict

pub mod client;
pub mod judge;
pub mod parse;
pub mod prompt;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{ApiClient, CompletionClient, LlmError};
pub use judge::LlmJudge;
pub use parse::parse_verdict;
pub use prompt::PromptBuilder;

// test-only re-export so pipeline tests can build analyzers without HTTP.
#[cfg(test)]
pub use client::MockClient;
