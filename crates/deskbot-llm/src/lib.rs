//! Deskbot LLM crate - single-shot completion client for Gemini.
//!
//! Provides the [`CompletionClient`] trait the chat orchestrator depends on
//! and the production [`GeminiClient`] implementation over the
//! `generateContent` REST API.

pub mod gemini;

pub use gemini::{CompletionClient, GeminiClient, LlmError};
