//! Conversational core of Deskbot.
//!
//! Wires the greeting short-circuit, FAQ retrieval, prompt construction,
//! and LLM completion into the per-request response pipeline, including
//! escalation-phrase detection on the raw completion.

pub mod greeting;
pub mod orchestrator;
pub mod prompt;

pub use greeting::{GreetingClassifier, GREETING_REPLY};
pub use orchestrator::{ResponseOrchestrator, ESCALATION_REPLY};
pub use prompt::{PromptBuilder, ESCALATION_PHRASE, NO_HISTORY_TEXT};
