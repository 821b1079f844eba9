//! Prompt construction for the completion call.
//!
//! The template is a protocol surface shared with the orchestrator: the
//! escalation phrase it instructs the model to emit is the exact substring
//! the escalation detector scans for. Keep [`ESCALATION_PHRASE`] and the
//! template in sync when editing either.

use deskbot_core::types::{ConversationTurn, Sender};

/// The phrase the model must emit verbatim when the context cannot answer.
///
/// The orchestrator detects it with a case-sensitive substring match. A
/// model that paraphrases instead of quoting silently skips escalation —
/// a known limitation of this prompt-level protocol.
pub const ESCALATION_PHRASE: &str = "I am unable to answer this question.";

/// Rendered in place of history for a fresh session.
pub const NO_HISTORY_TEXT: &str = "No history available.";

/// Builds the instruction prompt from history, retrieved context, and the
/// live question.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    /// Render conversation history for the prompt, one line per turn.
    ///
    /// User turns render as `Human:`, bot turns as `AI:`, in chronological
    /// order. An empty history renders as [`NO_HISTORY_TEXT`].
    pub fn format_history(history: &[ConversationTurn]) -> String {
        if history.is_empty() {
            return NO_HISTORY_TEXT.to_string();
        }

        history
            .iter()
            .map(|turn| match turn.sender {
                Sender::User => format!("Human: {}", turn.message),
                Sender::Bot => format!("AI: {}", turn.message),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Compose the full instruction prompt.
    ///
    /// History, context, and question sit in separately labeled sections so
    /// the model can tell stored turns apart from the live question.
    pub fn build(history: &[ConversationTurn], context: &str, question: &str) -> String {
        let formatted_history = Self::format_history(history);

        format!(
            "You are a helpful and friendly customer support agent.\n\
             Use the conversation history and the provided FAQ context to answer the user's question.\n\
             If the user is greeting you or making small talk, respond naturally and politely.\n\
             For everything else, answer ONLY with the information from the FAQ context. Do not make up information.\n\
             \n\
             If the FAQ context does not contain the answer, you MUST respond with the exact phrase:\n\
             '{escalation}'\n\
             \n\
             ---\n\
             Conversation History:\n\
             {history}\n\
             \n\
             ---\n\
             FAQ Context:\n\
             {context}\n\
             \n\
             ---\n\
             User Question:\n\
             {question}\n\
             \n\
             Answer:\n",
            escalation = ESCALATION_PHRASE,
            history = formatted_history,
            context = context,
            question = question,
        )
    }
}
