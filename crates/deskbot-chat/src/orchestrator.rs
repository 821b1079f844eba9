//! Response orchestrator: the per-request pipeline coordinator.
//!
//! Consults the greeting classifier, fetches session history, retrieves the
//! best FAQ match, builds the prompt, invokes the LLM, and applies
//! escalation detection to the raw completion. Every internal failure
//! degrades to natural-language text — the caller never sees an error.

use std::sync::Arc;

use tracing::{debug, warn};

use deskbot_core::config::ChatConfig;
use deskbot_llm::CompletionClient;
use deskbot_retrieval::{CorpusIndex, NO_MATCH_TEXT};
use deskbot_storage::ConversationRepository;

use crate::greeting::{GreetingClassifier, GREETING_REPLY};
use crate::prompt::{PromptBuilder, ESCALATION_PHRASE};

/// Fixed user-facing reply when the completion signals (or fails into)
/// escalation.
pub const ESCALATION_REPLY: &str =
    "I'm sorry, I can't seem to find the answer. I will escalate this to a human agent for you.";

/// Central coordinator for one conversation turn.
///
/// Holds shared read-only collaborators injected at startup; carries no
/// per-request state of its own, so one instance serves all sessions
/// concurrently.
pub struct ResponseOrchestrator {
    corpus: Arc<CorpusIndex>,
    store: Arc<ConversationRepository>,
    llm: Box<dyn CompletionClient>,
    greeting: GreetingClassifier,
    history_turns: usize,
}

impl ResponseOrchestrator {
    pub fn new(
        corpus: Arc<CorpusIndex>,
        store: Arc<ConversationRepository>,
        llm: Box<dyn CompletionClient>,
        config: &ChatConfig,
    ) -> Self {
        Self {
            corpus,
            store,
            llm,
            greeting: GreetingClassifier::new(),
            history_turns: config.history_turns,
        }
    }

    /// Compute the bot's reply for one user message.
    ///
    /// Never fails: store and retrieval problems degrade the prompt inputs,
    /// completion problems degrade to the escalation reply. Persisting the
    /// exchange is the caller's job — this method only reads history.
    pub async fn get_response(&self, session_id: &str, user_message: &str) -> String {
        // 1. Greetings skip the whole pipeline.
        if self.greeting.classify(user_message) {
            debug!(session_id, "Greeting short-circuit");
            return GREETING_REPLY.to_string();
        }

        // 2. Recent history, oldest first.
        let history = match self.store.history(session_id, self.history_turns) {
            Ok(turns) => turns,
            Err(e) => {
                warn!(session_id, error = %e, "History fetch failed; continuing without history");
                Vec::new()
            }
        };

        // 3. Best FAQ candidate for grounding.
        let context = match self.corpus.search(user_message).await {
            Ok(found) => {
                debug!(
                    session_id,
                    score = found.score,
                    matched = found.matched,
                    "FAQ retrieval"
                );
                found.text
            }
            Err(e) => {
                warn!(session_id, error = %e, "FAQ retrieval failed; continuing without context");
                NO_MATCH_TEXT.to_string()
            }
        };

        // 4. + 5. Prompt and completion.
        let prompt = PromptBuilder::build(&history, &context, user_message);
        let completion = match self.llm.complete(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(session_id, error = %e, "Completion failed; escalating");
                return ESCALATION_REPLY.to_string();
            }
        };

        // 6. Substring (not equality) check: the model may wrap the phrase
        // in surrounding chatter.
        if completion.contains(ESCALATION_PHRASE) {
            debug!(session_id, "Escalation phrase detected");
            return ESCALATION_REPLY.to_string();
        }

        completion
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use deskbot_core::types::Sender;
    use deskbot_llm::LlmError;
    use deskbot_retrieval::MockEmbedding;
    use deskbot_storage::Database;

    /// Scripted completion stub that records the prompt it was given.
    struct ScriptedLlm {
        reply: Result<String, String>,
        last_prompt: Mutex<Option<String>>,
        calls: Mutex<usize>,
    }

    impl ScriptedLlm {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                last_prompt: Mutex::new(None),
                calls: Mutex::new(0),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                last_prompt: Mutex::new(None),
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for Arc<ScriptedLlm> {
        async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            *self.calls.lock().unwrap() += 1;
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(msg) => Err(LlmError::Decode(msg.clone())),
            }
        }
    }

    async fn make_corpus(csv: &str) -> Arc<CorpusIndex> {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(csv.as_bytes()).unwrap();
        Arc::new(
            CorpusIndex::load(file.path(), Box::new(MockEmbedding::new()), 0.5)
                .await
                .unwrap(),
        )
    }

    fn make_store() -> Arc<ConversationRepository> {
        Arc::new(ConversationRepository::new(Arc::new(
            Database::in_memory().unwrap(),
        )))
    }

    async fn make_orchestrator(
        csv: &str,
        llm: Arc<ScriptedLlm>,
    ) -> (ResponseOrchestrator, Arc<ConversationRepository>) {
        let corpus = make_corpus(csv).await;
        let store = make_store();
        let orch = ResponseOrchestrator::new(
            corpus,
            Arc::clone(&store),
            Box::new(llm),
            &ChatConfig::default(),
        );
        (orch, store)
    }

    const HOURS_CSV: &str = "question,answer\nWhat are your hours?,9-5 Mon-Fri\n";

    // ---- Greeting short-circuit ----

    #[tokio::test]
    async fn test_greeting_returns_canned_reply() {
        let llm = Arc::new(ScriptedLlm::replying("should never be used"));
        let (orch, _) = make_orchestrator(HOURS_CSV, Arc::clone(&llm)).await;

        let reply = orch.get_response("s1", "Hello!").await;
        assert_eq!(reply, GREETING_REPLY);
        // The pipeline never reached the LLM.
        assert_eq!(*llm.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_non_greeting_reaches_llm() {
        let llm = Arc::new(ScriptedLlm::replying("We are open 9-5."));
        let (orch, _) = make_orchestrator(HOURS_CSV, Arc::clone(&llm)).await;

        let reply = orch.get_response("s1", "good morning").await;
        assert_eq!(reply, "We are open 9-5.");
        assert_eq!(*llm.calls.lock().unwrap(), 1);
    }

    // ---- Grounded path ----

    #[tokio::test]
    async fn test_grounded_response_passes_through() {
        let llm = Arc::new(ScriptedLlm::replying("Our hours are 9-5, Monday to Friday."));
        let (orch, _) = make_orchestrator(HOURS_CSV, Arc::clone(&llm)).await;

        // Identical to the stored combined text, so retrieval scores 1.0.
        let reply = orch
            .get_response("s1", "What are your hours? 9-5 Mon-Fri")
            .await;
        assert_eq!(reply, "Our hours are 9-5, Monday to Friday.");
        assert_ne!(reply, ESCALATION_REPLY);

        let prompt = llm.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("What are your hours? 9-5 Mon-Fri"));
    }

    #[tokio::test]
    async fn test_prompt_carries_history_and_context() {
        let llm = Arc::new(ScriptedLlm::replying("ok"));
        let (orch, store) = make_orchestrator(HOURS_CSV, Arc::clone(&llm)).await;

        store.append("s1", Sender::User, "hi").unwrap();
        store.append("s1", Sender::Bot, "hello").unwrap();

        orch.get_response("s1", "What are your hours? 9-5 Mon-Fri")
            .await;

        let prompt = llm.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("Human: hi"));
        assert!(prompt.contains("AI: hello"));
        assert!(prompt.contains("FAQ Context:"));
        assert!(prompt.contains("What are your hours? 9-5 Mon-Fri"));
    }

    #[tokio::test]
    async fn test_history_is_per_session() {
        let llm = Arc::new(ScriptedLlm::replying("ok"));
        let (orch, store) = make_orchestrator(HOURS_CSV, Arc::clone(&llm)).await;

        store.append("other", Sender::User, "unrelated turn").unwrap();

        orch.get_response("s1", "What are your hours? 9-5 Mon-Fri")
            .await;

        let prompt = llm.last_prompt.lock().unwrap().clone().unwrap();
        assert!(!prompt.contains("unrelated turn"));
        assert!(prompt.contains("No history available."));
    }

    // ---- Miss path and escalation ----

    #[tokio::test]
    async fn test_unrelated_query_feeds_no_match_sentinel() {
        let llm = Arc::new(ScriptedLlm::replying("ok"));
        // Empty corpus: every query misses.
        let (orch, _) = make_orchestrator("question,answer\n", Arc::clone(&llm)).await;

        orch.get_response("s1", "what is the airspeed of a swallow")
            .await;

        let prompt = llm.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains(NO_MATCH_TEXT));
    }

    #[tokio::test]
    async fn test_escalation_phrase_maps_to_fixed_reply() {
        let llm = Arc::new(ScriptedLlm::replying(
            "I'm sorry. I am unable to answer this question. Please try rephrasing.",
        ));
        let (orch, _) = make_orchestrator("question,answer\n", Arc::clone(&llm)).await;

        let reply = orch.get_response("s1", "completely unknown topic").await;
        assert_eq!(reply, ESCALATION_REPLY);
    }

    #[tokio::test]
    async fn test_bare_escalation_phrase_also_triggers() {
        let llm = Arc::new(ScriptedLlm::replying(ESCALATION_PHRASE));
        let (orch, _) = make_orchestrator("question,answer\n", Arc::clone(&llm)).await;

        let reply = orch.get_response("s1", "unknown").await;
        assert_eq!(reply, ESCALATION_REPLY);
    }

    #[tokio::test]
    async fn test_escalation_match_is_case_sensitive() {
        // Paraphrased or re-cased phrases do NOT trigger escalation; the
        // detector is an exact-substring contract.
        let llm = Arc::new(ScriptedLlm::replying(
            "i am unable to answer this question.",
        ));
        let (orch, _) = make_orchestrator("question,answer\n", Arc::clone(&llm)).await;

        let reply = orch.get_response("s1", "unknown").await;
        assert_eq!(reply, "i am unable to answer this question.");
    }

    #[tokio::test]
    async fn test_llm_failure_degrades_to_escalation() {
        let llm = Arc::new(ScriptedLlm::failing("connection reset"));
        let (orch, _) = make_orchestrator(HOURS_CSV, Arc::clone(&llm)).await;

        let reply = orch.get_response("s1", "anything").await;
        assert_eq!(reply, ESCALATION_REPLY);
    }

    // ---- Passthrough ----

    #[tokio::test]
    async fn test_normal_completion_unmodified() {
        let text = "You can reset your password from the account page.";
        let llm = Arc::new(ScriptedLlm::replying(text));
        let (orch, _) = make_orchestrator(HOURS_CSV, Arc::clone(&llm)).await;

        let reply = orch.get_response("s1", "reset password").await;
        assert_eq!(reply, text);
    }

    // ---- Statelessness across sessions ----

    #[tokio::test]
    async fn test_concurrent_sessions_share_orchestrator() {
        let llm = Arc::new(ScriptedLlm::replying("ok"));
        let (orch, _) = make_orchestrator(HOURS_CSV, Arc::clone(&llm)).await;
        let orch = Arc::new(orch);

        let mut handles = Vec::new();
        for i in 0..8 {
            let orch = Arc::clone(&orch);
            handles.push(tokio::spawn(async move {
                orch.get_response(&format!("session-{}", i), "some question")
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), "ok");
        }
    }
}
