//! Greeting short-circuit.
//!
//! A small closed set of pleasantries skips retrieval and the LLM entirely
//! and gets a canned reply. Membership is exact after normalization — this
//! is deliberately not a semantic check, so near-greetings like
//! "good morning" fall through to the full pipeline (where the prompt still
//! tells the model to handle them naturally).

/// Canned reply for a recognized greeting.
pub const GREETING_REPLY: &str = "Hello! How can I assist you today?";

/// The closed set of recognized greetings, stored normalized.
const GREETINGS: [&str; 5] = ["hello", "hi", "hii", "hey", "how are you"];

/// Classifies messages as greetings via exact closed-set membership.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreetingClassifier;

impl GreetingClassifier {
    pub fn new() -> Self {
        Self
    }

    /// True only if the normalized message is exactly one of the known
    /// greetings.
    pub fn classify(&self, message: &str) -> bool {
        let normalized = normalize(message);
        GREETINGS.contains(&normalized.as_str())
    }
}

/// Lowercase and strip surrounding noise: leading whitespace plus any
/// trailing run of `?`, `!`, `.`, `,`, or spaces.
fn normalize(message: &str) -> String {
    message
        .to_lowercase()
        .trim_start()
        .trim_end_matches(|c: char| matches!(c, '?' | '!' | '.' | ',' | ' '))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_greetings_classify_true() {
        let classifier = GreetingClassifier::new();
        for greeting in ["hello", "hi", "hii", "hey", "how are you"] {
            assert!(classifier.classify(greeting), "{} should classify", greeting);
        }
    }

    #[test]
    fn test_casing_and_punctuation_variants() {
        let classifier = GreetingClassifier::new();
        assert!(classifier.classify("Hello!"));
        assert!(classifier.classify("  hi?"));
        assert!(classifier.classify("HEY."));
        assert!(classifier.classify("How are you??"));
        assert!(classifier.classify("hello,"));
        assert!(classifier.classify("hi!!! "));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for raw in ["Hello!", "  hi?", "HEY.", "how are you", "hii,,"] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_non_members_classify_false() {
        let classifier = GreetingClassifier::new();
        // Semantically greeting-like but outside the closed set.
        assert!(!classifier.classify("good morning"));
        assert!(!classifier.classify("greetings"));
        assert!(!classifier.classify("howdy"));
        // Substrings and supersets are not matches.
        assert!(!classifier.classify("hello there"));
        assert!(!classifier.classify("hi, I need help with my order"));
        assert!(!classifier.classify("h"));
    }

    #[test]
    fn test_empty_and_whitespace_classify_false() {
        let classifier = GreetingClassifier::new();
        assert!(!classifier.classify(""));
        assert!(!classifier.classify("   "));
        assert!(!classifier.classify("?!."));
    }

    #[test]
    fn test_internal_punctuation_is_not_stripped() {
        let classifier = GreetingClassifier::new();
        assert!(!classifier.classify("h.i"));
        assert!(!classifier.classify("how are. you"));
    }
}
