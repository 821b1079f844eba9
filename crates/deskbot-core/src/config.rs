use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Top-level configuration for the Deskbot service.
///
/// Loaded from `deskbot.toml` by default. Each section corresponds to a
/// bounded context or cross-cutting concern. Every field has a default so a
/// partial (or missing) file still yields a runnable configuration; only the
/// LLM credential lives outside this file, in the `GOOGLE_API_KEY`
/// environment variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskbotConfig {
    pub general: GeneralConfig,
    pub server: ServerConfig,
    pub corpus: CorpusConfig,
    pub embedding: EmbeddingConfig,
    pub chat: ChatConfig,
    pub llm: LlmConfig,
}

impl Default for DeskbotConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            corpus: CorpusConfig::default(),
            embedding: EmbeddingConfig::default(),
            chat: ChatConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl DeskbotConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DeskbotConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the SQLite conversation log.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to bind on 127.0.0.1.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8000 }
    }
}

/// FAQ corpus settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Path to the FAQ CSV file (columns `question`, `answer`).
    pub path: String,
    /// Minimum cosine similarity for a retrieval hit. Queries scoring below
    /// this against every entry produce the "no relevant FAQ" sentinel.
    pub similarity_threshold: f32,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: "data/faqs.csv".to_string(),
            similarity_threshold: 0.5,
        }
    }
}

/// Embedding model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Directory containing `model.onnx` and `tokenizer.json` for the
    /// sentence-transformer export.
    pub model_dir: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_dir: "models/all-MiniLM-L6-v2".to_string(),
        }
    }
}

/// Chat pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// How many recent turns of history feed into the prompt.
    pub history_turns: usize,
    /// Maximum accepted user message length in characters.
    pub max_message_length: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_turns: 10,
            max_message_length: 2000,
        }
    }
}

/// LLM provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Gemini model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-request timeout for the completion call, in seconds.
    pub timeout_secs: u64,
    /// API base URL. Overridable for tests and proxies.
    pub endpoint: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            temperature: 0.3,
            timeout_secs: 30,
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
        }
    }
}
