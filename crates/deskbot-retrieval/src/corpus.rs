//! FAQ corpus index: load, embed once, answer cosine similarity queries.
//!
//! The index is built once at startup and immutable afterwards, so it can be
//! shared behind an `Arc` across request handlers without locking. Queries
//! embed with the same service instance that embedded the corpus, which
//! keeps both sides in one embedding space by construction.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use deskbot_core::error::DeskbotError;

use crate::embedding::DynEmbeddingService;

/// Sentinel returned when no entry clears the similarity threshold. The
/// prompt template keys off this text to steer the model toward escalation.
pub const NO_MATCH_TEXT: &str = "No relevant FAQ found.";

/// One question/answer pair from the corpus.
///
/// `combined` is `question + " " + answer`; the entry's embedding is
/// computed over it once at load time.
#[derive(Debug, Clone)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
    pub combined: String,
}

/// Outcome of a similarity search.
#[derive(Debug, Clone)]
pub struct FaqMatch {
    /// The winning entry's combined text, or [`NO_MATCH_TEXT`] on a miss.
    pub text: String,
    /// Cosine similarity of the best candidate (0.0 for an empty corpus).
    pub score: f32,
    /// Whether the best candidate cleared the threshold.
    pub matched: bool,
}

/// CSV row shape. Extra columns are ignored; a missing `question` or
/// `answer` column fails the load.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    question: String,
    answer: String,
}

/// In-memory FAQ index with precomputed embeddings.
///
/// Embeddings are index-aligned with entries: `embeddings[i]` belongs to
/// `entries[i]`.
pub struct CorpusIndex {
    entries: Vec<FaqEntry>,
    embeddings: Vec<Vec<f32>>,
    embedder: Box<dyn DynEmbeddingService>,
    threshold: f32,
}

impl CorpusIndex {
    /// Load the corpus from a CSV file and embed every entry.
    ///
    /// Takes ownership of the embedding service; all later queries go
    /// through the same instance. An unreadable file or a row without the
    /// required fields is a corpus error. An empty corpus loads fine —
    /// every search then misses.
    pub async fn load(
        path: &Path,
        embedder: Box<dyn DynEmbeddingService>,
        threshold: f32,
    ) -> Result<Self, DeskbotError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| {
            DeskbotError::Corpus(format!("Failed to open corpus {}: {}", path.display(), e))
        })?;

        let mut entries = Vec::new();
        for record in reader.deserialize::<CsvRecord>() {
            let record = record
                .map_err(|e| DeskbotError::Corpus(format!("Malformed corpus row: {}", e)))?;
            let combined = format!("{} {}", record.question, record.answer);
            entries.push(FaqEntry {
                question: record.question,
                answer: record.answer,
                combined,
            });
        }

        let mut embeddings = Vec::with_capacity(entries.len());
        for entry in &entries {
            let vector = embedder.embed_boxed(&entry.combined).await?;
            embeddings.push(vector);
        }
        debug_assert_eq!(entries.len(), embeddings.len());

        info!(
            path = %path.display(),
            entries = entries.len(),
            threshold,
            "FAQ corpus loaded and embedded"
        );

        Ok(Self {
            entries,
            embeddings,
            embedder,
            threshold,
        })
    }

    /// Number of loaded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the most similar entry for a query.
    ///
    /// Embeds the query, scans every stored embedding, and keeps the argmax.
    /// Ties keep the first occurrence. A best score below the threshold
    /// reports a miss carrying [`NO_MATCH_TEXT`].
    pub async fn search(&self, query: &str) -> Result<FaqMatch, DeskbotError> {
        if self.entries.is_empty() {
            return Ok(FaqMatch {
                text: NO_MATCH_TEXT.to_string(),
                score: 0.0,
                matched: false,
            });
        }

        let query_vec = self.embedder.embed_boxed(query).await?;

        let mut best_idx = 0;
        let mut best_score = f32::MIN;
        for (idx, embedding) in self.embeddings.iter().enumerate() {
            let score = cosine_similarity(&query_vec, embedding);
            if score > best_score {
                best_score = score;
                best_idx = idx;
            }
        }

        if best_score < self.threshold {
            return Ok(FaqMatch {
                text: NO_MATCH_TEXT.to_string(),
                score: best_score,
                matched: false,
            });
        }

        Ok(FaqMatch {
            text: self.entries[best_idx].combined.clone(),
            score: best_score,
            matched: true,
        })
    }
}

impl std::fmt::Debug for CorpusIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorpusIndex")
            .field("entries", &self.entries.len())
            .field("threshold", &self.threshold)
            .finish()
    }
}

/// Cosine similarity between two vectors. Mismatched or empty inputs score
/// 0.0 rather than panicking.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let (dot, na, nb) = a
        .iter()
        .zip(b.iter())
        .fold((0.0f32, 0.0f32, 0.0f32), |(d, aa, bb), (x, y)| {
            (d + (x * y), aa + (x * x), bb + (y * y))
        });

    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na.sqrt() * nb.sqrt())
    }
}
