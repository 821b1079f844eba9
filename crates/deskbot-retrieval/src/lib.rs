//! Deskbot retrieval crate - embedding service and FAQ corpus index.
//!
//! Loads question/answer pairs from CSV, embeds them once at startup with a
//! sentence-transformer model, and answers nearest-neighbor cosine queries
//! with a configurable miss threshold.

pub mod corpus;
pub mod embedding;

pub use corpus::{CorpusIndex, FaqEntry, FaqMatch, NO_MATCH_TEXT};
pub use embedding::{DynEmbeddingService, EmbeddingService, MockEmbedding, OnnxEmbeddingService};
