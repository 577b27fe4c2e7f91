//! Similarity retriever over the vector index

use crate::config::MAX_TOP_K;
use crate::embeddings::Embedder;
use crate::error::Result;
use crate::index::VectorIndex;
use serde::Serialize;
use std::sync::Arc;

/// A chunk of legal text returned for a query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedChunk {
    /// Chunk text
    pub text: String,
    /// Originating file, if recorded at ingestion
    pub source: Option<String>,
    /// Cosine similarity to the query
    pub score: f32,
}

/// Returns the `top_k` most similar chunks for a query
///
/// The index and embedder are shared read-only; a retriever is cheap to
/// clone across sessions.
#[derive(Clone)]
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl Retriever {
    /// Create a retriever; `top_k` is clamped to `1..=4`
    pub fn new(index: Arc<VectorIndex>, embedder: Arc<dyn Embedder>, top_k: usize) -> Self {
        let clamped = top_k.clamp(1, MAX_TOP_K);
        if clamped != top_k {
            tracing::warn!("top_k {} out of range, using {}", top_k, clamped);
        }
        Self {
            index,
            embedder,
            top_k: clamped,
        }
    }

    /// Embed `query` and return at most `top_k` chunks, most similar first
    ///
    /// # Errors
    ///
    /// Returns error if embedding fails or the query vector does not match
    /// the index dimensions
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedChunk>> {
        let vector = self.embedder.embed_query(query).await?;
        let hits = self.index.search(&vector, self.top_k)?;

        tracing::debug!(
            "Retrieved {} chunks (best score {:.3})",
            hits.len(),
            hits.first().map(|h| h.score).unwrap_or(0.0)
        );

        Ok(hits
            .into_iter()
            .map(|hit| RetrievedChunk {
                text: hit.document.text.clone(),
                source: hit.document.source.clone(),
                score: hit.score,
            })
            .collect())
    }

    /// Number of chunks returned per query
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// The underlying index
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }
}
