//! Embedding endpoints for LawAid
//!
//! Text is turned into vectors by a remote service. The `Embedder` trait
//! hides which service; the index and retriever only see vectors.

pub mod ollama;
pub mod together;

pub use ollama::OllamaEmbedder;
pub use together::TogetherEmbedder;

use crate::config::Config;
use crate::error::{LawaidError, Result};
use async_trait::async_trait;

/// Embedding function used by the index store and the retriever
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, returning one vector per input in input order
    ///
    /// # Errors
    ///
    /// Returns error if the remote call fails or the response does not
    /// contain one vector per input
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Identifier of the embedding model, recorded in persisted indexes
    fn model_name(&self) -> String;

    /// Vector length this embedder is known to produce, if declared
    ///
    /// Lets a persisted index be checked at startup without an embedding call.
    fn dimensions(&self) -> Option<usize> {
        None
    }

    /// Embed a single query string
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        vectors.pop().ok_or_else(|| {
            LawaidError::Embedding("Embedding response was empty".to_string()).into()
        })
    }
}

/// Create the configured embedder
///
/// # Errors
///
/// Returns error if the embedding type is unknown or credentials are missing
pub fn create_embedder(config: &Config) -> Result<Box<dyn Embedder>> {
    match config.embedding.provider_type.as_str() {
        "together" => {
            let api_key = config.provider.together.resolve_api_key()?;
            Ok(Box::new(
                TogetherEmbedder::new(
                    &config.provider.together,
                    config.embedding.together_model.clone(),
                    api_key,
                )?
                .with_dimensions(config.embedding.dimensions),
            ))
        }
        "ollama" => Ok(Box::new(
            OllamaEmbedder::new(&config.provider.ollama, config.embedding.ollama_model.clone())?
                .with_dimensions(config.embedding.dimensions),
        )),
        other => Err(LawaidError::Embedding(format!("Unknown embedding type: {}", other)).into()),
    }
}

/// Check that a response carried exactly one vector per input, each of the
/// declared length when one is configured
pub(crate) fn check_batch(
    expected: usize,
    dimensions: Option<usize>,
    vectors: &[Vec<f32>],
) -> Result<()> {
    if vectors.len() != expected {
        return Err(LawaidError::Embedding(format!(
            "Expected {} embeddings, received {}",
            expected,
            vectors.len()
        ))
        .into());
    }
    if vectors.iter().any(|v| v.is_empty()) {
        return Err(LawaidError::Embedding("Received an empty embedding vector".to_string()).into());
    }
    if let Some(dimensions) = dimensions {
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimensions) {
            return Err(LawaidError::Embedding(format!(
                "Received a {}-dimension vector, embedding.dimensions is {}",
                bad.len(),
                dimensions
            ))
            .into());
        }
    }
    Ok(())
}
