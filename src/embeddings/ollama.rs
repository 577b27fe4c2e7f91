//! Ollama embedding endpoint

use crate::config::OllamaConfig;
use crate::embeddings::{check_batch, Embedder};
use crate::error::{LawaidError, Result};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Embedder backed by Ollama's `POST /api/embed`
pub struct OllamaEmbedder {
    client: Client,
    host: String,
    model: String,
    dimensions: Option<usize>,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedder
    ///
    /// Shares the host and timeout with the completion provider.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(provider: &OllamaConfig, model: String) -> Result<Self> {
        let host = provider.host.clone();
        let client = Client::builder()
            .timeout(Duration::from_secs(provider.timeout_seconds))
            .user_agent(concat!("lawaid/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LawaidError::Embedding(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized Ollama embedder: host={}, model={}", host, model);

        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            model,
            dimensions: None,
        })
    }

    /// Declare the vector length the model produces
    pub fn with_dimensions(mut self, dimensions: Option<usize>) -> Self {
        self.dimensions = dimensions;
        self
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/api/embed", self.host);
        tracing::debug!("Embedding {} texts with {}", texts.len(), self.model);

        let response = self
            .client
            .post(&url)
            .json(&EmbedRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| LawaidError::Embedding(format!("Ollama request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Ollama embed returned error {}: {}", status, error_text);
            return Err(LawaidError::Embedding(format!(
                "Ollama returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let body: EmbedResponse = response.json().await.map_err(|e| {
            LawaidError::Embedding(format!("Failed to parse Ollama embed response: {}", e))
        })?;

        check_batch(texts.len(), self.dimensions, &body.embeddings)?;
        Ok(body.embeddings)
    }

    fn model_name(&self) -> String {
        self.model.clone()
    }

    fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }
}
