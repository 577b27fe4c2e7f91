//! Together AI embedding endpoint

use crate::config::TogetherConfig;
use crate::embeddings::{check_batch, Embedder};
use crate::error::{LawaidError, Result};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Embedder backed by `POST {api_base}/v1/embeddings`
pub struct TogetherEmbedder {
    client: Client,
    api_base: String,
    model: String,
    api_key: String,
    dimensions: Option<usize>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

impl TogetherEmbedder {
    /// Create a new Together embedder
    ///
    /// Shares the API base and timeout with the completion provider.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(provider: &TogetherConfig, model: String, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(provider.timeout_seconds))
            .user_agent(concat!("lawaid/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LawaidError::Embedding(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized Together embedder: model={}", model);

        Ok(Self {
            client,
            api_base: provider.api_base.trim_end_matches('/').to_string(),
            model,
            api_key,
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
impl Embedder for TogetherEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/v1/embeddings", self.api_base);
        tracing::debug!("Embedding {} texts with {}", texts.len(), self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| LawaidError::Embedding(format!("Together request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LawaidError::Authentication(format!(
                "Together returned {}: {}",
                status, error_text
            ))
            .into());
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Together embeddings returned error {}: {}", status, error_text);
            return Err(LawaidError::Embedding(format!(
                "Together returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let mut body: EmbeddingResponse = response.json().await.map_err(|e| {
            LawaidError::Embedding(format!("Failed to parse embedding response: {}", e))
        })?;

        // The API may return items out of order; `index` refers to the input position.
        body.data.sort_by_key(|d| d.index);
        let vectors: Vec<Vec<f32>> = body.data.into_iter().map(|d| d.embedding).collect();

        check_batch(texts.len(), self.dimensions, &vectors)?;
        Ok(vectors)
    }

    fn model_name(&self) -> String {
        self.model.clone()
    }

    fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }
}
