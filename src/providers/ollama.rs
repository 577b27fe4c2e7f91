//! Ollama provider implementation for LawAid
//!
//! This module implements the Provider trait for Ollama, connecting to a local
//! or remote Ollama server and calling `/api/generate` with a raw prompt.

use crate::config::OllamaConfig;
use crate::error::{LawaidError, Result};
use crate::providers::{CompletionResponse, Provider, SamplingParams, TokenUsage};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ollama API provider
///
/// The prompt template already carries the instruction markers, so requests
/// are sent with `raw: true` to skip Ollama's own chat templating.
///
/// # Examples
///
/// ```no_run
/// use lawaid::config::OllamaConfig;
/// use lawaid::providers::{OllamaProvider, Provider, SamplingParams};
///
/// # async fn example() -> lawaid::error::Result<()> {
/// let provider = OllamaProvider::new(OllamaConfig::default())?;
/// let completion = provider.complete("Hello", &SamplingParams::default()).await?;
/// println!("{}", completion.text);
/// # Ok(())
/// # }
/// ```
pub struct OllamaProvider {
    client: Client,
    config: OllamaConfig,
}

/// Request structure for Ollama's /api/generate
#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    raw: bool,
    options: OllamaOptions,
}

/// Sampling options in Ollama format
#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Response structure from Ollama's /api/generate
#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    prompt_eval_count: usize,
    #[serde(default)]
    eval_count: usize,
}

impl OllamaProvider {
    /// Create a new Ollama provider instance
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use lawaid::config::OllamaConfig;
    /// use lawaid::providers::OllamaProvider;
    ///
    /// let provider = OllamaProvider::new(OllamaConfig::default());
    /// assert!(provider.is_ok());
    /// ```
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("lawaid/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LawaidError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Ollama provider: host={}, model={}",
            config.host,
            config.model
        );

        Ok(Self { client, config })
    }

    /// Get the configured Ollama host
    pub fn host(&self) -> &str {
        &self.config.host
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    async fn complete(
        &self,
        prompt: &str,
        params: &SamplingParams,
    ) -> Result<CompletionResponse> {
        let url = format!("{}/api/generate", self.config.host.trim_end_matches('/'));

        let request = OllamaGenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            raw: true,
            options: OllamaOptions {
                temperature: params.temperature,
                num_predict: params.max_tokens,
            },
        };

        tracing::debug!(
            "Sending Ollama generate request: model={}, prompt_chars={}",
            self.config.model,
            prompt.len()
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Ollama request failed: {}", e);
                LawaidError::Provider(format!("Ollama request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Ollama returned error {}: {}", status, error_text);
            return Err(LawaidError::Provider(format!(
                "Ollama returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let body: OllamaGenerateResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Ollama response: {}", e);
            LawaidError::Provider(format!("Failed to parse Ollama response: {}", e))
        })?;

        tracing::debug!(
            "Ollama response: done={}, prompt_tokens={}, completion_tokens={}",
            body.done,
            body.prompt_eval_count,
            body.eval_count
        );

        let response = if body.prompt_eval_count > 0 || body.eval_count > 0 {
            let usage = TokenUsage::new(body.prompt_eval_count, body.eval_count);
            CompletionResponse::with_usage(body.response, usage)
        } else {
            CompletionResponse::new(body.response)
        };

        Ok(response)
    }

    fn model_name(&self) -> String {
        self.config.model.clone()
    }
}
