//! Together AI provider implementation for LawAid
//!
//! Calls the hosted `/v1/completions` endpoint with a fully composed
//! prompt. Authentication is a bearer API key resolved from the
//! environment at construction time.

use crate::config::TogetherConfig;
use crate::error::{LawaidError, Result};
use crate::providers::{CompletionResponse, Provider, SamplingParams, TokenUsage};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Together AI completion provider
///
/// # Examples
///
/// ```no_run
/// use lawaid::config::TogetherConfig;
/// use lawaid::providers::{Provider, SamplingParams, TogetherProvider};
///
/// # async fn example() -> lawaid::error::Result<()> {
/// let provider = TogetherProvider::new(TogetherConfig::default(), "api-key".to_string())?;
/// let completion = provider
///     .complete("What is Section 302?", &SamplingParams::default())
///     .await?;
/// println!("{}", completion.text);
/// # Ok(())
/// # }
/// ```
pub struct TogetherProvider {
    client: Client,
    config: TogetherConfig,
    api_key: String,
}

/// Request body for `/v1/completions`
#[derive(Debug, Serialize)]
struct TogetherCompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f32,
    max_tokens: u32,
}

/// Response body from `/v1/completions`
#[derive(Debug, Deserialize)]
struct TogetherCompletionResponse {
    #[serde(default)]
    choices: Vec<TogetherChoice>,
    #[serde(default)]
    usage: Option<TogetherUsage>,
}

#[derive(Debug, Deserialize)]
struct TogetherChoice {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct TogetherUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

impl TogetherProvider {
    /// Create a new Together provider
    ///
    /// # Arguments
    ///
    /// * `config` - Model, API base and timeout settings
    /// * `api_key` - Bearer key for the API
    ///
    /// # Errors
    ///
    /// Returns error if the key is blank or the HTTP client cannot be built
    pub fn new(config: TogetherConfig, api_key: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(LawaidError::MissingCredentials("together".to_string()).into());
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("lawaid/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LawaidError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Together provider: api_base={}, model={}",
            config.api_base,
            config.model
        );

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Create a provider, reading the key from the configured environment variable
    ///
    /// # Errors
    ///
    /// Returns `LawaidError::MissingCredentials` if the variable is not set
    pub fn from_env(config: TogetherConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        Self::new(config, api_key)
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/completions", self.config.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl Provider for TogetherProvider {
    async fn complete(
        &self,
        prompt: &str,
        params: &SamplingParams,
    ) -> Result<CompletionResponse> {
        let request = TogetherCompletionRequest {
            model: &self.config.model,
            prompt,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        tracing::debug!(
            "Sending Together completion request: model={}, prompt_chars={}",
            self.config.model,
            prompt.len()
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Together request failed: {}", e);
                LawaidError::Provider(format!("Together request failed: {}", e))
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Together rejected credentials ({}): {}", status, error_text);
            return Err(LawaidError::Authentication(format!(
                "Together returned {}: {}",
                status, error_text
            ))
            .into());
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Together returned error {}: {}", status, error_text);
            return Err(LawaidError::Provider(format!(
                "Together returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let body: TogetherCompletionResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Together response: {}", e);
            LawaidError::Provider(format!("Failed to parse Together response: {}", e))
        })?;

        let text = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .ok_or_else(|| {
                LawaidError::Provider("Together response contained no choices".to_string())
            })?;

        let response = match body.usage {
            Some(usage) => {
                let usage = TokenUsage::new(usage.prompt_tokens, usage.completion_tokens);
                tracing::debug!(
                    "Together usage: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens,
                    usage.completion_tokens
                );
                CompletionResponse::with_usage(text, usage)
            }
            None => CompletionResponse::new(text),
        };

        Ok(response)
    }

    fn model_name(&self) -> String {
        self.config.model.clone()
    }
}
