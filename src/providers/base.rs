//! Base provider trait and common types for LawAid
//!
//! This module defines the Provider trait that completion backends
//! implement, along with sampling parameters and response structures.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Sampling parameters sent with every completion request
///
/// Fixed per process; they come from the `chat` section of the config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum number of tokens to generate
    pub max_tokens: u32,
}

impl SamplingParams {
    /// Build sampling parameters from the chat configuration
    ///
    /// # Examples
    ///
    /// ```
    /// use lawaid::config::ChatConfig;
    /// use lawaid::providers::SamplingParams;
    ///
    /// let params = SamplingParams::from_chat_config(&ChatConfig::default());
    /// assert_eq!(params.temperature, 0.5);
    /// assert_eq!(params.max_tokens, 1024);
    /// ```
    pub fn from_chat_config(config: &crate::config::ChatConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.5,
            max_tokens: 1024,
        }
    }
}

/// Token usage information from a completion
///
/// Tracks the number of tokens used in prompts and completions,
/// as reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: usize,
    /// Number of tokens in the completion
    pub completion_tokens: usize,
    /// Total tokens used (prompt + completion)
    pub total_tokens: usize,
}

impl TokenUsage {
    /// Create a new TokenUsage instance
    ///
    /// # Examples
    ///
    /// ```
    /// use lawaid::providers::TokenUsage;
    ///
    /// let usage = TokenUsage::new(100, 50);
    /// assert_eq!(usage.total_tokens, 150);
    /// ```
    pub fn new(prompt_tokens: usize, completion_tokens: usize) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Completion response with generated text and optional token usage
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated text
    pub text: String,
    /// Optional token usage information
    pub usage: Option<TokenUsage>,
}

impl CompletionResponse {
    /// Create a new CompletionResponse
    ///
    /// # Examples
    ///
    /// ```
    /// use lawaid::providers::CompletionResponse;
    ///
    /// let response = CompletionResponse::new("Section 420 covers cheating.");
    /// assert!(response.usage.is_none());
    /// ```
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
        }
    }

    /// Create a new CompletionResponse with token usage
    pub fn with_usage(text: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            text: text.into(),
            usage: Some(usage),
        }
    }
}

/// Provider trait for completion backends
///
/// The model call is non-streaming: a provider returns the complete
/// answer text for a fully composed prompt.
///
/// # Examples
///
/// ```no_run
/// use lawaid::providers::{CompletionResponse, Provider, SamplingParams};
/// use lawaid::error::Result;
/// use async_trait::async_trait;
///
/// struct EchoProvider;
///
/// #[async_trait]
/// impl Provider for EchoProvider {
///     async fn complete(&self, prompt: &str, _params: &SamplingParams) -> Result<CompletionResponse> {
///         Ok(CompletionResponse::new(prompt))
///     }
///
///     fn model_name(&self) -> String {
///         "echo".to_string()
///     }
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// Complete a prompt
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails or the response is invalid
    async fn complete(&self, prompt: &str, params: &SamplingParams)
        -> Result<CompletionResponse>;

    /// Name of the model this provider calls
    fn model_name(&self) -> String;
}
