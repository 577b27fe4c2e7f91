//! Provider module for LawAid
//!
//! This module contains the completion provider abstraction and
//! implementations for Together AI and Ollama.

pub mod base;
pub mod ollama;
pub mod together;

pub use base::{CompletionResponse, Provider, SamplingParams, TokenUsage};
pub use ollama::OllamaProvider;
pub use together::TogetherProvider;

use crate::config::ProviderConfig;
use crate::error::{LawaidError, Result};

/// Create a provider instance based on configuration
///
/// The Together provider resolves its API key here, so a missing key
/// fails at startup rather than on the first question.
///
/// # Arguments
///
/// * `config` - Provider configuration
///
/// # Errors
///
/// Returns error if provider type is invalid, credentials are missing,
/// or initialization fails
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn Provider>> {
    match config.provider_type.as_str() {
        "together" => Ok(Box::new(TogetherProvider::from_env(
            config.together.clone(),
        )?)),
        "ollama" => Ok(Box::new(OllamaProvider::new(config.ollama.clone())?)),
        other => Err(LawaidError::Provider(format!("Unknown provider type: {}", other)).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OllamaConfig, TogetherConfig};

    #[test]
    fn test_create_provider_invalid_type() {
        let config = ProviderConfig {
            provider_type: "invalid".to_string(),
            together: TogetherConfig::default(),
            ollama: OllamaConfig::default(),
        };

        assert!(create_provider(&config).is_err());
    }

    #[test]
    fn test_create_provider_ollama() {
        let config = ProviderConfig {
            provider_type: "ollama".to_string(),
            together: TogetherConfig::default(),
            ollama: OllamaConfig::default(),
        };

        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.model_name(), OllamaConfig::default().model);
    }

    #[test]
    fn test_create_provider_together_requires_key() {
        let config = ProviderConfig {
            provider_type: "together".to_string(),
            together: TogetherConfig {
                api_key_env: "LAWAID_FACTORY_KEY_UNSET".to_string(),
                ..Default::default()
            },
            ollama: OllamaConfig::default(),
        };

        let err = create_provider(&config).err().unwrap();
        assert!(err.to_string().contains("LAWAID_FACTORY_KEY_UNSET"));
    }

    #[test]
    fn test_create_provider_together_with_key() {
        std::env::set_var("LAWAID_FACTORY_KEY_SET", "k");
        let config = ProviderConfig {
            provider_type: "together".to_string(),
            together: TogetherConfig {
                api_key_env: "LAWAID_FACTORY_KEY_SET".to_string(),
                ..Default::default()
            },
            ollama: OllamaConfig::default(),
        };

        assert!(create_provider(&config).is_ok());
    }
}
