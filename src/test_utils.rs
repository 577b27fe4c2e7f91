//! Test utilities for LawAid
//!
//! Temporary directories, assertion helpers, and in-process stand-ins for
//! the remote embedding and completion services.

use crate::embeddings::Embedder;
use crate::error::{LawaidError, Result};
use crate::providers::{CompletionResponse, Provider, SamplingParams};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Words the keyword embedder maps onto its eight axes
const KEYWORDS: [&str; 8] = [
    "theft", "murder", "cheating", "contract", "bail", "assault", "property", "sample",
];

/// Deterministic embedder: one axis per keyword plus call counting
///
/// Texts mentioning none of the keywords embed to a small uniform vector
/// so that cosine similarity stays defined.
pub struct KeywordEmbedder {
    calls: AtomicUsize,
}

impl KeywordEmbedder {
    /// Create a new embedder with a zero call count
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `embed` calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Embed one text synchronously
    pub fn vector_for(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let mut vector: Vec<f32> = KEYWORDS
            .iter()
            .map(|k| lower.matches(k).count() as f32)
            .collect();
        if vector.iter().all(|v| *v == 0.0) {
            vector = vec![0.01; KEYWORDS.len()];
        }
        vector
    }
}

impl Default for KeywordEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector_for(t)).collect())
    }

    fn model_name(&self) -> String {
        "keyword-test".to_string()
    }

    fn dimensions(&self) -> Option<usize> {
        Some(KEYWORDS.len())
    }
}

/// Provider that replays canned answers and records every prompt
pub struct ScriptedProvider {
    answers: Mutex<Vec<Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    /// Answers are returned in the given order; once exhausted the provider
    /// answers "default answer"
    pub fn new(answers: Vec<Result<String>>) -> Self {
        let mut answers = answers;
        answers.reverse();
        Self {
            answers: Mutex::new(answers),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Provider that fails every call with a provider error
    pub fn failing() -> Self {
        Self::new(vec![Err(LawaidError::Provider(
            "simulated outage".to_string(),
        )
        .into())])
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn complete(
        &self,
        prompt: &str,
        _params: &SamplingParams,
    ) -> Result<CompletionResponse> {
        self.prompts
            .lock()
            .expect("prompts lock")
            .push(prompt.to_string());
        let next = self.answers.lock().expect("answers lock").pop();
        match next {
            Some(Ok(text)) => Ok(CompletionResponse::new(text)),
            Some(Err(e)) => Err(e),
            None => Ok(CompletionResponse::new("default answer")),
        }
    }

    fn model_name(&self) -> String {
        "scripted".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "nested/test.txt", "content");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "content");
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<()> = Err(LawaidError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        let result: Result<()> = Ok(());
        assert_error_contains(result, "error");
    }

    #[test]
    fn test_keyword_embedder_axes() {
        let v = KeywordEmbedder::vector_for("Theft of property");
        assert_eq!(v[0], 1.0);
        assert_eq!(v[6], 1.0);
        assert_eq!(v[1], 0.0);
    }

    #[tokio::test]
    async fn test_scripted_provider_order() {
        let provider = ScriptedProvider::new(vec![Ok("one".to_string()), Ok("two".to_string())]);
        let params = SamplingParams::default();
        assert_eq!(provider.complete("a", &params).await.unwrap().text, "one");
        assert_eq!(provider.complete("b", &params).await.unwrap().text, "two");
        assert_eq!(
            provider.complete("c", &params).await.unwrap().text,
            "default answer"
        );
        assert_eq!(provider.prompts(), vec!["a", "b", "c"]);
    }
}
