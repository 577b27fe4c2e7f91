use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Keywords mapped onto embedding axes by the fake embedding endpoints
const AXES: [&str; 4] = ["theft", "murder", "bail", "sample"];

/// Deterministic vector for a text, one axis per keyword
#[allow(dead_code)]
pub fn keyword_vector(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    let mut v: Vec<f32> = AXES.iter().map(|k| lower.matches(k).count() as f32).collect();
    if v.iter().all(|x| *x == 0.0) {
        v = vec![0.1; AXES.len()];
    }
    v
}

fn inputs(request: &Request) -> Vec<String> {
    let body: Value = serde_json::from_slice(&request.body).expect("embedding request is JSON");
    match &body["input"] {
        Value::Array(items) => items
            .iter()
            .map(|i| i.as_str().unwrap_or_default().to_string())
            .collect(),
        Value::String(s) => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Answers Together `/v1/embeddings` with keyword vectors, in reverse order
/// so that clients must sort by `index`
#[allow(dead_code)]
pub struct TogetherEmbeddings;

impl Respond for TogetherEmbeddings {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let data: Vec<Value> = inputs(request)
            .iter()
            .enumerate()
            .rev()
            .map(|(i, text)| json!({ "object": "embedding", "index": i, "embedding": keyword_vector(text) }))
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({ "object": "list", "data": data }))
    }
}

/// Answers Ollama `/api/embed` with keyword vectors
#[allow(dead_code)]
pub struct OllamaEmbeddings;

impl Respond for OllamaEmbeddings {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let embeddings: Vec<Vec<f32>> = inputs(request).iter().map(|t| keyword_vector(t)).collect();
        ResponseTemplate::new(200).set_body_json(json!({ "model": "nomic-embed-text", "embeddings": embeddings }))
    }
}

/// Mounts a Together completion that always answers `text`
#[allow(dead_code)]
pub async fn mount_together_completion(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cmpl-1",
            "object": "text_completion",
            "choices": [{ "index": 0, "text": text, "finish_reason": "stop" }],
            "usage": { "prompt_tokens": 120, "completion_tokens": 30, "total_tokens": 150 }
        })))
        .mount(server)
        .await;
}

/// Mounts the Together embedding endpoint
#[allow(dead_code)]
pub async fn mount_together_embeddings(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(TogetherEmbeddings)
        .mount(server)
        .await;
}
