//! Persistent vector index
//!
//! The index is a flat list of embedded text chunks stored as one JSON
//! document inside a directory. Search is an exhaustive cosine-similarity
//! scan, which is plenty for the few thousand chunks a legal corpus yields.
//!
//! Once loaded, an index is never mutated by the chat or server paths.
//! Only the offline ingestion command writes a new one.

use crate::embeddings::Embedder;
use crate::error::{LawaidError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// File name of the serialized index inside the index directory
pub const INDEX_FILE: &str = "index.json";

/// Current on-disk format version
pub const INDEX_FORMAT_VERSION: u32 = 1;

/// One embedded chunk of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    /// Content hash of the text
    pub id: String,
    /// Chunk text handed to the prompt
    pub text: String,
    /// Where the chunk came from (file path), if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Embedding vector
    pub embedding: Vec<f32>,
}

impl IndexedDocument {
    /// Create a document, deriving its id from the text
    pub fn new(text: impl Into<String>, source: Option<String>, embedding: Vec<f32>) -> Self {
        let text = text.into();
        Self {
            id: document_id(&text),
            text,
            source,
            embedding,
        }
    }
}

/// A search result borrowed from the index
#[derive(Debug, Clone, Copy)]
pub struct SearchHit<'a> {
    /// Matched document
    pub document: &'a IndexedDocument,
    /// Cosine similarity in -1.0..=1.0
    pub score: f32,
}

/// In-memory vector index with JSON persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndex {
    version: u32,
    embedding_model: String,
    dimensions: usize,
    documents: Vec<IndexedDocument>,
}

impl VectorIndex {
    /// Build an index from already embedded documents
    ///
    /// # Errors
    ///
    /// Returns error if `documents` is empty or the vectors disagree on length
    pub fn from_documents(
        embedding_model: impl Into<String>,
        documents: Vec<IndexedDocument>,
    ) -> Result<Self> {
        let dimensions = match documents.first() {
            Some(doc) => doc.embedding.len(),
            None => {
                return Err(LawaidError::Ingest("Cannot build an empty index".to_string()).into())
            }
        };

        if dimensions == 0 {
            return Err(LawaidError::Ingest("Embedding vectors are empty".to_string()).into());
        }

        if let Some(bad) = documents.iter().find(|d| d.embedding.len() != dimensions) {
            return Err(LawaidError::Ingest(format!(
                "Document {} has {} dimensions, expected {}",
                bad.id,
                bad.embedding.len(),
                dimensions
            ))
            .into());
        }

        Ok(Self {
            version: INDEX_FORMAT_VERSION,
            embedding_model: embedding_model.into(),
            dimensions,
            documents,
        })
    }

    /// Load the index stored in `dir`
    ///
    /// # Errors
    ///
    /// Returns `LawaidError::IndexLoad` if the file is missing, unreadable,
    /// not valid JSON, or internally inconsistent
    pub fn load(dir: &Path) -> Result<Self> {
        let path = index_file(dir);
        let load_err = |message: String| LawaidError::IndexLoad {
            path: dir.display().to_string(),
            message,
        };

        let contents = std::fs::read_to_string(&path).map_err(|e| load_err(e.to_string()))?;
        let index: VectorIndex =
            serde_json::from_str(&contents).map_err(|e| load_err(e.to_string()))?;

        if index.version != INDEX_FORMAT_VERSION {
            return Err(load_err(format!(
                "unsupported format version {} (expected {})",
                index.version, INDEX_FORMAT_VERSION
            ))
            .into());
        }

        if index
            .documents
            .iter()
            .any(|d| d.embedding.len() != index.dimensions)
        {
            return Err(load_err("document dimensions disagree with header".to_string()).into());
        }

        tracing::info!(
            "Loaded index from {}: {} documents, model={}, dimensions={}",
            dir.display(),
            index.documents.len(),
            index.embedding_model,
            index.dimensions
        );

        Ok(index)
    }

    /// Persist the index into `dir`, creating the directory if needed
    ///
    /// The file is written to a temporary name and renamed into place.
    ///
    /// # Errors
    ///
    /// Returns error on I/O or serialization failure
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let path = index_file(dir);
        let tmp = dir.join(format!("{}.tmp", INDEX_FILE));
        let json = serde_json::to_string(self)?;
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &path)?;
        tracing::info!(
            "Saved index to {} ({} documents)",
            path.display(),
            self.documents.len()
        );
        Ok(())
    }

    /// Load the index from `dir`, or seed and persist a new one if absent
    ///
    /// When the directory holds no index, `seed_text` is embedded into a
    /// one-document index which is saved before returning. An existing
    /// index is never re-seeded.
    ///
    /// # Errors
    ///
    /// Returns error if an existing index is corrupt, was built with a
    /// different embedding model or vector size, if `dir` holds files but
    /// no `index.json`, or if seeding fails
    pub async fn open_or_seed(dir: &Path, embedder: &dyn Embedder, seed_text: &str) -> Result<Self> {
        if index_file(dir).exists() {
            let index = Self::load(dir)?;
            index.ensure_model(&embedder.model_name())?;
            if let Some(dimensions) = embedder.dimensions() {
                index.ensure_dimensions(dimensions)?;
            }
            return Ok(index);
        }

        if dir.is_dir() && std::fs::read_dir(dir)?.next().is_some() {
            return Err(LawaidError::IndexIncompatible(format!(
                "{} is not empty but holds no {}; remove it or rebuild with `lawaid ingest`",
                dir.display(),
                INDEX_FILE
            ))
            .into());
        }

        tracing::warn!(
            "No index found at {}, seeding with placeholder document",
            dir.display()
        );

        let embedding = embedder.embed_query(seed_text).await?;
        let index = Self::from_documents(
            embedder.model_name(),
            vec![IndexedDocument::new(seed_text, None, embedding)],
        )?;
        index.save(dir)?;
        Ok(index)
    }

    /// Fail if the index was built with a different embedding model
    pub fn ensure_model(&self, model: &str) -> Result<()> {
        if self.embedding_model != model {
            return Err(LawaidError::IndexIncompatible(format!(
                "index was built with '{}', embedder is '{}'",
                self.embedding_model, model
            ))
            .into());
        }
        Ok(())
    }

    /// Fail if the index vectors are not `dimensions` long
    pub fn ensure_dimensions(&self, dimensions: usize) -> Result<()> {
        if self.dimensions != dimensions {
            return Err(LawaidError::IndexIncompatible(format!(
                "index has {} dimensions, embedder produces {}",
                self.dimensions, dimensions
            ))
            .into());
        }
        Ok(())
    }

    /// Rank documents by cosine similarity to `query`, returning at most `k`
    ///
    /// Ties keep insertion order.
    ///
    /// # Errors
    ///
    /// Returns `LawaidError::IndexIncompatible` if the query vector length
    /// differs from the index dimensions
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit<'_>>> {
        if query.len() != self.dimensions {
            return Err(LawaidError::IndexIncompatible(format!(
                "query has {} dimensions, index has {}",
                query.len(),
                self.dimensions
            ))
            .into());
        }

        let mut hits: Vec<SearchHit<'_>> = self
            .documents
            .iter()
            .map(|document| SearchHit {
                document,
                score: cosine_similarity(query, &document.embedding),
            })
            .collect();

        // sort_by is stable, so equal scores stay in insertion order
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        hits.truncate(k);
        Ok(hits)
    }

    /// Embedding model the index was built with
    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    /// Vector length of every document
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// All documents in insertion order
    pub fn documents(&self) -> &[IndexedDocument] {
        &self.documents
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the index holds no documents
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Path of the index file inside an index directory
pub fn index_file(dir: &Path) -> PathBuf {
    dir.join(INDEX_FILE)
}

/// Cosine similarity; zero vectors score 0.0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

fn document_id(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    digest.iter().take(8).map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{temp_dir, KeywordEmbedder};

    fn doc(text: &str, embedding: Vec<f32>) -> IndexedDocument {
        IndexedDocument::new(text, None, embedding)
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_document_id_is_stable() {
        let a = IndexedDocument::new("Section 302", None, vec![1.0]);
        let b = IndexedDocument::new("Section 302", Some("ipc.txt".to_string()), vec![2.0]);
        assert_eq!(a.id, b.id);
        assert_eq!(a.id.len(), 16);
    }

    #[test]
    fn test_from_documents_rejects_empty() {
        assert!(VectorIndex::from_documents("m", Vec::new()).is_err());
    }

    #[test]
    fn test_from_documents_rejects_mixed_dimensions() {
        let docs = vec![doc("a", vec![1.0, 0.0]), doc("b", vec![1.0])];
        assert!(VectorIndex::from_documents("m", docs).is_err());
    }

    #[test]
    fn test_search_ranks_by_similarity() {
        let docs = vec![
            doc("theft", vec![1.0, 0.0, 0.0]),
            doc("murder", vec![0.0, 1.0, 0.0]),
            doc("both", vec![0.7, 0.7, 0.0]),
        ];
        let index = VectorIndex::from_documents("m", docs).unwrap();

        let hits = index.search(&[0.0, 1.0, 0.0], 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document.text, "murder");
        assert_eq!(hits[1].document.text, "both");
    }

    #[test]
    fn test_search_ties_keep_insertion_order() {
        let docs = vec![doc("first", vec![1.0, 0.0]), doc("second", vec![1.0, 0.0])];
        let index = VectorIndex::from_documents("m", docs).unwrap();
        let hits = index.search(&[1.0, 0.0], 4).unwrap();
        assert_eq!(hits[0].document.text, "first");
        assert_eq!(hits[1].document.text, "second");
    }

    #[test]
    fn test_search_dimension_mismatch() {
        let index = VectorIndex::from_documents("m", vec![doc("a", vec![1.0, 0.0])]).unwrap();
        assert!(index.search(&[1.0], 1).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = temp_dir();
        let index_dir = dir.path().join("idx");
        let index = VectorIndex::from_documents(
            "m",
            vec![IndexedDocument::new("a", Some("a.txt".to_string()), vec![0.5, 0.5])],
        )
        .unwrap();
        index.save(&index_dir).unwrap();

        let loaded = VectorIndex::load(&index_dir).unwrap();
        assert_eq!(loaded.documents(), index.documents());
        assert_eq!(loaded.embedding_model(), "m");
        assert_eq!(loaded.dimensions(), 2);
        assert!(!index_dir.join("index.json.tmp").exists());
    }

    #[test]
    fn test_load_corrupt_file_is_error() {
        let dir = temp_dir();
        std::fs::write(dir.path().join(INDEX_FILE), "not json").unwrap();
        let err = VectorIndex::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to load index"));
    }

    #[test]
    fn test_load_rejects_future_version() {
        let dir = temp_dir();
        std::fs::write(
            dir.path().join(INDEX_FILE),
            r#"{"version":99,"embedding_model":"m","dimensions":1,"documents":[]}"#,
        )
        .unwrap();
        assert!(VectorIndex::load(dir.path()).is_err());
    }

    #[tokio::test]
    async fn test_open_or_seed_creates_then_reuses() {
        let dir = temp_dir();
        let index_dir = dir.path().join("faiss_index");
        let embedder = KeywordEmbedder::new();

        let seeded = VectorIndex::open_or_seed(&index_dir, &embedder, "sample legal document")
            .await
            .unwrap();
        assert_eq!(seeded.len(), 1);
        assert_eq!(seeded.documents()[0].text, "sample legal document");
        assert!(index_file(&index_dir).exists());
        assert_eq!(embedder.calls(), 1);

        let reopened = VectorIndex::open_or_seed(&index_dir, &embedder, "other seed")
            .await
            .unwrap();
        assert_eq!(reopened.documents(), seeded.documents());
        assert_eq!(embedder.calls(), 1);
    }

    #[tokio::test]
    async fn test_open_or_seed_rejects_other_model() {
        let dir = temp_dir();
        VectorIndex::from_documents("other-model", vec![doc("a", vec![1.0; 8])])
            .unwrap()
            .save(dir.path())
            .unwrap();

        let embedder = KeywordEmbedder::new();
        let err = VectorIndex::open_or_seed(dir.path(), &embedder, "seed")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("incompatible"));
    }

    #[tokio::test]
    async fn test_open_or_seed_rejects_other_dimensions() {
        let dir = temp_dir();
        VectorIndex::from_documents("keyword-test", vec![doc("a", vec![1.0, 0.0, 0.0])])
            .unwrap()
            .save(dir.path())
            .unwrap();

        let embedder = KeywordEmbedder::new();
        let err = VectorIndex::open_or_seed(dir.path(), &embedder, "seed")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("index has 3 dimensions, embedder produces 8"));
        assert_eq!(embedder.calls(), 0);
    }

    #[tokio::test]
    async fn test_open_or_seed_refuses_foreign_directory() {
        let dir = temp_dir();
        std::fs::write(dir.path().join("index.faiss"), b"\x00").unwrap();
        std::fs::write(dir.path().join("index.pkl"), b"\x80").unwrap();

        let embedder = KeywordEmbedder::new();
        let err = VectorIndex::open_or_seed(dir.path(), &embedder, "seed")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("holds no index.json"));
        assert_eq!(embedder.calls(), 0);
        assert!(!index_file(dir.path()).exists());
    }

    #[tokio::test]
    async fn test_open_or_seed_seeds_empty_existing_directory() {
        let dir = temp_dir();
        let embedder = KeywordEmbedder::new();
        let index = VectorIndex::open_or_seed(dir.path(), &embedder, "sample legal document")
            .await
            .unwrap();
        assert_eq!(index.len(), 1);
        assert!(index_file(dir.path()).exists());
    }
}
