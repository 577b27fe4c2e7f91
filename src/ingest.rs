//! Offline index building
//!
//! Reads plain-text legal sources, splits them into overlapping chunks,
//! embeds the chunks in batches and writes a fresh index directory.

use crate::embeddings::Embedder;
use crate::error::{LawaidError, Result};
use crate::index::{IndexedDocument, VectorIndex};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Default maximum chunk length, in characters
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Default overlap between consecutive chunks, in characters
pub const DEFAULT_CHUNK_OVERLAP: usize = 64;

/// Number of chunks sent per embedding request
pub const EMBED_BATCH_SIZE: usize = 32;

/// File extensions read during ingestion
pub const INGEST_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// Separators tried, in order, when looking for a chunk boundary
const SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

/// Chunking parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkOptions {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl ChunkOptions {
    /// Validated chunking options
    ///
    /// # Errors
    ///
    /// Returns error if `chunk_size` is zero or not larger than the overlap
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(LawaidError::Ingest("chunk size must be greater than 0".to_string()).into());
        }
        if chunk_overlap >= chunk_size {
            return Err(LawaidError::Ingest(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                chunk_overlap, chunk_size
            ))
            .into());
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// Summary of an ingestion run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub files: usize,
    pub chunks: usize,
    pub dimensions: usize,
}

/// Splits text into chunks of at most `chunk_size` characters
///
/// Boundaries prefer blank lines, then line breaks, then spaces, as long
/// as the resulting chunk is at least half full. Consecutive chunks share
/// up to `chunk_overlap` characters. Blank chunks are dropped.
///
/// # Examples
///
/// ```
/// use lawaid::ingest::{split_text, ChunkOptions};
///
/// let opts = ChunkOptions::new(20, 0).unwrap();
/// let chunks = split_text("Section 378.\n\nTheft is defined here.", opts);
/// assert_eq!(chunks, vec!["Section 378.", "Theft is defined", "here."]);
/// ```
pub fn split_text(text: &str, opts: ChunkOptions) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + opts.chunk_size).min(chars.len());
        let cut = if end == chars.len() {
            end
        } else {
            start + find_boundary(&chars[start..end]).unwrap_or(end - start)
        };

        let chunk: String = chars[start..cut].iter().collect();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }

        if cut == chars.len() {
            break;
        }

        let next = cut.saturating_sub(opts.chunk_overlap);
        start = if next > start { next } else { cut };
    }

    chunks
}

/// Offset just past the last preferred separator in the back half of `window`
fn find_boundary(window: &[char]) -> Option<usize> {
    let min = window.len() / 2;
    SEPARATORS.iter().find_map(|sep| {
        let sep: Vec<char> = sep.chars().collect();
        (min..window.len().saturating_sub(sep.len() - 1))
            .rev()
            .find(|&i| window[i..i + sep.len()] == sep[..])
            .map(|i| i + sep.len())
    })
}

fn is_ingestible(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| INGEST_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

/// Expands files and directories into the sorted list of text files to read
///
/// # Errors
///
/// Returns error if a path does not exist
pub fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if !path.exists() {
            return Err(
                LawaidError::Ingest(format!("Path does not exist: {}", path.display())).into(),
            );
        }

        if path.is_file() {
            if is_ingestible(path) {
                files.push(path.clone());
            } else {
                tracing::warn!("Skipping unsupported file: {}", path.display());
            }
            continue;
        }

        for entry in WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if entry.file_type().is_file() && is_ingestible(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Reads, chunks and embeds `paths` into a new in-memory index
///
/// # Errors
///
/// Returns error if a file cannot be read, nothing was found to index, or
/// embedding fails
pub async fn build_index(
    paths: &[PathBuf],
    opts: ChunkOptions,
    embedder: &dyn Embedder,
) -> Result<(VectorIndex, IngestReport)> {
    let files = collect_files(paths)?;
    if files.is_empty() {
        return Err(LawaidError::Ingest("No .txt or .md files found".to_string()).into());
    }

    let mut pending: Vec<(String, String)> = Vec::new();
    for file in &files {
        let text = std::fs::read_to_string(file)?;
        let chunks = split_text(&text, opts);
        tracing::debug!("{}: {} chunks", file.display(), chunks.len());
        let source = file.display().to_string();
        pending.extend(chunks.into_iter().map(|c| (c, source.clone())));
    }

    if pending.is_empty() {
        return Err(LawaidError::Ingest("Input files contain no text".to_string()).into());
    }

    tracing::info!(
        "Embedding {} chunks from {} files with {}",
        pending.len(),
        files.len(),
        embedder.model_name()
    );

    let mut documents = Vec::with_capacity(pending.len());
    for (batch_no, batch) in pending.chunks(EMBED_BATCH_SIZE).enumerate() {
        let texts: Vec<String> = batch.iter().map(|(text, _)| text.clone()).collect();
        let vectors = embedder.embed(&texts).await?;
        if vectors.len() != batch.len() {
            return Err(LawaidError::Embedding(format!(
                "batch {} returned {} vectors for {} chunks",
                batch_no,
                vectors.len(),
                batch.len()
            ))
            .into());
        }
        documents.extend(
            batch
                .iter()
                .zip(vectors)
                .map(|((text, source), v)| IndexedDocument::new(text.clone(), Some(source.clone()), v)),
        );
    }

    let index = VectorIndex::from_documents(embedder.model_name(), documents)?;
    let report = IngestReport {
        files: files.len(),
        chunks: index.len(),
        dimensions: index.dimensions(),
    };
    Ok((index, report))
}

/// Builds an index from `paths` and writes it to `index_dir`
///
/// The previous index in `index_dir`, if any, is replaced only after the
/// new one has been fully built.
///
/// # Errors
///
/// Returns error if building or saving fails
pub async fn ingest(
    paths: &[PathBuf],
    index_dir: &Path,
    opts: ChunkOptions,
    embedder: &dyn Embedder,
) -> Result<IngestReport> {
    let (index, report) = build_index(paths, opts, embedder).await?;
    index.save(index_dir)?;
    tracing::info!(
        "Ingested {} files into {} chunks at {}",
        report.files,
        report.chunks,
        index_dir.display()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_error_contains, create_test_file, temp_dir, KeywordEmbedder};

    #[test]
    fn test_chunk_options_validation() {
        assert!(ChunkOptions::new(0, 0).is_err());
        assert!(ChunkOptions::new(64, 64).is_err());
        assert!(ChunkOptions::new(64, 8).is_ok());
        assert_eq!(ChunkOptions::default().chunk_size, 1024);
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunks = split_text("  Section 420: cheating.  ", ChunkOptions::default());
        assert_eq!(chunks, vec!["Section 420: cheating."]);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        assert!(split_text("", ChunkOptions::default()).is_empty());
        assert!(split_text(" \n\n ", ChunkOptions::default()).is_empty());
    }

    #[test]
    fn test_chunks_respect_size() {
        let text = "word ".repeat(500);
        let opts = ChunkOptions::new(100, 10).unwrap();
        let chunks = split_text(&text, opts);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 100));
    }

    #[test]
    fn test_prefers_paragraph_boundary() {
        let first = "a".repeat(30);
        let second = "b ".repeat(30);
        let text = format!("{}\n\n{}", first, second);
        let chunks = split_text(&text, ChunkOptions::new(50, 0).unwrap());
        assert_eq!(chunks[0], first);
    }

    #[test]
    fn test_overlap_repeats_tail() {
        let text: String = ('a'..='z').collect();
        let chunks = split_text(&text, ChunkOptions::new(10, 3).unwrap());
        assert_eq!(chunks[0], "abcdefghij");
        assert_eq!(chunks[1], "hijklmnopq");
        assert!(chunks.last().unwrap().ends_with('z'));
    }

    #[test]
    fn test_unbroken_text_splits_hard() {
        let text = "x".repeat(25);
        let chunks = split_text(&text, ChunkOptions::new(10, 0).unwrap());
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn test_multibyte_text() {
        let text = "धारा ".repeat(40);
        let chunks = split_text(&text, ChunkOptions::new(30, 5).unwrap());
        assert!(chunks.iter().all(|c| c.chars().count() <= 30));
    }

    #[test]
    fn test_collect_files_filters_extensions() {
        let dir = temp_dir();
        create_test_file(&dir, "ipc/theft.txt", "theft");
        create_test_file(&dir, "ipc/notes.md", "notes");
        create_test_file(&dir, "ipc/scan.pdf", "binary");
        let files = collect_files(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| is_ingestible(f)));
    }

    #[test]
    fn test_collect_files_missing_path() {
        let dir = temp_dir();
        assert_error_contains(
            collect_files(&[dir.path().join("nope")]),
            "Path does not exist",
        );
    }

    #[tokio::test]
    async fn test_ingest_writes_loadable_index() {
        let dir = temp_dir();
        create_test_file(&dir, "src/theft.txt", "Section 378. Theft of movable property.");
        create_test_file(&dir, "src/murder.md", "Section 302. Punishment for murder.");
        let index_dir = dir.path().join("faiss_index");
        let embedder = KeywordEmbedder::new();

        let report = ingest(
            &[dir.path().join("src")],
            &index_dir,
            ChunkOptions::default(),
            &embedder,
        )
        .await
        .unwrap();

        assert_eq!(report.files, 2);
        assert_eq!(report.chunks, 2);
        let index = VectorIndex::load(&index_dir).unwrap();
        assert_eq!(index.embedding_model(), "keyword-test");
        assert!(index
            .documents()
            .iter()
            .all(|d| d.source.as_deref().unwrap_or("").contains("src")));
    }

    #[tokio::test]
    async fn test_ingest_batches_embedding_calls() {
        let dir = temp_dir();
        let text = (0..70)
            .map(|i| format!("Paragraph {} about bail.", i))
            .collect::<Vec<_>>()
            .join("\n\n");
        create_test_file(&dir, "bail.txt", &text);
        let embedder = KeywordEmbedder::new();

        let (index, _) = build_index(
            &[dir.path().to_path_buf()],
            ChunkOptions::new(30, 0).unwrap(),
            &embedder,
        )
        .await
        .unwrap();

        assert_eq!(index.len(), 70);
        assert_eq!(embedder.calls(), 3);
    }

    #[tokio::test]
    async fn test_ingest_empty_directory_fails() {
        let dir = temp_dir();
        let embedder = KeywordEmbedder::new();
        let result = build_index(&[dir.path().to_path_buf()], ChunkOptions::default(), &embedder).await;
        assert!(result.is_err());
        assert_eq!(embedder.calls(), 0);
    }
}
