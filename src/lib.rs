//! LawAID - retrieval-augmented legal assistant library
//!
//! This library answers Indian Penal Code questions by retrieving
//! relevant legal text from a local vector index and asking a hosted
//! language model, keeping a short memory of the conversation.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `index`: Persistent vector index with cosine search
//! - `embeddings`: Remote embedding endpoints (Together, Ollama)
//! - `retriever`: Top-k similarity retrieval over the index
//! - `prompts`: The legal prompt template
//! - `providers`: Completion provider abstraction and implementations
//! - `chain`: Conversation memory and the answer chain
//! - `session`: Per-user sessions and the session registry
//! - `intake`: Contractual complaint validation
//! - `ingest`: Offline chunking and index building
//! - `server`: HTTP chat page and JSON API
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use lawaid::cli::Cli;
//! use lawaid::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Cli::default())?;
//!     config.validate()?;
//!
//!     let chain = lawaid::commands::build_chain(&config).await?;
//!     let mut session = lawaid::Session::new(config.chat.memory_window);
//!     let outcome = chain.answer(&mut session, "What is Section 420?").await?;
//!     println!("{}", outcome.answer);
//!     Ok(())
//! }
//! ```

pub mod chain;
pub mod cli;
pub mod commands;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod index;
pub mod ingest;
pub mod intake;
pub mod prompts;
pub mod providers;
pub mod retriever;
pub mod server;
pub mod session;

// Re-export commonly used types
pub use chain::{ConversationMemory, ConversationalChain, TurnOutcome};
pub use config::Config;
pub use error::{LawaidError, Result};
pub use index::VectorIndex;
pub use retriever::{RetrievedChunk, Retriever};
pub use session::{ChatMessage, Session, SessionStore};

#[cfg(test)]
pub mod test_utils;
