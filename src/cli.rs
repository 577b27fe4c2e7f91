//! Command-line interface definition for LawAid
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for chat, the HTTP server, ingestion and the
//! complaint form.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::ingest::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};

/// LawAid - legal assistant for Indian Penal Code questions
///
/// Answers questions by retrieving relevant legal text and asking a
/// hosted language model, from the terminal or over HTTP.
#[derive(Parser, Debug, Clone)]
#[command(name = "lawaid")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for LawAid
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive legal chat in the terminal
    Chat {
        /// Override the provider from config (together, ollama)
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// Serve the chat page and JSON API over HTTP
    Serve {
        /// Override the provider from config (together, ollama)
        #[arg(short, long)]
        provider: Option<String>,

        /// Address to listen on, e.g. 127.0.0.1:8080
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Build a new index from .txt and .md files
    Ingest {
        /// Files or directories to read
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Maximum characters per chunk
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Characters shared between consecutive chunks
        #[arg(long, default_value_t = DEFAULT_CHUNK_OVERLAP)]
        chunk_overlap: usize,

        /// Write the index here instead of the configured path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fill in a contractual complaint form
    Complaint,
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            command: Commands::Chat { provider: None },
        }
    }
}
