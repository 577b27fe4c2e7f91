//! Retrieval-augmented answer chain
//!
//! One turn runs through fixed phases:
//! - Retrieving: embed the question and pull the closest chunks
//! - Composing: fill the prompt with context, history and question
//! - Generating: one non-streaming call to the completion provider
//! - Delivering: prefix the disclaimer and record the turn in the session

use crate::config::ChatConfig;
use crate::error::Result;
use crate::prompts;
use crate::providers::{Provider, SamplingParams, TokenUsage};
use crate::retriever::{RetrievedChunk, Retriever};
use crate::session::Session;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Phase of a chat turn, used for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    Retrieving,
    Composing,
    Generating,
    Delivering,
}

impl fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TurnPhase::Idle => "idle",
            TurnPhase::Retrieving => "retrieving",
            TurnPhase::Composing => "composing",
            TurnPhase::Generating => "generating",
            TurnPhase::Delivering => "delivering",
        };
        write!(f, "{}", name)
    }
}

/// Result of a successful turn
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    /// Answer as displayed, disclaimer included
    pub answer: String,
    /// Chunks the answer was grounded on
    pub sources: Vec<RetrievedChunk>,
    /// Token usage, when the provider reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// Coordinates retriever, prompt, provider and session memory
///
/// The chain itself is stateless and shared between sessions; all
/// per-conversation state lives in the [`Session`] passed to
/// [`ConversationalChain::answer`].
///
/// # Examples
///
/// ```ignore
/// use lawaid::chain::ConversationalChain;
/// use lawaid::session::Session;
///
/// # async fn example(chain: ConversationalChain) -> lawaid::error::Result<()> {
/// let mut session = Session::new(2);
/// let outcome = chain.answer(&mut session, "What is Section 420?").await?;
/// println!("{}", outcome.answer);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ConversationalChain {
    retriever: Retriever,
    provider: Arc<dyn Provider>,
    params: SamplingParams,
    disclaimer: String,
}

impl fmt::Debug for ConversationalChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationalChain")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl ConversationalChain {
    /// Creates a chain from its parts and the chat settings
    pub fn new(retriever: Retriever, provider: Arc<dyn Provider>, config: &ChatConfig) -> Self {
        Self {
            retriever,
            provider,
            params: SamplingParams::from_chat_config(config),
            disclaimer: config.disclaimer.clone(),
        }
    }

    /// Creates a chain with a boxed provider
    pub fn new_boxed(retriever: Retriever, provider: Box<dyn Provider>, config: &ChatConfig) -> Self {
        Self::new(retriever, Arc::from(provider), config)
    }

    /// Answers one question within `session`
    ///
    /// On success the exchange is added to the session's memory and both
    /// the question and the displayed answer to its messages.
    ///
    /// # Errors
    ///
    /// Returns the embedder or provider error that ended the turn. The
    /// session is left exactly as it was.
    pub async fn answer(&self, session: &mut Session, question: &str) -> Result<TurnOutcome> {
        let start = Instant::now();
        let session_id = session.id();

        let mut phase = TurnPhase::Retrieving;
        debug!("Session {}: {}", session_id, phase);
        let sources = self.retriever.retrieve(question).await.map_err(|e| {
            warn!("Session {}: turn failed while {}: {}", session_id, phase, e);
            e
        })?;

        phase = TurnPhase::Composing;
        debug!("Session {}: {} with {} chunks", session_id, phase, sources.len());
        let context: Vec<&str> = sources.iter().map(|c| c.text.as_str()).collect();
        let prompt = prompts::compose(&context, &session.memory().render(), question);

        phase = TurnPhase::Generating;
        debug!(
            "Session {}: {} with {} ({} prompt chars)",
            session_id,
            phase,
            self.provider.model_name(),
            prompt.len()
        );
        let completion = self
            .provider
            .complete(&prompt, &self.params)
            .await
            .map_err(|e| {
                warn!("Session {}: turn failed while {}: {}", session_id, phase, e);
                e
            })?;

        phase = TurnPhase::Delivering;
        debug!("Session {}: {}", session_id, phase);
        let raw = completion.text.trim().to_string();
        let displayed = format!("{}{}", self.disclaimer, raw);
        session.record_turn(question, &raw, &displayed);

        info!(
            "Session {}: answered in {:?} ({} sources, memory {}/{})",
            session_id,
            start.elapsed(),
            sources.len(),
            session.memory().len(),
            session.memory().window()
        );
        debug!("Session {}: {}", session_id, TurnPhase::Idle);

        Ok(TurnOutcome {
            answer: displayed,
            sources,
            usage: completion.usage,
        })
    }

    /// The retriever this chain queries
    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Sampling parameters sent with every completion
    pub fn params(&self) -> SamplingParams {
        self.params
    }

    /// Disclaimer prefixed to every answer
    pub fn disclaimer(&self) -> &str {
        &self.disclaimer
    }
}
