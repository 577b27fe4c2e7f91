//! Bounded conversation memory
//!
//! Keeps the most recent question/answer exchanges of a session so they
//! can be rendered into the prompt's chat history. Older exchanges are
//! dropped first once the window is full.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of exchanges retained
pub const DEFAULT_MEMORY_WINDOW: usize = 2;

/// One user question and the model's answer to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    /// The user's question as typed
    pub question: String,
    /// The raw model answer, without the display disclaimer
    pub answer: String,
}

impl Exchange {
    /// Create a new exchange
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Window buffer over the last `window` exchanges
///
/// # Examples
///
/// ```
/// use lawaid::chain::ConversationMemory;
///
/// let mut memory = ConversationMemory::new(2);
/// memory.record("q1", "a1");
/// memory.record("q2", "a2");
/// memory.record("q3", "a3");
/// assert_eq!(memory.len(), 2);
/// assert_eq!(memory.exchanges().next().unwrap().question, "q2");
/// ```
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    exchanges: VecDeque<Exchange>,
    window: usize,
}

impl ConversationMemory {
    /// Creates an empty memory holding at most `window` exchanges
    ///
    /// A window of zero is treated as one.
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            exchanges: VecDeque::with_capacity(window),
            window,
        }
    }

    /// Appends an exchange, dropping the oldest ones beyond the window
    pub fn record(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.exchanges.push_back(Exchange::new(question, answer));
        while self.exchanges.len() > self.window {
            if let Some(dropped) = self.exchanges.pop_front() {
                tracing::debug!(
                    "Memory window full, dropping exchange: {}",
                    truncate_string(&dropped.question, 60)
                );
            }
        }
    }

    /// Retained exchanges, oldest first
    pub fn exchanges(&self) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter()
    }

    /// Renders the retained exchanges as chat history text for the prompt
    ///
    /// # Examples
    ///
    /// ```
    /// use lawaid::chain::ConversationMemory;
    ///
    /// let mut memory = ConversationMemory::new(2);
    /// assert_eq!(memory.render(), "");
    /// memory.record("What is bail?", "Bail is release pending trial.");
    /// assert_eq!(
    ///     memory.render(),
    ///     "Human: What is bail?\nAssistant: Bail is release pending trial."
    /// );
    /// ```
    pub fn render(&self) -> String {
        self.exchanges
            .iter()
            .map(|e| format!("Human: {}\nAssistant: {}", e.question, e.answer))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Maximum number of exchanges retained
    pub fn window(&self) -> usize {
        self.window
    }

    /// Number of exchanges currently retained
    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    /// Returns true if no exchange is retained
    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// Drops every retained exchange
    pub fn clear(&mut self) {
        self.exchanges.clear();
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_WINDOW)
    }
}

/// Truncates a string to a maximum length, adding ellipsis if truncated
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
