//! Chat sessions
//!
//! A session owns the displayed message list and the conversation memory
//! that feeds the prompt. The two are only changed together: a finished
//! turn appends to both, and a reset clears both.

use crate::chain::ConversationMemory;
use crate::error::{LawaidError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Author of a displayed message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A message as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Per-user conversation context
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    messages: Vec<ChatMessage>,
    memory: ConversationMemory,
}

impl Session {
    /// Create an empty session whose memory keeps `memory_window` exchanges
    pub fn new(memory_window: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            messages: Vec::new(),
            memory: ConversationMemory::new(memory_window),
        }
    }

    /// Records a completed turn
    ///
    /// `displayed` is the answer as shown to the user; `answer` is the raw
    /// model text kept in memory for later prompts.
    pub fn record_turn(&mut self, question: &str, answer: &str, displayed: &str) {
        self.messages.push(ChatMessage::user(question));
        self.messages.push(ChatMessage::assistant(displayed));
        self.memory.record(question, answer);
    }

    /// Clears messages and memory together
    pub fn reset(&mut self) {
        self.messages.clear();
        self.memory.clear();
        tracing::info!("Session {} reset", self.id);
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Displayed messages in order
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }
}

/// Shared handle to one session
pub type SessionHandle = Arc<Mutex<Session>>;

/// Registry of live sessions for the HTTP surface
///
/// Lookups take the read lock only briefly; a running turn holds just its
/// own session's mutex, so sessions never wait on each other.
///
/// # Examples
///
/// ```
/// use lawaid::SessionStore;
///
/// # tokio_test::block_on(async {
/// let store = SessionStore::new(2);
/// let id = store.create().await;
/// assert!(store.get(id).await.is_ok());
///
/// store.remove(id).await.unwrap();
/// assert!(store.get(id).await.is_err());
/// # });
/// ```
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
    memory_window: usize,
}

impl SessionStore {
    /// Create an empty store; new sessions keep `memory_window` exchanges
    pub fn new(memory_window: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            memory_window,
        }
    }

    /// Create and register a new session, returning its id
    pub async fn create(&self) -> Uuid {
        let session = Session::new(self.memory_window);
        let id = session.id();
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(session)));
        tracing::info!("Created session {}", id);
        id
    }

    /// Look up a session
    ///
    /// # Errors
    ///
    /// Returns `LawaidError::SessionNotFound` for unknown ids
    pub async fn get(&self, id: Uuid) -> Result<SessionHandle> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| LawaidError::SessionNotFound(id.to_string()).into())
    }

    /// End a session
    ///
    /// # Errors
    ///
    /// Returns `LawaidError::SessionNotFound` for unknown ids
    pub async fn remove(&self, id: Uuid) -> Result<()> {
        match self.sessions.write().await.remove(&id) {
            Some(_) => {
                tracing::info!("Ended session {}", id);
                Ok(())
            }
            None => Err(LawaidError::SessionNotFound(id.to_string()).into()),
        }
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no session is live
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new(2);
        assert!(session.messages().is_empty());
        assert!(session.memory().is_empty());
    }

    #[test]
    fn test_record_turn_appends_both_messages() {
        let mut session = Session::new(2);
        session.record_turn("What is bail?", "Release.", "Note\n\nRelease.");
        assert_eq!(
            session.messages(),
            &[
                ChatMessage::user("What is bail?"),
                ChatMessage::assistant("Note\n\nRelease."),
            ]
        );
        assert_eq!(session.memory().exchanges().next().unwrap().answer, "Release.");
    }

    #[test]
    fn test_reset_clears_messages_and_memory() {
        let mut session = Session::new(2);
        for i in 0..3 {
            session.record_turn(&format!("q{}", i), "a", "a");
        }
        session.reset();
        assert!(session.messages().is_empty());
        assert_eq!(session.memory().len(), 0);
    }

    #[test]
    fn test_messages_keep_all_turns_beyond_memory_window() {
        let mut session = Session::new(2);
        for i in 0..4 {
            session.record_turn(&format!("q{}", i), "a", "a");
        }
        assert_eq!(session.messages().len(), 8);
        assert_eq!(session.memory().len(), 2);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[tokio::test]
    async fn test_store_create_get_remove() {
        let store = SessionStore::new(2);
        assert!(store.is_empty().await);

        let id = store.create().await;
        let handle = store.get(id).await.unwrap();
        assert_eq!(handle.lock().await.id(), id);
        assert_eq!(store.len().await, 1);

        store.remove(id).await.unwrap();
        assert!(store.get(id).await.is_err());
        assert!(store.remove(id).await.is_err());
    }

    #[tokio::test]
    async fn test_store_sessions_are_isolated() {
        let store = SessionStore::new(2);
        let a = store.create().await;
        let b = store.create().await;

        store
            .get(a)
            .await
            .unwrap()
            .lock()
            .await
            .record_turn("q", "a", "a");

        assert_eq!(store.get(a).await.unwrap().lock().await.messages().len(), 2);
        assert!(store.get(b).await.unwrap().lock().await.messages().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_session_error() {
        let store = SessionStore::new(2);
        let err = store.get(Uuid::new_v4()).await.err().unwrap();
        assert!(err.to_string().contains("Session not found"));
    }
}
