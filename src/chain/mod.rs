//! Conversational chain for LawAid
//!
//! This module contains the bounded conversation memory and the chain that
//! turns a question into a grounded, disclaimed answer.

pub mod core;
pub mod memory;

pub use core::{ConversationalChain, TurnOutcome, TurnPhase};
pub use memory::{ConversationMemory, Exchange, DEFAULT_MEMORY_WINDOW};
