//! Error types for the load coordinator, chat pipeline and actor plumbing.

use thiserror::Error;

/// Failure of a remote fetch boundary.
///
/// Observers only ever see these inside a `Failed` state; nothing in the crate
/// propagates them as an unwinding error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    /// Transport unreachable or timed out.
    #[error("Network error: {0}")]
    Network(String),

    /// The payload arrived but could not be understood.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Image bytes were malformed or in an unsupported format.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Retryable by user action only.
    #[error("Transient error: {0}")]
    Transient(String),
}

impl LoadError {
    /// The bare detail text, without the category prefix.
    pub fn detail(&self) -> &str {
        match self {
            LoadError::Network(d)
            | LoadError::Parse(d)
            | LoadError::Decode(d)
            | LoadError::Transient(d) => d,
        }
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::Parse(e.to_string())
    }
}

/// Errors from talking to an actor over its channel.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActorError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
}

/// Errors surfaced by the chat client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("Turn not found: {0}")]
    TurnNotFound(String),

    /// The requested operation is not valid from the turn's current state.
    #[error("Invalid transition for {turn_id}: cannot {operation} while {state}")]
    InvalidTransition {
        turn_id: String,
        operation: &'static str,
        state: String,
    },

    #[error("Actor communication error: {0}")]
    Actor(#[from] ActorError),
}

/// Rejected configuration values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
