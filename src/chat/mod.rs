//! # Chat Turns
//!
//! A conversation is an ordered list of turns. Each turn pairs the user's text with
//! the assistant's response lifecycle and owns its own reveal; nothing about one turn's
//! progress is shared with another.
//!
//! - [`ChatTurnStateMachine`]: per-turn lifecycle, retry protocol, reveal ownership.
//! - [`ConversationActor`]: owns the turns, talks to the [`ChatTransport`](crate::transport::ChatTransport).
//! - [`ChatClient`]: send, retry, interrupt, read and observe turns.

pub mod actor;
pub mod client;
pub mod machine;
pub mod message;

pub use actor::ConversationActor;
pub use client::ChatClient;
pub use machine::ChatTurnStateMachine;
pub use message::ChatRequest;
