//! # Cosmos Core
//!
//! > **Async state for a space-content app: resource loading and paced chat replies.**
//!
//! Views on several form factors (phone, TV, desktop) render the same data at the same
//! time. This crate is the part behind them that fetches, tracks and publishes that data,
//! so views only ever read snapshots.
//!
//! ## 🏗️ Design
//!
//! ### Slots with request tokens
//! Every remote resource lives in a [`ResourceSlot`](slot::ResourceSlot):
//! `Idle → Loading → Ready | Failed`. Each load mints a token; only the completion carrying
//! the latest token is applied. Refreshing never lets an older fetch overwrite a newer one.
//!
//! ### Actors as the single writer
//! The [`LoadCoordinator`](coordinator::LoadCoordinator) and the
//! [`ConversationActor`](chat::ConversationActor) each run in their own Tokio task and
//! process messages sequentially. Their state needs no locks; views talk to them through
//! cloneable clients and observe them through subscriptions.
//!
//! ### Per-turn reveal
//! Each chat turn owns its own [`RevealController`](reveal::RevealController) and attempt
//! counter. Retrying a failed turn cancels whatever belonged to the old attempt and
//! re-sends the same text under the same turn id.
//!
//! ### Errors are state
//! Fetch boundaries turn every failure into a `Failed` slot or turn. Nothing unwinds into
//! an observer, and nothing is retried automatically.
//!
//! ## 🗺️ Module Tour
//!
//! - [`slot`]: `ResourceSlot`, observer registry, subscriptions.
//! - [`preload`]: `ImagePreloader` and the image decoding boundary.
//! - [`coordinator`]: picture, image and events loading.
//! - [`reveal`]: word-paced progressive reveal.
//! - [`chat`]: turn state machine, conversation actor, client.
//! - [`transport`]: collaborator traits the host implements.
//! - [`lifecycle`]: [`SpaceSystem`](lifecycle::SpaceSystem) wiring and tracing setup.
//! - [`mock`]: scripted transports for tests and demos.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run
//! cargo test
//! ```

pub mod chat;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod lifecycle;
pub mod mock;
pub mod model;
pub mod preload;
pub mod reveal;
pub mod slot;
pub mod transport;
