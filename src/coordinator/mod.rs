//! # Load Coordinator
//!
//! Owns one [`ResourceSlot`](crate::slot::ResourceSlot) per remote resource (daily
//! picture, its preloaded image, the events feed) and runs as an actor: a single task
//! that applies every transition, fed by an `mpsc` channel.
//!
//! - [`LoadCoordinator`]: the actor (server half). Spawn its [`run`](LoadCoordinator::run).
//! - [`CoordinatorClient`]: cheap to clone; what views hold.
//! - [`CoordinatorRequest`]: the message protocol between the two.
//!
//! Fetches run on their own tasks and come back as completions tagged with the request
//! token they were issued under. Resources are independent: a failure or refresh of one
//! slot never touches another, except that a fresh picture decides what the image slot
//! shows.

pub mod actor;
pub mod client;
pub mod message;

pub use actor::{CoordinatorContext, LoadCoordinator};
pub use client::CoordinatorClient;
pub use message::{CoordinatorRequest, CoordinatorSnapshot, LoadOutcome, ResourceKind};
