//! # System Lifecycle
//!
//! Wires the actors to their collaborators, starts them and shuts them down.
//!
//! Collaborators are injected when an actor's loop starts (`run(context)`), not when the
//! actor is constructed, so actors and clients can be created up front and handed around
//! before anything runs.
//!
//! Shutdown is channel-driven: once every client of an actor is dropped its request
//! channel closes, the loop exits, and [`SpaceSystem::shutdown`] joins the task.

pub mod space_system;
pub mod tracing;

pub use self::space_system::{SpaceSystem, Transports};
pub use self::tracing::setup_tracing;
