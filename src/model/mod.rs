//! Pure data structures shared by the coordinator, the chat pipeline and their observers.

pub mod chat;
pub mod events;
pub mod image;
pub mod picture;

pub use chat::*;
pub use events::*;
pub use image::*;
pub use picture::*;
