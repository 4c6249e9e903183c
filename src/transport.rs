//! External collaborators.
//!
//! The crate never talks to the network itself. Hosts plug in implementations of these
//! traits (an HTTP client, a platform SDK, or the scripted doubles in [`crate::mock`]).
//! Every method reports failure as a [`LoadError`] value; none of them is expected to
//! panic, and the callers turn errors into `Failed` states.

use crate::error::LoadError;
use crate::model::{EventsFeed, PictureResource};
use async_trait::async_trait;

/// Source of the daily picture and the events feed.
#[async_trait]
pub trait DataTransport: Send + Sync {
    /// Fails with `Network` or `Parse`.
    async fn fetch_picture(&self) -> Result<PictureResource, LoadError>;

    /// Fails with `Network` or `Parse`.
    async fn fetch_events(&self) -> Result<EventsFeed, LoadError>;
}

/// Source of raw image bytes.
#[async_trait]
pub trait ImageTransport: Send + Sync {
    /// Fails with `Network`. Decoding happens in the preloader.
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, LoadError>;
}

/// The assistant backend. Yields a complete response, not a token stream.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_message(&self, text: &str) -> Result<String, LoadError>;
}

/// Runs a collaborator call on its own task so a panic inside it still yields a result.
pub(crate) async fn guarded<T, F>(what: &'static str, call: F) -> Result<T, LoadError>
where
    T: Send + 'static,
    F: std::future::Future<Output = Result<T, LoadError>> + Send + 'static,
{
    tokio::spawn(call).await.unwrap_or_else(|e| {
        tracing::warn!(what, error = %e, "Transport task aborted");
        Err(LoadError::Network(format!("{what} aborted: {e}")))
    })
}
