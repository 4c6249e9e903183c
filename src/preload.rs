//! Image preloading.
//!
//! [`ImagePreloader`] fetches image bytes through an [`ImageTransport`] and decodes them on
//! the blocking pool, away from the task that owns the slot. Whatever goes wrong (transport
//! failure, malformed bytes, a panicking collaborator) ends up as a `Failed` slot.

use crate::error::LoadError;
use crate::model::{ImageBlob, ImageFormat};
use crate::slot::{BeginLoad, RequestToken, ResourceSlot};
use crate::transport::{guarded, ImageTransport};
use std::sync::Arc;
use tracing::{debug, warn};

/// Turns fetched bytes into an [`ImageBlob`].
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, url: &str, bytes: Vec<u8>) -> Result<ImageBlob, LoadError>;
}

/// Accepts PNG, JPEG, GIF and WebP by their file signatures.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureDecoder;

impl SignatureDecoder {
    pub fn sniff(bytes: &[u8]) -> Option<ImageFormat> {
        const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        if bytes.starts_with(PNG) {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
            Some(ImageFormat::Webp)
        } else {
            None
        }
    }
}

impl ImageDecoder for SignatureDecoder {
    fn decode(&self, url: &str, bytes: Vec<u8>) -> Result<ImageBlob, LoadError> {
        if bytes.is_empty() {
            return Err(LoadError::Decode(format!("empty image data from {url}")));
        }
        let format = Self::sniff(&bytes)
            .ok_or_else(|| LoadError::Decode(format!("unrecognised image format from {url}")))?;
        Ok(ImageBlob::new(url, format, bytes))
    }
}

/// Fetches and decodes images into [`ResourceSlot`]s.
#[derive(Clone)]
pub struct ImagePreloader {
    transport: Arc<dyn ImageTransport>,
    decoder: Arc<dyn ImageDecoder>,
}

impl ImagePreloader {
    pub fn new(transport: Arc<dyn ImageTransport>) -> Self {
        Self::with_decoder(transport, Arc::new(SignatureDecoder))
    }

    pub fn with_decoder(transport: Arc<dyn ImageTransport>, decoder: Arc<dyn ImageDecoder>) -> Self {
        Self { transport, decoder }
    }

    /// Loads `url` into a fresh slot and returns it settled.
    pub async fn preload(&self, url: &str) -> ResourceSlot<ImageBlob> {
        let mut slot = ResourceSlot::new("image");
        let token = slot.begin_load().token();
        let result = self.fetch_and_decode(url.to_string()).await;
        slot.complete(token, result);
        slot
    }

    /// Starts loading `url` into `slot` in the background.
    ///
    /// Only a `Started` load spawns work. The result is handed to `report` together with
    /// the token it was issued under; the slot owner applies it with
    /// [`ResourceSlot::complete`].
    pub fn preload_into<F>(&self, slot: &mut ResourceSlot<ImageBlob>, url: &str, report: F) -> BeginLoad
    where
        F: FnOnce(RequestToken, Result<ImageBlob, LoadError>) + Send + 'static,
    {
        let begin = slot.begin_load();
        if let BeginLoad::Started(token) = begin {
            debug!(%token, url, "Preloading image");
            let this = self.clone();
            let url = url.to_string();
            tokio::spawn(async move {
                let result = this.fetch_and_decode(url).await;
                report(token, result);
            });
        }
        begin
    }

    async fn fetch_and_decode(&self, url: String) -> Result<ImageBlob, LoadError> {
        let transport = self.transport.clone();
        let fetch_url = url.clone();
        let bytes = guarded("image fetch", async move { transport.fetch_image(&fetch_url).await })
            .await
            .inspect_err(|e| warn!(url = %url, error = %e, "Image fetch failed"))?;

        let decoder = self.decoder.clone();
        tokio::task::spawn_blocking(move || decoder.decode(&url, bytes))
            .await
            .map_err(|e| LoadError::Decode(format!("decoder task failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedImages;
    use crate::slot::SlotState;

    const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

    #[test]
    fn sniffs_known_formats() {
        assert_eq!(SignatureDecoder::sniff(PNG_BYTES), Some(ImageFormat::Png));
        assert_eq!(SignatureDecoder::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(SignatureDecoder::sniff(b"GIF89a...."), Some(ImageFormat::Gif));
        assert_eq!(SignatureDecoder::sniff(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageFormat::Webp));
        assert_eq!(SignatureDecoder::sniff(b"<html>"), None);
    }

    #[tokio::test]
    async fn preload_settles_ready() {
        let images = ScriptedImages::new();
        images.expect_fetch("https://example.org/a.png").return_ok(PNG_BYTES.to_vec());
        let preloader = ImagePreloader::new(Arc::new(images.clone()));

        let slot = preloader.preload("https://example.org/a.png").await;
        let blob = slot.state().value().expect("ready");
        assert_eq!(blob.format, ImageFormat::Png);
        assert_eq!(blob.url, "https://example.org/a.png");
        images.verify();
    }

    #[tokio::test]
    async fn malformed_bytes_fail_with_decode_error() {
        let images = ScriptedImages::new();
        images.expect_fetch("https://example.org/b.png").return_ok(b"not an image".to_vec());
        let preloader = ImagePreloader::new(Arc::new(images));

        let slot = preloader.preload("https://example.org/b.png").await;
        assert!(matches!(slot.state(), SlotState::Failed(LoadError::Decode(_))));
    }

    #[tokio::test]
    async fn transport_failure_fails_with_network_error() {
        let images = ScriptedImages::new();
        images
            .expect_fetch("https://example.org/c.png")
            .return_err(LoadError::Network("unreachable".into()));
        let preloader = ImagePreloader::new(Arc::new(images));

        let slot = preloader.preload("https://example.org/c.png").await;
        assert_eq!(
            slot.state(),
            &SlotState::Failed(LoadError::Network("unreachable".into()))
        );
    }

    #[tokio::test]
    async fn unscripted_fetch_is_contained() {
        // The scripted transport panics on an unexpected call; the slot still settles.
        let preloader = ImagePreloader::new(Arc::new(ScriptedImages::new()));
        let slot = preloader.preload("https://example.org/d.png").await;
        assert!(matches!(slot.state(), SlotState::Failed(LoadError::Network(_))));
    }

    #[tokio::test]
    async fn preload_into_reports_under_its_token() {
        let images = ScriptedImages::new();
        images.expect_fetch("https://example.org/e.png").return_ok(PNG_BYTES.to_vec());
        let preloader = ImagePreloader::new(Arc::new(images));

        let mut slot = ResourceSlot::new("image");
        let (tx, rx) = tokio::sync::oneshot::channel();
        let begin = preloader.preload_into(&mut slot, "https://example.org/e.png", move |token, result| {
            let _ = tx.send((token, result));
        });
        assert!(begin.is_started());

        // Second call joins the in-flight load instead of fetching again.
        let again = preloader.preload_into(&mut slot, "https://example.org/e.png", |_, _| {
            panic!("must not fetch twice")
        });
        assert_eq!(again, BeginLoad::InFlight(begin.token()));

        let (token, result) = rx.await.unwrap();
        assert!(slot.complete(token, result));
        assert!(slot.state().value().is_some());
    }
}
