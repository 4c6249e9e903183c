use std::fmt;
use std::sync::Arc;

/// Container formats the preloader accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

/// Decoded image data ready for display.
///
/// The bytes are shared, so snapshots handed to observers are cheap to clone.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageBlob {
    pub url: String,
    pub format: ImageFormat,
    pub bytes: Arc<[u8]>,
}

impl ImageBlob {
    pub fn new(url: impl Into<String>, format: ImageFormat, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            url: url.into(),
            format,
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Raw bytes are noise in logs.
impl fmt::Debug for ImageBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageBlob")
            .field("url", &self.url)
            .field("format", &self.format)
            .field("len", &self.bytes.len())
            .finish()
    }
}
