use crate::error::LoadError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// What the daily picture's media URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// The astronomy picture of the day.
///
/// Optional fields are `None` when the payload omits them *or* sends an empty
/// string; there is no distinction between the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PictureResource {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub explanation: Option<String>,
    pub media: MediaKind,
    pub media_url: Option<String>,
    pub hd_url: Option<String>,
    pub copyright: Option<String>,
}

/// Wire shape of the daily picture payload.
#[derive(Debug, Deserialize)]
struct PicturePayload {
    title: String,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
    media_type: MediaKind,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    hdurl: Option<String>,
    #[serde(default)]
    copyright: Option<String>,
}

impl PictureResource {
    pub fn new(title: impl Into<String>, media: MediaKind, media_url: Option<String>) -> Self {
        Self {
            title: title.into(),
            date: None,
            explanation: None,
            media,
            media_url: non_empty(media_url),
            hd_url: None,
            copyright: None,
        }
    }

    /// Parses the JSON payload returned by the picture endpoint.
    pub fn from_json(payload: &str) -> Result<Self, LoadError> {
        let raw: PicturePayload = serde_json::from_str(payload)?;
        let date = match non_empty(raw.date) {
            Some(d) => Some(
                NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                    .map_err(|e| LoadError::Parse(format!("date {d:?}: {e}")))?,
            ),
            None => None,
        };
        Ok(Self {
            title: raw.title,
            date,
            explanation: non_empty(raw.explanation),
            media: raw.media_type,
            media_url: non_empty(raw.url),
            hd_url: non_empty(raw.hdurl),
            copyright: non_empty(raw.copyright).map(|c| c.trim().to_string()),
        })
    }

    /// URL of the derived image to preload, if there is one.
    ///
    /// Only images with a `url` yield one. `hdurl` alone never triggers a fetch.
    pub fn image_url(&self) -> Option<&str> {
        match self.media {
            MediaKind::Image => self.media_url.as_deref(),
            MediaKind::Video => None,
        }
    }
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
