use super::picture::non_empty;
use crate::error::LoadError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single upcoming or past space event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceEvent {
    pub title: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// The events feed, in the order the backend returned it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventsFeed {
    pub events: Vec<SpaceEvent>,
}

impl EventsFeed {
    pub fn new(events: Vec<SpaceEvent>) -> Self {
        Self { events }
    }

    /// Parses either a bare JSON array or an object with an `events` array.
    pub fn from_json(payload: &str) -> Result<Self, LoadError> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape {
            Bare(Vec<SpaceEvent>),
            Wrapped { events: Vec<SpaceEvent> },
        }

        let events = match serde_json::from_str::<Shape>(payload)? {
            Shape::Bare(events) | Shape::Wrapped { events } => events,
        };
        Ok(Self::new(
            events
                .into_iter()
                .map(|e| SpaceEvent {
                    description: non_empty(e.description),
                    url: non_empty(e.url),
                    ..e
                })
                .collect(),
        ))
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
