//! Runtime configuration.

use crate::error::ConfigError;
use std::time::Duration;
use tracing::warn;

const DEFAULT_REVEAL_INTERVAL_MS: u64 = 75;
const DEFAULT_CHANNEL_CAPACITY: usize = 32;

/// Settings shared by the coordinator and conversation actors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CosmosConfig {
    /// Pause between two revealed word tokens.
    pub reveal_interval: Duration,
    /// Capacity of each actor's request channel.
    pub channel_capacity: usize,
}

impl Default for CosmosConfig {
    fn default() -> Self {
        Self {
            reveal_interval: Duration::from_millis(DEFAULT_REVEAL_INTERVAL_MS),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl CosmosConfig {
    /// Create configuration from environment variables.
    ///
    /// - `COSMOS_REVEAL_INTERVAL_MS`
    /// - `COSMOS_CHANNEL_CAPACITY`
    ///
    /// Unparseable or zero values fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            reveal_interval: env_positive("COSMOS_REVEAL_INTERVAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.reveal_interval),
            channel_capacity: env_positive("COSMOS_CHANNEL_CAPACITY")
                .and_then(|v| usize::try_from(v).ok())
                .unwrap_or(defaults.channel_capacity),
        }
    }

    pub fn with_reveal_interval(mut self, interval: Duration) -> Self {
        self.reveal_interval = interval;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reveal_interval.is_zero() {
            return Err(ConfigError::Invalid("reveal_interval must be non-zero".into()));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid("channel_capacity must be non-zero".into()));
        }
        Ok(())
    }
}

fn env_positive(key: &str) -> Option<u64> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(v) if v > 0 => Some(v),
        _ => {
            warn!(key, value = %raw, "Ignoring invalid setting");
            None
        }
    }
}
