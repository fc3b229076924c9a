use crate::{ConfigError, DEFAULT_COOLDOWN};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSecondsWithFrac};
use std::num::NonZeroUsize;
use std::time::Duration;

/// Body sent with every request of a run.
pub type Payload = serde_json::Value;

/// Parameters of a single ramp-up run.
///
/// Built by whatever front-end parses user input; the engine only checks it with
/// [`RunConfig::validate`] before the first request goes out.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub endpoint: String,
    pub payload: Payload,
    pub start_concurrency: u32,
    pub max_concurrency: u32,
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub total_duration: Duration,
    /// Explicit number of ramp levels. Derived from `total_duration` when absent.
    #[serde(default)]
    pub levels: Option<NonZeroUsize>,
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    #[serde(default = "default_cooldown")]
    pub cooldown: Duration,
}

impl RunConfig {
    pub fn new(
        endpoint: impl Into<String>,
        payload: Payload,
        start_concurrency: u32,
        max_concurrency: u32,
        total_duration: Duration,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            payload,
            start_concurrency,
            max_concurrency,
            total_duration,
            levels: None,
            cooldown: DEFAULT_COOLDOWN,
        }
    }

    pub fn levels(mut self, levels: NonZeroUsize) -> Self {
        self.levels = Some(levels);
        self
    }

    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_bounds(
            self.start_concurrency,
            self.max_concurrency,
            self.total_duration,
        )
    }
}

pub fn validate_bounds(start: u32, max: u32, duration: Duration) -> Result<(), ConfigError> {
    if start == 0 || max == 0 {
        Err(ConfigError::ZeroConcurrency)
    } else if start > max {
        Err(ConfigError::StartExceedsMax { start, max })
    } else if duration.is_zero() {
        Err(ConfigError::ZeroDuration)
    } else {
        Ok(())
    }
}

fn default_cooldown() -> Duration {
    DEFAULT_COOLDOWN
}
