//! Poller configuration (§6 knobs): `poll_interval`, `poll_batch`, and
//! the retry bound on reload timeouts (§5).
//!
//! A plain struct with a `Default` impl, deserializable from TOML/JSON/env
//! via `serde`, no bespoke parsing.

use serde::Deserialize;
use std::time::Duration;

fn default_poll_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_poll_batch() -> usize {
    1000
}

fn default_reload_max_retries() -> u32 {
    3
}

fn default_reload_timeout() -> Duration {
    Duration::from_secs(5)
}

/// Configuration for one [`crate::poller::Poller`] instance.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// How often to fetch new change-log rows (default 1s).
    #[serde(with = "duration_secs")]
    pub poll_interval: Duration,
    /// Max rows fetched per poll (default 1000).
    pub poll_batch: usize,
    /// Max retries for a single entity reload before it's deferred
    /// without advancing `last_id` past it (default 3, §5).
    pub reload_max_retries: u32,
    /// Per-reload timeout bound (default 5s, §5).
    #[serde(with = "duration_secs")]
    pub reload_timeout: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        PollerConfig {
            poll_interval: default_poll_interval(),
            poll_batch: default_poll_batch(),
            reload_max_retries: default_reload_max_retries(),
            reload_timeout: default_reload_timeout(),
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
