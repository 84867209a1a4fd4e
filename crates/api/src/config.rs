//! Facade-level configuration knobs (§6): subscriber capacity and queue
//! depth. `hash_slots` is a compile-time constant
//! ([`variantflow_core::HASH_SLOTS`]), not a runtime knob, since §6 notes
//! it is "fixed at 10000 unless explicitly rebuilt" — changing it means
//! rebuilding the binary, not reloading config.

use serde::Deserialize;

fn default_max_subscribers() -> usize {
    64
}

fn default_subscriber_queue_depth() -> usize {
    256
}

/// Configuration for one [`crate::subscription::SubscriptionHub`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Maximum number of concurrently registered subscribers (default 64).
    pub max_subscribers: usize,
    /// Bounded queue depth per subscriber (default 256).
    pub subscriber_queue_depth: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            max_subscribers: default_max_subscribers(),
            subscriber_queue_depth: default_subscriber_queue_depth(),
        }
    }
}
