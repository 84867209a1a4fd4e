//! Subscriber Fan-out (C8): pushes `FullReload`/`ConfigChange` events to
//! downstream evaluators in multi-tier deployments (§4.8).
//!
//! Each subscriber owns a bounded `tokio::mpsc` queue; on overflow the
//! send is dropped, the drop is counted, and the subscriber is marked
//! stale so the caller knows to re-subscribe for a fresh `FullReload`.

use crate::manager::ConfigChange;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use variantflow_core::{Experiment, Layer};

/// One event delivered to a subscriber's queue.
#[derive(Debug, Clone)]
pub enum FanoutEvent {
    /// Sent once, on registration: the subset of the current Snapshot
    /// matching the subscriber's `services`.
    FullReload {
        /// The Snapshot version this reload reflects.
        version: u64,
        /// Layers scoped to the subscriber's services.
        layers: Vec<Layer>,
        /// Experiments scoped to the subscriber's services.
        experiments: Vec<Experiment>,
    },
    /// An incremental change, filtered by the subscriber's `services`.
    Change(ConfigChange),
}

/// Point-in-time counters for one subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubscriberStats {
    /// Number of events dropped because the queue was full.
    pub dropped: u64,
    /// Whether this subscriber is stale (missed a delivery, needs a fresh
    /// `FullReload`).
    pub stale: bool,
}

struct Subscriber {
    services: Vec<String>,
    sender: mpsc::Sender<FanoutEvent>,
    dropped: AtomicU64,
    stale: AtomicBool,
}

/// Registry of active subscribers and the bounded queues backing them.
pub struct SubscriberRegistry {
    subscribers: DashMap<String, Arc<Subscriber>>,
    queue_depth: usize,
    max_subscribers: usize,
}

/// Why registration was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegisterError {
    /// `max_subscribers` is already reached.
    #[error("subscriber capacity ({0}) reached")]
    AtCapacity(usize),
}

impl SubscriberRegistry {
    /// A fresh registry bounded by `max_subscribers` active subscribers,
    /// each with a queue of `queue_depth` events (§6 configuration knobs).
    pub fn new(max_subscribers: usize, queue_depth: usize) -> Self {
        SubscriberRegistry {
            subscribers: DashMap::new(),
            queue_depth,
            max_subscribers,
        }
    }

    /// Register a subscriber, returning the receiving half of its queue.
    /// The caller is responsible for sending the initial `FullReload`
    /// (the registry doesn't read the Snapshot itself, to keep this
    /// crate free of a Catalog dependency beyond what `ConfigChange`
    /// already needs).
    pub fn register(
        &self,
        id: impl Into<String>,
        services: Vec<String>,
    ) -> Result<mpsc::Receiver<FanoutEvent>, RegisterError> {
        if self.subscribers.len() >= self.max_subscribers {
            return Err(RegisterError::AtCapacity(self.max_subscribers));
        }
        let (tx, rx) = mpsc::channel(self.queue_depth);
        let id = id.into();
        self.subscribers.insert(
            id.clone(),
            Arc::new(Subscriber {
                services,
                sender: tx,
                dropped: AtomicU64::new(0),
                stale: AtomicBool::new(false),
            }),
        );
        tracing::info!(subscriber_id = %id, "subscriber registered");
        Ok(rx)
    }

    /// Drop a subscriber on transport close (§4.8: "disconnection is
    /// detected by transport close; state is discarded").
    pub fn unregister(&self, id: &str) {
        self.subscribers.remove(id);
    }

    /// Fan a change out to every subscriber whose `services` intersects
    /// the change's affected services (empty `affected_services`, as for
    /// a delete, goes to everyone).
    pub fn publish(&self, change: &ConfigChange) {
        let affected = change.affected_services();
        for entry in self.subscribers.iter() {
            let sub = entry.value();
            if !affected.is_empty() && !sub.services.iter().any(|s| affected.contains(s)) {
                continue;
            }
            match sub.sender.try_send(FanoutEvent::Change(change.clone())) {
                Ok(()) => {}
                Err(_) => {
                    sub.dropped.fetch_add(1, Ordering::Relaxed);
                    sub.stale.store(true, Ordering::Relaxed);
                    tracing::warn!(subscriber_id = %entry.key(), "subscriber queue full, marked stale");
                }
            }
        }
    }

    /// Send a `FullReload` to one subscriber, e.g. right after
    /// [`SubscriberRegistry::register`] or when a stale subscriber
    /// re-requests one. Clears the stale flag on success.
    pub fn send_full_reload(
        &self,
        id: &str,
        version: u64,
        layers: Vec<Layer>,
        experiments: Vec<Experiment>,
    ) -> bool {
        let Some(sub) = self.subscribers.get(id) else { return false };
        match sub.sender.try_send(FanoutEvent::FullReload { version, layers, experiments }) {
            Ok(()) => {
                sub.stale.store(false, Ordering::Relaxed);
                true
            }
            Err(_) => {
                sub.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Read a subscriber's current stats.
    pub fn stats(&self, id: &str) -> Option<SubscriberStats> {
        self.subscribers.get(id).map(|sub| SubscriberStats {
            dropped: sub.dropped.load(Ordering::Relaxed),
            stale: sub.stale.load(Ordering::Relaxed),
        })
    }

    /// Number of currently registered subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Whether the registry has no subscribers.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
