//! The Change-Log Poller (C6): tails the append-only log and drives
//! reloads through the State Manager, one entry at a time, in order
//! (§4.6).

use crate::config::PollerConfig;
use crate::entry::{ChangeLogEntry, EntityType, Operation};
use crate::source::{ChangeLogSource, ExperimentStore, LayerStore, StoreError};
use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use variantflow_concurrency::{ConfigChange, EntityChange, StateManager};
use variantflow_core::{Eid, LayerId};

/// A callback invoked with every [`ConfigChange`] the Poller applies.
/// Typically wired to [`variantflow_concurrency::SubscriberRegistry::publish`].
pub type OnChange = Arc<dyn Fn(ConfigChange) + Send + Sync>;

/// Tails a [`ChangeLogSource`], reloading changed entities through
/// [`LayerStore`]/[`ExperimentStore`] and applying them to a [`StateManager`].
pub struct Poller {
    change_log: Arc<dyn ChangeLogSource>,
    layers: Arc<dyn LayerStore>,
    experiments: Arc<dyn ExperimentStore>,
    manager: Arc<StateManager>,
    config: PollerConfig,
    last_id: AtomicI64,
    on_change: OnChange,
}

impl Poller {
    /// Construct a Poller, initializing `last_id` from the log's current
    /// max id (§4.6 startup: "query `max(id)` and record it as `last_id`").
    pub fn new(
        change_log: Arc<dyn ChangeLogSource>,
        layers: Arc<dyn LayerStore>,
        experiments: Arc<dyn ExperimentStore>,
        manager: Arc<StateManager>,
        config: PollerConfig,
        on_change: impl Fn(ConfigChange) + Send + Sync + 'static,
    ) -> Result<Self, StoreError> {
        let last_id = change_log.max_id()?;
        Ok(Poller {
            change_log,
            layers,
            experiments,
            manager,
            config,
            last_id: AtomicI64::new(last_id),
            on_change: Arc::new(on_change),
        })
    }

    /// The last successfully applied change-log id.
    pub fn last_id(&self) -> i64 {
        self.last_id.load(Ordering::SeqCst)
    }

    /// Run the poll loop until `shutdown` is set to `true`, finishing the
    /// current iteration before stopping (§5 cancellation).
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.config.poll_interval);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.poll_once();
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!("poller stopping on shutdown signal");
                        break;
                    }
                }
            }
        }
    }

    /// Fetch and apply one batch of change-log rows. Returns the number
    /// of entries successfully applied. Stops at the first entry whose
    /// reload fails after retries, per §5: "deferred without advancing
    /// `last_id` past the failing id" — later rows in the same batch
    /// would otherwise be applied out of order relative to it.
    pub fn poll_once(&self) -> usize {
        let after = self.last_id();
        let rows = match self.change_log.poll(after, self.config.poll_batch) {
            Ok(rows) => rows,
            Err(err) => {
                tracing::warn!(%err, after_id = after, "change log poll failed, retrying next interval");
                return 0;
            }
        };
        if rows.is_empty() {
            return 0;
        }

        let span = tracing::info_span!("poll_batch", after_id = after, rows = rows.len());
        let _enter = span.enter();

        let mut applied = 0;
        for entry in &rows {
            match self.reload_with_retry(entry) {
                Ok(change) => {
                    let config_change = self.manager.apply(change, Utc::now());
                    (self.on_change)(config_change);
                    self.last_id.store(entry.id, Ordering::SeqCst);
                    applied += 1;
                }
                Err(err) => {
                    tracing::warn!(entry_id = entry.id, %err, "entity reload failed after retries, deferring");
                    break;
                }
            }
        }
        applied
    }

    fn reload_with_retry(&self, entry: &ChangeLogEntry) -> Result<EntityChange, StoreError> {
        let mut attempt = 0u32;
        loop {
            match self.reload_entity(entry) {
                Ok(change) => return Ok(change),
                Err(StoreError::Permanent(msg)) => return Err(StoreError::Permanent(msg)),
                Err(StoreError::Transient(msg)) => {
                    attempt += 1;
                    if attempt > self.config.reload_max_retries {
                        return Err(StoreError::Transient(msg));
                    }
                    tracing::debug!(entry_id = entry.id, attempt, "transient reload failure, retrying");
                }
            }
        }
    }

    fn reload_entity(&self, entry: &ChangeLogEntry) -> Result<EntityChange, StoreError> {
        match (entry.entity_type, entry.operation) {
            (EntityType::Layer, Operation::Delete) => {
                Ok(EntityChange::LayerDeleted(LayerId::new(entry.entity_id.clone())))
            }
            (EntityType::Experiment, Operation::Delete) => {
                let eid = parse_eid(&entry.entity_id)?;
                Ok(EntityChange::ExperimentDeleted(eid))
            }
            (EntityType::Layer, Operation::Create | Operation::Update) => {
                let layer = self
                    .layers
                    .get_layer(&entry.entity_id)?
                    .ok_or_else(|| StoreError::Permanent(format!("layer {} not found on reload", entry.entity_id)))?;
                Ok(EntityChange::Layer(layer))
            }
            (EntityType::Experiment, Operation::Create | Operation::Update) => {
                let exp = self
                    .experiments
                    .get_experiment(&entry.entity_id)?
                    .ok_or_else(|| {
                        StoreError::Permanent(format!("experiment {} not found on reload", entry.entity_id))
                    })?;
                Ok(EntityChange::Experiment(exp))
            }
        }
    }
}

fn parse_eid(raw: &str) -> Result<Eid, StoreError> {
    raw.parse::<i64>()
        .map(Eid)
        .map_err(|_| StoreError::Permanent(format!("malformed eid {raw:?}")))
}
