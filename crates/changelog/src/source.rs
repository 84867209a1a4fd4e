//! Read interfaces the Poller depends on (§6): the change log itself,
//! plus the authoritative layer/experiment stores it reloads entities
//! from. The core never writes to these; external writers own them.
//!
//! Modeled as plain synchronous traits: `Send + Sync`, object-safe, one
//! `Result` per call. The Poller itself runs as an async task (§5:
//! "long-running tasks that suspend on I/O"); these trait calls are the
//! suspension points, run on a blocking pool where the implementation
//! requires it.

use crate::entry::ChangeLogEntry;
use variantflow_core::{Experiment, Layer};

/// Errors a store implementation can surface to the Poller. Distinct
/// from `variantflow_core::Error` since these originate outside the
/// evaluation core and the Poller decides how to map them (§7 StorageError).
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// A transient failure; retrying may succeed.
    #[error("transient store failure: {0}")]
    Transient(String),
    /// A permanent failure; retrying will not help.
    #[error("permanent store failure: {0}")]
    Permanent(String),
}

/// Tails the append-only change-log table (§4.6, §6).
pub trait ChangeLogSource: Send + Sync {
    /// The largest `id` currently in the log, or `0` if empty. Used once
    /// at startup to initialize `last_id` without replaying history.
    fn max_id(&self) -> Result<i64, StoreError>;

    /// Rows with `id > after_id`, ordered by `id` ascending, at most
    /// `limit` rows.
    fn poll(&self, after_id: i64, limit: usize) -> Result<Vec<ChangeLogEntry>, StoreError>;
}

/// Read-only access to the authoritative layer store (§6: `get_layer`,
/// `list_layers`).
pub trait LayerStore: Send + Sync {
    /// Fetch one layer by id, or `None` if it no longer exists (already
    /// deleted by the time the Poller's reload runs).
    fn get_layer(&self, id: &str) -> Result<Option<Layer>, StoreError>;

    /// All layers currently known to the store, for the initial full load.
    fn list_layers(&self) -> Result<Vec<Layer>, StoreError>;
}

/// Read-only access to the authoritative experiment store, analogous to
/// [`LayerStore`].
pub trait ExperimentStore: Send + Sync {
    /// Fetch one experiment by id, or `None` if it no longer exists.
    fn get_experiment(&self, id: &str) -> Result<Option<Experiment>, StoreError>;

    /// All experiments currently known to the store, for the initial full load.
    fn list_experiments(&self) -> Result<Vec<Experiment>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_traits_are_object_safe() {
        fn accepts_change_log(_s: &dyn ChangeLogSource) {}
        fn accepts_layer_store(_s: &dyn LayerStore) {}
        fn accepts_experiment_store(_s: &dyn ExperimentStore) {}
        let _ = accepts_change_log as fn(&dyn ChangeLogSource);
        let _ = accepts_layer_store as fn(&dyn LayerStore);
        let _ = accepts_experiment_store as fn(&dyn ExperimentStore);
    }

    #[test]
    fn change_log_source_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<Box<dyn ChangeLogSource>>();
        assert_sync::<Box<dyn ChangeLogSource>>();
    }
}
