//! The Change-Log Poller (C6): tails an append-only log of entity
//! mutations and drives the State Manager ([`variantflow_concurrency`])
//! toward the authoritative store's current state (§4.6, §6).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod entry;
pub mod poller;
pub mod source;

pub use config::PollerConfig;
pub use entry::{ChangeLogEntry, EntityType, Operation};
pub use poller::{OnChange, Poller};
pub use source::{ChangeLogSource, ExperimentStore, LayerStore, StoreError};
