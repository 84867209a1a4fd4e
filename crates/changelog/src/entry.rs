//! The change-log row shape (§6): `(id, entity_type, entity_id, operation,
//! created_at)`. Payloads carry only identity, never new content, so the
//! log stays compact and the Poller always reloads from the
//! authoritative store (§4.6).

use chrono::{DateTime, Utc};

/// Which kind of entity a change-log row refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    /// A layer.
    Layer,
    /// An experiment.
    Experiment,
}

/// What happened to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// The entity was created.
    Create,
    /// The entity was updated.
    Update,
    /// The entity was deleted.
    Delete,
}

/// One row of the append-only change log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeLogEntry {
    /// Monotonic row id; the authoritative ordering (§4.6).
    pub id: i64,
    /// Which kind of entity changed.
    pub entity_type: EntityType,
    /// The entity's id, as a string (a `layer_id` or a stringified `eid`).
    pub entity_id: String,
    /// What happened.
    pub operation: Operation,
    /// When the writer committed this row.
    pub created_at: DateTime<Utc>,
}
