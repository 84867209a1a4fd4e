//! State Manager and Subscriber Fan-out (C7 + C8): owns the current
//! Snapshot behind a publish/subscribe discipline so readers never take
//! a lock and writers are fully serialized (§4.7, §4.8, §5).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entities;
pub mod manager;
pub mod subscribers;

pub use entities::EntityStore;
pub use manager::{ConfigChange, ConfigChangeKind, ConfigChangePayload, EntityChange, StateManager};
pub use subscribers::{FanoutEvent, RegisterError, SubscriberRegistry, SubscriberStats};
