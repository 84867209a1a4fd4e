//! Subscriber protocol wire types (§6): the bidirectional stream a
//! downstream process uses to mirror this process's Snapshot.
//!
//! `ClientMessage`/`ServerMessage` are the wire envelope; the payload for
//! `ServerMessage::Change` is [`variantflow_concurrency::ConfigChange`]
//! reused as-is, since the event the State Manager emits internally is
//! already the shape a subscriber needs on the wire.

use serde::{Deserialize, Serialize};
use variantflow_concurrency::ConfigChangeKind;
use variantflow_core::{Experiment, Layer};

/// A message a subscribing client sends over the stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Registers interest in a set of services, starting from
    /// `known_version` (used by the server to decide whether the
    /// subscriber's last `FullReload` is still usable, though this
    /// implementation always answers with a fresh one; see DESIGN.md).
    Subscribe {
        /// Client-chosen subscriber id, unique per registry.
        id: String,
        /// Services this subscriber wants changes for; empty means all.
        services: Vec<String>,
        /// The last Snapshot version this client successfully applied.
        known_version: u64,
    },
    /// Periodic acknowledgement of the highest version applied so far.
    Ack {
        /// The highest Snapshot version this client has applied.
        applied_version: u64,
    },
}

/// A message the server sends over the stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Sent once per `Subscribe`, or after a subscriber goes stale and
    /// re-requests one: every layer/experiment scoped to the subscriber's
    /// services, at `version`.
    FullReload {
        /// The Snapshot version this reload reflects.
        version: u64,
        /// Layers scoped to the subscriber's services.
        layers: Vec<Layer>,
        /// Experiments scoped to the subscriber's services.
        experiments: Vec<Experiment>,
    },
    /// One incremental change, filtered by the subscriber's services.
    Change {
        /// What kind of entity mutation this is.
        kind: ConfigChangeKind,
        /// The Snapshot version this change produced.
        version: u64,
        /// The changed entity, JSON-encoded (a `Layer`, an `Experiment`,
        /// or `{"entity_id": "..."}` for a delete).
        entity: serde_json::Value,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_message_round_trips_through_json() {
        let msg = ClientMessage::Subscribe {
            id: "sub1".to_string(),
            services: vec!["checkout".to_string()],
            known_version: 7,
        };
        let encoded = serde_json::to_string(&msg).unwrap();
        let decoded: ClientMessage = serde_json::from_str(&encoded).unwrap();
        match decoded {
            ClientMessage::Subscribe { id, services, known_version } => {
                assert_eq!(id, "sub1");
                assert_eq!(services, vec!["checkout".to_string()]);
                assert_eq!(known_version, 7);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn ack_message_round_trips() {
        let msg = ClientMessage::Ack { applied_version: 42 };
        let encoded = serde_json::to_string(&msg).unwrap();
        let decoded: ClientMessage = serde_json::from_str(&encoded).unwrap();
        assert!(matches!(decoded, ClientMessage::Ack { applied_version: 42 }));
    }

    #[test]
    fn full_reload_message_round_trips_with_empty_entities() {
        let msg = ServerMessage::FullReload { version: 1, layers: vec![], experiments: vec![] };
        let encoded = serde_json::to_string(&msg).unwrap();
        let decoded: ServerMessage = serde_json::from_str(&encoded).unwrap();
        assert!(matches!(decoded, ServerMessage::FullReload { version: 1, .. }));
    }
}
