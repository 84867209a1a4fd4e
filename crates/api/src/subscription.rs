//! Wires the State Manager and Subscriber Fan-out together behind the
//! wire protocol (§4.8, §6): registering a subscriber also sends its
//! initial `FullReload`, which the Fan-out registry alone can't build
//! since it has no Snapshot access.

use crate::protocol::ServerMessage;
use std::sync::Arc;
use variantflow_concurrency::{
    ConfigChangePayload, FanoutEvent, RegisterError, StateManager, SubscriberRegistry, SubscriberStats,
};
use variantflow_core::Error;

/// Registers subscribers against a [`StateManager`] and a
/// [`SubscriberRegistry`], translating internal events to the wire
/// protocol.
pub struct SubscriptionHub {
    manager: Arc<StateManager>,
    registry: SubscriberRegistry,
}

impl SubscriptionHub {
    /// Build a hub over `manager`, bounding the registry by
    /// `max_subscribers` active subscriptions with `queue_depth`-deep
    /// per-subscriber queues (§6 configuration knobs).
    pub fn new(manager: Arc<StateManager>, max_subscribers: usize, queue_depth: usize) -> Self {
        SubscriptionHub { manager, registry: SubscriberRegistry::new(max_subscribers, queue_depth) }
    }

    /// Handle a `Subscribe` message: register the subscriber and return
    /// its initial `FullReload` plus the stream of subsequent messages.
    pub fn subscribe(
        &self,
        id: impl Into<String>,
        services: Vec<String>,
    ) -> Result<(ServerMessage, tokio::sync::mpsc::Receiver<FanoutEvent>), RegisterError> {
        let id = id.into();
        let (layers, experiments) = self.manager.entities_for_services(&services);
        let version = self.manager.current().version();
        let rx = self.registry.register(id, services)?;
        Ok((ServerMessage::FullReload { version, layers, experiments }, rx))
    }

    /// Drop a subscriber on transport close (§4.8).
    pub fn unsubscribe(&self, id: &str) {
        self.registry.unregister(id);
    }

    /// Fan an applied [`variantflow_concurrency::ConfigChange`] out to
    /// every matching subscriber.
    pub fn publish(&self, change: &variantflow_concurrency::ConfigChange) {
        self.registry.publish(change);
    }

    /// Re-send a subscriber's `FullReload`, e.g. after it goes stale.
    pub fn resend_full_reload(&self, id: &str, services: &[String]) -> Result<ServerMessage, Error> {
        let (layers, experiments) = self.manager.entities_for_services(services);
        let version = self.manager.current().version();
        if !self.registry.send_full_reload(id, version, layers.clone(), experiments.clone()) {
            return Err(Error::Internal(format!("subscriber {id} not registered")));
        }
        Ok(ServerMessage::FullReload { version, layers, experiments })
    }

    /// Current stats for one subscriber.
    pub fn stats(&self, id: &str) -> Option<SubscriberStats> {
        self.registry.stats(id)
    }
}

/// Translate an internal [`FanoutEvent`] into its wire form.
pub fn to_wire(event: FanoutEvent) -> ServerMessage {
    match event {
        FanoutEvent::FullReload { version, layers, experiments } => {
            ServerMessage::FullReload { version, layers, experiments }
        }
        FanoutEvent::Change(change) => {
            let entity = match &change.payload {
                ConfigChangePayload::Layer(l) => serde_json::to_value(l).unwrap_or(serde_json::Value::Null),
                ConfigChangePayload::Experiment(e) => serde_json::to_value(e).unwrap_or(serde_json::Value::Null),
                ConfigChangePayload::Removed { entity_id } => serde_json::json!({ "entity_id": entity_id }),
            };
            ServerMessage::Change { kind: change.kind, version: change.version, entity }
        }
    }
}
