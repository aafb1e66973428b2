//! Entity-changed broadcast bus.
//!
//! After a successful mutation the mutator publishes an event; list screens
//! subscribed to that entity type reload themselves. Neither side holds a
//! reference to the other.

use desk_client::Payload;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

/// Capacity of the broadcast channel. Subscribers that lag past this many
/// undelivered events skip ahead and reload anyway.
const BUS_CAPACITY: usize = 64;

/// Signal that an entity was created or changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityChanged {
    /// Entity kind: "incident", "problem", "change", ...
    pub entity_type: String,
    /// Server id of the entity, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<Value>,
    /// Human-facing ticket number, when the entity has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_number: Option<String>,
}

/// In-process publish/subscribe bus for [`EntityChanged`] signals.
#[derive(Clone)]
pub struct ChangeBus {
    tx: broadcast::Sender<EntityChanged>,
}

impl ChangeBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<EntityChanged> {
        self.tx.subscribe()
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: EntityChanged) {
        debug!(entity_type = %event.entity_type, "Entity change broadcast");
        let _ = self.tx.send(event);
    }

    /// Publish a creation event, pulling `id` and the ticket number out of
    /// the creation response payload.
    pub fn notify_created(&self, entity_type: &str, payload: &Payload) {
        let json = payload.as_json();
        let entity_id = json.and_then(|v| v.get("id")).cloned();
        let ticket_number = json
            .and_then(|v| v.get("ticket_number").or_else(|| v.get("ticket")))
            .and_then(|v| v.as_str())
            .map(String::from);

        self.publish(EntityChanged {
            entity_type: entity_type.to_string(),
            entity_id,
            ticket_number,
        });
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}
