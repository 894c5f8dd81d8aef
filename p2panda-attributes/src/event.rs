// SPDX-License-Identifier: MIT OR Apache-2.0

use p2panda_attributes_core::{Address, Attribute, AttributeId};
use p2panda_attributes_store::AttributeListener;
use tokio::sync::broadcast;
use tracing::trace;

/// Events emitted after a mutation of attributes was applied.
///
/// Exactly one event is published per successful mutating operation, no-ops and failed
/// validations publish nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeEvent {
    /// An attribute was created.
    Created {
        attribute: Attribute,
    },

    /// Attributes were deleted.
    Deleted {
        /// All deleted attributes, the requested one first.
        attributes: Vec<Attribute>,

        /// Own identity attribute which became the new default of its value type.
        promoted_default: Option<AttributeId>,
    },

    /// An attribute was succeeded by a new version.
    Succeeded {
        predecessor: Attribute,
        successor: Attribute,
    },

    /// Forwarding details of an attribute were added or removed.
    ForwardingDetailsChanged {
        attribute: Attribute,
        peer: Address,
    },

    /// Deletion info in the forwarding details of a peer changed.
    ForwardedDeletionInfoChanged {
        /// The attribute and all of its predecessors which were affected.
        attributes: Vec<Attribute>,
        peer: Address,
    },

    /// Deletion info in the peer sharing details changed.
    PeerDeletionInfoChanged {
        /// The attribute and all of its predecessors which were affected.
        attributes: Vec<Attribute>,
    },

    /// An own identity attribute became the default of its value type.
    DefaultChanged {
        attribute: Attribute,
        previous_default: Option<AttributeId>,
    },

    WasViewedAtChanged {
        attribute: Attribute,
    },

    /// A peer registered a listener for attributes.
    ListenerRegistered {
        listener: AttributeListener,
    },
}

/// Fan-out of attribute events to any number of subscribers.
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<AttributeEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AttributeEvent> {
        self.tx.subscribe()
    }

    pub(crate) fn publish(&self, event: AttributeEvent) {
        // Sending only fails when nobody is subscribed.
        if self.tx.send(event).is_err() {
            trace!("no subscribers for attribute event");
        }
    }
}

#[cfg(test)]
mod tests {
    use p2panda_attributes_core::test_utils::{address, own_identity_attribute};

    use super::{AttributeEvent, EventBus};

    #[tokio::test]
    async fn publish_to_subscribers() {
        let bus = EventBus::new(4);
        let attribute = own_identity_attribute(&address("alice"), "Alice");

        // Publishing without subscribers is fine.
        bus.publish(AttributeEvent::Created {
            attribute: attribute.clone(),
        });

        let mut rx = bus.subscribe();
        bus.publish(AttributeEvent::WasViewedAtChanged {
            attribute: attribute.clone(),
        });
        assert_eq!(
            rx.recv().await.unwrap(),
            AttributeEvent::WasViewedAtChanged { attribute }
        );
    }
}
