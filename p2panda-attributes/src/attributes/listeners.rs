// SPDX-License-Identifier: MIT OR Apache-2.0

use p2panda_attributes_core::{Address, Reference};
use p2panda_attributes_store::{
    AttributeListener, AttributeListenerStore, AttributeQuery, AttributeStore, Transaction,
};
use tracing::debug;

use crate::error::AttributesError;
use crate::event::AttributeEvent;

use super::Attributes;

impl<S> Attributes<S>
where
    S: AttributeStore + AttributeListenerStore + Transaction + 'static,
{
    /// Stores a standing request of a peer to learn about attributes matching the query.
    ///
    /// The listener is identified by the reference of the request it was registered with.
    pub async fn register_attribute_listener(
        &self,
        id: Reference,
        query: AttributeQuery,
        peer: &Address,
    ) -> Result<AttributeListener, AttributesError> {
        if self.store.get_listener(&id).await?.is_some() {
            return Err(AttributesError::ListenerAlreadyExists(id));
        }

        let listener = AttributeListener::new(id, query, peer.clone());
        self.store.insert_listener(&listener).await?;
        debug!(listener = %listener.id, peer = %peer, "registered attribute listener");

        self.publish(AttributeEvent::ListenerRegistered {
            listener: listener.clone(),
        });
        Ok(listener)
    }

    pub async fn get_attribute_listener(
        &self,
        id: &Reference,
    ) -> Result<Option<AttributeListener>, AttributesError> {
        Ok(self.store.get_listener(id).await?)
    }

    pub async fn get_attribute_listeners_of_peer(
        &self,
        peer: &Address,
    ) -> Result<Vec<AttributeListener>, AttributesError> {
        Ok(self.store.get_listeners_of_peer(peer).await?)
    }

    /// Removes a listener, returns `false` if it did not exist.
    pub async fn delete_attribute_listener(&self, id: &Reference) -> Result<bool, AttributesError> {
        let deleted = self.store.delete_listener(id).await?;
        if deleted {
            debug!(listener = %id, "deleted attribute listener");
        }
        Ok(deleted)
    }
}
