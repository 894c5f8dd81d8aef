// SPDX-License-Identifier: MIT OR Apache-2.0

//! Disclosure of attributes to peers beyond their original sharing context.
use p2panda_attributes_core::{
    Address, Attribute, AttributeId, Confidentiality, Reference, Timestamp,
};
use p2panda_attributes_store::{AttributeListenerStore, AttributeStore, Transaction};
use tracing::{debug, trace};

use crate::error::{AttributesError, ValidationResult};
use crate::event::AttributeEvent;

use super::Attributes;

fn add_forwarding(
    attribute: &mut Attribute,
    peer: &Address,
    source_reference: Reference,
) -> ValidationResult {
    let id = attribute.id();
    let role = attribute.role();
    let forwardings = attribute
        .forwardings_mut()
        .ok_or(AttributesError::WrongTypeOfAttribute { id, actual: role })?;
    forwardings
        .add(peer.clone(), source_reference, Timestamp::now())
        .map_err(|err| AttributesError::from_attribute_error(id, err.into()))
}

impl<S> Attributes<S>
where
    S: AttributeStore + AttributeListenerStore + Transaction + 'static,
{
    /// Checks if the attribute can be disclosed to a peer.
    ///
    /// Private relationship attributes never leave their relationship and the anchor peer of a
    /// relationship attribute holds it already.
    pub fn validate_forwarding(&self, attribute: &Attribute, peer: &Address) -> ValidationResult {
        let id = attribute.id();

        if attribute
            .relationship_content()
            .is_some_and(|content| content.confidentiality() == Confidentiality::Private)
        {
            return Err(AttributesError::ConfidentialAttribute {
                id,
                peer: peer.clone(),
            });
        }

        if attribute.peer() == Some(peer) {
            return Err(AttributesError::AlreadyForwarded {
                id,
                peer: peer.clone(),
            });
        }

        let mut probe = attribute.clone();
        add_forwarding(&mut probe, peer, Reference::new(""))
    }

    /// Registers that the attribute was disclosed to a peer.
    pub async fn add_forwarding_details_to_attribute(
        &self,
        id: &AttributeId,
        peer: &Address,
        source_reference: Reference,
    ) -> Result<Attribute, AttributesError> {
        let mut attribute = self.get_existing_attribute(id).await?;
        self.validate_forwarding(&attribute, peer)?;
        add_forwarding(&mut attribute, peer, source_reference)?;

        self.store.update_attribute(&attribute).await?;
        debug!(attribute_id = %id, peer = %peer, "added forwarding details");

        self.publish(AttributeEvent::ForwardingDetailsChanged {
            attribute: attribute.clone(),
            peer: peer.clone(),
        });
        Ok(attribute)
    }

    /// Removes the forwarding details of a peer, does nothing if there are none.
    pub async fn remove_forwarding_details_from_attribute(
        &self,
        id: &AttributeId,
        peer: &Address,
    ) -> Result<Attribute, AttributesError> {
        let mut attribute = self.get_existing_attribute(id).await?;

        let removed = attribute
            .forwardings_mut()
            .and_then(|forwardings| forwardings.remove(peer));
        if removed.is_none() {
            trace!(attribute_id = %id, peer = %peer, "no forwarding details to remove");
            return Ok(attribute);
        }

        self.store.update_attribute(&attribute).await?;
        debug!(attribute_id = %id, peer = %peer, "removed forwarding details");

        self.publish(AttributeEvent::ForwardingDetailsChanged {
            attribute: attribute.clone(),
            peer: peer.clone(),
        });
        Ok(attribute)
    }

    /// Peers the attribute was forwarded to and who did not delete it.
    pub async fn get_peers_of_forwarded_attribute(
        &self,
        id: &AttributeId,
    ) -> Result<Vec<Address>, AttributesError> {
        let attribute = self.get_existing_attribute(id).await?;
        Ok(attribute
            .forwardings()
            .map(|forwardings| forwardings.active_peers().cloned().collect())
            .unwrap_or_default())
    }

    /// Versions of the attribute's chain which were shared with any peer, or with one of the
    /// given peers. Newest first.
    pub async fn get_shared_versions_of_attribute(
        &self,
        id: &AttributeId,
        peers: Option<&[Address]>,
    ) -> Result<Vec<Attribute>, AttributesError> {
        let versions = self.get_versions_of_attribute(id).await?;

        Ok(versions
            .into_iter()
            .filter(|version| match peers {
                Some(peers) => peers.iter().any(|peer| version.is_shared_with(peer)),
                None => {
                    version.peer().is_some()
                        || version
                            .forwardings()
                            .is_some_and(|forwardings| forwardings.active_peers().next().is_some())
                }
            })
            .collect())
    }
}
