// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use p2panda_attributes_core::{Address, AttributeContent, AttributeRole};
use p2panda_attributes_store::{AttributeListenerStore, AttributeStore, Transaction};
use tracing::debug;

use crate::attributes::Attributes;
use crate::error::{AttributesError, ValidationResult};
use crate::event::AttributeEvent;

use super::{
    ItemContext, ItemProcessor, ItemType, ProtocolItem, ShareAttributeRequestItem,
    restore_snapshots, wrong_item,
};

/// Role the shared attribute takes on our side.
fn received_role(
    item: &ShareAttributeRequestItem,
    sender: &Address,
    local: &Address,
) -> Result<AttributeRole, AttributesError> {
    let owner = item.content.owner();
    let wrong_owner = || AttributesError::WrongOwner {
        expected: sender.clone(),
        actual: owner.clone(),
    };

    match &item.content {
        AttributeContent::Identity(_) if owner == sender => Ok(AttributeRole::PeerIdentity),
        AttributeContent::Identity(_) => Err(wrong_owner()),
        AttributeContent::Relationship(_) if owner == sender => {
            Ok(AttributeRole::PeerRelationship)
        }
        AttributeContent::Relationship(_)
            if owner != local && item.initial_attribute_peer.is_some() =>
        {
            Ok(AttributeRole::ThirdPartyRelationship)
        }
        AttributeContent::Relationship(_) => Err(wrong_owner()),
    }
}

/// Stores an attribute a peer shared with us.
///
/// Identity and relationship attributes of the sender become peer attributes, relationship
/// attributes of anybody else become third party attributes.
#[derive(Clone, Copy, Debug, Default)]
pub struct ShareAttributeRequestItemProcessor;

#[async_trait]
impl<S> ItemProcessor<S> for ShareAttributeRequestItemProcessor
where
    S: AttributeStore + AttributeListenerStore + Transaction + 'static,
{
    fn item_type(&self) -> ItemType {
        ItemType::ShareAttribute
    }

    async fn check_prerequisites(
        &self,
        attributes: &Attributes<S>,
        item: &ProtocolItem,
        context: &ItemContext,
    ) -> ValidationResult {
        let ProtocolItem::ShareAttribute(item) = item else {
            return Err(wrong_item(ItemType::ShareAttribute, item));
        };

        if attributes.store().has_attribute(&item.attribute_id).await? {
            return Err(AttributesError::AttributeAlreadyExists(item.attribute_id));
        }

        received_role(item, &context.sender, attributes.local_address())?;
        attributes.validate_content(&item.content.trimmed()).await
    }

    async fn process(
        &self,
        attributes: &Attributes<S>,
        item: &ProtocolItem,
        context: &mut ItemContext,
    ) -> Result<Option<AttributeEvent>, AttributesError> {
        let ProtocolItem::ShareAttribute(item) = item else {
            return Err(wrong_item(ItemType::ShareAttribute, item));
        };
        context.mark_processed();

        let role = received_role(item, &context.sender, attributes.local_address())?;

        let sender = context.sender.clone();
        let reference = context.reference.clone();
        let attribute = match (role, item.content.clone(), &item.initial_attribute_peer) {
            (AttributeRole::PeerIdentity, AttributeContent::Identity(content), _) => {
                attributes
                    .create_peer_identity_attribute(item.attribute_id, content, &sender, reference)
                    .await?
            }
            (AttributeRole::PeerRelationship, AttributeContent::Relationship(content), _) => {
                attributes
                    .create_peer_relationship_attribute(
                        item.attribute_id,
                        content,
                        &sender,
                        reference,
                    )
                    .await?
            }
            (
                AttributeRole::ThirdPartyRelationship,
                AttributeContent::Relationship(content),
                Some(initial_attribute_peer),
            ) => {
                attributes
                    .create_third_party_relationship_attribute(
                        item.attribute_id,
                        content,
                        &sender,
                        reference,
                        initial_attribute_peer,
                    )
                    .await?
            }
            (role, _, _) => {
                return Err(AttributesError::WrongTypeOfAttribute {
                    id: item.attribute_id,
                    actual: role,
                });
            }
        };
        context.record_absent(attribute.id());

        Ok(Some(AttributeEvent::Created { attribute }))
    }

    async fn rollback(
        &self,
        attributes: &Attributes<S>,
        item: &ProtocolItem,
        context: &ItemContext,
    ) -> ValidationResult {
        let ProtocolItem::ShareAttribute(item) = item else {
            return Err(wrong_item(ItemType::ShareAttribute, item));
        };

        if restore_snapshots(attributes, context).await? {
            return Ok(());
        }

        // Only remove the attribute if it was stored from this very message.
        let Some(attribute) = attributes.get_attribute(&item.attribute_id).await? else {
            return Ok(());
        };
        let stored_from_item = attribute.peer_sharing().is_some_and(|details| {
            details.peer == context.sender && details.source_reference == context.reference
        });
        if stored_from_item {
            attributes.store().delete_attribute(&item.attribute_id).await?;
            debug!(attribute_id = %item.attribute_id, "removed shared attribute");
        }

        Ok(())
    }
}
