// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use p2panda_attributes_core::AttributeRole;
use p2panda_attributes_store::{AttributeListenerStore, AttributeStore, Transaction};
use tracing::debug;

use crate::attributes::{Attributes, SuccessorParams};
use crate::error::{AttributesError, ValidationResult};
use crate::event::AttributeEvent;

use super::{
    ItemContext, ItemProcessor, ItemType, PeerSharedAttributeSucceededNotificationItem,
    ProtocolItem, check_role, check_sender_is_peer, restore_snapshots, wrong_item,
};

const ROLES: [AttributeRole; 3] = [
    AttributeRole::PeerIdentity,
    AttributeRole::PeerRelationship,
    AttributeRole::ThirdPartyRelationship,
];

fn successor_params(
    item: &PeerSharedAttributeSucceededNotificationItem,
    context: &ItemContext,
) -> SuccessorParams {
    SuccessorParams::new(item.successor_content.clone())
        .with_id(item.successor_id)
        .with_source_reference(context.reference.clone())
}

/// Stores the new version of an attribute the peer shared with us.
#[derive(Clone, Copy, Debug, Default)]
pub struct PeerSharedAttributeSucceededNotificationItemProcessor;

#[async_trait]
impl<S> ItemProcessor<S> for PeerSharedAttributeSucceededNotificationItemProcessor
where
    S: AttributeStore + AttributeListenerStore + Transaction + 'static,
{
    fn item_type(&self) -> ItemType {
        ItemType::PeerSharedAttributeSucceeded
    }

    async fn check_prerequisites(
        &self,
        attributes: &Attributes<S>,
        item: &ProtocolItem,
        context: &ItemContext,
    ) -> ValidationResult {
        let ProtocolItem::PeerSharedAttributeSucceeded(item) = item else {
            return Err(wrong_item(ItemType::PeerSharedAttributeSucceeded, item));
        };

        let Some(predecessor) = attributes.get_attribute(&item.predecessor_id).await? else {
            return Ok(());
        };
        check_role(&predecessor, &ROLES)?;
        check_sender_is_peer(&predecessor, &context.sender)?;

        attributes
            .validate_succession(
                predecessor.role(),
                &item.predecessor_id,
                &successor_params(item, context),
            )
            .await?;
        Ok(())
    }

    async fn process(
        &self,
        attributes: &Attributes<S>,
        item: &ProtocolItem,
        context: &mut ItemContext,
    ) -> Result<Option<AttributeEvent>, AttributesError> {
        let ProtocolItem::PeerSharedAttributeSucceeded(item) = item else {
            return Err(wrong_item(ItemType::PeerSharedAttributeSucceeded, item));
        };
        context.mark_processed();

        let Some(predecessor) = attributes.get_attribute(&item.predecessor_id).await? else {
            debug!(
                predecessor = %item.predecessor_id,
                "succeeded attribute unknown, ignore"
            );
            return Ok(None);
        };
        context.record(&predecessor);

        let succession = attributes
            .succeed_attribute(&item.predecessor_id, successor_params(item, context))
            .await?;
        context.record_absent(succession.successor.id());

        Ok(Some(AttributeEvent::Succeeded {
            predecessor: succession.predecessor,
            successor: succession.successor,
        }))
    }

    async fn rollback(
        &self,
        attributes: &Attributes<S>,
        item: &ProtocolItem,
        context: &ItemContext,
    ) -> ValidationResult {
        let ProtocolItem::PeerSharedAttributeSucceeded(item) = item else {
            return Err(wrong_item(ItemType::PeerSharedAttributeSucceeded, item));
        };

        if restore_snapshots(attributes, context).await? {
            return Ok(());
        }

        // Only undo a succession which links exactly these two attributes.
        let Some(successor) = attributes.get_attribute(&item.successor_id).await? else {
            return Ok(());
        };
        if successor.succeeds() != Some(item.predecessor_id) {
            return Ok(());
        }

        attributes.store().delete_attribute(&item.successor_id).await?;
        if let Some(mut predecessor) = attributes.get_attribute(&item.predecessor_id).await?
            && predecessor.succeeded_by() == Some(item.successor_id)
        {
            predecessor.metadata_mut().succeeded_by = None;
            attributes.update_attribute_unsafe(&predecessor).await?;
        }

        debug!(
            predecessor = %item.predecessor_id,
            successor = %item.successor_id,
            "rolled back succession"
        );
        Ok(())
    }
}
