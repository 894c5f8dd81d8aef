// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use p2panda_attributes_core::{AttributeRole, DeletionInfo, DeletionStatus};
use p2panda_attributes_store::{AttributeListenerStore, AttributeStore, Transaction};
use tracing::debug;

use crate::attributes::{Attributes, is_held_by_recipient};
use crate::error::{AttributesError, ValidationResult};
use crate::event::AttributeEvent;

use super::{
    ItemContext, ItemProcessor, ItemType, ProtocolItem, check_role, clear_recipient_status,
    record_versions, restore_snapshots, wrong_item,
};

const ROLES: [AttributeRole; 3] = [
    AttributeRole::OwnIdentity,
    AttributeRole::OwnRelationship,
    AttributeRole::PeerRelationship,
];

/// Marks an attribute we disclosed as deleted by the recipient who sent the notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct ForwardedAttributeDeletedByPeerNotificationItemProcessor;

#[async_trait]
impl<S> ItemProcessor<S> for ForwardedAttributeDeletedByPeerNotificationItemProcessor
where
    S: AttributeStore + AttributeListenerStore + Transaction + 'static,
{
    fn item_type(&self) -> ItemType {
        ItemType::ForwardedAttributeDeletedByPeer
    }

    async fn check_prerequisites(
        &self,
        attributes: &Attributes<S>,
        item: &ProtocolItem,
        context: &ItemContext,
    ) -> ValidationResult {
        let ProtocolItem::ForwardedAttributeDeletedByPeer(item) = item else {
            return Err(wrong_item(ItemType::ForwardedAttributeDeletedByPeer, item));
        };

        let Some(attribute) = attributes.get_attribute(&item.attribute_id).await? else {
            return Ok(());
        };
        check_role(&attribute, &ROLES)?;

        if !is_held_by_recipient(&attribute, &context.sender) {
            return Err(AttributesError::SenderIsNotPeerOfSharedAttribute {
                id: item.attribute_id,
                sender: context.sender.clone(),
            });
        }
        Ok(())
    }

    async fn process(
        &self,
        attributes: &Attributes<S>,
        item: &ProtocolItem,
        context: &mut ItemContext,
    ) -> Result<Option<AttributeEvent>, AttributesError> {
        let ProtocolItem::ForwardedAttributeDeletedByPeer(item) = item else {
            return Err(wrong_item(ItemType::ForwardedAttributeDeletedByPeer, item));
        };
        context.mark_processed();

        if !record_versions(attributes, &item.attribute_id, context).await? {
            debug!(attribute_id = %item.attribute_id, "deleted attribute unknown, ignore");
            return Ok(None);
        }

        let peer = context.sender.clone();
        let deletion_info =
            DeletionInfo::new(DeletionStatus::DeletedByRecipient, context.received_at);
        let changed = attributes
            .set_recipient_deletion_info_of_attribute_and_predecessors(
                &item.attribute_id,
                &peer,
                Some(deletion_info),
                &[DeletionStatus::DeletedByRecipient],
            )
            .await?;

        if changed.is_empty() {
            return Ok(None);
        }
        Ok(Some(AttributeEvent::ForwardedDeletionInfoChanged {
            attributes: changed,
            peer,
        }))
    }

    async fn rollback(
        &self,
        attributes: &Attributes<S>,
        item: &ProtocolItem,
        context: &ItemContext,
    ) -> ValidationResult {
        let ProtocolItem::ForwardedAttributeDeletedByPeer(item) = item else {
            return Err(wrong_item(ItemType::ForwardedAttributeDeletedByPeer, item));
        };

        if restore_snapshots(attributes, context).await? {
            return Ok(());
        }
        clear_recipient_status(
            attributes,
            &item.attribute_id,
            &context.sender,
            DeletionStatus::DeletedByRecipient,
        )
        .await
    }
}
