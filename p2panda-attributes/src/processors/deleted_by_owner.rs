// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use p2panda_attributes_core::{AttributeRole, DeletionInfo, DeletionStatus};
use p2panda_attributes_store::{AttributeListenerStore, AttributeStore, Transaction};
use tracing::debug;

use crate::attributes::Attributes;
use crate::error::{AttributesError, ValidationResult};
use crate::event::AttributeEvent;

use super::{
    ItemContext, ItemProcessor, ItemType, ProtocolItem, check_role, check_sender_is_peer,
    clear_peer_status, record_versions, restore_snapshots, wrong_item,
};

const ROLES: [AttributeRole; 2] = [AttributeRole::PeerIdentity, AttributeRole::PeerRelationship];

/// Marks a received attribute and its predecessors as deleted by their owner.
#[derive(Clone, Copy, Debug, Default)]
pub struct OwnAttributeDeletedByOwnerNotificationItemProcessor;

#[async_trait]
impl<S> ItemProcessor<S> for OwnAttributeDeletedByOwnerNotificationItemProcessor
where
    S: AttributeStore + AttributeListenerStore + Transaction + 'static,
{
    fn item_type(&self) -> ItemType {
        ItemType::OwnAttributeDeletedByOwner
    }

    async fn check_prerequisites(
        &self,
        attributes: &Attributes<S>,
        item: &ProtocolItem,
        context: &ItemContext,
    ) -> ValidationResult {
        let ProtocolItem::OwnAttributeDeletedByOwner(item) = item else {
            return Err(wrong_item(ItemType::OwnAttributeDeletedByOwner, item));
        };

        let Some(attribute) = attributes.get_attribute(&item.attribute_id).await? else {
            return Ok(());
        };
        check_role(&attribute, &ROLES)?;
        check_sender_is_peer(&attribute, &context.sender)
    }

    async fn process(
        &self,
        attributes: &Attributes<S>,
        item: &ProtocolItem,
        context: &mut ItemContext,
    ) -> Result<Option<AttributeEvent>, AttributesError> {
        let ProtocolItem::OwnAttributeDeletedByOwner(item) = item else {
            return Err(wrong_item(ItemType::OwnAttributeDeletedByOwner, item));
        };
        context.mark_processed();

        if !record_versions(attributes, &item.attribute_id, context).await? {
            debug!(attribute_id = %item.attribute_id, "deleted attribute unknown, ignore");
            return Ok(None);
        }

        let deletion_info = DeletionInfo::new(DeletionStatus::DeletedByOwner, context.received_at);
        let changed = attributes
            .set_peer_deletion_info_of_attribute_and_predecessors(
                &item.attribute_id,
                Some(deletion_info),
                &[DeletionStatus::DeletedByOwner],
            )
            .await?;

        if changed.is_empty() {
            return Ok(None);
        }
        Ok(Some(AttributeEvent::PeerDeletionInfoChanged {
            attributes: changed,
        }))
    }

    async fn rollback(
        &self,
        attributes: &Attributes<S>,
        item: &ProtocolItem,
        context: &ItemContext,
    ) -> ValidationResult {
        let ProtocolItem::OwnAttributeDeletedByOwner(item) = item else {
            return Err(wrong_item(ItemType::OwnAttributeDeletedByOwner, item));
        };

        if restore_snapshots(attributes, context).await? {
            return Ok(());
        }
        clear_peer_status(attributes, &item.attribute_id, DeletionStatus::DeletedByOwner).await
    }
}
