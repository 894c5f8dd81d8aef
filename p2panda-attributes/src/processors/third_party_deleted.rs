// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use p2panda_attributes_core::{AttributeRole, DeletionInfo, DeletionStatus};
use p2panda_attributes_store::{AttributeListenerStore, AttributeStore, Transaction};
use tracing::debug;

use crate::attributes::{Attributes, is_held_by_recipient};
use crate::error::{AttributesError, ValidationResult};
use crate::event::AttributeEvent;

use super::{
    ItemContext, ItemProcessor, ItemType, ProtocolItem, check_role, check_sender_is_peer,
    clear_peer_status, clear_recipient_status, record_versions, restore_snapshots, wrong_item,
};

const ROLES: [AttributeRole; 3] = [
    AttributeRole::ThirdPartyRelationship,
    AttributeRole::OwnRelationship,
    AttributeRole::PeerRelationship,
];

/// Handles a peer deleting a relationship attribute which is a third party attribute for one of
/// the sides.
///
/// For a third party attribute we hold, the sender is the peer who disclosed it to us and the
/// attribute becomes deleted by peer, overwriting any earlier status. For a relationship attribute
/// we forwarded, the sender is the recipient holding it as a third party attribute and the
/// forwarding becomes deleted by recipient.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThirdPartyRelationshipAttributeDeletedByPeerNotificationItemProcessor;

#[async_trait]
impl<S> ItemProcessor<S> for ThirdPartyRelationshipAttributeDeletedByPeerNotificationItemProcessor
where
    S: AttributeStore + AttributeListenerStore + Transaction + 'static,
{
    fn item_type(&self) -> ItemType {
        ItemType::ThirdPartyRelationshipAttributeDeletedByPeer
    }

    async fn check_prerequisites(
        &self,
        attributes: &Attributes<S>,
        item: &ProtocolItem,
        context: &ItemContext,
    ) -> ValidationResult {
        let ProtocolItem::ThirdPartyRelationshipAttributeDeletedByPeer(item) = item else {
            return Err(wrong_item(
                ItemType::ThirdPartyRelationshipAttributeDeletedByPeer,
                item,
            ));
        };

        let Some(attribute) = attributes.get_attribute(&item.attribute_id).await? else {
            return Ok(());
        };
        check_role(&attribute, &ROLES)?;

        if attribute.role() == AttributeRole::ThirdPartyRelationship {
            return check_sender_is_peer(&attribute, &context.sender);
        }

        if attribute
            .forwardings()
            .is_some_and(|forwardings| forwardings.get(&context.sender).is_some())
        {
            return Ok(());
        }
        Err(AttributesError::SenderIsNotPeerOfSharedAttribute {
            id: item.attribute_id,
            sender: context.sender.clone(),
        })
    }

    async fn process(
        &self,
        attributes: &Attributes<S>,
        item: &ProtocolItem,
        context: &mut ItemContext,
    ) -> Result<Option<AttributeEvent>, AttributesError> {
        let ProtocolItem::ThirdPartyRelationshipAttributeDeletedByPeer(item) = item else {
            return Err(wrong_item(
                ItemType::ThirdPartyRelationshipAttributeDeletedByPeer,
                item,
            ));
        };
        context.mark_processed();

        let Some(attribute) = attributes.get_attribute(&item.attribute_id).await? else {
            debug!(attribute_id = %item.attribute_id, "deleted attribute unknown, ignore");
            return Ok(None);
        };
        record_versions(attributes, &item.attribute_id, context).await?;

        if attribute.role() == AttributeRole::ThirdPartyRelationship {
            let deletion_info =
                DeletionInfo::new(DeletionStatus::DeletedByPeer, context.received_at);
            let changed = attributes
                .set_peer_deletion_info_of_attribute_and_predecessors(
                    &item.attribute_id,
                    Some(deletion_info),
                    &[],
                )
                .await?;

            if changed.is_empty() {
                return Ok(None);
            }
            return Ok(Some(AttributeEvent::PeerDeletionInfoChanged {
                attributes: changed,
            }));
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
        let ProtocolItem::ThirdPartyRelationshipAttributeDeletedByPeer(item) = item else {
            return Err(wrong_item(
                ItemType::ThirdPartyRelationshipAttributeDeletedByPeer,
                item,
            ));
        };

        if restore_snapshots(attributes, context).await? {
            return Ok(());
        }

        let Some(attribute) = attributes.get_attribute(&item.attribute_id).await? else {
            return Ok(());
        };

        if attribute.role() == AttributeRole::ThirdPartyRelationship {
            clear_peer_status(attributes, &item.attribute_id, DeletionStatus::DeletedByPeer).await
        } else if is_held_by_recipient(&attribute, &context.sender) {
            clear_recipient_status(
                attributes,
                &item.attribute_id,
                &context.sender,
                DeletionStatus::DeletedByRecipient,
            )
            .await
        } else {
            Ok(())
        }
    }
}
