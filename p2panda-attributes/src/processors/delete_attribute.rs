// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use p2panda_attributes_core::{
    Address, Attribute, AttributeId, AttributeRole, DeletionInfo, DeletionStatus, Timestamp,
};
use p2panda_attributes_store::{AttributeListenerStore, AttributeStore, Transaction};
use tracing::debug;

use crate::attributes::{Attributes, is_held_by_recipient, recipient_deletion_status};
use crate::error::{AttributesError, ValidationResult};
use crate::event::AttributeEvent;

use super::{
    ItemContext, ItemProcessor, ItemType, ProtocolItem, check_role, check_sender_is_peer,
    clear_peer_status, record_versions, restore_snapshots, wrong_item,
};

const INCOMING_ROLES: [AttributeRole; 2] =
    [AttributeRole::PeerIdentity, AttributeRole::PeerRelationship];

const OUTGOING_ROLES: [AttributeRole; 3] = [
    AttributeRole::OwnIdentity,
    AttributeRole::OwnRelationship,
    AttributeRole::PeerRelationship,
];

/// How a recipient answered our request to delete an attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutgoingDeletionResponse {
    /// The request left, no answer yet.
    Sent,

    /// The recipient will delete the attribute at the given date.
    Accepted { deletion_date: Timestamp },

    Rejected,
}

/// Handles requests of a peer to delete an attribute of theirs which we hold, and tracks our own
/// requests of that kind.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeleteAttributeRequestItemProcessor;

impl DeleteAttributeRequestItemProcessor {
    /// Checks if we can ask the recipient to delete their copy of one of our attributes.
    pub async fn can_create_outgoing<S>(
        attributes: &Attributes<S>,
        attribute_id: &AttributeId,
        recipient: &Address,
    ) -> ValidationResult
    where
        S: AttributeStore + AttributeListenerStore + Transaction + 'static,
    {
        let attribute = attributes.get_existing_attribute(attribute_id).await?;
        check_role(&attribute, &OUTGOING_ROLES)?;

        if !is_held_by_recipient(&attribute, recipient) {
            return Err(AttributesError::AttributeNotSharedWithPeer {
                id: *attribute_id,
                peer: recipient.clone(),
            });
        }

        if recipient_deletion_status(&attribute, recipient)
            == Some(DeletionStatus::DeletedByRecipient)
        {
            return Err(AttributesError::AttributeAlreadyDeletedByPeer {
                id: *attribute_id,
                peer: recipient.clone(),
            });
        }

        Ok(())
    }

    /// Records the state of our deletion request on the attribute and its predecessors.
    ///
    /// Versions the recipient deleted already keep that status.
    pub async fn apply_outgoing_response<S>(
        attributes: &Attributes<S>,
        attribute_id: &AttributeId,
        recipient: &Address,
        response: OutgoingDeletionResponse,
    ) -> Result<Vec<Attribute>, AttributesError>
    where
        S: AttributeStore + AttributeListenerStore + Transaction + 'static,
    {
        let deletion_info = match response {
            OutgoingDeletionResponse::Sent => {
                DeletionInfo::new(DeletionStatus::DeletionRequestSent, Timestamp::now())
            }
            OutgoingDeletionResponse::Accepted { deletion_date } => {
                DeletionInfo::new(DeletionStatus::ToBeDeletedByRecipient, deletion_date)
            }
            OutgoingDeletionResponse::Rejected => {
                DeletionInfo::new(DeletionStatus::DeletionRequestRejected, Timestamp::now())
            }
        };

        attributes
            .set_recipient_deletion_info_of_attribute_and_predecessors(
                attribute_id,
                recipient,
                Some(deletion_info),
                &[DeletionStatus::DeletedByRecipient],
            )
            .await
    }
}

#[async_trait]
impl<S> ItemProcessor<S> for DeleteAttributeRequestItemProcessor
where
    S: AttributeStore + AttributeListenerStore + Transaction + 'static,
{
    fn item_type(&self) -> ItemType {
        ItemType::DeleteAttribute
    }

    async fn check_prerequisites(
        &self,
        attributes: &Attributes<S>,
        item: &ProtocolItem,
        context: &ItemContext,
    ) -> ValidationResult {
        let ProtocolItem::DeleteAttribute(item, _) = item else {
            return Err(wrong_item(ItemType::DeleteAttribute, item));
        };

        let Some(attribute) = attributes.get_attribute(&item.attribute_id).await? else {
            return Ok(());
        };
        check_role(&attribute, &INCOMING_ROLES)?;
        check_sender_is_peer(&attribute, &context.sender)?;

        let status = attribute
            .peer_sharing()
            .and_then(|details| details.deletion_info())
            .map(DeletionInfo::status);
        if status == Some(DeletionStatus::DeletedByOwner) {
            return Err(AttributesError::AttributeAlreadyDeletedByPeer {
                id: item.attribute_id,
                peer: context.sender.clone(),
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
        let ProtocolItem::DeleteAttribute(item, accept) = item else {
            return Err(wrong_item(ItemType::DeleteAttribute, item));
        };
        context.mark_processed();

        if !record_versions(attributes, &item.attribute_id, context).await? {
            debug!(attribute_id = %item.attribute_id, "attribute to delete unknown, ignore");
            return Ok(None);
        }

        let deletion_info = DeletionInfo::new(DeletionStatus::ToBeDeleted, accept.deletion_date);
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
        let ProtocolItem::DeleteAttribute(item, _) = item else {
            return Err(wrong_item(ItemType::DeleteAttribute, item));
        };

        if restore_snapshots(attributes, context).await? {
            return Ok(());
        }
        clear_peer_status(attributes, &item.attribute_id, DeletionStatus::ToBeDeleted).await
    }
}
