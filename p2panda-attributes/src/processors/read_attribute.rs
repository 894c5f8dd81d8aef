// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use p2panda_attributes_core::{
    Attribute, AttributeMetadata, AttributeRole, OwnIdentityAttribute, Timestamp,
};
use p2panda_attributes_store::{
    AttributeListenerStore, AttributeQuery, AttributeStore, Transaction,
};
use tracing::debug;

use crate::attributes::Attributes;
use crate::error::{AttributesError, ValidationResult};
use crate::event::AttributeEvent;

use super::{
    ItemContext, ItemProcessor, ItemType, ProtocolItem, ReadAttributeAcceptParams, check_role,
    restore_snapshots, wrong_item,
};

const ROLES: [AttributeRole; 3] = [
    AttributeRole::OwnIdentity,
    AttributeRole::OwnRelationship,
    AttributeRole::PeerRelationship,
];

fn check_query(query: &AttributeQuery, attribute: &Attribute) -> ValidationResult {
    if query.matches(attribute) {
        return Ok(());
    }
    Err(AttributesError::AttributeQueryMismatch(attribute.id()))
}

/// Answers a read request of a peer by disclosing one of our attributes, either an existing one
/// or one created for the answer.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReadAttributeRequestItemProcessor;

#[async_trait]
impl<S> ItemProcessor<S> for ReadAttributeRequestItemProcessor
where
    S: AttributeStore + AttributeListenerStore + Transaction + 'static,
{
    fn item_type(&self) -> ItemType {
        ItemType::ReadAttribute
    }

    async fn check_prerequisites(
        &self,
        attributes: &Attributes<S>,
        item: &ProtocolItem,
        context: &ItemContext,
    ) -> ValidationResult {
        let ProtocolItem::ReadAttribute(item, accept) = item else {
            return Err(wrong_item(ItemType::ReadAttribute, item));
        };

        match accept {
            ReadAttributeAcceptParams::Existing { attribute_id } => {
                let attribute = attributes.get_existing_attribute(attribute_id).await?;
                check_role(&attribute, &ROLES)?;
                check_query(&item.query, &attribute)?;
                attributes.validate_forwarding(&attribute, &context.sender)
            }
            ReadAttributeAcceptParams::New { content } => {
                let content = content.trimmed();
                if content.owner() != attributes.local_address() {
                    return Err(AttributesError::WrongOwner {
                        expected: attributes.local_address().clone(),
                        actual: content.owner().clone(),
                    });
                }

                let generic = content.clone().into();
                attributes.validate_content(&generic).await?;

                let candidate: Attribute = OwnIdentityAttribute::new(
                    AttributeMetadata::generate(&generic, Timestamp::now()),
                    content,
                )
                .into();
                check_query(&item.query, &candidate)
            }
        }
    }

    async fn process(
        &self,
        attributes: &Attributes<S>,
        item: &ProtocolItem,
        context: &mut ItemContext,
    ) -> Result<Option<AttributeEvent>, AttributesError> {
        let ProtocolItem::ReadAttribute(_, accept) = item else {
            return Err(wrong_item(ItemType::ReadAttribute, item));
        };
        context.mark_processed();

        let attribute_id = match accept {
            ReadAttributeAcceptParams::Existing { attribute_id } => {
                let Some(attribute) = attributes.get_attribute(attribute_id).await? else {
                    debug!(attribute_id = %attribute_id, "attribute to read unknown, ignore");
                    return Ok(None);
                };
                context.record(&attribute);
                *attribute_id
            }
            ReadAttributeAcceptParams::New { content } => {
                let attribute = attributes
                    .create_own_identity_attribute(content.clone())
                    .await?;
                context.record_absent(attribute.id());
                attribute.id()
            }
        };

        let sender = context.sender.clone();
        let attribute = attributes
            .add_forwarding_details_to_attribute(&attribute_id, &sender, context.reference.clone())
            .await?;

        Ok(Some(AttributeEvent::ForwardingDetailsChanged {
            attribute,
            peer: sender,
        }))
    }

    async fn rollback(
        &self,
        attributes: &Attributes<S>,
        item: &ProtocolItem,
        context: &ItemContext,
    ) -> ValidationResult {
        let ProtocolItem::ReadAttribute(_, accept) = item else {
            return Err(wrong_item(ItemType::ReadAttribute, item));
        };

        if restore_snapshots(attributes, context).await? {
            return Ok(());
        }

        let forwarded_with_item = |attribute: &Attribute| {
            attribute
                .forwardings()
                .and_then(|forwardings| forwardings.get(&context.sender))
                .is_some_and(|details| details.source_reference() == &context.reference)
        };

        match accept {
            ReadAttributeAcceptParams::Existing { attribute_id } => {
                let Some(mut attribute) = attributes.get_attribute(attribute_id).await? else {
                    return Ok(());
                };
                if !forwarded_with_item(&attribute) {
                    return Ok(());
                }
                if let Some(forwardings) = attribute.forwardings_mut() {
                    forwardings.remove(&context.sender);
                }
                attributes.update_attribute_unsafe(&attribute).await?;
                debug!(attribute_id = %attribute_id, "removed forwarding of read attribute");
            }
            ReadAttributeAcceptParams::New { content } => {
                let query = AttributeQuery::new()
                    .role(AttributeRole::OwnIdentity)
                    .owner(attributes.local_address())
                    .forwarded_to(&context.sender);
                let content = content.trimmed();

                for attribute in attributes.query_attributes(&query).await? {
                    if attribute.identity_content() == Some(&content)
                        && forwarded_with_item(&attribute)
                    {
                        attributes.store().delete_attribute(&attribute.id()).await?;
                        debug!(attribute_id = %attribute.id(), "removed created read attribute");
                    }
                }
            }
        }

        Ok(())
    }
}
