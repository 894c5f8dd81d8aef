// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use p2panda_attributes_store::{AttributeListenerStore, AttributeStore, Transaction};

use crate::attributes::Attributes;
use crate::error::{AttributesError, ValidationResult};
use crate::event::AttributeEvent;

use super::{ItemContext, ItemProcessor, ItemType, ProtocolItem, wrong_item};

/// Registers a listener of the sender, identified by the reference of the request.
#[derive(Clone, Copy, Debug, Default)]
pub struct RegisterAttributeListenerRequestItemProcessor;

#[async_trait]
impl<S> ItemProcessor<S> for RegisterAttributeListenerRequestItemProcessor
where
    S: AttributeStore + AttributeListenerStore + Transaction + 'static,
{
    fn item_type(&self) -> ItemType {
        ItemType::RegisterAttributeListener
    }

    async fn check_prerequisites(
        &self,
        attributes: &Attributes<S>,
        item: &ProtocolItem,
        context: &ItemContext,
    ) -> ValidationResult {
        if !matches!(item, ProtocolItem::RegisterAttributeListener(_)) {
            return Err(wrong_item(ItemType::RegisterAttributeListener, item));
        }

        if attributes
            .get_attribute_listener(&context.reference)
            .await?
            .is_some()
        {
            return Err(AttributesError::ListenerAlreadyExists(
                context.reference.clone(),
            ));
        }
        Ok(())
    }

    async fn process(
        &self,
        attributes: &Attributes<S>,
        item: &ProtocolItem,
        context: &mut ItemContext,
    ) -> Result<Option<AttributeEvent>, AttributesError> {
        let ProtocolItem::RegisterAttributeListener(item) = item else {
            return Err(wrong_item(ItemType::RegisterAttributeListener, item));
        };
        context.mark_processed();

        let listener = attributes
            .register_attribute_listener(
                context.reference.clone(),
                item.query.clone(),
                &context.sender,
            )
            .await?;
        context.record_listener(listener.id.clone());
        Ok(Some(AttributeEvent::ListenerRegistered { listener }))
    }

    async fn rollback(
        &self,
        attributes: &Attributes<S>,
        item: &ProtocolItem,
        context: &ItemContext,
    ) -> ValidationResult {
        if !matches!(item, ProtocolItem::RegisterAttributeListener(_)) {
            return Err(wrong_item(ItemType::RegisterAttributeListener, item));
        }

        if context.was_processed() {
            if context.registered_listener(&context.reference) {
                attributes.delete_attribute_listener(&context.reference).await?;
            }
            return Ok(());
        }

        // Listeners registered by another sender under the same reference stay.
        if let Some(listener) = attributes.get_attribute_listener(&context.reference).await?
            && listener.peer == context.sender
        {
            attributes.delete_attribute_listener(&context.reference).await?;
        }
        Ok(())
    }
}
