// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;
use std::fmt;

use p2panda_attributes_store::{AttributeListenerStore, AttributeStore, Transaction};
use tracing::{debug, warn};

use crate::attributes::Attributes;
use crate::error::{AttributesError, ValidationResult};
use crate::event::AttributeEvent;

use super::{
    DeleteAttributeRequestItemProcessor, FormFieldRequestItemProcessor,
    ForwardedAttributeDeletedByPeerNotificationItemProcessor, FreeTextRequestItemProcessor,
    ItemContext, ItemProcessor, ItemType, OwnAttributeDeletedByOwnerNotificationItemProcessor,
    PeerSharedAttributeSucceededNotificationItemProcessor, ProtocolItem,
    ReadAttributeRequestItemProcessor, RegisterAttributeListenerRequestItemProcessor,
    ShareAttributeRequestItemProcessor,
    ThirdPartyRelationshipAttributeDeletedByPeerNotificationItemProcessor,
};

/// Looks up the processor of an item by its type.
pub struct ProcessorRegistry<S>
where
    S: AttributeStore + AttributeListenerStore + Transaction + 'static,
{
    processors: HashMap<ItemType, Box<dyn ItemProcessor<S>>>,
}

impl<S> ProcessorRegistry<S>
where
    S: AttributeStore + AttributeListenerStore + Transaction + 'static,
{
    /// Registry without any processors.
    pub fn new() -> Self {
        Self {
            processors: HashMap::new(),
        }
    }

    /// Registry with one processor for every item type.
    pub fn with_default_processors() -> Self {
        let mut registry = Self::new();
        registry.register(OwnAttributeDeletedByOwnerNotificationItemProcessor);
        registry.register(ForwardedAttributeDeletedByPeerNotificationItemProcessor);
        registry.register(ThirdPartyRelationshipAttributeDeletedByPeerNotificationItemProcessor);
        registry.register(PeerSharedAttributeSucceededNotificationItemProcessor);
        registry.register(DeleteAttributeRequestItemProcessor);
        registry.register(ShareAttributeRequestItemProcessor);
        registry.register(ReadAttributeRequestItemProcessor);
        registry.register(FormFieldRequestItemProcessor);
        registry.register(FreeTextRequestItemProcessor);
        registry.register(RegisterAttributeListenerRequestItemProcessor);
        registry
    }

    /// Registers a processor, replacing an earlier one for the same item type.
    pub fn register<P>(&mut self, processor: P)
    where
        P: ItemProcessor<S> + 'static,
    {
        let item_type = processor.item_type();
        if self
            .processors
            .insert(item_type, Box::new(processor))
            .is_some()
        {
            warn!(%item_type, "replaced item processor");
        }
    }

    pub fn get(&self, item_type: ItemType) -> Option<&dyn ItemProcessor<S>> {
        self.processors.get(&item_type).map(|processor| processor.as_ref())
    }

    fn processor(&self, item: &ProtocolItem) -> Result<&dyn ItemProcessor<S>, AttributesError> {
        self.get(item.item_type())
            .ok_or(AttributesError::NoProcessorForItem(item.item_type()))
    }

    pub async fn check_prerequisites(
        &self,
        attributes: &Attributes<S>,
        item: &ProtocolItem,
        context: &ItemContext,
    ) -> ValidationResult {
        self.processor(item)?
            .check_prerequisites(attributes, item, context)
            .await
    }

    pub async fn process(
        &self,
        attributes: &Attributes<S>,
        item: &ProtocolItem,
        context: &mut ItemContext,
    ) -> Result<Option<AttributeEvent>, AttributesError> {
        let event = self.processor(item)?.process(attributes, item, context).await?;
        debug!(
            item_type = %item.item_type(),
            reference = %context.reference,
            sender = %context.sender,
            changed = event.is_some(),
            "processed item"
        );
        Ok(event)
    }

    pub async fn rollback(
        &self,
        attributes: &Attributes<S>,
        item: &ProtocolItem,
        context: &ItemContext,
    ) -> ValidationResult {
        self.processor(item)?.rollback(attributes, item, context).await?;
        debug!(
            item_type = %item.item_type(),
            reference = %context.reference,
            "rolled back item"
        );
        Ok(())
    }
}

impl<S> Default for ProcessorRegistry<S>
where
    S: AttributeStore + AttributeListenerStore + Transaction + 'static,
{
    fn default() -> Self {
        Self::with_default_processors()
    }
}

impl<S> fmt::Debug for ProcessorRegistry<S>
where
    S: AttributeStore + AttributeListenerStore + Transaction + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut item_types: Vec<&ItemType> = self.processors.keys().collect();
        item_types.sort();
        f.debug_struct("ProcessorRegistry")
            .field("item_types", &item_types)
            .finish()
    }
}
