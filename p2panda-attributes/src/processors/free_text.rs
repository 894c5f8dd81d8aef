// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use p2panda_attributes_core::ContentError;
use p2panda_attributes_core::validation::forbidden_characters_in_text;
use p2panda_attributes_store::{AttributeListenerStore, AttributeStore, Transaction};

use crate::attributes::Attributes;
use crate::error::{AttributesError, ValidationResult};
use crate::event::AttributeEvent;

use super::{ItemContext, ItemProcessor, ItemType, ProtocolItem, wrong_item};

/// Checks the free text we answer with, nothing is stored.
#[derive(Clone, Copy, Debug, Default)]
pub struct FreeTextRequestItemProcessor;

#[async_trait]
impl<S> ItemProcessor<S> for FreeTextRequestItemProcessor
where
    S: AttributeStore + AttributeListenerStore + Transaction + 'static,
{
    fn item_type(&self) -> ItemType {
        ItemType::FreeText
    }

    async fn check_prerequisites(
        &self,
        _attributes: &Attributes<S>,
        item: &ProtocolItem,
        _context: &ItemContext,
    ) -> ValidationResult {
        let ProtocolItem::FreeText(_, accept) = item else {
            return Err(wrong_item(ItemType::FreeText, item));
        };

        let forbidden = forbidden_characters_in_text(&accept.free_text);
        if forbidden.is_empty() {
            return Ok(());
        }
        Err(ContentError::ForbiddenCharacters(forbidden).into())
    }

    async fn process(
        &self,
        _attributes: &Attributes<S>,
        item: &ProtocolItem,
        _context: &mut ItemContext,
    ) -> Result<Option<AttributeEvent>, AttributesError> {
        if !matches!(item, ProtocolItem::FreeText(..)) {
            return Err(wrong_item(ItemType::FreeText, item));
        }
        Ok(None)
    }

    async fn rollback(
        &self,
        _attributes: &Attributes<S>,
        item: &ProtocolItem,
        _context: &ItemContext,
    ) -> ValidationResult {
        if !matches!(item, ProtocolItem::FreeText(..)) {
            return Err(wrong_item(ItemType::FreeText, item));
        }
        Ok(())
    }
}
