// SPDX-License-Identifier: MIT OR Apache-2.0

//! Processors for incoming notification and request items which act on attributes.
//!
//! Every item type has one processor implementing [`ItemProcessor`]. The outer controllers
//! first run [`ItemProcessor::check_prerequisites`], which never mutates anything, then
//! [`ItemProcessor::process`] which applies exactly one state transition. If a later step of the
//! outer controller fails, [`ItemProcessor::rollback`] undoes that transition.
//!
//! Processing captures the previous state of all touched attributes in the [`ItemContext`].
//! Rolling back with that context restores the captured state exactly, rolling back with a fresh
//! context falls back to undoing what the processor would have done. Missing attributes make both
//! `process` and `rollback` a no-op.
mod context;
mod delete_attribute;
mod deleted_by_owner;
mod deleted_by_peer;
mod form_field;
mod free_text;
mod item;
mod read_attribute;
mod register_listener;
mod registry;
mod share_attribute;
mod succeeded;
mod third_party_deleted;

use async_trait::async_trait;
use p2panda_attributes_core::{Address, Attribute, AttributeId, AttributeRole, DeletionStatus};
use p2panda_attributes_store::{AttributeListenerStore, AttributeStore, Transaction};
use tracing::trace;

use crate::attributes::{Attributes, recipient_deletion_status};
use crate::error::{AttributesError, ValidationResult};
use crate::event::AttributeEvent;

pub use context::ItemContext;
pub use delete_attribute::{DeleteAttributeRequestItemProcessor, OutgoingDeletionResponse};
pub use deleted_by_owner::OwnAttributeDeletedByOwnerNotificationItemProcessor;
pub use deleted_by_peer::ForwardedAttributeDeletedByPeerNotificationItemProcessor;
pub use form_field::{FormFieldRequestItemProcessor, validate_form_field_response};
pub use free_text::FreeTextRequestItemProcessor;
pub use item::{
    DeleteAttributeAcceptParams, DeleteAttributeRequestItem,
    ForwardedAttributeDeletedByPeerNotificationItem, FormFieldAcceptParams, FormFieldRequestItem,
    FormFieldSettings, FreeTextAcceptParams, FreeTextRequestItem, ItemType,
    OwnAttributeDeletedByOwnerNotificationItem, PeerSharedAttributeSucceededNotificationItem,
    ProtocolItem, ReadAttributeAcceptParams, ReadAttributeRequestItem,
    RegisterAttributeListenerRequestItem, ShareAttributeRequestItem,
    ThirdPartyRelationshipAttributeDeletedByPeerNotificationItem,
};
pub use read_attribute::ReadAttributeRequestItemProcessor;
pub use register_listener::RegisterAttributeListenerRequestItemProcessor;
pub use registry::ProcessorRegistry;
pub use share_attribute::ShareAttributeRequestItemProcessor;
pub use succeeded::PeerSharedAttributeSucceededNotificationItemProcessor;
pub use third_party_deleted::ThirdPartyRelationshipAttributeDeletedByPeerNotificationItemProcessor;

/// Check, apply and undo one type of item.
#[async_trait]
pub trait ItemProcessor<S>: Send + Sync
where
    S: AttributeStore + AttributeListenerStore + Transaction + 'static,
{
    /// Item type this processor handles.
    fn item_type(&self) -> ItemType;

    /// Checks if the item can be processed, without mutating anything.
    ///
    /// Items referring to a shared attribute fail if the sender is not the peer of that
    /// attribute. Unknown attributes are accepted where a stale item is harmless.
    async fn check_prerequisites(
        &self,
        attributes: &Attributes<S>,
        item: &ProtocolItem,
        context: &ItemContext,
    ) -> ValidationResult;

    /// Applies the item and returns the resulting event, `None` if there was nothing to do.
    async fn process(
        &self,
        attributes: &Attributes<S>,
        item: &ProtocolItem,
        context: &mut ItemContext,
    ) -> Result<Option<AttributeEvent>, AttributesError>;

    /// Undoes what [`ItemProcessor::process`] did with the same item.
    async fn rollback(
        &self,
        attributes: &Attributes<S>,
        item: &ProtocolItem,
        context: &ItemContext,
    ) -> ValidationResult;
}

fn wrong_item(expected: ItemType, item: &ProtocolItem) -> AttributesError {
    AttributesError::WrongItemType {
        expected,
        actual: item.item_type(),
    }
}

fn check_role(attribute: &Attribute, roles: &[AttributeRole]) -> ValidationResult {
    if roles.contains(&attribute.role()) {
        return Ok(());
    }
    Err(AttributesError::WrongTypeOfAttribute {
        id: attribute.id(),
        actual: attribute.role(),
    })
}

/// Fails if the sender is not the peer the attribute was received from.
fn check_sender_is_peer(attribute: &Attribute, sender: &Address) -> ValidationResult {
    if attribute.peer() == Some(sender) {
        return Ok(());
    }
    Err(AttributesError::SenderIsNotPeerOfSharedAttribute {
        id: attribute.id(),
        sender: sender.clone(),
    })
}

/// Captures the attribute and all of its predecessors, returns `false` if it does not exist.
async fn record_versions<S>(
    attributes: &Attributes<S>,
    id: &AttributeId,
    context: &mut ItemContext,
) -> Result<bool, AttributesError>
where
    S: AttributeStore + AttributeListenerStore + Transaction + 'static,
{
    if !attributes.store().has_attribute(id).await? {
        return Ok(false);
    }

    for version in attributes.get_attribute_and_predecessors(id).await? {
        context.record(&version);
    }
    Ok(true)
}

/// Writes all captured states back, returns `false` if the context was never processed.
async fn restore_snapshots<S>(
    attributes: &Attributes<S>,
    context: &ItemContext,
) -> Result<bool, AttributesError>
where
    S: AttributeStore + AttributeListenerStore + Transaction + 'static,
{
    if !context.was_processed() {
        return Ok(false);
    }

    if !context.has_snapshots() {
        trace!(reference = %context.reference, "nothing captured to restore");
        return Ok(true);
    }

    let permit = attributes.store().begin().await?;
    let result = write_snapshots(attributes, context).await;
    attributes.finish(permit, result).await?;

    trace!(
        reference = %context.reference,
        attributes = context.snapshots().len(),
        "restored attributes"
    );
    Ok(true)
}

async fn write_snapshots<S>(attributes: &Attributes<S>, context: &ItemContext) -> ValidationResult
where
    S: AttributeStore + AttributeListenerStore + Transaction + 'static,
{
    let store = attributes.store();

    for (id, snapshot) in context.snapshots() {
        let exists = store.has_attribute(id).await?;
        match snapshot {
            Some(attribute) if exists => attributes.update_attribute_unsafe(attribute).await?,
            Some(attribute) => store.insert_attribute(attribute).await?,
            None if exists => {
                store.delete_attribute(id).await?;
            }
            None => (),
        }
    }

    Ok(())
}

/// Clears a peer deletion status on the attribute and its predecessors wherever it is set.
async fn clear_peer_status<S>(
    attributes: &Attributes<S>,
    id: &AttributeId,
    status: DeletionStatus,
) -> ValidationResult
where
    S: AttributeStore + AttributeListenerStore + Transaction + 'static,
{
    if !attributes.store().has_attribute(id).await? {
        return Ok(());
    }

    for mut version in attributes.get_attribute_and_predecessors(id).await? {
        let current = version
            .peer_sharing()
            .and_then(|details| details.deletion_info())
            .map(|info| info.status());
        if current != Some(status) {
            continue;
        }
        version.set_peer_deletion_info(None)?;
        attributes.update_attribute_unsafe(&version).await?;
    }

    Ok(())
}

/// Clears a deletion status a recipient peer has on the attribute and its predecessors.
async fn clear_recipient_status<S>(
    attributes: &Attributes<S>,
    id: &AttributeId,
    peer: &Address,
    status: DeletionStatus,
) -> ValidationResult
where
    S: AttributeStore + AttributeListenerStore + Transaction + 'static,
{
    if !attributes.store().has_attribute(id).await? {
        return Ok(());
    }

    for mut version in attributes.get_attribute_and_predecessors(id).await? {
        if recipient_deletion_status(&version, peer) != Some(status) {
            continue;
        }

        let version_id = version.id();
        if version.role() == AttributeRole::OwnRelationship && version.peer() == Some(peer) {
            version.set_peer_deletion_info(None)?;
        } else {
            version
                .set_forwarded_deletion_info(peer, None)
                .map_err(|err| AttributesError::from_attribute_error(version_id, err))?;
        }
        attributes.update_attribute_unsafe(&version).await?;
    }

    Ok(())
}
