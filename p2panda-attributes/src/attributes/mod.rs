// SPDX-License-Identifier: MIT OR Apache-2.0

//! Controller for locally held attributes.
mod deletion;
mod forwarding;
mod listeners;
mod succession;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use p2panda_attributes_core::validation::validate_characters;
use p2panda_attributes_core::{
    Address, Attribute, AttributeContent, AttributeId, AttributeMetadata, AttributeRole,
    AttributeTagCollection, IdentityAttribute, OwnIdentityAttribute, OwnRelationshipAttribute,
    PeerIdentityAttribute, PeerRelationshipAttribute, PeerSharingDetails, Reference,
    RelationshipAttribute, ThirdPartyRelationshipAttribute, Timestamp,
};
use p2panda_attributes_store::{AttributeListenerStore, AttributeQuery, AttributeStore, Transaction};
use tokio::sync::broadcast;
use tracing::debug;

use crate::config::Config;
use crate::error::{AttributesError, ValidationResult};
use crate::event::{AttributeEvent, EventBus};
use crate::tags::{TagClient, TagCollectionCache};

pub use deletion::FullDeletion;
pub(crate) use deletion::{is_held_by_recipient, recipient_deletion_status};
pub use succession::{Succession, SuccessorParams};

/// Attributes of one local identity.
///
/// All mutations are validated against the rules of the attribute data model before they reach
/// the store, multi-step mutations are applied within one store transaction. Every successful
/// mutation publishes exactly one [`AttributeEvent`].
#[derive(Debug)]
pub struct Attributes<S> {
    store: S,
    config: Config,
    tags: TagCollectionCache,
    events: EventBus,
}

impl<S> Attributes<S>
where
    S: AttributeStore + AttributeListenerStore + Transaction + 'static,
{
    pub fn new(store: S, config: Config, tag_client: Arc<dyn TagClient>) -> Self {
        let tags = TagCollectionCache::new(tag_client, config.tag_cache_lifetime());
        let events = EventBus::new(config.event_capacity());

        Self {
            store,
            config,
            tags,
            events,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn local_address(&self) -> &Address {
        self.config.local_address()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AttributeEvent> {
        self.events.subscribe()
    }

    pub fn tag_cache(&self) -> &TagCollectionCache {
        &self.tags
    }

    /// Current tag collection of the tag-definition service.
    pub async fn get_attribute_tag_collection(
        &self,
    ) -> Result<AttributeTagCollection, AttributesError> {
        Ok(self.tags.get().await?)
    }

    pub(crate) fn publish(&self, event: AttributeEvent) {
        self.events.publish(event);
    }

    /// Commits the transaction if the result is ok and rolls it back otherwise.
    pub(crate) async fn finish<T>(
        &self,
        permit: S::Permit,
        result: Result<T, AttributesError>,
    ) -> Result<T, AttributesError> {
        match result {
            Ok(value) => {
                self.store.commit(permit).await?;
                Ok(value)
            }
            Err(err) => {
                self.store.rollback(permit).await?;
                Err(err)
            }
        }
    }

    /// Checks content for forbidden characters and tags unknown to the tag collection.
    pub async fn validate_content(&self, content: &AttributeContent) -> ValidationResult {
        validate_characters(content)?;

        if let Some(tags) = content.tags()
            && !tags.is_empty()
        {
            let collection = self.get_attribute_tag_collection().await?;
            collection.validate_tags(content.value_type(), tags)?;
        }

        Ok(())
    }

    fn check_owner(expected: &Address, actual: &Address) -> ValidationResult {
        if expected != actual {
            return Err(AttributesError::WrongOwner {
                expected: expected.clone(),
                actual: actual.clone(),
            });
        }
        Ok(())
    }

    async fn insert_new(&self, attribute: Attribute) -> Result<Attribute, AttributesError> {
        let id = attribute.id();
        if self.store.has_attribute(&id).await? {
            return Err(AttributesError::AttributeAlreadyExists(id));
        }

        self.store.insert_attribute(&attribute).await?;
        debug!(attribute_id = %id, role = %attribute.role(), "created attribute");

        self.publish(AttributeEvent::Created {
            attribute: attribute.clone(),
        });
        Ok(attribute)
    }

    /// Creates an attribute about the local identity.
    ///
    /// With default management enabled the first attribute of a value type becomes its default.
    pub async fn create_own_identity_attribute(
        &self,
        content: IdentityAttribute,
    ) -> Result<Attribute, AttributesError> {
        let content = content.trimmed();
        Self::check_owner(self.local_address(), content.owner())?;

        let generic: AttributeContent = content.clone().into();
        self.validate_content(&generic).await?;

        let metadata = AttributeMetadata::generate(&generic, Timestamp::now());
        let mut attribute: Attribute = OwnIdentityAttribute::new(metadata, content).into();

        if self.config.default_management()
            && self
                .get_default_own_identity_attribute(attribute.value_type())
                .await?
                .is_none()
        {
            attribute.set_default(true);
        }

        self.insert_new(attribute).await
    }

    /// Stores an attribute about the identity of a peer, received from that peer.
    pub async fn create_peer_identity_attribute(
        &self,
        id: AttributeId,
        content: IdentityAttribute,
        peer: &Address,
        source_reference: Reference,
    ) -> Result<Attribute, AttributesError> {
        let content = content.trimmed();
        Self::check_owner(peer, content.owner())?;
        self.validate_content(&content.clone().into()).await?;

        let now = Timestamp::now();
        let sharing = PeerSharingDetails::new(peer.clone(), source_reference, now);
        let attribute =
            PeerIdentityAttribute::new(AttributeMetadata::new(id, now), content, sharing);
        self.insert_new(attribute.into()).await
    }

    /// Creates a relationship attribute owned by us and shared with the given peer.
    pub async fn create_own_relationship_attribute(
        &self,
        content: RelationshipAttribute,
        peer: &Address,
        source_reference: Reference,
    ) -> Result<Attribute, AttributesError> {
        let content = content.trimmed();
        Self::check_owner(self.local_address(), content.owner())?;

        let generic: AttributeContent = content.clone().into();
        self.validate_content(&generic).await?;

        let now = Timestamp::now();
        let sharing = PeerSharingDetails::new(peer.clone(), source_reference, now);
        let attribute = OwnRelationshipAttribute::new(
            AttributeMetadata::generate(&generic, now),
            content,
            sharing,
        );
        self.insert_new(attribute.into()).await
    }

    /// Stores a relationship attribute owned by a peer, received from that peer.
    pub async fn create_peer_relationship_attribute(
        &self,
        id: AttributeId,
        content: RelationshipAttribute,
        peer: &Address,
        source_reference: Reference,
    ) -> Result<Attribute, AttributesError> {
        let content = content.trimmed();
        Self::check_owner(peer, content.owner())?;
        self.validate_content(&content.clone().into()).await?;

        let now = Timestamp::now();
        let sharing = PeerSharingDetails::new(peer.clone(), source_reference, now);
        let attribute =
            PeerRelationshipAttribute::new(AttributeMetadata::new(id, now), content, sharing);
        self.insert_new(attribute.into()).await
    }

    /// Stores a relationship attribute of a third party which the given peer disclosed to us.
    pub async fn create_third_party_relationship_attribute(
        &self,
        id: AttributeId,
        content: RelationshipAttribute,
        peer: &Address,
        source_reference: Reference,
        initial_attribute_peer: &Address,
    ) -> Result<Attribute, AttributesError> {
        let content = content.trimmed();
        self.validate_content(&content.clone().into()).await?;

        let now = Timestamp::now();
        let sharing = PeerSharingDetails::new(peer.clone(), source_reference, now);
        let attribute = ThirdPartyRelationshipAttribute::new(
            AttributeMetadata::new(id, now),
            content,
            sharing,
            initial_attribute_peer.clone(),
        );
        self.insert_new(attribute.into()).await
    }

    pub async fn get_attribute(
        &self,
        id: &AttributeId,
    ) -> Result<Option<Attribute>, AttributesError> {
        Ok(self.store.get_attribute(id).await?)
    }

    /// Like [`Attributes::get_attribute`] but fails if the attribute does not exist.
    pub async fn get_existing_attribute(
        &self,
        id: &AttributeId,
    ) -> Result<Attribute, AttributesError> {
        self.store
            .get_attribute(id)
            .await?
            .ok_or(AttributesError::AttributeNotFound(*id))
    }

    pub async fn query_attributes(
        &self,
        query: &AttributeQuery,
    ) -> Result<Vec<Attribute>, AttributesError> {
        Ok(self.store.query_attributes(query).await?)
    }

    /// Overwrites a stored attribute without any validation.
    ///
    /// Meant for trusted internal callers which restore known states, for example rollbacks.
    pub async fn update_attribute_unsafe(&self, attribute: &Attribute) -> ValidationResult {
        Ok(self.store.update_attribute(attribute).await?)
    }

    /// Sets the moment the attribute was first looked at, later calls keep the first value.
    pub async fn mark_attribute_as_viewed(
        &self,
        id: &AttributeId,
    ) -> Result<Attribute, AttributesError> {
        let mut attribute = self.get_existing_attribute(id).await?;
        if attribute.metadata().was_viewed_at.is_some() {
            return Ok(attribute);
        }

        attribute.metadata_mut().was_viewed_at = Some(Timestamp::now());
        self.store.update_attribute(&attribute).await?;
        debug!(attribute_id = %id, "marked attribute as viewed");

        self.publish(AttributeEvent::WasViewedAtChanged {
            attribute: attribute.clone(),
        });
        Ok(attribute)
    }

    /// Default own identity attribute of the local identity for a value type.
    pub async fn get_default_own_identity_attribute(
        &self,
        value_type: &str,
    ) -> Result<Option<Attribute>, AttributesError> {
        let query = AttributeQuery::new()
            .role(AttributeRole::OwnIdentity)
            .owner(self.local_address())
            .value_type(value_type)
            .is_default(true);
        Ok(self.store.query_attributes(&query).await?.into_iter().next())
    }

    /// Makes an own identity attribute the default of its value type, unsetting the previous
    /// default.
    pub async fn set_as_default_own_identity_attribute(
        &self,
        id: &AttributeId,
    ) -> Result<Attribute, AttributesError> {
        if !self.config.default_management() {
            return Err(AttributesError::DefaultManagementDisabled);
        }

        let attribute = self.get_existing_attribute(id).await?;
        if attribute.role() != AttributeRole::OwnIdentity {
            return Err(AttributesError::WrongTypeOfAttribute {
                id: *id,
                actual: attribute.role(),
            });
        }
        if attribute.succeeded_by().is_some() {
            return Err(AttributesError::CannotSetSucceededAttributeAsDefault(*id));
        }
        if attribute.is_default() {
            return Ok(attribute);
        }

        let permit = self.store.begin().await?;
        let result = self.swap_default(attribute).await;
        let (attribute, previous_default) = self.finish(permit, result).await?;
        debug!(attribute_id = %id, previous = ?previous_default, "changed default attribute");

        self.publish(AttributeEvent::DefaultChanged {
            attribute: attribute.clone(),
            previous_default,
        });
        Ok(attribute)
    }

    async fn swap_default(
        &self,
        mut attribute: Attribute,
    ) -> Result<(Attribute, Option<AttributeId>), AttributesError> {
        let previous = self
            .get_default_own_identity_attribute(attribute.value_type())
            .await?;

        let previous_default = match previous {
            Some(mut previous) => {
                previous.set_default(false);
                self.store.update_attribute(&previous).await?;
                Some(previous.id())
            }
            None => None,
        };

        attribute.set_default(true);
        self.store.update_attribute(&attribute).await?;
        Ok((attribute, previous_default))
    }
}
