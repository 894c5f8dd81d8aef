// SPDX-License-Identifier: MIT OR Apache-2.0

//! Version chains of attributes.
use std::collections::HashSet;

use p2panda_attributes_core::{
    Address, Attribute, AttributeContent, AttributeId, AttributeMetadata, AttributeRole,
    DeletionStatus, Reference, Timestamp,
};
use p2panda_attributes_store::{AttributeListenerStore, AttributeStore, Transaction};
use tracing::debug;

use crate::error::AttributesError;
use crate::event::AttributeEvent;

use super::Attributes;

/// Content and optional identifiers of a new version of an attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuccessorParams {
    pub content: AttributeContent,

    /// Id of the successor, generated from the content when not given. Received attributes are
    /// succeeded with the id chosen by their owner.
    pub id: Option<AttributeId>,

    /// Reference to the message the successor was received with.
    pub source_reference: Option<Reference>,
}

impl SuccessorParams {
    pub fn new(content: impl Into<AttributeContent>) -> Self {
        Self {
            content: content.into(),
            id: None,
            source_reference: None,
        }
    }

    pub fn with_id(mut self, id: AttributeId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_source_reference(mut self, source_reference: Reference) -> Self {
        self.source_reference = Some(source_reference);
        self
    }
}

/// Result of a succession, both attributes as they were stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Succession {
    pub predecessor: Attribute,
    pub successor: Attribute,
}

fn content_kind_matches(role: AttributeRole, content: &AttributeContent) -> bool {
    match role {
        AttributeRole::OwnIdentity | AttributeRole::PeerIdentity => {
            matches!(content, AttributeContent::Identity(_))
        }
        AttributeRole::OwnRelationship
        | AttributeRole::PeerRelationship
        | AttributeRole::ThirdPartyRelationship => {
            matches!(content, AttributeContent::Relationship(_))
        }
    }
}

/// Returns `true` if the peer of a received attribute finished deleting it.
fn is_deleted_by_peer(attribute: &Attribute) -> bool {
    let Some(status) = attribute
        .peer_sharing()
        .and_then(|details| details.deletion_info())
        .map(|info| info.status())
    else {
        return false;
    };

    match attribute.role() {
        AttributeRole::PeerIdentity | AttributeRole::PeerRelationship => {
            status == DeletionStatus::DeletedByOwner
        }
        AttributeRole::ThirdPartyRelationship => status == DeletionStatus::DeletedByPeer,
        AttributeRole::OwnIdentity | AttributeRole::OwnRelationship => false,
    }
}

impl<S> Attributes<S>
where
    S: AttributeStore + AttributeListenerStore + Transaction + 'static,
{
    /// Checks if the attribute can be succeeded with the given parameters.
    ///
    /// Returns the predecessor and the trimmed successor content. Checks run in a fixed order and
    /// stop at the first failure.
    pub async fn validate_succession(
        &self,
        role: AttributeRole,
        predecessor_id: &AttributeId,
        params: &SuccessorParams,
    ) -> Result<(Attribute, AttributeContent), AttributesError> {
        let predecessor = self
            .get_attribute(predecessor_id)
            .await?
            .ok_or(AttributesError::PredecessorDoesNotExist(*predecessor_id))?;

        if predecessor.role() != role || !content_kind_matches(role, &params.content) {
            return Err(AttributesError::WrongTypeOfAttribute {
                id: *predecessor_id,
                actual: predecessor.role(),
            });
        }

        if predecessor.succeeded_by().is_some() {
            return Err(AttributesError::CannotSucceedAttributesWithASuccessor(
                *predecessor_id,
            ));
        }

        if is_deleted_by_peer(&predecessor) {
            return Err(AttributesError::CannotSucceedSharedAttributesDeletedByPeer(
                *predecessor_id,
            ));
        }

        let content = params.content.trimmed();

        if content.owner() != predecessor.owner() {
            return Err(AttributesError::SuccessionMustNotChangeOwner);
        }

        if content.value_type() != predecessor.value_type() {
            return Err(AttributesError::SuccessionMustNotChangeValueType);
        }

        if content == predecessor.content() {
            return Err(AttributesError::SuccessionMustChangeContent);
        }

        if let Some(id) = &params.id
            && self.store.has_attribute(id).await?
        {
            return Err(AttributesError::SuccessorMustNotYetExist(*id));
        }

        self.validate_content(&content).await?;

        Ok((predecessor, content))
    }

    async fn succeed(
        &self,
        role: AttributeRole,
        predecessor_id: &AttributeId,
        params: SuccessorParams,
    ) -> Result<Succession, AttributesError> {
        let (predecessor, content) = self
            .validate_succession(role, predecessor_id, &params)
            .await?;

        let created_at = Timestamp::now();
        let metadata = match params.id {
            Some(id) => AttributeMetadata::new(id, created_at),
            None => AttributeMetadata::generate(&content, created_at),
        };
        let successor = predecessor
            .new_version(metadata, content, params.source_reference)
            .map_err(|err| AttributesError::from_attribute_error(*predecessor_id, err))?;

        let permit = self.store.begin().await?;
        let result = self.link_successor(predecessor, successor).await;
        let succession = self.finish(permit, result).await?;

        debug!(
            predecessor = %succession.predecessor.id(),
            successor = %succession.successor.id(),
            role = %role,
            "succeeded attribute"
        );

        self.publish(AttributeEvent::Succeeded {
            predecessor: succession.predecessor.clone(),
            successor: succession.successor.clone(),
        });
        Ok(succession)
    }

    async fn link_successor(
        &self,
        mut predecessor: Attribute,
        mut successor: Attribute,
    ) -> Result<Succession, AttributesError> {
        successor.metadata_mut().succeeds = Some(predecessor.id());
        predecessor.metadata_mut().succeeded_by = Some(successor.id());

        if self.config.default_management() && predecessor.is_default() {
            predecessor.set_default(false);
            successor.set_default(true);
        }

        self.store.insert_attribute(&successor).await?;
        self.store.update_attribute(&predecessor).await?;

        Ok(Succession {
            predecessor,
            successor,
        })
    }

    /// Replaces an attribute about the local identity with a new version.
    ///
    /// A default attribute passes its default flag on to the successor. Forwardings are not
    /// inherited and have to be established again per peer.
    pub async fn succeed_own_identity_attribute(
        &self,
        predecessor_id: &AttributeId,
        params: SuccessorParams,
    ) -> Result<Succession, AttributesError> {
        self.succeed(AttributeRole::OwnIdentity, predecessor_id, params)
            .await
    }

    pub async fn succeed_peer_identity_attribute(
        &self,
        predecessor_id: &AttributeId,
        params: SuccessorParams,
    ) -> Result<Succession, AttributesError> {
        self.succeed(AttributeRole::PeerIdentity, predecessor_id, params)
            .await
    }

    pub async fn succeed_own_relationship_attribute(
        &self,
        predecessor_id: &AttributeId,
        params: SuccessorParams,
    ) -> Result<Succession, AttributesError> {
        self.succeed(AttributeRole::OwnRelationship, predecessor_id, params)
            .await
    }

    pub async fn succeed_peer_relationship_attribute(
        &self,
        predecessor_id: &AttributeId,
        params: SuccessorParams,
    ) -> Result<Succession, AttributesError> {
        self.succeed(AttributeRole::PeerRelationship, predecessor_id, params)
            .await
    }

    pub async fn succeed_third_party_relationship_attribute(
        &self,
        predecessor_id: &AttributeId,
        params: SuccessorParams,
    ) -> Result<Succession, AttributesError> {
        self.succeed(AttributeRole::ThirdPartyRelationship, predecessor_id, params)
            .await
    }

    /// Succeeds an attribute of any role, dispatching on the role of the predecessor.
    pub async fn succeed_attribute(
        &self,
        predecessor_id: &AttributeId,
        params: SuccessorParams,
    ) -> Result<Succession, AttributesError> {
        let role = self
            .get_attribute(predecessor_id)
            .await?
            .ok_or(AttributesError::PredecessorDoesNotExist(*predecessor_id))?
            .role();
        self.succeed(role, predecessor_id, params).await
    }

    /// All versions of the attribute's chain, newest first.
    pub async fn get_versions_of_attribute(
        &self,
        id: &AttributeId,
    ) -> Result<Vec<Attribute>, AttributesError> {
        Ok(self.store.get_versions_of_attribute(id).await?)
    }

    /// Predecessors of the attribute, the direct predecessor first.
    pub async fn get_predecessors_of_attribute(
        &self,
        id: &AttributeId,
    ) -> Result<Vec<Attribute>, AttributesError> {
        let attribute = self.get_existing_attribute(id).await?;
        self.walk_chain(attribute.succeeds(), Attribute::succeeds)
            .await
    }

    /// Successors of the attribute, the direct successor first.
    pub async fn get_successors_of_attribute(
        &self,
        id: &AttributeId,
    ) -> Result<Vec<Attribute>, AttributesError> {
        let attribute = self.get_existing_attribute(id).await?;
        self.walk_chain(attribute.succeeded_by(), Attribute::succeeded_by)
            .await
    }

    /// The attribute followed by all of its predecessors.
    pub(crate) async fn get_attribute_and_predecessors(
        &self,
        id: &AttributeId,
    ) -> Result<Vec<Attribute>, AttributesError> {
        let attribute = self.get_existing_attribute(id).await?;
        let mut versions = self
            .walk_chain(attribute.succeeds(), Attribute::succeeds)
            .await?;
        versions.insert(0, attribute);
        Ok(versions)
    }

    async fn walk_chain(
        &self,
        start: Option<AttributeId>,
        next: fn(&Attribute) -> Option<AttributeId>,
    ) -> Result<Vec<Attribute>, AttributesError> {
        let mut seen = HashSet::new();
        let mut chain = Vec::new();
        let mut cursor = start;

        while let Some(id) = cursor {
            if !seen.insert(id) {
                break;
            }
            // A dangling link ends the chain.
            let Some(attribute) = self.store.get_attribute(&id).await? else {
                break;
            };
            cursor = next(&attribute);
            chain.push(attribute);
        }

        Ok(chain)
    }

    /// Returns `true` if `successor` is reached from `predecessor` by following `succeeded_by`
    /// at least once.
    pub async fn is_subsequent_in_succession(
        &self,
        predecessor: &AttributeId,
        successor: &AttributeId,
    ) -> Result<bool, AttributesError> {
        let successors = self.get_successors_of_attribute(predecessor).await?;
        Ok(successors
            .iter()
            .any(|attribute| &attribute.id() == successor))
    }

    /// Versions of the attribute's chain which the peer holds a copy of, newest first.
    ///
    /// With `latest_only` at most the newest of them is returned.
    pub async fn get_versions_of_attribute_shared_with_peer(
        &self,
        id: &AttributeId,
        peer: &Address,
        latest_only: bool,
    ) -> Result<Vec<Attribute>, AttributesError> {
        let mut versions: Vec<Attribute> = self
            .get_versions_of_attribute(id)
            .await?
            .into_iter()
            .filter(|version| version.is_shared_with(peer))
            .collect();

        if latest_only {
            versions.truncate(1);
        }
        Ok(versions)
    }

    /// Peers which hold a predecessor of the attribute but not the attribute itself, each with
    /// the newest predecessor they hold.
    pub async fn get_peers_with_exclusively_forwarded_predecessors(
        &self,
        id: &AttributeId,
    ) -> Result<Vec<(Address, AttributeId)>, AttributesError> {
        let attribute = self.get_existing_attribute(id).await?;
        let predecessors = self.get_predecessors_of_attribute(id).await?;

        let mut peers: Vec<(Address, AttributeId)> = Vec::new();
        for predecessor in predecessors {
            let Some(forwardings) = predecessor.forwardings() else {
                continue;
            };

            for peer in forwardings.active_peers() {
                if attribute.is_forwarded_to(peer)
                    || peers.iter().any(|(listed, _)| listed == peer)
                {
                    continue;
                }
                peers.push((peer.clone(), predecessor.id()));
            }
        }

        Ok(peers)
    }
}
