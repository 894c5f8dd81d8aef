// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deleting attributes and tracking where shared attributes are in the deletion handshake.
use p2panda_attributes_core::{
    Address, Attribute, AttributeId, AttributeRole, DeletionInfo, DeletionStatus,
};
use p2panda_attributes_store::{AttributeListenerStore, AttributeQuery, AttributeStore, Transaction};
use tracing::{debug, trace};

use crate::error::{AttributesError, ValidationResult};
use crate::event::AttributeEvent;

use super::Attributes;

/// Outcome of the full deletion of an attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FullDeletion {
    /// Ids of all deleted attributes, the requested one first.
    pub deleted: Vec<AttributeId>,

    /// Own identity attribute which became the new default of its value type.
    pub promoted_default: Option<AttributeId>,
}

/// Sharing structure of one version which holds the deletion state for a recipient peer.
enum RecipientSharing {
    /// The recipient is the anchor peer of an own relationship attribute.
    Peer,

    /// The recipient received the attribute through a forwarding.
    Forwarding,
}

fn recipient_sharing(attribute: &Attribute, peer: &Address) -> Option<RecipientSharing> {
    if attribute.role() == AttributeRole::OwnRelationship && attribute.peer() == Some(peer) {
        return Some(RecipientSharing::Peer);
    }

    attribute
        .forwardings()
        .and_then(|forwardings| forwardings.get(peer))
        .map(|_| RecipientSharing::Forwarding)
}

/// Current deletion status a recipient peer has for the attribute.
pub(crate) fn recipient_deletion_status(
    attribute: &Attribute,
    peer: &Address,
) -> Option<DeletionStatus> {
    let info = match recipient_sharing(attribute, peer)? {
        RecipientSharing::Peer => attribute.peer_sharing()?.deletion_info(),
        RecipientSharing::Forwarding => attribute.forwardings()?.get(peer)?.deletion_info(),
    };
    info.map(DeletionInfo::status)
}

/// Returns `true` if the attribute holds a copy for the peer in any of its sharing structures.
pub(crate) fn is_held_by_recipient(attribute: &Attribute, peer: &Address) -> bool {
    recipient_sharing(attribute, peer).is_some()
}

fn keeps(current: Option<&DeletionInfo>, keep: &[DeletionStatus]) -> bool {
    current.is_some_and(|info| keep.contains(&info.status()))
}

impl<S> Attributes<S>
where
    S: AttributeStore + AttributeListenerStore + Transaction + 'static,
{
    /// Deletes a single attribute and detaches it from its neighbours in the version chain.
    pub async fn delete_attribute(&self, id: &AttributeId) -> Result<Attribute, AttributesError> {
        let attribute = self.get_existing_attribute(id).await?;

        let permit = self.store.begin().await?;
        let result = self.delete_and_detach(&attribute).await;
        self.finish(permit, result).await?;
        debug!(attribute_id = %id, "deleted attribute");

        self.publish(AttributeEvent::Deleted {
            attributes: vec![attribute.clone()],
            promoted_default: None,
        });
        Ok(attribute)
    }

    async fn delete_and_detach(&self, attribute: &Attribute) -> ValidationResult {
        if let Some(successor_id) = attribute.succeeded_by()
            && let Some(mut successor) = self.store.get_attribute(&successor_id).await?
        {
            successor.metadata_mut().succeeds = None;
            self.store.update_attribute(&successor).await?;
        }

        if let Some(predecessor_id) = attribute.succeeds()
            && let Some(mut predecessor) = self.store.get_attribute(&predecessor_id).await?
        {
            predecessor.metadata_mut().succeeded_by = None;
            self.store.update_attribute(&predecessor).await?;
        }

        self.store.delete_attribute(&attribute.id()).await?;
        Ok(())
    }

    /// Checks if the attribute and its predecessors can be deleted.
    pub async fn validate_full_attribute_deletion_process(
        &self,
        id: &AttributeId,
    ) -> ValidationResult {
        let attribute = self.get_existing_attribute(id).await?;

        if let Some(successor_id) = attribute.succeeded_by()
            && !self.store.has_attribute(&successor_id).await?
        {
            return Err(AttributesError::SuccessorDoesNotExist(successor_id));
        }

        Ok(())
    }

    /// Deletes the attribute together with all of its predecessors.
    ///
    /// A remaining successor loses its link to the deleted chain. If the deleted attribute was a
    /// default own identity attribute, the newest remaining attribute of the same value type
    /// becomes the default.
    pub async fn execute_full_attribute_deletion_process(
        &self,
        id: &AttributeId,
    ) -> Result<FullDeletion, AttributesError> {
        self.validate_full_attribute_deletion_process(id).await?;
        let versions = self.get_attribute_and_predecessors(id).await?;

        let permit = self.store.begin().await?;
        let result = self.delete_versions(&versions).await;
        let deletion = self.finish(permit, result).await?;

        debug!(
            attribute_id = %id,
            deleted = deletion.deleted.len(),
            promoted_default = ?deletion.promoted_default,
            "deleted attribute and predecessors"
        );

        self.publish(AttributeEvent::Deleted {
            attributes: versions,
            promoted_default: deletion.promoted_default,
        });
        Ok(deletion)
    }

    async fn delete_versions(
        &self,
        versions: &[Attribute],
    ) -> Result<FullDeletion, AttributesError> {
        let Some(target) = versions.first() else {
            return Ok(FullDeletion {
                deleted: Vec::new(),
                promoted_default: None,
            });
        };

        if let Some(successor_id) = target.succeeded_by()
            && let Some(mut successor) = self.store.get_attribute(&successor_id).await?
        {
            successor.metadata_mut().succeeds = None;
            self.store.update_attribute(&successor).await?;
        }

        let mut deleted = Vec::with_capacity(versions.len());
        for version in versions {
            self.store.delete_attribute(&version.id()).await?;
            deleted.push(version.id());
        }

        let promoted_default = match versions.iter().find(|version| version.is_default()) {
            Some(default) if self.config.default_management() => {
                self.promote_default(default.owner(), default.value_type())
                    .await?
            }
            _ => None,
        };

        Ok(FullDeletion {
            deleted,
            promoted_default,
        })
    }

    /// Makes the newest own identity attribute of the value type which was not succeeded the
    /// default.
    async fn promote_default(
        &self,
        owner: &Address,
        value_type: &str,
    ) -> Result<Option<AttributeId>, AttributesError> {
        let query = AttributeQuery::new()
            .role(AttributeRole::OwnIdentity)
            .owner(owner)
            .value_type(value_type)
            .only_latest();

        let Some(mut candidate) = self.store.query_attributes(&query).await?.pop() else {
            trace!(value_type, "no attribute left to promote to default");
            return Ok(None);
        };

        candidate.set_default(true);
        self.store.update_attribute(&candidate).await?;
        Ok(Some(candidate.id()))
    }

    /// Overwrites the deletion info of the attribute's peer sharing details.
    pub async fn set_peer_deletion_info_of_attribute(
        &self,
        id: &AttributeId,
        deletion_info: Option<DeletionInfo>,
    ) -> Result<Attribute, AttributesError> {
        let mut attribute = self.get_existing_attribute(id).await?;
        attribute.set_peer_deletion_info(deletion_info)?;
        self.store.update_attribute(&attribute).await?;
        debug!(attribute_id = %id, deletion_info = ?deletion_info, "set peer deletion info");

        self.publish(AttributeEvent::PeerDeletionInfoChanged {
            attributes: vec![attribute.clone()],
        });
        Ok(attribute)
    }

    /// Overwrites the deletion info of the attribute's forwarding details for a peer.
    pub async fn set_forwarded_deletion_info_of_attribute(
        &self,
        id: &AttributeId,
        peer: &Address,
        deletion_info: Option<DeletionInfo>,
    ) -> Result<Attribute, AttributesError> {
        let mut attribute = self.get_existing_attribute(id).await?;
        attribute
            .set_forwarded_deletion_info(peer, deletion_info)
            .map_err(|err| AttributesError::from_attribute_error(*id, err))?;
        self.store.update_attribute(&attribute).await?;
        debug!(
            attribute_id = %id,
            peer = %peer,
            deletion_info = ?deletion_info,
            "set forwarded deletion info"
        );

        self.publish(AttributeEvent::ForwardedDeletionInfoChanged {
            attributes: vec![attribute.clone()],
            peer: peer.clone(),
        });
        Ok(attribute)
    }

    /// Sets the peer deletion info on the attribute and all of its predecessors.
    ///
    /// Versions whose current status is listed in `keep` are left untouched. Returns the changed
    /// versions, nothing is published if none changed.
    pub async fn set_peer_deletion_info_of_attribute_and_predecessors(
        &self,
        id: &AttributeId,
        deletion_info: Option<DeletionInfo>,
        keep: &[DeletionStatus],
    ) -> Result<Vec<Attribute>, AttributesError> {
        let versions = self.get_attribute_and_predecessors(id).await?;

        let mut changed = Vec::new();
        for mut version in versions {
            let current = version
                .peer_sharing()
                .and_then(|details| details.deletion_info())
                .copied();
            if keeps(current.as_ref(), keep) || current == deletion_info {
                continue;
            }
            version.set_peer_deletion_info(deletion_info)?;
            changed.push(version);
        }

        self.update_versions(&changed).await?;
        if changed.is_empty() {
            trace!(attribute_id = %id, "peer deletion info unchanged");
            return Ok(changed);
        }

        debug!(
            attribute_id = %id,
            versions = changed.len(),
            deletion_info = ?deletion_info,
            "set peer deletion info of attribute and predecessors"
        );
        self.publish(AttributeEvent::PeerDeletionInfoChanged {
            attributes: changed.clone(),
        });
        Ok(changed)
    }

    /// Sets the deletion info a recipient peer has on the attribute and all of its
    /// predecessors.
    ///
    /// The recipient is either the anchor peer of an own relationship attribute or a peer the
    /// attribute was forwarded to. Versions the peer never received and versions whose current
    /// status is listed in `keep` are left untouched.
    pub async fn set_recipient_deletion_info_of_attribute_and_predecessors(
        &self,
        id: &AttributeId,
        peer: &Address,
        deletion_info: Option<DeletionInfo>,
        keep: &[DeletionStatus],
    ) -> Result<Vec<Attribute>, AttributesError> {
        let versions = self.get_attribute_and_predecessors(id).await?;

        let mut changed = Vec::new();
        for mut version in versions {
            let Some(sharing) = recipient_sharing(&version, peer) else {
                continue;
            };

            let version_id = version.id();
            match sharing {
                RecipientSharing::Peer => {
                    let current = version
                        .peer_sharing()
                        .and_then(|details| details.deletion_info());
                    if keeps(current, keep) || current == deletion_info.as_ref() {
                        continue;
                    }
                    version.set_peer_deletion_info(deletion_info)?;
                }
                RecipientSharing::Forwarding => {
                    let current = version
                        .forwardings()
                        .and_then(|forwardings| forwardings.get(peer))
                        .and_then(|details| details.deletion_info());
                    if keeps(current, keep) || current == deletion_info.as_ref() {
                        continue;
                    }
                    version
                        .set_forwarded_deletion_info(peer, deletion_info)
                        .map_err(|err| AttributesError::from_attribute_error(version_id, err))?;
                }
            }
            changed.push(version);
        }

        self.update_versions(&changed).await?;
        if changed.is_empty() {
            trace!(attribute_id = %id, peer = %peer, "recipient deletion info unchanged");
            return Ok(changed);
        }

        debug!(
            attribute_id = %id,
            peer = %peer,
            versions = changed.len(),
            deletion_info = ?deletion_info,
            "set recipient deletion info of attribute and predecessors"
        );
        self.publish(AttributeEvent::ForwardedDeletionInfoChanged {
            attributes: changed.clone(),
            peer: peer.clone(),
        });
        Ok(changed)
    }

    async fn update_versions(&self, versions: &[Attribute]) -> ValidationResult {
        if versions.is_empty() {
            return Ok(());
        }

        let permit = self.store.begin().await?;
        let mut result = Ok(());
        for version in versions {
            if let Err(err) = self.store.update_attribute(version).await {
                result = Err(err.into());
                break;
            }
        }
        self.finish(permit, result).await
    }
}
