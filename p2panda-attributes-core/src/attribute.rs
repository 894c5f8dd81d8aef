// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attributes in their five roles.
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::Address;
use crate::content::{AttributeContent, IdentityAttribute, RelationshipAttribute};
use crate::deletion::{DeletionInfo, DeletionStatusError, SharingTarget, validate_deletion_status};
use crate::forwarding::{ForwardingError, Forwardings};
use crate::id::{AttributeId, Reference};
use crate::timestamp::Timestamp;
use crate::value::AttributeValue;

/// Role of an attribute, fixed when it gets created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AttributeRole {
    OwnIdentity,
    PeerIdentity,
    OwnRelationship,
    PeerRelationship,
    ThirdPartyRelationship,
}

impl AttributeRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeRole::OwnIdentity => "OwnIdentityAttribute",
            AttributeRole::PeerIdentity => "PeerIdentityAttribute",
            AttributeRole::OwnRelationship => "OwnRelationshipAttribute",
            AttributeRole::PeerRelationship => "PeerRelationshipAttribute",
            AttributeRole::ThirdPartyRelationship => "ThirdPartyRelationshipAttribute",
        }
    }

    /// Returns `true` if attributes of this role were received from a peer.
    pub fn is_received(&self) -> bool {
        matches!(
            self,
            AttributeRole::PeerIdentity
                | AttributeRole::PeerRelationship
                | AttributeRole::ThirdPartyRelationship
        )
    }
}

impl fmt::Display for AttributeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fields every attribute carries, regardless of its role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeMetadata {
    id: AttributeId,
    pub created_at: Timestamp,
    pub succeeds: Option<AttributeId>,
    pub succeeded_by: Option<AttributeId>,
    pub was_viewed_at: Option<Timestamp>,
}

impl AttributeMetadata {
    pub fn new(id: AttributeId, created_at: Timestamp) -> Self {
        Self {
            id,
            created_at,
            succeeds: None,
            succeeded_by: None,
            was_viewed_at: None,
        }
    }

    /// Metadata with a fresh id derived from the content, creation time and a random salt.
    pub fn generate(content: &AttributeContent, created_at: Timestamp) -> Self {
        let salt: [u8; 16] = rand::random();
        let id = AttributeId::from_content(&content.to_bytes(), created_at.as_millis(), &salt);
        Self::new(id, created_at)
    }

    pub fn id(&self) -> AttributeId {
        self.id
    }
}

/// Peer an attribute was received from, or for own relationship attributes, the anchor peer it
/// was shared with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerSharingDetails {
    pub peer: Address,
    pub source_reference: Reference,
    pub shared_at: Timestamp,
    deletion_info: Option<DeletionInfo>,
}

impl PeerSharingDetails {
    pub fn new(peer: Address, source_reference: Reference, shared_at: Timestamp) -> Self {
        Self {
            peer,
            source_reference,
            shared_at,
            deletion_info: None,
        }
    }

    pub fn deletion_info(&self) -> Option<&DeletionInfo> {
        self.deletion_info.as_ref()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnIdentityAttribute {
    pub metadata: AttributeMetadata,
    pub content: IdentityAttribute,
    pub is_default: bool,
    pub forwardings: Forwardings,
}

impl OwnIdentityAttribute {
    pub fn new(metadata: AttributeMetadata, content: IdentityAttribute) -> Self {
        Self {
            metadata,
            content,
            is_default: false,
            forwardings: Forwardings::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerIdentityAttribute {
    pub metadata: AttributeMetadata,
    pub content: IdentityAttribute,
    pub peer_sharing: PeerSharingDetails,
}

impl PeerIdentityAttribute {
    pub fn new(
        metadata: AttributeMetadata,
        content: IdentityAttribute,
        peer_sharing: PeerSharingDetails,
    ) -> Self {
        Self {
            metadata,
            content,
            peer_sharing,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnRelationshipAttribute {
    pub metadata: AttributeMetadata,
    pub content: RelationshipAttribute,
    pub peer_sharing: PeerSharingDetails,
    pub forwardings: Forwardings,
}

impl OwnRelationshipAttribute {
    pub fn new(
        metadata: AttributeMetadata,
        content: RelationshipAttribute,
        peer_sharing: PeerSharingDetails,
    ) -> Self {
        Self {
            metadata,
            content,
            peer_sharing,
            forwardings: Forwardings::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerRelationshipAttribute {
    pub metadata: AttributeMetadata,
    pub content: RelationshipAttribute,
    pub peer_sharing: PeerSharingDetails,
    pub forwardings: Forwardings,
}

impl PeerRelationshipAttribute {
    pub fn new(
        metadata: AttributeMetadata,
        content: RelationshipAttribute,
        peer_sharing: PeerSharingDetails,
    ) -> Self {
        Self {
            metadata,
            content,
            peer_sharing,
            forwardings: Forwardings::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThirdPartyRelationshipAttribute {
    pub metadata: AttributeMetadata,
    pub content: RelationshipAttribute,
    pub peer_sharing: PeerSharingDetails,

    /// Peer of the relationship the attribute was originally created in.
    pub initial_attribute_peer: Address,
}

impl ThirdPartyRelationshipAttribute {
    pub fn new(
        metadata: AttributeMetadata,
        content: RelationshipAttribute,
        peer_sharing: PeerSharingDetails,
        initial_attribute_peer: Address,
    ) -> Self {
        Self {
            metadata,
            content,
            peer_sharing,
            initial_attribute_peer,
        }
    }
}

/// Locally held attribute in exactly one of its five roles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role")]
pub enum Attribute {
    OwnIdentity(OwnIdentityAttribute),
    PeerIdentity(PeerIdentityAttribute),
    OwnRelationship(OwnRelationshipAttribute),
    PeerRelationship(PeerRelationshipAttribute),
    ThirdPartyRelationship(ThirdPartyRelationshipAttribute),
}

impl Attribute {
    pub fn id(&self) -> AttributeId {
        self.metadata().id()
    }

    pub fn role(&self) -> AttributeRole {
        match self {
            Attribute::OwnIdentity(_) => AttributeRole::OwnIdentity,
            Attribute::PeerIdentity(_) => AttributeRole::PeerIdentity,
            Attribute::OwnRelationship(_) => AttributeRole::OwnRelationship,
            Attribute::PeerRelationship(_) => AttributeRole::PeerRelationship,
            Attribute::ThirdPartyRelationship(_) => AttributeRole::ThirdPartyRelationship,
        }
    }

    pub fn metadata(&self) -> &AttributeMetadata {
        match self {
            Attribute::OwnIdentity(attribute) => &attribute.metadata,
            Attribute::PeerIdentity(attribute) => &attribute.metadata,
            Attribute::OwnRelationship(attribute) => &attribute.metadata,
            Attribute::PeerRelationship(attribute) => &attribute.metadata,
            Attribute::ThirdPartyRelationship(attribute) => &attribute.metadata,
        }
    }

    pub fn metadata_mut(&mut self) -> &mut AttributeMetadata {
        match self {
            Attribute::OwnIdentity(attribute) => &mut attribute.metadata,
            Attribute::PeerIdentity(attribute) => &mut attribute.metadata,
            Attribute::OwnRelationship(attribute) => &mut attribute.metadata,
            Attribute::PeerRelationship(attribute) => &mut attribute.metadata,
            Attribute::ThirdPartyRelationship(attribute) => &mut attribute.metadata,
        }
    }

    pub fn succeeds(&self) -> Option<AttributeId> {
        self.metadata().succeeds
    }

    pub fn succeeded_by(&self) -> Option<AttributeId> {
        self.metadata().succeeded_by
    }

    pub fn created_at(&self) -> Timestamp {
        self.metadata().created_at
    }

    pub fn content(&self) -> AttributeContent {
        match self {
            Attribute::OwnIdentity(attribute) => attribute.content.clone().into(),
            Attribute::PeerIdentity(attribute) => attribute.content.clone().into(),
            Attribute::OwnRelationship(attribute) => attribute.content.clone().into(),
            Attribute::PeerRelationship(attribute) => attribute.content.clone().into(),
            Attribute::ThirdPartyRelationship(attribute) => attribute.content.clone().into(),
        }
    }

    pub fn identity_content(&self) -> Option<&IdentityAttribute> {
        match self {
            Attribute::OwnIdentity(attribute) => Some(&attribute.content),
            Attribute::PeerIdentity(attribute) => Some(&attribute.content),
            _ => None,
        }
    }

    pub fn relationship_content(&self) -> Option<&RelationshipAttribute> {
        match self {
            Attribute::OwnRelationship(attribute) => Some(&attribute.content),
            Attribute::PeerRelationship(attribute) => Some(&attribute.content),
            Attribute::ThirdPartyRelationship(attribute) => Some(&attribute.content),
            _ => None,
        }
    }

    pub fn owner(&self) -> &Address {
        match self {
            Attribute::OwnIdentity(attribute) => attribute.content.owner(),
            Attribute::PeerIdentity(attribute) => attribute.content.owner(),
            Attribute::OwnRelationship(attribute) => attribute.content.owner(),
            Attribute::PeerRelationship(attribute) => attribute.content.owner(),
            Attribute::ThirdPartyRelationship(attribute) => attribute.content.owner(),
        }
    }

    pub fn value(&self) -> &AttributeValue {
        match self {
            Attribute::OwnIdentity(attribute) => attribute.content.value(),
            Attribute::PeerIdentity(attribute) => attribute.content.value(),
            Attribute::OwnRelationship(attribute) => attribute.content.value(),
            Attribute::PeerRelationship(attribute) => attribute.content.value(),
            Attribute::ThirdPartyRelationship(attribute) => attribute.content.value(),
        }
    }

    pub fn value_type(&self) -> &str {
        self.value().value_type()
    }

    pub fn tags(&self) -> Option<&BTreeSet<String>> {
        self.identity_content().map(IdentityAttribute::tags)
    }

    pub fn is_technical(&self) -> bool {
        self.relationship_content()
            .is_some_and(RelationshipAttribute::is_technical)
    }

    /// Peer sharing details, present on every role except own identity attributes.
    pub fn peer_sharing(&self) -> Option<&PeerSharingDetails> {
        match self {
            Attribute::OwnIdentity(_) => None,
            Attribute::PeerIdentity(attribute) => Some(&attribute.peer_sharing),
            Attribute::OwnRelationship(attribute) => Some(&attribute.peer_sharing),
            Attribute::PeerRelationship(attribute) => Some(&attribute.peer_sharing),
            Attribute::ThirdPartyRelationship(attribute) => Some(&attribute.peer_sharing),
        }
    }

    fn peer_sharing_mut(&mut self) -> Option<&mut PeerSharingDetails> {
        match self {
            Attribute::OwnIdentity(_) => None,
            Attribute::PeerIdentity(attribute) => Some(&mut attribute.peer_sharing),
            Attribute::OwnRelationship(attribute) => Some(&mut attribute.peer_sharing),
            Attribute::PeerRelationship(attribute) => Some(&mut attribute.peer_sharing),
            Attribute::ThirdPartyRelationship(attribute) => Some(&mut attribute.peer_sharing),
        }
    }

    /// Peer the attribute was received from or shared with initially.
    pub fn peer(&self) -> Option<&Address> {
        self.peer_sharing().map(|details| &details.peer)
    }

    /// Forwarding details, present on own attributes and peer relationship attributes.
    pub fn forwardings(&self) -> Option<&Forwardings> {
        match self {
            Attribute::OwnIdentity(attribute) => Some(&attribute.forwardings),
            Attribute::OwnRelationship(attribute) => Some(&attribute.forwardings),
            Attribute::PeerRelationship(attribute) => Some(&attribute.forwardings),
            Attribute::PeerIdentity(_) | Attribute::ThirdPartyRelationship(_) => None,
        }
    }

    pub fn forwardings_mut(&mut self) -> Option<&mut Forwardings> {
        match self {
            Attribute::OwnIdentity(attribute) => Some(&mut attribute.forwardings),
            Attribute::OwnRelationship(attribute) => Some(&mut attribute.forwardings),
            Attribute::PeerRelationship(attribute) => Some(&mut attribute.forwardings),
            Attribute::PeerIdentity(_) | Attribute::ThirdPartyRelationship(_) => None,
        }
    }

    pub fn is_forwarded_to(&self, peer: &Address) -> bool {
        self.forwardings()
            .is_some_and(|forwardings| forwardings.is_forwarded_to(peer))
    }

    /// Returns `true` if the peer holds a copy of this attribute, either as the peer of its
    /// sharing details or as a recipient of a forwarding.
    pub fn is_shared_with(&self, peer: &Address) -> bool {
        self.peer() == Some(peer) || self.is_forwarded_to(peer)
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Attribute::OwnIdentity(attribute) if attribute.is_default)
    }

    /// Sets the default flag, returns `false` if the role can not be a default.
    pub fn set_default(&mut self, is_default: bool) -> bool {
        match self {
            Attribute::OwnIdentity(attribute) => {
                attribute.is_default = is_default;
                true
            }
            _ => false,
        }
    }

    /// Overwrites the deletion info of the peer sharing details.
    ///
    /// A new status must be legal for the role, clearing is always possible where peer sharing
    /// details exist.
    pub fn set_peer_deletion_info(
        &mut self,
        deletion_info: Option<DeletionInfo>,
    ) -> Result<(), DeletionStatusError> {
        let role = self.role();

        if let Some(info) = &deletion_info {
            validate_deletion_status(role, SharingTarget::PeerSharing, info.status())?;
        }

        let details = self
            .peer_sharing_mut()
            .ok_or(DeletionStatusError::NoDeletionStatusAllowed {
                role,
                target: SharingTarget::PeerSharing,
            })?;
        details.deletion_info = deletion_info;
        Ok(())
    }

    /// Overwrites the deletion info of the forwarding details for a peer.
    pub fn set_forwarded_deletion_info(
        &mut self,
        peer: &Address,
        deletion_info: Option<DeletionInfo>,
    ) -> Result<(), AttributeError> {
        let role = self.role();

        if let Some(info) = &deletion_info {
            validate_deletion_status(role, SharingTarget::Forwarding, info.status())?;
        }

        let forwardings = self
            .forwardings_mut()
            .ok_or(AttributeError::ForwardingNotSupported(role))?;
        forwardings.set_deletion_info(peer, deletion_info)?;
        Ok(())
    }

    /// Creates the next version of this attribute with the same role and sharing peer.
    ///
    /// The new version is not linked to this one yet and carries no forwardings, no default flag
    /// and no deletion info.
    pub fn new_version(
        &self,
        metadata: AttributeMetadata,
        content: AttributeContent,
        source_reference: Option<Reference>,
    ) -> Result<Attribute, AttributeError> {
        let role = self.role();
        let shared_at = metadata.created_at;
        let peer_sharing = self.peer_sharing().map(|details| {
            PeerSharingDetails::new(
                details.peer.clone(),
                source_reference
                    .clone()
                    .unwrap_or_else(|| details.source_reference.clone()),
                shared_at,
            )
        });

        let attribute = match (self, content, peer_sharing) {
            (Attribute::OwnIdentity(_), AttributeContent::Identity(content), None) => {
                Attribute::OwnIdentity(OwnIdentityAttribute::new(metadata, content))
            }
            (Attribute::PeerIdentity(_), AttributeContent::Identity(content), Some(details)) => {
                Attribute::PeerIdentity(PeerIdentityAttribute::new(metadata, content, details))
            }
            (
                Attribute::OwnRelationship(_),
                AttributeContent::Relationship(content),
                Some(details),
            ) => Attribute::OwnRelationship(OwnRelationshipAttribute::new(
                metadata, content, details,
            )),
            (
                Attribute::PeerRelationship(_),
                AttributeContent::Relationship(content),
                Some(details),
            ) => Attribute::PeerRelationship(PeerRelationshipAttribute::new(
                metadata, content, details,
            )),
            (
                Attribute::ThirdPartyRelationship(attribute),
                AttributeContent::Relationship(content),
                Some(details),
            ) => Attribute::ThirdPartyRelationship(ThirdPartyRelationshipAttribute::new(
                metadata,
                content,
                details,
                attribute.initial_attribute_peer.clone(),
            )),
            _ => return Err(AttributeError::WrongContentKind(role)),
        };

        Ok(attribute)
    }
}

impl From<OwnIdentityAttribute> for Attribute {
    fn from(value: OwnIdentityAttribute) -> Self {
        Attribute::OwnIdentity(value)
    }
}

impl From<PeerIdentityAttribute> for Attribute {
    fn from(value: PeerIdentityAttribute) -> Self {
        Attribute::PeerIdentity(value)
    }
}

impl From<OwnRelationshipAttribute> for Attribute {
    fn from(value: OwnRelationshipAttribute) -> Self {
        Attribute::OwnRelationship(value)
    }
}

impl From<PeerRelationshipAttribute> for Attribute {
    fn from(value: PeerRelationshipAttribute) -> Self {
        Attribute::PeerRelationship(value)
    }
}

impl From<ThirdPartyRelationshipAttribute> for Attribute {
    fn from(value: ThirdPartyRelationshipAttribute) -> Self {
        Attribute::ThirdPartyRelationship(value)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AttributeError {
    #[error(transparent)]
    DeletionStatus(#[from] DeletionStatusError),

    #[error(transparent)]
    Forwarding(#[from] ForwardingError),

    #[error("{0} attributes can not be forwarded")]
    ForwardingNotSupported(AttributeRole),

    #[error("content kind does not match {0} attributes")]
    WrongContentKind(AttributeRole),
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use crate::content::AttributeContent;
    use crate::deletion::{DeletionInfo, DeletionStatus, DeletionStatusError, SharingTarget};
    use crate::forwarding::ForwardingError;
    use crate::id::Reference;
    use crate::test_utils::{
        address, given_name, own_identity_attribute, peer_identity_attribute,
        proprietary_string, third_party_relationship_attribute,
    };
    use crate::timestamp::Timestamp;

    use super::{AttributeError, AttributeMetadata, AttributeRole};

    #[test]
    fn role_specific_structures() {
        let own = own_identity_attribute(&address("alice"), "Alice");
        assert_eq!(own.role(), AttributeRole::OwnIdentity);
        assert!(own.forwardings().is_some());
        assert!(own.peer_sharing().is_none());

        let peer = peer_identity_attribute(&address("bob"), "Bob");
        assert_eq!(peer.role(), AttributeRole::PeerIdentity);
        assert!(peer.forwardings().is_none());
        assert_eq!(peer.peer(), Some(&address("bob")));

        let third_party = third_party_relationship_attribute(&address("bob"), &address("carol"));
        assert!(third_party.forwardings().is_none());
        assert_eq!(third_party.owner(), &address("carol"));
        assert_eq!(third_party.peer(), Some(&address("bob")));
    }

    #[test]
    fn peer_deletion_info_is_checked_against_role() {
        let mut peer = peer_identity_attribute(&address("bob"), "Bob");
        let date = Timestamp::from_millis(10);

        assert_matches!(
            peer.set_peer_deletion_info(Some(DeletionInfo::new(
                DeletionStatus::DeletionRequestSent,
                date
            ))),
            Err(DeletionStatusError::InvalidDeletionStatus { .. })
        );
        assert_eq!(peer.peer_sharing().unwrap().deletion_info(), None);

        peer.set_peer_deletion_info(Some(DeletionInfo::new(DeletionStatus::ToBeDeleted, date)))
            .unwrap();
        assert_eq!(
            peer.peer_sharing().unwrap().deletion_info().map(|i| i.status()),
            Some(DeletionStatus::ToBeDeleted)
        );

        let mut third_party =
            third_party_relationship_attribute(&address("bob"), &address("carol"));
        assert!(
            third_party
                .set_peer_deletion_info(Some(DeletionInfo::new(
                    DeletionStatus::DeletedByPeer,
                    date
                )))
                .is_ok()
        );
        assert!(
            third_party
                .set_peer_deletion_info(Some(DeletionInfo::new(
                    DeletionStatus::DeletedByOwner,
                    date
                )))
                .is_err()
        );
    }

    #[test]
    fn own_identity_attributes_have_no_peer_deletion_info() {
        let mut own = own_identity_attribute(&address("alice"), "Alice");
        assert_eq!(
            own.set_peer_deletion_info(None),
            Err(DeletionStatusError::NoDeletionStatusAllowed {
                role: AttributeRole::OwnIdentity,
                target: SharingTarget::PeerSharing,
            })
        );
    }

    #[test]
    fn forwarded_deletion_info() {
        let bob = address("bob");
        let mut own = own_identity_attribute(&address("alice"), "Alice");

        assert_eq!(
            own.set_forwarded_deletion_info(&bob, None),
            Err(AttributeError::Forwarding(ForwardingError::NotForwarded(
                bob.clone()
            )))
        );

        own.forwardings_mut()
            .unwrap()
            .add(bob.clone(), Reference::new("msg"), Timestamp::from_millis(1))
            .unwrap();
        own.set_forwarded_deletion_info(
            &bob,
            Some(DeletionInfo::new(
                DeletionStatus::DeletedByRecipient,
                Timestamp::from_millis(2),
            )),
        )
        .unwrap();
        assert!(!own.is_forwarded_to(&bob));
        assert!(!own.is_shared_with(&bob));

        let mut peer = peer_identity_attribute(&bob, "Bob");
        assert_matches!(
            peer.set_forwarded_deletion_info(
                &address("carol"),
                Some(DeletionInfo::new(
                    DeletionStatus::DeletedByRecipient,
                    Timestamp::from_millis(2),
                )),
            ),
            Err(AttributeError::DeletionStatus(
                DeletionStatusError::NoDeletionStatusAllowed { .. }
            ))
        );
    }

    #[test]
    fn new_version_keeps_role_and_peer() {
        let peer = peer_identity_attribute(&address("bob"), "Bob");
        let content: AttributeContent = given_name(&address("bob"), "Robert").into();
        let metadata = AttributeMetadata::generate(&content, Timestamp::from_millis(5));

        let successor = peer
            .new_version(metadata.clone(), content, Some(Reference::new("msg-2")))
            .unwrap();
        assert_eq!(successor.role(), AttributeRole::PeerIdentity);
        assert_eq!(successor.peer(), Some(&address("bob")));
        assert_eq!(
            successor.peer_sharing().unwrap().source_reference,
            Reference::new("msg-2")
        );
        assert_eq!(successor.succeeds(), None);

        let wrong: AttributeContent = crate::content::RelationshipAttribute::new(
            address("bob"),
            "key",
            Default::default(),
            proprietary_string("Title", "value"),
        )
        .into();
        assert_eq!(
            peer.new_version(metadata, wrong, None),
            Err(AttributeError::WrongContentKind(AttributeRole::PeerIdentity))
        );
    }

    #[test]
    fn default_flag_only_on_own_identity_attributes() {
        let mut own = own_identity_attribute(&address("alice"), "Alice");
        assert!(own.set_default(true));
        assert!(own.is_default());

        let mut peer = peer_identity_attribute(&address("bob"), "Bob");
        assert!(!peer.set_default(true));
        assert!(!peer.is_default());
    }

    #[test]
    fn serde_keeps_role() {
        let attribute = third_party_relationship_attribute(&address("bob"), &address("carol"));
        let json = serde_json::to_string(&attribute).unwrap();
        assert!(json.contains("\"role\":\"ThirdPartyRelationship\""));
        let decoded: super::Attribute = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, attribute);
    }
}
