// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deletion states of shared attributes and the rules deciding which of them are legal.
//!
//! Deleting a shared attribute is a handshake between the parties holding a copy of it. Where an
//! attribute is in this handshake is described by a [`DeletionInfo`] attached to one of its
//! sharing structures: the per-peer forwarding details of attributes we disclosed, or the peer
//! sharing details of attributes we received or shared with an anchor peer.
//!
//! Which statuses are legal depends on the role of the attribute and on which sharing structure
//! is targeted:
//!
//! | Role | Forwarding | Peer sharing |
//! |---|---|---|
//! | `OwnIdentity` | recipient statuses | none |
//! | `PeerIdentity` | none | deleted by owner, to be deleted |
//! | `OwnRelationship` | recipient statuses | recipient statuses |
//! | `PeerRelationship` | recipient statuses | deleted by owner, to be deleted |
//! | `ThirdPartyRelationship` | none | deleted by peer |
//!
//! Recipient statuses are deletion request sent, deletion request rejected, deleted by recipient
//! and to be deleted by recipient.
//!
//! The rules do not impose any order between an already set and a new status, callers decide
//! whether they overwrite.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::attribute::AttributeRole;
use crate::timestamp::Timestamp;

/// Position of a shared attribute in the deletion handshake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DeletionStatus {
    /// We asked the recipient of our attribute to delete it.
    DeletionRequestSent,

    /// The recipient rejected our deletion request.
    DeletionRequestRejected,

    /// The recipient deleted our attribute.
    DeletedByRecipient,

    /// The recipient accepted to delete our attribute at the given deletion date.
    ToBeDeletedByRecipient,

    /// The owner of a received attribute deleted their original.
    DeletedByOwner,

    /// We accepted to delete a received attribute at the given deletion date.
    ToBeDeleted,

    /// The peer who disclosed a third party attribute to us deleted their copy.
    DeletedByPeer,
}

impl DeletionStatus {
    /// Returns `true` if the handshake reached its end and the other party will not hold the
    /// attribute anymore.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DeletionStatus::DeletedByRecipient
                | DeletionStatus::DeletedByOwner
                | DeletionStatus::DeletedByPeer
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeletionStatus::DeletionRequestSent => "DeletionRequestSent",
            DeletionStatus::DeletionRequestRejected => "DeletionRequestRejected",
            DeletionStatus::DeletedByRecipient => "DeletedByRecipient",
            DeletionStatus::ToBeDeletedByRecipient => "ToBeDeletedByRecipient",
            DeletionStatus::DeletedByOwner => "DeletedByOwner",
            DeletionStatus::ToBeDeleted => "ToBeDeleted",
            DeletionStatus::DeletedByPeer => "DeletedByPeer",
        }
    }
}

impl fmt::Display for DeletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DeletionStatus {
    type Err = DeletionStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let status = match value {
            "DeletionRequestSent" => DeletionStatus::DeletionRequestSent,
            "DeletionRequestRejected" => DeletionStatus::DeletionRequestRejected,
            "DeletedByRecipient" => DeletionStatus::DeletedByRecipient,
            "ToBeDeletedByRecipient" => DeletionStatus::ToBeDeletedByRecipient,
            "DeletedByOwner" => DeletionStatus::DeletedByOwner,
            "ToBeDeleted" => DeletionStatus::ToBeDeleted,
            "DeletedByPeer" => DeletionStatus::DeletedByPeer,
            other => return Err(DeletionStatusError::UnknownStatus(other.to_owned())),
        };
        Ok(status)
    }
}

/// Deletion status together with the date it refers to.
///
/// For pending statuses (`ToBeDeleted`, `ToBeDeletedByRecipient`) the date lies in the future and
/// marks when the deletion will happen, for all others it is the moment the status was reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionInfo {
    status: DeletionStatus,
    deletion_date: Timestamp,
}

impl DeletionInfo {
    pub fn new(status: DeletionStatus, deletion_date: Timestamp) -> Self {
        Self {
            status,
            deletion_date,
        }
    }

    pub fn status(&self) -> DeletionStatus {
        self.status
    }

    pub fn deletion_date(&self) -> Timestamp {
        self.deletion_date
    }
}

/// Sharing structure of an attribute a deletion status is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SharingTarget {
    /// Forwarding details for one peer the attribute was disclosed to.
    Forwarding,

    /// Details of the peer the attribute was received from or initially shared with.
    PeerSharing,
}

impl fmt::Display for SharingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            SharingTarget::Forwarding => "forwarding details",
            SharingTarget::PeerSharing => "peer sharing details",
        };
        write!(f, "{value}")
    }
}

const EMITTED_STATUSES: &[DeletionStatus] = &[
    DeletionStatus::DeletionRequestSent,
    DeletionStatus::DeletionRequestRejected,
    DeletionStatus::DeletedByRecipient,
    DeletionStatus::ToBeDeletedByRecipient,
];

const RECEIVED_STATUSES: &[DeletionStatus] =
    &[DeletionStatus::DeletedByOwner, DeletionStatus::ToBeDeleted];

const THIRD_PARTY_STATUSES: &[DeletionStatus] = &[DeletionStatus::DeletedByPeer];

/// Returns all deletion statuses legal for the given role and sharing structure.
pub fn allowed_deletion_statuses(
    role: AttributeRole,
    target: SharingTarget,
) -> &'static [DeletionStatus] {
    match (role, target) {
        (AttributeRole::OwnIdentity, SharingTarget::Forwarding) => EMITTED_STATUSES,
        (AttributeRole::OwnIdentity, SharingTarget::PeerSharing) => &[],
        (AttributeRole::PeerIdentity, SharingTarget::Forwarding) => &[],
        (AttributeRole::PeerIdentity, SharingTarget::PeerSharing) => RECEIVED_STATUSES,
        (AttributeRole::OwnRelationship, _) => EMITTED_STATUSES,
        (AttributeRole::PeerRelationship, SharingTarget::Forwarding) => EMITTED_STATUSES,
        (AttributeRole::PeerRelationship, SharingTarget::PeerSharing) => RECEIVED_STATUSES,
        (AttributeRole::ThirdPartyRelationship, SharingTarget::Forwarding) => &[],
        (AttributeRole::ThirdPartyRelationship, SharingTarget::PeerSharing) => {
            THIRD_PARTY_STATUSES
        }
    }
}

/// Decides if a deletion status can be set on the given role and sharing structure.
pub fn validate_deletion_status(
    role: AttributeRole,
    target: SharingTarget,
    status: DeletionStatus,
) -> Result<(), DeletionStatusError> {
    let allowed = allowed_deletion_statuses(role, target);

    if allowed.is_empty() {
        return Err(DeletionStatusError::NoDeletionStatusAllowed { role, target });
    }

    if !allowed.contains(&status) {
        return Err(DeletionStatusError::InvalidDeletionStatus {
            role,
            target,
            status,
            allowed: allowed.to_vec(),
        });
    }

    Ok(())
}

fn format_statuses(statuses: &[DeletionStatus]) -> String {
    statuses
        .iter()
        .map(DeletionStatus::as_str)
        .collect::<Vec<&str>>()
        .join(", ")
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DeletionStatusError {
    #[error(
        "deletion status {status} is not allowed on {target} of {role} attributes, allowed are: {}",
        format_statuses(.allowed)
    )]
    InvalidDeletionStatus {
        role: AttributeRole,
        target: SharingTarget,
        status: DeletionStatus,
        allowed: Vec<DeletionStatus>,
    },

    #[error("{role} attributes do not allow any deletion status on their {target}")]
    NoDeletionStatusAllowed {
        role: AttributeRole,
        target: SharingTarget,
    },

    #[error("unknown deletion status {0}")]
    UnknownStatus(String),
}
