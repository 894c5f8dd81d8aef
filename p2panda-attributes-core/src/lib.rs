// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data types for versioned identity and relationship attributes which are exchanged between
//! peers.
//!
//! An [`Attribute`] is a fact held locally. It is always exactly one of five roles, each with its
//! own sharing structures:
//!
//! - [`OwnIdentityAttribute`]: fact about the local identity, optionally forwarded to peers.
//! - [`PeerIdentityAttribute`]: fact about a peer's identity, received from that peer.
//! - [`OwnRelationshipAttribute`]: relationship-scoped fact owned by us, shared with an anchor
//!   peer and optionally forwarded further.
//! - [`PeerRelationshipAttribute`]: relationship-scoped fact owned by a peer.
//! - [`ThirdPartyRelationshipAttribute`]: relationship attribute of a third party, disclosed to us
//!   by a peer.
//!
//! Attributes form singly-linked version chains through `succeeds` and `succeeded_by`. Sharing
//! structures carry an optional [`DeletionInfo`] which is constrained by the deletion status
//! rules in [`deletion`] to the statuses legal for the attribute's role.
//!
//! This crate does not persist anything and performs no I/O, see `p2panda-attributes-store` and
//! `p2panda-attributes` for storage and the higher-level engine.
pub mod address;
pub mod attribute;
pub mod content;
pub mod deletion;
pub mod forwarding;
pub mod id;
pub mod tags;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
pub mod timestamp;
pub mod validation;
pub mod value;

pub use address::{Address, AddressError};
pub use attribute::{
    Attribute, AttributeError, AttributeMetadata, AttributeRole, OwnIdentityAttribute,
    OwnRelationshipAttribute, PeerIdentityAttribute, PeerRelationshipAttribute, PeerSharingDetails,
    ThirdPartyRelationshipAttribute,
};
pub use content::{AttributeContent, Confidentiality, IdentityAttribute, RelationshipAttribute};
pub use deletion::{DeletionInfo, DeletionStatus, DeletionStatusError, SharingTarget};
pub use forwarding::{ForwardingDetails, ForwardingError, Forwardings};
pub use id::{AttributeId, AttributeIdError, Reference};
pub use tags::{AttributeTag, AttributeTagCollection};
pub use timestamp::Timestamp;
pub use validation::ContentError;
pub use value::{AttributeValue, Value};
