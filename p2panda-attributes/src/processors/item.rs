// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification and request items which act on attributes, already decoded by the transport
//! layer.
use std::fmt;

use p2panda_attributes_core::{
    Address, AttributeContent, AttributeId, IdentityAttribute, Timestamp, Value,
};
use p2panda_attributes_store::AttributeQuery;
use serde::{Deserialize, Serialize};

/// Kinds of items a processor can be registered for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemType {
    OwnAttributeDeletedByOwner,
    ForwardedAttributeDeletedByPeer,
    ThirdPartyRelationshipAttributeDeletedByPeer,
    PeerSharedAttributeSucceeded,
    DeleteAttribute,
    ShareAttribute,
    ReadAttribute,
    FormField,
    FreeText,
    RegisterAttributeListener,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::OwnAttributeDeletedByOwner => "OwnAttributeDeletedByOwnerNotificationItem",
            ItemType::ForwardedAttributeDeletedByPeer => {
                "ForwardedAttributeDeletedByPeerNotificationItem"
            }
            ItemType::ThirdPartyRelationshipAttributeDeletedByPeer => {
                "ThirdPartyRelationshipAttributeDeletedByPeerNotificationItem"
            }
            ItemType::PeerSharedAttributeSucceeded => {
                "PeerSharedAttributeSucceededNotificationItem"
            }
            ItemType::DeleteAttribute => "DeleteAttributeRequestItem",
            ItemType::ShareAttribute => "ShareAttributeRequestItem",
            ItemType::ReadAttribute => "ReadAttributeRequestItem",
            ItemType::FormField => "FormFieldRequestItem",
            ItemType::FreeText => "FreeTextRequestItem",
            ItemType::RegisterAttributeListener => "RegisterAttributeListenerRequestItem",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The owner of an attribute we received deleted their original.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnAttributeDeletedByOwnerNotificationItem {
    pub attribute_id: AttributeId,
}

/// A peer we disclosed an attribute to deleted their copy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardedAttributeDeletedByPeerNotificationItem {
    pub attribute_id: AttributeId,
}

/// A peer deleted a relationship attribute of a third party they held.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThirdPartyRelationshipAttributeDeletedByPeerNotificationItem {
    pub attribute_id: AttributeId,
}

/// The peer of an attribute we received published a new version of it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerSharedAttributeSucceededNotificationItem {
    pub predecessor_id: AttributeId,
    pub successor_id: AttributeId,
    pub successor_content: AttributeContent,
}

/// The peer asks us to delete an attribute of theirs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAttributeRequestItem {
    pub attribute_id: AttributeId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAttributeAcceptParams {
    /// Date at which we will have deleted the attribute.
    pub deletion_date: Timestamp,
}

/// The peer shares an attribute with us.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareAttributeRequestItem {
    pub attribute_id: AttributeId,
    pub content: AttributeContent,

    /// Set when the peer discloses a relationship attribute of a third party, names the peer
    /// who shared it with them first.
    pub initial_attribute_peer: Option<Address>,
}

/// The peer asks for an attribute matching a query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadAttributeRequestItem {
    pub query: AttributeQuery,
}

/// Attribute we answer a read request with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadAttributeAcceptParams {
    /// One of our existing attributes.
    Existing { attribute_id: AttributeId },

    /// A new own identity attribute created for this answer.
    New { content: IdentityAttribute },
}

/// Shape of the answer a form field expects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormFieldSettings {
    String { max_length: Option<usize> },
    Integer { min: Option<i64>, max: Option<i64> },
    Boolean,
    Selection { options: Vec<String>, allow_multiple: bool },
}

/// The peer asks us to fill in a form field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFieldRequestItem {
    pub title: String,
    pub settings: FormFieldSettings,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFieldAcceptParams {
    pub response: Value,
}

/// The peer sends a free text and expects one in return.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeTextRequestItem {
    pub title: String,
    pub free_text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeTextAcceptParams {
    pub free_text: String,
}

/// The peer wants to be informed about new attributes matching a query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterAttributeListenerRequestItem {
    pub query: AttributeQuery,
}

/// Item handed to a processor.
///
/// Request items come together with the parameters we accepted them with locally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolItem {
    OwnAttributeDeletedByOwner(OwnAttributeDeletedByOwnerNotificationItem),
    ForwardedAttributeDeletedByPeer(ForwardedAttributeDeletedByPeerNotificationItem),
    ThirdPartyRelationshipAttributeDeletedByPeer(
        ThirdPartyRelationshipAttributeDeletedByPeerNotificationItem,
    ),
    PeerSharedAttributeSucceeded(PeerSharedAttributeSucceededNotificationItem),
    DeleteAttribute(DeleteAttributeRequestItem, DeleteAttributeAcceptParams),
    ShareAttribute(ShareAttributeRequestItem),
    ReadAttribute(ReadAttributeRequestItem, ReadAttributeAcceptParams),
    FormField(FormFieldRequestItem, FormFieldAcceptParams),
    FreeText(FreeTextRequestItem, FreeTextAcceptParams),
    RegisterAttributeListener(RegisterAttributeListenerRequestItem),
}

impl ProtocolItem {
    pub fn item_type(&self) -> ItemType {
        match self {
            ProtocolItem::OwnAttributeDeletedByOwner(_) => ItemType::OwnAttributeDeletedByOwner,
            ProtocolItem::ForwardedAttributeDeletedByPeer(_) => {
                ItemType::ForwardedAttributeDeletedByPeer
            }
            ProtocolItem::ThirdPartyRelationshipAttributeDeletedByPeer(_) => {
                ItemType::ThirdPartyRelationshipAttributeDeletedByPeer
            }
            ProtocolItem::PeerSharedAttributeSucceeded(_) => {
                ItemType::PeerSharedAttributeSucceeded
            }
            ProtocolItem::DeleteAttribute(..) => ItemType::DeleteAttribute,
            ProtocolItem::ShareAttribute(_) => ItemType::ShareAttribute,
            ProtocolItem::ReadAttribute(..) => ItemType::ReadAttribute,
            ProtocolItem::FormField(..) => ItemType::FormField,
            ProtocolItem::FreeText(..) => ItemType::FreeText,
            ProtocolItem::RegisterAttributeListener(_) => ItemType::RegisterAttributeListener,
        }
    }

    /// Id of the attribute the item refers to, if it refers to exactly one.
    pub fn attribute_id(&self) -> Option<AttributeId> {
        match self {
            ProtocolItem::OwnAttributeDeletedByOwner(item) => Some(item.attribute_id),
            ProtocolItem::ForwardedAttributeDeletedByPeer(item) => Some(item.attribute_id),
            ProtocolItem::ThirdPartyRelationshipAttributeDeletedByPeer(item) => {
                Some(item.attribute_id)
            }
            ProtocolItem::PeerSharedAttributeSucceeded(item) => Some(item.predecessor_id),
            ProtocolItem::DeleteAttribute(item, _) => Some(item.attribute_id),
            ProtocolItem::ShareAttribute(item) => Some(item.attribute_id),
            ProtocolItem::ReadAttribute(
                _,
                ReadAttributeAcceptParams::Existing { attribute_id },
            ) => Some(*attribute_id),
            ProtocolItem::ReadAttribute(_, ReadAttributeAcceptParams::New { .. })
            | ProtocolItem::FormField(..)
            | ProtocolItem::FreeText(..)
            | ProtocolItem::RegisterAttributeListener(_) => None,
        }
    }
}
