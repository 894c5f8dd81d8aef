// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixtures for tests in this and dependent crates.
use std::collections::BTreeMap;

use crate::address::Address;
use crate::attribute::{
    Attribute, AttributeMetadata, OwnIdentityAttribute, OwnRelationshipAttribute,
    PeerIdentityAttribute, PeerRelationshipAttribute, PeerSharingDetails,
    ThirdPartyRelationshipAttribute,
};
use crate::content::{AttributeContent, Confidentiality, IdentityAttribute, RelationshipAttribute};
use crate::id::Reference;
use crate::tags::{AttributeTag, AttributeTagCollection};
use crate::timestamp::Timestamp;
use crate::value::{AttributeValue, Value};

pub fn address(name: &str) -> Address {
    Address::new(format!("did:e:{name}.example.org")).unwrap()
}

pub fn given_name(owner: &Address, name: &str) -> IdentityAttribute {
    IdentityAttribute::new(owner.clone(), AttributeValue::new("GivenName", name))
}

pub fn email_address(owner: &Address, email: &str) -> IdentityAttribute {
    IdentityAttribute::new(owner.clone(), AttributeValue::new("EMailAddress", email))
}

pub fn proprietary_string(title: &str, value: &str) -> AttributeValue {
    AttributeValue::new(
        "ProprietaryString",
        Value::Map(BTreeMap::from([
            ("title".to_string(), Value::from(title)),
            ("value".to_string(), Value::from(value)),
        ])),
    )
}

pub fn relationship_content(owner: &Address, key: &str, value: &str) -> RelationshipAttribute {
    RelationshipAttribute::new(
        owner.clone(),
        key,
        Confidentiality::Protected,
        proprietary_string("Title", value),
    )
}

fn metadata(content: &AttributeContent) -> AttributeMetadata {
    AttributeMetadata::generate(content, Timestamp::from_millis(1))
}

fn sharing(peer: &Address) -> PeerSharingDetails {
    PeerSharingDetails::new(peer.clone(), Reference::new("source"), Timestamp::from_millis(1))
}

pub fn own_identity_attribute(owner: &Address, name: &str) -> Attribute {
    let content = given_name(owner, name);
    OwnIdentityAttribute::new(metadata(&content.clone().into()), content).into()
}

pub fn peer_identity_attribute(peer: &Address, name: &str) -> Attribute {
    let content = given_name(peer, name);
    PeerIdentityAttribute::new(metadata(&content.clone().into()), content, sharing(peer)).into()
}

pub fn own_relationship_attribute(owner: &Address, peer: &Address) -> Attribute {
    let content = relationship_content(owner, "key", "own value");
    OwnRelationshipAttribute::new(metadata(&content.clone().into()), content, sharing(peer))
        .into()
}

pub fn peer_relationship_attribute(peer: &Address) -> Attribute {
    let content = relationship_content(peer, "key", "peer value");
    PeerRelationshipAttribute::new(metadata(&content.clone().into()), content, sharing(peer))
        .into()
}

pub fn third_party_relationship_attribute(peer: &Address, owner: &Address) -> Attribute {
    let content = relationship_content(owner, "key", "third party value");
    ThirdPartyRelationshipAttribute::new(
        metadata(&content.clone().into()),
        content,
        sharing(peer),
        owner.clone(),
    )
    .into()
}

fn tag(name: &str, children: Option<BTreeMap<String, AttributeTag>>) -> AttributeTag {
    AttributeTag {
        display_names: BTreeMap::from([("en".to_string(), name.to_string())]),
        children,
    }
}

/// Small tag collection with a nested tag tree for e-mail addresses.
pub fn tag_collection() -> AttributeTagCollection {
    let email_tags = BTreeMap::from([(
        "content".to_string(),
        tag(
            "Content",
            Some(BTreeMap::from([(
                "emailAddress".to_string(),
                tag("E-Mail Address", None),
            )])),
        ),
    )]);

    AttributeTagCollection {
        supported_languages: vec!["de".to_string(), "en".to_string()],
        tags_for_attribute_value_types: BTreeMap::from([(
            "EMailAddress".to_string(),
            email_tags,
        )]),
    }
}
