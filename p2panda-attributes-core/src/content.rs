// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content of attributes: identity facts and relationship-scoped facts.
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::value::AttributeValue;

/// Fact about the identity of exactly one party.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityAttribute {
    owner: Address,
    value: AttributeValue,
    tags: BTreeSet<String>,
}

impl IdentityAttribute {
    pub fn new(owner: Address, value: AttributeValue) -> Self {
        Self {
            owner,
            value,
            tags: BTreeSet::new(),
        }
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn value(&self) -> &AttributeValue {
        &self.value
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn trimmed(&self) -> Self {
        Self {
            owner: self.owner.clone(),
            value: self.value.trimmed(),
            tags: self.tags.iter().map(|tag| tag.trim().to_owned()).collect(),
        }
    }
}

/// Who may see a relationship attribute beyond the relationship it was created in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidentiality {
    Public,
    Protected,
    #[default]
    Private,
}

impl fmt::Display for Confidentiality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Confidentiality::Public => "public",
            Confidentiality::Protected => "protected",
            Confidentiality::Private => "private",
        };
        write!(f, "{value}")
    }
}

/// Fact scoped to one relationship, identified by a key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipAttribute {
    owner: Address,
    key: String,
    confidentiality: Confidentiality,
    is_technical: bool,
    value: AttributeValue,
}

impl RelationshipAttribute {
    pub fn new(
        owner: Address,
        key: impl Into<String>,
        confidentiality: Confidentiality,
        value: AttributeValue,
    ) -> Self {
        Self {
            owner,
            key: key.into(),
            confidentiality,
            is_technical: false,
            value,
        }
    }

    /// Marks the attribute as technical, technical attributes are hidden from regular queries.
    pub fn technical(mut self) -> Self {
        self.is_technical = true;
        self
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn confidentiality(&self) -> Confidentiality {
        self.confidentiality
    }

    pub fn is_technical(&self) -> bool {
        self.is_technical
    }

    pub fn value(&self) -> &AttributeValue {
        &self.value
    }

    pub fn trimmed(&self) -> Self {
        Self {
            owner: self.owner.clone(),
            key: self.key.trim().to_owned(),
            confidentiality: self.confidentiality,
            is_technical: self.is_technical,
            value: self.value.trimmed(),
        }
    }
}

/// Content of any attribute, regardless of its role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttributeContent {
    Identity(IdentityAttribute),
    Relationship(RelationshipAttribute),
}

impl AttributeContent {
    pub fn owner(&self) -> &Address {
        match self {
            AttributeContent::Identity(content) => content.owner(),
            AttributeContent::Relationship(content) => content.owner(),
        }
    }

    pub fn value(&self) -> &AttributeValue {
        match self {
            AttributeContent::Identity(content) => content.value(),
            AttributeContent::Relationship(content) => content.value(),
        }
    }

    pub fn value_type(&self) -> &str {
        self.value().value_type()
    }

    /// Tags of identity attributes, relationship attributes carry none.
    pub fn tags(&self) -> Option<&BTreeSet<String>> {
        match self {
            AttributeContent::Identity(content) => Some(content.tags()),
            AttributeContent::Relationship(_) => None,
        }
    }

    pub fn is_technical(&self) -> bool {
        match self {
            AttributeContent::Identity(_) => false,
            AttributeContent::Relationship(content) => content.is_technical(),
        }
    }

    pub fn trimmed(&self) -> Self {
        match self {
            AttributeContent::Identity(content) => AttributeContent::Identity(content.trimmed()),
            AttributeContent::Relationship(content) => {
                AttributeContent::Relationship(content.trimmed())
            }
        }
    }

    /// Encodes the content in CBOR format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        // Serialising into a vector can only fail on I/O errors which do not occur in memory.
        let _ = ciborium::ser::into_writer(self, &mut bytes);
        bytes
    }
}

impl From<IdentityAttribute> for AttributeContent {
    fn from(value: IdentityAttribute) -> Self {
        AttributeContent::Identity(value)
    }
}

impl From<RelationshipAttribute> for AttributeContent {
    fn from(value: RelationshipAttribute) -> Self {
        AttributeContent::Relationship(value)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{address, given_name, proprietary_string};

    use super::{AttributeContent, Confidentiality, RelationshipAttribute};

    #[test]
    fn trimmed_content() {
        let content = given_name(&address("alice"), "  Alice ").with_tags(["  x:nick "]);
        let trimmed = content.trimmed();
        assert_eq!(trimmed, given_name(&address("alice"), "Alice").with_tags(["x:nick"]));
    }

    #[test]
    fn encoding_is_deterministic() {
        let content: AttributeContent = given_name(&address("alice"), "Alice").into();
        assert_eq!(content.to_bytes(), content.clone().to_bytes());

        let other: AttributeContent = given_name(&address("alice"), "Bob").into();
        assert_ne!(content.to_bytes(), other.to_bytes());
    }

    #[test]
    fn relationship_content_accessors() {
        let content = RelationshipAttribute::new(
            address("bob"),
            "customer-number",
            Confidentiality::Protected,
            proprietary_string("Customer number", "4711"),
        )
        .technical();

        let content = AttributeContent::from(content);
        assert!(content.is_technical());
        assert_eq!(content.tags(), None);
        assert_eq!(content.value_type(), "ProprietaryString");
        assert_eq!(content.owner(), &address("bob"));
    }
}
