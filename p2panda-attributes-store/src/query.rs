// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::BTreeSet;

use p2panda_attributes_core::{Address, Attribute, AttributeRole, Confidentiality};
use serde::{Deserialize, Serialize};

/// Filter over stored attributes.
///
/// Every set field narrows the result down, an empty query matches all attributes which are not
/// technical. Technical attributes are only returned when `is_technical` is set explicitly.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeQuery {
    /// Roles to include, empty means any role.
    pub roles: BTreeSet<AttributeRole>,
    pub owner: Option<Address>,

    /// Peer of the peer sharing details.
    pub peer: Option<Address>,
    pub value_type: Option<String>,
    pub is_default: Option<bool>,
    pub confidentiality: Option<Confidentiality>,
    pub key: Option<String>,
    pub is_technical: Option<bool>,

    /// Peer holding a copy, either as the peer of the sharing details or through a forwarding.
    pub shared_with: Option<Address>,

    /// Peer with an active forwarding of the attribute.
    pub forwarded_to: Option<Address>,

    /// Only include attributes which were not succeeded yet.
    pub only_latest: bool,
}

impl AttributeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(mut self, role: AttributeRole) -> Self {
        self.roles.insert(role);
        self
    }

    pub fn owner(mut self, owner: &Address) -> Self {
        self.owner = Some(owner.clone());
        self
    }

    pub fn peer(mut self, peer: &Address) -> Self {
        self.peer = Some(peer.clone());
        self
    }

    pub fn value_type(mut self, value_type: impl Into<String>) -> Self {
        self.value_type = Some(value_type.into());
        self
    }

    pub fn is_default(mut self, is_default: bool) -> Self {
        self.is_default = Some(is_default);
        self
    }

    pub fn confidentiality(mut self, confidentiality: Confidentiality) -> Self {
        self.confidentiality = Some(confidentiality);
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn is_technical(mut self, is_technical: bool) -> Self {
        self.is_technical = Some(is_technical);
        self
    }

    pub fn shared_with(mut self, peer: &Address) -> Self {
        self.shared_with = Some(peer.clone());
        self
    }

    pub fn forwarded_to(mut self, peer: &Address) -> Self {
        self.forwarded_to = Some(peer.clone());
        self
    }

    pub fn only_latest(mut self) -> Self {
        self.only_latest = true;
        self
    }

    /// Returns `true` if the attribute passes every filter of this query.
    pub fn matches(&self, attribute: &Attribute) -> bool {
        if !self.roles.is_empty() && !self.roles.contains(&attribute.role()) {
            return false;
        }

        if attribute.is_technical() != self.is_technical.unwrap_or(false) {
            return false;
        }

        if self.only_latest && attribute.succeeded_by().is_some() {
            return false;
        }

        if let Some(owner) = &self.owner
            && attribute.owner() != owner
        {
            return false;
        }

        if let Some(peer) = &self.peer
            && attribute.peer() != Some(peer)
        {
            return false;
        }

        if let Some(value_type) = &self.value_type
            && attribute.value_type() != value_type
        {
            return false;
        }

        if let Some(is_default) = self.is_default
            && attribute.is_default() != is_default
        {
            return false;
        }

        if self.confidentiality.is_some() || self.key.is_some() {
            let Some(content) = attribute.relationship_content() else {
                return false;
            };

            if self
                .confidentiality
                .is_some_and(|confidentiality| content.confidentiality() != confidentiality)
            {
                return false;
            }

            if self.key.as_deref().is_some_and(|key| content.key() != key) {
                return false;
            }
        }

        if let Some(peer) = &self.shared_with
            && !attribute.is_shared_with(peer)
        {
            return false;
        }

        if let Some(peer) = &self.forwarded_to
            && !attribute.is_forwarded_to(peer)
        {
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use p2panda_attributes_core::test_utils::{
        address, own_identity_attribute, own_relationship_attribute, peer_identity_attribute,
        third_party_relationship_attribute,
    };
    use p2panda_attributes_core::{
        Attribute, AttributeRole, Confidentiality, Reference, Timestamp,
    };
    use rstest::rstest;

    use super::AttributeQuery;

    #[rstest]
    #[case(own_identity_attribute(&address("alice"), "Alice"), AttributeRole::OwnIdentity)]
    #[case(peer_identity_attribute(&address("bob"), "Bob"), AttributeRole::PeerIdentity)]
    #[case(
        own_relationship_attribute(&address("alice"), &address("bob")),
        AttributeRole::OwnRelationship
    )]
    #[case(
        third_party_relationship_attribute(&address("bob"), &address("carol")),
        AttributeRole::ThirdPartyRelationship
    )]
    fn role_filter(#[case] attribute: Attribute, #[case] role: AttributeRole) {
        assert!(AttributeQuery::new().role(role).matches(&attribute));
        assert!(
            !AttributeQuery::new()
                .role(AttributeRole::PeerRelationship)
                .matches(&attribute)
        );
    }

    #[test]
    fn empty_query_excludes_technical_attributes() {
        let alice = address("alice");
        let bob = address("bob");

        let regular = own_relationship_attribute(&alice, &bob);
        let Attribute::OwnRelationship(mut technical) = regular.clone() else {
            unreachable!()
        };
        technical.content = technical.content.clone().technical();
        let technical = Attribute::OwnRelationship(technical);

        assert!(AttributeQuery::new().matches(&regular));
        assert!(!AttributeQuery::new().matches(&technical));
        assert!(AttributeQuery::new().is_technical(true).matches(&technical));
        assert!(!AttributeQuery::new().is_technical(true).matches(&regular));
    }

    #[test]
    fn filters_by_role_specific_fields() {
        let alice = address("alice");
        let bob = address("bob");
        let carol = address("carol");

        let own = own_identity_attribute(&alice, "Alice");
        let peer = peer_identity_attribute(&bob, "Bob");
        let third_party = third_party_relationship_attribute(&bob, &carol);

        let query = AttributeQuery::new().role(AttributeRole::OwnIdentity);
        assert!(query.matches(&own));
        assert!(!query.matches(&peer));

        let query = AttributeQuery::new().peer(&bob);
        assert!(!query.matches(&own));
        assert!(query.matches(&peer));
        assert!(query.matches(&third_party));

        let query = AttributeQuery::new().owner(&carol);
        assert!(query.matches(&third_party));
        assert!(!query.matches(&peer));

        let query = AttributeQuery::new().confidentiality(Confidentiality::Protected);
        assert!(query.matches(&third_party));
        assert!(!query.matches(&own));

        let query = AttributeQuery::new().is_default(false).value_type("GivenName");
        assert!(query.matches(&own));
        assert!(query.matches(&peer));
        assert!(!query.matches(&third_party));
    }

    #[test]
    fn filters_by_sharing() {
        let alice = address("alice");
        let bob = address("bob");

        let mut own = own_identity_attribute(&alice, "Alice");
        assert!(!AttributeQuery::new().shared_with(&bob).matches(&own));

        own.forwardings_mut()
            .unwrap()
            .add(bob.clone(), Reference::new("msg"), Timestamp::from_millis(1))
            .unwrap();
        assert!(AttributeQuery::new().shared_with(&bob).matches(&own));
        assert!(AttributeQuery::new().forwarded_to(&bob).matches(&own));

        let relationship = own_relationship_attribute(&alice, &bob);
        assert!(AttributeQuery::new().shared_with(&bob).matches(&relationship));
        assert!(!AttributeQuery::new().forwarded_to(&bob).matches(&relationship));
    }
}
