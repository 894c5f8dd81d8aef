// SPDX-License-Identifier: MIT OR Apache-2.0

use assert_matches::assert_matches;
use p2panda_attributes_core::test_utils::{address, email_address, given_name, relationship_content};
use p2panda_attributes_core::{
    Attribute, AttributeId, AttributeRole, AttributeValue, Confidentiality, ContentError,
    DeletionInfo, DeletionStatus, Reference, RelationshipAttribute, Timestamp,
};
use p2panda_attributes_store::{AttributeQuery, AttributeStore, MemoryStore};
use tokio::sync::broadcast::error::TryRecvError;

use crate::error::AttributesError;
use crate::event::AttributeEvent;
use crate::test_utils::test_attributes;

use super::{Attributes, SuccessorParams};

/// Creates an own given name attribute and succeeds it twice, returns the ids oldest first.
async fn chain_of_three(attributes: &Attributes<MemoryStore>) -> [AttributeId; 3] {
    let local = attributes.local_address().clone();
    let v0 = attributes
        .create_own_identity_attribute(given_name(&local, "Alice"))
        .await
        .unwrap();
    let v1 = attributes
        .succeed_own_identity_attribute(&v0.id(), SuccessorParams::new(given_name(&local, "Ali")))
        .await
        .unwrap()
        .successor;
    let v2 = attributes
        .succeed_own_identity_attribute(&v1.id(), SuccessorParams::new(given_name(&local, "Al")))
        .await
        .unwrap()
        .successor;
    [v0.id(), v1.id(), v2.id()]
}

fn deleted_by_recipient() -> Option<DeletionInfo> {
    Some(DeletionInfo::new(
        DeletionStatus::DeletedByRecipient,
        Timestamp::now(),
    ))
}

#[tokio::test]
async fn first_own_identity_attribute_becomes_default() {
    let alice = address("alice");
    let attributes = test_attributes(&alice, true);

    let first = attributes
        .create_own_identity_attribute(given_name(&alice, " Alice "))
        .await
        .unwrap();
    let second = attributes
        .create_own_identity_attribute(given_name(&alice, "Ali"))
        .await
        .unwrap();

    assert!(first.is_default());
    assert!(!second.is_default());
    assert_eq!(first.identity_content(), Some(&given_name(&alice, "Alice")));

    let default = attributes
        .get_default_own_identity_attribute("GivenName")
        .await
        .unwrap();
    assert_eq!(default.map(|attribute| attribute.id()), Some(first.id()));
}

#[tokio::test]
async fn no_defaults_without_default_management() {
    let alice = address("alice");
    let attributes = test_attributes(&alice, false);

    let attribute = attributes
        .create_own_identity_attribute(given_name(&alice, "Alice"))
        .await
        .unwrap();
    assert!(!attribute.is_default());
    assert_matches!(
        attributes
            .set_as_default_own_identity_attribute(&attribute.id())
            .await,
        Err(AttributesError::DefaultManagementDisabled)
    );
}

#[tokio::test]
async fn own_identity_attribute_of_someone_else() {
    let alice = address("alice");
    let attributes = test_attributes(&alice, true);

    assert_matches!(
        attributes
            .create_own_identity_attribute(given_name(&address("bob"), "Bob"))
            .await,
        Err(AttributesError::WrongOwner { .. })
    );
}

#[tokio::test]
async fn content_validation() {
    let alice = address("alice");
    let attributes = test_attributes(&alice, true);

    assert_matches!(
        attributes
            .create_own_identity_attribute(given_name(&alice, "Ali\u{0}ce"))
            .await,
        Err(AttributesError::Content(ContentError::ForbiddenCharacters(chars)))
            if chars == vec!['\u{0}']
    );

    let tagged = email_address(&alice, "alice@example.org")
        .with_tags(["content+%+emailAddress", "x:private"]);
    assert!(attributes.create_own_identity_attribute(tagged).await.is_ok());

    let tagged = email_address(&alice, "alice@example.org").with_tags(["content+%+fax"]);
    assert_matches!(
        attributes.create_own_identity_attribute(tagged).await,
        Err(AttributesError::Content(ContentError::InvalidTags(tags)))
            if tags == vec!["content+%+fax".to_string()]
    );
}

#[tokio::test]
async fn succession_links_versions() {
    let alice = address("alice");
    let attributes = test_attributes(&alice, true);
    let [v0, v1, v2] = chain_of_three(&attributes).await;

    let first = attributes.get_existing_attribute(&v0).await.unwrap();
    let middle = attributes.get_existing_attribute(&v1).await.unwrap();
    let last = attributes.get_existing_attribute(&v2).await.unwrap();

    assert_eq!(first.succeeds(), None);
    assert_eq!(first.succeeded_by(), Some(v1));
    assert_eq!(middle.succeeds(), Some(v0));
    assert_eq!(middle.succeeded_by(), Some(v2));
    assert_eq!(last.succeeds(), Some(v1));
    assert_eq!(last.succeeded_by(), None);

    // The default moves along with the versions.
    assert!(!first.is_default());
    assert!(!middle.is_default());
    assert!(last.is_default());

    let ids = |versions: Vec<Attribute>| {
        versions
            .iter()
            .map(|attribute| attribute.id())
            .collect::<Vec<AttributeId>>()
    };
    for id in [v0, v1, v2] {
        let versions = attributes.get_versions_of_attribute(&id).await.unwrap();
        assert_eq!(ids(versions), vec![v2, v1, v0]);
    }
    assert_eq!(
        ids(attributes.get_predecessors_of_attribute(&v2).await.unwrap()),
        vec![v1, v0]
    );
    assert_eq!(
        ids(attributes.get_successors_of_attribute(&v0).await.unwrap()),
        vec![v1, v2]
    );

    assert!(attributes.is_subsequent_in_succession(&v0, &v2).await.unwrap());
    assert!(attributes.is_subsequent_in_succession(&v0, &v1).await.unwrap());
    assert!(!attributes.is_subsequent_in_succession(&v2, &v0).await.unwrap());
    assert!(!attributes.is_subsequent_in_succession(&v1, &v0).await.unwrap());
    assert!(!attributes.is_subsequent_in_succession(&v0, &v0).await.unwrap());
}

#[tokio::test]
async fn succession_rules() {
    let alice = address("alice");
    let attributes = test_attributes(&alice, true);

    let attribute = attributes
        .create_own_identity_attribute(given_name(&alice, "Alice"))
        .await
        .unwrap();
    let id = attribute.id();

    assert_matches!(
        attributes
            .succeed_own_identity_attribute(
                &AttributeId::new(b"unknown"),
                SuccessorParams::new(given_name(&alice, "Ali"))
            )
            .await,
        Err(AttributesError::PredecessorDoesNotExist(_))
    );
    assert_matches!(
        attributes
            .succeed_peer_identity_attribute(&id, SuccessorParams::new(given_name(&alice, "Ali")))
            .await,
        Err(AttributesError::WrongTypeOfAttribute { actual: AttributeRole::OwnIdentity, .. })
    );
    assert_matches!(
        attributes
            .succeed_own_identity_attribute(
                &id,
                SuccessorParams::new(given_name(&address("bob"), "Ali"))
            )
            .await,
        Err(AttributesError::SuccessionMustNotChangeOwner)
    );
    assert_matches!(
        attributes
            .succeed_own_identity_attribute(
                &id,
                SuccessorParams::new(email_address(&alice, "alice@example.org"))
            )
            .await,
        Err(AttributesError::SuccessionMustNotChangeValueType)
    );
    assert_matches!(
        attributes
            .succeed_own_identity_attribute(
                &id,
                SuccessorParams::new(given_name(&alice, " Alice "))
            )
            .await,
        Err(AttributesError::SuccessionMustChangeContent)
    );

    // Changing only the tags is a change.
    let succession = attributes
        .succeed_own_identity_attribute(
            &id,
            SuccessorParams::new(given_name(&alice, "Alice").with_tags(["x:nickname"])),
        )
        .await
        .unwrap();
    assert_eq!(succession.predecessor.succeeded_by(), Some(succession.successor.id()));

    assert_matches!(
        attributes
            .succeed_own_identity_attribute(&id, SuccessorParams::new(given_name(&alice, "Ali")))
            .await,
        Err(AttributesError::CannotSucceedAttributesWithASuccessor(predecessor))
            if predecessor == id
    );
}

#[tokio::test]
async fn successor_with_explicit_id() {
    let alice = address("alice");
    let bob = address("bob");
    let attributes = test_attributes(&alice, true);

    let predecessor = attributes
        .create_peer_identity_attribute(
            AttributeId::new(b"bob-v0"),
            given_name(&bob, "Bob"),
            &bob,
            Reference::new("msg-1"),
        )
        .await
        .unwrap();

    let existing = AttributeId::new(b"bob-other");
    attributes
        .create_peer_identity_attribute(
            existing,
            given_name(&bob, "Robert"),
            &bob,
            Reference::new("msg-2"),
        )
        .await
        .unwrap();
    assert_matches!(
        attributes
            .succeed_peer_identity_attribute(
                &predecessor.id(),
                SuccessorParams::new(given_name(&bob, "Bobby")).with_id(existing)
            )
            .await,
        Err(AttributesError::SuccessorMustNotYetExist(id)) if id == existing
    );

    let successor_id = AttributeId::new(b"bob-v1");
    let succession = attributes
        .succeed_peer_identity_attribute(
            &predecessor.id(),
            SuccessorParams::new(given_name(&bob, "Bobby"))
                .with_id(successor_id)
                .with_source_reference(Reference::new("msg-3")),
        )
        .await
        .unwrap();

    assert_eq!(succession.successor.id(), successor_id);
    assert_eq!(succession.successor.peer(), Some(&bob));
    assert_eq!(
        succession
            .successor
            .peer_sharing()
            .map(|details| details.source_reference.clone()),
        Some(Reference::new("msg-3"))
    );
}

#[tokio::test]
async fn attribute_deleted_by_its_owner_can_not_be_succeeded() {
    let alice = address("alice");
    let bob = address("bob");
    let attributes = test_attributes(&alice, true);

    let attribute = attributes
        .create_peer_identity_attribute(
            AttributeId::new(b"bob-v0"),
            given_name(&bob, "Bob"),
            &bob,
            Reference::new("msg-1"),
        )
        .await
        .unwrap();
    attributes
        .set_peer_deletion_info_of_attribute(
            &attribute.id(),
            Some(DeletionInfo::new(DeletionStatus::DeletedByOwner, Timestamp::now())),
        )
        .await
        .unwrap();

    assert_matches!(
        attributes
            .succeed_peer_identity_attribute(
                &attribute.id(),
                SuccessorParams::new(given_name(&bob, "Bobby"))
            )
            .await,
        Err(AttributesError::CannotSucceedSharedAttributesDeletedByPeer(_))
    );
}

#[tokio::test]
async fn illegal_deletion_status() {
    let alice = address("alice");
    let bob = address("bob");
    let attributes = test_attributes(&alice, true);

    let attribute = attributes
        .create_peer_identity_attribute(
            AttributeId::new(b"bob-v0"),
            given_name(&bob, "Bob"),
            &bob,
            Reference::new("msg-1"),
        )
        .await
        .unwrap();

    assert_matches!(
        attributes
            .set_peer_deletion_info_of_attribute(
                &attribute.id(),
                Some(DeletionInfo::new(DeletionStatus::DeletedByPeer, Timestamp::now())),
            )
            .await,
        Err(AttributesError::DeletionStatus(_))
    );

    let own = attributes
        .create_own_identity_attribute(given_name(&alice, "Alice"))
        .await
        .unwrap();
    assert_matches!(
        attributes
            .set_peer_deletion_info_of_attribute(
                &own.id(),
                Some(DeletionInfo::new(DeletionStatus::ToBeDeleted, Timestamp::now())),
            )
            .await,
        Err(AttributesError::DeletionStatus(_))
    );
}

#[tokio::test]
async fn forwarding() {
    let alice = address("alice");
    let bob = address("bob");
    let attributes = test_attributes(&alice, true);

    let attribute = attributes
        .create_own_identity_attribute(given_name(&alice, "Alice"))
        .await
        .unwrap();
    let id = attribute.id();

    let attribute = attributes
        .add_forwarding_details_to_attribute(&id, &bob, Reference::new("msg-1"))
        .await
        .unwrap();
    assert!(attribute.is_forwarded_to(&bob));
    assert_eq!(
        attributes.get_peers_of_forwarded_attribute(&id).await.unwrap(),
        vec![bob.clone()]
    );

    assert_matches!(
        attributes
            .add_forwarding_details_to_attribute(&id, &bob, Reference::new("msg-2"))
            .await,
        Err(AttributesError::AlreadyForwarded { peer, .. }) if peer == bob
    );

    // A peer who deleted the attribute can receive it again.
    attributes
        .set_forwarded_deletion_info_of_attribute(&id, &bob, deleted_by_recipient())
        .await
        .unwrap();
    assert!(
        attributes
            .get_peers_of_forwarded_attribute(&id)
            .await
            .unwrap()
            .is_empty()
    );
    let attribute = attributes
        .add_forwarding_details_to_attribute(&id, &bob, Reference::new("msg-3"))
        .await
        .unwrap();
    let details = attribute.forwardings().unwrap().get(&bob).unwrap();
    assert_eq!(details.number_of_forwards(), 2);
    assert_eq!(details.source_reference(), &Reference::new("msg-3"));
    assert_eq!(details.deletion_info(), None);

    // A pending deletion is cancelled by sharing again.
    attributes
        .set_forwarded_deletion_info_of_attribute(
            &id,
            &bob,
            Some(DeletionInfo::new(
                DeletionStatus::ToBeDeletedByRecipient,
                Timestamp::now(),
            )),
        )
        .await
        .unwrap();
    let attribute = attributes
        .add_forwarding_details_to_attribute(&id, &bob, Reference::new("msg-4"))
        .await
        .unwrap();
    let details = attribute.forwardings().unwrap().get(&bob).unwrap();
    assert_eq!(details.number_of_forwards(), 2);
    assert_eq!(details.source_reference(), &Reference::new("msg-4"));

    let attribute = attributes
        .remove_forwarding_details_from_attribute(&id, &bob)
        .await
        .unwrap();
    assert!(attribute.forwardings().unwrap().get(&bob).is_none());
}

#[tokio::test]
async fn forwarding_rules() {
    let alice = address("alice");
    let bob = address("bob");
    let carol = address("carol");
    let attributes = test_attributes(&alice, true);

    let private = RelationshipAttribute::new(
        alice.clone(),
        "key",
        Confidentiality::Private,
        AttributeValue::new("ProprietaryBoolean", true),
    );
    let private = attributes
        .create_own_relationship_attribute(private, &bob, Reference::new("msg-1"))
        .await
        .unwrap();
    assert_matches!(
        attributes
            .add_forwarding_details_to_attribute(&private.id(), &carol, Reference::new("msg-2"))
            .await,
        Err(AttributesError::ConfidentialAttribute { .. })
    );

    let protected = attributes
        .create_own_relationship_attribute(
            relationship_content(&alice, "key", "value"),
            &bob,
            Reference::new("msg-3"),
        )
        .await
        .unwrap();
    assert_matches!(
        attributes
            .add_forwarding_details_to_attribute(&protected.id(), &bob, Reference::new("msg-4"))
            .await,
        Err(AttributesError::AlreadyForwarded { .. })
    );
    assert!(
        attributes
            .add_forwarding_details_to_attribute(&protected.id(), &carol, Reference::new("msg-5"))
            .await
            .is_ok()
    );

    let peer_identity = attributes
        .create_peer_identity_attribute(
            AttributeId::new(b"bob-v0"),
            given_name(&bob, "Bob"),
            &bob,
            Reference::new("msg-6"),
        )
        .await
        .unwrap();
    assert_matches!(
        attributes
            .add_forwarding_details_to_attribute(&peer_identity.id(), &carol, Reference::new("x"))
            .await,
        Err(AttributesError::WrongTypeOfAttribute {
            actual: AttributeRole::PeerIdentity,
            ..
        })
    );
}

#[tokio::test]
async fn shared_versions() {
    let alice = address("alice");
    let bob = address("bob");
    let carol = address("carol");
    let attributes = test_attributes(&alice, true);
    let [v0, v1, v2] = chain_of_three(&attributes).await;

    attributes
        .add_forwarding_details_to_attribute(&v0, &bob, Reference::new("msg-1"))
        .await
        .unwrap();
    attributes
        .add_forwarding_details_to_attribute(&v1, &bob, Reference::new("msg-2"))
        .await
        .unwrap();
    attributes
        .add_forwarding_details_to_attribute(&v1, &carol, Reference::new("msg-3"))
        .await
        .unwrap();

    let shared = attributes
        .get_versions_of_attribute_shared_with_peer(&v2, &bob, false)
        .await
        .unwrap();
    assert_eq!(
        shared.iter().map(|version| version.id()).collect::<Vec<_>>(),
        vec![v1, v0]
    );
    let latest = attributes
        .get_versions_of_attribute_shared_with_peer(&v2, &bob, true)
        .await
        .unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].id(), v1);

    let for_carol = attributes
        .get_shared_versions_of_attribute(&v0, Some(&[carol.clone()]))
        .await
        .unwrap();
    assert_eq!(for_carol.len(), 1);
    assert_eq!(for_carol[0].id(), v1);
    let for_anybody = attributes
        .get_shared_versions_of_attribute(&v0, None)
        .await
        .unwrap();
    assert_eq!(for_anybody.len(), 2);

    let mut peers = attributes
        .get_peers_with_exclusively_forwarded_predecessors(&v2)
        .await
        .unwrap();
    peers.sort_by(|(a, _), (b, _)| a.to_string().cmp(&b.to_string()));
    assert_eq!(peers, vec![(bob.clone(), v1), (carol.clone(), v1)]);

    attributes
        .add_forwarding_details_to_attribute(&v2, &bob, Reference::new("msg-4"))
        .await
        .unwrap();
    let peers = attributes
        .get_peers_with_exclusively_forwarded_predecessors(&v2)
        .await
        .unwrap();
    assert_eq!(peers, vec![(carol, v1)]);
}

#[tokio::test]
async fn recipient_deletion_of_attribute_and_predecessors() {
    let alice = address("alice");
    let bob = address("bob");
    let attributes = test_attributes(&alice, true);
    let [v0, v1, v2] = chain_of_three(&attributes).await;

    for id in [v0, v1, v2] {
        attributes
            .add_forwarding_details_to_attribute(&id, &bob, Reference::new("msg"))
            .await
            .unwrap();
    }
    attributes
        .set_forwarded_deletion_info_of_attribute(&v0, &bob, deleted_by_recipient())
        .await
        .unwrap();

    let changed = attributes
        .set_recipient_deletion_info_of_attribute_and_predecessors(
            &v2,
            &bob,
            Some(DeletionInfo::new(
                DeletionStatus::DeletionRequestSent,
                Timestamp::now(),
            )),
            &[DeletionStatus::DeletedByRecipient],
        )
        .await
        .unwrap();

    // The version the recipient deleted already keeps its status.
    assert_eq!(
        changed.iter().map(|version| version.id()).collect::<Vec<_>>(),
        vec![v2, v1]
    );
    let v0 = attributes.get_existing_attribute(&v0).await.unwrap();
    assert_eq!(
        v0.forwardings()
            .and_then(|forwardings| forwardings.get(&bob))
            .and_then(|details| details.deletion_info())
            .map(|info| info.status()),
        Some(DeletionStatus::DeletedByRecipient)
    );

    // Nothing changes when setting the same status again.
    let changed = attributes
        .set_recipient_deletion_info_of_attribute_and_predecessors(
            &v2,
            &bob,
            changed[0]
                .forwardings()
                .and_then(|forwardings| forwardings.get(&bob))
                .and_then(|details| details.deletion_info())
                .copied(),
            &[DeletionStatus::DeletedByRecipient],
        )
        .await
        .unwrap();
    assert!(changed.is_empty());
}

#[tokio::test]
async fn full_deletion_of_latest_version() {
    let alice = address("alice");
    let attributes = test_attributes(&alice, true);
    let [v0, v1, v2] = chain_of_three(&attributes).await;

    let deletion = attributes
        .execute_full_attribute_deletion_process(&v2)
        .await
        .unwrap();
    assert_eq!(deletion.deleted, vec![v2, v1, v0]);
    assert_eq!(deletion.promoted_default, None);

    for id in [v0, v1, v2] {
        assert!(attributes.get_attribute(&id).await.unwrap().is_none());
    }
}

#[tokio::test]
async fn full_deletion_of_first_version() {
    let alice = address("alice");
    let attributes = test_attributes(&alice, true);
    let [v0, v1, v2] = chain_of_three(&attributes).await;

    let deletion = attributes
        .execute_full_attribute_deletion_process(&v0)
        .await
        .unwrap();
    assert_eq!(deletion.deleted, vec![v0]);

    let v1 = attributes.get_existing_attribute(&v1).await.unwrap();
    assert_eq!(v1.succeeds(), None);
    let versions = attributes.get_versions_of_attribute(&v2).await.unwrap();
    assert_eq!(versions.len(), 2);
}

#[tokio::test]
async fn full_deletion_with_missing_successor() {
    let alice = address("alice");
    let attributes = test_attributes(&alice, true);
    let [v0, v1, _] = chain_of_three(&attributes).await;

    // Remove the successor behind the engine's back.
    attributes.store().delete_attribute(&v1).await.unwrap();

    assert_matches!(
        attributes.validate_full_attribute_deletion_process(&v0).await,
        Err(AttributesError::SuccessorDoesNotExist(id)) if id == v1
    );
}

#[tokio::test]
async fn full_deletion_promotes_new_default() {
    let alice = address("alice");
    let attributes = test_attributes(&alice, true);

    let first = attributes
        .create_own_identity_attribute(given_name(&alice, "Alice"))
        .await
        .unwrap();
    let second = attributes
        .create_own_identity_attribute(given_name(&alice, "Ali"))
        .await
        .unwrap();
    assert!(first.is_default());

    let mut rx = attributes.subscribe();
    let deletion = attributes
        .execute_full_attribute_deletion_process(&first.id())
        .await
        .unwrap();
    assert_eq!(deletion.promoted_default, Some(second.id()));

    let second = attributes.get_existing_attribute(&second.id()).await.unwrap();
    assert!(second.is_default());

    assert_matches!(
        rx.try_recv(),
        Ok(AttributeEvent::Deleted { attributes, promoted_default })
            if attributes.len() == 1 && promoted_default == Some(second.id())
    );
    assert_matches!(rx.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test]
async fn delete_single_version_detaches_neighbours() {
    let alice = address("alice");
    let attributes = test_attributes(&alice, true);
    let [v0, v1, v2] = chain_of_three(&attributes).await;

    attributes.delete_attribute(&v1).await.unwrap();

    let v0 = attributes.get_existing_attribute(&v0).await.unwrap();
    let v2 = attributes.get_existing_attribute(&v2).await.unwrap();
    assert_eq!(v0.succeeded_by(), None);
    assert_eq!(v2.succeeds(), None);
}

#[tokio::test]
async fn change_default() {
    let alice = address("alice");
    let attributes = test_attributes(&alice, true);
    let [v0, _, v2] = chain_of_three(&attributes).await;

    let other = attributes
        .create_own_identity_attribute(given_name(&alice, "A."))
        .await
        .unwrap();
    assert!(!other.is_default());

    assert_matches!(
        attributes.set_as_default_own_identity_attribute(&v0).await,
        Err(AttributesError::CannotSetSucceededAttributeAsDefault(id)) if id == v0
    );

    let mut rx = attributes.subscribe();
    let other = attributes
        .set_as_default_own_identity_attribute(&other.id())
        .await
        .unwrap();
    assert!(other.is_default());
    assert!(!attributes.get_existing_attribute(&v2).await.unwrap().is_default());
    assert_matches!(
        rx.try_recv(),
        Ok(AttributeEvent::DefaultChanged { previous_default, .. })
            if previous_default == Some(v2)
    );

    let query = AttributeQuery::new()
        .role(AttributeRole::OwnIdentity)
        .value_type("GivenName")
        .is_default(true);
    assert_eq!(attributes.query_attributes(&query).await.unwrap().len(), 1);
}

#[tokio::test]
async fn mark_as_viewed_once() {
    let alice = address("alice");
    let attributes = test_attributes(&alice, true);

    let attribute = attributes
        .create_own_identity_attribute(given_name(&alice, "Alice"))
        .await
        .unwrap();
    let mut rx = attributes.subscribe();

    let viewed = attributes
        .mark_attribute_as_viewed(&attribute.id())
        .await
        .unwrap();
    let viewed_at = viewed.metadata().was_viewed_at;
    assert!(viewed_at.is_some());

    let again = attributes
        .mark_attribute_as_viewed(&attribute.id())
        .await
        .unwrap();
    assert_eq!(again.metadata().was_viewed_at, viewed_at);

    assert_matches!(rx.try_recv(), Ok(AttributeEvent::WasViewedAtChanged { .. }));
    assert_matches!(rx.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test]
async fn listeners() {
    let alice = address("alice");
    let bob = address("bob");
    let attributes = test_attributes(&alice, true);

    let query = AttributeQuery::new().value_type("GivenName");
    attributes
        .register_attribute_listener(Reference::new("msg-1"), query.clone(), &bob)
        .await
        .unwrap();
    assert_matches!(
        attributes
            .register_attribute_listener(Reference::new("msg-1"), query, &bob)
            .await,
        Err(AttributesError::ListenerAlreadyExists(_))
    );

    let listeners = attributes.get_attribute_listeners_of_peer(&bob).await.unwrap();
    assert_eq!(listeners.len(), 1);

    assert!(
        attributes
            .delete_attribute_listener(&Reference::new("msg-1"))
            .await
            .unwrap()
    );
    assert!(
        !attributes
            .delete_attribute_listener(&Reference::new("msg-1"))
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn failed_validation_publishes_nothing() {
    let alice = address("alice");
    let attributes = test_attributes(&alice, true);
    let mut rx = attributes.subscribe();

    let _ = attributes
        .create_own_identity_attribute(given_name(&address("bob"), "Bob"))
        .await;
    assert_matches!(rx.try_recv(), Err(TryRecvError::Empty));

    attributes
        .create_own_identity_attribute(given_name(&alice, "Alice"))
        .await
        .unwrap();
    assert_matches!(rx.try_recv(), Ok(AttributeEvent::Created { .. }));
}
