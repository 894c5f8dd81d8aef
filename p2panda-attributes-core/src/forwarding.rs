// SPDX-License-Identifier: MIT OR Apache-2.0

//! Peers an attribute was disclosed to.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::Address;
use crate::deletion::{DeletionInfo, DeletionStatus};
use crate::id::Reference;
use crate::timestamp::Timestamp;

/// Disclosure of an attribute to one peer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardingDetails {
    peer: Address,
    source_reference: Reference,
    shared_at: Timestamp,
    number_of_forwards: u32,
    deletion_info: Option<DeletionInfo>,
}

impl ForwardingDetails {
    pub fn new(peer: Address, source_reference: Reference, shared_at: Timestamp) -> Self {
        Self {
            peer,
            source_reference,
            shared_at,
            number_of_forwards: 1,
            deletion_info: None,
        }
    }

    pub fn peer(&self) -> &Address {
        &self.peer
    }

    pub fn source_reference(&self) -> &Reference {
        &self.source_reference
    }

    pub fn shared_at(&self) -> Timestamp {
        self.shared_at
    }

    /// How often the attribute was disclosed to this peer, counting re-disclosures after the peer
    /// deleted it.
    pub fn number_of_forwards(&self) -> u32 {
        self.number_of_forwards
    }

    pub fn deletion_info(&self) -> Option<&DeletionInfo> {
        self.deletion_info.as_ref()
    }

    /// Returns `true` if the peer still holds the attribute.
    pub fn is_active(&self) -> bool {
        !self
            .deletion_info
            .is_some_and(|info| info.status().is_terminal())
    }

    pub(crate) fn set_deletion_info(&mut self, deletion_info: Option<DeletionInfo>) {
        self.deletion_info = deletion_info;
    }
}

/// All forwarding details of an attribute, at most one per peer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Forwardings(Vec<ForwardingDetails>);

impl Forwardings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, peer: &Address) -> Option<&ForwardingDetails> {
        self.0.iter().find(|details| details.peer() == peer)
    }

    fn get_mut(&mut self, peer: &Address) -> Option<&mut ForwardingDetails> {
        self.0.iter_mut().find(|details| details.peer() == peer)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ForwardingDetails> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Peers which still hold the attribute.
    pub fn active_peers(&self) -> impl Iterator<Item = &Address> {
        self.0
            .iter()
            .filter(|details| details.is_active())
            .map(ForwardingDetails::peer)
    }

    /// Returns `true` if the attribute was disclosed to the peer and the peer did not delete it.
    pub fn is_forwarded_to(&self, peer: &Address) -> bool {
        self.get(peer).is_some_and(ForwardingDetails::is_active)
    }

    /// Registers a disclosure of the attribute to a peer.
    ///
    /// A peer who deleted the attribute receives fresh details with an incremented forward
    /// counter. A peer who agreed to delete it but did not yet keeps its details with the new
    /// source reference. Any other existing details make this fail.
    pub fn add(
        &mut self,
        peer: Address,
        source_reference: Reference,
        shared_at: Timestamp,
    ) -> Result<(), ForwardingError> {
        let Some(existing) = self.get_mut(&peer) else {
            self.0
                .push(ForwardingDetails::new(peer, source_reference, shared_at));
            return Ok(());
        };

        match existing.deletion_info().map(DeletionInfo::status) {
            Some(DeletionStatus::DeletedByRecipient) => {
                let number_of_forwards = existing.number_of_forwards + 1;
                *existing = ForwardingDetails {
                    number_of_forwards,
                    ..ForwardingDetails::new(peer, source_reference, shared_at)
                };
                Ok(())
            }
            Some(DeletionStatus::ToBeDeletedByRecipient) => {
                existing.source_reference = source_reference;
                existing.shared_at = shared_at;
                existing.deletion_info = None;
                Ok(())
            }
            _ => Err(ForwardingError::AlreadyForwarded(peer)),
        }
    }

    /// Removes the details of a peer, returning them if there were any.
    pub fn remove(&mut self, peer: &Address) -> Option<ForwardingDetails> {
        let index = self.0.iter().position(|details| details.peer() == peer)?;
        Some(self.0.remove(index))
    }

    /// Puts previously removed or captured details back in place.
    pub fn restore(&mut self, details: ForwardingDetails) {
        match self.get_mut(&details.peer.clone()) {
            Some(existing) => *existing = details,
            None => self.0.push(details),
        }
    }

    pub(crate) fn set_deletion_info(
        &mut self,
        peer: &Address,
        deletion_info: Option<DeletionInfo>,
    ) -> Result<(), ForwardingError> {
        let details = self
            .get_mut(peer)
            .ok_or_else(|| ForwardingError::NotForwarded(peer.clone()))?;
        details.set_deletion_info(deletion_info);
        Ok(())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ForwardingError {
    #[error("attribute was already forwarded to peer {0}")]
    AlreadyForwarded(Address),

    #[error("attribute was never forwarded to peer {0}")]
    NotForwarded(Address),
}

#[cfg(test)]
mod tests {
    use crate::deletion::{DeletionInfo, DeletionStatus};
    use crate::id::Reference;
    use crate::test_utils::address;
    use crate::timestamp::Timestamp;

    use super::{ForwardingError, Forwardings};

    #[test]
    fn add_and_remove() {
        let bob = address("bob");
        let mut forwardings = Forwardings::new();

        forwardings
            .add(bob.clone(), Reference::new("msg-1"), Timestamp::from_millis(1))
            .unwrap();
        assert!(forwardings.is_forwarded_to(&bob));
        assert_eq!(forwardings.get(&bob).unwrap().number_of_forwards(), 1);

        assert_eq!(
            forwardings.add(bob.clone(), Reference::new("msg-2"), Timestamp::from_millis(2)),
            Err(ForwardingError::AlreadyForwarded(bob.clone()))
        );

        let removed = forwardings.remove(&bob).unwrap();
        assert_eq!(removed.source_reference(), &Reference::new("msg-1"));
        assert!(!forwardings.is_forwarded_to(&bob));
        assert!(forwardings.remove(&bob).is_none());
    }

    #[test]
    fn re_forward_after_deletion_by_recipient() {
        let bob = address("bob");
        let mut forwardings = Forwardings::new();
        forwardings
            .add(bob.clone(), Reference::new("msg-1"), Timestamp::from_millis(1))
            .unwrap();
        forwardings
            .set_deletion_info(
                &bob,
                Some(DeletionInfo::new(
                    DeletionStatus::DeletedByRecipient,
                    Timestamp::from_millis(2),
                )),
            )
            .unwrap();
        assert!(!forwardings.is_forwarded_to(&bob));

        forwardings
            .add(bob.clone(), Reference::new("msg-2"), Timestamp::from_millis(3))
            .unwrap();
        let details = forwardings.get(&bob).unwrap();
        assert_eq!(details.number_of_forwards(), 2);
        assert_eq!(details.source_reference(), &Reference::new("msg-2"));
        assert_eq!(details.deletion_info(), None);
        assert_eq!(forwardings.len(), 1);
    }

    #[test]
    fn re_forward_while_to_be_deleted_by_recipient() {
        let bob = address("bob");
        let mut forwardings = Forwardings::new();
        forwardings
            .add(bob.clone(), Reference::new("msg-1"), Timestamp::from_millis(1))
            .unwrap();
        forwardings
            .set_deletion_info(
                &bob,
                Some(DeletionInfo::new(
                    DeletionStatus::ToBeDeletedByRecipient,
                    Timestamp::from_millis(100),
                )),
            )
            .unwrap();

        forwardings
            .add(bob.clone(), Reference::new("msg-2"), Timestamp::from_millis(3))
            .unwrap();
        let details = forwardings.get(&bob).unwrap();
        assert_eq!(details.number_of_forwards(), 1);
        assert_eq!(details.source_reference(), &Reference::new("msg-2"));
    }

    #[test]
    fn pending_deletion_requests_still_count_as_forwarded() {
        let bob = address("bob");
        for status in [
            DeletionStatus::DeletionRequestSent,
            DeletionStatus::DeletionRequestRejected,
        ] {
            let mut forwardings = Forwardings::new();
            forwardings
                .add(bob.clone(), Reference::new("msg-1"), Timestamp::from_millis(1))
                .unwrap();
            forwardings
                .set_deletion_info(&bob, Some(DeletionInfo::new(status, Timestamp::from_millis(2))))
                .unwrap();

            assert!(forwardings.is_forwarded_to(&bob));
            assert_eq!(
                forwardings.add(bob.clone(), Reference::new("msg-2"), Timestamp::from_millis(3)),
                Err(ForwardingError::AlreadyForwarded(bob.clone()))
            );
        }
    }
}
