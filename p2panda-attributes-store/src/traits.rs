// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashSet;

use async_trait::async_trait;
use p2panda_attributes_core::{Address, Attribute, AttributeId, Reference};
use thiserror::Error;

use crate::listener::AttributeListener;
use crate::query::AttributeQuery;

/// Persistence of attributes.
///
/// Implementations store attributes as they are handed to them, validation of roles, deletion
/// statuses and version chains happens before the store gets called.
#[async_trait]
pub trait AttributeStore: Send + Sync {
    /// Insert a new attribute.
    ///
    /// Fails with [`StoreError::AlreadyExists`] if an attribute with the same id is stored
    /// already.
    async fn insert_attribute(&self, attribute: &Attribute) -> Result<(), StoreError>;

    /// Get an attribute by its id.
    async fn get_attribute(&self, id: &AttributeId) -> Result<Option<Attribute>, StoreError>;

    /// Returns `true` if an attribute with this id exists.
    async fn has_attribute(&self, id: &AttributeId) -> Result<bool, StoreError> {
        Ok(self.get_attribute(id).await?.is_some())
    }

    /// Overwrite an existing attribute.
    ///
    /// Fails with [`StoreError::NotFound`] if no attribute with this id is stored.
    async fn update_attribute(&self, attribute: &Attribute) -> Result<(), StoreError>;

    /// Delete an attribute.
    ///
    /// Returns `true` when the removal occurred and `false` when the attribute was not found in
    /// the store.
    async fn delete_attribute(&self, id: &AttributeId) -> Result<bool, StoreError>;

    /// All attributes matching the query, oldest first.
    async fn query_attributes(&self, query: &AttributeQuery)
    -> Result<Vec<Attribute>, StoreError>;

    /// All versions in the succession chain of an attribute, newest first.
    ///
    /// The chain is followed in both directions starting at the given attribute, so the result
    /// is the same for every version of the chain.
    async fn get_versions_of_attribute(
        &self,
        id: &AttributeId,
    ) -> Result<Vec<Attribute>, StoreError> {
        let attribute = self
            .get_attribute(id)
            .await?
            .ok_or(StoreError::NotFound(*id))?;

        let mut seen = HashSet::from([attribute.id()]);

        let mut successors = Vec::new();
        let mut next = attribute.succeeded_by();
        while let Some(next_id) = next {
            if !seen.insert(next_id) {
                break;
            }
            let Some(successor) = self.get_attribute(&next_id).await? else {
                break;
            };
            next = successor.succeeded_by();
            successors.push(successor);
        }

        let mut predecessors = Vec::new();
        let mut previous = attribute.succeeds();
        while let Some(previous_id) = previous {
            if !seen.insert(previous_id) {
                break;
            }
            let Some(predecessor) = self.get_attribute(&previous_id).await? else {
                break;
            };
            previous = predecessor.succeeds();
            predecessors.push(predecessor);
        }

        let mut versions: Vec<Attribute> = successors.into_iter().rev().collect();
        versions.push(attribute);
        versions.extend(predecessors);
        Ok(versions)
    }
}

/// Persistence of attribute listeners registered by peers.
#[async_trait]
pub trait AttributeListenerStore: Send + Sync {
    async fn insert_listener(&self, listener: &AttributeListener) -> Result<(), StoreError>;

    async fn get_listener(
        &self,
        id: &Reference,
    ) -> Result<Option<AttributeListener>, StoreError>;

    /// Returns `true` when the removal occurred and `false` when the listener was not found.
    async fn delete_listener(&self, id: &Reference) -> Result<bool, StoreError>;

    async fn get_listeners_of_peer(
        &self,
        peer: &Address,
    ) -> Result<Vec<AttributeListener>, StoreError>;
}

/// Traits to implement database transaction provider.
///
/// To guard against sharing transactions unknowingly across unrelated database queries, a concept
/// of a "permit" was introduced which does not protect from misuse but helps to make "holding" a
/// transaction explicit.
#[async_trait]
pub trait Transaction: Send + Sync {
    type Permit: Send;

    /// Begins a transaction.
    async fn begin(&self) -> Result<Self::Permit, StoreError>;

    /// Rolls back the transaction and with that all uncommitted changes.
    async fn rollback(&self, permit: Self::Permit) -> Result<(), StoreError>;

    /// Commits the transaction.
    async fn commit(&self, permit: Self::Permit) -> Result<(), StoreError>;
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("attribute {0} already exists")]
    AlreadyExists(AttributeId),

    #[error("attribute {0} not found")]
    NotFound(AttributeId),

    #[error("listener {0} already exists")]
    ListenerAlreadyExists(Reference),

    /// Error returned from storage backends.
    #[error("an error occurred in the storage backend: {0}")]
    Custom(String),
}
