// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory persistence for attributes and attribute listeners.
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use p2panda_attributes_core::{Address, Attribute, AttributeId, Reference};
use tracing::trace;

use crate::listener::AttributeListener;
use crate::query::AttributeQuery;
use crate::traits::{AttributeListenerStore, AttributeStore, StoreError, Transaction};

#[derive(Clone, Debug, Default)]
pub struct InnerMemoryStore {
    attributes: BTreeMap<AttributeId, Attribute>,
    listeners: BTreeMap<Reference, AttributeListener>,
}

/// An in-memory store for attributes and listeners.
///
/// `MemoryStore` supports usage in asynchronous and multi-threaded contexts by wrapping an
/// `InnerMemoryStore` with an `RwLock` and `Arc`. Convenience methods are provided to obtain a
/// read- or write-lock on the underlying store.
///
/// Transactions take a snapshot of the whole store when they begin and restore it on rollback.
/// This does not isolate concurrent writers from each other, callers are expected to serialise
/// mutations of the same account.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<InnerMemoryStore>>,
}

impl MemoryStore {
    /// Create a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Obtain a read-lock on the store.
    pub fn read_store(&self) -> RwLockReadGuard<'_, InnerMemoryStore> {
        self.inner
            .read()
            .expect("acquire shared read access on store")
    }

    /// Obtain a write-lock on the store.
    pub fn write_store(&self) -> RwLockWriteGuard<'_, InnerMemoryStore> {
        self.inner
            .write()
            .expect("acquire exclusive write access on store")
    }

    /// Number of stored attributes, including technical ones.
    pub fn len(&self) -> usize {
        self.read_store().attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AttributeStore for MemoryStore {
    async fn insert_attribute(&self, attribute: &Attribute) -> Result<(), StoreError> {
        let mut store = self.write_store();
        let id = attribute.id();
        if store.attributes.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }
        trace!(attribute_id = %id, role = %attribute.role(), "insert attribute");
        store.attributes.insert(id, attribute.clone());
        Ok(())
    }

    async fn get_attribute(&self, id: &AttributeId) -> Result<Option<Attribute>, StoreError> {
        Ok(self.read_store().attributes.get(id).cloned())
    }

    async fn has_attribute(&self, id: &AttributeId) -> Result<bool, StoreError> {
        Ok(self.read_store().attributes.contains_key(id))
    }

    async fn update_attribute(&self, attribute: &Attribute) -> Result<(), StoreError> {
        let mut store = self.write_store();
        let id = attribute.id();
        let Some(stored) = store.attributes.get_mut(&id) else {
            return Err(StoreError::NotFound(id));
        };
        trace!(attribute_id = %id, "update attribute");
        *stored = attribute.clone();
        Ok(())
    }

    async fn delete_attribute(&self, id: &AttributeId) -> Result<bool, StoreError> {
        let removed = self.write_store().attributes.remove(id).is_some();
        if removed {
            trace!(attribute_id = %id, "delete attribute");
        }
        Ok(removed)
    }

    async fn query_attributes(
        &self,
        query: &AttributeQuery,
    ) -> Result<Vec<Attribute>, StoreError> {
        let mut attributes: Vec<Attribute> = self
            .read_store()
            .attributes
            .values()
            .filter(|attribute| query.matches(attribute))
            .cloned()
            .collect();
        attributes.sort_by_key(|attribute| (attribute.created_at(), attribute.id()));
        Ok(attributes)
    }
}

#[async_trait]
impl AttributeListenerStore for MemoryStore {
    async fn insert_listener(&self, listener: &AttributeListener) -> Result<(), StoreError> {
        let mut store = self.write_store();
        if store.listeners.contains_key(&listener.id) {
            return Err(StoreError::ListenerAlreadyExists(listener.id.clone()));
        }
        store
            .listeners
            .insert(listener.id.clone(), listener.clone());
        Ok(())
    }

    async fn get_listener(
        &self,
        id: &Reference,
    ) -> Result<Option<AttributeListener>, StoreError> {
        Ok(self.read_store().listeners.get(id).cloned())
    }

    async fn delete_listener(&self, id: &Reference) -> Result<bool, StoreError> {
        Ok(self.write_store().listeners.remove(id).is_some())
    }

    async fn get_listeners_of_peer(
        &self,
        peer: &Address,
    ) -> Result<Vec<AttributeListener>, StoreError> {
        Ok(self
            .read_store()
            .listeners
            .values()
            .filter(|listener| &listener.peer == peer)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl Transaction for MemoryStore {
    type Permit = InnerMemoryStore;

    async fn begin(&self) -> Result<Self::Permit, StoreError> {
        Ok(self.read_store().clone())
    }

    async fn rollback(&self, permit: Self::Permit) -> Result<(), StoreError> {
        trace!("roll back transaction");
        *self.write_store() = permit;
        Ok(())
    }

    async fn commit(&self, _permit: Self::Permit) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use p2panda_attributes_core::test_utils::{
        address, own_identity_attribute, peer_identity_attribute,
    };
    use p2panda_attributes_core::{AttributeId, Reference};

    use crate::listener::AttributeListener;
    use crate::query::AttributeQuery;
    use crate::traits::{AttributeListenerStore, AttributeStore, StoreError, Transaction};

    use super::MemoryStore;

    #[tokio::test]
    async fn insert_get_update_delete() {
        let store = MemoryStore::new();
        let mut attribute = own_identity_attribute(&address("alice"), "Alice");
        let id = attribute.id();

        store.insert_attribute(&attribute).await.unwrap();
        assert_eq!(
            store.insert_attribute(&attribute).await,
            Err(StoreError::AlreadyExists(id))
        );
        assert_eq!(store.get_attribute(&id).await.unwrap(), Some(attribute.clone()));
        assert!(store.has_attribute(&id).await.unwrap());

        attribute.set_default(true);
        store.update_attribute(&attribute).await.unwrap();
        assert!(store.get_attribute(&id).await.unwrap().unwrap().is_default());

        assert!(store.delete_attribute(&id).await.unwrap());
        assert!(!store.delete_attribute(&id).await.unwrap());
        assert_eq!(
            store.update_attribute(&attribute).await,
            Err(StoreError::NotFound(id))
        );
    }

    #[tokio::test]
    async fn versions_are_returned_newest_first() {
        let store = MemoryStore::new();
        let alice = address("alice");

        let mut v0 = own_identity_attribute(&alice, "v0");
        let mut v1 = own_identity_attribute(&alice, "v1");
        let mut v2 = own_identity_attribute(&alice, "v2");
        v0.metadata_mut().succeeded_by = Some(v1.id());
        v1.metadata_mut().succeeds = Some(v0.id());
        v1.metadata_mut().succeeded_by = Some(v2.id());
        v2.metadata_mut().succeeds = Some(v1.id());

        for attribute in [&v0, &v1, &v2] {
            store.insert_attribute(attribute).await.unwrap();
        }

        for id in [v0.id(), v1.id(), v2.id()] {
            let versions = store.get_versions_of_attribute(&id).await.unwrap();
            assert_eq!(versions, vec![v2.clone(), v1.clone(), v0.clone()]);
        }

        let unknown = AttributeId::new(b"unknown");
        assert_matches!(
            store.get_versions_of_attribute(&unknown).await,
            Err(StoreError::NotFound(id)) if id == unknown
        );
    }

    #[tokio::test]
    async fn query_attributes() {
        let store = MemoryStore::new();
        let own = own_identity_attribute(&address("alice"), "Alice");
        let peer = peer_identity_attribute(&address("bob"), "Bob");
        store.insert_attribute(&own).await.unwrap();
        store.insert_attribute(&peer).await.unwrap();

        let result = store
            .query_attributes(&AttributeQuery::new().peer(&address("bob")))
            .await
            .unwrap();
        assert_eq!(result, vec![peer]);
        assert_eq!(
            store
                .query_attributes(&AttributeQuery::new())
                .await
                .unwrap()
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn rollback_restores_snapshot() {
        let store = MemoryStore::new();
        let first = own_identity_attribute(&address("alice"), "First");
        store.insert_attribute(&first).await.unwrap();

        let permit = store.begin().await.unwrap();
        let second = own_identity_attribute(&address("alice"), "Second");
        store.insert_attribute(&second).await.unwrap();
        store.delete_attribute(&first.id()).await.unwrap();
        store.rollback(permit).await.unwrap();

        assert!(store.has_attribute(&first.id()).await.unwrap());
        assert!(!store.has_attribute(&second.id()).await.unwrap());

        let permit = store.begin().await.unwrap();
        store.insert_attribute(&second).await.unwrap();
        store.commit(permit).await.unwrap();
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn listeners() {
        let store = MemoryStore::new();
        let bob = address("bob");
        let listener = AttributeListener::new(
            Reference::new("request-1"),
            AttributeQuery::new().value_type("GivenName"),
            bob.clone(),
        );

        store.insert_listener(&listener).await.unwrap();
        assert_matches!(
            store.insert_listener(&listener).await,
            Err(StoreError::ListenerAlreadyExists(_))
        );
        assert_eq!(
            store.get_listeners_of_peer(&bob).await.unwrap(),
            vec![listener.clone()]
        );
        assert!(
            store
                .get_listeners_of_peer(&address("carol"))
                .await
                .unwrap()
                .is_empty()
        );
        assert!(store.delete_listener(&listener.id).await.unwrap());
        assert_eq!(store.get_listener(&listener.id).await.unwrap(), None);
    }
}
