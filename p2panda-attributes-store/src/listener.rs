// SPDX-License-Identifier: MIT OR Apache-2.0

use p2panda_attributes_core::{Address, Reference};
use serde::{Deserialize, Serialize};

use crate::query::AttributeQuery;

/// Standing request of a peer to be informed about attributes matching a query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeListener {
    /// Reference of the request the listener was registered with.
    pub id: Reference,
    pub query: AttributeQuery,
    pub peer: Address,
}

impl AttributeListener {
    pub fn new(id: Reference, query: AttributeQuery, peer: Address) -> Self {
        Self { id, query, peer }
    }
}
