// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence for attributes and attribute listeners.
//!
//! Stores only hold records and answer queries, they do not enforce any of the rules of the
//! attribute data model. Those are the job of the `p2panda-attributes` engine which writes to a
//! store through the [`AttributeStore`] and [`AttributeListenerStore`] traits and groups
//! multi-step mutations with [`Transaction`].
//!
//! An in-memory implementation is available behind the `memory` feature (enabled by default).
mod listener;
#[cfg(feature = "memory")]
pub mod memory;
mod query;
mod traits;

pub use listener::AttributeListener;
#[cfg(feature = "memory")]
pub use memory::MemoryStore;
pub use query::AttributeQuery;
pub use traits::{AttributeListenerStore, AttributeStore, StoreError, Transaction};
