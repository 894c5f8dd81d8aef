// SPDX-License-Identifier: MIT OR Apache-2.0

#![cfg_attr(doctest, doc=include_str!("../README.md"))]

//! Engine for versioned identity and relationship attributes which are shared between peers.
//!
//! [`Attributes`] is the controller of all attributes held by one local identity. It creates
//! attributes in each of their roles, links new versions into succession chains, records to which
//! peers an attribute was forwarded and tracks the deletion handshakes with those peers. Every
//! mutation is validated first and then applied to the store within one transaction.
//!
//! Messages of peers arrive as [`ProtocolItem`]s. Each item type has an [`ItemProcessor`] which
//! checks the item against the local state, applies it and undoes it again when the surrounding
//! message could not be handled as a whole. [`ProcessorRegistry`] dispatches items to their
//! processors.
//!
//! Changes are announced as [`AttributeEvent`]s to everyone who subscribed with
//! [`Attributes::subscribe`].
//!
//! Tags of attribute values are validated against a tag collection which is fetched from a remote
//! service through a [`TagClient`] and cached for a configurable lifetime.
pub mod attributes;
pub mod config;
pub mod error;
pub mod event;
pub mod processors;
pub mod tags;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use attributes::{Attributes, FullDeletion, Succession, SuccessorParams};
pub use config::Config;
pub use error::{AttributesError, ErrorKind, ValidationResult};
pub use event::{AttributeEvent, EventBus};
pub use processors::{ItemContext, ItemProcessor, ItemType, ProcessorRegistry, ProtocolItem};
pub use tags::{TagClient, TagClientError, TagCollectionCache, TagResponse, TagResponseStatus};
