// SPDX-License-Identifier: MIT OR Apache-2.0

use std::time::Duration;

use p2panda_attributes_core::Address;
use serde::{Deserialize, Serialize};

/// Default lifetime of a cached tag collection.
pub const DEFAULT_TAG_CACHE_LIFETIME: Duration = Duration::from_secs(30 * 60);

/// Default capacity of the event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 128;

/// Configuration for an attributes instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Address of the local identity, owner of all own attributes.
    pub(crate) local_address: Address,

    /// Keep exactly one own identity attribute per value type marked as default.
    pub(crate) set_default_own_identity_attributes: bool,

    /// How long a fetched tag collection is used before it gets revalidated with the tag
    /// service. Zero revalidates on every access.
    pub(crate) tag_cache_lifetime: Duration,

    /// Number of events buffered for slow subscribers before they start lagging.
    pub(crate) event_capacity: usize,
}

impl Config {
    pub fn new(local_address: &Address) -> Self {
        Self {
            local_address: local_address.to_owned(),
            set_default_own_identity_attributes: false,
            tag_cache_lifetime: DEFAULT_TAG_CACHE_LIFETIME,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    pub fn with_default_own_identity_attributes(mut self, enabled: bool) -> Self {
        self.set_default_own_identity_attributes = enabled;
        self
    }

    pub fn with_tag_cache_lifetime(mut self, lifetime: Duration) -> Self {
        self.tag_cache_lifetime = lifetime;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn local_address(&self) -> &Address {
        &self.local_address
    }

    pub fn default_management(&self) -> bool {
        self.set_default_own_identity_attributes
    }

    pub fn tag_cache_lifetime(&self) -> Duration {
        self.tag_cache_lifetime
    }

    pub fn event_capacity(&self) -> usize {
        self.event_capacity
    }
}
