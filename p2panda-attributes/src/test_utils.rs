// SPDX-License-Identifier: MIT OR Apache-2.0

//! Helpers for testing the attributes engine.
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use p2panda_attributes_core::test_utils::tag_collection;
use p2panda_attributes_core::{Address, AttributeTagCollection};
use p2panda_attributes_store::MemoryStore;

use crate::attributes::Attributes;
use crate::config::Config;
use crate::tags::{TagClient, TagClientError, TagResponse};

pub fn setup_logging() {
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }
}

#[derive(Debug)]
struct TestTagClientState {
    collection: AttributeTagCollection,
    etag: String,
    requests: usize,
    last_etag: Option<String>,
    failure: Option<String>,
}

/// Tag service stand-in which answers with "not modified" whenever the requested ETag matches
/// the published one.
#[derive(Debug)]
pub struct TestTagClient {
    state: Mutex<TestTagClientState>,
}

impl TestTagClient {
    pub fn new(collection: AttributeTagCollection, etag: &str) -> Self {
        Self {
            state: Mutex::new(TestTagClientState {
                collection,
                etag: etag.to_string(),
                requests: 0,
                last_etag: None,
                failure: None,
            }),
        }
    }

    /// Replaces the collection served from now on.
    pub fn publish(&self, collection: AttributeTagCollection, etag: &str) {
        let mut state = self.state.lock().unwrap();
        state.collection = collection;
        state.etag = etag.to_string();
    }

    /// Makes every following request fail.
    pub fn fail_with(&self, message: &str) {
        self.state.lock().unwrap().failure = Some(message.to_string());
    }

    pub fn requests(&self) -> usize {
        self.state.lock().unwrap().requests
    }

    pub fn last_etag(&self) -> Option<String> {
        self.state.lock().unwrap().last_etag.clone()
    }
}

#[async_trait]
impl TagClient for TestTagClient {
    async fn get_tag_collection(&self, etag: Option<&str>) -> Result<TagResponse, TagClientError> {
        let mut state = self.state.lock().unwrap();
        state.requests += 1;
        state.last_etag = etag.map(str::to_string);

        if let Some(message) = &state.failure {
            return Err(TagClientError::Request(message.clone()));
        }

        if etag == Some(state.etag.as_str()) {
            return Ok(TagResponse::not_modified(Some(state.etag.clone())));
        }

        Ok(TagResponse::ok(
            state.collection.clone(),
            Some(state.etag.clone()),
        ))
    }
}

/// Attributes instance of the given local identity on top of an in-memory store.
pub fn test_attributes(local: &Address, default_management: bool) -> Attributes<MemoryStore> {
    setup_logging();

    let config = Config::new(local)
        .with_default_own_identity_attributes(default_management)
        .with_tag_cache_lifetime(Duration::from_secs(60));
    let client = Arc::new(TestTagClient::new(tag_collection(), "v1"));
    Attributes::new(MemoryStore::new(), config, client)
}
