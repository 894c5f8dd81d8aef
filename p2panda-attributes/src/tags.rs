// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cached access to the tag collection of the tag-definition service.
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
#[cfg(not(test))]
use std::time::Instant;

use async_trait::async_trait;
#[cfg(test)]
use mock_instant::thread_local::Instant;
use p2panda_attributes_core::AttributeTagCollection;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, trace};

/// Status of a tag service response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagResponseStatus {
    /// The response carries a tag collection.
    Ok,

    /// The collection did not change since the version named by the sent ETag.
    NotModified,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagResponse {
    pub status: TagResponseStatus,
    pub etag: Option<String>,
    pub body: Option<AttributeTagCollection>,
}

impl TagResponse {
    pub fn ok(collection: AttributeTagCollection, etag: Option<String>) -> Self {
        Self {
            status: TagResponseStatus::Ok,
            etag,
            body: Some(collection),
        }
    }

    pub fn not_modified(etag: Option<String>) -> Self {
        Self {
            status: TagResponseStatus::NotModified,
            etag,
            body: None,
        }
    }
}

/// Client of the tag-definition service.
#[async_trait]
pub trait TagClient: Send + Sync {
    /// Fetches the tag collection.
    ///
    /// When an ETag is given the service answers with [`TagResponseStatus::NotModified`] and no
    /// body if its collection still has that version.
    async fn get_tag_collection(&self, etag: Option<&str>) -> Result<TagResponse, TagClientError>;
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TagClientError {
    #[error("tag service request failed: {0}")]
    Request(String),

    #[error("tag service responded without a tag collection")]
    MissingBody,

    #[error("tag service reported no modification but nothing is cached")]
    NothingCached,
}

#[derive(Debug, Default)]
struct CacheState {
    collection: Option<AttributeTagCollection>,
    etag: Option<String>,
    fetched_at: Option<Instant>,
    revision: u64,
}

/// Tag collection cache with two composed invalidation policies.
///
/// Within the configured lifetime the cached collection is returned without contacting the
/// service. After that the service is asked with the last known ETag, a "not modified" answer
/// keeps the cached collection and restarts the lifetime while a full answer replaces it.
///
/// Concurrent callers racing past an expired lifetime may all contact the service, the
/// resulting replacements are equivalent.
pub struct TagCollectionCache {
    client: Arc<dyn TagClient>,
    lifetime: Duration,
    state: Mutex<CacheState>,
}

impl TagCollectionCache {
    pub fn new(client: Arc<dyn TagClient>, lifetime: Duration) -> Self {
        Self {
            client,
            lifetime,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Returns the current tag collection, fetching or revalidating it when needed.
    ///
    /// Errors of the tag service are handed to the caller as they are, nothing is retried.
    pub async fn get(&self) -> Result<AttributeTagCollection, TagClientError> {
        let etag = {
            let state = self.state.lock().await;
            if let (Some(collection), Some(fetched_at)) = (&state.collection, state.fetched_at)
                && fetched_at.elapsed() < self.lifetime
            {
                trace!("tag collection served from cache");
                return Ok(collection.clone());
            }
            state.etag.clone()
        };

        let response = self.client.get_tag_collection(etag.as_deref()).await?;

        let mut state = self.state.lock().await;
        match response.status {
            TagResponseStatus::NotModified => {
                let collection = state
                    .collection
                    .clone()
                    .ok_or(TagClientError::NothingCached)?;
                debug!(etag = ?etag, "tag collection not modified");
                state.fetched_at = Some(Instant::now());
                Ok(collection)
            }
            TagResponseStatus::Ok => {
                let collection = response.body.ok_or(TagClientError::MissingBody)?;
                debug!(etag = ?response.etag, "replace cached tag collection");
                state.collection = Some(collection.clone());
                state.etag = response.etag;
                state.fetched_at = Some(Instant::now());
                state.revision += 1;
                Ok(collection)
            }
        }
    }

    /// Number of times the cached collection was replaced.
    pub async fn revision(&self) -> u64 {
        self.state.lock().await.revision
    }
}

impl fmt::Debug for TagCollectionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagCollectionCache")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}
