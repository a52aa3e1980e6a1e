//! Object storage abstraction used to persist generated images.

use std::time::Duration;

use bytes::Bytes;

use crate::Result;

/// Minimal object store.
#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Writes `data` under `key`.
    async fn upload(&self, key: &str, data: Bytes, content_type: &str) -> Result<()>;

    /// Returns a URL granting read access to `key` for `ttl`.
    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String>;
}
