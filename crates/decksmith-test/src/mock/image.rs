//! Mock image provider and object storage.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use decksmith_core::image::{GeneratedImage, ImageData, ImageProvider};
use decksmith_core::request::ImageStyle;
use decksmith_core::storage::ObjectStorage;
use decksmith_core::{Error, Result};

/// Smallest valid PNG header, enough for content sniffing.
const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

#[derive(Debug, Default)]
struct ImageState {
    errors: Mutex<VecDeque<Error>>,
    prompts: Mutex<Vec<String>>,
    generated: AtomicUsize,
    downloads: AtomicUsize,
}

/// Image provider returning predictable URLs.
///
/// Queued errors are returned first, one per call.
#[derive(Debug, Clone, Default)]
pub struct MockImageProvider {
    state: Arc<ImageState>,
    temporary: bool,
}

impl MockImageProvider {
    /// Creates a provider returning persistent URLs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks returned URLs as temporary so callers persist them.
    pub fn with_temporary_urls(mut self) -> Self {
        self.temporary = true;
        self
    }

    /// Queues an error for the next call.
    pub fn with_error(self, error: Error) -> Self {
        self.state
            .errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(error);
        self
    }

    /// Prompts received so far, failed calls included.
    pub fn prompts(&self) -> Vec<String> {
        self.state
            .prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of generation calls, failed calls included.
    pub fn calls(&self) -> usize {
        self.prompts().len()
    }

    /// Number of downloads.
    pub fn downloads(&self) -> usize {
        self.state.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ImageProvider for MockImageProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate_image(&self, prompt: &str, _style: ImageStyle) -> Result<GeneratedImage> {
        self.state
            .prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());

        let queued = self
            .state
            .errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        if let Some(error) = queued {
            return Err(error);
        }

        let n = self.state.generated.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(GeneratedImage {
            url: format!("https://images.mock.local/{n}.png"),
            revised_prompt: None,
            temporary: self.temporary,
        })
    }

    async fn download(&self, _url: &str) -> Result<ImageData> {
        self.state.downloads.fetch_add(1, Ordering::SeqCst);
        Ok(ImageData {
            bytes: Bytes::from_static(PNG_SIGNATURE),
            content_type: "image/png".to_string(),
        })
    }
}

/// In-memory object storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    objects: Arc<Mutex<BTreeMap<String, (Bytes, String)>>>,
    failing: bool,
}

impl MemoryStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every upload fail with a storage error.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Stored keys in order.
    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Content type of a stored object.
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map(|(_, content_type)| content_type.clone())
    }
}

#[async_trait::async_trait]
impl ObjectStorage for MemoryStorage {
    async fn upload(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        if self.failing {
            return Err(Error::storage().with_message("upload rejected"));
        }
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), (data, content_type.to_string()));
        Ok(())
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String> {
        Ok(format!(
            "https://storage.mock.local/{key}?expires_in={}",
            ttl.as_secs()
        ))
    }
}

#[cfg(test)]
mod tests {
    use decksmith_core::ErrorKind;

    use super::*;

    #[tokio::test]
    async fn queued_errors_come_first() {
        let provider = MockImageProvider::new().with_error(Error::rate_limited());

        let err = provider
            .generate_image("a", ImageStyle::Minimal)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimited);

        let image = provider
            .generate_image("b", ImageStyle::Minimal)
            .await
            .unwrap();
        assert_eq!(image.url, "https://images.mock.local/1.png");
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn storage_keeps_objects() {
        let storage = MemoryStorage::new();
        storage
            .upload("a.png", Bytes::from_static(b"x"), "image/png")
            .await
            .unwrap();
        assert_eq!(storage.keys(), ["a.png"]);
        assert_eq!(storage.content_type("a.png").as_deref(), Some("image/png"));

        assert!(
            MemoryStorage::failing()
                .upload("b.png", Bytes::new(), "image/png")
                .await
                .is_err()
        );
    }
}
