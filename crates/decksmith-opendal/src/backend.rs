//! Storage backend implementation.

use std::time::Duration;

use bytes::Bytes;
use decksmith_core::storage::ObjectStorage;
#[allow(unused_imports)]
use opendal::{Operator, services};

use crate::TRACING_TARGET;
use crate::config::{BackendType, StorageConfig};
use crate::error::{StorageError, StorageResult};

/// Object storage backed by an OpenDAL operator.
#[derive(Clone, Debug)]
pub struct StorageBackend {
    operator: Operator,
    backend: BackendType,
    public_url: Option<String>,
}

impl StorageBackend {
    /// Creates a storage backend from configuration.
    ///
    /// Returns `Ok(None)` when no backend is configured.
    pub fn from_config(config: &StorageConfig) -> StorageResult<Option<Self>> {
        config.validate()?;
        let Some(backend) = config.backend else {
            return Ok(None);
        };

        let operator = Self::create_operator(backend, config)?;

        tracing::info!(
            target: TRACING_TARGET,
            backend = %backend,
            root = config.root.as_deref().unwrap_or("/"),
            public_url = config.public_url.as_deref(),
            "Storage backend initialized"
        );

        Ok(Some(Self {
            operator,
            backend,
            public_url: config.public_url.clone(),
        }))
    }

    /// Returns the backend type.
    pub fn backend_type(&self) -> BackendType {
        self.backend
    }

    /// Reads an object back.
    pub async fn read(&self, key: &str) -> StorageResult<Bytes> {
        let data = self.operator.read(key).await?.to_bytes();

        tracing::debug!(
            target: TRACING_TARGET,
            key = %key,
            size = data.len(),
            "Object read complete"
        );

        Ok(data)
    }

    /// Writes an object, attaching the content type where the backend allows.
    pub async fn write(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        let size = data.len();
        let capability = self.operator.info().full_capability();

        if capability.write_with_content_type {
            self.operator
                .write_with(key, data)
                .content_type(content_type)
                .await?;
        } else {
            self.operator.write(key, data).await?;
        }

        tracing::debug!(
            target: TRACING_TARGET,
            key = %key,
            size,
            content_type = %content_type,
            "Object write complete"
        );

        Ok(())
    }

    /// Returns a read URL for `key`.
    ///
    /// Presigns when the backend supports it, otherwise joins the key onto
    /// the public base URL.
    pub async fn url_for(&self, key: &str, ttl: Duration) -> StorageResult<String> {
        if self.operator.info().full_capability().presign_read {
            let request = self.operator.presign_read(key, ttl).await?;
            return Ok(request.uri().to_string());
        }

        match &self.public_url {
            Some(base) => Ok(join_url(base, key)),
            None => Err(StorageError::unsupported(format!(
                "{} backend cannot presign and no public URL is configured",
                self.backend
            ))),
        }
    }

    #[allow(unreachable_code, unused_variables)]
    fn create_operator(backend: BackendType, config: &StorageConfig) -> StorageResult<Operator> {
        let root = config.root.as_deref().unwrap_or("/");

        match backend {
            BackendType::Memory => {
                #[cfg(feature = "memory")]
                {
                    let builder = services::Memory::default().root(root);
                    return Operator::new(builder)
                        .map(|op| op.finish())
                        .map_err(|e| StorageError::init(e.to_string()));
                }
            }
            BackendType::Fs => {
                #[cfg(feature = "fs")]
                {
                    let builder = services::Fs::default().root(root);
                    return Operator::new(builder)
                        .map(|op| op.finish())
                        .map_err(|e| StorageError::init(e.to_string()));
                }
            }
            BackendType::S3 => {
                #[cfg(feature = "s3")]
                {
                    let bucket = config.bucket.as_deref().unwrap_or_default();
                    let mut builder = services::S3::default().bucket(bucket).root(root);

                    if let Some(ref region) = config.region {
                        builder = builder.region(region);
                    }

                    if let Some(ref endpoint) = config.endpoint {
                        builder = builder.endpoint(endpoint);
                    }

                    if let Some(ref access_key_id) = config.access_key_id {
                        builder = builder.access_key_id(access_key_id);
                    }

                    if let Some(ref secret_access_key) = config.secret_access_key {
                        builder = builder.secret_access_key(secret_access_key);
                    }

                    return Operator::new(builder)
                        .map(|op| op.finish())
                        .map_err(|e| StorageError::init(e.to_string()));
                }
            }
        }

        Err(StorageError::init(format!(
            "the {backend} backend is not enabled in this build"
        )))
    }
}

fn join_url(base: &str, key: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        key.trim_start_matches('/')
    )
}

#[async_trait::async_trait]
impl ObjectStorage for StorageBackend {
    async fn upload(&self, key: &str, data: Bytes, content_type: &str) -> decksmith_core::Result<()> {
        Ok(self.write(key, data, content_type).await?)
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> decksmith_core::Result<String> {
        Ok(self.url_for(key, ttl).await?)
    }
}

#[cfg(all(test, feature = "memory", feature = "fs"))]
mod tests {
    use decksmith_core::ErrorKind;

    use super::*;

    #[test]
    fn disabled_config_yields_no_backend() {
        let backend = StorageBackend::from_config(&StorageConfig::default()).unwrap();
        assert!(backend.is_none());
    }

    #[tokio::test]
    async fn memory_round_trip_and_public_url() {
        let config = StorageConfig::memory("https://cdn.example.com/assets/");
        let storage = StorageBackend::from_config(&config).unwrap().unwrap();

        storage
            .upload("decks/a/slide-01.png", Bytes::from_static(b"png"), "image/png")
            .await
            .unwrap();
        assert_eq!(
            storage.read("decks/a/slide-01.png").await.unwrap(),
            Bytes::from_static(b"png")
        );

        let url = storage
            .signed_url("decks/a/slide-01.png", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.example.com/assets/decks/a/slide-01.png");
    }

    #[tokio::test]
    async fn signed_url_without_presign_or_public_url_fails() {
        let config = StorageConfig {
            backend: Some(BackendType::Memory),
            ..StorageConfig::default()
        };
        let storage = StorageBackend::from_config(&config).unwrap().unwrap();

        let error = storage
            .signed_url("key.png", Duration::from_secs(60))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Storage);
    }

    #[tokio::test]
    async fn filesystem_backend_writes_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_string_lossy().to_string();
        let config = StorageConfig::fs(root).with_public_url("file:///decks");
        let storage = StorageBackend::from_config(&config).unwrap().unwrap();

        storage
            .upload("deck/slide-02.png", Bytes::from_static(b"img"), "image/png")
            .await
            .unwrap();

        assert!(dir.path().join("deck/slide-02.png").exists());
    }
}
