//! Storage configuration types.

#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::error::{StorageError, StorageResult};

/// Storage backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BackendType {
    /// In-process memory.
    Memory,
    /// Local filesystem rooted at `root`.
    Fs,
    /// Amazon S3 compatible storage.
    S3,
}

/// Object storage configuration.
///
/// Persistence is disabled when no backend is selected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct StorageConfig {
    /// Storage backend.
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-backend", env = "DECKSMITH_STORAGE_BACKEND", value_enum)
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendType>,

    /// Root directory (fs) or key prefix (memory, s3).
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-root", env = "DECKSMITH_STORAGE_ROOT")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,

    /// Base URL under which stored objects are publicly readable.
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-public-url", env = "DECKSMITH_STORAGE_PUBLIC_URL")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,

    /// Bucket name (s3).
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-bucket", env = "DECKSMITH_STORAGE_BUCKET")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    /// Region (s3).
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-region", env = "DECKSMITH_STORAGE_REGION")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Custom endpoint for S3-compatible services such as MinIO or R2.
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-endpoint", env = "DECKSMITH_STORAGE_ENDPOINT")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Access key ID (s3).
    #[cfg_attr(
        feature = "config",
        arg(
            long = "storage-access-key-id",
            env = "DECKSMITH_STORAGE_ACCESS_KEY_ID",
            hide_env_values = true
        )
    )]
    #[serde(default, skip_serializing)]
    pub access_key_id: Option<String>,

    /// Secret access key (s3).
    #[cfg_attr(
        feature = "config",
        arg(
            long = "storage-secret-access-key",
            env = "DECKSMITH_STORAGE_SECRET_ACCESS_KEY",
            hide_env_values = true
        )
    )]
    #[serde(default, skip_serializing)]
    pub secret_access_key: Option<String>,
}

impl StorageConfig {
    /// In-memory storage readable under `public_url`.
    pub fn memory(public_url: impl Into<String>) -> Self {
        Self {
            backend: Some(BackendType::Memory),
            public_url: Some(public_url.into()),
            ..Self::default()
        }
    }

    /// Filesystem storage rooted at `root`.
    pub fn fs(root: impl Into<String>) -> Self {
        Self {
            backend: Some(BackendType::Fs),
            root: Some(root.into()),
            ..Self::default()
        }
    }

    /// Sets the public base URL.
    pub fn with_public_url(mut self, public_url: impl Into<String>) -> Self {
        self.public_url = Some(public_url.into());
        self
    }

    /// Returns true if a backend is selected.
    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Checks that the selected backend has what it needs.
    pub fn validate(&self) -> StorageResult<()> {
        match self.backend {
            None | Some(BackendType::Memory) => Ok(()),
            Some(BackendType::Fs) if self.root.is_none() => Err(StorageError::init(
                "filesystem storage requires DECKSMITH_STORAGE_ROOT",
            )),
            Some(BackendType::Fs) => Ok(()),
            Some(BackendType::S3) if self.bucket.is_none() => Err(StorageError::init(
                "s3 storage requires DECKSMITH_STORAGE_BUCKET",
            )),
            Some(BackendType::S3) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_disabled() {
        let config = StorageConfig::default();
        assert!(!config.is_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn fs_and_s3_require_location() {
        let mut config = StorageConfig {
            backend: Some(BackendType::Fs),
            ..StorageConfig::default()
        };
        assert!(config.validate().is_err());
        config.root = Some("/tmp/decks".into());
        assert!(config.validate().is_ok());

        let config = StorageConfig {
            backend: Some(BackendType::S3),
            ..StorageConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn backend_type_parses() {
        assert_eq!("s3".parse::<BackendType>().unwrap(), BackendType::S3);
        assert_eq!(BackendType::Memory.as_ref(), "memory");
    }
}
