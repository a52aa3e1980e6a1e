//! Configuration for the image generation client.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Default timeout for image requests: 120 seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for the OpenAI-compatible image client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ImageClientConfig {
    /// Base URL of the images API.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "image-base-url",
            env = "DECKSMITH_IMAGE_BASE_URL",
            default_value = "https://api.openai.com/v1"
        )
    )]
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Image model name.
    #[cfg_attr(
        feature = "config",
        arg(
            id = "image_model",
            long = "image-model",
            env = "DECKSMITH_IMAGE_MODEL",
            default_value = "dall-e-3"
        )
    )]
    #[serde(default = "default_model")]
    pub model: String,

    /// API key sent as a bearer token.
    #[cfg_attr(
        feature = "config",
        arg(
            id = "image_api_key",
            long = "image-api-key",
            env = "DECKSMITH_IMAGE_API_KEY",
            hide_env_values = true
        )
    )]
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Requested image size.
    #[cfg_attr(
        feature = "config",
        arg(long = "image-size", env = "DECKSMITH_IMAGE_SIZE", default_value = "1792x1024")
    )]
    #[serde(default = "default_size")]
    pub size: String,

    /// Request timeout in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long = "image-timeout-secs", env = "DECKSMITH_IMAGE_TIMEOUT_SECS", default_value_t = 120)
    )]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "dall-e-3".to_string()
}

fn default_size() -> String {
    "1792x1024".to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl Default for ImageClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
            size: default_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ImageClientConfig {
    /// Sets the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Returns the effective timeout, using default if zero.
    pub fn timeout(&self) -> Duration {
        if self.timeout_secs == 0 {
            DEFAULT_TIMEOUT
        } else {
            Duration::from_secs(self.timeout_secs)
        }
    }

    /// Endpoint for image generation.
    pub fn generations_url(&self) -> String {
        format!("{}/images/generations", self.base_url.trim_end_matches('/'))
    }

    /// Returns the user agent string.
    pub fn user_agent(&self) -> String {
        format!("decksmith/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("invalid image base URL '{}': {e}", self.base_url)))?;

        if self.api_key.as_deref().is_none_or(str::is_empty) {
            return Err(Error::Config("an image API key is required".into()));
        }

        let valid_size = self
            .size
            .split_once('x')
            .is_some_and(|(w, h)| w.parse::<u32>().is_ok() && h.parse::<u32>().is_ok());
        if !valid_size {
            return Err(Error::Config(format!(
                "image size '{}' must look like 1024x1024",
                self.size
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_openai() {
        let config = ImageClientConfig::default();
        assert_eq!(
            config.generations_url(),
            "https://api.openai.com/v1/images/generations"
        );
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn validation_checks_key_url_and_size() {
        let config = ImageClientConfig::default();
        assert!(config.validate().is_err());

        let config = config.with_api_key("key");
        assert!(config.validate().is_ok());

        let mut bad_size = config.clone();
        bad_size.size = "large".into();
        assert!(bad_size.validate().is_err());

        let bad_url = config.with_base_url("not a url");
        assert!(bad_url.validate().is_err());
    }

    #[test]
    fn trailing_slash_is_ignored() {
        let config = ImageClientConfig::default().with_base_url("http://localhost:8080/v1/");
        assert_eq!(
            config.generations_url(),
            "http://localhost:8080/v1/images/generations"
        );
    }
}
