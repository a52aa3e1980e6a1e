//! Pipeline configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use decksmith_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Upper bound for repair attempts per slide.
const MAX_REPAIR_ATTEMPTS: usize = 5;

/// Tuning knobs of the generation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct PipelineConfig {
    /// Model-based repair attempts per slide before the deterministic fallback.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "max-repair-attempts",
            env = "DECKSMITH_MAX_REPAIR_ATTEMPTS",
            default_value_t = 2
        )
    )]
    #[serde(default = "default_max_repair_attempts")]
    pub max_repair_attempts: usize,

    /// Content slides a deck may have before an agenda is inserted.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "max-slides-without-agenda",
            env = "DECKSMITH_MAX_SLIDES_WITHOUT_AGENDA",
            default_value_t = 6
        )
    )]
    #[serde(default = "default_max_slides_without_agenda")]
    pub max_slides_without_agenda: usize,
}

fn default_max_repair_attempts() -> usize {
    2
}

fn default_max_slides_without_agenda() -> usize {
    6
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_repair_attempts: default_max_repair_attempts(),
            max_slides_without_agenda: default_max_slides_without_agenda(),
        }
    }
}

impl PipelineConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of model-based repair attempts.
    pub fn with_max_repair_attempts(mut self, attempts: usize) -> Self {
        self.max_repair_attempts = attempts;
        self
    }

    /// Sets the agenda threshold.
    pub fn with_max_slides_without_agenda(mut self, slides: usize) -> Self {
        self.max_slides_without_agenda = slides;
        self
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.max_repair_attempts > MAX_REPAIR_ATTEMPTS {
            return Err(Error::configuration().with_message(format!(
                "max repair attempts must be at most {MAX_REPAIR_ATTEMPTS}"
            )));
        }
        Ok(())
    }
}

/// Tuning knobs of the image orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ImageConfig {
    /// Retries after a rate-limited image request.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "max-image-retries",
            env = "DECKSMITH_MAX_IMAGE_RETRIES",
            default_value_t = 3
        )
    )]
    #[serde(default = "default_max_image_retries")]
    pub max_image_retries: u32,

    /// Pause between two image requests, in milliseconds.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "inter-image-delay-ms",
            env = "DECKSMITH_INTER_IMAGE_DELAY_MS",
            default_value_t = 1500
        )
    )]
    #[serde(default = "default_inter_image_delay_ms")]
    pub inter_image_delay_ms: u64,

    /// Base delay of the rate-limit backoff, in milliseconds.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "image-backoff-ms",
            env = "DECKSMITH_IMAGE_BACKOFF_MS",
            default_value_t = 2000
        )
    )]
    #[serde(default = "default_image_backoff_ms")]
    pub image_backoff_ms: u64,

    /// Lifetime of signed URLs for persisted images, in seconds.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "signed-url-ttl-secs",
            env = "DECKSMITH_SIGNED_URL_TTL_SECS",
            default_value_t = 604_800
        )
    )]
    #[serde(default = "default_signed_url_ttl_secs")]
    pub signed_url_ttl_secs: u64,
}

fn default_max_image_retries() -> u32 {
    3
}

fn default_inter_image_delay_ms() -> u64 {
    1500
}

fn default_image_backoff_ms() -> u64 {
    2000
}

fn default_signed_url_ttl_secs() -> u64 {
    7 * 24 * 60 * 60
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_image_retries: default_max_image_retries(),
            inter_image_delay_ms: default_inter_image_delay_ms(),
            image_backoff_ms: default_image_backoff_ms(),
            signed_url_ttl_secs: default_signed_url_ttl_secs(),
        }
    }
}

impl ImageConfig {
    /// Configuration without any delay, for tests and local runs.
    pub fn immediate() -> Self {
        Self {
            inter_image_delay_ms: 0,
            image_backoff_ms: 0,
            ..Self::default()
        }
    }

    /// Pause between two image requests.
    pub fn inter_image_delay(&self) -> Duration {
        Duration::from_millis(self.inter_image_delay_ms)
    }

    /// Delay before rate-limit retry number `attempt` (zero-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.image_backoff_ms)
            .saturating_mul(2u32.saturating_pow(attempt.min(16)))
    }

    /// Lifetime of signed URLs.
    pub fn signed_url_ttl(&self) -> Duration {
        Duration::from_secs(self.signed_url_ttl_secs)
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.max_image_retries > 10 {
            return Err(Error::configuration().with_message("max image retries must be at most 10"));
        }
        if self.signed_url_ttl_secs == 0 {
            return Err(Error::configuration().with_message("signed URL TTL must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_repair_attempts, 2);
        assert_eq!(config.max_slides_without_agenda, 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pipeline_rejects_excessive_repairs() {
        let config = PipelineConfig::new().with_max_repair_attempts(50);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_image_backoff_doubles() {
        let config = ImageConfig::default();
        assert_eq!(config.backoff(0), Duration::from_millis(2000));
        assert_eq!(config.backoff(2), Duration::from_millis(8000));
        assert_eq!(config.signed_url_ttl(), Duration::from_secs(604_800));
    }

    #[test]
    fn test_image_config_deserializes_with_defaults() {
        let config: ImageConfig = serde_json::from_str(r#"{"max_image_retries":1}"#).unwrap();
        assert_eq!(config.max_image_retries, 1);
        assert_eq!(config.inter_image_delay_ms, 1500);
    }
}
