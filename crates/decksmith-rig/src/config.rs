//! Completion provider configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use decksmith_core::{Error, Result};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Supported completion providers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CompletionProviderKind {
    #[default]
    #[strum(serialize = "openai")]
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    Gemini,
}

impl CompletionProviderKind {
    /// Model used when none is configured.
    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::Anthropic => "claude-sonnet-4-20250514",
            Self::Gemini => "gemini-2.0-flash",
        }
    }
}

/// Configuration for the structured generation client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct CompletionConfig {
    /// Completion provider.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "completion-provider",
            env = "DECKSMITH_COMPLETION_PROVIDER",
            default_value = "openai"
        )
    )]
    #[serde(default)]
    pub provider: CompletionProviderKind,

    /// Model name; the provider default is used when unset.
    #[cfg_attr(
        feature = "config",
        arg(long = "completion-model", env = "DECKSMITH_COMPLETION_MODEL")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Provider API key.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "completion-api-key",
            env = "DECKSMITH_COMPLETION_API_KEY",
            hide_env_values = true
        )
    )]
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Maximum retries for rate-limited or transient failures.
    #[cfg_attr(
        feature = "config",
        arg(long = "max-retries", env = "DECKSMITH_MAX_RETRIES", default_value_t = 3)
    )]
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay of the exponential backoff, in milliseconds.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "retry-base-delay-ms",
            env = "DECKSMITH_RETRY_BASE_DELAY_MS",
            default_value_t = 1000
        )
    )]
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider: CompletionProviderKind::default(),
            model: None,
            api_key: None,
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
        }
    }
}

impl CompletionConfig {
    /// Model name, falling back to the provider default.
    pub fn model_name(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// Retry policy derived from this configuration.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
        }
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.as_deref().is_none_or(str::is_empty) {
            return Err(Error::configuration().with_message(format!(
                "an API key is required for the {} completion provider",
                self.provider
            )));
        }

        if self.max_retries > 10 {
            return Err(Error::configuration()
                .with_message("max retries must be at most 10"));
        }

        Ok(())
    }
}

/// Exponential backoff settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for every further retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        CompletionConfig::default().retry_policy()
    }
}

impl RetryPolicy {
    /// Policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (zero-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.min(16)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
        };
        assert_eq!(policy.delay(0), Duration::from_millis(100));
        assert_eq!(policy.delay(1), Duration::from_millis(200));
        assert_eq!(policy.delay(3), Duration::from_millis(800));
    }

    #[test]
    fn validation_requires_api_key() {
        let mut config = CompletionConfig::default();
        assert!(config.validate().is_err());

        config.api_key = Some("sk-test".into());
        assert!(config.validate().is_ok());
        assert_eq!(config.model_name(), "gpt-4o-mini");
    }

    #[test]
    fn provider_kind_parses() {
        assert_eq!(
            "openai".parse::<CompletionProviderKind>().unwrap(),
            CompletionProviderKind::OpenAi
        );
        assert_eq!(
            "gemini".parse::<CompletionProviderKind>().unwrap(),
            CompletionProviderKind::Gemini
        );
    }
}
