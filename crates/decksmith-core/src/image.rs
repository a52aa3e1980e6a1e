//! Image generation abstraction.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::request::ImageStyle;

/// Result of one image generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// Location of the image.
    pub url: String,
    /// Prompt as rewritten by the provider, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
    /// The URL expires and the image should be persisted.
    #[serde(default)]
    pub temporary: bool,
}

/// Downloaded image payload.
#[derive(Debug, Clone)]
pub struct ImageData {
    pub bytes: Bytes,
    pub content_type: String,
}

/// Image generation client.
///
/// Errors carry one of the kinds `model_error`, `rate_limited`,
/// `content_policy`, `invalid_request` or `network_error`.
#[async_trait::async_trait]
pub trait ImageProvider: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Generates one image for the prompt.
    async fn generate_image(&self, prompt: &str, style: ImageStyle) -> Result<GeneratedImage>;

    /// Fetches the bytes behind a generated image URL.
    async fn download(&self, url: &str) -> Result<ImageData>;
}
