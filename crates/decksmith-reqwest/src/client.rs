//! Image generation client implementation using reqwest.

use std::sync::Arc;
use std::time::Instant;

use decksmith_core::image::{GeneratedImage, ImageData, ImageProvider};
use decksmith_core::request::ImageStyle;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET;
use crate::config::ImageClientConfig;
use crate::error::{Error, Result};

/// Content type assumed when a download response carries none.
const DEFAULT_CONTENT_TYPE: &str = "image/png";

/// Body of `POST /images/generations`.
#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    n: u8,
    style: &'static str,
    response_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    data: Vec<GenerationData>,
}

#[derive(Debug, Deserialize)]
struct GenerationData {
    url: Option<String>,
    revised_prompt: Option<String>,
}

struct ImageClientInner {
    http: Client,
    config: ImageClientConfig,
}

impl std::fmt::Debug for ImageClientInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageClientInner")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

/// Client for OpenAI-compatible image generation endpoints.
///
/// Generated URLs are short-lived, so every [`GeneratedImage`] returned is
/// marked temporary and callers are expected to persist it.
///
/// # Examples
///
/// ```rust,ignore
/// use decksmith_reqwest::{ImageClient, ImageClientConfig};
///
/// let config = ImageClientConfig::default().with_api_key("sk-...");
/// let client = ImageClient::new(config)?;
/// let image = client.generate_image("A fjord at dawn", ImageStyle::Photographic).await?;
/// ```
#[derive(Clone, Debug)]
pub struct ImageClient {
    inner: Arc<ImageClientInner>,
}

impl ImageClient {
    /// Creates a new image client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: ImageClientConfig) -> Result<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent())
            .build()?;

        tracing::info!(
            target: TRACING_TARGET,
            model = %config.model,
            size = %config.size,
            "Image client created"
        );

        Ok(Self {
            inner: Arc::new(ImageClientInner { http, config }),
        })
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &ImageClientConfig {
        &self.inner.config
    }

    async fn request_image(&self, prompt: &str, style: ImageStyle) -> Result<GeneratedImage> {
        let config = &self.inner.config;
        let body = request_body(config, prompt, style);

        let mut request = self.inner.http.post(config.generations_url()).json(&body);
        if let Some(api_key) = &config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status { status, body });
        }

        let parsed: GenerationResponse = response.json().await?;
        let data = parsed.data.into_iter().next().ok_or(Error::EmptyResponse)?;
        let url = data.url.ok_or(Error::EmptyResponse)?;

        Ok(GeneratedImage {
            url,
            revised_prompt: data.revised_prompt,
            temporary: true,
        })
    }

    async fn fetch(&self, url: &str) -> Result<ImageData> {
        let response = self.inner.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status { status, body });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let bytes = response.bytes().await?;

        Ok(ImageData {
            bytes,
            content_type,
        })
    }
}

fn request_body<'a>(
    config: &'a ImageClientConfig,
    prompt: &'a str,
    style: ImageStyle,
) -> GenerationRequest<'a> {
    GenerationRequest {
        model: &config.model,
        prompt,
        size: &config.size,
        n: 1,
        style: match style {
            ImageStyle::Photographic => "natural",
            _ => "vivid",
        },
        response_format: "url",
    }
}

#[async_trait::async_trait]
impl ImageProvider for ImageClient {
    fn name(&self) -> &str {
        &self.inner.config.model
    }

    async fn generate_image(
        &self,
        prompt: &str,
        style: ImageStyle,
    ) -> decksmith_core::Result<GeneratedImage> {
        let started_at = Instant::now();
        tracing::debug!(
            target: TRACING_TARGET,
            prompt_len = prompt.len(),
            style = %style,
            "Requesting image"
        );

        match self.request_image(prompt, style).await {
            Ok(image) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    elapsed_ms = started_at.elapsed().as_millis(),
                    revised = image.revised_prompt.is_some(),
                    "Image generated"
                );
                Ok(image)
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    elapsed_ms = started_at.elapsed().as_millis(),
                    "Image request failed"
                );
                Err(error.into())
            }
        }
    }

    async fn download(&self, url: &str) -> decksmith_core::Result<ImageData> {
        let started_at = Instant::now();
        let data = self.fetch(url).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            bytes = data.bytes.len(),
            content_type = %data.content_type,
            elapsed_ms = started_at.elapsed().as_millis(),
            "Image downloaded"
        );

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_body_matches_wire_format() {
        let config = ImageClientConfig::default().with_api_key("key");
        let body = request_body(&config, "A fjord", ImageStyle::Photographic);

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "model": "dall-e-3",
                "prompt": "A fjord",
                "size": "1792x1024",
                "n": 1,
                "style": "natural",
                "response_format": "url",
            })
        );
    }

    #[test]
    fn non_photographic_styles_are_vivid() {
        let config = ImageClientConfig::default();
        let body = request_body(&config, "x", ImageStyle::Illustration);
        assert_eq!(body.style, "vivid");
    }

    #[test]
    fn response_without_url_is_tolerated_by_serde() {
        let parsed: GenerationResponse =
            serde_json::from_value(json!({"created": 1, "data": [{"b64_json": "..."}]})).unwrap();
        assert!(parsed.data[0].url.is_none());
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(ImageClient::new(ImageClientConfig::default()).is_err());
    }
}
