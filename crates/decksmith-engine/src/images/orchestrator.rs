//! Sequential image generation with rate-limit backoff.

use std::fmt;
use std::sync::Arc;

use decksmith_core::analysis::ContentAnalysis;
use decksmith_core::block::Block;
use decksmith_core::deck::Deck;
use decksmith_core::image::{GeneratedImage, ImageProvider};
use decksmith_core::progress::{ProgressEvent, ProgressSink};
use decksmith_core::request::ImageStyle;
use decksmith_core::slide::Slide;
use decksmith_core::storage::ObjectStorage;
use decksmith_core::{Error, ErrorKind, Result};
use serde::Serialize;
use uuid::Uuid;

use super::prompt::build_prompt;
use crate::config::ImageConfig;

const TRACING_TARGET: &str = "decksmith_engine::images";

/// A slide that did not get an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageFailure {
    pub slide_index: usize,
    /// Error kind reported by the provider.
    pub kind: &'static str,
    pub message: String,
}

impl ImageFailure {
    fn new(slide_index: usize, error: &Error) -> Self {
        Self {
            slide_index,
            kind: error.kind_str(),
            message: error.to_string(),
        }
    }
}

/// Outcome of an image pass over a deck.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImageReport {
    /// Slides that received an image.
    pub generated: Vec<usize>,
    /// Slides refused on content-policy grounds.
    pub skipped: Vec<ImageFailure>,
    /// Slides whose image failed for any other reason.
    pub failed: Vec<ImageFailure>,
}

impl ImageReport {
    /// Number of slides that were attempted.
    pub fn attempted(&self) -> usize {
        self.generated.len() + self.skipped.len() + self.failed.len()
    }
}

/// Returns true if the slide should receive a generated image.
pub fn needs_image(slide: &Slide) -> bool {
    let slide_type = slide.slide_type;
    if !slide_type.is_image_eligible() {
        return false;
    }
    slide.blocks.iter().any(Block::is_placeholder_image)
        || (slide_type.always_has_image() && !slide.has_image())
}

/// Fills image placeholders of a deck, one request at a time.
///
/// Image failures never abort the run; they are collected in the
/// [`ImageReport`] and the placeholder stays in place.
#[derive(Clone)]
pub struct ImageOrchestrator {
    provider: Arc<dyn ImageProvider>,
    storage: Option<Arc<dyn ObjectStorage>>,
    config: ImageConfig,
}

impl fmt::Debug for ImageOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageOrchestrator")
            .field("provider", &self.provider.name())
            .field("storage", &self.storage.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl ImageOrchestrator {
    pub fn new(provider: Arc<dyn ImageProvider>, config: ImageConfig) -> Self {
        Self {
            provider,
            storage: None,
            config,
        }
    }

    /// Persists temporary image URLs into the given storage.
    pub fn with_storage(mut self, storage: Arc<dyn ObjectStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Generates images for every eligible slide of the deck.
    pub async fn enrich(
        &self,
        deck: &mut Deck,
        analysis: &ContentAnalysis,
        style: ImageStyle,
        progress: &ProgressSink,
    ) -> ImageReport {
        let targets: Vec<usize> = deck
            .slides
            .iter()
            .enumerate()
            .filter(|(_, slide)| needs_image(slide))
            .map(|(index, _)| index)
            .collect();
        let total_images = targets.len();
        let mut report = ImageReport::default();

        tracing::info!(
            target: TRACING_TARGET,
            provider = self.provider.name(),
            images = total_images,
            style = style.as_ref(),
            "Image generation started"
        );

        for (image_index, &slide_index) in targets.iter().enumerate() {
            if image_index > 0 {
                tokio::time::sleep(self.config.inter_image_delay()).await;
            }

            let prompt = build_prompt(&deck.slides[slide_index], analysis, style);
            let url = match self.generate(&prompt, style, slide_index).await {
                Ok(image) => {
                    let url = self.persist(deck.meta.id, slide_index, image).await;
                    attach_image(&mut deck.slides[slide_index], &url, prompt);
                    report.generated.push(slide_index);
                    Some(url)
                }
                Err(error) if error.kind() == ErrorKind::ContentPolicy => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        slide_index,
                        error = %error,
                        "Image refused by content policy, slide skipped"
                    );
                    report.skipped.push(ImageFailure::new(slide_index, &error));
                    None
                }
                Err(error) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        slide_index,
                        error = %error,
                        "Image generation failed"
                    );
                    report.failed.push(ImageFailure::new(slide_index, &error));
                    None
                }
            };

            progress.emit(ProgressEvent::Images {
                image_index,
                total_images,
                slide_index,
                url,
            });
        }

        tracing::info!(
            target: TRACING_TARGET,
            generated = report.generated.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Image generation completed"
        );
        report
    }

    /// Calls the provider, backing off on rate limits.
    async fn generate(
        &self,
        prompt: &str,
        style: ImageStyle,
        slide_index: usize,
    ) -> Result<GeneratedImage> {
        let mut attempt = 0;
        loop {
            match self.provider.generate_image(prompt, style).await {
                Err(error)
                    if error.kind() == ErrorKind::RateLimited
                        && attempt < self.config.max_image_retries =>
                {
                    let delay = self.config.backoff(attempt);
                    tracing::debug!(
                        target: TRACING_TARGET,
                        slide_index,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Rate limited, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// Copies a temporary image into storage and returns a signed URL.
    ///
    /// Falls back to the provider URL when there is nothing to persist or
    /// persisting fails.
    async fn persist(&self, deck_id: Uuid, slide_index: usize, image: GeneratedImage) -> String {
        let Some(storage) = self.storage.as_ref().filter(|_| image.temporary) else {
            return image.url;
        };

        let persisted = async {
            let data = self.provider.download(&image.url).await?;
            let key = format!(
                "decks/{deck_id}/slide-{slide_index:02}-{}.{}",
                Uuid::new_v4(),
                extension(&data.content_type)
            );
            storage
                .upload(&key, data.bytes, &data.content_type)
                .await?;
            storage.signed_url(&key, self.config.signed_url_ttl()).await
        };

        match persisted.await {
            Ok(url) => url,
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    slide_index,
                    error = %error,
                    "Could not persist image, keeping provider URL"
                );
                image.url
            }
        }
    }
}

fn extension(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "png",
    }
}

/// Fills the first placeholder, or appends an image block.
fn attach_image(slide: &mut Slide, image_url: &str, image_prompt: String) {
    let alt_text = slide.title().unwrap_or_default().to_string();
    let placeholder = slide
        .blocks
        .iter_mut()
        .find(|block| block.is_placeholder_image());

    match placeholder {
        Some(Block::Image { url, alt, prompt }) => {
            image_url.clone_into(url);
            if alt.is_empty() {
                *alt = alt_text;
            }
            *prompt = Some(image_prompt);
        }
        _ => slide.blocks.push(Block::Image {
            url: image_url.to_string(),
            alt: alt_text,
            prompt: Some(image_prompt),
        }),
    }
}

#[cfg(test)]
mod tests {
    use decksmith_core::slide::SlideType;
    use decksmith_test::{MemoryStorage, MockImageProvider};

    use super::*;

    fn deck() -> Deck {
        Deck::new(
            "Pilot",
            "en",
            "default",
            vec![
                Slide::new(
                    SlideType::Cover,
                    vec![Block::title("Pilot"), Block::placeholder_image("Pilot")],
                ),
                Slide::new(
                    SlideType::Bullets,
                    vec![Block::title("Findings"), Block::bullets(["One", "Two"])],
                ),
                Slide::new(
                    SlideType::TextPlusImage,
                    vec![Block::title("Field work"), Block::text("What we saw")],
                ),
            ],
        )
    }

    fn image_url(slide: &Slide) -> Option<&str> {
        slide.blocks.iter().find_map(|block| match block {
            Block::Image { url, .. } => Some(url.as_str()),
            _ => None,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn fills_eligible_slides() {
        let provider = MockImageProvider::new();
        let orchestrator =
            ImageOrchestrator::new(Arc::new(provider.clone()), ImageConfig::default());
        let (progress, mut receiver) = ProgressSink::channel(16);
        let mut deck = deck();

        let report = orchestrator
            .enrich(&mut deck, &ContentAnalysis::default(), ImageStyle::Minimal, &progress)
            .await;

        assert_eq!(report.generated, [0, 2]);
        assert_eq!(provider.calls(), 2);
        assert_eq!(image_url(&deck.slides[0]), Some("https://images.mock.local/1.png"));
        assert_eq!(image_url(&deck.slides[2]), Some("https://images.mock.local/2.png"));
        assert_eq!(image_url(&deck.slides[1]), None);
        assert!(!needs_image(&deck.slides[2]));

        let mut events = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            events.push(event);
        }
        assert_eq!(
            events.last(),
            Some(&ProgressEvent::Images {
                image_index: 1,
                total_images: 2,
                slide_index: 2,
                url: Some("https://images.mock.local/2.png".into()),
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limits_are_retried() {
        let provider = MockImageProvider::new()
            .with_error(Error::rate_limited())
            .with_error(Error::rate_limited());
        let orchestrator =
            ImageOrchestrator::new(Arc::new(provider.clone()), ImageConfig::default());
        let mut deck = deck();

        let report = orchestrator
            .enrich(
                &mut deck,
                &ContentAnalysis::default(),
                ImageStyle::Photographic,
                &ProgressSink::disabled(),
            )
            .await;

        assert_eq!(report.generated, [0, 2]);
        assert_eq!(provider.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_fail_the_slide() {
        let config = ImageConfig {
            max_image_retries: 1,
            ..ImageConfig::immediate()
        };
        let provider = MockImageProvider::new()
            .with_error(Error::rate_limited())
            .with_error(Error::rate_limited())
            .with_error(Error::content_policy());
        let orchestrator = ImageOrchestrator::new(Arc::new(provider.clone()), config);
        let mut deck = deck();

        let report = orchestrator
            .enrich(
                &mut deck,
                &ContentAnalysis::default(),
                ImageStyle::Minimal,
                &ProgressSink::disabled(),
            )
            .await;

        assert!(report.generated.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].slide_index, 0);
        assert_eq!(report.failed[0].kind, "rate_limited");
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].slide_index, 2);
        assert_eq!(report.attempted(), 2);
        assert!(deck.slides[0].blocks.iter().any(Block::is_placeholder_image));
    }

    #[tokio::test(start_paused = true)]
    async fn temporary_images_are_persisted() {
        let provider = MockImageProvider::new().with_temporary_urls();
        let storage = MemoryStorage::new();
        let orchestrator =
            ImageOrchestrator::new(Arc::new(provider.clone()), ImageConfig::immediate())
                .with_storage(Arc::new(storage.clone()));
        let mut deck = deck();

        let report = orchestrator
            .enrich(
                &mut deck,
                &ContentAnalysis::default(),
                ImageStyle::Minimal,
                &ProgressSink::disabled(),
            )
            .await;

        assert_eq!(report.generated.len(), 2);
        assert_eq!(provider.downloads(), 2);

        let keys = storage.keys();
        assert_eq!(keys.len(), 2);
        let prefix = format!("decks/{}/slide-00-", deck.meta.id);
        assert!(keys.iter().any(|key| key.starts_with(&prefix) && key.ends_with(".png")));

        let url = image_url(&deck.slides[0]).unwrap_or_default();
        assert!(url.starts_with("https://storage.mock.local/decks/"));
        assert!(url.ends_with("?expires_in=604800"));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_persistence_keeps_provider_url() {
        let provider = MockImageProvider::new().with_temporary_urls();
        let orchestrator =
            ImageOrchestrator::new(Arc::new(provider), ImageConfig::immediate())
                .with_storage(Arc::new(MemoryStorage::failing()));
        let mut deck = deck();

        orchestrator
            .enrich(
                &mut deck,
                &ContentAnalysis::default(),
                ImageStyle::Minimal,
                &ProgressSink::disabled(),
            )
            .await;

        assert_eq!(image_url(&deck.slides[0]), Some("https://images.mock.local/1.png"));
    }
}
