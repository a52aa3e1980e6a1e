//! The end-to-end generation pipeline.

use std::fmt;
use std::sync::Arc;

use decksmith_core::analysis::{ContentAnalysis, ContentAnalyzer};
use decksmith_core::deck::Deck;
use decksmith_core::outline::Outline;
use decksmith_core::progress::{CheckpointSink, NoopCheckpoint, ProgressEvent, ProgressSink};
use decksmith_core::request::{GenerationRequest, ImageMode};
use decksmith_core::slide::Slide;
use decksmith_rig::StructuredClient;
use serde::Serialize;
use validator::Validate;

use crate::TRACING_TARGET;
use crate::analyzer::HeuristicAnalyzer;
use crate::compose::{ComposeOptions, compose, enforce_count, enforce_distribution};
use crate::config::PipelineConfig;
use crate::content::{ContentGenerator, generate_outline};
use crate::error::{PipelineError, PipelineResult};
use crate::images::{ImageOrchestrator, ImageReport};
use crate::layout::LayoutContext;
use crate::repair::RepairEngine;
use crate::theme;
use crate::validate::Validator;

/// Everything a pipeline run produces.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutput {
    /// The composed outline the deck was written from.
    pub outline: Outline,
    /// The finished deck.
    pub deck: Deck,
    /// Image results, when images were generated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<ImageReport>,
}

/// Turns a [`GenerationRequest`] into a [`Deck`].
///
/// Stages run in order: request validation, theme resolution, content
/// analysis, outline acquisition and composition, per-slide generation with
/// validation, repair and layout, and finally images. Slides are produced
/// sequentially so layout decisions can see the slides before them.
#[derive(Clone)]
pub struct Pipeline {
    client: StructuredClient,
    analyzer: Arc<dyn ContentAnalyzer>,
    images: Option<ImageOrchestrator>,
    config: PipelineConfig,
    progress: ProgressSink,
    checkpoint: Arc<dyn CheckpointSink>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("client", &self.client)
            .field("images", &self.images)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Creates a pipeline with the heuristic analyzer and no images.
    pub fn new(client: StructuredClient, config: PipelineConfig) -> Self {
        Self {
            client,
            analyzer: Arc::new(HeuristicAnalyzer::new()),
            images: None,
            config,
            progress: ProgressSink::disabled(),
            checkpoint: Arc::new(NoopCheckpoint),
        }
    }

    /// Replaces the content analyzer.
    pub fn with_analyzer(mut self, analyzer: Arc<dyn ContentAnalyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Enables image generation.
    pub fn with_images(mut self, images: ImageOrchestrator) -> Self {
        self.images = Some(images);
        self
    }

    /// Sends progress events to the given sink.
    pub fn with_progress(mut self, progress: ProgressSink) -> Self {
        self.progress = progress;
        self
    }

    /// Awaits durable checkpoints on the given sink.
    pub fn with_checkpoint(mut self, checkpoint: Arc<dyn CheckpointSink>) -> Self {
        self.checkpoint = checkpoint;
        self
    }

    /// Runs the pipeline for one request.
    pub async fn generate(&self, request: &GenerationRequest) -> PipelineResult<GenerationOutput> {
        request
            .validate()
            .map_err(|errors| PipelineError::InvalidRequest(errors.to_string()))?;

        let theme = theme::resolve(request.theme.as_deref())?;
        self.progress.emit(ProgressEvent::Template {
            theme_id: theme.id.to_string(),
        });

        tracing::info!(
            target: TRACING_TARGET,
            language = %request.language,
            text_mode = request.text_mode.as_ref(),
            amount = request.amount.as_ref(),
            num_slides = request.num_slides,
            theme = theme.id,
            image_mode = request.image_mode.as_ref(),
            "Generation started"
        );

        let analysis = self.analyzer.analyze(&request.input_text);
        let outline = self.outline(request, &analysis).await?;

        self.checkpoint
            .outline_composed(&outline)
            .await
            .map_err(|source| PipelineError::Checkpoint {
                stage: "outline",
                source,
            })?;

        let slides = self.slides(request, &outline, &analysis).await?;
        let mut deck = Deck::new(
            outline.title.clone(),
            request.language.clone(),
            theme.id,
            slides,
        );

        let images = self.images(request, &mut deck, &analysis).await;

        tracing::info!(
            target: TRACING_TARGET,
            deck_id = %deck.meta.id,
            slides = deck.len(),
            "Generation completed"
        );

        Ok(GenerationOutput {
            outline,
            deck,
            images,
        })
    }

    /// Acquires the outline and composes it into its final shape.
    async fn outline(
        &self,
        request: &GenerationRequest,
        analysis: &ContentAnalysis,
    ) -> PipelineResult<Outline> {
        self.progress.emit(ProgressEvent::Outline { outline: None });

        let mut outline = match &request.outline {
            Some(outline) if !outline.is_empty() => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    slides = outline.len(),
                    "Using caller-supplied outline"
                );
                outline.clone()
            }
            _ => generate_outline(&self.client, request, analysis).await?,
        };
        outline.normalize_hints();

        let options = ComposeOptions {
            max_slides_without_agenda: self.config.max_slides_without_agenda,
            ..ComposeOptions::for_language(request.language.as_str())
        };
        let mut outline = compose(outline, &options);
        if let Some(target) = request.num_slides {
            outline = enforce_count(outline, target, analysis, &request.language);
        }
        let outline = enforce_distribution(
            outline,
            analysis,
            request.audience.as_deref(),
            request.image_mode != ImageMode::None,
        );

        self.progress.emit(ProgressEvent::Outline {
            outline: Some(outline.clone()),
        });
        Ok(outline)
    }

    /// Generates, validates, repairs and lays out every slide in order.
    async fn slides(
        &self,
        request: &GenerationRequest,
        outline: &Outline,
        analysis: &ContentAnalysis,
    ) -> PipelineResult<Vec<Slide>> {
        let generator = ContentGenerator::new(self.client.clone(), self.progress.clone());
        let validator = Validator::new(request.language.as_str());
        let repair = RepairEngine::new(self.client.clone(), validator.clone())
            .with_max_attempts(self.config.max_repair_attempts)
            .with_progress(self.progress.clone());
        let mut layout = LayoutContext::new();
        let total_slides = outline.len();
        let mut slides = Vec::with_capacity(total_slides);

        for (index, planned) in outline.slides.iter().enumerate() {
            let slide = generator.generate(request, outline, index, analysis).await?;

            let violations = validator.validate(&slide);
            self.progress.emit(ProgressEvent::Validation {
                slide_index: index,
                total_slides,
                violations: violations.len(),
            });

            // Valid slides pass through as well so block limits are always clamped.
            let finished = repair
                .repair(index, &planned.title, slide, violations)
                .await;

            for mut slide in finished {
                layout.assign(&mut slide);
                self.checkpoint
                    .slide_finalized(slides.len(), &slide)
                    .await
                    .map_err(|source| PipelineError::Checkpoint {
                        stage: "content",
                        source,
                    })?;
                slides.push(slide);
            }
        }

        Ok(slides)
    }

    /// Runs the image stage when the request asks for generated images.
    async fn images(
        &self,
        request: &GenerationRequest,
        deck: &mut Deck,
        analysis: &ContentAnalysis,
    ) -> Option<ImageReport> {
        if request.image_mode != ImageMode::Generate {
            return None;
        }
        let Some(images) = &self.images else {
            tracing::warn!(
                target: TRACING_TARGET,
                "Image generation requested but no image provider is configured"
            );
            return None;
        };
        Some(
            images
                .enrich(deck, analysis, request.image_style, &self.progress)
                .await,
        )
    }
}

#[cfg(test)]
mod tests {
    use decksmith_core::outline::OutlineSlide;
    use decksmith_core::request::{Density, TextMode};
    use decksmith_core::slide::SlideType;
    use decksmith_core::Error;
    use decksmith_test::{Checkpoint, MockCompletionBackend, MockImageProvider, RecordingCheckpoint};

    use super::*;
    use crate::config::ImageConfig;

    fn pipeline(backend: MockCompletionBackend) -> Pipeline {
        Pipeline::new(StructuredClient::from_backend(backend), PipelineConfig::default())
    }

    #[tokio::test]
    async fn generates_a_norwegian_deck() {
        let request = GenerationRequest::builder()
            .with_input_text("Møtenotater fra prosjektmøte uke 50")
            .with_text_mode(TextMode::Condense)
            .with_amount(Density::Medium)
            .with_language("no")
            .build()
            .unwrap();

        let output = pipeline(MockCompletionBackend::default())
            .generate(&request)
            .await
            .unwrap();

        assert_eq!(output.outline.slides[0].effective_type(), SlideType::Cover);
        assert_eq!(output.deck.slides[0].slide_type, SlideType::Cover);
        assert_eq!(
            output.deck.slides.last().map(|s| s.slide_type),
            Some(SlideType::SummaryNextSteps)
        );
        assert_eq!(output.deck.meta.language, "no");
        assert_eq!(output.deck.meta.theme_id, "default");
        assert!(output.deck.slides.iter().all(|s| !s.blocks.is_empty()));
        assert!(output.deck.slides.iter().all(|s| !s.variant.is_empty()));
        assert!(output.images.is_none());
    }

    #[tokio::test]
    async fn requested_slide_count_is_enforced() {
        let request = GenerationRequest::builder()
            .with_input_text("Weekly project notes")
            .with_num_slides(10usize)
            .build()
            .unwrap();

        let output = pipeline(MockCompletionBackend::default())
            .generate(&request)
            .await
            .unwrap();

        assert_eq!(output.outline.len(), 10);
        assert!(output.deck.len() >= 10);
    }

    #[tokio::test]
    async fn supplied_outline_skips_the_model() {
        let backend = MockCompletionBackend::default();
        let request = GenerationRequest::builder()
            .with_input_text("Pilot results")
            .with_outline(Outline::new(
                "Pilot",
                vec![
                    OutlineSlide::new("Pilot", SlideType::Cover),
                    OutlineSlide::new("Key figures", SlideType::Stats),
                ],
            ))
            .build()
            .unwrap();

        let output = pipeline(backend.clone()).generate(&request).await.unwrap();

        assert_eq!(backend.calls_for("outline"), 0);
        assert_eq!(output.outline.title, "Pilot");
        assert_eq!(output.outline.len(), 3);
    }

    #[tokio::test]
    async fn progress_and_checkpoints_follow_the_stages() {
        let checkpoint = RecordingCheckpoint::new();
        let (progress, mut receiver) = ProgressSink::channel(4096);
        let request = GenerationRequest::builder()
            .with_input_text("Weekly project notes")
            .with_num_slides(5usize)
            .build()
            .unwrap();

        let output = pipeline(MockCompletionBackend::default())
            .with_progress(progress)
            .with_checkpoint(Arc::new(checkpoint.clone()))
            .generate(&request)
            .await
            .unwrap();

        let records = checkpoint.records();
        assert_eq!(records[0], Checkpoint::Outline { slides: 5 });
        assert_eq!(records.len(), 1 + output.deck.len());

        let mut stages = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            if stages.last() != Some(&event.stage()) {
                stages.push(event.stage());
            }
        }
        assert_eq!(&stages[..2], ["template", "outline"]);
        assert!(stages.contains(&"content"));
        assert!(stages.contains(&"validation"));
    }

    #[tokio::test]
    async fn failed_checkpoint_aborts() {
        let error = pipeline(MockCompletionBackend::default())
            .with_checkpoint(Arc::new(RecordingCheckpoint::failing_on_slide(1)))
            .generate(&GenerationRequest::new("Weekly project notes"))
            .await
            .unwrap_err();

        assert_eq!(error.code(), "CHECKPOINT_FAILED");
        assert_eq!(error.stage(), "content");
    }

    #[tokio::test]
    async fn unknown_theme_is_rejected_before_generation() {
        let backend = MockCompletionBackend::default();
        let request = GenerationRequest::builder()
            .with_input_text("Notes")
            .with_theme("neon")
            .build()
            .unwrap();

        let error = pipeline(backend.clone())
            .generate(&request)
            .await
            .unwrap_err();

        assert!(matches!(error, PipelineError::TemplateNotFound { ref theme_id } if theme_id == "neon"));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn empty_input_is_invalid() {
        let error = pipeline(MockCompletionBackend::default())
            .generate(&GenerationRequest::new(""))
            .await
            .unwrap_err();
        assert_eq!(error.code(), "INVALID_REQUEST");
    }

    #[tokio::test(start_paused = true)]
    async fn images_are_generated_on_request() {
        let provider = MockImageProvider::new().with_error(Error::content_policy());
        let request = GenerationRequest::builder()
            .with_input_text("Weekly project notes")
            .with_image_mode(ImageMode::Generate)
            .build()
            .unwrap();

        let output = pipeline(MockCompletionBackend::default())
            .with_images(ImageOrchestrator::new(
                Arc::new(provider.clone()),
                ImageConfig::immediate(),
            ))
            .generate(&request)
            .await
            .unwrap();

        let report = output.images.unwrap();
        assert_eq!(report.attempted(), provider.calls());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].kind, "content_policy");
        assert_eq!(report.skipped[0].slide_index, 0);
    }
}
