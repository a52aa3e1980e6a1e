//! Outline and per-slide content generation.

use decksmith_core::Error;
use decksmith_core::analysis::ContentAnalysis;
use decksmith_core::block::{Block, BlockKind};
use decksmith_core::completion::{META_LANGUAGE, META_SLIDE_TITLE, META_SLIDE_TYPE, META_TASK};
use decksmith_core::outline::Outline;
use decksmith_core::progress::{ProgressEvent, ProgressSink};
use decksmith_core::request::{GenerationRequest, ImageMode};
use decksmith_core::slide::{Slide, SlideType};
use decksmith_rig::StructuredClient;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::delta::DeltaEmitter;
use super::prompts;
use crate::error::{PipelineError, PipelineResult};
use crate::layout::content_variant;
use crate::locale;

const TRACING_TARGET: &str = "decksmith_engine::content";

/// Blocks of one slide as returned by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedSlide {
    pub blocks: Vec<Block>,
}

/// Replacement slides returned by a split call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SplitSlides {
    pub slides: Vec<GeneratedSlide>,
}

/// Asks the model for an outline of the request.
pub async fn generate_outline(
    client: &StructuredClient,
    request: &GenerationRequest,
    analysis: &ContentAnalysis,
) -> PipelineResult<Outline> {
    let wrap = |source: Error| PipelineError::OutlineGeneration { source };

    let slide_count = request
        .num_slides
        .unwrap_or_else(|| request.amount.suggested_slide_count());
    let call = StructuredClient::call_for::<Outline>(
        prompts::outline_system(),
        prompts::outline_user(request, analysis, slide_count),
    )
    .map_err(wrap)?
    .with_metadata(META_TASK, "outline")
    .with_metadata(META_LANGUAGE, request.language.as_str());

    let outline: Outline = client.generate(&call).await.map_err(wrap)?;
    if outline.is_empty() {
        return Err(wrap(
            Error::invalid_response().with_message("outline contains no slides"),
        ));
    }

    tracing::info!(
        target: TRACING_TARGET,
        slides = outline.len(),
        "Outline generated"
    );
    Ok(outline)
}

/// Writes slide content with the structured client's streaming mode.
#[derive(Debug, Clone)]
pub struct ContentGenerator {
    client: StructuredClient,
    progress: ProgressSink,
}

impl ContentGenerator {
    pub fn new(client: StructuredClient, progress: ProgressSink) -> Self {
        Self { client, progress }
    }

    /// Generates the slide at `index` of the outline.
    ///
    /// Text deltas are streamed to the progress sink while the model writes.
    /// Client errors are not retried here; they abort with the slide index.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        outline: &Outline,
        index: usize,
        analysis: &ContentAnalysis,
    ) -> PipelineResult<Slide> {
        let wrap = |source: Error| PipelineError::ContentGeneration {
            slide_index: index,
            source,
        };

        let planned = outline.slides.get(index).ok_or_else(|| {
            wrap(Error::invalid_request().with_message(format!(
                "outline has no slide {index}"
            )))
        })?;
        let slide_type = planned.effective_type();
        let total_slides = outline.len();

        self.progress.emit(ProgressEvent::Content {
            slide_index: index,
            total_slides,
            delta: None,
            slide: None,
        });

        let call = StructuredClient::call_for::<GeneratedSlide>(
            prompts::slide_system(),
            prompts::slide_user(request, outline, index, analysis),
        )
        .map_err(wrap)?
        .with_metadata(META_TASK, "slide")
        .with_metadata(META_SLIDE_TYPE, slide_type.as_ref())
        .with_metadata(META_SLIDE_TITLE, planned.title.as_str())
        .with_metadata(META_LANGUAGE, request.language.as_str());

        let mut emitter = DeltaEmitter::new(&self.progress, index, total_slides);
        let generated: GeneratedSlide = self
            .client
            .generate_streaming(&call, &mut emitter)
            .await
            .map_err(wrap)?;

        let slide = finalize_slide(slide_type, &planned.title, generated.blocks, request);

        tracing::debug!(
            target: TRACING_TARGET,
            slide_index = index,
            slide_type = slide_type.as_ref(),
            blocks = slide.blocks.len(),
            variant = %slide.variant,
            "Slide generated"
        );

        self.progress.emit(ProgressEvent::Content {
            slide_index: index,
            total_slides,
            delta: None,
            slide: Some(slide.clone()),
        });

        Ok(slide)
    }
}

/// Normalises generated blocks into a slide of the planned type.
///
/// Inserts a missing title, applies the request's image mode, fills empty
/// alt texts, sentence-cases title-like fields and assigns the content
/// variant.
pub(crate) fn finalize_slide(
    slide_type: SlideType,
    planned_title: &str,
    mut blocks: Vec<Block>,
    request: &GenerationRequest,
) -> Slide {
    let language = request.language.as_str();

    if slide_type != SlideType::QuoteCallout && !blocks.iter().any(|b| b.kind() == BlockKind::Title)
    {
        blocks.insert(0, Block::title(planned_title));
    }

    if request.image_mode == ImageMode::None && !slide_type.always_has_image() {
        blocks.retain(|b| b.kind() != BlockKind::Image);
    }
    if slide_type.always_has_image() && !blocks.iter().any(|b| b.kind() == BlockKind::Image) {
        blocks.push(Block::placeholder_image(planned_title));
    }

    let proper_nouns = locale::proper_nouns(&request.input_text);
    for block in &mut blocks {
        match block {
            Block::Title { text } => {
                *text = locale::sentence_case_keeping(text, language, &proper_nouns);
            }
            Block::TimelineStep { title, .. }
            | Block::IconCard { title, .. }
            | Block::NumberedCard { title, .. } => {
                *title = locale::sentence_case_keeping(title, language, &proper_nouns);
            }
            _ => {}
        }
    }

    let mut slide = Slide::new(slide_type, blocks);
    let alt_text = slide.title().unwrap_or(planned_title).to_string();
    for block in &mut slide.blocks {
        if let Block::Image { alt, .. } = block
            && alt.trim().is_empty()
        {
            alt.clone_from(&alt_text);
        }
    }

    content_variant(&slide).clone_into(&mut slide.variant);
    slide
}

#[cfg(test)]
mod tests {
    use decksmith_core::outline::OutlineSlide;
    use decksmith_rig::RetryPolicy;
    use decksmith_test::{MockCompletionBackend, ScriptedBackend};

    use super::*;

    fn outline() -> Outline {
        Outline::new(
            "Project update",
            vec![
                OutlineSlide::new("Project update", SlideType::Cover),
                OutlineSlide::new("Key figures", SlideType::Stats),
            ],
        )
    }

    #[tokio::test]
    async fn generates_and_streams_a_slide() {
        let client = StructuredClient::from_backend(MockCompletionBackend::default());
        let (progress, mut receiver) = ProgressSink::channel(512);
        let generator = ContentGenerator::new(client, progress);
        let request = GenerationRequest::new("Notes from the weekly meeting");

        let slide = generator
            .generate(&request, &outline(), 1, &ContentAnalysis::default())
            .await
            .unwrap();

        assert_eq!(slide.slide_type, SlideType::Stats);
        assert_eq!(slide.title(), Some("Key figures"));
        assert_eq!(slide.count_kind(BlockKind::StatBlock), 3);
        assert_eq!(slide.variant, "row");

        let mut deltas = 0;
        let mut finished = None;
        while let Ok(event) = receiver.try_recv() {
            if let ProgressEvent::Content { delta, slide, .. } = event {
                deltas += usize::from(delta.is_some());
                finished = finished.or(slide);
            }
        }
        assert!(deltas > 1);
        assert_eq!(finished, Some(slide));
    }

    #[tokio::test]
    async fn client_errors_carry_the_slide_index() {
        let backend = ScriptedBackend::new().with_error(Error::model_error());
        let client = StructuredClient::from_backend(backend).with_retry(RetryPolicy::none());
        let generator = ContentGenerator::new(client, ProgressSink::disabled());

        let error = generator
            .generate(
                &GenerationRequest::new("x"),
                &outline(),
                1,
                &ContentAnalysis::default(),
            )
            .await
            .unwrap_err();

        assert_eq!(error.slide_index(), Some(1));
        assert_eq!(error.code(), "CONTENT_GENERATION_FAILED");
    }

    #[tokio::test]
    async fn outline_comes_from_the_model() {
        let client = StructuredClient::from_backend(
            MockCompletionBackend::default().with_content_slides(4),
        );
        let request = GenerationRequest::builder()
            .with_input_text("Møtenotater")
            .with_language("no")
            .build()
            .unwrap();

        let outline = generate_outline(&client, &request, &ContentAnalysis::default())
            .await
            .unwrap();
        assert_eq!(outline.len(), 5);
        assert_eq!(outline.title, "Prosjektoppdatering");
    }

    #[tokio::test]
    async fn empty_outline_is_rejected() {
        let backend = ScriptedBackend::new().with_response(r#"{"title": "Empty", "slides": []}"#);
        let client = StructuredClient::from_backend(backend).with_retry(RetryPolicy::none());

        let error = generate_outline(
            &client,
            &GenerationRequest::new("x"),
            &ContentAnalysis::default(),
        )
        .await
        .unwrap_err();
        assert_eq!(error.stage(), "outline");
    }

    #[test]
    fn titles_are_sentence_cased_for_norwegian() {
        let request = GenerationRequest::builder()
            .with_input_text("x")
            .with_language("nb")
            .build()
            .unwrap();
        let slide = finalize_slide(
            SlideType::Bullets,
            "Funn",
            vec![
                Block::title("Viktige Funn Fra Piloten"),
                Block::bullets(["En", "To", "Tre"]),
            ],
            &request,
        );
        assert_eq!(slide.title(), Some("Viktige funn fra piloten"));
    }

    #[test]
    fn place_names_survive_sentence_casing() {
        let request = GenerationRequest::builder()
            .with_input_text("Planen er ekspansjon til Oslo i tredje kvartal.")
            .with_language("no")
            .build()
            .unwrap();
        let slide = finalize_slide(
            SlideType::Bullets,
            "Ekspansjon",
            vec![
                Block::title("Ekspansjon Til Oslo"),
                Block::bullets(["Kontor", "Team", "Kunder"]),
            ],
            &request,
        );
        assert_eq!(slide.title(), Some("Ekspansjon til Oslo"));
    }

    #[test]
    fn image_mode_controls_image_blocks() {
        let request = GenerationRequest::new("x");

        let cover = finalize_slide(
            SlideType::Cover,
            "Deck",
            vec![Block::title("Deck"), Block::placeholder_image("")],
            &request,
        );
        assert!(!cover.has_image());

        let pilot = finalize_slide(
            SlideType::TextPlusImage,
            "Pilot",
            vec![Block::text("What happened in the pilot")],
            &request,
        );
        assert_eq!(pilot.title(), Some("Pilot"));
        assert!(matches!(
            pilot.blocks.last(),
            Some(Block::Image { alt, .. }) if alt == "Pilot"
        ));
    }

    #[test]
    fn quotes_do_not_get_a_title() {
        let slide = finalize_slide(
            SlideType::QuoteCallout,
            "Voice of the customer",
            vec![Block::Callout {
                text: "It just works".into(),
                attribution: None,
            }],
            &GenerationRequest::new("x"),
        );
        assert_eq!(slide.title(), None);
        assert_eq!(slide.variant, "centered");
    }
}
