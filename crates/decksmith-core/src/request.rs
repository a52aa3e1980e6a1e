//! Generation request types.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use validator::Validate;

use crate::outline::Outline;

/// How the input text is turned into slide content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TextMode {
    /// Use the input as a brief and write new material around it.
    #[default]
    Generate,
    /// Summarise the input, keeping its key points.
    Condense,
    /// Keep the input wording as far as the slide limits allow.
    Preserve,
}

/// Desired amount of text per slide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Density {
    /// Few words per slide.
    Brief,
    /// Balanced amount of text.
    #[default]
    Medium,
    /// Full sentences and more items.
    Detailed,
}

impl Density {
    /// Number of slides suggested to the model when no exact count is requested.
    pub fn suggested_slide_count(self) -> usize {
        match self {
            Self::Brief => 6,
            Self::Medium => 9,
            Self::Detailed => 13,
        }
    }

    /// Guidance on words per bullet or sentence, used in prompts.
    pub fn words_per_item(self) -> (usize, usize) {
        match self {
            Self::Brief => (3, 8),
            Self::Medium => (6, 14),
            Self::Detailed => (10, 22),
        }
    }
}

/// Whether and how slides receive imagery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ImageMode {
    /// No image blocks are requested or generated.
    #[default]
    None,
    /// Image blocks are kept with empty URLs for the caller to fill in.
    Placeholder,
    /// Images are generated by the image provider.
    Generate,
}

/// Visual style for generated images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ImageStyle {
    /// Realistic photography.
    #[default]
    Photographic,
    /// Flat or hand-drawn illustration.
    Illustration,
    /// Abstract shapes and gradients.
    Abstract,
    /// Minimal, lots of negative space.
    Minimal,
}

impl ImageStyle {
    /// Style directive appended to image prompts.
    pub fn directive(self) -> &'static str {
        match self {
            Self::Photographic => {
                "Professional photograph, natural lighting, shallow depth of field"
            }
            Self::Illustration => "Clean modern vector illustration, soft consistent palette",
            Self::Abstract => "Abstract composition of shapes and gradients, corporate colors",
            Self::Minimal => "Minimalist composition with generous negative space",
        }
    }
}

/// Input for one pipeline run.
///
/// Immutable for the duration of a run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize, Validate)]
#[builder(
    name = "GenerationRequestBuilder",
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(private, name = "build_inner", error = "GenerationRequestError")
)]
pub struct GenerationRequest {
    /// Raw input text.
    #[validate(length(min = 1, message = "input text must not be empty"))]
    pub input_text: String,
    /// How the input text is handled.
    #[builder(default)]
    #[serde(default)]
    pub text_mode: TextMode,
    /// Target language (BCP 47 tag, e.g. `no`, `en-GB`).
    #[builder(default = "\"en\".to_string()")]
    #[validate(length(min = 2, max = 16))]
    pub language: String,
    /// Desired text density.
    #[builder(default)]
    #[serde(default)]
    pub amount: Density,
    /// Exact number of slides, when requested.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 60))]
    pub num_slides: Option<usize>,
    /// Theme identifier.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    /// Tone of voice.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    /// Intended audience.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    /// Free-form additional instructions.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_instructions: Option<String>,
    /// Image handling.
    #[builder(default)]
    #[serde(default)]
    pub image_mode: ImageMode,
    /// Image style for generated images.
    #[builder(default)]
    #[serde(default)]
    pub image_style: ImageStyle,
    /// Pre-supplied outline; skips outline generation when present.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline: Option<Outline>,
}

/// Error type for GenerationRequest builder.
pub type GenerationRequestError = derive_builder::UninitializedFieldError;

impl GenerationRequestBuilder {
    /// Build the request.
    pub fn build(self) -> Result<GenerationRequest, GenerationRequestError> {
        self.build_inner()
    }
}

impl GenerationRequest {
    /// Creates a request with default options for the given input text.
    pub fn new(input_text: impl Into<String>) -> Self {
        Self {
            input_text: input_text.into(),
            text_mode: TextMode::default(),
            language: "en".to_string(),
            amount: Density::default(),
            num_slides: None,
            theme: None,
            tone: None,
            audience: None,
            extra_instructions: None,
            image_mode: ImageMode::default(),
            image_style: ImageStyle::default(),
            outline: None,
        }
    }

    /// Create a builder for this request.
    pub fn builder() -> GenerationRequestBuilder {
        GenerationRequestBuilder::default()
    }

    /// Lowercase primary language subtag (`nb-NO` becomes `nb`).
    pub fn language_code(&self) -> String {
        self.language
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase()
    }

    /// Returns true if images are expected on image-bearing slide types.
    pub fn wants_images(&self) -> bool {
        self.image_mode != ImageMode::None
    }
}
