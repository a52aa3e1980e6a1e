//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── run: RunArgs                   # Input file and request options
//! ├── pipeline: PipelineConfig       # Repair attempts, agenda threshold
//! ├── images: ImageConfig            # Image retries, delays, signed URL TTL
//! ├── completion: CompletionConfig   # Completion provider, model, retries
//! ├── image_client: ImageClientConfig # Images API endpoint and model
//! ├── storage: StorageConfig         # Object storage for generated images
//! └── mock: MockCompletionConfig     # Mock backend (feature-gated)
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Args, Parser};
use decksmith_core::request::{Density, ImageMode, ImageStyle, TextMode};
use decksmith_engine::{ImageConfig, PipelineConfig};
use decksmith_opendal::StorageConfig;
use decksmith_reqwest::ImageClientConfig;
use decksmith_rig::CompletionConfig;
use serde::{Deserialize, Serialize};

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "decksmith")]
#[command(about = "Generate a slide deck from unstructured notes")]
#[command(version)]
pub struct Cli {
    /// Input and request options.
    #[clap(flatten)]
    pub run: RunArgs,

    /// Pipeline tuning.
    #[clap(flatten)]
    pub pipeline: PipelineConfig,

    /// Image orchestration tuning.
    #[clap(flatten)]
    pub images: ImageConfig,

    /// Completion provider configuration.
    #[clap(flatten)]
    pub completion: CompletionConfig,

    /// Image client configuration.
    #[clap(flatten)]
    pub image_client: ImageClientConfig,

    /// Object storage for generated images.
    #[clap(flatten)]
    pub storage: StorageConfig,

    /// Mock completion backend configuration.
    #[cfg(feature = "mock")]
    #[clap(flatten)]
    pub mock: decksmith_test::MockCompletionConfig,
}

/// Options of one generation run.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct RunArgs {
    /// Text file with the notes to turn into a deck.
    #[arg(short, long, env = "DECKSMITH_INPUT")]
    pub input: PathBuf,

    /// JSON file with a prepared outline; skips outline generation.
    #[arg(long, env = "DECKSMITH_OUTLINE")]
    pub outline: Option<PathBuf>,

    /// Writes the result to a file instead of stdout.
    #[arg(short, long, env = "DECKSMITH_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Target language (BCP 47 tag such as `en` or `nb-NO`).
    #[arg(short, long, env = "DECKSMITH_LANGUAGE", default_value = "en")]
    pub language: String,

    /// How the input text is handled: generate, condense or preserve.
    #[arg(long, env = "DECKSMITH_MODE", default_value = "generate")]
    pub mode: TextMode,

    /// Text density: brief, medium or detailed.
    #[arg(long, env = "DECKSMITH_AMOUNT", default_value = "medium")]
    pub amount: Density,

    /// Exact number of slides.
    #[arg(short = 'n', long, env = "DECKSMITH_NUM_SLIDES")]
    pub num_slides: Option<usize>,

    /// Theme identifier.
    #[arg(long, env = "DECKSMITH_THEME")]
    pub theme: Option<String>,

    /// Tone of voice.
    #[arg(long, env = "DECKSMITH_TONE")]
    pub tone: Option<String>,

    /// Intended audience.
    #[arg(long, env = "DECKSMITH_AUDIENCE")]
    pub audience: Option<String>,

    /// Additional instructions passed to the model.
    #[arg(long, env = "DECKSMITH_INSTRUCTIONS")]
    pub instructions: Option<String>,

    /// Image mode: none, placeholder or generate.
    #[arg(long, env = "DECKSMITH_IMAGE_MODE", default_value = "none")]
    pub image_mode: ImageMode,

    /// Image style: photographic, illustration, abstract or minimal.
    #[arg(long, env = "DECKSMITH_IMAGE_STYLE", default_value = "photographic")]
    pub image_style: ImageStyle,

    /// Uses deterministic mock backends instead of real providers.
    #[arg(long, env = "DECKSMITH_MOCK", default_value_t = false)]
    pub mock: bool,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Validates all configuration values.
    ///
    /// Provider credentials are checked when the providers are created.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.pipeline
            .validate()
            .context("invalid pipeline configuration")?;
        self.images
            .validate()
            .context("invalid image configuration")?;
        self.storage
            .validate()
            .context("invalid storage configuration")?;
        Ok(())
    }

    /// Logs configuration at info level (no sensitive information).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            input = %self.run.input.display(),
            language = %self.run.language,
            mode = self.run.mode.as_ref(),
            amount = self.run.amount.as_ref(),
            num_slides = self.run.num_slides,
            image_mode = self.run.image_mode.as_ref(),
            mock = self.run.mock,
            "Run configuration"
        );

        if !self.run.mock {
            tracing::info!(
                target: TRACING_TARGET_CONFIG,
                provider = %self.completion.provider,
                model = self.completion.model_name(),
                max_retries = self.completion.max_retries,
                "Completion configuration"
            );
        }

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            max_repair_attempts = self.pipeline.max_repair_attempts,
            max_image_retries = self.images.max_image_retries,
            inter_image_delay_ms = self.images.inter_image_delay_ms,
            storage_backend = ?self.storage.backend,
            "Pipeline configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [
            cfg!(feature = "mock").then_some("mock"),
            cfg!(feature = "s3").then_some("s3"),
            cfg!(feature = "dotenv").then_some("dotenv"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
