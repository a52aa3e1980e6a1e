#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod provider;

use std::process;

use anyhow::Context;
use decksmith_core::outline::Outline;
use decksmith_core::progress::{ProgressEvent, ProgressSink};
use decksmith_core::request::GenerationRequest;
use decksmith_engine::Pipeline;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "decksmith_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "decksmith_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "decksmith_cli::config";
pub const TRACING_TARGET_PROGRESS: &str = "decksmith_cli::progress";

/// Capacity of the progress channel; excess events are dropped.
const PROGRESS_CAPACITY: usize = 1024;

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::debug!(
            target: TRACING_TARGET_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %format!("{error:#}"),
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    init_tracing();
    cli.log();
    cli.validate()?;

    let request = build_request(&cli).await?;

    let (progress, receiver) = ProgressSink::channel(PROGRESS_CAPACITY);
    let reporter = tokio::spawn(report_progress(receiver));

    let mut pipeline = Pipeline::new(provider::create_client(&cli)?, cli.pipeline.clone())
        .with_progress(progress);
    if let Some(images) = provider::create_images(&cli, &request)? {
        pipeline = pipeline.with_images(images);
    }

    let result = pipeline.generate(&request).await;
    drop(pipeline);
    let _ = reporter.await;

    let output = result.map_err(|error| {
        let code = error.code();
        anyhow::Error::new(error).context(format!("generation failed ({code})"))
    })?;

    let json = serde_json::to_string_pretty(&output).context("failed to serialize the deck")?;
    match &cli.run.output {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(
                target: TRACING_TARGET_SHUTDOWN,
                path = %path.display(),
                slides = output.deck.len(),
                "Deck written"
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}

/// Reads the input files and assembles the generation request.
async fn build_request(cli: &Cli) -> anyhow::Result<GenerationRequest> {
    let args = &cli.run;
    let input_text = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("failed to read input file {}", args.input.display()))?;

    let outline = match &args.outline {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read outline file {}", path.display()))?;
            let outline: Outline = serde_json::from_str(&raw)
                .with_context(|| format!("invalid outline in {}", path.display()))?;
            Some(outline)
        }
        None => None,
    };

    let mut builder = GenerationRequest::builder()
        .with_input_text(input_text)
        .with_text_mode(args.mode)
        .with_language(args.language.as_str())
        .with_amount(args.amount)
        .with_image_mode(args.image_mode)
        .with_image_style(args.image_style);
    if let Some(num_slides) = args.num_slides {
        builder = builder.with_num_slides(num_slides);
    }
    if let Some(theme) = &args.theme {
        builder = builder.with_theme(theme.as_str());
    }
    if let Some(tone) = &args.tone {
        builder = builder.with_tone(tone.as_str());
    }
    if let Some(audience) = &args.audience {
        builder = builder.with_audience(audience.as_str());
    }
    if let Some(instructions) = &args.instructions {
        builder = builder.with_extra_instructions(instructions.as_str());
    }
    if let Some(outline) = outline {
        builder = builder.with_outline(outline);
    }

    builder.build().context("incomplete generation request")
}

/// Logs progress events until the pipeline drops its sink.
async fn report_progress(mut receiver: mpsc::Receiver<ProgressEvent>) {
    while let Some(event) = receiver.recv().await {
        match event {
            ProgressEvent::Outline { outline: None } => {
                tracing::info!(target: TRACING_TARGET_PROGRESS, "Planning outline");
            }
            ProgressEvent::Outline {
                outline: Some(outline),
            } => {
                tracing::info!(
                    target: TRACING_TARGET_PROGRESS,
                    title = %outline.title,
                    slides = outline.len(),
                    "Outline ready"
                );
            }
            ProgressEvent::Template { theme_id } => {
                tracing::info!(target: TRACING_TARGET_PROGRESS, theme_id = %theme_id, "Theme resolved");
            }
            ProgressEvent::Content {
                slide_index,
                total_slides,
                delta: Some(delta),
                ..
            } => {
                tracing::trace!(
                    target: TRACING_TARGET_PROGRESS,
                    slide_index,
                    total_slides,
                    block_index = delta.block_index,
                    block_kind = delta.block_kind.as_ref(),
                    text = %delta.text,
                    "Content delta"
                );
            }
            ProgressEvent::Content {
                slide_index,
                total_slides,
                slide: Some(slide),
                ..
            } => {
                tracing::info!(
                    target: TRACING_TARGET_PROGRESS,
                    slide = slide_index + 1,
                    total_slides,
                    slide_type = slide.slide_type.as_ref(),
                    "Slide written"
                );
            }
            ProgressEvent::Content { .. } => {}
            ProgressEvent::Validation {
                slide_index,
                violations,
                ..
            } if violations > 0 => {
                tracing::info!(
                    target: TRACING_TARGET_PROGRESS,
                    slide = slide_index + 1,
                    violations,
                    "Slide needs repair"
                );
            }
            ProgressEvent::Validation { .. } => {}
            ProgressEvent::Repair {
                slide_index,
                action,
                attempt,
            } => {
                tracing::info!(
                    target: TRACING_TARGET_PROGRESS,
                    slide = slide_index + 1,
                    action = action.as_ref(),
                    attempt,
                    "Repairing slide"
                );
            }
            ProgressEvent::Images {
                image_index,
                total_images,
                slide_index,
                url,
            } => {
                tracing::info!(
                    target: TRACING_TARGET_PROGRESS,
                    image = image_index + 1,
                    total_images,
                    slide = slide_index + 1,
                    generated = url.is_some(),
                    "Image processed"
                );
            }
        }
    }
}

/// Initializes tracing with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
