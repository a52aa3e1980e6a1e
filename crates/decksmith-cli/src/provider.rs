//! Provider construction from CLI configuration.

use std::sync::Arc;

use anyhow::Context;
use decksmith_core::image::ImageProvider;
use decksmith_core::request::{GenerationRequest, ImageMode};
use decksmith_engine::images::ImageOrchestrator;
use decksmith_opendal::StorageBackend;
use decksmith_reqwest::ImageClient;
use decksmith_rig::{CompletionProvider, StructuredClient};

use crate::TRACING_TARGET_STARTUP;
use crate::config::Cli;

/// Creates the structured generation client.
///
/// # Errors
///
/// Returns an error if the completion provider cannot be initialized.
pub fn create_client(cli: &Cli) -> anyhow::Result<StructuredClient> {
    if cli.run.mock {
        return mock_client(cli);
    }

    let provider = CompletionProvider::connect(&cli.completion)
        .context("failed to create completion provider")?;

    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        provider = provider.provider_name(),
        model = provider.model_name(),
        "Completion provider ready"
    );

    Ok(StructuredClient::from_backend(provider).with_retry(cli.completion.retry_policy()))
}

/// Creates the image orchestrator when the request asks for generated images.
///
/// # Errors
///
/// Returns an error if the image client or the storage backend cannot be
/// initialized.
pub fn create_images(
    cli: &Cli,
    request: &GenerationRequest,
) -> anyhow::Result<Option<ImageOrchestrator>> {
    if request.image_mode != ImageMode::Generate {
        return Ok(None);
    }

    let provider: Arc<dyn ImageProvider> = if cli.run.mock {
        mock_images()?
    } else {
        let client =
            ImageClient::new(cli.image_client.clone()).context("failed to create image client")?;
        Arc::new(client)
    };

    let mut orchestrator = ImageOrchestrator::new(provider, cli.images.clone());
    if let Some(storage) =
        StorageBackend::from_config(&cli.storage).context("failed to create storage backend")?
    {
        orchestrator = orchestrator.with_storage(Arc::new(storage));
    }

    Ok(Some(orchestrator))
}

#[cfg(feature = "mock")]
fn mock_client(cli: &Cli) -> anyhow::Result<StructuredClient> {
    use decksmith_test::MockCompletionBackend;

    tracing::warn!(
        target: TRACING_TARGET_STARTUP,
        content_slides = cli.mock.content_slides,
        "Using mock completion backend"
    );
    Ok(StructuredClient::from_backend(MockCompletionBackend::new(
        cli.mock.clone(),
    )))
}

#[cfg(not(feature = "mock"))]
fn mock_client(_cli: &Cli) -> anyhow::Result<StructuredClient> {
    anyhow::bail!("mock backends are not available, rebuild with the `mock` feature")
}

#[cfg(feature = "mock")]
fn mock_images() -> anyhow::Result<Arc<dyn ImageProvider>> {
    use decksmith_test::MockImageProvider;

    Ok(Arc::new(MockImageProvider::new().with_temporary_urls()))
}

#[cfg(not(feature = "mock"))]
fn mock_images() -> anyhow::Result<Arc<dyn ImageProvider>> {
    anyhow::bail!("mock backends are not available, rebuild with the `mock` feature")
}
