//! rig-backed completion provider.

use std::sync::Arc;

use decksmith_core::completion::{CompletionBackend, CompletionCall};
use decksmith_core::{Error, Result};
use futures::StreamExt;
use rig::completion::{AssistantContent, CompletionError, CompletionModel as RigCompletionModel};
use rig::one_or_many::OneOrMany;
use rig::prelude::CompletionClient;
use rig::providers::{anthropic, gemini, openai};
use rig::streaming::StreamedAssistantContent;

use crate::config::{CompletionConfig, CompletionProviderKind};
use crate::error::from_completion_error;

/// Upper bound on generated tokens per call.
const MAX_TOKENS: u64 = 4096;

/// Completion provider wrapping rig completion models.
///
/// This is a cheaply cloneable wrapper around an `Arc<CompletionService>`.
#[derive(Clone)]
pub struct CompletionProvider(Arc<CompletionService>);

enum CompletionService {
    OpenAi {
        model: openai::CompletionModel,
        model_name: String,
    },
    Anthropic {
        model: anthropic::completion::CompletionModel,
        model_name: String,
    },
    Gemini {
        model: gemini::completion::CompletionModel,
        model_name: String,
    },
}

impl CompletionProvider {
    /// Connects to the configured provider.
    pub fn connect(config: &CompletionConfig) -> Result<Self> {
        config.validate()?;

        let api_key = config.api_key.as_deref().unwrap_or_default();
        let model_name = config.model_name().to_string();

        let inner = match config.provider {
            CompletionProviderKind::OpenAi => {
                let client = openai::Client::new(api_key)
                    .map_err(|e| client_error("openai", e))?
                    .completions_api();
                CompletionService::OpenAi {
                    model: client.completion_model(&model_name),
                    model_name,
                }
            }
            CompletionProviderKind::Anthropic => {
                let client = anthropic::Client::new(api_key)
                    .map_err(|e| client_error("anthropic", e))?;
                CompletionService::Anthropic {
                    model: client.completion_model(&model_name),
                    model_name,
                }
            }
            CompletionProviderKind::Gemini => {
                let client =
                    gemini::Client::new(api_key).map_err(|e| client_error("gemini", e))?;
                CompletionService::Gemini {
                    model: client.completion_model(&model_name),
                    model_name,
                }
            }
        };

        Ok(Self(Arc::new(inner)))
    }

    /// Returns the model name.
    pub fn model_name(&self) -> &str {
        match self.0.as_ref() {
            CompletionService::OpenAi { model_name, .. } => model_name,
            CompletionService::Anthropic { model_name, .. } => model_name,
            CompletionService::Gemini { model_name, .. } => model_name,
        }
    }

    /// Returns the provider name.
    pub fn provider_name(&self) -> &'static str {
        match self.0.as_ref() {
            CompletionService::OpenAi { .. } => "openai",
            CompletionService::Anthropic { .. } => "anthropic",
            CompletionService::Gemini { .. } => "gemini",
        }
    }
}

#[async_trait::async_trait]
impl CompletionBackend for CompletionProvider {
    fn name(&self) -> &str {
        self.provider_name()
    }

    async fn complete(&self, call: &CompletionCall) -> Result<String> {
        let result = match self.0.as_ref() {
            CompletionService::OpenAi { model, .. } => send(model, call).await,
            CompletionService::Anthropic { model, .. } => send(model, call).await,
            CompletionService::Gemini { model, .. } => send(model, call).await,
        };

        result.map_err(|e| from_completion_error(self.provider_name(), e))
    }

    async fn complete_streaming(
        &self,
        call: &CompletionCall,
        on_token: &mut (dyn for<'t> FnMut(&'t str) + Send),
    ) -> Result<String> {
        let result = match self.0.as_ref() {
            CompletionService::OpenAi { model, .. } => stream(model, call, on_token).await,
            CompletionService::Anthropic { model, .. } => stream(model, call, on_token).await,
            CompletionService::Gemini { model, .. } => stream(model, call, on_token).await,
        };

        result.map_err(|e| from_completion_error(self.provider_name(), e))
    }
}

async fn send<M>(model: &M, call: &CompletionCall) -> std::result::Result<String, CompletionError>
where
    M: RigCompletionModel,
{
    let response = model
        .completion_request(call.user.as_str())
        .preamble(call.system.clone())
        .max_tokens(MAX_TOKENS)
        .send()
        .await?;

    Ok(extract_text_content(&response.choice))
}

async fn stream<M>(
    model: &M,
    call: &CompletionCall,
    on_token: &mut (dyn for<'t> FnMut(&'t str) + Send),
) -> std::result::Result<String, CompletionError>
where
    M: RigCompletionModel,
{
    let mut response = model
        .completion_request(call.user.as_str())
        .preamble(call.system.clone())
        .max_tokens(MAX_TOKENS)
        .stream()
        .await?;

    let mut text = String::new();
    while let Some(chunk) = response.next().await {
        if let StreamedAssistantContent::Text(chunk) = chunk? {
            on_token(chunk.text());
            text.push_str(chunk.text());
        }
    }

    Ok(text)
}

fn client_error(provider: &str, error: impl std::fmt::Display) -> Error {
    Error::configuration().with_message(format!("{provider}: failed to build client: {error}"))
}

/// Extracts text content from assistant content choices.
fn extract_text_content(choice: &OneOrMany<AssistantContent>) -> String {
    choice
        .iter()
        .filter_map(|content| match content {
            AssistantContent::Text(text) => Some(text.text()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("")
}

impl std::fmt::Debug for CompletionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionProvider")
            .field("provider", &self.provider_name())
            .field("model", &self.model_name())
            .finish()
    }
}
