//! Deterministic completion backend.

use std::sync::{Arc, Mutex, PoisonError};

#[cfg(feature = "config")]
use clap::Args;
use decksmith_core::completion::{
    CompletionBackend, CompletionCall, META_LANGUAGE, META_SLIDE, META_SLIDE_TITLE,
    META_SLIDE_TYPE, META_VIOLATIONS,
};
use decksmith_core::slide::SlideType;
use decksmith_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::content::{self, Lang};
use super::rewrite::{self, Violation};
use super::scripted::chunks;

/// Tracing target for the mock backend.
const TRACING_TARGET: &str = "decksmith_test::mock";

/// Configuration for the mock completion backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct MockCompletionConfig {
    /// Number of content slides in generated outlines.
    #[cfg_attr(
        feature = "config",
        arg(long = "mock-content-slides", env = "DECKSMITH_MOCK_CONTENT_SLIDES", default_value_t = 6)
    )]
    #[serde(default = "default_content_slides")]
    pub content_slides: usize,

    /// Characters per streamed chunk.
    #[cfg_attr(
        feature = "config",
        arg(long = "mock-chunk-size", env = "DECKSMITH_MOCK_CHUNK_SIZE", default_value_t = 24)
    )]
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_content_slides() -> usize {
    6
}

fn default_chunk_size() -> usize {
    24
}

impl Default for MockCompletionConfig {
    fn default() -> Self {
        Self {
            content_slides: default_content_slides(),
            chunk_size: default_chunk_size(),
        }
    }
}

/// Completion backend answering pipeline tasks from call metadata.
///
/// - `outline`: a cover followed by `content_slides` content slides.
/// - `slide`: canned blocks for the requested slide type.
/// - `shorten`: the slide with every `shorten` violation truncated to its limit.
/// - `split`: the slide's list content halved across two slides.
#[derive(Debug, Clone, Default)]
pub struct MockCompletionBackend {
    config: MockCompletionConfig,
    calls: Arc<Mutex<Vec<CompletionCall>>>,
}

impl MockCompletionBackend {
    /// Creates a mock backend with the given configuration.
    pub fn new(config: MockCompletionConfig) -> Self {
        Self {
            config,
            calls: Arc::default(),
        }
    }

    /// Sets the number of content slides in generated outlines.
    pub fn with_content_slides(mut self, count: usize) -> Self {
        self.config.content_slides = count;
        self
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<CompletionCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of calls tagged with `task`.
    pub fn calls_for(&self, task: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|call| call.task() == Some(task))
            .count()
    }

    fn respond(&self, call: &CompletionCall) -> Result<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call.clone());

        let lang = Lang::from_code(call.metadata(META_LANGUAGE));
        let task = call.task().unwrap_or_default();
        tracing::debug!(target: TRACING_TARGET, task, schema = %call.schema_name, "Mock completion");

        let value = match task {
            "outline" => self.outline(lang),
            "slide" => slide(call, lang)?,
            "shorten" => {
                let slide = metadata_json(call, META_SLIDE)?;
                let violations: Vec<Violation> =
                    serde_json::from_value(metadata_json(call, META_VIOLATIONS)?)?;
                rewrite::shorten(slide, &violations)
            }
            "split" => rewrite::split(&metadata_json(call, META_SLIDE)?, lang),
            other => {
                return Err(Error::invalid_request()
                    .with_message(format!("mock backend has no answer for task '{other}'")));
            }
        };

        Ok(serde_json::to_string(&value)?)
    }

    fn outline(&self, lang: Lang) -> Value {
        let title = content::deck_title(lang);
        let entries = content::outline_entries(lang);

        let mut slides = vec![json!({"title": title, "slide_type": SlideType::Cover})];
        for index in 0..self.config.content_slides {
            let (entry_title, slide_type, hints) = entries[index % entries.len()];
            let round = index / entries.len();
            let title = if round == 0 {
                entry_title.to_string()
            } else {
                format!("{entry_title} ({})", char::from(b'A' + (round % 26) as u8))
            };
            slides.push(json!({"title": title, "slide_type": slide_type, "hints": hints}));
        }

        json!({"title": title, "slides": slides})
    }
}

fn slide(call: &CompletionCall, lang: Lang) -> Result<Value> {
    let slide_type: SlideType = call
        .metadata(META_SLIDE_TYPE)
        .unwrap_or("bullets")
        .parse()
        .map_err(|_| Error::invalid_request().with_message("unknown slide type"))?;
    let title = call.metadata(META_SLIDE_TITLE).unwrap_or("Untitled");
    Ok(json!({"blocks": content::slide_blocks(slide_type, title, lang)}))
}

fn metadata_json(call: &CompletionCall, key: &str) -> Result<Value> {
    let raw = call
        .metadata(key)
        .ok_or_else(|| Error::invalid_request().with_message(format!("missing metadata '{key}'")))?;
    Ok(serde_json::from_str(raw)?)
}

#[async_trait::async_trait]
impl CompletionBackend for MockCompletionBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, call: &CompletionCall) -> Result<String> {
        self.respond(call)
    }

    async fn complete_streaming(
        &self,
        call: &CompletionCall,
        on_token: &mut (dyn for<'t> FnMut(&'t str) + Send),
    ) -> Result<String> {
        let text = self.respond(call)?;
        for chunk in chunks(&text, self.config.chunk_size.max(1)) {
            on_token(chunk);
        }
        Ok(text)
    }
}
