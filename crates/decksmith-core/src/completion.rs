//! Completion backend abstraction.
//!
//! A [`CompletionBackend`] turns a [`CompletionCall`] into raw model text. JSON
//! extraction, schema validation and retries live on top of it in the
//! structured client, so backends only deal with transport.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Metadata key naming the generation task (`outline`, `slide`, `shorten`, `split`).
pub const META_TASK: &str = "task";
/// Metadata key carrying the slide type for per-slide tasks.
pub const META_SLIDE_TYPE: &str = "slide_type";
/// Metadata key carrying the slide title for per-slide tasks.
pub const META_SLIDE_TITLE: &str = "slide_title";
/// Metadata key carrying the slide being repaired, as JSON.
pub const META_SLIDE: &str = "slide";
/// Metadata key carrying the violation list of a repair task, as JSON.
pub const META_VIOLATIONS: &str = "violations";
/// Metadata key carrying the requested language.
pub const META_LANGUAGE: &str = "language";

/// One request to a language model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionCall {
    /// System instruction.
    pub system: String,
    /// User instruction.
    pub user: String,
    /// JSON schema the output must conform to.
    pub schema: serde_json::Value,
    /// Name of the schema, used in prompts and logs.
    pub schema_name: String,
    /// Free-form metadata; never sent to a provider.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl CompletionCall {
    pub fn new(
        system: impl Into<String>,
        user: impl Into<String>,
        schema_name: impl Into<String>,
        schema: serde_json::Value,
    ) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            schema,
            schema_name: schema_name.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Adds a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Reads a metadata entry.
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// The generation task, if tagged.
    pub fn task(&self) -> Option<&str> {
        self.metadata(META_TASK)
    }
}

/// Transport to a text-generation model.
#[async_trait::async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Returns the full model output for a call.
    async fn complete(&self, call: &CompletionCall) -> Result<String>;

    /// Streams the model output, invoking `on_token` for every text chunk,
    /// and returns the full output.
    ///
    /// The default implementation emits the whole response as one chunk.
    async fn complete_streaming(
        &self,
        call: &CompletionCall,
        on_token: &mut (dyn for<'t> FnMut(&'t str) + Send),
    ) -> Result<String> {
        let text = self.complete(call).await?;
        on_token(&text);
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait::async_trait]
    impl CompletionBackend for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, call: &CompletionCall) -> Result<String> {
            Ok(call.user.clone())
        }
    }

    #[test]
    fn metadata_is_readable() {
        let call = CompletionCall::new("system", "user", "Slide", serde_json::json!({}))
            .with_metadata(META_TASK, "slide");
        assert_eq!(call.task(), Some("slide"));
        assert_eq!(call.metadata(META_LANGUAGE), None);
    }

    #[tokio::test]
    async fn default_streaming_emits_one_chunk() {
        let call = CompletionCall::new("system", "{\"title\":\"x\"}", "Slide", serde_json::json!({}));
        let mut chunks = Vec::new();
        let text = Echo
            .complete_streaming(&call, &mut |token: &str| chunks.push(token.to_owned()))
            .await
            .unwrap();

        assert_eq!(text, "{\"title\":\"x\"}");
        assert_eq!(chunks, vec![text]);
    }
}
