//! Structured generation client.
//!
//! [`StructuredClient`] wraps any [`CompletionBackend`] and turns raw model
//! text into validated Rust values. It owns retries: retryable errors are
//! retried with exponential backoff, everything else is returned to the
//! caller unchanged.

use std::fmt;
use std::sync::Arc;

use decksmith_core::completion::{CompletionBackend, CompletionCall};
use decksmith_core::{Error, Result};
use jiff::Timestamp;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::TRACING_TARGET;
use crate::config::RetryPolicy;
use crate::partial::parse_partial;
use crate::response::JsonResponse;
use crate::schema::{SchemaValidator, schema_for};

/// Callbacks invoked during a streaming generation.
///
/// Every method has an empty default implementation.
pub trait StreamHandler: Send {
    /// A raw text chunk arrived.
    fn on_token(&mut self, _token: &str) {}

    /// The accumulated text parsed into a new best-effort snapshot.
    fn on_partial_json(&mut self, _snapshot: &Value) {}

    /// The full response was parsed and validated.
    fn on_complete(&mut self, _value: &Value) {}

    /// The stream failed; the client falls back to a plain call.
    fn on_error(&mut self, _error: &Error) {}
}

/// Handler that ignores every callback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHandler;

impl StreamHandler for NoopHandler {}

/// Structured generation client with schema validation and retries.
#[derive(Clone)]
pub struct StructuredClient {
    backend: Arc<dyn CompletionBackend>,
    retry: RetryPolicy,
}

impl fmt::Debug for StructuredClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuredClient")
            .field("backend", &self.backend.name())
            .field("retry", &self.retry)
            .finish()
    }
}

impl StructuredClient {
    /// Creates a client from a backend with the default retry policy.
    pub fn from_backend<B>(backend: B) -> Self
    where
        B: CompletionBackend + 'static,
    {
        Self::from_shared(Arc::new(backend))
    }

    /// Creates a client from a shared backend.
    pub fn from_shared(backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            backend,
            retry: RetryPolicy::default(),
        }
    }

    /// Replaces the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Backend name.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Builds a call whose schema is derived from `T`.
    pub fn call_for<T: JsonSchema>(
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Result<CompletionCall> {
        let schema = schema_for::<T>()?;
        Ok(CompletionCall::new(system, user, T::schema_name(), schema))
    }

    /// Generates a value conforming to the call's schema.
    #[tracing::instrument(skip_all, fields(schema = %call.schema_name, backend = self.backend.name()))]
    pub async fn generate<T: DeserializeOwned>(&self, call: &CompletionCall) -> Result<T> {
        let started_at = Timestamp::now();
        let text = self.complete_with_retry(call).await?;
        let result = decode(call, &text);
        let elapsed = Timestamp::now().duration_since(started_at);

        match &result {
            Ok(_) => tracing::debug!(
                target: TRACING_TARGET,
                response_len = text.len(),
                elapsed_ms = elapsed.as_millis(),
                "Structured generation successful"
            ),
            Err(error) => tracing::warn!(
                target: TRACING_TARGET,
                error = %error,
                elapsed_ms = elapsed.as_millis(),
                "Structured response rejected"
            ),
        }

        result.map(|(_, value)| value)
    }

    /// Streams a generation, reporting tokens and partial snapshots.
    ///
    /// If the stream itself fails, the error is reported to the handler and
    /// the client falls back to [`StructuredClient::generate`].
    #[tracing::instrument(skip_all, fields(schema = %call.schema_name, backend = self.backend.name()))]
    pub async fn generate_streaming<T: DeserializeOwned>(
        &self,
        call: &CompletionCall,
        handler: &mut dyn StreamHandler,
    ) -> Result<T> {
        let started_at = Timestamp::now();
        let mut buffer = String::new();
        let mut last_snapshot: Option<Value> = None;

        let streamed = {
            let mut on_token = |token: &str| {
                handler.on_token(token);
                buffer.push_str(token);
                if let Some(snapshot) = parse_partial(&buffer)
                    && last_snapshot.as_ref() != Some(&snapshot)
                {
                    handler.on_partial_json(&snapshot);
                    last_snapshot = Some(snapshot);
                }
            };
            self.backend.complete_streaming(call, &mut on_token).await
        };

        let text = match streamed {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Streaming failed, falling back to plain completion"
                );
                handler.on_error(&error);
                self.complete_with_retry(call).await?
            }
        };

        let (raw, value) = decode::<T>(call, &text)?;
        handler.on_complete(&raw);

        tracing::debug!(
            target: TRACING_TARGET,
            response_len = text.len(),
            elapsed_ms = Timestamp::now().duration_since(started_at).as_millis(),
            "Streaming generation successful"
        );

        Ok(value)
    }

    async fn complete_with_retry(&self, call: &CompletionCall) -> Result<String> {
        let mut attempt = 0;
        loop {
            match self.backend.complete(call).await {
                Ok(text) => return Ok(text),
                Err(error) if error.is_retryable() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay(attempt);
                    tracing::warn!(
                        target: TRACING_TARGET,
                        error = %error,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying completion"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

/// Extracts, validates and deserialises a response.
fn decode<T: DeserializeOwned>(call: &CompletionCall, text: &str) -> Result<(Value, T)> {
    let raw = JsonResponse::parse(text)?;
    SchemaValidator::new(&call.schema)?.check(&raw)?;

    let value = serde_json::from_value(raw.clone()).map_err(|e| {
        Error::invalid_response()
            .with_message(format!("failed to deserialize {}: {e}", call.schema_name))
            .with_source(e)
    })?;

    Ok((raw, value))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use decksmith_core::ErrorKind;
    use decksmith_test::ScriptedBackend;
    use schemars::JsonSchema;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, JsonSchema, PartialEq)]
    struct Greeting {
        text: String,
    }

    fn call() -> CompletionCall {
        StructuredClient::call_for::<Greeting>("system", "user").unwrap()
    }

    #[derive(Default)]
    struct Recorder {
        tokens: usize,
        snapshots: Vec<Value>,
        completed: bool,
        errors: usize,
    }

    impl StreamHandler for Recorder {
        fn on_token(&mut self, _token: &str) {
            self.tokens += 1;
        }

        fn on_partial_json(&mut self, snapshot: &Value) {
            self.snapshots.push(snapshot.clone());
        }

        fn on_complete(&mut self, _value: &Value) {
            self.completed = true;
        }

        fn on_error(&mut self, _error: &Error) {
            self.errors += 1;
        }
    }

    #[tokio::test]
    async fn generate_parses_fenced_json() {
        let backend = ScriptedBackend::new().with_response("```json\n{\"text\": \"hi\"}\n```");
        let client = StructuredClient::from_backend(backend);

        let greeting: Greeting = client.generate(&call()).await.unwrap();
        assert_eq!(greeting.text, "hi");
    }

    #[tokio::test]
    async fn schema_mismatch_is_invalid_response() {
        let backend = ScriptedBackend::new().with_response(r#"{"other": 1}"#);
        let client = StructuredClient::from_backend(backend);

        let error = client.generate::<Greeting>(&call()).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidResponse);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limits_are_retried_with_backoff() {
        let backend = ScriptedBackend::new()
            .with_error(Error::rate_limited())
            .with_error(Error::rate_limited())
            .with_response(r#"{"text": "ok"}"#);
        let client = StructuredClient::from_backend(backend.clone()).with_retry(RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
        });

        let started = tokio::time::Instant::now();
        let greeting: Greeting = client.generate(&call()).await.unwrap();
        assert_eq!(greeting.text, "ok");
        assert_eq!(backend.calls(), 3);
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test]
    async fn non_retryable_errors_are_returned() {
        let backend = ScriptedBackend::new()
            .with_error(Error::invalid_request())
            .with_response(r#"{"text": "never"}"#);
        let client = StructuredClient::from_backend(backend.clone());

        let error = client.generate::<Greeting>(&call()).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidRequest);
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn streaming_reports_partial_snapshots() {
        let backend = ScriptedBackend::new()
            .with_chunk_size(4)
            .with_response(r#"{"text": "hello world"}"#);
        let client = StructuredClient::from_backend(backend);
        let mut recorder = Recorder::default();

        let greeting: Greeting = client
            .generate_streaming(&call(), &mut recorder)
            .await
            .unwrap();

        assert_eq!(greeting.text, "hello world");
        assert!(recorder.tokens > 1);
        assert!(recorder.snapshots.len() > 1);
        assert!(recorder.completed);
        assert_eq!(recorder.errors, 0);
    }

    #[tokio::test]
    async fn stream_failure_falls_back_to_plain_call() {
        let backend = ScriptedBackend::new()
            .with_stream_error(Error::network_error())
            .with_response(r#"{"text": "fallback"}"#);
        let client = StructuredClient::from_backend(backend);
        let mut recorder = Recorder::default();

        let greeting: Greeting = client
            .generate_streaming(&call(), &mut recorder)
            .await
            .unwrap();

        assert_eq!(greeting.text, "fallback");
        assert_eq!(recorder.errors, 1);
        assert!(recorder.completed);
    }
}
