//! Completion backend that replays a fixed script.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use decksmith_core::completion::{CompletionBackend, CompletionCall};
use decksmith_core::{Error, Result};

#[derive(Debug)]
enum Step {
    Response(String),
    Error(Error),
    StreamError(Error),
}

#[derive(Debug, Default)]
struct State {
    steps: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
    recorded: Mutex<Vec<CompletionCall>>,
}

/// Backend returning queued responses and errors in order.
///
/// Clones share the same script, so a test can keep a handle for
/// assertions after moving one into a client.
#[derive(Debug, Clone)]
pub struct ScriptedBackend {
    state: Arc<State>,
    chunk_size: usize,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBackend {
    /// Creates an empty script.
    pub fn new() -> Self {
        Self {
            state: Arc::default(),
            chunk_size: usize::MAX,
        }
    }

    /// Queues a successful response.
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.push(Step::Response(response.into()));
        self
    }

    /// Queues an error returned by either call style.
    pub fn with_error(self, error: Error) -> Self {
        self.push(Step::Error(error));
        self
    }

    /// Queues an error returned only by a streaming call.
    ///
    /// A plain call consuming this step skips it and takes the next one.
    pub fn with_stream_error(self, error: Error) -> Self {
        self.push(Step::StreamError(error));
        self
    }

    /// Streams responses in chunks of `size` characters.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Number of calls made so far.
    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    /// Every call received so far.
    pub fn recorded(&self) -> Vec<CompletionCall> {
        self.state
            .recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of steps not yet consumed.
    pub fn remaining(&self) -> usize {
        self.steps().len()
    }

    fn steps(&self) -> std::sync::MutexGuard<'_, VecDeque<Step>> {
        self.state
            .steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, step: Step) {
        self.steps().push_back(step);
    }

    fn record(&self, call: &CompletionCall) {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        self.state
            .recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call.clone());
    }

    fn next(&self, streaming: bool) -> Result<String> {
        let mut steps = self.steps();
        loop {
            match steps.pop_front() {
                Some(Step::Response(text)) => return Ok(text),
                Some(Step::Error(error)) => return Err(error),
                Some(Step::StreamError(error)) if streaming => return Err(error),
                Some(Step::StreamError(_)) => continue,
                None => {
                    return Err(Error::model_error().with_message("script exhausted"));
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl CompletionBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, call: &CompletionCall) -> Result<String> {
        self.record(call);
        self.next(false)
    }

    async fn complete_streaming(
        &self,
        call: &CompletionCall,
        on_token: &mut (dyn for<'t> FnMut(&'t str) + Send),
    ) -> Result<String> {
        self.record(call);
        let text = self.next(true)?;
        for chunk in chunks(&text, self.chunk_size) {
            on_token(chunk);
        }
        Ok(text)
    }
}

/// Splits `text` into pieces of at most `size` characters.
pub(crate) fn chunks(text: &str, size: usize) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (index, _) in text.char_indices() {
        if count == size {
            out.push(&text[start..index]);
            start = index;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

#[cfg(test)]
mod tests {
    use decksmith_core::ErrorKind;

    use super::*;

    fn call() -> CompletionCall {
        CompletionCall::new("s", "u", "Test", serde_json::Value::Null)
    }

    #[tokio::test]
    async fn replays_in_order() {
        let backend = ScriptedBackend::new()
            .with_error(Error::rate_limited())
            .with_response("ok");

        let err = backend.complete(&call()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimited);
        assert_eq!(backend.complete(&call()).await.unwrap(), "ok");
        assert!(backend.complete(&call()).await.is_err());
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn plain_calls_skip_stream_errors() {
        let backend = ScriptedBackend::new()
            .with_stream_error(Error::network_error())
            .with_response("plain");
        assert_eq!(backend.complete(&call()).await.unwrap(), "plain");
        assert_eq!(backend.remaining(), 0);
    }

    #[tokio::test]
    async fn streams_in_chunks() {
        let backend = ScriptedBackend::new().with_chunk_size(3).with_response("abcdefg");
        let mut seen = Vec::new();
        let text = backend
            .complete_streaming(&call(), &mut |t: &str| seen.push(t.to_string()))
            .await
            .unwrap();
        assert_eq!(text, "abcdefg");
        assert_eq!(seen, ["abc", "def", "g"]);
    }

    #[test]
    fn chunks_respect_char_boundaries() {
        assert_eq!(chunks("æøå", 2), ["æø", "å"]);
        assert!(chunks("", 4).is_empty());
    }
}
