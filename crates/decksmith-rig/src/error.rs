//! Conversion of rig errors into decksmith errors.

use decksmith_core::Error;
use rig::completion::CompletionError;

/// Maps a rig completion error onto a decksmith error kind.
///
/// Provider errors only carry the upstream message, so rate limits and
/// content-policy refusals are recognised from it.
pub(crate) fn from_completion_error(provider: &str, error: CompletionError) -> Error {
    let message = error.to_string();
    let lower = message.to_lowercase();

    let base = if lower.contains("429") || lower.contains("rate limit") || lower.contains("rate_limit")
    {
        Error::rate_limited()
    } else if lower.contains("content_policy") || lower.contains("content policy") {
        Error::content_policy()
    } else {
        match &error {
            CompletionError::HttpError(_) => Error::network_error(),
            CompletionError::JsonError(_) => Error::parse_error(),
            CompletionError::RequestError(_) => Error::invalid_request(),
            _ => Error::model_error(),
        }
    };

    base.with_message(format!("{provider}: {message}"))
        .with_source(error)
}

#[cfg(test)]
mod tests {
    use decksmith_core::ErrorKind;

    use super::*;

    #[test]
    fn rate_limits_are_detected_from_message() {
        let error = CompletionError::ProviderError("HTTP 429 Too Many Requests".into());
        assert_eq!(
            from_completion_error("openai", error).kind(),
            ErrorKind::RateLimited
        );
    }

    #[test]
    fn provider_errors_become_model_errors() {
        let error = CompletionError::ProviderError("overloaded".into());
        let mapped = from_completion_error("anthropic", error);
        assert_eq!(mapped.kind(), ErrorKind::ModelError);
        assert!(mapped.to_string().contains("anthropic"));
    }
}
