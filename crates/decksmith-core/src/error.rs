//! Common error type definitions.

use strum::{AsRefStr, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of errors raised by generation, image and storage providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The model or provider failed to produce a response.
    ModelError,
    /// The response did not conform to the requested schema.
    InvalidResponse,
    /// The provider rejected the call because of rate limiting.
    RateLimited,
    /// The response could not be parsed as JSON.
    ParseError,
    /// The provider refused the prompt on content-policy grounds.
    ContentPolicy,
    /// The request was malformed or rejected as invalid.
    InvalidRequest,
    /// Network-related error occurred.
    NetworkError,
    /// Object storage operation failed.
    Storage,
    /// Configuration error.
    Configuration,
    /// Internal error.
    Internal,
}

/// A structured error type for decksmith providers.
#[derive(Debug, Error)]
#[error("{}{}", kind.as_ref(), message.as_ref().map(|m| format!(": {}", m)).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional error message.
    pub message: Option<String>,
    /// Optional source error.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds a source error to this error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Creates a new model error.
    pub fn model_error() -> Self {
        Self::new(ErrorKind::ModelError)
    }

    /// Creates a new invalid response error.
    pub fn invalid_response() -> Self {
        Self::new(ErrorKind::InvalidResponse)
    }

    /// Creates a new rate limited error.
    pub fn rate_limited() -> Self {
        Self::new(ErrorKind::RateLimited)
    }

    /// Creates a new parse error.
    pub fn parse_error() -> Self {
        Self::new(ErrorKind::ParseError)
    }

    /// Creates a new content policy error.
    pub fn content_policy() -> Self {
        Self::new(ErrorKind::ContentPolicy)
    }

    /// Creates a new invalid request error.
    pub fn invalid_request() -> Self {
        Self::new(ErrorKind::InvalidRequest)
    }

    /// Creates a new network error.
    pub fn network_error() -> Self {
        Self::new(ErrorKind::NetworkError)
    }

    /// Creates a new storage error.
    pub fn storage() -> Self {
        Self::new(ErrorKind::Storage)
    }

    /// Creates a new configuration error.
    pub fn configuration() -> Self {
        Self::new(ErrorKind::Configuration)
    }

    /// Creates a new internal error.
    pub fn internal() -> Self {
        Self::new(ErrorKind::Internal)
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error kind as a string.
    pub fn kind_str(&self) -> &'static str {
        self.kind.into()
    }

    /// Returns true if retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::RateLimited | ErrorKind::ModelError | ErrorKind::NetworkError
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::parse_error()
            .with_message(err.to_string())
            .with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let error = Error::rate_limited().with_message("slow down");
        assert_eq!(error.to_string(), "rate_limited: slow down");
        assert_eq!(Error::content_policy().to_string(), "content_policy");
    }

    #[test]
    fn retryable_kinds() {
        assert!(Error::rate_limited().is_retryable());
        assert!(Error::network_error().is_retryable());
        assert!(!Error::content_policy().is_retryable());
        assert!(!Error::parse_error().is_retryable());
    }

    #[test]
    fn serde_errors_become_parse_errors() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = Error::from(err);
        assert_eq!(error.kind(), ErrorKind::ParseError);
        assert_eq!(error.kind_str(), "parse_error");
    }
}
