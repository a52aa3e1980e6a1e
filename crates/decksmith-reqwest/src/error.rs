//! Internal error types for decksmith-reqwest.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for decksmith-reqwest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Internal error type for decksmith-reqwest operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// The API answered with a non-success status.
    #[error("image API returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    /// The response carried no image.
    #[error("image API response contained no image")]
    EmptyResponse,
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns true if the provider refused the prompt for safety reasons.
    pub fn is_content_policy(&self) -> bool {
        match self {
            Self::Status { status, body } => {
                *status == StatusCode::BAD_REQUEST
                    && (body.contains("content_policy_violation")
                        || body.contains("safety system"))
            }
            _ => false,
        }
    }
}

impl From<Error> for decksmith_core::Error {
    fn from(err: Error) -> Self {
        use decksmith_core::Error as CoreError;

        let content_policy = err.is_content_policy();
        match err {
            Error::Reqwest(e) => {
                if e.is_timeout() {
                    CoreError::network_error()
                        .with_message("Request timed out")
                        .with_source(e)
                } else if e.is_connect() {
                    CoreError::network_error()
                        .with_message("Connection failed")
                        .with_source(e)
                } else if e.is_decode() {
                    CoreError::invalid_response()
                        .with_message(e.to_string())
                        .with_source(e)
                } else {
                    CoreError::network_error()
                        .with_message(e.to_string())
                        .with_source(e)
                }
            }
            Error::Status { status, body } => {
                let message = format!("HTTP {}: {body}", status.as_u16());
                let base = if status == StatusCode::TOO_MANY_REQUESTS {
                    CoreError::rate_limited()
                } else if content_policy {
                    CoreError::content_policy()
                } else if status.is_client_error() {
                    CoreError::invalid_request()
                } else {
                    CoreError::model_error()
                };
                base.with_message(message)
            }
            Error::EmptyResponse => {
                CoreError::model_error().with_message("image API response contained no image")
            }
            Error::Serde(e) => CoreError::parse_error()
                .with_message(e.to_string())
                .with_source(e),
            Error::Config(message) => CoreError::configuration().with_message(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use decksmith_core::ErrorKind;

    use super::*;

    fn kind(status: u16, body: &str) -> ErrorKind {
        let err = Error::Status {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
        };
        decksmith_core::Error::from(err).kind()
    }

    #[test]
    fn status_codes_map_to_kinds() {
        assert_eq!(kind(429, "slow down"), ErrorKind::RateLimited);
        assert_eq!(kind(400, "bad size"), ErrorKind::InvalidRequest);
        assert_eq!(kind(401, "no key"), ErrorKind::InvalidRequest);
        assert_eq!(kind(500, "boom"), ErrorKind::ModelError);
        assert_eq!(kind(503, "overloaded"), ErrorKind::ModelError);
    }

    #[test]
    fn safety_rejections_are_content_policy() {
        let body = r#"{"error":{"code":"content_policy_violation","message":"rejected"}}"#;
        assert_eq!(kind(400, body), ErrorKind::ContentPolicy);
    }
}
