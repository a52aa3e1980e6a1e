//! Pipeline error types.

use decksmith_core::Error;
use thiserror::Error;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that abort a pipeline run.
///
/// Constraint violations are not errors; they are consumed by the repair
/// engine. Image failures are reported in the image report instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The request failed validation.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The requested theme does not exist.
    #[error("template not found: {theme_id}")]
    TemplateNotFound {
        /// Requested theme identifier.
        theme_id: String,
    },

    /// The model could not produce an outline.
    #[error("outline generation failed: {source}")]
    OutlineGeneration {
        /// Underlying client error.
        #[source]
        source: Error,
    },

    /// The model could not produce content for a slide.
    #[error("content generation failed for slide {slide_index}: {source}")]
    ContentGeneration {
        /// Index of the failing slide in the outline.
        slide_index: usize,
        /// Underlying client error.
        #[source]
        source: Error,
    },

    /// A durable checkpoint was rejected.
    #[error("checkpoint failed after {stage}: {source}")]
    Checkpoint {
        /// Stage whose checkpoint failed.
        stage: &'static str,
        /// Underlying sink error.
        #[source]
        source: Error,
    },
}

impl PipelineError {
    /// Pipeline stage in which the error occurred.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "request",
            Self::TemplateNotFound { .. } => "template",
            Self::OutlineGeneration { .. } => "outline",
            Self::ContentGeneration { .. } => "content",
            Self::Checkpoint { stage, .. } => stage,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::TemplateNotFound { .. } => "TEMPLATE_NOT_FOUND",
            Self::OutlineGeneration { .. } => "OUTLINE_GENERATION_FAILED",
            Self::ContentGeneration { .. } => "CONTENT_GENERATION_FAILED",
            Self::Checkpoint { .. } => "CHECKPOINT_FAILED",
        }
    }

    /// Index of the failing slide, for per-slide errors.
    pub fn slide_index(&self) -> Option<usize> {
        match self {
            Self::ContentGeneration { slide_index, .. } => Some(*slide_index),
            _ => None,
        }
    }

    /// The client or sink error this stage error wraps, if any.
    pub fn client_error(&self) -> Option<&Error> {
        match self {
            Self::OutlineGeneration { source }
            | Self::ContentGeneration { source, .. }
            | Self::Checkpoint { source, .. } => Some(source),
            Self::InvalidRequest(_) | Self::TemplateNotFound { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use decksmith_core::ErrorKind;

    use super::*;

    #[test]
    fn content_error_names_slide_and_stage() {
        let error = PipelineError::ContentGeneration {
            slide_index: 4,
            source: Error::parse_error().with_message("unexpected end of input"),
        };

        assert_eq!(error.stage(), "content");
        assert_eq!(error.code(), "CONTENT_GENERATION_FAILED");
        assert_eq!(error.slide_index(), Some(4));
        assert_eq!(
            error.client_error().map(Error::kind),
            Some(ErrorKind::ParseError)
        );
        assert_eq!(
            error.to_string(),
            "content generation failed for slide 4: parse_error: unexpected end of input"
        );
    }

    #[test]
    fn checkpoint_error_reports_its_stage() {
        let error = PipelineError::Checkpoint {
            stage: "outline",
            source: Error::storage(),
        };
        assert_eq!(error.stage(), "outline");
        assert_eq!(error.slide_index(), None);
    }

    #[test]
    fn template_error_has_no_source() {
        let error = PipelineError::TemplateNotFound {
            theme_id: "neon".into(),
        };
        assert!(error.client_error().is_none());
        assert_eq!(error.code(), "TEMPLATE_NOT_FOUND");
    }
}
