//! Extraction of JSON from model responses.

use decksmith_core::{Error, Result};
use serde_json::Value;

/// Parser for JSON embedded in model output.
///
/// Handles plain JSON, JSON wrapped in markdown code blocks (with or without
/// a `json` language tag) and JSON surrounded by explanatory text.
pub struct JsonResponse;

impl JsonResponse {
    /// Extracts JSON content from a response, stripping markdown formatting.
    pub fn extract(response: &str) -> &str {
        if let Some(start) = response.find("```json") {
            let after_marker = &response[start + 7..];
            if let Some(end) = after_marker.find("```") {
                return after_marker[..end].trim();
            }
        }

        if let Some(start) = response.find("```") {
            let after_marker = &response[start + 3..];
            let content_start = after_marker.find('\n').map(|i| i + 1).unwrap_or(0);
            let after_newline = &after_marker[content_start..];
            if let Some(end) = after_newline.find("```") {
                return after_newline[..end].trim();
            }
        }

        let trimmed = response.trim();
        if (trimmed.starts_with('{') && trimmed.ends_with('}'))
            || (trimmed.starts_with('[') && trimmed.ends_with(']'))
        {
            return trimmed;
        }

        let start = trimmed.find(['{', '[']).unwrap_or(0);
        let end = trimmed
            .rfind(['}', ']'])
            .map(|i| i + 1)
            .unwrap_or(trimmed.len());

        if start < end {
            &trimmed[start..end]
        } else {
            trimmed
        }
    }

    /// Parses the JSON value embedded in a response.
    pub fn parse(response: &str) -> Result<Value> {
        let json = Self::extract(response);
        serde_json::from_str(json).map_err(|e| {
            Error::parse_error()
                .with_message(format!("invalid JSON in model response: {e}"))
                .with_source(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use decksmith_core::ErrorKind;

    use super::*;

    #[test]
    fn parse_plain_json() {
        let value = JsonResponse::parse(r#"{"key": "value"}"#).unwrap();
        assert_eq!(value["key"], "value");
    }

    #[test]
    fn parse_json_with_markdown_block() {
        let response = "Here's the slide:\n```json\n{\"key\": \"value\"}\n```";
        assert_eq!(JsonResponse::parse(response).unwrap()["key"], "value");
    }

    #[test]
    fn parse_json_with_surrounding_text() {
        let response = r#"The result is: {"key": "value"} as requested."#;
        assert_eq!(JsonResponse::parse(response).unwrap()["key"], "value");
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let error = JsonResponse::parse("no json here").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ParseError);
    }
}
