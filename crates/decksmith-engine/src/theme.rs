//! Built-in theme registry.

use serde::Serialize;

use crate::error::{PipelineError, PipelineResult};

/// Theme used when a request names none.
pub const DEFAULT_THEME: &str = "default";

/// Visual theme applied by renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub id: &'static str,
    pub name: &'static str,
    pub heading_font: &'static str,
    pub body_font: &'static str,
    pub primary: &'static str,
    pub accent: &'static str,
    pub background: &'static str,
    pub text: &'static str,
}

static THEMES: &[Theme] = &[
    Theme {
        id: "default",
        name: "Default",
        heading_font: "Inter",
        body_font: "Inter",
        primary: "#1f2937",
        accent: "#2563eb",
        background: "#ffffff",
        text: "#111827",
    },
    Theme {
        id: "nordic",
        name: "Nordic",
        heading_font: "Sora",
        body_font: "Source Sans 3",
        primary: "#0f3d3e",
        accent: "#e07a5f",
        background: "#f4f1ea",
        text: "#1b1b1b",
    },
    Theme {
        id: "corporate",
        name: "Corporate",
        heading_font: "IBM Plex Sans",
        body_font: "IBM Plex Sans",
        primary: "#0b2545",
        accent: "#13a89e",
        background: "#ffffff",
        text: "#0b1320",
    },
    Theme {
        id: "midnight",
        name: "Midnight",
        heading_font: "Space Grotesk",
        body_font: "Inter",
        primary: "#e2e8f0",
        accent: "#a78bfa",
        background: "#0f172a",
        text: "#f8fafc",
    },
    Theme {
        id: "minimal",
        name: "Minimal",
        heading_font: "Helvetica Neue",
        body_font: "Helvetica Neue",
        primary: "#000000",
        accent: "#ff3b30",
        background: "#fafafa",
        text: "#111111",
    },
];

/// Every built-in theme.
pub fn themes() -> &'static [Theme] {
    THEMES
}

/// Resolves a requested theme, falling back to the default theme.
///
/// Lookup ignores case and surrounding whitespace.
pub fn resolve(requested: Option<&str>) -> PipelineResult<&'static Theme> {
    let id = requested
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(DEFAULT_THEME);

    THEMES
        .iter()
        .find(|theme| theme.id.eq_ignore_ascii_case(id))
        .ok_or_else(|| PipelineError::TemplateNotFound {
            theme_id: id.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_themes() {
        assert_eq!(resolve(None).unwrap().id, "default");
        assert_eq!(resolve(Some(" Nordic ")).unwrap().id, "nordic");
        assert_eq!(themes().len(), 5);
    }

    #[test]
    fn unknown_theme_is_an_error() {
        let error = resolve(Some("neon")).unwrap_err();
        assert!(matches!(
            error,
            PipelineError::TemplateNotFound { ref theme_id } if theme_id == "neon"
        ));
    }
}
