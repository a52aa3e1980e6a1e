//! Content analysis snapshot.
//!
//! A [`ContentAnalysis`] is computed once per request from the raw input text
//! and is read by composition, distribution, content generation and image
//! prompting. It is never mutated after creation.

use serde::{Deserialize, Serialize};

/// A number with its surrounding label, e.g. `42%` growth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistic {
    pub value: String,
    pub label: String,
}

/// A quoted span with optional attribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
}

/// An action item with an optional owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    pub task: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// A `Title: description` feature line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub title: String,
    pub description: String,
}

/// Two things contrasted in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub left: String,
    pub right: String,
}

/// Heuristic signals extracted from the input text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentAnalysis {
    pub statistics: Vec<Statistic>,
    pub quotes: Vec<Quote>,
    pub decisions: Vec<String>,
    pub action_items: Vec<ActionItem>,
    pub topics: Vec<String>,
    pub sequential_steps: Vec<String>,
    pub comparisons: Vec<Comparison>,
    pub features: Vec<Feature>,
    /// Input mentions quarters, months or a roadmap.
    pub has_roadmap: bool,
    pub word_count: usize,
    pub sentence_count: usize,
}

impl ContentAnalysis {
    /// Returns true if no signal was extracted.
    pub fn is_empty(&self) -> bool {
        self.statistics.is_empty()
            && self.quotes.is_empty()
            && self.decisions.is_empty()
            && self.action_items.is_empty()
            && self.topics.is_empty()
            && self.sequential_steps.is_empty()
            && self.comparisons.is_empty()
            && self.features.is_empty()
            && !self.has_roadmap
    }
}

/// Extracts a [`ContentAnalysis`] from raw text without calling a model.
///
/// Implementations are language-specific and may be swapped per locale.
pub trait ContentAnalyzer: Send + Sync {
    fn analyze(&self, text: &str) -> ContentAnalysis;
}
