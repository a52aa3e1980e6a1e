//! Slide content blocks.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Discriminant of a [`Block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString, EnumIter, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BlockKind {
    Title,
    Text,
    Bullets,
    Image,
    Table,
    Callout,
    StatBlock,
    TimelineStep,
    IconCard,
    NumberedCard,
}

/// One structural content unit within a slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// Slide heading.
    Title { text: String },
    /// Paragraph or subtitle.
    Text { text: String },
    /// Ordered list of bullet items.
    Bullets { items: Vec<String> },
    /// Image reference; an empty `url` is a placeholder.
    Image {
        #[serde(default)]
        url: String,
        #[serde(default)]
        alt: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prompt: Option<String>,
    },
    /// Table with a header row.
    Table {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// Highlighted quote or message.
    Callout {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attribution: Option<String>,
    },
    /// Key figure with a label.
    StatBlock {
        value: String,
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    /// Step or milestone.
    TimelineStep {
        title: String,
        description: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        date: Option<String>,
    },
    /// Card with an icon name.
    IconCard {
        icon: String,
        title: String,
        description: String,
    },
    /// Card with a position number.
    NumberedCard {
        number: u32,
        title: String,
        description: String,
    },
}

impl Block {
    pub fn title(text: impl Into<String>) -> Self {
        Self::Title { text: text.into() }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn bullets<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Bullets {
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    /// Image block with an empty URL.
    pub fn placeholder_image(alt: impl Into<String>) -> Self {
        Self::Image {
            url: String::new(),
            alt: alt.into(),
            prompt: None,
        }
    }

    /// Returns the kind of this block.
    pub fn kind(&self) -> BlockKind {
        match self {
            Self::Title { .. } => BlockKind::Title,
            Self::Text { .. } => BlockKind::Text,
            Self::Bullets { .. } => BlockKind::Bullets,
            Self::Image { .. } => BlockKind::Image,
            Self::Table { .. } => BlockKind::Table,
            Self::Callout { .. } => BlockKind::Callout,
            Self::StatBlock { .. } => BlockKind::StatBlock,
            Self::TimelineStep { .. } => BlockKind::TimelineStep,
            Self::IconCard { .. } => BlockKind::IconCard,
            Self::NumberedCard { .. } => BlockKind::NumberedCard,
        }
    }

    /// Returns true for an image block without a usable URL.
    pub fn is_placeholder_image(&self) -> bool {
        match self {
            Self::Image { url, .. } => {
                let url = url.trim();
                url.is_empty() || url.contains("placeholder")
            }
            _ => false,
        }
    }

    /// Characters of visible text in this block.
    pub fn char_count(&self) -> usize {
        fn len(s: &str) -> usize {
            s.chars().count()
        }
        fn opt(s: &Option<String>) -> usize {
            s.as_deref().map_or(0, len)
        }

        match self {
            Self::Title { text } | Self::Text { text } => len(text),
            Self::Bullets { items } => items.iter().map(|i| len(i)).sum(),
            Self::Image { .. } => 0,
            Self::Table { columns, rows } => {
                columns.iter().map(|c| len(c)).sum::<usize>()
                    + rows.iter().flatten().map(|c| len(c)).sum::<usize>()
            }
            Self::Callout { text, attribution } => len(text) + opt(attribution),
            Self::StatBlock {
                value,
                label,
                description,
            } => len(value) + len(label) + opt(description),
            Self::TimelineStep {
                title,
                description,
                date,
            } => len(title) + len(description) + opt(date),
            Self::IconCard {
                title, description, ..
            }
            | Self::NumberedCard {
                title, description, ..
            } => len(title) + len(description),
        }
    }

    /// Primary text shown while the block is being written, if it has one.
    pub fn visible_text(&self) -> Option<String> {
        match self {
            Self::Title { text } | Self::Text { text } | Self::Callout { text, .. } => {
                Some(text.clone())
            }
            Self::Bullets { items } => Some(items.join("\n")),
            Self::StatBlock { value, label, .. } => Some(format!("{value} {label}")),
            Self::TimelineStep {
                title, description, ..
            }
            | Self::IconCard {
                title, description, ..
            }
            | Self::NumberedCard {
                title, description, ..
            } => Some(format!("{title}\n{description}")),
            Self::Table { .. } | Self::Image { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_is_tagged_by_kind() {
        let json = serde_json::to_value(Block::bullets(["one", "two"])).unwrap();
        assert_eq!(json["kind"], "bullets");
        assert_eq!(json["items"][1], "two");

        let block: Block =
            serde_json::from_str(r#"{"kind":"stat_block","value":"42%","label":"growth"}"#)
                .unwrap();
        assert_eq!(block.kind(), BlockKind::StatBlock);
    }

    #[test]
    fn image_url_defaults_to_placeholder() {
        let block: Block = serde_json::from_str(r#"{"kind":"image"}"#).unwrap();
        assert!(block.is_placeholder_image());

        let block = Block::Image {
            url: "https://cdn.example.com/a.png".into(),
            alt: String::new(),
            prompt: None,
        };
        assert!(!block.is_placeholder_image());
    }

    #[test]
    fn char_count_counts_characters_not_bytes() {
        assert_eq!(Block::text("møte").char_count(), 4);
        let table = Block::Table {
            columns: vec!["ab".into()],
            rows: vec![vec!["cde".into()]],
        };
        assert_eq!(table.char_count(), 5);
    }
}
