//! Constraint violations reported by the validator.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use strum::{AsRefStr, Display, EnumString};

use crate::block::BlockKind;

/// Repair strategy implied by a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ViolationAction {
    /// Text is too long.
    Shorten,
    /// Too much content for one slide.
    Split,
    /// Content is missing or too sparse.
    Expand,
    /// The title mentions the wrong number of items.
    AdjustTitle,
}

/// Location of the offending field within a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRef {
    /// The slide's title block.
    Title,
    /// A block as a whole, e.g. a whole bullet list.
    Block { block: usize },
    /// The `text` of a text or callout block.
    Text { block: usize },
    /// The items of a bullets block.
    Items { block: usize },
    /// One bullet item.
    Item { block: usize, item: usize },
    /// The rows of a table block.
    Rows { block: usize },
    /// One table cell.
    Cell { block: usize, row: usize, column: usize },
    /// One column header.
    Column { block: usize, column: usize },
    /// A named field of a card, step or stat block.
    Field { block: usize, name: &'static str },
    /// The number of blocks of a kind.
    Kind(BlockKind),
    /// The slide's overall content.
    Content,
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Title => f.write_str("title"),
            Self::Block { block } => write!(f, "blocks[{block}]"),
            Self::Text { block } => write!(f, "blocks[{block}].text"),
            Self::Items { block } => write!(f, "blocks[{block}].items"),
            Self::Item { block, item } => write!(f, "blocks[{block}].items[{item}]"),
            Self::Rows { block } => write!(f, "blocks[{block}].rows"),
            Self::Cell { block, row, column } => {
                write!(f, "blocks[{block}].rows[{row}][{column}]")
            }
            Self::Column { block, column } => write!(f, "blocks[{block}].columns[{column}]"),
            Self::Field { block, name } => write!(f, "blocks[{block}].{name}"),
            Self::Kind(kind) => write!(f, "blocks.{}", kind.as_ref()),
            Self::Content => f.write_str("content"),
        }
    }
}

impl Serialize for FieldRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A detected breach of a structural or length limit.
///
/// Violations are data consumed by the repair engine, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstraintViolation {
    /// Offending field.
    pub field: FieldRef,
    /// Human-readable description.
    pub message: String,
    /// Current value (length, count or percentage).
    pub current: usize,
    /// Limit that was breached.
    pub limit: usize,
    /// Repair strategy.
    pub action: ViolationAction,
}

impl ConstraintViolation {
    pub fn new(
        field: FieldRef,
        action: ViolationAction,
        current: usize,
        limit: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field,
            message: message.into(),
            current,
            limit,
            action,
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({} / {})",
            self.action, self.field, self.message, self.current, self.limit
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_refs_render_as_paths() {
        assert_eq!(FieldRef::Title.to_string(), "title");
        assert_eq!(
            FieldRef::Item { block: 1, item: 3 }.to_string(),
            "blocks[1].items[3]"
        );
        assert_eq!(
            FieldRef::Cell {
                block: 2,
                row: 0,
                column: 1
            }
            .to_string(),
            "blocks[2].rows[0][1]"
        );
        assert_eq!(
            FieldRef::Kind(BlockKind::StatBlock).to_string(),
            "blocks.stat_block"
        );
    }

    #[test]
    fn violation_serializes_field_as_string() {
        let violation = ConstraintViolation::new(
            FieldRef::Items { block: 1 },
            ViolationAction::Split,
            9,
            6,
            "too many bullets",
        );
        let json = serde_json::to_value(&violation).unwrap();
        assert_eq!(json["field"], "blocks[1].items");
        assert_eq!(json["action"], "split");
    }
}
