//! Deterministic repairs that never call a model.

use std::collections::HashMap;

use decksmith_core::block::{Block, BlockKind};
use decksmith_core::slide::Slide;
use decksmith_core::violation::{ConstraintViolation, FieldRef, ViolationAction};

use super::constraints::{constraints_for, limits};
use crate::locale;

const ELLIPSIS: char = '…';

/// Cuts `text` to at most `limit` characters at a word boundary.
///
/// A cut text ends with an ellipsis, which counts towards the limit.
pub fn truncate_words(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    if limit == 0 {
        return String::new();
    }

    let budget = limit - 1;
    let kept: String = text.chars().take(budget).collect();
    let at_boundary = text.chars().nth(budget).is_some_and(char::is_whitespace);
    let cut = match kept.rfind(char::is_whitespace) {
        Some(index) if !at_boundary && kept[..index].chars().count() * 2 >= budget => {
            &kept[..index]
        }
        _ => kept.as_str(),
    };
    let cut = cut.trim_end_matches(|c: char| {
        c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-' | '.')
    });
    format!("{cut}{ELLIPSIS}")
}

fn truncate_in_place(text: &mut String, limit: usize) -> bool {
    if text.chars().count() <= limit {
        return false;
    }
    *text = truncate_words(text, limit);
    true
}

fn truncate_option(text: &mut Option<String>, limit: usize) -> bool {
    text.as_mut().is_some_and(|t| truncate_in_place(t, limit))
}

/// Applies every violation directly to the slide.
///
/// Shorten and split violations are resolved by truncation and missing
/// titles or images are inserted. A count in the title is rewritten to match
/// the remaining items. Expand violations on content cannot be fixed without
/// a model and are left alone.
pub fn apply(
    mut slide: Slide,
    violations: &[ConstraintViolation],
    title_hint: &str,
    language: &str,
) -> Slide {
    let mut keep_kinds: HashMap<BlockKind, usize> = HashMap::new();
    let mut missing_kinds = Vec::new();

    for violation in violations {
        match (violation.field, violation.action) {
            (FieldRef::Kind(kind), ViolationAction::Shorten | ViolationAction::Split) => {
                keep_kinds.insert(kind, violation.limit);
            }
            (FieldRef::Kind(kind), ViolationAction::Expand) => missing_kinds.push(kind),
            (field, ViolationAction::Shorten | ViolationAction::Split) => {
                truncate_field(&mut slide, field, violation.limit);
            }
            _ => {}
        }
    }

    if !keep_kinds.is_empty() {
        let mut seen: HashMap<BlockKind, usize> = HashMap::new();
        slide.blocks.retain(|block| {
            let kind = block.kind();
            let Some(keep) = keep_kinds.get(&kind) else {
                return true;
            };
            let count = seen.entry(kind).or_default();
            *count += 1;
            *count <= *keep
        });
    }

    let constraints = constraints_for(slide.slide_type);
    for kind in missing_kinds {
        match kind {
            BlockKind::Title => {
                let title = truncate_words(title_hint, constraints.title_max);
                slide.blocks.insert(0, Block::title(title));
            }
            BlockKind::Image => {
                let alt = truncate_words(title_hint, limits::ALT);
                slide.blocks.push(Block::placeholder_image(alt));
            }
            _ => {}
        }
    }

    sync_title_count(&mut slide, language);
    slide
}

/// Rewrites a count mentioned in the title to the number of items shown.
fn sync_title_count(slide: &mut Slide, language: &str) {
    if !slide.slide_type.is_countable() {
        return;
    }
    let actual = slide.item_count();
    let title_max = constraints_for(slide.slide_type).title_max;
    let Some(Block::Title { text }) = slide
        .blocks
        .iter_mut()
        .find(|b| b.kind() == BlockKind::Title)
    else {
        return;
    };
    if let Some(count) = locale::title_count(text, language)
        && count.value != actual
        && actual > 0
    {
        *text = locale::replace_title_count(text, &count, actual, language);
        truncate_in_place(text, title_max);
    }
}

fn truncate_field(slide: &mut Slide, field: FieldRef, limit: usize) {
    match field {
        FieldRef::Title => {
            if let Some(Block::Title { text }) =
                slide.blocks.iter_mut().find(|b| b.kind() == BlockKind::Title)
            {
                truncate_in_place(text, limit);
            }
        }
        FieldRef::Text { block } => match slide.blocks.get_mut(block) {
            Some(Block::Text { text } | Block::Callout { text, .. }) => {
                truncate_in_place(text, limit);
            }
            _ => {}
        },
        FieldRef::Items { block } => {
            if let Some(Block::Bullets { items }) = slide.blocks.get_mut(block) {
                items.truncate(limit);
            }
        }
        FieldRef::Item { block, item } => {
            if let Some(Block::Bullets { items }) = slide.blocks.get_mut(block)
                && let Some(text) = items.get_mut(item)
            {
                truncate_in_place(text, limit);
            }
        }
        FieldRef::Rows { block } => {
            if let Some(Block::Table { rows, .. }) = slide.blocks.get_mut(block) {
                rows.truncate(limit);
            }
        }
        FieldRef::Block { block } => {
            if let Some(Block::Table { columns, rows }) = slide.blocks.get_mut(block) {
                columns.truncate(limit);
                for row in rows {
                    row.truncate(limit);
                }
            }
        }
        FieldRef::Column { block, column } => {
            if let Some(Block::Table { columns, .. }) = slide.blocks.get_mut(block)
                && let Some(header) = columns.get_mut(column)
            {
                truncate_in_place(header, limit);
            }
        }
        FieldRef::Cell { block, row, column } => {
            if let Some(Block::Table { rows, .. }) = slide.blocks.get_mut(block)
                && let Some(cell) = rows.get_mut(row).and_then(|r| r.get_mut(column))
            {
                truncate_in_place(cell, limit);
            }
        }
        FieldRef::Field { block, name } => {
            if let Some(content) = slide.blocks.get_mut(block) {
                truncate_named(content, name, limit);
            }
        }
        FieldRef::Kind(_) | FieldRef::Content => {}
    }
}

fn truncate_named(block: &mut Block, name: &str, limit: usize) {
    match (block, name) {
        (Block::Image { alt, .. }, "alt") => {
            truncate_in_place(alt, limit);
        }
        (Block::Callout { attribution, .. }, "attribution") => {
            truncate_option(attribution, limit);
        }
        (Block::StatBlock { value, .. }, "value") => {
            truncate_in_place(value, limit);
        }
        (Block::StatBlock { label, .. }, "label") => {
            truncate_in_place(label, limit);
        }
        (Block::StatBlock { description, .. }, "description") => {
            truncate_option(description, limit);
        }
        (Block::TimelineStep { date, .. }, "date") => {
            truncate_option(date, limit);
        }
        (
            Block::TimelineStep { title, .. }
            | Block::IconCard { title, .. }
            | Block::NumberedCard { title, .. },
            "title",
        ) => {
            truncate_in_place(title, limit);
        }
        (
            Block::TimelineStep { description, .. }
            | Block::IconCard { description, .. }
            | Block::NumberedCard { description, .. },
            "description",
        ) => {
            truncate_in_place(description, limit);
        }
        (Block::IconCard { icon, .. }, "icon") => {
            truncate_in_place(icon, limit);
        }
        _ => {}
    }
}

/// Clamps every block to its absolute per-kind limits.
///
/// Returns the number of fields that were cut.
pub fn enforce_block_limits(slide: &mut Slide) -> usize {
    let mut cut = 0;
    let mut clamp = |text: &mut String, limit: usize| {
        cut += usize::from(truncate_in_place(text, limit));
    };

    for block in &mut slide.blocks {
        match block {
            Block::Title { text } => clamp(text, limits::TITLE),
            Block::Text { text } => clamp(text, limits::TEXT),
            Block::Bullets { items } => {
                items.truncate(limits::BULLET_ITEMS);
                for item in items {
                    clamp(item, limits::BULLET_ITEM);
                }
            }
            Block::Image { alt, .. } => clamp(alt, limits::ALT),
            Block::Table { columns, rows } => {
                columns.truncate(limits::TABLE_COLUMNS);
                rows.truncate(limits::TABLE_ROWS);
                for header in columns.iter_mut() {
                    clamp(header, limits::COLUMN_HEADER);
                }
                for row in rows {
                    row.truncate(limits::TABLE_COLUMNS);
                    for cell in row {
                        clamp(cell, limits::CELL);
                    }
                }
            }
            Block::Callout { text, attribution } => {
                clamp(text, limits::CALLOUT);
                if let Some(attribution) = attribution {
                    clamp(attribution, limits::ATTRIBUTION);
                }
            }
            Block::StatBlock {
                value,
                label,
                description,
            } => {
                clamp(value, limits::STAT_VALUE);
                clamp(label, limits::STAT_LABEL);
                if let Some(description) = description {
                    clamp(description, limits::STAT_DESCRIPTION);
                }
            }
            Block::TimelineStep {
                title,
                description,
                date,
            } => {
                clamp(title, limits::STEP_TITLE);
                clamp(description, limits::STEP_DESCRIPTION);
                if let Some(date) = date {
                    clamp(date, limits::STEP_DATE);
                }
            }
            Block::IconCard {
                icon,
                title,
                description,
            } => {
                clamp(icon, limits::CARD_ICON);
                clamp(title, limits::CARD_TITLE);
                clamp(description, limits::CARD_DESCRIPTION);
            }
            Block::NumberedCard {
                title, description, ..
            } => {
                clamp(title, limits::CARD_TITLE);
                clamp(description, limits::CARD_DESCRIPTION);
            }
        }
    }

    cut
}

#[cfg(test)]
mod tests {
    use decksmith_core::slide::SlideType;

    use super::*;
    use crate::validate::Validator;

    #[test]
    fn truncation_respects_word_boundaries() {
        let text = "Quarterly revenue grew faster than any quarter before";
        let cut = truncate_words(text, 30);
        assert_eq!(cut, "Quarterly revenue grew faster…");
        assert!(cut.chars().count() <= 30);

        assert_eq!(truncate_words("short", 30), "short");
        assert_eq!(truncate_words("abcdefghij", 5), "abcd…");
        assert_eq!(truncate_words("abc", 0), "");
    }

    #[test]
    fn truncation_counts_characters() {
        let cut = truncate_words("Møtenotater fra prosjektmøtet i uke femti", 20);
        assert!(cut.chars().count() <= 20);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn fallback_resolves_shorten_violations() {
        let slide = Slide::new(
            SlideType::Bullets,
            vec![
                Block::title("A title that goes on and on ".repeat(4)),
                Block::bullets([
                    "First item with plenty of substance to fill the slide in a useful way".to_string(),
                    "x ".repeat(90),
                    "Third item with plenty of substance to fill the slide in a useful way".to_string(),
                    "Fourth item with plenty of substance to fill the slide in a useful way".to_string(),
                ]),
                Block::placeholder_image("stray"),
            ],
        );
        let validator = Validator::new("en");
        let violations = validator.validate(&slide);
        assert!(!violations.is_empty());

        let repaired = apply(slide, &violations, "Title", "en");
        assert!(validator.validate(&repaired).is_empty());
        assert!(!repaired.has_image());
    }

    #[test]
    fn fallback_truncates_lists_and_fixes_titles() {
        let items: Vec<String> = (1..=9)
            .map(|n| format!("Lesson {n} that the team agreed to carry into the next phase"))
            .collect();
        let slide = Slide::new(
            SlideType::Bullets,
            vec![Block::title("Nine lessons learned"), Block::bullets(items)],
        );
        let validator = Validator::new("en");
        let violations = validator.validate(&slide);

        let repaired = apply(slide, &violations, "Lessons", "en");
        assert_eq!(repaired.item_count(), 6);
        assert_eq!(repaired.title(), Some("Six lessons learned"));
        assert!(validator.validate(&repaired).is_empty());
    }

    #[test]
    fn rewritten_count_respects_title_limit() {
        let mut title = String::from("Two priorities");
        while title.chars().count() < 86 {
            title.push_str(" plan");
        }
        let title_max = constraints_for(SlideType::Bullets).title_max;
        assert!(title.chars().count() <= title_max);

        let slide = Slide::new(
            SlideType::Bullets,
            vec![Block::title(title), Block::bullets(["Hire", "Ship", "Sell"])],
        );
        let repaired = apply(slide, &[], "Priorities", "en");

        let repaired_title = repaired.title().unwrap();
        assert!(repaired_title.starts_with("Three priorities"));
        assert!(repaired_title.chars().count() <= title_max);
    }

    #[test]
    fn fallback_inserts_missing_title_and_image() {
        let slide = Slide::new(
            SlideType::TextPlusImage,
            vec![Block::text(
                "Our new office opens in March with room for the whole team and space for visitors.",
            )],
        );
        let violations = Validator::new("en").validate(&slide);
        let repaired = apply(slide, &violations, "The new office", "en");

        assert_eq!(repaired.title(), Some("The new office"));
        assert!(repaired.blocks.last().is_some_and(Block::is_placeholder_image));
    }

    #[test]
    fn block_limits_clamp_every_kind() {
        let mut slide = Slide::new(
            SlideType::Table,
            vec![
                Block::title("t".repeat(150)),
                Block::Table {
                    columns: (0..8).map(|c| format!("Column {c}")).collect(),
                    rows: vec![vec!["c".repeat(130); 8]; 12],
                },
                Block::StatBlock {
                    value: "1 234 567 890 NOK".into(),
                    label: "revenue".into(),
                    description: None,
                },
            ],
        );

        let cut = enforce_block_limits(&mut slide);
        assert!(cut > 0);
        assert_eq!(slide.title().map(|t| t.chars().count()), Some(limits::TITLE));
        let Block::Table { columns, rows } = &slide.blocks[1] else {
            panic!("expected table");
        };
        assert_eq!(columns.len(), limits::TABLE_COLUMNS);
        assert_eq!(rows.len(), limits::TABLE_ROWS);
        assert!(rows.iter().all(|r| r.len() == limits::TABLE_COLUMNS));
        assert!(rows[0][0].chars().count() <= limits::CELL);
        assert_eq!(enforce_block_limits(&mut slide), 0);
    }
}
