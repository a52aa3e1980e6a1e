//! Slide validation against per-type constraints.

use decksmith_core::block::{Block, BlockKind};
use decksmith_core::slide::Slide;
use decksmith_core::violation::{ConstraintViolation, FieldRef, ViolationAction};
use strum::IntoEnumIterator;

use super::constraints::{SlideConstraints, constraints_for, is_repeated_kind, limits};
use crate::locale;

/// Checks slides for structural, length, title-count and density problems.
///
/// An empty result means the slide is valid.
#[derive(Debug, Clone)]
pub struct Validator {
    language: String,
}

impl Validator {
    /// Creates a validator for slides written in `language`.
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    /// Language used for number words in titles.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Validates one slide.
    pub fn validate(&self, slide: &Slide) -> Vec<ConstraintViolation> {
        let constraints = constraints_for(slide.slide_type);
        let mut violations = Vec::new();

        check_structure(slide, &constraints, &mut violations);
        check_fields(slide, &constraints, &mut violations);
        self.check_title_count(slide, &mut violations);
        check_density(slide, &constraints, &mut violations);

        violations
    }

    fn check_title_count(&self, slide: &Slide, out: &mut Vec<ConstraintViolation>) {
        if !slide.slide_type.is_countable() {
            return;
        }
        let Some(title) = slide.title() else {
            return;
        };
        let Some(count) = locale::title_count(title, &self.language) else {
            return;
        };

        let actual = slide.item_count();
        if actual > 0 && count.value != actual {
            out.push(ConstraintViolation::new(
                FieldRef::Title,
                ViolationAction::AdjustTitle,
                count.value,
                actual,
                format!("title mentions {} items but the slide shows {actual}", count.value),
            ));
        }
    }
}

fn check_structure(
    slide: &Slide,
    constraints: &SlideConstraints,
    out: &mut Vec<ConstraintViolation>,
) {
    for kind in BlockKind::iter() {
        let count = slide.count_kind(kind);
        match constraints.rule(kind) {
            None if count > 0 => out.push(ConstraintViolation::new(
                FieldRef::Kind(kind),
                ViolationAction::Shorten,
                count,
                0,
                format!("{} slides have no {kind} blocks", slide.slide_type),
            )),
            None => {}
            Some(rule) if count < rule.min => out.push(ConstraintViolation::new(
                FieldRef::Kind(kind),
                ViolationAction::Expand,
                count,
                rule.min,
                format!("at least {} {kind} blocks required", rule.min),
            )),
            Some(rule) if count > rule.max => {
                let action = if is_repeated_kind(kind) {
                    ViolationAction::Split
                } else {
                    ViolationAction::Shorten
                };
                out.push(ConstraintViolation::new(
                    FieldRef::Kind(kind),
                    action,
                    count,
                    rule.max,
                    format!("at most {} {kind} blocks allowed", rule.max),
                ));
            }
            Some(_) => {}
        }
    }
}

fn len(text: &str) -> usize {
    text.chars().count()
}

fn too_long(
    out: &mut Vec<ConstraintViolation>,
    field: FieldRef,
    text: &str,
    limit: usize,
    what: &str,
) {
    let current = len(text);
    if current > limit {
        out.push(ConstraintViolation::new(
            field,
            ViolationAction::Shorten,
            current,
            limit,
            format!("{what} is too long"),
        ));
    }
}

fn check_fields(
    slide: &Slide,
    constraints: &SlideConstraints,
    out: &mut Vec<ConstraintViolation>,
) {
    let mut seen_title = false;

    for (block, content) in slide.blocks.iter().enumerate() {
        match content {
            Block::Title { text } => {
                if !seen_title {
                    too_long(out, FieldRef::Title, text, constraints.title_max, "title");
                    seen_title = true;
                }
            }
            Block::Text { text } => {
                too_long(out, FieldRef::Text { block }, text, constraints.text_max, "text");
            }
            Block::Bullets { items } => {
                if items.is_empty() {
                    out.push(ConstraintViolation::new(
                        FieldRef::Items { block },
                        ViolationAction::Expand,
                        0,
                        1,
                        "bullet list is empty",
                    ));
                } else if items.len() > constraints.max_items {
                    out.push(ConstraintViolation::new(
                        FieldRef::Items { block },
                        ViolationAction::Split,
                        items.len(),
                        constraints.max_items,
                        "too many bullet items",
                    ));
                }
                for (item, text) in items.iter().enumerate() {
                    too_long(
                        out,
                        FieldRef::Item { block, item },
                        text,
                        constraints.item_max,
                        "bullet item",
                    );
                }
            }
            Block::Image { alt, .. } => {
                too_long(out, FieldRef::Field { block, name: "alt" }, alt, limits::ALT, "alt text");
            }
            Block::Table { columns, rows } => {
                if columns.len() > constraints.max_columns {
                    out.push(ConstraintViolation::new(
                        FieldRef::Block { block },
                        ViolationAction::Shorten,
                        columns.len(),
                        constraints.max_columns,
                        "too many table columns",
                    ));
                }
                if rows.is_empty() {
                    out.push(ConstraintViolation::new(
                        FieldRef::Rows { block },
                        ViolationAction::Expand,
                        0,
                        1,
                        "table has no rows",
                    ));
                } else if rows.len() > constraints.max_rows {
                    out.push(ConstraintViolation::new(
                        FieldRef::Rows { block },
                        ViolationAction::Split,
                        rows.len(),
                        constraints.max_rows,
                        "too many table rows",
                    ));
                }
                for (column, header) in columns.iter().enumerate() {
                    too_long(
                        out,
                        FieldRef::Column { block, column },
                        header,
                        limits::COLUMN_HEADER,
                        "column header",
                    );
                }
                for (row, cells) in rows.iter().enumerate() {
                    for (column, cell) in cells.iter().enumerate() {
                        too_long(
                            out,
                            FieldRef::Cell { block, row, column },
                            cell,
                            limits::CELL,
                            "table cell",
                        );
                    }
                }
            }
            Block::Callout { text, attribution } => {
                too_long(out, FieldRef::Text { block }, text, limits::CALLOUT, "callout");
                if let Some(attribution) = attribution {
                    too_long(
                        out,
                        FieldRef::Field { block, name: "attribution" },
                        attribution,
                        limits::ATTRIBUTION,
                        "attribution",
                    );
                }
            }
            Block::StatBlock {
                value,
                label,
                description,
            } => {
                too_long(
                    out,
                    FieldRef::Field { block, name: "value" },
                    value,
                    limits::STAT_VALUE,
                    "stat value",
                );
                too_long(
                    out,
                    FieldRef::Field { block, name: "label" },
                    label,
                    limits::STAT_LABEL,
                    "stat label",
                );
                if let Some(description) = description {
                    too_long(
                        out,
                        FieldRef::Field { block, name: "description" },
                        description,
                        limits::STAT_DESCRIPTION,
                        "stat description",
                    );
                }
            }
            Block::TimelineStep {
                title,
                description,
                date,
            } => {
                too_long(
                    out,
                    FieldRef::Field { block, name: "title" },
                    title,
                    limits::STEP_TITLE,
                    "step title",
                );
                too_long(
                    out,
                    FieldRef::Field { block, name: "description" },
                    description,
                    limits::STEP_DESCRIPTION,
                    "step description",
                );
                if let Some(date) = date {
                    too_long(
                        out,
                        FieldRef::Field { block, name: "date" },
                        date,
                        limits::STEP_DATE,
                        "step date",
                    );
                }
            }
            Block::IconCard {
                icon,
                title,
                description,
            } => {
                too_long(
                    out,
                    FieldRef::Field { block, name: "icon" },
                    icon,
                    limits::CARD_ICON,
                    "card icon",
                );
                too_long(
                    out,
                    FieldRef::Field { block, name: "title" },
                    title,
                    limits::CARD_TITLE,
                    "card title",
                );
                too_long(
                    out,
                    FieldRef::Field { block, name: "description" },
                    description,
                    limits::CARD_DESCRIPTION,
                    "card description",
                );
            }
            Block::NumberedCard {
                title, description, ..
            } => {
                too_long(
                    out,
                    FieldRef::Field { block, name: "title" },
                    title,
                    limits::CARD_TITLE,
                    "card title",
                );
                too_long(
                    out,
                    FieldRef::Field { block, name: "description" },
                    description,
                    limits::CARD_DESCRIPTION,
                    "card description",
                );
            }
        }
    }
}

fn check_density(
    slide: &Slide,
    constraints: &SlideConstraints,
    out: &mut Vec<ConstraintViolation>,
) {
    let Some(min_chars) = constraints.min_chars() else {
        return;
    };
    let chars = slide.char_count();
    if chars < min_chars {
        out.push(ConstraintViolation::new(
            FieldRef::Content,
            ViolationAction::Expand,
            chars,
            min_chars,
            "slide fills too little of its layout",
        ));
    }
}

#[cfg(test)]
mod tests {
    use decksmith_core::slide::SlideType;

    use super::*;

    fn item(n: usize) -> String {
        format!("Bullet point number {n} with enough words to carry some weight on the slide")
    }

    fn bullets(count: usize) -> Slide {
        Slide::new(
            SlideType::Bullets,
            vec![
                Block::title("Where we stand"),
                Block::bullets((1..=count).map(item)),
            ],
        )
    }

    #[test]
    fn slide_within_limits_is_valid() {
        let validator = Validator::new("en");
        assert!(validator.validate(&bullets(5)).is_empty());
    }

    #[test]
    fn too_many_bullets_call_for_split() {
        let validator = Validator::new("en");
        let violations = validator.validate(&bullets(9));

        let split = violations
            .iter()
            .find(|v| v.action == ViolationAction::Split)
            .unwrap();
        assert_eq!(split.field, FieldRef::Items { block: 1 });
        assert_eq!(split.current, 9);
        assert_eq!(split.limit, 6);
    }

    #[test]
    fn long_fields_call_for_shorten() {
        let mut slide = bullets(4);
        slide.blocks[0] = Block::title("x".repeat(95));
        if let Block::Bullets { items } = &mut slide.blocks[1] {
            items[2] = "y".repeat(130);
        }

        let violations = Validator::new("en").validate(&slide);
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().all(|v| v.action == ViolationAction::Shorten));
        assert_eq!(violations[0].field, FieldRef::Title);
        assert_eq!(violations[1].field, FieldRef::Item { block: 1, item: 2 });
    }

    #[test]
    fn missing_and_unexpected_blocks_are_reported() {
        let slide = Slide::new(
            SlideType::TextPlusImage,
            vec![
                Block::title("Our new office"),
                Block::text("a".repeat(200)),
                Block::Callout {
                    text: "unexpected".into(),
                    attribution: None,
                },
            ],
        );
        let violations = Validator::new("en").validate(&slide);

        assert!(violations.iter().any(|v| v.field == FieldRef::Kind(BlockKind::Image)
            && v.action == ViolationAction::Expand));
        assert!(violations.iter().any(|v| v.field == FieldRef::Kind(BlockKind::Callout)
            && v.action == ViolationAction::Shorten
            && v.limit == 0));
    }

    #[test]
    fn extra_stat_blocks_call_for_split() {
        let stat = || Block::StatBlock {
            value: "42%".into(),
            label: "faster onboarding".into(),
            description: Some("Measured across every new customer this quarter".into()),
        };
        let slide = Slide::new(
            SlideType::Stats,
            vec![Block::title("Key figures"), stat(), stat(), stat(), stat(), stat()],
        );
        let violations = Validator::new("en").validate(&slide);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].action, ViolationAction::Split);
        assert_eq!(violations[0].field, FieldRef::Kind(BlockKind::StatBlock));
    }

    #[test]
    fn title_count_must_match_items() {
        let mut slide = bullets(4);
        slide.blocks[0] = Block::title("Five lessons learned");
        let violations = Validator::new("en").validate(&slide);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].action, ViolationAction::AdjustTitle);
        assert_eq!((violations[0].current, violations[0].limit), (5, 4));

        slide.blocks[0] = Block::title("Fire erfaringer");
        assert!(Validator::new("nb").validate(&slide).is_empty());
    }

    #[test]
    fn sparse_slide_calls_for_expand() {
        let slide = Slide::new(
            SlideType::Bullets,
            vec![Block::title("Risks"), Block::bullets(["Budget", "Scope"])],
        );
        let violations = Validator::new("en").validate(&slide);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, FieldRef::Content);
        assert_eq!(violations[0].action, ViolationAction::Expand);
        assert_eq!(violations[0].limit, 245);
    }

    #[test]
    fn cover_skips_density() {
        let slide = Slide::new(SlideType::Cover, vec![Block::title("Q3")]);
        assert!(Validator::new("en").validate(&slide).is_empty());
    }
}
