//! Content-based variant decision tables.

use decksmith_core::block::{Block, BlockKind};
use decksmith_core::slide::{Slide, SlideType};

/// Variant labels available for a slide type, in order of preference.
pub fn variants(slide_type: SlideType) -> &'static [&'static str] {
    match slide_type {
        SlideType::Cover => &["centered", "split_image"],
        SlideType::Agenda => &["list", "two_column"],
        SlideType::SectionHeader => &["centered", "left_aligned"],
        SlideType::Bullets => &["list", "two_column", "spacious"],
        SlideType::TwoColumnText => &["equal", "wide_left"],
        SlideType::Comparison => &["side_by_side", "stacked"],
        SlideType::TextPlusImage => &["image_left", "image_right"],
        SlideType::Stats => &["row", "grid", "highlight"],
        SlideType::Timeline => &["horizontal", "vertical"],
        SlideType::TimelineRoadmap => &["horizontal", "milestones"],
        SlideType::CardGrid => &["grid", "row"],
        SlideType::NumberedGrid => &["grid", "list"],
        SlideType::QuoteCallout => &["centered", "with_image"],
        SlideType::Table | SlideType::ActionItemsTable => &["standard", "compact"],
        SlideType::DecisionsList => &["list", "numbered"],
        SlideType::SummaryNextSteps => &["list", "two_column"],
    }
}

/// Structurally opposite variant of a two-variant type.
pub fn opposite_variant(slide_type: SlideType, variant: &str) -> Option<&'static str> {
    match variants(slide_type) {
        [a, b] if *a == variant => Some(*b),
        [a, b] if *b == variant => Some(*a),
        _ => None,
    }
}

fn average_item_len(slide: &Slide) -> usize {
    let (total, count) = slide
        .bullet_items()
        .fold((0usize, 0usize), |(total, count), item| (total + item.chars().count(), count + 1));
    if count == 0 { 0 } else { total / count }
}

fn average_description_len(slide: &Slide) -> usize {
    let lengths: Vec<usize> = slide
        .blocks
        .iter()
        .filter_map(|block| match block {
            Block::TimelineStep { description, .. }
            | Block::IconCard { description, .. }
            | Block::NumberedCard { description, .. } => Some(description.chars().count()),
            _ => None,
        })
        .collect();
    if lengths.is_empty() {
        0
    } else {
        lengths.iter().sum::<usize>() / lengths.len()
    }
}

fn table_shape(slide: &Slide) -> (usize, usize) {
    slide
        .blocks
        .iter()
        .find_map(|block| match block {
            Block::Table { columns, rows } => Some((rows.len(), columns.len())),
            _ => None,
        })
        .unwrap_or_default()
}

/// Picks a variant from the slide's content shape.
pub fn content_variant(slide: &Slide) -> &'static str {
    let items = slide.item_count();

    match slide.slide_type {
        SlideType::Cover => {
            if slide.has_image() {
                "split_image"
            } else {
                "centered"
            }
        }
        SlideType::Agenda => {
            if items > 5 {
                "two_column"
            } else {
                "list"
            }
        }
        SlideType::SectionHeader => {
            if slide.char_count() > 100 {
                "left_aligned"
            } else {
                "centered"
            }
        }
        SlideType::Bullets => {
            if items >= 6 || slide.char_count() > 500 {
                "two_column"
            } else if items <= 3 && average_item_len(slide) < 60 {
                "spacious"
            } else {
                "list"
            }
        }
        SlideType::TwoColumnText => {
            let lengths: Vec<usize> = slide
                .blocks
                .iter()
                .filter(|b| b.kind() == BlockKind::Text)
                .map(Block::char_count)
                .collect();
            match lengths.as_slice() {
                [left, right, ..] if *left * 2 > *right * 3 => "wide_left",
                _ => "equal",
            }
        }
        SlideType::Comparison => {
            if average_item_len(slide) > 70 {
                "stacked"
            } else {
                "side_by_side"
            }
        }
        SlideType::TextPlusImage => {
            if slide.count_kind(BlockKind::Bullets) > 0 {
                "image_left"
            } else {
                "image_right"
            }
        }
        SlideType::Stats => match slide.count_kind(BlockKind::StatBlock) {
            0..=2 => "highlight",
            3 => "row",
            _ => "grid",
        },
        SlideType::Timeline => {
            let steps = slide.count_kind(BlockKind::TimelineStep);
            if steps <= 4 && average_description_len(slide) < 90 {
                "horizontal"
            } else {
                "vertical"
            }
        }
        SlideType::TimelineRoadmap => {
            let dated = slide.blocks.iter().all(|block| match block {
                Block::TimelineStep { date, .. } => date.is_some(),
                _ => true,
            });
            if dated { "milestones" } else { "horizontal" }
        }
        SlideType::CardGrid => {
            if slide.count_kind(BlockKind::IconCard) <= 3 {
                "row"
            } else {
                "grid"
            }
        }
        SlideType::NumberedGrid => {
            if average_description_len(slide) > 100 {
                "list"
            } else {
                "grid"
            }
        }
        SlideType::QuoteCallout => {
            if slide.has_image() {
                "with_image"
            } else {
                "centered"
            }
        }
        SlideType::Table | SlideType::ActionItemsTable => {
            let (rows, columns) = table_shape(slide);
            if rows > 5 || columns > 4 {
                "compact"
            } else {
                "standard"
            }
        }
        SlideType::DecisionsList => {
            if items >= 4 {
                "numbered"
            } else {
                "list"
            }
        }
        SlideType::SummaryNextSteps => {
            if slide.count_kind(BlockKind::Bullets) > 1 {
                "two_column"
            } else {
                "list"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn content_variant_is_always_listed() {
        for slide_type in SlideType::iter() {
            let slide = Slide::new(slide_type, vec![Block::title("Title")]);
            assert!(variants(slide_type).contains(&content_variant(&slide)));
        }
    }

    #[test]
    fn bullets_follow_item_count() {
        let short = Slide::new(
            SlideType::Bullets,
            vec![Block::title("Few"), Block::bullets(["One", "Two"])],
        );
        let long = Slide::new(
            SlideType::Bullets,
            vec![Block::title("Many"), Block::bullets(["a", "b", "c", "d", "e", "f"])],
        );
        assert_eq!(content_variant(&short), "spacious");
        assert_eq!(content_variant(&long), "two_column");
    }

    #[test]
    fn stats_follow_block_count() {
        let stat = || Block::StatBlock {
            value: "1".into(),
            label: "x".into(),
            description: None,
        };
        let three = Slide::new(SlideType::Stats, vec![stat(), stat(), stat()]);
        let four = Slide::new(SlideType::Stats, vec![stat(), stat(), stat(), stat()]);
        assert_eq!(content_variant(&three), "row");
        assert_eq!(content_variant(&four), "grid");
    }

    #[test]
    fn opposite_of_image_side() {
        assert_eq!(
            opposite_variant(SlideType::TextPlusImage, "image_left"),
            Some("image_right")
        );
        assert_eq!(opposite_variant(SlideType::Bullets, "list"), None);
    }
}
