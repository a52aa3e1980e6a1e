//! Per-slide-type structure and length limits.

use decksmith_core::block::BlockKind;
use decksmith_core::slide::SlideType;

/// Absolute per-kind limits, applied to every slide regardless of type.
pub mod limits {
    pub const TITLE: usize = 120;
    pub const TEXT: usize = 600;
    pub const BULLET_ITEMS: usize = 8;
    pub const BULLET_ITEM: usize = 200;
    pub const TABLE_COLUMNS: usize = 6;
    pub const TABLE_ROWS: usize = 10;
    pub const COLUMN_HEADER: usize = 40;
    pub const CELL: usize = 120;
    pub const CALLOUT: usize = 300;
    pub const ATTRIBUTION: usize = 80;
    pub const STAT_VALUE: usize = 16;
    pub const STAT_LABEL: usize = 60;
    pub const STAT_DESCRIPTION: usize = 160;
    pub const STEP_TITLE: usize = 60;
    pub const STEP_DESCRIPTION: usize = 200;
    pub const STEP_DATE: usize = 30;
    pub const CARD_ICON: usize = 40;
    pub const CARD_TITLE: usize = 60;
    pub const CARD_DESCRIPTION: usize = 200;
    pub const ALT: usize = 200;
}

/// Minimum share of the estimated capacity a slide must fill, in percent.
pub const MIN_DENSITY_PERCENT: usize = 35;

/// Allowed number of blocks of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRule {
    pub kind: BlockKind,
    pub min: usize,
    pub max: usize,
}

const fn rule(kind: BlockKind, min: usize, max: usize) -> BlockRule {
    BlockRule { kind, min, max }
}

/// Structure and limits for one slide type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideConstraints {
    /// Allowed block kinds; kinds not listed may not appear.
    pub blocks: &'static [BlockRule],
    /// Maximum title length.
    pub title_max: usize,
    /// Maximum length of text and callout blocks.
    pub text_max: usize,
    /// Maximum items per bullets block.
    pub max_items: usize,
    /// Maximum length of one bullet item.
    pub item_max: usize,
    /// Maximum table rows.
    pub max_rows: usize,
    /// Maximum table columns.
    pub max_columns: usize,
    /// Estimated characters that fill the slide; `None` skips the density check.
    pub capacity: Option<usize>,
}

impl SlideConstraints {
    /// Rule for a block kind, if the kind is allowed.
    pub fn rule(&self, kind: BlockKind) -> Option<&BlockRule> {
        self.blocks.iter().find(|r| r.kind == kind)
    }

    /// Smallest character count that passes the density check.
    pub fn min_chars(&self) -> Option<usize> {
        self.capacity
            .map(|capacity| (capacity * MIN_DENSITY_PERCENT).div_ceil(100))
    }
}

const BASE: SlideConstraints = SlideConstraints {
    blocks: &[],
    title_max: 90,
    text_max: 300,
    max_items: 6,
    item_max: 120,
    max_rows: limits::TABLE_ROWS,
    max_columns: limits::TABLE_COLUMNS,
    capacity: None,
};

/// Returns the constraints for a slide type.
pub fn constraints_for(slide_type: SlideType) -> SlideConstraints {
    use BlockKind::*;

    match slide_type {
        SlideType::Cover => SlideConstraints {
            blocks: const { &[rule(Title, 1, 1), rule(Text, 0, 1), rule(Image, 0, 1)] },
            title_max: 80,
            text_max: 160,
            ..BASE
        },
        SlideType::Agenda => SlideConstraints {
            blocks: const { &[rule(Title, 1, 1), rule(Bullets, 1, 1)] },
            max_items: 7,
            item_max: 60,
            ..BASE
        },
        SlideType::SectionHeader => SlideConstraints {
            blocks: const { &[rule(Title, 1, 1), rule(Text, 0, 1), rule(Image, 0, 1)] },
            title_max: 80,
            text_max: 160,
            ..BASE
        },
        SlideType::Bullets => SlideConstraints {
            blocks: const { &[rule(Title, 1, 1), rule(Bullets, 1, 1)] },
            capacity: Some(700),
            ..BASE
        },
        SlideType::TwoColumnText => SlideConstraints {
            blocks: const { &[rule(Title, 1, 1), rule(Text, 2, 2)] },
            text_max: 400,
            capacity: Some(800),
            ..BASE
        },
        SlideType::Comparison => SlideConstraints {
            blocks: const { &[rule(Title, 1, 1), rule(Bullets, 2, 2)] },
            max_items: 5,
            item_max: 100,
            capacity: Some(900),
            ..BASE
        },
        SlideType::TextPlusImage => SlideConstraints {
            blocks: const { &[
                rule(Title, 1, 1),
                rule(Text, 1, 1),
                rule(Bullets, 0, 1),
                rule(Image, 1, 1),
            ] },
            text_max: 400,
            max_items: 4,
            item_max: 100,
            capacity: Some(450),
            ..BASE
        },
        SlideType::Stats => SlideConstraints {
            blocks: const { &[rule(Title, 1, 1), rule(StatBlock, 2, 4), rule(Text, 0, 1)] },
            text_max: 200,
            capacity: Some(400),
            ..BASE
        },
        SlideType::Timeline | SlideType::TimelineRoadmap => SlideConstraints {
            blocks: const { &[rule(Title, 1, 1), rule(TimelineStep, 3, 6)] },
            capacity: Some(700),
            ..BASE
        },
        SlideType::CardGrid => SlideConstraints {
            blocks: const { &[rule(Title, 1, 1), rule(IconCard, 3, 6)] },
            capacity: Some(700),
            ..BASE
        },
        SlideType::NumberedGrid => SlideConstraints {
            blocks: const { &[rule(Title, 1, 1), rule(NumberedCard, 3, 6)] },
            capacity: Some(700),
            ..BASE
        },
        SlideType::QuoteCallout => SlideConstraints {
            blocks: const { &[rule(Title, 0, 1), rule(Callout, 1, 1), rule(Image, 0, 1)] },
            ..BASE
        },
        SlideType::Table => SlideConstraints {
            blocks: const { &[rule(Title, 1, 1), rule(Table, 1, 1)] },
            max_rows: 8,
            max_columns: 5,
            capacity: Some(600),
            ..BASE
        },
        SlideType::ActionItemsTable => SlideConstraints {
            blocks: const { &[rule(Title, 1, 1), rule(Table, 1, 1)] },
            max_rows: 8,
            max_columns: 4,
            capacity: Some(500),
            ..BASE
        },
        SlideType::DecisionsList => SlideConstraints {
            blocks: const { &[rule(Title, 1, 1), rule(Bullets, 1, 1)] },
            item_max: 140,
            capacity: Some(600),
            ..BASE
        },
        SlideType::SummaryNextSteps => SlideConstraints {
            blocks: const { &[rule(Title, 1, 1), rule(Bullets, 1, 2)] },
            capacity: Some(600),
            ..BASE
        },
    }
}

/// Kinds whose extra blocks carry distinct content and call for a split.
pub fn is_repeated_kind(kind: BlockKind) -> bool {
    matches!(
        kind,
        BlockKind::StatBlock
            | BlockKind::TimelineStep
            | BlockKind::IconCard
            | BlockKind::NumberedCard
    )
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn every_type_allows_a_title_or_callout() {
        for slide_type in SlideType::iter() {
            let constraints = constraints_for(slide_type);
            assert!(
                constraints.rule(BlockKind::Title).is_some()
                    || constraints.rule(BlockKind::Callout).is_some(),
                "{slide_type} has no heading block"
            );
        }
    }

    #[test]
    fn per_type_limits_stay_within_absolute_limits() {
        for slide_type in SlideType::iter() {
            let c = constraints_for(slide_type);
            assert!(c.title_max <= limits::TITLE);
            assert!(c.text_max <= limits::TEXT);
            assert!(c.max_items <= limits::BULLET_ITEMS);
            assert!(c.item_max <= limits::BULLET_ITEM);
            assert!(c.max_rows <= limits::TABLE_ROWS);
            assert!(c.max_columns <= limits::TABLE_COLUMNS);
            for rule in c.blocks {
                assert!(rule.min <= rule.max);
            }
        }
    }

    #[test]
    fn block_tables_outlive_the_lookup() {
        let tables: Vec<&'static [BlockRule]> = SlideType::iter()
            .map(|slide_type| constraints_for(slide_type).blocks)
            .collect();
        assert!(tables.iter().all(|blocks| !blocks.is_empty()));
        assert_eq!(tables.len(), SlideType::iter().count());
    }

    #[test]
    fn image_types_require_images() {
        let c = constraints_for(SlideType::TextPlusImage);
        assert_eq!(c.rule(BlockKind::Image).map(|r| r.min), Some(1));
        assert!(constraints_for(SlideType::Bullets).rule(BlockKind::Image).is_none());
    }

    #[test]
    fn density_threshold_rounds_up() {
        assert_eq!(constraints_for(SlideType::Bullets).min_chars(), Some(245));
        assert_eq!(constraints_for(SlideType::Cover).min_chars(), None);
    }
}
