//! Slide types and generated slides.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

use crate::block::{Block, BlockKind};

/// Layout category of a slide, dictating its required block structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[derive(AsRefStr, Display, EnumString, EnumIter, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SlideType {
    /// Opening slide with deck title and subtitle.
    Cover,
    /// List of the sections covered.
    Agenda,
    /// Divider introducing a new section.
    SectionHeader,
    /// Plain bullet list.
    Bullets,
    /// Two text columns.
    TwoColumnText,
    /// Two contrasted bullet lists.
    Comparison,
    /// Text next to an image.
    TextPlusImage,
    /// Key figures.
    Stats,
    /// Ordered steps or events.
    Timeline,
    /// Forward-looking milestones.
    TimelineRoadmap,
    /// Grid of icon cards.
    CardGrid,
    /// Grid of numbered cards.
    NumberedGrid,
    /// Highlighted quote or message.
    QuoteCallout,
    /// Generic table.
    Table,
    /// Table of action items with owners.
    ActionItemsTable,
    /// List of decisions taken.
    DecisionsList,
    /// Closing summary and next steps.
    SummaryNextSteps,
}

impl SlideType {
    /// Cover, agenda and summary slides maintained by the composer.
    pub fn is_structural(self) -> bool {
        matches!(self, Self::Cover | Self::Agenda | Self::SummaryNextSteps)
    }

    /// Slides that count enforcement never removes.
    pub fn is_removal_protected(self) -> bool {
        self.is_structural() || matches!(self, Self::SectionHeader | Self::QuoteCallout)
    }

    /// Slides that read as a list of lines of text.
    pub fn is_bullet_like(self) -> bool {
        matches!(
            self,
            Self::Bullets | Self::TwoColumnText | Self::DecisionsList | Self::ActionItemsTable
        )
    }

    /// Bullet-like slides whose type carries meaning and must not be upgraded.
    pub fn is_distribution_protected(self) -> bool {
        matches!(self, Self::ActionItemsTable | Self::DecisionsList)
    }

    /// Visually rich slide types.
    pub fn is_premium(self) -> bool {
        matches!(
            self,
            Self::Stats
                | Self::Timeline
                | Self::TimelineRoadmap
                | Self::CardGrid
                | Self::NumberedGrid
                | Self::Comparison
                | Self::TextPlusImage
                | Self::QuoteCallout
        )
    }

    /// Types that may receive a generated image.
    pub fn is_image_eligible(self) -> bool {
        matches!(
            self,
            Self::TextPlusImage | Self::Cover | Self::SectionHeader | Self::QuoteCallout
        )
    }

    /// Types whose block structure always contains an image.
    pub fn always_has_image(self) -> bool {
        matches!(self, Self::TextPlusImage)
    }

    /// Types whose consecutive occurrences alternate sides.
    pub fn is_alternating(self) -> bool {
        matches!(self, Self::TextPlusImage)
    }

    /// Types whose title may mention the number of items shown.
    pub fn is_countable(self) -> bool {
        matches!(
            self,
            Self::Bullets
                | Self::Stats
                | Self::Timeline
                | Self::TimelineRoadmap
                | Self::CardGrid
                | Self::NumberedGrid
                | Self::DecisionsList
                | Self::SummaryNextSteps
        )
    }
}

/// A fully populated slide.
///
/// The slide type is fixed once generated; only blocks and variant change
/// during repair and layout passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    /// Layout category.
    pub slide_type: SlideType,
    /// Presentation variant label, assigned by the layout assigner.
    #[serde(default)]
    pub variant: String,
    /// Ordered content blocks.
    pub blocks: Vec<Block>,
}

impl Slide {
    /// Creates a slide without a variant.
    pub fn new(slide_type: SlideType, blocks: Vec<Block>) -> Self {
        Self {
            slide_type,
            variant: String::new(),
            blocks,
        }
    }

    /// Text of the first title block, if any.
    pub fn title(&self) -> Option<&str> {
        self.blocks.iter().find_map(|block| match block {
            Block::Title { text } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Number of blocks of the given kind.
    pub fn count_kind(&self, kind: BlockKind) -> usize {
        self.blocks.iter().filter(|b| b.kind() == kind).count()
    }

    /// First block of the given kind.
    pub fn first_of(&self, kind: BlockKind) -> Option<&Block> {
        self.blocks.iter().find(|b| b.kind() == kind)
    }

    /// Returns true if any block is an image.
    pub fn has_image(&self) -> bool {
        self.blocks.iter().any(|b| b.kind() == BlockKind::Image)
    }

    /// Total characters over every text-bearing field.
    pub fn char_count(&self) -> usize {
        self.blocks.iter().map(Block::char_count).sum()
    }

    /// Number of countable items shown on the slide (bullets, cards, steps...).
    pub fn item_count(&self) -> usize {
        let mut count = 0;
        for block in &self.blocks {
            match block {
                Block::Bullets { items } => count += items.len(),
                Block::StatBlock { .. }
                | Block::TimelineStep { .. }
                | Block::IconCard { .. }
                | Block::NumberedCard { .. } => count += 1,
                Block::Table { rows, .. } => count += rows.len(),
                _ => {}
            }
        }
        count
    }

    /// Bullet items across every bullets block.
    pub fn bullet_items(&self) -> impl Iterator<Item = &String> {
        self.blocks.iter().flat_map(|block| match block {
            Block::Bullets { items } => items.as_slice(),
            _ => &[][..],
        })
    }
}
