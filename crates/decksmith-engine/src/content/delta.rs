//! Streaming text deltas for live slide rendering.

use decksmith_core::block::BlockKind;
use decksmith_core::progress::{ContentDelta, ProgressEvent, ProgressSink};
use decksmith_rig::StreamHandler;
use serde_json::Value;

/// Turns partial-JSON snapshots of a slide into text deltas.
///
/// Only the most recently started text-bearing block is tracked. Each
/// emission carries the characters written since the previous one, so a
/// caller can append them to render a typing effect.
#[derive(Debug)]
pub struct DeltaEmitter<'a> {
    progress: &'a ProgressSink,
    slide_index: usize,
    total_slides: usize,
    block_index: Option<usize>,
    emitted: usize,
}

impl<'a> DeltaEmitter<'a> {
    pub fn new(progress: &'a ProgressSink, slide_index: usize, total_slides: usize) -> Self {
        Self {
            progress,
            slide_index,
            total_slides,
            block_index: None,
            emitted: 0,
        }
    }
}

fn field<'v>(block: &'v Value, name: &str) -> &'v str {
    block.get(name).and_then(Value::as_str).unwrap_or_default()
}

fn joined(parts: &[&str], separator: &str) -> String {
    parts
        .iter()
        .copied()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Visible text of a possibly incomplete block.
fn block_text(block: &Value) -> Option<(BlockKind, String)> {
    let kind: BlockKind = field(block, "kind").parse().ok()?;
    let text = match kind {
        BlockKind::Title | BlockKind::Text | BlockKind::Callout => field(block, "text").to_string(),
        BlockKind::Bullets => {
            let items: Vec<&str> = block
                .get("items")
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();
            items.join("\n")
        }
        BlockKind::StatBlock => joined(&[field(block, "value"), field(block, "label")], " "),
        BlockKind::TimelineStep | BlockKind::IconCard | BlockKind::NumberedCard => joined(
            &[field(block, "title"), field(block, "description")],
            "\n",
        ),
        BlockKind::Image | BlockKind::Table => return None,
    };
    Some((kind, text))
}

impl StreamHandler for DeltaEmitter<'_> {
    fn on_partial_json(&mut self, snapshot: &Value) {
        let Some(blocks) = snapshot.get("blocks").and_then(Value::as_array) else {
            return;
        };
        let Some((block_index, (block_kind, text))) = blocks
            .iter()
            .enumerate()
            .rev()
            .find_map(|(index, block)| block_text(block).map(|found| (index, found)))
        else {
            return;
        };

        if self.block_index != Some(block_index) {
            self.block_index = Some(block_index);
            self.emitted = 0;
        }

        let length = text.chars().count();
        if length <= self.emitted {
            return;
        }
        let delta: String = text.chars().skip(self.emitted).collect();
        self.emitted = length;

        self.progress.emit(ProgressEvent::Content {
            slide_index: self.slide_index,
            total_slides: self.total_slides,
            delta: Some(ContentDelta {
                block_index,
                block_kind,
                text: delta,
            }),
            slide: None,
        });
    }
}
