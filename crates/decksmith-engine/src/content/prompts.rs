//! Prompt creation for outline, slide, shorten and split calls.

use std::fmt::Write as _;

use decksmith_core::analysis::ContentAnalysis;
use decksmith_core::block::BlockKind;
use decksmith_core::outline::Outline;
use decksmith_core::request::{GenerationRequest, TextMode};
use decksmith_core::slide::SlideType;
use decksmith_core::violation::ConstraintViolation;
use strum::IntoEnumIterator;

use crate::validate::{SlideConstraints, constraints_for};

/// Signals listed per category in prompts.
const MAX_SIGNALS: usize = 5;

fn text_mode_instruction(mode: TextMode) -> &'static str {
    match mode {
        TextMode::Generate => {
            "Treat the input as a brief. Write new, well-structured material around it."
        }
        TextMode::Condense => {
            "Condense the input. Keep its key points, figures, decisions and owners; drop repetition."
        }
        TextMode::Preserve => {
            "Preserve the input wording wherever the slide limits allow. Do not invent content."
        }
    }
}

fn request_context(request: &GenerationRequest) -> String {
    let (min_words, max_words) = request.amount.words_per_item();
    let mut context = format!(
        "Language: {}\nText handling: {}\nDensity: {} ({min_words}-{max_words} words per bullet or sentence)\n",
        request.language,
        text_mode_instruction(request.text_mode),
        request.amount,
    );
    if let Some(tone) = &request.tone {
        let _ = writeln!(context, "Tone: {tone}");
    }
    if let Some(audience) = &request.audience {
        let _ = writeln!(context, "Audience: {audience}");
    }
    if let Some(extra) = &request.extra_instructions {
        let _ = writeln!(context, "Additional instructions: {extra}");
    }
    context
}

fn analysis_summary(analysis: &ContentAnalysis) -> String {
    if analysis.is_empty() {
        return String::new();
    }

    let mut summary = String::from("Signals found in the input:\n");
    let mut section = |label: &str, items: Vec<String>| {
        if !items.is_empty() {
            let _ = writeln!(summary, "- {label}: {}", items.join("; "));
        }
    };

    section(
        "Statistics",
        analysis
            .statistics
            .iter()
            .take(MAX_SIGNALS)
            .map(|s| format!("{} {}", s.value, s.label).trim().to_string())
            .collect(),
    );
    section(
        "Quotes",
        analysis
            .quotes
            .iter()
            .take(MAX_SIGNALS)
            .map(|q| match &q.attribution {
                Some(who) => format!("\"{}\" ({who})", q.text),
                None => format!("\"{}\"", q.text),
            })
            .collect(),
    );
    section(
        "Decisions",
        analysis.decisions.iter().take(MAX_SIGNALS).cloned().collect(),
    );
    section(
        "Action items",
        analysis
            .action_items
            .iter()
            .take(MAX_SIGNALS)
            .map(|a| match &a.owner {
                Some(owner) => format!("{} ({owner})", a.task),
                None => a.task.clone(),
            })
            .collect(),
    );
    section(
        "Topics",
        analysis.topics.iter().take(MAX_SIGNALS).cloned().collect(),
    );
    section(
        "Steps",
        analysis
            .sequential_steps
            .iter()
            .take(MAX_SIGNALS)
            .cloned()
            .collect(),
    );
    section(
        "Comparisons",
        analysis
            .comparisons
            .iter()
            .take(MAX_SIGNALS)
            .map(|c| format!("{} vs {}", c.left, c.right))
            .collect(),
    );
    section(
        "Features",
        analysis
            .features
            .iter()
            .take(MAX_SIGNALS)
            .map(|f| f.title.clone())
            .collect(),
    );
    if analysis.has_roadmap {
        summary.push_str("- The input describes a plan over time.\n");
    }

    summary
}

/// Creates the system prompt for outline generation.
pub(crate) fn outline_system() -> String {
    let types: Vec<String> = SlideType::iter().map(|t| format!("  - {t}")).collect();

    format!(
        r#"You are a presentation architect. You plan slide decks from raw notes.

Return a JSON object with:
1. "title": the deck title
2. "slides": the planned slides in order, each with
   - "title": a short working title
   - "slide_type": one of the slide types below
   - "hints": up to three short content hints

## Slide types

{}

Guidelines:
- Start with exactly one "cover" slide
- Prefer visual types (stats, timeline, card_grid, comparison) when the input supports them
- Use "action_items_table" for tasks with owners and "decisions_list" for decisions
- Never plan two slides with the same title
- Titles must be specific to the content, not generic labels
- Return valid JSON only, no other text"#,
        types.join("\n")
    )
}

/// Creates the user prompt for outline generation.
pub(crate) fn outline_user(
    request: &GenerationRequest,
    analysis: &ContentAnalysis,
    slide_count: usize,
) -> String {
    format!(
        "{}Plan about {slide_count} slides.\n\n{}\n## Input\n\n{}",
        request_context(request),
        analysis_summary(analysis),
        request.input_text,
    )
}

fn structure_description(constraints: &SlideConstraints) -> String {
    let mut description = String::new();
    for rule in constraints.blocks {
        let count = if rule.min == rule.max {
            format!("exactly {}", rule.min)
        } else {
            format!("{} to {}", rule.min, rule.max)
        };
        let _ = writeln!(description, "- {count} \"{}\" block(s)", rule.kind);
    }

    let _ = writeln!(
        description,
        "- title at most {} characters",
        constraints.title_max
    );
    if constraints.rule(BlockKind::Text).is_some() || constraints.rule(BlockKind::Callout).is_some()
    {
        let _ = writeln!(
            description,
            "- text at most {} characters",
            constraints.text_max
        );
    }
    if constraints.rule(BlockKind::Bullets).is_some() {
        let _ = writeln!(
            description,
            "- at most {} bullet items of at most {} characters each",
            constraints.max_items, constraints.item_max
        );
    }
    if constraints.rule(BlockKind::Table).is_some() {
        let _ = writeln!(
            description,
            "- at most {} columns and {} rows",
            constraints.max_columns, constraints.max_rows
        );
    }
    if let Some(min_chars) = constraints.min_chars() {
        let _ = writeln!(
            description,
            "- at least {min_chars} characters of text in total"
        );
    }
    description
}

/// Creates the system prompt for slide content generation.
pub(crate) fn slide_system() -> String {
    r#"You are a presentation writer. You write the content of one slide at a time.

Return a JSON object with "blocks": an ordered array of content blocks. Every
block has a "kind" and kind-specific fields:
- title: "text"
- text: "text"
- bullets: "items" (array of strings)
- image: "url" (leave empty), "alt", optional "prompt"
- table: "columns" (header strings), "rows" (arrays of cell strings)
- callout: "text", optional "attribution"
- stat_block: "value", "label", optional "description"
- timeline_step: "title", "description", optional "date"
- icon_card: "icon", "title", "description"
- numbered_card: "number", "title", "description"

Guidelines:
- Follow the required block structure exactly
- Stay within every length limit
- If the title mentions a number of items, it must match the items shown
- Write in the requested language only
- Return valid JSON only, no other text"#
        .to_string()
}

/// Creates the user prompt for one slide.
pub(crate) fn slide_user(
    request: &GenerationRequest,
    outline: &Outline,
    index: usize,
    analysis: &ContentAnalysis,
) -> String {
    let slide = &outline.slides[index];
    let slide_type = slide.effective_type();
    let constraints = constraints_for(slide_type);

    let mut prompt = request_context(request);
    let _ = writeln!(prompt, "Deck title: {}", outline.title);
    let _ = writeln!(
        prompt,
        "Slide {} of {}: \"{}\" ({slide_type})",
        index + 1,
        outline.len(),
        slide.title
    );
    if !slide.hints.is_empty() {
        let _ = writeln!(prompt, "Hints: {}", slide.hints.join("; "));
    }

    let _ = write!(
        prompt,
        "\n## Required structure\n\n{}\n{}\n## Input\n\n{}",
        structure_description(&constraints),
        analysis_summary(analysis),
        request.input_text
    );
    prompt
}

fn violation_list(violations: &[ConstraintViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("- {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Creates the system prompt for shortening a slide.
pub(crate) fn shorten_system() -> String {
    r#"You are an editor fixing a slide that breaks its layout limits.

Return a JSON object with "blocks": the corrected blocks of the same slide.

Guidelines:
- Keep the slide type and the kinds and order of its blocks
- Fix every listed problem by rewriting, not by cutting words mid-sentence
- Keep the meaning and the language of the original
- Return valid JSON only, no other text"#
        .to_string()
}

/// Creates the user prompt for shortening a slide.
pub(crate) fn shorten_user(
    slide_json: &str,
    slide_type: SlideType,
    violations: &[ConstraintViolation],
    language: &str,
) -> String {
    format!(
        "Language: {language}\nSlide type: {slide_type}\n\n## Problems\n\n{}\n\n## Required structure\n\n{}\n## Slide\n\n{slide_json}",
        violation_list(violations),
        structure_description(&constraints_for(slide_type)),
    )
}

/// Creates the system prompt for splitting a slide.
pub(crate) fn split_system() -> String {
    r#"You are an editor splitting an overfull slide into several slides.

Return a JSON object with "slides": an array of two to four slides, each an
object with "blocks" in the same structure as the original slide.

Guidelines:
- Every slide keeps the original slide type and block structure
- Distribute the content; do not repeat it
- Give every slide its own meaningful title
- Never mark titles as continued, e.g. "(continued)" or "(cont.)"
- Keep the language of the original
- Return valid JSON only, no other text"#
        .to_string()
}

/// Creates the user prompt for splitting a slide.
pub(crate) fn split_user(
    slide_json: &str,
    slide_type: SlideType,
    violations: &[ConstraintViolation],
    language: &str,
) -> String {
    format!(
        "Language: {language}\nSlide type: {slide_type}\n\n## Problems\n\n{}\n\n## Required structure per slide\n\n{}\n## Slide\n\n{slide_json}",
        violation_list(violations),
        structure_description(&constraints_for(slide_type)),
    )
}

#[cfg(test)]
mod tests {
    use decksmith_core::analysis::Statistic;
    use decksmith_core::outline::OutlineSlide;

    use super::*;

    #[test]
    fn outline_system_lists_every_type() {
        let prompt = outline_system();
        for slide_type in SlideType::iter() {
            assert!(prompt.contains(&format!("  - {slide_type}")));
        }
    }

    #[test]
    fn slide_prompt_describes_structure() {
        let request = GenerationRequest::new("Notes");
        let outline = Outline::new(
            "Deck",
            vec![
                OutlineSlide::new("Deck", SlideType::Cover),
                OutlineSlide::new("Key figures", SlideType::Stats).with_hints(["budget"]),
            ],
        );
        let analysis = ContentAnalysis {
            statistics: vec![Statistic {
                value: "42%".into(),
                label: "growth".into(),
            }],
            ..ContentAnalysis::default()
        };

        let prompt = slide_user(&request, &outline, 1, &analysis);
        assert!(prompt.contains("Slide 2 of 2: \"Key figures\" (stats)"));
        assert!(prompt.contains("- 2 to 4 \"stat_block\" block(s)"));
        assert!(prompt.contains("Hints: budget"));
        assert!(prompt.contains("- Statistics: 42% growth"));
    }

    #[test]
    fn empty_analysis_adds_nothing() {
        assert!(analysis_summary(&ContentAnalysis::default()).is_empty());
    }
}
