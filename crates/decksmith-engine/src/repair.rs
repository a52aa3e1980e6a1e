//! Model-backed slide repair with deterministic fallback.

use std::collections::HashSet;

use decksmith_core::completion::{META_LANGUAGE, META_SLIDE, META_TASK, META_VIOLATIONS};
use decksmith_core::progress::{ProgressEvent, ProgressSink};
use decksmith_core::slide::Slide;
use decksmith_core::violation::{ConstraintViolation, ViolationAction};
use decksmith_core::Result;
use decksmith_rig::StructuredClient;

use crate::content::{GeneratedSlide, SplitSlides, prompts};
use crate::layout::content_variant;
use crate::validate::{Validator, fallback};

const TRACING_TARGET: &str = "decksmith_engine::repair";

/// Violations at which a split is preferred over shortening.
const SPLIT_THRESHOLD: usize = 3;

/// Allowed number of slides returned by a split.
const SPLIT_PARTS: std::ops::RangeInclusive<usize> = 2..=4;

/// Title fragments that mark a mechanical continuation.
const CONTINUATION_MARKERS: &[&str] = &[
    "continued",
    "(cont",
    "cont.)",
    "forts.",
    "fortsatt",
    "fortsettelse",
    "(2)",
    "(ii)",
    "part 2",
    "del 2",
];

/// Repair strategy for a set of violations.
pub fn strategy(violations: &[ConstraintViolation]) -> ViolationAction {
    let wants_split = violations
        .iter()
        .any(|v| v.action == ViolationAction::Split);
    if wants_split || violations.len() >= SPLIT_THRESHOLD {
        ViolationAction::Split
    } else {
        ViolationAction::Shorten
    }
}

/// Fixes slides that violate their constraints.
///
/// Each attempt either shortens the slide or splits it into two to four
/// slides, validating the model's answer before adopting it. When attempts
/// run out, the remaining violations are truncated away without the model.
/// Every returned slide has passed the block-level limit pass.
#[derive(Debug, Clone)]
pub struct RepairEngine {
    client: StructuredClient,
    validator: Validator,
    max_attempts: usize,
    progress: ProgressSink,
}

impl RepairEngine {
    pub fn new(client: StructuredClient, validator: Validator) -> Self {
        Self {
            client,
            validator,
            max_attempts: 2,
            progress: ProgressSink::disabled(),
        }
    }

    /// Sets the number of model-backed attempts per slide.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Reports repair attempts to the progress sink.
    pub fn with_progress(mut self, progress: ProgressSink) -> Self {
        self.progress = progress;
        self
    }

    /// Repairs one slide, returning one or more replacement slides.
    ///
    /// `title_hint` is used when a missing title has to be inserted.
    pub async fn repair(
        &self,
        slide_index: usize,
        title_hint: &str,
        slide: Slide,
        violations: Vec<ConstraintViolation>,
    ) -> Vec<Slide> {
        let mut current = slide;
        let mut remaining = violations;

        for attempt in 1..=self.max_attempts {
            if remaining.is_empty() {
                break;
            }

            let action = strategy(&remaining);
            self.progress.emit(ProgressEvent::Repair {
                slide_index,
                action,
                attempt,
            });
            tracing::debug!(
                target: TRACING_TARGET,
                slide_index,
                attempt,
                action = action.as_ref(),
                violations = remaining.len(),
                "Repairing slide"
            );

            match action {
                ViolationAction::Split => match self.split(&current, &remaining).await {
                    Ok(Some(parts)) => {
                        tracing::info!(
                            target: TRACING_TARGET,
                            slide_index,
                            parts = parts.len(),
                            "Slide split"
                        );
                        return parts.into_iter().map(|p| self.finish(slide_index, p)).collect();
                    }
                    Ok(None) => {}
                    Err(error) => tracing::warn!(
                        target: TRACING_TARGET,
                        slide_index,
                        attempt,
                        error = %error,
                        "Split call failed"
                    ),
                },
                _ => match self.shorten(&current, &remaining).await {
                    Ok(candidate) => {
                        let found = self.validator.validate(&candidate);
                        if found.len() < remaining.len() {
                            current = candidate;
                            remaining = found;
                        }
                    }
                    Err(error) => tracing::warn!(
                        target: TRACING_TARGET,
                        slide_index,
                        attempt,
                        error = %error,
                        "Shorten call failed"
                    ),
                },
            }
        }

        if !remaining.is_empty() {
            tracing::debug!(
                target: TRACING_TARGET,
                slide_index,
                violations = remaining.len(),
                "Applying deterministic fallback"
            );
            current = fallback::apply(current, &remaining, title_hint, self.validator.language());
        }

        vec![self.finish(slide_index, current)]
    }

    /// Clamps block limits and reports anything left over.
    fn finish(&self, slide_index: usize, mut slide: Slide) -> Slide {
        let cut = fallback::enforce_block_limits(&mut slide);
        if cut > 0 {
            tracing::warn!(
                target: TRACING_TARGET,
                slide_index,
                fields = cut,
                "Clamped fields to block limits"
            );
        }

        let residual = self.validator.validate(&slide);
        if !residual.is_empty() {
            tracing::warn!(
                target: TRACING_TARGET,
                slide_index,
                violations = residual.len(),
                first = %residual[0],
                "Slide still violates its constraints"
            );
        }
        slide
    }

    async fn shorten(&self, slide: &Slide, violations: &[ConstraintViolation]) -> Result<Slide> {
        let slide_json = serde_json::to_string(slide)?;
        let violations_json = serde_json::to_string(violations)?;
        let language = self.validator.language();

        let call = StructuredClient::call_for::<GeneratedSlide>(
            prompts::shorten_system(),
            prompts::shorten_user(&slide_json, slide.slide_type, violations, language),
        )?
        .with_metadata(META_TASK, "shorten")
        .with_metadata(META_SLIDE, slide_json.as_str())
        .with_metadata(META_VIOLATIONS, violations_json)
        .with_metadata(META_LANGUAGE, language);

        let generated: GeneratedSlide = self.client.generate(&call).await?;
        let mut candidate = Slide::new(slide.slide_type, generated.blocks);
        candidate.variant.clone_from(&slide.variant);
        Ok(candidate)
    }

    /// Asks for replacement slides; `None` if the answer is unusable.
    async fn split(
        &self,
        slide: &Slide,
        violations: &[ConstraintViolation],
    ) -> Result<Option<Vec<Slide>>> {
        let slide_json = serde_json::to_string(slide)?;
        let violations_json = serde_json::to_string(violations)?;
        let language = self.validator.language();

        let call = StructuredClient::call_for::<SplitSlides>(
            prompts::split_system(),
            prompts::split_user(&slide_json, slide.slide_type, violations, language),
        )?
        .with_metadata(META_TASK, "split")
        .with_metadata(META_SLIDE, slide_json.as_str())
        .with_metadata(META_VIOLATIONS, violations_json)
        .with_metadata(META_LANGUAGE, language);

        let answer: SplitSlides = self.client.generate(&call).await?;
        let parts: Vec<Slide> = answer
            .slides
            .into_iter()
            .map(|generated| {
                let mut part = Slide::new(slide.slide_type, generated.blocks);
                content_variant(&part).clone_into(&mut part.variant);
                part
            })
            .collect();

        match self.reject_reason(&parts) {
            Some(reason) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    parts = parts.len(),
                    reason,
                    "Split result rejected"
                );
                Ok(None)
            }
            None => Ok(Some(parts)),
        }
    }

    fn reject_reason(&self, parts: &[Slide]) -> Option<&'static str> {
        if !SPLIT_PARTS.contains(&parts.len()) {
            return Some("wrong number of slides");
        }

        let mut titles = HashSet::new();
        for part in parts {
            let Some(title) = part.title() else {
                return Some("missing title");
            };
            let lower = title.trim().to_lowercase();
            if CONTINUATION_MARKERS.iter().any(|m| lower.contains(m)) {
                return Some("continuation title");
            }
            if !titles.insert(lower) {
                return Some("duplicate title");
            }
            if !self.validator.validate(part).is_empty() {
                return Some("slide still invalid");
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use decksmith_core::block::Block;
    use decksmith_core::slide::SlideType;
    use decksmith_core::violation::FieldRef;
    use decksmith_rig::RetryPolicy;
    use decksmith_test::{MockCompletionBackend, ScriptedBackend};

    use super::*;

    fn item(i: usize) -> String {
        format!("Risk number {i} is that the vendor delivers the integration later than planned")
    }

    fn bullets(title: &str, items: Vec<String>) -> Slide {
        Slide::new(SlideType::Bullets, vec![Block::title(title), Block::bullets(items)])
    }

    fn engine(client: StructuredClient) -> RepairEngine {
        RepairEngine::new(client, Validator::new("en"))
    }

    #[test]
    fn strategy_follows_violations() {
        let v = |action| ConstraintViolation::new(FieldRef::Title, action, 1, 0, "x");
        assert_eq!(strategy(&[v(ViolationAction::Shorten)]), ViolationAction::Shorten);
        assert_eq!(
            strategy(&[v(ViolationAction::Shorten), v(ViolationAction::Split)]),
            ViolationAction::Split
        );
        assert_eq!(
            strategy(&[
                v(ViolationAction::Shorten),
                v(ViolationAction::Shorten),
                v(ViolationAction::Expand)
            ]),
            ViolationAction::Split
        );
    }

    #[tokio::test]
    async fn shorten_converges_with_the_model() {
        let backend = MockCompletionBackend::default();
        let repair = engine(StructuredClient::from_backend(backend.clone()));

        let mut items: Vec<String> = (0..4).map(item).collect();
        items.push("x".repeat(150));
        let slide = bullets("Open risks", items);
        let violations = repair.validator.validate(&slide);
        assert_eq!(strategy(&violations), ViolationAction::Shorten);

        let repaired = repair.repair(3, "Open risks", slide, violations).await;

        assert_eq!(repaired.len(), 1);
        assert!(repair.validator.validate(&repaired[0]).is_empty());
        assert_eq!(backend.calls_for("shorten"), 1);
    }

    #[tokio::test]
    async fn overfull_slides_are_split() {
        let backend = MockCompletionBackend::default();
        let (progress, mut receiver) = ProgressSink::channel(8);
        let repair = engine(StructuredClient::from_backend(backend.clone())).with_progress(progress);

        let slide = bullets("Open risks", (0..10).map(item).collect());
        let violations = repair.validator.validate(&slide);
        let parts = repair.repair(2, "Open risks", slide, violations).await;

        let titles: Vec<_> = parts.iter().filter_map(Slide::title).collect();
        assert_eq!(titles, ["Open risks: overview", "Open risks: details"]);
        assert!(parts.iter().all(|p| repair.validator.validate(p).is_empty()));
        assert!(matches!(
            receiver.try_recv(),
            Ok(ProgressEvent::Repair {
                slide_index: 2,
                action: ViolationAction::Split,
                attempt: 1
            })
        ));
    }

    #[tokio::test]
    async fn continuation_titles_fall_back_to_truncation() {
        let parts = serde_json::json!({"slides": [
            {"blocks": [{"kind": "title", "text": "Open risks"}, {"kind": "bullets", "items": (0..5).map(item).collect::<Vec<_>>()}]},
            {"blocks": [{"kind": "title", "text": "Open risks (continued)"}, {"kind": "bullets", "items": (5..10).map(item).collect::<Vec<_>>()}]}
        ]});
        let backend = ScriptedBackend::new().with_response(parts.to_string());
        let client = StructuredClient::from_backend(backend.clone()).with_retry(RetryPolicy::none());
        let repair = engine(client);

        let slide = bullets("Open risks", (0..10).map(item).collect());
        let violations = repair.validator.validate(&slide);
        let repaired = repair.repair(0, "Open risks", slide, violations).await;

        assert_eq!(repaired.len(), 1);
        assert_eq!(repaired[0].item_count(), 6);
        assert!(repair.validator.validate(&repaired[0]).is_empty());
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn failing_client_still_yields_a_valid_slide() {
        let backend = ScriptedBackend::new();
        let client = StructuredClient::from_backend(backend.clone()).with_retry(RetryPolicy::none());
        let repair = engine(client).with_max_attempts(3);

        let title = "A title that goes on and on ".repeat(5);
        let slide = bullets(&title, (0..5).map(item).collect());
        let violations = repair.validator.validate(&slide);
        assert!(!violations.is_empty());

        let repaired = repair.repair(1, "Risks", slide, violations).await;

        assert_eq!(repaired.len(), 1);
        assert!(repair.validator.validate(&repaired[0]).is_empty());
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn zero_attempts_skip_the_model() {
        let backend = ScriptedBackend::new();
        let client = StructuredClient::from_backend(backend.clone());
        let repair = engine(client).with_max_attempts(0);

        let slide = bullets("Open risks", (0..9).map(item).collect());
        let violations = repair.validator.validate(&slide);
        let repaired = repair.repair(0, "Open risks", slide, violations).await;

        assert_eq!(repaired[0].item_count(), 6);
        assert_eq!(backend.calls(), 0);
    }
}
