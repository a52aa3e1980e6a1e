//! Image generation for image-bearing slides.
//!
//! Images are requested one at a time with a pause in between. Rate-limited
//! requests back off exponentially; content-policy refusals skip the slide.
//! Temporary provider URLs are copied into object storage when a store is
//! configured.

mod orchestrator;
mod prompt;

pub use orchestrator::{ImageFailure, ImageOrchestrator, ImageReport, needs_image};
pub use prompt::{NO_TEXT, build_prompt, keywords};
