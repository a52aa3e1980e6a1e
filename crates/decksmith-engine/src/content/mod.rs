//! Model-backed outline and slide content generation.

mod delta;
mod generator;
pub(crate) mod prompts;

pub use delta::DeltaEmitter;
pub use generator::{ContentGenerator, GeneratedSlide, SplitSlides, generate_outline};
