//! Convenient re-exports for common use.

pub use crate::analysis::{ContentAnalysis, ContentAnalyzer};
pub use crate::block::{Block, BlockKind};
pub use crate::completion::{CompletionBackend, CompletionCall};
pub use crate::deck::{Deck, DeckMeta};
pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::image::{GeneratedImage, ImageData, ImageProvider};
pub use crate::outline::{Outline, OutlineSlide};
pub use crate::progress::{CheckpointSink, NoopCheckpoint, ProgressEvent, ProgressSink};
pub use crate::request::{Density, GenerationRequest, ImageMode, ImageStyle, TextMode};
pub use crate::slide::{Slide, SlideType};
pub use crate::storage::ObjectStorage;
pub use crate::violation::{ConstraintViolation, FieldRef, ViolationAction};
