//! Test doubles for the provider traits in decksmith-core.

mod checkpoint;
mod completion;
mod content;
mod image;
mod rewrite;
mod scripted;

pub use checkpoint::{Checkpoint, RecordingCheckpoint};
pub use completion::{MockCompletionBackend, MockCompletionConfig};
pub use image::{MemoryStorage, MockImageProvider};
pub use scripted::ScriptedBackend;
