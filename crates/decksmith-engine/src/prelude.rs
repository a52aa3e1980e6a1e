//! Convenient re-exports for common use.

pub use crate::analyzer::HeuristicAnalyzer;
pub use crate::config::{ImageConfig, PipelineConfig};
pub use crate::error::{PipelineError, PipelineResult};
pub use crate::images::{ImageOrchestrator, ImageReport};
pub use crate::pipeline::{GenerationOutput, Pipeline};
pub use crate::theme::Theme;
