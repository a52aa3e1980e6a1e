#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod analyzer;
mod config;
mod error;
mod pipeline;
mod repair;

pub mod compose;
pub mod content;
pub mod images;
pub mod layout;
pub mod locale;
pub mod theme;
pub mod validate;

#[doc(hidden)]
pub mod prelude;

pub use analyzer::HeuristicAnalyzer;
pub use config::{ImageConfig, PipelineConfig};
pub use error::{PipelineError, PipelineResult};
pub use pipeline::{GenerationOutput, Pipeline};
pub use repair::{RepairEngine, strategy};

/// Tracing target for the main library.
pub const TRACING_TARGET: &str = "decksmith_engine";
