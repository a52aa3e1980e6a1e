#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for core types.
pub const TRACING_TARGET: &str = "decksmith_core";

/// Tracing target for progress delivery.
pub const TRACING_TARGET_PROGRESS: &str = "decksmith_core::progress";

mod error;

pub mod analysis;
pub mod block;
pub mod completion;
pub mod deck;
pub mod image;
pub mod outline;
pub mod progress;
pub mod request;
pub mod slide;
pub mod storage;
pub mod violation;

#[doc(hidden)]
pub mod prelude;

pub use error::{BoxedError, Error, ErrorKind, Result};
