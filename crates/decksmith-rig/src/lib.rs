#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod client;
mod config;
mod error;
mod provider;

pub mod partial;
pub mod response;
pub mod schema;

#[doc(hidden)]
pub mod prelude;

pub use client::{NoopHandler, StreamHandler, StructuredClient};
pub use config::{CompletionConfig, CompletionProviderKind, RetryPolicy};
pub use provider::CompletionProvider;

/// Tracing target for the main library.
pub const TRACING_TARGET: &str = "decksmith_rig";
