#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod client;
mod config;
mod error;

#[doc(hidden)]
pub mod prelude;

pub use client::ImageClient;
pub use config::{DEFAULT_TIMEOUT, ImageClientConfig};
pub use error::{Error, Result};

/// Tracing target for the image client.
pub const TRACING_TARGET: &str = "decksmith_reqwest";
