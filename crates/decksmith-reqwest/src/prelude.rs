//! Convenient re-exports for common use.

pub use crate::client::ImageClient;
pub use crate::config::ImageClientConfig;
