//! Convenient re-exports for common use.

pub use crate::client::{NoopHandler, StreamHandler, StructuredClient};
pub use crate::config::{CompletionConfig, CompletionProviderKind, RetryPolicy};
pub use crate::provider::CompletionProvider;
pub use crate::response::JsonResponse;
