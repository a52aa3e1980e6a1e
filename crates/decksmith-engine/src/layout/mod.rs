//! Layout variant assignment.
//!
//! [`content_variant`] picks a variant from a slide's content alone.
//! [`LayoutContext`] runs over the finished deck in order and swaps variants
//! to avoid repeating the same arrangement and to alternate image sides.

mod context;
mod variants;

pub use context::LayoutContext;
pub use variants::{content_variant, opposite_variant, variants};
