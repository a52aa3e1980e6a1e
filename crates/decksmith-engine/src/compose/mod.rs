//! Outline composition stages.
//!
//! Three stages run in a fixed order on every outline:
//!
//! 1. [`compose`] ensures cover, agenda and summary slides exist exactly once.
//! 2. [`enforce_count`] trims or pads the outline to a requested slide count.
//! 3. [`enforce_distribution`] rebalances the mix of slide types.
//!
//! Each stage takes the previous stage's output by value and returns a new
//! outline.

mod composer;
mod count;
mod distribution;

pub use composer::{ComposeOptions, compose, refresh_agenda};
pub use count::enforce_count;
pub use distribution::{MAX_BULLET_LIKE, enforce_distribution};
