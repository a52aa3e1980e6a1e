//! Slide validation and deterministic repair.
//!
//! [`Validator`] reports [`ConstraintViolation`]s for a slide; the
//! [`fallback`] functions resolve them without a model and always terminate.
//!
//! [`ConstraintViolation`]: decksmith_core::violation::ConstraintViolation

mod constraints;
mod validator;

pub mod fallback;

pub use constraints::{
    BlockRule, MIN_DENSITY_PERCENT, SlideConstraints, constraints_for, is_repeated_kind, limits,
};
pub use validator::Validator;
