//! Line representation and validation.
//!
//! This module provides the read-only description of a serial production
//! line: M stations with exponential service rates, separated by M - 1
//! finite buffers. The [`Line`] struct is the input to both the exact
//! two-station solver and the decomposition engine.

mod types;
mod validate;

pub use types::{Buffer, Line, Station};
pub use validate::validate_line;
