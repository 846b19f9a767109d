//! Well-known-text interface of the `mapsketch_geometry` crate.
//!
//! Edited geometry is persisted as a WKT string and loaded back from one.
//! The writer rounds coordinates to a configurable number of decimal digits
//! (14 by default, trailing zeros trimmed); the reader accepts all six
//! geometry types with arbitrary whitespace.

mod parse;
mod stringify;

pub use parse::*;
pub use stringify::*;
