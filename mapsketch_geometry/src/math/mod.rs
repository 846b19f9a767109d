//! Numeric helpers for ring geometry, most importantly the winding
//! normalization applied before polygons are handed to overlay operations.

mod winding;

pub use winding::*;
