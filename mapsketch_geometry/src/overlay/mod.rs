//! Adapters around the 2-D geometry kernel (`geo`).
//!
//! The editing engine never calls kernel algorithms directly; it goes through
//! these functions, which convert between the crate geometry types and the
//! kernel representation and turn kernel edge cases into `Result`s.

mod boolean;
mod nearest;
mod split;

pub use boolean::*;
pub use nearest::*;
pub use split::*;
