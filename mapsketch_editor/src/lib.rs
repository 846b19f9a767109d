//! The mapsketch editing engine.
//!
//! Owns the authoritative feature collections and applies every edit a user
//! makes on the map surface: drawing points, lines and shapes, moving,
//! inserting and deleting vertices, carving holes, cutting and merging
//! polygons, and recording tracks. Rendering and gesture recognition live in
//! collaborators behind the [`RenderSink`] and [`ScreenProjection`] traits.

mod combine;
mod draw;
mod feature;
mod index;
mod mutate;
mod project;
mod render;
mod store;
mod track;

pub use draw::*;
pub use feature::*;
pub use index::*;
pub use mutate::*;
pub use project::*;
pub use render::*;
pub use store::*;
pub use track::*;
