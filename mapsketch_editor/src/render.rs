use crate::{Feature, SupportPoint};
use mapsketch_geometry::Coordinates;

/// The map layers the engine publishes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditLayer {
	Points,
	Lines,
	Shapes,
	Selection,
}

/// Rendering collaborator.
///
/// Every update replaces a whole layer; there is no incremental diffing. The
/// engine pushes after each mutation, so the renderer always mirrors the
/// store.
pub trait RenderSink {
	fn replace_features(&mut self, layer: EditLayer, features: &[Feature]);
	fn replace_support_points(&mut self, points: &[SupportPoint]);
}

/// Sink that drops every update; used headless and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderSink;

impl RenderSink for NullRenderSink {
	fn replace_features(&mut self, _layer: EditLayer, _features: &[Feature]) {}
	fn replace_support_points(&mut self, _points: &[SupportPoint]) {}
}

/// Coordinate-to-screen projection supplied by the rendering collaborator.
///
/// The engine only needs the forward direction, to measure pixel distances
/// for the edge snapping threshold.
pub trait ScreenProjection {
	/// Projects a map coordinate to screen space, returning `[x, y]` pixels.
	fn to_screen(&self, coordinate: &Coordinates) -> [f64; 2];
}

/// Identity projection treating map units as pixels; used in tests and by
/// callers that work in a pre-projected coordinate space.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityProjection;

impl ScreenProjection for IdentityProjection {
	fn to_screen(&self, coordinate: &Coordinates) -> [f64; 2] {
		[coordinate.x(), coordinate.y()]
	}
}
