use mapsketch_geometry::{Coordinates, Geometry};
use std::fmt::{self, Display};
use uuid::Uuid;

/// Opaque unique feature identifier.
///
/// Assigned once at creation and never reused; every lookup, replacement and
/// deletion goes through id equality, never through value or array position.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FeatureId(String);

impl FeatureId {
	/// Generates a fresh random identifier.
	#[must_use]
	pub fn random() -> Self {
		Self(Uuid::new_v4().to_string())
	}

	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Display for FeatureId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// The collection a feature belongs to.
///
/// `TempPolygon` marks the in-progress shape preview; it lives in the polygon
/// collection but is promoted to `Polygon` (with a fresh id) when drawing
/// finishes and is never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeatureKind {
	Point,
	Line,
	Polygon,
	TempPolygon,
}

/// An identified geometry, the unit of selection and persistence.
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
	pub id: FeatureId,
	pub kind: FeatureKind,
	pub geometry: Geometry,
}

impl Feature {
	/// Creates a feature with a fresh random id.
	#[must_use]
	pub fn new(kind: FeatureKind, geometry: Geometry) -> Self {
		Self {
			id: FeatureId::random(),
			kind,
			geometry,
		}
	}
}

/// A transient vertex handle shown while editing.
///
/// Support points are derived from the selected feature's geometry and
/// regenerated wholesale after every edit; they are never part of the
/// persistent collections. `index` is the flat vertex index the handle
/// addresses and `current` marks the actively dragged handle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SupportPoint {
	pub coordinate: Coordinates,
	pub index: usize,
	pub current: bool,
}

impl SupportPoint {
	#[must_use]
	pub fn new(coordinate: Coordinates, index: usize) -> Self {
		Self {
			coordinate,
			index,
			current: false,
		}
	}
}
