use super::{CompositeGeometryTrait, Coordinates, GeometryTrait, MultiLineStringGeometry, SingleGeometryTrait};
use anyhow::{Result, ensure};
use std::fmt::Debug;

/// Represents a sequence of connected coordinates forming a line, typically used for polylines or paths.
#[derive(Clone, PartialEq)]
pub struct LineStringGeometry(pub Vec<Coordinates>);

impl GeometryTrait for LineStringGeometry {
	/// Returns the area of the geometry.
	///
	/// For a line, this is always 0 because a line has no area.
	fn area(&self) -> f64 {
		0.0
	}

	/// Verifies the validity of the geometry.
	///
	/// Ensures that the `LineStringGeometry` has at least two points.
	fn verify(&self) -> Result<()> {
		ensure!(self.0.len() >= 2, "LineString must have at least two points");
		Ok(())
	}

	/// Lines have no interior, so this always returns `false`.
	fn contains_point(&self, _x: f64, _y: f64) -> bool {
		false
	}
}

impl CompositeGeometryTrait<Coordinates> for LineStringGeometry {
	/// Creates a new, empty `LineStringGeometry`.
	fn new() -> Self {
		Self(Vec::new())
	}
	/// Returns a reference to the internal vector of coordinates representing the points of the line.
	fn as_vec(&self) -> &Vec<Coordinates> {
		&self.0
	}
	/// Returns a mutable reference to the internal vector of coordinates representing the points of the line.
	fn as_mut_vec(&mut self) -> &mut Vec<Coordinates> {
		&mut self.0
	}
	/// Consumes the `LineStringGeometry` and returns the internal vector of coordinates.
	fn into_inner(self) -> Vec<Coordinates> {
		self.0
	}
}

impl SingleGeometryTrait<MultiLineStringGeometry> for LineStringGeometry {
	/// Converts this single line into a `MultiLineStringGeometry` containing just this one line.
	fn into_multi(self) -> MultiLineStringGeometry {
		MultiLineStringGeometry(vec![self])
	}
}

impl Debug for LineStringGeometry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list().entries(&self.0).finish()
	}
}

crate::impl_from_array!(LineStringGeometry, Coordinates);

impl From<geo::LineString<f64>> for LineStringGeometry {
	fn from(geometry: geo::LineString<f64>) -> Self {
		LineStringGeometry(geometry.into_iter().map(Coordinates::from).collect())
	}
}

impl From<&LineStringGeometry> for geo::LineString<f64> {
	fn from(line: &LineStringGeometry) -> Self {
		geo::LineString::new(line.0.iter().map(geo::Coord::from).collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn verify_needs_two_points() {
		assert!(LineStringGeometry::from(&[[0, 0]]).verify().is_err());
		assert!(LineStringGeometry::from(&[[0, 0], [1, 1]]).verify().is_ok());
	}

	#[test]
	fn roundtrip_geo_linestring() {
		let line = LineStringGeometry::from(&[[0, 0], [1, 0], [1, 1]]);
		let gl = geo::LineString::from(&line);
		assert_eq!(LineStringGeometry::from(gl), line);
	}
}
