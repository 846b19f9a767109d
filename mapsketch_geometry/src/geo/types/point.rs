use super::{Coordinates, GeometryTrait, MultiPointGeometry, traits};
use std::fmt::Debug;
use traits::SingleGeometryTrait;

/// Represents a single geographic point defined by x and y coordinates.
///
/// This is the simplest geometric type and is often used as a building block for more complex geometries.
#[derive(Clone, PartialEq)]
pub struct PointGeometry(pub Coordinates);

impl PointGeometry {
	/// Constructs a new `PointGeometry` from a `Coordinates` instance.
	#[must_use]
	pub fn new(c: Coordinates) -> Self {
		Self(c)
	}
	/// Returns the x component of the point.
	#[must_use]
	pub fn x(&self) -> f64 {
		self.0.x()
	}
	/// Returns the y component of the point.
	#[must_use]
	pub fn y(&self) -> f64 {
		self.0.y()
	}
	/// Returns a reference to the underlying `Coordinates`.
	#[must_use]
	pub fn as_coord(&self) -> &Coordinates {
		&self.0
	}
}

impl GeometryTrait for PointGeometry {
	/// Returns the area of the point, which is always 0 because points have no area.
	fn area(&self) -> f64 {
		0.0
	}

	/// Verifies the validity of the point.
	/// Always succeeds because a point is always valid.
	fn verify(&self) -> anyhow::Result<()> {
		Ok(())
	}

	/// Points cannot contain other points, so this always returns `false`.
	fn contains_point(&self, _x: f64, _y: f64) -> bool {
		false
	}
}

impl SingleGeometryTrait<MultiPointGeometry> for PointGeometry {
	/// Wraps this single point into a `MultiPointGeometry`.
	fn into_multi(self) -> MultiPointGeometry {
		MultiPointGeometry(vec![self])
	}
}

impl Debug for PointGeometry {
	/// Formats the point as `[x, y]` for readability.
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.0.fmt(f)
	}
}

impl<T> From<T> for PointGeometry
where
	Coordinates: From<T>,
{
	fn from(value: T) -> Self {
		PointGeometry(Coordinates::from(value))
	}
}

impl From<&PointGeometry> for geo::Point {
	fn from(value: &PointGeometry) -> Self {
		geo::Point::new(value.x(), value.y())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn accessors() {
		let p = PointGeometry::from([3.0, 4.0]);
		assert_eq!(p.x(), 3.0);
		assert_eq!(p.y(), 4.0);
		assert_eq!(p.as_coord(), &Coordinates::new(3.0, 4.0));
	}

	#[test]
	fn verify_always_ok() {
		assert!(PointGeometry::from([0.0, 0.0]).verify().is_ok());
	}

	#[test]
	fn roundtrip_geo_point() {
		let p = PointGeometry::from([3.0, 4.0]);
		let gp = geo::Point::from(&p);
		assert_eq!(PointGeometry::from(gp), p);
	}
}
