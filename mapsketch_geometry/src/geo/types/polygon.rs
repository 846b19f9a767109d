use super::*;
use anyhow::{Result, ensure};
use std::fmt::Debug;

/// A polygon with one outer boundary ring and any number of interior hole rings.
///
/// The ring role is carried structurally: `outer` is always the boundary and
/// `holes` are always interior rings. Code never has to recover the role of a
/// ring by comparing coordinate values.
#[derive(Clone, PartialEq)]
pub struct PolygonGeometry {
	pub outer: RingGeometry,
	pub holes: Vec<RingGeometry>,
}

impl PolygonGeometry {
	#[must_use]
	pub fn new(outer: RingGeometry, holes: Vec<RingGeometry>) -> Self {
		Self { outer, holes }
	}

	/// Iterates over all rings, outer ring first, then holes in stored order.
	pub fn rings(&self) -> impl Iterator<Item = &RingGeometry> {
		std::iter::once(&self.outer).chain(self.holes.iter())
	}

	/// Total number of distinct vertices across the outer ring and all holes.
	#[must_use]
	pub fn vertex_count(&self) -> usize {
		self.rings().map(RingGeometry::vertex_count).sum()
	}
}

impl GeometryTrait for PolygonGeometry {
	/// Signed area of the polygon. With canonical winding (holes wound
	/// opposite to the outer ring) the negative hole areas subtract the hole
	/// surface from the outer ring's area.
	fn area(&self) -> f64 {
		let mut sum = self.outer.area();
		for hole in &self.holes {
			sum += hole.area();
		}
		sum
	}

	fn verify(&self) -> Result<()> {
		ensure!(!self.outer.is_empty(), "Polygon must have an outer ring");
		self.outer.verify()?;
		for hole in &self.holes {
			hole.verify()?;
		}
		Ok(())
	}

	/// A point is inside the polygon if it is inside the outer ring and
	/// outside every hole.
	fn contains_point(&self, x: f64, y: f64) -> bool {
		self.outer.contains_point(x, y) && !self.holes.iter().any(|hole| hole.contains_point(x, y))
	}
}

impl SingleGeometryTrait<MultiPolygonGeometry> for PolygonGeometry {
	fn into_multi(self) -> MultiPolygonGeometry {
		MultiPolygonGeometry(vec![self])
	}
}

impl Debug for PolygonGeometry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list().entries(self.rings()).finish()
	}
}

/// Builds a polygon from a list of rings; the first ring becomes the outer
/// boundary, all following rings become holes.
impl<T> From<Vec<T>> for PolygonGeometry
where
	RingGeometry: From<T>,
{
	fn from(value: Vec<T>) -> Self {
		let mut rings = value.into_iter().map(RingGeometry::from);
		let outer = rings.next().unwrap_or_else(|| RingGeometry(Vec::new()));
		PolygonGeometry {
			outer,
			holes: rings.collect(),
		}
	}
}

impl<'a, T, const N: usize> From<&'a [T; N]> for PolygonGeometry
where
	RingGeometry: From<&'a T>,
{
	fn from(value: &'a [T; N]) -> Self {
		let mut rings = value.iter().map(RingGeometry::from);
		let outer = rings.next().unwrap_or_else(|| RingGeometry(Vec::new()));
		PolygonGeometry {
			outer,
			holes: rings.collect(),
		}
	}
}

impl From<geo::Polygon<f64>> for PolygonGeometry {
	fn from(geometry: geo::Polygon<f64>) -> Self {
		let (exterior, interiors) = geometry.into_inner();
		PolygonGeometry {
			outer: RingGeometry::from(exterior),
			holes: interiors.into_iter().map(RingGeometry::from).collect(),
		}
	}
}

impl From<&PolygonGeometry> for geo::Polygon<f64> {
	fn from(polygon: &PolygonGeometry) -> Self {
		geo::Polygon::new(
			geo::LineString::from(&polygon.outer),
			polygon.holes.iter().map(geo::LineString::from).collect(),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn square_with_hole() -> PolygonGeometry {
		PolygonGeometry::from(&[
			[[0, 0], [5, 0], [5, 5], [0, 5], [0, 0]],
			[[1, 1], [1, 2], [2, 2], [2, 1], [1, 1]],
		])
	}

	#[test]
	fn area_subtracts_holes() {
		let polygon = PolygonGeometry::from(&[[[0, 0], [5, 0], [5, 5], [0, 5], [0, 0]]]);
		assert_eq!(polygon.area(), 50.0);

		// hole wound opposite to the outer ring
		assert_eq!(square_with_hole().area(), 48.0);
	}

	#[test]
	fn verify_checks_all_rings() {
		assert!(square_with_hole().verify().is_ok());

		let broken = PolygonGeometry::from(vec![
			vec![[0.0, 0.0], [5.0, 0.0], [5.0, 5.0], [0.0, 5.0], [0.0, 0.0]],
			vec![[1.0, 1.0], [2.0, 2.0], [1.0, 1.0]],
		]);
		assert!(broken.verify().is_err());
	}

	#[test]
	fn contains_point_respects_holes() {
		let polygon = square_with_hole();
		assert!(polygon.contains_point(4.0, 4.0));
		assert!(!polygon.contains_point(1.5, 1.5));
		assert!(!polygon.contains_point(-1.0, 0.0));
	}

	#[test]
	fn vertex_count_sums_rings() {
		assert_eq!(square_with_hole().vertex_count(), 8);
	}

	#[test]
	fn roundtrip_geo_polygon() {
		let polygon = square_with_hole();
		let gp = geo::Polygon::from(&polygon);
		assert_eq!(gp.interiors().len(), 1);
		let back = PolygonGeometry::from(gp);
		assert_eq!(back, polygon);
	}
}
