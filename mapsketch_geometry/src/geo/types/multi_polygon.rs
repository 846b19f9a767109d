use super::{CompositeGeometryTrait, GeometryTrait, PolygonGeometry};
use anyhow::Result;
use std::fmt::Debug;

/// Represents a collection of polygons, each of which has an outer ring and optional inner holes.
/// This struct is used for complex, multi-part areas.
#[derive(Clone, PartialEq)]
pub struct MultiPolygonGeometry(pub Vec<PolygonGeometry>);

impl MultiPolygonGeometry {
	/// Total number of distinct vertices across all parts.
	#[must_use]
	pub fn vertex_count(&self) -> usize {
		self.0.iter().map(PolygonGeometry::vertex_count).sum()
	}
}

impl GeometryTrait for MultiPolygonGeometry {
	fn area(&self) -> f64 {
		self.0.iter().map(super::traits::GeometryTrait::area).sum()
	}

	fn verify(&self) -> Result<()> {
		for polygon in &self.0 {
			polygon.verify()?;
		}
		Ok(())
	}

	fn contains_point(&self, x: f64, y: f64) -> bool {
		self.0.iter().any(|poly| poly.contains_point(x, y))
	}
}

impl CompositeGeometryTrait<PolygonGeometry> for MultiPolygonGeometry {
	fn new() -> Self {
		Self(Vec::new())
	}
	fn as_vec(&self) -> &Vec<PolygonGeometry> {
		&self.0
	}
	fn as_mut_vec(&mut self) -> &mut Vec<PolygonGeometry> {
		&mut self.0
	}
	fn into_inner(self) -> Vec<PolygonGeometry> {
		self.0
	}
}

impl Debug for MultiPolygonGeometry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list().entries(&self.0).finish()
	}
}

crate::impl_from_array!(MultiPolygonGeometry, PolygonGeometry);

impl From<geo::MultiPolygon<f64>> for MultiPolygonGeometry {
	fn from(geometry: geo::MultiPolygon<f64>) -> Self {
		MultiPolygonGeometry(geometry.into_iter().map(PolygonGeometry::from).collect())
	}
}

impl From<&MultiPolygonGeometry> for geo::MultiPolygon<f64> {
	fn from(multi: &MultiPolygonGeometry) -> Self {
		geo::MultiPolygon(multi.0.iter().map(geo::Polygon::from).collect())
	}
}
