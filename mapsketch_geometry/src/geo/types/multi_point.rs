use super::{CompositeGeometryTrait, GeometryTrait, PointGeometry};
use anyhow::Result;
use std::fmt::Debug;

/// A collection of points, used when several point features are persisted as one geometry.
#[derive(Clone, PartialEq)]
pub struct MultiPointGeometry(pub Vec<PointGeometry>);

impl GeometryTrait for MultiPointGeometry {
	fn area(&self) -> f64 {
		0.0
	}

	fn verify(&self) -> Result<()> {
		for point in &self.0 {
			point.verify()?;
		}
		Ok(())
	}

	fn contains_point(&self, _x: f64, _y: f64) -> bool {
		false
	}
}

impl CompositeGeometryTrait<PointGeometry> for MultiPointGeometry {
	fn new() -> Self {
		Self(Vec::new())
	}
	fn as_vec(&self) -> &Vec<PointGeometry> {
		&self.0
	}
	fn as_mut_vec(&mut self) -> &mut Vec<PointGeometry> {
		&mut self.0
	}
	fn into_inner(self) -> Vec<PointGeometry> {
		self.0
	}
}

impl Debug for MultiPointGeometry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list().entries(&self.0).finish()
	}
}

crate::impl_from_array!(MultiPointGeometry, PointGeometry);

impl From<geo::MultiPoint<f64>> for MultiPointGeometry {
	fn from(geometry: geo::MultiPoint<f64>) -> Self {
		MultiPointGeometry(geometry.into_iter().map(PointGeometry::from).collect())
	}
}

impl From<&MultiPointGeometry> for geo::MultiPoint<f64> {
	fn from(multi: &MultiPointGeometry) -> Self {
		geo::MultiPoint(multi.0.iter().map(geo::Point::from).collect())
	}
}
