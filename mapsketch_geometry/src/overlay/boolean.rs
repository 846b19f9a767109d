use crate::{Geometry, GeometryTrait, MultiPolygonGeometry, PolygonGeometry, math::normalize_winding};
use anyhow::{Result, ensure};
use geo::BooleanOps;
use geo::algorithm::orient::{Direction, Orient};

/// Merges two polygons into one geometry using the kernel's boolean union.
///
/// Overlapping or touching inputs produce a single polygon; disjoint inputs
/// come back as a multi-polygon. Both inputs are validated first so that a
/// malformed ring fails the operation instead of producing garbage.
pub fn union_polygons(a: &PolygonGeometry, b: &PolygonGeometry) -> Result<Geometry> {
	a.verify()?;
	b.verify()?;

	// the kernel expects OGC winding, which is not the editor's canonical one
	let merged = geo::Polygon::from(a)
		.orient(Direction::Default)
		.union(&geo::Polygon::from(b).orient(Direction::Default));
	ensure!(!merged.0.is_empty(), "union produced no geometry");

	let mut polygons: Vec<PolygonGeometry> = merged.into_iter().map(PolygonGeometry::from).collect();
	for polygon in &mut polygons {
		normalize_winding(polygon);
	}

	Ok(if polygons.len() == 1 {
		Geometry::Polygon(polygons.remove(0))
	} else {
		Geometry::MultiPolygon(MultiPolygonGeometry(polygons))
	})
}
