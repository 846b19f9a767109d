use anyhow::{Result, bail};
use mapsketch_geometry::{Coordinates, Geometry, PolygonGeometry, RingGeometry};

/// Role of a ring inside a polygon, carried explicitly so that mutations
/// never have to recover it by comparing coordinate values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RingRole {
	Outer,
	Hole(usize),
}

/// Structured address of a single editable vertex.
///
/// `part` selects the polygon of a multi-polygon (0 otherwise), `role`
/// selects the ring, and `position` is the 0-based offset inside that ring,
/// not counting the closing duplicate. For points and lines the role is
/// `Outer` and `position` equals the flat index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexLocator {
	pub part: usize,
	pub role: RingRole,
	pub position: usize,
}

/// Total number of editable vertices of a geometry.
///
/// Closing ring duplicates are not counted: a square polygon has 4 vertices,
/// and each of its holes adds its own distinct vertex count.
#[must_use]
pub fn vertex_count(geometry: &Geometry) -> usize {
	match geometry {
		Geometry::Point(_) => 1,
		Geometry::LineString(line) => line.0.len(),
		Geometry::Polygon(polygon) => polygon.vertex_count(),
		Geometry::MultiPoint(multi) => multi.0.len(),
		Geometry::MultiLineString(multi) => multi.0.iter().map(|line| line.0.len()).sum(),
		Geometry::MultiPolygon(multi) => multi.vertex_count(),
	}
}

/// Translates a flat vertex index into a structured locator.
///
/// The traversal order is fixed: a polygon is outer ring first, then each
/// hole in stored order; a multi-polygon concatenates its parts with a
/// running offset so indices stay globally unique. An out-of-range index is
/// a caller bug and fails.
pub fn locate(geometry: &Geometry, index: usize) -> Result<VertexLocator> {
	let total = vertex_count(geometry);
	if index >= total {
		bail!("vertex index {index} out of range 0..{total}");
	}

	match geometry {
		Geometry::Point(_) | Geometry::LineString(_) => Ok(VertexLocator {
			part: 0,
			role: RingRole::Outer,
			position: index,
		}),
		Geometry::Polygon(polygon) => locate_in_polygon(polygon, 0, index),
		Geometry::MultiPolygon(multi) => {
			let mut remaining = index;
			for (part, polygon) in multi.0.iter().enumerate() {
				let count = polygon.vertex_count();
				if remaining < count {
					return locate_in_polygon(polygon, part, remaining);
				}
				remaining -= count;
			}
			bail!("vertex index {index} out of range");
		}
		Geometry::MultiPoint(_) | Geometry::MultiLineString(_) => {
			bail!("multi geometries of points or lines are not editable")
		}
	}
}

fn locate_in_polygon(polygon: &PolygonGeometry, part: usize, index: usize) -> Result<VertexLocator> {
	let mut remaining = index;
	let outer_count = polygon.outer.vertex_count();
	if remaining < outer_count {
		return Ok(VertexLocator {
			part,
			role: RingRole::Outer,
			position: remaining,
		});
	}
	remaining -= outer_count;

	for (n, hole) in polygon.holes.iter().enumerate() {
		let count = hole.vertex_count();
		if remaining < count {
			return Ok(VertexLocator {
				part,
				role: RingRole::Hole(n),
				position: remaining,
			});
		}
		remaining -= count;
	}
	bail!("vertex index {index} out of range");
}

/// Looks up the coordinate a locator points at.
#[must_use]
pub fn coordinate_at(geometry: &Geometry, locator: &VertexLocator) -> Option<Coordinates> {
	match geometry {
		Geometry::Point(point) => (locator.position == 0).then_some(point.0),
		Geometry::LineString(line) => line.0.get(locator.position).copied(),
		Geometry::Polygon(polygon) => ring_at(polygon, locator.role)?.vertices().get(locator.position).copied(),
		Geometry::MultiPolygon(multi) => {
			let polygon = multi.0.get(locator.part)?;
			ring_at(polygon, locator.role)?.vertices().get(locator.position).copied()
		}
		Geometry::MultiPoint(_) | Geometry::MultiLineString(_) => None,
	}
}

fn ring_at(polygon: &PolygonGeometry, role: RingRole) -> Option<&RingGeometry> {
	match role {
		RingRole::Outer => Some(&polygon.outer),
		RingRole::Hole(n) => polygon.holes.get(n),
	}
}

/// All editable vertices of a geometry in flat-index order; the source of
/// the support-point handle overlay.
#[must_use]
pub fn vertices_in_order(geometry: &Geometry) -> Vec<Coordinates> {
	match geometry {
		Geometry::Point(point) => vec![point.0],
		Geometry::LineString(line) => line.0.clone(),
		Geometry::Polygon(polygon) => polygon_vertices(polygon),
		Geometry::MultiPoint(multi) => multi.0.iter().map(|p| p.0).collect(),
		Geometry::MultiLineString(multi) => multi.0.iter().flat_map(|line| line.0.iter().copied()).collect(),
		Geometry::MultiPolygon(multi) => multi.0.iter().flat_map(polygon_vertices).collect(),
	}
}

fn polygon_vertices(polygon: &PolygonGeometry) -> Vec<Coordinates> {
	polygon.rings().flat_map(|ring| ring.vertices().iter().copied()).collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use mapsketch_geometry::MultiPolygonGeometry;
	use rstest::rstest;

	fn polygon_with_hole() -> Geometry {
		Geometry::Polygon(PolygonGeometry::new(
			RingGeometry::from(&[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]),
			vec![RingGeometry::from(&[[2, 2], [2, 4], [4, 4], [4, 2], [2, 2]])],
		))
	}

	fn two_part_multi() -> Geometry {
		Geometry::MultiPolygon(MultiPolygonGeometry(vec![
			PolygonGeometry::from(&[[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]]),
			PolygonGeometry::from(&[[[20, 0], [25, 0], [25, 5], [20, 0]]]),
		]))
	}

	#[test]
	fn vertex_counts() {
		assert_eq!(vertex_count(&Geometry::new_point([1.0, 2.0])), 1);
		assert_eq!(vertex_count(&polygon_with_hole()), 8);
		assert_eq!(vertex_count(&two_part_multi()), 7);
	}

	#[rstest]
	#[case(0, RingRole::Outer, 0)]
	#[case(3, RingRole::Outer, 3)]
	#[case(4, RingRole::Hole(0), 0)]
	#[case(7, RingRole::Hole(0), 3)]
	fn locate_in_polygon_rings(#[case] index: usize, #[case] role: RingRole, #[case] position: usize) {
		let locator = locate(&polygon_with_hole(), index).unwrap();
		assert_eq!(locator.part, 0);
		assert_eq!(locator.role, role);
		assert_eq!(locator.position, position);
	}

	#[test]
	fn locate_crosses_multi_polygon_parts() {
		let geometry = two_part_multi();
		let locator = locate(&geometry, 4).unwrap();
		assert_eq!((locator.part, locator.role, locator.position), (1, RingRole::Outer, 0));

		let locator = locate(&geometry, 6).unwrap();
		assert_eq!((locator.part, locator.role, locator.position), (1, RingRole::Outer, 2));
	}

	#[test]
	fn locate_rejects_out_of_range() {
		assert!(locate(&polygon_with_hole(), 8).is_err());
		assert!(locate(&Geometry::new_point([0.0, 0.0]), 1).is_err());
	}

	#[test]
	fn index_round_trip_matches_traversal_order() {
		for geometry in [polygon_with_hole(), two_part_multi()] {
			let ordered = vertices_in_order(&geometry);
			assert_eq!(ordered.len(), vertex_count(&geometry));
			for (index, expected) in ordered.iter().enumerate() {
				let locator = locate(&geometry, index).unwrap();
				assert_eq!(coordinate_at(&geometry, &locator), Some(*expected));
			}
		}
	}
}
