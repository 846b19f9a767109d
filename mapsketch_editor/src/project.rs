use crate::{Feature, ScreenProjection};
use anyhow::Result;
use mapsketch_geometry::{Coordinates, Geometry, PolygonGeometry, overlay::{Nearest, nearest_point_on}};

/// Finds where a tapped coordinate should enter a feature's boundary.
///
/// Returns the flat vertex index after which the new vertex belongs and the
/// coordinate to insert: the tap is snapped onto the boundary when its screen
/// distance to the nearest boundary point is below `threshold` pixels,
/// otherwise the raw tap location is used.
///
/// Returns `None` when the tap lands strictly inside a polygon interior or
/// no boundary segment brackets the projected point; the caller rejects the
/// insertion (e.g. by showing a notice).
pub fn find_vertex_on(
	feature: &Feature,
	tap: &Coordinates,
	threshold: f64,
	projection: &dyn ScreenProjection,
) -> Result<Option<(usize, Coordinates)>> {
	let on_boundary = match nearest_point_on(&feature.geometry, tap)? {
		Nearest::Within => return Ok(None),
		Nearest::OnBoundary(p) => p,
	};

	let d = screen_distance(projection, &on_boundary, tap);
	let vertex = if d < threshold { on_boundary } else { *tap };

	Ok(insertion_index(&feature.geometry, &on_boundary).map(|index| (index, vertex)))
}

fn screen_distance(projection: &dyn ScreenProjection, a: &Coordinates, b: &Coordinates) -> f64 {
	let pa = projection.to_screen(a);
	let pb = projection.to_screen(b);
	((pa[0] - pb[0]).powi(2) + (pa[1] - pb[1]).powi(2)).sqrt()
}

/// Scans the feature's boundary segments in flat-index order and returns the
/// index of the first segment bracketing `p` with the minimal cross product.
///
/// The cross product measures how far `p` sits off the segment's carrier
/// line; the bracket test keeps only segments whose bounding box contains
/// `p` on both axes. The first minimal match wins, scanning in ring order
/// with a running offset so the result is a flat vertex index.
fn insertion_index(geometry: &Geometry, p: &Coordinates) -> Option<usize> {
	let mut best: Option<(f64, usize)> = None;
	let mut offset = 0usize;

	match geometry {
		Geometry::LineString(line) => scan_segments(&line.0, p, offset, &mut best),
		Geometry::Polygon(polygon) => scan_polygon(polygon, p, &mut offset, &mut best),
		Geometry::MultiPolygon(multi) => {
			for polygon in &multi.0 {
				scan_polygon(polygon, p, &mut offset, &mut best);
			}
		}
		// points and non-editable multi geometries have no boundary segments
		_ => {}
	}

	best.map(|(_, index)| index)
}

fn scan_polygon(polygon: &PolygonGeometry, p: &Coordinates, offset: &mut usize, best: &mut Option<(f64, usize)>) {
	for ring in polygon.rings() {
		// the stored ring is closed, so consecutive pairs already include
		// the segment from the last vertex back to the first
		scan_segments(&ring.0, p, *offset, best);
		*offset += ring.vertex_count();
	}
}

fn scan_segments(coordinates: &[Coordinates], p: &Coordinates, offset: usize, best: &mut Option<(f64, usize)>) {
	for (i, pair) in coordinates.windows(2).enumerate() {
		let (a, b) = (&pair[0], &pair[1]);
		let cross = ((p.x() - a.x()) * (b.y() - a.y()) - (p.y() - a.y()) * (b.x() - a.x())).abs();
		let brackets_x = (a.x() <= p.x() && p.x() <= b.x()) || (a.x() >= p.x() && p.x() >= b.x());
		let brackets_y = (a.y() <= p.y() && p.y() <= b.y()) || (a.y() >= p.y() && p.y() >= b.y());
		if brackets_x && brackets_y && best.is_none_or(|(min, _)| cross < min) {
			*best = Some((cross, offset + i));
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{FeatureKind, IdentityProjection};
	use mapsketch_geometry::RingGeometry;

	fn square_feature() -> Feature {
		Feature::new(
			FeatureKind::Polygon,
			Geometry::Polygon(PolygonGeometry::new(
				RingGeometry::from(&[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]),
				vec![],
			)),
		)
	}

	#[test]
	fn tap_near_edge_snaps_onto_boundary() {
		let feature = square_feature();
		let tap = Coordinates::new(5.0, -0.5);
		let (index, vertex) = find_vertex_on(&feature, &tap, 2.0, &IdentityProjection)
			.unwrap()
			.expect("expected a vertex");
		assert_eq!(index, 0);
		assert_eq!(vertex, Coordinates::new(5.0, 0.0));
	}

	#[test]
	fn tap_far_from_edge_keeps_raw_location() {
		let feature = square_feature();
		let tap = Coordinates::new(5.0, -4.0);
		let (index, vertex) = find_vertex_on(&feature, &tap, 2.0, &IdentityProjection)
			.unwrap()
			.expect("expected a vertex");
		assert_eq!(index, 0);
		assert_eq!(vertex, tap);
	}

	#[test]
	fn tap_inside_polygon_is_rejected() {
		let feature = square_feature();
		let tap = Coordinates::new(5.0, 5.0);
		assert_eq!(find_vertex_on(&feature, &tap, 2.0, &IdentityProjection).unwrap(), None);
	}

	#[test]
	fn closing_segment_gets_last_vertex_index() {
		let feature = square_feature();
		// nearest boundary point lies on the segment from (0,10) back to (0,0)
		let tap = Coordinates::new(-0.5, 5.0);
		let (index, vertex) = find_vertex_on(&feature, &tap, 2.0, &IdentityProjection)
			.unwrap()
			.expect("expected a vertex");
		assert_eq!(index, 3);
		assert_eq!(vertex, Coordinates::new(0.0, 5.0));
	}

	#[test]
	fn hole_segments_continue_the_flat_index() {
		let feature = Feature::new(
			FeatureKind::Polygon,
			Geometry::Polygon(PolygonGeometry::new(
				RingGeometry::from(&[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]),
				vec![RingGeometry::from(&[[4, 4], [4, 6], [6, 6], [6, 4], [4, 4]])],
			)),
		);
		// tap inside the hole, nearest to its left wall
		let tap = Coordinates::new(4.2, 5.0);
		let (index, vertex) = find_vertex_on(&feature, &tap, 2.0, &IdentityProjection)
			.unwrap()
			.expect("expected a vertex");
		assert_eq!(index, 4);
		assert_eq!(vertex, Coordinates::new(4.0, 5.0));
	}

	#[test]
	fn line_feature_uses_its_own_segments() {
		let feature = Feature::new(
			FeatureKind::Line,
			Geometry::new_line_string(vec![
				Coordinates::new(0.0, 0.0),
				Coordinates::new(10.0, 0.0),
				Coordinates::new(10.0, 10.0),
			]),
		);
		let tap = Coordinates::new(10.5, 5.0);
		let (index, vertex) = find_vertex_on(&feature, &tap, 2.0, &IdentityProjection)
			.unwrap()
			.expect("expected a vertex");
		assert_eq!(index, 1);
		assert_eq!(vertex, Coordinates::new(10.0, 5.0));
	}
}
