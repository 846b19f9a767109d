use crate::{GeometryTrait, MultiPolygonGeometry, PolygonGeometry};

/// Rewinds the rings of a polygon into canonical orientation.
///
/// The signed area convention follows the screen coordinate space the editor
/// works in, where the y axis points down: a canonical outer ring has
/// non-positive area under [`RingGeometry::area`](crate::RingGeometry) and
/// every hole the opposite sign. Rings that do not match are reversed in
/// place. Overlay operations are sensitive to ring winding, so this runs
/// after hole carving, after a freshly drawn polygon is closed, and on every
/// polygon a kernel operation produces.
///
/// Normalizing an already canonical polygon is a no-op.
pub fn normalize_winding(polygon: &mut PolygonGeometry) {
	if polygon.outer.area() > 0.0 {
		polygon.outer.reverse();
	}
	for hole in &mut polygon.holes {
		if hole.area() < 0.0 {
			hole.reverse();
		}
	}
}

/// Applies [`normalize_winding`] to every part of a multi-polygon.
pub fn normalize_winding_multi(multi: &mut MultiPolygonGeometry) {
	for polygon in &mut multi.0 {
		normalize_winding(polygon);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::RingGeometry;

	fn canonical() -> PolygonGeometry {
		PolygonGeometry::new(
			RingGeometry::from(&[[0, 0], [0, 10], [10, 10], [10, 0], [0, 0]]),
			vec![RingGeometry::from(&[[2, 2], [4, 2], [4, 4], [2, 4], [2, 2]])],
		)
	}

	#[test]
	fn canonical_polygon_is_untouched() {
		let polygon = canonical();
		assert!(polygon.outer.area() < 0.0);
		assert!(polygon.holes[0].area() > 0.0);

		let mut normalized = polygon.clone();
		normalize_winding(&mut normalized);
		assert_eq!(normalized, polygon);
	}

	#[test]
	fn reversed_rings_are_rewound() {
		let mut reversed = canonical();
		reversed.outer.reverse();
		reversed.holes[0].reverse();

		normalize_winding(&mut reversed);
		assert_eq!(reversed, canonical());
	}

	#[test]
	fn normalization_is_idempotent() {
		let mut polygon = canonical();
		polygon.outer.reverse();

		normalize_winding(&mut polygon);
		let once = polygon.clone();
		normalize_winding(&mut polygon);
		assert_eq!(polygon, once);
	}

	#[test]
	fn multi_polygon_parts_are_normalized() {
		let mut part = canonical();
		part.outer.reverse();
		let mut multi = MultiPolygonGeometry(vec![part]);

		normalize_winding_multi(&mut multi);
		assert_eq!(multi.0[0], canonical());
	}
}
