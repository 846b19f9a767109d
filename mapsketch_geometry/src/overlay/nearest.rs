use crate::{Coordinates, Geometry};
use anyhow::{Result, bail};
use geo::{Closest, ClosestPoint};

/// Result of a nearest-point query against a feature geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Nearest {
	/// The query point lies inside an areal geometry; there is no distinct
	/// nearest boundary point.
	Within,
	/// The closest point on the geometry.
	OnBoundary(Coordinates),
}

/// Finds the point on `geometry` nearest to `coordinate`.
///
/// For polygons and multi-polygons a query point inside the shape reports
/// [`Nearest::Within`]; callers use this to reject vertex insertion into the
/// interior. For points and lines the query degenerates gracefully: a point
/// exactly on the geometry is its own nearest point.
pub fn nearest_point_on(geometry: &Geometry, coordinate: &Coordinates) -> Result<Nearest> {
	let query = geo::Point::from(*coordinate);
	let closest = match geometry {
		Geometry::Point(g) => geo::Point::from(g).closest_point(&query),
		Geometry::LineString(g) => geo::LineString::from(g).closest_point(&query),
		Geometry::Polygon(g) => geo::Polygon::from(g).closest_point(&query),
		Geometry::MultiPoint(g) => geo::MultiPoint::from(g).closest_point(&query),
		Geometry::MultiLineString(g) => geo::MultiLineString::from(g).closest_point(&query),
		Geometry::MultiPolygon(g) => geo::MultiPolygon::from(g).closest_point(&query),
	};

	Ok(match closest {
		Closest::Intersection(p) => match geometry {
			Geometry::Polygon(_) | Geometry::MultiPolygon(_) => Nearest::Within,
			_ => Nearest::OnBoundary(Coordinates::from(p)),
		},
		Closest::SinglePoint(p) => Nearest::OnBoundary(Coordinates::from(p)),
		Closest::Indeterminate => bail!("nearest point is indeterminate for an empty geometry"),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::RingGeometry;

	fn square() -> Geometry {
		Geometry::new_polygon(RingGeometry::from(&[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]), vec![])
	}

	#[test]
	fn tap_inside_polygon_is_within() {
		let nearest = nearest_point_on(&square(), &Coordinates::new(5.0, 5.0)).unwrap();
		assert_eq!(nearest, Nearest::Within);
	}

	#[test]
	fn tap_outside_polygon_snaps_to_boundary() {
		let nearest = nearest_point_on(&square(), &Coordinates::new(5.0, 12.0)).unwrap();
		assert_eq!(nearest, Nearest::OnBoundary(Coordinates::new(5.0, 10.0)));
	}

	#[test]
	fn tap_near_line_snaps_to_line() {
		let line = Geometry::new_line_string(vec![Coordinates::new(0.0, 0.0), Coordinates::new(10.0, 0.0)]);
		let nearest = nearest_point_on(&line, &Coordinates::new(4.0, 3.0)).unwrap();
		assert_eq!(nearest, Nearest::OnBoundary(Coordinates::new(4.0, 0.0)));
	}

	#[test]
	fn tap_on_line_is_its_own_nearest_point() {
		let line = Geometry::new_line_string(vec![Coordinates::new(0.0, 0.0), Coordinates::new(10.0, 0.0)]);
		let nearest = nearest_point_on(&line, &Coordinates::new(4.0, 0.0)).unwrap();
		assert_eq!(nearest, Nearest::OnBoundary(Coordinates::new(4.0, 0.0)));
	}
}
