use super::*;
use anyhow::{Result, bail};
use std::fmt::Debug;

/// Tagged union over all geometry variants handled by the editing engine.
#[derive(Clone, PartialEq)]
pub enum Geometry {
	Point(PointGeometry),
	LineString(LineStringGeometry),
	Polygon(PolygonGeometry),
	MultiPoint(MultiPointGeometry),
	MultiLineString(MultiLineStringGeometry),
	MultiPolygon(MultiPolygonGeometry),
}

impl Geometry {
	pub fn new_point(c: impl Into<Coordinates>) -> Self {
		Self::Point(PointGeometry(c.into()))
	}
	pub fn new_line_string(coordinates: Vec<Coordinates>) -> Self {
		Self::LineString(LineStringGeometry(coordinates))
	}
	pub fn new_polygon(outer: RingGeometry, holes: Vec<RingGeometry>) -> Self {
		Self::Polygon(PolygonGeometry::new(outer, holes))
	}
	pub fn new_multi_polygon(polygons: Vec<PolygonGeometry>) -> Self {
		Self::MultiPolygon(MultiPolygonGeometry(polygons))
	}

	#[must_use]
	pub fn get_type_name(&self) -> &str {
		match self {
			Geometry::Point(_) => "Point",
			Geometry::LineString(_) => "LineString",
			Geometry::Polygon(_) => "Polygon",
			Geometry::MultiPoint(_) => "MultiPoint",
			Geometry::MultiLineString(_) => "MultiLineString",
			Geometry::MultiPolygon(_) => "MultiPolygon",
		}
	}

	pub fn into_multi(self) -> Self {
		match self {
			Geometry::Point(g) => Geometry::MultiPoint(g.into_multi()),
			Geometry::LineString(g) => Geometry::MultiLineString(g.into_multi()),
			Geometry::Polygon(g) => Geometry::MultiPolygon(g.into_multi()),
			Geometry::MultiPoint(_) => self,
			Geometry::MultiLineString(_) => self,
			Geometry::MultiPolygon(_) => self,
		}
	}
}

impl GeometryTrait for Geometry {
	fn area(&self) -> f64 {
		match self {
			Geometry::Point(g) => g.area(),
			Geometry::LineString(g) => g.area(),
			Geometry::Polygon(g) => g.area(),
			Geometry::MultiPoint(g) => g.area(),
			Geometry::MultiLineString(g) => g.area(),
			Geometry::MultiPolygon(g) => g.area(),
		}
	}

	fn verify(&self) -> Result<()> {
		match self {
			Geometry::Point(g) => g.verify(),
			Geometry::LineString(g) => g.verify(),
			Geometry::Polygon(g) => g.verify(),
			Geometry::MultiPoint(g) => g.verify(),
			Geometry::MultiLineString(g) => g.verify(),
			Geometry::MultiPolygon(g) => g.verify(),
		}
	}

	fn contains_point(&self, x: f64, y: f64) -> bool {
		match self {
			Geometry::Point(g) => g.contains_point(x, y),
			Geometry::LineString(g) => g.contains_point(x, y),
			Geometry::Polygon(g) => g.contains_point(x, y),
			Geometry::MultiPoint(g) => g.contains_point(x, y),
			Geometry::MultiLineString(g) => g.contains_point(x, y),
			Geometry::MultiPolygon(g) => g.contains_point(x, y),
		}
	}
}

impl From<&Geometry> for geo::Geometry<f64> {
	fn from(geometry: &Geometry) -> Self {
		match geometry {
			Geometry::Point(g) => geo::Geometry::Point(g.into()),
			Geometry::LineString(g) => geo::Geometry::LineString(g.into()),
			Geometry::Polygon(g) => geo::Geometry::Polygon(g.into()),
			Geometry::MultiPoint(g) => geo::Geometry::MultiPoint(g.into()),
			Geometry::MultiLineString(g) => geo::Geometry::MultiLineString(g.into()),
			Geometry::MultiPolygon(g) => geo::Geometry::MultiPolygon(g.into()),
		}
	}
}

impl TryFrom<geo::Geometry<f64>> for Geometry {
	type Error = anyhow::Error;

	fn try_from(geometry: geo::Geometry<f64>) -> Result<Self> {
		Ok(match geometry {
			geo::Geometry::Point(g) => Geometry::Point(PointGeometry::from(g)),
			geo::Geometry::LineString(g) => Geometry::LineString(LineStringGeometry::from(g)),
			geo::Geometry::Polygon(g) => Geometry::Polygon(PolygonGeometry::from(g)),
			geo::Geometry::MultiPoint(g) => Geometry::MultiPoint(MultiPointGeometry::from(g)),
			geo::Geometry::MultiLineString(g) => Geometry::MultiLineString(MultiLineStringGeometry::from(g)),
			geo::Geometry::MultiPolygon(g) => Geometry::MultiPolygon(MultiPolygonGeometry::from(g)),
			other => bail!("unsupported geometry type '{other:?}'"),
		})
	}
}

impl Debug for Geometry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let (type_name, inner): (&str, &dyn Debug) = match self {
			Geometry::Point(g) => ("Point", g),
			Geometry::LineString(g) => ("LineString", g),
			Geometry::Polygon(g) => ("Polygon", g),
			Geometry::MultiPoint(g) => ("MultiPoint", g),
			Geometry::MultiLineString(g) => ("MultiLineString", g),
			Geometry::MultiPolygon(g) => ("MultiPolygon", g),
		};
		f.debug_tuple(type_name).field(inner).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn type_names() {
		assert_eq!(Geometry::new_point([1.0, 2.0]).get_type_name(), "Point");
		assert_eq!(
			Geometry::new_polygon(RingGeometry::from(&[[0, 0], [1, 0], [1, 1], [0, 0]]), vec![]).get_type_name(),
			"Polygon"
		);
	}

	#[test]
	fn into_multi_wraps_single_variants() {
		let point = Geometry::new_point([1.0, 2.0]);
		match point.into_multi() {
			Geometry::MultiPoint(mp) => assert_eq!(mp.0.len(), 1),
			other => panic!("expected MultiPoint, got {other:?}"),
		}
	}

	#[test]
	fn roundtrip_geo_geometry() {
		let polygon = Geometry::new_polygon(
			RingGeometry::from(&[[0, 0], [5, 0], [5, 5], [0, 5], [0, 0]]),
			vec![],
		);
		let gg = geo::Geometry::from(&polygon);
		assert_eq!(Geometry::try_from(gg).unwrap(), polygon);
	}

	#[test]
	fn unsupported_geo_variant_fails() {
		let rect = geo::Geometry::Rect(geo::Rect::new(
			geo::Coord { x: 0.0, y: 0.0 },
			geo::Coord { x: 1.0, y: 1.0 },
		));
		assert!(Geometry::try_from(rect).is_err());
	}
}
