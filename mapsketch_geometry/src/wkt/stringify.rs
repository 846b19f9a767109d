use crate::{Coordinates, Geometry, LineStringGeometry, MultiPolygonGeometry, PolygonGeometry, RingGeometry};

/// Decimal digits used when persisting geometry.
pub const WKT_PRECISION: u8 = 14;

/// Serializes a geometry as well-known text.
///
/// With a precision, coordinate values are rounded to that many decimal
/// digits and trailing zeros are trimmed, so `1.50000` is written as `1.5`.
pub fn stringify_wkt(geometry: &Geometry, precision: Option<u8>) -> String {
	match geometry {
		Geometry::Point(g) => format!("POINT ({})", format_coordinate(&g.0, precision)),
		Geometry::LineString(g) => format!("LINESTRING {}", line_text(g, precision)),
		Geometry::Polygon(g) => format!("POLYGON {}", polygon_text(g, precision)),
		Geometry::MultiPoint(g) => {
			if g.0.is_empty() {
				return "MULTIPOINT EMPTY".to_string();
			}
			let points = g
				.0
				.iter()
				.map(|p| format!("({})", format_coordinate(&p.0, precision)))
				.collect::<Vec<_>>()
				.join(", ");
			format!("MULTIPOINT ({points})")
		}
		Geometry::MultiLineString(g) => {
			if g.0.is_empty() {
				return "MULTILINESTRING EMPTY".to_string();
			}
			let lines = g.0.iter().map(|l| line_text(l, precision)).collect::<Vec<_>>().join(", ");
			format!("MULTILINESTRING ({lines})")
		}
		Geometry::MultiPolygon(g) => stringify_multi_polygon(g, precision),
	}
}

fn stringify_multi_polygon(multi: &MultiPolygonGeometry, precision: Option<u8>) -> String {
	if multi.0.is_empty() {
		return "MULTIPOLYGON EMPTY".to_string();
	}
	let polygons = multi
		.0
		.iter()
		.map(|p| polygon_text(p, precision))
		.collect::<Vec<_>>()
		.join(", ");
	format!("MULTIPOLYGON ({polygons})")
}

fn line_text(line: &LineStringGeometry, precision: Option<u8>) -> String {
	coordinate_list(&line.0, precision)
}

fn ring_text(ring: &RingGeometry, precision: Option<u8>) -> String {
	coordinate_list(&ring.0, precision)
}

fn polygon_text(polygon: &PolygonGeometry, precision: Option<u8>) -> String {
	let rings = polygon
		.rings()
		.map(|r| ring_text(r, precision))
		.collect::<Vec<_>>()
		.join(", ");
	format!("({rings})")
}

fn coordinate_list(coordinates: &[Coordinates], precision: Option<u8>) -> String {
	let entries = coordinates
		.iter()
		.map(|c| format_coordinate(c, precision))
		.collect::<Vec<_>>()
		.join(", ");
	format!("({entries})")
}

fn format_coordinate(c: &Coordinates, precision: Option<u8>) -> String {
	format!("{} {}", format_value(c.x(), precision), format_value(c.y(), precision))
}

fn format_value(value: f64, precision: Option<u8>) -> String {
	let Some(precision) = precision else {
		return format!("{value}");
	};
	let text = format!("{:.*}", precision as usize, value);
	if !text.contains('.') {
		return text;
	}
	let trimmed = text.trim_end_matches('0').trim_end_matches('.');
	if trimmed == "-0" {
		"0".to_string()
	} else {
		trimmed.to_string()
	}
}
