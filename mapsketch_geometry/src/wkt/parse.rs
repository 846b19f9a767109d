use crate::{
	Coordinates, Geometry, GeometryTrait, LineStringGeometry, MultiLineStringGeometry, MultiPointGeometry,
	MultiPolygonGeometry, PointGeometry, PolygonGeometry, RingGeometry,
};
use anyhow::{Result, anyhow, bail};
use std::str;

/// Parses a well-known-text string into a [`Geometry`].
///
/// All six geometry types are accepted, as well as the `EMPTY` form for the
/// multi-geometries. The parsed geometry is verified before it is returned,
/// so an unclosed polygon ring or a one-point line string is an error.
pub fn parse_wkt(input: &str) -> Result<Geometry> {
	let mut scanner = WktScanner::new(input);
	let keyword = scanner.read_keyword()?;

	let geometry = match keyword.as_str() {
		"POINT" => Geometry::Point(PointGeometry(parse_point_text(&mut scanner)?)),
		"LINESTRING" => Geometry::LineString(LineStringGeometry(parse_coordinate_list(&mut scanner)?)),
		"POLYGON" => Geometry::Polygon(parse_polygon_text(&mut scanner)?),
		"MULTIPOINT" => Geometry::MultiPoint(parse_multi_point_text(&mut scanner)?),
		"MULTILINESTRING" => Geometry::MultiLineString(parse_multi_line_text(&mut scanner)?),
		"MULTIPOLYGON" => Geometry::MultiPolygon(parse_multi_polygon_text(&mut scanner)?),
		_ => bail!("unknown geometry type '{keyword}'"),
	};

	scanner.skip_whitespace();
	if let Some(c) = scanner.peek() {
		return Err(scanner.format_error(&format!("unexpected trailing character '{}'", c as char)));
	}

	geometry.verify()?;
	Ok(geometry)
}

fn parse_point_text(scanner: &mut WktScanner) -> Result<Coordinates> {
	if scanner.take_empty_tag()? {
		bail!("empty points are not supported");
	}
	scanner.expect_byte(b'(')?;
	let coordinate = parse_coordinate(scanner)?;
	scanner.expect_byte(b')')?;
	Ok(coordinate)
}

fn parse_polygon_text(scanner: &mut WktScanner) -> Result<PolygonGeometry> {
	let rings = parse_ring_list(scanner)?;
	let mut rings = rings.into_iter();
	let outer = rings.next().ok_or_else(|| anyhow!("polygon must have an outer ring"))?;
	Ok(PolygonGeometry::new(outer, rings.collect()))
}

fn parse_multi_point_text(scanner: &mut WktScanner) -> Result<MultiPointGeometry> {
	if scanner.take_empty_tag()? {
		return Ok(MultiPointGeometry(Vec::new()));
	}
	let mut points = Vec::new();
	scanner.expect_byte(b'(')?;
	loop {
		scanner.skip_whitespace();
		// both `(1 2)` and the bare `1 2` entry form are in circulation
		let coordinate = if scanner.peek() == Some(b'(') {
			scanner.expect_byte(b'(')?;
			let c = parse_coordinate(scanner)?;
			scanner.expect_byte(b')')?;
			c
		} else {
			parse_coordinate(scanner)?
		};
		points.push(PointGeometry(coordinate));
		if !scanner.take_separator()? {
			break;
		}
	}
	scanner.expect_byte(b')')?;
	Ok(MultiPointGeometry(points))
}

fn parse_multi_line_text(scanner: &mut WktScanner) -> Result<MultiLineStringGeometry> {
	if scanner.take_empty_tag()? {
		return Ok(MultiLineStringGeometry(Vec::new()));
	}
	let mut lines = Vec::new();
	scanner.expect_byte(b'(')?;
	loop {
		lines.push(LineStringGeometry(parse_coordinate_list(scanner)?));
		if !scanner.take_separator()? {
			break;
		}
	}
	scanner.expect_byte(b')')?;
	Ok(MultiLineStringGeometry(lines))
}

fn parse_multi_polygon_text(scanner: &mut WktScanner) -> Result<MultiPolygonGeometry> {
	if scanner.take_empty_tag()? {
		return Ok(MultiPolygonGeometry(Vec::new()));
	}
	let mut polygons = Vec::new();
	scanner.expect_byte(b'(')?;
	loop {
		polygons.push(parse_polygon_text(scanner)?);
		if !scanner.take_separator()? {
			break;
		}
	}
	scanner.expect_byte(b')')?;
	Ok(MultiPolygonGeometry(polygons))
}

fn parse_ring_list(scanner: &mut WktScanner) -> Result<Vec<RingGeometry>> {
	let mut rings = Vec::new();
	scanner.expect_byte(b'(')?;
	loop {
		rings.push(RingGeometry(parse_coordinate_list(scanner)?));
		if !scanner.take_separator()? {
			break;
		}
	}
	scanner.expect_byte(b')')?;
	Ok(rings)
}

fn parse_coordinate_list(scanner: &mut WktScanner) -> Result<Vec<Coordinates>> {
	let mut coordinates = Vec::new();
	scanner.expect_byte(b'(')?;
	loop {
		coordinates.push(parse_coordinate(scanner)?);
		if !scanner.take_separator()? {
			break;
		}
	}
	scanner.expect_byte(b')')?;
	Ok(coordinates)
}

fn parse_coordinate(scanner: &mut WktScanner) -> Result<Coordinates> {
	let x = scanner.read_number()?;
	let y = scanner.read_number()?;
	Ok(Coordinates::new(x, y))
}

/// Byte-level scanner over a WKT string, tracking the position for error messages.
struct WktScanner<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> WktScanner<'a> {
	fn new(input: &'a str) -> Self {
		Self {
			bytes: input.as_bytes(),
			pos: 0,
		}
	}

	fn peek(&self) -> Option<u8> {
		self.bytes.get(self.pos).copied()
	}

	fn skip_whitespace(&mut self) {
		while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
			self.pos += 1;
		}
	}

	fn expect_byte(&mut self, expected: u8) -> Result<()> {
		self.skip_whitespace();
		match self.peek() {
			Some(b) if b == expected => {
				self.pos += 1;
				Ok(())
			}
			Some(b) => Err(self.format_error(&format!("expected '{}', but got '{}'", expected as char, b as char))),
			None => Err(self.format_error(&format!("expected '{}', but input ended", expected as char))),
		}
	}

	/// Consumes a `,` separator if present. Returns `false` when the next
	/// significant character ends the current list instead.
	fn take_separator(&mut self) -> Result<bool> {
		self.skip_whitespace();
		match self.peek() {
			Some(b',') => {
				self.pos += 1;
				Ok(true)
			}
			Some(b')') => Ok(false),
			Some(b) => Err(self.format_error(&format!("expected ',' or ')', but got '{}'", b as char))),
			None => Err(self.format_error("expected ',' or ')', but input ended")),
		}
	}

	/// Consumes the `EMPTY` tag if it is next.
	fn take_empty_tag(&mut self) -> Result<bool> {
		self.skip_whitespace();
		if self.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
			let keyword = self.read_keyword()?;
			if keyword == "EMPTY" {
				return Ok(true);
			}
			return Err(self.format_error(&format!("unexpected keyword '{keyword}'")));
		}
		Ok(false)
	}

	fn read_keyword(&mut self) -> Result<String> {
		self.skip_whitespace();
		let start = self.pos;
		while self.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
			self.pos += 1;
		}
		if start == self.pos {
			return Err(self.format_error("expected a keyword"));
		}
		Ok(
			str::from_utf8(&self.bytes[start..self.pos])
				.map_err(|_| self.format_error("keyword is not valid utf-8"))?
				.to_ascii_uppercase(),
		)
	}

	fn read_number(&mut self) -> Result<f64> {
		self.skip_whitespace();
		let start = self.pos;
		while self
			.peek()
			.is_some_and(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
		{
			self.pos += 1;
		}
		if start == self.pos {
			return Err(self.format_error("expected a number"));
		}
		str::from_utf8(&self.bytes[start..self.pos])
			.ok()
			.and_then(|text| text.parse::<f64>().ok())
			.ok_or_else(|| self.format_error("invalid number"))
	}

	fn format_error(&self, message: &str) -> anyhow::Error {
		anyhow!("{message} at position {}", self.pos)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::wkt::stringify_wkt;
	use rstest::rstest;

	#[test]
	fn parse_multi_point_both_entry_forms() -> Result<()> {
		let a = parse_wkt("MULTIPOINT ((1 2), (3 4))")?;
		let b = parse_wkt("MULTIPOINT (1 2, 3 4)")?;
		assert_eq!(a, b);

		match a {
			Geometry::MultiPoint(mp) => assert_eq!(mp.0.len(), 2),
			other => panic!("expected MultiPoint, got {other:?}"),
		}
		Ok(())
	}

	#[test]
	fn parse_multi_line_string() -> Result<()> {
		let geometry = parse_wkt("MULTILINESTRING ((0 0, 1 0, 1 1), (5 5, 6 6))")?;
		match geometry {
			Geometry::MultiLineString(ml) => {
				assert_eq!(ml.0.len(), 2);
				assert_eq!(ml.0[0].0.len(), 3);
			}
			other => panic!("expected MultiLineString, got {other:?}"),
		}
		Ok(())
	}

	#[test]
	fn parse_multi_polygon_with_hole() -> Result<()> {
		let geometry = parse_wkt("MULTIPOLYGON (((0 0, 4 0, 4 4, 0 4, 0 0), (1 1, 1 2, 2 2, 2 1, 1 1)))")?;
		match geometry {
			Geometry::MultiPolygon(mp) => {
				assert_eq!(mp.0.len(), 1);
				assert_eq!(mp.0[0].holes.len(), 1);
			}
			other => panic!("expected MultiPolygon, got {other:?}"),
		}
		Ok(())
	}

	#[test]
	fn parse_empty_multi_geometries() -> Result<()> {
		assert_eq!(parse_wkt("MULTIPOINT EMPTY")?, Geometry::MultiPoint(MultiPointGeometry(vec![])));
		assert_eq!(
			parse_wkt("MULTIPOLYGON EMPTY")?,
			Geometry::MultiPolygon(MultiPolygonGeometry(vec![]))
		);
		Ok(())
	}

	#[test]
	fn parse_accepts_lowercase_and_whitespace() -> Result<()> {
		let geometry = parse_wkt("  point\n( 1.5   -2.25 ) ")?;
		assert_eq!(geometry, Geometry::new_point([1.5, -2.25]));
		Ok(())
	}

	#[rstest]
	#[case("")]
	#[case("CIRCLE (0 0)")]
	#[case("POINT (1)")]
	#[case("POINT EMPTY")]
	#[case("LINESTRING (0 0, 1 1")]
	#[case("LINESTRING (0 0)")]
	#[case("POINT (1 2) junk")]
	// an unclosed ring fails verification
	#[case("POLYGON ((0 0, 1 0, 1 1, 0 1))")]
	fn parse_rejects_malformed_input(#[case] wkt: &str) {
		assert!(parse_wkt(wkt).is_err());
	}

	#[test]
	fn roundtrip_through_stringify() -> Result<()> {
		let wkt = "MULTIPOLYGON (((0 0, 4 0, 4 4, 0 4, 0 0), (1 1, 1 2, 2 2, 2 1, 1 1)), ((10 10, 12 10, 12 12, 10 10)))";
		let geometry = parse_wkt(wkt)?;
		assert_eq!(stringify_wkt(&geometry, Some(14)), wkt);
		Ok(())
	}
}
