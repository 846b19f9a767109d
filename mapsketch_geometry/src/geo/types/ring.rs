use super::{CompositeGeometryTrait, Coordinates, GeometryTrait};
use anyhow::{Result, ensure};
use std::fmt::Debug;

/// Represents a closed ring geometry, which is a connected series of coordinates forming a loop.
/// This structure is the building block for polygon boundaries and holes.
/// The first and last points must be identical to form a closed shape.
#[derive(Clone, PartialEq)]
pub struct RingGeometry(pub Vec<Coordinates>);

impl RingGeometry {
	/// Returns the distinct vertices of the ring, i.e. the stored coordinates
	/// without the duplicated closing point.
	#[must_use]
	pub fn vertices(&self) -> &[Coordinates] {
		let n = self.0.len();
		if n > 1 && self.0.first() == self.0.last() {
			&self.0[..n - 1]
		} else {
			&self.0
		}
	}

	/// Returns the number of distinct vertices (closing duplicate excluded).
	#[must_use]
	pub fn vertex_count(&self) -> usize {
		self.vertices().len()
	}

	/// Appends a copy of the first coordinate if the ring is not yet closed.
	pub fn close(&mut self) {
		if let Some(first) = self.0.first().copied()
			&& self.0.last() != Some(&first)
		{
			self.0.push(first);
		}
	}

	/// Reverses the coordinate order in place. A closed ring stays closed
	/// because the shared first/last point swaps with itself.
	pub fn reverse(&mut self) {
		self.0.reverse();
	}
}

impl GeometryTrait for RingGeometry {
	/// Computes the signed area of the ring using the shoelace formula.
	/// The area is positive if the ring is oriented counterclockwise,
	/// and negative if clockwise.
	fn area(&self) -> f64 {
		let mut sum = 0f64;
		if let Some(mut p2) = self.0.last() {
			for p1 in &self.0 {
				sum += (p2.x() - p1.x()) * (p1.y() + p2.y());
				p2 = p1;
			}
		}
		sum
	}

	/// Verifies that the ring is valid by checking:
	/// - It has at least 4 coordinates (3 unique points plus the closing point).
	/// - It is closed, i.e., the first and last points are identical.
	fn verify(&self) -> Result<()> {
		ensure!(self.0.len() >= 4, "Ring must have at least 4 points");
		ensure!(self.0.first() == self.0.last(), "Ring must be closed");
		Ok(())
	}

	fn contains_point(&self, x: f64, y: f64) -> bool {
		let coords = &self.0;
		if coords.len() < 4 {
			return false;
		}

		let mut inside = false;
		let mut j = coords.len() - 1;

		for i in 0..coords.len() {
			let xi = coords[i].x();
			let yi = coords[i].y();
			let xj = coords[j].x();
			let yj = coords[j].y();

			// Check if point is on the same side and crosses the ray
			if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
				inside = !inside;
			}
			j = i;
		}

		inside
	}
}

impl CompositeGeometryTrait<Coordinates> for RingGeometry {
	/// Creates a new empty ring.
	fn new() -> Self {
		Self(Vec::new())
	}
	/// Returns an immutable reference to the internal list of coordinates.
	fn as_vec(&self) -> &Vec<Coordinates> {
		&self.0
	}
	/// Returns a mutable reference to the internal list of coordinates.
	fn as_mut_vec(&mut self) -> &mut Vec<Coordinates> {
		&mut self.0
	}
	/// Consumes the ring and returns its internal list of coordinates.
	fn into_inner(self) -> Vec<Coordinates> {
		self.0
	}
}

impl Debug for RingGeometry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list().entries(&self.0).finish()
	}
}

crate::impl_from_array!(RingGeometry, Coordinates);

/// Converts a `geo::LineString<f64>` into a `RingGeometry`, preserving the order of coordinates.
impl From<geo::LineString<f64>> for RingGeometry {
	fn from(geometry: geo::LineString<f64>) -> Self {
		RingGeometry(geometry.into_iter().map(Coordinates::from).collect())
	}
}

impl From<&RingGeometry> for geo::LineString<f64> {
	fn from(ring: &RingGeometry) -> Self {
		geo::LineString::new(ring.0.iter().map(geo::Coord::from).collect())
	}
}
