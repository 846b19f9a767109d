use crate::index::{RingRole, VertexLocator, locate};
use anyhow::{Result, bail};
use mapsketch_geometry::{Coordinates, Geometry, PolygonGeometry, RingGeometry};

/// A single vertex mutation addressed by flat index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VertexEdit {
	/// Replace the coordinate at `index`.
	Move { index: usize, coordinate: Coordinates },
	/// Insert `coordinate` immediately after `index`.
	Insert { index: usize, coordinate: Coordinates },
	/// Remove the coordinate at `index`.
	Delete { index: usize },
}

impl VertexEdit {
	fn index(&self) -> usize {
		match self {
			VertexEdit::Move { index, .. } | VertexEdit::Insert { index, .. } | VertexEdit::Delete { index } => *index,
		}
	}
}

/// Outcome of applying a [`VertexEdit`].
///
/// Deleting below the minimum vertex count is not an error; it resolves into
/// the designed fallback of deleting the whole feature (or silently dropping
/// a hole, in which case the feature comes back via `Replaced`).
#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
	Replaced(Geometry),
	DeleteFeature,
}

/// Applies a vertex edit to a geometry and returns the resulting geometry,
/// or the decision to delete the feature entirely.
///
/// Rings are re-closed after every mutation, so callers always see valid
/// closed-ring geometry. The input is never modified.
pub fn apply_edit(geometry: &Geometry, edit: &VertexEdit) -> Result<Mutation> {
	let locator = locate(geometry, edit.index())?;

	match geometry {
		Geometry::Point(_) => match edit {
			VertexEdit::Move { coordinate, .. } => Ok(Mutation::Replaced(Geometry::new_point(*coordinate))),
			VertexEdit::Insert { .. } => bail!("cannot insert a vertex into a point"),
			VertexEdit::Delete { .. } => Ok(Mutation::DeleteFeature),
		},
		Geometry::LineString(line) => {
			let mut coordinates = line.0.clone();
			match edit {
				VertexEdit::Move { coordinate, .. } => coordinates[locator.position] = *coordinate,
				VertexEdit::Insert { coordinate, .. } => coordinates.insert(locator.position + 1, *coordinate),
				VertexEdit::Delete { .. } => {
					coordinates.remove(locator.position);
					if coordinates.len() < 2 {
						return Ok(Mutation::DeleteFeature);
					}
				}
			}
			Ok(Mutation::Replaced(Geometry::new_line_string(coordinates)))
		}
		Geometry::Polygon(polygon) => match mutate_polygon(polygon, &locator, edit)? {
			Some(polygon) => Ok(Mutation::Replaced(Geometry::Polygon(polygon))),
			None => Ok(Mutation::DeleteFeature),
		},
		Geometry::MultiPolygon(multi) => {
			let mut parts = multi.0.clone();
			match mutate_polygon(&parts[locator.part], &locator, edit)? {
				Some(part) => parts[locator.part] = part,
				// a collapsed part is dropped; the remaining parts stay
				None => {
					parts.remove(locator.part);
				}
			}
			if parts.is_empty() {
				Ok(Mutation::DeleteFeature)
			} else {
				Ok(Mutation::Replaced(Geometry::new_multi_polygon(parts)))
			}
		}
		Geometry::MultiPoint(_) | Geometry::MultiLineString(_) => {
			bail!("multi geometries of points or lines are not editable")
		}
	}
}

/// Polygon rules: the outer ring degenerating deletes the polygon (`None`),
/// a hole degenerating only drops that hole.
fn mutate_polygon(polygon: &PolygonGeometry, locator: &VertexLocator, edit: &VertexEdit) -> Result<Option<PolygonGeometry>> {
	let ring = match locator.role {
		RingRole::Outer => &polygon.outer,
		RingRole::Hole(n) => &polygon.holes[n],
	};

	// work on the open vertex list, then re-close
	let mut coordinates: Vec<Coordinates> = ring.vertices().to_vec();
	let mut drop_ring = false;
	match edit {
		VertexEdit::Move { coordinate, .. } => coordinates[locator.position] = *coordinate,
		VertexEdit::Insert { coordinate, .. } => coordinates.insert(locator.position + 1, *coordinate),
		VertexEdit::Delete { .. } => {
			coordinates.remove(locator.position);
			if coordinates.len() < 3 {
				if locator.role == RingRole::Outer {
					// the outer ring cannot degenerate while holes remain;
					// the whole polygon goes, holes included
					return Ok(None);
				}
				drop_ring = true;
			}
		}
	}

	let mut updated = polygon.clone();
	match locator.role {
		RingRole::Outer => {
			let mut ring = RingGeometry(coordinates);
			ring.close();
			updated.outer = ring;
		}
		RingRole::Hole(n) => {
			if drop_ring {
				updated.holes.remove(n);
			} else {
				let mut ring = RingGeometry(coordinates);
				ring.close();
				updated.holes[n] = ring;
			}
		}
	}
	Ok(Some(updated))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::index::vertex_count;
	use mapsketch_geometry::MultiPolygonGeometry;

	fn line() -> Geometry {
		Geometry::new_line_string(vec![
			Coordinates::new(0.0, 0.0),
			Coordinates::new(1.0, 0.0),
			Coordinates::new(1.0, 1.0),
		])
	}

	fn square_with_hole() -> Geometry {
		Geometry::Polygon(PolygonGeometry::new(
			RingGeometry::from(&[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]),
			vec![RingGeometry::from(&[[2, 2], [2, 4], [4, 4], [4, 2], [2, 2]])],
		))
	}

	fn replaced(mutation: Mutation) -> Geometry {
		match mutation {
			Mutation::Replaced(geometry) => geometry,
			Mutation::DeleteFeature => panic!("expected Replaced, got DeleteFeature"),
		}
	}

	// ── move ────────────────────────────────────────────────────────────

	#[test]
	fn move_replaces_coordinate() {
		let edit = VertexEdit::Move {
			index: 1,
			coordinate: Coordinates::new(5.0, 5.0),
		};
		let geometry = replaced(apply_edit(&line(), &edit).unwrap());
		match geometry {
			Geometry::LineString(l) => assert_eq!(l.0[1], Coordinates::new(5.0, 5.0)),
			other => panic!("expected LineString, got {other:?}"),
		}
	}

	#[test]
	fn move_first_polygon_vertex_recloses_ring() {
		let edit = VertexEdit::Move {
			index: 0,
			coordinate: Coordinates::new(-1.0, -1.0),
		};
		let geometry = replaced(apply_edit(&square_with_hole(), &edit).unwrap());
		match geometry {
			Geometry::Polygon(p) => {
				assert_eq!(p.outer.0.first(), p.outer.0.last());
				assert_eq!(p.outer.0[0], Coordinates::new(-1.0, -1.0));
			}
			other => panic!("expected Polygon, got {other:?}"),
		}
	}

	// ── insert / delete inverse ─────────────────────────────────────────

	#[test]
	fn insert_then_delete_restores_ring() {
		let original = square_with_hole();
		let inserted = replaced(
			apply_edit(
				&original,
				&VertexEdit::Insert {
					index: 1,
					coordinate: Coordinates::new(10.0, 5.0),
				},
			)
			.unwrap(),
		);
		assert_eq!(vertex_count(&inserted), 9);

		let restored = replaced(apply_edit(&inserted, &VertexEdit::Delete { index: 2 }).unwrap());
		assert_eq!(restored, original);
	}

	#[test]
	fn insert_after_last_ring_vertex_recloses() {
		let edit = VertexEdit::Insert {
			index: 3,
			coordinate: Coordinates::new(-2.0, 5.0),
		};
		let geometry = replaced(apply_edit(&square_with_hole(), &edit).unwrap());
		match geometry {
			Geometry::Polygon(p) => {
				assert_eq!(p.outer.vertex_count(), 5);
				assert_eq!(p.outer.0[4], Coordinates::new(-2.0, 5.0));
				assert_eq!(p.outer.0.first(), p.outer.0.last());
			}
			other => panic!("expected Polygon, got {other:?}"),
		}
	}

	// ── minimum-count fallbacks ─────────────────────────────────────────

	#[test]
	fn deleting_two_point_line_deletes_feature() {
		let short = Geometry::new_line_string(vec![Coordinates::new(0.0, 0.0), Coordinates::new(1.0, 1.0)]);
		assert_eq!(apply_edit(&short, &VertexEdit::Delete { index: 0 }).unwrap(), Mutation::DeleteFeature);
	}

	#[test]
	fn degenerate_outer_ring_deletes_feature() {
		let triangle = Geometry::Polygon(PolygonGeometry::new(
			RingGeometry::from(&[[0, 0], [4, 0], [2, 3], [0, 0]]),
			vec![],
		));
		assert_eq!(
			apply_edit(&triangle, &VertexEdit::Delete { index: 1 }).unwrap(),
			Mutation::DeleteFeature
		);
	}

	#[test]
	fn degenerate_hole_is_dropped_feature_survives() {
		let geometry = square_with_hole();
		// delete hole vertices until only 2 distinct remain
		let geometry = replaced(apply_edit(&geometry, &VertexEdit::Delete { index: 4 }).unwrap());
		let geometry = replaced(apply_edit(&geometry, &VertexEdit::Delete { index: 4 }).unwrap());
		match geometry {
			Geometry::Polygon(p) => {
				assert!(p.holes.is_empty());
				assert_eq!(p.outer.vertex_count(), 4);
			}
			other => panic!("expected Polygon, got {other:?}"),
		}
	}

	// ── multi-polygon parts ─────────────────────────────────────────────

	#[test]
	fn collapsing_one_part_keeps_the_rest() {
		let multi = Geometry::MultiPolygon(MultiPolygonGeometry(vec![
			PolygonGeometry::from(&[[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]]),
			PolygonGeometry::from(&[[[20, 0], [25, 0], [25, 5], [20, 0]]]),
		]));
		// vertex 4 is the second part's first vertex; its ring is a triangle
		let geometry = replaced(apply_edit(&multi, &VertexEdit::Delete { index: 4 }).unwrap());
		match geometry {
			Geometry::MultiPolygon(mp) => assert_eq!(mp.0.len(), 1),
			other => panic!("expected MultiPolygon, got {other:?}"),
		}
	}

	#[test]
	fn collapsing_the_only_part_deletes_feature() {
		let multi = Geometry::MultiPolygon(MultiPolygonGeometry::from(&[[[[0, 0], [4, 0], [2, 3], [0, 0]]]]));
		assert_eq!(
			apply_edit(&multi, &VertexEdit::Delete { index: 0 }).unwrap(),
			Mutation::DeleteFeature
		);
	}

	#[test]
	fn mutating_a_specific_part_leaves_others_alone() {
		let multi = Geometry::MultiPolygon(MultiPolygonGeometry(vec![
			PolygonGeometry::from(&[[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]]),
			PolygonGeometry::from(&[[[20, 0], [25, 0], [25, 5], [20, 0]]]),
		]));
		let edit = VertexEdit::Move {
			index: 5,
			coordinate: Coordinates::new(26.0, 0.0),
		};
		let geometry = replaced(apply_edit(&multi, &edit).unwrap());
		match geometry {
			Geometry::MultiPolygon(mp) => {
				assert_eq!(mp.0[1].outer.0[1], Coordinates::new(26.0, 0.0));
				assert_eq!(mp.0[0].outer.vertex_count(), 4);
			}
			other => panic!("expected MultiPolygon, got {other:?}"),
		}
	}
}
