use crate::{
	CompositeGeometryTrait, Coordinates, Geometry, GeometryTrait, LineStringGeometry, PolygonGeometry, RingGeometry,
	math::normalize_winding,
};
use anyhow::{Result, anyhow, ensure};
use geo::algorithm::line_intersection::{LineIntersection, line_intersection};
use log::debug;
use std::collections::{HashMap, HashSet};

/// Quantization scale for snapping noded endpoints (1e-7 deg ≈ 1 cm at the equator).
const QUANT_SCALE: f64 = 1e7;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
struct QuantPoint(i64, i64);

type EdgeSet = HashSet<(QuantPoint, QuantPoint)>;
type PointMap = HashMap<QuantPoint, Coordinates>;

fn quantize(c: &Coordinates) -> QuantPoint {
	QuantPoint(
		(c.x() * QUANT_SCALE).round() as i64,
		(c.y() * QUANT_SCALE).round() as i64,
	)
}

fn edge_key(a: QuantPoint, b: QuantPoint) -> (QuantPoint, QuantPoint) {
	if a <= b { (a, b) } else { (b, a) }
}

/// Splits a polygon along an open cut polyline.
///
/// The polygon boundary and the cut line are noded against each other, cut
/// tails that do not reach the boundary are pruned, and the faces of the
/// resulting planar arrangement become the pieces. Faces that merely retrace
/// an original hole are artifacts and are discarded; holes untouched by the
/// cut are re-attached to the piece that contains them.
///
/// A cut line that never crosses the boundary yields the original polygon as
/// the only piece.
pub fn split_polygon(polygon: &PolygonGeometry, cut: &LineStringGeometry) -> Result<Vec<Geometry>> {
	polygon.verify()?;
	ensure!(cut.0.len() >= 2, "Cut line must have at least two points");

	// 1. gather raw segments from all rings and the cut line
	let mut segments: Vec<(Coordinates, Coordinates)> = Vec::new();
	for ring in polygon.rings() {
		collect_segments(&ring.0, &mut segments);
	}
	collect_segments(&cut.0, &mut segments);

	// 2. node the segments against each other and prune dangling cut tails
	let (mut edges, points) = node_segments(&segments);
	prune_dangling(&mut edges);
	ensure!(!edges.is_empty(), "cut produced no polygonizable edges");

	// 3. trace the faces of the planar arrangement
	let faces = trace_faces(&edges, &points)?;
	debug!("traced {} faces from {} noded edges", faces.len(), edges.len());

	// bounded faces are traced counterclockwise and have positive area
	let mut shells: Vec<RingGeometry> = Vec::new();
	for face in faces {
		let mut ring = RingGeometry(face);
		ring.close();
		if ring.vertex_count() >= 3 && ring.area() > 0.0 {
			shells.push(ring);
		}
	}

	// 4. drop hole artifacts: a face equal to an original hole ring, or a
	// face lying inside a hole that the cut line sliced through
	let hole_keys: Vec<EdgeSet> = polygon.holes.iter().map(|hole| ring_edge_set(hole)).collect();
	shells.retain(|shell| {
		let key = ring_edge_set(shell);
		if hole_keys.contains(&key) {
			return false;
		}
		let sample = interior_sample(shell);
		polygon.contains_point(sample.x(), sample.y())
	});
	ensure!(!shells.is_empty(), "cut produced no polygons");

	// 5. re-attach holes the cut did not touch to the piece containing them
	let mut pieces: Vec<PolygonGeometry> = shells
		.into_iter()
		.map(|outer| PolygonGeometry::new(outer, Vec::new()))
		.collect();
	for hole in &polygon.holes {
		if !ring_edge_set(hole).is_subset(&edges) {
			continue; // hole was sliced, its remnants are already part of the faces
		}
		if let Some(first) = hole.first()
			&& let Some(piece) = pieces.iter_mut().find(|p| p.outer.contains_point(first.x(), first.y()))
		{
			piece.holes.push(hole.clone());
		}
	}

	Ok(pieces
		.into_iter()
		.map(|mut piece| {
			normalize_winding(&mut piece);
			Geometry::Polygon(piece)
		})
		.collect())
}

/// Appends the consecutive coordinate pairs of a path to `segments`.
fn collect_segments(path: &[Coordinates], segments: &mut Vec<(Coordinates, Coordinates)>) {
	for pair in path.windows(2) {
		segments.push((pair[0], pair[1]));
	}
}

/// Subdivides every segment at its intersections with all other segments and
/// returns the resulting edge set together with the quantized-point lookup.
fn node_segments(segments: &[(Coordinates, Coordinates)]) -> (EdgeSet, PointMap) {
	let mut edges = EdgeSet::new();
	let mut points = PointMap::new();

	let lines: Vec<geo::Line<f64>> = segments
		.iter()
		.map(|(a, b)| geo::Line::new(geo::Coord::from(a), geo::Coord::from(b)))
		.collect();

	for (i, (a, b)) in segments.iter().enumerate() {
		let mut cuts: Vec<Coordinates> = vec![*a, *b];
		for (j, other) in lines.iter().enumerate() {
			if i == j {
				continue;
			}
			match line_intersection(lines[i], *other) {
				Some(LineIntersection::SinglePoint { intersection, .. }) => {
					cuts.push(Coordinates::from(intersection));
				}
				Some(LineIntersection::Collinear { intersection }) => {
					cuts.push(Coordinates::from(intersection.start));
					cuts.push(Coordinates::from(intersection.end));
				}
				None => {}
			}
		}

		// order the split points along the segment
		let dx = b.x() - a.x();
		let dy = b.y() - a.y();
		cuts.sort_by(|p, q| {
			let tp = (p.x() - a.x()) * dx + (p.y() - a.y()) * dy;
			let tq = (q.x() - a.x()) * dx + (q.y() - a.y()) * dy;
			tp.total_cmp(&tq)
		});

		let mut prev: Option<QuantPoint> = None;
		for cut in cuts {
			let q = quantize(&cut);
			points.entry(q).or_insert(cut);
			if let Some(p) = prev
				&& p != q
			{
				edges.insert(edge_key(p, q));
			}
			prev = Some(q);
		}
	}

	(edges, points)
}

/// Iteratively removes edges hanging off degree-1 nodes. Cut-line tails that
/// do not reach the polygon boundary disappear here.
fn prune_dangling(edges: &mut EdgeSet) {
	loop {
		let mut degree: HashMap<QuantPoint, usize> = HashMap::new();
		for &(a, b) in edges.iter() {
			*degree.entry(a).or_insert(0) += 1;
			*degree.entry(b).or_insert(0) += 1;
		}
		let dangling: Vec<(QuantPoint, QuantPoint)> = edges
			.iter()
			.filter(|(a, b)| degree[a] < 2 || degree[b] < 2)
			.copied()
			.collect();
		if dangling.is_empty() {
			return;
		}
		for edge in dangling {
			edges.remove(&edge);
		}
	}
}

/// Walks every face of the planar arrangement exactly once.
///
/// At each node the outgoing edges are ordered by angle; continuing with the
/// clockwise-next edge after the reversed incoming edge traces every bounded
/// face counterclockwise and the unbounded face clockwise.
fn trace_faces(edges: &EdgeSet, points: &PointMap) -> Result<Vec<Vec<Coordinates>>> {
	let mut adjacency: HashMap<QuantPoint, Vec<QuantPoint>> = HashMap::new();
	for &(a, b) in edges.iter() {
		adjacency.entry(a).or_default().push(b);
		adjacency.entry(b).or_default().push(a);
	}
	for (node, neighbors) in &mut adjacency {
		neighbors.sort_by(|p, q| {
			let ap = ((p.1 - node.1) as f64).atan2((p.0 - node.0) as f64);
			let aq = ((q.1 - node.1) as f64).atan2((q.0 - node.0) as f64);
			ap.total_cmp(&aq)
		});
	}

	// deterministic starting order
	let mut directed: Vec<(QuantPoint, QuantPoint)> = Vec::with_capacity(edges.len() * 2);
	for &(a, b) in edges.iter() {
		directed.push((a, b));
		directed.push((b, a));
	}
	directed.sort_unstable();

	let mut visited: HashSet<(QuantPoint, QuantPoint)> = HashSet::new();
	let mut faces = Vec::new();

	for &start in &directed {
		if visited.contains(&start) {
			continue;
		}
		let mut face = Vec::new();
		let (mut u, mut v) = start;
		loop {
			visited.insert((u, v));
			face.push(*points.get(&u).ok_or_else(|| anyhow!("missing noded point"))?);

			let neighbors = adjacency.get(&v).ok_or_else(|| anyhow!("broken adjacency"))?;
			let idx = neighbors
				.iter()
				.position(|&n| n == u)
				.ok_or_else(|| anyhow!("broken adjacency"))?;
			let next = neighbors[(idx + neighbors.len() - 1) % neighbors.len()];

			(u, v) = (v, next);
			if (u, v) == start {
				break;
			}
		}
		faces.push(face);
	}

	Ok(faces)
}

/// The undirected, quantized segment set of a ring; equal sets mean the same
/// ring regardless of direction or starting point.
fn ring_edge_set(ring: &RingGeometry) -> EdgeSet {
	let mut set = EdgeSet::new();
	for pair in ring.0.windows(2) {
		let a = quantize(&pair[0]);
		let b = quantize(&pair[1]);
		if a != b {
			set.insert(edge_key(a, b));
		}
	}
	set
}

/// A point slightly inside a counterclockwise ring: the midpoint of its
/// longest edge nudged towards the interior.
fn interior_sample(ring: &RingGeometry) -> Coordinates {
	let mut best: Option<(f64, Coordinates, Coordinates)> = None;
	for pair in ring.0.windows(2) {
		let len2 = (pair[1].x() - pair[0].x()).powi(2) + (pair[1].y() - pair[0].y()).powi(2);
		if best.as_ref().is_none_or(|(l, _, _)| len2 > *l) {
			best = Some((len2, pair[0], pair[1]));
		}
	}
	let Some((len2, a, b)) = best else {
		return Coordinates::new(0.0, 0.0);
	};
	let len = len2.sqrt();
	if len == 0.0 {
		return a;
	}
	// the interior lies to the left of a counterclockwise edge
	let eps = len * 1e-6;
	let nx = -(b.y() - a.y()) / len;
	let ny = (b.x() - a.x()) / len;
	Coordinates::new(
		(a.x() + b.x()) / 2.0 + nx * eps,
		(a.y() + b.y()) / 2.0 + ny * eps,
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_abs_diff_eq;

	fn square() -> PolygonGeometry {
		PolygonGeometry::new(
			RingGeometry::from(&[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]),
			vec![],
		)
	}

	fn cut(points: &[[f64; 2]]) -> LineStringGeometry {
		LineStringGeometry(points.iter().map(Coordinates::from).collect())
	}

	/// Pieces come back canonical (all outer rings the same winding), so the
	/// magnitude of the summed signed areas is comparable to the input.
	fn total_area(pieces: &[Geometry]) -> f64 {
		pieces.iter().map(GeometryTrait::area).sum::<f64>().abs()
	}

	#[test]
	fn vertical_cut_splits_square_in_two() {
		let pieces = split_polygon(&square(), &cut(&[[4.0, -2.0], [4.0, 12.0]])).unwrap();
		assert_eq!(pieces.len(), 2);
		assert_abs_diff_eq!(total_area(&pieces), square().area().abs(), epsilon = 1e-9);

		for piece in &pieces {
			match piece {
				Geometry::Polygon(p) => assert!(p.verify().is_ok()),
				other => panic!("expected Polygon, got {other:?}"),
			}
		}
	}

	#[test]
	fn cut_outside_returns_original_polygon() {
		let pieces = split_polygon(&square(), &cut(&[[20.0, 0.0], [20.0, 10.0]])).unwrap();
		assert_eq!(pieces.len(), 1);
		assert_abs_diff_eq!(total_area(&pieces), square().area().abs(), epsilon = 1e-9);
	}

	#[test]
	fn cut_not_crossing_keeps_polygon_whole() {
		// the tail pokes into the square but never crosses through
		let pieces = split_polygon(&square(), &cut(&[[5.0, -2.0], [5.0, 5.0]])).unwrap();
		assert_eq!(pieces.len(), 1);
		assert_abs_diff_eq!(total_area(&pieces), square().area().abs(), epsilon = 1e-9);
	}

	#[test]
	fn cut_through_hole_splits_hole_walls() {
		let polygon = PolygonGeometry::new(
			RingGeometry::from(&[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]),
			vec![RingGeometry::from(&[[4, 4], [4, 6], [6, 6], [6, 4], [4, 4]])],
		);
		let pieces = split_polygon(&polygon, &cut(&[[5.0, -2.0], [5.0, 12.0]])).unwrap();

		assert_eq!(pieces.len(), 2);
		// hole interior faces are artifacts and must not survive
		assert_abs_diff_eq!(total_area(&pieces), polygon.area().abs(), epsilon = 1e-9);
	}

	#[test]
	fn untouched_hole_is_reattached_to_its_piece() {
		let polygon = PolygonGeometry::new(
			RingGeometry::from(&[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]),
			vec![RingGeometry::from(&[[4, 4], [4, 6], [6, 6], [6, 4], [4, 4]])],
		);
		let pieces = split_polygon(&polygon, &cut(&[[2.0, -2.0], [2.0, 12.0]])).unwrap();

		assert_eq!(pieces.len(), 2);
		assert_abs_diff_eq!(total_area(&pieces), polygon.area().abs(), epsilon = 1e-9);

		let with_hole: Vec<&PolygonGeometry> = pieces
			.iter()
			.filter_map(|g| match g {
				Geometry::Polygon(p) if !p.holes.is_empty() => Some(p),
				_ => None,
			})
			.collect();
		assert_eq!(with_hole.len(), 1);
		assert_eq!(with_hole[0].holes[0].vertex_count(), 4);
	}

	#[test]
	fn cut_with_single_point_is_rejected() {
		assert!(split_polygon(&square(), &cut(&[[5.0, 5.0]])).is_err());
	}
}
