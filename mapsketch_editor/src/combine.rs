use crate::{DrawEngine, Feature, FeatureKind};
use anyhow::{Result, anyhow, bail, ensure};
use log::{debug, warn};
use mapsketch_geometry::{
	Geometry, LineStringGeometry, RingGeometry,
	math::normalize_winding,
	overlay::{split_polygon, union_polygons},
};

/// Geometry-combination operations: hole carving, cutting and union.
///
/// All three share the same failure semantics: unmet preconditions abort
/// silently with the editing handles regenerated, kernel failures abandon
/// the single attempt and leave the store untouched.
impl DrawEngine {
	// ── hole carving ────────────────────────────────────────────────────

	/// Carves the pending points as a hole into the selected polygon.
	///
	/// Runs on every placed point once there are three; while the user keeps
	/// extending the same hole, each new point replaces the hole carved by
	/// the previous one. The result replaces the original feature under a
	/// fresh id and stays selected.
	pub(crate) fn add_hole(&mut self) {
		if self.pending.len() < 3 {
			return;
		}
		let Some(feature) = self.store.selected_feature().cloned() else {
			warn!("hole carving requires a selected feature");
			return;
		};
		let Geometry::Polygon(mut polygon) = feature.geometry else {
			warn!("hole carving requires a polygon feature");
			return;
		};
		self.store.mark_changed();

		let mut ring = RingGeometry(self.pending.clone());
		ring.close();

		if !polygon.holes.is_empty() && self.pending.len() > 3 {
			polygon.holes.pop();
		}
		polygon.holes.push(ring);
		normalize_winding(&mut polygon);

		let replacement = Feature::new(FeatureKind::Polygon, Geometry::Polygon(polygon));
		let replacement_id = replacement.id.clone();
		if let Err(error) = self.store.remove(&feature.id) {
			warn!("hole carving lost its feature: {error}");
			return;
		}
		self.store.insert(replacement);
		if let Err(error) = self.store.select(Some(replacement_id)) {
			warn!("hole result selection failed: {error}");
		}
	}

	/// Finish hook of hole mode: drops the hole preview and brings the
	/// editing handles back.
	pub(crate) fn end_adding_holes(&mut self) {
		self.remove_preview_line();
		self.clear_pending();
		self.create_editing_vertices();
	}

	// ── cut ─────────────────────────────────────────────────────────────

	/// Finish hook of cut mode: splits the selected polygon along the
	/// pending cut line.
	///
	/// Every piece becomes a new feature with a fresh id and the original
	/// feature is deleted. Without any placed cut points the operation is
	/// aborted and the editing handles are regenerated instead.
	pub(crate) fn finish_cut(&mut self) -> Result<()> {
		// a preview line exists exactly when at least two points were placed
		if self.preview_line.is_none() {
			self.clear_pending();
			self.create_editing_vertices();
			return Ok(());
		}
		self.remove_preview_line();

		let feature = self
			.store
			.selected_feature()
			.cloned()
			.ok_or_else(|| anyhow!("cut requires a selected feature"))?;
		let Geometry::Polygon(polygon) = &feature.geometry else {
			bail!("cut requires a polygon feature");
		};

		let cut_line = LineStringGeometry(self.pending.clone());
		let pieces = split_polygon(polygon, &cut_line)?;

		self.store.mark_changed();
		self.store.remove(&feature.id)?;
		for piece in pieces {
			match piece {
				Geometry::Polygon(_) => self.store.insert(Feature::new(FeatureKind::Polygon, piece)),
				Geometry::LineString(_) => self.store.insert(Feature::new(FeatureKind::Line, piece)),
				other => debug!("discarding cut piece of type {}", other.get_type_name()),
			}
		}

		self.clear_pending();
		self.clear_editing_vertices();
		self.store.push_selection();
		Ok(())
	}

	// ── union ───────────────────────────────────────────────────────────

	/// Finish hook of union mode: merges the selected polygon with the
	/// union target.
	///
	/// The merged geometry replaces both inputs as one new feature with a
	/// fresh id, which becomes the selection. Without a chosen target the
	/// operation is a no-op.
	pub(crate) fn finish_union(&mut self) -> Result<()> {
		let Some(target_id) = self.store.union_target_id().cloned() else {
			return Ok(());
		};
		let selected = self
			.store
			.selected_feature()
			.cloned()
			.ok_or_else(|| anyhow!("union requires a selected feature"))?;
		ensure!(selected.id != target_id, "union requires two distinct features");
		let target = self
			.store
			.find(&target_id)
			.cloned()
			.ok_or_else(|| anyhow!("union target {target_id} not found"))?;

		let (Geometry::Polygon(a), Geometry::Polygon(b)) = (&selected.geometry, &target.geometry) else {
			bail!("union requires two polygon features");
		};
		let merged = union_polygons(a, b)?;

		self.store.mark_changed();
		self.store.remove(&selected.id)?;
		self.store.remove(&target_id)?;

		let feature = Feature::new(FeatureKind::Polygon, merged);
		let feature_id = feature.id.clone();
		self.store.insert(feature);
		self.store.clear_support_points();
		self.store.select(Some(feature_id))
	}
}
