use crate::{
	Feature, FeatureId, FeatureKind, FeatureStore, Mutation, ReadinessGate, RenderSink, ScreenProjection, SupportPoint,
	VertexEdit,
	index::vertices_in_order,
	mutate,
	project::find_vertex_on,
};
use anyhow::{Result, anyhow};
use log::{debug, warn};
use mapsketch_geometry::{Coordinates, Geometry, GeometryTrait, LineStringGeometry, RingGeometry, math::normalize_winding};

/// Width in pixels of the area under the finger used for edge snapping.
const TAP_AREA_WIDTH: f64 = 20.0;

/// The active drawing or editing mode. Exactly one mode is active at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawMode {
	None,
	AddPoint,
	AddLine,
	AddShape,
	AddTrack,
	EditAddVertex,
	AddHole,
	Cut,
	Union,
}

/// The interactive editing engine.
///
/// Wraps the [`FeatureStore`] with the draw-mode state machine: taps create
/// vertices, long-press drags move them, and finishing a mode runs its
/// completion hook (shape promotion, hole carving, cutting, union).
pub struct DrawEngine {
	pub(crate) store: FeatureStore,
	pub(crate) mode: DrawMode,
	pub(crate) pending: Vec<Coordinates>,
	pub(crate) preview_line: Option<FeatureId>,
	pub(crate) temp_shape: Option<FeatureId>,
	pub(crate) editing: bool,
	pub(crate) track_created: bool,
	pub(crate) gate: ReadinessGate,
	tap_area_width: f64,
}

impl DrawEngine {
	#[must_use]
	pub fn new(sink: Box<dyn RenderSink>) -> Self {
		Self {
			store: FeatureStore::new(sink),
			mode: DrawMode::None,
			pending: Vec::new(),
			preview_line: None,
			temp_shape: None,
			editing: false,
			track_created: false,
			gate: ReadinessGate::new(),
			tap_area_width: TAP_AREA_WIDTH,
		}
	}

	/// One-time setup once the rendering sources exist. Opens the readiness
	/// gate that track-derived feature creation waits on.
	pub fn prepare(&mut self) {
		self.store.select(None).ok();
		self.store.clear_support_points();
		self.gate.open();
	}

	#[must_use]
	pub fn store(&self) -> &FeatureStore {
		&self.store
	}

	#[must_use]
	pub fn mode(&self) -> DrawMode {
		self.mode
	}

	#[must_use]
	pub fn is_editing(&self) -> bool {
		self.editing
	}

	#[must_use]
	pub fn is_geometry_changed(&self) -> bool {
		self.store.is_changed()
	}

	/// Loads previously persisted WKT geometry into the store.
	pub fn load_wkt(&mut self, wkt: &str) -> Result<()> {
		self.store.load_wkt(wkt)
	}

	// ── mode switching ──────────────────────────────────────────────────

	/// Switches to a new mode, finishing the current one first. Selecting
	/// the active mode again just finishes it.
	pub fn change_mode(&mut self, new_mode: DrawMode) {
		debug!("change mode {:?} -> {:?}", self.mode, new_mode);
		if new_mode == self.mode {
			self.stop_draw_mode();
		} else {
			self.stop_draw_mode();
			self.start_draw_mode(new_mode);
		}
	}

	fn start_draw_mode(&mut self, new_mode: DrawMode) {
		self.mode = new_mode;
		match new_mode {
			DrawMode::AddHole | DrawMode::Cut => {
				// stale handles would be mistaken for cut/hole points
				self.clear_pending();
			}
			_ => {}
		}
	}

	fn stop_draw_mode(&mut self) {
		match self.mode {
			DrawMode::None => return,
			DrawMode::AddPoint | DrawMode::EditAddVertex => {}
			// the drawn or recorded line stays, only the scaffolding goes
			DrawMode::AddLine | DrawMode::AddTrack => self.finish_line(),
			DrawMode::AddShape => self.end_adding_shape(),
			DrawMode::AddHole => self.end_adding_holes(),
			DrawMode::Cut => {
				if let Err(error) = self.finish_cut() {
					// the single attempt is abandoned, the store is untouched
					warn!("cut failed: {error}");
					self.clear_pending();
					self.create_editing_vertices();
				}
			}
			DrawMode::Union => {
				if let Err(error) = self.finish_union() {
					warn!("union failed: {error}");
				}
			}
		}

		self.mode = DrawMode::None;
	}

	// ── interaction ─────────────────────────────────────────────────────

	/// Routes a tap delivered by the input collaborator.
	pub fn handle_tap(&mut self, coordinate: Coordinates, projection: &dyn ScreenProjection) -> Result<()> {
		match self.mode {
			DrawMode::AddPoint => self.add_point(coordinate),
			DrawMode::AddLine | DrawMode::AddShape | DrawMode::AddHole | DrawMode::Cut => {
				self.add_line_point(coordinate);
			}
			DrawMode::EditAddVertex => {
				self.add_point_to_selected(coordinate, projection)?;
			}
			// selection in the remaining modes arrives via the hit-test
			// collaborator as select_feature / select_vertex calls
			DrawMode::None | DrawMode::AddTrack | DrawMode::Union => {}
		}
		Ok(())
	}

	/// Selects a feature (or clears the selection). In union mode a second
	/// distinct polygon becomes the union target instead.
	pub fn select_feature(&mut self, id: Option<FeatureId>) -> Result<()> {
		match id {
			Some(id) => {
				if self.mode == DrawMode::Union
					&& let Some(selected) = self.store.selected_id()
					&& selected != &id
				{
					return self.store.set_union_target(id);
				}
				self.store.select(Some(id))
			}
			None => {
				self.clear_editing_vertices();
				self.store.select(None)
			}
		}
	}

	// ── adding ──────────────────────────────────────────────────────────

	fn add_point(&mut self, coordinate: Coordinates) {
		self.store.mark_changed();
		self
			.store
			.insert(Feature::new(FeatureKind::Point, Geometry::new_point(coordinate)));
	}

	fn add_line_point(&mut self, coordinate: Coordinates) {
		let index = self.pending.len();
		self.store.add_support_point(SupportPoint::new(coordinate, index));
		self.pending.push(coordinate);
		self.add_line();
	}

	pub(crate) fn add_line(&mut self) {
		if self.pending.len() < 2 {
			return;
		}
		self.store.mark_changed();

		let geometry = Geometry::LineString(LineStringGeometry(self.pending.clone()));
		match &self.preview_line {
			Some(id) => {
				let updated = Feature {
					id: id.clone(),
					kind: FeatureKind::Line,
					geometry,
				};
				if let Err(error) = self.store.replace(updated) {
					warn!("lost preview line: {error}");
					self.preview_line = None;
				}
			}
			None => {
				let feature = Feature::new(FeatureKind::Line, geometry);
				self.preview_line = Some(feature.id.clone());
				self.store.insert(feature);
			}
		}

		if self.mode == DrawMode::AddShape {
			self.add_shape();
		}
		if self.mode == DrawMode::AddHole {
			self.add_hole();
		}
	}

	fn add_shape(&mut self) {
		if self.pending.len() < 3 {
			return;
		}
		self.store.mark_changed();

		let mut ring = RingGeometry(self.pending.clone());
		ring.close();
		let geometry = Geometry::new_polygon(ring, vec![]);

		match &self.temp_shape {
			Some(id) => {
				let updated = Feature {
					id: id.clone(),
					kind: FeatureKind::TempPolygon,
					geometry,
				};
				if let Err(error) = self.store.replace(updated) {
					warn!("lost shape preview: {error}");
					self.temp_shape = None;
				}
			}
			None => {
				let feature = Feature::new(FeatureKind::TempPolygon, geometry);
				self.temp_shape = Some(feature.id.clone());
				self.store.insert(feature);
			}
		}
	}

	/// Promotes the in-progress shape preview into a real polygon feature
	/// with a fresh id and canonical winding.
	fn end_adding_shape(&mut self) {
		self.remove_preview_line();
		if let Some(id) = self.temp_shape.take()
			&& let Ok(feature) = self.store.remove(&id)
			&& let Geometry::Polygon(mut polygon) = feature.geometry
			&& polygon.verify().is_ok()
		{
			normalize_winding(&mut polygon);
			self.store.insert(Feature::new(FeatureKind::Polygon, Geometry::Polygon(polygon)));
		}
		self.clear_pending();
	}

	fn finish_line(&mut self) {
		// the drawn line stays; only the drawing scaffolding goes
		self.preview_line = None;
		self.clear_pending();
	}

	pub(crate) fn remove_preview_line(&mut self) {
		if let Some(id) = self.preview_line.take()
			&& let Err(error) = self.store.remove(&id)
		{
			warn!("lost preview line: {error}");
		}
	}

	pub(crate) fn clear_pending(&mut self) {
		self.pending.clear();
		self.store.clear_support_points();
	}

	// ── editing handles ─────────────────────────────────────────────────

	/// Starts vertex editing of the selected feature: regenerates the
	/// support-point handle overlay from its geometry.
	pub fn start_editing(&mut self) {
		self.create_editing_vertices();
	}

	pub(crate) fn create_editing_vertices(&mut self) {
		let Some(feature) = self.store.selected_feature() else {
			return;
		};
		if !Self::validate_geometry(&feature.geometry) {
			self.clear_editing_vertices();
			return;
		}

		let handles: Vec<SupportPoint> = vertices_in_order(&feature.geometry)
			.into_iter()
			.enumerate()
			.map(|(index, coordinate)| SupportPoint::new(coordinate, index))
			.collect();
		self.store.set_support_points(handles);
		self.editing = true;
	}

	/// A feature below its minimum vertex count cannot be edited.
	fn validate_geometry(geometry: &Geometry) -> bool {
		geometry.verify().is_ok()
	}

	pub fn clear_editing_vertices(&mut self) {
		self.mode = DrawMode::None;
		self.editing = false;
		self.pending.clear();
		self.store.clear_support_points();
	}

	/// Marks the handle at `index` as current. Returns whether a vertex is
	/// now selected.
	pub fn select_vertex(&mut self, index: Option<usize>) -> bool {
		self.store.set_current_vertex(index)
	}

	// ── vertex mutation ─────────────────────────────────────────────────

	/// Inserts a vertex into the selected feature at the tapped location,
	/// snapping onto the nearest edge within the tap threshold.
	///
	/// Returns `false` when the tap lands inside the shape (or finds no
	/// edge) and the caller should show a notice instead.
	pub fn add_point_to_selected(&mut self, coordinate: Coordinates, projection: &dyn ScreenProjection) -> Result<bool> {
		let feature = self
			.store
			.selected_feature()
			.ok_or_else(|| anyhow!("vertex insertion requires a selected feature"))?;

		let Some((index, vertex)) = find_vertex_on(feature, &coordinate, self.tap_area_width, projection)? else {
			debug!("tap is not on an edge, rejecting vertex insertion");
			return Ok(false);
		};

		self.update_selected_feature(VertexEdit::Insert { index, coordinate: vertex })?;
		Ok(true)
	}

	/// Applies a vertex edit to the selected feature and runs the store
	/// side effects: changed flag, collection replacement, handle overlay
	/// regeneration and selection refresh.
	pub fn update_selected_feature(&mut self, edit: VertexEdit) -> Result<()> {
		let feature = self
			.store
			.selected_feature()
			.cloned()
			.ok_or_else(|| anyhow!("vertex mutation requires a selected feature"))?;

		let mutation = mutate::apply_edit(&feature.geometry, &edit)?;
		self.store.mark_changed();

		match mutation {
			Mutation::Replaced(geometry) => {
				self.store.replace(Feature { geometry, ..feature })?;
				self.store.push_selection();
				self.create_editing_vertices();
				if let VertexEdit::Move { index, .. } = edit {
					self.store.set_current_vertex(Some(index));
				}
			}
			Mutation::DeleteFeature => self.delete_selected_feature()?,
		}
		Ok(())
	}

	// ── move (drag) ─────────────────────────────────────────────────────

	/// Begins dragging the handle at `index`. Returns whether the handle
	/// exists.
	pub fn begin_vertex_drag(&mut self, index: usize) -> bool {
		self.store.set_current_vertex(Some(index))
	}

	/// Live drag update: moves the current vertex to the new position.
	pub fn drag_vertex(&mut self, coordinate: Coordinates) -> Result<()> {
		let Some(index) = self.store.current_vertex() else {
			return Ok(());
		};
		self.update_selected_feature(VertexEdit::Move { index, coordinate })
	}

	/// Ends the drag, keeping the handle selected.
	pub fn end_vertex_drag(&mut self) {
		// moves were applied live during the drag, only refresh the preview
		self.store.push_selection();
	}

	// ── delete ──────────────────────────────────────────────────────────

	/// Deletes the currently selected vertex handle's vertex.
	pub fn delete_current_vertex(&mut self) -> Result<()> {
		let Some(index) = self.store.current_vertex() else {
			return Ok(());
		};
		self.update_selected_feature(VertexEdit::Delete { index })
	}

	/// Deletes the selected feature and resets the editing state.
	pub fn delete_selected_feature(&mut self) -> Result<()> {
		let id = self
			.store
			.selected_id()
			.cloned()
			.ok_or_else(|| anyhow!("deletion requires a selected feature"))?;
		self.store.mark_changed();
		self.store.remove(&id)?;
		self.clear_editing_vertices();
		self.store.push_selection();
		Ok(())
	}
}
