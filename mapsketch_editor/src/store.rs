use crate::{EditLayer, Feature, FeatureId, FeatureKind, RenderSink, SupportPoint};
use anyhow::{Result, anyhow, bail, ensure};
use log::debug;
use mapsketch_geometry::{
	CompositeGeometryTrait, Geometry, LineStringGeometry, MultiLineStringGeometry, MultiPointGeometry,
	MultiPolygonGeometry, PointGeometry, PolygonGeometry,
	wkt::{WKT_PRECISION, parse_wkt, stringify_wkt},
};

/// Owns the authoritative feature collections, the selection and the
/// support-point overlay.
///
/// All mutation goes through the engine operations; collaborators only ever
/// receive snapshots. After every change the affected layers are pushed to
/// the render sink as whole-collection replacements.
pub struct FeatureStore {
	points: Vec<Feature>,
	lines: Vec<Feature>,
	polygons: Vec<Feature>,

	selected: Option<FeatureId>,
	union_target: Option<FeatureId>,
	support_points: Vec<SupportPoint>,

	changed: bool,
	loaded: bool,

	sink: Box<dyn RenderSink>,
}

impl FeatureStore {
	#[must_use]
	pub fn new(sink: Box<dyn RenderSink>) -> Self {
		Self {
			points: Vec::new(),
			lines: Vec::new(),
			polygons: Vec::new(),
			selected: None,
			union_target: None,
			support_points: Vec::new(),
			changed: false,
			loaded: false,
			sink,
		}
	}

	// ── snapshots ───────────────────────────────────────────────────────

	#[must_use]
	pub fn snapshot_points(&self) -> Vec<Feature> {
		self.points.clone()
	}

	#[must_use]
	pub fn snapshot_lines(&self) -> Vec<Feature> {
		self.lines.clone()
	}

	#[must_use]
	pub fn snapshot_polygons(&self) -> Vec<Feature> {
		self.polygons.clone()
	}

	#[must_use]
	pub fn snapshot_support_points(&self) -> Vec<SupportPoint> {
		self.support_points.clone()
	}

	/// The "geometry changed" flag, readable after any edit session.
	#[must_use]
	pub fn is_changed(&self) -> bool {
		self.changed
	}

	pub fn mark_changed(&mut self) {
		self.changed = true;
	}

	// ── lookup ──────────────────────────────────────────────────────────

	#[must_use]
	pub fn find(&self, id: &FeatureId) -> Option<&Feature> {
		self
			.points
			.iter()
			.chain(&self.lines)
			.chain(&self.polygons)
			.find(|f| &f.id == id)
	}

	#[must_use]
	pub fn selected_id(&self) -> Option<&FeatureId> {
		self.selected.as_ref()
	}

	#[must_use]
	pub fn selected_feature(&self) -> Option<&Feature> {
		self.selected.as_ref().and_then(|id| self.find(id))
	}

	#[must_use]
	pub fn union_target_id(&self) -> Option<&FeatureId> {
		self.union_target.as_ref()
	}

	fn collection_mut(&mut self, kind: FeatureKind) -> &mut Vec<Feature> {
		match kind {
			FeatureKind::Point => &mut self.points,
			FeatureKind::Line => &mut self.lines,
			FeatureKind::Polygon | FeatureKind::TempPolygon => &mut self.polygons,
		}
	}

	fn layer_for(kind: FeatureKind) -> EditLayer {
		match kind {
			FeatureKind::Point => EditLayer::Points,
			FeatureKind::Line => EditLayer::Lines,
			FeatureKind::Polygon | FeatureKind::TempPolygon => EditLayer::Shapes,
		}
	}

	// ── mutation ────────────────────────────────────────────────────────

	pub fn insert(&mut self, feature: Feature) {
		debug!("inserting {:?} feature {}", feature.kind, feature.id);
		let kind = feature.kind;
		self.collection_mut(kind).push(feature);
		self.push_layer(Self::layer_for(kind));
	}

	/// Replaces the feature with the same id; the id must exist in the
	/// collection matching the feature's kind (a miss is a caller bug).
	pub fn replace(&mut self, feature: Feature) -> Result<()> {
		let kind = feature.kind;
		let collection = self.collection_mut(kind);
		let slot = collection
			.iter_mut()
			.find(|f| f.id == feature.id)
			.ok_or_else(|| anyhow!("feature {} not found for replacement", feature.id))?;
		*slot = feature;
		self.push_layer(Self::layer_for(kind));
		Ok(())
	}

	/// Removes a feature by id from whichever collection holds it.
	pub fn remove(&mut self, id: &FeatureId) -> Result<Feature> {
		for layer in [EditLayer::Points, EditLayer::Lines, EditLayer::Shapes] {
			let collection = match layer {
				EditLayer::Points => &mut self.points,
				EditLayer::Lines => &mut self.lines,
				_ => &mut self.polygons,
			};
			let Some(position) = collection.iter().position(|f| &f.id == id) else {
				continue;
			};
			let feature = collection.remove(position);

			if self.selected.as_ref() == Some(id) {
				self.selected = None;
			}
			if self.union_target.as_ref() == Some(id) {
				self.union_target = None;
			}
			self.push_layer(layer);
			return Ok(feature);
		}
		bail!("feature {id} not found for removal")
	}

	// ── selection ───────────────────────────────────────────────────────

	/// Selects a feature by id, or clears the selection with `None`.
	pub fn select(&mut self, id: Option<FeatureId>) -> Result<()> {
		if let Some(id) = &id {
			ensure!(self.find(id).is_some(), "cannot select unknown feature {id}");
		}
		self.selected = id;
		if self.selected.is_none() {
			self.union_target = None;
		}
		self.push_selection();
		Ok(())
	}

	/// Marks a second polygon as the union partner of the selection.
	pub fn set_union_target(&mut self, id: FeatureId) -> Result<()> {
		ensure!(self.find(&id).is_some(), "cannot target unknown feature {id}");
		ensure!(self.selected.is_some(), "union target needs a selected feature");
		ensure!(self.selected.as_ref() != Some(&id), "union target must differ from the selection");
		self.union_target = Some(id);
		self.push_selection();
		Ok(())
	}

	// ── support points ──────────────────────────────────────────────────

	pub fn set_support_points(&mut self, points: Vec<SupportPoint>) {
		self.support_points = points;
		self.push_support_points();
	}

	pub fn add_support_point(&mut self, point: SupportPoint) {
		self.support_points.push(point);
		self.push_support_points();
	}

	pub fn clear_support_points(&mut self) {
		self.support_points.clear();
		self.push_support_points();
	}

	/// Marks the handle at `index` as the current one (or clears the mark).
	/// Returns whether a handle is now current.
	pub fn set_current_vertex(&mut self, index: Option<usize>) -> bool {
		let mut any = false;
		for point in &mut self.support_points {
			point.current = Some(point.index) == index;
			any |= point.current;
		}
		self.push_support_points();
		any
	}

	#[must_use]
	pub fn current_vertex(&self) -> Option<usize> {
		self.support_points.iter().find(|p| p.current).map(|p| p.index)
	}

	// ── render pushes ───────────────────────────────────────────────────

	pub(crate) fn push_layer(&mut self, layer: EditLayer) {
		match layer {
			EditLayer::Points => self.sink.replace_features(layer, &self.points),
			EditLayer::Lines => self.sink.replace_features(layer, &self.lines),
			EditLayer::Shapes => self.sink.replace_features(layer, &self.polygons),
			EditLayer::Selection => self.push_selection(),
		}
	}

	pub(crate) fn push_selection(&mut self) {
		let mut features: Vec<Feature> = Vec::new();
		if let Some(feature) = self.selected_feature() {
			features.push(feature.clone());
		}
		if let Some(feature) = self.union_target.as_ref().and_then(|id| self.find(id)) {
			features.push(feature.clone());
		}
		self.sink.replace_features(EditLayer::Selection, &features);
	}

	fn push_support_points(&mut self) {
		self.sink.replace_support_points(&self.support_points);
	}

	// ── persistence ─────────────────────────────────────────────────────

	/// Loads features from a WKT string, once per store.
	///
	/// Multi-geometries are exploded into one feature per part, matching how
	/// the editor treats every part as an individually selectable feature.
	pub fn load_wkt(&mut self, wkt: &str) -> Result<()> {
		if self.loaded {
			return Ok(());
		}

		match parse_wkt(wkt)? {
			Geometry::Point(point) => self.insert(Feature::new(FeatureKind::Point, Geometry::Point(point))),
			Geometry::LineString(line) => self.insert(Feature::new(FeatureKind::Line, Geometry::LineString(line))),
			Geometry::Polygon(polygon) => self.insert(Feature::new(FeatureKind::Polygon, Geometry::Polygon(polygon))),
			Geometry::MultiPoint(multi) => {
				for point in multi.into_iter() {
					self.insert(Feature::new(FeatureKind::Point, Geometry::Point(point)));
				}
			}
			Geometry::MultiLineString(multi) => {
				for line in multi.into_iter() {
					self.insert(Feature::new(FeatureKind::Line, Geometry::LineString(line)));
				}
			}
			Geometry::MultiPolygon(multi) => {
				for polygon in multi.into_iter() {
					self.insert(Feature::new(FeatureKind::Polygon, Geometry::Polygon(polygon)));
				}
			}
		}

		self.loaded = true;
		Ok(())
	}

	/// Serializes the store for persistence.
	///
	/// At most one geometry kind is persisted per save, by designed
	/// precedence: points, else lines, else polygons. Temp polygons are
	/// never persisted. Returns `None` when the store is empty.
	pub fn save_wkt(&self) -> Result<Option<String>> {
		if !self.points.is_empty() {
			let multi = MultiPointGeometry(
				self
					.points
					.iter()
					.map(|f| match &f.geometry {
						Geometry::Point(p) => Ok(p.clone()),
						other => Err(anyhow!("point collection holds a {}", other.get_type_name())),
					})
					.collect::<Result<Vec<PointGeometry>>>()?,
			);
			return Ok(Some(stringify_wkt(&Geometry::MultiPoint(multi), Some(WKT_PRECISION))));
		}

		if !self.lines.is_empty() {
			let multi = MultiLineStringGeometry(
				self
					.lines
					.iter()
					.map(|f| match &f.geometry {
						Geometry::LineString(l) => Ok(l.clone()),
						other => Err(anyhow!("line collection holds a {}", other.get_type_name())),
					})
					.collect::<Result<Vec<LineStringGeometry>>>()?,
			);
			return Ok(Some(stringify_wkt(&Geometry::MultiLineString(multi), Some(WKT_PRECISION))));
		}

		let mut polygons: Vec<PolygonGeometry> = Vec::new();
		for feature in &self.polygons {
			match &feature.geometry {
				// a union result may be a multi-polygon; its parts flatten
				// into the persisted MULTIPOLYGON
				Geometry::Polygon(p) if feature.kind == FeatureKind::Polygon => polygons.push(p.clone()),
				Geometry::MultiPolygon(mp) if feature.kind == FeatureKind::Polygon => polygons.extend(mp.0.iter().cloned()),
				_ if feature.kind == FeatureKind::TempPolygon => {}
				other => bail!("polygon collection holds a {}", other.get_type_name()),
			}
		}
		if polygons.is_empty() {
			return Ok(None);
		}
		Ok(Some(stringify_wkt(
			&Geometry::MultiPolygon(MultiPolygonGeometry(polygons)),
			Some(WKT_PRECISION),
		)))
	}
}
