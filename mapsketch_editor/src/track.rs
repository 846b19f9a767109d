use crate::{DrawEngine, DrawMode};
use anyhow::Result;
use log::debug;
use mapsketch_geometry::Coordinates;
use tokio::sync::watch;

/// A location-track recording session.
///
/// The session is an explicit value owned by whichever edit context is
/// recording; only one exists system-wide because the caller holds the
/// single handle. The engine never looks a session up globally.
#[derive(Debug, Default)]
pub struct TrackSession {
	coordinates: Vec<Coordinates>,
	recording: bool,
}

impl TrackSession {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn start(&mut self) {
		self.recording = true;
	}

	pub fn stop(&mut self) {
		self.recording = false;
	}

	#[must_use]
	pub fn is_recording(&self) -> bool {
		self.recording
	}

	/// Appends a coordinate while recording; ignored otherwise.
	pub fn record(&mut self, coordinate: Coordinates) {
		if self.recording {
			self.coordinates.push(coordinate);
		}
	}

	#[must_use]
	pub fn coordinates(&self) -> &[Coordinates] {
		&self.coordinates
	}

	pub fn clear(&mut self) {
		self.coordinates.clear();
	}
}

/// One-shot readiness signal published by store setup.
///
/// Track-derived feature creation must wait until the rendering sources
/// exist. The setup step opens the gate exactly once; waiters observe the
/// flag through a watch channel instead of polling on an interval.
#[derive(Debug)]
pub struct ReadinessGate {
	tx: watch::Sender<bool>,
	rx: watch::Receiver<bool>,
}

impl ReadinessGate {
	#[must_use]
	pub fn new() -> Self {
		let (tx, rx) = watch::channel(false);
		Self { tx, rx }
	}

	/// Publishes readiness. Subsequent calls are harmless.
	pub fn open(&self) {
		let _ = self.tx.send(true);
	}

	#[must_use]
	pub fn is_open(&self) -> bool {
		*self.rx.borrow()
	}

	/// Resolves once the gate is open; immediately when it already is.
	pub async fn ready(&self) {
		let mut rx = self.rx.clone();
		while !*rx.borrow_and_update() {
			if rx.changed().await.is_err() {
				return;
			}
		}
	}
}

impl Default for ReadinessGate {
	fn default() -> Self {
		Self::new()
	}
}

impl DrawEngine {
	/// Turns the coordinates recorded so far into a line feature.
	///
	/// Waits on the readiness gate first, so a recording that finishes
	/// before the store setup completes is applied as soon as the sources
	/// exist, on the mutation thread.
	pub async fn create_feature_from_track(&mut self, session: &TrackSession) -> Result<()> {
		self.gate.ready().await;

		if !session.coordinates().is_empty() {
			debug!("creating line feature from {} track coordinates", session.coordinates().len());
			self.pending.clear();
			self.pending.extend_from_slice(session.coordinates());
			self.add_line();
		}
		self.track_created = true;
		Ok(())
	}

	/// Streams a freshly recorded coordinate into the track line feature.
	pub fn record_track_coordinate(&mut self, session: &mut TrackSession, coordinate: Coordinates) {
		session.record(coordinate);
		if self.mode == DrawMode::AddTrack && self.track_created && session.is_recording() {
			self.pending.push(coordinate);
			self.add_line();
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::NullRenderSink;
	use mapsketch_geometry::Geometry;
	use std::sync::Arc;

	#[tokio::test]
	async fn gate_opens_once_and_stays_open() {
		let gate = ReadinessGate::new();
		assert!(!gate.is_open());

		gate.open();
		assert!(gate.is_open());
		gate.ready().await;

		gate.open();
		assert!(gate.is_open());
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn ready_blocks_until_the_gate_opens() {
		let gate = Arc::new(ReadinessGate::new());
		let waiter = Arc::clone(&gate);
		let handle = tokio::spawn(async move {
			waiter.ready().await;
		});

		gate.open();
		handle.await.unwrap();
	}

	#[tokio::test]
	async fn recorded_track_becomes_a_line_feature() {
		let mut engine = DrawEngine::new(Box::new(NullRenderSink));
		engine.prepare();
		engine.change_mode(DrawMode::AddTrack);

		let mut session = TrackSession::new();
		session.start();
		for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)] {
			session.record(Coordinates::new(x, y));
		}

		engine.create_feature_from_track(&session).await.unwrap();

		let lines = engine.store().snapshot_lines();
		assert_eq!(lines.len(), 1);
		match &lines[0].geometry {
			Geometry::LineString(line) => assert_eq!(line.0.len(), 3),
			other => panic!("expected LineString, got {other:?}"),
		}

		// live updates extend the same feature
		engine.record_track_coordinate(&mut session, Coordinates::new(2.0, 1.0));
		let lines = engine.store().snapshot_lines();
		assert_eq!(lines.len(), 1);
		match &lines[0].geometry {
			Geometry::LineString(line) => assert_eq!(line.0.len(), 4),
			other => panic!("expected LineString, got {other:?}"),
		}

		// finishing track mode keeps the recorded line
		engine.change_mode(DrawMode::None);
		assert_eq!(engine.store().snapshot_lines().len(), 1);
	}

	#[test]
	fn session_ignores_coordinates_while_stopped() {
		let mut session = TrackSession::new();
		session.record(Coordinates::new(1.0, 1.0));
		assert!(session.coordinates().is_empty());

		session.start();
		session.record(Coordinates::new(1.0, 1.0));
		session.stop();
		session.record(Coordinates::new(2.0, 2.0));
		assert_eq!(session.coordinates().len(), 1);

		session.clear();
		assert!(session.coordinates().is_empty());
	}
}
