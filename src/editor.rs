//! The mutation surface the presentation layer talks to.

use log::{debug, info, warn};

use crate::config::EditorConfig;
use crate::error::PersistError;
use crate::gesture::{DragSession, Effect, Gesture, GestureState, Input, PointerId, PointerTracker};
use crate::graph::{Graph, ModelPoint, NodeId, ScreenPoint};
use crate::persistence;
use crate::viewport::Viewport;

type Listener = Box<dyn FnMut(&Graph)>;

pub struct Editor {
	graph: Graph,
	viewport: Viewport,
	gestures: GestureState,
	pointer: PointerTracker,
	/// Last pointer position of a background drag, which pans the view.
	pan_from: Option<ScreenPoint>,
	screen: (f64, f64),
	config: EditorConfig,
	listeners: Vec<Listener>,
}

impl Editor {
	pub fn new(graph: Graph, config: EditorConfig) -> Self {
		Self {
			graph,
			viewport: Viewport::default(),
			gestures: GestureState::Idle,
			pointer: PointerTracker::new(config.long_press_ms, config.drag_slop),
			pan_from: None,
			screen: (0.0, 0.0),
			config,
			listeners: Vec::new(),
		}
	}

	pub fn graph(&self) -> &Graph {
		&self.graph
	}

	pub fn viewport(&self) -> &Viewport {
		&self.viewport
	}

	pub fn gesture_state(&self) -> &GestureState {
		&self.gestures
	}

	pub fn selected(&self) -> Option<&NodeId> {
		self.gestures.selected()
	}

	pub fn drag(&self) -> Option<&DragSession> {
		self.gestures.drag()
	}

	pub fn config(&self) -> &EditorConfig {
		&self.config
	}

	/// Call `listener` with every new graph snapshot.
	pub fn subscribe(&mut self, listener: impl FnMut(&Graph) + 'static) {
		self.listeners.push(Box::new(listener));
	}

	/// Size of the drawing surface, used to place nodes added without a
	/// position.
	pub fn set_screen_size(&mut self, width: f64, height: f64) {
		self.screen = (width, height);
	}

	pub fn screen_size(&self) -> (f64, f64) {
		self.screen
	}

	fn commit(&mut self, next: Graph) {
		if next.same_snapshot(&self.graph) {
			return;
		}
		self.graph = next;
		for listener in &mut self.listeners {
			listener(&self.graph);
		}
	}

	fn apply(&mut self, input: Input) -> Effect {
		let state = std::mem::take(&mut self.gestures);
		let step = state.step(&self.graph, &self.viewport, input);
		self.gestures = step.state;
		self.commit(step.graph);
		step.effect
	}

	/// Add a node at `position`, or under the centre of the screen.
	pub fn add_node(&mut self, position: Option<ModelPoint>) -> Option<NodeId> {
		let at = position
			.unwrap_or_else(|| self.viewport.centre_in_model(self.screen.0, self.screen.1));
		match self.graph.add_node(at) {
			Ok((next, id)) => {
				self.commit(next);
				Some(id)
			}
			Err(err) => {
				warn!("add node failed: {err}");
				None
			}
		}
	}

	pub fn move_node(&mut self, id: &NodeId, to: ModelPoint) {
		let next = self.graph.move_node(id, to);
		self.commit(next);
	}

	pub fn delete_node(&mut self, id: &NodeId) {
		self.apply(Input::Delete(id.clone()));
	}

	/// One tap of the two-tap connect protocol.
	pub fn connect_tap(&mut self, id: &NodeId) -> Effect {
		self.apply(Input::Tap(id.clone()))
	}

	pub fn clear_selection(&mut self) {
		self.pointer.reset();
		self.pan_from = None;
		self.apply(Input::ClearSelection);
	}

	pub fn set_node_text(&mut self, id: &NodeId, text: impl Into<String>) {
		let next = self.graph.set_node_text(id, text);
		self.commit(next);
	}

	/// Set the map name; blank names clear it.
	pub fn rename(&mut self, name: Option<String>) {
		let name = name.filter(|n| !n.trim().is_empty());
		if self.graph.name() == name.as_deref() {
			return;
		}
		let next = self.graph.rename(name);
		self.commit(next);
	}

	/// Swap in a whole new graph (load, import). Gesture state refers to the
	/// old graph and is dropped.
	pub fn replace_graph(&mut self, graph: Graph) {
		self.pointer.reset();
		self.pan_from = None;
		self.gestures = GestureState::Idle;
		self.commit(graph);
	}

	/// Replace the graph with one parsed from `text`, or leave it untouched.
	pub fn import_text(&mut self, text: &str) -> Result<(), PersistError> {
		let graph = persistence::import_text(text)?;
		info!("imported map with {} nodes", graph.node_count());
		self.replace_graph(graph);
		Ok(())
	}

	pub fn export_text(&self) -> Result<String, PersistError> {
		persistence::export_text(&self.graph)
	}

	fn node_under(&self, at: ScreenPoint) -> Option<NodeId> {
		let point = self.viewport.to_model(at);
		self.graph
			.node_at(point, self.config.node_half_extent)
			.map(|node| node.id.clone())
	}

	pub fn pointer_down(&mut self, pointer: PointerId, at: ScreenPoint, now_ms: f64) {
		if !self.pointer.press(pointer, at, now_ms) {
			debug!("ignoring pointer {pointer} at {at:?} while another is down");
		}
	}

	pub fn pointer_move(&mut self, pointer: PointerId, at: ScreenPoint) {
		if let Some(gesture) = self.pointer.moved(pointer, at) {
			self.gesture(gesture);
		}
	}

	pub fn pointer_up(&mut self, pointer: PointerId, at: ScreenPoint, now_ms: f64) {
		if let Some(gesture) = self.pointer.released(pointer, at, now_ms) {
			self.gesture(gesture);
		}
	}

	pub fn pointer_cancel(&mut self, pointer: PointerId) {
		if let Some(gesture) = self.pointer.cancel(pointer) {
			self.gesture(gesture);
		}
	}

	/// Drive time-based gestures (long press). Call once per frame.
	pub fn poll(&mut self, now_ms: f64) {
		if let Some(gesture) = self.pointer.poll(now_ms) {
			self.gesture(gesture);
		}
	}

	/// Zoom one wheel notch about `at`; positive `delta_y` zooms out.
	pub fn wheel(&mut self, at: ScreenPoint, delta_y: f64) {
		let factor = if delta_y > 0.0 {
			1.0 / self.config.wheel_zoom_step
		} else {
			self.config.wheel_zoom_step
		};
		self.viewport.zoom_about(at, factor);
	}

	fn gesture(&mut self, gesture: Gesture) {
		match gesture {
			Gesture::Tap { at } => {
				if let Some(node) = self.node_under(at) {
					self.apply(Input::Tap(node));
				}
			}
			Gesture::LongPress { at } => {
				if let Some(node) = self.node_under(at) {
					self.apply(Input::Delete(node));
				}
			}
			Gesture::DragStart { origin, at } => match self.node_under(origin) {
				Some(node) => {
					self.apply(Input::DragStart { node, origin, at });
				}
				None => {
					self.viewport.pan_by(at - origin);
					self.pan_from = Some(at);
				}
			},
			Gesture::DragMove { at } => match self.pan_from {
				Some(from) => {
					self.viewport.pan_by(at - from);
					self.pan_from = Some(at);
				}
				None => {
					self.apply(Input::DragMove(at));
				}
			},
			Gesture::DragEnd { at } => match self.pan_from.take() {
				Some(from) => self.viewport.pan_by(at - from),
				None => {
					self.apply(Input::DragEnd(at));
				}
			},
			Gesture::DragCancel => {
				if self.pan_from.take().is_none() {
					self.apply(Input::DragCancel);
				}
			}
		}
	}
}
