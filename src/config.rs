use crate::graph::ModelSize;
use crate::persistence::STORAGE_KEY;

/// Interaction tunables for an [`Editor`](crate::editor::Editor).
#[derive(Clone, Debug)]
pub struct EditorConfig {
	/// Hold time after which a stationary press counts as a long press.
	pub long_press_ms: f64,
	/// Screen distance a press may wander before it becomes a drag.
	pub drag_slop: f64,
	/// Half width and height of a node's box, which is also its hit box.
	pub node_half_extent: ModelSize,
	/// Scale multiplier applied per wheel notch when zooming in.
	pub wheel_zoom_step: f64,
	pub storage_key: String,
}

impl Default for EditorConfig {
	fn default() -> Self {
		Self {
			long_press_ms: 500.0,
			drag_slop: 8.0,
			node_half_extent: ModelSize::new(50.0, 18.0),
			wheel_zoom_step: 1.1,
			storage_key: STORAGE_KEY.into(),
		}
	}
}
