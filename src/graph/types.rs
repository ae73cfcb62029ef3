use std::fmt;

use euclid::{Point2D, Size2D, Vector2D};
use serde::{Deserialize, Serialize};

/// Coordinate space the graph is stored in, independent of pan and zoom.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelSpace {}

/// Pixel space of the drawing surface, after the viewport transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScreenSpace {}

pub type ModelPoint = Point2D<f64, ModelSpace>;
pub type ModelSize = Size2D<f64, ModelSpace>;
pub type ScreenPoint = Point2D<f64, ScreenSpace>;
pub type ScreenVector = Vector2D<f64, ScreenSpace>;

/// Label given to freshly created nodes.
pub const DEFAULT_LABEL: &str = "Node";

macro_rules! opaque_id {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(String);

		impl $name {
			pub fn new(id: impl Into<String>) -> Self {
				Self(id.into())
			}

			pub fn as_str(&self) -> &str {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(&self.0)
			}
		}

		impl From<&str> for $name {
			fn from(id: &str) -> Self {
				Self::new(id)
			}
		}
	};
}

opaque_id!(
	/// Stable, opaque node identifier.
	NodeId
);

opaque_id!(
	/// Opaque edge identifier.
	EdgeId
);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
	pub id: NodeId,
	pub x: f64,
	pub y: f64,
	pub text: String,
}

impl Node {
	pub fn new(id: NodeId, at: ModelPoint, text: impl Into<String>) -> Self {
		Self {
			id,
			x: at.x,
			y: at.y,
			text: text.into(),
		}
	}

	pub fn position(&self) -> ModelPoint {
		ModelPoint::new(self.x, self.y)
	}

	/// Whether `point` falls inside the node's box, centred on its position.
	pub fn contains(&self, point: ModelPoint, half_extent: ModelSize) -> bool {
		(point.x - self.x).abs() <= half_extent.width
			&& (point.y - self.y).abs() <= half_extent.height
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
	pub id: EdgeId,
	pub from: NodeId,
	pub to: NodeId,
}

impl Edge {
	pub fn touches(&self, node: &NodeId) -> bool {
		&self.from == node || &self.to == node
	}

	/// Whether this edge already links `a` and `b`, in either direction.
	pub fn links(&self, a: &NodeId, b: &NodeId) -> bool {
		(&self.from == a && &self.to == b) || (&self.from == b && &self.to == a)
	}
}
