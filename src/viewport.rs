//! Pan and zoom between model and screen space.

use crate::graph::{ModelPoint, ScreenPoint, ScreenVector};

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	tx: f64,
	ty: f64,
	scale: f64,
}

impl Default for Viewport {
	fn default() -> Self {
		Self {
			tx: 0.0,
			ty: 0.0,
			scale: 1.0,
		}
	}
}

impl Viewport {
	/// Build a viewport; out-of-range or non-finite scales are clamped.
	pub fn new(tx: f64, ty: f64, scale: f64) -> Self {
		Self {
			tx,
			ty,
			scale: clamp_scale(scale),
		}
	}

	pub fn translation(&self) -> (f64, f64) {
		(self.tx, self.ty)
	}

	pub fn scale(&self) -> f64 {
		self.scale
	}

	pub fn to_screen(&self, p: ModelPoint) -> ScreenPoint {
		ScreenPoint::new(p.x * self.scale + self.tx, p.y * self.scale + self.ty)
	}

	pub fn to_model(&self, p: ScreenPoint) -> ModelPoint {
		ModelPoint::new((p.x - self.tx) / self.scale, (p.y - self.ty) / self.scale)
	}

	/// Model-space point under the centre of a `width` x `height` screen.
	pub fn centre_in_model(&self, width: f64, height: f64) -> ModelPoint {
		self.to_model(ScreenPoint::new(width / 2.0, height / 2.0))
	}

	pub fn pan_by(&mut self, delta: ScreenVector) {
		self.tx += delta.x;
		self.ty += delta.y;
	}

	/// Multiply the scale by `factor`, keeping the model point under `anchor`
	/// fixed on screen.
	pub fn zoom_about(&mut self, anchor: ScreenPoint, factor: f64) {
		let new_scale = clamp_scale(self.scale * factor);
		let ratio = new_scale / self.scale;
		self.tx = anchor.x - (anchor.x - self.tx) * ratio;
		self.ty = anchor.y - (anchor.y - self.ty) * ratio;
		self.scale = new_scale;
	}
}

fn clamp_scale(scale: f64) -> f64 {
	if scale.is_nan() {
		1.0
	} else {
		scale.clamp(MIN_SCALE, MAX_SCALE)
	}
}
