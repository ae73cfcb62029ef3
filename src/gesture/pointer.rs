use crate::graph::ScreenPoint;

/// Identifies one pointer: a touch identifier, or [`MOUSE_POINTER`].
pub type PointerId = i32;

/// Touch identifiers are non-negative, so the mouse never collides with one.
pub const MOUSE_POINTER: PointerId = -1;

#[derive(Clone, Debug, PartialEq)]
pub enum Gesture {
	/// Press and release without leaving the slop radius.
	Tap { at: ScreenPoint },
	/// Press held past the long-press delay without moving.
	LongPress { at: ScreenPoint },
	/// The pointer left the slop radius while pressed.
	DragStart { origin: ScreenPoint, at: ScreenPoint },
	DragMove { at: ScreenPoint },
	DragEnd { at: ScreenPoint },
	/// The drag was abandoned (pointer left the surface, touch cancelled).
	DragCancel,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
	Pending,
	Dragging,
	/// Long press already reported; the rest of this press is ignored.
	Spent,
}

#[derive(Clone, Copy, Debug)]
struct Press {
	pointer: PointerId,
	origin: ScreenPoint,
	started_ms: f64,
	phase: Phase,
}

#[derive(Clone, Debug)]
pub struct PointerTracker {
	long_press_ms: f64,
	drag_slop: f64,
	press: Option<Press>,
}

impl PointerTracker {
	pub fn new(long_press_ms: f64, drag_slop: f64) -> Self {
		Self {
			long_press_ms,
			drag_slop,
			press: None,
		}
	}

	pub fn is_pressed(&self) -> bool {
		self.press.is_some()
	}

	/// Begin a press. Returns `false` when a press is already in progress;
	/// other pointers are ignored until the tracked one lifts.
	pub fn press(&mut self, pointer: PointerId, at: ScreenPoint, now_ms: f64) -> bool {
		if self.press.is_some() {
			return false;
		}
		self.press = Some(Press {
			pointer,
			origin: at,
			started_ms: now_ms,
			phase: Phase::Pending,
		});
		true
	}

	fn tracked(&mut self, pointer: PointerId) -> Option<&mut Press> {
		self.press.as_mut().filter(|p| p.pointer == pointer)
	}

	pub fn moved(&mut self, pointer: PointerId, at: ScreenPoint) -> Option<Gesture> {
		let drag_slop = self.drag_slop;
		let press = self.tracked(pointer)?;
		match press.phase {
			Phase::Pending if (at - press.origin).length() > drag_slop => {
				press.phase = Phase::Dragging;
				Some(Gesture::DragStart {
					origin: press.origin,
					at,
				})
			}
			Phase::Dragging => Some(Gesture::DragMove { at }),
			Phase::Pending | Phase::Spent => None,
		}
	}

	pub fn released(&mut self, pointer: PointerId, at: ScreenPoint, now_ms: f64) -> Option<Gesture> {
		self.tracked(pointer)?;
		let press = self.press.take()?;
		match press.phase {
			Phase::Dragging => Some(Gesture::DragEnd { at }),
			Phase::Pending if now_ms - press.started_ms >= self.long_press_ms => {
				Some(Gesture::LongPress { at: press.origin })
			}
			Phase::Pending => Some(Gesture::Tap { at: press.origin }),
			Phase::Spent => None,
		}
	}

	/// Report a long press as soon as the delay has elapsed.
	pub fn poll(&mut self, now_ms: f64) -> Option<Gesture> {
		let press = self.press.as_mut()?;
		if press.phase == Phase::Pending && now_ms - press.started_ms >= self.long_press_ms {
			press.phase = Phase::Spent;
			return Some(Gesture::LongPress { at: press.origin });
		}
		None
	}

	pub fn cancel(&mut self, pointer: PointerId) -> Option<Gesture> {
		self.tracked(pointer)?;
		self.reset()
	}

	/// Drop whatever press is active, regardless of pointer.
	pub fn reset(&mut self) -> Option<Gesture> {
		match self.press.take()?.phase {
			Phase::Dragging => Some(Gesture::DragCancel),
			Phase::Pending | Phase::Spent => None,
		}
	}
}
