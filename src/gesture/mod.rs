//! The `Idle` / `Dragging` / `ConnectPending` gesture state machine.

mod pointer;

use log::{debug, warn};

pub use pointer::{Gesture, MOUSE_POINTER, PointerId, PointerTracker};

use crate::error::GraphError;
use crate::graph::{EdgeId, Graph, NodeId, ScreenPoint, ScreenVector};
use crate::viewport::Viewport;

/// An in-progress node drag. The graph is not touched until it ends.
#[derive(Clone, Debug, PartialEq)]
pub struct DragSession {
	pub node: NodeId,
	/// Pointer position relative to the node's on-screen anchor at grab time.
	grab: ScreenVector,
	pointer: ScreenPoint,
	/// Connect source to return to once the drag is over.
	resume: Option<NodeId>,
}

impl DragSession {
	/// Where the dragged node should be drawn right now.
	pub fn preview(&self) -> ScreenPoint {
		self.pointer - self.grab
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum GestureState {
	#[default]
	Idle,
	Dragging(DragSession),
	ConnectPending(NodeId),
}

/// Node-level input, already hit-tested against the graph.
#[derive(Clone, Debug, PartialEq)]
pub enum Input {
	Tap(NodeId),
	/// Long press, or an explicit delete request.
	Delete(NodeId),
	DragStart {
		node: NodeId,
		origin: ScreenPoint,
		at: ScreenPoint,
	},
	DragMove(ScreenPoint),
	DragEnd(ScreenPoint),
	DragCancel,
	ClearSelection,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
	None,
	Selected(NodeId),
	SelectionCleared,
	Connected(EdgeId),
	ConnectFailed(GraphError),
	DragStarted(NodeId),
	DragRejected,
	Moved(NodeId),
	Deleted(NodeId),
}

#[derive(Clone, Debug)]
pub struct Step {
	pub state: GestureState,
	pub graph: Graph,
	pub effect: Effect,
}

impl GestureState {
	/// The highlighted node, if any.
	pub fn selected(&self) -> Option<&NodeId> {
		self.connect_from()
	}

	/// Source of the edge waiting for its second tap. A drag in between
	/// keeps it.
	pub fn connect_from(&self) -> Option<&NodeId> {
		match self {
			Self::ConnectPending(from) => Some(from),
			Self::Dragging(drag) => drag.resume.as_ref(),
			Self::Idle => None,
		}
	}

	pub fn drag(&self) -> Option<&DragSession> {
		match self {
			Self::Dragging(drag) => Some(drag),
			Self::Idle | Self::ConnectPending(_) => None,
		}
	}

	fn after_drag(resume: Option<NodeId>) -> Self {
		resume.map_or(Self::Idle, Self::ConnectPending)
	}

	pub fn step(self, graph: &Graph, viewport: &Viewport, input: Input) -> Step {
		let unchanged = |state| Step {
			state,
			graph: graph.clone(),
			effect: Effect::None,
		};

		match (self, input) {
			(_, Input::ClearSelection) => Step {
				state: Self::Idle,
				graph: graph.clone(),
				effect: Effect::SelectionCleared,
			},

			(state, Input::Delete(node)) => {
				let state = match state {
					Self::Dragging(drag) if drag.node == node => {
						debug!("deleted node {node} was being dragged, back to idle");
						Self::Idle
					}
					Self::Dragging(drag) if drag.resume.as_ref() == Some(&node) => {
						Self::Dragging(DragSession { resume: None, ..drag })
					}
					Self::ConnectPending(from) if from == node => {
						debug!("deleted node {node} was the connect source, back to idle");
						Self::Idle
					}
					state => state,
				};
				Step {
					state,
					graph: graph.delete_node(&node),
					effect: Effect::Deleted(node),
				}
			}

			(Self::Idle, Input::Tap(node)) if graph.contains_node(&node) => {
				debug!("connect pending from {node}");
				Step {
					state: Self::ConnectPending(node.clone()),
					graph: graph.clone(),
					effect: Effect::Selected(node),
				}
			}
			(Self::ConnectPending(from), Input::Tap(node)) if from == node => Step {
				state: Self::Idle,
				graph: graph.clone(),
				effect: Effect::SelectionCleared,
			},
			(Self::ConnectPending(from), Input::Tap(node)) => match graph.add_edge(&from, &node) {
				Ok((next, edge)) => Step {
					state: Self::Idle,
					graph: next,
					effect: Effect::Connected(edge),
				},
				Err(err) => {
					warn!("{err}");
					Step {
						state: Self::Idle,
						graph: graph.clone(),
						effect: Effect::ConnectFailed(err),
					}
				}
			},

			(state @ (Self::Idle | Self::ConnectPending(_)), Input::DragStart { node, origin, at }) => {
				let Some(anchor) = graph.node(&node).map(|n| viewport.to_screen(n.position()))
				else {
					return Step {
						state,
						graph: graph.clone(),
						effect: Effect::DragRejected,
					};
				};
				// Dragging the pending source itself drops the pending connect.
				let resume = state.connect_from().filter(|from| **from != node).cloned();
				debug!("dragging {node}");
				Step {
					state: Self::Dragging(DragSession {
						node: node.clone(),
						grab: origin - anchor,
						pointer: at,
						resume,
					}),
					graph: graph.clone(),
					effect: Effect::DragStarted(node),
				}
			}
			(state, Input::DragStart { node, .. }) => {
				debug!("drag of {node} rejected while {state:?}");
				Step {
					state,
					graph: graph.clone(),
					effect: Effect::DragRejected,
				}
			}
			(Self::Dragging(drag), Input::DragMove(at)) => unchanged(Self::Dragging(DragSession {
				pointer: at,
				..drag
			})),
			(Self::Dragging(drag), Input::DragEnd(at)) => {
				let drop = DragSession { pointer: at, ..drag };
				let target = viewport.to_model(drop.preview());
				Step {
					graph: graph.move_node(&drop.node, target),
					state: Self::after_drag(drop.resume),
					effect: Effect::Moved(drop.node),
				}
			}
			(Self::Dragging(drag), Input::DragCancel) => unchanged(Self::after_drag(drag.resume)),

			(state, _) => unchanged(state),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::EdgeRejection;
	use crate::graph::{ModelPoint, Node};

	fn graph() -> Graph {
		Graph::from_parts(
			None,
			[
				Node::new("n1".into(), ModelPoint::new(0.0, 0.0), "A"),
				Node::new("n2".into(), ModelPoint::new(100.0, 0.0), "B"),
			],
			[],
		)
		.unwrap()
	}

	fn run(state: GestureState, graph: &Graph, inputs: impl IntoIterator<Item = Input>) -> Step {
		let vp = Viewport::default();
		let mut step = Step {
			state,
			graph: graph.clone(),
			effect: Effect::None,
		};
		for input in inputs {
			step = step.state.step(&step.graph, &vp, input);
		}
		step
	}

	fn n(id: &str) -> NodeId {
		NodeId::new(id)
	}

	#[test]
	fn tap_selects_and_second_tap_cancels() {
		let g = graph();
		let step = run(GestureState::Idle, &g, [Input::Tap(n("n1"))]);
		assert_eq!(step.state, GestureState::ConnectPending(n("n1")));
		assert_eq!(step.state.selected(), Some(&n("n1")));

		let step = step.state.step(&step.graph, &Viewport::default(), Input::Tap(n("n1")));
		assert_eq!(step.state, GestureState::Idle);
		assert_eq!(step.state.selected(), None);
		assert_eq!(step.graph.edge_count(), 0);
		assert!(step.graph.same_snapshot(&g));
	}

	#[test]
	fn tap_then_other_node_connects() {
		let g = graph();
		let step = run(GestureState::Idle, &g, [Input::Tap(n("n1")), Input::Tap(n("n2"))]);
		assert_eq!(step.state, GestureState::Idle);
		assert_eq!(step.graph.edge_count(), 1);
		let edge = &step.graph.edges()[0];
		assert_eq!((&edge.from, &edge.to), (&n("n1"), &n("n2")));
		assert!(matches!(step.effect, Effect::Connected(_)));
	}

	#[test]
	fn failed_connect_still_returns_to_idle() {
		let (g, _) = graph().add_edge(&n("n2"), &n("n1")).unwrap();
		let step = run(GestureState::Idle, &g, [Input::Tap(n("n1")), Input::Tap(n("n2"))]);
		assert_eq!(step.state, GestureState::Idle);
		assert_eq!(step.graph.edge_count(), 1);
		assert!(matches!(
			step.effect,
			Effect::ConnectFailed(GraphError::InvalidEdge {
				reason: EdgeRejection::Duplicate,
				..
			})
		));
	}

	#[test]
	fn connect_to_vanished_node_fails_closed() {
		let g = graph();
		let step = run(
			GestureState::ConnectPending(n("n1")),
			&g,
			[Input::Tap(n("ghost"))],
		);
		assert_eq!(step.state, GestureState::Idle);
		assert!(step.graph.same_snapshot(&g));
	}

	#[test]
	fn tap_on_missing_node_while_idle_is_ignored() {
		let g = graph();
		let step = run(GestureState::Idle, &g, [Input::Tap(n("ghost"))]);
		assert_eq!(step.state, GestureState::Idle);
		assert_eq!(step.effect, Effect::None);
	}

	#[test]
	fn drag_moves_node_only_on_release() {
		let g = graph();
		let vp = Viewport::new(10.0, 10.0, 2.0);
		// n2 is drawn at (210, 10); grab it 5px right of its anchor.
		let step = GestureState::Idle.step(
			&g,
			&vp,
			Input::DragStart {
				node: n("n2"),
				origin: ScreenPoint::new(215.0, 10.0),
				at: ScreenPoint::new(225.0, 10.0),
			},
		);
		assert!(matches!(step.state, GestureState::Dragging(_)));
		let step = step.state.step(&step.graph, &vp, Input::DragMove(ScreenPoint::new(255.0, 30.0)));
		assert!(step.graph.same_snapshot(&g));
		assert_eq!(
			step.state.drag().map(DragSession::preview),
			Some(ScreenPoint::new(250.0, 30.0))
		);

		let step = step.state.step(&step.graph, &vp, Input::DragEnd(ScreenPoint::new(255.0, 30.0)));
		assert_eq!(step.state, GestureState::Idle);
		assert_eq!(step.graph.node(&n("n2")).unwrap().position(), ModelPoint::new(120.0, 10.0));
		assert_eq!(step.graph.node(&n("n1")).unwrap().position(), ModelPoint::new(0.0, 0.0));
	}

	#[test]
	fn second_drag_start_is_rejected() {
		let g = graph();
		let start = |node: &str| Input::DragStart {
			node: n(node),
			origin: ScreenPoint::origin(),
			at: ScreenPoint::new(20.0, 0.0),
		};
		let step = run(GestureState::Idle, &g, [start("n1"), start("n2")]);
		assert_eq!(step.effect, Effect::DragRejected);
		assert_eq!(step.state.drag().map(|d| &d.node), Some(&n("n1")));
	}

	#[test]
	fn drag_during_pending_connect_keeps_source() {
		let g = graph();
		let step = run(
			GestureState::ConnectPending(n("n1")),
			&g,
			[Input::DragStart {
				node: n("n2"),
				origin: ScreenPoint::new(100.0, 0.0),
				at: ScreenPoint::new(130.0, 0.0),
			}],
		);
		assert_eq!(step.effect, Effect::DragStarted(n("n2")));
		assert_eq!(step.state.selected(), Some(&n("n1")));

		let step = step.state.step(&step.graph, &Viewport::default(), Input::DragEnd(ScreenPoint::new(140.0, 20.0)));
		assert_eq!(step.state, GestureState::ConnectPending(n("n1")));
		assert_eq!(step.graph.node(&n("n2")).unwrap().position(), ModelPoint::new(140.0, 20.0));

		let step = step.state.step(&step.graph, &Viewport::default(), Input::Tap(n("n2")));
		assert!(matches!(step.effect, Effect::Connected(_)));
	}

	#[test]
	fn cancelled_drag_during_pending_connect_keeps_source() {
		let g = graph();
		let step = run(
			GestureState::ConnectPending(n("n1")),
			&g,
			[
				Input::DragStart {
					node: n("n2"),
					origin: ScreenPoint::new(100.0, 0.0),
					at: ScreenPoint::new(130.0, 0.0),
				},
				Input::DragCancel,
			],
		);
		assert_eq!(step.state, GestureState::ConnectPending(n("n1")));
		assert!(step.graph.same_snapshot(&g));
	}

	#[test]
	fn dragging_the_pending_source_clears_it() {
		let g = graph();
		let step = run(
			GestureState::ConnectPending(n("n1")),
			&g,
			[
				Input::DragStart {
					node: n("n1"),
					origin: ScreenPoint::origin(),
					at: ScreenPoint::new(30.0, 0.0),
				},
				Input::DragEnd(ScreenPoint::new(30.0, 0.0)),
			],
		);
		assert_eq!(step.state, GestureState::Idle);
		assert_eq!(step.graph.node(&n("n1")).unwrap().position(), ModelPoint::new(30.0, 0.0));
	}

	#[test]
	fn deleting_pending_source_mid_drag_drops_it() {
		let g = graph();
		let step = run(
			GestureState::ConnectPending(n("n1")),
			&g,
			[
				Input::DragStart {
					node: n("n2"),
					origin: ScreenPoint::new(100.0, 0.0),
					at: ScreenPoint::new(130.0, 0.0),
				},
				Input::Delete(n("n1")),
			],
		);
		assert_eq!(step.state.drag().map(|d| &d.node), Some(&n("n2")));
		assert_eq!(step.state.selected(), None);

		let step = step.state.step(&step.graph, &Viewport::default(), Input::DragEnd(ScreenPoint::new(130.0, 0.0)));
		assert_eq!(step.state, GestureState::Idle);
	}

	#[test]
	fn cancelled_drag_leaves_graph_alone() {
		let g = graph();
		let step = run(
			GestureState::Idle,
			&g,
			[
				Input::DragStart {
					node: n("n1"),
					origin: ScreenPoint::origin(),
					at: ScreenPoint::new(40.0, 0.0),
				},
				Input::DragCancel,
			],
		);
		assert_eq!(step.state, GestureState::Idle);
		assert!(step.graph.same_snapshot(&g));
	}

	#[test]
	fn deleting_the_subject_forces_idle() {
		let g = graph();
		let step = run(
			GestureState::ConnectPending(n("n1")),
			&g,
			[Input::Delete(n("n1"))],
		);
		assert_eq!(step.state, GestureState::Idle);
		assert!(!step.graph.contains_node(&n("n1")));

		let dragging = run(
			GestureState::Idle,
			&g,
			[
				Input::DragStart {
					node: n("n2"),
					origin: ScreenPoint::new(100.0, 0.0),
					at: ScreenPoint::new(120.0, 0.0),
				},
				Input::Delete(n("n2")),
			],
		);
		assert_eq!(dragging.state, GestureState::Idle);
	}

	#[test]
	fn deleting_another_node_keeps_pending_connect() {
		let g = graph();
		let step = run(
			GestureState::ConnectPending(n("n1")),
			&g,
			[Input::Delete(n("n2"))],
		);
		assert_eq!(step.state, GestureState::ConnectPending(n("n1")));
		assert_eq!(step.graph.node_count(), 1);
	}

	#[test]
	fn clear_selection_discards_everything_but_graph() {
		let g = graph();
		for state in [
			GestureState::Idle,
			GestureState::ConnectPending(n("n1")),
			run(
				GestureState::Idle,
				&g,
				[Input::DragStart {
					node: n("n1"),
					origin: ScreenPoint::origin(),
					at: ScreenPoint::new(30.0, 0.0),
				}],
			)
			.state,
		] {
			let step = run(state, &g, [Input::ClearSelection]);
			assert_eq!(step.state, GestureState::Idle);
			assert!(step.graph.same_snapshot(&g));
		}
	}
}
