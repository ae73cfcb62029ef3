//! Pure graph operations. None of them touches `self`; each returns the next
//! snapshot, or `self` unchanged when there is nothing to do.

use std::sync::Arc;

use log::{debug, warn};

use super::{DEFAULT_LABEL, Edge, EdgeId, Graph, IdAllocator, ModelPoint, Node, NodeId};
use crate::error::{EdgeRejection, GraphError};

fn finite(at: ModelPoint) -> bool {
	at.x.is_finite() && at.y.is_finite()
}

impl Graph {
	/// Append a node labelled [`DEFAULT_LABEL`] at `at` under a fresh id.
	pub fn add_node(&self, at: ModelPoint) -> Result<(Graph, NodeId), GraphError> {
		let at = if finite(at) {
			at
		} else {
			warn!("non-finite node position {at:?}, placing at origin");
			ModelPoint::origin()
		};

		let mut ids = self.ids;
		let id = NodeId::new(IdAllocator::allocate('n', &mut ids.next_node, |id| {
			self.contains_node(&NodeId::new(id))
		}));

		let mut next = self.insert_node(Node::new(id.clone(), at, DEFAULT_LABEL))?;
		next.ids = ids;
		debug!("added node {id} at ({}, {})", at.x, at.y);
		Ok((next, id))
	}

	fn insert_node(&self, node: Node) -> Result<Graph, GraphError> {
		if self.contains_node(&node.id) {
			return Err(GraphError::DuplicateId(node.id.to_string()));
		}
		let mut nodes = (*self.nodes).clone();
		nodes.insert(node.id.clone(), Arc::new(node));
		Ok(Graph {
			nodes: Arc::new(nodes),
			..self.clone()
		})
	}

	fn replace_node(&self, id: &NodeId, edit: impl FnOnce(&mut Node)) -> Graph {
		let Some(current) = self.nodes.get(id) else {
			return self.clone();
		};
		let mut node = Node::clone(current);
		edit(&mut node);
		let mut nodes = (*self.nodes).clone();
		nodes.insert(id.clone(), Arc::new(node));
		Graph {
			nodes: Arc::new(nodes),
			..self.clone()
		}
	}

	/// Reposition a node. Unknown ids and non-finite positions are no-ops.
	pub fn move_node(&self, id: &NodeId, to: ModelPoint) -> Graph {
		if !finite(to) {
			warn!("ignoring non-finite move of {id} to {to:?}");
			return self.clone();
		}
		self.replace_node(id, |node| {
			node.x = to.x;
			node.y = to.y;
		})
	}

	pub fn set_node_text(&self, id: &NodeId, text: impl Into<String>) -> Graph {
		let text = text.into();
		self.replace_node(id, |node| node.text = text)
	}

	pub fn rename(&self, name: Option<String>) -> Graph {
		Graph {
			name,
			..self.clone()
		}
	}

	/// Remove a node together with every edge that references it.
	pub fn delete_node(&self, id: &NodeId) -> Graph {
		if !self.contains_node(id) {
			return self.clone();
		}
		let mut nodes = (*self.nodes).clone();
		nodes.remove(id);

		let edges = if self.edges.iter().any(|e| e.touches(id)) {
			Arc::new(
				self.edges
					.iter()
					.filter(|e| !e.touches(id))
					.cloned()
					.collect(),
			)
		} else {
			Arc::clone(&self.edges)
		};

		debug!("deleted node {id}");
		Graph {
			nodes: Arc::new(nodes),
			edges,
			..self.clone()
		}
	}

	/// Link two existing, distinct, not yet linked nodes.
	pub fn add_edge(&self, from: &NodeId, to: &NodeId) -> Result<(Graph, EdgeId), GraphError> {
		let reject = |reason| GraphError::InvalidEdge {
			from: from.clone(),
			to: to.clone(),
			reason,
		};
		if !self.contains_node(from) || !self.contains_node(to) {
			return Err(reject(EdgeRejection::MissingNode));
		}
		if from == to {
			return Err(reject(EdgeRejection::SelfLoop));
		}
		if self.edges.iter().any(|e| e.links(from, to)) {
			return Err(reject(EdgeRejection::Duplicate));
		}

		let mut ids = self.ids;
		let id = EdgeId::new(IdAllocator::allocate('e', &mut ids.next_edge, |id| {
			self.edges.iter().any(|e| e.id.as_str() == id)
		}));

		let mut edges = (*self.edges).clone();
		edges.push(Edge {
			id: id.clone(),
			from: from.clone(),
			to: to.clone(),
		});
		debug!("added edge {id}: {from} -> {to}");
		Ok((
			Graph {
				edges: Arc::new(edges),
				ids,
				..self.clone()
			},
			id,
		))
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use proptest::prelude::*;
	use rstest::rstest;

	use super::*;
	use crate::graph::ModelSize;
	use crate::graph::strategies::arb_graph;

	fn single(id: &str, x: f64, y: f64, text: &str) -> Graph {
		Graph::from_parts(
			None,
			[Node::new(NodeId::new(id), ModelPoint::new(x, y), text)],
			[],
		)
		.unwrap()
	}

	fn two_nodes() -> (Graph, NodeId, NodeId) {
		let g = single("n1", 0.0, 0.0, "A");
		let (g, b) = g.add_node(ModelPoint::new(10.0, 10.0)).unwrap();
		(g, NodeId::new("n1"), b)
	}

	#[test]
	fn add_node_uses_default_label_and_position() {
		let (g, id) = Graph::default().add_node(ModelPoint::new(3.0, 4.0)).unwrap();
		let node = g.node(&id).unwrap();
		assert_eq!(node.text, DEFAULT_LABEL);
		assert_eq!(node.position(), ModelPoint::new(3.0, 4.0));
	}

	#[test]
	fn add_node_leaves_input_untouched() {
		let g = single("n1", 0.0, 0.0, "A");
		let before = g.clone();
		let (next, _) = g.add_node(ModelPoint::new(1.0, 1.0)).unwrap();
		assert_eq!(g, before);
		assert_eq!(g.node_count(), 1);
		assert_eq!(next.node_count(), 2);
	}

	#[test]
	fn generated_ids_skip_imported_ones() {
		let g = Graph::from_parts(
			None,
			[
				Node::new("n2".into(), ModelPoint::origin(), "x"),
				Node::new("n7".into(), ModelPoint::origin(), "y"),
				Node::new("nq3k".into(), ModelPoint::origin(), "z"),
			],
			[],
		)
		.unwrap();
		let (g, id) = g.add_node(ModelPoint::origin()).unwrap();
		assert_eq!(id.as_str(), "n8");
		assert_eq!(g.node_count(), 4);
	}

	#[test]
	fn counters_at_their_limit_wrap_to_free_ids() {
		let top = format!("n{}", u64::MAX);
		let top_edge = format!("e{}", u64::MAX);
		let g = Graph::from_parts(
			None,
			[
				Node::new(NodeId::new(top.as_str()), ModelPoint::origin(), "max"),
				Node::new("n1".into(), ModelPoint::origin(), "one"),
			],
			[Edge {
				id: EdgeId::new(top_edge.as_str()),
				from: NodeId::new(top.as_str()),
				to: "n1".into(),
			}],
		)
		.unwrap();

		let (g, a) = g.add_node(ModelPoint::origin()).unwrap();
		let (g, b) = g.add_node(ModelPoint::origin()).unwrap();
		assert_eq!((a.as_str(), b.as_str()), ("n2", "n3"));
		assert_eq!(g.node_count(), 4);

		let (g, edge) = g.add_edge(&a, &b).unwrap();
		assert_eq!(edge.as_str(), "e1");
		assert_eq!(g.edge_count(), 2);
	}

	#[test]
	fn ids_are_never_reused_after_delete() {
		let (g, first) = Graph::default().add_node(ModelPoint::origin()).unwrap();
		let g = g.delete_node(&first);
		let (_, second) = g.add_node(ModelPoint::origin()).unwrap();
		assert_ne!(first, second);
	}

	#[test]
	fn untouched_nodes_are_shared_between_snapshots() {
		let (g, a, b) = two_nodes();
		let moved = g.move_node(&b, ModelPoint::new(5.0, 5.0));
		assert!(Arc::ptr_eq(&g.nodes[&a], &moved.nodes[&a]));
		assert!(!Arc::ptr_eq(&g.nodes[&b], &moved.nodes[&b]));
	}

	#[test]
	fn move_of_missing_node_is_same_snapshot() {
		let (g, _, _) = two_nodes();
		let next = g.move_node(&NodeId::new("ghost"), ModelPoint::new(1.0, 1.0));
		assert!(next.same_snapshot(&g));
	}

	#[test]
	fn move_rejects_non_finite_positions() {
		let (g, a, _) = two_nodes();
		let next = g.move_node(&a, ModelPoint::new(f64::NAN, 1.0));
		assert!(next.same_snapshot(&g));
	}

	#[test]
	fn set_node_text_relabels() {
		let (g, a, _) = two_nodes();
		let g = g.set_node_text(&a, "Idea");
		assert_eq!(g.node(&a).unwrap().text, "Idea");
	}

	#[test]
	fn add_edge_adds_exactly_one() {
		let (g, a, b) = two_nodes();
		let (next, id) = g.add_edge(&a, &b).unwrap();
		assert_eq!(next.edge_count(), g.edge_count() + 1);
		let edge = next.edges().iter().find(|e| e.id == id).unwrap();
		assert_eq!((&edge.from, &edge.to), (&a, &b));
	}

	#[rstest]
	#[case::missing_source("ghost", "n1", EdgeRejection::MissingNode)]
	#[case::missing_target("n1", "ghost", EdgeRejection::MissingNode)]
	#[case::self_loop("n1", "n1", EdgeRejection::SelfLoop)]
	#[case::duplicate("n1", "n2", EdgeRejection::Duplicate)]
	#[case::reverse_duplicate("n2", "n1", EdgeRejection::Duplicate)]
	fn add_edge_rejects(#[case] from: &str, #[case] to: &str, #[case] expected: EdgeRejection) {
		let (g, a, b) = two_nodes();
		let (g, _) = g.add_edge(&a, &b).unwrap();
		match g.add_edge(&NodeId::new(from), &NodeId::new(to)) {
			Err(GraphError::InvalidEdge { reason, .. }) => assert_eq!(reason, expected),
			other => panic!("expected rejection, got {other:?}"),
		}
	}

	#[test]
	fn delete_node_purges_its_edges() {
		let (g, a, b) = two_nodes();
		let (g, c) = g.add_node(ModelPoint::new(20.0, 0.0)).unwrap();
		let (g, _) = g.add_edge(&a, &b).unwrap();
		let (g, _) = g.add_edge(&c, &a).unwrap();
		let (g, kept) = g.add_edge(&b, &c).unwrap();

		let g = g.delete_node(&a);
		assert!(!g.contains_node(&a));
		assert_eq!(g.edge_count(), 1);
		assert_eq!(g.edges()[0].id, kept);
		assert_eq!(g.dangling_edges().count(), 0);
	}

	#[test]
	fn dangling_edges_are_skipped_when_resolving() {
		let g = Graph::from_parts(
			None,
			[Node::new("n1".into(), ModelPoint::origin(), "A")],
			[Edge {
				id: "e1".into(),
				from: "n1".into(),
				to: "gone".into(),
			}],
		)
		.unwrap();
		assert_eq!(g.resolved_edges().count(), 0);
		assert_eq!(g.dangling_edges().count(), 1);
	}

	#[test]
	fn from_parts_rejects_duplicate_ids() {
		let node = Node::new("n1".into(), ModelPoint::origin(), "A");
		assert_eq!(
			Graph::from_parts(None, [node.clone(), node], []),
			Err(GraphError::DuplicateId("n1".into()))
		);
	}

	#[test]
	fn node_at_prefers_topmost() {
		let g = Graph::from_parts(
			None,
			[
				Node::new("a".into(), ModelPoint::new(0.0, 0.0), "A"),
				Node::new("b".into(), ModelPoint::new(10.0, 0.0), "B"),
			],
			[],
		)
		.unwrap();
		let half = ModelSize::new(50.0, 18.0);
		assert_eq!(g.node_at(ModelPoint::new(5.0, 0.0), half).unwrap().id.as_str(), "b");
		assert_eq!(g.node_at(ModelPoint::new(-45.0, 0.0), half).unwrap().id.as_str(), "a");
		assert!(g.node_at(ModelPoint::new(0.0, 40.0), half).is_none());
	}

	#[test]
	fn editing_scenario() {
		let g = single("n1", 0.0, 0.0, "A");
		let n1 = NodeId::new("n1");

		let (g, new_id) = g.add_node(ModelPoint::new(10.0, 10.0)).unwrap();
		assert_eq!(g.node_count(), 2);

		let (g, _) = g.add_edge(&n1, &new_id).unwrap();
		assert_eq!(g.edge_count(), 1);

		let edge_before = g.edges()[0].clone();
		let g = g.move_node(&new_id, ModelPoint::new(5.0, 5.0));
		assert_eq!(g.node(&new_id).unwrap().position(), ModelPoint::new(5.0, 5.0));
		assert_eq!(g.edges()[0], edge_before);

		let g = g.delete_node(&n1);
		assert_eq!(g.node_count(), 1);
		assert_eq!(g.edge_count(), 0);
		assert!(g.contains_node(&new_id));
	}

	proptest! {
		#[test]
		fn delete_undoes_add(g in arb_graph(), x in -1.0e4..1.0e4f64, y in -1.0e4..1.0e4f64) {
			let (grown, id) = g.add_node(ModelPoint::new(x, y)).unwrap();
			prop_assert_eq!(grown.delete_node(&id), g);
		}

		#[test]
		fn delete_leaves_no_reference(g in arb_graph(), pick in 0usize..12) {
			let Some(id) = g.nodes().nth(pick).map(|n| n.id.clone()) else {
				return Ok(());
			};
			let next = g.delete_node(&id);
			prop_assert!(!next.contains_node(&id));
			prop_assert!(next.edges().iter().all(|e| !e.touches(&id)));
			prop_assert_eq!(next.node_count(), g.node_count() - 1);
		}

		#[test]
		fn ids_stay_unique(g in arb_graph(), extra in 1usize..8) {
			let before = g.node_count();
			let mut g = g;
			for _ in 0..extra {
				g = g.add_node(ModelPoint::origin()).unwrap().0;
			}
			prop_assert_eq!(g.node_count(), before + extra);
			let edge_ids: HashSet<_> = g.edges().iter().map(|e| e.id.clone()).collect();
			prop_assert_eq!(edge_ids.len(), g.edge_count());
		}
	}
}
