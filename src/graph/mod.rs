//! Canonical node/edge data for a mind map.
//!
//! A [`Graph`] is an immutable snapshot. Every mutation in [`store`] returns a
//! new snapshot that shares untouched nodes with its parent, so the
//! presentation layer can tell whether anything changed with
//! [`Graph::same_snapshot`] instead of comparing contents.

use std::collections::BTreeMap;
use std::sync::Arc;

mod store;
mod types;

pub use types::{
	DEFAULT_LABEL, Edge, EdgeId, ModelPoint, ModelSize, ModelSpace, Node, NodeId, ScreenPoint,
	ScreenSpace, ScreenVector,
};

use crate::error::GraphError;

/// Monotonic id counters. Rebuilt from the ids present whenever a graph is
/// assembled from outside data, so generated ids never repeat within a graph.
#[derive(Clone, Copy, Debug)]
struct IdAllocator {
	next_node: u64,
	next_edge: u64,
}

impl Default for IdAllocator {
	fn default() -> Self {
		Self {
			next_node: 1,
			next_edge: 1,
		}
	}
}

impl IdAllocator {
	fn rebuilt<'a>(
		node_ids: impl Iterator<Item = &'a str>,
		edge_ids: impl Iterator<Item = &'a str>,
	) -> Self {
		fn next_after<'a>(prefix: char, ids: impl Iterator<Item = &'a str>) -> u64 {
			ids.filter_map(|id| id.strip_prefix(prefix)?.parse::<u64>().ok())
				.max()
				.map_or(1, |n| n.saturating_add(1))
		}

		Self {
			next_node: next_after('n', node_ids),
			next_edge: next_after('e', edge_ids),
		}
	}

	/// First free `<prefix><counter>` id. A counter that runs out wraps to 1
	/// and keeps scanning, so this terminates for any finite graph.
	fn allocate(prefix: char, next: &mut u64, taken: impl Fn(&str) -> bool) -> String {
		loop {
			let candidate = format!("{prefix}{next}");
			*next = next.checked_add(1).unwrap_or(1);
			if !taken(&candidate) {
				return candidate;
			}
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct Graph {
	name: Option<String>,
	nodes: Arc<BTreeMap<NodeId, Arc<Node>>>,
	edges: Arc<Vec<Edge>>,
	ids: IdAllocator,
}

/// Structural equality: name, nodes and edges. Id counters are bookkeeping
/// and do not take part.
impl PartialEq for Graph {
	fn eq(&self, other: &Self) -> bool {
		self.name == other.name && self.nodes == other.nodes && self.edges == other.edges
	}
}

impl Graph {
	/// Assemble a graph from outside data (storage, import).
	///
	/// Node and edge ids must be unique. Edges may reference missing nodes;
	/// those are tolerated and skipped by [`Graph::resolved_edges`].
	pub fn from_parts(
		name: Option<String>,
		nodes: impl IntoIterator<Item = Node>,
		edges: impl IntoIterator<Item = Edge>,
	) -> Result<Self, GraphError> {
		let mut node_map = BTreeMap::new();
		for node in nodes {
			if node_map.contains_key(&node.id) {
				return Err(GraphError::DuplicateId(node.id.to_string()));
			}
			node_map.insert(node.id.clone(), Arc::new(node));
		}

		let mut edge_list: Vec<Edge> = Vec::new();
		for edge in edges {
			if edge_list.iter().any(|e| e.id == edge.id) {
				return Err(GraphError::DuplicateId(edge.id.to_string()));
			}
			edge_list.push(edge);
		}

		let ids = IdAllocator::rebuilt(
			node_map.keys().map(NodeId::as_str),
			edge_list.iter().map(|e| e.id.as_str()),
		);
		Ok(Self {
			name,
			nodes: Arc::new(node_map),
			edges: Arc::new(edge_list),
			ids,
		})
	}

	/// The map shown on first start, before anything has been saved.
	pub fn skeleton() -> Self {
		let root = Node::new(
			NodeId::new("n1"),
			ModelPoint::new(150.0, 200.0),
			"PaperMind",
		);
		let mut nodes = BTreeMap::new();
		nodes.insert(root.id.clone(), Arc::new(root));
		Self {
			name: Some("PaperMind root".into()),
			nodes: Arc::new(nodes),
			edges: Arc::default(),
			ids: IdAllocator {
				next_node: 2,
				next_edge: 1,
			},
		}
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	pub fn node(&self, id: &NodeId) -> Option<&Node> {
		self.nodes.get(id).map(Arc::as_ref)
	}

	pub fn contains_node(&self, id: &NodeId) -> bool {
		self.nodes.contains_key(id)
	}

	/// Nodes in drawing order.
	pub fn nodes(&self) -> impl Iterator<Item = &Node> {
		self.nodes.values().map(Arc::as_ref)
	}

	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	/// Edges whose endpoints both exist, paired with those endpoints.
	pub fn resolved_edges(&self) -> impl Iterator<Item = (&Edge, &Node, &Node)> {
		self.edges.iter().filter_map(|edge| {
			let from = self.node(&edge.from)?;
			let to = self.node(&edge.to)?;
			Some((edge, from, to))
		})
	}

	/// Edges pointing at a node that is not in the graph.
	pub fn dangling_edges(&self) -> impl Iterator<Item = &Edge> {
		self.edges
			.iter()
			.filter(|e| !self.contains_node(&e.from) || !self.contains_node(&e.to))
	}

	/// Topmost node whose box contains `point`.
	pub fn node_at(&self, point: ModelPoint, half_extent: ModelSize) -> Option<&Node> {
		self.nodes
			.values()
			.rev()
			.map(Arc::as_ref)
			.find(|node| node.contains(point, half_extent))
	}

	/// Whether `other` is this very snapshot rather than a structural copy.
	pub fn same_snapshot(&self, other: &Graph) -> bool {
		Arc::ptr_eq(&self.nodes, &other.nodes)
			&& Arc::ptr_eq(&self.edges, &other.edges)
			&& self.name == other.name
	}
}
