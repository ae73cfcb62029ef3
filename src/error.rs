//! Error values surfaced by the graph store and the persistence boundary.

use std::fmt;

use thiserror::Error;

use crate::graph::NodeId;

/// Why an edge could not be added.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeRejection {
	/// One of the endpoints is not in the graph.
	MissingNode,
	/// Both endpoints are the same node.
	SelfLoop,
	/// The two nodes are already linked, in either direction.
	Duplicate,
}

impl fmt::Display for EdgeRejection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::MissingNode => "endpoint does not exist",
			Self::SelfLoop => "a node cannot link to itself",
			Self::Duplicate => "nodes are already linked",
		})
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GraphError {
	#[error("cannot link {from} to {to}: {reason}")]
	InvalidEdge {
		from: NodeId,
		to: NodeId,
		reason: EdgeRejection,
	},
	/// An id was about to be inserted twice. Id allocation makes this
	/// unreachable for generated ids; imported documents can still hit it.
	#[error("id `{0}` is already in use")]
	DuplicateId(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PersistError {
	#[error("storage failure: {0}")]
	Storage(String),
	#[error("invalid map document: {0}")]
	Parse(String),
}

impl From<serde_json::Error> for PersistError {
	fn from(err: serde_json::Error) -> Self {
		Self::Parse(err.to_string())
	}
}

impl From<GraphError> for PersistError {
	fn from(err: GraphError) -> Self {
		Self::Parse(err.to_string())
	}
}
