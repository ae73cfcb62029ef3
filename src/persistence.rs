//! JSON export/import and saved-map storage.
//!
//! Shape: `{"name"?: string, "nodes": {"<id>": {id, x, y, text}}, "edges": [{id, from, to}]}`.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

use crate::error::PersistError;
use crate::graph::{Edge, Graph, Node};

/// The one key a map is saved under.
pub const STORAGE_KEY: &str = "papermind_map_v1";

#[derive(Serialize)]
struct DocumentRef<'a> {
	#[serde(skip_serializing_if = "Option::is_none")]
	name: Option<&'a str>,
	nodes: BTreeMap<&'a str, &'a Node>,
	edges: &'a [Edge],
}

#[derive(Deserialize)]
struct Document {
	#[serde(default)]
	name: Option<String>,
	nodes: BTreeMap<String, Node>,
	#[serde(default)]
	edges: Vec<Edge>,
}

pub fn export_text(graph: &Graph) -> Result<String, PersistError> {
	let doc = DocumentRef {
		name: graph.name(),
		nodes: graph.nodes().map(|n| (n.id.as_str(), n)).collect(),
		edges: graph.edges(),
	};
	Ok(serde_json::to_string(&doc)?)
}

pub fn import_text(text: &str) -> Result<Graph, PersistError> {
	let doc: Document = serde_json::from_str(text)?;
	if let Some((key, node)) = doc.nodes.iter().find(|(key, node)| *key != node.id.as_str()) {
		return Err(PersistError::Parse(format!(
			"node stored under `{key}` has id `{}`",
			node.id
		)));
	}
	let graph = Graph::from_parts(doc.name, doc.nodes.into_values(), doc.edges)?;
	let dangling = graph.dangling_edges().count();
	if dangling > 0 {
		warn!("imported map has {dangling} edge(s) to missing nodes");
	}
	Ok(graph)
}

/// Key/value text storage a map can be saved to.
pub trait MapStorage {
	fn read(&self, key: &str) -> Result<Option<String>, PersistError>;
	fn write(&self, key: &str, text: &str) -> Result<(), PersistError>;
}

impl<S: MapStorage + ?Sized> MapStorage for Box<S> {
	fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
		(**self).read(key)
	}

	fn write(&self, key: &str, text: &str) -> Result<(), PersistError> {
		(**self).write(key, text)
	}
}

/// In-process storage, for headless use and tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
	entries: RefCell<HashMap<String, String>>,
}

impl MapStorage for MemoryStorage {
	fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
		Ok(self.entries.borrow().get(key).cloned())
	}

	fn write(&self, key: &str, text: &str) -> Result<(), PersistError> {
		self.entries.borrow_mut().insert(key.into(), text.into());
		Ok(())
	}
}

/// The browser's `window.localStorage`.
pub struct BrowserStorage(web_sys::Storage);

fn js_error(err: JsValue) -> PersistError {
	PersistError::Storage(format!("{err:?}"))
}

impl BrowserStorage {
	pub fn local() -> Result<Self, PersistError> {
		let window =
			web_sys::window().ok_or_else(|| PersistError::Storage("no window".into()))?;
		window
			.local_storage()
			.map_err(js_error)?
			.map(Self)
			.ok_or_else(|| PersistError::Storage("localStorage unavailable".into()))
	}
}

impl MapStorage for BrowserStorage {
	fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
		self.0.get_item(key).map_err(js_error)
	}

	fn write(&self, key: &str, text: &str) -> Result<(), PersistError> {
		self.0.set_item(key, text).map_err(js_error)
	}
}

/// A storage backend bound to the installation's map key.
pub struct Persistence<S> {
	storage: S,
	key: String,
}

impl<S: MapStorage> Persistence<S> {
	pub fn new(storage: S, key: impl Into<String>) -> Self {
		Self {
			storage,
			key: key.into(),
		}
	}

	/// Overwrite the saved map with `graph`.
	pub fn save(&self, graph: &Graph) -> Result<(), PersistError> {
		let text = export_text(graph)?;
		self.storage.write(&self.key, &text)?;
		info!(
			"saved map ({} nodes, {} edges) under {}",
			graph.node_count(),
			graph.edge_count(),
			self.key
		);
		Ok(())
	}

	/// The saved map, or `None` when nothing has been saved yet.
	pub fn load(&self) -> Result<Option<Graph>, PersistError> {
		let Some(text) = self.storage.read(&self.key)? else {
			return Ok(None);
		};
		let graph = import_text(&text)?;
		info!("loaded map with {} nodes", graph.node_count());
		Ok(Some(graph))
	}

	/// The saved map, falling back to [`Graph::skeleton`] when there is none
	/// or it cannot be read.
	pub fn load_or_skeleton(&self) -> Graph {
		match self.load() {
			Ok(Some(graph)) => graph,
			Ok(None) => Graph::skeleton(),
			Err(err) => {
				warn!("could not load saved map: {err}");
				Graph::skeleton()
			}
		}
	}
}
