use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::warn;
use web_sys::{Event, MouseEvent};

use crate::components::mind_map::MindMapCanvas;
use crate::config::EditorConfig;
use crate::editor::Editor;
use crate::graph::Graph;
use crate::persistence::{BrowserStorage, MapStorage, MemoryStorage, Persistence};

const EXPORT_PREVIEW_CHARS: usize = 200;
const FALLBACK_NAME: &str = "My PaperMind";

fn alert(title: &str, message: &str) {
	if let Some(window) = web_sys::window() {
		let _ = window.alert_with_message(&format!("{title}\n\n{message}"));
	}
}

fn prompt(message: &str) -> Option<String> {
	web_sys::window()?.prompt_with_message(message).ok()?
}

/// First `limit` characters of `text`, with an ellipsis when cut short.
fn preview(text: &str, limit: usize) -> String {
	let mut out: String = text.chars().take(limit).collect();
	if text.chars().nth(limit).is_some() {
		out.push('…');
	}
	out
}

fn open_storage() -> Box<dyn MapStorage> {
	match BrowserStorage::local() {
		Ok(storage) => Box::new(storage),
		Err(err) => {
			warn!("{err}; changes will not survive a reload");
			Box::new(MemoryStorage::default())
		}
	}
}

/// Editor screen: toolbar, map canvas and map-name field.
#[component]
pub fn Home() -> impl IntoView {
	let config = EditorConfig::default();
	let persistence = Rc::new(Persistence::new(open_storage(), config.storage_key.clone()));
	let editor = Rc::new(RefCell::new(Editor::new(
		persistence.load_or_skeleton(),
		config,
	)));

	let summary = |g: &Graph| {
		(
			g.name().map(str::to_string),
			g.node_count(),
			g.edge_count(),
		)
	};
	let (initial_name, nodes, edges) = summary(editor.borrow().graph());
	let (name, set_name) = signal(initial_name);
	let (counts, set_counts) = signal((nodes, edges));
	editor.borrow_mut().subscribe(move |g| {
		let (n, nodes, edges) = summary(g);
		set_name.set(n);
		set_counts.set((nodes, edges));
	});

	let editor_add = editor.clone();
	let on_add = move |_: MouseEvent| {
		editor_add.borrow_mut().add_node(None);
	};

	let editor_clear = editor.clone();
	let on_clear = move |_: MouseEvent| editor_clear.borrow_mut().clear_selection();

	let (editor_save, persistence_save) = (editor.clone(), persistence.clone());
	let on_save = move |_: MouseEvent| match persistence_save.save(editor_save.borrow().graph()) {
		Ok(()) => alert("Saved", "Map saved locally."),
		Err(err) => {
			warn!("save failed: {err}");
			alert("Error", "Could not save the map.");
		}
	};

	let editor_export = editor.clone();
	let on_export = move |_: MouseEvent| match editor_export.borrow().export_text() {
		Ok(text) => alert("Export JSON", &preview(&text, EXPORT_PREVIEW_CHARS)),
		Err(err) => {
			warn!("export failed: {err}");
			alert("Error", "Could not export the map.");
		}
	};

	let editor_import = editor.clone();
	let on_import = move |_: MouseEvent| {
		let Some(text) = prompt("Paste JSON of a map to import") else {
			return;
		};
		let result = editor_import.borrow_mut().import_text(&text);
		match result {
			Ok(()) => alert("Imported", "Map replaced."),
			Err(err) => {
				warn!("import rejected: {err}");
				alert("Error", "Invalid JSON");
			}
		}
	};

	let editor_name = editor.clone();
	let on_name = move |ev: Event| {
		let value = event_target_value(&ev);
		editor_name.borrow_mut().rename(Some(value));
	};

	view! {
		<div class="fullscreen-map">
			<MindMapCanvas editor=editor fullscreen=true />
			<div class="map-overlay">
				<h1>{move || name.get().unwrap_or_else(|| FALLBACK_NAME.to_string())}</h1>
				<div class="controls">
					<button on:click=on_add>"Add Node"</button>
					<button on:click=on_clear>"Clear Sel"</button>
					<button on:click=on_save>"Save"</button>
					<button on:click=on_export>"Export"</button>
					<button on:click=on_import>"Import"</button>
				</div>
				<p class="subtitle">
					{move || {
						let (nodes, edges) = counts.get();
						format!("{nodes} nodes, {edges} links")
					}}
					" · Tap two nodes to link them. Long-press to delete. Drag to move."
				</p>
			</div>
			<div class="map-footer">
				<input
					class="map-name"
					placeholder=FALLBACK_NAME
					prop:value=move || name.get().unwrap_or_default()
					on:input=on_name
				/>
			</div>
		</div>
	}
}
