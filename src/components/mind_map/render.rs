use web_sys::CanvasRenderingContext2d;

use crate::editor::Editor;
use crate::graph::{ModelPoint, Node};

const BACKGROUND: &str = "#ffffff";
const EDGE_COLOR: &str = "#999999";
const NODE_FILL: &str = "#ffffff";
const SELECTED_FILL: &str = "#ffffdd";
const NODE_BORDER: &str = "#cccccc";
const LABEL_COLOR: &str = "#222222";

pub fn render(editor: &Editor, ctx: &CanvasRenderingContext2d) {
	let (width, height) = editor.screen_size();
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, width, height);

	let viewport = editor.viewport();
	let (tx, ty) = viewport.translation();
	let k = viewport.scale();
	ctx.save();
	let _ = ctx.translate(tx, ty);
	let _ = ctx.scale(k, k);
	draw_edges(editor, ctx, k);
	draw_nodes(editor, ctx, k);
	ctx.restore();
}

/// A node's drawn position: its drag preview while it is being dragged.
fn drawn_at(editor: &Editor, node: &Node) -> ModelPoint {
	match editor.drag() {
		Some(drag) if drag.node == node.id => editor.viewport().to_model(drag.preview()),
		_ => node.position(),
	}
}

fn draw_edges(editor: &Editor, ctx: &CanvasRenderingContext2d, k: f64) {
	ctx.set_stroke_style_str(EDGE_COLOR);
	ctx.set_line_width(2.0 / k);
	for (_, from, to) in editor.graph().resolved_edges() {
		let (a, b) = (drawn_at(editor, from), drawn_at(editor, to));
		ctx.begin_path();
		ctx.move_to(a.x, a.y);
		ctx.line_to(b.x, b.y);
		ctx.stroke();
	}
}

fn draw_nodes(editor: &Editor, ctx: &CanvasRenderingContext2d, k: f64) {
	let half = editor.config().node_half_extent;
	let selected = editor.selected();

	ctx.set_font("14px sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.set_line_width(1.0 / k);

	for node in editor.graph().nodes() {
		let p = drawn_at(editor, node);
		let (left, top) = (p.x - half.width, p.y - half.height);
		let dragged = editor.drag().is_some_and(|d| d.node == node.id);

		ctx.set_global_alpha(if dragged { 0.9 } else { 1.0 });
		ctx.set_fill_style_str(if selected == Some(&node.id) {
			SELECTED_FILL
		} else {
			NODE_FILL
		});
		ctx.fill_rect(left, top, half.width * 2.0, half.height * 2.0);
		ctx.set_stroke_style_str(NODE_BORDER);
		ctx.stroke_rect(left, top, half.width * 2.0, half.height * 2.0);

		ctx.set_fill_style_str(LABEL_COLOR);
		let _ = ctx.fill_text_with_max_width(&node.text, p.x, p.y, half.width * 2.0 - 8.0);
	}
	ctx.set_global_alpha(1.0);
}
