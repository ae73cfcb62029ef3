use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, TouchEvent, WheelEvent, Window,
};

use super::render;
use crate::editor::Editor;
use crate::gesture::{MOUSE_POINTER, PointerId};
use crate::graph::ScreenPoint;

type CanvasRef = NodeRef<leptos::html::Canvas>;

fn now_ms() -> f64 {
	js_sys::Date::now()
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn local_point(canvas_ref: CanvasRef, client_x: f64, client_y: f64) -> Option<ScreenPoint> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some(ScreenPoint::new(client_x - rect.left(), client_y - rect.top()))
}

fn mouse_point(canvas_ref: CanvasRef, ev: &MouseEvent) -> Option<ScreenPoint> {
	local_point(canvas_ref, ev.client_x() as f64, ev.client_y() as f64)
}

/// Every touch this event is about, with its identifier.
fn touch_points(canvas_ref: CanvasRef, ev: &TouchEvent) -> Vec<(PointerId, ScreenPoint)> {
	let touches = ev.changed_touches();
	(0..touches.length())
		.filter_map(|i| touches.get(i))
		.filter_map(|touch| {
			let at = local_point(canvas_ref, touch.client_x() as f64, touch.client_y() as f64)?;
			Some((touch.identifier(), at))
		})
		.collect()
}

/// Canvas that draws the editor's map and forwards pointer input to it.
#[component]
pub fn MindMapCanvas(
	editor: Rc<RefCell<Editor>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref: CanvasRef = NodeRef::new();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (editor_init, animate_init, resize_cb_init) =
		(editor.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		editor_init.borrow_mut().set_screen_size(w, h);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			log::error!("2d canvas context unavailable");
			return;
		};

		if fullscreen {
			let (editor_resize, canvas_resize) = (editor_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				editor_resize.borrow_mut().set_screen_size(nw, nh);
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (editor_anim, animate_inner) = (editor_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			editor_anim.borrow_mut().poll(now_ms());
			render::render(&editor_anim.borrow(), &ctx);
			if let (Some(win), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let editor_md = editor.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some(p) = mouse_point(canvas_ref, &ev) {
			editor_md.borrow_mut().pointer_down(MOUSE_POINTER, p, now_ms());
		}
	};

	let editor_mm = editor.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some(p) = mouse_point(canvas_ref, &ev) {
			editor_mm.borrow_mut().pointer_move(MOUSE_POINTER, p);
		}
	};

	let editor_mu = editor.clone();
	let on_mouseup = move |ev: MouseEvent| {
		if let Some(p) = mouse_point(canvas_ref, &ev) {
			editor_mu.borrow_mut().pointer_up(MOUSE_POINTER, p, now_ms());
		}
	};

	let editor_ml = editor.clone();
	let on_mouseleave = move |_: MouseEvent| {
		editor_ml.borrow_mut().pointer_cancel(MOUSE_POINTER);
	};

	let editor_wh = editor.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some(p) = mouse_point(canvas_ref, &ev) {
			editor_wh.borrow_mut().wheel(p, ev.delta_y());
		}
	};

	// Touch handlers suppress the emulated mouse events that would follow.
	let editor_ts = editor.clone();
	let on_touchstart = move |ev: TouchEvent| {
		ev.prevent_default();
		let now = now_ms();
		for (id, p) in touch_points(canvas_ref, &ev) {
			editor_ts.borrow_mut().pointer_down(id, p, now);
		}
	};

	let editor_tm = editor.clone();
	let on_touchmove = move |ev: TouchEvent| {
		ev.prevent_default();
		for (id, p) in touch_points(canvas_ref, &ev) {
			editor_tm.borrow_mut().pointer_move(id, p);
		}
	};

	let editor_te = editor.clone();
	let on_touchend = move |ev: TouchEvent| {
		ev.prevent_default();
		let now = now_ms();
		for (id, p) in touch_points(canvas_ref, &ev) {
			editor_te.borrow_mut().pointer_up(id, p, now);
		}
	};

	let editor_tc = editor;
	let on_touchcancel = move |ev: TouchEvent| {
		let touches = ev.changed_touches();
		for touch in (0..touches.length()).filter_map(|i| touches.get(i)) {
			editor_tc.borrow_mut().pointer_cancel(touch.identifier());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="mind-map-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:touchstart=on_touchstart
			on:touchmove=on_touchmove
			on:touchend=on_touchend
			on:touchcancel=on_touchcancel
			style="display: block; touch-action: none;"
		/>
	}
}
