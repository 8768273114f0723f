//! Leptos component wrapping the relationship graph canvas.
//!
//! The component creates an HTML canvas element and translates mouse, wheel
//! and touch input into [`ViewportEvent`]s for the [`GraphController`]. There
//! is no animation loop: the layout is computed once per data change, and the
//! canvas is repainted after every event that reaches the controller.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::callback::{Callable, Callback};
use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, TouchEvent, WheelEvent, Window,
};

use super::controller::GraphController;
use super::filter::GroupFilter;
use super::geometry::Point;
use super::render;
use super::theme::kind_stroke;
use super::types::{GraphData, RelationshipKind};
use super::viewport::{GraphEvent, ViewportEvent, ViewportSize};

/// Controller plus the canvas it paints on.
struct GraphContext {
	controller: GraphController,
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
}

impl GraphContext {
	fn paint(&self) {
		let size = self.controller.state().size;
		render::render(&self.ctx, &self.controller, size.width, size.height);
		let cursor = self.controller.state().cursor();
		// `HtmlElement::style`, not the attribute helper leptos adds to elements.
		let _ = web_sys::HtmlElement::style(&self.canvas).set_property("cursor", cursor);
	}
}

type SharedContext = Rc<RefCell<Option<GraphContext>>>;

/// Runs one event through the controller, repaints, then forwards any
/// resulting notifications to `on_event`.
fn dispatch(context: &SharedContext, event: ViewportEvent, on_event: Option<Callback<GraphEvent>>) {
	let events = {
		let mut slot = context.borrow_mut();
		let Some(c) = slot.as_mut() else {
			return;
		};
		let events = c.controller.dispatch(event);
		c.paint();
		events
	};
	if let Some(cb) = on_event {
		for event in events {
			cb.run(event);
		}
	}
}

/// Converts client coordinates into canvas-local ones.
fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, client_x: i32, client_y: i32) -> Option<Point> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some(Point::new(
		client_x as f64 - rect.left(),
		client_y as f64 - rect.top(),
	))
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

/// Renders the engine relationship graph on a canvas element.
///
/// Pass graph data via the reactive `data` signal; a change replaces the data
/// set and re-runs the layout while keeping pan and zoom. `filter` lists the
/// active groups (nodes outside them are dimmed) and `search` narrows the node
/// set. Clicks, deselection and double-clicks are reported through `on_event`.
///
/// The component sizes itself to its parent container by default; set
/// `fullscreen = true` to fill the viewport and follow window resizes.
/// Explicit `width`/`height` override automatic sizing.
#[component]
pub fn RelationshipGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(optional, into)] filter: Option<Signal<Vec<String>>>,
	#[prop(optional, into)] search: Option<Signal<String>>,
	#[prop(optional)] on_event: Option<Callback<GraphEvent>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: SharedContext = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (context_init, resize_cb_init) = (context.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let data = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();

		if let Some(c) = context_init.borrow_mut().as_mut() {
			c.controller.set_data(data);
			c.paint();
			return;
		}

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

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("engine-graph: canvas has no 2d context");
			return;
		};

		let mut controller = GraphController::new(
			data,
			ViewportSize {
				width: w,
				height: h,
			},
		);
		if let Some(filter) = filter {
			controller.set_filter(GroupFilter::new(filter.get_untracked()));
		}
		if let Some(search) = search {
			controller.set_search(&search.get_untracked());
		}
		let c = GraphContext {
			controller,
			canvas: canvas.clone(),
			ctx,
		};
		c.paint();
		*context_init.borrow_mut() = Some(c);

		if fullscreen {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				dispatch(
					&context_resize,
					ViewportEvent::Resize {
						width: nw,
						height: nh,
					},
					None,
				);
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
	});

	if let Some(filter) = filter {
		let context_filter = context.clone();
		Effect::new(move |_| {
			let groups = filter.get();
			if let Some(c) = context_filter.borrow_mut().as_mut() {
				c.controller.set_filter(GroupFilter::new(groups));
				c.paint();
			}
		});
	}

	if let Some(search) = search {
		let context_search = context.clone();
		Effect::new(move |_| {
			let query = search.get();
			if let Some(c) = context_search.borrow_mut().as_mut() {
				c.controller.set_search(&query);
				c.paint();
			}
		});
	}

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		if let Some(at) = local_point(canvas_ref, ev.client_x(), ev.client_y()) {
			dispatch(&context_md, ViewportEvent::PointerDown { at }, on_event);
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some(at) = local_point(canvas_ref, ev.client_x(), ev.client_y()) {
			dispatch(&context_mm, ViewportEvent::PointerMove { at }, on_event);
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |ev: MouseEvent| {
		if let Some(at) = local_point(canvas_ref, ev.client_x(), ev.client_y()) {
			dispatch(&context_mu, ViewportEvent::PointerUp { at }, on_event);
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		dispatch(&context_ml, ViewportEvent::PointerLeave, on_event);
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some(at) = local_point(canvas_ref, ev.client_x(), ev.client_y()) {
			dispatch(
				&context_wh,
				ViewportEvent::Wheel {
					at,
					delta_y: ev.delta_y(),
				},
				on_event,
			);
		}
	};

	let context_dc = context.clone();
	let on_dblclick = move |ev: MouseEvent| {
		if let Some(at) = local_point(canvas_ref, ev.client_x(), ev.client_y()) {
			dispatch(&context_dc, ViewportEvent::DoubleClick { at }, on_event);
		}
	};

	// Single-finger touch maps onto the pointer events; extra fingers are ignored.
	// Touch handlers cancel the default, or the emulated mouse events replay the tap.
	let context_ts = context.clone();
	let on_touchstart = move |ev: TouchEvent| {
		ev.prevent_default();
		let Some(touch) = ev.touches().get(0) else {
			return;
		};
		if let Some(at) = local_point(canvas_ref, touch.client_x(), touch.client_y()) {
			dispatch(&context_ts, ViewportEvent::PointerDown { at }, on_event);
		}
	};

	let context_tm = context.clone();
	let on_touchmove = move |ev: TouchEvent| {
		ev.prevent_default();
		let Some(touch) = ev.touches().get(0) else {
			return;
		};
		if let Some(at) = local_point(canvas_ref, touch.client_x(), touch.client_y()) {
			dispatch(&context_tm, ViewportEvent::PointerMove { at }, on_event);
		}
	};

	let context_te = context.clone();
	let on_touchend = move |ev: TouchEvent| {
		ev.prevent_default();
		let Some(touch) = ev.changed_touches().get(0) else {
			return;
		};
		if let Some(at) = local_point(canvas_ref, touch.client_x(), touch.client_y()) {
			dispatch(&context_te, ViewportEvent::PointerUp { at }, on_event);
		}
	};

	let context_tc = context.clone();
	let on_touchcancel = move |_: TouchEvent| {
		dispatch(&context_tc, ViewportEvent::PointerLeave, on_event);
	};

	let (context_in, context_out, context_reset) = (context.clone(), context.clone(), context);
	let on_zoom_in = move |_: MouseEvent| dispatch(&context_in, ViewportEvent::ZoomIn, on_event);
	let on_zoom_out = move |_: MouseEvent| dispatch(&context_out, ViewportEvent::ZoomOut, on_event);
	let on_reset = move |_: MouseEvent| dispatch(&context_reset, ViewportEvent::ResetView, on_event);

	let legend = [
		RelationshipKind::Evolution,
		RelationshipKind::Collaboration,
		RelationshipKind::Licensing,
		RelationshipKind::Modification,
	]
	.into_iter()
	.map(|kind| {
		let stroke = kind_stroke(kind);
		let line = if stroke.dash.is_some() { "dashed" } else { "solid" };
		let swatch = format!(
			"display: inline-block; width: 18px; margin-right: 6px; border-top: 2px {} {};",
			line,
			stroke.color.to_css()
		);
		view! {
			<li>
				<span class="graph-legend-swatch" style=swatch></span>
				{kind.as_str()}
			</li>
		}
	})
	.collect_view();

	view! {
		<div class="relationship-graph" style="position: relative; width: 100%; height: 100%;">
			<canvas
				node_ref=canvas_ref
				class="relationship-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				on:dblclick=on_dblclick
				on:touchstart=on_touchstart
				on:touchmove=on_touchmove
				on:touchend=on_touchend
				on:touchcancel=on_touchcancel
				style="display: block; cursor: grab; touch-action: none;"
			/>
			<div class="graph-controls">
				<button class="graph-control" title="Zoom in" on:click=on_zoom_in>"+"</button>
				<button class="graph-control" title="Zoom out" on:click=on_zoom_out>"−"</button>
				<button class="graph-control" title="Reset view" on:click=on_reset>"Reset"</button>
			</div>
			<ul class="graph-legend">{legend}</ul>
		</div>
	}
}
