//! Viewport state and the reducer that drives it.
//!
//! All interaction (pan, zoom, hover, selection) is a pure function
//! [`reduce`] from the current [`ViewportState`] and one [`ViewportEvent`] to
//! the next state plus any [`GraphEvent`]s for the host. Every pair of state
//! and event has a defined successor; malformed input (non-finite
//! coordinates, zero wheel deltas, unknown node ids) leaves the state as is.

use log::debug;

use super::geometry::{Point, Rect};
use super::layout::Layout;

/// Interaction tuning.
#[derive(Clone, Debug)]
pub struct ViewportConfig {
	/// Lower zoom bound.
	pub min_zoom: f64,
	/// Upper zoom bound.
	pub max_zoom: f64,
	/// Zoom multiplier per wheel notch towards the user.
	pub wheel_zoom_in: f64,
	/// Zoom multiplier per wheel notch away from the user.
	pub wheel_zoom_out: f64,
	/// Zoom multiplier of the zoom-in control.
	pub button_zoom_in: f64,
	/// Zoom multiplier of the zoom-out control.
	pub button_zoom_out: f64,
	/// Pointer travel (per axis, in pixels) that turns a press into a drag.
	pub drag_threshold: f64,
	/// Zoom level used when focusing a node.
	pub focus_zoom: f64,
	/// Node card width in canvas units.
	pub node_width: f64,
	/// Node card height in canvas units.
	pub node_height: f64,
}

impl Default for ViewportConfig {
	fn default() -> Self {
		Self {
			min_zoom: 0.3,
			max_zoom: 2.5,
			wheel_zoom_in: 1.08,
			wheel_zoom_out: 0.92,
			button_zoom_in: 1.2,
			button_zoom_out: 0.8,
			drag_threshold: 3.0,
			focus_zoom: 1.4,
			node_width: 280.0,
			node_height: 160.0,
		}
	}
}

impl ViewportConfig {
	/// Clamps `zoom` into the configured range.
	pub fn clamp_zoom(&self, zoom: f64) -> f64 {
		zoom.clamp(self.min_zoom, self.max_zoom)
	}

	/// Canvas-space card of a node centered on `position`.
	pub fn node_box(&self, position: Point) -> Rect {
		Rect::centered(position, self.node_width, self.node_height)
	}
}

/// Pan and zoom: `screen = pan + canvas * zoom`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Screen offset of the canvas origin.
	pub pan: Point,
	/// Scale factor (1.0 = 100%).
	pub zoom: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			pan: Point::default(),
			zoom: 1.0,
		}
	}
}

impl ViewTransform {
	/// Canvas point to screen point.
	pub fn to_screen(&self, p: Point) -> Point {
		Point::new(self.pan.x + p.x * self.zoom, self.pan.y + p.y * self.zoom)
	}

	/// Screen point to canvas point.
	pub fn to_canvas(&self, s: Point) -> Point {
		let k = self.zoom.max(f64::EPSILON);
		Point::new((s.x - self.pan.x) / k, (s.y - self.pan.y) / k)
	}

	/// Same transform at `zoom`, keeping the canvas point under the screen
	/// point `anchor` in place.
	pub fn zoomed_at(&self, anchor: Point, zoom: f64) -> Self {
		let ratio = zoom / self.zoom.max(f64::EPSILON);
		Self {
			pan: Point::new(
				anchor.x - (anchor.x - self.pan.x) * ratio,
				anchor.y - (anchor.y - self.pan.y) * ratio,
			),
			zoom,
		}
	}

	/// Transform at `zoom` that puts canvas point `target` on screen point `at`.
	pub fn looking_at(target: Point, at: Point, zoom: f64) -> Self {
		Self {
			pan: Point::new(at.x - target.x * zoom, at.y - target.y * zoom),
			zoom,
		}
	}
}

/// Size of the viewport in screen pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewportSize {
	/// Width in pixels.
	pub width: f64,
	/// Height in pixels.
	pub height: f64,
}

impl ViewportSize {
	/// Screen point in the middle of the viewport.
	pub fn center(&self) -> Point {
		Point::new(self.width / 2.0, self.height / 2.0)
	}
}

/// The pointer gesture in progress.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Gesture {
	/// No button held.
	#[default]
	Idle,
	/// Pressed on empty canvas; moving pans the view.
	Panning {
		/// Where the press started.
		origin: Point,
		/// Pan at the moment of the press.
		pan_at_start: Point,
		/// Set once travel exceeded the drag threshold. Suppresses the click.
		dragged: bool,
	},
	/// Pressed on a node; releasing over the same node clicks it.
	PressingNode {
		/// The pressed node.
		id: String,
		/// Where the press started.
		origin: Point,
		/// Set once travel exceeded the drag threshold. Cancels the click.
		dragged: bool,
	},
}

/// How the active node became active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Via {
	/// Clicked and sticky.
	Selection,
	/// Under the pointer.
	Hover,
}

/// The node all highlighting derives from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveNode<'a> {
	/// Node id.
	pub id: &'a str,
	/// Whether the node is selected or only hovered.
	pub via: Via,
}

/// Complete interaction state of one viewport.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewportState {
	/// Current pan and zoom.
	pub transform: ViewTransform,
	/// Canvas element size.
	pub size: ViewportSize,
	/// Pointer gesture in progress.
	pub gesture: Gesture,
	/// Sticky selection.
	pub selected: Option<String>,
	/// Transient hover.
	pub hovered: Option<String>,
}

impl ViewportState {
	/// Selection takes precedence over hover.
	pub fn active(&self) -> Option<ActiveNode<'_>> {
		match (&self.selected, &self.hovered) {
			(Some(id), _) => Some(ActiveNode {
				id,
				via: Via::Selection,
			}),
			(None, Some(id)) => Some(ActiveNode { id, via: Via::Hover }),
			(None, None) => None,
		}
	}

	/// True while a pan drag past the threshold is in progress.
	pub fn is_dragging(&self) -> bool {
		matches!(self.gesture, Gesture::Panning { dragged: true, .. })
	}

	/// CSS cursor for the canvas in this state.
	pub fn cursor(&self) -> &'static str {
		if self.is_dragging() {
			"grabbing"
		} else if self.hovered.is_some() {
			"pointer"
		} else {
			"grab"
		}
	}
}

/// Input to the reducer. Coordinates are canvas-element-local screen pixels.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewportEvent {
	/// Primary button or finger went down.
	PointerDown {
		/// Pointer position.
		at: Point,
	},
	/// Pointer moved, pressed or not.
	PointerMove {
		/// Pointer position.
		at: Point,
	},
	/// Button or finger released. Completes a click when nothing was dragged.
	PointerUp {
		/// Pointer position.
		at: Point,
	},
	/// Pointer left the canvas; ends any gesture and the hover.
	PointerLeave,
	/// Positive `delta_y` zooms out, negative zooms in.
	Wheel {
		/// Zoom anchor.
		at: Point,
		/// Scroll amount; only the sign is used.
		delta_y: f64,
	},
	/// Double-click; over a node it selects and focuses that node.
	DoubleClick {
		/// Pointer position.
		at: Point,
	},
	/// Hover reported by a renderer that hit-tests on its own.
	NodeEnter {
		/// Hovered node.
		id: String,
	},
	/// End of a hover reported by [`ViewportEvent::NodeEnter`].
	NodeLeave {
		/// Node the pointer left.
		id: String,
	},
	/// Click reported by a renderer that hit-tests on its own.
	NodeClick {
		/// Clicked node.
		id: String,
	},
	/// Zoom-in control, anchored at the viewport center.
	ZoomIn,
	/// Zoom-out control, anchored at the viewport center.
	ZoomOut,
	/// Zoom 1 with the layout centered.
	ResetView,
	/// Center and zoom onto a node.
	FocusNode {
		/// Node to focus.
		id: String,
	},
	/// Drop the selection, if any.
	ClearSelection,
	/// The canvas changed size.
	Resize {
		/// New width in pixels.
		width: f64,
		/// New height in pixels.
		height: f64,
	},
}

/// Notifications for the navigation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphEvent {
	/// A node was clicked and is now selected.
	NodeActivated(String),
	/// A node was double-clicked.
	NodeFocusRequested(String),
	/// The selection was dropped.
	SelectionCleared,
}

/// Result of one reducer step.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
	/// State after the event.
	pub state: ViewportState,
	/// Notifications raised by the event.
	pub events: Vec<GraphEvent>,
}

/// Top-most node whose card contains the screen point `at`.
pub fn node_at<'a>(
	layout: &'a Layout,
	transform: &ViewTransform,
	config: &ViewportConfig,
	at: Point,
) -> Option<&'a str> {
	let p = transform.to_canvas(at);
	layout
		.iter()
		.rev()
		.find(|&(_, pos)| config.node_box(pos).contains(p))
		.map(|(id, _)| id)
}

/// Transform that centers the layout's bounding box in the viewport, or
/// `None` for an empty layout.
pub fn centered(layout: &Layout, size: ViewportSize, zoom: f64) -> Option<ViewTransform> {
	let bounds = layout.bounds()?;
	Some(ViewTransform::looking_at(bounds.center(), size.center(), zoom))
}

/// Advances `state` by one event.
pub fn reduce(
	state: &ViewportState,
	event: &ViewportEvent,
	layout: &Layout,
	config: &ViewportConfig,
) -> Transition {
	let mut next = state.clone();
	let mut events = Vec::new();

	match event {
		ViewportEvent::PointerDown { at } if at.is_finite() => {
			next.gesture = match node_at(layout, &state.transform, config, *at) {
				Some(id) => Gesture::PressingNode {
					id: id.to_string(),
					origin: *at,
					dragged: false,
				},
				None => Gesture::Panning {
					origin: *at,
					pan_at_start: state.transform.pan,
					dragged: false,
				},
			};
		}
		ViewportEvent::PointerMove { at } if at.is_finite() => {
			let past = |origin: Point| {
				(at.x - origin.x).abs() >= config.drag_threshold
					|| (at.y - origin.y).abs() >= config.drag_threshold
			};
			match &mut next.gesture {
				Gesture::Panning {
					origin,
					pan_at_start,
					dragged,
				} => {
					*dragged |= past(*origin);
					next.transform.pan = Point::new(
						pan_at_start.x + (at.x - origin.x),
						pan_at_start.y + (at.y - origin.y),
					);
				}
				Gesture::PressingNode { origin, dragged, .. } => *dragged |= past(*origin),
				Gesture::Idle => {}
			}
			if !next.is_dragging() {
				next.hovered = node_at(layout, &next.transform, config, *at).map(str::to_string);
			}
		}
		ViewportEvent::PointerUp { at } if at.is_finite() => {
			match &state.gesture {
				Gesture::Panning { dragged: false, .. } => clear_selection(&mut next, &mut events),
				Gesture::PressingNode {
					id,
					dragged: false,
					..
				} if node_at(layout, &state.transform, config, *at) == Some(id.as_str()) => {
					toggle_selection(&mut next, id, &mut events);
				}
				_ => {}
			}
			next.gesture = Gesture::Idle;
		}
		ViewportEvent::PointerLeave => {
			next.gesture = Gesture::Idle;
			next.hovered = None;
		}
		ViewportEvent::Wheel { at, delta_y }
			if at.is_finite() && delta_y.is_finite() && *delta_y != 0.0 =>
		{
			let factor = if *delta_y > 0.0 {
				config.wheel_zoom_out
			} else {
				config.wheel_zoom_in
			};
			next.transform = zoom_by(&state.transform, *at, factor, config);
		}
		ViewportEvent::DoubleClick { at } if at.is_finite() => {
			// The two clicks before a double-click toggled the node on and off
			// again; the double-click leaves it selected.
			if let Some(id) = node_at(layout, &state.transform, config, *at) {
				if next.selected.as_deref() != Some(id) {
					select(&mut next, id, &mut events);
				}
				focus(&mut next, layout, id, config);
				events.push(GraphEvent::NodeFocusRequested(id.to_string()));
			}
		}
		ViewportEvent::NodeEnter { id } if layout.contains(id) => {
			next.hovered = Some(id.clone());
		}
		ViewportEvent::NodeLeave { id } => {
			if next.hovered.as_ref() == Some(id) {
				next.hovered = None;
			}
		}
		ViewportEvent::NodeClick { id } if layout.contains(id) => {
			toggle_selection(&mut next, id, &mut events);
		}
		ViewportEvent::ZoomIn => {
			next.transform = zoom_by(&state.transform, state.size.center(), config.button_zoom_in, config);
		}
		ViewportEvent::ZoomOut => {
			next.transform = zoom_by(&state.transform, state.size.center(), config.button_zoom_out, config);
		}
		ViewportEvent::ResetView => {
			next.transform.zoom = 1.0;
			if let Some(t) = centered(layout, state.size, 1.0) {
				next.transform = t;
			}
		}
		ViewportEvent::FocusNode { id } => focus(&mut next, layout, id, config),
		ViewportEvent::ClearSelection => clear_selection(&mut next, &mut events),
		ViewportEvent::Resize { width, height }
			if width.is_finite() && height.is_finite() && *width >= 0.0 && *height >= 0.0 =>
		{
			next.size = ViewportSize {
				width: *width,
				height: *height,
			};
			if let Some(t) = centered(layout, next.size, state.transform.zoom) {
				next.transform = t;
			}
		}
		_ => {}
	}

	Transition {
		state: next,
		events,
	}
}

fn zoom_by(
	transform: &ViewTransform,
	anchor: Point,
	factor: f64,
	config: &ViewportConfig,
) -> ViewTransform {
	let zoom = config.clamp_zoom(transform.zoom * factor);
	if !zoom.is_finite() {
		return *transform;
	}
	transform.zoomed_at(anchor, zoom)
}

fn focus(state: &mut ViewportState, layout: &Layout, id: &str, config: &ViewportConfig) {
	if let Some(pos) = layout.get(id) {
		let zoom = config.clamp_zoom(config.focus_zoom);
		state.transform = ViewTransform::looking_at(pos, state.size.center(), zoom);
	}
}

fn toggle_selection(state: &mut ViewportState, id: &str, events: &mut Vec<GraphEvent>) {
	if state.selected.as_deref() == Some(id) {
		clear_selection(state, events);
	} else {
		select(state, id, events);
	}
}

fn select(state: &mut ViewportState, id: &str, events: &mut Vec<GraphEvent>) {
	debug!("viewport: selected {:?}", id);
	state.selected = Some(id.to_string());
	events.push(GraphEvent::NodeActivated(id.to_string()));
}

fn clear_selection(state: &mut ViewportState, events: &mut Vec<GraphEvent>) {
	if let Some(id) = state.selected.take() {
		debug!("viewport: cleared selection of {:?}", id);
		events.push(GraphEvent::SelectionCleared);
	}
}
