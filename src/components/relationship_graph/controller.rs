//! Imperative shell around the pure layout, reducer and scene builder.
//!
//! [`GraphController`] owns the current data set, its layout and the viewport
//! state. Data changes re-run the layout; input events go through
//! [`reduce`](super::viewport::reduce); [`GraphController::scene`] derives
//! what to draw. This is the only place any of that state is mutated.

use log::{debug, info};

use super::filter::{GroupFilter, matches_query};
use super::geometry::EdgeGeometry;
use super::layout::{Layout, compute_layout_with};
use super::scene::{SceneDescriptor, SceneStyle, build_scene};
use super::theme::Theme;
use super::types::{EngineNode, GraphData};
use super::viewport::{
	Gesture, GraphEvent, ViewportConfig, ViewportEvent, ViewportSize, ViewportState, centered,
	reduce,
};

/// Owns data, layout and viewport state for one graph view.
pub struct GraphController {
	data: GraphData,
	visible: Vec<EngineNode>,
	query: String,
	filter: GroupFilter,
	layout: Layout,
	state: ViewportState,
	viewport: ViewportConfig,
	geometry: EdgeGeometry,
	theme: Theme,
	centered: bool,
}

impl GraphController {
	/// Lays out `data` and centers it in a viewport of `size`. The data's
	/// `filter` becomes the initial group filter.
	pub fn new(data: GraphData, size: ViewportSize) -> Self {
		Self::with_config(data, size, ViewportConfig::default(), EdgeGeometry::default(), Theme::default())
	}

	/// Like [`GraphController::new`] with explicit interaction, geometry and theme settings.
	pub fn with_config(
		data: GraphData,
		size: ViewportSize,
		viewport: ViewportConfig,
		geometry: EdgeGeometry,
		theme: Theme,
	) -> Self {
		let mut controller = Self {
			filter: GroupFilter::new(data.filter.iter().cloned()),
			data,
			visible: Vec::new(),
			query: String::new(),
			layout: Layout::default(),
			state: ViewportState {
				size,
				..Default::default()
			},
			viewport,
			geometry,
			theme,
			centered: false,
		};
		controller.relayout();
		controller
	}

	/// Replaces the data set wholesale and recomputes the layout. Filter,
	/// search and view transform are kept.
	pub fn set_data(&mut self, data: GraphData) {
		self.data = data;
		self.relayout();
	}

	/// Replaces the group filter. Dimming only, no relayout.
	pub fn set_filter(&mut self, filter: GroupFilter) {
		self.filter = filter;
	}

	/// Toggles one group of the filter.
	pub fn toggle_group(&mut self, group: &str) {
		self.filter.toggle(group);
	}

	/// Current group filter.
	pub fn filter(&self) -> &GroupFilter {
		&self.filter
	}

	/// Narrows the node set to nodes matching `query`. The layout is
	/// recomputed only when the query actually changes.
	pub fn set_search(&mut self, query: &str) {
		if self.query.trim() == query.trim() {
			return;
		}
		self.query = query.to_string();
		self.relayout();
	}

	/// Feeds one input event through the reducer.
	pub fn dispatch(&mut self, event: ViewportEvent) -> Vec<GraphEvent> {
		let transition = reduce(&self.state, &event, &self.layout, &self.viewport);
		self.state = transition.state;
		transition.events
	}

	/// Scene for the current state.
	pub fn scene(&self) -> SceneDescriptor {
		build_scene(
			&self.visible,
			&self.data.edges,
			&self.layout,
			&self.state,
			|node| self.filter.is_dimmed(node),
			SceneStyle {
				viewport: &self.viewport,
				geometry: &self.geometry,
				theme: &self.theme,
			},
		)
	}

	/// Current viewport state.
	pub fn state(&self) -> &ViewportState {
		&self.state
	}

	/// Positions of the visible nodes.
	pub fn layout(&self) -> &Layout {
		&self.layout
	}

	/// Colors and strokes the scene is built with.
	pub fn theme(&self) -> &Theme {
		&self.theme
	}

	/// Nodes currently on the canvas, after search.
	pub fn visible_nodes(&self) -> &[EngineNode] {
		&self.visible
	}

	/// Visible node by id.
	pub fn node(&self, id: &str) -> Option<&EngineNode> {
		self.visible.iter().find(|n| n.id == id)
	}

	fn relayout(&mut self) {
		let query = self.query.as_str();
		self.visible = self
			.data
			.nodes
			.iter()
			.filter(|n| matches_query(n, query))
			.cloned()
			.collect();
		self.layout = compute_layout_with(&self.visible, &self.data.edges, &self.data.layout);
		info!(
			"graph: laid out {} of {} nodes",
			self.layout.len(),
			self.data.nodes.len()
		);

		let layout = &self.layout;
		let state = &mut self.state;
		if state.selected.as_deref().is_some_and(|id| !layout.contains(id)) {
			debug!("graph: selection left the node set");
			state.selected = None;
		}
		if state.hovered.as_deref().is_some_and(|id| !layout.contains(id)) {
			state.hovered = None;
		}
		if matches!(&state.gesture, Gesture::PressingNode { id, .. } if !layout.contains(id)) {
			state.gesture = Gesture::Idle;
		}

		if !self.centered {
			if let Some(t) = centered(layout, state.size, state.transform.zoom) {
				state.transform = t;
				self.centered = true;
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::relationship_graph::geometry::Point;
	use crate::components::relationship_graph::types::{Relationship, RelationshipKind};

	fn size() -> ViewportSize {
		ViewportSize {
			width: 1200.0,
			height: 800.0,
		}
	}

	fn catalogue() -> GraphData {
		GraphData {
			nodes: vec![
				EngineNode::new("merlin", "Merlin").with_group("rr").with_year(1936),
				EngineNode::new("griffon", "Griffon").with_group("rr").with_year(1939),
				EngineNode::new("v1650", "V-1650")
					.with_group("packard")
					.with_group("rr")
					.with_year(1941),
			],
			edges: vec![
				Relationship::new("merlin", "griffon", RelationshipKind::Evolution),
				Relationship::new("merlin", "v1650", RelationshipKind::Licensing),
			],
			..Default::default()
		}
	}

	#[test]
	fn first_layout_is_centered_once() {
		let mut controller = GraphController::new(catalogue(), size());
		let center = controller.layout().bounds().unwrap().center();
		let on_screen = controller.state().transform.to_screen(center);
		assert!((on_screen.x - 600.0).abs() < 1e-9 && (on_screen.y - 400.0).abs() < 1e-9);

		controller.dispatch(ViewportEvent::PointerDown {
			at: Point::new(1.0, 1.0),
		});
		controller.dispatch(ViewportEvent::PointerMove {
			at: Point::new(51.0, 1.0),
		});
		controller.dispatch(ViewportEvent::PointerUp {
			at: Point::new(51.0, 1.0),
		});
		let panned = controller.state().transform;

		controller.set_data(catalogue());
		assert_eq!(controller.state().transform, panned);
	}

	#[test]
	fn empty_data_defers_centering() {
		let mut controller = GraphController::new(GraphData::default(), size());
		assert!(controller.layout().is_empty());
		assert!(controller.scene().nodes.is_empty());
		assert_eq!(controller.state().transform.pan, Point::default());

		controller.set_data(catalogue());
		assert_ne!(controller.state().transform.pan, Point::default());
	}

	#[test]
	fn search_narrows_nodes_and_drops_their_edges() {
		let mut controller = GraphController::new(catalogue(), size());
		controller.dispatch(ViewportEvent::NodeClick {
			id: "griffon".into(),
		});
		assert_eq!(controller.state().selected.as_deref(), Some("griffon"));

		controller.set_search("packard");
		assert_eq!(controller.visible_nodes().len(), 1);
		assert_eq!(controller.state().selected, None);
		let scene = controller.scene();
		assert_eq!(scene.nodes.len(), 1);
		assert!(scene.edges.is_empty());

		controller.set_search("  ");
		assert_eq!(controller.scene().edges.len(), 2);
	}

	#[test]
	fn initial_filter_comes_from_data() {
		let data = GraphData {
			filter: vec!["packard".into()],
			..catalogue()
		};
		let mut controller = GraphController::new(data, size());
		let dimmed: Vec<String> = controller
			.scene()
			.nodes
			.into_iter()
			.filter(|n| n.dimmed)
			.map(|n| n.id)
			.collect();
		assert_eq!(dimmed, vec!["merlin".to_string(), "griffon".to_string()]);

		controller.toggle_group("packard");
		assert!(controller.filter().is_empty());
		assert!(controller.scene().nodes.iter().all(|n| !n.dimmed));
	}

	#[test]
	fn selected_node_wins_over_filter_dimming() {
		let mut controller = GraphController::new(catalogue(), size());
		controller.set_filter(GroupFilter::new(["packard"]));
		assert!(controller.scene().node("merlin").unwrap().dimmed);

		let events = controller.dispatch(ViewportEvent::NodeClick {
			id: "merlin".into(),
		});
		assert_eq!(events, vec![GraphEvent::NodeActivated("merlin".into())]);
		let scene = controller.scene();
		let merlin = scene.node("merlin").unwrap();
		assert!(merlin.active && !merlin.dimmed);
		assert!(scene.edges.iter().all(|e| e.highlighted));
	}
}
