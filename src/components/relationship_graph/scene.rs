//! Render-ready description of the graph for the current viewport state.
//!
//! [`build_scene`] is a pure function of the data, the layout and the
//! viewport state, so any renderer (or a test) can call it without a DOM.
//!
//! Emphasis rules:
//! - With an active node, everything that is neither the active node nor one
//!   of its direct neighbors is dimmed. Edges touching the active node are
//!   highlighted, all others dimmed. The filter predicate is ignored.
//! - Without an active node, a node is dimmed iff the filter predicate says
//!   so. Edges are drawn at normal emphasis.

use std::collections::HashSet;

use super::geometry::{EdgeGeometry, QuadCurve, Rect};
use super::layout::Layout;
use super::theme::{Emphasis, StrokeStyle, Theme};
use super::types::{EngineNode, Relationship, RelationshipKind};
use super::viewport::{ViewTransform, ViewportConfig, ViewportState};

/// Render state of one node.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
	/// Node id.
	pub id: String,
	/// Screen x of the node position.
	pub screen_x: f64,
	/// Screen y of the node position.
	pub screen_y: f64,
	/// Card bounds in screen space.
	pub bounds: Rect,
	/// De-emphasized this frame.
	pub dimmed: bool,
	/// This node is the active node.
	pub active: bool,
	/// Directly connected to the active node.
	pub connected: bool,
	/// Belongs to more than one group; drawn with a badge.
	pub multi_group: bool,
	/// Group key the node is clustered by.
	pub group: String,
}

/// Render state of one visible edge.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneEdge {
	/// Edge key, see [`Relationship::key`].
	pub id: String,
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Relationship kind, which picks the stroke.
	pub kind: RelationshipKind,
	/// Curve in screen space.
	pub path: QuadCurve,
	/// Touches the active node.
	pub highlighted: bool,
	/// Pushed back because another node is active.
	pub dimmed: bool,
	/// Resolved stroke for this edge's kind and emphasis.
	pub stroke: StrokeStyle,
}

/// Everything a renderer needs for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneDescriptor {
	/// Nodes in layout order.
	pub nodes: Vec<SceneNode>,
	/// Edges whose endpoints are both laid out, in input order.
	pub edges: Vec<SceneEdge>,
	/// Canvas to screen transform the positions were computed with.
	pub transform: ViewTransform,
}

impl SceneDescriptor {
	/// Scene node by id.
	pub fn node(&self, id: &str) -> Option<&SceneNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// Scene edge by key.
	pub fn edge(&self, id: &str) -> Option<&SceneEdge> {
		self.edges.iter().find(|e| e.id == id)
	}
}

/// Static inputs of a scene besides the data and the state.
#[derive(Clone, Copy, Debug)]
pub struct SceneStyle<'a> {
	/// Card size.
	pub viewport: &'a ViewportConfig,
	/// Edge curvature.
	pub geometry: &'a EdgeGeometry,
	/// Stroke table and weights.
	pub theme: &'a Theme,
}

/// Ids one edge away from `id`, in either direction.
pub fn neighbors<'a>(edges: &'a [Relationship], id: &str) -> HashSet<&'a str> {
	edges
		.iter()
		.filter_map(|e| {
			if e.source == id {
				Some(e.target.as_str())
			} else if e.target == id {
				Some(e.source.as_str())
			} else {
				None
			}
		})
		.filter(|&other| other != id)
		.collect()
}

/// Builds the scene for `state`.
///
/// Only nodes present in `layout` are emitted, in layout order. Edges with
/// an endpoint outside the layout are left out.
pub fn build_scene(
	nodes: &[EngineNode],
	edges: &[Relationship],
	layout: &Layout,
	state: &ViewportState,
	is_dimmed: impl Fn(&EngineNode) -> bool,
	style: SceneStyle<'_>,
) -> SceneDescriptor {
	let transform = state.transform;
	let active = state.active().map(|a| a.id).filter(|id| layout.contains(id));
	let connected = active.map(|id| neighbors(edges, id)).unwrap_or_default();

	let mut seen = HashSet::with_capacity(nodes.len());
	let scene_nodes = nodes
		.iter()
		.filter(|n| seen.insert(n.id.as_str()))
		.filter_map(|node| {
			let pos = layout.get(&node.id)?;
			let screen = transform.to_screen(pos);
			let card = style.viewport.node_box(pos);
			let is_active = active == Some(node.id.as_str());
			let is_connected = connected.contains(node.id.as_str());
			let dimmed = match active {
				Some(_) => !is_active && !is_connected,
				None => is_dimmed(node),
			};
			Some(SceneNode {
				id: node.id.clone(),
				screen_x: screen.x,
				screen_y: screen.y,
				bounds: Rect {
					min: transform.to_screen(card.min),
					max: transform.to_screen(card.max),
				},
				dimmed,
				active: is_active,
				connected: is_connected,
				multi_group: node.is_multi_group(),
				group: node.group_key().to_string(),
			})
		})
		.collect();

	let scene_edges = edges
		.iter()
		.enumerate()
		.filter_map(|(i, edge)| {
			let a = layout.get(&edge.source)?;
			let b = layout.get(&edge.target)?;
			let (highlighted, dimmed) = match active {
				Some(id) => (edge.touches(id), !edge.touches(id)),
				None => (false, false),
			};
			let emphasis = if highlighted {
				Emphasis::Highlighted
			} else if dimmed {
				Emphasis::Dimmed
			} else {
				Emphasis::Normal
			};
			Some(SceneEdge {
				id: edge.key(i),
				source: edge.source.clone(),
				target: edge.target.clone(),
				kind: edge.kind,
				path: style.geometry.curve(a, b).map(|p| transform.to_screen(p)),
				highlighted,
				dimmed,
				stroke: style.theme.stroke(edge.kind, emphasis),
			})
		})
		.collect();

	SceneDescriptor {
		nodes: scene_nodes,
		edges: scene_edges,
		transform,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::relationship_graph::filter::GroupFilter;
	use crate::components::relationship_graph::geometry::Point;
	use crate::components::relationship_graph::layout::compute_layout;

	struct Fixture {
		nodes: Vec<EngineNode>,
		edges: Vec<Relationship>,
		layout: Layout,
		viewport: ViewportConfig,
		geometry: EdgeGeometry,
		theme: Theme,
	}

	impl Fixture {
		/// a -> b -> c, d isolated; a and d in "acme", the others in "globex".
		fn new() -> Self {
			let nodes = vec![
				EngineNode::new("a", "A").with_group("acme"),
				EngineNode::new("b", "B").with_group("globex"),
				EngineNode::new("c", "C").with_group("globex"),
				EngineNode::new("d", "D").with_group("acme"),
			];
			let edges = vec![
				Relationship::new("a", "b", RelationshipKind::Evolution),
				Relationship::new("b", "c", RelationshipKind::Licensing),
			];
			let layout = compute_layout(&nodes, &edges);
			Self {
				nodes,
				edges,
				layout,
				viewport: ViewportConfig::default(),
				geometry: EdgeGeometry::default(),
				theme: Theme::default(),
			}
		}

		fn scene(&self, state: &ViewportState, filter: &GroupFilter) -> SceneDescriptor {
			build_scene(
				&self.nodes,
				&self.edges,
				&self.layout,
				state,
				|n| filter.is_dimmed(n),
				SceneStyle {
					viewport: &self.viewport,
					geometry: &self.geometry,
					theme: &self.theme,
				},
			)
		}
	}

	fn dimmed_ids(scene: &SceneDescriptor) -> Vec<&str> {
		scene.nodes.iter().filter(|n| n.dimmed).map(|n| n.id.as_str()).collect()
	}

	#[test]
	fn nothing_dimmed_without_filter_or_active_node() {
		let f = Fixture::new();
		let scene = f.scene(&ViewportState::default(), &GroupFilter::default());
		assert_eq!(scene.nodes.len(), 4);
		assert!(dimmed_ids(&scene).is_empty());
		assert!(scene.edges.iter().all(|e| !e.highlighted && !e.dimmed));
	}

	#[test]
	fn filter_dims_nodes_outside_active_groups() {
		let f = Fixture::new();
		let scene = f.scene(&ViewportState::default(), &GroupFilter::new(["acme"]));
		assert_eq!(dimmed_ids(&scene), vec!["b", "c"]);
	}

	#[test]
	fn active_node_dims_everything_unconnected() {
		let f = Fixture::new();
		let state = ViewportState {
			hovered: Some("b".into()),
			..Default::default()
		};
		let scene = f.scene(&state, &GroupFilter::default());

		assert_eq!(dimmed_ids(&scene), vec!["d"]);
		assert!(scene.node("b").unwrap().active);
		assert!(scene.node("a").unwrap().connected);
		assert!(scene.node("c").unwrap().connected);
		assert!(scene.edges.iter().all(|e| e.highlighted && !e.dimmed));

		let state = ViewportState {
			selected: Some("a".into()),
			..state
		};
		let scene = f.scene(&state, &GroupFilter::default());
		assert_eq!(dimmed_ids(&scene), vec!["c", "d"]);
		assert!(scene.edge("a->b#0").unwrap().highlighted);
		let bc = scene.edge("b->c#1").unwrap();
		assert!(bc.dimmed && !bc.highlighted);
		assert_eq!(bc.stroke.dash, Some((8.0, 4.0)));
	}

	#[test]
	fn active_state_overrides_filter_dimming() {
		let f = Fixture::new();
		let filter = GroupFilter::new(["globex"]);
		let state = ViewportState {
			selected: Some("a".into()),
			..Default::default()
		};
		assert!(f.scene(&ViewportState::default(), &filter).node("a").unwrap().dimmed);

		let scene = f.scene(&state, &filter);
		let a = scene.node("a").unwrap();
		assert!(a.active && !a.dimmed);
		// d passes the filter but is not connected to the active node.
		assert!(scene.node("d").unwrap().dimmed);
		for node in &scene.nodes {
			assert!(!(node.dimmed && (node.active || node.connected)));
		}
	}

	#[test]
	fn dangling_edges_are_not_rendered() {
		let nodes = vec![EngineNode::new("a", "A"), EngineNode::new("b", "B")];
		let edges = vec![Relationship::new("a", "c", RelationshipKind::Evolution)];
		let layout = compute_layout(&nodes, &edges);
		let (viewport, geometry, theme) = (ViewportConfig::default(), EdgeGeometry::default(), Theme::default());
		let scene = build_scene(
			&nodes,
			&edges,
			&layout,
			&ViewportState::default(),
			|_| false,
			SceneStyle {
				viewport: &viewport,
				geometry: &geometry,
				theme: &theme,
			},
		);
		assert!(scene.edges.is_empty());
		assert_eq!(scene.nodes.len(), 2);
		assert!(scene.nodes.iter().all(|n| n.screen_x.is_finite() && n.screen_y.is_finite()));
	}

	#[test]
	fn stale_active_id_is_ignored() {
		let f = Fixture::new();
		let state = ViewportState {
			selected: Some("gone".into()),
			..Default::default()
		};
		let scene = f.scene(&state, &GroupFilter::new(["acme"]));
		assert_eq!(dimmed_ids(&scene), vec!["b", "c"]);
	}

	#[test]
	fn positions_follow_the_transform() {
		let f = Fixture::new();
		let mut state = ViewportState::default();
		state.transform.pan = Point::new(10.0, -20.0);
		state.transform.zoom = 2.0;
		let scene = f.scene(&state, &GroupFilter::default());

		let a = f.layout.get("a").unwrap();
		let node = scene.node("a").unwrap();
		assert_eq!(node.screen_x, 10.0 + a.x * 2.0);
		assert_eq!(node.screen_y, -20.0 + a.y * 2.0);
		assert!((node.bounds.width() - 560.0).abs() < 1e-9);
		assert!((node.bounds.height() - 320.0).abs() < 1e-9);

		let edge = scene.edge("a->b#0").unwrap();
		assert_eq!(edge.path.start, Point::new(node.screen_x, node.screen_y));
	}

	#[test]
	fn neighbors_ignore_direction_and_self_loops() {
		let edges = vec![
			Relationship::new("a", "b", RelationshipKind::Evolution),
			Relationship::new("c", "a", RelationshipKind::Other),
			Relationship::new("a", "a", RelationshipKind::Other),
			Relationship::new("b", "c", RelationshipKind::Other),
		];
		let mut found: Vec<&str> = neighbors(&edges, "a").into_iter().collect();
		found.sort();
		assert_eq!(found, vec!["b", "c"]);
		assert!(neighbors(&edges, "z").is_empty());
	}
}
