//! Deterministic force-directed placement of catalogue nodes.
//!
//! A layout pass has two phases:
//!
//! 1. **Seeding.** Nodes are partitioned by group key. Groups are sorted
//!    lexicographically and their centroids placed on a circle around
//!    [`LayoutParams::center_x`]/[`LayoutParams::center_y`]. Members are
//!    sorted by `(year, name)` and spread along the tangent of the circle,
//!    with a small index-keyed jitter so equal spreads never coincide.
//! 2. **Relaxation.** A fixed number of iterations of inverse-square
//!    repulsion between every pair, spring forces along edges and a weak
//!    pull towards the center. Summed forces are applied scaled by
//!    [`LayoutParams::damping`].
//!
//! Nothing is carried between calls, so identical input (same node order)
//! always yields bit-identical output.
//!
//! Every iteration is O(n²) in the node count. That is fine for a catalogue
//! of a few hundred items and is the hard ceiling of this engine; larger
//! graphs need a spatial partitioning scheme (e.g. Barnes-Hut) instead of the
//! all-pairs loop in [`relax`].

use std::collections::{BTreeMap, HashMap};
use std::f64::consts::{FRAC_PI_2, TAU};

use log::{debug, warn};
use serde::Deserialize;

use super::geometry::{Point, Rect};
use super::types::{EngineNode, Relationship};

/// Tuning constants for seeding and relaxation.
///
/// All values are empirical. They are exposed so hosts can tune them per
/// data set; the defaults suit catalogues of tens to low hundreds of nodes.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutParams {
	/// Canvas x of the layout center.
	pub center_x: f64,
	/// Canvas y of the layout center.
	pub center_y: f64,
	/// Radius of the group circle before per-group growth.
	pub base_radius: f64,
	/// Extra circle radius per group.
	pub group_spacing: f64,
	/// Total tangential spread of a group's members.
	pub group_spread: f64,
	/// Horizontal jitter step, keyed by member index.
	pub jitter_x: f64,
	/// Vertical jitter step, keyed by member index.
	pub jitter_y: f64,
	/// Relaxation iterations.
	pub iterations: usize,
	/// Repulsion constant `k` in `k / d²`.
	pub repulsion: f64,
	/// Distance edges pull their endpoints towards.
	pub rest_length: f64,
	/// Spring stiffness along edges.
	pub spring: f64,
	/// Strength of the pull towards the center.
	pub centering: f64,
	/// Multiplier applied to summed forces each iteration. Must be below 1.
	pub damping: f64,
	/// Floor for every distance used as a denominator.
	pub min_distance: f64,
}

impl Default for LayoutParams {
	fn default() -> Self {
		Self {
			center_x: 600.0,
			center_y: 450.0,
			base_radius: 250.0,
			group_spacing: 35.0,
			group_spread: 220.0,
			jitter_x: 15.0,
			jitter_y: 10.0,
			iterations: 80,
			repulsion: 25_000.0,
			rest_length: 320.0,
			spring: 0.25,
			centering: 0.002,
			damping: 0.5,
			min_distance: 1.0,
		}
	}
}

/// Output of a layout pass: exactly one canvas position per distinct node id.
///
/// Positions are stored in an arena indexed by the node's first-seen order in
/// the input, which is also the iteration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layout {
	ids: Vec<String>,
	index: HashMap<String, usize>,
	positions: Vec<Point>,
}

impl Layout {
	/// Number of positioned nodes.
	pub fn len(&self) -> usize {
		self.ids.len()
	}

	/// True when no node was positioned.
	pub fn is_empty(&self) -> bool {
		self.ids.is_empty()
	}

	/// Canvas position of `id`, if it was part of the input.
	pub fn get(&self, id: &str) -> Option<Point> {
		self.index.get(id).map(|&i| self.positions[i])
	}

	/// Whether `id` was part of the input.
	pub fn contains(&self, id: &str) -> bool {
		self.index.contains_key(id)
	}

	/// Positions in input order.
	pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, Point)> + '_ {
		self.ids
			.iter()
			.zip(self.positions.iter())
			.map(|(id, &p)| (id.as_str(), p))
	}

	/// Bounding box of all node positions, `None` for an empty layout.
	pub fn bounds(&self) -> Option<Rect> {
		Rect::enclosing(self.positions.iter().copied())
	}
}

/// Computes positions with [`LayoutParams::default`].
pub fn compute_layout(nodes: &[EngineNode], edges: &[Relationship]) -> Layout {
	compute_layout_with(nodes, edges, &LayoutParams::default())
}

/// Computes positions for `nodes`, using `edges` as springs.
///
/// Edges with an endpoint outside `nodes` and self loops exert no force.
/// Duplicate node ids keep their first occurrence.
pub fn compute_layout_with(
	nodes: &[EngineNode],
	edges: &[Relationship],
	params: &LayoutParams,
) -> Layout {
	let mut members: Vec<&EngineNode> = Vec::with_capacity(nodes.len());
	let mut index = HashMap::with_capacity(nodes.len());
	for node in nodes {
		if index.contains_key(&node.id) {
			warn!("layout: duplicate node id {:?}, keeping first", node.id);
			continue;
		}
		index.insert(node.id.clone(), members.len());
		members.push(node);
	}

	if members.is_empty() {
		return Layout::default();
	}

	let mut springs = Vec::with_capacity(edges.len());
	let mut dropped = 0usize;
	for edge in edges {
		match (index.get(&edge.source), index.get(&edge.target)) {
			(Some(&a), Some(&b)) if a != b => springs.push((a, b)),
			(Some(_), Some(_)) => {}
			_ => dropped += 1,
		}
	}
	if dropped > 0 {
		debug!("layout: {} edges reference unknown nodes", dropped);
	}

	let mut positions = seed(&members, params);
	relax(&mut positions, &springs, params);

	debug!(
		"layout: placed {} nodes with {} springs over {} iterations",
		members.len(),
		springs.len(),
		params.iterations
	);

	Layout {
		ids: members.iter().map(|n| n.id.clone()).collect(),
		index,
		positions,
	}
}

/// Initial placement: groups on a circle, members spread along its tangent.
fn seed(members: &[&EngineNode], params: &LayoutParams) -> Vec<Point> {
	let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
	for (i, node) in members.iter().enumerate() {
		groups.entry(node.group_key()).or_default().push(i);
	}

	let group_count = groups.len() as f64;
	let radius = params.base_radius + group_count * params.group_spacing;
	let mut positions = vec![Point::default(); members.len()];

	for (gi, (_, mut group)) in groups.into_iter().enumerate() {
		let angle = gi as f64 / group_count * TAU - FRAC_PI_2;
		let gx = params.center_x + angle.cos() * radius;
		let gy = params.center_y + angle.sin() * radius;
		let (tx, ty) = ((angle + FRAC_PI_2).cos(), (angle + FRAC_PI_2).sin());

		group.sort_by(|&a, &b| members[a].sort_key().cmp(&members[b].sort_key()));
		let last = group.len().saturating_sub(1);

		for (rank, &i) in group.iter().enumerate() {
			let spread = if last > 0 {
				(rank as f64 / last as f64 - 0.5) * params.group_spread
			} else {
				0.0
			};
			let jx = ((rank % 3) as f64 - 1.0) * params.jitter_x;
			let jy = if (rank / 3) % 2 == 0 { 1.0 } else { -1.0 } * params.jitter_y;
			positions[i] = Point::new(gx + tx * spread + jx, gy + ty * spread + jy);
		}
	}

	positions
}

/// Runs the fixed-iteration force simulation in place.
fn relax(positions: &mut [Point], springs: &[(usize, usize)], params: &LayoutParams) {
	let floor = params.min_distance.max(f64::EPSILON);
	let n = positions.len();
	let mut forces = vec![Point::default(); n];

	for _ in 0..params.iterations {
		forces.fill(Point::default());

		for i in 0..n {
			for j in (i + 1)..n {
				let (dx, dy) = (positions[j].x - positions[i].x, positions[j].y - positions[i].y);
				let dist = (dx * dx + dy * dy).sqrt().max(floor);
				let push = params.repulsion / (dist * dist);
				let (fx, fy) = (dx / dist * push, dy / dist * push);
				forces[i].x -= fx;
				forces[i].y -= fy;
				forces[j].x += fx;
				forces[j].y += fy;
			}
		}

		for &(a, b) in springs {
			let (dx, dy) = (positions[b].x - positions[a].x, positions[b].y - positions[a].y);
			let dist = (dx * dx + dy * dy).sqrt();
			let pull = (dist - params.rest_length) * params.spring;
			let denom = dist.max(floor);
			let (fx, fy) = (dx / denom * pull, dy / denom * pull);
			forces[a].x += fx;
			forces[a].y += fy;
			forces[b].x -= fx;
			forces[b].y -= fy;
		}

		for (force, pos) in forces.iter_mut().zip(positions.iter()) {
			force.x += (params.center_x - pos.x) * params.centering;
			force.y += (params.center_y - pos.y) * params.centering;
		}

		for (pos, force) in positions.iter_mut().zip(forces.iter()) {
			pos.x += force.x * params.damping;
			pos.y += force.y * params.damping;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::relationship_graph::types::RelationshipKind;

	/// xorshift64, so synthetic graphs are reproducible.
	struct Rng(u64);

	impl Rng {
		fn new(seed: u64) -> Self {
			Self(seed.wrapping_add(0x9E37_79B9_7F4A_7C15))
		}

		fn below(&mut self, n: usize) -> usize {
			let mut x = self.0;
			x ^= x << 13;
			x ^= x >> 7;
			x ^= x << 17;
			self.0 = x;
			(x % n as u64) as usize
		}
	}

	/// Up to six groups of up to five nodes, wired as a sparse forest, plus
	/// optional random extra edges.
	fn synthetic(seed: u64, extra_edges: bool) -> (Vec<EngineNode>, Vec<Relationship>) {
		let mut rng = Rng::new(seed);
		let mut nodes = Vec::new();
		for g in 0..1 + rng.below(6) {
			for k in 0..1 + rng.below(5) {
				nodes.push(
					EngineNode::new(format!("n{g}_{k}"), format!("E{g}{k}"))
						.with_group(format!("g{g}"))
						.with_year(1990 + rng.below(30) as i32),
				);
			}
		}

		let mut edges = Vec::new();
		for i in 1..nodes.len() {
			if rng.below(10) < 6 {
				let parent = rng.below(i);
				edges.push(Relationship::new(
					nodes[parent].id.clone(),
					nodes[i].id.clone(),
					RelationshipKind::Evolution,
				));
			}
		}
		if extra_edges {
			for _ in 0..rng.below(nodes.len()) {
				let a = rng.below(nodes.len());
				let b = rng.below(nodes.len());
				edges.push(Relationship::new(
					nodes[a].id.clone(),
					nodes[b].id.clone(),
					RelationshipKind::Other,
				));
			}
		}
		(nodes, edges)
	}

	fn distance(layout: &Layout, a: &str, b: &str) -> f64 {
		layout.get(a).unwrap().distance(layout.get(b).unwrap())
	}

	#[test]
	fn empty_input_gives_empty_layout() {
		let layout = compute_layout(&[], &[]);
		assert!(layout.is_empty());
		assert!(layout.bounds().is_none());
	}

	#[test]
	fn identical_input_gives_identical_output() {
		for seed in 0..8 {
			let (nodes, edges) = synthetic(seed, true);
			let first = compute_layout(&nodes, &edges);
			let second = compute_layout(&nodes, &edges);
			assert_eq!(first.len(), second.len());
			for ((id_a, a), (id_b, b)) in first.iter().zip(second.iter()) {
				assert_eq!(id_a, id_b);
				assert_eq!(a.x.to_bits(), b.x.to_bits());
				assert_eq!(a.y.to_bits(), b.y.to_bits());
			}
		}
	}

	#[test]
	fn every_node_gets_exactly_one_position() {
		let nodes = vec![
			EngineNode::new("a", "A").with_group("x"),
			EngineNode::new("b", "B"),
			EngineNode::new("a", "A again").with_group("y"),
		];
		let layout = compute_layout(&nodes, &[]);
		assert_eq!(layout.len(), 2);
		let ids: Vec<&str> = layout.iter().map(|(id, _)| id).collect();
		assert_eq!(ids, vec!["a", "b"]);
		for (_, p) in layout.iter() {
			assert!(p.x.is_finite() && p.y.is_finite());
		}
	}

	#[test]
	fn dangling_edges_do_not_disturb_layout() {
		let nodes = vec![EngineNode::new("a", "A"), EngineNode::new("b", "B")];
		let dangling = vec![Relationship::new("a", "c", RelationshipKind::Evolution)];
		let with = compute_layout(&nodes, &dangling);
		let without = compute_layout(&nodes, &[]);
		assert_eq!(with, without);
		assert!(with.contains("a") && with.contains("b"));
	}

	#[test]
	fn groups_are_seeded_in_key_order() {
		let params = LayoutParams {
			iterations: 0,
			..Default::default()
		};
		let nodes = vec![
			EngineNode::new("d", "D").with_group("delta"),
			EngineNode::new("b", "B").with_group("bravo"),
			EngineNode::new("a", "A").with_group("alpha"),
			EngineNode::new("c", "C").with_group("charlie"),
		];
		let layout = compute_layout_with(&nodes, &[], &params);
		let radius = 250.0 + 4.0 * 35.0;

		// "alpha" sorts first and sits at the top of the circle; the lone
		// member keeps only the first jitter offset.
		let a = layout.get("a").unwrap();
		assert!((a.x - (600.0 - 15.0)).abs() < 1e-9);
		assert!((a.y - (450.0 - radius + 10.0)).abs() < 1e-9);

		// "charlie" is the third group: bottom of the circle.
		let c = layout.get("c").unwrap();
		assert!((c.y - (450.0 + radius + 10.0)).abs() < 1e-9);
	}

	#[test]
	fn members_spread_along_the_tangent_in_sort_order() {
		let params = LayoutParams {
			iterations: 0,
			jitter_x: 0.0,
			jitter_y: 0.0,
			..Default::default()
		};
		let nodes = vec![
			EngineNode::new("late", "Late").with_group("g").with_year(2000),
			EngineNode::new("early", "Early").with_group("g").with_year(1950),
		];
		let layout = compute_layout_with(&nodes, &[], &params);
		// One group sits at the top; its tangent points along +x.
		let early = layout.get("early").unwrap();
		let late = layout.get("late").unwrap();
		assert!((early.x - (600.0 - 110.0)).abs() < 1e-9);
		assert!((late.x - (600.0 + 110.0)).abs() < 1e-9);
		assert!((early.y - late.y).abs() < 1e-9);
	}

	#[test]
	fn springs_settle_near_rest_length() {
		let rest = LayoutParams::default().rest_length;
		for seed in 0..64 {
			let (nodes, edges) = synthetic(seed, false);
			let layout = compute_layout(&nodes, &edges);
			for edge in &edges {
				let ratio = distance(&layout, &edge.source, &edge.target) / rest;
				assert!(
					(0.5..=1.5).contains(&ratio),
					"seed {seed}: {} -> {} at {ratio:.3} x rest length",
					edge.source,
					edge.target
				);
			}
		}
	}

	/// `groups` lineages of `members` engines each, every lineage a chain in
	/// year order. Consecutive lineages are joined either from the last
	/// member of one to the first of the next, or between their first members.
	fn lineages(groups: usize, members: usize, join_heads: bool) -> (Vec<EngineNode>, Vec<Relationship>) {
		let id = |g: usize, k: usize| format!("g{g:02}_{k:03}");
		let mut nodes = Vec::new();
		let mut edges = Vec::new();
		for g in 0..groups {
			for k in 0..members {
				nodes.push(
					EngineNode::new(id(g, k), format!("E{g}/{k}"))
						.with_group(format!("g{g:02}"))
						.with_year(1950 + k as i32),
				);
				if k > 0 {
					edges.push(Relationship::new(id(g, k - 1), id(g, k), RelationshipKind::Evolution));
				}
			}
		}
		for g in 1..groups {
			let from = if join_heads { id(g - 1, 0) } else { id(g - 1, members - 1) };
			edges.push(Relationship::new(from, id(g, 0), RelationshipKind::Licensing));
		}
		(nodes, edges)
	}

	#[test]
	fn large_catalogues_settle_near_rest_length() {
		let rest = LayoutParams::default().rest_length;
		for (groups, members) in [(8, 12), (10, 20)] {
			for join_heads in [false, true] {
				let (nodes, edges) = lineages(groups, members, join_heads);
				let layout = compute_layout(&nodes, &edges);
				assert_eq!(layout.len(), groups * members);
				for edge in &edges {
					let ratio = distance(&layout, &edge.source, &edge.target) / rest;
					assert!(
						(0.5..=1.5).contains(&ratio),
						"{groups}x{members}: {} -> {} at {ratio:.3} x rest length",
						edge.source,
						edge.target
					);
				}
			}
		}
	}

	#[test]
	fn spring_pulls_distant_groups_together() {
		let nodes = vec![
			EngineNode::new("a", "A").with_group("left"),
			EngineNode::new("b", "B").with_group("right"),
		];
		let edges = vec![Relationship::new("a", "b", RelationshipKind::Collaboration)];
		let rest = LayoutParams::default().rest_length;

		let apart = distance(&compute_layout(&nodes, &[]), "a", "b");
		let linked = distance(&compute_layout(&nodes, &edges), "a", "b");
		assert!((linked - rest).abs() < (apart - rest).abs());
		assert!((linked / rest - 1.0).abs() < 0.1);
	}

	#[test]
	fn nodes_do_not_collapse_onto_each_other() {
		for seed in 0..64 {
			let (nodes, edges) = synthetic(seed, true);
			let layout = compute_layout(&nodes, &edges);
			let points: Vec<Point> = layout.iter().map(|(_, p)| p).collect();
			for (i, a) in points.iter().enumerate() {
				for b in &points[i + 1..] {
					assert!(a.distance(*b) > 40.0, "seed {seed}: nodes only {:.1} apart", a.distance(*b));
				}
			}
		}
	}

	#[test]
	fn isolated_node_stays_finite() {
		let nodes = vec![EngineNode::new("solo", "Solo")];
		let edges = vec![Relationship::new("solo", "solo", RelationshipKind::Other)];
		let p = compute_layout(&nodes, &edges).get("solo").unwrap();
		assert!(p.x.is_finite() && p.y.is_finite());
	}
}
