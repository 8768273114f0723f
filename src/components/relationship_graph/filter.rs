//! Group filter and free-text search over catalogue nodes.
//!
//! The group filter only de-emphasizes: nodes outside the active groups stay
//! on the canvas but render dimmed. Search narrows the node set itself, which
//! triggers a fresh layout.

use std::collections::BTreeSet;

use super::types::EngineNode;

/// Set of active group keys.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupFilter {
	active: BTreeSet<String>,
}

impl GroupFilter {
	/// Filter with the given groups active.
	pub fn new<I, S>(groups: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			active: groups.into_iter().map(Into::into).collect(),
		}
	}

	/// True when no group is active, i.e. nothing is filtered.
	pub fn is_empty(&self) -> bool {
		self.active.is_empty()
	}

	/// True when `group` is one of the active groups.
	pub fn is_active(&self, group: &str) -> bool {
		self.active.contains(group)
	}

	/// Activates `group`, or deactivates it if it already was active.
	pub fn toggle(&mut self, group: &str) {
		if !self.active.remove(group) {
			self.active.insert(group.to_string());
		}
	}

	/// Deactivates every group.
	pub fn clear(&mut self) {
		self.active.clear();
	}

	/// Active groups in key order.
	pub fn groups(&self) -> impl Iterator<Item = &str> {
		self.active.iter().map(String::as_str)
	}

	/// A node is de-emphasized when some group is active and the node belongs
	/// to none of the active groups.
	pub fn is_dimmed(&self, node: &EngineNode) -> bool {
		!self.active.is_empty() && !node.groups.iter().any(|g| self.active.contains(g))
	}
}

/// Case-insensitive substring match on the node's name and groups. A blank
/// query matches everything.
pub fn matches_query(node: &EngineNode, query: &str) -> bool {
	let query = query.trim();
	if query.is_empty() {
		return true;
	}
	let query = query.to_lowercase();
	node.name.to_lowercase().contains(&query)
		|| node.groups.iter().any(|g| g.to_lowercase().contains(&query))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_filter_dims_nothing() {
		let filter = GroupFilter::default();
		assert!(!filter.is_dimmed(&EngineNode::new("a", "A")));
		assert!(!filter.is_dimmed(&EngineNode::new("b", "B").with_group("acme")));
	}

	#[test]
	fn nodes_outside_active_groups_are_dimmed() {
		let filter = GroupFilter::new(["acme"]);
		assert!(!filter.is_dimmed(&EngineNode::new("a", "A").with_group("globex").with_group("acme")));
		assert!(filter.is_dimmed(&EngineNode::new("b", "B").with_group("globex")));
		assert!(filter.is_dimmed(&EngineNode::new("c", "C")));
	}

	#[test]
	fn toggle_flips_membership() {
		let mut filter = GroupFilter::default();
		filter.toggle("acme");
		filter.toggle("globex");
		filter.toggle("acme");
		assert_eq!(filter.groups().collect::<Vec<_>>(), vec!["globex"]);
		filter.clear();
		assert!(filter.is_empty());
	}

	#[test]
	fn search_matches_name_or_group() {
		let node = EngineNode::new("m", "Merlin 61").with_group("Rolls-Royce");
		assert!(matches_query(&node, ""));
		assert!(matches_query(&node, "   "));
		assert!(matches_query(&node, "merlin"));
		assert!(matches_query(&node, " ROLLS "));
		assert!(!matches_query(&node, "griffon"));
	}
}
