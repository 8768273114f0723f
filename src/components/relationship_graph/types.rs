//! Graph data structures supplied by the catalogue data provider.

use std::fmt;

use serde::Deserialize;

use super::layout::LayoutParams;

/// Group key used for nodes that belong to no group at all.
pub const UNGROUPED: &str = "unknown";

/// A catalogue item ("engine") placed on the canvas.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct EngineNode {
	/// Unique identifier, stable across data refreshes.
	pub id: String,
	/// Display name. Also the secondary sort key inside a group.
	#[serde(default, alias = "engine_name")]
	pub name: String,
	/// Primary sort key inside a group.
	#[serde(default)]
	pub year: i32,
	/// Group keys (e.g. companies) in priority order. The first one decides
	/// where the node is seeded on the canvas.
	#[serde(default)]
	pub groups: Vec<String>,
	/// Optional CSS color for the card's group strip.
	#[serde(default)]
	pub color: Option<String>,
	/// Route slug used by the navigation layer.
	#[serde(default)]
	pub slug: Option<String>,
	/// Short teaser text shown on the card.
	#[serde(default, alias = "preview_text")]
	pub preview: Option<String>,
}

impl EngineNode {
	/// Creates a node with no groups and year 0.
	pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			..Default::default()
		}
	}

	/// Sets the primary sort key.
	pub fn with_year(mut self, year: i32) -> Self {
		self.year = year;
		self
	}

	/// Appends a group key.
	pub fn with_group(mut self, group: impl Into<String>) -> Self {
		self.groups.push(group.into());
		self
	}

	/// The key that clusters this node spatially.
	pub fn group_key(&self) -> &str {
		self.groups.first().map(String::as_str).unwrap_or(UNGROUPED)
	}

	/// Deterministic in-group ordering: year first, then name.
	pub fn sort_key(&self) -> (i32, &str) {
		(self.year, &self.name)
	}

	/// True when the item belongs to more than one group. Only affects the badge.
	pub fn is_multi_group(&self) -> bool {
		self.groups.len() > 1
	}
}

/// Kind of relationship between two engines.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
	/// One engine is the successor of another.
	Evolution,
	/// Jointly developed.
	Collaboration,
	/// Built under license.
	Licensing,
	/// A modified derivative.
	Modification,
	/// Anything else, including unrecognized kinds.
	#[default]
	#[serde(other)]
	Other,
}

impl RelationshipKind {
	/// Lowercase name as used in the data feed.
	pub fn as_str(self) -> &'static str {
		match self {
			RelationshipKind::Evolution => "evolution",
			RelationshipKind::Collaboration => "collaboration",
			RelationshipKind::Licensing => "licensing",
			RelationshipKind::Modification => "modification",
			RelationshipKind::Other => "other",
		}
	}
}

impl fmt::Display for RelationshipKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A typed, directed edge between two engines.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Relationship {
	/// Edge identifier. May be empty, in which case [`Relationship::key`]
	/// derives one from the endpoints.
	#[serde(default)]
	pub id: String,
	/// Source node ID.
	#[serde(alias = "engine_id")]
	pub source: String,
	/// Target node ID.
	#[serde(alias = "related_engine_id")]
	pub target: String,
	/// Relationship type.
	#[serde(default, rename = "type", alias = "relationship_type")]
	pub kind: RelationshipKind,
}

impl Relationship {
	/// Creates an edge without an explicit id.
	pub fn new(source: impl Into<String>, target: impl Into<String>, kind: RelationshipKind) -> Self {
		Self {
			id: String::new(),
			source: source.into(),
			target: target.into(),
			kind,
		}
	}

	/// Whether `node` is one of the two endpoints.
	pub fn touches(&self, node: &str) -> bool {
		self.source == node || self.target == node
	}

	/// Stable identity for rendering: the explicit id, or one built from the
	/// endpoints and the edge's position in the input list.
	pub fn key(&self, index: usize) -> String {
		if self.id.is_empty() {
			format!("{}->{}#{}", self.source, self.target, index)
		} else {
			self.id.clone()
		}
	}
}

/// Complete input for one graph: nodes, relationships and optional settings.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphData {
	/// Catalogue items.
	pub nodes: Vec<EngineNode>,
	/// Relationships; `links` is accepted as an alternative key.
	#[serde(default, alias = "links")]
	pub edges: Vec<Relationship>,
	/// Initially active filter groups.
	#[serde(default)]
	pub filter: Vec<String>,
	/// Layout tuning overrides.
	#[serde(default)]
	pub layout: LayoutParams,
}
