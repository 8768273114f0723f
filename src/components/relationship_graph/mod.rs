//! Relationship graph of catalogue items.
//!
//! Lays out engines as cards on a pannable, zoomable canvas, grouped by
//! company and connected by typed relationship edges:
//! - Deterministic force-directed layout seeded by group
//! - Pointer-anchored zoom, panning and click-to-select
//! - Hover and selection highlighting of direct neighbors
//! - Group filter that dims, search that narrows
//!
//! Everything except [`component`] and [`render`] is plain Rust with no DOM
//! access, so layout, interaction and emphasis rules are testable natively.
//!
//! # Example
//!
//! ```ignore
//! use engine_graph::{GraphData, RelationshipGraphCanvas};
//!
//! let data: GraphData = serde_json::from_str(json)?;
//! view! { <RelationshipGraphCanvas data=Signal::derive(move || data.clone()) fullscreen=true /> }
//! ```

mod component;
mod controller;
mod filter;
pub mod geometry;
mod layout;
mod render;
mod scene;
pub mod theme;
mod types;
mod viewport;

pub use component::RelationshipGraphCanvas;
pub use controller::GraphController;
pub use filter::{GroupFilter, matches_query};
pub use layout::{Layout, LayoutParams, compute_layout, compute_layout_with};
pub use scene::{SceneDescriptor, SceneEdge, SceneNode, SceneStyle, build_scene, neighbors};
pub use theme::Theme;
pub use types::{EngineNode, GraphData, Relationship, RelationshipKind, UNGROUPED};
pub use viewport::{
	ActiveNode, Gesture, GraphEvent, Transition, Via, ViewTransform, ViewportConfig, ViewportEvent,
	ViewportSize, ViewportState, centered, node_at, reduce,
};
