//! engine-graph: Interactive relationship graph for an engine catalogue.
//!
//! This crate provides a WASM-based canvas component that lays out catalogue
//! items grouped by company, connects them with typed relationship edges, and
//! supports pan/zoom, hover and selection highlighting, and group filtering.

use leptos::callback::Callback;
use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use thiserror::Error;
use wasm_bindgen::JsCast;
use web_sys::HtmlScriptElement;

pub mod components;

pub use components::relationship_graph::{
	EngineNode, GraphController, GraphData, GraphEvent, GroupFilter, Relationship,
	RelationshipGraphCanvas, RelationshipKind,
};

/// Id of the script element the host page embeds the graph JSON in.
pub const GRAPH_DATA_ELEMENT: &str = "graph-data";

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("engine-graph: logging initialized");
}

/// Why the embedded graph data could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
	/// No browser window or document is available.
	#[error("no document available")]
	NoDocument,
	/// The page has no element with the expected id.
	#[error("no element with id {0:?}")]
	MissingElement(&'static str),
	/// The element exists but is not a `<script>`.
	#[error("element {0:?} is not a script element")]
	NotAScript(&'static str),
	/// The script element holds no text.
	#[error("element {0:?} is empty")]
	Empty(&'static str),
	/// The text is not valid graph JSON.
	#[error("invalid graph data: {0}")]
	Parse(#[from] serde_json::Error),
}

/// Parses graph JSON: `{ nodes: [...], edges: [...] }`, with `links` accepted
/// in place of `edges` and optional `filter` and `layout` keys.
pub fn parse_graph_data(json_text: &str) -> Result<GraphData, LoadError> {
	let data: GraphData = serde_json::from_str(json_text)?;
	info!(
		"engine-graph: loaded {} nodes, {} edges",
		data.nodes.len(),
		data.edges.len()
	);
	Ok(data)
}

/// Load graph data from the script element with id="graph-data".
pub fn load_graph_data() -> Result<GraphData, LoadError> {
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or(LoadError::NoDocument)?;
	let element = document
		.get_element_by_id(GRAPH_DATA_ELEMENT)
		.ok_or(LoadError::MissingElement(GRAPH_DATA_ELEMENT))?;
	let script: HtmlScriptElement = element
		.dyn_into()
		.map_err(|_| LoadError::NotAScript(GRAPH_DATA_ELEMENT))?;
	let json_text = script
		.text()
		.ok()
		.filter(|t| !t.trim().is_empty())
		.ok_or(LoadError::Empty(GRAPH_DATA_ELEMENT))?;
	parse_graph_data(&json_text)
}

/// Main application component.
/// Loads graph data from the DOM and renders the relationship graph.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let graph_data = load_graph_data().unwrap_or_else(|e| {
		warn!("engine-graph: {}, showing an empty graph", e);
		GraphData::default()
	});
	let graph_signal = Signal::derive(move || graph_data.clone());
	let (selected, set_selected) = signal(None::<String>);
	let on_event = Callback::new(move |event: GraphEvent| match event {
		GraphEvent::NodeActivated(id) | GraphEvent::NodeFocusRequested(id) => {
			info!("engine-graph: activated {}", id);
			set_selected.set(Some(id));
		}
		GraphEvent::SelectionCleared => set_selected.set(None),
	});

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Engine Relationships" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<RelationshipGraphCanvas data=graph_signal on_event=on_event fullscreen=true />
			<div class="graph-overlay">
				<h1>"Engine Relationships"</h1>
				<p class="subtitle">"Click an engine to highlight its relatives. Scroll to zoom. Drag background to pan."</p>
				{move || selected.get().map(|id| view! { <p class="selection">{id}</p> })}
			</div>
		</div>
	}
}
