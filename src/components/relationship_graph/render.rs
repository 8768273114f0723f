//! Canvas painter for a [`SceneDescriptor`].
//!
//! Everything is drawn in screen space straight from the scene, in passes
//! for correct z-ordering:
//! 1. Background
//! 2. Dimmed edges, normal edges, then highlighted edges with their labels
//! 3. Dimmed cards, plain cards, then connected and active cards on top

use std::collections::HashMap;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::controller::GraphController;
use super::geometry::Rect;
use super::scene::{SceneEdge, SceneNode};
use super::theme::{Color, Theme};
use super::types::EngineNode;

/// Base font sizes in canvas units; scaled by zoom.
const TITLE_SIZE: f64 = 14.0;
const META_SIZE: f64 = 9.0;
const PREVIEW_SIZE: f64 = 11.0;

/// Paints the controller's current scene onto a `width` x `height` canvas.
pub fn render(ctx: &CanvasRenderingContext2d, controller: &GraphController, width: f64, height: f64) {
	let scene = controller.scene();
	let theme = controller.theme();
	let zoom = scene.transform.zoom;

	ctx.set_fill_style_str(&theme.background.to_css());
	ctx.fill_rect(0.0, 0.0, width, height);

	for pass in 0..3 {
		for edge in scene.edges.iter().filter(|e| edge_pass(e) == pass) {
			draw_edge(ctx, edge, theme, zoom);
		}
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	let nodes: HashMap<&str, &EngineNode> = controller
		.visible_nodes()
		.iter()
		.map(|n| (n.id.as_str(), n))
		.collect();
	for pass in 0..3 {
		for scene_node in scene.nodes.iter().filter(|n| node_pass(n) == pass) {
			if let Some(node) = nodes.get(scene_node.id.as_str()) {
				draw_card(ctx, scene_node, node, theme, zoom);
			}
		}
	}
}

fn edge_pass(edge: &SceneEdge) -> u8 {
	match (edge.dimmed, edge.highlighted) {
		(true, _) => 0,
		(false, false) => 1,
		(false, true) => 2,
	}
}

fn node_pass(node: &SceneNode) -> u8 {
	if node.dimmed {
		0
	} else if node.active || node.connected {
		2
	} else {
		1
	}
}

fn draw_edge(ctx: &CanvasRenderingContext2d, edge: &SceneEdge, theme: &Theme, zoom: f64) {
	let stroke = &edge.stroke;
	ctx.set_stroke_style_str(&stroke.color.with_alpha(stroke.opacity).to_css());
	ctx.set_line_width(stroke.width);
	match stroke.dash {
		Some((dash, gap)) => {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(gap),
			));
		}
		None => {
			let _ = ctx.set_line_dash(&js_sys::Array::new());
		}
	}

	let path = &edge.path;
	ctx.begin_path();
	ctx.move_to(path.start.x, path.start.y);
	ctx.quadratic_curve_to(path.control.x, path.control.y, path.end.x, path.end.y);
	ctx.stroke();

	if edge.highlighted && theme.edge.label_highlighted {
		let mid = path.at(0.5);
		ctx.set_fill_style_str(&theme.card.muted.to_css());
		ctx.set_font(&font(META_SIZE, zoom, false));
		ctx.set_text_align("center");
		let _ = ctx.fill_text(&edge.kind.as_str().to_uppercase(), mid.x, mid.y - 8.0 * zoom);
	}
}

fn draw_card(
	ctx: &CanvasRenderingContext2d,
	scene_node: &SceneNode,
	node: &EngineNode,
	theme: &Theme,
	zoom: f64,
) {
	let card = &theme.card;
	let bounds = scene_node.bounds;
	let pad = 16.0 * zoom;

	ctx.set_global_alpha(if scene_node.dimmed { card.dimmed_alpha } else { 1.0 });

	rounded_rect(ctx, &bounds, card.corner_radius * zoom);
	ctx.set_fill_style_str(&card.fill.to_css());
	ctx.fill();
	let border = if scene_node.active {
		card.active_border
	} else {
		card.border
	};
	ctx.set_stroke_style_str(&border.to_css());
	ctx.set_line_width(if scene_node.active { 2.0 } else { 1.0 });
	let _ = ctx.set_line_dash(&js_sys::Array::new());
	ctx.stroke();

	// Group strip: one segment per group along the top edge.
	let colors: Vec<Color> = node
		.groups
		.iter()
		.map(|g| theme.group_color(g))
		.collect();
	let colors = match (node.color.as_deref().and_then(Color::from_hex), colors.is_empty()) {
		(Some(own), _) => vec![own],
		(None, true) => vec![theme.group_color(node.group_key())],
		(None, false) => colors,
	};
	let strip_width = (bounds.width() - 2.0 * pad) / colors.len() as f64;
	for (i, color) in colors.iter().enumerate() {
		ctx.set_fill_style_str(&color.with_alpha(0.5).to_css());
		ctx.fill_rect(bounds.min.x + pad + i as f64 * strip_width, bounds.min.y, strip_width, 2.0 * zoom);
	}

	let mut y = bounds.min.y + pad + META_SIZE * zoom;
	ctx.set_font(&font(META_SIZE, zoom, true));
	ctx.set_text_align("left");
	let mut x = bounds.min.x + pad;
	for (group, color) in node.groups.iter().zip(colors.iter().cycle()) {
		let label = group.to_uppercase();
		ctx.set_fill_style_str(&color.lighten(0.3).to_css());
		let _ = ctx.fill_text(&label, x, y);
		x += ctx.measure_text(&label).map(|m| m.width()).unwrap_or(0.0) + 6.0 * zoom;
	}
	ctx.set_text_align("right");
	ctx.set_fill_style_str(&card.muted.to_css());
	let _ = ctx.fill_text(&node.year.to_string(), bounds.max.x - pad, y);

	y += (TITLE_SIZE + 6.0) * zoom;
	ctx.set_text_align("left");
	ctx.set_font(&font(TITLE_SIZE, zoom, true));
	ctx.set_fill_style_str(&card.title.to_css());
	let _ = ctx.fill_text_with_max_width(&node.name, bounds.min.x + pad, y, bounds.width() - 2.0 * pad);

	if let Some(preview) = &node.preview {
		y += (PREVIEW_SIZE + 6.0) * zoom;
		ctx.set_font(&font(PREVIEW_SIZE, zoom, false));
		ctx.set_fill_style_str(&card.muted.to_css());
		let _ =
			ctx.fill_text_with_max_width(preview, bounds.min.x + pad, y, bounds.width() - 2.0 * pad);
	}

	if scene_node.multi_group {
		ctx.set_font(&font(META_SIZE - 1.0, zoom, true));
		ctx.set_fill_style_str(&card.badge.to_css());
		let _ = ctx.fill_text("COLLABORATION", bounds.min.x + pad, bounds.max.y - pad);
	}

	ctx.set_global_alpha(1.0);
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, r: &Rect, radius: f64) {
	let radius = radius.min(r.width() / 2.0).min(r.height() / 2.0).max(0.0);
	ctx.begin_path();
	ctx.move_to(r.min.x + radius, r.min.y);
	let _ = ctx.arc_to(r.max.x, r.min.y, r.max.x, r.max.y, radius);
	let _ = ctx.arc_to(r.max.x, r.max.y, r.min.x, r.max.y, radius);
	let _ = ctx.arc_to(r.min.x, r.max.y, r.min.x, r.min.y, radius);
	let _ = ctx.arc_to(r.min.x, r.min.y, r.max.x, r.min.y, radius);
	ctx.close_path();
}

fn font(size: f64, zoom: f64, bold: bool) -> String {
	let weight = if bold { "600 " } else { "" };
	format!("{}{}px sans-serif", weight, size * zoom)
}
