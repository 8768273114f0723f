//! Visual theming for the relationship graph.
//!
//! Holds the colors of the canvas and node cards, and the fixed lookup table
//! from relationship kind to stroke pattern.

use super::types::RelationshipKind;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Alpha in `0.0..=1.0`.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with explicit alpha.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same color at alpha `a`.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// `#rrggbb` when opaque, `rgba(...)` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}

	/// Parses `#RRGGBB`. Anything else yields `None`.
	pub fn from_hex(s: &str) -> Option<Self> {
		let hex = s.strip_prefix('#')?;
		if hex.len() != 6 || !hex.is_ascii() {
			return None;
		}
		let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
		Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
	}
}

/// Emphasis level an edge is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emphasis {
	/// No node is active, or the edge is unrelated to the active node
	/// without being dimmed.
	Normal,
	/// Touches the active node.
	Highlighted,
	/// Pushed into the background.
	Dimmed,
}

/// Fully resolved stroke for one edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
	/// Base color of the kind.
	pub color: Color,
	/// Line width in screen pixels.
	pub width: f64,
	/// Emphasis opacity times the kind's own factor.
	pub opacity: f64,
	/// `(dash, gap)` in screen pixels; `None` is a solid line.
	pub dash: Option<(f64, f64)>,
}

/// Per-kind entry of the stroke table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KindStroke {
	/// Line color.
	pub color: Color,
	/// `(dash, gap)`, or `None` for a solid line.
	pub dash: Option<(f64, f64)>,
	/// Multiplier on the emphasis opacity. Below 1 for the neutral fallback.
	pub opacity: f64,
}

/// Static lookup from relationship kind to stroke. `Other`, which also
/// covers unrecognized kinds, is a neutral solid low-opacity line.
pub const fn kind_stroke(kind: RelationshipKind) -> KindStroke {
	match kind {
		RelationshipKind::Evolution => KindStroke {
			color: Color::rgb(94, 129, 172),
			dash: None,
			opacity: 1.0,
		},
		RelationshipKind::Collaboration => KindStroke {
			color: Color::rgb(163, 190, 140),
			dash: None,
			opacity: 1.0,
		},
		RelationshipKind::Licensing => KindStroke {
			color: Color::rgb(235, 203, 139),
			dash: Some((8.0, 4.0)),
			opacity: 1.0,
		},
		RelationshipKind::Modification => KindStroke {
			color: Color::rgb(191, 97, 106),
			dash: None,
			opacity: 1.0,
		},
		RelationshipKind::Other => KindStroke {
			color: Color::rgb(128, 128, 128),
			dash: None,
			opacity: 0.5,
		},
	}
}

/// Width and opacity of an edge at one emphasis level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeWeight {
	/// Line width in screen pixels.
	pub width: f64,
	/// Stroke opacity.
	pub opacity: f64,
}

/// Edge appearance per emphasis level.
#[derive(Clone, Debug)]
pub struct EdgeStyle {
	/// [`Emphasis::Normal`] edges.
	pub normal: EdgeWeight,
	/// [`Emphasis::Highlighted`] edges.
	pub highlighted: EdgeWeight,
	/// [`Emphasis::Dimmed`] edges.
	pub dimmed: EdgeWeight,
	/// Show the relationship kind at the midpoint of highlighted edges.
	pub label_highlighted: bool,
}

/// Node card appearance.
#[derive(Clone, Debug)]
pub struct CardStyle {
	/// Card background.
	pub fill: Color,
	/// Card outline.
	pub border: Color,
	/// Outline of the active card.
	pub active_border: Color,
	/// Engine name.
	pub title: Color,
	/// Year, preview text and edge labels. Also the fallback group color.
	pub muted: Color,
	/// Collaboration badge.
	pub badge: Color,
	/// Opacity of a dimmed card.
	pub dimmed_alpha: f64,
	/// Corner radius in canvas units.
	pub corner_radius: f64,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Canvas fill.
	pub background: Color,
	/// Edge strokes.
	pub edge: EdgeStyle,
	/// Node cards.
	pub card: CardStyle,
	/// Group colors for nodes that do not carry their own.
	pub palette: Vec<Color>,
}

impl Theme {
	/// Resolves the stroke for an edge of `kind` at `emphasis`.
	pub fn stroke(&self, kind: RelationshipKind, emphasis: Emphasis) -> StrokeStyle {
		let entry = kind_stroke(kind);
		let weight = match emphasis {
			Emphasis::Normal => self.edge.normal,
			Emphasis::Highlighted => self.edge.highlighted,
			Emphasis::Dimmed => self.edge.dimmed,
		};
		StrokeStyle {
			color: entry.color,
			width: weight.width,
			opacity: weight.opacity * entry.opacity,
			dash: entry.dash,
		}
	}

	/// Stable palette color for a group key. An empty palette falls back to
	/// the muted card color.
	pub fn group_color(&self, group: &str) -> Color {
		let hash = group
			.bytes()
			.fold(0usize, |h, b| h.wrapping_mul(31).wrapping_add(b as usize));
		self.palette
			.get(hash % self.palette.len().max(1))
			.copied()
			.unwrap_or(self.card.muted)
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self {
			background: Color::rgb(22, 27, 34),
			edge: EdgeStyle {
				normal: EdgeWeight {
					width: 1.2,
					opacity: 0.2,
				},
				highlighted: EdgeWeight {
					width: 2.5,
					opacity: 0.8,
				},
				dimmed: EdgeWeight {
					width: 1.0,
					opacity: 0.06,
				},
				label_highlighted: true,
			},
			card: CardStyle {
				fill: Color::rgb(30, 35, 42),
				border: Color::rgba(140, 160, 180, 0.25),
				active_border: Color::rgba(235, 203, 139, 0.6),
				title: Color::rgb(236, 239, 244),
				muted: Color::rgb(140, 150, 165),
				badge: Color::rgb(235, 203, 139),
				dimmed_alpha: 0.25,
				corner_radius: 16.0,
			},
			palette: vec![
				Color::rgb(94, 129, 172),  // Steel blue
				Color::rgb(129, 161, 193), // Light steel
				Color::rgb(100, 148, 160), // Teal gray
				Color::rgb(136, 160, 175), // Cadet blue
				Color::rgb(108, 142, 173), // Air force blue
				Color::rgb(119, 158, 165), // Desaturated cyan
				Color::rgb(143, 163, 180), // Cool gray
				Color::rgb(122, 153, 168), // Dusty blue
			],
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn licensing_is_the_only_dashed_kind() {
		for kind in [
			RelationshipKind::Evolution,
			RelationshipKind::Collaboration,
			RelationshipKind::Modification,
			RelationshipKind::Other,
		] {
			assert_eq!(kind_stroke(kind).dash, None, "{kind}");
		}
		assert_eq!(kind_stroke(RelationshipKind::Licensing).dash, Some((8.0, 4.0)));
	}

	#[test]
	fn fallback_is_fainter_than_named_kinds() {
		let theme = Theme::default();
		let other = theme.stroke(RelationshipKind::Other, Emphasis::Normal);
		let named = theme.stroke(RelationshipKind::Evolution, Emphasis::Normal);
		assert!(other.opacity < named.opacity);
		assert_eq!(other.dash, None);
	}

	#[test]
	fn emphasis_orders_opacity() {
		let theme = Theme::default();
		let kind = RelationshipKind::Collaboration;
		let dimmed = theme.stroke(kind, Emphasis::Dimmed);
		let normal = theme.stroke(kind, Emphasis::Normal);
		let highlighted = theme.stroke(kind, Emphasis::Highlighted);
		assert!(dimmed.opacity < normal.opacity && normal.opacity < highlighted.opacity);
		assert!(highlighted.width > normal.width);
	}

	#[test]
	fn group_colors_are_stable_and_survive_an_empty_palette() {
		let theme = Theme::default();
		assert_eq!(theme.group_color("acme"), theme.group_color("acme"));
		assert!(theme.palette.contains(&theme.group_color("globex")));

		let bare = Theme {
			palette: Vec::new(),
			..Theme::default()
		};
		assert_eq!(bare.group_color("acme"), bare.card.muted);
		assert_eq!(bare.group_color(""), bare.card.muted);
	}

	#[test]
	fn parses_hex_colors() {
		assert_eq!(Color::from_hex("#1976d2"), Some(Color::rgb(0x19, 0x76, 0xd2)));
		assert_eq!(Color::from_hex("1976d2"), None);
		assert_eq!(Color::from_hex("#12345"), None);
		assert_eq!(Color::rgb(1, 2, 3).with_alpha(0.5).to_css(), "rgba(1, 2, 3, 0.5)");
	}
}
