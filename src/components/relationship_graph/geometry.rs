//! Plane geometry shared by the layout, the viewport and edge rendering.

use std::fmt::Write as _;

/// A point (or vector) in canvas or screen space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate, growing downwards.
	pub y: f64,
}

impl Point {
	/// Point at `(x, y)`.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Euclidean distance to `other`.
	pub fn distance(self, other: Point) -> f64 {
		let (dx, dy) = (other.x - self.x, other.y - self.y);
		(dx * dx + dy * dy).sqrt()
	}

	/// Point halfway to `other`.
	pub fn midpoint(self, other: Point) -> Point {
		Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
	}

	/// False if either coordinate is NaN or infinite.
	pub fn is_finite(self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}
}

/// Axis-aligned rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
	/// Top-left corner.
	pub min: Point,
	/// Bottom-right corner.
	pub max: Point,
}

impl Rect {
	/// Rectangle of `size` centered on `center`.
	pub fn centered(center: Point, width: f64, height: f64) -> Self {
		Self {
			min: Point::new(center.x - width / 2.0, center.y - height / 2.0),
			max: Point::new(center.x + width / 2.0, center.y + height / 2.0),
		}
	}

	/// Smallest rectangle containing every point, `None` when there are none.
	pub fn enclosing(points: impl IntoIterator<Item = Point>) -> Option<Self> {
		let mut points = points.into_iter();
		let first = points.next()?;
		Some(points.fold(
			Self {
				min: first,
				max: first,
			},
			|r, p| Self {
				min: Point::new(r.min.x.min(p.x), r.min.y.min(p.y)),
				max: Point::new(r.max.x.max(p.x), r.max.y.max(p.y)),
			},
		))
	}

	/// Center point.
	pub fn center(&self) -> Point {
		self.min.midpoint(self.max)
	}

	/// Horizontal extent.
	pub fn width(&self) -> f64 {
		self.max.x - self.min.x
	}

	/// Vertical extent.
	pub fn height(&self) -> f64 {
		self.max.y - self.min.y
	}

	/// Inclusive containment test.
	pub fn contains(&self, p: Point) -> bool {
		p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
	}
}

/// Quadratic Bézier segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadCurve {
	/// First endpoint.
	pub start: Point,
	/// Control point.
	pub control: Point,
	/// Second endpoint.
	pub end: Point,
}

impl QuadCurve {
	/// Applies `f` to all three points. Affine maps keep the curve exact.
	pub fn map(self, f: impl Fn(Point) -> Point) -> Self {
		Self {
			start: f(self.start),
			control: f(self.control),
			end: f(self.end),
		}
	}

	/// Point on the curve at parameter `t` in `[0, 1]`.
	pub fn at(&self, t: f64) -> Point {
		let u = 1.0 - t;
		Point::new(
			u * u * self.start.x + 2.0 * u * t * self.control.x + t * t * self.end.x,
			u * u * self.start.y + 2.0 * u * t * self.control.y + t * t * self.end.y,
		)
	}

	/// SVG path data, e.g. `M 0 0 Q 5 2 10 0`.
	pub fn to_svg(&self) -> String {
		let mut d = String::with_capacity(48);
		let _ = write!(
			d,
			"M {} {} Q {} {} {} {}",
			self.start.x, self.start.y, self.control.x, self.control.y, self.end.x, self.end.y
		);
		d
	}
}

/// How far edges bow away from the straight line between their endpoints.
#[derive(Clone, Debug)]
pub struct EdgeGeometry {
	/// Control point offset as a fraction of the endpoint distance.
	pub curvature_ratio: f64,
	/// Upper bound on the control point offset, in canvas units.
	pub max_curvature: f64,
}

impl Default for EdgeGeometry {
	fn default() -> Self {
		Self {
			curvature_ratio: 0.15,
			max_curvature: 60.0,
		}
	}
}

impl EdgeGeometry {
	/// Curve from `a` to `b` whose control point sits on the perpendicular
	/// through the midpoint, offset by `min(|ab| * ratio, max_curvature)`.
	///
	/// Coincident endpoints have no perpendicular; the control point is then
	/// the midpoint itself.
	pub fn curve(&self, a: Point, b: Point) -> QuadCurve {
		let mid = a.midpoint(b);
		let dist = a.distance(b);
		let control = if dist < f64::EPSILON {
			mid
		} else {
			let offset = (dist * self.curvature_ratio).min(self.max_curvature);
			let (ux, uy) = ((b.x - a.x) / dist, (b.y - a.y) / dist);
			Point::new(mid.x - uy * offset, mid.y + ux * offset)
		};
		QuadCurve {
			start: a,
			control,
			end: b,
		}
	}
}
