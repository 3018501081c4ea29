//! Geometry kernel: quadratic roots, cubic Bézier evaluation and extents,
//! ellipse and arc extents, and the mapping that turns an ellipse into the
//! unit circle so PostScript's circular `arc` can draw it.
//!
//! Ellipses are given by a center and two semi-axis vectors `rx`, `ry`
//! relative to that center. The sweep direction of an arc is the sign of
//! `rx × ry`: non-negative means counter-clockwise (increasing angle).

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::types::{Area, Point, Transformation, Vector};

/// Real roots of a quadratic
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Roots {
    None,
    One(f64),
    Two(f64, f64),
}

impl Roots {
    pub fn count(&self) -> usize {
        match self {
            Roots::None => 0,
            Roots::One(_) => 1,
            Roots::Two(_, _) => 2,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> {
        let (first, second) = match *self {
            Roots::None => (None, None),
            Roots::One(t) => (Some(t), None),
            Roots::Two(t1, t2) => (Some(t1), Some(t2)),
        };
        first.into_iter().chain(second)
    }
}

/// Solve `a·t² + b·t + c = 0`.
///
/// When `|a| <= tolerance` the equation is treated as linear; when `b` is
/// negligible too there is no root.
pub fn solve_quadratic(a: f64, b: f64, c: f64, tolerance: f64) -> Roots {
    if a.abs() <= tolerance {
        if b.abs() <= tolerance {
            return Roots::None;
        }
        return Roots::One(-c / b);
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        Roots::None
    } else if discriminant == 0.0 {
        Roots::One(-b / (2.0 * a))
    } else {
        let root = discriminant.sqrt();
        Roots::Two((-b + root) / (2.0 * a), (-b - root) / (2.0 * a))
    }
}

/// One coordinate of a cubic Bézier at parameter `t` (Bernstein form).
pub fn bezier(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let s = 1.0 - t;
    s * s * s * p0 + 3.0 * s * s * t * p1 + 3.0 * s * t * t * p2 + t * t * t * p3
}

/// Point on a cubic Bézier at parameter `t`.
pub fn bezier_point(a: Point, ai: Point, bi: Point, b: Point, t: f64) -> Point {
    Point::new(bezier(a.x, ai.x, bi.x, b.x, t), bezier(a.y, ai.y, bi.y, b.y, t))
}

/// Extremes of one axis of a cubic: where the derivative vanishes.
fn bezier_axis_extremes(p0: f64, p1: f64, p2: f64, p3: f64, tolerance: f64) -> (f64, f64) {
    // B'(t) / 3 = A·t² + B·t + C
    let qa = -p0 + 3.0 * p1 - 3.0 * p2 + p3;
    let qb = 2.0 * p0 - 4.0 * p1 + 2.0 * p2;
    let qc = p1 - p0;

    let mut lo = p0.min(p3);
    let mut hi = p0.max(p3);
    for t in solve_quadratic(qa, qb, qc, tolerance).iter() {
        let v = bezier(p0, p1, p2, p3, t.clamp(0.0, 1.0));
        lo = lo.min(v);
        hi = hi.max(v);
    }
    (lo, hi)
}

/// Tight bounding box of the cubic Bézier `a, ai, bi, b`.
pub fn bezier_bounding_box(a: Point, ai: Point, bi: Point, b: Point, tolerance: f64) -> Area {
    let (min_x, max_x) = bezier_axis_extremes(a.x, ai.x, bi.x, b.x, tolerance);
    let (min_y, max_y) = bezier_axis_extremes(a.y, ai.y, bi.y, b.y, tolerance);
    Area::new(Point::new(min_x, min_y), Point::new(max_x, max_y))
}

/// Half width and half height of the ellipse spanned by `rx` and `ry`.
fn half_extents(rx: Vector, ry: Vector) -> (f64, f64) {
    let xx2 = rx.dx * rx.dx;
    let xy2 = rx.dy * rx.dy;
    let yx2 = ry.dx * ry.dx;
    let yy2 = ry.dy * ry.dy;
    let ax2 = xx2 + xy2;
    let ay2 = yx2 + yy2;
    let dx = ((ax2 * xx2 + ay2 * xy2) / ax2).sqrt();
    let dy = ((ax2 * yx2 + ay2 * yy2) / ay2).sqrt();
    (dx, dy)
}

/// Bounding box of the full ellipse around `center`.
pub fn ellipse_bounding_box(center: Point, rx: Vector, ry: Vector) -> Area {
    let (dx, dy) = half_extents(rx, ry);
    Area::new(
        Point::new(center.x - dx, center.y - dy),
        Point::new(center.x + dx, center.y + dy),
    )
}

/// Sweep direction of an arc with semi-axes `rx`, `ry`.
pub fn is_positive(rx: Vector, ry: Vector) -> bool {
    rx.cross(ry) >= 0.0
}

/// True iff `angle` lies on the arc from `start` to `end` (radians),
/// travelling counter-clockwise when `positive`, clockwise otherwise.
pub fn arc_in_span(angle: f64, start: f64, end: f64, positive: bool) -> bool {
    let (sweep, offset) = if positive {
        ((end - start).rem_euclid(TAU), (angle - start).rem_euclid(TAU))
    } else {
        ((start - end).rem_euclid(TAU), (start - angle).rem_euclid(TAU))
    };
    offset <= sweep
}

/// Bounding box of the arc from `a` to `b` around `center`.
///
/// Starts from the endpoints and adds an axis extreme only when its angle
/// is inside the swept range.
pub fn arc_bounding_box(a: Point, center: Point, rx: Vector, ry: Vector, b: Point) -> Area {
    let (dx, dy) = half_extents(rx, ry);
    let positive = is_positive(rx, ry);
    let start = (a - center).angle();
    let end = (b - center).angle();

    let mut area = Area::from_corners(a, b);
    if arc_in_span(0.0, start, end, positive) || arc_in_span(TAU, start, end, positive) {
        area.max.x = area.max.x.max(center.x + dx);
    }
    if arc_in_span(FRAC_PI_2, start, end, positive) {
        area.max.y = area.max.y.max(center.y + dy);
    }
    if arc_in_span(PI, start, end, positive) {
        area.min.x = area.min.x.min(center.x - dx);
    }
    if arc_in_span(1.5 * PI, start, end, positive) {
        area.min.y = area.min.y.min(center.y - dy);
    }
    area
}

/// How an ellipse arc is expressed with PostScript's circular arcs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EllipseFrame {
    /// `|rx| == |ry|` within tolerance: draw directly as a circle.
    Circle { radius: f64 },
    /// A real ellipse: `to_device` maps the unit circle onto it, `to_unit`
    /// maps its points back onto the unit circle.
    Ellipse {
        to_device: Transformation,
        to_unit: Transformation,
    },
}

impl EllipseFrame {
    pub fn is_ellipse(&self) -> bool {
        matches!(self, EllipseFrame::Ellipse { .. })
    }

    /// Angle of `p` in degrees, on the circle this frame draws.
    ///
    /// For a circle that is the plain angle around `center`; for an
    /// ellipse it is the angle of the mapped point on the unit circle.
    pub fn angle_of(&self, center: Point, p: Point) -> f64 {
        match self {
            EllipseFrame::Circle { .. } => (p - center).angle().to_degrees(),
            EllipseFrame::Ellipse { to_unit, .. } => {
                (p * to_unit - Point::ORIGIN).angle().to_degrees()
            }
        }
    }

    /// Direction of travel at `p` when sweeping in the given direction.
    pub fn tangent_at(&self, center: Point, p: Point, positive: bool) -> Vector {
        let turn = |v: Vector| {
            if positive {
                Vector::new(-v.dy, v.dx)
            } else {
                Vector::new(v.dy, -v.dx)
            }
        };
        match self {
            EllipseFrame::Circle { .. } => turn(p - center),
            EllipseFrame::Ellipse { to_device, to_unit } => {
                turn(p * to_unit - Point::ORIGIN) * to_device
            }
        }
    }
}

/// Decide between circle and ellipse and build the unit-circle mapping.
///
/// The device transform sends `(1, 0)` to `center + rx` and `(0, 1)` to the
/// counter-clockwise perpendicular of `rx` scaled to `|ry|`. A degenerate
/// ellipse whose mapping cannot be inverted falls back to a circle of
/// radius `|ry|`.
pub fn ellipse_to_circle_transform(
    center: Point,
    rx: Vector,
    ry: Vector,
    tolerance: f64,
) -> EllipseFrame {
    let ax = rx.length();
    let ay = ry.length();
    if (ax - ay).abs() <= tolerance || ax == 0.0 {
        return EllipseFrame::Circle { radius: ay };
    }
    let unit = rx * (1.0 / ax);
    let to_device = Transformation::new(
        unit * ax,
        Vector::new(-unit.dy, unit.dx) * ay,
        center,
    );
    match to_device.inverse() {
        Some(to_unit) => EllipseFrame::Ellipse { to_device, to_unit },
        None => EllipseFrame::Circle { radius: ay },
    }
}
