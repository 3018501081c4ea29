//! Plain 2-D geometry primitives: points, vectors, affine transforms and
//! axis-aligned areas.
//!
//! Points and vectors are kept apart on purpose: `Point - Point` gives a
//! `Vector`, `Point + Vector` gives a `Point`, and only vectors scale.
//! The math underneath is done with `glam`'s double precision types.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub};

use glam::{DAffine2, DMat2, DVec2, dvec2};

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
    /// Value is negative when non-negative required
    Negative,
    /// Value is outside the closed unit interval
    OutOfUnitRange,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
            NumericError::Negative => write!(f, "value is negative"),
            NumericError::OutOfUnitRange => write!(f, "value is outside [0, 1]"),
        }
    }
}

impl std::error::Error for NumericError {}

/// Reject NaN and infinities.
#[inline]
pub fn check_finite(val: f64) -> Result<f64, NumericError> {
    if val.is_nan() {
        Err(NumericError::NaN)
    } else if val.is_infinite() {
        Err(NumericError::Infinite)
    } else {
        Ok(val)
    }
}

/// Reject non-finite and negative values.
#[inline]
pub fn check_non_negative(val: f64) -> Result<f64, NumericError> {
    let val = check_finite(val)?;
    if val < 0.0 {
        Err(NumericError::Negative)
    } else {
        Ok(val)
    }
}

/// Accept only values in `[0, 1]` (color channels).
#[inline]
pub fn check_unit(val: f64) -> Result<f64, NumericError> {
    let val = check_finite(val)?;
    if (0.0..=1.0).contains(&val) {
        Ok(val)
    } else {
        Err(NumericError::OutOfUnitRange)
    }
}

/// An absolute position
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Like [`Point::new`], rejecting NaN and infinite coordinates.
    pub fn try_new(x: f64, y: f64) -> Result<Self, NumericError> {
        Ok(Point::new(check_finite(x)?, check_finite(y)?))
    }

    #[inline]
    pub fn to_dvec2(self) -> DVec2 {
        dvec2(self.x, self.y)
    }

    #[inline]
    pub fn from_dvec2(v: DVec2) -> Self {
        Point { x: v.x, y: v.y }
    }

    /// Component-wise minimum
    pub fn min(self, other: Point) -> Point {
        Point::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum
    pub fn max(self, other: Point) -> Point {
        Point::new(self.x.max(other.x), self.y.max(other.y))
    }
}

/// A displacement (not an absolute position)
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Vector {
    pub dx: f64,
    pub dy: f64,
}

impl Vector {
    pub const ZERO: Vector = Vector { dx: 0.0, dy: 0.0 };

    pub const fn new(dx: f64, dy: f64) -> Self {
        Vector { dx, dy }
    }

    #[inline]
    pub fn to_dvec2(self) -> DVec2 {
        dvec2(self.dx, self.dy)
    }

    #[inline]
    pub fn from_dvec2(v: DVec2) -> Self {
        Vector { dx: v.x, dy: v.y }
    }

    /// Euclidean length
    #[inline]
    pub fn length(self) -> f64 {
        self.to_dvec2().length()
    }

    /// Squared length, avoids the square root
    #[inline]
    pub fn length_squared(self) -> f64 {
        self.to_dvec2().length_squared()
    }

    /// z component of the 3-D cross product; positive when `other` turns
    /// counter-clockwise from `self`.
    #[inline]
    pub fn cross(self, other: Vector) -> f64 {
        self.to_dvec2().perp_dot(other.to_dvec2())
    }

    /// Angle against the positive x axis in radians, in `(-pi, pi]`
    #[inline]
    pub fn angle(self) -> f64 {
        self.dy.atan2(self.dx)
    }
}

impl Add<Vector> for Point {
    type Output = Point;
    fn add(self, rhs: Vector) -> Point {
        Point::new(self.x + rhs.dx, self.y + rhs.dy)
    }
}

impl Sub<Vector> for Point {
    type Output = Point;
    fn sub(self, rhs: Vector) -> Point {
        Point::new(self.x - rhs.dx, self.y - rhs.dy)
    }
}

/// Subtract two points to get a vector
impl Sub<Point> for Point {
    type Output = Vector;
    fn sub(self, rhs: Point) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add for Vector {
    type Output = Vector;
    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.dx + rhs.dx, self.dy + rhs.dy)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Vector) {
        self.dx += rhs.dx;
        self.dy += rhs.dy;
    }
}

impl Sub for Vector {
    type Output = Vector;
    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.dx - rhs.dx, self.dy - rhs.dy)
    }
}

impl Neg for Vector {
    type Output = Vector;
    fn neg(self) -> Vector {
        Vector::new(-self.dx, -self.dy)
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;
    fn mul(self, rhs: f64) -> Vector {
        Vector::new(self.dx * rhs, self.dy * rhs)
    }
}

impl MulAssign<f64> for Vector {
    fn mul_assign(&mut self, rhs: f64) {
        self.dx *= rhs;
        self.dy *= rhs;
    }
}

/// `point * transform` maps the point through the transform.
impl Mul<&Transformation> for Point {
    type Output = Point;
    fn mul(self, rhs: &Transformation) -> Point {
        rhs.transform_point(self)
    }
}

impl MulAssign<&Transformation> for Point {
    fn mul_assign(&mut self, rhs: &Transformation) {
        *self = rhs.transform_point(*self);
    }
}

/// `vector * transform` maps the vector through the linear part only.
impl Mul<&Transformation> for Vector {
    type Output = Vector;
    fn mul(self, rhs: &Transformation) -> Vector {
        rhs.transform_vector(self)
    }
}

/// Affine map: a 2x2 linear part followed by a translation.
///
/// Written out in PostScript matrix order `[a b c d tx ty]`, where `(a, b)`
/// is the image of the x unit vector and `(c, d)` the image of the y unit
/// vector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transformation(DAffine2);

impl Default for Transformation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transformation {
    pub const IDENTITY: Transformation = Transformation(DAffine2::IDENTITY);

    /// Build from the images of the two unit vectors and the translation.
    pub fn new(x_axis: Vector, y_axis: Vector, translation: Point) -> Self {
        Transformation(DAffine2::from_mat2_translation(
            DMat2::from_cols(x_axis.to_dvec2(), y_axis.to_dvec2()),
            translation.to_dvec2(),
        ))
    }

    pub fn translation(offset: Vector) -> Self {
        Transformation(DAffine2::from_translation(offset.to_dvec2()))
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Transformation(DAffine2::from_scale(dvec2(sx, sy)))
    }

    /// Counter-clockwise rotation by `degrees`
    pub fn rotation(degrees: f64) -> Self {
        Transformation(DAffine2::from_angle(degrees.to_radians()))
    }

    pub fn x_axis(&self) -> Vector {
        Vector::from_dvec2(self.0.matrix2.x_axis)
    }

    pub fn y_axis(&self) -> Vector {
        Vector::from_dvec2(self.0.matrix2.y_axis)
    }

    pub fn offset(&self) -> Point {
        Point::from_dvec2(self.0.translation)
    }

    /// Determinant of the linear part
    pub fn determinant(&self) -> f64 {
        self.0.matrix2.determinant()
    }

    /// The inverse map, or `None` when the linear part is singular.
    pub fn inverse(&self) -> Option<Transformation> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        Some(Transformation(self.0.inverse()))
    }

    /// `self` followed by `next`.
    pub fn then(&self, next: &Transformation) -> Transformation {
        Transformation(next.0 * self.0)
    }

    pub fn transform_point(&self, p: Point) -> Point {
        Point::from_dvec2(self.0.transform_point2(p.to_dvec2()))
    }

    pub fn transform_vector(&self, v: Vector) -> Vector {
        Vector::from_dvec2(self.0.transform_vector2(v.to_dvec2()))
    }

    /// Rotation of the image of the x axis, in degrees.
    pub fn rotation_degrees(&self) -> f64 {
        self.x_axis().angle().to_degrees()
    }

    /// Uniform scale factor of the linear part (`sqrt(|det|)`).
    pub fn scale_factor(&self) -> f64 {
        self.determinant().abs().sqrt()
    }
}

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Area {
    pub min: Point,
    pub max: Point,
}

impl Default for Area {
    fn default() -> Self {
        Self::empty()
    }
}

impl Area {
    pub fn new(min: Point, max: Point) -> Self {
        Area { min, max }
    }

    /// The null box: min at +inf, max at -inf, so any union replaces it.
    pub fn empty() -> Self {
        Area {
            min: Point::new(f64::INFINITY, f64::INFINITY),
            max: Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Smallest box holding both points
    pub fn from_corners(a: Point, b: Point) -> Self {
        Area {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Check if the box is empty (never expanded)
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Check that every coordinate is finite
    pub fn is_finite(&self) -> bool {
        self.min.x.is_finite()
            && self.min.y.is_finite()
            && self.max.x.is_finite()
            && self.max.y.is_finite()
    }

    /// Expand to include a point
    pub fn expand_point(&mut self, p: Point) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Expand to include another box
    pub fn expand_area(&mut self, other: &Area) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn union(mut self, other: &Area) -> Area {
        self.expand_area(other);
        self
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Round outwards to whole units: min floored, max ceiled.
    pub fn rounded_out(&self) -> Area {
        Area {
            min: Point::new(self.min.x.floor(), self.min.y.floor()),
            max: Point::new(self.max.x.ceil(), self.max.y.ceil()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== numeric checks ====================

    #[test]
    fn check_unit_accepts_bounds() {
        assert_eq!(check_unit(0.0), Ok(0.0));
        assert_eq!(check_unit(1.0), Ok(1.0));
    }

    #[test]
    fn check_unit_rejects_out_of_range() {
        assert_eq!(check_unit(1.5), Err(NumericError::OutOfUnitRange));
        assert_eq!(check_unit(-0.1), Err(NumericError::OutOfUnitRange));
        assert_eq!(check_unit(f64::NAN), Err(NumericError::NaN));
    }

    #[test]
    fn check_non_negative_rejects_negative() {
        assert_eq!(check_non_negative(-1.0), Err(NumericError::Negative));
        assert_eq!(check_non_negative(f64::INFINITY), Err(NumericError::Infinite));
    }

    // ==================== Point/Vector ====================

    #[test]
    fn try_new_rejects_non_finite_coordinates() {
        assert_eq!(Point::try_new(1.0, -2.0), Ok(Point::new(1.0, -2.0)));
        assert_eq!(Point::try_new(f64::NAN, 0.0), Err(NumericError::NaN));
        assert_eq!(Point::try_new(0.0, f64::NEG_INFINITY), Err(NumericError::Infinite));
    }

    #[test]
    fn point_minus_point_gives_vector() {
        let v = Point::new(5.0, 7.0) - Point::new(2.0, 3.0);
        assert_eq!(v, Vector::new(3.0, 4.0));
        assert_eq!(v.length(), 5.0);
    }

    #[test]
    fn point_plus_vector_gives_point() {
        let p = Point::new(1.0, 2.0) + Vector::new(3.0, 4.0) * 2.0;
        assert_eq!(p, Point::new(7.0, 10.0));
    }

    #[test]
    fn cross_sign_follows_winding() {
        let x = Vector::new(1.0, 0.0);
        let y = Vector::new(0.0, 1.0);
        assert!(x.cross(y) > 0.0);
        assert!(y.cross(x) < 0.0);
    }

    // ==================== Transformation ====================

    #[test]
    fn transformation_maps_unit_axes() {
        let t = Transformation::new(Vector::new(2.0, 0.0), Vector::new(0.0, 3.0), Point::new(1.0, 1.0));
        assert_eq!(Point::new(1.0, 0.0) * &t, Point::new(3.0, 1.0));
        assert_eq!(Point::new(0.0, 1.0) * &t, Point::new(1.0, 4.0));
        assert_eq!(Vector::new(1.0, 1.0) * &t, Vector::new(2.0, 3.0));
    }

    #[test]
    fn transformation_inverse_round_trips() {
        let t = Transformation::new(Vector::new(2.0, 1.0), Vector::new(-1.0, 3.0), Point::new(5.0, -2.0));
        let inv = t.inverse().unwrap();
        let p = Point::new(0.25, -4.0);
        let back = (p * &t) * &inv;
        assert!((back.x - p.x).abs() < 1e-12);
        assert!((back.y - p.y).abs() < 1e-12);
    }

    #[test]
    fn singular_transformation_has_no_inverse() {
        let t = Transformation::new(Vector::new(1.0, 1.0), Vector::new(2.0, 2.0), Point::ORIGIN);
        assert!(t.inverse().is_none());
    }

    #[test]
    fn then_applies_left_to_right() {
        let t = Transformation::scale(2.0, 2.0).then(&Transformation::translation(Vector::new(1.0, 0.0)));
        assert_eq!(Point::new(1.0, 1.0) * &t, Point::new(3.0, 2.0));
    }

    #[test]
    fn rotation_and_scale_are_recovered() {
        let t = Transformation::rotation(90.0).then(&Transformation::scale(3.0, 3.0));
        assert!((t.rotation_degrees() - 90.0).abs() < 1e-9);
        assert!((t.scale_factor() - 3.0).abs() < 1e-9);
    }

    // ==================== Area ====================

    #[test]
    fn empty_area_is_empty() {
        let a = Area::empty();
        assert!(a.is_empty());
        assert!(!a.is_finite());
    }

    #[test]
    fn union_with_empty_is_identity() {
        let a = Area::from_corners(Point::new(3.0, 4.0), Point::new(1.0, 2.0));
        assert_eq!(a.union(&Area::empty()), a);
        assert_eq!(Area::empty().union(&a), a);
        assert_eq!(a.min, Point::new(1.0, 2.0));
    }

    #[test]
    fn rounded_out_floors_and_ceils() {
        let a = Area::new(Point::new(-0.5, 0.2), Point::new(9.1, 9.9)).rounded_out();
        assert_eq!(a, Area::new(Point::new(-1.0, 0.0), Point::new(10.0, 10.0)));
    }
}
