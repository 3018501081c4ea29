//! Drawing attributes: the fully resolved [`Properties`] record and the
//! partial [`PropertiesOverride`] a shape layers on top of its parent.
//!
//! Overrides compare and hash by value so identical ones can be interned
//! (see [`crate::pool`]). Floats are compared bitwise after folding `-0.0`
//! onto `0.0`, which keeps `Eq` and `Hash` consistent.

use std::hash::{Hash, Hasher};

use crate::render::defaults;
use crate::types::{NumericError, check_non_negative, check_unit};

/// Bit pattern used for equality and hashing of float attributes.
#[inline]
fn canonical_bits(v: f64) -> u64 {
    if v == 0.0 { 0 } else { v.to_bits() }
}

#[inline]
fn same_real(a: Option<f64>, b: Option<f64>) -> bool {
    a.map(canonical_bits) == b.map(canonical_bits)
}

/// Line cap style, numbered as PostScript's `setlinecap` operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cap {
    #[default]
    Butt = 0,
    Round = 1,
    Square = 2,
}

/// Line join style, numbered as PostScript's `setlinejoin` operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Join {
    #[default]
    Miter = 0,
    Round = 1,
    Bevel = 2,
}

/// RGB color with channels in `[0, 1]`
#[derive(Debug, Clone, Copy)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color::gray(0.0);
    pub const WHITE: Color = Color::gray(1.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);

    /// Create an RGB color (unchecked).
    /// Use `try_rgb` for user-provided values.
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Color { r, g, b }
    }

    /// A gray level: all three channels equal
    pub const fn gray(level: f64) -> Self {
        Color { r: level, g: level, b: level }
    }

    /// Create an RGB color with every channel validated against `[0, 1]`
    pub fn try_rgb(r: f64, g: f64, b: f64) -> Result<Self, NumericError> {
        Ok(Color {
            r: check_unit(r)?,
            g: check_unit(g)?,
            b: check_unit(b)?,
        })
    }

    /// True when the color reduces to a single gray channel
    pub fn is_gray(&self) -> bool {
        self.r == self.g && self.g == self.b
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        canonical_bits(self.r) == canonical_bits(other.r)
            && canonical_bits(self.g) == canonical_bits(other.g)
            && canonical_bits(self.b) == canonical_bits(other.b)
    }
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        canonical_bits(self.r).hash(state);
        canonical_bits(self.g).hash(state);
        canonical_bits(self.b).hash(state);
    }
}

/// Dash pattern of a stroked line
#[derive(Debug, Clone, Default)]
pub enum LineStyle {
    #[default]
    Solid,
    /// Alternating on/off lengths, starting `offset` into the pattern
    Dashed { pattern: Vec<f64>, offset: f64 },
}

impl LineStyle {
    pub fn dashed(pattern: impl Into<Vec<f64>>, offset: f64) -> Self {
        LineStyle::Dashed {
            pattern: pattern.into(),
            offset,
        }
    }
}

impl PartialEq for LineStyle {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LineStyle::Solid, LineStyle::Solid) => true,
            (
                LineStyle::Dashed { pattern: a, offset: oa },
                LineStyle::Dashed { pattern: b, offset: ob },
            ) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| canonical_bits(*x) == canonical_bits(*y))
                    && canonical_bits(*oa) == canonical_bits(*ob)
            }
            _ => false,
        }
    }
}

impl Eq for LineStyle {}

impl Hash for LineStyle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        if let LineStyle::Dashed { pattern, offset } = self {
            for v in pattern {
                canonical_bits(*v).hash(state);
            }
            canonical_bits(*offset).hash(state);
        }
    }
}

/// Decoration drawn at the open end of a stroked path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum LineEnding {
    #[default]
    None,
    /// Filled triangular arrowhead
    Arrow,
    /// Short bar across the line
    Bar,
    /// Filled disc
    Dot,
}

/// One attribute with its value; the unit of copy-on-write edits.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    LineWidth(f64),
    StrokeColor(Color),
    FillColor(Color),
    Cap(Cap),
    Join(Join),
    MiterLimit(f64),
    Epsilon(f64),
    LineStyle(LineStyle),
    LineBegin(LineEnding),
    LineEnd(LineEnding),
}

impl Attribute {
    /// Line width, rejecting negative and non-finite values
    pub fn try_line_width(width: f64) -> Result<Self, NumericError> {
        Ok(Attribute::LineWidth(check_non_negative(width)?))
    }

    pub fn try_miter_limit(limit: f64) -> Result<Self, NumericError> {
        Ok(Attribute::MiterLimit(check_non_negative(limit)?))
    }

    pub fn try_epsilon(epsilon: f64) -> Result<Self, NumericError> {
        Ok(Attribute::Epsilon(check_non_negative(epsilon)?))
    }
}

/// A complete attribute set; every field has a value.
///
/// The root of every resolution chain. The defaults equal PostScript's
/// initial graphics state so a fresh page emits nothing for them.
#[derive(Debug, Clone, PartialEq)]
pub struct Properties {
    pub line_width: f64,
    pub stroke: Color,
    pub fill: Color,
    pub cap: Cap,
    pub join: Join,
    pub miter_limit: f64,
    /// Geometric tolerance for circle detection and root clipping
    pub epsilon: f64,
    pub line_style: LineStyle,
    pub line_begin: LineEnding,
    pub line_end: LineEnding,
}

impl Default for Properties {
    fn default() -> Self {
        Self {
            line_width: defaults::LINE_WIDTH,
            stroke: Color::BLACK,
            fill: Color::BLACK,
            cap: Cap::Butt,
            join: Join::Miter,
            miter_limit: defaults::MITER_LIMIT,
            epsilon: defaults::EPSILON,
            line_style: LineStyle::Solid,
            line_begin: LineEnding::None,
            line_end: LineEnding::None,
        }
    }
}

impl Properties {
    /// Layer `over` on top of these properties.
    pub fn resolve(&self, over: Option<&PropertiesOverride>) -> Properties {
        match over {
            Some(over) => over.apply_to(self),
            None => self.clone(),
        }
    }
}

/// Optional per-attribute overrides held by a shape.
#[derive(Debug, Clone, Default)]
pub struct PropertiesOverride {
    pub line_width: Option<f64>,
    pub stroke: Option<Color>,
    pub fill: Option<Color>,
    pub cap: Option<Cap>,
    pub join: Option<Join>,
    pub miter_limit: Option<f64>,
    pub epsilon: Option<f64>,
    pub line_style: Option<LineStyle>,
    pub line_begin: Option<LineEnding>,
    pub line_end: Option<LineEnding>,
}

impl PropertiesOverride {
    /// Set one attribute, replacing any previous value for it.
    pub fn set(&mut self, attribute: Attribute) {
        match attribute {
            Attribute::LineWidth(v) => self.line_width = Some(v),
            Attribute::StrokeColor(c) => self.stroke = Some(c),
            Attribute::FillColor(c) => self.fill = Some(c),
            Attribute::Cap(c) => self.cap = Some(c),
            Attribute::Join(j) => self.join = Some(j),
            Attribute::MiterLimit(v) => self.miter_limit = Some(v),
            Attribute::Epsilon(v) => self.epsilon = Some(v),
            Attribute::LineStyle(s) => self.line_style = Some(s),
            Attribute::LineBegin(e) => self.line_begin = Some(e),
            Attribute::LineEnd(e) => self.line_end = Some(e),
        }
    }

    /// True when no attribute is overridden
    pub fn is_empty(&self) -> bool {
        self.line_width.is_none()
            && self.stroke.is_none()
            && self.fill.is_none()
            && self.cap.is_none()
            && self.join.is_none()
            && self.miter_limit.is_none()
            && self.epsilon.is_none()
            && self.line_style.is_none()
            && self.line_begin.is_none()
            && self.line_end.is_none()
    }

    /// Each attribute from this record if present, else from `parent`.
    pub fn apply_to(&self, parent: &Properties) -> Properties {
        Properties {
            line_width: self.line_width.unwrap_or(parent.line_width),
            stroke: self.stroke.unwrap_or(parent.stroke),
            fill: self.fill.unwrap_or(parent.fill),
            cap: self.cap.unwrap_or(parent.cap),
            join: self.join.unwrap_or(parent.join),
            miter_limit: self.miter_limit.unwrap_or(parent.miter_limit),
            epsilon: self.epsilon.unwrap_or(parent.epsilon),
            line_style: self
                .line_style
                .clone()
                .unwrap_or_else(|| parent.line_style.clone()),
            line_begin: self.line_begin.unwrap_or(parent.line_begin),
            line_end: self.line_end.unwrap_or(parent.line_end),
        }
    }
}

impl PartialEq for PropertiesOverride {
    fn eq(&self, other: &Self) -> bool {
        same_real(self.line_width, other.line_width)
            && self.stroke == other.stroke
            && self.fill == other.fill
            && self.cap == other.cap
            && self.join == other.join
            && same_real(self.miter_limit, other.miter_limit)
            && same_real(self.epsilon, other.epsilon)
            && self.line_style == other.line_style
            && self.line_begin == other.line_begin
            && self.line_end == other.line_end
    }
}

impl Eq for PropertiesOverride {}

impl Hash for PropertiesOverride {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.line_width.map(canonical_bits).hash(state);
        self.stroke.hash(state);
        self.fill.hash(state);
        self.cap.hash(state);
        self.join.hash(state);
        self.miter_limit.map(canonical_bits).hash(state);
        self.epsilon.map(canonical_bits).hash(state);
        self.line_style.hash(state);
        self.line_begin.hash(state);
        self.line_end.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of<T: Hash>(v: &T) -> u64 {
        let mut h = DefaultHasher::new();
        v.hash(&mut h);
        h.finish()
    }

    #[test]
    fn equal_overrides_hash_equal() {
        let mut a = PropertiesOverride::default();
        a.set(Attribute::LineWidth(2.0));
        a.set(Attribute::StrokeColor(Color::RED));
        let mut b = PropertiesOverride::default();
        b.set(Attribute::StrokeColor(Color::RED));
        b.set(Attribute::LineWidth(2.0));
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn negative_zero_equals_zero() {
        let mut a = PropertiesOverride::default();
        a.set(Attribute::LineWidth(0.0));
        let mut b = PropertiesOverride::default();
        b.set(Attribute::LineWidth(-0.0));
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn unset_differs_from_default_value() {
        let mut a = PropertiesOverride::default();
        a.set(Attribute::LineWidth(defaults::LINE_WIDTH));
        assert_ne!(a, PropertiesOverride::default());
    }

    #[test]
    fn apply_to_takes_missing_fields_from_parent() {
        let parent = Properties {
            line_width: 3.0,
            cap: Cap::Round,
            ..Properties::default()
        };
        let mut over = PropertiesOverride::default();
        over.set(Attribute::FillColor(Color::BLUE));
        let resolved = parent.resolve(Some(&over));
        assert_eq!(resolved.line_width, 3.0);
        assert_eq!(resolved.cap, Cap::Round);
        assert_eq!(resolved.fill, Color::BLUE);
        assert_eq!(resolved.stroke, Color::BLACK);
    }

    #[test]
    fn dashed_styles_compare_by_value() {
        assert_eq!(LineStyle::dashed([3.0, 1.0], 0.0), LineStyle::dashed(vec![3.0, 1.0], 0.0));
        assert_ne!(LineStyle::dashed([3.0, 1.0], 0.0), LineStyle::dashed([3.0], 0.0));
        assert_ne!(LineStyle::dashed([3.0], 0.0), LineStyle::Solid);
    }

    #[test]
    fn gray_detection() {
        assert!(Color::gray(0.5).is_gray());
        assert!(!Color::RED.is_gray());
    }

    #[test]
    fn try_rgb_validates_channels() {
        assert!(Color::try_rgb(0.2, 0.4, 0.6).is_ok());
        assert_eq!(Color::try_rgb(0.2, 1.4, 0.6), Err(NumericError::OutOfUnitRange));
    }

    #[test]
    fn numeric_attributes_validate() {
        assert_eq!(Attribute::try_line_width(2.0), Ok(Attribute::LineWidth(2.0)));
        assert_eq!(Attribute::try_line_width(-1.0), Err(NumericError::Negative));
        assert_eq!(Attribute::try_miter_limit(f64::NAN), Err(NumericError::NaN));
        assert_eq!(Attribute::try_epsilon(f64::INFINITY), Err(NumericError::Infinite));
    }
}
