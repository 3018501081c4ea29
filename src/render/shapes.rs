//! Shape tree: the [`Shape`] trait, property styles and groups
//!
//! Each shape knows how to:
//! - Calculate its bounding box
//! - Draw itself through the serializer, resolving its properties against
//!   its parent's
//! - Take a geometric transform

use super::eps::EpsWriter;
use super::path::Path;
use super::text::Text;
use crate::errors::RenderError;
use crate::pool::{PropertyHandle, PropertyPool};
use crate::properties::{Attribute, Cap, Color, Join, LineEnding, LineStyle, Properties};
use crate::types::{Area, Transformation};

/// A shape's own property override, shared through the pool.
///
/// An unset style inherits everything from the parent. The handle is only
/// given back by [`Style::release`]: a style dropped without it keeps its
/// pool record alive until the pool itself goes away.
#[derive(Debug, Default)]
pub struct Style {
    handle: Option<PropertyHandle>,
}

impl Style {
    pub fn handle(&self) -> Option<&PropertyHandle> {
        self.handle.as_ref()
    }

    /// Copy-on-write update of one attribute
    pub fn set(&mut self, pool: &mut PropertyPool, attribute: Attribute) {
        let base = self.handle.take();
        self.handle = Some(pool.with_override(base, attribute));
    }

    /// The properties in effect for a shape with this style under `parent`
    pub fn effective(&self, parent: &Properties, pool: &PropertyPool) -> Result<Properties, RenderError> {
        let over = self.handle.as_ref().map(|h| pool.resolve(h)).transpose()?;
        Ok(parent.resolve(over))
    }

    /// Take another reference to the same record
    pub fn duplicate(&self, pool: &mut PropertyPool) -> Result<Style, RenderError> {
        let handle = match &self.handle {
            None => None,
            Some(handle) => Some(pool.acquire(handle)?),
        };
        Ok(Style { handle })
    }

    pub fn release(self, pool: &mut PropertyPool) {
        if let Some(handle) = self.handle {
            pool.release(handle);
        }
    }
}

/// Common behavior for all shapes
pub trait Shape {
    /// Axis-aligned box around the geometry; empty if there is none
    fn bounding_box(&self, tolerance: f64) -> Area;

    /// Emit the shape. `parent` holds the effective properties of the
    /// enclosing group.
    fn draw(&self, out: &mut EpsWriter, parent: &Properties, pool: &PropertyPool) -> Result<(), RenderError>;

    /// Transform the geometry in place. With `excluding_text`, text keeps
    /// its glyph orientation and size and only its position moves.
    fn apply(&mut self, transform: &Transformation, excluding_text: bool);

    fn style(&self) -> &Style;

    fn style_mut(&mut self) -> &mut Style;

    /// Independent copy holding its own references into `pool`
    fn duplicate(&self, pool: &mut PropertyPool) -> Result<ShapeEnum, RenderError>;

    /// Give every pool reference held by the shape back
    fn release(self, pool: &mut PropertyPool);

    fn set_line_width(&mut self, pool: &mut PropertyPool, width: f64) {
        self.style_mut().set(pool, Attribute::LineWidth(width));
    }

    fn set_line_gray(&mut self, pool: &mut PropertyPool, level: f64) {
        self.style_mut().set(pool, Attribute::StrokeColor(Color::gray(level)));
    }

    fn set_line_rgb(&mut self, pool: &mut PropertyPool, r: f64, g: f64, b: f64) {
        self.style_mut().set(pool, Attribute::StrokeColor(Color::rgb(r, g, b)));
    }

    fn set_fill_gray(&mut self, pool: &mut PropertyPool, level: f64) {
        self.style_mut().set(pool, Attribute::FillColor(Color::gray(level)));
    }

    fn set_fill_rgb(&mut self, pool: &mut PropertyPool, r: f64, g: f64, b: f64) {
        self.style_mut().set(pool, Attribute::FillColor(Color::rgb(r, g, b)));
    }

    fn set_cap(&mut self, pool: &mut PropertyPool, cap: Cap) {
        self.style_mut().set(pool, Attribute::Cap(cap));
    }

    fn set_join(&mut self, pool: &mut PropertyPool, join: Join) {
        self.style_mut().set(pool, Attribute::Join(join));
    }

    fn set_miter_limit(&mut self, pool: &mut PropertyPool, limit: f64) {
        self.style_mut().set(pool, Attribute::MiterLimit(limit));
    }

    fn set_epsilon(&mut self, pool: &mut PropertyPool, epsilon: f64) {
        self.style_mut().set(pool, Attribute::Epsilon(epsilon));
    }

    fn set_line_style(&mut self, pool: &mut PropertyPool, style: LineStyle) {
        self.style_mut().set(pool, Attribute::LineStyle(style));
    }

    fn set_line_begin(&mut self, pool: &mut PropertyPool, ending: LineEnding) {
        self.style_mut().set(pool, Attribute::LineBegin(ending));
    }

    fn set_line_end(&mut self, pool: &mut PropertyPool, ending: LineEnding) {
        self.style_mut().set(pool, Attribute::LineEnd(ending));
    }
}

// ============================================================================
// Shape storage
// ============================================================================

/// Enum wrapping all shape types
#[derive(Debug)]
pub enum ShapeEnum {
    Path(Path),
    Group(Group),
    Text(Text),
}

impl From<Path> for ShapeEnum {
    fn from(path: Path) -> Self {
        ShapeEnum::Path(path)
    }
}

impl From<Group> for ShapeEnum {
    fn from(group: Group) -> Self {
        ShapeEnum::Group(group)
    }
}

impl From<Text> for ShapeEnum {
    fn from(text: Text) -> Self {
        ShapeEnum::Text(text)
    }
}

impl Shape for ShapeEnum {
    fn bounding_box(&self, tolerance: f64) -> Area {
        match self {
            ShapeEnum::Path(s) => s.bounding_box(tolerance),
            ShapeEnum::Group(s) => s.bounding_box(tolerance),
            ShapeEnum::Text(s) => s.bounding_box(tolerance),
        }
    }

    fn draw(&self, out: &mut EpsWriter, parent: &Properties, pool: &PropertyPool) -> Result<(), RenderError> {
        match self {
            ShapeEnum::Path(s) => s.draw(out, parent, pool),
            ShapeEnum::Group(s) => s.draw(out, parent, pool),
            ShapeEnum::Text(s) => s.draw(out, parent, pool),
        }
    }

    fn apply(&mut self, transform: &Transformation, excluding_text: bool) {
        match self {
            ShapeEnum::Path(s) => s.apply(transform, excluding_text),
            ShapeEnum::Group(s) => s.apply(transform, excluding_text),
            ShapeEnum::Text(s) => s.apply(transform, excluding_text),
        }
    }

    fn style(&self) -> &Style {
        match self {
            ShapeEnum::Path(s) => s.style(),
            ShapeEnum::Group(s) => s.style(),
            ShapeEnum::Text(s) => s.style(),
        }
    }

    fn style_mut(&mut self) -> &mut Style {
        match self {
            ShapeEnum::Path(s) => s.style_mut(),
            ShapeEnum::Group(s) => s.style_mut(),
            ShapeEnum::Text(s) => s.style_mut(),
        }
    }

    fn duplicate(&self, pool: &mut PropertyPool) -> Result<ShapeEnum, RenderError> {
        match self {
            ShapeEnum::Path(s) => s.duplicate(pool),
            ShapeEnum::Group(s) => s.duplicate(pool),
            ShapeEnum::Text(s) => s.duplicate(pool),
        }
    }

    fn release(self, pool: &mut PropertyPool) {
        match self {
            ShapeEnum::Path(s) => s.release(pool),
            ShapeEnum::Group(s) => s.release(pool),
            ShapeEnum::Text(s) => s.release(pool),
        }
    }
}

// ============================================================================
// Group
// ============================================================================

/// Ordered children; later children paint over earlier ones.
#[derive(Debug, Default)]
pub struct Group {
    children: Vec<ShapeEnum>,
    style: Style,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, shape: impl Into<ShapeEnum>) -> &mut Self {
        self.children.push(shape.into());
        self
    }

    pub fn children(&self) -> &[ShapeEnum] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [ShapeEnum] {
        &mut self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Remove the child at `index` and release its pool references.
    /// Returns `false` if there is no such child.
    pub fn remove(&mut self, index: usize, pool: &mut PropertyPool) -> bool {
        if index >= self.children.len() {
            return false;
        }
        self.children.remove(index).release(pool);
        true
    }

    /// Release every child and empty the group
    pub fn clear(&mut self, pool: &mut PropertyPool) {
        for child in self.children.drain(..) {
            child.release(pool);
        }
    }
}

impl Shape for Group {
    fn bounding_box(&self, tolerance: f64) -> Area {
        self.children
            .iter()
            .fold(Area::empty(), |area, child| area.union(&child.bounding_box(tolerance)))
    }

    fn draw(&self, out: &mut EpsWriter, parent: &Properties, pool: &PropertyPool) -> Result<(), RenderError> {
        let props = self.style.effective(parent, pool)?;
        for child in &self.children {
            child.draw(out, &props, pool)?;
        }
        Ok(())
    }

    fn apply(&mut self, transform: &Transformation, excluding_text: bool) {
        for child in &mut self.children {
            child.apply(transform, excluding_text);
        }
    }

    fn style(&self) -> &Style {
        &self.style
    }

    fn style_mut(&mut self) -> &mut Style {
        &mut self.style
    }

    fn duplicate(&self, pool: &mut PropertyPool) -> Result<ShapeEnum, RenderError> {
        let mut copy = Group {
            children: Vec::with_capacity(self.children.len()),
            style: self.style.duplicate(pool)?,
        };
        for child in &self.children {
            match child.duplicate(pool) {
                Ok(child) => copy.children.push(child),
                Err(err) => {
                    copy.release(pool);
                    return Err(err);
                }
            }
        }
        Ok(ShapeEnum::Group(copy))
    }

    fn release(self, pool: &mut PropertyPool) {
        self.style.release(pool);
        for child in self.children {
            child.release(pool);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Point, Vector};

    fn segment(from: Point, to: Point) -> Path {
        let mut path = Path::new();
        path.move_to(from).line_to(to);
        path
    }

    // ==== Style tests ====

    #[test]
    fn unset_style_inherits_parent() {
        let pool = PropertyPool::new();
        let mut parent = Properties::default();
        parent.line_width = 3.0;
        let props = Style::default().effective(&parent, &pool).unwrap();
        assert_eq!(props, parent);
    }

    #[test]
    fn identical_setters_share_one_record() {
        let mut pool = PropertyPool::new();
        let mut a = segment(Point::ORIGIN, Point::new(1.0, 0.0));
        let mut b = segment(Point::ORIGIN, Point::new(0.0, 1.0));
        a.set_line_rgb(&mut pool, 0.2, 0.4, 0.6);
        b.set_line_rgb(&mut pool, 0.2, 0.4, 0.6);

        let handle = a.style().handle().unwrap();
        assert_eq!(Some(handle), b.style().handle());
        assert_eq!(pool.ref_count(handle), 2);

        a.release(&mut pool);
        let props = b.style().effective(&Properties::default(), &pool).unwrap();
        assert_eq!(props.stroke, Color::rgb(0.2, 0.4, 0.6));
    }

    #[test]
    fn setter_does_not_touch_shared_record() {
        let mut pool = PropertyPool::new();
        let mut a = segment(Point::ORIGIN, Point::new(1.0, 0.0));
        a.set_line_width(&mut pool, 2.0);
        let ShapeEnum::Path(mut b) = a.duplicate(&mut pool).unwrap() else {
            panic!("duplicate changed the shape kind");
        };
        b.set_cap(&mut pool, Cap::Round);

        let root = Properties::default();
        let pa = a.style().effective(&root, &pool).unwrap();
        let pb = b.style().effective(&root, &pool).unwrap();
        assert_eq!(pa.cap, Cap::Butt);
        assert_eq!(pb.cap, Cap::Round);
        assert_eq!(pb.line_width, 2.0);
    }

    // ==== Group tests ====

    #[test]
    fn empty_group_has_empty_box() {
        assert!(Group::new().bounding_box(1e-3).is_empty());
    }

    #[test]
    fn group_box_is_union_of_children() {
        let mut inner = Group::new();
        inner.add(segment(Point::new(-5.0, 2.0), Point::new(0.0, 0.0)));
        let mut group = Group::new();
        group
            .add(segment(Point::new(0.0, 0.0), Point::new(10.0, 4.0)))
            .add(Group::new())
            .add(inner);
        let area = group.bounding_box(1e-3);
        assert_eq!(area.min, Point::new(-5.0, 0.0));
        assert_eq!(area.max, Point::new(10.0, 4.0));
    }

    #[test]
    fn children_draw_in_order_under_group_properties() {
        let mut pool = PropertyPool::new();
        let mut group = Group::new();
        group.set_line_width(&mut pool, 2.0);
        let mut second = segment(Point::new(0.0, 1.0), Point::new(1.0, 1.0));
        second.set_line_gray(&mut pool, 0.5);
        group
            .add(segment(Point::new(0.0, 0.0), Point::new(1.0, 0.0)))
            .add(second);

        let mut out = EpsWriter::new();
        group.draw(&mut out, &Properties::default(), &pool).unwrap();
        assert_eq!(
            out.output(),
            "newpath\n0 0 moveto\n1 0 lineto\n2 setlinewidth\nstroke\n\
             newpath\n0 1 moveto\n1 1 lineto\n0.5 setgray\nstroke\n"
        );
    }

    #[test]
    fn apply_reaches_nested_children() {
        let mut inner = Group::new();
        inner.add(segment(Point::new(1.0, 1.0), Point::new(2.0, 2.0)));
        let mut group = Group::new();
        group.add(inner);
        group.apply(&Transformation::translation(Vector::new(10.0, 0.0)), false);
        let area = group.bounding_box(1e-3);
        assert_eq!(area.min, Point::new(11.0, 1.0));
        assert_eq!(area.max, Point::new(12.0, 2.0));
    }

    #[test]
    fn remove_releases_the_child() {
        let mut pool = PropertyPool::new();
        let mut first = segment(Point::ORIGIN, Point::new(1.0, 0.0));
        first.set_line_width(&mut pool, 4.0);
        let mut second = segment(Point::ORIGIN, Point::new(0.0, 1.0));
        second.set_line_width(&mut pool, 4.0);
        let mut group = Group::new();
        group.add(first).add(second);
        assert_eq!(pool.len(), 1);

        assert!(group.remove(0, &mut pool));
        assert_eq!(group.len(), 1);
        let remaining = group.children()[0].style().handle().unwrap();
        assert_eq!(pool.ref_count(remaining), 1);

        assert!(!group.remove(5, &mut pool));
        assert!(group.remove(0, &mut pool));
        assert!(group.is_empty());
        assert!(pool.is_empty());
    }

    #[test]
    fn duplicate_and_release_balance_references() {
        let mut pool = PropertyPool::new();
        let mut child = segment(Point::ORIGIN, Point::new(1.0, 1.0));
        child.set_fill_gray(&mut pool, 0.25);
        let mut group = Group::new();
        group.set_join(&mut pool, Join::Round);
        group.add(child);
        assert_eq!(pool.len(), 2);

        let copy = group.duplicate(&mut pool).unwrap();
        let handle = group.style().handle().unwrap();
        assert_eq!(pool.ref_count(handle), 2);

        copy.release(&mut pool);
        assert_eq!(pool.ref_count(group.style().handle().unwrap()), 1);
        group.release(&mut pool);
        assert!(pool.is_empty());
    }
}
