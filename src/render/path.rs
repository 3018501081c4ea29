//! Paths: a point pool plus an ordered list of segments indexing into it.

use super::eps::EpsWriter;
use super::geometry::{arc_bounding_box, bezier_bounding_box, ellipse_to_circle_transform, is_positive};
use super::shapes::{Shape, ShapeEnum, Style};
use crate::errors::{PathError, RenderError};
use crate::pool::PropertyPool;
use crate::properties::{LineEnding, Properties};
use crate::types::{Area, Point, Transformation, Vector};

/// One drawing instruction. Payloads are indices into the owning path's
/// point pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment {
    MoveTo(usize),
    LineTo(usize),
    CurveTo {
        ctrl1: usize,
        ctrl2: usize,
        end: usize,
    },
    /// Elliptical arc from the current point. `x_axis` and `y_axis` are the
    /// absolute points `center + rx` and `center + ry`.
    ArcTo {
        center: usize,
        x_axis: usize,
        y_axis: usize,
        end: usize,
    },
    ClosePath,
}

/// Resolved geometry of an arc segment
#[derive(Debug, Clone, Copy)]
struct Arc {
    center: Point,
    rx: Vector,
    ry: Vector,
    end: Point,
}

/// Current point and sub-path start while walking the segment list
#[derive(Debug, Default, Clone, Copy)]
struct Cursor {
    current: Option<Point>,
    subpath_start: Option<Point>,
}

impl Cursor {
    fn advance(&mut self, segment: &PathSegment, points: &[Point]) {
        match *segment {
            PathSegment::MoveTo(p) => {
                self.current = Some(points[p]);
                self.subpath_start = self.current;
            }
            PathSegment::LineTo(p) => self.current = Some(points[p]),
            PathSegment::CurveTo { end, .. } | PathSegment::ArcTo { end, .. } => {
                self.current = Some(points[end])
            }
            PathSegment::ClosePath => self.current = self.subpath_start,
        }
    }
}

/// A sequence of sub-paths, filled or stroked as a whole.
#[derive(Debug, Default)]
pub struct Path {
    points: Vec<Point>,
    segments: Vec<PathSegment>,
    /// Set by the first `move_to`; `close_path` keeps it.
    has_current: bool,
    filled: bool,
    style: Style,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_filled(&self) -> bool {
        self.filled
    }

    /// Fill the path with the fill color, then stroke its outline.
    pub fn set_filled(&mut self, filled: bool) -> &mut Self {
        self.filled = filled;
        self
    }

    fn push(&mut self, p: Point) -> usize {
        self.points.push(p);
        self.points.len() - 1
    }

    /// Where the next segment starts, `None` before the first `move_to`
    pub fn current_point(&self) -> Option<Point> {
        let mut cursor = Cursor::default();
        for segment in &self.segments {
            cursor.advance(segment, &self.points);
        }
        cursor.current
    }

    pub fn move_to(&mut self, p: Point) -> &mut Self {
        let index = self.push(p);
        self.segments.push(PathSegment::MoveTo(index));
        self.has_current = true;
        self
    }

    /// Straight segment to `p`. Without a current point this starts a new
    /// sub-path at `p` instead.
    pub fn line_to(&mut self, p: Point) -> &mut Self {
        if !self.has_current {
            return self.move_to(p);
        }
        let index = self.push(p);
        self.segments.push(PathSegment::LineTo(index));
        self
    }

    pub fn curve_to(&mut self, ctrl1: Point, ctrl2: Point, end: Point) -> Result<&mut Self, PathError> {
        if !self.has_current {
            return Err(PathError::NoCurrentPoint { operation: "curve_to" });
        }
        let ctrl1 = self.push(ctrl1);
        let ctrl2 = self.push(ctrl2);
        let end = self.push(end);
        self.segments.push(PathSegment::CurveTo { ctrl1, ctrl2, end });
        Ok(self)
    }

    /// Elliptical arc from the current point to `end` around `center`, with
    /// semi-axes `rx` and `ry`. The sweep runs counter-clockwise when
    /// `rx × ry` is non-negative.
    pub fn arc_to(&mut self, center: Point, rx: Vector, ry: Vector, end: Point) -> Result<&mut Self, PathError> {
        if !self.has_current {
            return Err(PathError::NoCurrentPoint { operation: "arc_to" });
        }
        let c = self.push(center);
        let x_axis = self.push(center + rx);
        let y_axis = self.push(center + ry);
        let end = self.push(end);
        self.segments.push(PathSegment::ArcTo {
            center: c,
            x_axis,
            y_axis,
            end,
        });
        Ok(self)
    }

    /// Close the current sub-path. Does nothing before the first `move_to`.
    pub fn close_path(&mut self) -> &mut Self {
        if self.has_current {
            self.segments.push(PathSegment::ClosePath);
        }
        self
    }

    fn arc(&self, center: usize, x_axis: usize, y_axis: usize, end: usize) -> Arc {
        let center = self.points[center];
        Arc {
            center,
            rx: self.points[x_axis] - center,
            ry: self.points[y_axis] - center,
            end: self.points[end],
        }
    }

    fn is_open(&self) -> bool {
        !matches!(self.segments.last(), None | Some(PathSegment::ClosePath))
    }

    /// Point and outward direction for the begin decoration
    fn begin_tangent(&self, tolerance: f64) -> Option<(Point, Vector)> {
        let mut cursor = Cursor::default();
        for segment in &self.segments {
            let start = cursor.current;
            cursor.advance(segment, &self.points);
            let Some(start) = start else { continue };
            let direction = match *segment {
                PathSegment::MoveTo(_) | PathSegment::ClosePath => continue,
                PathSegment::LineTo(p) => start - self.points[p],
                PathSegment::CurveTo { ctrl1, ctrl2, end } => [ctrl1, ctrl2, end]
                    .into_iter()
                    .map(|i| start - self.points[i])
                    .find(|v| v.length_squared() > 0.0)
                    .unwrap_or(Vector::ZERO),
                PathSegment::ArcTo { center, x_axis, y_axis, end } => {
                    let arc = self.arc(center, x_axis, y_axis, end);
                    let frame = ellipse_to_circle_transform(arc.center, arc.rx, arc.ry, tolerance);
                    -frame.tangent_at(arc.center, start, is_positive(arc.rx, arc.ry))
                }
            };
            return Some((start, direction));
        }
        None
    }

    /// Point and direction of travel for the end decoration
    fn end_tangent(&self, tolerance: f64) -> Option<(Point, Vector)> {
        let mut cursor = Cursor::default();
        let mut last = None;
        for segment in &self.segments {
            let start = cursor.current;
            cursor.advance(segment, &self.points);
            let Some(start) = start else { continue };
            last = match *segment {
                PathSegment::MoveTo(_) | PathSegment::ClosePath => last,
                PathSegment::LineTo(p) => Some((self.points[p], self.points[p] - start)),
                PathSegment::CurveTo { ctrl1, ctrl2, end } => {
                    let end = self.points[end];
                    let direction = [self.points[ctrl2], self.points[ctrl1], start]
                        .into_iter()
                        .map(|p| end - p)
                        .find(|v| v.length_squared() > 0.0)
                        .unwrap_or(Vector::ZERO);
                    Some((end, direction))
                }
                PathSegment::ArcTo { center, x_axis, y_axis, end } => {
                    let arc = self.arc(center, x_axis, y_axis, end);
                    let frame = ellipse_to_circle_transform(arc.center, arc.rx, arc.ry, tolerance);
                    let direction = frame.tangent_at(arc.center, arc.end, is_positive(arc.rx, arc.ry));
                    Some((arc.end, direction))
                }
            };
        }
        last
    }

    fn emit_segments(&self, out: &mut EpsWriter, tolerance: f64) {
        let mut cursor = Cursor::default();
        for segment in &self.segments {
            let start = cursor.current;
            cursor.advance(segment, &self.points);
            match *segment {
                PathSegment::MoveTo(p) => out.move_to(self.points[p]),
                PathSegment::LineTo(p) => out.line_to(self.points[p]),
                PathSegment::CurveTo { ctrl1, ctrl2, end } => {
                    out.curve_to(self.points[ctrl1], self.points[ctrl2], self.points[end])
                }
                PathSegment::ArcTo { center, x_axis, y_axis, end } => {
                    let arc = self.arc(center, x_axis, y_axis, end);
                    let start = start.unwrap_or(arc.end);
                    out.draw_arc(start, arc.center, arc.rx, arc.ry, arc.end, tolerance);
                }
                PathSegment::ClosePath => out.close_path(),
            }
        }
    }

    fn draw_endings(&self, out: &mut EpsWriter, props: &Properties) {
        if !self.is_open() {
            return;
        }
        if props.line_begin != LineEnding::None {
            if let Some((at, direction)) = self.begin_tangent(props.epsilon) {
                out.line_ending(props.line_begin, at, direction, props.line_width);
            }
        }
        if props.line_end != LineEnding::None {
            if let Some((at, direction)) = self.end_tangent(props.epsilon) {
                out.line_ending(props.line_end, at, direction, props.line_width);
            }
        }
    }
}

impl Shape for Path {
    fn bounding_box(&self, tolerance: f64) -> Area {
        let mut area = Area::empty();
        let mut cursor = Cursor::default();
        for segment in &self.segments {
            let start = cursor.current;
            cursor.advance(segment, &self.points);
            match *segment {
                PathSegment::MoveTo(p) | PathSegment::LineTo(p) => area.expand_point(self.points[p]),
                PathSegment::CurveTo { ctrl1, ctrl2, end } => {
                    let Some(start) = start else { continue };
                    area.expand_area(&bezier_bounding_box(
                        start,
                        self.points[ctrl1],
                        self.points[ctrl2],
                        self.points[end],
                        tolerance,
                    ));
                }
                PathSegment::ArcTo { center, x_axis, y_axis, end } => {
                    let Some(start) = start else { continue };
                    let arc = self.arc(center, x_axis, y_axis, end);
                    area.expand_area(&arc_bounding_box(start, arc.center, arc.rx, arc.ry, arc.end));
                }
                PathSegment::ClosePath => {}
            }
        }
        area
    }

    fn draw(&self, out: &mut EpsWriter, parent: &Properties, pool: &PropertyPool) -> Result<(), RenderError> {
        if self.segments.is_empty() {
            return Ok(());
        }
        let props = self.style.effective(parent, pool)?;
        out.new_path();
        self.emit_segments(out, props.epsilon);
        if self.filled {
            out.fill(&props, true);
        } else {
            out.stroke(&props);
        }
        self.draw_endings(out, &props);
        Ok(())
    }

    fn apply(&mut self, transform: &Transformation, _excluding_text: bool) {
        for p in &mut self.points {
            *p *= transform;
        }
    }

    fn style(&self) -> &Style {
        &self.style
    }

    fn style_mut(&mut self) -> &mut Style {
        &mut self.style
    }

    fn duplicate(&self, pool: &mut PropertyPool) -> Result<ShapeEnum, RenderError> {
        Ok(ShapeEnum::Path(Path {
            points: self.points.clone(),
            segments: self.segments.clone(),
            has_current: self.has_current,
            filled: self.filled,
            style: self.style.duplicate(pool)?,
        }))
    }

    fn release(self, pool: &mut PropertyPool) {
        self.style.release(pool);
    }
}
