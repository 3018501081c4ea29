//! PostScript serializer.
//!
//! [`EpsWriter`] appends operators to an in-memory page body and keeps a
//! [`GraphicsState`] mirror of what the interpreter currently holds, so
//! attribute operators are only written when a value actually changes.

use std::collections::BTreeSet;

use super::context::GraphicsState;
use super::defaults;
use super::geometry::{EllipseFrame, ellipse_to_circle_transform, is_positive};
use super::text::{TextAnchor, escape_latex, escape_string};
use crate::log::{trace, warn};
use crate::properties::{Color, LineEnding, LineStyle, Properties};
use crate::types::{Point, Transformation, Vector};

/// Format a number like C's `%g`: 6 significant figures, trailing zeros
/// trimmed, `-0` written as `0`. NaN and infinities are written as `0` with
/// a warning; use [`Point::try_new`] to reject them up front.
pub(crate) fn fmt_num(value: f64) -> String {
    fmt_num_precision(value, 6)
}

fn fmt_num_precision(value: f64, sig_figs: i32) -> String {
    if !value.is_finite() {
        warn!(value, "non-finite number written as 0");
        return "0".to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let abs_val = value.abs();
    let magnitude = abs_val.log10().floor() as i32;
    let scale = 10_f64.powi(sig_figs - 1 - magnitude);
    let rounded = (value * scale).round() / scale;
    if rounded == 0.0 {
        return "0".to_string();
    }

    let decimals = (sig_figs - 1 - magnitude).max(0) as usize;
    let s = format!("{:.prec$}", rounded, prec = decimals);
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        &s
    };
    s.to_string()
}

fn fmt_point(p: Point) -> String {
    format!("{} {}", fmt_num(p.x), fmt_num(p.y))
}

fn fmt_vector(v: Vector) -> String {
    format!("{} {}", fmt_num(v.dx), fmt_num(v.dy))
}

/// `[ a b c d tx ty ]`
fn fmt_matrix(t: &Transformation) -> String {
    let (x, y, o) = (t.x_axis(), t.y_axis(), t.offset());
    format!(
        "[ {} {} {} {} {} {} ]",
        fmt_num(x.dx),
        fmt_num(x.dy),
        fmt_num(y.dx),
        fmt_num(y.dy),
        fmt_num(o.x),
        fmt_num(o.y)
    )
}

fn color_operator(color: Color) -> String {
    if color.is_gray() {
        format!("{} setgray", fmt_num(color.r))
    } else {
        format!(
            "{} {} {} setrgbcolor",
            fmt_num(color.r),
            fmt_num(color.g),
            fmt_num(color.b)
        )
    }
}

fn dash_operator(style: &LineStyle) -> String {
    match style {
        LineStyle::Solid => "[] 0 setdash".to_string(),
        LineStyle::Dashed { pattern, offset } => {
            let pattern: Vec<String> = pattern.iter().copied().map(fmt_num).collect();
            format!("[{}] {} setdash", pattern.join(" "), fmt_num(*offset))
        }
    }
}

/// Name of the prolog procedure drawing `ending`
pub fn procedure_name(ending: LineEnding) -> Option<&'static str> {
    match ending {
        LineEnding::None => None,
        LineEnding::Arrow => Some("epsdraw_arrow"),
        LineEnding::Bar => Some("epsdraw_bar"),
        LineEnding::Dot => Some("epsdraw_dot"),
    }
}

/// Prolog definition of the procedure drawing `ending`.
///
/// The procedure takes `x y angle width` and draws in a frame rotated to
/// `angle` and scaled by `width`, with dashing switched off. Color is
/// inherited from the caller.
pub fn procedure_definition(ending: LineEnding) -> Option<String> {
    let name = procedure_name(ending)?;
    let shape = match ending {
        LineEnding::None => return None,
        LineEnding::Arrow => format!(
            "newpath\n0 0 moveto\n{l} {w} lineto\n{l} {nw} lineto\nclosepath\nfill\n",
            l = fmt_num(-defaults::ARROW_LENGTH),
            w = fmt_num(defaults::ARROW_HALF_WIDTH),
            nw = fmt_num(-defaults::ARROW_HALF_WIDTH),
        ),
        LineEnding::Bar => format!(
            "newpath\n0 {h} moveto\n0 {nh} lineto\n1 setlinewidth\n0 setlinecap\nstroke\n",
            h = fmt_num(defaults::BAR_HALF_LENGTH),
            nh = fmt_num(-defaults::BAR_HALF_LENGTH),
        ),
        LineEnding::Dot => format!(
            "newpath\n0 0 {r} 0 360 arc\nclosepath\nfill\n",
            r = fmt_num(defaults::DOT_RADIUS),
        ),
    };
    Some(format!(
        "/{name} {{\n/w exch def\n/angle exch def\n/y exch def\n/x exch def\ngsave\n[] 0 setdash\nx y translate\nangle rotate\nw w scale\n{shape}grestore\n}} bind def\n"
    ))
}

/// Operator-level writer for one page body.
#[derive(Debug, Default)]
pub struct EpsWriter {
    out: String,
    state: GraphicsState,
    used_endings: BTreeSet<LineEnding>,
}

impl EpsWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far
    pub fn output(&self) -> &str {
        &self.out
    }

    pub fn into_output(self) -> String {
        self.out
    }

    /// The mirror of the interpreter's graphics state
    pub fn state(&self) -> &GraphicsState {
        &self.state
    }

    /// Line endings drawn so far, in a stable order
    pub fn used_endings(&self) -> impl Iterator<Item = LineEnding> + '_ {
        self.used_endings.iter().copied()
    }

    /// Prolog definitions for every line ending drawn so far
    pub fn prolog(&self) -> String {
        self.used_endings()
            .filter_map(procedure_definition)
            .collect()
    }

    fn emit(&mut self, line: impl AsRef<str>) {
        self.out.push_str(line.as_ref());
        self.out.push('\n');
    }

    // ==== Path construction ====

    pub fn new_path(&mut self) {
        self.emit("newpath");
    }

    pub fn close_path(&mut self) {
        self.emit("closepath");
    }

    pub fn move_to(&mut self, p: Point) {
        self.emit(format!("{} moveto", fmt_point(p)));
    }

    pub fn rmove_to(&mut self, v: Vector) {
        self.emit(format!("{} rmoveto", fmt_vector(v)));
    }

    pub fn line_to(&mut self, p: Point) {
        self.emit(format!("{} lineto", fmt_point(p)));
    }

    pub fn rline_to(&mut self, v: Vector) {
        self.emit(format!("{} rlineto", fmt_vector(v)));
    }

    pub fn curve_to(&mut self, ctrl1: Point, ctrl2: Point, end: Point) {
        self.emit(format!(
            "{} {} {} curveto",
            fmt_point(ctrl1),
            fmt_point(ctrl2),
            fmt_point(end)
        ));
    }

    pub fn rcurve_to(&mut self, ctrl1: Vector, ctrl2: Vector, end: Vector) {
        self.emit(format!(
            "{} {} {} rcurveto",
            fmt_vector(ctrl1),
            fmt_vector(ctrl2),
            fmt_vector(end)
        ));
    }

    /// Counter-clockwise circular arc, angles in degrees
    pub fn arc(&mut self, center: Point, radius: f64, start: f64, end: f64) {
        self.emit(format!(
            "{} {} {} {} arc",
            fmt_point(center),
            fmt_num(radius),
            fmt_num(start),
            fmt_num(end)
        ));
    }

    /// Clockwise circular arc, angles in degrees
    pub fn arcn(&mut self, center: Point, radius: f64, start: f64, end: f64) {
        self.emit(format!(
            "{} {} {} {} arcn",
            fmt_point(center),
            fmt_num(radius),
            fmt_num(start),
            fmt_num(end)
        ));
    }

    /// Rounded corner between the tangent lines through `p1` and `p2`
    pub fn arct(&mut self, p1: Point, p2: Point, radius: f64) {
        self.emit(format!(
            "{} {} {} arct",
            fmt_point(p1),
            fmt_point(p2),
            fmt_num(radius)
        ));
    }

    pub fn clip(&mut self) {
        self.emit("clip");
    }

    // ==== Coordinate system ====

    /// Save the current transformation matrix on the operand stack
    pub fn push_matrix(&mut self) {
        self.emit("matrix currentmatrix");
    }

    /// Restore the matrix saved by [`push_matrix`](Self::push_matrix)
    pub fn pop_matrix(&mut self) {
        self.emit("setmatrix");
    }

    pub fn concat(&mut self, t: &Transformation) {
        self.emit(format!("{} concat", fmt_matrix(t)));
    }

    pub fn translate(&mut self, v: Vector) {
        self.emit(format!("{} translate", fmt_vector(v)));
    }

    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.emit(format!("{} {} scale", fmt_num(sx), fmt_num(sy)));
    }

    pub fn rotate(&mut self, degrees: f64) {
        self.emit(format!("{} rotate", fmt_num(degrees)));
    }

    // ==== Graphics state ====

    /// `gsave`. The mirror is unaffected.
    pub fn gsave(&mut self) {
        self.emit("gsave");
    }

    /// `grestore`. Callers must not have changed tracked attributes since
    /// the matching `gsave`, otherwise the mirror goes stale.
    pub fn grestore(&mut self) {
        self.emit("grestore");
    }

    pub fn init_graphics(&mut self) {
        self.emit("initgraphics");
        self.state.reset();
    }

    /// Make `color` current for stroking (and, PostScript having one color
    /// register, for filling).
    pub fn select_stroke_color(&mut self, color: Color) {
        if self.state.stroke != color {
            trace!(r = color.r, g = color.g, b = color.b, "stroke color changed");
            self.emit(color_operator(color));
            self.state.set_stroke_color(color);
        }
    }

    /// Make `color` current for filling.
    pub fn select_fill_color(&mut self, color: Color) {
        if self.state.fill != color {
            trace!(r = color.r, g = color.g, b = color.b, "fill color changed");
            self.emit(color_operator(color));
            self.state.set_fill_color(color);
        }
    }

    pub fn select_line_width(&mut self, width: f64) {
        if self.state.line_width != width {
            trace!(width, "line width changed");
            self.emit(format!("{} setlinewidth", fmt_num(width)));
            self.state.line_width = width;
        }
    }

    pub fn select_line_style(&mut self, style: &LineStyle) {
        if &self.state.line_style != style {
            self.emit(dash_operator(style));
            self.state.line_style = style.clone();
        }
    }

    /// Bring every stroke attribute in line with `props`, then `stroke`.
    pub fn stroke(&mut self, props: &Properties) {
        self.select_line_width(props.line_width);
        self.select_stroke_color(props.stroke);
        self.select_line_style(&props.line_style);
        if self.state.cap != props.cap {
            self.emit(format!("{} setlinecap", props.cap as u8));
            self.state.cap = props.cap;
        }
        if self.state.join != props.join {
            self.emit(format!("{} setlinejoin", props.join as u8));
            self.state.join = props.join;
        }
        if self.state.miter_limit != props.miter_limit {
            self.emit(format!("{} setmiterlimit", fmt_num(props.miter_limit)));
            self.state.miter_limit = props.miter_limit;
        }
        self.emit("stroke");
    }

    /// Fill the current path with `props.fill`; with `and_stroke` the path
    /// is kept and stroked afterwards.
    pub fn fill(&mut self, props: &Properties, and_stroke: bool) {
        self.select_fill_color(props.fill);
        if and_stroke {
            self.gsave();
            self.emit("fill");
            self.grestore();
            self.stroke(props);
        } else {
            self.emit("fill");
        }
    }

    // ==== Compound figures ====

    /// Append an elliptical arc from `a` to `b` around `center`, with
    /// semi-axis vectors `rx` and `ry`, to the current path.
    ///
    /// Near-circular arcs become a plain `arc`/`arcn`; real ellipses are
    /// drawn as a unit arc under a temporary `concat`.
    pub fn draw_arc(
        &mut self,
        a: Point,
        center: Point,
        rx: Vector,
        ry: Vector,
        b: Point,
        tolerance: f64,
    ) {
        let frame = ellipse_to_circle_transform(center, rx, ry, tolerance);
        let positive = is_positive(rx, ry);
        let start = frame.angle_of(center, a);
        let end = frame.angle_of(center, b);
        trace!(start, end, positive, ellipse = frame.is_ellipse(), "arc");
        self.sweep(&frame, center, start, end, positive);
    }

    /// Append a full ellipse starting and ending at `a`.
    pub fn draw_ellipse(&mut self, a: Point, center: Point, rx: Vector, ry: Vector, tolerance: f64) {
        let frame = ellipse_to_circle_transform(center, rx, ry, tolerance);
        let start = frame.angle_of(center, a);
        self.sweep(&frame, center, start, start + 360.0, true);
    }

    fn sweep(&mut self, frame: &EllipseFrame, center: Point, start: f64, end: f64, positive: bool) {
        let (center, radius) = match frame {
            EllipseFrame::Circle { radius } => (center, *radius),
            EllipseFrame::Ellipse { to_device, .. } => {
                self.push_matrix();
                self.concat(to_device);
                (Point::ORIGIN, 1.0)
            }
        };
        if positive {
            self.arc(center, radius, start, end);
        } else {
            self.arcn(center, radius, start, end);
        }
        if frame.is_ellipse() {
            self.pop_matrix();
        }
    }

    /// Draw `ending` at `at`, pointing along `direction`, sized for a line
    /// of `width`. Call after the line itself has been stroked.
    pub fn line_ending(&mut self, ending: LineEnding, at: Point, direction: Vector, width: f64) {
        let Some(name) = procedure_name(ending) else {
            return;
        };
        self.used_endings.insert(ending);
        self.emit(format!(
            "{} {} {} {name}",
            fmt_point(at),
            fmt_num(direction.angle().to_degrees()),
            fmt_num(width)
        ));
    }

    // ==== Text ====

    /// `( … ) show` at the current point
    pub fn show(&mut self, text: &str) {
        self.emit(format!("({}) show", escape_string(text)));
    }

    /// Placeholder string for a LaTeX label post-processor
    pub fn show_latex(&mut self, text: &str, anchor: TextAnchor, scale: f64, rotation: f64) {
        self.emit(format!(
            r"(\\tex[{anchor}][Bl][{}][{}]{{{}}}) show",
            fmt_num(scale),
            fmt_num(rotation),
            escape_latex(text)
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::{Cap, Join};

    fn lines(w: &EpsWriter) -> Vec<&str> {
        w.output().lines().collect()
    }

    // ==== fmt_num tests ====

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(0.0), "0");
        assert_eq!(fmt_num(-0.0), "0");
        assert_eq!(fmt_num(10.0), "10");
        assert_eq!(fmt_num(100.0), "100");
        assert_eq!(fmt_num(0.5), "0.5");
        assert_eq!(fmt_num(1.0 / 3.0), "0.333333");
        assert_eq!(fmt_num(-2.25), "-2.25");
        assert_eq!(fmt_num(123456.7), "123457");
    }

    #[test]
    fn test_fmt_matrix() {
        let t = Transformation::new(Vector::new(2.0, 0.0), Vector::new(0.0, 1.0), Point::new(3.0, 4.0));
        assert_eq!(fmt_matrix(&t), "[ 2 0 0 1 3 4 ]");
    }

    // ==== State diffing tests ====

    #[test]
    fn default_stroke_emits_only_stroke() {
        let mut w = EpsWriter::new();
        w.stroke(&Properties::default());
        assert_eq!(lines(&w), ["stroke"]);
    }

    #[test]
    fn repeated_stroke_is_idempotent() {
        let mut props = Properties::default();
        props.line_width = 2.0;
        props.stroke = Color::RED;
        props.cap = Cap::Round;
        props.join = Join::Bevel;
        props.miter_limit = 4.0;

        let mut w = EpsWriter::new();
        w.stroke(&props);
        assert_eq!(
            lines(&w),
            [
                "2 setlinewidth",
                "1 0 0 setrgbcolor",
                "1 setlinecap",
                "2 setlinejoin",
                "4 setmiterlimit",
                "stroke"
            ]
        );
        let before = w.output().len();
        w.stroke(&props);
        assert_eq!(&w.output()[before..], "stroke\n");
    }

    #[test]
    fn gray_colors_use_setgray() {
        let mut props = Properties::default();
        props.stroke = Color::gray(0.5);
        let mut w = EpsWriter::new();
        w.stroke(&props);
        assert_eq!(lines(&w), ["0.5 setgray", "stroke"]);
    }

    #[test]
    fn stroke_color_change_is_seen_by_fill() {
        let mut props = Properties::default();
        props.stroke = Color::RED;
        props.fill = Color::RED;
        let mut w = EpsWriter::new();
        w.stroke(&props);
        w.new_path();
        w.fill(&props, false);
        let text = w.output();
        assert_eq!(text.matches("setrgbcolor").count(), 1);
        assert!(text.ends_with("newpath\nfill\n"));
    }

    #[test]
    fn fill_then_stroke_restores_stroke_color() {
        let mut props = Properties::default();
        props.fill = Color::BLUE;
        let mut w = EpsWriter::new();
        w.fill(&props, true);
        assert_eq!(
            lines(&w),
            [
                "0 0 1 setrgbcolor",
                "gsave",
                "fill",
                "grestore",
                "0 setgray",
                "stroke"
            ]
        );
        assert_eq!(w.state().stroke, Color::BLACK);
    }

    #[test]
    fn dash_pattern_and_back_to_solid() {
        let mut props = Properties::default();
        props.line_style = LineStyle::dashed([3.0, 1.0], 0.5);
        let mut w = EpsWriter::new();
        w.stroke(&props);
        props.line_style = LineStyle::Solid;
        w.stroke(&props);
        assert_eq!(
            lines(&w),
            ["[3 1] 0.5 setdash", "stroke", "[] 0 setdash", "stroke"]
        );
    }

    #[test]
    fn init_graphics_resets_mirror() {
        let mut props = Properties::default();
        props.line_width = 3.0;
        let mut w = EpsWriter::new();
        w.stroke(&props);
        w.init_graphics();
        assert_eq!(w.state(), &GraphicsState::default());
        w.stroke(&props);
        assert_eq!(w.output().matches("3 setlinewidth").count(), 2);
    }

    #[test]
    fn raw_operators() {
        let mut w = EpsWriter::new();
        w.gsave();
        w.new_path();
        w.move_to(Point::new(1.0, 2.0));
        w.rmove_to(Vector::new(0.5, 0.0));
        w.rline_to(Vector::new(0.0, -1.0));
        w.rcurve_to(Vector::new(1.0, 0.0), Vector::new(1.0, 1.0), Vector::new(0.0, 1.0));
        w.arct(Point::new(4.0, 4.0), Point::new(0.0, 4.0), 0.25);
        w.close_path();
        w.clip();
        w.translate(Vector::new(3.0, -3.0));
        w.scale(2.0, 0.5);
        w.rotate(-30.0);
        w.grestore();
        assert_eq!(
            lines(&w),
            [
                "gsave",
                "newpath",
                "1 2 moveto",
                "0.5 0 rmoveto",
                "0 -1 rlineto",
                "1 0 1 1 0 1 rcurveto",
                "4 4 0 4 0.25 arct",
                "closepath",
                "clip",
                "3 -3 translate",
                "2 0.5 scale",
                "-30 rotate",
                "grestore"
            ]
        );
        assert_eq!(w.state(), &GraphicsState::default());
    }

    // ==== Arc tests ====

    #[test]
    fn circular_arc_uses_plain_arc() {
        let mut w = EpsWriter::new();
        w.draw_arc(
            Point::new(1.0, 0.0),
            Point::ORIGIN,
            Vector::new(1.0, 0.0),
            Vector::new(0.0, 1.0),
            Point::new(0.0, 1.0),
            1e-3,
        );
        assert_eq!(lines(&w), ["0 0 1 0 90 arc"]);
    }

    #[test]
    fn clockwise_arc_uses_arcn() {
        let mut w = EpsWriter::new();
        w.draw_arc(
            Point::new(1.0, 0.0),
            Point::ORIGIN,
            Vector::new(1.0, 0.0),
            Vector::new(0.0, -1.0),
            Point::new(0.0, -1.0),
            1e-3,
        );
        assert_eq!(lines(&w), ["0 0 1 0 -90 arcn"]);
    }

    #[test]
    fn elliptical_arc_wraps_in_matrix() {
        let mut w = EpsWriter::new();
        w.draw_arc(
            Point::new(2.0, 0.0),
            Point::ORIGIN,
            Vector::new(2.0, 0.0),
            Vector::new(0.0, 1.0),
            Point::new(0.0, 1.0),
            1e-3,
        );
        assert_eq!(
            lines(&w),
            [
                "matrix currentmatrix",
                "[ 2 0 0 1 0 0 ] concat",
                "0 0 1 0 90 arc",
                "setmatrix"
            ]
        );
    }

    #[test]
    fn full_ellipse_sweeps_360_degrees() {
        let mut w = EpsWriter::new();
        w.draw_ellipse(
            Point::new(0.0, 3.0),
            Point::ORIGIN,
            Vector::new(3.0, 0.0),
            Vector::new(0.0, 3.0),
            1e-3,
        );
        assert_eq!(lines(&w), ["0 0 3 90 450 arc"]);
    }

    // ==== Text and ending tests ====

    #[test]
    fn show_escapes_parentheses() {
        let mut w = EpsWriter::new();
        w.show("f(x)");
        assert_eq!(w.output(), "(f\\(x\\)) show\n");
    }

    #[test]
    fn show_latex_tags_anchor() {
        let mut w = EpsWriter::new();
        w.show_latex(r"$\alpha$", TextAnchor::TopCenter, 1.0, 0.0);
        assert_eq!(w.output(), "(\\\\tex[tc][Bl][1][0]{$\\\\alpha$}) show\n");
    }

    #[test]
    fn line_endings_are_recorded_for_the_prolog() {
        let mut w = EpsWriter::new();
        w.line_ending(LineEnding::None, Point::ORIGIN, Vector::new(1.0, 0.0), 1.0);
        assert!(w.output().is_empty());
        w.line_ending(LineEnding::Arrow, Point::new(10.0, 0.0), Vector::new(0.0, 1.0), 2.0);
        assert_eq!(w.output(), "10 0 90 2 epsdraw_arrow\n");
        assert_eq!(w.used_endings().collect::<Vec<_>>(), [LineEnding::Arrow]);
        assert!(w.prolog().starts_with("/epsdraw_arrow {\n"));
        assert!(w.prolog().ends_with("} bind def\n"));
    }
}
