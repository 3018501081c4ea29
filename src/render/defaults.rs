//! Default settings (PostScript initial graphics state, in points)

pub const LINE_WIDTH: f64 = 1.0;
pub const MITER_LIMIT: f64 = 10.0;
pub const EPSILON: f64 = 1e-3;
pub const FONT_NAME: &str = "Times-Roman";
pub const FONT_SIZE: f64 = 10.0;
/// Arrowhead length and half width, in multiples of the line width
pub const ARROW_LENGTH: f64 = 6.0;
pub const ARROW_HALF_WIDTH: f64 = 2.0;
/// Half length of a bar ending and radius of a dot ending, in line widths
pub const BAR_HALF_LENGTH: f64 = 3.0;
pub const DOT_RADIUS: f64 = 2.0;
