//! Render a tree of vector shapes to Encapsulated PostScript.
//!
//! Shapes ([`Path`], [`Text`], and nested [`Group`]s) carry optional
//! property overrides interned in a [`PropertyPool`]; everything they leave
//! unset is inherited from the enclosing group. The serializer keeps a
//! mirror of the interpreter's graphics state and writes an attribute
//! operator only when its value actually changes.
//!
//! ```no_run
//! use epsdraw::{Canvas, Path, Point, Shape};
//!
//! fn main() -> miette::Result<()> {
//!     let mut canvas = Canvas::create("square.eps")?;
//!     let (root, pool) = canvas.parts_mut();
//!     let mut square = Path::new();
//!     square
//!         .move_to(Point::new(0.0, 0.0))
//!         .line_to(Point::new(10.0, 0.0))
//!         .line_to(Point::new(10.0, 10.0))
//!         .close_path()
//!         .set_filled(true);
//!     square.set_fill_rgb(pool, 1.0, 0.0, 0.0);
//!     root.add(square);
//!     canvas.draw()?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod log;
pub mod pool;
pub mod properties;
pub mod render;
pub mod types;

pub use errors::{CanvasError, PathError, RenderError};
pub use pool::{PropertyHandle, PropertyPool};
pub use properties::{Attribute, Cap, Color, Join, LineEnding, LineStyle, Properties, PropertiesOverride};
pub use render::text::{multi_line_listing, single_line_it, single_line_listing};
pub use render::{
    Canvas, CanvasOptions, EpsWriter, GraphicsState, Group, Path, PathSegment, Shape, ShapeEnum,
    Style, Text, TextAnchor, TextKind,
};
pub use types::{Area, NumericError, Point, Transformation, Vector};
