//! Encapsulated PostScript rendering of shape trees
//!
//! This module is organized into submodules:
//! - `defaults`: Default settings
//! - `context`: GraphicsState, the mirror of what has been emitted
//! - `geometry`: Bézier and ellipse math
//! - `eps`: The state-diffing PostScript writer
//! - `path`, `text`: Leaf shapes
//! - `shapes`: The Shape trait, styles and groups

pub mod context;
pub mod defaults;
pub mod eps;
pub mod geometry;
pub mod path;
pub mod shapes;
pub mod text;

// Re-export commonly used items
pub use context::GraphicsState;
pub use eps::EpsWriter;
pub use path::{Path, PathSegment};
pub use shapes::{Group, Shape, ShapeEnum, Style};
pub use text::{Text, TextAnchor, TextKind};

use std::fs::File;
use std::io::{BufWriter, Write};

use crate::errors::{CanvasError, RenderError};
use crate::log::debug;
use crate::pool::PropertyPool;
use crate::properties::Properties;
use crate::types::Area;

/// Document-level settings
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasOptions {
    /// Font selected in the prolog so label post-processors find one
    pub font_name: String,
    pub font_size: f64,
    /// Written as a `%%Title:` header comment
    pub title: Option<String>,
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            font_name: defaults::FONT_NAME.to_string(),
            font_size: defaults::FONT_SIZE,
            title: None,
        }
    }
}

/// A page: the root group, the property pool its shapes point into, and
/// the destination the document is written to.
#[derive(Debug)]
pub struct Canvas<W: Write> {
    root: Group,
    pool: PropertyPool,
    properties: Properties,
    options: CanvasOptions,
    out: W,
}

impl Canvas<BufWriter<File>> {
    /// Create (or truncate) the file at `path` and draw into it.
    pub fn create(path: impl AsRef<std::path::Path>) -> Result<Self, CanvasError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| CanvasError::DestinationUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "opened canvas");
        Ok(Self::with_writer(BufWriter::new(file)))
    }
}

impl<W: Write> Canvas<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            root: Group::new(),
            pool: PropertyPool::new(),
            properties: Properties::default(),
            options: CanvasOptions::default(),
            out,
        }
    }

    pub fn with_options(mut self, options: CanvasOptions) -> Self {
        self.options = options;
        self
    }

    /// Root of every property resolution chain
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    pub fn root(&self) -> &Group {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Group {
        &mut self.root
    }

    pub fn pool(&self) -> &PropertyPool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut PropertyPool {
        &mut self.pool
    }

    /// The root group and the pool at once, for styling shapes in place
    pub fn parts_mut(&mut self) -> (&mut Group, &mut PropertyPool) {
        (&mut self.root, &mut self.pool)
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn options(&self) -> &CanvasOptions {
        &self.options
    }

    /// Box around the whole scene at the root tolerance
    pub fn bounding_box(&self) -> Area {
        self.root.bounding_box(self.properties.epsilon)
    }

    /// Produce the complete document text.
    pub fn render(&self) -> Result<String, RenderError> {
        let area = self.bounding_box();
        if area.is_empty() || !area.is_finite() {
            return Err(RenderError::EmptyScene);
        }
        let area = area.rounded_out();
        debug!(
            x0 = area.min.x,
            y0 = area.min.y,
            x1 = area.max.x,
            y1 = area.max.y,
            "rendering page"
        );

        let mut body = EpsWriter::new();
        self.root.draw(&mut body, &self.properties, &self.pool)?;

        let mut doc = String::from("%!PS-Adobe-3.0\n");
        doc.push_str(&format!(
            "%%BoundingBox: {} {} {} {}\n",
            area.min.x as i64, area.min.y as i64, area.max.x as i64, area.max.y as i64
        ));
        if let Some(title) = &self.options.title {
            doc.push_str(&format!("%%Title: {title}\n"));
        }
        doc.push_str(&format!(
            "/{} {} selectfont\n",
            self.options.font_name,
            eps::fmt_num(self.options.font_size)
        ));
        doc.push_str(&body.prolog());
        doc.push_str(body.output());
        debug!(bytes = doc.len(), "page rendered");
        Ok(doc)
    }

    /// Render the page and write it to the destination, flushing it.
    pub fn draw(&mut self) -> Result<(), CanvasError> {
        let doc = self.render()?;
        self.out.write_all(doc.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    /// Give the destination back
    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    #[test]
    fn empty_scene_is_an_error() {
        let mut canvas = Canvas::with_writer(Vec::new());
        canvas.root_mut().add(Group::new());
        assert_eq!(canvas.render(), Err(RenderError::EmptyScene));
        assert!(matches!(
            canvas.draw(),
            Err(CanvasError::Render(RenderError::EmptyScene))
        ));
        assert!(canvas.into_inner().is_empty());
    }

    #[test]
    fn missing_directory_is_destination_unavailable() {
        let path = std::env::temp_dir()
            .join("epsdraw-no-such-directory")
            .join("out.eps");
        let err = Canvas::create(&path).unwrap_err();
        assert!(matches!(err, CanvasError::DestinationUnavailable { .. }));
        assert!(err.to_string().contains("out.eps"));
    }

    #[test]
    fn header_uses_options() {
        let mut canvas = Canvas::with_writer(Vec::new()).with_options(CanvasOptions {
            font_name: "Helvetica".to_string(),
            font_size: 12.0,
            title: Some("demo".to_string()),
        });
        canvas
            .root_mut()
            .add(Text::plain(Point::new(1.5, 2.5), "hi"));
        let doc = canvas.render().unwrap();
        assert!(doc.starts_with(
            "%!PS-Adobe-3.0\n%%BoundingBox: 1 2 2 3\n%%Title: demo\n/Helvetica 12 selectfont\n"
        ));
    }
}
