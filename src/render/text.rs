//! Text shapes and their payload helpers: PostScript string escaping, the
//! psfrag-style anchor tags, and a few LaTeX label builders.

use std::fmt;

use super::eps::EpsWriter;
use super::shapes::{Shape, ShapeEnum, Style};
use crate::errors::RenderError;
use crate::pool::PropertyPool;
use crate::properties::Properties;
use crate::types::{Area, Point, Transformation};

/// Reference point of a label, as understood by the label post-processor.
///
/// First letter is vertical (bottom, center, top, Baseline), second is
/// horizontal (left, center, right).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextAnchor {
    #[default]
    BottomLeft,
    BottomCenter,
    BottomRight,
    CenterLeft,
    Center,
    CenterRight,
    TopLeft,
    TopCenter,
    TopRight,
    BaselineLeft,
    BaselineCenter,
    BaselineRight,
}

impl TextAnchor {
    pub const ALL: [TextAnchor; 12] = [
        TextAnchor::BottomLeft,
        TextAnchor::BottomCenter,
        TextAnchor::BottomRight,
        TextAnchor::CenterLeft,
        TextAnchor::Center,
        TextAnchor::CenterRight,
        TextAnchor::TopLeft,
        TextAnchor::TopCenter,
        TextAnchor::TopRight,
        TextAnchor::BaselineLeft,
        TextAnchor::BaselineCenter,
        TextAnchor::BaselineRight,
    ];

    /// Two-letter position code
    pub fn code(self) -> &'static str {
        match self {
            TextAnchor::BottomLeft => "bl",
            TextAnchor::BottomCenter => "bc",
            TextAnchor::BottomRight => "br",
            TextAnchor::CenterLeft => "cl",
            TextAnchor::Center => "cc",
            TextAnchor::CenterRight => "cr",
            TextAnchor::TopLeft => "tl",
            TextAnchor::TopCenter => "tc",
            TextAnchor::TopRight => "tr",
            TextAnchor::BaselineLeft => "Bl",
            TextAnchor::BaselineCenter => "Bc",
            TextAnchor::BaselineRight => "Br",
        }
    }
}

impl fmt::Display for TextAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// How the payload is emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextKind {
    /// Set in the page font with `show`
    #[default]
    Plain,
    /// Tagged for replacement by a LaTeX label post-processor
    Latex,
}

/// An opaque text payload placed at a point.
#[derive(Debug)]
pub struct Text {
    position: Point,
    content: String,
    kind: TextKind,
    anchor: TextAnchor,
    scale: f64,
    rotation: f64,
    style: Style,
}

impl Text {
    pub fn plain(position: Point, content: impl Into<String>) -> Self {
        Self {
            position,
            content: content.into(),
            kind: TextKind::Plain,
            anchor: TextAnchor::default(),
            scale: 1.0,
            rotation: 0.0,
            style: Style::default(),
        }
    }

    pub fn latex(position: Point, content: impl Into<String>, anchor: TextAnchor) -> Self {
        Self {
            kind: TextKind::Latex,
            anchor,
            ..Self::plain(position, content)
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Rotation in degrees, counter-clockwise
    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn kind(&self) -> TextKind {
        self.kind
    }

    pub fn anchor(&self) -> TextAnchor {
        self.anchor
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }
}

impl Shape for Text {
    fn bounding_box(&self, _tolerance: f64) -> Area {
        Area::from_corners(self.position, self.position)
    }

    fn draw(&self, out: &mut EpsWriter, parent: &Properties, pool: &PropertyPool) -> Result<(), RenderError> {
        let props = self.style.effective(parent, pool)?;
        out.select_stroke_color(props.stroke);
        out.move_to(self.position);
        match self.kind {
            TextKind::Plain => out.show(&self.content),
            TextKind::Latex => out.show_latex(&self.content, self.anchor, self.scale, self.rotation),
        }
        Ok(())
    }

    fn apply(&mut self, transform: &Transformation, excluding_text: bool) {
        self.position *= transform;
        if !excluding_text {
            self.rotation += transform.rotation_degrees();
            self.scale *= transform.scale_factor();
        }
    }

    fn style(&self) -> &Style {
        &self.style
    }

    fn style_mut(&mut self) -> &mut Style {
        &mut self.style
    }

    fn duplicate(&self, pool: &mut PropertyPool) -> Result<ShapeEnum, RenderError> {
        Ok(ShapeEnum::Text(Text {
            position: self.position,
            content: self.content.clone(),
            kind: self.kind,
            anchor: self.anchor,
            scale: self.scale,
            rotation: self.rotation,
            style: self.style.duplicate(pool)?,
        }))
    }

    fn release(self, pool: &mut PropertyPool) {
        self.style.release(pool);
    }
}

/// Escape the string delimiters so `text` can sit inside `( … )`.
///
/// Other backslashes pass through as PostScript escapes, except one that
/// precedes a delimiter or ends the text: it is doubled so it cannot
/// swallow the `)`.
pub fn escape_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 1);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '(' | ')' => out.push('\\'),
            '\\' if matches!(chars.peek().copied(), None | Some('(' | ')')) => out.push('\\'),
            _ => {}
        }
        out.push(c);
    }
    out
}

/// Escape a LaTeX payload: backslashes are doubled as well as the
/// delimiters escaped, so the TeX source survives the PostScript reader.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if matches!(c, '(' | ')' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `\tiny\textit{…}`
pub fn single_line_it(text: &str) -> String {
    format!(r"\tiny\textit{{{text}}}")
}

/// Inline listing delimited by `delim`.
pub fn single_line_listing(text: &str, delim: char) -> String {
    format!(r"\lstinline[basicstyle=\tiny]{delim}{text}{delim}")
}

/// Centered listing wrapped in a `width`-point wide parbox.
pub fn multi_line_listing(width: f64, text: &str, delim: char) -> String {
    format!(
        r"\raisebox{{\dimexpr\depth-\fontchardp\font`y}}{{\parbox{{{width}bp}}{{\centering \linespread{{0.3}}\selectfont\lstinline[basicstyle=\tiny]{delim}{text}{delim}}}}}"
    )
}
