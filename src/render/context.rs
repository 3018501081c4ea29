//! Graphics-state mirror - what the PostScript interpreter currently holds

use crate::properties::{Cap, Color, Join, LineStyle, Properties};

/// The last emitted value of every tracked attribute.
///
/// Starts equal to PostScript's initial graphics state and is reset at the
/// start of every page. PostScript has a single current color, so `stroke`
/// and `fill` are two views of one register and always move together.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsState {
    pub line_width: f64,
    pub stroke: Color,
    pub fill: Color,
    pub cap: Cap,
    pub join: Join,
    pub miter_limit: f64,
    pub line_style: LineStyle,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self::from_properties(&Properties::default())
    }
}

impl GraphicsState {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_properties(p: &Properties) -> Self {
        Self {
            line_width: p.line_width,
            stroke: p.stroke,
            fill: p.fill,
            cap: p.cap,
            join: p.join,
            miter_limit: p.miter_limit,
            line_style: p.line_style.clone(),
        }
    }

    /// Record a color change made for stroking. The fill view follows.
    pub fn set_stroke_color(&mut self, color: Color) {
        self.stroke = color;
        self.fill = color;
    }

    /// Record a color change made for filling. The stroke view follows.
    pub fn set_fill_color(&mut self, color: Color) {
        self.fill = color;
        self.stroke = color;
    }

    /// Back to the interpreter's initial state (`initgraphics`)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_postscript_defaults() {
        let state = GraphicsState::new();
        assert_eq!(state.line_width, 1.0);
        assert_eq!(state.stroke, Color::BLACK);
        assert_eq!(state.cap, Cap::Butt);
        assert_eq!(state.join, Join::Miter);
        assert_eq!(state.miter_limit, 10.0);
        assert_eq!(state.line_style, LineStyle::Solid);
    }

    #[test]
    fn color_views_are_coupled() {
        let mut state = GraphicsState::new();
        state.set_stroke_color(Color::RED);
        assert_eq!(state.fill, Color::RED);
        state.set_fill_color(Color::BLUE);
        assert_eq!(state.stroke, Color::BLUE);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut state = GraphicsState::new();
        state.line_width = 4.0;
        state.set_fill_color(Color::GREEN);
        state.reset();
        assert_eq!(state, GraphicsState::default());
    }
}
