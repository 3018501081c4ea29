//! Draws a small scene: a filled square, a dashed arrow, an ellipse arc and
//! a couple of labels.
//!
//! `cargo run --example shapes [out.eps]` writes to the file if given, else
//! to stdout. Set `RUST_LOG=debug` (with `--features tracing`) for logs.

use std::io::Write;

use epsdraw::{
    Canvas, Group, LineEnding, LineStyle, Path, Point, Shape, Text, TextAnchor, Transformation,
    Vector, single_line_listing,
};

fn build<W: Write>(canvas: &mut Canvas<W>) -> miette::Result<()> {
    let (root, pool) = canvas.parts_mut();

    let mut square = Path::new();
    square
        .move_to(Point::new(0.0, 0.0))
        .line_to(Point::new(40.0, 0.0))
        .line_to(Point::new(40.0, 40.0))
        .line_to(Point::new(0.0, 40.0))
        .close_path()
        .set_filled(true);
    square.set_fill_rgb(pool, 1.0, 0.8, 0.2);
    square.set_line_width(pool, 1.5);

    let mut arrow = Path::new();
    arrow
        .move_to(Point::new(40.0, 20.0))
        .curve_to(Point::new(60.0, 40.0), Point::new(80.0, 0.0), Point::new(100.0, 20.0))?;
    arrow.set_line_style(pool, LineStyle::dashed([4.0, 2.0], 0.0));
    arrow.set_line_begin(pool, LineEnding::Dot);
    arrow.set_line_end(pool, LineEnding::Arrow);

    let mut arc = Path::new();
    arc.move_to(Point::new(150.0, 20.0)).arc_to(
        Point::new(125.0, 20.0),
        Vector::new(25.0, 0.0),
        Vector::new(0.0, 12.0),
        Point::new(100.0, 20.0),
    )?;
    arc.set_line_gray(pool, 0.4);

    let mut figure = Group::new();
    figure.set_line_rgb(pool, 0.1, 0.2, 0.6);
    figure.add(square).add(arrow).add(arc);
    figure.apply(&Transformation::translation(Vector::new(10.0, 10.0)), true);

    root.add(figure)
        .add(Text::plain(Point::new(10.0, 60.0), "epsdraw (demo)"))
        .add(Text::latex(
            Point::new(135.0, 50.0),
            single_line_listing("arc_to", '|'),
            TextAnchor::BottomCenter,
        ));

    let area = canvas.bounding_box();
    tracing::info!(width = area.width(), height = area.height(), "drawing scene");
    canvas.draw()?;
    tracing::info!("scene written");
    Ok(())
}

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match std::env::args().nth(1) {
        Some(path) => build(&mut Canvas::create(path)?),
        None => build(&mut Canvas::with_writer(std::io::stdout().lock())),
    }
}
