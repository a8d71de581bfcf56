use std::path::Path;

use anyhow::{Context, Result};
use geo::BoundingRect;
use geo_types::{coord, MultiLineString, Rect};
use nalgebra::Point3;
use svg::node::element::path::Data;
use svg::node::element::Path as SvgPath;
use svg::Document;

use crate::bounds::to_multiline;

/// Draws each segment of a vertex stream as a move/line pair in a single
/// path. Y is negated so the drawing keeps turtle orientation (+y up).
pub fn to_document(vertices: &[Point3<f32>], stroke_width: f64) -> Document {
    let lines = flip_y(to_multiline(vertices));
    let bounds = lines
        .bounding_rect()
        .unwrap_or_else(|| Rect::new(coord! {x: 0.0, y: 0.0}, coord! {x: 0.0, y: 0.0}));

    let mut data = Data::new();
    for line in lines.iter() {
        if let (Some(start), Some(end)) = (line.0.first(), line.0.last()) {
            data = data.move_to((start.x, start.y)).line_to((end.x, end.y));
        }
    }

    let path = SvgPath::new()
        .set("fill", "none")
        .set("stroke", "black")
        .set("stroke-width", stroke_width)
        .set("stroke-linecap", "round")
        .set("d", data);

    // Pad by the stroke so lines on the edge aren't clipped in half.
    let pad = stroke_width;
    Document::new()
        .set(
            "viewBox",
            (
                bounds.min().x - pad,
                bounds.min().y - pad,
                bounds.width() + 2.0 * pad,
                bounds.height() + 2.0 * pad,
            ),
        )
        .add(path)
}

pub fn save<P: AsRef<Path>>(path: P, vertices: &[Point3<f32>], stroke_width: f64) -> Result<()> {
    let path = path.as_ref();
    svg::save(path, &to_document(vertices, stroke_width))
        .with_context(|| format!("writing svg {}", path.display()))?;
    tracing::info!(path = %path.display(), segments = vertices.len() / 2, "saved svg");
    Ok(())
}

fn flip_y(lines: MultiLineString<f64>) -> MultiLineString<f64> {
    lines
        .into_iter()
        .map(|mut line| {
            line.0.iter_mut().for_each(|c| c.y = -c.y);
            line
        })
        .collect()
}
