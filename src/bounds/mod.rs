//! Framing helpers for vertex streams. Renderers use these to find the box
//! around a drawing and to pull it into a fixed-size view.

use geo_types::{coord, LineString, MultiLineString};
use nalgebra::{Matrix4, Point3, Vector3};

/// Axis aligned box over a set of vertices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BoundingBox {
    /// Single pass min/max per axis. None for an empty stream; a single
    /// vertex gives a zero sized box.
    pub fn from_vertices(vertices: &[Point3<f32>]) -> Option<BoundingBox> {
        let first = vertices.first()?;
        Some(vertices.iter().skip(1).fold(
            BoundingBox {
                min: *first,
                max: *first,
            },
            |bbox, v| BoundingBox {
                min: bbox.min.inf(v),
                max: bbox.max.sup(v),
            },
        ))
    }

    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn extent(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn is_degenerate(&self) -> bool {
        self.extent().iter().all(|e| *e == 0.0)
    }

    /// Transform that moves the box center to the origin and scales x and y
    /// uniformly so the larger of the two extents spans `target_size`.
    /// z is only translated. A box with no xy extent is translated only.
    pub fn framing(&self, target_size: f32) -> Matrix4<f32> {
        let extent = self.extent();
        let span = extent.x.max(extent.y);
        let scale = if span > 0.0 { target_size / span } else { 1.0 };
        let center = self.center();
        Matrix4::new_nonuniform_scaling(&Vector3::new(scale, scale, 1.0))
            * Matrix4::new_translation(&-center.coords)
    }
}

/// Applies [`BoundingBox::framing`] to every vertex.
pub fn normalize(vertices: &[Point3<f32>], target_size: f32) -> Vec<Point3<f32>> {
    match BoundingBox::from_vertices(vertices) {
        Some(bbox) => {
            let framing = bbox.framing(target_size);
            vertices
                .iter()
                .map(|v| framing.transform_point(v))
                .collect()
        }
        None => vec![],
    }
}

/// Flattens segment pairs onto the XY plane as two-point linestrings, for
/// the geo/plotter side of the world. A trailing unpaired vertex is dropped.
pub fn to_multiline(vertices: &[Point3<f32>]) -> MultiLineString<f64> {
    vertices
        .chunks_exact(2)
        .map(|segment| {
            LineString::new(vec![
                coord! {x: f64::from(segment[0].x), y: f64::from(segment[0].y)},
                coord! {x: f64::from(segment[1].x), y: f64::from(segment[1].y)},
            ])
        })
        .collect()
}
