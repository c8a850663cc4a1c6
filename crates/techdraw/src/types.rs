use std::fmt::Write as _;

use geo_types::{Coord, LineString};
use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::params::SvgStyle;

/// Integer pixel coordinate on a traced boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        let dx = f64::from(other.x - self.x);
        let dy = f64::from(other.y - self.y);
        dx.hypot(dy)
    }
}

/// Boundary pixels of one connected line region, in visiting order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<Point>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Length of the contour walked as an open path (no closing segment).
    pub fn perimeter(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| pair[0].distance(&pair[1]))
            .sum()
    }

    /// Convert to a geo-types line string for geometric operations
    pub fn to_line_string(&self) -> LineString<f64> {
        let coords: Vec<Coord<f64>> = self
            .points
            .iter()
            .map(|p| Coord {
                x: f64::from(p.x),
                y: f64::from(p.y),
            })
            .collect();
        LineString::new(coords)
    }
}

/// A contour after simplification. Never longer than its source contour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub vertices: Vec<Point>,
}

impl Polyline {
    pub fn new(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Rebuild a polyline from simplified coordinates. Coordinates come from
    /// the integer contour, so rounding only guards against float noise.
    pub fn from_line_string(line: &LineString<f64>) -> Self {
        let vertices = line
            .coords()
            .map(|c| Point::new(c.x.round() as i32, c.y.round() as i32))
            .collect();
        Self { vertices }
    }
}

/// One move-to followed by line-to commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorPath {
    pub start: Point,
    pub segments: Vec<Point>,
}

impl VectorPath {
    /// Returns `None` for degenerate polylines (fewer than two vertices).
    pub fn from_polyline(polyline: &Polyline) -> Option<Self> {
        match polyline.vertices.as_slice() {
            [start, rest @ ..] if !rest.is_empty() => Some(Self {
                start: *start,
                segments: rest.to_vec(),
            }),
            _ => None,
        }
    }

    pub fn vertex_count(&self) -> usize {
        1 + self.segments.len()
    }

    /// SVG path data: `M x0 y0 L x1 y1 ...`
    pub fn to_path_data(&self) -> String {
        let mut d = format!("M {} {}", self.start.x, self.start.y);
        for p in &self.segments {
            // Writing into a String cannot fail.
            let _ = write!(d, " L {} {}", p.x, p.y);
        }
        d
    }
}

/// Vectorized drawing: every surviving path plus the document styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorDrawing {
    pub width: u32,
    pub height: u32,
    pub style: SvgStyle,
    pub paths: Vec<VectorPath>,
}

impl VectorDrawing {
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    pub fn total_vertices(&self) -> usize {
        self.paths.iter().map(VectorPath::vertex_count).sum()
    }
}

/// Output of the raster pipeline.
#[derive(Debug, Clone)]
pub struct TechnicalDrawing {
    /// Final binary drawing: 0 is a line, 255 is background.
    pub drawing: GrayImage,
    /// Thickened edge map: 255 is an edge, 0 is background.
    pub edges: GrayImage,
}

impl TechnicalDrawing {
    pub fn dimensions(&self) -> (u32, u32) {
        self.drawing.dimensions()
    }

    /// Number of drawn (line) pixels in the final drawing.
    pub fn line_pixel_count(&self) -> usize {
        self.drawing.pixels().filter(|p| p[0] == 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perimeter_is_open_path_length() {
        let contour = Contour::new(vec![
            Point::new(0, 0),
            Point::new(3, 0),
            Point::new(3, 4),
        ]);
        assert!((contour.perimeter() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn single_vertex_polyline_is_not_a_path() {
        let polyline = Polyline::new(vec![Point::new(1, 1)]);
        assert!(VectorPath::from_polyline(&polyline).is_none());
        assert!(VectorPath::from_polyline(&Polyline::default()).is_none());
    }

    #[test]
    fn path_data_uses_move_then_line_commands() {
        let polyline = Polyline::new(vec![
            Point::new(1, 2),
            Point::new(3, 4),
            Point::new(5, 6),
        ]);
        let path = VectorPath::from_polyline(&polyline).expect("two or more vertices");
        assert_eq!(path.to_path_data(), "M 1 2 L 3 4 L 5 6");
        assert_eq!(path.vertex_count(), 3);
    }
}
