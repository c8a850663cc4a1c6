use crate::{traits::PolylineSimplifier, types::{Contour, Polyline}};

/// Douglas-Peucker simplifier using geo crate's implementation.
///
/// The contour is treated as an open path: its first and last points are
/// always kept, and the tolerance is `ratio * contour.perimeter()`.
#[derive(Debug, Clone, Default)]
pub struct DouglasPeuckerSimplifier;

impl PolylineSimplifier for DouglasPeuckerSimplifier {
    fn simplify(&self, contour: &Contour, ratio: f64) -> Polyline {
        use geo::Simplify;

        let epsilon = ratio.max(0.0) * contour.perimeter();
        if contour.len() < 3 || epsilon <= 0.0 {
            return Polyline::new(contour.points.clone());
        }

        let simplified = contour.to_line_string().simplify(&epsilon);
        Polyline::from_line_string(&simplified)
    }
}

/// Keeps every point; useful to export raw traced boundaries.
#[derive(Debug, Clone, Default)]
pub struct IdentitySimplifier;

impl PolylineSimplifier for IdentitySimplifier {
    fn simplify(&self, contour: &Contour, _ratio: f64) -> Polyline {
        Polyline::new(contour.points.clone())
    }
}
