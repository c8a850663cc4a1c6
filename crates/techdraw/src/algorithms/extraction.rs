use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use crate::{traits::ContourExtractor, types::{Contour, Point}};

/// Outer-border extractor built on imageproc's border following.
///
/// Line pixels (0) are treated as foreground; hole borders are skipped and no
/// hierarchy is kept. Every boundary pixel is recorded in visiting order.
#[derive(Debug, Clone, Default)]
pub struct OuterBorderExtractor;

impl ContourExtractor for OuterBorderExtractor {
    fn extract_contours(&self, drawing: &GrayImage) -> Vec<Contour> {
        let inverted = invert(drawing);

        find_contours::<i32>(&inverted)
            .into_iter()
            .filter(|contour| contour.border_type == BorderType::Outer)
            .map(|contour| {
                Contour::new(
                    contour.points
                        .iter()
                        .map(|p| Point::new(p.x, p.y))
                        .collect(),
                )
            })
            .collect()
    }
}

/// Swap drawing polarity so lines become the nonzero foreground.
pub fn invert(image: &GrayImage) -> GrayImage {
    let mut inverted = image.clone();
    image::imageops::invert(&mut inverted);
    inverted
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn blank() -> GrayImage {
        GrayImage::from_pixel(30, 30, Luma([255]))
    }

    #[test]
    fn blank_drawing_has_no_contours() {
        assert!(OuterBorderExtractor.extract_contours(&blank()).is_empty());
    }

    #[test]
    fn ring_yields_only_its_outer_border() {
        let mut drawing = blank();
        for y in 5..25 {
            for x in 5..25 {
                let on_ring = x < 8 || x >= 22 || y < 8 || y >= 22;
                if on_ring {
                    drawing.put_pixel(x, y, Luma([0]));
                }
            }
        }
        let contours = OuterBorderExtractor.extract_contours(&drawing);
        assert_eq!(contours.len(), 1);

        let contour = &contours[0];
        assert!(contour.points.iter().all(|p| (5..25).contains(&p.x) && (5..25).contains(&p.y)));
        assert!(contour.points.contains(&Point::new(5, 5)));
        assert!(contour.points.contains(&Point::new(24, 24)));
        // Border following without compression visits every perimeter pixel.
        assert_eq!(contour.len(), 4 * 19);
    }

    #[test]
    fn separate_regions_are_traced_independently() {
        let mut drawing = blank();
        for x in 2..10 {
            drawing.put_pixel(x, 3, Luma([0]));
            drawing.put_pixel(x, 20, Luma([0]));
        }
        assert_eq!(OuterBorderExtractor.extract_contours(&drawing).len(), 2);
    }

    #[test]
    fn invert_flips_polarity() {
        let image = GrayImage::from_raw(2, 1, vec![0, 255]).unwrap();
        assert_eq!(invert(&image).as_raw(), &vec![255, 0]);
    }
}
