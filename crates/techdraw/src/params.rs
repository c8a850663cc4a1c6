use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

/// How the threshold mask and the edge mask are merged into one drawing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MaskCombine {
    /// A pixel is drawn when either the threshold or the edge detector drew it
    /// (bitwise AND of the two white-background masks).
    #[default]
    Union,
    /// A pixel is drawn only when both branches drew it.
    Intersection,
}

/// Tunable parameters of the raster pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FilterParameters {
    /// Resize so that max(width, height) <= this value. 0 disables resizing.
    pub max_dimension: u32,
    /// Side length in pixels of the square used to thicken edges.
    pub line_width: u32,
    /// Hysteresis lower threshold on gradient magnitude.
    #[schemars(range(min = 0.0))]
    pub canny_low: f32,
    /// Hysteresis upper threshold on gradient magnitude.
    #[schemars(range(min = 0.0))]
    pub canny_high: f32,
    /// Neighborhood side for the adaptive threshold. Forced odd and >= 3.
    pub adaptive_block_size: u32,
    /// Constant subtracted from the local mean.
    pub adaptive_c: f32,
    pub combine: MaskCombine,
}

impl Default for FilterParameters {
    fn default() -> Self {
        Self {
            max_dimension: 1600,
            line_width: 2,
            canny_low: 40.0,
            canny_high: 120.0,
            adaptive_block_size: 21,
            adaptive_c: 2.0,
            combine: MaskCombine::Union,
        }
    }
}

impl FilterParameters {
    /// Returns a copy with every value pulled into its valid range.
    pub fn normalized(&self) -> Self {
        let mut low = self.canny_low.max(0.0);
        let mut high = self.canny_high.max(0.0);
        if low > high {
            std::mem::swap(&mut low, &mut high);
        }
        Self {
            canny_low: low,
            canny_high: high,
            adaptive_block_size: normalize_block_size(self.adaptive_block_size),
            ..self.clone()
        }
    }
}

/// Force a neighborhood size to the nearest odd value that is at least 3.
pub fn normalize_block_size(block_size: u32) -> u32 {
    (block_size | 1).max(3)
}

/// Styling and simplification of the SVG export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SvgStyle {
    pub stroke_width: f32,
    /// Douglas-Peucker tolerance as a fraction of each contour's length.
    #[schemars(range(min = 0.0, max = 0.1))]
    pub simplify_ratio: f64,
    pub stroke_color: String,
}

impl Default for SvgStyle {
    fn default() -> Self {
        Self {
            stroke_width: 1.0,
            simplify_ratio: 0.01,
            stroke_color: "#000".to_string(),
        }
    }
}

impl SvgStyle {
    pub fn normalized(&self) -> Self {
        let simplify_ratio = if self.simplify_ratio.is_finite() {
            self.simplify_ratio.max(0.0)
        } else {
            0.0
        };
        Self {
            simplify_ratio,
            stroke_width: self.stroke_width.max(0.0),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn block_size_is_forced_odd_and_at_least_three() {
        assert_eq!(normalize_block_size(20), 21);
        assert_eq!(normalize_block_size(21), 21);
        assert_eq!(normalize_block_size(0), 3);
        assert_eq!(normalize_block_size(1), 3);
        assert_eq!(normalize_block_size(2), 3);
        assert_eq!(normalize_block_size(4), 5);
    }

    #[test]
    fn normalization_orders_canny_thresholds() {
        let params = FilterParameters {
            canny_low: 150.0,
            canny_high: 50.0,
            ..Default::default()
        }
        .normalized();
        assert_eq!(params.canny_low, 50.0);
        assert_eq!(params.canny_high, 150.0);
    }

    #[test]
    fn negative_simplify_ratio_disables_simplification() {
        let style = SvgStyle {
            simplify_ratio: -0.5,
            ..Default::default()
        }
        .normalized();
        assert_eq!(style.simplify_ratio, 0.0);
    }

    #[test]
    fn mask_combine_parses_from_snake_case() {
        assert_eq!(MaskCombine::from_str("union").unwrap(), MaskCombine::Union);
        assert_eq!(
            MaskCombine::from_str("intersection").unwrap(),
            MaskCombine::Intersection
        );
        assert_eq!(MaskCombine::Intersection.to_string(), "intersection");
        assert!(MaskCombine::from_str("xor").is_err());
    }
}
