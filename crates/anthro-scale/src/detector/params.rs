use anthro_core::kernel_sigma;
use serde::{Deserialize, Serialize};

/// Configuration for the scale detector.
///
/// The defaults describe a thin, long ruler: at least 8 times longer than
/// wide and spanning 8 %..40 % of the larger image dimension.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleDetectorParams {
    /// Gaussian sigma applied before edge detection (5×5 kernel equivalent).
    pub blur_sigma: f32,
    /// Canny hysteresis thresholds.
    pub canny_low: f32,
    pub canny_high: f32,
    /// Contours enclosing less than `min_area_frac * w * h` pixels are noise.
    pub min_area_frac: f64,
    /// Minimal `long / short` of a ruler candidate (exclusive).
    pub min_aspect: f64,
    /// Candidate long side must lie strictly inside
    /// `(min_length_frac, max_length_frac) * max(w, h)`.
    pub min_length_frac: f64,
    pub max_length_frac: f64,
    /// Use the largest contour when no candidate passes the gates.
    pub fallback_to_largest: bool,
}

impl Default for ScaleDetectorParams {
    fn default() -> Self {
        Self {
            blur_sigma: kernel_sigma(5),
            canny_low: 50.0,
            canny_high: 150.0,
            min_area_frac: 0.0005,
            min_aspect: 8.0,
            min_length_frac: 0.08,
            max_length_frac: 0.4,
            fallback_to_largest: true,
        }
    }
}
