use anthro_core::RotatedRect;
use serde::{Deserialize, Serialize};

/// Output of a scale detection run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScaleDetection {
    /// Long side of the chosen rectangle, in pixels.
    pub pixel_length: f64,
    /// Minimum-area rectangle of the chosen contour.
    pub rect: RotatedRect,
    /// `long / short` of the chosen rectangle (`None` when degenerate).
    pub aspect: Option<f64>,
    /// True when no contour passed the ruler gates and the largest contour
    /// was used instead.
    pub fallback_used: bool,
    /// Number of contours that passed every ruler gate.
    pub candidates: usize,
    /// Number of outer contours extracted from the edge map.
    pub contours: usize,
}
