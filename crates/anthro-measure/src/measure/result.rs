use anthro_core::{Diagnostics, Side};
use anthro_scale::ScaleDetection;
use serde::{Deserialize, Serialize};

use crate::fallback::WristFallback;
use crate::head::HeadMethod;
use crate::wrist::WristEstimate;

/// Where the reported wrist circumference came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WristSource {
    /// Measured in the image; mean over `sides`.
    Measured { sides: Vec<Side> },
    /// Predicted from the forearm length of `side`.
    Forearm { side: Side },
    /// Drawn from the typical child range.
    PopulationAverage,
}

impl WristSource {
    #[inline]
    pub fn is_measured(&self) -> bool {
        matches!(self, Self::Measured { .. })
    }
}

/// Output of a measurement run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MeasurementResult {
    pub height_cm: f64,
    pub height_px: f64,
    pub head_circumference_cm: f64,
    pub head_method: HeadMethod,
    pub wrist_circumference_cm: Option<f64>,
    /// True whenever the image-based wrist measurement was not used.
    pub wrist_fallback_used: bool,
    pub wrist_source: Option<WristSource>,
    pub pixels_per_cm: f64,
    pub scale: ScaleDetection,
    pub image_width: u32,
    pub image_height: u32,
    /// Per-side outcome of the image-based wrist measurement.
    pub wrist: WristEstimate,
    /// Forearm attempts and the last-resort draw, when the fallback ran.
    #[serde(default)]
    pub wrist_fallback: Option<WristFallback>,
    pub diagnostics: Diagnostics,
}

impl MeasurementResult {
    /// Pixel length of the detected reference scale.
    #[inline]
    pub fn scale_length_px(&self) -> f64 {
        self.scale.pixel_length
    }
}
