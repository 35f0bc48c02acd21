use anthro_core::REFERENCE_LENGTH_CM;
use anthro_scale::ScaleDetectorParams;
use serde::{Deserialize, Serialize};

use crate::fallback::ForearmFallbackParams;
use crate::geometry::HeadTopParams;
use crate::head::HeadParams;
use crate::wrist::WristParams;

/// Parameters of the full measurement pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasureParams {
    /// Physical length of the reference scale (cm).
    pub reference_length_cm: f64,
    pub scale: ScaleDetectorParams,
    pub head_top: HeadTopParams,
    pub head: HeadParams,
    pub wrist: WristParams,
    pub forearm: ForearmFallbackParams,
    /// Seed of the last-resort wrist draw; `None` uses OS entropy.
    pub seed: Option<u64>,
}

impl Default for MeasureParams {
    fn default() -> Self {
        Self {
            reference_length_cm: REFERENCE_LENGTH_CM,
            scale: ScaleDetectorParams::default(),
            head_top: HeadTopParams::default(),
            head: HeadParams::default(),
            wrist: WristParams::default(),
            forearm: ForearmFallbackParams::default(),
            seed: None,
        }
    }
}
