//! Wrist circumference when no wrist could be measured in the image.
//!
//! Forearm length predicts wrist size; when neither arm is usable a value is
//! drawn from the typical child range.

use anthro_core::{Calibration, LandmarkSet, Side};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::anthropometry::{within, wrist_from_forearm};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ForearmFallbackParams {
    /// Shoulder, elbow and wrist must all be more visible than this.
    pub min_visibility: f64,
    /// Wrist circumference over forearm length.
    pub forearm_ratio: f64,
    /// Accepted estimate band (cm, inclusive).
    pub accept_range: [f64; 2],
    /// Draw a last-resort value when no forearm is usable.
    pub population_average: bool,
    /// Uniform range of the last-resort value (cm).
    pub population_range: [f64; 2],
}

impl Default for ForearmFallbackParams {
    fn default() -> Self {
        Self {
            min_visibility: 0.3,
            forearm_ratio: 0.16,
            accept_range: [8.0, 18.0],
            population_average: true,
            population_range: [12.5, 14.5],
        }
    }
}

/// One forearm-based estimate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForearmAttempt {
    pub side: Side,
    pub forearm_px: f64,
    pub forearm_cm: f64,
    pub estimate_cm: f64,
    pub accepted: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WristFallback {
    /// Arms that were evaluated, in order.
    pub attempts: Vec<ForearmAttempt>,
    /// Arms skipped for low visibility.
    pub ineligible: Vec<Side>,
    /// `None` only when no forearm was usable and the population draw is
    /// disabled.
    pub circumference_cm: Option<f64>,
    /// Arm whose forearm produced the value; `None` for the population draw.
    pub forearm_side: Option<Side>,
}

fn arm_visible(landmarks: &LandmarkSet, side: Side, min_visibility: f64) -> bool {
    [side.shoulder(), side.elbow(), side.wrist()]
        .iter()
        .all(|&p| landmarks.get(p).visibility > min_visibility)
}

/// Elbow-to-wrist distance in pixels (unrounded).
pub fn forearm_length_px(landmarks: &LandmarkSet, side: Side, width: u32, height: u32) -> f64 {
    let e = landmarks.get(side.elbow()).to_pixel_f64(width, height);
    let w = landmarks.get(side.wrist()).to_pixel_f64(width, height);
    (w - e).norm()
}

/// Estimate the wrist from the forearms (left first), else draw from the
/// population range.
pub fn wrist_fallback<R: Rng + ?Sized>(
    landmarks: &LandmarkSet,
    width: u32,
    height: u32,
    calibration: &Calibration,
    params: &ForearmFallbackParams,
    rng: &mut R,
) -> WristFallback {
    let mut attempts = Vec::new();
    let mut ineligible = Vec::new();

    for side in Side::BOTH {
        if !arm_visible(landmarks, side, params.min_visibility) {
            ineligible.push(side);
            continue;
        }
        let forearm_px = forearm_length_px(landmarks, side, width, height);
        let forearm_cm = calibration.to_cm(forearm_px);
        let estimate_cm = wrist_from_forearm(forearm_cm, params.forearm_ratio);
        let accepted = within(estimate_cm, params.accept_range);
        attempts.push(ForearmAttempt {
            side,
            forearm_px,
            forearm_cm,
            estimate_cm,
            accepted,
        });
        if accepted {
            return WristFallback {
                attempts,
                ineligible,
                circumference_cm: Some(estimate_cm),
                forearm_side: Some(side),
            };
        }
    }

    let [lo, hi] = params.population_range;
    let circumference_cm = params
        .population_average
        .then(|| if hi > lo { rng.gen_range(lo..=hi) } else { lo });
    WristFallback {
        attempts,
        ineligible,
        circumference_cm,
        forearm_side: None,
    }
}
