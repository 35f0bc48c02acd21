//! Head circumference from the frontal head width.

use anthro_core::{BodyPoint, Calibration, LandmarkSet};
use serde::{Deserialize, Serialize};

use crate::anthropometry::circumference_from_px;
use crate::geometry::pixel_distance;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadParams {
    /// Both ears must be more visible than this to span the head directly.
    pub ear_min_visibility: f64,
    /// Head width over eye span, used when the ears are hidden.
    pub eye_span_scale: f64,
    /// Head cross-section ellipticity correction.
    pub shape_factor: f64,
}

impl Default for HeadParams {
    fn default() -> Self {
        Self {
            ear_min_visibility: 0.3,
            eye_span_scale: 1.6,
            shape_factor: 1.08,
        }
    }
}

/// Which landmarks the head width came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadMethod {
    Ears,
    Eyes,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeadEstimate {
    pub width_px: f64,
    pub circumference_cm: f64,
    pub method: HeadMethod,
}

/// Head width in pixels and the landmarks it was measured between.
pub fn head_width_px(
    landmarks: &LandmarkSet,
    width: u32,
    height: u32,
    params: &HeadParams,
) -> (f64, HeadMethod) {
    let le = landmarks.get(BodyPoint::LeftEar);
    let re = landmarks.get(BodyPoint::RightEar);
    if le.visibility > params.ear_min_visibility && re.visibility > params.ear_min_visibility {
        return (pixel_distance(le, re, width, height), HeadMethod::Ears);
    }
    let eyes = pixel_distance(
        landmarks.get(BodyPoint::LeftEye),
        landmarks.get(BodyPoint::RightEye),
        width,
        height,
    );
    (eyes * params.eye_span_scale, HeadMethod::Eyes)
}

/// Estimate head circumference. Never fails; a degenerate face gives 0.
pub fn head_circumference(
    landmarks: &LandmarkSet,
    width: u32,
    height: u32,
    calibration: &Calibration,
    params: &HeadParams,
) -> HeadEstimate {
    let (width_px, method) = head_width_px(landmarks, width, height, params);
    HeadEstimate {
        width_px,
        circumference_cm: circumference_from_px(width_px, calibration, params.shape_factor),
        method,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::tests::standing_child;
    use anthro_core::Landmark;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn visible_ears_span_the_head() {
        let lm = standing_child();
        let cal = Calibration::from_pixels_per_cm(10.0).unwrap();
        let est = head_circumference(&lm, 1000, 1000, &cal, &HeadParams::default());
        assert_eq!(est.method, HeadMethod::Ears);
        // ears at x 0.45 and 0.55
        assert_relative_eq!(est.width_px, 100.0, epsilon = 1e-9);
        assert_relative_eq!(est.circumference_cm, PI * 10.0 * 1.08, epsilon = 1e-9);
    }

    #[test]
    fn hidden_ear_falls_back_to_scaled_eye_span() {
        let lm = standing_child().with(BodyPoint::RightEar, Landmark::new(0.45, 0.13, 0.3));
        let (w, method) = head_width_px(&lm, 1000, 1000, &HeadParams::default());
        assert_eq!(method, HeadMethod::Eyes);
        // eyes at x 0.48 and 0.52 -> 40 px
        assert_relative_eq!(w, 40.0 * 1.6, epsilon = 1e-9);
    }

    #[test]
    fn distance_uses_rounded_pixels() {
        let lm = standing_child()
            .with(BodyPoint::LeftEar, Landmark::new(0.1004, 0.5, 1.0))
            .with(BodyPoint::RightEar, Landmark::new(0.2004, 0.5, 1.0));
        let (w, _) = head_width_px(&lm, 1000, 1000, &HeadParams::default());
        assert_eq!(w, 100.0);
    }
}
