//! Landmark geometry in pixel space.

use anthro_core::{BodyPoint, Landmark, LandmarkSet, Region, Side};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// How far above the face landmarks the crown of the head is assumed to be.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadTopParams {
    /// Fraction of the face-to-shoulder span added above the topmost face
    /// point. Children's heads take a larger share of that span.
    pub shoulder_span_frac: f64,
    /// Lower bound of the offset, in normalized image units.
    pub min_offset: f64,
    /// Offset used when the shoulders are not available.
    pub fallback_offset: f64,
}

impl Default for HeadTopParams {
    fn default() -> Self {
        Self {
            shoulder_span_frac: 0.14,
            min_offset: 0.04,
            fallback_offset: 0.06,
        }
    }
}

/// Rounded pixel position of a normalized landmark.
#[inline]
pub fn landmark_to_pixel(lm: &Landmark, width: u32, height: u32) -> Point2<i64> {
    Point2::new(
        (lm.x * width as f64).round() as i64,
        (lm.y * height as f64).round() as i64,
    )
}

/// Euclidean distance between the rounded pixel positions of two landmarks.
pub fn pixel_distance(a: &Landmark, b: &Landmark, width: u32, height: u32) -> f64 {
    let pa = landmark_to_pixel(a, width, height);
    let pb = landmark_to_pixel(b, width, height);
    ((pb.x - pa.x) as f64).hypot((pb.y - pa.y) as f64)
}

/// Both shoulders carry a placed (non-zero visibility) point.
fn shoulders_available(landmarks: &LandmarkSet) -> bool {
    landmarks.get(BodyPoint::LeftShoulder).visibility > 0.0
        && landmarks.get(BodyPoint::RightShoulder).visibility > 0.0
}

/// Estimated y of the crown of the head, in pixels.
///
/// The crown sits above every facial landmark; the offset above the topmost
/// one scales with the distance down to the shoulder line.
pub fn head_top_y(landmarks: &LandmarkSet, image_h: u32, params: &HeadTopParams) -> f64 {
    let min_y = BodyPoint::FACE
        .iter()
        .map(|&p| landmarks.get(p).y)
        .fold(f64::INFINITY, f64::min);

    let offset = if shoulders_available(landmarks) {
        let shoulder_y = 0.5
            * (landmarks.get(BodyPoint::LeftShoulder).y + landmarks.get(BodyPoint::RightShoulder).y);
        params
            .min_offset
            .max(params.shoulder_span_frac * (shoulder_y - min_y).abs())
    } else {
        params.fallback_offset
    };

    (min_y - offset).max(0.0) * image_h as f64
}

/// Lowest foot point (ankles, heels, toes), in pixels, clamped to the image.
pub fn feet_y(landmarks: &LandmarkSet, image_h: u32) -> f64 {
    let max_y = BodyPoint::FEET
        .iter()
        .map(|&p| landmarks.get(p).y)
        .fold(f64::NEG_INFINITY, f64::max);
    (max_y * image_h as f64).min(image_h as f64)
}

/// Standing height in pixels; zero when the feet are not below the head.
#[inline]
pub fn height_px(head_top_y: f64, feet_y: f64) -> f64 {
    (feet_y - head_top_y).max(0.0)
}

/// Square crop around a wrist landmark.
///
/// Half-size is `max(min_half, frac * max(w, h))` pixels (truncated).
pub fn wrist_region(
    landmarks: &LandmarkSet,
    side: Side,
    width: u32,
    height: u32,
    min_half: f64,
    frac: f64,
) -> Region {
    let center = landmark_to_pixel(landmarks.get(side.wrist()), width, height);
    let half = min_half.max(frac * width.max(height) as f64) as i64;
    Region::centered_clamped(center.x, center.y, half, width, height)
}
