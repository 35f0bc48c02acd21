//! Pixel-to-body conversions: calibration plus empirical shape ratios.

use std::f64::consts::PI;

use anthro_core::Calibration;

/// Circumference of a limb or head whose frontal width is `width_cm`.
///
/// `shape_factor` corrects the circle perimeter `π·w` for the cross-section's
/// ellipticity (1.08 for heads, 1.3 for wrists).
#[inline]
pub fn circumference_from_width(width_cm: f64, shape_factor: f64) -> f64 {
    PI * width_cm * shape_factor
}

/// Circumference from a pixel width under `calibration`.
#[inline]
pub fn circumference_from_px(width_px: f64, calibration: &Calibration, shape_factor: f64) -> f64 {
    circumference_from_width(calibration.to_cm(width_px), shape_factor)
}

/// Wrist circumference predicted from forearm length.
#[inline]
pub fn wrist_from_forearm(forearm_cm: f64, ratio: f64) -> f64 {
    forearm_cm * ratio
}

/// Closed-interval range check.
#[inline]
pub fn within(value: f64, range: [f64; 2]) -> bool {
    value >= range[0] && value <= range[1]
}

/// Median of a non-empty sample (mean of the two middle values for even
/// lengths).
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut v = values.to_vec();
    v.sort_by(f64::total_cmp);
    let mid = v.len() / 2;
    if v.len() % 2 == 1 {
        Some(v[mid])
    } else {
        Some(0.5 * (v[mid - 1] + v[mid]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn circumference_uses_shape_factor() {
        let cal = Calibration::from_pixels_per_cm(10.0).unwrap();
        assert_relative_eq!(circumference_from_px(30.0, &cal, 1.3), PI * 3.0 * 1.3, epsilon = 1e-12);
        assert_relative_eq!(circumference_from_width(14.0, 1.08), 47.5008, epsilon = 1e-3);
    }

    #[test]
    fn median_of_odd_and_even_samples() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[5.0, 1.0, 3.0]), Some(3.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn within_is_inclusive() {
        assert!(within(8.0, [8.0, 18.0]));
        assert!(within(18.0, [8.0, 18.0]));
        assert!(!within(18.0001, [8.0, 18.0]));
    }
}
