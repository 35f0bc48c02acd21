//! Wrist width from a crop around each wrist landmark.
//!
//! Strategy A profiles edge rows across the forearm ([`scanline`]). When it
//! yields too few widths, strategy B picks the dark blob closest to the crop
//! centre line ([`contour`]).

mod contour;
mod scanline;

pub use contour::contour_width;
pub use scanline::scanline_widths;

use anthro_core::{crop_rgb, kernel_sigma, Calibration, LandmarkSet, Side};
use image::RgbImage;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::anthropometry::{circumference_from_px, median, within};
use crate::geometry::wrist_region;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Tuning of the wrist width estimator.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WristParams {
    /// A side is measured only when its wrist visibility reaches this value.
    pub min_visibility: f64,
    /// Crop half-size is `max(crop_min_half, crop_frac * max(w, h))`.
    pub crop_min_half: f64,
    pub crop_frac: f64,

    /// Edge pass 1: bilateral filter, then Canny.
    pub bilateral_diameter: u32,
    pub bilateral_sigma_color: f32,
    pub bilateral_sigma_space: f32,
    pub canny_primary: [f32; 2],
    /// Edge pass 2: Gaussian blur, then a more sensitive Canny.
    pub smooth_sigma: f32,
    pub canny_secondary: [f32; 2],
    /// Every `row_step`-th row of the central third is profiled.
    pub row_step: usize,

    /// Widths must lie strictly inside this range (pixels).
    pub width_range: [f64; 2],
    /// Strategy B runs when strategy A found fewer widths.
    pub min_scan_widths: usize,

    pub threshold_block: u32,
    pub threshold_c: f32,
    pub contour_min_area: f64,
    /// Upper contour area bound as a fraction of the crop area.
    pub contour_max_area_frac: f64,
    /// Max horizontal centroid offset from the crop centre, fraction of width.
    pub centroid_max_offset_frac: f64,

    /// Wrist cross-section ellipticity correction.
    pub shape_factor: f64,
    /// Plausible circumference band (cm, inclusive).
    pub circumference_range: [f64; 2],
}

impl Default for WristParams {
    fn default() -> Self {
        Self {
            min_visibility: 0.4,
            crop_min_half: 60.0,
            crop_frac: 0.06,
            bilateral_diameter: 9,
            bilateral_sigma_color: 75.0,
            bilateral_sigma_space: 75.0,
            canny_primary: [30.0, 90.0],
            smooth_sigma: kernel_sigma(5),
            canny_secondary: [20.0, 60.0],
            row_step: 2,
            width_range: [5.0, 120.0],
            min_scan_widths: 3,
            threshold_block: 11,
            threshold_c: 2.0,
            contour_min_area: 50.0,
            contour_max_area_frac: 0.5,
            centroid_max_offset_frac: 0.4,
            shape_factor: 1.3,
            circumference_range: [6.0, 25.0],
        }
    }
}

impl WristParams {
    #[inline]
    pub(crate) fn width_ok(&self, w: f64) -> bool {
        w > self.width_range[0] && w < self.width_range[1]
    }
}

/// Accepted measurement of one wrist.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WristSideMeasurement {
    pub width_px: f64,
    pub circumference_cm: f64,
    /// Number of widths the median was taken over.
    pub samples: usize,
    /// Strategy B contributed a width.
    pub contour_used: bool,
}

/// What happened when one wrist was examined.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WristSideOutcome {
    LowVisibility { visibility: f64 },
    EmptyCrop,
    NoWidths,
    OutOfRange { circumference_cm: f64 },
    Accepted(WristSideMeasurement),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WristSideReport {
    pub side: Side,
    pub outcome: WristSideOutcome,
}

/// Result of the primary wrist path over both sides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WristEstimate {
    /// Left first, then right.
    pub sides: Vec<WristSideReport>,
    /// Mean of accepted sides.
    pub circumference_cm: Option<f64>,
}

impl WristEstimate {
    pub fn accepted_sides(&self) -> Vec<Side> {
        self.sides
            .iter()
            .filter(|r| matches!(r.outcome, WristSideOutcome::Accepted(_)))
            .map(|r| r.side)
            .collect()
    }
}

/// Image-based wrist circumference estimator.
#[derive(Clone, Debug, Default)]
pub struct WristEstimator {
    params: WristParams,
}

impl WristEstimator {
    pub fn new(params: WristParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &WristParams {
        &self.params
    }

    /// Measure both wrists and average the plausible ones.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn estimate(
        &self,
        image: &RgbImage,
        landmarks: &LandmarkSet,
        calibration: &Calibration,
    ) -> WristEstimate {
        let sides: Vec<WristSideReport> = Side::BOTH
            .iter()
            .map(|&side| WristSideReport {
                side,
                outcome: self.measure_side(image, landmarks, calibration, side),
            })
            .collect();

        let accepted: Vec<f64> = sides
            .iter()
            .filter_map(|r| match &r.outcome {
                WristSideOutcome::Accepted(m) => Some(m.circumference_cm),
                _ => None,
            })
            .collect();
        let circumference_cm =
            (!accepted.is_empty()).then(|| accepted.iter().sum::<f64>() / accepted.len() as f64);

        WristEstimate {
            sides,
            circumference_cm,
        }
    }

    fn measure_side(
        &self,
        image: &RgbImage,
        landmarks: &LandmarkSet,
        calibration: &Calibration,
        side: Side,
    ) -> WristSideOutcome {
        let p = &self.params;
        let visibility = landmarks.get(side.wrist()).visibility;
        if visibility < p.min_visibility {
            return WristSideOutcome::LowVisibility { visibility };
        }

        let (w, h) = image.dimensions();
        let region = wrist_region(landmarks, side, w, h, p.crop_min_half, p.crop_frac);
        let Some(crop) = crop_rgb(image, region) else {
            return WristSideOutcome::EmptyCrop;
        };
        let gray = image::imageops::grayscale(&crop);

        let mut widths = scanline_widths(&gray, p);
        let mut contour_used = false;
        if widths.len() < p.min_scan_widths {
            if let Some(cw) = contour_width(&gray, p) {
                widths.push(cw);
                contour_used = true;
            }
        }
        debug!(
            "{side} wrist: {} widths from {}x{} crop (contour: {contour_used})",
            widths.len(),
            region.width(),
            region.height()
        );

        let Some(width_px) = median(&widths) else {
            return WristSideOutcome::NoWidths;
        };
        let circumference_cm = circumference_from_px(width_px, calibration, p.shape_factor);
        if !within(circumference_cm, p.circumference_range) {
            return WristSideOutcome::OutOfRange { circumference_cm };
        }
        WristSideOutcome::Accepted(WristSideMeasurement {
            width_px,
            circumference_cm,
            samples: widths.len(),
            contour_used,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::geometry::tests::standing_child;
    use anthro_core::{BodyPoint, Landmark};
    use approx::assert_relative_eq;
    use image::Rgb;
    use std::f64::consts::PI;

    /// Dark frame with a bright forearm segment of `band` px across the left
    /// wrist of [`standing_child`] (pixel (660, 520) in a 1000×1000 frame).
    pub(crate) fn forearm_image(band: u32) -> RgbImage {
        let x0 = 660 - band / 2;
        RgbImage::from_fn(1000, 1000, |x, y| {
            if (x0..x0 + band).contains(&x) && (440..600).contains(&y) {
                Rgb([210, 180, 160])
            } else {
                Rgb([20, 20, 20])
            }
        })
    }

    #[test]
    fn measures_visible_bright_forearm() {
        let img = forearm_image(40);
        let cal = Calibration::from_pixels_per_cm(10.0).unwrap();
        let est = WristEstimator::default().estimate(&img, &standing_child(), &cal);

        assert_eq!(est.sides.len(), 2);
        assert_eq!(est.sides[0].side, Side::Left);
        let WristSideOutcome::Accepted(m) = &est.sides[0].outcome else {
            panic!("left wrist not measured: {:?}", est.sides[0].outcome);
        };
        assert!(!m.contour_used);
        assert!((m.width_px - 40.0).abs() < 4.0, "{}", m.width_px);
        assert_eq!(est.sides[1].outcome, WristSideOutcome::NoWidths);

        let c = est.circumference_cm.unwrap();
        assert_relative_eq!(c, PI * m.width_px / 10.0 * 1.3, epsilon = 1e-9);
        assert!((6.0..=25.0).contains(&c));
        assert_eq!(est.accepted_sides(), vec![Side::Left]);
    }

    #[test]
    fn contour_strategy_measures_when_scan_spans_are_too_wide() {
        // 2000 px frame: the left wrist crop is centred on (1320, 1040) and is
        // 240 px wide. Dark strips near both crop borders make every scanned
        // span exceed the width limit; a dark blob sits on the centre line.
        let img = RgbImage::from_fn(2000, 2000, |x, y| {
            let u = (x as f64 - 1320.0) / 15.0;
            let v = (y as f64 - 1040.0) / 40.0;
            let strip = (1204..1208).contains(&x) || (1432..1436).contains(&x);
            if strip || u * u + v * v <= 1.0 {
                Rgb([40, 40, 40])
            } else {
                Rgb([200, 200, 200])
            }
        });
        let lm = standing_child();
        let p = WristParams::default();

        let region = wrist_region(&lm, Side::Left, 2000, 2000, p.crop_min_half, p.crop_frac);
        let crop = crop_rgb(&img, region).unwrap();
        assert!(scanline_widths(&image::imageops::grayscale(&crop), &p).is_empty());

        let cal = Calibration::from_pixels_per_cm(10.0).unwrap();
        let est = WristEstimator::new(p).estimate(&img, &lm, &cal);
        let WristSideOutcome::Accepted(m) = &est.sides[0].outcome else {
            panic!("left wrist not measured: {:?}", est.sides[0].outcome);
        };
        assert!(m.contour_used);
        assert_eq!(m.samples, 1);
        assert!((m.width_px - 31.0).abs() <= 3.0, "{}", m.width_px);
        assert_relative_eq!(m.circumference_cm, PI * m.width_px / 10.0 * 1.3, epsilon = 1e-9);
        assert_eq!(est.sides[1].outcome, WristSideOutcome::NoWidths);
        assert_eq!(est.circumference_cm, Some(m.circumference_cm));
    }

    #[test]
    fn implausible_circumference_is_discarded() {
        let img = forearm_image(40);
        // 40 px at 2 px/cm -> 20 cm wide, ~82 cm around
        let cal = Calibration::from_pixels_per_cm(2.0).unwrap();
        let est = WristEstimator::default().estimate(&img, &standing_child(), &cal);
        assert!(matches!(
            est.sides[0].outcome,
            WristSideOutcome::OutOfRange { circumference_cm } if circumference_cm > 25.0
        ));
        assert_eq!(est.circumference_cm, None);
    }

    #[test]
    fn low_visibility_side_is_skipped() {
        let img = forearm_image(40);
        let cal = Calibration::from_pixels_per_cm(10.0).unwrap();
        let lm = standing_child().with(BodyPoint::LeftWrist, Landmark::new(0.66, 0.52, 0.39));
        let est = WristEstimator::default().estimate(&img, &lm, &cal);
        assert_eq!(
            est.sides[0].outcome,
            WristSideOutcome::LowVisibility { visibility: 0.39 }
        );
        assert_eq!(est.circumference_cm, None);
    }

    #[test]
    fn accepted_sides_are_averaged() {
        // Same band mirrored onto the right wrist at x=340.
        let img = RgbImage::from_fn(1000, 1000, |x, y| {
            let band = |c: u32, half: u32| (c - half..c + half).contains(&x);
            if (440..600).contains(&y) && (band(660, 20) || band(340, 15)) {
                Rgb([210, 180, 160])
            } else {
                Rgb([20, 20, 20])
            }
        });
        let cal = Calibration::from_pixels_per_cm(10.0).unwrap();
        let est = WristEstimator::default().estimate(&img, &standing_child(), &cal);
        let per_side: Vec<f64> = est
            .sides
            .iter()
            .map(|r| match &r.outcome {
                WristSideOutcome::Accepted(m) => m.circumference_cm,
                other => panic!("{:?} not accepted: {other:?}", r.side),
            })
            .collect();
        assert_relative_eq!(
            est.circumference_cm.unwrap(),
            0.5 * (per_side[0] + per_side[1]),
            epsilon = 1e-12
        );
        assert!(per_side[0] > per_side[1]);
    }
}
