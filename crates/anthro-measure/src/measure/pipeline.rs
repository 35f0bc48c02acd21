use super::{MeasureError, MeasureParams, MeasurementResult, WristSource};
use crate::fallback::{wrist_fallback, WristFallback};
use crate::geometry::{feet_y, head_top_y, height_px};
use crate::head::head_circumference;
use crate::provider::LandmarkProvider;
use crate::wrist::{WristEstimate, WristEstimator, WristSideOutcome};
use anthro_core::{Calibration, Diagnostics, Stage};
use anthro_scale::{ScaleDetection, ScaleDetector};
use image::{GrayImage, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Photograph-to-measurements pipeline.
///
/// Immutable after construction; one instance can serve any number of
/// images, including from several threads.
#[derive(Clone, Debug, Default)]
pub struct Measurer {
    params: MeasureParams,
    scale: ScaleDetector,
    wrist: WristEstimator,
}

impl Measurer {
    pub fn new(params: MeasureParams) -> Self {
        Self {
            scale: ScaleDetector::new(params.scale.clone()),
            wrist: WristEstimator::new(params.wrist.clone()),
            params,
        }
    }

    #[inline]
    pub fn params(&self) -> &MeasureParams {
        &self.params
    }

    /// Detect the reference scale and derive pixels-per-centimeter.
    pub fn calibrate(&self, image: &RgbImage) -> Result<(Calibration, ScaleDetection), MeasureError> {
        self.calibrate_gray(&image::imageops::grayscale(image))
    }

    /// [`calibrate`](Self::calibrate) on an already converted grayscale image.
    pub fn calibrate_gray(
        &self,
        gray: &GrayImage,
    ) -> Result<(Calibration, ScaleDetection), MeasureError> {
        let scale = self.scale.detect(gray)?;
        let calibration =
            Calibration::from_reference(scale.pixel_length, self.params.reference_length_cm)?;
        Ok((calibration, scale))
    }

    /// Measure the subject in `image`.
    ///
    /// The last-resort wrist value is drawn from an RNG seeded with
    /// `params.seed`, or from OS entropy when no seed is set.
    pub fn measure<P: LandmarkProvider + ?Sized>(
        &self,
        image: &RgbImage,
        provider: &P,
    ) -> Result<MeasurementResult, MeasureError> {
        let mut rng: Box<dyn RngCore> = match self.params.seed {
            Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
            None => Box::new(StdRng::from_entropy()),
        };
        self.measure_with_rng(image, provider, &mut rng)
    }

    /// [`measure`](Self::measure) with a caller-supplied RNG.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip_all, fields(width = image.width(), height = image.height()))
    )]
    pub fn measure_with_rng<P, R>(
        &self,
        image: &RgbImage,
        provider: &P,
        rng: &mut R,
    ) -> Result<MeasurementResult, MeasureError>
    where
        P: LandmarkProvider + ?Sized,
        R: Rng + ?Sized,
    {
        let p = &self.params;
        let (w, h) = image.dimensions();
        let mut diag = Diagnostics::new();

        let (calibration, scale) = self.calibrate(image)?;
        diag.info(
            Stage::Calibrate,
            format!(
                "scale {:.1}px over {} cm -> {:.3} px/cm",
                scale.pixel_length,
                p.reference_length_cm,
                calibration.pixels_per_cm()
            ),
        );
        if scale.fallback_used {
            diag.warn(
                Stage::Calibrate,
                "no ruler-like object found; calibrated from the largest contour",
            );
        }

        let landmarks = provider.detect(image)?.ok_or(MeasureError::PoseNotDetected)?;
        diag.info(Stage::Landmarks, "pose landmarks detected");

        let top = head_top_y(&landmarks, h, &p.head_top);
        let feet = feet_y(&landmarks, h);
        let height = height_px(top, feet);
        diag.debug(
            Stage::Height,
            format!("head top y={top:.1}px, feet y={feet:.1}px"),
        );
        if height == 0.0 {
            diag.warn(Stage::Height, "feet are not below the head top; height is 0");
        }
        let height_cm = calibration.to_cm(height);
        diag.info(Stage::Height, format!("height {height:.1}px = {height_cm:.1} cm"));

        let head = head_circumference(&landmarks, w, h, &calibration, &p.head);
        diag.info(
            Stage::Head,
            format!(
                "head width {:.1}px from {:?} -> circumference {:.1} cm",
                head.width_px, head.method, head.circumference_cm
            ),
        );

        let wrist = self.wrist.estimate(image, &landmarks, &calibration);
        record_wrist_sides(&wrist, &mut diag);

        let (wrist_circumference_cm, wrist_source, wrist_fallback) = match wrist.circumference_cm {
            Some(c) => {
                diag.info(Stage::Wrist, format!("wrist circumference {c:.1} cm"));
                let sides = wrist.accepted_sides();
                (Some(c), Some(WristSource::Measured { sides }), None)
            }
            None => {
                diag.warn(
                    Stage::Wrist,
                    "wrist not measurable in the image; using forearm fallback",
                );
                let fb = wrist_fallback(&landmarks, w, h, &calibration, &p.forearm, rng);
                record_fallback(&fb, &mut diag);
                let source = match (fb.forearm_side, fb.circumference_cm) {
                    (Some(side), _) => Some(WristSource::Forearm { side }),
                    (None, Some(_)) => Some(WristSource::PopulationAverage),
                    (None, None) => None,
                };
                (fb.circumference_cm, source, Some(fb))
            }
        };

        Ok(MeasurementResult {
            height_cm,
            height_px: height,
            head_circumference_cm: head.circumference_cm,
            head_method: head.method,
            wrist_circumference_cm,
            wrist_fallback_used: wrist_fallback.is_some(),
            wrist_source,
            pixels_per_cm: calibration.pixels_per_cm(),
            scale,
            image_width: w,
            image_height: h,
            wrist,
            wrist_fallback,
            diagnostics: diag,
        })
    }
}

fn record_wrist_sides(wrist: &WristEstimate, diag: &mut Diagnostics) {
    for report in &wrist.sides {
        let side = report.side;
        match &report.outcome {
            WristSideOutcome::LowVisibility { visibility } => diag.debug(
                Stage::Wrist,
                format!("{side} wrist skipped: visibility {visibility:.2}"),
            ),
            WristSideOutcome::EmptyCrop => {
                diag.debug(Stage::Wrist, format!("{side} wrist crop is empty"))
            }
            WristSideOutcome::NoWidths => {
                diag.debug(Stage::Wrist, format!("{side} wrist: no width found"))
            }
            WristSideOutcome::OutOfRange { circumference_cm } => diag.warn(
                Stage::Wrist,
                format!("{side} wrist rejected: {circumference_cm:.1} cm is implausible"),
            ),
            WristSideOutcome::Accepted(m) => diag.debug(
                Stage::Wrist,
                format!(
                    "{side} wrist {:.1}px over {} rows -> {:.1} cm",
                    m.width_px, m.samples, m.circumference_cm
                ),
            ),
        }
    }
}

fn record_fallback(fb: &WristFallback, diag: &mut Diagnostics) {
    for side in &fb.ineligible {
        diag.debug(
            Stage::WristFallback,
            format!("{side} arm not visible enough for forearm estimate"),
        );
    }
    for a in &fb.attempts {
        let verdict = if a.accepted { "accepted" } else { "rejected" };
        diag.info(
            Stage::WristFallback,
            format!(
                "{} forearm {:.1}px = {:.1} cm -> wrist {:.1} cm ({verdict})",
                a.side, a.forearm_px, a.forearm_cm, a.estimate_cm
            ),
        );
    }
    match (fb.forearm_side, fb.circumference_cm) {
        (None, Some(c)) => diag.warn(
            Stage::WristFallback,
            format!("using population average wrist circumference {c:.1} cm"),
        ),
        (None, None) => diag.warn(Stage::WristFallback, "wrist circumference unavailable"),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::tests::standing_child;
    use crate::head::HeadMethod;
    use crate::provider::StaticLandmarks;
    use crate::wrist::tests::forearm_image;
    use anthro_core::{BodyPoint, DiagnosticLevel, Landmark};
    use approx::assert_relative_eq;
    use image::Rgb;

    /// Forearm image with a 150 px ruler (10 px/cm) drawn near the top.
    fn photo(band: u32) -> RgbImage {
        let mut img = forearm_image(band);
        for y in 100..108 {
            for x in 100..250 {
                img.put_pixel(x, y, Rgb([250, 250, 250]));
            }
        }
        img
    }

    fn seeded(seed: u64) -> Measurer {
        Measurer::new(MeasureParams {
            seed: Some(seed),
            ..MeasureParams::default()
        })
    }

    #[test]
    fn full_measurement_with_visible_wrist() {
        let img = photo(40);
        let provider = StaticLandmarks::new(standing_child());
        let res = seeded(1).measure(&img, &provider).expect("measurement");

        assert!(!res.scale.fallback_used);
        assert!((res.pixels_per_cm - 10.0).abs() < 0.4, "{}", res.pixels_per_cm);
        // head top 80px, feet 920px
        assert_relative_eq!(res.height_px, 840.0, epsilon = 1e-9);
        assert_relative_eq!(res.height_cm, 840.0 / res.pixels_per_cm, epsilon = 1e-9);
        assert_eq!(res.head_method, HeadMethod::Ears);

        assert!(!res.wrist_fallback_used);
        assert!(res.wrist_fallback.is_none());
        assert_eq!(
            res.wrist_source,
            Some(WristSource::Measured {
                sides: vec![anthro_core::Side::Left]
            })
        );
        let c = res.wrist_circumference_cm.unwrap();
        assert!((6.0..=25.0).contains(&c));
        assert!(res.diagnostics.for_stage(Stage::Calibrate).count() >= 1);
    }

    #[test]
    fn hidden_wrists_fall_back_to_population_value() {
        let img = photo(40);
        let lm = standing_child()
            .with(BodyPoint::LeftWrist, Landmark::new(0.66, 0.52, 0.35))
            .with(BodyPoint::RightWrist, Landmark::new(0.34, 0.52, 0.35));
        let provider = StaticLandmarks::new(lm);

        let a = seeded(5).measure(&img, &provider).unwrap();
        let b = seeded(5).measure(&img, &provider).unwrap();
        assert!(a.wrist_fallback_used);
        assert_eq!(a.wrist_source, Some(WristSource::PopulationAverage));
        assert_eq!(a.wrist_circumference_cm, b.wrist_circumference_cm);
        let c = a.wrist_circumference_cm.unwrap();
        assert!((12.5..=14.5).contains(&c));

        let fb = a.wrist_fallback.as_ref().unwrap();
        let sides: Vec<_> = fb.attempts.iter().map(|t| t.side).collect();
        assert_eq!(sides, vec![anthro_core::Side::Left, anthro_core::Side::Right]);
        assert!(a
            .diagnostics
            .for_stage(Stage::WristFallback)
            .any(|e| e.level == DiagnosticLevel::Warn));
    }

    #[test]
    fn missing_subject_is_pose_not_detected() {
        let img = photo(40);
        let err = Measurer::default()
            .measure(&img, &StaticLandmarks::empty())
            .unwrap_err();
        assert!(matches!(err, MeasureError::PoseNotDetected));
    }

    #[test]
    fn scale_failure_stops_before_landmarks() {
        struct Panicking;
        impl LandmarkProvider for Panicking {
            fn detect(
                &self,
                _image: &RgbImage,
            ) -> Result<Option<anthro_core::LandmarkSet>, anthro_core::LandmarkError> {
                panic!("landmarks requested without calibration");
            }
        }
        let img = RgbImage::new(200, 200);
        let err = Measurer::default().measure(&img, &Panicking).unwrap_err();
        assert!(matches!(err, MeasureError::ScaleNotFound(_)));
        assert!(err.is_terminal());
    }

    #[test]
    fn provider_failure_is_not_terminal() {
        struct Broken;
        impl LandmarkProvider for Broken {
            fn detect(
                &self,
                _image: &RgbImage,
            ) -> Result<Option<anthro_core::LandmarkSet>, anthro_core::LandmarkError> {
                Err(anthro_core::LandmarkError::Backend("no model".into()))
            }
        }
        let err = Measurer::default().measure(&photo(40), &Broken).unwrap_err();
        assert!(matches!(err, MeasureError::Landmarks(_)));
        assert!(!err.is_terminal());
    }

    #[test]
    fn result_serializes_with_tagged_sources() {
        let res = seeded(3)
            .measure(&photo(40), &StaticLandmarks::new(standing_child()))
            .unwrap();
        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(json["wrist_source"]["kind"], "measured");
        assert_eq!(json["wrist_source"]["sides"][0], "left");
        assert_eq!(json["head_method"], "ears");
        assert!(json["diagnostics"].as_array().unwrap().len() >= 4);
    }
}
