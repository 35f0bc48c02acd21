//! Core types and utilities for photo-based child anthropometry.
//!
//! This crate holds what every stage of the measurement pipeline shares:
//! the closed set of body landmarks, the pixel-to-centimeter calibration,
//! pixel regions and contour geometry, the image primitives not covered by
//! `imageproc`, and the diagnostic event list attached to results.

mod calibration;
mod diagnostics;
mod geometry;
mod imgops;
mod landmarks;
mod logger;

pub use calibration::{Calibration, CalibrationError, REFERENCE_LENGTH_CM};
pub use diagnostics::{DiagnosticEvent, DiagnosticLevel, Diagnostics, Stage};
pub use geometry::{
    bounding_rect, convex_hull, min_area_rect, polygon_moments, PolygonMoments, Region,
    RotatedRect,
};
pub use imgops::{
    adaptive_threshold_gaussian_inv, crop_rgb, gaussian_smooth, kernel_sigma, or_maps,
};
pub use landmarks::{BodyPoint, Landmark, LandmarkError, LandmarkSet, Side};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;

/// Convert contour points traced by `imageproc` into floating-point points.
pub fn contour_points_f64(points: &[imageproc::point::Point<i32>]) -> Vec<nalgebra::Point2<f64>> {
    points
        .iter()
        .map(|p| nalgebra::Point2::new(p.x as f64, p.y as f64))
        .collect()
}

/// Convert contour points traced by `imageproc` into `nalgebra` integer points.
pub fn contour_points_i32(points: &[imageproc::point::Point<i32>]) -> Vec<nalgebra::Point2<i32>> {
    points
        .iter()
        .map(|p| nalgebra::Point2::new(p.x, p.y))
        .collect()
}
