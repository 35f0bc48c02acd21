//! Reference-scale detection.
//!
//! Finds the most ruler-like elongated object in a grayscale photograph and
//! reports its length in pixels. Together with the known physical length of
//! the ruler this gives the per-image pixels-per-centimeter calibration.
//!
//! Pipeline: Gaussian smoothing, Canny edges, outer contours, minimum-area
//! rectangles, aspect/length gating, ranking, largest-contour fallback.

mod detector;

pub use detector::{ScaleDetectError, ScaleDetection, ScaleDetector, ScaleDetectorParams};
