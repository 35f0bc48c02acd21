/// Errors returned by the scale detector.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScaleDetectError {
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("no contours found")]
    NoContours,
    #[error("largest contour has zero length")]
    DegenerateFallback,
}
