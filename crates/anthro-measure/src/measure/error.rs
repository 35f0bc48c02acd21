use anthro_core::{CalibrationError, LandmarkError};
use anthro_scale::ScaleDetectError;

/// Why the reference scale could not be used.
#[derive(thiserror::Error, Debug)]
pub enum ScaleNotFound {
    #[error("image could not be decoded: {0}")]
    Unreadable(String),
    #[error(transparent)]
    Detect(#[from] ScaleDetectError),
}

/// Errors returned by [`Measurer`](super::Measurer).
#[derive(thiserror::Error, Debug)]
pub enum MeasureError {
    #[error("could not detect the 15 cm scale automatically ({0})")]
    ScaleNotFound(ScaleNotFound),
    #[error("pose landmarks not detected; ensure full body is visible")]
    PoseNotDetected,
    #[error(transparent)]
    Landmarks(#[from] LandmarkError),
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
}

impl MeasureError {
    /// Failures caused by the photograph itself rather than by the system.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ScaleNotFound(_) | Self::PoseNotDetected)
    }
}

impl From<ScaleDetectError> for MeasureError {
    fn from(err: ScaleDetectError) -> Self {
        Self::ScaleNotFound(ScaleNotFound::Detect(err))
    }
}

impl From<ScaleNotFound> for MeasureError {
    fn from(err: ScaleNotFound) -> Self {
        Self::ScaleNotFound(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_and_terminal_kinds() {
        let err = MeasureError::from(ScaleDetectError::NoContours);
        assert!(err.is_terminal());
        assert!(err
            .to_string()
            .starts_with("could not detect the 15 cm scale automatically ("));

        assert!(MeasureError::PoseNotDetected.is_terminal());
        assert_eq!(
            MeasureError::PoseNotDetected.to_string(),
            "pose landmarks not detected; ensure full body is visible"
        );

        let backend = MeasureError::from(LandmarkError::Backend("model missing".into()));
        assert!(!backend.is_terminal());
    }
}
