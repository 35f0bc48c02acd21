use serde::{Deserialize, Serialize};

/// Physical length of the reference scale expected in every photograph.
pub const REFERENCE_LENGTH_CM: f64 = 15.0;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("invalid reference pixel length {0}")]
    InvalidPixelLength(f64),
    #[error("invalid reference physical length {0} cm")]
    InvalidReferenceLength(f64),
}

/// Pixel-to-centimeter conversion for one image.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pixels_per_cm: f64,
}

impl Calibration {
    /// Build a calibration from the detected reference length in pixels.
    pub fn from_reference(pixel_length: f64, reference_cm: f64) -> Result<Self, CalibrationError> {
        if !(reference_cm.is_finite() && reference_cm > 0.0) {
            return Err(CalibrationError::InvalidReferenceLength(reference_cm));
        }
        if !(pixel_length.is_finite() && pixel_length > 0.0) {
            return Err(CalibrationError::InvalidPixelLength(pixel_length));
        }
        Ok(Self {
            pixels_per_cm: pixel_length / reference_cm,
        })
    }

    pub fn from_pixels_per_cm(pixels_per_cm: f64) -> Result<Self, CalibrationError> {
        Self::from_reference(pixels_per_cm, 1.0)
    }

    #[inline]
    pub fn pixels_per_cm(&self) -> f64 {
        self.pixels_per_cm
    }

    #[inline]
    pub fn to_cm(&self, pixels: f64) -> f64 {
        pixels / self.pixels_per_cm
    }

    #[inline]
    pub fn to_px(&self, cm: f64) -> f64 {
        cm * self.pixels_per_cm
    }
}
