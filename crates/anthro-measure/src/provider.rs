//! Landmark providers.
//!
//! Pose estimation runs outside this crate. A provider hands the pipeline the
//! landmark set for one image, or `None` when no subject was found.

use std::fs;
use std::path::{Path, PathBuf};

use anthro_core::{LandmarkError, LandmarkSet};
use image::RgbImage;

/// Source of body landmarks for an image.
pub trait LandmarkProvider {
    /// Return the landmarks of the single subject in `image`.
    ///
    /// `Ok(None)` means the estimator ran and found nobody; `Err` means the
    /// estimator itself could not run.
    fn detect(&self, image: &RgbImage) -> Result<Option<LandmarkSet>, LandmarkError>;
}

impl<T: LandmarkProvider + ?Sized> LandmarkProvider for &T {
    fn detect(&self, image: &RgbImage) -> Result<Option<LandmarkSet>, LandmarkError> {
        (**self).detect(image)
    }
}

impl<T: LandmarkProvider + ?Sized> LandmarkProvider for Box<T> {
    fn detect(&self, image: &RgbImage) -> Result<Option<LandmarkSet>, LandmarkError> {
        (**self).detect(image)
    }
}

/// Provider returning a precomputed landmark set regardless of the image.
#[derive(Clone, Debug, Default)]
pub struct StaticLandmarks {
    landmarks: Option<LandmarkSet>,
}

impl StaticLandmarks {
    pub fn new(landmarks: LandmarkSet) -> Self {
        Self {
            landmarks: Some(landmarks),
        }
    }

    /// Provider that never finds a subject.
    pub fn empty() -> Self {
        Self { landmarks: None }
    }
}

impl LandmarkProvider for StaticLandmarks {
    fn detect(&self, _image: &RgbImage) -> Result<Option<LandmarkSet>, LandmarkError> {
        Ok(self.landmarks.clone())
    }
}

/// Provider reading the JSON written by an external pose estimator.
///
/// See [`LandmarkSet::from_json_str`] for the accepted shapes.
#[derive(Clone, Debug)]
pub struct JsonLandmarkFile {
    path: PathBuf,
}

impl JsonLandmarkFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LandmarkProvider for JsonLandmarkFile {
    fn detect(&self, _image: &RgbImage) -> Result<Option<LandmarkSet>, LandmarkError> {
        let raw = fs::read_to_string(&self.path)?;
        LandmarkSet::from_json_str(&raw)
    }
}
