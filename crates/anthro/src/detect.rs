use crate::measure::{LandmarkProvider, MeasureError, MeasureParams, MeasurementResult, Measurer};
use crate::{Calibration, ScaleNotFound};
use anthro_scale::ScaleDetection;
use image::RgbImage;
use std::path::Path;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Decode an encoded image (PNG, JPEG, ...) into RGB.
///
/// Undecodable input is reported as a missing scale: nothing in it can be
/// measured.
pub fn decode_bytes(bytes: &[u8]) -> Result<RgbImage, MeasureError> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgb8())
        .map_err(|e| ScaleNotFound::Unreadable(e.to_string()).into())
}

/// Open and decode an image file into RGB.
pub fn open_rgb(path: impl AsRef<Path>) -> Result<RgbImage, MeasureError> {
    let path = path.as_ref();
    image::open(path)
        .map(|img| img.to_rgb8())
        .map_err(|e| ScaleNotFound::Unreadable(format!("{}: {e}", path.display())).into())
}

/// Measure the subject in the image at `path`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))
)]
pub fn measure_path<P: LandmarkProvider + ?Sized>(
    path: impl AsRef<Path>,
    provider: &P,
    params: MeasureParams,
) -> Result<MeasurementResult, MeasureError> {
    let image = open_rgb(path)?;
    Measurer::new(params).measure(&image, provider)
}

/// Measure the subject in an encoded image buffer.
pub fn measure_bytes<P: LandmarkProvider + ?Sized>(
    bytes: &[u8],
    provider: &P,
    params: MeasureParams,
) -> Result<MeasurementResult, MeasureError> {
    let image = decode_bytes(bytes)?;
    Measurer::new(params).measure(&image, provider)
}

/// Calibration only: detect the reference scale in the image at `path`.
pub fn calibrate_path(
    path: impl AsRef<Path>,
    params: MeasureParams,
) -> Result<(Calibration, ScaleDetection), MeasureError> {
    let image = open_rgb(path)?;
    Measurer::new(params).calibrate(&image)
}
