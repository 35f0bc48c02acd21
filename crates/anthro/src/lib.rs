//! High-level facade crate for the `anthro-*` workspace.
//!
//! This crate provides:
//! - stable, convenient re-exports of the underlying crates
//! - (feature-gated) end-to-end helpers that decode a photograph from a path
//!   or an encoded buffer and run the measurement pipeline on it
//! - (feature-gated) the request/response contract of the prediction service
//!
//! ## Quickstart
//!
//! ```no_run
//! use anthro::detect;
//! use anthro::{JsonLandmarkFile, MeasureParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = JsonLandmarkFile::new("child.pose.json");
//! let res = detect::measure_path("child.jpg", &provider, MeasureParams::default())?;
//! println!("height: {:.1} cm", res.height_cm);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `anthro::core`: landmarks, calibration, geometry and image primitives.
//! - `anthro::scale`: reference-scale detection.
//! - `anthro::measure`: geometry extractors, wrist estimator, fallbacks and
//!   the [`Measurer`] pipeline.
//! - `anthro::detect` (feature `image`): helpers from image files and bytes.
//! - `anthro::service` (feature `image`): prediction request/response shaping.

pub use anthro_core as core;
pub use anthro_measure as measure;
pub use anthro_scale as scale;

pub use anthro_core::{
    BodyPoint, Calibration, DiagnosticEvent, DiagnosticLevel, Landmark, LandmarkSet, Side, Stage,
};
pub use anthro_measure::{
    JsonLandmarkFile, LandmarkProvider, MeasureConfig, MeasureError, MeasureParams, MeasureReport,
    MeasurementResult, Measurer, ScaleNotFound, StaticLandmarks, WristSource,
};

#[cfg(feature = "image")]
pub mod detect;

#[cfg(feature = "image")]
pub mod service;
