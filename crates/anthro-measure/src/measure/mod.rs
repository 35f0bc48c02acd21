//! Measurement orchestration.
//!
//! This module wires together scale calibration, landmark detection, height
//! and head geometry, and the two-level wrist estimate into one result.

mod error;
mod params;
mod pipeline;
mod result;

pub use error::{MeasureError, ScaleNotFound};
pub use params::MeasureParams;
pub use pipeline::Measurer;
pub use result::{MeasurementResult, WristSource};
