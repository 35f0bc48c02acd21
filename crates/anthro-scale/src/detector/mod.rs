//! Ruler detection pipeline.

mod error;
mod params;
mod pipeline;
mod result;

pub use error::ScaleDetectError;
pub use params::ScaleDetectorParams;
pub use pipeline::ScaleDetector;
pub use result::ScaleDetection;
