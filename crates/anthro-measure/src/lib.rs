//! Anthropometric measurements from a single calibrated photograph.
//!
//! [`Measurer`] runs the whole pipeline: it calibrates pixels-per-centimeter
//! from the reference scale, asks a [`LandmarkProvider`] for the subject's
//! body landmarks, and turns landmark geometry into standing height, head
//! circumference and wrist circumference. The wrist is measured in the image
//! when possible and otherwise estimated from the forearm or, as a last
//! resort, drawn from the typical child range.
//!
//! ```no_run
//! use anthro_measure::{JsonLandmarkFile, Measurer};
//!
//! let image = image::open("child.jpg").unwrap().to_rgb8();
//! let provider = JsonLandmarkFile::new("child.pose.json");
//! let result = Measurer::default().measure(&image, &provider).unwrap();
//! println!("{:.1} cm", result.height_cm);
//! ```

pub mod anthropometry;
pub mod fallback;
pub mod geometry;
pub mod head;
pub mod io;
mod measure;
mod provider;
pub mod wrist;

pub use fallback::{ForearmAttempt, ForearmFallbackParams, WristFallback};
pub use geometry::HeadTopParams;
pub use head::{HeadEstimate, HeadMethod, HeadParams};
pub use io::{MeasureConfig, MeasureIoError, MeasureReport};
pub use measure::{MeasureError, MeasureParams, MeasurementResult, Measurer, ScaleNotFound, WristSource};
pub use provider::{JsonLandmarkFile, LandmarkProvider, StaticLandmarks};
pub use wrist::{WristEstimate, WristEstimator, WristParams, WristSideOutcome, WristSideReport};

pub use anthro_scale::{ScaleDetectError, ScaleDetection, ScaleDetector, ScaleDetectorParams};
