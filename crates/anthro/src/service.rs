//! Prediction-service contract.
//!
//! Transport-agnostic: a host HTTP server deserializes a [`PredictRequest`],
//! calls [`predict`] and writes the returned status and JSON body.

use crate::measure::{LandmarkProvider, MeasureError, MeasurementResult, Measurer};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::RgbImage;
use serde::{Deserialize, Serialize};

pub const HEALTH_MESSAGE: &str = "Anthropometry API is running";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Base64 image, optionally as a `data:` URL.
    #[serde(default)]
    pub image: Option<String>,
}

/// Rounded measurements returned to clients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    pub height_cm: f64,
    pub head_circumference_cm: f64,
    pub wrist_circumference_cm: Option<f64>,
    pub wrist_fallback_used: bool,
    pub pixel_per_cm: f64,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let k = 10f64.powi(decimals);
    (value * k).round() / k
}

impl From<&MeasurementResult> for Measurements {
    fn from(r: &MeasurementResult) -> Self {
        Self {
            height_cm: round_to(r.height_cm, 1),
            head_circumference_cm: round_to(r.head_circumference_cm, 1),
            wrist_circumference_cm: r.wrist_circumference_cm.map(|c| round_to(c, 1)),
            wrist_fallback_used: r.wrist_fallback_used,
            pixel_per_cm: round_to(r.pixels_per_cm, 3),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurements: Option<Measurements>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictResponse {
    pub fn ok(measurements: Measurements) -> Self {
        Self {
            success: true,
            measurements: Some(measurements),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            measurements: None,
            error: Some(message.into()),
        }
    }
}

/// Status code plus body of one prediction call.
#[derive(Clone, Debug, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: PredictResponse,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

pub fn health() -> HealthResponse {
    HealthResponse {
        status: "ok".to_string(),
        message: HEALTH_MESSAGE.to_string(),
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    #[error("No image data provided")]
    NoImage,
    #[error("Invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Failed to decode image")]
    Undecodable,
    #[error(transparent)]
    Measure(#[from] MeasureError),
}

impl ServiceError {
    /// Missing or undecodable images and unmeasurable photos are the
    /// client's fault; everything else is a server error.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::NoImage | Self::Undecodable => true,
            Self::Measure(e) => e.is_terminal(),
            Self::Base64(_) => false,
        }
    }

    /// HTTP status: 400 for client errors, 500 otherwise.
    pub fn status(&self) -> u16 {
        if self.is_client_error() {
            400
        } else {
            500
        }
    }

    /// Client-facing error text.
    pub fn message(&self) -> String {
        if self.is_client_error() {
            self.to_string()
        } else {
            format!("Server error: {self}")
        }
    }

    pub fn into_reply(self) -> Reply {
        Reply {
            status: self.status(),
            body: PredictResponse::failure(self.message()),
        }
    }
}

/// Decode the request image, dropping a `data:...;base64,` prefix.
pub fn decode_image(encoded: &str) -> Result<RgbImage, ServiceError> {
    let payload = encoded.split_once(',').map_or(encoded, |(_, data)| data);
    let bytes = STANDARD.decode(payload.trim())?;
    image::load_from_memory(&bytes)
        .map(|img| img.to_rgb8())
        .map_err(|_| ServiceError::Undecodable)
}

fn run<P: LandmarkProvider + ?Sized>(
    request: &PredictRequest,
    measurer: &Measurer,
    provider: &P,
) -> Result<Measurements, ServiceError> {
    let encoded = request
        .image
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(ServiceError::NoImage)?;
    let image = decode_image(encoded)?;
    let result = measurer.measure(&image, provider)?;
    Ok(Measurements::from(&result))
}

/// Handle one prediction request.
pub fn predict<P: LandmarkProvider + ?Sized>(
    request: &PredictRequest,
    measurer: &Measurer,
    provider: &P,
) -> Reply {
    match run(request, measurer, provider) {
        Ok(m) => Reply {
            status: 200,
            body: PredictResponse::ok(m),
        },
        Err(e) => {
            log::warn!("prediction failed: {e}");
            e.into_reply()
        }
    }
}
