//! JSON configuration and report helpers for measurement runs.

use crate::{MeasureError, MeasureParams, MeasurementResult, Measurer};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum MeasureIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Configuration of one measurement run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasureConfig {
    pub image_path: String,
    /// Landmark JSON written by the pose estimator.
    pub landmarks_path: String,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub params: Option<MeasureParams>,
}

impl MeasureConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, MeasureIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), MeasureIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("measure_report.json"))
    }

    pub fn build_params(&self) -> MeasureParams {
        self.params.clone().unwrap_or_default()
    }

    pub fn build_measurer(&self) -> Measurer {
        Measurer::new(self.build_params())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasureReport {
    pub image_path: String,
    pub landmarks_path: String,
    #[serde(default)]
    pub result: Option<MeasurementResult>,
    #[serde(default)]
    pub error: Option<String>,
}

impl MeasureReport {
    pub fn new(image_path: impl Into<String>, landmarks_path: impl Into<String>) -> Self {
        Self {
            image_path: image_path.into(),
            landmarks_path: landmarks_path.into(),
            result: None,
            error: None,
        }
    }

    /// Base report for the inputs named in `cfg`.
    pub fn from_config(cfg: &MeasureConfig) -> Self {
        Self::new(cfg.image_path.clone(), cfg.landmarks_path.clone())
    }

    pub fn set_result(&mut self, result: MeasurementResult) {
        self.result = Some(result);
        self.error = None;
    }

    pub fn set_error(&mut self, err: &MeasureError) {
        self.result = None;
        self.error = Some(err.to_string());
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, MeasureIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), MeasureIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_and_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        fs::write(
            &path,
            r#"{"image_path": "kid.jpg", "landmarks_path": "kid.pose.json",
                "params": {"seed": 4, "head": {"eye_span_scale": 1.5}}}"#,
        )
        .unwrap();

        let cfg = MeasureConfig::load_json(&path).unwrap();
        assert_eq!(cfg.output_path(), PathBuf::from("measure_report.json"));
        let params = cfg.build_params();
        assert_eq!(params.seed, Some(4));
        assert_eq!(params.head.eye_span_scale, 1.5);
        assert_eq!(params.head.shape_factor, 1.08);

        let out = dir.path().join("cfg2.json");
        cfg.write_json(&out).unwrap();
        let again = MeasureConfig::load_json(&out).unwrap();
        assert_eq!(again.landmarks_path, "kid.pose.json");
    }

    #[test]
    fn report_records_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut report = MeasureReport::new("a.png", "a.json");
        report.set_error(&MeasureError::PoseNotDetected);
        let path = dir.path().join("report.json");
        report.write_json(&path).unwrap();

        let loaded = MeasureReport::load_json(&path).unwrap();
        assert!(loaded.result.is_none());
        assert_eq!(
            loaded.error.as_deref(),
            Some("pose landmarks not detected; ensure full body is visible")
        );
    }

    #[test]
    fn missing_config_is_io_error() {
        assert!(matches!(
            MeasureConfig::load_json("/nonexistent/cfg.json"),
            Err(MeasureIoError::Io(_))
        ));
    }
}
