//! Named body landmarks as produced by an external pose estimator.
//!
//! Coordinates are normalized to the frame (`x`, `y` in `[0, 1]`, origin at
//! the top-left corner, `y` growing downward) regardless of how the subject
//! is oriented.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Errors produced while building a [`LandmarkSet`] from external data.
#[derive(thiserror::Error, Debug)]
pub enum LandmarkError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("landmark `{0}` is missing")]
    MissingPoint(BodyPoint),
    #[error("landmark `{0}` has non-finite coordinates")]
    NonFinite(BodyPoint),
    #[error("expected {expected} indexed landmarks, got {got}")]
    IndexedLength { expected: usize, got: usize },
    #[error("pose backend failed: {0}")]
    Backend(String),
}

/// Body points consumed by the measurement pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(usize)]
pub enum BodyPoint {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftAnkle = 11,
    RightAnkle = 12,
    LeftHeel = 13,
    RightHeel = 14,
    LeftFootIndex = 15,
    RightFootIndex = 16,
}

impl BodyPoint {
    pub const COUNT: usize = 17;

    pub const ALL: [BodyPoint; BodyPoint::COUNT] = [
        BodyPoint::Nose,
        BodyPoint::LeftEye,
        BodyPoint::RightEye,
        BodyPoint::LeftEar,
        BodyPoint::RightEar,
        BodyPoint::LeftShoulder,
        BodyPoint::RightShoulder,
        BodyPoint::LeftElbow,
        BodyPoint::RightElbow,
        BodyPoint::LeftWrist,
        BodyPoint::RightWrist,
        BodyPoint::LeftAnkle,
        BodyPoint::RightAnkle,
        BodyPoint::LeftHeel,
        BodyPoint::RightHeel,
        BodyPoint::LeftFootIndex,
        BodyPoint::RightFootIndex,
    ];

    /// Face points used to locate the top of the head.
    pub const FACE: [BodyPoint; 5] = [
        BodyPoint::LeftEye,
        BodyPoint::RightEye,
        BodyPoint::Nose,
        BodyPoint::LeftEar,
        BodyPoint::RightEar,
    ];

    /// Foot points used to locate the floor contact line.
    pub const FEET: [BodyPoint; 6] = [
        BodyPoint::LeftAnkle,
        BodyPoint::RightAnkle,
        BodyPoint::LeftHeel,
        BodyPoint::RightHeel,
        BodyPoint::LeftFootIndex,
        BodyPoint::RightFootIndex,
    ];

    /// Number of points in a full MediaPipe Pose landmark list.
    pub const MEDIAPIPE_COUNT: usize = 33;

    /// Index of this point in the MediaPipe Pose 33-landmark topology.
    pub fn mediapipe_index(self) -> usize {
        match self {
            BodyPoint::Nose => 0,
            BodyPoint::LeftEye => 2,
            BodyPoint::RightEye => 5,
            BodyPoint::LeftEar => 7,
            BodyPoint::RightEar => 8,
            BodyPoint::LeftShoulder => 11,
            BodyPoint::RightShoulder => 12,
            BodyPoint::LeftElbow => 13,
            BodyPoint::RightElbow => 14,
            BodyPoint::LeftWrist => 15,
            BodyPoint::RightWrist => 16,
            BodyPoint::LeftAnkle => 27,
            BodyPoint::RightAnkle => 28,
            BodyPoint::LeftHeel => 29,
            BodyPoint::RightHeel => 30,
            BodyPoint::LeftFootIndex => 31,
            BodyPoint::RightFootIndex => 32,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BodyPoint::Nose => "nose",
            BodyPoint::LeftEye => "left_eye",
            BodyPoint::RightEye => "right_eye",
            BodyPoint::LeftEar => "left_ear",
            BodyPoint::RightEar => "right_ear",
            BodyPoint::LeftShoulder => "left_shoulder",
            BodyPoint::RightShoulder => "right_shoulder",
            BodyPoint::LeftElbow => "left_elbow",
            BodyPoint::RightElbow => "right_elbow",
            BodyPoint::LeftWrist => "left_wrist",
            BodyPoint::RightWrist => "right_wrist",
            BodyPoint::LeftAnkle => "left_ankle",
            BodyPoint::RightAnkle => "right_ankle",
            BodyPoint::LeftHeel => "left_heel",
            BodyPoint::RightHeel => "right_heel",
            BodyPoint::LeftFootIndex => "left_foot_index",
            BodyPoint::RightFootIndex => "right_foot_index",
        }
    }
}

impl fmt::Display for BodyPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BodyPoint {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BodyPoint::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

/// Body side, used for per-arm and per-wrist processing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Processing order: left first.
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn shoulder(self) -> BodyPoint {
        match self {
            Side::Left => BodyPoint::LeftShoulder,
            Side::Right => BodyPoint::RightShoulder,
        }
    }

    pub fn elbow(self) -> BodyPoint {
        match self {
            Side::Left => BodyPoint::LeftElbow,
            Side::Right => BodyPoint::RightElbow,
        }
    }

    pub fn wrist(self) -> BodyPoint {
        match self {
            Side::Left => BodyPoint::LeftWrist,
            Side::Right => BodyPoint::RightWrist,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Left => "left",
            Side::Right => "right",
        })
    }
}

/// One normalized landmark with its confidence.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    /// Confidence in `[0, 1]`; `0` marks a point the estimator could not place.
    pub visibility: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self { x, y, visibility }
    }

    /// Pixel position without rounding.
    pub fn to_pixel_f64(&self, width: u32, height: u32) -> Point2<f64> {
        Point2::new(self.x * width as f64, self.y * height as f64)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.visibility.is_finite()
    }
}

impl Default for Landmark {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            visibility: 0.0,
        }
    }
}

/// Complete set of body landmarks for one image.
#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkSet {
    points: [Landmark; BodyPoint::COUNT],
}

impl LandmarkSet {
    pub fn new(points: [Landmark; BodyPoint::COUNT]) -> Self {
        Self { points }
    }

    /// Build a set by evaluating `f` for every body point.
    pub fn from_fn(mut f: impl FnMut(BodyPoint) -> Landmark) -> Self {
        Self {
            points: BodyPoint::ALL.map(&mut f),
        }
    }

    #[inline]
    pub fn get(&self, point: BodyPoint) -> &Landmark {
        &self.points[point as usize]
    }

    /// Replace one point, builder style.
    pub fn with(mut self, point: BodyPoint, landmark: Landmark) -> Self {
        self.points[point as usize] = landmark;
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyPoint, &Landmark)> + '_ {
        BodyPoint::ALL.into_iter().zip(self.points.iter())
    }

    /// Parse the JSON exchange format written by external pose estimators.
    ///
    /// Accepts `null` (no subject), an object keyed by point name, or a
    /// 33-entry MediaPipe-ordered array. Unknown names and extra fields are
    /// ignored.
    pub fn from_json_str(raw: &str) -> Result<Option<Self>, LandmarkError> {
        let doc: Option<LandmarkDocument> = serde_json::from_str(raw)?;
        doc.map(LandmarkDocument::into_set).transpose()
    }

    /// Serialize as the named-object JSON form.
    pub fn to_json_string(&self) -> Result<String, LandmarkError> {
        let named: HashMap<&'static str, Landmark> =
            self.iter().map(|(p, lm)| (p.name(), *lm)).collect();
        Ok(serde_json::to_string_pretty(&named)?)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LandmarkDocument {
    Named(HashMap<String, Landmark>),
    Indexed(Vec<Landmark>),
}

impl LandmarkDocument {
    fn into_set(self) -> Result<LandmarkSet, LandmarkError> {
        let mut points = [None; BodyPoint::COUNT];
        match self {
            LandmarkDocument::Named(map) => {
                for (name, lm) in map {
                    if let Ok(point) = name.parse::<BodyPoint>() {
                        points[point as usize] = Some(lm);
                    }
                }
            }
            LandmarkDocument::Indexed(list) => {
                if list.len() != BodyPoint::MEDIAPIPE_COUNT {
                    return Err(LandmarkError::IndexedLength {
                        expected: BodyPoint::MEDIAPIPE_COUNT,
                        got: list.len(),
                    });
                }
                for point in BodyPoint::ALL {
                    points[point as usize] = Some(list[point.mediapipe_index()]);
                }
            }
        }

        let mut out = [Landmark::default(); BodyPoint::COUNT];
        for point in BodyPoint::ALL {
            let lm = points[point as usize].ok_or(LandmarkError::MissingPoint(point))?;
            if !lm.is_finite() {
                return Err(LandmarkError::NonFinite(point));
            }
            out[point as usize] = lm;
        }
        Ok(LandmarkSet::new(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_point_order_matches_discriminants() {
        for (i, p) in BodyPoint::ALL.iter().enumerate() {
            assert_eq!(*p as usize, i);
        }
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for p in BodyPoint::ALL {
            assert_eq!(p.name().parse::<BodyPoint>(), Ok(p));
        }
        assert!("left_hip".parse::<BodyPoint>().is_err());
    }

    #[test]
    fn null_document_means_no_subject() {
        assert!(LandmarkSet::from_json_str("null").unwrap().is_none());
    }

    #[test]
    fn named_document_requires_every_point() {
        let set = LandmarkSet::from_fn(|p| Landmark::new(0.5, p as usize as f64 / 20.0, 0.9));
        let json = set.to_json_string().unwrap();
        let parsed = LandmarkSet::from_json_str(&json).unwrap().unwrap();
        assert_eq!(parsed, set);

        let err = LandmarkSet::from_json_str(r#"{"nose": {"x": 0.5, "y": 0.1, "visibility": 1.0}}"#)
            .unwrap_err();
        assert!(matches!(err, LandmarkError::MissingPoint(BodyPoint::LeftEye)));
    }

    #[test]
    fn indexed_document_uses_mediapipe_topology() {
        let list: Vec<serde_json::Value> = (0..BodyPoint::MEDIAPIPE_COUNT)
            .map(|i| {
                serde_json::json!({
                    "x": i as f64 / 100.0,
                    "y": 0.5,
                    "z": -0.1,
                    "visibility": 0.8,
                })
            })
            .collect();
        let raw = serde_json::to_string(&list).unwrap();
        let set = LandmarkSet::from_json_str(&raw).unwrap().unwrap();
        assert_eq!(set.get(BodyPoint::LeftWrist).x, 0.15);
        assert_eq!(set.get(BodyPoint::RightFootIndex).x, 0.32);

        let short = serde_json::to_string(&list[..20]).unwrap();
        assert!(matches!(
            LandmarkSet::from_json_str(&short),
            Err(LandmarkError::IndexedLength { expected: 33, got: 20 })
        ));
    }
}
