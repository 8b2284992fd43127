//! Fundamental types for the gesture analysis system.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Identifier for one assessment session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Timestamp wrapper with nanosecond precision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_nanos_opt().unwrap_or(0))
    }

    pub fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    pub fn from_millis(millis: i64) -> Self {
        Self(millis.saturating_mul(1_000_000))
    }

    pub fn as_nanos(&self) -> i64 {
        self.0
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / 1_000_000_000.0
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.0)
    }
}

/// 3D position in normalized image coordinates (y grows downward)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn origin() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn to_nalgebra(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }

    pub fn from_nalgebra(p: Point3<f64>) -> Self {
        Self::new(p.x, p.y, p.z)
    }

    /// Vector pointing from `self` to `other`
    pub fn vector_to(&self, other: &Self) -> Vector3<f64> {
        other.to_nalgebra() - self.to_nalgebra()
    }

    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// One keypoint as produced by the upstream perception model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            visibility: None,
        }
    }

    pub fn with_visibility(mut self, visibility: f64) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn position(&self) -> Position3D {
        Position3D::new(self.x, self.y, self.z)
    }
}

impl From<Position3D> for Landmark {
    fn from(p: Position3D) -> Self {
        Self::new(p.x, p.y, p.z)
    }
}

/// Fixed ordering of the points inside one region's landmark set
pub trait KeypointLayout: Copy {
    const COUNT: usize;

    fn index(self) -> usize;
}

/// 21-point hand layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum HandKeypoint {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexMcp = 5,
    IndexPip = 6,
    IndexDip = 7,
    IndexTip = 8,
    MiddleMcp = 9,
    MiddlePip = 10,
    MiddleDip = 11,
    MiddleTip = 12,
    RingMcp = 13,
    RingPip = 14,
    RingDip = 15,
    RingTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

impl HandKeypoint {
    /// Tips of the four non-thumb fingers
    pub const FINGER_TIPS: [HandKeypoint; 4] = [
        HandKeypoint::IndexTip,
        HandKeypoint::MiddleTip,
        HandKeypoint::RingTip,
        HandKeypoint::PinkyTip,
    ];

    /// All five tips, thumb first, in lateral order
    pub const ALL_TIPS: [HandKeypoint; 5] = [
        HandKeypoint::ThumbTip,
        HandKeypoint::IndexTip,
        HandKeypoint::MiddleTip,
        HandKeypoint::RingTip,
        HandKeypoint::PinkyTip,
    ];

    /// Wrist plus the four finger knuckles
    pub const PALM: [HandKeypoint; 5] = [
        HandKeypoint::Wrist,
        HandKeypoint::IndexMcp,
        HandKeypoint::MiddleMcp,
        HandKeypoint::RingMcp,
        HandKeypoint::PinkyMcp,
    ];
}

impl KeypointLayout for HandKeypoint {
    const COUNT: usize = 21;

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ShoulderKeypoint {
    Left = 0,
    Right = 1,
}

impl KeypointLayout for ShoulderKeypoint {
    const COUNT: usize = 2;

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ArmKeypoint {
    Shoulder = 0,
    Elbow = 1,
    Wrist = 2,
}

impl KeypointLayout for ArmKeypoint {
    const COUNT: usize = 3;

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum UpperBodyKeypoint {
    Nose = 0,
    LeftEar = 1,
    RightEar = 2,
    LeftShoulder = 3,
    RightShoulder = 4,
    LeftHip = 5,
    RightHip = 6,
}

impl KeypointLayout for UpperBodyKeypoint {
    const COUNT: usize = 7;

    fn index(self) -> usize {
        self as usize
    }
}

/// Body regions delivered by the perception layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionName {
    LeftHand,
    RightHand,
    Shoulders,
    LeftArm,
    RightArm,
    UpperBody,
}

impl RegionName {
    pub const ALL: [RegionName; 6] = [
        RegionName::LeftHand,
        RegionName::RightHand,
        RegionName::Shoulders,
        RegionName::LeftArm,
        RegionName::RightArm,
        RegionName::UpperBody,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegionName::LeftHand => "left_hand",
            RegionName::RightHand => "right_hand",
            RegionName::Shoulders => "shoulders",
            RegionName::LeftArm => "left_arm",
            RegionName::RightArm => "right_arm",
            RegionName::UpperBody => "upper_body",
        }
    }

    /// Number of points a well-formed landmark set for this region carries
    pub fn expected_points(&self) -> usize {
        match self {
            RegionName::LeftHand | RegionName::RightHand => HandKeypoint::COUNT,
            RegionName::Shoulders => ShoulderKeypoint::COUNT,
            RegionName::LeftArm | RegionName::RightArm => ArmKeypoint::COUNT,
            RegionName::UpperBody => UpperBodyKeypoint::COUNT,
        }
    }
}

impl fmt::Display for RegionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered landmarks for one region in one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    pub points: Vec<Landmark>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    pub fn from_positions(positions: &[Position3D]) -> Self {
        Self::new(positions.iter().copied().map(Landmark::from).collect())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Check point count and coordinate finiteness for `region`
    pub fn validate(&self, region: RegionName) -> Result<()> {
        let expected = region.expected_points();
        if self.points.len() != expected {
            return Err(Error::PointCount {
                region,
                expected,
                actual: self.points.len(),
            });
        }

        match self
            .points
            .iter()
            .position(|p| !p.position().is_finite())
        {
            Some(index) => Err(Error::NonFinite { region, index }),
            None => Ok(()),
        }
    }

    /// Position of a keypoint. The set must have been validated against
    /// the layout's region first.
    pub fn position<K: KeypointLayout>(&self, keypoint: K) -> Position3D {
        self.points[keypoint.index()].position()
    }
}

/// Per-region payload for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionInput {
    Detected(LandmarkSet),
    NotDetected,
}

impl RegionInput {
    pub fn landmarks(&self) -> Option<&LandmarkSet> {
        match self {
            RegionInput::Detected(set) => Some(set),
            RegionInput::NotDetected => None,
        }
    }
}

/// Everything the perception layer produced for one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameLandmarks {
    pub frame_index: u64,
    #[serde(default)]
    pub timestamp: Timestamp,
    #[serde(default)]
    pub regions: BTreeMap<RegionName, RegionInput>,
}

impl FrameLandmarks {
    pub fn new(frame_index: u64, timestamp: Timestamp) -> Self {
        Self {
            frame_index,
            timestamp,
            regions: BTreeMap::new(),
        }
    }

    pub fn with_region(mut self, region: RegionName, landmarks: LandmarkSet) -> Self {
        self.regions.insert(region, RegionInput::Detected(landmarks));
        self
    }

    pub fn without_region(mut self, region: RegionName) -> Self {
        self.regions.insert(region, RegionInput::NotDetected);
        self
    }

    /// Landmarks for `region`; missing entries count as not detected
    pub fn landmarks(&self, region: RegionName) -> Option<&LandmarkSet> {
        self.regions.get(&region).and_then(RegionInput::landmarks)
    }
}
