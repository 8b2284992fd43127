//! Flat per-frame records and the sinks that persist them.
//!
//! Every column is present on every row: metrics of a region that was not
//! valid this frame are written as empty (CSV) or `null` (JSON), never
//! omitted, so the schema does not vary between rows.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use gesture_core::{Error, FrameLandmarks, RegionName, Result, SessionId};
use serde::{Deserialize, Serialize};

use crate::arm::{AngleTier, ArmFeatures};
use crate::fusion::{EmotionState, FusionRegion, FusionResult};
use crate::hand::HandFeatures;
use crate::scorer::{RegionResult, NEUTRAL_SCORE};
use crate::shoulder::ShoulderFeatures;
use crate::upper_body::{UpperBodyFeatures, UpperBodyScores};

/// One processed frame, flattened for logging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub frame_index: u64,
    /// Nanoseconds since the Unix epoch
    pub timestamp: i64,
    pub timestamp_iso: String,
    pub session_id: String,

    pub left_hand_valid: bool,
    pub left_hand_score: f64,
    pub left_hand_jitter: Option<f64>,
    pub left_hand_closure: Option<f64>,
    pub left_hand_spread: Option<f64>,
    pub left_hand_is_fist: Option<bool>,

    pub right_hand_valid: bool,
    pub right_hand_score: f64,
    pub right_hand_jitter: Option<f64>,
    pub right_hand_closure: Option<f64>,
    pub right_hand_spread: Option<f64>,
    pub right_hand_is_fist: Option<bool>,

    pub shoulder_valid: bool,
    pub shoulder_score: f64,
    pub shoulder_calibrated: bool,
    pub shoulder_calibration_frames: u32,
    pub shoulder_jitter: Option<f64>,
    pub shoulder_elevation: Option<f64>,
    pub shoulder_shrug_level: Option<f64>,
    pub shoulder_height_diff: Option<f64>,
    pub shoulder_is_shrugging: Option<bool>,

    pub left_arm_valid: bool,
    pub left_arm_score: f64,
    pub left_arm_jitter: Option<f64>,
    pub left_arm_angle: Option<f64>,
    pub left_arm_tier: Option<AngleTier>,

    pub right_arm_valid: bool,
    pub right_arm_score: f64,
    pub right_arm_jitter: Option<f64>,
    pub right_arm_angle: Option<f64>,
    pub right_arm_tier: Option<AngleTier>,

    pub upper_body_valid: bool,
    pub upper_body_score: f64,
    pub upper_body_jitter: Option<f64>,
    pub head_roll: Option<f64>,
    pub head_pitch: Option<f64>,
    pub torso_lean: Option<f64>,
    pub head_score: Option<f64>,
    pub torso_score: Option<f64>,

    pub fusion_valid: bool,
    pub overall_score: f64,
    pub emotion_state: EmotionState,
    pub feedback: String,
    pub used_features: String,
    pub main_factor: Option<FusionRegion>,

    /// Regions whose landmarks were malformed this frame, `;`-separated
    pub rejected_regions: String,
}

impl FrameRecord {
    /// Row with every region invalid and the given fusion outcome
    pub fn new(frame: &FrameLandmarks, session_id: SessionId, fusion: &FusionResult) -> Self {
        Self {
            frame_index: frame.frame_index,
            timestamp: frame.timestamp.as_nanos(),
            timestamp_iso: frame.timestamp.to_datetime().to_rfc3339(),
            session_id: session_id.to_string(),

            left_hand_valid: false,
            left_hand_score: NEUTRAL_SCORE,
            left_hand_jitter: None,
            left_hand_closure: None,
            left_hand_spread: None,
            left_hand_is_fist: None,

            right_hand_valid: false,
            right_hand_score: NEUTRAL_SCORE,
            right_hand_jitter: None,
            right_hand_closure: None,
            right_hand_spread: None,
            right_hand_is_fist: None,

            shoulder_valid: false,
            shoulder_score: NEUTRAL_SCORE,
            shoulder_calibrated: false,
            shoulder_calibration_frames: 0,
            shoulder_jitter: None,
            shoulder_elevation: None,
            shoulder_shrug_level: None,
            shoulder_height_diff: None,
            shoulder_is_shrugging: None,

            left_arm_valid: false,
            left_arm_score: NEUTRAL_SCORE,
            left_arm_jitter: None,
            left_arm_angle: None,
            left_arm_tier: None,

            right_arm_valid: false,
            right_arm_score: NEUTRAL_SCORE,
            right_arm_jitter: None,
            right_arm_angle: None,
            right_arm_tier: None,

            upper_body_valid: false,
            upper_body_score: NEUTRAL_SCORE,
            upper_body_jitter: None,
            head_roll: None,
            head_pitch: None,
            torso_lean: None,
            head_score: None,
            torso_score: None,

            fusion_valid: fusion.valid,
            overall_score: fusion.overall_score,
            emotion_state: fusion.emotion_state,
            feedback: fusion.feedback.clone(),
            used_features: fusion.used_features(),
            main_factor: fusion.main_factor,

            rejected_regions: String::new(),
        }
    }

    pub fn set_hand(&mut self, result: &RegionResult<HandFeatures>) {
        let features = valid_features(result);
        let columns = (
            result.valid,
            result.score,
            valid_jitter(result),
            features.map(|f| f.closure),
            features.map(|f| f.spread),
            features.map(|f| f.is_fist),
        );
        match result.region {
            RegionName::RightHand => {
                (
                    self.right_hand_valid,
                    self.right_hand_score,
                    self.right_hand_jitter,
                    self.right_hand_closure,
                    self.right_hand_spread,
                    self.right_hand_is_fist,
                ) = columns
            }
            _ => {
                (
                    self.left_hand_valid,
                    self.left_hand_score,
                    self.left_hand_jitter,
                    self.left_hand_closure,
                    self.left_hand_spread,
                    self.left_hand_is_fist,
                ) = columns
            }
        }
    }

    pub fn set_shoulder(
        &mut self,
        result: &RegionResult<ShoulderFeatures>,
        calibrated: bool,
        calibration_frames: u32,
    ) {
        let features = valid_features(result);
        self.shoulder_valid = result.valid;
        self.shoulder_score = result.score;
        self.shoulder_calibrated = calibrated;
        self.shoulder_calibration_frames = calibration_frames;
        self.shoulder_jitter = valid_jitter(result);
        self.shoulder_elevation = features.map(|f| f.elevation);
        self.shoulder_shrug_level = features.map(|f| f.shrug_level);
        self.shoulder_height_diff = features.map(|f| f.height_diff);
        self.shoulder_is_shrugging = features.map(|f| f.is_shrugging);
    }

    pub fn set_arm(&mut self, result: &RegionResult<ArmFeatures>) {
        let features = valid_features(result);
        let columns = (
            result.valid,
            result.score,
            valid_jitter(result),
            features.map(|f| f.angle),
            features.map(|f| f.tier),
        );
        match result.region {
            RegionName::RightArm => {
                (
                    self.right_arm_valid,
                    self.right_arm_score,
                    self.right_arm_jitter,
                    self.right_arm_angle,
                    self.right_arm_tier,
                ) = columns
            }
            _ => {
                (
                    self.left_arm_valid,
                    self.left_arm_score,
                    self.left_arm_jitter,
                    self.left_arm_angle,
                    self.left_arm_tier,
                ) = columns
            }
        }
    }

    pub fn set_upper_body(
        &mut self,
        result: &RegionResult<UpperBodyFeatures>,
        scores: Option<UpperBodyScores>,
    ) {
        let features = valid_features(result);
        self.upper_body_valid = result.valid;
        self.upper_body_score = result.score;
        self.upper_body_jitter = valid_jitter(result);
        self.head_roll = features.map(|f| f.head_roll);
        self.head_pitch = features.map(|f| f.head_pitch);
        self.torso_lean = features.map(|f| f.torso_lean);
        self.head_score = scores.map(|s| s.head);
        self.torso_score = scores.map(|s| s.torso);
    }

    pub fn set_rejected(&mut self, regions: &[RegionName]) {
        self.rejected_regions = regions
            .iter()
            .map(RegionName::as_str)
            .collect::<Vec<_>>()
            .join(";");
    }
}

fn valid_features<F: Copy>(result: &RegionResult<F>) -> Option<F> {
    if result.valid {
        result.features
    } else {
        None
    }
}

fn valid_jitter<F>(result: &RegionResult<F>) -> Option<f64> {
    if result.valid {
        result.jitter
    } else {
        None
    }
}

/// Destination for processed frame records
pub trait RecordSink {
    fn write(&mut self, record: &FrameRecord) -> Result<()>;

    fn flush(&mut self) -> Result<()>;
}

/// CSV rows with a header line written before the first record
pub struct CsvRecordSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvRecordSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(inner),
        }
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))
    }
}

impl CsvRecordSink<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> RecordSink for CsvRecordSink<W> {
    fn write(&mut self, record: &FrameRecord) -> Result<()> {
        self.writer.serialize(record).map_err(csv_error)
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

fn csv_error(e: csv::Error) -> Error {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => Error::Io(io),
        other => Error::Serialization(format!("CSV error: {other:?}")),
    }
}

/// One JSON object per line
pub struct JsonLinesRecordSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesRecordSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonLinesRecordSink<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> RecordSink for JsonLinesRecordSink<W> {
    fn write(&mut self, record: &FrameRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
