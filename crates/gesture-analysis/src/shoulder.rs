//! Shoulder region: baseline auto-calibration and shrug detection.
//!
//! The analyzer first learns where the shoulders rest, then measures how
//! far they rise above that resting line. Calibration is an explicit
//! state machine:
//!
//! ```text
//! Uncalibrated --first frame--> Calibrating --N frames--> Calibrated
//! ```
//!
//! `Calibrated` is terminal until [`WindowedScorer::reset`]. Once there,
//! the baseline keeps following slow postural drift on frames that are
//! not shrugs.

use gesture_core::{LandmarkSet, Position3D, RegionName, Result, ShoulderKeypoint};
use serde::{Deserialize, Serialize};

use crate::config::ShoulderConfig;
use crate::scorer::{RegionModel, ScoreTerms, WindowedScorer};

pub type ShoulderAnalyzer = WindowedScorer<ShoulderModel>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShoulderSample {
    pub left: Position3D,
    pub right: Position3D,
}

/// Smoothed resting position of both shoulders
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShoulderBaseline {
    pub left: Position3D,
    pub right: Position3D,
}

impl ShoulderBaseline {
    fn seed(sample: &ShoulderSample) -> Self {
        Self {
            left: sample.left,
            right: sample.right,
        }
    }

    /// `self = alpha * self + (1 - alpha) * sample`
    fn blend(&mut self, alpha: f64, sample: &ShoulderSample) {
        self.left = smooth(&self.left, &sample.left, alpha);
        self.right = smooth(&self.right, &sample.right, alpha);
    }
}

fn smooth(current: &Position3D, target: &Position3D, alpha: f64) -> Position3D {
    Position3D::new(
        alpha * current.x + (1.0 - alpha) * target.x,
        alpha * current.y + (1.0 - alpha) * target.y,
        alpha * current.z + (1.0 - alpha) * target.z,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CalibrationState {
    #[default]
    Uncalibrated,
    Calibrating {
        baseline: ShoulderBaseline,
        frames: u32,
    },
    Calibrated {
        baseline: ShoulderBaseline,
    },
}

impl CalibrationState {
    pub fn baseline(&self) -> Option<&ShoulderBaseline> {
        match self {
            Self::Uncalibrated => None,
            Self::Calibrating { baseline, .. } | Self::Calibrated { baseline } => Some(baseline),
        }
    }

    pub fn is_calibrated(&self) -> bool {
        matches!(self, Self::Calibrated { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShoulderFeatures {
    /// Largest rise of either shoulder above its baseline (positive = raised)
    pub elevation: f64,
    /// Elevation scaled into [0, 1] by `max_shrug_diff`
    pub shrug_level: f64,
    /// |left y - right y|
    pub height_diff: f64,
    pub is_shrugging: bool,
    pub calibrated: bool,
}

#[derive(Debug, Clone)]
pub struct ShoulderModel {
    config: ShoulderConfig,
    state: CalibrationState,
}

impl ShoulderModel {
    pub fn new(config: ShoulderConfig) -> Self {
        Self {
            config,
            state: CalibrationState::Uncalibrated,
        }
    }

    pub fn state(&self) -> &CalibrationState {
        &self.state
    }

    pub fn is_calibrated(&self) -> bool {
        self.state.is_calibrated()
    }

    /// Frames folded into the baseline so far; saturates at the target
    pub fn calibration_frames(&self) -> u32 {
        match self.state {
            CalibrationState::Uncalibrated => 0,
            CalibrationState::Calibrating { frames, .. } => frames,
            CalibrationState::Calibrated { .. } => self.config.baseline_frames_needed,
        }
    }

    fn measure(&self, sample: &ShoulderSample, baseline: &ShoulderBaseline) -> ShoulderFeatures {
        let cfg = &self.config;
        // y grows downward, so a raised shoulder has a smaller y
        let elevation = (baseline.left.y - sample.left.y).max(baseline.right.y - sample.right.y);
        let height_diff = (sample.left.y - sample.right.y).abs();
        let is_shrugging = elevation > cfg.shrug_threshold || height_diff > cfg.max_shrug_diff;

        ShoulderFeatures {
            elevation,
            shrug_level: elevation.clamp(0.0, cfg.max_shrug_diff) / cfg.max_shrug_diff,
            height_diff,
            is_shrugging,
            calibrated: self.state.is_calibrated(),
        }
    }

    /// Advance the calibration machine with one sample
    fn advance(&mut self, sample: &ShoulderSample, is_shrugging: bool) {
        let needed = self.config.baseline_frames_needed;

        self.state = match self.state {
            CalibrationState::Uncalibrated => CalibrationState::Calibrating {
                baseline: ShoulderBaseline::seed(sample),
                frames: 1,
            },
            CalibrationState::Calibrating {
                mut baseline,
                frames,
            } => {
                baseline.blend(self.config.baseline_smoothing, sample);
                CalibrationState::Calibrating {
                    baseline,
                    frames: frames + 1,
                }
            }
            CalibrationState::Calibrated { mut baseline } => {
                if !is_shrugging {
                    baseline.blend(self.config.drift_smoothing, sample);
                }
                CalibrationState::Calibrated { baseline }
            }
        };

        if let CalibrationState::Calibrating { baseline, frames } = self.state {
            if frames >= needed {
                tracing::info!(
                    frames,
                    left_y = baseline.left.y,
                    right_y = baseline.right.y,
                    "Shoulder baseline calibrated"
                );
                self.state = CalibrationState::Calibrated { baseline };
            }
        }
    }
}

impl RegionModel for ShoulderModel {
    type Sample = ShoulderSample;
    type Features = ShoulderFeatures;
    const CHANNELS: usize = 2;

    fn region(&self) -> RegionName {
        RegionName::Shoulders
    }

    fn history_length(&self) -> usize {
        self.config.history_length
    }

    fn extract(&mut self, landmarks: &LandmarkSet) -> Result<(ShoulderSample, ShoulderFeatures)> {
        landmarks.validate(RegionName::Shoulders)?;

        let sample = ShoulderSample {
            left: landmarks.position(ShoulderKeypoint::Left),
            right: landmarks.position(ShoulderKeypoint::Right),
        };

        // Measured against the baseline as it stood before this frame
        let baseline = self
            .state
            .baseline()
            .copied()
            .unwrap_or_else(|| ShoulderBaseline::seed(&sample));
        let mut features = self.measure(&sample, &baseline);

        self.advance(&sample, features.is_shrugging);
        features.calibrated = self.state.is_calibrated();

        Ok((sample, features))
    }

    fn channel(sample: &ShoulderSample, index: usize) -> Position3D {
        if index == 0 {
            sample.left
        } else {
            sample.right
        }
    }

    fn raw_score(&self, features: &ShoulderFeatures, channel_jitter: &[f64]) -> f64 {
        let cfg = &self.config;
        let jitter = channel_jitter.iter().sum::<f64>() / channel_jitter.len().max(1) as f64;
        let mut terms = ScoreTerms::new(cfg.base_score, jitter, cfg.jitter_multiplier);
        if features.is_shrugging {
            terms = terms.with_penalty(cfg.shrug_penalty);
        }
        terms.total()
    }

    fn is_ready(&self) -> bool {
        self.state.is_calibrated()
    }

    fn reset(&mut self) {
        self.state = CalibrationState::Uncalibrated;
    }
}

impl WindowedScorer<ShoulderModel> {
    pub fn from_config(config: &ShoulderConfig) -> Self {
        WindowedScorer::new(ShoulderModel::new(config.clone()))
    }

    pub fn is_calibrated(&self) -> bool {
        self.model().is_calibrated()
    }

    pub fn calibration_frames(&self) -> u32 {
        self.model().calibration_frames()
    }
}
