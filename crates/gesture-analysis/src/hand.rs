//! Hand region: fist closure, finger spread and fingertip tremor.
//!
//! All distances are expressed relative to the hand size (wrist to middle
//! knuckle) so the measures do not depend on how close the hand is to the
//! camera.

use gesture_core::{
    centroid, Error, HandKeypoint, LandmarkSet, Position3D, RegionName, Result, MIN_SEGMENT_LENGTH,
};
use serde::{Deserialize, Serialize};

use crate::config::HandConfig;
use crate::scorer::{RegionModel, ScoreTerms, Side, WindowedScorer};

pub type HandAnalyzer = WindowedScorer<HandModel>;

/// Raw entry kept in the hand's rolling window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandSample {
    pub index_tip: Position3D,
    pub closure: f64,
    pub spread: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandFeatures {
    /// Mean fingertip distance to the palm center over hand size
    pub closure: f64,
    /// Mean gap between adjacent fingertips over hand size
    pub spread: f64,
    pub is_fist: bool,
    /// Wrist to middle knuckle, in normalized image units
    pub hand_size: f64,
}

#[derive(Debug, Clone)]
pub struct HandModel {
    side: Side,
    config: HandConfig,
}

impl HandModel {
    pub fn new(side: Side, config: HandConfig) -> Self {
        Self { side, config }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn config(&self) -> &HandConfig {
        &self.config
    }

    /// Compute closure and spread for a 21-point hand
    pub fn measure(&self, landmarks: &LandmarkSet) -> Result<HandFeatures> {
        landmarks.validate(self.region())?;

        let wrist = landmarks.position(HandKeypoint::Wrist);
        let middle_mcp = landmarks.position(HandKeypoint::MiddleMcp);
        let hand_size = wrist.distance_to(&middle_mcp);
        if hand_size < MIN_SEGMENT_LENGTH {
            return Err(Error::Degenerate {
                region: self.region(),
                reason: "wrist and middle knuckle coincide",
            });
        }

        let palm: Vec<Position3D> = HandKeypoint::PALM
            .iter()
            .map(|k| landmarks.position(*k))
            .collect();
        let palm_center = centroid(&palm).unwrap_or(wrist);

        let closure = HandKeypoint::FINGER_TIPS
            .iter()
            .map(|k| landmarks.position(*k).distance_to(&palm_center))
            .sum::<f64>()
            / HandKeypoint::FINGER_TIPS.len() as f64
            / hand_size;

        let tips: Vec<Position3D> = HandKeypoint::ALL_TIPS
            .iter()
            .map(|k| landmarks.position(*k))
            .collect();
        let gaps: Vec<f64> = tips.windows(2).map(|w| w[0].distance_to(&w[1])).collect();
        let spread = gaps.iter().sum::<f64>() / gaps.len() as f64 / hand_size;

        Ok(HandFeatures {
            closure,
            spread,
            is_fist: closure < self.config.fist_threshold,
            hand_size,
        })
    }

    pub fn score_terms(&self, features: &HandFeatures, jitter: f64) -> ScoreTerms {
        let cfg = &self.config;
        let mut terms = ScoreTerms::new(cfg.base_score, jitter, cfg.jitter_multiplier);
        if features.is_fist {
            terms = terms.with_penalty(cfg.fist_penalty);
        }
        let excess_spread = (features.spread - cfg.spread_threshold).max(0.0);
        terms.with_bonus(cfg.spread_bonus_multiplier * excess_spread)
    }
}

impl RegionModel for HandModel {
    type Sample = HandSample;
    type Features = HandFeatures;
    const CHANNELS: usize = 1;

    fn region(&self) -> RegionName {
        match self.side {
            Side::Left => RegionName::LeftHand,
            Side::Right => RegionName::RightHand,
        }
    }

    fn history_length(&self) -> usize {
        self.config.history_length
    }

    fn extract(&mut self, landmarks: &LandmarkSet) -> Result<(HandSample, HandFeatures)> {
        let features = self.measure(landmarks)?;
        let sample = HandSample {
            index_tip: landmarks.position(HandKeypoint::IndexTip),
            closure: features.closure,
            spread: features.spread,
        };
        Ok((sample, features))
    }

    fn channel(sample: &HandSample, _index: usize) -> Position3D {
        sample.index_tip
    }

    fn raw_score(&self, features: &HandFeatures, channel_jitter: &[f64]) -> f64 {
        self.score_terms(features, channel_jitter[0]).total()
    }
}

impl WindowedScorer<HandModel> {
    pub fn for_side(side: Side, config: &HandConfig) -> Self {
        WindowedScorer::new(HandModel::new(side, config.clone()))
    }
}
