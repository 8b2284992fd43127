//! Windowed-jitter scoring shared by every body region.
//!
//! Each region supplies a [`RegionModel`]: how to turn one frame of
//! landmarks into a history sample plus per-frame features, which points
//! in the sample are tracked for jitter, and how features and jitter map
//! to a score. [`WindowedScorer`] owns the rolling window and does the
//! rest identically for all regions.

use gesture_core::{LandmarkSet, Position3D, RegionName, Result, RollingHistory};
use serde::{Deserialize, Serialize};

/// Score reported while a region has nothing trustworthy to say
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Clamp into [0, 100]; NaN maps to the neutral score
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return NEUTRAL_SCORE;
    }
    score.clamp(0.0, 100.0)
}

/// Body side for the paired regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

/// Additive score breakdown used by the single-score regions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreTerms {
    pub base: f64,
    pub jitter_penalty: f64,
    pub penalty: f64,
    pub bonus: f64,
}

impl ScoreTerms {
    pub fn new(base: f64, jitter: f64, jitter_multiplier: f64) -> Self {
        Self {
            base,
            jitter_penalty: jitter * jitter_multiplier,
            penalty: 0.0,
            bonus: 0.0,
        }
    }

    pub fn with_penalty(mut self, penalty: f64) -> Self {
        self.penalty += penalty;
        self
    }

    pub fn with_bonus(mut self, bonus: f64) -> Self {
        self.bonus += bonus;
        self
    }

    /// Unclamped total
    pub fn total(&self) -> f64 {
        self.base - self.jitter_penalty - self.penalty + self.bonus
    }

    pub fn score(&self) -> f64 {
        clamp_score(self.total())
    }
}

/// Region-specific feature extraction and scoring
pub trait RegionModel {
    /// Entry pushed into the rolling window each present frame
    type Sample: Clone + std::fmt::Debug;
    /// Per-frame measurements reported alongside the score
    type Features: Clone + std::fmt::Debug;

    /// Number of tracked point channels in a sample
    const CHANNELS: usize;

    fn region(&self) -> RegionName;

    fn history_length(&self) -> usize;

    /// Derive the sample and features for one frame. Malformed landmarks
    /// yield an invalid-input error and leave the model untouched.
    fn extract(&mut self, landmarks: &LandmarkSet) -> Result<(Self::Sample, Self::Features)>;

    fn channel(sample: &Self::Sample, index: usize) -> Position3D;

    /// Unclamped score from this frame's features and per-channel jitter
    fn raw_score(&self, features: &Self::Features, channel_jitter: &[f64]) -> f64;

    /// Whether results may be trusted yet, beyond having history
    fn is_ready(&self) -> bool {
        true
    }

    fn reset(&mut self) {}
}

/// What one present frame produced
#[derive(Debug, Clone)]
struct Observation<F> {
    features: F,
    channel_jitter: Vec<f64>,
    jitter: f64,
    score: f64,
}

/// Immutable snapshot of a region analyzer after the latest frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionResult<F> {
    pub region: RegionName,
    /// In [0, 100]; neutral while invalid
    pub score: f64,
    pub valid: bool,
    /// Whether the region was present and well-formed this frame
    pub updated: bool,
    /// Mean jitter over all tracked channels
    pub jitter: Option<f64>,
    pub channel_jitter: Vec<f64>,
    pub features: Option<F>,
}

impl<F> RegionResult<F> {
    pub fn score_snapshot(&self) -> RegionScore {
        RegionScore {
            region: self.region,
            score: self.score,
            valid: self.valid,
        }
    }
}

/// The part of a region result that fusion consumes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionScore {
    pub region: RegionName,
    pub score: f64,
    pub valid: bool,
}

impl RegionScore {
    pub fn invalid(region: RegionName) -> Self {
        Self {
            region,
            score: NEUTRAL_SCORE,
            valid: false,
        }
    }
}

/// Region analyzer built from a model and a rolling window
#[derive(Debug, Clone)]
pub struct WindowedScorer<M: RegionModel> {
    model: M,
    history: RollingHistory<M::Sample>,
    current: Option<Observation<M::Features>>,
}

impl<M: RegionModel> WindowedScorer<M> {
    pub fn new(model: M) -> Self {
        let history = RollingHistory::new(model.history_length());
        Self {
            model,
            history,
            current: None,
        }
    }

    /// Feed one frame. `None` means the region was not detected: the window
    /// is left untouched and the frame is marked as not updated. Malformed
    /// landmarks are rejected with an invalid-input error and likewise
    /// leave the window untouched.
    pub fn update(&mut self, landmarks: Option<&LandmarkSet>) -> Result<()> {
        self.current = None;

        let Some(landmarks) = landmarks else {
            return Ok(());
        };

        landmarks.validate(self.model.region())?;
        let (sample, features) = self.model.extract(landmarks)?;
        self.history.push(sample);

        let channel_jitter: Vec<f64> = (0..M::CHANNELS)
            .map(|i| self.history.jitter_by(|s| M::channel(s, i)))
            .collect();
        let jitter = if channel_jitter.is_empty() {
            0.0
        } else {
            channel_jitter.iter().sum::<f64>() / channel_jitter.len() as f64
        };
        let score = clamp_score(self.model.raw_score(&features, &channel_jitter));

        self.current = Some(Observation {
            features,
            channel_jitter,
            jitter,
            score,
        });
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.current.is_some() && !self.history.is_empty() && self.model.is_ready()
    }

    pub fn results(&self) -> RegionResult<M::Features> {
        let valid = self.is_valid();
        let region = self.model.region();

        match &self.current {
            Some(obs) => RegionResult {
                region,
                score: if valid { obs.score } else { NEUTRAL_SCORE },
                valid,
                updated: true,
                jitter: Some(obs.jitter),
                channel_jitter: obs.channel_jitter.clone(),
                features: Some(obs.features.clone()),
            },
            None => RegionResult {
                region,
                score: NEUTRAL_SCORE,
                valid: false,
                updated: false,
                jitter: None,
                channel_jitter: Vec::new(),
                features: None,
            },
        }
    }

    /// Clear history, the latest observation and any model state
    pub fn reset(&mut self) {
        self.history.clear();
        self.current = None;
        self.model.reset();
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn history(&self) -> &RollingHistory<M::Sample> {
        &self.history
    }

    pub fn region(&self) -> RegionName {
        self.model.region()
    }
}
