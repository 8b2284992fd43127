//! Running statistics over a session's fusion results.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fusion::{EmotionState, FusionResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub frames: u64,
    pub valid_frames: u64,
    score_sum: f64,
    pub min_score: Option<f64>,
    pub max_score: Option<f64>,
    /// Frames per emotion state, valid frames only
    pub states: BTreeMap<EmotionState, u64>,
}

impl SessionSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: &FusionResult) {
        self.frames += 1;
        if !result.valid {
            return;
        }

        let score = result.overall_score;
        self.valid_frames += 1;
        self.score_sum += score;
        self.min_score = Some(self.min_score.map_or(score, |m| m.min(score)));
        self.max_score = Some(self.max_score.map_or(score, |m| m.max(score)));
        *self.states.entry(result.emotion_state).or_insert(0) += 1;
    }

    /// Mean overall score over valid frames
    pub fn mean_score(&self) -> Option<f64> {
        (self.valid_frames > 0).then(|| self.score_sum / self.valid_frames as f64)
    }

    /// Most frequent state; ties go to the calmer state
    pub fn dominant_state(&self) -> Option<EmotionState> {
        self.states
            .iter()
            .max_by(|(sa, a), (sb, b)| a.cmp(b).then(sb.cmp(sa)))
            .map(|(state, _)| *state)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "frames: {} ({} valid)", self.frames, self.valid_frames)?;
        match (self.mean_score(), self.min_score, self.max_score) {
            (Some(mean), Some(min), Some(max)) => {
                writeln!(f, "overall score: mean {mean:.1}, min {min:.1}, max {max:.1}")?
            }
            _ => writeln!(f, "overall score: n/a")?,
        }
        for state in EmotionState::ALL {
            let count = self.states.get(&state).copied().unwrap_or(0);
            if count > 0 {
                writeln!(f, "  {:<18} {}", state.label(), count)?;
            }
        }
        Ok(())
    }
}
