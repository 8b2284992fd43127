//! Emotion fusion: weighted combination of region scores into one overall
//! score, an emotion state and feedback text.
//!
//! ## Renormalization
//!
//! Only valid regions take part. With weights `w_i` and scores `s_i` over
//! the valid set V:
//!
//! overall = Σ_{i∈V} w_i·s_i / Σ_{i∈V} w_i
//!
//! Left/right hands (and arms) are averaged into one group score before
//! weighting. When no group is valid the result is the invalid neutral
//! outcome.

use std::fmt;

use gesture_core::RegionName;
use serde::{Deserialize, Serialize};

use crate::config::{EmotionThresholds, FusionConfig};
use crate::scorer::{clamp_score, RegionScore, NEUTRAL_SCORE};

/// Classified state of the subject, calmest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionState {
    VeryRelaxed,
    Relaxed,
    Neutral,
    SlightlyNervous,
    Nervous,
    HighlyAnxious,
}

impl EmotionState {
    pub const ALL: [EmotionState; 6] = [
        EmotionState::VeryRelaxed,
        EmotionState::Relaxed,
        EmotionState::Neutral,
        EmotionState::SlightlyNervous,
        EmotionState::Nervous,
        EmotionState::HighlyAnxious,
    ];

    /// First match from the top of the descending threshold table; scores
    /// below every bound are highly anxious.
    pub fn classify(score: f64, thresholds: &EmotionThresholds) -> Self {
        let bounds = thresholds.descending();
        Self::ALL
            .iter()
            .zip(bounds.iter())
            .find(|(_, bound)| score >= **bound)
            .map(|(state, _)| *state)
            .unwrap_or(EmotionState::HighlyAnxious)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionState::VeryRelaxed => "very_relaxed",
            EmotionState::Relaxed => "relaxed",
            EmotionState::Neutral => "neutral",
            EmotionState::SlightlyNervous => "slightly_nervous",
            EmotionState::Nervous => "nervous",
            EmotionState::HighlyAnxious => "highly_anxious",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EmotionState::VeryRelaxed => "Very relaxed",
            EmotionState::Relaxed => "Relaxed",
            EmotionState::Neutral => "Neutral",
            EmotionState::SlightlyNervous => "Slightly nervous",
            EmotionState::Nervous => "Nervous",
            EmotionState::HighlyAnxious => "Highly anxious",
        }
    }

    pub fn feedback(&self) -> &'static str {
        match self {
            EmotionState::VeryRelaxed | EmotionState::Relaxed => {
                "You look relaxed, keep it up"
            }
            EmotionState::Neutral => "Steady state, keep breathing naturally",
            EmotionState::SlightlyNervous => {
                "Try to loosen your hands and shoulders and take a deep breath"
            }
            EmotionState::Nervous | EmotionState::HighlyAnxious => {
                "You may be tense or anxious, consider pausing for a short break"
            }
        }
    }
}

impl fmt::Display for EmotionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Feedback used when nothing could be fused
pub const NO_DATA_FEEDBACK: &str = "Not enough data yet";

/// Group of regions that share one fusion weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionRegion {
    Hand,
    Shoulder,
    Arm,
    UpperBody,
}

impl FusionRegion {
    pub fn as_str(&self) -> &'static str {
        match self {
            FusionRegion::Hand => "hand",
            FusionRegion::Shoulder => "shoulder",
            FusionRegion::Arm => "arm",
            FusionRegion::UpperBody => "upper_body",
        }
    }

    /// Phrase naming this group as the main source of tension
    pub fn factor(&self) -> &'static str {
        match self {
            FusionRegion::Hand => "hand restlessness",
            FusionRegion::Shoulder => "high shoulder tension",
            FusionRegion::Arm => "arm instability",
            FusionRegion::UpperBody => "upper-body unsteadiness",
        }
    }

    pub fn of(region: RegionName) -> Self {
        match region {
            RegionName::LeftHand | RegionName::RightHand => FusionRegion::Hand,
            RegionName::Shoulders => FusionRegion::Shoulder,
            RegionName::LeftArm | RegionName::RightArm => FusionRegion::Arm,
            RegionName::UpperBody => FusionRegion::UpperBody,
        }
    }
}

/// One group's contribution to the overall score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub region: FusionRegion,
    pub score: f64,
    /// Weight after renormalization over the valid groups
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionResult {
    pub valid: bool,
    pub overall_score: f64,
    pub emotion_state: EmotionState,
    pub feedback: String,
    pub contributions: Vec<Contribution>,
    /// Group singled out in the feedback, if any
    pub main_factor: Option<FusionRegion>,
}

impl FusionResult {
    /// Contributing groups joined with `+`, or `none`
    pub fn used_features(&self) -> String {
        if self.contributions.is_empty() {
            return "none".to_string();
        }
        self.contributions
            .iter()
            .map(|c| c.region.as_str())
            .collect::<Vec<_>>()
            .join("+")
    }

    pub fn contributing(&self) -> impl Iterator<Item = FusionRegion> + '_ {
        self.contributions.iter().map(|c| c.region)
    }
}

/// Weighted multimodal fusion engine
#[derive(Debug, Clone)]
pub struct FusionEngine {
    config: FusionConfig,
}

impl FusionEngine {
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Invalid neutral outcome reported when no region is usable
    pub fn no_data_result(&self) -> FusionResult {
        FusionResult {
            valid: false,
            overall_score: NEUTRAL_SCORE,
            emotion_state: EmotionState::classify(NEUTRAL_SCORE, &self.config.thresholds),
            feedback: NO_DATA_FEEDBACK.to_string(),
            contributions: Vec::new(),
            main_factor: None,
        }
    }

    pub fn fuse(
        &self,
        hands: &[RegionScore],
        shoulder: &RegionScore,
        arms: &[RegionScore],
        upper_body: &RegionScore,
    ) -> FusionResult {
        let cfg = &self.config;
        let groups = [
            (FusionRegion::Hand, group_score(hands), cfg.hand_weight),
            (
                FusionRegion::Shoulder,
                group_score(std::slice::from_ref(shoulder)),
                cfg.shoulder_weight,
            ),
            (FusionRegion::Arm, group_score(arms), cfg.arm_weight),
            (
                FusionRegion::UpperBody,
                group_score(std::slice::from_ref(upper_body)),
                cfg.upper_body_weight,
            ),
        ];

        // A zero weight disables the group entirely
        let valid: Vec<(FusionRegion, f64, f64)> = groups
            .iter()
            .filter_map(|(region, score, weight)| {
                score
                    .filter(|_| *weight > 0.0)
                    .map(|score| (*region, score, *weight))
            })
            .collect();

        let total_weight: f64 = valid.iter().map(|(_, _, w)| w).sum();
        if valid.is_empty() || total_weight <= 0.0 {
            return self.no_data_result();
        }

        let contributions: Vec<Contribution> = valid
            .iter()
            .map(|(region, score, weight)| Contribution {
                region: *region,
                score: *score,
                weight: weight / total_weight,
            })
            .collect();

        let overall = if let [only] = contributions.as_slice() {
            only.score
        } else {
            contributions.iter().map(|c| c.weight * c.score).sum()
        };
        let overall_score = clamp_score(overall);

        let emotion_state = EmotionState::classify(overall_score, &cfg.thresholds);
        let main_factor = self.main_factor(&contributions);
        let feedback = match main_factor {
            Some(region) => format!(
                "{} (main factor: {})",
                emotion_state.feedback(),
                region.factor()
            ),
            None => emotion_state.feedback().to_string(),
        };

        FusionResult {
            valid: true,
            overall_score,
            emotion_state,
            feedback,
            contributions,
            main_factor,
        }
    }

    /// The worst group, when it trails every other group by more than
    /// `factor_gap`
    fn main_factor(&self, contributions: &[Contribution]) -> Option<FusionRegion> {
        if contributions.len() < 2 {
            return None;
        }

        let worst = contributions
            .iter()
            .min_by(|a, b| a.score.total_cmp(&b.score))?;
        let trails_all = contributions
            .iter()
            .filter(|c| c.region != worst.region)
            .all(|c| c.score - worst.score > self.config.factor_gap);

        trails_all.then_some(worst.region)
    }
}

/// Mean score of the valid members, if any
fn group_score(members: &[RegionScore]) -> Option<f64> {
    let scores: Vec<f64> = members.iter().filter(|r| r.valid).map(|r| r.score).collect();
    if scores.is_empty() {
        return None;
    }
    Some(scores.iter().sum::<f64>() / scores.len() as f64)
}
