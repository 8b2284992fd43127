//! Arm region: elbow angle tiers and wrist/elbow steadiness.

use gesture_core::{
    joint_angle_deg, ArmKeypoint, Error, LandmarkSet, Position3D, RegionName, Result,
};
use serde::{Deserialize, Serialize};

use crate::config::ArmConfig;
use crate::scorer::{RegionModel, ScoreTerms, Side, WindowedScorer};

pub type ArmAnalyzer = WindowedScorer<ArmModel>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmSample {
    pub elbow: Position3D,
    pub wrist: Position3D,
}

/// Where the elbow angle falls relative to the configured ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleTier {
    Ideal,
    Acceptable,
    Poor,
}

impl AngleTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            AngleTier::Ideal => "ideal",
            AngleTier::Acceptable => "acceptable",
            AngleTier::Poor => "poor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArmFeatures {
    /// Interior elbow angle in degrees; 180 is a straight arm
    pub angle: f64,
    pub tier: AngleTier,
    /// Degrees outside the acceptable range, zero unless `tier` is poor
    pub excess: f64,
}

#[derive(Debug, Clone)]
pub struct ArmModel {
    side: Side,
    config: ArmConfig,
}

impl ArmModel {
    pub fn new(side: Side, config: ArmConfig) -> Self {
        Self { side, config }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn classify(&self, angle: f64) -> (AngleTier, f64) {
        let cfg = &self.config;
        if (cfg.ideal_angle_min..=cfg.ideal_angle_max).contains(&angle) {
            (AngleTier::Ideal, 0.0)
        } else if (cfg.acceptable_angle_min..=cfg.acceptable_angle_max).contains(&angle) {
            (AngleTier::Acceptable, 0.0)
        } else if angle < cfg.acceptable_angle_min {
            (AngleTier::Poor, cfg.acceptable_angle_min - angle)
        } else {
            (AngleTier::Poor, angle - cfg.acceptable_angle_max)
        }
    }

    pub fn score_terms(&self, features: &ArmFeatures, jitter: f64) -> ScoreTerms {
        let cfg = &self.config;
        let terms = ScoreTerms::new(cfg.base_score, jitter, cfg.jitter_multiplier);
        match features.tier {
            AngleTier::Ideal => terms.with_bonus(cfg.stability_bonus),
            AngleTier::Acceptable => terms,
            AngleTier::Poor => {
                terms.with_penalty(cfg.poor_angle_penalty_per_degree * features.excess)
            }
        }
    }
}

impl RegionModel for ArmModel {
    type Sample = ArmSample;
    type Features = ArmFeatures;
    const CHANNELS: usize = 2;

    fn region(&self) -> RegionName {
        match self.side {
            Side::Left => RegionName::LeftArm,
            Side::Right => RegionName::RightArm,
        }
    }

    fn history_length(&self) -> usize {
        self.config.history_length
    }

    fn extract(&mut self, landmarks: &LandmarkSet) -> Result<(ArmSample, ArmFeatures)> {
        landmarks.validate(self.region())?;

        let shoulder = landmarks.position(ArmKeypoint::Shoulder);
        let elbow = landmarks.position(ArmKeypoint::Elbow);
        let wrist = landmarks.position(ArmKeypoint::Wrist);

        let angle = joint_angle_deg(&shoulder, &elbow, &wrist).ok_or_else(|| Error::Degenerate {
            region: self.region(),
            reason: "zero-length upper arm or forearm",
        })?;
        let (tier, excess) = self.classify(angle);

        Ok((ArmSample { elbow, wrist }, ArmFeatures { angle, tier, excess }))
    }

    fn channel(sample: &ArmSample, index: usize) -> Position3D {
        if index == 0 {
            sample.wrist
        } else {
            sample.elbow
        }
    }

    fn raw_score(&self, features: &ArmFeatures, channel_jitter: &[f64]) -> f64 {
        let jitter = channel_jitter.iter().sum::<f64>() / channel_jitter.len().max(1) as f64;
        self.score_terms(features, jitter).total()
    }
}

impl WindowedScorer<ArmModel> {
    pub fn for_side(side: Side, config: &ArmConfig) -> Self {
        WindowedScorer::new(ArmModel::new(side, config.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::bent_arm;

    fn model() -> ArmModel {
        ArmModel::new(Side::Right, ArmConfig::default())
    }

    fn steady_score(angle: f64) -> (f64, ArmFeatures) {
        let mut arm = ArmAnalyzer::for_side(Side::Left, &ArmConfig::default());
        for _ in 0..15 {
            arm.update(Some(&bent_arm(0.3, 0.3, angle))).unwrap();
        }
        let result = arm.results();
        assert!(result.valid);
        (result.score, result.features.unwrap())
    }

    #[test]
    fn test_fixture_angle() {
        for angle in [30.0, 90.0, 150.0, 175.0] {
            let (_, features) = steady_score(angle);
            assert!((features.angle - angle).abs() < 1e-6, "{angle} vs {}", features.angle);
        }
    }

    #[test]
    fn test_classification_tiers() {
        let model = model();
        assert_eq!(model.classify(90.0), (AngleTier::Ideal, 0.0));
        assert_eq!(model.classify(70.0), (AngleTier::Ideal, 0.0));
        assert_eq!(model.classify(130.0), (AngleTier::Acceptable, 0.0));
        assert_eq!(model.classify(50.0), (AngleTier::Acceptable, 0.0));

        let (tier, excess) = model.classify(30.0);
        assert_eq!(tier, AngleTier::Poor);
        assert!((excess - 15.0).abs() < 1e-9);

        let (tier, excess) = model.classify(175.0);
        assert_eq!(tier, AngleTier::Poor);
        assert!((excess - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_scores_per_tier() {
        // Ideal gets the bonus but is clamped at 100
        let (ideal, _) = steady_score(90.0);
        assert!((ideal - 100.0).abs() < 1e-9);

        let config = ArmConfig {
            base_score: 80.0,
            ..ArmConfig::default()
        };
        let model = ArmModel::new(Side::Left, config);
        let ideal = ArmFeatures { angle: 90.0, tier: AngleTier::Ideal, excess: 0.0 };
        let acceptable = ArmFeatures { angle: 140.0, tier: AngleTier::Acceptable, excess: 0.0 };
        let poor = ArmFeatures { angle: 20.0, tier: AngleTier::Poor, excess: 25.0 };

        assert!((model.score_terms(&ideal, 0.0).total() - 90.0).abs() < 1e-9);
        assert!((model.score_terms(&acceptable, 0.0).total() - 80.0).abs() < 1e-9);
        assert!((model.score_terms(&poor, 0.0).total() - 67.5).abs() < 1e-9);
        assert!((model.score_terms(&acceptable, 0.01).total() - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_poor_angle_lowers_steady_score() {
        let (score, features) = steady_score(20.0);
        assert_eq!(features.tier, AngleTier::Poor);
        // 25 degrees below the acceptable minimum at 0.5 per degree
        assert!((score - 87.5).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_arm_rejected() {
        let mut arm = ArmAnalyzer::for_side(Side::Left, &ArmConfig::default());
        let p = Position3D::new(0.4, 0.4, 0.0);
        let collapsed = LandmarkSet::from_positions(&[p, p, Position3D::new(0.5, 0.6, 0.0)]);

        let err = arm.update(Some(&collapsed)).unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(err.region(), Some(RegionName::LeftArm));
        assert!(arm.history().is_empty());
    }

    #[test]
    fn test_arms_are_independent() {
        let config = ArmConfig::default();
        let mut left = ArmAnalyzer::for_side(Side::Left, &config);
        let right = ArmAnalyzer::for_side(Side::Right, &config);

        left.update(Some(&bent_arm(0.3, 0.3, 90.0))).unwrap();
        assert!(left.results().valid);
        assert!(!right.results().valid);
        assert_eq!(right.region(), RegionName::RightArm);
    }

    #[test]
    fn test_extract_rejects_short_set() {
        let mut model = ArmModel::new(Side::Right, ArmConfig::default());
        let short = LandmarkSet::from_positions(&[Position3D::new(0.4, 0.4, 0.0); 2]);

        assert!(matches!(
            model.extract(&short),
            Err(Error::PointCount {
                region: RegionName::RightArm,
                expected: 3,
                actual: 2,
            })
        ));
    }
}
