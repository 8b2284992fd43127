//! Upper-body region: head pose and torso steadiness.
//!
//! The region score blends two sub-scores:
//!
//! - head: nose jitter plus how far roll and pitch exceed their tolerances
//! - torso: jitter of the hip→shoulder vector plus lean beyond tolerance

use gesture_core::{
    drop_angle_deg, lean_from_vertical_deg, midpoint, roll_deg, Error, LandmarkSet, Position3D,
    RegionName, Result, UpperBodyKeypoint, MIN_SEGMENT_LENGTH,
};
use serde::{Deserialize, Serialize};

use crate::config::UpperBodyConfig;
use crate::scorer::{clamp_score, RegionModel, WindowedScorer};

pub type UpperBodyAnalyzer = WindowedScorer<UpperBodyModel>;

const HEAD_CHANNEL: usize = 0;
const TORSO_CHANNEL: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpperBodySample {
    pub nose: Position3D,
    /// Hip midpoint → shoulder midpoint
    pub torso: Position3D,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpperBodyFeatures {
    /// Ear line against the horizontal, in [-90, 90] degrees
    pub head_roll: f64,
    /// Nose below the ear line (positive = chin down), degrees
    pub head_pitch: f64,
    /// Torso angle from vertical, degrees
    pub torso_lean: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpperBodyScores {
    pub head: f64,
    pub torso: f64,
}

#[derive(Debug, Clone)]
pub struct UpperBodyModel {
    config: UpperBodyConfig,
}

impl UpperBodyModel {
    pub fn new(config: UpperBodyConfig) -> Self {
        Self { config }
    }

    pub fn measure(&self, landmarks: &LandmarkSet) -> Result<(UpperBodySample, UpperBodyFeatures)> {
        landmarks.validate(RegionName::UpperBody)?;

        let degenerate = |reason| Error::Degenerate {
            region: RegionName::UpperBody,
            reason,
        };

        let nose = landmarks.position(UpperBodyKeypoint::Nose);
        let left_ear = landmarks.position(UpperBodyKeypoint::LeftEar);
        let right_ear = landmarks.position(UpperBodyKeypoint::RightEar);
        let shoulders = midpoint(
            &landmarks.position(UpperBodyKeypoint::LeftShoulder),
            &landmarks.position(UpperBodyKeypoint::RightShoulder),
        );
        let hips = midpoint(
            &landmarks.position(UpperBodyKeypoint::LeftHip),
            &landmarks.position(UpperBodyKeypoint::RightHip),
        );

        let ear_span = left_ear.distance_to(&right_ear);
        if ear_span < MIN_SEGMENT_LENGTH {
            return Err(degenerate("ears coincide"));
        }
        let head_roll = roll_deg(&left_ear, &right_ear).ok_or_else(|| degenerate("ears coincide"))?;
        let head_pitch = drop_angle_deg(&nose, &midpoint(&left_ear, &right_ear), ear_span)
            .ok_or_else(|| degenerate("ears coincide"))?;
        let torso_lean = lean_from_vertical_deg(&shoulders, &hips)
            .ok_or_else(|| degenerate("shoulders and hips coincide"))?;

        let torso = Position3D::new(
            shoulders.x - hips.x,
            shoulders.y - hips.y,
            shoulders.z - hips.z,
        );

        Ok((
            UpperBodySample { nose, torso },
            UpperBodyFeatures {
                head_roll,
                head_pitch,
                torso_lean,
            },
        ))
    }

    /// Head and torso sub-scores, each clamped to [0, 100]
    pub fn sub_scores(
        &self,
        features: &UpperBodyFeatures,
        channel_jitter: &[f64],
    ) -> UpperBodyScores {
        let cfg = &self.config;
        let jitter = |i: usize| channel_jitter.get(i).copied().unwrap_or(0.0);
        let excess = |value: f64, tolerance: f64| (value.abs() - tolerance).max(0.0);

        let head_excess = excess(features.head_roll, cfg.head_tilt_tolerance)
            + excess(features.head_pitch, cfg.head_pitch_tolerance);
        let head = cfg.base_score
            - cfg.jitter_multiplier * jitter(HEAD_CHANNEL)
            - cfg.angle_penalty_per_degree * head_excess;

        let torso = cfg.base_score
            - cfg.jitter_multiplier * jitter(TORSO_CHANNEL)
            - cfg.angle_penalty_per_degree * excess(features.torso_lean, cfg.torso_lean_tolerance);

        UpperBodyScores {
            head: clamp_score(head),
            torso: clamp_score(torso),
        }
    }

    pub fn blend(&self, scores: &UpperBodyScores) -> f64 {
        let cfg = &self.config;
        let total = cfg.head_weight + cfg.torso_weight;
        (cfg.head_weight * scores.head + cfg.torso_weight * scores.torso) / total
    }
}

impl RegionModel for UpperBodyModel {
    type Sample = UpperBodySample;
    type Features = UpperBodyFeatures;
    const CHANNELS: usize = 2;

    fn region(&self) -> RegionName {
        RegionName::UpperBody
    }

    fn history_length(&self) -> usize {
        self.config.history_length
    }

    fn extract(&mut self, landmarks: &LandmarkSet) -> Result<(UpperBodySample, UpperBodyFeatures)> {
        self.measure(landmarks)
    }

    fn channel(sample: &UpperBodySample, index: usize) -> Position3D {
        match index {
            HEAD_CHANNEL => sample.nose,
            _ => sample.torso,
        }
    }

    fn raw_score(&self, features: &UpperBodyFeatures, channel_jitter: &[f64]) -> f64 {
        self.blend(&self.sub_scores(features, channel_jitter))
    }
}

impl WindowedScorer<UpperBodyModel> {
    pub fn from_config(config: &UpperBodyConfig) -> Self {
        WindowedScorer::new(UpperBodyModel::new(config.clone()))
    }

    /// Sub-scores for the latest frame, when it produced features
    pub fn sub_scores(&self) -> Option<UpperBodyScores> {
        let result = self.results();
        if !result.valid {
            return None;
        }
        let features = result.features?;
        Some(self.model().sub_scores(&features, &result.channel_jitter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{posed, upright};

    fn steady(landmarks: &LandmarkSet) -> UpperBodyAnalyzer {
        let mut analyzer = UpperBodyAnalyzer::from_config(&UpperBodyConfig::default());
        for _ in 0..12 {
            analyzer.update(Some(landmarks)).unwrap();
        }
        analyzer
    }

    #[test]
    fn test_upright_pose_features() {
        let model = UpperBodyModel::new(UpperBodyConfig::default());
        let (_, features) = model.measure(&upright(0.5, 0.2)).unwrap();

        assert!(features.head_roll.abs() < 1e-9);
        assert!(features.head_pitch.abs() < 1e-9);
        assert!(features.torso_lean.abs() < 1e-9);
    }

    #[test]
    fn test_upright_scores_full() {
        let analyzer = steady(&upright(0.5, 0.2));
        let result = analyzer.results();
        assert!(result.valid);
        assert!((result.score - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_head_tilt_beyond_tolerance() {
        let analyzer = steady(&posed(0.5, 0.2, 25.0, 0.0, 0.0));
        let features = analyzer.results().features.unwrap();
        assert!((features.head_roll - 25.0).abs() < 1e-6);

        let scores = analyzer.sub_scores().unwrap();
        assert!((scores.head - 85.0).abs() < 1e-6);
        assert!((scores.torso - 100.0).abs() < 1e-6);
        assert!((analyzer.results().score - 92.5).abs() < 1e-6);
    }

    #[test]
    fn test_mirrored_ears_give_same_roll() {
        let model = UpperBodyModel::new(UpperBodyConfig::default());
        let pose = posed(0.5, 0.2, 15.0, 0.0, 0.0);
        let mut mirrored = pose.clone();
        mirrored.points.swap(1, 2);

        let (_, a) = model.measure(&pose).unwrap();
        let (_, b) = model.measure(&mirrored).unwrap();
        assert!((a.head_roll - b.head_roll).abs() < 1e-9);
    }

    #[test]
    fn test_head_pitch() {
        // Nose a full ear span below the ear line: 45 degrees
        let analyzer = steady(&posed(0.5, 0.2, 0.0, 0.12, 0.0));
        let features = analyzer.results().features.unwrap();
        assert!((features.head_pitch - 45.0).abs() < 1e-6);

        let scores = analyzer.sub_scores().unwrap();
        assert!((scores.head - 75.0).abs() < 1e-6);
    }

    #[test]
    fn test_torso_lean() {
        let shift = 0.3 * 20f64.to_radians().tan();
        let analyzer = steady(&posed(0.5, 0.2, 0.0, 0.0, shift));
        let features = analyzer.results().features.unwrap();
        assert!((features.torso_lean - 20.0).abs() < 1e-6);

        let scores = analyzer.sub_scores().unwrap();
        assert!((scores.torso - 90.0).abs() < 1e-6);
        assert!((analyzer.results().score - 95.0).abs() < 1e-6);
    }

    #[test]
    fn test_weights_are_renormalized() {
        let config = UpperBodyConfig {
            head_weight: 3.0,
            torso_weight: 1.0,
            ..UpperBodyConfig::default()
        };
        let model = UpperBodyModel::new(config);
        let blended = model.blend(&UpperBodyScores {
            head: 60.0,
            torso: 100.0,
        });
        assert!((blended - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_swaying_torso_is_penalized() {
        let mut analyzer = UpperBodyAnalyzer::from_config(&UpperBodyConfig::default());
        for i in 0..20 {
            let shift = if i % 2 == 0 { -0.02 } else { 0.02 };
            analyzer.update(Some(&posed(0.5, 0.2, 0.0, 0.0, shift))).unwrap();
        }

        let scores = analyzer.sub_scores().unwrap();
        assert!(scores.torso < 100.0);
        assert!((scores.head - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_collapsed_torso_rejected() {
        let mut analyzer = UpperBodyAnalyzer::from_config(&UpperBodyConfig::default());
        let mut pose = upright(0.5, 0.2);
        pose.points[5] = pose.points[3];
        pose.points[6] = pose.points[4];

        let err = analyzer.update(Some(&pose)).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_measure_rejects_malformed_points() {
        let model = UpperBodyModel::new(UpperBodyConfig::default());
        let short = LandmarkSet::from_positions(&[Position3D::new(0.5, 0.5, 0.0); 3]);
        assert!(matches!(
            model.measure(&short),
            Err(Error::PointCount { expected: 7, actual: 3, .. })
        ));

        let mut pose = upright(0.5, 0.2);
        pose.points[0].x = f64::INFINITY;
        assert!(matches!(
            model.measure(&pose),
            Err(Error::NonFinite { index: 0, .. })
        ));
    }
}
