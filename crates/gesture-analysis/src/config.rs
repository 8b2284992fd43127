//! Analysis configuration.
//!
//! Every threshold, multiplier and weight used by the analyzers lives here
//! and is handed to each analyzer at construction.

use gesture_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Complete analysis configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub hand: HandConfig,
    pub shoulder: ShoulderConfig,
    pub arm: ArmConfig,
    pub upper_body: UpperBodyConfig,
    pub fusion: FusionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandConfig {
    /// Rolling window length (frames)
    pub history_length: usize,

    /// Score before penalties and bonuses
    pub base_score: f64,

    /// Closure ratio below which the hand counts as a fist
    pub fist_threshold: f64,

    /// Penalty per unit of fingertip jitter
    pub jitter_multiplier: f64,

    /// Bonus per unit of spread above `spread_threshold`
    pub spread_bonus_multiplier: f64,

    /// Spread ratio that counts as an open hand
    pub spread_threshold: f64,

    /// Penalty applied while fisted
    pub fist_penalty: f64,
}

impl Default for HandConfig {
    fn default() -> Self {
        Self {
            history_length: 30,
            base_score: 100.0,
            fist_threshold: 0.8,
            jitter_multiplier: 1000.0,
            spread_bonus_multiplier: 80.0,
            spread_threshold: 0.25,
            fist_penalty: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShoulderConfig {
    pub history_length: usize,

    pub base_score: f64,

    /// Frames accumulated before the baseline is trusted
    pub baseline_frames_needed: u32,

    /// Exponential smoothing factor while calibrating
    pub baseline_smoothing: f64,

    /// Smoothing factor for slow postural drift after calibration
    pub drift_smoothing: f64,

    /// Penalty per unit of shoulder jitter
    pub jitter_multiplier: f64,

    /// Penalty applied while shrugging
    pub shrug_penalty: f64,

    /// Rise above baseline (normalized units) that counts as a shrug
    pub shrug_threshold: f64,

    /// Left/right height difference that counts as a shrug
    pub max_shrug_diff: f64,
}

impl Default for ShoulderConfig {
    fn default() -> Self {
        Self {
            history_length: 30,
            base_score: 100.0,
            baseline_frames_needed: 30,
            baseline_smoothing: 0.9,
            drift_smoothing: 0.995,
            jitter_multiplier: 2000.0,
            shrug_penalty: 30.0,
            shrug_threshold: 0.03,
            max_shrug_diff: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmConfig {
    pub history_length: usize,

    pub base_score: f64,

    pub jitter_multiplier: f64,

    /// Ideal elbow angle range (degrees)
    pub ideal_angle_min: f64,
    pub ideal_angle_max: f64,

    /// Acceptable elbow angle range (degrees), must contain the ideal range
    pub acceptable_angle_min: f64,
    pub acceptable_angle_max: f64,

    /// Bonus while the elbow angle is ideal
    pub stability_bonus: f64,

    /// Penalty per degree outside the acceptable range
    pub poor_angle_penalty_per_degree: f64,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            history_length: 30,
            base_score: 100.0,
            jitter_multiplier: 1000.0,
            ideal_angle_min: 70.0,
            ideal_angle_max: 120.0,
            acceptable_angle_min: 45.0,
            acceptable_angle_max: 160.0,
            stability_bonus: 10.0,
            poor_angle_penalty_per_degree: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpperBodyConfig {
    pub history_length: usize,

    pub base_score: f64,

    pub jitter_multiplier: f64,

    /// Head roll tolerated without penalty (degrees)
    pub head_tilt_tolerance: f64,

    /// Head pitch tolerated without penalty (degrees)
    pub head_pitch_tolerance: f64,

    /// Torso lean from vertical tolerated without penalty (degrees)
    pub torso_lean_tolerance: f64,

    /// Penalty per degree beyond any tolerance
    pub angle_penalty_per_degree: f64,

    /// Blend weights of the head and torso sub-scores
    pub head_weight: f64,
    pub torso_weight: f64,
}

impl Default for UpperBodyConfig {
    fn default() -> Self {
        Self {
            history_length: 30,
            base_score: 100.0,
            jitter_multiplier: 1000.0,
            head_tilt_tolerance: 10.0,
            head_pitch_tolerance: 20.0,
            torso_lean_tolerance: 10.0,
            angle_penalty_per_degree: 1.0,
            head_weight: 0.5,
            torso_weight: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub hand_weight: f64,
    pub shoulder_weight: f64,
    pub arm_weight: f64,
    /// Zero leaves the upper body out of fusion
    pub upper_body_weight: f64,

    /// Lower bounds of the emotion states, highest first
    pub thresholds: EmotionThresholds,

    /// Score gap that singles out one region in the feedback text
    pub factor_gap: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            hand_weight: 0.4,
            shoulder_weight: 0.3,
            arm_weight: 0.2,
            upper_body_weight: 0.1,
            thresholds: EmotionThresholds::default(),
            factor_gap: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionThresholds {
    pub very_relaxed: f64,
    pub relaxed: f64,
    pub neutral: f64,
    pub slightly_nervous: f64,
    pub nervous: f64,
}

impl Default for EmotionThresholds {
    fn default() -> Self {
        Self {
            very_relaxed: 80.0,
            relaxed: 65.0,
            neutral: 50.0,
            slightly_nervous: 35.0,
            nervous: 20.0,
        }
    }
}

impl EmotionThresholds {
    /// Boundaries from the top down
    pub fn descending(&self) -> [f64; 5] {
        [
            self.very_relaxed,
            self.relaxed,
            self.neutral,
            self.slightly_nervous,
            self.nervous,
        ]
    }
}

impl AnalysisConfig {
    /// Load configuration from a file, with `GESTURE__SECTION__KEY`
    /// environment variables taking precedence.
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("GESTURE").separator("__"))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("GESTURE").separator("__"))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no analyzer can work with
    pub fn validate(&self) -> Result<()> {
        self.hand.validate()?;
        self.shoulder.validate()?;
        self.arm.validate()?;
        self.upper_body.validate()?;
        self.fusion.validate()
    }
}

impl HandConfig {
    pub fn validate(&self) -> Result<()> {
        require_history("hand", self.history_length)?;
        require_non_negative("hand.base_score", self.base_score)?;
        require_non_negative("hand.fist_threshold", self.fist_threshold)?;
        require_non_negative("hand.jitter_multiplier", self.jitter_multiplier)?;
        require_non_negative("hand.spread_bonus_multiplier", self.spread_bonus_multiplier)?;
        require_non_negative("hand.spread_threshold", self.spread_threshold)?;
        require_non_negative("hand.fist_penalty", self.fist_penalty)
    }
}

impl ShoulderConfig {
    pub fn validate(&self) -> Result<()> {
        require_history("shoulder", self.history_length)?;
        if self.baseline_frames_needed == 0 {
            return Err(Error::Config(
                "shoulder.baseline_frames_needed must be positive".into(),
            ));
        }
        require_non_negative("shoulder.base_score", self.base_score)?;
        require_smoothing("shoulder.baseline_smoothing", self.baseline_smoothing)?;
        require_smoothing("shoulder.drift_smoothing", self.drift_smoothing)?;
        require_non_negative("shoulder.jitter_multiplier", self.jitter_multiplier)?;
        require_non_negative("shoulder.shrug_penalty", self.shrug_penalty)?;
        require_positive("shoulder.shrug_threshold", self.shrug_threshold)?;
        require_positive("shoulder.max_shrug_diff", self.max_shrug_diff)
    }
}

impl ArmConfig {
    pub fn validate(&self) -> Result<()> {
        require_history("arm", self.history_length)?;
        require_non_negative("arm.base_score", self.base_score)?;
        require_non_negative("arm.jitter_multiplier", self.jitter_multiplier)?;
        require_non_negative("arm.stability_bonus", self.stability_bonus)?;
        require_non_negative(
            "arm.poor_angle_penalty_per_degree",
            self.poor_angle_penalty_per_degree,
        )?;

        let ordered = [
            self.acceptable_angle_min,
            self.ideal_angle_min,
            self.ideal_angle_max,
            self.acceptable_angle_max,
        ];
        if ordered.iter().any(|a| !a.is_finite() || *a < 0.0 || *a > 180.0)
            || ordered.windows(2).any(|w| w[0] > w[1])
        {
            return Err(Error::Config(format!(
                "arm angle ranges must satisfy 0 <= acceptable_min <= ideal_min <= ideal_max <= acceptable_max <= 180, got {:?}",
                ordered
            )));
        }
        Ok(())
    }
}

impl UpperBodyConfig {
    pub fn validate(&self) -> Result<()> {
        require_history("upper_body", self.history_length)?;
        require_non_negative("upper_body.base_score", self.base_score)?;
        require_non_negative("upper_body.jitter_multiplier", self.jitter_multiplier)?;
        require_non_negative("upper_body.head_tilt_tolerance", self.head_tilt_tolerance)?;
        require_non_negative("upper_body.head_pitch_tolerance", self.head_pitch_tolerance)?;
        require_non_negative("upper_body.torso_lean_tolerance", self.torso_lean_tolerance)?;
        require_non_negative(
            "upper_body.angle_penalty_per_degree",
            self.angle_penalty_per_degree,
        )?;
        require_non_negative("upper_body.head_weight", self.head_weight)?;
        require_non_negative("upper_body.torso_weight", self.torso_weight)?;
        if self.head_weight + self.torso_weight <= 0.0 {
            return Err(Error::Config(
                "upper_body head_weight + torso_weight must be positive".into(),
            ));
        }
        Ok(())
    }
}

impl FusionConfig {
    pub fn validate(&self) -> Result<()> {
        require_non_negative("fusion.hand_weight", self.hand_weight)?;
        require_non_negative("fusion.shoulder_weight", self.shoulder_weight)?;
        require_non_negative("fusion.arm_weight", self.arm_weight)?;
        require_non_negative("fusion.upper_body_weight", self.upper_body_weight)?;
        require_non_negative("fusion.factor_gap", self.factor_gap)?;

        let total =
            self.hand_weight + self.shoulder_weight + self.arm_weight + self.upper_body_weight;
        if total <= 0.0 {
            return Err(Error::Config("fusion weights must not sum to zero".into()));
        }

        let bounds = self.thresholds.descending();
        if bounds.iter().any(|b| !b.is_finite() || *b < 0.0 || *b > 100.0)
            || bounds.windows(2).any(|w| w[0] <= w[1])
        {
            return Err(Error::Config(format!(
                "emotion thresholds must be strictly descending within [0, 100], got {:?}",
                bounds
            )));
        }
        Ok(())
    }
}

fn require_history(section: &str, length: usize) -> Result<()> {
    if length == 0 {
        return Err(Error::Config(format!(
            "{section}.history_length must be positive"
        )));
    }
    Ok(())
}

fn require_non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::Config(format!(
            "{name} must be a finite non-negative number, got {value}"
        )));
    }
    Ok(())
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::Config(format!(
            "{name} must be a finite positive number, got {value}"
        )));
    }
    Ok(())
}

fn require_smoothing(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || !(0.0..1.0).contains(&value) {
        return Err(Error::Config(format!(
            "{name} must lie in [0, 1), got {value}"
        )));
    }
    Ok(())
}
