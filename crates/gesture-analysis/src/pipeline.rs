//! Pipeline orchestrator driving one frame through every region analyzer
//! and the fusion engine.
//!
//! Processing is synchronous and frame-at-a-time. The pipeline owns one
//! analyzer per region; independent streams need independent pipelines.

use gesture_core::{FrameLandmarks, RegionName, Result, SessionId};

use crate::arm::ArmAnalyzer;
use crate::config::AnalysisConfig;
use crate::fusion::{FusionEngine, FusionResult};
use crate::hand::HandAnalyzer;
use crate::record::FrameRecord;
use crate::scorer::{RegionModel, Side, WindowedScorer};
use crate::shoulder::ShoulderAnalyzer;
use crate::summary::SessionSummary;
use crate::upper_body::UpperBodyAnalyzer;

/// Multimodal gesture pipeline
pub struct GesturePipeline {
    config: AnalysisConfig,
    session_id: SessionId,

    left_hand: HandAnalyzer,
    right_hand: HandAnalyzer,
    shoulders: ShoulderAnalyzer,
    left_arm: ArmAnalyzer,
    right_arm: ArmAnalyzer,
    upper_body: UpperBodyAnalyzer,
    fusion: FusionEngine,

    last_result: FusionResult,
    summary: SessionSummary,
}

impl GesturePipeline {
    /// Build a pipeline; rejects configuration no analyzer can work with
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;

        let fusion = FusionEngine::new(config.fusion.clone());
        let session_id = SessionId::new();

        tracing::info!(
            "Gesture pipeline created for session {} (calibration after {} frames)",
            session_id,
            config.shoulder.baseline_frames_needed
        );

        Ok(Self {
            session_id,
            left_hand: HandAnalyzer::for_side(Side::Left, &config.hand),
            right_hand: HandAnalyzer::for_side(Side::Right, &config.hand),
            shoulders: ShoulderAnalyzer::from_config(&config.shoulder),
            left_arm: ArmAnalyzer::for_side(Side::Left, &config.arm),
            right_arm: ArmAnalyzer::for_side(Side::Right, &config.arm),
            upper_body: UpperBodyAnalyzer::from_config(&config.upper_body),
            last_result: fusion.no_data_result(),
            fusion,
            summary: SessionSummary::new(),
            config,
        })
    }

    /// Run one frame through all analyzers and fusion, returning the flat
    /// record for that frame. Malformed region input is logged, listed in
    /// the record and otherwise treated as absent.
    pub fn process_frame(&mut self, frame: &FrameLandmarks) -> FrameRecord {
        let mut rejected = Vec::new();

        feed(&mut self.left_hand, frame, &mut rejected);
        feed(&mut self.right_hand, frame, &mut rejected);
        feed(&mut self.shoulders, frame, &mut rejected);
        feed(&mut self.left_arm, frame, &mut rejected);
        feed(&mut self.right_arm, frame, &mut rejected);
        feed(&mut self.upper_body, frame, &mut rejected);

        let left_hand = self.left_hand.results();
        let right_hand = self.right_hand.results();
        let shoulders = self.shoulders.results();
        let left_arm = self.left_arm.results();
        let right_arm = self.right_arm.results();
        let upper_body = self.upper_body.results();

        let result = self.fusion.fuse(
            &[left_hand.score_snapshot(), right_hand.score_snapshot()],
            &shoulders.score_snapshot(),
            &[left_arm.score_snapshot(), right_arm.score_snapshot()],
            &upper_body.score_snapshot(),
        );

        tracing::debug!(
            "Frame {}: {} {:.1} via {}",
            frame.frame_index,
            result.emotion_state,
            result.overall_score,
            result.used_features()
        );

        let mut record = FrameRecord::new(frame, self.session_id, &result);
        record.set_hand(&left_hand);
        record.set_hand(&right_hand);
        record.set_shoulder(
            &shoulders,
            self.shoulders.is_calibrated(),
            self.shoulders.calibration_frames(),
        );
        record.set_arm(&left_arm);
        record.set_arm(&right_arm);
        record.set_upper_body(&upper_body, self.upper_body.sub_scores());
        record.set_rejected(&rejected);

        self.summary.record(&result);
        self.last_result = result;
        record
    }

    /// Process one frame and return its fusion result
    pub fn process(&mut self, frame: &FrameLandmarks) -> FusionResult {
        self.process_frame(frame);
        self.last_result.clone()
    }

    /// Fusion result of the most recent frame, or the no-data result
    pub fn last_result(&self) -> &FusionResult {
        &self.last_result
    }

    /// Clear every analyzer's history and calibration, the last result and
    /// the session summary. The session id is kept.
    pub fn reset(&mut self) {
        self.left_hand.reset();
        self.right_hand.reset();
        self.shoulders.reset();
        self.left_arm.reset();
        self.right_arm.reset();
        self.upper_body.reset();
        self.last_result = self.fusion.no_data_result();
        self.summary.clear();

        tracing::info!("Gesture pipeline reset for session {}", self.session_id);
    }

    /// Reset and start a new session with a fresh id
    pub fn begin_session(&mut self) -> SessionId {
        self.reset();
        self.session_id = SessionId::new();
        tracing::info!("Started session {}", self.session_id);
        self.session_id
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn hand(&self, side: Side) -> &HandAnalyzer {
        match side {
            Side::Left => &self.left_hand,
            Side::Right => &self.right_hand,
        }
    }

    pub fn arm(&self, side: Side) -> &ArmAnalyzer {
        match side {
            Side::Left => &self.left_arm,
            Side::Right => &self.right_arm,
        }
    }

    pub fn shoulders(&self) -> &ShoulderAnalyzer {
        &self.shoulders
    }

    pub fn upper_body(&self) -> &UpperBodyAnalyzer {
        &self.upper_body
    }
}

/// Update one analyzer from its region of the frame
fn feed<M: RegionModel>(
    analyzer: &mut WindowedScorer<M>,
    frame: &FrameLandmarks,
    rejected: &mut Vec<RegionName>,
) {
    let region = analyzer.region();
    if let Err(e) = analyzer.update(frame.landmarks(region)) {
        tracing::warn!("Frame {}: rejected {} landmarks: {}", frame.frame_index, region, e);
        rejected.push(region);
    }
}
