#[allow(dead_code)]
#[path = "../src/fixtures.rs"]
mod fixtures;

use fixtures::{bent_arm, fist, level_shoulders, open_hand, shoulders, upright};
use gesture_analysis::{
    AnalysisConfig, EmotionState, FusionRegion, GesturePipeline, Side, NEUTRAL_SCORE,
};
use gesture_core::{FrameLandmarks, Landmark, LandmarkSet, RegionName, Timestamp};

fn frame(index: u64) -> FrameLandmarks {
    FrameLandmarks::new(index, Timestamp::from_millis(index as i64 * 33))
}

/// Seated, hands open, shoulders level, arms bent at 90 degrees
fn neutral_pose(index: u64) -> FrameLandmarks {
    frame(index)
        .with_region(RegionName::LeftHand, open_hand(0.3, 0.75))
        .with_region(RegionName::RightHand, open_hand(0.7, 0.75))
        .with_region(RegionName::Shoulders, level_shoulders(0.4))
        .with_region(RegionName::LeftArm, bent_arm(0.35, 0.4, 90.0))
        .with_region(RegionName::RightArm, bent_arm(0.65, 0.4, 90.0))
        .with_region(RegionName::UpperBody, upright(0.5, 0.2))
}

fn pipeline() -> GesturePipeline {
    GesturePipeline::new(AnalysisConfig::default()).unwrap()
}

#[test]
fn test_neutral_session_is_relaxed() {
    let mut pipeline = pipeline();
    let mut result = pipeline.last_result().clone();
    for i in 0..30 {
        result = pipeline.process(&neutral_pose(i));
    }

    assert!(pipeline.shoulders().is_calibrated());
    for side in [Side::Left, Side::Right] {
        let hand = pipeline.hand(side).results();
        assert!(hand.valid);
        assert!(hand.score > 95.0, "hand score {}", hand.score);
    }

    assert!(result.valid);
    assert!(matches!(
        result.emotion_state,
        EmotionState::VeryRelaxed | EmotionState::Relaxed
    ));
    assert_eq!(result.used_features(), "hand+shoulder+arm+upper_body");
}

#[test]
fn test_shoulders_excluded_until_calibrated() {
    let mut pipeline = pipeline();
    for i in 0..29 {
        let result = pipeline.process(&neutral_pose(i));
        assert!(!result.contributing().any(|r| r == FusionRegion::Shoulder));
    }

    let result = pipeline.process(&neutral_pose(29));
    assert!(result.contributing().any(|r| r == FusionRegion::Shoulder));
}

#[test]
fn test_history_never_exceeds_capacity() {
    let mut pipeline = pipeline();
    let capacity = pipeline.config().hand.history_length;

    for i in 0..(capacity as u64 * 2) {
        pipeline.process(&neutral_pose(i));
        assert!(pipeline.hand(Side::Left).history().len() <= capacity);
    }
    assert_eq!(pipeline.hand(Side::Left).history().len(), capacity);
    assert!(pipeline.hand(Side::Left).history().is_full());
}

#[test]
fn test_calibration_survives_dropouts() {
    let mut pipeline = pipeline();
    for i in 0..30 {
        pipeline.process(&neutral_pose(i));
    }
    assert!(pipeline.shoulders().is_calibrated());

    for i in 30..60 {
        let input = match i % 3 {
            0 => frame(i),
            1 => neutral_pose(i).without_region(RegionName::Shoulders),
            _ => neutral_pose(i).with_region(RegionName::Shoulders, shoulders(0.3, 0.45)),
        };
        pipeline.process(&input);
        assert!(pipeline.shoulders().is_calibrated());
    }
}

#[test]
fn test_reset_is_idempotent() {
    let mut pipeline = pipeline();
    for i in 0..40 {
        pipeline.process(&neutral_pose(i));
    }

    pipeline.reset();
    let once = (
        pipeline.last_result().clone(),
        pipeline.summary().clone(),
        pipeline.shoulders().calibration_frames(),
        pipeline.hand(Side::Right).history().len(),
    );

    pipeline.reset();
    let twice = (
        pipeline.last_result().clone(),
        pipeline.summary().clone(),
        pipeline.shoulders().calibration_frames(),
        pipeline.hand(Side::Right).history().len(),
    );

    assert_eq!(once, twice);
    assert!(!pipeline.last_result().valid);
    assert!(!pipeline.shoulders().is_calibrated());
    assert_eq!(pipeline.shoulders().calibration_frames(), 0);
    assert!(pipeline.upper_body().history().is_empty());
    assert!(pipeline.arm(Side::Left).history().is_empty());
}

#[test]
fn test_hand_dropout_keeps_window() {
    let mut pipeline = pipeline();
    for i in 0..10 {
        pipeline.process(&neutral_pose(i));
    }

    let record = pipeline.process_frame(
        &neutral_pose(10)
            .without_region(RegionName::LeftHand)
            .without_region(RegionName::RightHand),
    );
    assert!(!record.left_hand_valid);
    assert_eq!(record.left_hand_score, NEUTRAL_SCORE);
    assert!(record.left_hand_closure.is_none());
    assert!(!record.used_features.contains("hand"));
    assert_eq!(pipeline.hand(Side::Left).history().len(), 10);

    pipeline.process(&neutral_pose(11));
    assert_eq!(pipeline.hand(Side::Left).history().len(), 11);
}

#[test]
fn test_nan_landmark_rejected_not_fatal() {
    let mut pipeline = pipeline();
    let mut hand = open_hand(0.3, 0.75);
    hand.points[8] = Landmark::new(f64::NAN, 0.5, 0.0);

    let record = pipeline.process_frame(&neutral_pose(0).with_region(RegionName::LeftHand, hand));
    assert_eq!(record.rejected_regions, "left_hand");
    assert!(record.right_hand_valid);
    assert!(record.fusion_valid);

    let record = pipeline.process_frame(&neutral_pose(1));
    assert!(record.rejected_regions.is_empty());
    assert!(record.left_hand_valid);
}

#[test]
fn test_wrong_point_count_rejected() {
    let mut pipeline = pipeline();
    let short = LandmarkSet::new(vec![Landmark::new(0.4, 0.4, 0.0)]);

    let record = pipeline.process_frame(&frame(0).with_region(RegionName::LeftArm, short));
    assert_eq!(record.rejected_regions, "left_arm");
    assert!(!record.fusion_valid);
}

#[test]
fn test_scores_bounded_under_noise() {
    let mut pipeline = pipeline();
    for i in 0..120u64 {
        let t = i as f64;
        let wobble = 0.05 * (t * 1.7).sin();
        let input = frame(i)
            .with_region(
                RegionName::LeftHand,
                if i % 4 == 0 { fist(0.3 + wobble, 0.75) } else { open_hand(0.3 + wobble, 0.75) },
            )
            .with_region(RegionName::Shoulders, shoulders(0.4 + wobble, 0.4 - wobble))
            .with_region(RegionName::LeftArm, bent_arm(0.35, 0.4, 90.0 + 80.0 * (t * 0.3).sin()))
            .with_region(RegionName::UpperBody, upright(0.5 + wobble, 0.2));

        let record = pipeline.process_frame(&input);
        for score in [
            record.left_hand_score,
            record.shoulder_score,
            record.left_arm_score,
            record.upper_body_score,
            record.overall_score,
        ] {
            assert!((0.0..=100.0).contains(&score), "frame {i}: {score}");
        }
    }
    assert_eq!(pipeline.summary().frames, 120);
}

#[test]
fn test_tense_subject_is_flagged() {
    let mut pipeline = pipeline();
    for i in 0..30 {
        pipeline.process(&neutral_pose(i));
    }

    let mut result = pipeline.last_result().clone();
    for i in 30..45 {
        let dx = if i % 2 == 0 { 0.0 } else { 0.04 };
        let input = neutral_pose(i)
            .with_region(RegionName::LeftHand, fist(0.3 + dx, 0.75))
            .with_region(RegionName::RightHand, fist(0.7 - dx, 0.75))
            .with_region(RegionName::Shoulders, level_shoulders(0.34));
        result = pipeline.process(&input);
    }

    assert!(result.valid);
    assert!(result.overall_score < 65.0, "score {}", result.overall_score);
    assert!(pipeline.shoulders().results().features.unwrap().is_shrugging);
}

#[test]
fn test_frame_json_shape() {
    let json = r#"{"frame_index":3,"timestamp":100,"regions":{"shoulders":{"detected":[{"x":0.35,"y":0.4},{"x":0.65,"y":0.4,"z":0.0}]},"left_hand":"not_detected"}}"#;
    let frame: FrameLandmarks = serde_json::from_str(json).unwrap();

    assert_eq!(frame.frame_index, 3);
    assert!(frame.landmarks(RegionName::LeftHand).is_none());
    assert!(frame.landmarks(RegionName::RightArm).is_none());
    assert_eq!(frame.landmarks(RegionName::Shoulders).map(|s| s.len()), Some(2));

    let mut pipeline = pipeline();
    let record = pipeline.process_frame(&frame);
    assert_eq!(record.shoulder_calibration_frames, 1);
}
