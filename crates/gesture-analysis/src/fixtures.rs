//! Synthetic landmark sets for unit tests, integration tests and benches.
//!
//! Not part of the library API: `tests/` and `benches/` include this file
//! by path.
//!
//! Coordinates are normalized image coordinates with `y` growing downward.

use gesture_core::{HandKeypoint, KeypointLayout, LandmarkSet, Position3D};

/// Open, relaxed hand with fingers fanned out, wrist at `(cx, cy)`
pub fn open_hand(cx: f64, cy: f64) -> LandmarkSet {
    build_hand(cx, cy, 1.0)
}

/// Closed fist, wrist at `(cx, cy)`
pub fn fist(cx: f64, cy: f64) -> LandmarkSet {
    build_hand(cx, cy, 0.0)
}

/// `openness` of 1.0 fans the fingers fully, 0.0 curls them onto the palm
fn build_hand(cx: f64, cy: f64, openness: f64) -> LandmarkSet {
    let mut points = vec![Position3D::new(cx, cy, 0.0); HandKeypoint::COUNT];
    // Knuckles 0.1 above the wrist, fanned horizontally
    let knuckles = [
        (HandKeypoint::IndexMcp, -0.03),
        (HandKeypoint::MiddleMcp, 0.0),
        (HandKeypoint::RingMcp, 0.03),
        (HandKeypoint::PinkyMcp, 0.055),
    ];
    let palm_center = Position3D::new(cx + 0.011, cy - 0.08, 0.0);

    for (i, (mcp, dx)) in knuckles.iter().enumerate() {
        let knuckle = Position3D::new(cx + dx, cy - 0.1, 0.0);
        points[mcp.index()] = knuckle;

        // Open: tip extends upward and outward; closed: tip folds onto the palm
        let spread_dx = (i as f64 - 1.5) * 0.04;
        let open_tip = Position3D::new(knuckle.x + spread_dx, knuckle.y - 0.09, 0.0);
        let tip = lerp(&palm_center, &open_tip, openness);
        let base = mcp.index();
        points[base + 1] = lerp(&knuckle, &tip, 1.0 / 3.0);
        points[base + 2] = lerp(&knuckle, &tip, 2.0 / 3.0);
        points[base + 3] = tip;
    }

    let thumb_open = Position3D::new(cx - 0.11, cy - 0.06, 0.0);
    let thumb_tip = lerp(&palm_center, &thumb_open, openness);
    let thumb_cmc = Position3D::new(cx - 0.03, cy - 0.02, 0.0);
    points[HandKeypoint::ThumbCmc.index()] = thumb_cmc;
    points[HandKeypoint::ThumbMcp.index()] = lerp(&thumb_cmc, &thumb_tip, 1.0 / 3.0);
    points[HandKeypoint::ThumbIp.index()] = lerp(&thumb_cmc, &thumb_tip, 2.0 / 3.0);
    points[HandKeypoint::ThumbTip.index()] = thumb_tip;

    LandmarkSet::from_positions(&points)
}

fn lerp(a: &Position3D, b: &Position3D, t: f64) -> Position3D {
    Position3D::new(
        a.x + (b.x - a.x) * t,
        a.y + (b.y - a.y) * t,
        a.z + (b.z - a.z) * t,
    )
}

/// Both shoulders at height `y`, 0.3 apart
pub fn level_shoulders(y: f64) -> LandmarkSet {
    shoulders(y, y)
}

pub fn shoulders(left_y: f64, right_y: f64) -> LandmarkSet {
    LandmarkSet::from_positions(&[
        Position3D::new(0.35, left_y, 0.0),
        Position3D::new(0.65, right_y, 0.0),
    ])
}

/// Arm with the shoulder at `(sx, sy)`, upper arm hanging straight down
/// (length 0.2) and the forearm bent by `angle_deg` at the elbow.
pub fn bent_arm(sx: f64, sy: f64, angle_deg: f64) -> LandmarkSet {
    let shoulder = Position3D::new(sx, sy, 0.0);
    let elbow = Position3D::new(sx, sy + 0.2, 0.0);
    // Rotate the elbow→shoulder direction (straight up) by the angle
    let theta = angle_deg.to_radians();
    let wrist = Position3D::new(
        elbow.x + 0.18 * theta.sin(),
        elbow.y - 0.18 * theta.cos(),
        0.0,
    );
    LandmarkSet::from_positions(&[shoulder, elbow, wrist])
}

/// Seated pose with the ear midpoint at `(cx, cy)`.
///
/// `roll_deg` tilts the ear line, `nose_drop` moves the nose below the ear
/// line (ear span is 0.12) and `torso_shift` slides the shoulders sideways
/// over hips 0.3 below them.
pub fn posed(cx: f64, cy: f64, roll_deg: f64, nose_drop: f64, torso_shift: f64) -> LandmarkSet {
    let roll = roll_deg.to_radians();
    let (half_dx, half_dy) = (0.06 * roll.cos(), 0.06 * roll.sin());
    let shoulder_y = cy + 0.2;
    let hip_y = shoulder_y + 0.3;

    LandmarkSet::from_positions(&[
        Position3D::new(cx, cy + nose_drop, 0.0),
        Position3D::new(cx - half_dx, cy - half_dy, 0.0),
        Position3D::new(cx + half_dx, cy + half_dy, 0.0),
        Position3D::new(cx - 0.15 + torso_shift, shoulder_y, 0.0),
        Position3D::new(cx + 0.15 + torso_shift, shoulder_y, 0.0),
        Position3D::new(cx - 0.1, hip_y, 0.0),
        Position3D::new(cx + 0.1, hip_y, 0.0),
    ])
}

pub fn upright(cx: f64, cy: f64) -> LandmarkSet {
    posed(cx, cy, 0.0, 0.0, 0.0)
}
