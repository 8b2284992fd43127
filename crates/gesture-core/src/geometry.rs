//! Geometric utilities for landmark computations.
//!
//! All angles are returned in degrees. Functions that divide by a bone or
//! segment length return `None` when that length is (near) zero.

use nalgebra::{Vector2, Vector3};

use crate::types::Position3D;

/// Segments shorter than this are treated as degenerate
pub const MIN_SEGMENT_LENGTH: f64 = 1e-9;

pub fn midpoint(a: &Position3D, b: &Position3D) -> Position3D {
    Position3D::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0, (a.z + b.z) / 2.0)
}

/// Arithmetic mean of a non-empty set of points
pub fn centroid(points: &[Position3D]) -> Option<Position3D> {
    if points.is_empty() {
        return None;
    }

    let n = points.len() as f64;
    let (sx, sy, sz) = points
        .iter()
        .fold((0.0, 0.0, 0.0), |(sx, sy, sz), p| (sx + p.x, sy + p.y, sz + p.z));
    Some(Position3D::new(sx / n, sy / n, sz / n))
}

/// Interior angle at `vertex` formed by `a` and `c`.
///
/// cos(θ) = (v1 · v2) / (|v1| |v2|) with v1 = vertex→a, v2 = vertex→c, so a
/// straight limb measures 180°.
pub fn joint_angle_deg(a: &Position3D, vertex: &Position3D, c: &Position3D) -> Option<f64> {
    let v1: Vector3<f64> = vertex.vector_to(a);
    let v2: Vector3<f64> = vertex.vector_to(c);

    let n1 = v1.norm();
    let n2 = v2.norm();
    if n1 < MIN_SEGMENT_LENGTH || n2 < MIN_SEGMENT_LENGTH {
        return None;
    }

    let cos_angle = (v1.dot(&v2) / (n1 * n2)).clamp(-1.0, 1.0);
    Some(cos_angle.acos().to_degrees())
}

/// Roll of the line through two points relative to the image horizontal,
/// folded into [-90°, 90°] so the order of the two points does not matter.
pub fn roll_deg(a: &Position3D, b: &Position3D) -> Option<f64> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    if dx.hypot(dy) < MIN_SEGMENT_LENGTH {
        return None;
    }

    let dx = if dx < 0.0 { -dx } else { dx };
    let dy = if b.x < a.x { -dy } else { dy };
    Some(dy.atan2(dx).to_degrees())
}

/// Vertical offset of `point` below `reference`, as an angle against the
/// horizontal `span`. Positive when `point` sits lower in the image.
pub fn drop_angle_deg(point: &Position3D, reference: &Position3D, span: f64) -> Option<f64> {
    if span < MIN_SEGMENT_LENGTH {
        return None;
    }
    Some((point.y - reference.y).atan2(span).to_degrees())
}

/// Angle between the image-plane segment bottom→top and straight up
pub fn lean_from_vertical_deg(top: &Position3D, bottom: &Position3D) -> Option<f64> {
    let segment = Vector2::new(top.x - bottom.x, top.y - bottom.y);
    if segment.norm() < MIN_SEGMENT_LENGTH {
        return None;
    }

    let up = Vector2::new(0.0, -1.0);
    Some(segment.angle(&up).to_degrees())
}
