//! Connection solving: rigid reshape and soft-body springs.
//!
//! Rigid (non-SOFT) bodies are *reshaped* after every integration: each
//! connection's joints are pulled back to their rest distance by an
//! equal-split position correction, and a few relaxation passes are enough
//! to reconstruct the whole lattice before integration error can
//! accumulate. Soft bodies keep their integrated positions; their
//! connections instead act on velocities, like springs, so the body deforms
//! and oscillates freely.

use crate::body::Body;
use crate::fixed::{self, Unit, F};
use crate::vec3::Vec3;

/// Relaxation passes over the connection list per step.
pub const RESHAPE_ITERATIONS: u32 = 3;

/// Tension (relative elongation, fixed point) below which a soft connection
/// applies no force; keeps resting soft bodies from vibrating.
pub const TENSION_THRESHOLD: Unit = 5;

/// Divisor converting connection tension into a per-tick velocity change.
pub const TENSION_DIVIDER: Unit = 32;

/// Pulls every connection of a rigid body back to its rest length.
pub fn reshape(body: &mut Body) {
    for _ in 0..RESHAPE_ITERATIONS {
        for i in 0..body.connections.len() {
            let connection = body.connections[i];
            let j1 = usize::from(connection.joint1);
            let j2 = usize::from(connection.joint2);

            let direction = body.joints[j2].position - body.joints[j1].position;
            let length = direction.length();
            let target = Unit::from(connection.length);

            if length == 0 || length == target {
                continue;
            }

            // each endpoint absorbs half the excess
            let excess = length - target;
            let shift = Vec3::new(
                ((i64::from(direction.x) * i64::from(excess)) / (2 * i64::from(length))) as Unit,
                ((i64::from(direction.y) * i64::from(excess)) / (2 * i64::from(length))) as Unit,
                ((i64::from(direction.z) * i64::from(excess)) / (2 * i64::from(length))) as Unit,
            );

            body.joints[j1].position += shift;
            body.joints[j2].position -= shift;
        }
    }
}

/// Applies spring accelerations to a soft body's connections: joints of a
/// stretched connection accelerate toward each other, joints of a squeezed
/// one apart, proportionally to the relative elongation.
pub fn apply_springs(body: &mut Body) {
    for i in 0..body.connections.len() {
        let connection = body.connections[i];
        let j1 = usize::from(connection.joint1);
        let j2 = usize::from(connection.joint2);

        let direction = body.joints[j2].position - body.joints[j1].position;
        let length = direction.length();
        let target = Unit::from(connection.length);

        if length == 0 {
            continue;
        }

        // relative elongation in fixed point
        let tension = (i64::from(length - target) * i64::from(F)) / i64::from(fixed::non_zero(target));
        let tension = tension as Unit;

        if tension.abs() <= TENSION_THRESHOLD {
            continue;
        }

        let pull = direction
            .scaled_to(F, length)
            .times(tension / TENSION_DIVIDER);

        body.joints[j1].add_velocity(pull);
        body.joints[j2].add_velocity(-pull);
    }
}
