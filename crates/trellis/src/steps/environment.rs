//! Projection of joints out of the solid environment.

use crate::body::Body;
use crate::env::EnvironmentFn;
use crate::fixed::{Unit, F};
use crate::joint::Joint;
use crate::vec3::Vec3;

/// Attempts made to back a fully embedded joint out along its incoming
/// velocity before giving up on it for this step.
const BACKTRACK_STEPS: u32 = 8;

/// Resolves every joint of `body` against the environment.
pub fn resolve(body: &mut Body, environment: EnvironmentFn) {
    let elasticity = body.elasticity;
    let friction = body.friction;

    for joint in body.joints.iter_mut() {
        resolve_joint(joint, elasticity, friction, environment);
    }
}

/// Resolves a single joint: if its sphere overlaps the solid, the joint is
/// moved back onto the free side and its velocity answers the surface.
/// The normal component reflects scaled by `elasticity`, and the
/// tangential component loses up to `friction` times the incoming normal
/// speed. Tying friction to the normal speed keeps bodies accelerating
/// down slopes steeper than their friction angle instead of creeping.
pub fn resolve_joint(
    joint: &mut Joint,
    elasticity: Unit,
    friction: Unit,
    environment: EnvironmentFn,
) {
    let size = joint.size();
    let mut surface = environment(joint.position, size);

    if surface == joint.position {
        // The joint center is inside the solid, so there is no usable
        // normal. Retrace the motion that got it there; if that fails the
        // joint stays put until something moves it.
        let velocity = joint.velocity_vec();

        if velocity == Vec3::ZERO {
            return;
        }

        let mut position = joint.position;
        let mut freed = false;

        for _ in 0..BACKTRACK_STEPS {
            position -= velocity;
            surface = environment(position, size);

            if surface != position {
                freed = true;
                break;
            }
        }

        if !freed {
            tracing::trace!(?position, "joint stuck inside environment");
            return;
        }

        joint.position = position;
    }

    let to_joint = joint.position - surface;
    let distance = to_joint.length();

    if distance >= size || distance == 0 {
        return;
    }

    // push the sphere flush with the surface
    let normal = to_joint.scaled_to(F, distance);
    joint.position = surface + to_joint.scaled_to(size, distance);

    let velocity = joint.velocity_vec();
    let along_normal = velocity.dot(normal);

    if along_normal >= 0 {
        // grazing an overlap while already separating: position-only fix
        return;
    }

    let normal_part = normal.times(along_normal);
    let tangent_part = velocity - normal_part;

    // reflect, keeping `elasticity` of the incoming normal speed
    let bounced = normal.times((-along_normal * elasticity) / F);

    // Coulomb-style clamp: friction removes at most `friction` times the
    // incoming normal speed from the tangential motion
    let tangent_speed = tangent_part.length();
    let friction_cut = ((-along_normal) * friction) / F;
    let slowed = if tangent_speed == 0 || friction_cut >= tangent_speed {
        Vec3::ZERO
    } else {
        tangent_part.scaled_to(tangent_speed - friction_cut, tangent_speed)
    };

    joint.set_velocity(slowed + bounced);
}
