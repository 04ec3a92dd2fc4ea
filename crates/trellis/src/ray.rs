//! Ray casts against bodies and against the environment.

use crate::body::flags;
use crate::env::EnvironmentFn;
use crate::fixed::{self, Unit};
use crate::vec3::Vec3;
use crate::world::World;

/// Result of a successful [`cast_body_ray`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyRayHit {
    /// Index of the body that was hit.
    pub body: usize,
    /// Index of the hit joint within that body.
    pub joint: usize,
    /// World-space hit position on the joint sphere.
    pub position: Vec3,
}

/// Casts a ray against every joint sphere in the world and returns the
/// nearest hit along the ray, if any. `exclude` skips one body, which lets
/// game code shoot rays out of its own avatar.
#[must_use]
pub fn cast_body_ray(
    origin: Vec3,
    direction: Vec3,
    exclude: Option<usize>,
    world: &World,
) -> Option<BodyRayHit> {
    let direction = direction.normalized();
    let mut best: Option<(Unit, BodyRayHit)> = None;

    for (body_index, body) in world.bodies.iter().enumerate() {
        if exclude == Some(body_index) || body.flags & flags::DISABLED != 0 {
            continue;
        }

        for (joint_index, joint) in body.joints.iter().enumerate() {
            let to_center = joint.position - origin;
            let along = to_center.dot(direction);

            if along < 0 {
                continue;
            }

            let closest = origin + direction.times(along);
            let offset = closest.dist(joint.position);
            let size = joint.size();

            if offset >= size {
                continue;
            }

            // pull the hit back from the perpendicular foot to the sphere
            // surface
            let back = fixed::sqrt_wide(
                i64::from(size) * i64::from(size) - i64::from(offset) * i64::from(offset),
            ) as Unit;
            let t = (along - back).max(0);

            if best.map_or(true, |(best_t, _)| t < best_t) {
                best = Some((
                    t,
                    BodyRayHit {
                        body: body_index,
                        joint: joint_index,
                        position: origin + direction.times(t),
                    },
                ));
            }
        }
    }

    best.map(|(_, hit)| hit)
}

/// Marches a ray against the environment: the ray advances `step` units at
/// a time until a sample lands inside the solid, then the crossing is
/// refined by bisection for `refine_steps` rounds.
///
/// Returns the free-side point of the crossing; if the origin itself is
/// inside the solid it is returned unchanged, and if nothing is hit within
/// `max_steps` the last sampled point comes back.
#[must_use]
pub fn cast_environment_ray(
    origin: Vec3,
    direction: Vec3,
    environment: EnvironmentFn,
    step: Unit,
    max_steps: u32,
    refine_steps: u32,
) -> Vec3 {
    let direction = direction.normalized();

    if environment(origin, step) == origin {
        return origin;
    }

    let mut free = origin;
    let mut travelled: Unit = 0;

    for _ in 0..max_steps {
        travelled += step;
        let probe = origin + direction.times(travelled);

        if environment(probe, step) == probe {
            // crossed into the solid somewhere between `free` and `probe`
            let mut inside = probe;

            for _ in 0..refine_steps {
                let midpoint = free.average(inside);

                if midpoint == free || midpoint == inside {
                    break;
                }

                if environment(midpoint, step) == midpoint {
                    inside = midpoint;
                } else {
                    free = midpoint;
                }
            }

            return free;
        }

        free = probe;
    }

    free
}
