//! Euler integration of joint velocities into positions.

use crate::body::{flags, Body};
use crate::fixed::Unit;
use crate::vec3::Vec3;

/// Moves every joint of `body` by its per-tick velocity.
///
/// Non-rotating bodies first get their joint velocities replaced by the
/// body-wide mean, which keeps the lattice translating as one block and
/// preserves net momentum while making spin impossible.
pub fn integrate(body: &mut Body) {
    if body.flags & flags::NONROTATING != 0 {
        let mut sum = [0i64; 3];

        for joint in body.joints.iter() {
            for (lane, total) in sum.iter_mut().enumerate() {
                *total += i64::from(joint.velocity[lane]);
            }
        }

        let n = body.joints.len() as i64;
        let mean = Vec3::new(
            (sum[0] / n) as Unit,
            (sum[1] / n) as Unit,
            (sum[2] / n) as Unit,
        );

        for joint in body.joints.iter_mut() {
            joint.set_velocity(mean);
        }
    }

    for joint in body.joints.iter_mut() {
        joint.position += joint.velocity_vec();
    }
}
