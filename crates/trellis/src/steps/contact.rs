//! Joint-vs-joint collision detection and response.
//!
//! Every collision primitive in the engine is a sphere (a joint), so the
//! whole narrow phase is sphere-sphere: two joints collide when their
//! center distance drops under the sum of their radii. Pairs are visited in
//! ascending `(body, joint)` order and answered immediately, with no
//! convergence iteration; the visiting order is part of the engine's
//! deterministic contract.

use crate::body::{flags, Body};
use crate::fixed::{Unit, F, INFINITY};
use crate::joint::Joint;
use crate::vec3::Vec3;
use crate::world::CollisionCallback;

/// Runs collision detection and response over every body pair (and the
/// inside of self-colliding soft bodies). Returns via side effects only:
/// joint positions and velocities change, touched sleeping bodies wake.
pub fn resolve_all(bodies: &mut [Body], callback: Option<CollisionCallback>) {
    let count = bodies.len();

    for first in 0..count {
        if bodies[first].flags & flags::DISABLED != 0 {
            continue;
        }

        let soft = bodies[first].flags & flags::SOFT != 0;
        let simple = bodies[first].flags & flags::SIMPLE_CONN != 0;

        if soft && !simple && bodies[first].is_active() {
            resolve_within_body(&mut bodies[first], first, callback);
        }

        for second in first + 1..count {
            if bodies[second].flags & flags::DISABLED != 0 {
                continue;
            }

            // a pair of sleepers cannot produce a new contact
            if !bodies[first].is_active() && !bodies[second].is_active() {
                continue;
            }

            let centers = (
                bodies[first].center_of_mass(),
                bodies[second].center_of_mass(),
            );
            let reach = bodies[first].bounding_radius + bodies[second].bounding_radius;

            if centers.0.dist(centers.1) > reach {
                continue;
            }

            let (head, tail) = bodies.split_at_mut(second);
            resolve_body_pair(&mut head[first], first, &mut tail[0], second, callback);
        }
    }
}

fn resolve_body_pair(
    body1: &mut Body,
    index1: usize,
    body2: &mut Body,
    index2: usize,
    callback: Option<CollisionCallback>,
) {
    let inverse1 = inverse_mass(body1.mass);
    let inverse2 = inverse_mass(body2.mass);

    if inverse1 + inverse2 == 0 {
        return;
    }

    let elasticity = body1.elasticity.min(body2.elasticity);
    let friction = body1.friction.min(body2.friction);

    for j1 in 0..body1.joints.len() {
        for j2 in 0..body2.joints.len() {
            let Some(point) = contact_point(&body1.joints[j1], &body2.joints[j2]) else {
                continue;
            };

            if let Some(callback) = callback {
                if !callback(index1, j1, index2, j2, point) {
                    continue;
                }
            }

            // contact first, wake second, impulse third
            if !body1.is_active() {
                tracing::trace!(body = index1, "woken by collision");
            }
            if !body2.is_active() {
                tracing::trace!(body = index2, "woken by collision");
            }
            body1.activate();
            body2.activate();

            resolve_joint_pair(
                &mut body1.joints[j1],
                &mut body2.joints[j2],
                inverse1,
                inverse2,
                elasticity,
                friction,
            );
        }
    }
}

/// Self-collision inside one soft body: every non-connected joint pair is
/// tested, which is what keeps cloth-like bodies from tunneling through
/// themselves.
fn resolve_within_body(body: &mut Body, index: usize, callback: Option<CollisionCallback>) {
    let inverse = inverse_mass(body.mass);

    if inverse == 0 {
        return;
    }

    let elasticity = body.elasticity;
    let friction = body.friction;

    for j1 in 0..body.joints.len() {
        for j2 in j1 + 1..body.joints.len() {
            let connected = body.connections.iter().any(|connection| {
                let a = usize::from(connection.joint1);
                let b = usize::from(connection.joint2);
                (a == j1 && b == j2) || (a == j2 && b == j1)
            });

            if connected {
                continue;
            }

            let Some(point) = contact_point(&body.joints[j1], &body.joints[j2]) else {
                continue;
            };

            if let Some(callback) = callback {
                if !callback(index, j1, index, j2, point) {
                    continue;
                }
            }

            let (head, tail) = body.joints.split_at_mut(j2);
            resolve_joint_pair(&mut head[j1], &mut tail[0], inverse, inverse, elasticity, friction);
        }
    }
}

/// Checks two joints for overlap; on contact returns the point between
/// their centers, weighted onto the shared surface by the two radii.
fn contact_point(joint1: &Joint, joint2: &Joint) -> Option<Vec3> {
    let s1 = joint1.size();
    let s2 = joint2.size();
    let distance = joint1.position.dist(joint2.position);

    if distance >= s1 + s2 {
        return None;
    }

    let direction = joint2.position - joint1.position;

    Some(if distance == 0 {
        joint1.position
    } else {
        joint1.position + direction.scaled_to(s1.min(distance), distance)
    })
}

/// Fixed-point inverse mass `F*F / mass`; zero for static bodies.
fn inverse_mass(mass: Unit) -> i64 {
    if mass == INFINITY {
        0
    } else {
        (i64::from(F) * i64::from(F)) / i64::from(mass.max(1))
    }
}

fn resolve_joint_pair(
    joint1: &mut Joint,
    joint2: &mut Joint,
    inverse1: i64,
    inverse2: i64,
    elasticity: Unit,
    friction: Unit,
) {
    let direction = joint2.position - joint1.position;
    let distance = direction.length();
    let overlap = (joint1.size() + joint2.size()) - distance;

    if overlap <= 0 {
        return;
    }

    let normal = if distance == 0 {
        Vec3::new(0, F, 0)
    } else {
        direction.scaled_to(F, distance)
    };

    let inverse_sum = inverse1 + inverse2;

    // separate, each body moving in proportion to its inverse mass
    let push1 = ((i64::from(overlap) * inverse1) / inverse_sum) as Unit;
    let push2 = ((i64::from(overlap) * inverse2) / inverse_sum) as Unit;
    joint1.position -= normal.times(push1);
    joint2.position += normal.times(push2);

    let velocity1 = joint1.velocity_vec();
    let velocity2 = joint2.velocity_vec();
    let relative = velocity2 - velocity1;
    let closing = relative.dot(normal);

    // joints already separating exchange no impulse
    if closing < 0 {
        // j = -(1 + e) * vrel / (1/m1 + 1/m2), distributed by inverse mass
        let numerator = i64::from(F + elasticity) * i64::from(closing);
        let delta1 = ((numerator * inverse1) / (inverse_sum * i64::from(F))) as Unit;
        let delta2 = ((numerator * inverse2) / (inverse_sum * i64::from(F))) as Unit;

        joint1.add_velocity(normal.times(delta1));
        joint2.add_velocity(normal.times(-delta2));
    }

    // tangential damping stands in for Coulomb friction; the change is
    // split by inverse mass so net momentum is untouched
    if friction > 0 {
        let relative = joint2.velocity_vec() - joint1.velocity_vec();
        let tangent = relative - normal.times(relative.dot(normal));
        let damping = tangent.times(friction);

        if damping != Vec3::ZERO {
            let share1 = ((i64::from(F) * inverse1) / inverse_sum) as Unit;
            let share2 = ((i64::from(F) * inverse2) / inverse_sum) as Unit;

            joint1.add_velocity(damping.times(share1));
            joint2.add_velocity(-damping.times(share2));
        }
    }
}
