//! # World Driver
//!
//! [`World`] ties the pieces together: it borrows the caller's bodies, an
//! optional environment function and an optional collision filter, and
//! [`World::step`] advances the whole simulation by one tick.
//!
//! ## Stepping
//!
//! A step always executes the same sequence (integrate, solve
//! connections, resolve the environment, resolve body pairs, update
//! activity), iterating bodies, joints and pairs in ascending index order.
//! With fixed-point math throughout this makes a step a pure function of
//! the world state: given the same state and inputs, every platform
//! produces bit-identical results. [`World::hash`] digests all joint state
//! so tests can pin simulated outcomes to a single number.
//!
//! ## Pacing
//!
//! One call is one tick; there is no internal clock, no threads and no
//! blocking. The caller paces `step` at whatever simulation rate it wants
//! and applies gravity or controls between calls.

use crate::body::{flags, Body, DEACTIVATE_AFTER, LOW_SPEED};
use crate::env::EnvironmentFn;
use crate::fixed::Unit;
use crate::joint::hash;
use crate::steps;
use crate::vec3::Vec3;

/// Collision filter and notification hook: receives body and joint indices
/// of both sides plus the contact point, once per colliding joint pair per
/// step, *before* any response. Returning `false` vetoes the response;
/// this is the hook for one-way platforms, hit detection and similar
/// game logic.
pub type CollisionCallback = fn(usize, usize, usize, usize, Vec3) -> bool;

#[derive(Debug)]
/// A simulated world: borrowed bodies plus the two world-level callbacks.
///
/// Worlds own nothing and never allocate; several may coexist as long as
/// their body storage does not overlap.
pub struct World<'w, 'b> {
    /// Bodies participating in the simulation.
    pub bodies: &'w mut [Body<'b>],
    /// Closest-point function bounding the world, if any.
    pub environment: Option<EnvironmentFn>,
    /// Collision filter invoked for every detected joint contact.
    pub collision_callback: Option<CollisionCallback>,
}

impl<'w, 'b> World<'w, 'b> {
    /// Creates a world over caller-owned bodies.
    #[must_use]
    pub fn new(bodies: &'w mut [Body<'b>], environment: Option<EnvironmentFn>) -> Self {
        Self {
            bodies,
            environment,
            collision_callback: None,
        }
    }

    /// Advances the simulation by one tick.
    pub fn step(&mut self) {
        for body in self.bodies.iter_mut() {
            if body.flags & (flags::DEACTIVATED | flags::DISABLED) != 0 || body.is_static() {
                continue;
            }

            steps::integration::integrate(body);

            if body.flags & flags::SOFT == 0 {
                steps::reshape::reshape(body);
            } else {
                steps::reshape::apply_springs(body);
            }

            if let Some(environment) = self.environment {
                steps::environment::resolve(body, environment);
            }
        }

        steps::contact::resolve_all(self.bodies, self.collision_callback);

        self.update_activity();
    }

    fn update_activity(&mut self) {
        for (index, body) in self.bodies.iter_mut().enumerate() {
            if body.flags & (flags::DEACTIVATED | flags::DISABLED | flags::ALWAYS_ACTIVE) != 0
                || body.is_static()
            {
                continue;
            }

            if body.average_speed() < LOW_SPEED {
                body.deactivate_count += 1;

                if body.deactivate_count >= DEACTIVATE_AFTER {
                    // freeze residual creep so the sleeping state is stable
                    body.stop();
                    body.flags |= flags::DEACTIVATED;
                    tracing::debug!(body = index, "deactivating resting body");
                }
            } else {
                body.deactivate_count = 0;
            }
        }
    }

    /// Sum of all joint speeds across the world; a cheap global measure of
    /// how much is going on.
    #[must_use]
    pub fn net_speed(&self) -> Unit {
        self.bodies
            .iter()
            .filter(|body| body.flags & flags::DISABLED == 0)
            .map(Body::net_speed)
            .sum()
    }

    /// Wakes every body.
    pub fn activate_all(&mut self) {
        for body in self.bodies.iter_mut() {
            body.activate();
        }
    }

    /// Puts every body to sleep.
    pub fn deactivate_all(&mut self) {
        for body in self.bodies.iter_mut() {
            body.deactivate();
        }
    }

    /// Deterministic 32-bit digest of the whole world: every body's state
    /// folded in index order, then the body count. Running a fixture and
    /// comparing hashes is how the test suite asserts bit-exact
    /// reproducibility.
    #[must_use]
    pub fn hash(&self) -> u32 {
        let mut digest = hash::SEED;

        for body in self.bodies.iter() {
            digest = hash::fold(digest, body.state_hash());
        }

        hash::fold(digest, self.bodies.len() as u32)
    }
}
