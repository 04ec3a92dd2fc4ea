//! # Bodies
//!
//! A [`Body`] is a graph of joints held together by distance connections,
//! with a total mass, friction/elasticity coefficients, behavior flags and
//! an activity counter. Rigid, soft and non-rotating behavior all come out
//! of this one representation; there is no inertia tensor and no stored
//! orientation.
//!
//! Joint and connection storage is owned by the caller and borrowed here,
//! so the engine never allocates during simulation and bodies can live in
//! static arrays on small targets.

use crate::error::Error;
use crate::fixed::{self, Unit, F, INFINITY};
use crate::joint::{hash, Connection, Joint};
use crate::rotation::{self, Quat};
use crate::vec3::Vec3;

/// Body behavior flags, OR-ed into [`Body::flags`].
pub mod flags {
    /// Body is asleep: skipped by integration, constraints and activity
    /// bookkeeping until an external wake or a collision touches it.
    pub const DEACTIVATED: u8 = 1 << 0;
    /// Joint velocities are averaged every step so the body translates
    /// without ever picking up spin.
    pub const NONROTATING: u8 = 1 << 1;
    /// Body takes no part in the simulation at all.
    pub const DISABLED: u8 = 1 << 2;
    /// Connections act as springs on velocities instead of being rigidly
    /// re-imposed on positions; the body deforms freely.
    pub const SOFT: u8 = 1 << 3;
    /// Skip self-collisions inside a soft body whose connection graph
    /// already keeps its joints apart (strings, simple grids).
    pub const SIMPLE_CONN: u8 = 1 << 4;
    /// Never deactivate this body no matter how still it is.
    pub const ALWAYS_ACTIVE: u8 = 1 << 5;
}

/// Quiet frames before a body is put to sleep.
pub const DEACTIVATE_AFTER: u16 = 128;

/// Average joint speed below which a frame counts as quiet.
pub const LOW_SPEED: Unit = 30;

#[derive(Debug)]
/// Physical body: a non-empty joint slice, a (possibly empty) connection
/// slice and the shared per-body attributes.
pub struct Body<'a> {
    /// Joints of the body; the slice is caller-owned.
    pub joints: &'a mut [Joint],
    /// Distance constraints between the joints.
    pub connections: &'a mut [Connection],
    /// Total mass; [`INFINITY`] makes the body static (immovable).
    pub mass: Unit,
    /// Mass of each individual joint (`mass / joint count`).
    pub joint_mass: Unit,
    /// Surface friction coefficient, nominally `0..=F`.
    pub friction: Unit,
    /// Collision elasticity (restitution), nominally `0..=F`.
    pub elasticity: Unit,
    /// Behavior bits from [`flags`].
    pub flags: u8,
    /// Consecutive quiet frames; reaching [`DEACTIVATE_AFTER`] sleeps the
    /// body.
    pub deactivate_count: u16,
    /// Radius of the bounding sphere around the center of mass, fixed at
    /// construction. Used for cheap pair rejection.
    pub bounding_radius: Unit,
}

impl<'a> Body<'a> {
    /// Assembles a body over caller-owned joint and connection storage.
    ///
    /// The body is taken to be at rest in its canonical shape: every
    /// connection's rest length is computed from the current distance of
    /// its joints, and the bounding sphere is derived from the same pose.
    ///
    /// # Errors
    ///
    /// Rejects an empty joint slice, connection endpoints outside the
    /// slice, and connections whose joints coincide (no rest length can be
    /// derived).
    pub fn new(
        joints: &'a mut [Joint],
        connections: &'a mut [Connection],
        mass: Unit,
    ) -> Result<Self, Error> {
        if joints.is_empty() {
            return Err(Error::EmptyBody);
        }

        for (index, connection) in connections.iter_mut().enumerate() {
            let j1 = usize::from(connection.joint1);
            let j2 = usize::from(connection.joint2);

            for joint in [j1, j2] {
                if joint >= joints.len() {
                    return Err(Error::ConnectionOutOfRange { index, joint });
                }
            }

            let length = joints[j1].position.dist(joints[j2].position);

            if length == 0 {
                return Err(Error::DegenerateConnection { index });
            }

            connection.length = length.clamp(0, Unit::from(u16::MAX)) as u16;
        }

        let joint_mass = if mass == INFINITY {
            INFINITY
        } else {
            mass / fixed::non_zero(joints.len() as Unit)
        };

        let mut body = Self {
            joints,
            connections,
            mass,
            joint_mass,
            friction: F / 2,
            elasticity: F / 2,
            flags: 0,
            deactivate_count: 0,
            bounding_radius: 0,
        };

        body.bounding_radius = body.compute_bounding_radius();

        Ok(body)
    }

    fn compute_bounding_radius(&self) -> Unit {
        let center = self.center_of_mass();

        self.joints
            .iter()
            .map(|joint| center.dist(joint.position) + joint.size())
            .max()
            .unwrap_or(0)
    }

    /// True when the body has infinite mass and therefore never moves.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.mass == INFINITY
    }

    /// Center of mass: the plain average of joint positions, since mass is
    /// distributed uniformly over the joints.
    #[must_use]
    pub fn center_of_mass(&self) -> Vec3 {
        let mut x = 0i64;
        let mut y = 0i64;
        let mut z = 0i64;

        for joint in self.joints.iter() {
            x += i64::from(joint.position.x);
            y += i64::from(joint.position.y);
            z += i64::from(joint.position.z);
        }

        let n = self.joints.len() as i64;

        Vec3::new((x / n) as Unit, (y / n) as Unit, (z / n) as Unit)
    }

    /// Translates every joint by `offset`. Wakes the body.
    pub fn move_by(&mut self, offset: Vec3) {
        self.wake();

        for joint in self.joints.iter_mut() {
            joint.position += offset;
        }
    }

    /// Moves the body so its center of mass lands on `position`.
    pub fn move_to(&mut self, position: Vec3) {
        let offset = position - self.center_of_mass();
        self.move_by(offset);
    }

    /// Adds `velocity` to every joint. No-op for static bodies; wakes
    /// everything else.
    pub fn accelerate(&mut self, velocity: Vec3) {
        if self.is_static() {
            return;
        }

        self.wake();

        for joint in self.joints.iter_mut() {
            joint.add_velocity(velocity);
        }
    }

    /// Accelerates the body downward by `g`, skipping static and sleeping
    /// bodies (so gravity does not keep resting bodies awake).
    pub fn apply_gravity(&mut self, g: Unit) {
        if self.is_static() || !self.is_active() || self.flags & flags::DISABLED != 0 {
            return;
        }

        for joint in self.joints.iter_mut() {
            joint.add_velocity(Vec3::new(0, -g, 0));
        }
    }

    /// Zeroes all joint velocities.
    pub fn stop(&mut self) {
        for joint in self.joints.iter_mut() {
            joint.velocity = [0; 3];
        }
    }

    /// Adds a spinning motion around the center of mass. `axis_velocity`
    /// points along the rotation axis (right hand rule) and its length is
    /// the angular velocity; each joint picks up the matching tangential
    /// velocity for its offset from the axis.
    pub fn spin(&mut self, axis_velocity: Vec3) {
        let center = self.center_of_mass();
        self.spin_with_center(axis_velocity, center);
    }

    /// [`spin`](Self::spin) around an arbitrary center instead of the
    /// center of mass.
    pub fn spin_with_center(&mut self, axis_velocity: Vec3, center: Vec3) {
        if self.is_static() {
            return;
        }

        self.wake();

        let axis = axis_velocity.normalized();

        for joint in self.joints.iter_mut() {
            let offset = joint.position - center;
            let radial = offset - offset.project_onto(axis);
            joint.add_velocity(axis_velocity.cross(radial));
        }
    }

    /// Rotates the body's joints around its center of mass; the argument is
    /// the rotation axis scaled by the angle.
    pub fn rotate_by_axis(&mut self, axis_times_angle: Vec3) {
        let angle = axis_times_angle.length();

        if angle == 0 {
            return;
        }

        self.wake();

        let q = Quat::from_axis_angle(axis_times_angle, angle);
        let center = self.center_of_mass();

        for joint in self.joints.iter_mut() {
            joint.position = center + rotation::rotate_point(joint.position - center, q);
        }
    }

    /// Applies an impulse at a world-space point, mapped onto the joint
    /// nearest that point. Wakes the body.
    pub fn apply_impulse(&mut self, point: Vec3, impulse: Vec3) {
        if self.is_static() {
            return;
        }

        self.wake();

        let Some(joint) = self
            .joints
            .iter_mut()
            .min_by_key(|joint| joint.position.dist(point))
        else {
            return;
        };

        let m = i64::from(fixed::non_zero(self.joint_mass));
        let delta = Vec3::new(
            ((i64::from(impulse.x) * i64::from(F)) / m) as Unit,
            ((i64::from(impulse.y) * i64::from(F)) / m) as Unit,
            ((i64::from(impulse.z) * i64::from(F)) / m) as Unit,
        );

        joint.add_velocity(delta);
    }

    /// Average joint speed, the measure the activity machine watches.
    #[must_use]
    pub fn average_speed(&self) -> Unit {
        self.net_speed() / fixed::non_zero(self.joints.len() as Unit)
    }

    /// Sum of all joint speeds.
    #[must_use]
    pub fn net_speed(&self) -> Unit {
        self.joints
            .iter()
            .map(|joint| joint.velocity_vec().length())
            .sum()
    }

    /// Scales every joint velocity by the fixed-point `factor`; game code
    /// uses this to fake energy conservation or damp a body over time.
    pub fn multiply_net_speed(&mut self, factor: Unit) {
        for joint in self.joints.iter_mut() {
            joint.set_velocity(joint.velocity_vec().times(factor));
        }
    }

    /// Whether the body currently takes part in simulation (not asleep).
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.flags & flags::DEACTIVATED == 0
    }

    /// Clears the sleeping state and resets the quiet-frame counter.
    pub fn activate(&mut self) {
        self.flags &= !flags::DEACTIVATED;
        self.deactivate_count = 0;
    }

    /// Alias of [`activate`](Self::activate); every external disturbance
    /// routes through this.
    pub fn wake(&mut self) {
        self.activate();
    }

    /// Puts the body to sleep immediately.
    pub fn deactivate(&mut self) {
        self.flags |= flags::DEACTIVATED;
        self.deactivate_count = DEACTIVATE_AFTER;
    }

    /// Orientation estimate from three joints: the joint at `forward`
    /// yields the forward axis, the joint at `right` the right axis, both
    /// relative to the joint at `origin`. Returns Euler angles `(x, y, z)`
    /// applied in y-x-z order, ready for a renderer.
    #[must_use]
    pub fn rotation(&self, origin: usize, forward: usize, right: usize) -> Vec3 {
        rotation::rotation_from_vecs(
            self.joints[forward].position - self.joints[origin].position,
            self.joints[right].position - self.joints[origin].position,
        )
    }

    /// Deterministic digest of the whole body: joints, connections, counts,
    /// flags and mass all contribute, in order.
    #[must_use]
    pub fn state_hash(&self) -> u32 {
        let mut digest = hash::fold(hash::SEED, self.joints.len() as u32);
        digest = hash::fold(digest, self.connections.len() as u32);

        for joint in self.joints.iter() {
            digest = hash::fold(digest, joint.state_hash());
        }

        for connection in self.connections.iter() {
            digest = hash::fold(digest, connection.state_hash());
        }

        digest = hash::fold(digest, u32::from(self.flags));
        hash::fold(digest, self.joint_mass as u32)
    }
}
