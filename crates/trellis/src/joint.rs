//! # Joints and Connections
//!
//! A [`Joint`] is a spherical point mass and the engine's only collision
//! primitive; a [`Connection`] is a fixed-distance constraint between two
//! joints of the same body. Both are small `repr(C)` POD records:
//! connections address joints by index rather than pointer, so whole bodies
//! can be memcpy'd, serialized or hashed without fixups.

use crate::fixed::{Unit, F};
use crate::vec3::Vec3;

/// Granularity of the stored joint size: sizes are kept divided by this so
/// realistic joint radii fit a byte.
pub const JOINT_SIZE_DIVISOR: Unit = F / 32;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
/// Spherical point mass.
///
/// Velocity is stored as three `i16`s (enough range for any realistic
/// per-tick motion) and the radius as a byte in [`JOINT_SIZE_DIVISOR`]
/// granules, keeping the record at 20 bytes.
pub struct Joint {
    /// World-space position of the joint center.
    pub position: Vec3,
    /// Velocity in units per tick, one lane per axis.
    pub velocity: [i16; 3],
    /// Collision radius divided by [`JOINT_SIZE_DIVISOR`].
    pub size_divided: u8,
    _pad: u8,
}

impl Joint {
    /// Creates a joint at `position` with the given collision radius. The
    /// radius is quantized to [`JOINT_SIZE_DIVISOR`] granules; radii below
    /// one granule collapse to zero, producing a non-colliding point.
    #[must_use]
    pub fn new(position: Vec3, size: Unit) -> Self {
        let granules = fixed_granules(size);

        Self {
            position,
            velocity: [0; 3],
            size_divided: granules,
            _pad: 0,
        }
    }

    /// Collision radius in units.
    #[must_use]
    pub fn size(&self) -> Unit {
        Unit::from(self.size_divided) * JOINT_SIZE_DIVISOR
    }

    /// Velocity as a vector.
    #[must_use]
    pub fn velocity_vec(&self) -> Vec3 {
        Vec3::new(
            Unit::from(self.velocity[0]),
            Unit::from(self.velocity[1]),
            Unit::from(self.velocity[2]),
        )
    }

    /// Overwrites the velocity, saturating each lane to the stored range.
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = [
            saturate(velocity.x),
            saturate(velocity.y),
            saturate(velocity.z),
        ];
    }

    /// Adds to the velocity, saturating each lane.
    pub fn add_velocity(&mut self, delta: Vec3) {
        self.set_velocity(self.velocity_vec() + delta);
    }

    /// Forces the joint to `position` and zeroes its velocity. Game code
    /// calls this every frame to make a kinematic anchor (pendulum tops,
    /// cloth edges).
    pub fn pin(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = [0; 3];
    }

    /// Deterministic digest of the joint state; any change to position,
    /// velocity or size changes the result.
    #[must_use]
    pub fn state_hash(&self) -> u32 {
        hash::fold_pod(hash::SEED, self)
    }
}

fn saturate(v: Unit) -> i16 {
    v.clamp(Unit::from(i16::MIN), Unit::from(i16::MAX)) as i16
}

fn fixed_granules(size: Unit) -> u8 {
    (size / JOINT_SIZE_DIVISOR).clamp(0, Unit::from(u8::MAX)) as u8
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
/// Fixed-distance constraint between two joints of the owning body.
pub struct Connection {
    /// Index of the first joint within the body's joint slice.
    pub joint1: u8,
    /// Index of the second joint.
    pub joint2: u8,
    /// Rest length the solver maintains, equal to the joint distance at
    /// body construction.
    pub length: u16,
}

impl Connection {
    /// Creates a connection between two joint indices; the rest length is
    /// filled in when the owning body is constructed.
    #[must_use]
    pub const fn new(joint1: u8, joint2: u8) -> Self {
        Self {
            joint1,
            joint2,
            length: 0,
        }
    }

    /// Deterministic digest of the connection (endpoint order matters).
    #[must_use]
    pub fn state_hash(&self) -> u32 {
        hash::fold_pod(hash::SEED, self)
    }
}

pub(crate) mod hash {
    //! 32-bit state digests. A small avalanche mixer is folded over the raw
    //! bytes of the POD records, in order, so permuted or truncated state
    //! hashes differently. Used by the world hash for regression testing of
    //! bit-exact determinism.

    pub(crate) const SEED: u32 = 0x9e37_79b9;

    /// Avalanche mixer (the public-domain "lowbias32" constants).
    pub(crate) fn mix(mut n: u32) -> u32 {
        n ^= n >> 16;
        n = n.wrapping_mul(0x7feb_352d);
        n ^= n >> 15;
        n = n.wrapping_mul(0x846c_a68b);
        n ^= n >> 16;
        n
    }

    /// Folds a word into a running digest.
    pub(crate) fn fold(state: u32, word: u32) -> u32 {
        mix(state ^ word)
    }

    /// Folds every byte of a POD value, four at a time.
    pub(crate) fn fold_pod<T: bytemuck::Pod>(state: u32, value: &T) -> u32 {
        let mut digest = state;

        for chunk in bytemuck::bytes_of(value).chunks(4) {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            digest = fold(digest, u32::from_le_bytes(word));
        }

        digest
    }
}
