//! # Vector Kernel
//!
//! Three-component fixed-point vectors. The layout is `repr(C)` and
//! [`bytemuck::Pod`] so vectors (and the joint records built from them) can
//! be copied, serialized or hashed as raw bytes.

use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use crate::fixed::{self, Unit, F};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
/// Fixed-point 3-vector; positions, velocities and directions all use it.
pub struct Vec3 {
    /// X component.
    pub x: Unit,
    /// Y component.
    pub y: Unit,
    /// Z component.
    pub z: Unit,
}

impl Vec3 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0, 0, 0);

    /// Creates a new [`Vec3`]. `const` so static geometry can be built in
    /// constant expressions.
    #[must_use]
    pub const fn new(x: Unit, y: Unit, z: Unit) -> Self {
        Self { x, y, z }
    }

    /// Normalized dot product: `(a·b) / F`. For two unit-length vectors the
    /// result is in `[-F, F]`.
    #[must_use]
    pub fn dot(self, other: Self) -> Unit {
        (self.dot_wide(other) / i64::from(F)) as Unit
    }

    /// Plain widened dot product with no normalization; internal building
    /// block for lengths and projections.
    pub(crate) fn dot_wide(self, other: Self) -> i64 {
        i64::from(self.x) * i64::from(other.x)
            + i64::from(self.y) * i64::from(other.y)
            + i64::from(self.z) * i64::from(other.z)
    }

    /// Cross product, each component normalized by `F`.
    #[must_use]
    pub fn cross(self, other: Self) -> Self {
        Self::new(
            ((i64::from(self.y) * i64::from(other.z) - i64::from(self.z) * i64::from(other.y))
                / i64::from(F)) as Unit,
            ((i64::from(self.z) * i64::from(other.x) - i64::from(self.x) * i64::from(other.z))
                / i64::from(F)) as Unit,
            ((i64::from(self.x) * i64::from(other.y) - i64::from(self.y) * i64::from(other.x))
                / i64::from(F)) as Unit,
        )
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> Unit {
        fixed::sqrt_wide(self.dot_wide(self)) as Unit
    }

    /// Taxicab (L1) length; a cheap magnitude estimate.
    #[must_use]
    pub fn length_taxicab(self) -> Unit {
        self.x.abs() + self.y.abs() + self.z.abs()
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn dist(self, other: Self) -> Unit {
        (self - other).length()
    }

    /// Returns the vector scaled to length `F`.
    ///
    /// Two conventions harden degenerate inputs: the zero vector normalizes
    /// to `(F, 0, 0)`, and very short vectors are upscaled before dividing
    /// so their direction survives integer rounding.
    #[must_use]
    pub fn normalized(self) -> Self {
        let mut v = self;
        let mut length = v.length();

        if length == 0 {
            return Self::new(F, 0, 0);
        }

        if length < 16 {
            v = Self::new(v.x * 16, v.y * 16, v.z * 16);
            length = v.length();
        }

        v.scaled_to(F, length)
    }

    /// Multiplies by a fixed-point factor: `v * factor / F`.
    #[must_use]
    pub fn times(self, factor: Unit) -> Self {
        Self::new(
            ((i64::from(self.x) * i64::from(factor)) / i64::from(F)) as Unit,
            ((i64::from(self.y) * i64::from(factor)) / i64::from(F)) as Unit,
            ((i64::from(self.z) * i64::from(factor)) / i64::from(F)) as Unit,
        )
    }

    /// Rescales a vector of known length: `v * target / current`. The
    /// caller guarantees `current` is this vector's length and nonzero.
    pub(crate) fn scaled_to(self, target: Unit, current: Unit) -> Self {
        Self::new(
            ((i64::from(self.x) * i64::from(target)) / i64::from(current)) as Unit,
            ((i64::from(self.y) * i64::from(target)) / i64::from(current)) as Unit,
            ((i64::from(self.z) * i64::from(target)) / i64::from(current)) as Unit,
        )
    }

    /// Projects the vector onto `base`, which must be unit length (`F`).
    #[must_use]
    pub fn project_onto(self, base: Self) -> Self {
        base.times(self.dot(base))
    }

    /// Component-wise midpoint of two vectors.
    #[must_use]
    pub fn average(self, other: Self) -> Self {
        Self::new(
            (self.x + other.x) / 2,
            (self.y + other.y) / 2,
            (self.z + other.z) / 2,
        )
    }

    /// Clamps the point into an axis-aligned box around `center` with the
    /// given per-axis maximum offsets. Handy for dead-zone camera follow.
    #[must_use]
    pub fn keep_within_box(self, center: Self, max_offsets: Self) -> Self {
        Self::new(
            fixed::keep_in_range(self.x, center.x - max_offsets.x, center.x + max_offsets.x),
            fixed::keep_in_range(self.y, center.y - max_offsets.y, center.y + max_offsets.y),
            fixed::keep_in_range(self.z, center.z - max_offsets.z, center.z + max_offsets.z),
        )
    }

    /// Keeps the point between `min_distance` and `max_distance` from
    /// `center`, moving it radially when outside the band.
    #[must_use]
    pub fn keep_within_distance_band(
        self,
        center: Self,
        min_distance: Unit,
        max_distance: Unit,
    ) -> Self {
        let to_point = self - center;
        let distance = to_point.length();

        if distance > max_distance {
            center + to_point.scaled_to(max_distance, distance)
        } else if distance < min_distance {
            if distance == 0 {
                center + Self::new(min_distance, 0, 0)
            } else {
                center + to_point.scaled_to(min_distance, distance)
            }
        } else {
            self
        }
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Neg for Vec3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// Closest point on the line segment `(a, b)` to point `p`: the segment
/// parameter `t = (ab · ap) / (ab · ab)` is clamped to `[0, F]`, so queries
/// past either endpoint return that endpoint.
#[must_use]
pub fn line_segment_closest_point(a: Vec3, b: Vec3, p: Vec3) -> Vec3 {
    let ab = b - a;
    let denominator = ab.dot_wide(ab);

    if denominator == 0 {
        return a;
    }

    let t = (ab.dot_wide(p - a) * i64::from(F)) / denominator;
    let t = t.clamp(0, i64::from(F)) as Unit;

    a + ab.times(t)
}
