//! # Rotation Kernel
//!
//! Quaternions, fixed-point rotation matrices and the orientation helpers
//! built on them. Bodies in this engine carry no rotational state of their
//! own; a renderable orientation is *estimated* from joint positions via
//! [`rotation_from_vecs`], which removes orientation drift as a bug class.
//!
//! Point rotation goes through a 3×3 matrix derived from the quaternion
//! rather than the `q·p·q*` sandwich, which loses more precision in fixed
//! point.

use crate::fixed::{self, Unit, F, PI};
use crate::vec3::Vec3;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
/// Rotation quaternion stored as `(x, y, z, w)` with `w` the real part.
pub struct Quat {
    pub x: Unit,
    pub y: Unit,
    pub z: Unit,
    pub w: Unit,
}

impl Quat {
    /// The identity rotation `(0, 0, 0, F)`.
    pub const IDENTITY: Self = Self {
        x: 0,
        y: 0,
        z: 0,
        w: F,
    };

    /// Builds the quaternion for a rotation of `angle` around `axis` (right
    /// hand rule). The axis is normalized internally.
    #[must_use]
    pub fn from_axis_angle(axis: Vec3, angle: Unit) -> Self {
        let axis = axis.normalized();
        let half_sin = fixed::sin(angle / 2);
        let half_cos = fixed::cos(angle / 2);
        let scaled = axis.times(half_sin);

        Self {
            x: scaled.x,
            y: scaled.y,
            z: scaled.z,
            w: half_cos,
        }
    }

    /// Hamilton product `self * other`, each component normalized by `F`.
    /// Composition is not commutative.
    #[must_use]
    pub fn multiply(self, other: Self) -> Self {
        let (ax, ay, az, aw) = (
            i64::from(self.x),
            i64::from(self.y),
            i64::from(self.z),
            i64::from(self.w),
        );
        let (bx, by, bz, bw) = (
            i64::from(other.x),
            i64::from(other.y),
            i64::from(other.z),
            i64::from(other.w),
        );
        let f = i64::from(F);

        Self {
            x: ((aw * bx + ax * bw + ay * bz - az * by) / f) as Unit,
            y: ((aw * by - ax * bz + ay * bw + az * bx) / f) as Unit,
            z: ((aw * bz + ax * by - ay * bx + az * bw) / f) as Unit,
            w: ((aw * bw - ax * bx - ay * by - az * bz) / f) as Unit,
        }
    }

    /// Conjugate (the opposite rotation).
    #[must_use]
    pub fn conjugate(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: self.w,
        }
    }

    /// Expands the quaternion into a fixed-point 3×3 rotation matrix,
    /// indexed as `[row][column]`.
    #[must_use]
    pub fn to_matrix(self) -> [[Unit; 3]; 3] {
        let (x, y, z, w) = (
            i64::from(self.x),
            i64::from(self.y),
            i64::from(self.z),
            i64::from(self.w),
        );
        let f = i64::from(F);

        let m = |v: i64| (v / f) as Unit;

        [
            [
                F - m(2 * (y * y + z * z)),
                m(2 * (x * y - z * w)),
                m(2 * (x * z + y * w)),
            ],
            [
                m(2 * (x * y + z * w)),
                F - m(2 * (x * x + z * z)),
                m(2 * (y * z - x * w)),
            ],
            [
                m(2 * (x * z - y * w)),
                m(2 * (y * z + x * w)),
                F - m(2 * (x * x + y * y)),
            ],
        ]
    }
}

/// Rotates `point` by the rotation `q`.
#[must_use]
pub fn rotate_point(point: Vec3, q: Quat) -> Vec3 {
    let m = q.to_matrix();
    let f = i64::from(F);
    let row = |r: [Unit; 3]| {
        ((i64::from(r[0]) * i64::from(point.x)
            + i64::from(r[1]) * i64::from(point.y)
            + i64::from(r[2]) * i64::from(point.z))
            / f) as Unit
    };

    Vec3::new(row(m[0]), row(m[1]), row(m[2]))
}

const X_AXIS: Vec3 = Vec3::new(F, 0, 0);
const Y_AXIS: Vec3 = Vec3::new(0, F, 0);
const Z_AXIS: Vec3 = Vec3::new(0, 0, F);

/// Composes an Euler angle triple `(x, y, z)` into a quaternion. The
/// rotations apply in y, x, z order, the same order [`rotation_from_vecs`]
/// extracts them in.
#[must_use]
pub fn euler_to_quaternion(angles: Vec3) -> Quat {
    let qy = Quat::from_axis_angle(Y_AXIS, angles.y);
    let qx = Quat::from_axis_angle(X_AXIS, angles.x);
    let qz = Quat::from_axis_angle(Z_AXIS, angles.z);

    qy.multiply(qx).multiply(qz)
}

/// Euler angles `(x, y, z)` (applied y-x-z) of the orientation whose
/// forward axis (+z at rest) maps to `forward` and right axis (+x at rest)
/// maps to `right`.
///
/// This is the renderer-facing orientation estimate: bodies expose it
/// through [`crate::body::Body::rotation`] by differencing joint positions,
/// so it is only meaningful for bodies with at least three joints arranged
/// by the caller.
#[must_use]
pub fn rotation_from_vecs(forward: Vec3, right: Vec3) -> Vec3 {
    let f = forward.normalized();

    // Yaw around y first, pitch around x second; with those removed the
    // roll is whatever angle the right axis still makes in the xy plane.
    let yaw = fixed::vec2_angle(f.z, f.x);
    let pitch = -fixed::asin(f.y);

    let un_yaw = Quat::from_axis_angle(Y_AXIS, -yaw);
    let un_pitch = Quat::from_axis_angle(X_AXIS, -pitch);
    let r = rotate_point(rotate_point(right, un_yaw), un_pitch);
    let roll = fixed::vec2_angle(r.x, r.y);

    Vec3::new(pitch, yaw, roll)
}

/// Applies an additional world-space rotation, given as axis scaled by
/// angle, to an Euler orientation and returns the new Euler triple.
#[must_use]
pub fn rotation_rotate_by_axis(rotation: Vec3, axis_times_angle: Vec3) -> Vec3 {
    let angle = axis_times_angle.length();

    if angle == 0 {
        return rotation;
    }

    let q = Quat::from_axis_angle(axis_times_angle, angle).multiply(euler_to_quaternion(rotation));

    rotation_from_vecs(
        rotate_point(Z_AXIS, q),
        rotate_point(X_AXIS, q),
    )
}

/// Euler-angle delta that visually rolls a sphere of `radius` moving from
/// `previous_position` to `current_position` over flat ground; the vertical
/// component of the motion is ignored.
#[must_use]
pub fn fake_sphere_rotation(
    previous_position: Vec3,
    current_position: Vec3,
    radius: Unit,
) -> Vec3 {
    let motion = current_position - previous_position;

    // Rolling axis is the horizontal perpendicular of the motion.
    let axis = Vec3::new(motion.z, 0, -motion.x);
    let distance = axis.length();

    if distance == 0 || radius == 0 {
        return Vec3::ZERO;
    }

    // One turn per 2*pi*radius of travel.
    let angle = ((i64::from(distance) * i64::from(F) * i64::from(F))
        / (2 * i64::from(PI) * i64::from(radius))) as Unit;

    axis.normalized().times(angle)
}
