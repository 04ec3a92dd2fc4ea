//! # Fixed-Point Scalar Kernel
//!
//! All quantities in the engine are signed 32-bit integers normalized by
//! [`F`]: the value `F` stands for 1.0 of any physical unit (length, time,
//! mass, velocity). A full angle is also `F` units, so trigonometry here
//! takes angles where `F` means one whole turn.
//!
//! Nothing in this module (or the rest of the engine) touches floating
//! point, which is what makes simulation results bit-identical across
//! platforms. Where a 32-bit product could wrap, intermediate math widens
//! to `i64` and narrows back once; the results are still plain integers.

/// Scalar type used for every physical quantity in the engine.
pub type Unit = i32;

/// How many fractions one unit is split into; the fixed-point "1.0".
pub const F: Unit = 512;

/// Sentinel for an infinite quantity, e.g. the mass of a static body.
pub const INFINITY: Unit = i32::MAX;

/// Pi in [`Unit`]s (`3.14159... * F`).
pub const PI: Unit = 1608;

const SIN_TABLE_LEN: Unit = 128;

/// Angle units covered by one sine-table entry. With `F = 512` and a
/// 128-entry quarter table this is exactly 1.
const SIN_TABLE_STEP: Unit = F / (SIN_TABLE_LEN * 4);

/// Quarter-wave sine table for `F = 512`, one entry per [`SIN_TABLE_STEP`]
/// angle units. The remaining three quadrants are derived by reflection.
const SIN_TABLE: [Unit; 128] = [
    0, 6, 12, 18, 25, 31, 37, 43, 50, 56, 62, 68, 74, 81, 87, 93,
    99, 105, 111, 118, 124, 130, 136, 142, 148, 154, 160, 166, 172, 178, 183, 189,
    195, 201, 207, 212, 218, 224, 229, 235, 240, 246, 251, 257, 262, 268, 273, 278,
    283, 289, 294, 299, 304, 309, 314, 319, 324, 328, 333, 338, 343, 347, 352, 356,
    361, 365, 370, 374, 378, 382, 386, 391, 395, 398, 402, 406, 410, 414, 417, 421,
    424, 428, 431, 435, 438, 441, 444, 447, 450, 453, 456, 459, 461, 464, 467, 469,
    472, 474, 476, 478, 481, 483, 485, 487, 488, 490, 492, 494, 495, 497, 498, 499,
    501, 502, 503, 504, 505, 506, 507, 507, 508, 509, 509, 510, 510, 510, 510, 510,
];

/// Returns the sine of `angle` (in [`Unit`]s, `F` = full turn) as a value
/// in `[-F, F]`.
#[must_use]
pub fn sin(angle: Unit) -> Unit {
    let x = wrap(angle / SIN_TABLE_STEP, SIN_TABLE_LEN * 4);

    let (index, negative) = match x / SIN_TABLE_LEN {
        0 => (x, false),
        1 => (2 * SIN_TABLE_LEN - x - 1, false),
        2 => (x - 2 * SIN_TABLE_LEN, true),
        _ => (4 * SIN_TABLE_LEN - x - 1, true),
    };

    let value = SIN_TABLE[index as usize];

    if negative {
        -value
    } else {
        value
    }
}

/// Returns the cosine of `angle`; see [`sin`] for conventions.
#[must_use]
pub fn cos(angle: Unit) -> Unit {
    sin(angle + F / 4)
}

/// Inverse sine: for `x` in `[-F, F]` returns an angle in `[-F/4, F/4]`.
///
/// Implemented as a binary search over the quarter-wave table, so it is the
/// exact inverse of [`sin`] up to table resolution.
#[must_use]
pub fn asin(x: Unit) -> Unit {
    let x = keep_in_range(x, -F, F);
    let (value, negative) = if x < 0 { (-x, true) } else { (x, false) };

    let mut low: Unit = 0;
    let mut high: Unit = SIN_TABLE_LEN - 1;
    let mut middle: Unit = 0;

    while low <= high {
        middle = (low + high) / 2;

        match SIN_TABLE[middle as usize].cmp(&value) {
            core::cmp::Ordering::Greater => high = middle - 1,
            core::cmp::Ordering::Less => low = middle + 1,
            core::cmp::Ordering::Equal => break,
        }
    }

    let angle = middle * SIN_TABLE_STEP;

    if negative {
        -angle
    } else {
        angle
    }
}

/// Inverse cosine: for `x` in `[-F, F]` returns an angle in `[0, F/2]`.
#[must_use]
pub fn acos(x: Unit) -> Unit {
    asin(-x) + F / 4
}

/// Integer square root, `⌊√x⌋`. A negative input returns `-sqrt(-x)`, which
/// callers use as a signed helper after pre-scaling.
#[must_use]
pub fn sqrt(value: Unit) -> Unit {
    let negative = value < 0;
    let mut a = value.unsigned_abs();
    let mut b = 1u32 << 30;
    let mut result = 0u32;

    while b > a {
        b >>= 2;
    }

    while b != 0 {
        if a >= result + b {
            a -= result + b;
            result += 2 * b;
        }

        b >>= 2;
        result >>= 1;
    }

    let root = result as Unit;

    if negative {
        -root
    } else {
        root
    }
}

/// Square root over a widened accumulator; used internally for vector
/// lengths whose squared sums do not fit 32 bits.
#[must_use]
pub(crate) fn sqrt_wide(value: i64) -> i64 {
    debug_assert!(value >= 0);

    let mut a = value as u64;
    let mut b = 1u64 << 62;
    let mut result = 0u64;

    while b > a {
        b >>= 2;
    }

    while b != 0 {
        if a >= result + b {
            a -= result + b;
            result += 2 * b;
        }

        b >>= 2;
        result >>= 1;
    }

    result as i64
}

/// Wraps `value` into `[0, modulus)` regardless of its sign.
#[must_use]
pub fn wrap(value: Unit, modulus: Unit) -> Unit {
    let r = value % modulus;

    if r < 0 {
        r + modulus
    } else {
        r
    }
}

/// Clamps `value` into the closed range `[low, high]`.
#[must_use]
pub fn keep_in_range(value: Unit, low: Unit, high: Unit) -> Unit {
    if value < low {
        low
    } else if value > high {
        high
    } else {
        value
    }
}

/// Returns `x` unless it is zero, in which case 1 is returned. Hardens
/// divisions on paths where the algebra makes zero rare but not impossible.
#[must_use]
pub fn non_zero(x: Unit) -> Unit {
    if x == 0 {
        1
    } else {
        x
    }
}

/// Sign of `x` as -1, 0 or 1.
#[must_use]
pub fn sign(x: Unit) -> Unit {
    x.signum()
}

/// Normalized product `a * b / F` that refuses to silently cancel: a
/// nonzero true product whose normalization would round to zero yields ±1
/// instead. Used in energy and rotation math where losing the sign of a
/// tiny term matters more than its magnitude.
#[must_use]
pub fn times_anti_zero(a: Unit, b: Unit) -> Unit {
    let product = i64::from(a) * i64::from(b);
    let result = (product / i64::from(F)) as Unit;

    if result == 0 && product != 0 {
        if product > 0 {
            1
        } else {
            -1
        }
    } else {
        result
    }
}

/// Angle of the 2D vector `(x, y)` in `[0, F)`, a fixed-point `atan2`.
///
/// `vec2_angle(F, 0) == 0`, angles grow counterclockwise, and
/// `vec2_angle(-F, 0) == F / 2`.
#[must_use]
pub fn vec2_angle(x: Unit, y: Unit) -> Unit {
    let length = sqrt_wide(i64::from(x) * i64::from(x) + i64::from(y) * i64::from(y));

    if length == 0 {
        return 0;
    }

    let angle = asin(((i64::from(y) * i64::from(F)) / length) as Unit);

    if x < 0 {
        F / 2 - angle
    } else if angle < 0 {
        F + angle
    } else {
        angle
    }
}
