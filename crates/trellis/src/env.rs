//! # Environment API
//!
//! The world boundary is not a mesh: it is a single pure function from a
//! query point to the closest point of the solid environment. A query that
//! is already *inside* the solid returns itself unchanged; everything the
//! engine does with environments (joint projection, ray marching, the
//! verifier) leans on that identity convention.
//!
//! This module supplies closest-point implementations for the usual
//! primitives, a [`Composite`] accumulator to fold several primitives into
//! one function, bounding-volume early-out tests, and a verifier that
//! checks a caller-written function actually behaves like a closest-point
//! function.
//!
//! The `max_d` parameter every function receives is an advisory cutoff:
//! geometry further than `max_d` from the query may be ignored or answered
//! imprecisely, which is what makes the early-out tests sound.

use crate::fixed::{self, Unit};
use crate::vec3::{self, Vec3};

/// Closest-point function defining a world boundary.
pub type EnvironmentFn = fn(Vec3, Unit) -> Vec3;

/// Heightmap sampler: node coordinates to terrain height.
pub type HeightFn = fn(i32, i32) -> Unit;

/// Extrusion axis for [`aa_tri_prism`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Infinite flat ground: solid fills everything below `height`.
#[must_use]
pub fn ground(point: Vec3, height: Unit) -> Vec3 {
    if point.y > height {
        Vec3::new(point.x, height, point.z)
    } else {
        point
    }
}

/// Half-space: solid on the side of the plane through `center` that
/// `normal` points away from.
#[must_use]
pub fn half_plane(point: Vec3, center: Vec3, normal: Vec3) -> Vec3 {
    let n = normal.normalized();
    let distance = (point - center).dot(n);

    if distance <= 0 {
        point
    } else {
        point - n.times(distance)
    }
}

/// Solid axis-aligned box of full extents `size` around `center`.
#[must_use]
pub fn aa_box(point: Vec3, center: Vec3, size: Vec3) -> Vec3 {
    let half = Vec3::new(size.x / 2, size.y / 2, size.z / 2);
    let rel = point - center;
    let clamped = Vec3::new(
        fixed::keep_in_range(rel.x, -half.x, half.x),
        fixed::keep_in_range(rel.y, -half.y, half.y),
        fixed::keep_in_range(rel.z, -half.z, half.z),
    );

    if clamped == rel {
        point
    } else {
        center + clamped
    }
}

/// Hollow axis-aligned room: free space is the inside of the box, solid is
/// everything beyond its walls.
#[must_use]
pub fn aa_box_inside(point: Vec3, center: Vec3, size: Vec3) -> Vec3 {
    let half = Vec3::new(size.x / 2, size.y / 2, size.z / 2);
    let rel = point - center;

    if rel.x.abs() >= half.x || rel.y.abs() >= half.y || rel.z.abs() >= half.z {
        return point;
    }

    // project to whichever wall is nearest
    let dx = half.x - rel.x.abs();
    let dy = half.y - rel.y.abs();
    let dz = half.z - rel.z.abs();

    let mut wall = rel;

    if dx <= dy && dx <= dz {
        wall.x = if rel.x < 0 { -half.x } else { half.x };
    } else if dy <= dz {
        wall.y = if rel.y < 0 { -half.y } else { half.y };
    } else {
        wall.z = if rel.z < 0 { -half.z } else { half.z };
    }

    center + wall
}

/// Solid sphere.
#[must_use]
pub fn sphere(point: Vec3, center: Vec3, radius: Unit) -> Vec3 {
    let to_point = point - center;
    let distance = to_point.length();

    if distance <= radius {
        point
    } else {
        center + to_point.scaled_to(radius, distance)
    }
}

/// Hollow sphere: free space is the inside.
#[must_use]
pub fn sphere_inside(point: Vec3, center: Vec3, radius: Unit) -> Vec3 {
    let to_point = point - center;
    let distance = to_point.length();

    if distance >= radius {
        point
    } else if distance == 0 {
        center + Vec3::new(radius, 0, 0)
    } else {
        center + to_point.scaled_to(radius, distance)
    }
}

/// Solid finite cylinder whose axis runs from `center - direction` to
/// `center + direction`.
#[must_use]
pub fn cylinder(point: Vec3, center: Vec3, direction: Vec3, radius: Unit) -> Vec3 {
    let axis = direction.normalized();
    let half_length = direction.length();
    let rel = point - center;
    let axial = rel.dot(axis);
    let radial = rel - axis.times(axial);
    let radial_distance = radial.length();

    if axial.abs() <= half_length && radial_distance <= radius {
        return point;
    }

    let axial_clamped = fixed::keep_in_range(axial, -half_length, half_length);
    let radial_clamped = if radial_distance <= radius {
        radial
    } else {
        radial.scaled_to(radius, radial_distance)
    };

    center + axis.times(axial_clamped) + radial_clamped
}

/// Solid cylinder of infinite length along `direction` through `center`.
#[must_use]
pub fn infinite_cylinder(point: Vec3, center: Vec3, direction: Vec3, radius: Unit) -> Vec3 {
    let axis = direction.normalized();
    let rel = point - center;
    let axial = rel.dot(axis);
    let radial = rel - axis.times(axial);
    let radial_distance = radial.length();

    if radial_distance <= radius {
        point
    } else {
        center + axis.times(axial) + radial.scaled_to(radius, radial_distance)
    }
}

/// Solid capsule: the set of points within `radius` of the segment from
/// `center - direction` to `center + direction`.
#[must_use]
pub fn capsule(point: Vec3, center: Vec3, direction: Vec3, radius: Unit) -> Vec3 {
    let on_axis =
        vec3::line_segment_closest_point(center - direction, center + direction, point);
    let to_point = point - on_axis;
    let distance = to_point.length();

    if distance <= radius {
        point
    } else {
        on_axis + to_point.scaled_to(radius, distance)
    }
}

/// Solid triangular prism: a triangle in the plane perpendicular to `axis`,
/// extruded symmetrically to total `depth`. `points` holds the three 2D
/// triangle vertices relative to `center` as `[u0, v0, u1, v1, u2, v2]`,
/// where `(u, v)` are the two non-axis coordinates in x, y, z order.
#[must_use]
pub fn aa_tri_prism(
    point: Vec3,
    center: Vec3,
    points: &[Unit; 6],
    depth: Unit,
    axis: Axis,
) -> Vec3 {
    let rel = point - center;
    let (u, v, w) = split_axis(rel, axis);

    let tri = [
        (points[0], points[1]),
        (points[2], points[3]),
        (points[4], points[5]),
    ];

    let half_depth = depth / 2;
    let inside_triangle = point_in_triangle_2d(u, v, &tri);

    if inside_triangle && w.abs() <= half_depth {
        return point;
    }

    let (cu, cv) = if inside_triangle {
        (u, v)
    } else {
        closest_on_triangle_outline_2d(u, v, &tri)
    };
    let cw = fixed::keep_in_range(w, -half_depth, half_depth);

    center + join_axis(cu, cv, cw, axis)
}

fn split_axis(v: Vec3, axis: Axis) -> (Unit, Unit, Unit) {
    match axis {
        Axis::X => (v.y, v.z, v.x),
        Axis::Y => (v.x, v.z, v.y),
        Axis::Z => (v.x, v.y, v.z),
    }
}

fn join_axis(u: Unit, v: Unit, w: Unit, axis: Axis) -> Vec3 {
    match axis {
        Axis::X => Vec3::new(w, u, v),
        Axis::Y => Vec3::new(u, w, v),
        Axis::Z => Vec3::new(u, v, w),
    }
}

fn cross_2d(ax: i64, ay: i64, bx: i64, by: i64) -> i64 {
    ax * by - ay * bx
}

fn point_in_triangle_2d(u: Unit, v: Unit, tri: &[(Unit, Unit); 3]) -> bool {
    let mut positive = false;
    let mut negative = false;

    for i in 0..3 {
        let (ax, ay) = tri[i];
        let (bx, by) = tri[(i + 1) % 3];
        let side = cross_2d(
            i64::from(bx - ax),
            i64::from(by - ay),
            i64::from(u - ax),
            i64::from(v - ay),
        );

        if side > 0 {
            positive = true;
        }
        if side < 0 {
            negative = true;
        }
    }

    // all on one side works for either winding
    !(positive && negative)
}

fn closest_on_triangle_outline_2d(u: Unit, v: Unit, tri: &[(Unit, Unit); 3]) -> (Unit, Unit) {
    let mut best = tri[0];
    let mut best_distance = i64::MAX;

    for i in 0..3 {
        let (ax, ay) = tri[i];
        let (bx, by) = tri[(i + 1) % 3];
        let (ex, ey) = (i64::from(bx - ax), i64::from(by - ay));
        let (px, py) = (i64::from(u - ax), i64::from(v - ay));
        let denominator = ex * ex + ey * ey;

        let candidate = if denominator == 0 {
            (ax, ay)
        } else {
            let t = (ex * px + ey * py).clamp(0, denominator);
            (
                ax + ((ex * t) / denominator) as Unit,
                ay + ((ey * t) / denominator) as Unit,
            )
        };

        let (du, dv) = (
            i64::from(u - candidate.0),
            i64::from(v - candidate.1),
        );
        let distance = du * du + dv * dv;

        if distance < best_distance {
            best_distance = distance;
            best = candidate;
        }
    }

    best
}

/// Heightmap terrain: an infinite grid with `grid_step` node spacing whose
/// node `(i, j)` sits at `center + (i*grid_step, height(i, j), j*grid_step)`;
/// each grid cell is split into two triangles. Solid fills everything below
/// the surface.
///
/// The query's own cell decides inside/outside; the closest point is then
/// searched over the triangles of the surrounding 3×3 cells, skipping cells
/// that `max_d` rules out.
#[must_use]
pub fn heightmap(
    point: Vec3,
    center: Vec3,
    grid_step: Unit,
    height: HeightFn,
    max_d: Unit,
) -> Vec3 {
    let rel = point - center;
    let cell_x = rel.x.div_euclid(grid_step);
    let cell_z = rel.z.div_euclid(grid_step);
    let fx = rel.x.rem_euclid(grid_step);
    let fz = rel.z.rem_euclid(grid_step);

    let node = |ix: Unit, iz: Unit| -> Vec3 {
        Vec3::new(
            center.x + ix * grid_step,
            center.y + height(ix, iz),
            center.z + iz * grid_step,
        )
    };

    // inside test against the query's own cell
    let h00 = height(cell_x, cell_z);
    let h10 = height(cell_x + 1, cell_z);
    let h01 = height(cell_x, cell_z + 1);
    let h11 = height(cell_x + 1, cell_z + 1);

    let surface_y = if fx + fz <= grid_step {
        // triangle (0,0) (1,0) (0,1)
        i64::from(h00)
            + (i64::from(h10 - h00) * i64::from(fx)) / i64::from(grid_step)
            + (i64::from(h01 - h00) * i64::from(fz)) / i64::from(grid_step)
    } else {
        // triangle (1,0) (1,1) (0,1)
        i64::from(h11)
            + (i64::from(h10 - h11) * i64::from(grid_step - fz)) / i64::from(grid_step)
            + (i64::from(h01 - h11) * i64::from(grid_step - fx)) / i64::from(grid_step)
    };

    if i64::from(rel.y) <= surface_y {
        return point;
    }

    let mut best = point;
    let mut best_distance = Unit::MAX;

    for dz in -1..=1 {
        for dx in -1..=1 {
            let (ix, iz) = (cell_x + dx, cell_z + dz);

            // max_d early-out on the cell's xz footprint
            let cell_min_x = ix * grid_step - rel.x;
            let cell_min_z = iz * grid_step - rel.z;
            let gap_x = fixed::keep_in_range(0, cell_min_x, cell_min_x + grid_step).abs();
            let gap_z = fixed::keep_in_range(0, cell_min_z, cell_min_z + grid_step).abs();

            if gap_x > max_d || gap_z > max_d {
                continue;
            }

            let a = node(ix, iz);
            let b = node(ix + 1, iz);
            let c = node(ix, iz + 1);
            let d = node(ix + 1, iz + 1);

            for triangle in [[a, b, c], [b, d, c]] {
                let candidate =
                    closest_on_triangle(point, triangle[0], triangle[1], triangle[2]);
                let distance = point.dist(candidate);

                if distance < best_distance {
                    best_distance = distance;
                    best = candidate;
                }
            }
        }
    }

    best
}

/// Closest point on a triangle in 3D, the standard barycentric region walk.
/// Intended for local geometry (heightmap cells): coordinates around the
/// query must stay well under 2^20 so the region products fit `i64`.
fn closest_on_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot_wide(ap);
    let d2 = ac.dot_wide(ap);

    if d1 <= 0 && d2 <= 0 {
        return a;
    }

    let bp = p - b;
    let d3 = ab.dot_wide(bp);
    let d4 = ac.dot_wide(bp);

    if d3 >= 0 && d4 <= d3 {
        return b;
    }

    let lerp = |from: Vec3, dir: Vec3, num: i64, den: i64| {
        Vec3::new(
            from.x + ((i64::from(dir.x) * num) / den) as Unit,
            from.y + ((i64::from(dir.y) * num) / den) as Unit,
            from.z + ((i64::from(dir.z) * num) / den) as Unit,
        )
    };

    let vc = d1 * d4 - d3 * d2;

    if vc <= 0 && d1 >= 0 && d3 <= 0 {
        return lerp(a, ab, d1, d1 - d3);
    }

    let cp = p - c;
    let d5 = ab.dot_wide(cp);
    let d6 = ac.dot_wide(cp);

    if d6 >= 0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;

    if vb <= 0 && d2 >= 0 && d6 <= 0 {
        return lerp(a, ac, d2, d2 - d6);
    }

    let va = d3 * d6 - d5 * d4;

    if va <= 0 && d4 - d3 >= 0 && d5 - d6 >= 0 {
        return lerp(b, c - b, d4 - d3, (d4 - d3) + (d5 - d6));
    }

    let denominator = va + vb + vc;
    let interior = lerp(a, ab, vb, denominator);

    Vec3::new(
        interior.x + ((i64::from(ac.x) * vc) / denominator) as Unit,
        interior.y + ((i64::from(ac.y) * vc) / denominator) as Unit,
        interior.z + ((i64::from(ac.z) * vc) / denominator) as Unit,
    )
}

/// Accumulator that folds several primitives into one environment: keep
/// whichever candidate is closest, and stop early once any primitive
/// reports the query inside its solid.
///
/// ```
/// use trellis::env;
/// use trellis::fixed::{Unit, F};
/// use trellis::vec3::Vec3;
///
/// fn room_with_pillar(p: Vec3, _max_d: Unit) -> Vec3 {
///     let mut fold = env::Composite::begin(
///         p,
///         env::aa_box_inside(p, Vec3::ZERO, Vec3::new(20 * F, 10 * F, 20 * F)),
///     );
///     if !fold.done() {
///         fold.next(env::cylinder(p, Vec3::ZERO, Vec3::new(0, 5 * F, 0), 2 * F));
///     }
///     fold.end()
/// }
/// # let _ = room_with_pillar as env::EnvironmentFn;
/// ```
pub struct Composite {
    query: Vec3,
    best: Vec3,
    best_distance: Unit,
    inside: bool,
}

impl Composite {
    /// Starts the fold with the first primitive's answer.
    #[must_use]
    pub fn begin(query: Vec3, first: Vec3) -> Self {
        Self {
            query,
            best: first,
            best_distance: query.dist(first),
            inside: first == query,
        }
    }

    /// Folds in another primitive's answer.
    pub fn next(&mut self, candidate: Vec3) {
        if self.inside {
            return;
        }

        if candidate == self.query {
            self.inside = true;
            return;
        }

        let distance = self.query.dist(candidate);

        if distance < self.best_distance {
            self.best_distance = distance;
            self.best = candidate;
        }
    }

    /// True once the query landed inside some solid; later primitives can
    /// be skipped entirely.
    #[must_use]
    pub fn done(&self) -> bool {
        self.inside
    }

    /// Finishes the fold.
    #[must_use]
    pub fn end(self) -> Vec3 {
        if self.inside {
            self.query
        } else {
            self.best
        }
    }
}

/// Bounding-cube early-out: true when `point` is within `max_d` of the cube
/// of full side `size` around `center`, meaning the primitive inside it
/// could still matter for this query.
#[must_use]
pub fn bcube_test(point: Vec3, max_d: Unit, center: Vec3, size: Unit) -> bool {
    let reach = size / 2 + max_d;
    let rel = point - center;

    rel.x.abs() <= reach && rel.y.abs() <= reach && rel.z.abs() <= reach
}

/// Bounding-sphere early-out, same contract as [`bcube_test`].
#[must_use]
pub fn bsphere_test(point: Vec3, max_d: Unit, center: Vec3, radius: Unit) -> bool {
    point.dist(center) <= radius + max_d
}

/// Verifies that a caller-written function behaves like a closest-point
/// environment over the box `[corner_min, corner_max]`, sampled on a
/// `resolution`³ grid. Checks, up to `tolerance`:
///
/// - a returned surface point is a fixed point of the function,
/// - the segment from a free query to its returned point stays free and
///   contracts (queries moved toward the surface return points no further
///   away),
/// - the distance-to-solid field is 1-Lipschitz between neighboring
///   samples (including diagonals).
///
/// Returns the first offending sample, or `None` when the function passes.
/// Meant for development-time validation of hand-written environments.
#[must_use]
pub fn check_closest_point_fn(
    function: EnvironmentFn,
    corner_min: Vec3,
    corner_max: Vec3,
    resolution: u32,
    tolerance: Unit,
) -> Option<Vec3> {
    let resolution = resolution.max(2) as Unit;
    let max_d = corner_min.dist(corner_max);

    let sample_at = |ix: Unit, iy: Unit, iz: Unit| {
        Vec3::new(
            corner_min.x + ((corner_max.x - corner_min.x) * ix) / (resolution - 1),
            corner_min.y + ((corner_max.y - corner_min.y) * iy) / (resolution - 1),
            corner_min.z + ((corner_max.z - corner_min.z) * iz) / (resolution - 1),
        )
    };

    let mut distances = vec![0 as Unit; (resolution * resolution * resolution) as usize];
    let index_of =
        |ix: Unit, iy: Unit, iz: Unit| ((iz * resolution + iy) * resolution + ix) as usize;

    for iz in 0..resolution {
        for iy in 0..resolution {
            for ix in 0..resolution {
                let p = sample_at(ix, iy, iz);
                let closest = function(p, max_d);
                let distance = p.dist(closest);

                distances[index_of(ix, iy, iz)] = distance;

                if closest == p {
                    continue;
                }

                // a surface point's closest point is itself
                if function(closest, max_d).dist(closest) > tolerance {
                    tracing::debug!(?p, ?closest, "environment check: moving surface point");
                    return Some(p);
                }

                // walking toward the surface must stay free and contract
                if distance > 2 * tolerance {
                    let midpoint = p.average(closest);
                    let from_midpoint = function(midpoint, max_d);

                    if from_midpoint == midpoint
                        || midpoint.dist(from_midpoint) > midpoint.dist(closest) + tolerance
                    {
                        tracing::debug!(?p, ?midpoint, "environment check: no contraction");
                        return Some(p);
                    }
                }
            }
        }
    }

    // distance field must not change faster than the sample spacing
    const NEIGHBORS: [(Unit, Unit, Unit); 9] = [
        (1, 0, 0),
        (0, 1, 0),
        (0, 0, 1),
        (1, 1, 0),
        (1, -1, 0),
        (1, 0, 1),
        (1, 0, -1),
        (0, 1, 1),
        (0, 1, -1),
    ];

    for iz in 0..resolution {
        for iy in 0..resolution {
            for ix in 0..resolution {
                let p = sample_at(ix, iy, iz);
                let d = distances[index_of(ix, iy, iz)];

                for (dx, dy, dz) in NEIGHBORS {
                    let (nx, ny, nz) = (ix + dx, iy + dy, iz + dz);

                    if nx < 0 || ny < 0 || nz < 0 || nx >= resolution || ny >= resolution
                        || nz >= resolution
                    {
                        continue;
                    }

                    let neighbor = sample_at(nx, ny, nz);
                    let nd = distances[index_of(nx, ny, nz)];

                    if (d - nd).abs() > p.dist(neighbor) + tolerance {
                        tracing::debug!(?p, ?neighbor, "environment check: distance field jump");
                        return Some(p);
                    }
                }
            }
        }
    }

    None
}
