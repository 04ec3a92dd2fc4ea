//! # Shape Builders
//!
//! Fillers for the handful of canonical joint lattices games actually use:
//! boxes, rectangles, lines and triangles. Each writes a centered,
//! origin-relative template into caller-supplied joint and connection
//! slices; the caller then hands the slices to [`crate::body::Body::new`],
//! which derives the rest lengths, and moves the body into place.
//!
//! Connection graphs include enough diagonals to make the shapes rigid
//! under the iterative solver.

use crate::error::Error;
use crate::fixed::{self, Unit};
use crate::joint::{Connection, Joint};
use crate::vec3::Vec3;

/// Joints and connections consumed by [`make_box`].
pub const BOX_JOINTS: usize = 8;
pub const BOX_CONNECTIONS: usize = 16;

/// Joints and connections consumed by [`make_center_box`].
pub const CENTER_BOX_JOINTS: usize = 9;
pub const CENTER_BOX_CONNECTIONS: usize = 20;

/// Joints and connections consumed by [`make_rect`].
pub const RECT_JOINTS: usize = 4;
pub const RECT_CONNECTIONS: usize = 6;

/// Joints and connections consumed by [`make_center_rect`].
pub const CENTER_RECT_JOINTS: usize = 5;
pub const CENTER_RECT_CONNECTIONS: usize = 8;

/// Joints and connections consumed by [`make_center_rect_full`].
pub const CENTER_RECT_FULL_JOINTS: usize = 5;
pub const CENTER_RECT_FULL_CONNECTIONS: usize = 10;

/// Joints and connections consumed by [`make_2line`].
pub const LINE2_JOINTS: usize = 2;
pub const LINE2_CONNECTIONS: usize = 1;

/// Joints and connections consumed by [`make_triangle`].
pub const TRIANGLE_JOINTS: usize = 3;
pub const TRIANGLE_CONNECTIONS: usize = 3;

fn check_storage(
    joints: &[Joint],
    connections: &[Connection],
    needed_joints: usize,
    needed_connections: usize,
) -> Result<(), Error> {
    if joints.len() < needed_joints {
        return Err(Error::SliceTooSmall {
            kind: "joint",
            needed: needed_joints,
            provided: joints.len(),
        });
    }

    if connections.len() < needed_connections {
        return Err(Error::SliceTooSmall {
            kind: "connection",
            needed: needed_connections,
            provided: connections.len(),
        });
    }

    Ok(())
}

fn connect(connections: &mut [Connection], pairs: &[(u8, u8)]) {
    for (slot, &(a, b)) in connections.iter_mut().zip(pairs) {
        *slot = Connection::new(a, b);
    }
}

/// Box of the given dimensions: 8 corner joints, 12 edges and 4 body
/// diagonals.
///
/// Corner `i` sits at x per bit 0, z per bit 1, y per bit 2, so joints
/// 0..=3 form the bottom face and 4..=7 the top face.
///
/// # Errors
///
/// Fails if the slices hold fewer than [`BOX_JOINTS`] /
/// [`BOX_CONNECTIONS`] elements.
pub fn make_box(
    joints: &mut [Joint],
    connections: &mut [Connection],
    width: Unit,
    height: Unit,
    depth: Unit,
    joint_size: Unit,
) -> Result<(), Error> {
    check_storage(joints, connections, BOX_JOINTS, BOX_CONNECTIONS)?;

    let (hw, hh, hd) = (width / 2, height / 2, depth / 2);

    for (i, joint) in joints.iter_mut().take(BOX_JOINTS).enumerate() {
        *joint = Joint::new(
            Vec3::new(
                if i & 1 == 0 { -hw } else { hw },
                if i & 4 == 0 { -hh } else { hh },
                if i & 2 == 0 { -hd } else { hd },
            ),
            joint_size,
        );
    }

    connect(
        connections,
        &[
            // bottom ring
            (0, 1),
            (1, 3),
            (3, 2),
            (2, 0),
            // top ring
            (4, 5),
            (5, 7),
            (7, 6),
            (6, 4),
            // pillars
            (0, 4),
            (1, 5),
            (2, 6),
            (3, 7),
            // body diagonals
            (0, 7),
            (1, 6),
            (2, 5),
            (3, 4),
        ],
    );

    Ok(())
}

/// [`make_box`] plus a ninth joint in the middle, braced to every corner.
/// The center joint is index 8; demos often enlarge it to give the body a
/// rounder silhouette.
///
/// # Errors
///
/// Fails if the slices hold fewer than [`CENTER_BOX_JOINTS`] /
/// [`CENTER_BOX_CONNECTIONS`] elements.
pub fn make_center_box(
    joints: &mut [Joint],
    connections: &mut [Connection],
    width: Unit,
    height: Unit,
    depth: Unit,
    joint_size: Unit,
) -> Result<(), Error> {
    check_storage(joints, connections, CENTER_BOX_JOINTS, CENTER_BOX_CONNECTIONS)?;

    make_box(joints, connections, width, height, depth, joint_size)?;
    joints[8] = Joint::new(Vec3::ZERO, joint_size);

    // center spokes replace the body diagonals
    connect(
        &mut connections[12..],
        &[
            (0, 8),
            (1, 8),
            (2, 8),
            (3, 8),
            (4, 8),
            (5, 8),
            (6, 8),
            (7, 8),
        ],
    );

    Ok(())
}

/// Flat rectangle in the xz plane: 4 corners, 4 edges, 2 diagonals.
///
/// # Errors
///
/// Fails if the slices hold fewer than [`RECT_JOINTS`] /
/// [`RECT_CONNECTIONS`] elements.
pub fn make_rect(
    joints: &mut [Joint],
    connections: &mut [Connection],
    width: Unit,
    depth: Unit,
    joint_size: Unit,
) -> Result<(), Error> {
    check_storage(joints, connections, RECT_JOINTS, RECT_CONNECTIONS)?;

    fill_rect_corners(joints, width, depth, joint_size);
    connect(
        connections,
        &[(0, 1), (1, 3), (3, 2), (2, 0), (0, 3), (1, 2)],
    );

    Ok(())
}

/// Rectangle with a center joint (index 4): 4 edges plus 4 spokes.
///
/// # Errors
///
/// Fails if the slices hold fewer than [`CENTER_RECT_JOINTS`] /
/// [`CENTER_RECT_CONNECTIONS`] elements.
pub fn make_center_rect(
    joints: &mut [Joint],
    connections: &mut [Connection],
    width: Unit,
    depth: Unit,
    joint_size: Unit,
) -> Result<(), Error> {
    check_storage(joints, connections, CENTER_RECT_JOINTS, CENTER_RECT_CONNECTIONS)?;

    fill_rect_corners(joints, width, depth, joint_size);
    joints[4] = Joint::new(Vec3::ZERO, joint_size);

    connect(
        connections,
        &[
            (0, 1),
            (1, 3),
            (3, 2),
            (2, 0),
            (0, 4),
            (1, 4),
            (2, 4),
            (3, 4),
        ],
    );

    Ok(())
}

/// [`make_center_rect`] with the two corner diagonals added, for a stiffer
/// plate.
///
/// # Errors
///
/// Fails if the slices hold fewer than [`CENTER_RECT_FULL_JOINTS`] /
/// [`CENTER_RECT_FULL_CONNECTIONS`] elements.
pub fn make_center_rect_full(
    joints: &mut [Joint],
    connections: &mut [Connection],
    width: Unit,
    depth: Unit,
    joint_size: Unit,
) -> Result<(), Error> {
    check_storage(
        joints,
        connections,
        CENTER_RECT_FULL_JOINTS,
        CENTER_RECT_FULL_CONNECTIONS,
    )?;

    make_center_rect(joints, connections, width, depth, joint_size)?;
    connect(&mut connections[8..], &[(0, 3), (1, 2)]);

    Ok(())
}

/// Two joints on the x axis, one connection: the minimal rigid body with an
/// axis.
///
/// # Errors
///
/// Fails if the slices hold fewer than [`LINE2_JOINTS`] /
/// [`LINE2_CONNECTIONS`] elements.
pub fn make_2line(
    joints: &mut [Joint],
    connections: &mut [Connection],
    length: Unit,
    joint_size: Unit,
) -> Result<(), Error> {
    check_storage(joints, connections, LINE2_JOINTS, LINE2_CONNECTIONS)?;

    joints[0] = Joint::new(Vec3::new(-length / 2, 0, 0), joint_size);
    joints[1] = Joint::new(Vec3::new(length / 2, 0, 0), joint_size);
    connect(connections, &[(0, 1)]);

    Ok(())
}

/// Equilateral triangle with side `side` in the xz plane, centered on its
/// centroid.
///
/// # Errors
///
/// Fails if the slices hold fewer than [`TRIANGLE_JOINTS`] /
/// [`TRIANGLE_CONNECTIONS`] elements.
pub fn make_triangle(
    joints: &mut [Joint],
    connections: &mut [Connection],
    side: Unit,
    joint_size: Unit,
) -> Result<(), Error> {
    check_storage(joints, connections, TRIANGLE_JOINTS, TRIANGLE_CONNECTIONS)?;

    // height of an equilateral triangle, sqrt(s^2 - (s/2)^2)
    let height = fixed::sqrt_wide(
        i64::from(side) * i64::from(side) - i64::from(side / 2) * i64::from(side / 2),
    ) as Unit;

    joints[0] = Joint::new(Vec3::new(-side / 2, 0, -height / 3), joint_size);
    joints[1] = Joint::new(Vec3::new(side / 2, 0, -height / 3), joint_size);
    joints[2] = Joint::new(Vec3::new(0, 0, (2 * height) / 3), joint_size);
    connect(connections, &[(0, 1), (1, 2), (2, 0)]);

    Ok(())
}

fn fill_rect_corners(joints: &mut [Joint], width: Unit, depth: Unit, joint_size: Unit) {
    let (hw, hd) = (width / 2, depth / 2);

    for (i, joint) in joints.iter_mut().take(4).enumerate() {
        *joint = Joint::new(
            Vec3::new(
                if i & 1 == 0 { -hw } else { hw },
                0,
                if i & 2 == 0 { -hd } else { hd },
            ),
            joint_size,
        );
    }
}
