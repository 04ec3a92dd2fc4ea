use anyhow::Result;
use trellis::body::{flags, Body, DEACTIVATE_AFTER};
use trellis::builder;
use trellis::error::Error;
use trellis::fixed::{F, INFINITY};
use trellis::joint::{Connection, Joint};
use trellis::vec3::Vec3;
use trellis::world::World;

#[test]
fn box_template_derives_rest_lengths_from_the_pose() -> Result<()> {
    let mut joints = [Joint::new(Vec3::ZERO, 0); builder::BOX_JOINTS];
    let mut connections = [Connection::new(0, 0); builder::BOX_CONNECTIONS];

    builder::make_box(&mut joints, &mut connections, 1000, 1000, 1000, 300)?;
    let body = Body::new(&mut joints, &mut connections, 800)?;

    // edges span a side, diagonals the whole cube
    assert_eq!(body.connections[0].length, 1000);
    assert_eq!(body.connections[8].length, 1000);
    assert_eq!(body.connections[12].length, 1732);

    assert_eq!(body.joint_mass, 100);
    assert_eq!(body.center_of_mass(), Vec3::ZERO);

    // half the cube diagonal plus the joint size
    assert_eq!(body.bounding_radius, 866 + 288);

    Ok(())
}

#[test]
fn builders_fill_their_documented_counts() -> Result<()> {
    let mut joints = [Joint::new(Vec3::ZERO, 0); 16];
    let mut connections = [Connection::new(0, 0); 32];

    builder::make_center_box(&mut joints, &mut connections, 600, 500, 510, 300)?;
    assert_eq!(joints[8].position, Vec3::ZERO);

    builder::make_center_rect(&mut joints, &mut connections, 1300, 1000, 256)?;
    builder::make_center_rect_full(&mut joints, &mut connections, 1300, 1000, 256)?;
    builder::make_rect(&mut joints, &mut connections, 1300, 1000, 256)?;
    builder::make_2line(&mut joints, &mut connections, 1000, 300)?;
    assert_eq!(joints[0].position, Vec3::new(-500, 0, 0));
    assert_eq!(joints[1].position, Vec3::new(500, 0, 0));

    builder::make_triangle(&mut joints, &mut connections, 2000, 256)?;
    let mut triangle_joints = [joints[0], joints[1], joints[2]];
    let mut triangle_connections = [connections[0], connections[1], connections[2]];
    let triangle = Body::new(&mut triangle_joints, &mut triangle_connections, 3 * F)?;

    for connection in triangle.connections.iter() {
        assert!((i32::from(connection.length) - 2000).abs() <= 3);
    }

    Ok(())
}

#[test]
fn undersized_storage_is_rejected() {
    let mut joints = [Joint::new(Vec3::ZERO, 0); 4];
    let mut connections = [Connection::new(0, 0); 4];

    assert!(matches!(
        builder::make_box(&mut joints, &mut connections, 1000, 1000, 1000, 300),
        Err(Error::SliceTooSmall { .. })
    ));
}

#[test]
fn degenerate_bodies_are_rejected() {
    assert!(matches!(
        Body::new(&mut [], &mut [], F),
        Err(Error::EmptyBody)
    ));

    let mut joints = [Joint::new(Vec3::ZERO, 100), Joint::new(Vec3::new(F, 0, 0), 100)];
    let mut connections = [Connection::new(0, 5)];
    assert!(matches!(
        Body::new(&mut joints, &mut connections, F),
        Err(Error::ConnectionOutOfRange { .. })
    ));

    let mut joints = [Joint::new(Vec3::ZERO, 100), Joint::new(Vec3::ZERO, 100)];
    let mut connections = [Connection::new(0, 1)];
    assert!(matches!(
        Body::new(&mut joints, &mut connections, F),
        Err(Error::DegenerateConnection { .. })
    ));
}

#[test]
fn motion_operations() -> Result<()> {
    let mut joints = [Joint::new(Vec3::ZERO, 0); 2];
    let mut connections = [Connection::new(0, 0); 1];
    builder::make_2line(&mut joints, &mut connections, 1024, 200)?;
    let mut body = Body::new(&mut joints, &mut connections, 2 * F)?;

    body.move_by(Vec3::new(100, 200, 300));
    assert_eq!(body.center_of_mass(), Vec3::new(100, 200, 300));

    body.move_to(Vec3::ZERO);
    assert_eq!(body.center_of_mass(), Vec3::ZERO);

    body.accelerate(Vec3::new(100, 0, 0));
    assert_eq!(body.joints[0].velocity_vec(), Vec3::new(100, 0, 0));
    assert_eq!(body.net_speed(), 200);
    assert_eq!(body.average_speed(), 100);

    body.multiply_net_speed(F / 2);
    assert_eq!(body.joints[0].velocity_vec(), Vec3::new(50, 0, 0));

    body.stop();
    assert_eq!(body.net_speed(), 0);

    // spinning around +z moves the -x joint down and the +x joint up
    body.spin(Vec3::new(0, 0, 200));
    assert_eq!(body.joints[0].velocity_vec(), Vec3::new(0, -200, 0));
    assert_eq!(body.joints[1].velocity_vec(), Vec3::new(0, 200, 0));

    body.stop();
    body.rotate_by_axis(Vec3::new(0, 0, F / 4));
    assert!(body.joints[0].position.dist(Vec3::new(0, -512, 0)) <= 24);
    assert!(body.joints[1].position.dist(Vec3::new(0, 512, 0)) <= 24);

    Ok(())
}

#[test]
fn impulses_land_on_the_nearest_joint() -> Result<()> {
    let mut joints = [Joint::new(Vec3::ZERO, 0); 2];
    let mut connections = [Connection::new(0, 0); 1];
    builder::make_2line(&mut joints, &mut connections, 1024, 200)?;
    let mut body = Body::new(&mut joints, &mut connections, 2 * F)?;

    body.apply_impulse(Vec3::new(600, 0, 0), Vec3::new(0, 256, 0));

    assert_eq!(body.joints[1].velocity_vec(), Vec3::new(0, 256, 0));
    assert_eq!(body.joints[0].velocity_vec(), Vec3::ZERO);

    Ok(())
}

#[test]
fn static_bodies_ignore_forces() -> Result<()> {
    let mut joints = [Joint::new(Vec3::ZERO, 256)];
    let mut body = Body::new(&mut joints, &mut [], INFINITY)?;

    body.accelerate(Vec3::new(100, 100, 100));
    body.apply_gravity(50);
    body.spin(Vec3::new(0, 0, 200));

    assert_eq!(body.net_speed(), 0);
    assert!(body.is_static());

    Ok(())
}

#[test]
fn gravity_skips_sleeping_bodies() -> Result<()> {
    let mut joints = [Joint::new(Vec3::ZERO, 256)];
    let mut body = Body::new(&mut joints, &mut [], 2 * F)?;

    body.deactivate();
    body.apply_gravity(50);
    assert_eq!(body.net_speed(), 0);

    body.activate();
    body.apply_gravity(50);
    assert_eq!(body.net_speed(), 50);

    Ok(())
}

#[test]
fn still_bodies_fall_asleep_and_stay_woken_by_acceleration() -> Result<()> {
    let mut joints = [Joint::new(Vec3::ZERO, 256)];
    let mut bodies = [Body::new(&mut joints, &mut [], 2 * F)?];
    let mut world = World::new(&mut bodies, None);

    for _ in 0..u32::from(DEACTIVATE_AFTER) / 2 {
        world.step();
    }
    assert!(world.bodies[0].is_active());
    assert_eq!(
        world.bodies[0].deactivate_count,
        DEACTIVATE_AFTER / 2
    );

    // an external nudge resets the counter
    world.bodies[0].accelerate(Vec3::new(0, 0, 0));
    assert_eq!(world.bodies[0].deactivate_count, 0);

    for _ in 0..u32::from(DEACTIVATE_AFTER) + 2 {
        world.step();
    }
    assert!(!world.bodies[0].is_active());

    Ok(())
}

#[test]
fn always_active_bodies_never_sleep() -> Result<()> {
    let mut joints = [Joint::new(Vec3::ZERO, 256)];
    let mut bodies = [Body::new(&mut joints, &mut [], 2 * F)?];
    bodies[0].flags |= flags::ALWAYS_ACTIVE;
    let mut world = World::new(&mut bodies, None);

    for _ in 0..2 * u32::from(DEACTIVATE_AFTER) {
        world.step();
    }

    assert!(world.bodies[0].is_active());

    Ok(())
}

#[test]
fn pinned_pendulum_keeps_its_anchor_and_length() -> Result<()> {
    let anchor = Vec3::new(0, 4000, 0);
    let mut joints = [
        Joint::new(anchor, 50),
        Joint::new(anchor + Vec3::new(F / 2, 0, 0), 50),
    ];
    let mut connections = [Connection::new(0, 1)];
    let mut bodies = [Body::new(&mut joints, &mut connections, 2 * F)?];
    bodies[0].flags |= flags::ALWAYS_ACTIVE;
    let mut world = World::new(&mut bodies, None);

    assert_eq!(world.bodies[0].connections[0].length, u16::try_from(F / 2)?);

    for _ in 0..1000 {
        world.bodies[0].apply_gravity(5);
        world.step();
        world.bodies[0].joints[0].pin(anchor);

        assert_eq!(world.bodies[0].joints[0].position, anchor);

        let length = world.bodies[0]
            .joints[0]
            .position
            .dist(world.bodies[0].joints[1].position);
        assert!(
            (length - F / 2).abs() <= 64,
            "stretched to {length}"
        );
    }

    Ok(())
}

#[test]
fn state_hashes_separate_distinct_states() {
    let joints = [
        Joint::new(Vec3::new(200, 100, -400), 300),
        Joint::new(Vec3::new(100, 200, -400), 300),
        Joint::new(Vec3::new(200, -400, 200), 300),
        Joint::new(Vec3::new(200, 100, -400), 400),
    ];

    for (i, a) in joints.iter().enumerate() {
        for b in joints.iter().skip(i + 1) {
            assert_ne!(a.state_hash(), b.state_hash());
        }
    }

    let mut connections = [
        Connection::new(0, 1),
        Connection::new(1, 0),
        Connection::new(0, 1),
        Connection::new(2, 3),
    ];
    connections[0].length = 1000;
    connections[1].length = 1000;
    connections[2].length = 1100;
    connections[3].length = 100;

    for (i, a) in connections.iter().enumerate() {
        for b in connections.iter().skip(i + 1) {
            assert_ne!(a.state_hash(), b.state_hash());
        }
    }
}

#[test]
fn body_hash_sees_flags_and_mass() -> Result<()> {
    let mut j1 = [Joint::new(Vec3::ZERO, 256), Joint::new(Vec3::new(F, 0, 0), 256)];
    let mut c1 = [Connection::new(0, 1)];
    let mut j2 = j1;
    let mut c2 = c1;
    let mut j3 = j1;
    let mut c3 = c1;

    let plain = Body::new(&mut j1, &mut c1, 300)?;
    let mut soft = Body::new(&mut j2, &mut c2, 300)?;
    soft.flags |= flags::SOFT | flags::NONROTATING;
    let lighter = Body::new(&mut j3, &mut c3, 200)?;

    assert_ne!(plain.state_hash(), soft.state_hash());
    assert_ne!(plain.state_hash(), lighter.state_hash());
    assert_ne!(soft.state_hash(), lighter.state_hash());

    Ok(())
}
