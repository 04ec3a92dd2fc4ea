use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use trellis::body::{flags, Body};
use trellis::env;
use trellis::fixed::{Unit, F};
use trellis::joint::{Connection, Joint};
use trellis::vec3::Vec3;
use trellis::world::World;

fn kinetic_energy(bodies: &[Body]) -> i64 {
    bodies
        .iter()
        .flat_map(|body| {
            let mass = i64::from(body.joint_mass);
            body.joints.iter().map(move |joint| {
                let v = joint.velocity_vec();
                mass * (i64::from(v.x) * i64::from(v.x)
                    + i64::from(v.y) * i64::from(v.y)
                    + i64::from(v.z) * i64::from(v.z))
            })
        })
        .sum()
}

#[test]
fn equal_masses_swap_velocities_elastically() -> Result<()> {
    let mut ja = [Joint::new(Vec3::new(-600, 0, 0), 256)];
    let mut jb = [Joint::new(Vec3::new(600, 0, 0), 256)];
    let mut a = Body::new(&mut ja, &mut [], F)?;
    let mut b = Body::new(&mut jb, &mut [], F)?;
    a.elasticity = F;
    b.elasticity = F;
    a.friction = 0;
    b.friction = 0;
    a.accelerate(Vec3::new(200, 0, 0));
    b.accelerate(Vec3::new(-200, 0, 0));

    let mut bodies = [a, b];
    let energy_before = kinetic_energy(&bodies);
    let mut world = World::new(&mut bodies, None);

    for _ in 0..10 {
        world.step();
    }

    assert_eq!(world.bodies[0].joints[0].velocity_vec(), Vec3::new(-200, 0, 0));
    assert_eq!(world.bodies[1].joints[0].velocity_vec(), Vec3::new(200, 0, 0));

    // a head-on elastic exchange conserves kinetic energy
    let energy_after = kinetic_energy(world.bodies);
    assert_eq!(energy_before, energy_after);

    // and the joints ended up separated
    let gap = world.bodies[0].joints[0]
        .position
        .dist(world.bodies[1].joints[0].position);
    assert!(gap >= 512, "gap={gap}");

    Ok(())
}

#[test]
fn unequal_masses_follow_the_elastic_solution() -> Result<()> {
    let mut ja = [Joint::new(Vec3::new(-600, 0, 0), 256)];
    let mut jb = [Joint::new(Vec3::new(600, 0, 0), 256)];
    let mut a = Body::new(&mut ja, &mut [], F)?;
    let mut b = Body::new(&mut jb, &mut [], 2 * F)?;
    a.elasticity = F;
    b.elasticity = F;
    a.friction = 0;
    b.friction = 0;
    a.accelerate(Vec3::new(300, 0, 0));
    b.accelerate(Vec3::new(-150, 0, 0));

    let mut bodies = [a, b];
    let energy_before = kinetic_energy(&bodies);
    let mut world = World::new(&mut bodies, None);

    for _ in 0..10 {
        world.step();
    }

    // v1' = ((m1-m2)v1 + 2 m2 v2) / (m1+m2), and the mirror for v2'
    assert_eq!(world.bodies[0].joints[0].velocity_vec(), Vec3::new(-300, 0, 0));
    assert_eq!(world.bodies[1].joints[0].velocity_vec(), Vec3::new(150, 0, 0));
    assert_eq!(kinetic_energy(world.bodies), energy_before);

    Ok(())
}

fn big_room(p: Vec3, _max_d: Unit) -> Vec3 {
    env::aa_box_inside(p, Vec3::new(0, 2000, 0), Vec3::new(12_000, 12_000, 12_000))
}

#[test]
fn momentum_transfers_between_unequal_spheres() -> Result<()> {
    let mut ja = [Joint::new(Vec3::new(200, 4000, -4800), 800)];
    let mut jb = [Joint::new(Vec3::new(3200, 3800, -4800), 800)];
    let mut a = Body::new(&mut ja, &mut [], 2000)?;
    let mut b = Body::new(&mut jb, &mut [], 200)?;

    for body in [&mut a, &mut b] {
        body.elasticity = F;
        body.friction = F;
    }

    a.accelerate(Vec3::new(10, 0, 0));
    b.accelerate(Vec3::new(-300, 0, 0));

    let mut bodies = [a, b];
    let mut world = World::new(&mut bodies, Some(big_room));

    for _ in 0..10 {
        for body in world.bodies.iter_mut() {
            body.apply_gravity(5);
        }
        world.step();
    }

    // the heavy sphere was knocked backwards, the light one bounced away
    let va = world.bodies[0].joints[0].velocity_vec().x;
    let vb = world.bodies[1].joints[0].velocity_vec().x;
    assert!(va < 0, "va={va}");
    assert!((-70..=-30).contains(&va), "va={va}");
    assert!(vb >= 200, "vb={vb}");

    // x momentum stays near the initial 2000*10 + 200*(-300)
    let momentum = 2000 * i64::from(va) + 200 * i64::from(vb);
    assert!((momentum + 40_000).abs() <= 6000, "momentum={momentum}");

    for _ in 0..90 {
        for body in world.bodies.iter_mut() {
            body.apply_gravity(5);
        }
        world.step();
    }

    // both stay inside the room
    for body in world.bodies.iter() {
        let com = body.center_of_mass();
        assert!(com.x.abs() < 6000, "com={com:?}");
        assert!(com.y > -4000 && com.y < 8000, "com={com:?}");
        assert!(com.z.abs() < 6000, "com={com:?}");
    }

    Ok(())
}

static SEEN_CONTACTS: AtomicUsize = AtomicUsize::new(0);

fn veto_everything(_b1: usize, _j1: usize, _b2: usize, _j2: usize, _point: Vec3) -> bool {
    SEEN_CONTACTS.fetch_add(1, Ordering::Relaxed);
    false
}

#[test]
fn vetoed_collisions_pass_through() -> Result<()> {
    let mut ja = [Joint::new(Vec3::new(-400, 0, 0), 256)];
    let mut jb = [Joint::new(Vec3::new(400, 0, 0), 256)];
    let mut a = Body::new(&mut ja, &mut [], F)?;
    let mut b = Body::new(&mut jb, &mut [], F)?;
    a.accelerate(Vec3::new(100, 0, 0));
    b.accelerate(Vec3::new(-100, 0, 0));

    let mut bodies = [a, b];
    let mut world = World::new(&mut bodies, None);
    world.collision_callback = Some(veto_everything);

    for _ in 0..10 {
        world.step();
    }

    // with every contact vetoed the spheres fly straight through each other
    assert!(SEEN_CONTACTS.load(Ordering::Relaxed) > 0);
    assert!(world.bodies[0].joints[0].position.x > world.bodies[1].joints[0].position.x);
    assert_eq!(world.bodies[0].joints[0].velocity_vec(), Vec3::new(100, 0, 0));

    Ok(())
}

#[test]
fn collisions_wake_sleeping_bodies() -> Result<()> {
    let mut resting_joints = [Joint::new(Vec3::ZERO, 256)];
    let mut moving_joints = [Joint::new(Vec3::new(-2000, 0, 0), 256)];
    let mut resting = Body::new(&mut resting_joints, &mut [], F)?;
    let moving = Body::new(&mut moving_joints, &mut [], F)?;
    resting.deactivate();

    let mut bodies = [resting, moving];
    bodies[1].accelerate(Vec3::new(200, 0, 0));

    let mut world = World::new(&mut bodies, None);

    for _ in 0..12 {
        world.step();
    }

    assert!(world.bodies[0].is_active(), "sleeper was not woken");
    assert!(world.bodies[0].joints[0].velocity_vec().x > 0);

    Ok(())
}

fn flat_ground(p: Vec3, _max_d: Unit) -> Vec3 {
    env::ground(p, 0)
}

fn ignore_sling_ball(b1: usize, _j1: usize, b2: usize, _j2: usize, _point: Vec3) -> bool {
    !(b1 == 0 && b2 == 1)
}

#[test]
fn catapult_string_launches_the_ball() -> Result<()> {
    let height = 2 * F;
    let half_width = 3 * F / 4;

    let mut string_joints = [
        Joint::new(Vec3::new(0, height, half_width), 10),
        Joint::new(Vec3::new(0, height, 0), 10),
        Joint::new(Vec3::new(0, height, -half_width), 10),
    ];
    let mut string_connections = [Connection::new(0, 1), Connection::new(1, 2)];
    let mut string = Body::new(&mut string_joints, &mut string_connections, 10)?;
    string.flags |= flags::SOFT | flags::SIMPLE_CONN | flags::ALWAYS_ACTIVE;

    let mut ball_joints = [Joint::new(Vec3::new(0, height, 0), 2 * F / 5)];
    let mut ball = Body::new(&mut ball_joints, &mut [], 2 * F)?;
    ball.flags |= flags::ALWAYS_ACTIVE;

    let mut bodies = [string, ball];
    let mut world = World::new(&mut bodies, Some(flat_ground));
    world.collision_callback = Some(ignore_sling_ball);

    // pull the sling back and down, ball riding the middle joint
    let pulled = Vec3::new(-2 * F, height - F / 2, 0);
    world.bodies[0].joints[1].position = pulled;
    world.bodies[1].joints[0].position = pulled;

    let mut released = false;
    let mut launch_velocity_x = 0;

    for _ in 0..80 {
        world.step();
        world.bodies[0].joints[0].pin(Vec3::new(0, height, half_width));
        world.bodies[0].joints[2].pin(Vec3::new(0, height, -half_width));

        if !released {
            let middle = world.bodies[0].joints[1];

            if middle.position.x >= 0 {
                released = true;
                launch_velocity_x = middle.velocity_vec().x;
            } else {
                // the sling carries the ball until it crosses the frame
                world.bodies[1].joints[0].position = middle.position;
                world.bodies[1].joints[0].set_velocity(middle.velocity_vec());
            }
        } else {
            world.bodies[1].apply_gravity(6);
        }

        // slings bleed energy fast
        world.bodies[0].multiply_net_speed(19 * F / 20);
    }

    assert!(released, "sling never crossed the frame");
    assert!(launch_velocity_x > 50, "launch_velocity_x={launch_velocity_x}");
    assert!(
        world.bodies[1].center_of_mass().x > F,
        "ball stayed at {:?}",
        world.bodies[1].center_of_mass()
    );

    Ok(())
}
