use criterion::{criterion_group, criterion_main, Criterion};
use trellis::body::Body;
use trellis::builder;
use trellis::env;
use trellis::fixed::Unit;
use trellis::joint::{Connection, Joint};
use trellis::vec3::Vec3;
use trellis::world::World;

fn room(p: Vec3, _max_d: Unit) -> Vec3 {
    env::aa_box_inside(p, Vec3::ZERO, Vec3::new(10_000, 10_000, 10_000))
}

fn bench_world_step(c: &mut Criterion) {
    let mut box_joints = [[Joint::new(Vec3::ZERO, 0); builder::BOX_JOINTS]; 8];
    let mut box_connections = [[Connection::new(0, 0); builder::BOX_CONNECTIONS]; 8];

    let mut bodies = Vec::new();

    for (index, (joints, connections)) in box_joints
        .iter_mut()
        .zip(box_connections.iter_mut())
        .enumerate()
    {
        builder::make_box(joints, connections, 800, 800, 800, 300).unwrap();
        let mut body = Body::new(joints, connections, 1000).unwrap();
        body.move_by(Vec3::new(
            (index as Unit % 4) * 1500 - 2200,
            (index as Unit / 4) * 1500 - 1000,
            0,
        ));
        bodies.push(body);
    }

    let mut world = World::new(&mut bodies, Some(room));

    c.bench_function("world_step_8_boxes", |b| {
        b.iter(|| {
            world.activate_all();
            for body in world.bodies.iter_mut() {
                body.apply_gravity(8);
            }
            world.step();
        });
    });
}

criterion_group!(benches, bench_world_step);
criterion_main!(benches);
