//! Wireframe debug rendering through a caller-supplied pixel function.
//!
//! No renderer lives in this crate; [`draw_world`] only projects joints,
//! connections and an environment probe grid through a simple pinhole
//! camera and emits colored pixels one at a time. Plugging the pixel
//! callback into any framebuffer gives an instant view of what the solver
//! actually sees, which tends to be the fastest way to debug a misbehaving
//! environment function.

use crate::body::flags;
use crate::fixed::Unit;
use crate::rotation::{euler_to_quaternion, rotate_point};
use crate::vec3::Vec3;
use crate::world::World;

/// Pixel sink for [`draw_world`]: screen x, screen y, color index.
pub type DebugPixelFn = fn(u16, u16, u8);

/// Color index for connection pixels.
pub const COLOR_CONNECTION: u8 = 0;
/// Color index for joints of active bodies.
pub const COLOR_JOINT: u8 = 1;
/// Color index for environment probe pixels.
pub const COLOR_ENVIRONMENT: u8 = 2;
/// Color index for joints of inactive (sleeping or disabled) bodies.
pub const COLOR_INACTIVE: u8 = 3;

/// Points drawn along each connection.
const CONNECTION_DOTS: Unit = 8;

/// View description for [`draw_world`].
#[derive(Debug, Clone, Copy)]
pub struct View {
    /// Camera position in world space.
    pub camera_position: Vec3,
    /// Camera orientation as Euler angles, y-x-z order.
    pub camera_rotation: Vec3,
    /// Screen width and height in pixels, and the focal length in the
    /// z component.
    pub resolution: Vec3,
}

/// Draws every body (joints and connections) and, when `env_grid_res` is
/// nonzero, probes the world's environment function on an
/// `env_grid_res`³ grid of spacing `env_grid_size` around the camera,
/// drawing the returned surface points.
pub fn draw_world(
    world: &World,
    pixel: DebugPixelFn,
    view: &View,
    env_grid_res: u32,
    env_grid_size: Unit,
) {
    let un_rotate = euler_to_quaternion(view.camera_rotation).conjugate();

    let project = |point: Vec3| -> Option<(u16, u16)> {
        let local = rotate_point(point - view.camera_position, un_rotate);

        if local.z <= 0 {
            return None;
        }

        let x = view.resolution.x / 2
            + ((i64::from(local.x) * i64::from(view.resolution.z)) / i64::from(local.z)) as Unit;
        let y = view.resolution.y / 2
            - ((i64::from(local.y) * i64::from(view.resolution.z)) / i64::from(local.z)) as Unit;

        if x < 0 || y < 0 || x >= view.resolution.x || y >= view.resolution.y {
            return None;
        }

        Some((x as u16, y as u16))
    };

    for body in world.bodies.iter() {
        let joint_color = if body.is_active() && body.flags & flags::DISABLED == 0 {
            COLOR_JOINT
        } else {
            COLOR_INACTIVE
        };

        for connection in body.connections.iter() {
            let from = body.joints[usize::from(connection.joint1)].position;
            let to = body.joints[usize::from(connection.joint2)].position;

            // dotted line, interpolated in world space
            for i in 1..CONNECTION_DOTS {
                let along = from
                    + Vec3::new(
                        ((to.x - from.x) * i) / CONNECTION_DOTS,
                        ((to.y - from.y) * i) / CONNECTION_DOTS,
                        ((to.z - from.z) * i) / CONNECTION_DOTS,
                    );

                if let Some((x, y)) = project(along) {
                    pixel(x, y, COLOR_CONNECTION);
                }
            }
        }

        for joint in body.joints.iter() {
            if let Some((x, y)) = project(joint.position) {
                pixel(x, y, joint_color);
            }
        }
    }

    let (Some(environment), true) = (world.environment, env_grid_res > 0) else {
        return;
    };

    let half = (env_grid_res as Unit * env_grid_size) / 2;

    for gz in 0..env_grid_res as Unit {
        for gy in 0..env_grid_res as Unit {
            for gx in 0..env_grid_res as Unit {
                let probe = view.camera_position
                    + Vec3::new(
                        gx * env_grid_size - half,
                        gy * env_grid_size - half,
                        gz * env_grid_size - half,
                    );
                let surface = environment(probe, env_grid_size);

                if surface != probe && probe.dist(surface) <= env_grid_size {
                    if let Some((x, y)) = project(surface) {
                        pixel(x, y, COLOR_ENVIRONMENT);
                    }
                }
            }
        }
    }
}
