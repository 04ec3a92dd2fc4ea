#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::many_single_char_names,
    clippy::similar_names,
    clippy::missing_panics_doc
)]

//! # trellis
//!
//! A compact, deterministic 3D physics engine for rigid and soft bodies,
//! aimed at small games and interactive simulations on constrained
//! hardware.
//!
//! Three ideas carry the whole design:
//!
//! - **No floating point.** Every quantity is a 32-bit integer normalized
//!   by [`fixed::F`], so a simulation runs bit-identically on anything
//!   with 32-bit integer math, from desktops down to microcontrollers.
//! - **Bodies are point-mass lattices.** A body is a handful of spherical
//!   [`joint::Joint`]s tied together by distance
//!   [`joint::Connection`]s. Rigid, soft and non-rotating behavior all fall
//!   out of how those connections are solved; there is no inertia tensor
//!   and no stored orientation to drift.
//! - **The environment is a function.** The world boundary is any
//!   closest-point function (see [`env`]); composing primitives is folding
//!   over them, and no mesh collision exists anywhere.
//!
//! Storage is caller-owned throughout: joints, connections and bodies live
//! in the caller's arrays, and [`world::World`] borrows them. The engine
//! never allocates while simulating.
//!
//! ```
//! use trellis::{body::Body, env, fixed::F, joint::Joint, vec3::Vec3, world::World};
//!
//! fn floor(p: Vec3, _max_d: trellis::fixed::Unit) -> Vec3 {
//!     env::ground(p, 0)
//! }
//!
//! // one ball, one meter of drop
//! let mut joints = [Joint::new(Vec3::new(0, 8 * F, 0), F)];
//! let mut bodies = [Body::new(&mut joints, &mut [], 2 * F).unwrap()];
//! let mut world = World::new(&mut bodies, Some(floor));
//!
//! while world.bodies[0].is_active() {
//!     world.bodies[0].apply_gravity(F / 100);
//!     world.step();
//! }
//! ```

pub mod body;
pub mod builder;
pub mod debug;
pub mod env;
pub mod error;
pub mod fixed;
pub mod joint;
pub mod ray;
pub mod rotation;
pub mod steps;
pub mod vec3;
pub mod world;

pub use body::Body;
pub use error::Error;
pub use fixed::{Unit, F, INFINITY};
pub use joint::{Connection, Joint};
pub use vec3::Vec3;
pub use world::World;
