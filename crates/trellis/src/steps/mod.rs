//! Per-step simulation passes, in the order the world runs them: integrate
//! velocities, re-impose connection lengths (or spring soft bodies), project
//! joints out of the environment, then detect and answer joint contacts.

pub mod contact;
pub mod environment;
pub mod integration;
pub mod reshape;
